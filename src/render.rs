//! Menu rendering entry points.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::fonts::{register_fonts, FontSet};
use crate::layout::{layout_menu, PageSize, Surface};
use crate::menu::Menu;
use crate::pdf::{PdfError, PdfSurface};
use crate::theme::{select_theme, Theme};

/// Errors that can occur while rendering a menu.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error(transparent)]
    Pdf(#[from] PdfError),

    #[error("Failed to save {path}: {source}")]
    Save {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Render `menu` to PDF bytes with an already selected theme.
pub fn render_to_bytes(menu: &Menu, theme: &Theme, fonts: &FontSet) -> Result<Vec<u8>, RenderError> {
    let mut surface = PdfSurface::new(PageSize::LETTER, fonts);
    let stats = layout_menu(menu, theme, fonts, PageSize::LETTER, &mut surface);
    tracing::debug!(theme = theme.name, pages = stats.pages, meals = stats.meals, "menu laid out");
    Ok(surface.finish()?)
}

/// Render `menu` to a PDF at `output`.
///
/// Fonts are registered from `fonts_dir` (a missing directory just means the
/// built-in fonts are used). `theme` picks the style; an absent or unknown name
/// gets a random theme. Returns the name of the theme actually used.
pub fn create_menu_pdf(
    menu: &Menu,
    output: &Path,
    theme: Option<&str>,
    fonts_dir: &Path,
) -> Result<&'static str, RenderError> {
    let fonts = register_fonts(fonts_dir);
    let theme = select_theme(theme);

    let bytes = render_to_bytes(menu, theme, &fonts)?;
    fs::write(output, &bytes).map_err(|source| RenderError::Save {
        path: output.to_path_buf(),
        source,
    })?;

    tracing::info!(
        theme = theme.name,
        output = %output.display(),
        bytes = bytes.len(),
        "menu saved"
    );
    Ok(theme.name)
}
