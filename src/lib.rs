// Family Menu - themed weekly meal-plan PDFs
//
// Lays out a week of meals with one of a handful of color and font themes
// and writes a letter-size PDF.

pub mod commands;
pub mod config;
pub mod fonts;
pub mod layout;
pub mod menu;
pub mod pdf;
pub mod render;
pub mod theme;

pub use fonts::{register_fonts, resolve_font, FontSet};
pub use layout::{layout_menu, truncate_note, PageSize, Surface};
pub use menu::{Meal, Menu};
pub use render::{create_menu_pdf, render_to_bytes, RenderError};
pub use theme::{find_theme, select_theme, Theme, THEMES};

use clap::Parser;
use tracing_subscriber::EnvFilter;

/// Parse the command line, set up logging and run the requested command.
pub fn run() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = commands::Cli::parse();
    commands::execute(cli)
}
