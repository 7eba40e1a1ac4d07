//! Command-line commands.
//!
//! Each subcommand resolves its settings from flags first, then the config
//! file, then built-in defaults, and hands off to the library.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use serde::Serialize;

use crate::config::Config;
use crate::fonts::register_fonts;
use crate::layout::{layout_menu, PageSize, Surface};
use crate::menu::Menu;
use crate::pdf::{DrawCommand, RecordingSurface};
use crate::render::create_menu_pdf;
use crate::theme::{select_theme, THEMES};

#[derive(Parser, Debug)]
#[command(name = "family-menu", version, about = "Generate a themed weekly meal-plan PDF")]
pub struct Cli {
    /// Configuration file (default: ./family-menu.toml if it exists)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Render a menu file (JSON, or TOML with a .toml extension) to PDF
    Render {
        menu: PathBuf,
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[command(flatten)]
        style: StyleArgs,
    },
    /// Render the built-in seven-day sample menu
    Sample {
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[command(flatten)]
        style: StyleArgs,
    },
    /// List the available themes
    Themes,
    /// Print the draw commands for a menu as JSON without writing a PDF
    Plan {
        menu: PathBuf,
        #[command(flatten)]
        style: StyleArgs,
    },
}

#[derive(Args, Debug, Clone, Default)]
pub struct StyleArgs {
    /// Theme name; unknown or missing names pick a random theme
    #[arg(short, long)]
    pub theme: Option<String>,

    /// Directory containing .ttf theme fonts
    #[arg(long)]
    pub fonts_dir: Option<PathBuf>,
}

/// Settings after merging flags over the config file.
#[derive(Debug, Clone, PartialEq)]
struct Resolved {
    theme: Option<String>,
    fonts_dir: PathBuf,
    output: PathBuf,
}

fn resolve(config: &Config, style: &StyleArgs, output: Option<&Path>) -> Resolved {
    Resolved {
        theme: style.theme.clone().or_else(|| config.theme.clone()),
        fonts_dir: style.fonts_dir.clone().unwrap_or_else(|| config.fonts_dir.clone()),
        output: output.map(Path::to_path_buf).unwrap_or_else(|| config.output.clone()),
    }
}

pub fn execute(cli: Cli) -> anyhow::Result<()> {
    let config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Command::Render { menu, output, style } => {
            let menu = Menu::load(&menu).with_context(|| format!("loading {}", menu.display()))?;
            render(&menu, &resolve(&config, &style, output.as_deref()))
        }
        Command::Sample { output, style } => {
            render(&Menu::sample(), &resolve(&config, &style, output.as_deref()))
        }
        Command::Themes => {
            for line in theme_listing() {
                println!("{line}");
            }
            Ok(())
        }
        Command::Plan { menu, style } => {
            let menu = Menu::load(&menu).with_context(|| format!("loading {}", menu.display()))?;
            let settings = resolve(&config, &style, None);
            println!("{}", plan(&menu, settings.theme.as_deref(), &settings.fonts_dir)?);
            Ok(())
        }
    }
}

fn render(menu: &Menu, settings: &Resolved) -> anyhow::Result<()> {
    let style = create_menu_pdf(
        menu,
        &settings.output,
        settings.theme.as_deref(),
        &settings.fonts_dir,
    )?;
    println!(
        "Created menu with '{}' design at: {}",
        style,
        settings.output.display()
    );
    Ok(())
}

/// One line per theme: the name to pass to `--theme` and its display name.
pub fn theme_listing() -> Vec<String> {
    THEMES
        .iter()
        .map(|theme| format!("{:<18} {}", theme.name, theme.display_name()))
        .collect()
}

#[derive(Debug, Serialize)]
struct Plan {
    theme: &'static str,
    pages: usize,
    commands: Vec<DrawCommand>,
}

/// Lay out `menu` on a recording surface and return the commands as JSON.
pub fn plan(menu: &Menu, theme: Option<&str>, fonts_dir: &Path) -> anyhow::Result<String> {
    let fonts = register_fonts(fonts_dir);
    let theme = select_theme(theme);

    let mut surface = RecordingSurface::new();
    let stats = layout_menu(menu, theme, &fonts, PageSize::LETTER, &mut surface);
    let commands = match surface.finish() {
        Ok(commands) => commands,
        Err(never) => match never {},
    };

    let plan = Plan {
        theme: theme.name,
        pages: stats.pages,
        commands,
    };
    Ok(serde_json::to_string_pretty(&plan)?)
}
