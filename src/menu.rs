//! Menu data model.
//!
//! Menus are read from JSON, or TOML when the file ends in `.toml`. Only
//! `meals` carries the content; `title` and `subtitle` have defaults.

use std::borrow::Cow;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_TITLE: &str = "This Week's Menu";

/// Errors that can occur while loading a menu file.
#[derive(Error, Debug)]
pub enum MenuError {
    #[error("Failed to read menu {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid JSON menu: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid TOML menu: {0}")]
    Toml(#[from] toml::de::Error),
}

/// A week of meals.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Menu {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub subtitle: Option<String>,
    #[serde(default)]
    pub meals: Vec<Meal>,
}

/// One day's entry. Days are free text and may repeat or come in any order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Meal {
    #[serde(default)]
    pub day: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protein: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prep_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Menu {
    pub fn title(&self) -> &str {
        self.title.as_deref().unwrap_or(DEFAULT_TITLE)
    }

    /// The subtitle, or `Week of <today>` when none was given.
    pub fn subtitle(&self) -> Cow<'_, str> {
        match &self.subtitle {
            Some(subtitle) => Cow::Borrowed(subtitle.as_str()),
            None => Cow::Owned(week_of(Local::now().date_naive())),
        }
    }

    /// Load a menu file, picking the format from the extension.
    pub fn load(path: &Path) -> Result<Self, MenuError> {
        let raw = fs::read_to_string(path).map_err(|source| MenuError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        if path.extension().is_some_and(|ext| ext == "toml") {
            Self::from_toml(&raw)
        } else {
            Self::from_json(&raw)
        }
    }

    pub fn from_json(raw: &str) -> Result<Self, MenuError> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn from_toml(raw: &str) -> Result<Self, MenuError> {
        Ok(toml::from_str(raw)?)
    }

    /// The seven-day family dinner menu used by the `sample` command.
    pub fn sample() -> Self {
        let meal = |day: &str, name: &str| Meal {
            day: day.to_string(),
            name: name.to_string(),
            ..Meal::default()
        };
        let some = |s: &str| Some(s.to_string());

        Self {
            title: some("Family Dinner Menu"),
            subtitle: None,
            meals: vec![
                Meal {
                    protein: some("Chicken breast"),
                    prep_time: some("35 min"),
                    ..meal("Monday", "Grilled Chicken with Roasted Vegetables")
                },
                Meal {
                    notes: some("Use remaining chicken and veggies"),
                    ..meal("Tuesday", "Monday Leftovers")
                },
                Meal {
                    protein: some("Salmon fillet"),
                    prep_time: some("25 min"),
                    ..meal("Wednesday", "Salmon with Quinoa and Asparagus")
                },
                Meal {
                    protein: some("Beef sirloin"),
                    prep_time: some("30 min"),
                    ..meal("Thursday", "Beef Stir-Fry")
                },
                Meal {
                    notes: some("Everyone makes their own pizza"),
                    ..meal("Friday", "Homemade Pizza Night! \u{1F355}")
                },
                Meal {
                    notes: some("Try the new Italian place downtown"),
                    ..meal("Saturday", "Restaurant Night")
                },
                Meal {
                    protein: some("Chuck roast"),
                    prep_time: some("15 min prep, 6 hrs cooking"),
                    ..meal("Sunday", "Slow Cooker Pot Roast")
                },
            ],
        }
    }
}

impl Meal {
    pub fn protein(&self) -> Option<&str> {
        non_empty(&self.protein)
    }

    pub fn prep_time(&self) -> Option<&str> {
        non_empty(&self.prep_time)
    }

    pub fn notes(&self) -> Option<&str> {
        non_empty(&self.notes)
    }
}

fn non_empty(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|s| !s.is_empty())
}

/// `Week of May 05, 2025`.
pub fn week_of(date: NaiveDate) -> String {
    format!("Week of {}", date.format("%B %d, %Y"))
}
