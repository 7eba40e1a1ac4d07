//! Menu themes.
//!
//! A theme bundles a color palette with a font for each text role. The table
//! is static and read-only; themes are looked up by their snake_case name.
//!
//! Requesting a name that is not in the table is not an error: a theme is
//! picked uniformly at random instead, exactly as when no name is given.
//! Callers that need a fixed look must pass a valid name.

use rand::Rng;
use serde::Serialize;

/// Color in 8-bit RGB.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const WHITE: Color = Color::hex(0xFFFFFF);
    pub const BLACK: Color = Color::hex(0x000000);

    /// Build a color from a `0xRRGGBB` literal.
    pub const fn hex(rgb: u32) -> Self {
        Self {
            r: ((rgb >> 16) & 0xFF) as u8,
            g: ((rgb >> 8) & 0xFF) as u8,
            b: (rgb & 0xFF) as u8,
        }
    }

    /// Components in the 0.0-1.0 range PDF color operators expect.
    pub fn components(&self) -> [f32; 3] {
        [
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
        ]
    }
}

/// Color roles of a theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub background: Color,
    pub header: Color,
    pub day: Color,
    pub accent: Color,
    pub text: Color,
}

/// Text roles that carry their own font.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FontRole {
    Title,
    Subtitle,
    Day,
    Meal,
    Detail,
}

impl FontRole {
    pub const ALL: [FontRole; 5] = [
        FontRole::Title,
        FontRole::Subtitle,
        FontRole::Day,
        FontRole::Meal,
        FontRole::Detail,
    ];

    /// Built-in font used when the theme's font for this role is not registered.
    pub fn fallback(self) -> &'static str {
        match self {
            FontRole::Title | FontRole::Day => "Helvetica-Bold",
            FontRole::Subtitle | FontRole::Meal | FontRole::Detail => "Helvetica",
        }
    }
}

/// A font family name (the registered file stem) and point size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FontSpec {
    pub family: &'static str,
    pub size: f32,
}

const fn font(family: &'static str, size: f32) -> FontSpec {
    FontSpec { family, size }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThemeFonts {
    pub title: FontSpec,
    pub subtitle: FontSpec,
    pub day: FontSpec,
    pub meal: FontSpec,
    pub detail: FontSpec,
}

impl ThemeFonts {
    pub fn get(&self, role: FontRole) -> FontSpec {
        match role {
            FontRole::Title => self.title,
            FontRole::Subtitle => self.subtitle,
            FontRole::Day => self.day,
            FontRole::Meal => self.meal,
            FontRole::Detail => self.detail,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Theme {
    pub name: &'static str,
    pub palette: Palette,
    pub fonts: ThemeFonts,
}

impl Theme {
    /// Human-readable name: underscores become spaces and every word is
    /// title-cased, e.g. `clean_and_modern` -> `Clean And Modern`.
    pub fn display_name(&self) -> String {
        title_case(&self.name.replace('_', " "))
    }
}

pub static THEMES: [Theme; 5] = [
    Theme {
        name: "fun_and_colorful",
        palette: Palette {
            background: Color::hex(0xFFF8DC),
            header: Color::hex(0xFF6B6B),
            day: Color::hex(0x4ECDC4),
            accent: Color::hex(0xFFE66D),
            text: Color::hex(0x2C3E50),
        },
        fonts: ThemeFonts {
            title: font("FredokaOne-Regular", 36.0),
            subtitle: font("Poppins-MediumItalic", 12.0),
            day: font("Poppins-Bold", 14.0),
            meal: font("Poppins-Regular", 11.0),
            detail: font("Poppins-Light", 9.0),
        },
    },
    Theme {
        name: "clean_and_modern",
        palette: Palette {
            background: Color::WHITE,
            header: Color::hex(0x2C3E50),
            day: Color::hex(0x3498DB),
            accent: Color::hex(0xE74C3C),
            text: Color::BLACK,
        },
        fonts: ThemeFonts {
            title: font("Poppins-Bold", 38.0),
            subtitle: font("Poppins-Light", 12.0),
            day: font("Poppins-Medium", 14.0),
            meal: font("Poppins-Regular", 11.0),
            detail: font("Poppins-LightItalic", 9.0),
        },
    },
    Theme {
        name: "rustic",
        palette: Palette {
            background: Color::hex(0xF5E6D3),
            header: Color::hex(0x8B4513),
            day: Color::hex(0xA0522D),
            accent: Color::hex(0xCD853F),
            text: Color::hex(0x3E2723),
        },
        fonts: ThemeFonts {
            title: font("DejaVuSerif-Bold", 36.0),
            subtitle: font("DejaVuSerif-Italic", 12.0),
            day: font("DejaVuSerif-Bold", 14.0),
            meal: font("DejaVuSerif", 11.0),
            detail: font("DejaVuSerif-Italic", 9.0),
        },
    },
    Theme {
        name: "elegant",
        palette: Palette {
            background: Color::hex(0xFAFAFA),
            header: Color::hex(0x1A1A1A),
            day: Color::hex(0x4A4A4A),
            accent: Color::hex(0xB8860B),
            text: Color::hex(0x2C2C2C),
        },
        fonts: ThemeFonts {
            title: font("PlayfairDisplay-Bold", 40.0),
            subtitle: font("PlayfairDisplay-Regular", 12.0),
            day: font("PlayfairDisplay-Bold", 14.0),
            meal: font("PlayfairDisplay-Regular", 11.0),
            detail: font("Lora-Italic-Variable", 9.0),
        },
    },
    Theme {
        name: "bold_and_playful",
        palette: Palette {
            background: Color::hex(0xFFF5E1),
            header: Color::hex(0xE91E63),
            day: Color::hex(0x9C27B0),
            accent: Color::hex(0xFF9800),
            text: Color::BLACK,
        },
        fonts: ThemeFonts {
            title: font("FredokaOne-Regular", 38.0),
            subtitle: font("Poppins-Medium", 12.0),
            day: font("FredokaOne-Regular", 13.0),
            meal: font("Poppins-Medium", 11.0),
            detail: font("Poppins-Light", 9.0),
        },
    },
];

/// Exact lookup by theme name.
pub fn find_theme(name: &str) -> Option<&'static Theme> {
    THEMES.iter().find(|theme| theme.name == name)
}

/// Pick the requested theme, or a random one when the name is absent or unknown.
pub fn select_theme(requested: Option<&str>) -> &'static Theme {
    select_theme_with(requested, &mut rand::thread_rng())
}

/// [`select_theme`] with a caller-supplied random source.
pub fn select_theme_with<R: Rng>(requested: Option<&str>, rng: &mut R) -> &'static Theme {
    if let Some(theme) = requested.and_then(find_theme) {
        return theme;
    }

    let theme = &THEMES[rng.gen_range(0..THEMES.len())];
    match requested {
        Some(name) => tracing::warn!(
            requested = name,
            chosen = theme.name,
            "unknown theme, picked one at random"
        ),
        None => tracing::debug!(chosen = theme.name, "no theme requested, picked one at random"),
    }
    theme
}

/// Upper-case the first letter of every run of letters and lower-case the rest.
fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_is_letter = false;
    for c in s.chars() {
        if c.is_alphabetic() {
            if prev_is_letter {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_is_letter = true;
        } else {
            out.push(c);
            prev_is_letter = false;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_known_names_select_exactly() {
        for theme in THEMES.iter() {
            assert_eq!(select_theme(Some(theme.name)).name, theme.name);
        }
    }

    #[test]
    fn test_unknown_name_falls_back_to_table_entry() {
        let mut rng = StdRng::seed_from_u64(7);
        for name in ["not_a_real_theme", "", "Rustic", "clean and modern"] {
            for _ in 0..20 {
                let theme = select_theme_with(Some(name), &mut rng);
                assert!(find_theme(theme.name).is_some());
            }
        }
    }

    #[test]
    fn test_missing_name_reaches_every_theme() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut seen = std::collections::HashSet::new();
        for _ in 0..500 {
            seen.insert(select_theme_with(None, &mut rng).name);
        }
        assert_eq!(seen.len(), THEMES.len());
    }

    #[test]
    fn test_display_name() {
        let theme = find_theme("clean_and_modern").unwrap();
        assert_eq!(theme.display_name(), "Clean And Modern");
        assert_eq!(find_theme("rustic").unwrap().display_name(), "Rustic");
        assert_eq!(title_case("bold and PLAYFUL"), "Bold And Playful");
    }

    #[test]
    fn test_hex_color() {
        let c = Color::hex(0x3498DB);
        assert_eq!((c.r, c.g, c.b), (0x34, 0x98, 0xDB));
        assert_eq!(Color::WHITE.components(), [1.0, 1.0, 1.0]);
    }

    #[test]
    fn test_role_fallbacks() {
        assert_eq!(FontRole::Title.fallback(), "Helvetica-Bold");
        assert_eq!(FontRole::Day.fallback(), "Helvetica-Bold");
        assert_eq!(FontRole::Subtitle.fallback(), "Helvetica");
        assert_eq!(FontRole::Meal.fallback(), "Helvetica");
        assert_eq!(FontRole::Detail.fallback(), "Helvetica");
    }
}
