//! Font registration and resolution.
//!
//! Theme fonts are TrueType files dropped into a fonts directory and known by
//! their file stem (`Poppins-Bold.ttf` registers as `Poppins-Bold`). Whatever
//! fails to load is skipped, and any role whose font is missing falls back to
//! one of the two built-in Helvetica faces.
//!
//! Registration returns a plain [`FontSet`] value; nothing global is touched,
//! so registering the same directory twice (or from two threads) is harmless.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::theme::{FontRole, Theme};

/// Errors that can occur while loading a single font file.
#[derive(Error, Debug)]
pub enum FontError {
    #[error("Failed to read font {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse font {name}: {reason}")]
    Parse { name: String, reason: String },
}

/// A successfully parsed TrueType font, ready to be embedded.
///
/// Metrics are kept in 1/1000 em, the unit PDF font dictionaries use.
#[derive(Debug, Clone)]
pub struct RegisteredFont {
    pub name: String,
    pub data: Vec<u8>,
    pub ascent: i32,
    pub descent: i32,
    pub cap_height: i32,
    /// Degrees counter-clockwise from vertical; negative for fonts that lean right.
    pub italic_angle: f32,
    /// Font bounding box: [x_min, y_min, x_max, y_max].
    pub bbox: [i32; 4],
    pub italic: bool,
}

/// One character mapped to a glyph of a [`RegisteredFont`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Glyph {
    pub ch: char,
    pub id: u16,
    /// Advance width in 1/1000 em.
    pub advance: u16,
}

impl RegisteredFont {
    /// Parse raw TrueType bytes.
    pub fn parse(name: &str, data: Vec<u8>) -> Result<Self, FontError> {
        let face = ttf_parser::Face::parse(&data, 0).map_err(|e| FontError::Parse {
            name: name.to_string(),
            reason: e.to_string(),
        })?;

        let units_per_em = f32::from(face.units_per_em());
        let scale = |v: f32| (v * 1000.0 / units_per_em).round() as i32;

        let bbox = face.global_bounding_box();
        let ascent = scale(f32::from(face.ascender()));
        let descent = scale(f32::from(face.descender()));
        // OS/2 tables before version 2 carry no cap height; measure `H` instead.
        let cap_height = face
            .capital_height()
            .or_else(|| {
                face.glyph_index('H')
                    .and_then(|id| face.glyph_bounding_box(id))
                    .map(|rect| rect.y_max)
            })
            .map(|h| scale(f32::from(h)))
            .unwrap_or(ascent);
        let italic_angle = face.italic_angle().unwrap_or(0.0);
        let italic = face.is_italic();

        Ok(Self {
            name: name.to_string(),
            ascent,
            descent,
            cap_height,
            italic_angle,
            bbox: [
                scale(f32::from(bbox.x_min)),
                scale(f32::from(bbox.y_min)),
                scale(f32::from(bbox.x_max)),
                scale(f32::from(bbox.y_max)),
            ],
            italic,
            data,
        })
    }

    /// Map `text` to glyphs, one per character. Characters the font has no
    /// glyph for are left out; the second value counts them.
    pub fn glyphs(&self, text: &str) -> (Vec<Glyph>, usize) {
        // Bytes were validated in `parse`.
        let Ok(face) = ttf_parser::Face::parse(&self.data, 0) else {
            return (Vec::new(), text.chars().count());
        };
        let units_per_em = f32::from(face.units_per_em());

        let mut glyphs = Vec::with_capacity(text.len());
        let mut missing = 0;
        for ch in text.chars() {
            match face.glyph_index(ch).filter(|id| id.0 != 0) {
                Some(id) => {
                    let advance = face.glyph_hor_advance(id).unwrap_or(0);
                    glyphs.push(Glyph {
                        ch,
                        id: id.0,
                        advance: (f32::from(advance) * 1000.0 / units_per_em).round() as u16,
                    });
                }
                None => missing += 1,
            }
        }
        (glyphs, missing)
    }
}

/// The fonts that registered successfully, keyed by name.
#[derive(Debug, Clone, Default)]
pub struct FontSet {
    fonts: BTreeMap<String, RegisteredFont>,
}

impl FontSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse and register font bytes under `name`, replacing any earlier entry.
    pub fn register_bytes(&mut self, name: &str, data: Vec<u8>) -> Result<(), FontError> {
        let font = RegisteredFont::parse(name, data)?;
        self.fonts.insert(name.to_string(), font);
        Ok(())
    }

    /// Read a font file and register it under its file stem.
    pub fn register_file(&mut self, path: &Path) -> Result<String, FontError> {
        let name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();
        let data = fs::read(path).map_err(|source| FontError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        self.register_bytes(&name, data)?;
        Ok(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fonts.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&RegisteredFont> {
        self.fonts.get(name)
    }

    pub fn len(&self) -> usize {
        self.fonts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fonts.is_empty()
    }
}

/// Register every `.ttf` file in `dir`.
///
/// A missing or unreadable directory yields an empty set. Files that fail to
/// load are logged and skipped.
pub fn register_fonts(dir: &Path) -> FontSet {
    let mut set = FontSet::new();

    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::debug!(dir = %dir.display(), error = %e, "no fonts directory, using built-in fonts");
            return set;
        }
    };

    let mut paths: Vec<PathBuf> = entries
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == "ttf"))
        .collect();
    paths.sort();

    for path in paths {
        match set.register_file(&path) {
            Ok(name) => tracing::debug!(font = %name, "registered font"),
            Err(e) => tracing::warn!(error = %e, "skipping font"),
        }
    }

    tracing::info!(dir = %dir.display(), count = set.len(), "fonts registered");
    set
}

/// Return `declared` if it is registered, otherwise the role's built-in fallback.
pub fn resolve_font<'a>(declared: &'a str, role: FontRole, registered: &FontSet) -> &'a str {
    if registered.contains(declared) {
        declared
    } else {
        role.fallback()
    }
}

/// A font name ready to hand to a drawing surface, with its point size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedFont {
    pub name: &'static str,
    pub size: f32,
}

/// Every role of a theme resolved against the registered set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedFonts {
    pub title: ResolvedFont,
    pub subtitle: ResolvedFont,
    pub day: ResolvedFont,
    pub meal: ResolvedFont,
    pub detail: ResolvedFont,
}

impl ResolvedFonts {
    pub fn resolve(theme: &Theme, registered: &FontSet) -> Self {
        let resolve = |role: FontRole| {
            let spec = theme.fonts.get(role);
            let name = resolve_font(spec.family, role, registered);
            if name != spec.family {
                tracing::debug!(role = ?role, wanted = spec.family, using = name, "font fallback");
            }
            ResolvedFont {
                name,
                size: spec.size,
            }
        };

        Self {
            title: resolve(FontRole::Title),
            subtitle: resolve(FontRole::Subtitle),
            day: resolve(FontRole::Day),
            meal: resolve(FontRole::Meal),
            detail: resolve(FontRole::Detail),
        }
    }
}

/// The standard PDF fonts used as fallbacks. They need no embedding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltinFont {
    Helvetica,
    HelveticaBold,
}

impl BuiltinFont {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "Helvetica" => Some(Self::Helvetica),
            "Helvetica-Bold" => Some(Self::HelveticaBold),
            _ => None,
        }
    }

    pub fn base_font(self) -> &'static str {
        match self {
            Self::Helvetica => "Helvetica",
            Self::HelveticaBold => "Helvetica-Bold",
        }
    }

    /// Advance width of a WinAnsi code in 1/1000 em (AFM metrics).
    pub fn advance(self, code: u8) -> u16 {
        let table = match self {
            Self::Helvetica => &HELVETICA_WIDTHS,
            Self::HelveticaBold => &HELVETICA_BOLD_WIDTHS,
        };
        match code {
            32..=126 => table[(code - 32) as usize],
            0x95 => 350,
            _ => 556,
        }
    }
}

// ASCII 32..=126.
#[rustfmt::skip]
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556,
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556,
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556,
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
];

#[rustfmt::skip]
const HELVETICA_BOLD_WIDTHS: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611,
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556,
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611,
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584,
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theme::{find_theme, THEMES};

    fn fixtures() -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/fonts")
    }

    #[test]
    fn test_missing_directory_is_empty() {
        let set = register_fonts(Path::new("/definitely/not/a/fonts/dir"));
        assert!(set.is_empty());
    }

    #[test]
    fn test_corrupt_font_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("Poppins-Bold.ttf"), b"not a font").unwrap();
        fs::write(dir.path().join("readme.txt"), b"ignored").unwrap();

        let set = register_fonts(dir.path());
        assert!(set.is_empty());
        assert!(!set.contains("Poppins-Bold"));
    }

    #[test]
    fn test_register_bytes_rejects_garbage() {
        let mut set = FontSet::new();
        let err = set.register_bytes("Broken", vec![0u8; 64]).unwrap_err();
        assert!(matches!(err, FontError::Parse { .. }));
        assert!(set.is_empty());
    }

    #[test]
    fn test_resolve_falls_back_per_role() {
        let empty = FontSet::new();
        for theme in THEMES.iter() {
            for role in FontRole::ALL {
                let declared = theme.fonts.get(role).family;
                assert_eq!(resolve_font(declared, role, &empty), role.fallback());
            }
        }
    }

    #[test]
    fn test_resolved_fonts_keep_sizes() {
        let theme = crate::theme::find_theme("elegant").unwrap();
        let resolved = ResolvedFonts::resolve(theme, &FontSet::new());
        assert_eq!(resolved.title.name, "Helvetica-Bold");
        assert_eq!(resolved.title.size, 40.0);
        assert_eq!(resolved.subtitle.name, "Helvetica");
        assert_eq!(resolved.day.name, "Helvetica-Bold");
        assert_eq!(resolved.detail.size, 9.0);
    }

    #[test]
    fn test_registered_fonts_resolve_to_their_names() {
        let set = register_fonts(&fixtures());
        assert_eq!(set.len(), 2);
        assert_eq!(resolve_font("DejaVuSerif", FontRole::Meal, &set), "DejaVuSerif");

        let resolved = ResolvedFonts::resolve(find_theme("rustic").unwrap(), &set);
        assert_eq!(resolved.meal.name, "DejaVuSerif");
        assert_eq!(resolved.subtitle.name, "DejaVuSerif-Italic");
        assert_eq!(resolved.detail.name, "DejaVuSerif-Italic");
        // No bold face in the directory.
        assert_eq!(resolved.title.name, "Helvetica-Bold");
        assert_eq!(resolved.day.name, "Helvetica-Bold");
    }

    #[test]
    fn test_registered_font_metrics() {
        let mut set = FontSet::new();
        set.register_file(&fixtures().join("DejaVuSerif.ttf")).unwrap();
        set.register_file(&fixtures().join("DejaVuSerif-Italic.ttf")).unwrap();

        let regular = set.get("DejaVuSerif").unwrap();
        assert_eq!(regular.ascent, 928);
        // Measured from `H`: this font's OS/2 table has no cap height.
        assert_eq!(regular.cap_height, 729);
        assert_eq!(regular.italic_angle, 0.0);
        assert!(!regular.italic);

        let italic = set.get("DejaVuSerif-Italic").unwrap();
        assert_eq!(italic.italic_angle, -11.0);
        assert!(italic.italic);
    }

    #[test]
    fn test_glyphs_skip_missing_characters() {
        let mut set = FontSet::new();
        set.register_file(&fixtures().join("DejaVuSerif.ttf")).unwrap();
        let font = set.get("DejaVuSerif").unwrap();

        let (glyphs, missing) = font.glyphs("Soup \u{2192} Stew\u{23F1}");
        assert_eq!(missing, 1);
        assert_eq!(glyphs.len(), 11);
        assert_eq!(glyphs[5].ch, '\u{2192}');
        assert_eq!(glyphs[5].id, 2133);
        assert!(glyphs.iter().all(|g| g.advance > 0));
    }

    #[test]
    fn test_builtin_widths() {
        assert_eq!(BuiltinFont::Helvetica.advance(b' '), 278);
        assert_eq!(BuiltinFont::Helvetica.advance(b'M'), 833);
        assert_eq!(BuiltinFont::HelveticaBold.advance(b'i'), 278);
        assert_eq!(BuiltinFont::Helvetica.advance(0x95), 350);
        assert_eq!(BuiltinFont::from_name("Helvetica-Bold"), Some(BuiltinFont::HelveticaBold));
        assert_eq!(BuiltinFont::from_name("Poppins-Bold"), None);
    }
}
