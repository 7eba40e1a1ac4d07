//! PDF output via lopdf.
//!
//! Pages are collected as operation lists and only turned into objects when
//! the surface is finished, so a half-written document never exists. Fonts are
//! shared by all pages through the resources of the page tree root.
//!
//! The built-in Helvetica faces take WinAnsi bytes. Registered TrueType fonts
//! are embedded as `Type0` fonts with `Identity-H` encoding: strings are
//! two-byte glyph ids, so any character the font has a glyph for is kept. The
//! widths and the `ToUnicode` map list the glyphs actually drawn and are
//! written when the surface is finished.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream, StringFormat};
use thiserror::Error;

use super::encoding;
use crate::fonts::{BuiltinFont, FontSet, RegisteredFont};
use crate::layout::{Align, PageSize, Surface};
use crate::theme::Color;

/// Errors that can occur while producing the PDF bytes.
#[derive(Error, Debug)]
pub enum PdfError {
    #[error("Failed to encode page {page} content: {reason}")]
    Encode { page: usize, reason: String },

    #[error("Failed to write PDF: {0}")]
    Write(String),
}

#[derive(Debug)]
enum FontKind<'a> {
    Builtin(BuiltinFont),
    /// `used` maps each glyph id drawn so far to its width and character.
    Embedded {
        font: &'a RegisteredFont,
        used: BTreeMap<u16, (u16, char)>,
    },
}

/// A `Tj` operand and its advance in 1/1000 em.
struct EncodedText {
    bytes: Vec<u8>,
    format: StringFormat,
    units: u32,
    dropped: usize,
}

impl EncodedText {
    fn width(&self, size: f32) -> f32 {
        self.units as f32 * size / 1000.0
    }
}

impl FontKind<'_> {
    fn encode(&mut self, text: &str) -> EncodedText {
        match self {
            FontKind::Builtin(font) => {
                let (bytes, dropped) = encoding::encode(text);
                let units = bytes.iter().map(|&code| u32::from(font.advance(code))).sum();
                EncodedText {
                    bytes,
                    format: StringFormat::Literal,
                    units,
                    dropped,
                }
            }
            FontKind::Embedded { font, used } => {
                let (glyphs, dropped) = font.glyphs(text);
                let mut bytes = Vec::with_capacity(glyphs.len() * 2);
                let mut units = 0;
                for glyph in glyphs {
                    bytes.extend_from_slice(&glyph.id.to_be_bytes());
                    units += u32::from(glyph.advance);
                    used.entry(glyph.id).or_insert((glyph.advance, glyph.ch));
                }
                EncodedText {
                    bytes,
                    format: StringFormat::Hexadecimal,
                    units,
                    dropped,
                }
            }
        }
    }
}

/// A font that has been added to the document. Embedded fonts only reserve
/// their object id until the surface is finished.
#[derive(Debug)]
struct FontResource<'a> {
    key: String,
    id: ObjectId,
    kind: FontKind<'a>,
}

/// A [`Surface`] that builds a PDF document in memory.
pub struct PdfSurface<'a> {
    doc: Document,
    pages_id: ObjectId,
    page: PageSize,
    registered: &'a FontSet,

    finished_pages: Vec<Vec<Operation>>,
    operations: Vec<Operation>,

    fonts: BTreeMap<String, FontResource<'a>>,
    font: Option<(String, f32)>,
    fill: Color,
    stroke: Color,
    line_width: f32,
}

impl<'a> PdfSurface<'a> {
    /// Start a document on its first page. `registered` supplies the TrueType
    /// fonts that can be embedded; any other name must be a built-in font.
    pub fn new(page: PageSize, registered: &'a FontSet) -> Self {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        Self {
            doc,
            pages_id,
            page,
            registered,
            finished_pages: Vec::new(),
            operations: Vec::new(),
            fonts: BTreeMap::new(),
            font: None,
            fill: Color::BLACK,
            stroke: Color::BLACK,
            line_width: 1.0,
        }
    }

    /// Width of `text` in points when set in `font_name` at `size`.
    pub fn text_width(&mut self, font_name: &str, size: f32, text: &str) -> f32 {
        self.font_resource(font_name).kind.encode(text).width(size)
    }

    /// Look up or add the font resource for `name`.
    fn font_resource(&mut self, name: &str) -> &mut FontResource<'a> {
        let key = format!("F{}", self.fonts.len() + 1);
        let doc = &mut self.doc;
        let registered = self.registered;

        self.fonts.entry(name.to_string()).or_insert_with(|| {
            if let Some(font) = registered.get(name) {
                tracing::debug!(font = name, bytes = font.data.len(), "embedding TrueType font");
                return FontResource {
                    key,
                    id: doc.new_object_id(),
                    kind: FontKind::Embedded {
                        font,
                        used: BTreeMap::new(),
                    },
                };
            }

            let builtin = BuiltinFont::from_name(name).unwrap_or_else(|| {
                tracing::warn!(font = name, "font is neither registered nor built in, using Helvetica");
                BuiltinFont::Helvetica
            });
            let id = doc.add_object(dictionary! {
                "Type" => "Font",
                "Subtype" => "Type1",
                "BaseFont" => builtin.base_font(),
                "Encoding" => "WinAnsiEncoding",
            });
            FontResource {
                key,
                id,
                kind: FontKind::Builtin(builtin),
            }
        })
    }

    /// Replay the graphics state at the top of a fresh page.
    fn restore_state(&mut self) {
        let fill = self.fill;
        let stroke = self.stroke;
        let width = self.line_width;
        self.operations.push(color_op("rg", fill));
        self.operations.push(color_op("RG", stroke));
        self.operations.push(Operation::new("w", vec![Object::Real(width)]));
    }
}

impl Surface for PdfSurface<'_> {
    type Output = Vec<u8>;
    type Error = PdfError;

    fn set_fill_color(&mut self, color: Color) {
        self.fill = color;
        self.operations.push(color_op("rg", color));
    }

    fn set_stroke_color(&mut self, color: Color) {
        self.stroke = color;
        self.operations.push(color_op("RG", color));
    }

    fn set_line_width(&mut self, width: f32) {
        self.line_width = width;
        self.operations.push(Operation::new("w", vec![Object::Real(width)]));
    }

    fn set_font(&mut self, name: &str, size: f32) {
        self.font = Some((name.to_string(), size));
    }

    fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32) {
        self.operations.push(Operation::new(
            "re",
            vec![
                Object::Real(x),
                Object::Real(y),
                Object::Real(width),
                Object::Real(height),
            ],
        ));
        self.operations.push(Operation::new("f", vec![]));
    }

    fn draw_text(&mut self, x: f32, y: f32, text: &str, align: Align) {
        let (name, size) = self
            .font
            .clone()
            .unwrap_or_else(|| ("Helvetica".to_string(), 12.0));
        let resource = self.font_resource(&name);
        let key = resource.key.clone().into_bytes();
        let encoded = resource.kind.encode(text);
        if encoded.dropped > 0 {
            tracing::debug!(font = %name, text, dropped = encoded.dropped, "characters the font cannot show left out");
        }

        let x = match align {
            Align::Left => x,
            Align::Center => x - encoded.width(size) / 2.0,
        };

        self.operations.push(Operation::new("BT", vec![]));
        self.operations.push(Operation::new(
            "Tf",
            vec![Object::Name(key), Object::Real(size)],
        ));
        self.operations.push(Operation::new("Td", vec![Object::Real(x), Object::Real(y)]));
        self.operations.push(Operation::new(
            "Tj",
            vec![Object::String(encoded.bytes, encoded.format)],
        ));
        self.operations.push(Operation::new("ET", vec![]));
    }

    fn draw_line(&mut self, x1: f32, y1: f32, x2: f32, y2: f32) {
        self.operations.push(Operation::new("m", vec![Object::Real(x1), Object::Real(y1)]));
        self.operations.push(Operation::new("l", vec![Object::Real(x2), Object::Real(y2)]));
        self.operations.push(Operation::new("S", vec![]));
    }

    fn new_page(&mut self) {
        let operations = std::mem::take(&mut self.operations);
        self.finished_pages.push(operations);
        self.restore_state();
    }

    fn finish(mut self) -> Result<Vec<u8>, PdfError> {
        let operations = std::mem::take(&mut self.operations);
        self.finished_pages.push(operations);

        let media_box = vec![
            Object::Real(0.0),
            Object::Real(0.0),
            Object::Real(self.page.width),
            Object::Real(self.page.height),
        ];

        let mut kids = Vec::with_capacity(self.finished_pages.len());
        for (index, operations) in std::mem::take(&mut self.finished_pages).into_iter().enumerate() {
            let content = Content { operations }
                .encode()
                .map_err(|e| PdfError::Encode {
                    page: index + 1,
                    reason: e.to_string(),
                })?;
            let content_id = self.doc.add_object(Stream::new(Dictionary::new(), content));

            let mut page = Dictionary::new();
            page.set(b"Type", Object::Name(b"Page".to_vec()));
            page.set(b"Parent", Object::Reference(self.pages_id));
            page.set(b"Contents", Object::Reference(content_id));
            kids.push(Object::Reference(self.doc.add_object(Object::Dictionary(page))));
        }

        let mut font_dict = Dictionary::new();
        for resource in self.fonts.values() {
            if let FontKind::Embedded { font, used } = &resource.kind {
                embed_type0(&mut self.doc, resource.id, font, used);
            }
            font_dict.set(resource.key.as_bytes(), Object::Reference(resource.id));
        }

        let page_count = kids.len() as i64;
        let pages = dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => Object::Integer(page_count),
            "MediaBox" => media_box,
            "Resources" => dictionary! { "Font" => font_dict },
        };
        self.doc.objects.insert(self.pages_id, Object::Dictionary(pages));

        let catalog_id = self.doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => self.pages_id,
        });
        self.doc.trailer.set("Root", catalog_id);

        let info_id = self.doc.add_object(dictionary! {
            "Creator" => Object::string_literal("family-menu"),
            "Producer" => Object::string_literal(concat!("family-menu ", env!("CARGO_PKG_VERSION"))),
        });
        self.doc.trailer.set("Info", info_id);

        let mut bytes = Vec::new();
        self.doc
            .save_to(&mut bytes)
            .map_err(|e| PdfError::Write(e.to_string()))?;

        tracing::debug!(pages = page_count, bytes = bytes.len(), "PDF serialized");
        Ok(bytes)
    }
}

fn color_op(operator: &str, color: Color) -> Operation {
    let [r, g, b] = color.components();
    Operation::new(
        operator,
        vec![Object::Real(r), Object::Real(g), Object::Real(b)],
    )
}

/// Font names may not contain PDF delimiters or whitespace.
fn base_font_name(name: &str) -> Vec<u8> {
    name.chars()
        .filter(|c| c.is_ascii_graphic() && !"()<>[]{}/%#".contains(*c))
        .collect::<String>()
        .into_bytes()
}

/// Write the `Type0` font at `id`: the whole TrueType program as `FontFile2`,
/// a `CIDFontType2` descendant with the widths of the `used` glyphs, and a
/// `ToUnicode` map so text can be extracted again.
fn embed_type0(doc: &mut Document, id: ObjectId, font: &RegisteredFont, used: &BTreeMap<u16, (u16, char)>) {
    let base_font = base_font_name(&font.name);

    let mut file_dict = Dictionary::new();
    file_dict.set(b"Length1", Object::Integer(font.data.len() as i64));
    let file_id = doc.add_object(Stream::new(file_dict, font.data.clone()));

    // Symbolic (4), plus Italic (64).
    let flags = if font.italic { 4 | 64 } else { 4 };
    let bbox = font.bbox.iter().map(|&v| Object::Integer(i64::from(v))).collect::<Vec<_>>();

    let mut descriptor = Dictionary::new();
    descriptor.set(b"Type", Object::Name(b"FontDescriptor".to_vec()));
    descriptor.set(b"FontName", Object::Name(base_font.clone()));
    descriptor.set(b"Flags", Object::Integer(flags));
    descriptor.set(b"FontBBox", Object::Array(bbox));
    descriptor.set(b"ItalicAngle", Object::Real(font.italic_angle));
    descriptor.set(b"Ascent", Object::Integer(i64::from(font.ascent)));
    descriptor.set(b"Descent", Object::Integer(i64::from(font.descent)));
    descriptor.set(b"CapHeight", Object::Integer(i64::from(font.cap_height)));
    descriptor.set(b"StemV", Object::Integer(80));
    descriptor.set(b"FontFile2", Object::Reference(file_id));
    let descriptor_id = doc.add_object(Object::Dictionary(descriptor));

    // `[gid [width]]` pairs.
    let mut widths = Vec::with_capacity(used.len() * 2);
    for (&gid, &(width, _)) in used {
        widths.push(Object::Integer(i64::from(gid)));
        widths.push(Object::Array(vec![Object::Integer(i64::from(width))]));
    }

    let cid_font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "CIDFontType2",
        "BaseFont" => Object::Name(base_font.clone()),
        "CIDSystemInfo" => dictionary! {
            "Registry" => Object::string_literal("Adobe"),
            "Ordering" => Object::string_literal("Identity"),
            "Supplement" => 0,
        },
        "FontDescriptor" => descriptor_id,
        "W" => widths,
        "CIDToGIDMap" => "Identity",
    });

    let to_unicode_id = doc.add_object(Stream::new(Dictionary::new(), to_unicode_cmap(used).into_bytes()));

    doc.objects.insert(
        id,
        Object::Dictionary(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type0",
            "BaseFont" => Object::Name(base_font),
            "Encoding" => "Identity-H",
            "DescendantFonts" => vec![Object::Reference(cid_font_id)],
            "ToUnicode" => to_unicode_id,
        }),
    );
    tracing::debug!(font = %font.name, glyphs = used.len(), "embedded TrueType font");
}

/// A CMap from two-byte glyph ids back to UTF-16BE.
fn to_unicode_cmap(used: &BTreeMap<u16, (u16, char)>) -> String {
    let mut cmap = String::from(
        "/CIDInit /ProcSet findresource begin\n\
         12 dict begin\n\
         begincmap\n\
         /CIDSystemInfo << /Registry (Adobe) /Ordering (UCS) /Supplement 0 >> def\n\
         /CMapName /Adobe-Identity-UCS def\n\
         /CMapType 2 def\n\
         1 begincodespacerange\n<0000> <FFFF>\nendcodespacerange\n",
    );

    let entries: Vec<(u16, char)> = used.iter().map(|(&gid, &(_, ch))| (gid, ch)).collect();
    // At most 100 entries per block.
    for chunk in entries.chunks(100) {
        let _ = writeln!(cmap, "{} beginbfchar", chunk.len());
        for &(gid, ch) in chunk {
            let mut units = [0u16; 2];
            let unicode: String = ch
                .encode_utf16(&mut units)
                .iter()
                .map(|unit| format!("{unit:04X}"))
                .collect();
            let _ = writeln!(cmap, "<{gid:04X}> <{unicode}>");
        }
        cmap.push_str("endbfchar\n");
    }

    cmap.push_str("endcmap\nCMapName currentdict /CMap defineresource pop\nend\nend\n");
    cmap
}
