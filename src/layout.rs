//! The menu layout pass.
//!
//! Everything is drawn at fixed offsets from a cursor that only moves down the
//! page. Before each meal the cursor is checked against a 2 inch floor and a
//! new page is started when it is below it. The check does not look at how
//! many lines the meal will take, so a long meal near the bottom can still run
//! past the floor before the next break.
//!
//! Coordinates are PDF points with the origin at the bottom-left corner.

use serde::Serialize;

use crate::fonts::{FontSet, ResolvedFont, ResolvedFonts};
use crate::menu::{Meal, Menu};
use crate::theme::{Color, Theme};

/// Points per inch.
pub const INCH: f32 = 72.0;

/// Notes longer than this many characters are cut.
pub const NOTE_MAX_CHARS: usize = 60;
/// Characters kept from a cut note, before the ellipsis.
pub const NOTE_KEEP_CHARS: usize = 57;
pub const ELLIPSIS: &str = "...";

pub const BULLET: &str = "\u{2022} ";
pub const CLOCK: &str = "\u{23F1} ";
pub const FOOTER_SUFFIX: &str = "Generated with \u{2764}\u{FE0F}";
pub const FOOTER_FONT_SIZE: f32 = 7.0;

const TITLE_TOP: f32 = 1.2 * INCH;
const CONTINUATION_TOP: f32 = 1.0 * INCH;
const PAGE_BREAK_FLOOR: f32 = 2.0 * INCH;
const FOOTER_Y: f32 = 0.5 * INCH;

const DIVIDER_INSET: f32 = 1.5 * INCH;
const DIVIDER_WIDTH: f32 = 2.0;
const UNDERLINE_WIDTH: f32 = 1.5;

const DAY_X: f32 = 1.0 * INCH;
const UNDERLINE_END_X: f32 = 3.0 * INCH;
const MEAL_X: f32 = 1.2 * INCH;
const DETAIL_X: f32 = 1.4 * INCH;

const AFTER_TITLE: f32 = 0.4 * INCH;
const AFTER_SUBTITLE: f32 = 0.3 * INCH;
const AFTER_DIVIDER: f32 = 0.5 * INCH;
const AFTER_DAY: f32 = 0.05 * INCH;
const AFTER_UNDERLINE: f32 = 0.25 * INCH;
const AFTER_MEAL: f32 = 0.2 * INCH;
const AFTER_DETAIL: f32 = 0.18 * INCH;
const BETWEEN_MEALS: f32 = 0.15 * INCH;

/// Page size in points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PageSize {
    pub width: f32,
    pub height: f32,
}

impl PageSize {
    /// US letter, 8.5 x 11 in.
    pub const LETTER: PageSize = PageSize {
        width: 8.5 * INCH,
        height: 11.0 * INCH,
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Align {
    Left,
    /// `x` is the horizontal center of the text.
    Center,
}

/// A page-oriented drawing target.
///
/// The surface starts on its first page. Color, width and font settings stay
/// in effect until changed, including across page breaks.
pub trait Surface {
    type Output;
    type Error;

    fn set_fill_color(&mut self, color: Color);
    fn set_stroke_color(&mut self, color: Color);
    fn set_line_width(&mut self, width: f32);
    fn set_font(&mut self, name: &str, size: f32);
    /// Fill a rectangle with the current fill color.
    fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32);
    /// Draw a single line of text with the current font and fill color.
    fn draw_text(&mut self, x: f32, y: f32, text: &str, align: Align);
    /// Stroke a line with the current stroke color and width.
    fn draw_line(&mut self, x1: f32, y1: f32, x2: f32, y2: f32);
    fn new_page(&mut self);
    /// Finish the document.
    fn finish(self) -> Result<Self::Output, Self::Error>;
}

/// Cursor and page geometry for one layout pass.
struct RenderState {
    page: PageSize,
    y: f32,
    pages: usize,
}

impl RenderState {
    fn new(page: PageSize) -> Self {
        Self {
            page,
            y: page.height - TITLE_TOP,
            pages: 1,
        }
    }

    fn advance(&mut self, by: f32) {
        self.y -= by;
    }
}

/// Summary of a finished layout pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutStats {
    pub pages: usize,
    pub meals: usize,
}

/// Lay out `menu` with `theme` onto `surface`.
///
/// Fonts are resolved against `fonts` once for the whole pass. The surface is
/// not finished; the caller decides what to do with it.
pub fn layout_menu<S: Surface>(
    menu: &Menu,
    theme: &Theme,
    fonts: &FontSet,
    page: PageSize,
    surface: &mut S,
) -> LayoutStats {
    let fonts = ResolvedFonts::resolve(theme, fonts);
    let palette = &theme.palette;
    let mut state = RenderState::new(page);

    paint_background(surface, theme, page);

    set_font(surface, fonts.title);
    surface.set_fill_color(palette.header);
    surface.draw_text(page.width / 2.0, state.y, menu.title(), Align::Center);
    state.advance(AFTER_TITLE);

    set_font(surface, fonts.subtitle);
    surface.set_fill_color(palette.text);
    surface.draw_text(page.width / 2.0, state.y, &menu.subtitle(), Align::Center);
    state.advance(AFTER_SUBTITLE);

    surface.set_stroke_color(palette.accent);
    surface.set_line_width(DIVIDER_WIDTH);
    surface.draw_line(DIVIDER_INSET, state.y, page.width - DIVIDER_INSET, state.y);
    state.advance(AFTER_DIVIDER);

    for meal in &menu.meals {
        if state.y < PAGE_BREAK_FLOOR {
            surface.new_page();
            paint_background(surface, theme, page);
            state.y = page.height - CONTINUATION_TOP;
            state.pages += 1;
            tracing::debug!(page = state.pages, day = %meal.day, "page break");
        }
        draw_meal(surface, theme, &fonts, &mut state, meal);
    }

    set_font(
        surface,
        ResolvedFont {
            name: fonts.detail.name,
            size: FOOTER_FONT_SIZE,
        },
    );
    surface.set_fill_color(palette.text);
    surface.draw_text(page.width / 2.0, FOOTER_Y, &footer_text(theme), Align::Center);

    LayoutStats {
        pages: state.pages,
        meals: menu.meals.len(),
    }
}

fn draw_meal<S: Surface>(
    surface: &mut S,
    theme: &Theme,
    fonts: &ResolvedFonts,
    state: &mut RenderState,
    meal: &Meal,
) {
    let palette = &theme.palette;

    set_font(surface, fonts.day);
    surface.set_fill_color(palette.day);
    surface.draw_text(DAY_X, state.y, &meal.day, Align::Left);
    state.advance(AFTER_DAY);

    surface.set_stroke_color(palette.accent);
    surface.set_line_width(UNDERLINE_WIDTH);
    surface.draw_line(DAY_X, state.y, UNDERLINE_END_X, state.y);
    state.advance(AFTER_UNDERLINE);

    set_font(surface, fonts.meal);
    surface.set_fill_color(palette.text);
    surface.draw_text(MEAL_X, state.y, &format!("{BULLET}{}", meal.name), Align::Left);
    state.advance(AFTER_MEAL);

    if let Some(protein) = meal.protein() {
        set_font(surface, fonts.detail);
        surface.set_fill_color(palette.accent);
        surface.draw_text(DETAIL_X, state.y, &format!("Protein: {protein}"), Align::Left);
        state.advance(AFTER_DETAIL);
    }

    if let Some(prep_time) = meal.prep_time() {
        set_font(surface, fonts.detail);
        surface.set_fill_color(palette.text);
        surface.draw_text(DETAIL_X, state.y, &format!("{CLOCK}{prep_time}"), Align::Left);
        state.advance(AFTER_DETAIL);
    }

    if let Some(notes) = meal.notes() {
        set_font(
            surface,
            ResolvedFont {
                name: fonts.detail.name,
                size: fonts.detail.size - 1.0,
            },
        );
        surface.set_fill_color(palette.text);
        let note = truncate_note(notes);
        surface.draw_text(DETAIL_X, state.y, &format!("Note: {note}"), Align::Left);
        state.advance(AFTER_DETAIL);
    }

    state.advance(BETWEEN_MEALS);
}

fn paint_background<S: Surface>(surface: &mut S, theme: &Theme, page: PageSize) {
    surface.set_fill_color(theme.palette.background);
    surface.fill_rect(0.0, 0.0, page.width, page.height);
}

fn set_font<S: Surface>(surface: &mut S, font: ResolvedFont) {
    surface.set_font(font.name, font.size);
}

/// Cut notes longer than 60 characters to 57 characters plus `...`.
///
/// Single line only; there is no word wrapping.
pub fn truncate_note(notes: &str) -> String {
    if notes.chars().count() > NOTE_MAX_CHARS {
        let mut cut: String = notes.chars().take(NOTE_KEEP_CHARS).collect();
        cut.push_str(ELLIPSIS);
        cut
    } else {
        notes.to_string()
    }
}

/// Footer line naming the theme, e.g. `Menu style: Rustic • Generated with ❤️`.
pub fn footer_text(theme: &Theme) -> String {
    format!("Menu style: {} {BULLET}{FOOTER_SUFFIX}", theme.display_name())
}
