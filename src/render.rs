//! # Watch Face Render Pass
//!
//! Draws one frame: background, time, date and, when a forecast is known, the
//! divider and weather block. Rendering reads only its inputs and never touches
//! engine state, so the same frame can be drawn any number of times.
//!
//! ## Layout
//! Every text element is horizontally centered on the bounds; vertical
//! positions come from [`DisplayMetrics`]. The weather block differs by mode:
//!
//! ```text
//! Interactive:   [icon] 30px [ high ] 20px low      (high centered)
//! Ambient:              [ high 20px low ]           (pair centered, no icon)
//! ```
//!
//! ## Drawing Surfaces
//! Output goes through the [`Canvas`] trait. [`GraphicsCanvas`] adapts any
//! embedded-graphics `DrawTarget<Color = Rgb565>`; [`RecordingCanvas`] captures
//! the draw calls for inspection.

use embedded_graphics::{
    mono_font::{MonoFont, MonoTextStyle},
    pixelcolor::{Rgb565, RgbColor},
    prelude::*,
    primitives::{Line, PrimitiveStyle, Rectangle},
    text::{renderer::TextRenderer, Baseline, Text},
};
use profont::{
    PROFONT_10_POINT, PROFONT_12_POINT, PROFONT_14_POINT, PROFONT_18_POINT, PROFONT_24_POINT,
    PROFONT_7_POINT, PROFONT_9_POINT,
};

use crate::{layout::DisplayMetrics, FaceMode, IconImage, WeatherSnapshot};

/// Half the divider line length.
pub const DIVIDER_HALF_WIDTH: i32 = 20;
/// Space between the high and low temperatures.
pub const TEMP_GAP: i32 = 20;
/// Space between the weather icon and the high temperature.
pub const ICON_GAP: i32 = 30;

/// Background in ambient mode.
pub const AMBIENT_BACKGROUND: Rgb565 = Rgb565::BLACK;

/// Theme colors, already converted to the display format.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Palette {
    pub primary: Rgb565,
    pub primary_text: Rgb565,
    pub secondary_text: Rgb565,
    pub ambient_text: Rgb565,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FontWeight {
    Normal,
    Bold,
}

/// How a piece of text is drawn.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TextStyle {
    pub color: Rgb565,
    /// Text height in pixels
    pub size: u32,
    pub weight: FontWeight,
    pub anti_alias: bool,
}

impl TextStyle {
    fn new(color: Rgb565, size: u32, weight: FontWeight) -> Self {
        Self {
            color,
            size,
            weight,
            anti_alias: true,
        }
    }
}

/// Every text style the face uses, sized for the current display shape.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TextStyles {
    pub time: TextStyle,
    pub date: TextStyle,
    pub date_ambient: TextStyle,
    pub high: TextStyle,
    pub low: TextStyle,
    pub low_ambient: TextStyle,
}

impl TextStyles {
    pub fn new(palette: &Palette, metrics: &DisplayMetrics) -> Self {
        Self {
            time: TextStyle::new(palette.secondary_text, metrics.time_size, FontWeight::Bold),
            date: TextStyle::new(palette.primary_text, metrics.date_size, FontWeight::Normal),
            date_ambient: TextStyle::new(
                palette.ambient_text,
                metrics.date_size,
                FontWeight::Normal,
            ),
            high: TextStyle::new(palette.secondary_text, metrics.temp_size, FontWeight::Bold),
            low: TextStyle::new(palette.primary_text, metrics.temp_size, FontWeight::Normal),
            low_ambient: TextStyle::new(
                palette.ambient_text,
                metrics.temp_size,
                FontWeight::Normal,
            ),
        }
    }
}

/// A 2D drawing surface.
///
/// Text origins are the left end of the baseline.
pub trait Canvas {
    fn fill(&mut self, area: Rectangle, color: Rgb565);
    fn draw_text(&mut self, text: &str, origin: Point, style: &TextStyle);
    fn draw_line(&mut self, from: Point, to: Point, color: Rgb565);
    fn draw_image(&mut self, image: &IconImage, top_left: Point);
    /// Advance width of `text` in pixels.
    fn measure_text(&self, text: &str, style: &TextStyle) -> i32;
}

/// Everything one frame depends on.
#[derive(Clone, Copy, Debug)]
pub struct Frame<'a> {
    pub bounds: Rectangle,
    pub mode: FaceMode,
    pub metrics: &'a DisplayMetrics,
    pub styles: &'a TextStyles,
    pub palette: &'a Palette,
    pub weather: &'a WeatherSnapshot,
    pub time: &'a str,
    pub date: &'a str,
}

/// Midpoint of `bounds` as `(left + right) / 2`, so even widths center on the
/// right-hand middle column.
fn horizontal_center(bounds: &Rectangle) -> i32 {
    bounds.top_left.x + bounds.size.width as i32 / 2
}

/// Draw one frame of the face.
pub fn render_face<C: Canvas + ?Sized>(canvas: &mut C, frame: &Frame<'_>) {
    let ambient = frame.mode.is_ambient();
    let styles = frame.styles;
    let metrics = frame.metrics;
    let center_x = horizontal_center(&frame.bounds);

    let background = if ambient {
        AMBIENT_BACKGROUND
    } else {
        frame.palette.primary
    };
    canvas.fill(frame.bounds, background);

    let time_w = canvas.measure_text(frame.time, &styles.time);
    canvas.draw_text(
        frame.time,
        Point::new(center_x - time_w / 2, metrics.time_y),
        &styles.time,
    );

    // Measured with the interactive style in both modes so the date never shifts
    let date_w = canvas.measure_text(frame.date, &styles.date);
    let date_style = if ambient {
        &styles.date_ambient
    } else {
        &styles.date
    };
    canvas.draw_text(
        frame.date,
        Point::new(center_x - date_w / 2, metrics.date_y),
        date_style,
    );

    let Some((high, low)) = frame.weather.temperatures() else {
        return;
    };

    canvas.draw_line(
        Point::new(center_x - DIVIDER_HALF_WIDTH, metrics.divider_y),
        Point::new(center_x + DIVIDER_HALF_WIDTH, metrics.divider_y),
        styles.date.color,
    );

    let high_w = canvas.measure_text(high, &styles.high);
    if ambient {
        // No icon in ambient, so center the pair as a whole
        let low_w = canvas.measure_text(low, &styles.low);
        let high_x = center_x - (high_w + low_w + TEMP_GAP) / 2;
        canvas.draw_text(high, Point::new(high_x, metrics.temp_y), &styles.high);
        canvas.draw_text(
            low,
            Point::new(high_x + high_w + TEMP_GAP, metrics.temp_y),
            &styles.low_ambient,
        );
    } else {
        canvas.draw_text(
            high,
            Point::new(center_x - high_w / 2, metrics.temp_y),
            &styles.high,
        );
        canvas.draw_text(
            low,
            Point::new(center_x + high_w / 2 + TEMP_GAP, metrics.temp_y),
            &styles.low,
        );
        if let Some(icon) = &frame.weather.icon {
            let icon_x = center_x - (high_w / 2 + icon.width() as i32 + ICON_GAP);
            let icon_y = metrics.icon_y - icon.height() as i32;
            canvas.draw_image(icon, Point::new(icon_x, icon_y));
        }
    }
}

/// The ProFont face closest to `size` without exceeding it.
///
/// Sizes smaller than every face get the smallest one.
pub fn font_for_size(size: u32) -> &'static MonoFont<'static> {
    let fonts: [&'static MonoFont<'static>; 7] = [
        &PROFONT_7_POINT,
        &PROFONT_9_POINT,
        &PROFONT_10_POINT,
        &PROFONT_12_POINT,
        &PROFONT_14_POINT,
        &PROFONT_18_POINT,
        &PROFONT_24_POINT,
    ];
    fonts
        .iter()
        .rev()
        .find(|font| font.character_size.height <= size)
        .copied()
        .unwrap_or(fonts[0])
}

/// [`Canvas`] over an embedded-graphics draw target.
///
/// Bold text is emulated by overstriking one pixel to the right. Mono fonts
/// are never anti-aliased, so `TextStyle::anti_alias` has no effect here.
pub struct GraphicsCanvas<'a, D> {
    target: &'a mut D,
}

impl<'a, D> GraphicsCanvas<'a, D>
where
    D: DrawTarget<Color = Rgb565>,
{
    pub fn new(target: &'a mut D) -> Self {
        Self { target }
    }
}

impl<D> Canvas for GraphicsCanvas<'_, D>
where
    D: DrawTarget<Color = Rgb565>,
{
    fn fill(&mut self, area: Rectangle, color: Rgb565) {
        self.target.fill_solid(&area, color).ok();
    }

    fn draw_text(&mut self, text: &str, origin: Point, style: &TextStyle) {
        let character_style = MonoTextStyle::new(font_for_size(style.size), style.color);
        Text::with_baseline(text, origin, character_style, Baseline::Alphabetic)
            .draw(self.target)
            .ok();
        if style.weight == FontWeight::Bold {
            Text::with_baseline(
                text,
                origin + Point::new(1, 0),
                character_style,
                Baseline::Alphabetic,
            )
            .draw(self.target)
            .ok();
        }
    }

    fn draw_line(&mut self, from: Point, to: Point, color: Rgb565) {
        Line::new(from, to)
            .into_styled(PrimitiveStyle::with_stroke(color, 1))
            .draw(self.target)
            .ok();
    }

    fn draw_image(&mut self, image: &IconImage, top_left: Point) {
        self.target
            .draw_iter(
                image
                    .opaque_pixels()
                    .map(|Pixel(point, color)| Pixel(point + top_left, color)),
            )
            .ok();
    }

    fn measure_text(&self, text: &str, style: &TextStyle) -> i32 {
        let character_style = MonoTextStyle::new(font_for_size(style.size), style.color);
        let width = character_style
            .measure_string(text, Point::zero(), Baseline::Alphabetic)
            .next_position
            .x;
        match style.weight {
            FontWeight::Bold if width > 0 => width + 1,
            _ => width,
        }
    }
}

/// A single recorded draw call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DrawOp {
    Fill {
        area: Rectangle,
        color: Rgb565,
    },
    Text {
        text: String,
        origin: Point,
        style: TextStyle,
    },
    Line {
        from: Point,
        to: Point,
        color: Rgb565,
    },
    Image {
        top_left: Point,
        size: Size,
    },
}

/// [`Canvas`] that records draw calls instead of rasterizing them.
///
/// Text is measured as `chars * size / 2` pixels, a fixed-pitch approximation
/// that keeps layout arithmetic easy to check.
#[derive(Clone, Debug, Default)]
pub struct RecordingCanvas {
    ops: Vec<DrawOp>,
}

impl RecordingCanvas {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    /// Origin of the first text op drawing exactly `text`.
    pub fn text_origin(&self, text: &str) -> Option<Point> {
        self.ops.iter().find_map(|op| match op {
            DrawOp::Text { text: t, origin, .. } if t == text => Some(*origin),
            _ => None,
        })
    }

    pub fn lines(&self) -> impl Iterator<Item = &DrawOp> {
        self.ops.iter().filter(|op| matches!(op, DrawOp::Line { .. }))
    }

    pub fn images(&self) -> impl Iterator<Item = &DrawOp> {
        self.ops.iter().filter(|op| matches!(op, DrawOp::Image { .. }))
    }
}

impl Canvas for RecordingCanvas {
    fn fill(&mut self, area: Rectangle, color: Rgb565) {
        self.ops.push(DrawOp::Fill { area, color });
    }

    fn draw_text(&mut self, text: &str, origin: Point, style: &TextStyle) {
        self.ops.push(DrawOp::Text {
            text: text.to_string(),
            origin,
            style: *style,
        });
    }

    fn draw_line(&mut self, from: Point, to: Point, color: Rgb565) {
        self.ops.push(DrawOp::Line { from, to, color });
    }

    fn draw_image(&mut self, image: &IconImage, top_left: Point) {
        self.ops.push(DrawOp::Image {
            top_left,
            size: Size::new(image.width(), image.height()),
        });
    }

    fn measure_text(&self, text: &str, style: &TextStyle) -> i32 {
        (text.chars().count() as u32 * style.size / 2) as i32
    }
}
