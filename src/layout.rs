//! Screen geometry: device shape and the offsets and text sizes derived from it.

use crate::config::LayoutConfig;

/// Largest text height a layout may request, in pixels.
pub const MAX_TEXT_SIZE: u32 = 240;

/// Physical display outline, reported by the host through window insets.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Shape {
    #[default]
    Square,
    Round,
}

/// Window insets delivered by the host once the surface is attached.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WindowInsets {
    pub is_round: bool,
}

impl WindowInsets {
    pub fn shape(&self) -> Shape {
        if self.is_round {
            Shape::Round
        } else {
            Shape::Square
        }
    }
}

/// Vertical offsets (text baselines) and text sizes for one display shape.
///
/// All values are in pixels. `icon_y` is where the bottom edge of the weather
/// icon sits.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DisplayMetrics {
    pub time_y: i32,
    pub date_y: i32,
    pub divider_y: i32,
    pub temp_y: i32,
    pub icon_y: i32,
    pub time_size: u32,
    pub date_size: u32,
    pub temp_size: u32,
}

impl DisplayMetrics {
    pub fn for_shape(shape: Shape, layout: &LayoutConfig) -> Self {
        let sizes = match shape {
            Shape::Square => &layout.square,
            Shape::Round => &layout.round,
        };

        DisplayMetrics {
            time_y: layout.time_y,
            date_y: layout.date_y,
            divider_y: layout.divider_y,
            temp_y: layout.temp_y,
            icon_y: layout.icon_y,
            time_size: sizes.time_size.min(MAX_TEXT_SIZE),
            date_size: sizes.date_size.min(MAX_TEXT_SIZE),
            temp_size: sizes.temp_size.min(MAX_TEXT_SIZE),
        }
    }
}
