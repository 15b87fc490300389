//! # Weather Condition Icons
//!
//! Maps OpenWeatherMap condition codes to icon art and owns the raster type the
//! face draws. Icons are produced by an [`IconProvider`] so a host can supply
//! its own artwork; [`BuiltinIcons`] draws simple procedural icons with
//! embedded-graphics primitives.

use embedded_graphics::{
    pixelcolor::Rgb565,
    prelude::*,
    primitives::{Circle, Line, PrimitiveStyle, Rectangle, Triangle},
};

/// An owned raster image with per-pixel transparency.
///
/// `None` pixels are transparent and skipped when the image is drawn.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IconImage {
    width: u32,
    height: u32,
    pixels: Vec<Option<Rgb565>>,
}

impl IconImage {
    /// A fully transparent image.
    pub fn blank(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![None; width as usize * height as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgb565> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels[self.index(x, y)]
    }

    /// Opaque pixels with their position relative to the top-left corner.
    pub fn opaque_pixels(&self) -> impl Iterator<Item = Pixel<Rgb565>> + '_ {
        let width = self.width.max(1);
        self.pixels.iter().enumerate().filter_map(move |(i, px)| {
            let i = i as u32;
            px.map(|color| Pixel(Point::new((i % width) as i32, (i / width) as i32), color))
        })
    }

    /// Rescale to `target_height`, keeping the aspect ratio.
    ///
    /// The new width is `target_height / height * width`, truncated. Sampling is
    /// nearest-neighbour.
    pub fn scaled_to_height(&self, target_height: u32) -> IconImage {
        if self.height == 0 || self.width == 0 {
            return IconImage::blank(0, 0);
        }

        let scale = target_height as f32 / self.height as f32;
        let target_width = (scale * self.width as f32) as u32;
        let mut scaled = IconImage::blank(target_width, target_height);

        for y in 0..target_height {
            let src_y = ((y as u64 * self.height as u64) / target_height as u64) as u32;
            for x in 0..target_width {
                let src_x = ((x as u64 * self.width as u64) / target_width as u64) as u32;
                let idx = scaled.index(x, y);
                scaled.pixels[idx] = self.pixel(src_x, src_y);
            }
        }

        scaled
    }
}

impl OriginDimensions for IconImage {
    fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }
}

impl DrawTarget for IconImage {
    type Color = Rgb565;
    type Error = core::convert::Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            if point.x >= 0
                && point.y >= 0
                && (point.x as u32) < self.width
                && (point.y as u32) < self.height
            {
                let idx = self.index(point.x as u32, point.y as u32);
                self.pixels[idx] = Some(color);
            }
        }
        Ok(())
    }
}

/// Lookup from weather condition code to icon artwork.
pub trait IconProvider {
    /// Icon for `condition_id`, or `None` when the code is not mapped.
    fn icon_for(&self, condition_id: i32) -> Option<IconImage>;
}

/// Icon families for OpenWeatherMap condition codes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WeatherIcon {
    Storm,
    LightRain,
    Rain,
    Snow,
    Fog,
    Clear,
    LightClouds,
    Cloudy,
}

impl WeatherIcon {
    /// Map a condition code (see openweathermap.org/weather-conditions).
    pub fn for_condition(condition_id: i32) -> Option<Self> {
        match condition_id {
            200..=232 => Some(WeatherIcon::Storm),
            300..=321 => Some(WeatherIcon::LightRain),
            500..=504 => Some(WeatherIcon::Rain),
            511 => Some(WeatherIcon::Snow),
            520..=531 => Some(WeatherIcon::Rain),
            600..=622 => Some(WeatherIcon::Snow),
            701..=761 => Some(WeatherIcon::Fog),
            781 => Some(WeatherIcon::Storm),
            800 => Some(WeatherIcon::Clear),
            801 => Some(WeatherIcon::LightClouds),
            802..=804 => Some(WeatherIcon::Cloudy),
            _ => None,
        }
    }
}

const SUN: Rgb565 = Rgb565::new(31, 52, 0);
const CLOUD: Rgb565 = Rgb565::new(26, 54, 28);
const STORM_CLOUD: Rgb565 = Rgb565::new(14, 28, 15);
const RAIN: Rgb565 = Rgb565::new(6, 36, 31);

/// Procedurally drawn icons, rendered at `size` x `size` pixels.
///
/// The artwork is intentionally larger than it is ever displayed; the weather
/// store scales it down to the temperature font height.
#[derive(Clone, Copy, Debug)]
pub struct BuiltinIcons {
    pub size: u32,
}

impl Default for BuiltinIcons {
    fn default() -> Self {
        Self { size: 48 }
    }
}

impl IconProvider for BuiltinIcons {
    fn icon_for(&self, condition_id: i32) -> Option<IconImage> {
        WeatherIcon::for_condition(condition_id).map(|icon| self.draw(icon))
    }
}

impl BuiltinIcons {
    /// Render the artwork for `icon`.
    pub fn draw(&self, icon: WeatherIcon) -> IconImage {
        let s = self.size as i32;
        let mut image = IconImage::blank(self.size, self.size);

        match icon {
            WeatherIcon::Clear => {
                Circle::with_center(Point::new(s / 2, s / 2), self.size * 2 / 3)
                    .into_styled(PrimitiveStyle::with_fill(SUN))
                    .draw(&mut image)
                    .ok();
            }
            WeatherIcon::LightClouds => {
                Circle::with_center(Point::new(s / 3, s / 3), self.size / 2)
                    .into_styled(PrimitiveStyle::with_fill(SUN))
                    .draw(&mut image)
                    .ok();
                draw_cloud(&mut image, CLOUD);
            }
            WeatherIcon::Cloudy => draw_cloud(&mut image, CLOUD),
            WeatherIcon::LightRain => {
                draw_cloud(&mut image, CLOUD);
                draw_drops(&mut image, 2);
            }
            WeatherIcon::Rain => {
                draw_cloud(&mut image, CLOUD);
                draw_drops(&mut image, 4);
            }
            WeatherIcon::Snow => {
                draw_cloud(&mut image, CLOUD);
                for i in 1..=3 {
                    Circle::with_center(Point::new(i * s / 4, s * 7 / 8), (self.size / 10).max(2))
                        .into_styled(PrimitiveStyle::with_fill(Rgb565::WHITE))
                        .draw(&mut image)
                        .ok();
                }
            }
            WeatherIcon::Storm => {
                draw_cloud(&mut image, STORM_CLOUD);
                Triangle::new(
                    Point::new(s / 2, s / 2),
                    Point::new(s / 3, s - 1),
                    Point::new(s * 2 / 3, s * 3 / 4),
                )
                .into_styled(PrimitiveStyle::with_fill(SUN))
                .draw(&mut image)
                .ok();
            }
            WeatherIcon::Fog => {
                let stroke = PrimitiveStyle::with_stroke(CLOUD, (self.size / 12).max(1));
                for row in 1..=3 {
                    let y = row * s / 4;
                    Line::new(Point::new(s / 8, y), Point::new(s - s / 8, y))
                        .into_styled(stroke)
                        .draw(&mut image)
                        .ok();
                }
            }
        }

        image
    }
}

/// Two overlapping puffs over a flat base, occupying the upper two thirds.
fn draw_cloud(image: &mut IconImage, color: Rgb565) {
    let size = image.size();
    let s = size.width as i32;
    let fill = PrimitiveStyle::with_fill(color);

    Circle::with_center(Point::new(s * 3 / 8, s * 3 / 8), size.width / 2)
        .into_styled(fill)
        .draw(image)
        .ok();
    Circle::with_center(Point::new(s * 5 / 8, s / 2), size.width * 2 / 5)
        .into_styled(fill)
        .draw(image)
        .ok();
    Rectangle::new(
        Point::new(s / 8, s / 2),
        Size::new(size.width * 3 / 4, size.height / 6),
    )
    .into_styled(fill)
    .draw(image)
    .ok();
}

fn draw_drops(image: &mut IconImage, count: i32) {
    let s = image.size().width as i32;
    let stroke = PrimitiveStyle::with_stroke(RAIN, (s as u32 / 16).max(1));
    for i in 1..=count {
        let x = i * s / (count + 1);
        Line::new(Point::new(x, s * 3 / 4), Point::new(x - s / 12, s - 2))
            .into_styled(stroke)
            .draw(image)
            .ok();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_condition_mapping() {
        assert_eq!(WeatherIcon::for_condition(200), Some(WeatherIcon::Storm));
        assert_eq!(WeatherIcon::for_condition(781), Some(WeatherIcon::Storm));
        assert_eq!(WeatherIcon::for_condition(310), Some(WeatherIcon::LightRain));
        assert_eq!(WeatherIcon::for_condition(502), Some(WeatherIcon::Rain));
        assert_eq!(WeatherIcon::for_condition(511), Some(WeatherIcon::Snow));
        assert_eq!(WeatherIcon::for_condition(761), Some(WeatherIcon::Fog));
        assert_eq!(WeatherIcon::for_condition(800), Some(WeatherIcon::Clear));
        assert_eq!(WeatherIcon::for_condition(801), Some(WeatherIcon::LightClouds));
        assert_eq!(WeatherIcon::for_condition(804), Some(WeatherIcon::Cloudy));
        assert_eq!(WeatherIcon::for_condition(0), None);
        assert_eq!(WeatherIcon::for_condition(999), None);
    }

    #[test]
    fn test_builtin_icons_draw_something() {
        let icons = BuiltinIcons::default();
        for id in [200, 300, 500, 600, 701, 800, 801, 803] {
            let icon = icons.icon_for(id).unwrap();
            assert_eq!((icon.width(), icon.height()), (48, 48));
            assert!(icon.opaque_pixels().count() > 0, "icon for {id} is empty");
        }
        assert!(icons.icon_for(42).is_none());
    }

    #[test]
    fn test_scaling_preserves_aspect_ratio() {
        let wide = IconImage::blank(40, 20);
        let scaled = wide.scaled_to_height(10);
        assert_eq!((scaled.width(), scaled.height()), (20, 10));

        // 24 / 36 * 50 = 33.33, truncated
        let odd = IconImage::blank(50, 36).scaled_to_height(24);
        assert_eq!((odd.width(), odd.height()), (33, 24));
    }

    #[test]
    #[cfg(target_pointer_width = "64")]
    fn test_pixel_index_does_not_wrap_at_u32() {
        let huge = IconImage {
            width: 65_536,
            height: 65_537,
            pixels: Vec::new(),
        };
        assert_eq!(huge.index(0, 65_536), 1 << 32);
        assert_eq!(huge.index(5, 1), 65_541);
    }

    #[test]
    fn test_scaling_samples_source_pixels() {
        let mut image = IconImage::blank(4, 4);
        Rectangle::new(Point::zero(), Size::new(2, 4))
            .into_styled(PrimitiveStyle::with_fill(Rgb565::RED))
            .draw(&mut image)
            .ok();

        let scaled = image.scaled_to_height(8);
        assert_eq!(scaled.pixel(0, 0), Some(Rgb565::RED));
        assert_eq!(scaled.pixel(3, 7), Some(Rgb565::RED));
        assert_eq!(scaled.pixel(4, 0), None);
        assert_eq!(scaled.pixel(7, 7), None);
    }
}
