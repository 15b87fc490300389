//! # Weather Watch Face Core Library
//!
//! This library implements a digital watch face that shows the time, the date and
//! the latest weather forecast pushed from a paired phone. It is deliberately
//! host-agnostic: the wearable runtime drives it through lifecycle hooks and hands
//! it capabilities (a time source, a drawing surface, a sync channel) instead of
//! the face reaching into any platform SDK.
//!
//! ## Design Philosophy
//!
//! ### Explicit State Machine
//! The host owns the lifecycle. [`engine::WatchFaceEngine`] receives visibility,
//! ambient, inset and property callbacks and derives everything else from them:
//! whether the one-second redraw timer runs, which text styles apply, whether
//! the sync channel is connected.
//!
//! ### Immutable Weather Snapshots
//! Sync events never mutate the weather shown on screen in place. Each update
//! produces a new [`WeatherSnapshot`] that replaces the previous one wholesale,
//! so a redraw always sees a consistent set of fields.
//!
//! ### Stateless Rendering
//! [`render::render_face`] is a pure function of its inputs. It draws through the
//! [`render::Canvas`] trait, which is implemented for any embedded-graphics
//! `DrawTarget<Color = Rgb565>` and by a recording canvas for tests.
//!
//! ## Data Flow
//! 1. **Lifecycle**: host callbacks → engine → start/stop the update timer
//! 2. **Tick**: timer fires → redraw requested → host calls `on_draw`
//! 3. **Draw**: format time/date → read weather snapshot → render pass
//! 4. **Sync**: data events → weather update → new snapshot → redraw requested
//!
//! ## Core Types
//! - [`FaceMode`]: interactive or ambient rendering
//! - [`WeatherSnapshot`]: the forecast currently on screen

pub mod clock;
pub mod config;
pub mod engine;
pub mod framebuffer;
pub mod icons;
pub mod layout;
pub mod render;
pub mod sync;
pub mod weather;

pub use icons::IconImage;

/// Rendering mode of the watch face.
///
/// Ambient mode is the low-power, always-on state: black background, no
/// weather icon and no per-second redraws.
///
/// # Example
/// ```
/// use watchface_lib::FaceMode;
///
/// assert_eq!(FaceMode::from_ambient(true), FaceMode::Ambient);
/// assert!(!FaceMode::Interactive.is_ambient());
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FaceMode {
    #[default]
    Interactive,
    Ambient,
}

impl FaceMode {
    pub fn from_ambient(ambient: bool) -> Self {
        if ambient {
            FaceMode::Ambient
        } else {
            FaceMode::Interactive
        }
    }

    pub fn is_ambient(self) -> bool {
        self == FaceMode::Ambient
    }
}

/// The weather forecast currently shown on the face.
///
/// Temperatures arrive pre-formatted from the phone (e.g. `"75°"`), so they are
/// kept as strings. `icon` is derived from `condition_id` when the update is
/// applied, already scaled to the temperature text height.
///
/// # Example
/// ```
/// use watchface_lib::WeatherSnapshot;
///
/// let empty = WeatherSnapshot::default();
/// assert!(empty.temperatures().is_none());
///
/// let snapshot = WeatherSnapshot {
///     high: Some("75°".to_string()),
///     low: Some("60°".to_string()),
///     condition_id: 800,
///     icon: None,
/// };
/// assert_eq!(snapshot.temperatures(), Some(("75°", "60°")));
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WeatherSnapshot {
    /// Forecast high, formatted by the phone
    pub high: Option<String>,
    /// Forecast low, formatted by the phone
    pub low: Option<String>,
    /// OpenWeatherMap condition code, 0 when unknown
    pub condition_id: i32,
    /// Condition icon scaled to the temperature font size
    pub icon: Option<IconImage>,
}

impl WeatherSnapshot {
    /// Both temperatures, or `None` unless high and low are known.
    pub fn temperatures(&self) -> Option<(&str, &str)> {
        match (&self.high, &self.low) {
            (Some(high), Some(low)) => Some((high.as_str(), low.as_str())),
            _ => None,
        }
    }
}
