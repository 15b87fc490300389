//! # Watch Face Engine
//!
//! The lifecycle state machine the host drives. The host owns the surface and
//! calls the `on_*` hooks; the engine answers by requesting redraws, toggling the
//! update timer and connecting or disconnecting the sync channel.
//!
//! ## States
//! ```text
//!            visible=true            ambient=true
//!   Hidden ───────────────► VisibleInteractive ◄──────────► VisibleAmbient
//!          ◄─────────────── (timer running)     ambient=false (timer stopped)
//!            visible=false
//! ```
//!
//! The update timer runs only while visible and interactive. Every callback that
//! can change either flag re-evaluates it: stop, then start again if it should
//! run. A started timer fires immediately and then on each whole second.
//!
//! ## Timer Ownership
//! [`UpdateTimer`] is a plain deadline owned by the engine. The host runtime asks
//! for [`WatchFaceEngine::next_timer_deadline`], sleeps until then and calls
//! [`WatchFaceEngine::on_timer_fired`]. Stopping the timer clears the deadline,
//! so a stale wake-up finds nothing to do.

use embedded_graphics::primitives::Rectangle;
use log::{debug, info, warn};
use std::sync::Arc;

use crate::clock::{format_date, format_time, next_tick_delay, TimeSource, WallTime};
use crate::config::{Config, ConfigError, LayoutConfig};
use crate::icons::IconProvider;
use crate::layout::{DisplayMetrics, Shape, WindowInsets};
use crate::render::{render_face, Canvas, Frame, Palette, TextStyles};
use crate::sync::{DataEvent, SyncChannel, WeatherSyncListener};
use crate::weather::WeatherStore;
use crate::{FaceMode, WeatherSnapshot};

/// Services the host provides to the face.
pub trait FaceHost {
    /// Ask the host to call `on_draw` soon.
    fn invalidate(&mut self);
    fn register_time_zone_receiver(&mut self);
    fn unregister_time_zone_receiver(&mut self);
}

/// Derived lifecycle state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VisibilityState {
    Hidden,
    VisibleInteractive,
    VisibleAmbient,
}

/// Device properties reported by the host.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FaceProperties {
    /// The display uses fewer bits per color channel in ambient mode
    pub low_bit_ambient: bool,
}

/// How far notification cards may cover the face.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PeekMode {
    Short,
    Variable,
}

/// When the host draws a background behind peeking cards.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BackgroundVisibility {
    Interruptive,
    Persistent,
}

/// Presentation hints handed to the host at creation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FaceStyle {
    pub peek_mode: PeekMode,
    pub background_visibility: BackgroundVisibility,
    /// The face draws its own clock
    pub show_system_ui_time: bool,
}

impl Default for FaceStyle {
    fn default() -> Self {
        Self {
            peek_mode: PeekMode::Short,
            background_visibility: BackgroundVisibility::Interruptive,
            show_system_ui_time: false,
        }
    }
}

/// One-shot redraw timer, re-armed on every fire.
///
/// Deadlines are Unix epoch milliseconds.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct UpdateTimer {
    deadline: Option<i64>,
}

impl UpdateTimer {
    /// Arm to fire right away.
    pub fn start(&mut self, now_ms: i64) {
        self.deadline = Some(now_ms);
    }

    pub fn stop(&mut self) {
        self.deadline = None;
    }

    pub fn is_running(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn deadline(&self) -> Option<i64> {
        self.deadline
    }

    /// Arm for the next whole second after `now_ms`.
    pub fn rearm(&mut self, now_ms: i64) {
        self.deadline = Some(now_ms + next_tick_delay(now_ms).as_millis() as i64);
    }
}

/// Everything the engine needs from configuration, already validated.
#[derive(Clone, Debug, PartialEq)]
pub struct FaceSettings {
    pub palette: Palette,
    pub layout: LayoutConfig,
    pub weather_path: String,
    /// The host's 24-hour clock preference
    pub use_24_hour: bool,
}

impl FaceSettings {
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        Ok(Self {
            palette: config.palette.to_palette()?,
            layout: config.layout.clone(),
            weather_path: config.sync.weather_path.clone(),
            use_24_hour: config.clock.use_24_hour,
        })
    }
}

/// The watch face, driven by host lifecycle callbacks.
pub struct WatchFaceEngine<T, S, H, I> {
    settings: FaceSettings,
    clock: T,
    channel: S,
    host: H,
    icons: I,
    listener: WeatherSyncListener,
    weather: WeatherStore,
    wall_time: WallTime,
    timer: UpdateTimer,
    visible: bool,
    mode: FaceMode,
    low_bit_ambient: bool,
    time_zone_registered: bool,
    shape: Shape,
    metrics: DisplayMetrics,
    styles: TextStyles,
}

impl<T, S, H, I> WatchFaceEngine<T, S, H, I>
where
    T: TimeSource,
    S: SyncChannel,
    H: FaceHost,
    I: IconProvider,
{
    pub fn new(settings: FaceSettings, clock: T, channel: S, host: H, icons: I) -> Self {
        let shape = Shape::default();
        let metrics = DisplayMetrics::for_shape(shape, &settings.layout);
        let styles = TextStyles::new(&settings.palette, &metrics);
        let wall_time = WallTime::new(&clock.default_zone());

        Self {
            listener: WeatherSyncListener::new(settings.weather_path.clone()),
            settings,
            clock,
            channel,
            host,
            icons,
            weather: WeatherStore::new(),
            wall_time,
            timer: UpdateTimer::default(),
            visible: false,
            mode: FaceMode::Interactive,
            low_bit_ambient: false,
            time_zone_registered: false,
            shape,
            metrics,
            styles,
        }
    }

    // -- Host lifecycle --

    /// The surface exists; returns the presentation hints for the host.
    pub fn on_create(&mut self) -> FaceStyle {
        info!("watch face created ({:?} layout)", self.shape);
        FaceStyle::default()
    }

    pub fn on_destroy(&mut self) {
        self.timer.stop();
        info!("watch face destroyed");
    }

    pub fn on_visibility_changed(&mut self, visible: bool) {
        self.visible = visible;
        debug!("visibility changed: {visible}");

        if visible {
            self.channel.connect();
            self.register_time_zone_receiver();
            // The zone may have changed while we were hidden
            let zone = self.clock.default_zone();
            self.wall_time = WallTime::new(&zone);
        } else {
            self.unregister_time_zone_receiver();
            if self.channel.is_connected() {
                self.channel.remove_listener();
                self.channel.disconnect();
            }
        }

        self.update_timer();
    }

    /// Window insets arrived; pick the layout for the display shape.
    pub fn on_apply_insets(&mut self, insets: WindowInsets) {
        self.shape = insets.shape();
        self.metrics = DisplayMetrics::for_shape(self.shape, &self.settings.layout);
        self.styles = TextStyles::new(&self.settings.palette, &self.metrics);
        self.apply_time_anti_alias();
        debug!("layout set for {:?} display", self.shape);
    }

    pub fn on_properties_changed(&mut self, properties: FaceProperties) {
        self.low_bit_ambient = properties.low_bit_ambient;
    }

    /// The host's once-a-minute tick, delivered in ambient mode.
    pub fn on_time_tick(&mut self) {
        self.host.invalidate();
    }

    pub fn on_ambient_mode_changed(&mut self, ambient: bool) {
        let mode = FaceMode::from_ambient(ambient);
        if self.mode != mode {
            self.mode = mode;
            self.apply_time_anti_alias();
            self.host.invalidate();
            debug!("mode changed to {mode:?}");
        }

        self.update_timer();
    }

    /// Timezone broadcast from the host.
    pub fn on_time_zone_changed(&mut self, zone_id: &str) {
        if !self.time_zone_registered {
            debug!("ignoring timezone change to {zone_id} while unregistered");
            return;
        }
        info!("time zone changed to {zone_id}");
        self.wall_time = WallTime::new(zone_id);
    }

    /// Host preference change for the clock format.
    pub fn set_use_24_hour(&mut self, use_24_hour: bool) {
        if self.settings.use_24_hour != use_24_hour {
            self.settings.use_24_hour = use_24_hour;
            self.host.invalidate();
        }
    }

    // -- Update timer --

    /// When the host should call [`Self::on_timer_fired`] next, if at all.
    pub fn next_timer_deadline(&self) -> Option<i64> {
        self.timer.deadline()
    }

    pub fn on_timer_fired(&mut self) {
        if !self.timer.is_running() {
            return;
        }

        self.host.invalidate();
        if self.should_timer_run() {
            self.timer.rearm(self.clock.now().timestamp_millis());
        } else {
            self.timer.stop();
        }
    }

    fn should_timer_run(&self) -> bool {
        self.visible && !self.mode.is_ambient()
    }

    fn update_timer(&mut self) {
        self.timer.stop();
        if self.should_timer_run() {
            self.timer.start(self.clock.now().timestamp_millis());
        }
    }

    // -- Sync channel --

    pub fn on_connected(&mut self) {
        debug!("sync channel connected");
        self.channel.add_listener();
    }

    pub fn on_connection_suspended(&mut self, cause: i32) {
        debug!("sync channel suspended (cause {cause})");
    }

    pub fn on_connection_failed(&mut self, reason: &str) {
        warn!("sync channel connection failed: {reason}");
    }

    /// A batch of data events from the phone.
    pub fn on_data_changed(&mut self, events: &[DataEvent]) {
        debug!("data changed: {} event(s)", events.len());
        for update in self.listener.updates(events) {
            self.weather
                .apply_update(update, &self.icons, self.styles.high.size);
            self.host.invalidate();
        }
    }

    // -- Drawing --

    /// Draw the current frame into `bounds`.
    pub fn on_draw<C: Canvas + ?Sized>(&self, canvas: &mut C, bounds: Rectangle) {
        let now = self.wall_time.localize(&self.clock.now());
        let time = format_time(&now, self.settings.use_24_hour);
        let date = format_date(&now);
        let weather = self.weather.snapshot();

        render_face(
            canvas,
            &Frame {
                bounds,
                mode: self.mode,
                metrics: &self.metrics,
                styles: &self.styles,
                palette: &self.settings.palette,
                weather: &weather,
                time: &time,
                date: &date,
            },
        );
    }

    // -- Accessors --

    pub fn state(&self) -> VisibilityState {
        match (self.visible, self.mode) {
            (false, _) => VisibilityState::Hidden,
            (true, FaceMode::Interactive) => VisibilityState::VisibleInteractive,
            (true, FaceMode::Ambient) => VisibilityState::VisibleAmbient,
        }
    }

    pub fn mode(&self) -> FaceMode {
        self.mode
    }

    pub fn shape(&self) -> Shape {
        self.shape
    }

    pub fn metrics(&self) -> &DisplayMetrics {
        &self.metrics
    }

    pub fn styles(&self) -> &TextStyles {
        &self.styles
    }

    pub fn weather(&self) -> Arc<WeatherSnapshot> {
        self.weather.snapshot()
    }

    pub fn wall_time(&self) -> &WallTime {
        &self.wall_time
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn channel(&self) -> &S {
        &self.channel
    }

    // -- Private helpers --

    /// Low-bit ambient displays get aliased time text while ambient.
    fn apply_time_anti_alias(&mut self) {
        if self.low_bit_ambient {
            self.styles.time.anti_alias = !self.mode.is_ambient();
        }
    }

    fn register_time_zone_receiver(&mut self) {
        if self.time_zone_registered {
            return;
        }
        self.time_zone_registered = true;
        self.host.register_time_zone_receiver();
    }

    fn unregister_time_zone_receiver(&mut self) {
        if !self.time_zone_registered {
            return;
        }
        self.time_zone_registered = false;
        self.host.unregister_time_zone_receiver();
    }
}
