//! # Watch Face Scenario Tests
//!
//! These tests drive the engine the way a wearable host would and inspect the
//! draw calls of the resulting frames. They pin the clock so the rendered time
//! and date are known.

use chrono::{TimeZone, Utc};
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;

use watchface_lib::clock::{ManualClock, TimeSource};
use watchface_lib::config::Config;
use watchface_lib::engine::{FaceHost, FaceSettings, WatchFaceEngine};
use watchface_lib::framebuffer::FrameBuffer;
use watchface_lib::icons::BuiltinIcons;
use watchface_lib::render::{
    Canvas, DrawOp, GraphicsCanvas, RecordingCanvas, DIVIDER_HALF_WIDTH, ICON_GAP, TEMP_GAP,
};
use watchface_lib::sync::{DataEvent, DataEventKind, DataMap, DataValue, LoopbackChannel};

/// Host that only remembers whether a redraw is pending.
#[derive(Default)]
struct TestHost {
    redraws: usize,
}

impl FaceHost for TestHost {
    fn invalidate(&mut self) {
        self.redraws += 1;
    }

    fn register_time_zone_receiver(&mut self) {}

    fn unregister_time_zone_receiver(&mut self) {}
}

type Engine = WatchFaceEngine<ManualClock, LoopbackChannel, TestHost, BuiltinIcons>;

const CENTER_X: i32 = 160;

fn bounds() -> Rectangle {
    Rectangle::new(Point::zero(), Size::new(320, 320))
}

/// A visible, connected face at 09:30:00.250 UTC on Mon, Jan 5 2026.
fn visible_face() -> (Engine, ManualClock) {
    let clock = ManualClock::new(Utc.with_ymd_and_hms(2026, 1, 5, 9, 30, 0).unwrap());
    clock.advance_ms(250);

    let mut engine = WatchFaceEngine::new(
        FaceSettings::from_config(&Config::default()).unwrap(),
        clock.clone(),
        LoopbackChannel::default(),
        TestHost::default(),
        BuiltinIcons::default(),
    );
    engine.on_create();
    engine.on_visibility_changed(true);
    engine.on_connected();
    (engine, clock)
}

fn weather_event(entries: &[(&str, DataValue)]) -> DataEvent {
    let data: DataMap = entries
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect();
    DataEvent::changed("/weather-data", data)
}

fn full_forecast() -> DataEvent {
    weather_event(&[
        ("high", DataValue::Text("75°".into())),
        ("low", DataValue::Text("60°".into())),
        ("weatherId", DataValue::Int(200)),
    ])
}

fn draw(engine: &Engine) -> RecordingCanvas {
    let mut canvas = RecordingCanvas::new();
    engine.on_draw(&mut canvas, bounds());
    canvas
}

#[test]
fn interactive_frame_with_forecast_matches_layout() {
    let (mut engine, _) = visible_face();
    engine.on_data_changed(&[full_forecast()]);

    let canvas = draw(&engine);
    let metrics = *engine.metrics();
    let styles = *engine.styles();

    // background
    assert!(matches!(
        canvas.ops()[0],
        DrawOp::Fill { area, .. } if area == bounds()
    ));

    let time_w = canvas.measure_text("9:30 am", &styles.time);
    assert_eq!(
        canvas.text_origin("9:30 am"),
        Some(Point::new(CENTER_X - time_w / 2, metrics.time_y))
    );

    let date_w = canvas.measure_text("Mon, Jan 5 2026", &styles.date);
    assert_eq!(
        canvas.text_origin("Mon, Jan 5 2026"),
        Some(Point::new(CENTER_X - date_w / 2, metrics.date_y))
    );

    let lines: Vec<_> = canvas.lines().cloned().collect();
    assert_eq!(
        lines,
        vec![DrawOp::Line {
            from: Point::new(CENTER_X - DIVIDER_HALF_WIDTH, metrics.divider_y),
            to: Point::new(CENTER_X + DIVIDER_HALF_WIDTH, metrics.divider_y),
            color: styles.date.color,
        }]
    );

    let high_w = canvas.measure_text("75°", &styles.high);
    assert_eq!(
        canvas.text_origin("75°"),
        Some(Point::new(CENTER_X - high_w / 2, metrics.temp_y))
    );
    assert_eq!(
        canvas.text_origin("60°"),
        Some(Point::new(CENTER_X + high_w / 2 + TEMP_GAP, metrics.temp_y))
    );

    // Storm art scaled to the temperature text height
    let icon = engine.weather().icon.clone().unwrap();
    assert_eq!(icon.height(), metrics.temp_size);
    let images: Vec<_> = canvas.images().cloned().collect();
    assert_eq!(
        images,
        vec![DrawOp::Image {
            top_left: Point::new(
                CENTER_X - (high_w / 2 + icon.width() as i32 + ICON_GAP),
                metrics.icon_y - icon.height() as i32,
            ),
            size: Size::new(icon.width(), icon.height()),
        }]
    );
}

#[test]
fn ambient_frame_has_no_icon() {
    let (mut engine, _) = visible_face();
    engine.on_data_changed(&[full_forecast()]);
    engine.on_ambient_mode_changed(true);

    let canvas = draw(&engine);
    assert!(matches!(
        canvas.ops()[0],
        DrawOp::Fill { color, .. } if color == Rgb565::BLACK
    ));
    assert_eq!(canvas.images().count(), 0);
    assert!(canvas.text_origin("75°").is_some());
    assert!(canvas.text_origin("60°").is_some());
}

#[test]
fn frame_without_forecast_shows_time_and_date_only() {
    let (engine, _) = visible_face();
    let canvas = draw(&engine);

    assert_eq!(canvas.lines().count(), 0);
    assert_eq!(canvas.images().count(), 0);
    let texts: Vec<_> = canvas
        .ops()
        .iter()
        .filter_map(|op| match op {
            DrawOp::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(texts, vec!["9:30 am", "Mon, Jan 5 2026"]);
}

#[test]
fn partial_updates_accumulate_until_both_temperatures_known() {
    let (mut engine, _) = visible_face();
    let redraws = engine.host().redraws;

    engine.on_data_changed(&[weather_event(&[("high", DataValue::Text("75°".into()))])]);
    assert_eq!(engine.host().redraws, redraws + 1);
    assert_eq!(draw(&engine).lines().count(), 0);

    engine.on_data_changed(&[weather_event(&[("low", DataValue::Text("60°".into()))])]);
    let weather = engine.weather();
    assert_eq!(weather.temperatures(), Some(("75°", "60°")));
    assert!(weather.icon.is_none());

    // No icon yet, so the interactive frame draws temperatures without one
    let canvas = draw(&engine);
    assert_eq!(canvas.lines().count(), 1);
    assert_eq!(canvas.images().count(), 0);
}

#[test]
fn ignored_events_do_not_redraw() {
    let (mut engine, _) = visible_face();
    let redraws = engine.host().redraws;

    let mut deleted = full_forecast();
    deleted.kind = DataEventKind::Deleted;
    let mut elsewhere = full_forecast();
    elsewhere.path = "/settings".to_string();

    engine.on_data_changed(&[deleted, elsewhere]);
    assert_eq!(engine.host().redraws, redraws);
    assert!(engine.weather().temperatures().is_none());
}

#[test]
fn ambient_round_trip_restarts_timer_within_a_second() {
    let (mut engine, clock) = visible_face();
    engine.on_timer_fired();

    engine.on_ambient_mode_changed(true);
    assert_eq!(engine.next_timer_deadline(), None);

    clock.advance_ms(12_345);
    engine.on_ambient_mode_changed(false);
    let now = clock.now().timestamp_millis();
    let deadline = engine.next_timer_deadline().unwrap();
    assert!(deadline - now <= 1000);

    let redraws = engine.host().redraws;
    engine.on_timer_fired();
    assert_eq!(engine.host().redraws, redraws + 1);
    let next = engine.next_timer_deadline().unwrap();
    assert!(next > now && next - now <= 1000);
    assert_eq!(next % 1000, 0);
}

#[test]
fn time_zone_broadcast_changes_displayed_time() {
    let (mut engine, _) = visible_face();
    engine.on_time_zone_changed("-10:00");

    let canvas = draw(&engine);
    assert!(canvas.text_origin("11:30 pm").is_some());
    assert!(canvas.text_origin("Sun, Jan 4 2026").is_some());
}

#[test]
fn full_frame_rasterizes_into_framebuffer() {
    let (mut engine, _) = visible_face();
    engine.on_data_changed(&[full_forecast()]);

    let mut fb = FrameBuffer::new(320, 320);
    let area = fb.bounding_box();
    engine.on_draw(&mut GraphicsCanvas::new(&mut fb), area);

    let palette = Config::default().palette.to_palette().unwrap();
    assert_eq!(fb.pixel(0, 0), Some(palette.primary));
    assert_eq!(fb.pixel(319, 319), Some(palette.primary));

    // Icon pixels land left of center, above the icon baseline
    let metrics = *engine.metrics();
    let icon_rows = (metrics.icon_y - metrics.temp_size as i32) as u32..metrics.icon_y as u32;
    let touched = icon_rows
        .flat_map(|y| (0..CENTER_X as u32).map(move |x| (x, y)))
        .filter(|&(x, y)| fb.pixel(x, y) != Some(palette.primary))
        .count();
    assert!(touched > 0);

    let ascii = fb.to_ascii(4, 8);
    assert_eq!(ascii.lines().count(), 40);
}
