//! # Simulator Command Line and Bring-up Tests

use std::path::PathBuf;

use watchface_lib::clock::SystemClock;
use watchface_lib::config::Config;
use watchface_lib::engine::{FaceSettings, VisibilityState, WatchFaceEngine};
use watchface_lib::icons::BuiltinIcons;
use watchface_lib::sync::{parse_events, LoopbackChannel};

use crate::{bring_up, parse_args, Options, SimulatorHost};

fn args(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

#[test]
fn defaults_draw_a_single_frame() {
    let options = parse_args(Vec::<String>::new()).unwrap();
    assert_eq!(
        options,
        Options {
            frames: 1,
            ..Options::default()
        }
    );
}

#[test]
fn flags_and_values_are_parsed() {
    let options = parse_args(args(&[
        "--stdout", "--ambient", "--round", "--24h", "--frames", "3", "--sync", "events.json",
        "--config", "face.toml",
    ]))
    .unwrap();

    assert!(options.stdout && options.ambient && options.round && options.use_24_hour);
    assert_eq!(options.frames, 3);
    assert_eq!(options.sync, Some(PathBuf::from("events.json")));
    assert_eq!(options.config, Some(PathBuf::from("face.toml")));
}

#[test]
fn bad_arguments_are_rejected() {
    assert!(parse_args(args(&["--frames"])).is_err());
    assert!(parse_args(args(&["--frames", "many"])).is_err());
    assert!(parse_args(args(&["--bogus"])).is_err());
}

#[test]
fn bring_up_connects_and_applies_replayed_events() {
    let events = parse_events(
        r#"[{"type": "changed", "path": "/weather-data",
             "data": {"high": "75°", "low": "60°", "weatherId": 800}}]"#,
    )
    .unwrap();
    let config = Config::default();
    let mut engine = WatchFaceEngine::new(
        FaceSettings::from_config(&config).unwrap(),
        SystemClock,
        LoopbackChannel::default(),
        SimulatorHost::default(),
        BuiltinIcons::default(),
    );
    let options = Options {
        ambient: true,
        ..Options::default()
    };

    bring_up(&mut engine, &options, &config, &events);

    assert_eq!(engine.state(), VisibilityState::VisibleAmbient);
    assert!(engine.channel().is_listening());
    assert_eq!(engine.weather().temperatures(), Some(("75°", "60°")));
    assert!(engine.weather().icon.is_some());
    assert!(engine.host_mut().take_redraw());
    assert!(!engine.host_mut().take_redraw());
}
