//! # Watch Face Simulator Entry Point
//!
//! This binary hosts the watch face on a desktop. It plays the part of the
//! wearable runtime: it delivers lifecycle callbacks, sleeps until the face's
//! update timer is due, replays phone sync events from a JSON file and draws
//! each requested frame into an in-memory framebuffer.
//!
//! ## Usage
//! ```text
//! watchface [--stdout] [--ambient] [--round] [--24h] [--frames N]
//!           [--sync EVENTS.json] [--config FILE] [--verbose]
//! ```
//! With `--stdout` every frame is printed as ASCII art.

#[cfg(test)]
mod tests;

use anyhow::{bail, Context};
use embedded_graphics::prelude::*;
use flexi_logger::{Logger, LoggerHandle};
use log::{debug, info};
use std::env;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use watchface_lib::clock::{SystemClock, TimeSource};
use watchface_lib::config::Config;
use watchface_lib::engine::{FaceHost, FaceProperties, FaceSettings, WatchFaceEngine};
use watchface_lib::framebuffer::FrameBuffer;
use watchface_lib::icons::BuiltinIcons;
use watchface_lib::layout::WindowInsets;
use watchface_lib::render::GraphicsCanvas;
use watchface_lib::sync::{self, DataEvent, LoopbackChannel, SyncChannel};

/// Period of the host's ambient tick.
const AMBIENT_TICK_MS: i64 = 60_000;

/// Command line options.
#[derive(Debug, Default, PartialEq)]
struct Options {
    stdout: bool,
    ambient: bool,
    round: bool,
    use_24_hour: bool,
    frames: usize,
    sync: Option<PathBuf>,
    config: Option<PathBuf>,
    verbose: bool,
}

fn parse_args<I>(args: I) -> anyhow::Result<Options>
where
    I: IntoIterator<Item = String>,
{
    let mut options = Options {
        frames: 1,
        ..Options::default()
    };
    let mut args = args.into_iter();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--stdout" => options.stdout = true,
            "--ambient" => options.ambient = true,
            "--round" => options.round = true,
            "--24h" => options.use_24_hour = true,
            "--verbose" => options.verbose = true,
            "--frames" => {
                let value = args.next().context("--frames needs a count")?;
                options.frames = value
                    .parse()
                    .with_context(|| format!("invalid frame count `{value}`"))?;
            }
            "--sync" => options.sync = Some(args.next().context("--sync needs a file")?.into()),
            "--config" => {
                options.config = Some(args.next().context("--config needs a file")?.into())
            }
            other => bail!("unknown argument `{other}`"),
        }
    }

    Ok(options)
}

/// Host side of the face: remembers redraw requests until the loop serves them.
#[derive(Debug, Default)]
struct SimulatorHost {
    redraw_requested: bool,
}

impl SimulatorHost {
    fn take_redraw(&mut self) -> bool {
        std::mem::take(&mut self.redraw_requested)
    }
}

impl FaceHost for SimulatorHost {
    fn invalidate(&mut self) {
        self.redraw_requested = true;
    }

    fn register_time_zone_receiver(&mut self) {
        debug!("timezone receiver registered");
    }

    fn unregister_time_zone_receiver(&mut self) {
        debug!("timezone receiver unregistered");
    }
}

type SimulatorEngine = WatchFaceEngine<SystemClock, LoopbackChannel, SimulatorHost, BuiltinIcons>;

fn init_logging(verbose: bool) -> anyhow::Result<LoggerHandle> {
    let level = if verbose { "debug" } else { "info" };
    let handle = Logger::try_with_env_or_str(level)
        .context("invalid log specification")?
        .log_to_stderr()
        .start()
        .context("failed to start logger")?;
    Ok(handle)
}

/// Deliver the lifecycle a wearable runtime sends when a face is shown.
fn bring_up(
    engine: &mut SimulatorEngine,
    options: &Options,
    config: &Config,
    events: &[DataEvent],
) {
    let style = engine.on_create();
    debug!("face style: {style:?}");

    engine.on_apply_insets(WindowInsets {
        is_round: options.round || config.display.round,
    });
    engine.on_properties_changed(FaceProperties::default());
    engine.on_visibility_changed(true);

    if engine.channel().is_connected() {
        engine.on_connected();
    }
    if engine.channel().is_listening() && !events.is_empty() {
        engine.on_data_changed(events);
    }

    if options.ambient {
        engine.on_ambient_mode_changed(true);
    }
}

/// Sleep until the next timer deadline or ambient tick and deliver it.
async fn wait_for_tick(engine: &mut SimulatorEngine) {
    let now = SystemClock.now().timestamp_millis();
    match engine.next_timer_deadline() {
        Some(deadline) => {
            tokio::time::sleep(Duration::from_millis((deadline - now).max(0) as u64)).await;
            engine.on_timer_fired();
        }
        None => {
            let wait = AMBIENT_TICK_MS - now.rem_euclid(AMBIENT_TICK_MS);
            tokio::time::sleep(Duration::from_millis(wait as u64)).await;
            engine.on_time_tick();
        }
    }
}

async fn run(options: Options, config: Config, settings: FaceSettings, events: Vec<DataEvent>) {
    let mut engine = WatchFaceEngine::new(
        settings,
        SystemClock,
        LoopbackChannel::default(),
        SimulatorHost::default(),
        BuiltinIcons::default(),
    );
    bring_up(&mut engine, &options, &config, &events);

    let mut buffer = FrameBuffer::new(config.display.width, config.display.height);
    let bounds = buffer.bounding_box();
    let mut drawn = 0;

    while drawn < options.frames {
        if !engine.host_mut().take_redraw() {
            wait_for_tick(&mut engine).await;
            continue;
        }

        engine.on_draw(&mut GraphicsCanvas::new(&mut buffer), bounds);
        drawn += 1;

        if options.stdout {
            println!("{}", buffer.to_ascii(4, 8));
        } else {
            info!("frame {drawn}/{} drawn", options.frames);
        }
    }

    engine.on_visibility_changed(false);
    engine.on_destroy();
}

/// Main application entry point.
fn main() -> anyhow::Result<()> {
    let options = parse_args(env::args().skip(1))?;
    let _logger = init_logging(options.verbose)?;

    let config = match &options.config {
        Some(path) => Config::load_from_path(path),
        None => Config::load(),
    };

    let mut settings =
        FaceSettings::from_config(&config).context("invalid palette in configuration")?;
    settings.use_24_hour |= options.use_24_hour;

    let events = match &options.sync {
        Some(path) => {
            let json = fs::read_to_string(path)
                .with_context(|| format!("could not read sync events from {}", path.display()))?;
            sync::parse_events(&json)?
        }
        None => Vec::new(),
    };
    info!("replaying {} sync event(s)", events.len());

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()?;
    rt.block_on(run(options, config, settings, events));

    Ok(())
}
