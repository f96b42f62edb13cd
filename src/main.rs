//! Presence controller — host entry point.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │                   Adapters (outer ring)                    │
//! │                                                            │
//! │  SimSensors     LogEventSink   LogFeedback   StdinTransport│
//! │  (SensorPort)   (EventSink)    (Feedback)    (console)     │
//! │                                                            │
//! │  ──────────────── Port Trait Boundary ──────────────────   │
//! │                                                            │
//! │  ┌──────────────────────────────────────────────────────┐  │
//! │  │          DetectorService (pure logic)                │  │
//! │  │  FSM · Calibration · Fusion · Stats · Watchdog       │  │
//! │  └──────────────────────────────────────────────────────┘  │
//! └────────────────────────────────────────────────────────────┘
//! ```
//!
//! One thread runs the cooperative loop: drain console bytes, apply
//! complete commands, poll the service, sleep briefly.  `reset` rebuilds
//! the service from scratch, as a board reset would.

use anyhow::{Context, Result, anyhow};
use embedded_hal::delay::DelayNs;
use log::info;
use tracing_subscriber::EnvFilter;

use presence::adapters::feedback::LogFeedback;
use presence::adapters::log_sink::LogEventSink;
use presence::adapters::sim::SimSensors;
use presence::adapters::stdin::StdinTransport;
use presence::adapters::time::{MonotonicClock, StdDelay};
use presence::app::commands::Command;
use presence::app::ports::Clock;
use presence::app::service::{DetectorService, Reply};
use presence::config::DetectorConfig;
use presence::console::LineDecoder;

/// Environment variable naming an optional JSON config file.
const CONFIG_ENV: &str = "PRESENCE_CONFIG";

/// Cooperative loop period.  Well under the sampling interval so command
/// latency stays low.
const LOOP_PERIOD_MS: u32 = 10;

fn main() -> Result<()> {
    // ── 1. Logging ────────────────────────────────────────────
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,presence=debug"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow!("installing log subscriber: {e}"))?;

    info!("╔══════════════════════════════════════╗");
    info!("║  Presence controller v{:<15}║", presence::config::VERSION);
    info!("╚══════════════════════════════════════╝");

    // ── 2. Adapters ───────────────────────────────────────────
    let clock = MonotonicClock::new();
    let mut delay = StdDelay;
    let mut sensors = SimSensors::default();
    let mut events = LogEventSink::new();
    let mut feedback = LogFeedback::new();
    let mut console = StdinTransport::spawn().context("spawning console reader")?;
    let mut decoder = LineDecoder::new();
    let mut console_eof = false;

    // ── 3. Boot / run / restart ───────────────────────────────
    'boot: loop {
        let config = load_config()?;
        let mut service = DetectorService::new(config, clock.now_ms());
        service.boot(clock.now_ms(), &mut sensors, &mut events, &mut feedback);
        decoder.reset();

        loop {
            let now = clock.now_ms();
            for line in decoder.feed(&console.drain()) {
                match service.handle_command(Command::parse(&line), now, &mut sensors) {
                    Reply::Message(text) => println!("{text}"),
                    Reply::Restart => {
                        info!("Restarting controller");
                        continue 'boot;
                    }
                }
            }
            if !console_eof && console.is_closed() {
                info!("Console input closed, running without commands");
                console_eof = true;
            }
            service.poll(now, &mut sensors, &mut events, &mut feedback);
            delay.delay_ms(LOOP_PERIOD_MS);
        }
    }
}

/// Configuration from `$PRESENCE_CONFIG` if set, defaults otherwise.
fn load_config() -> Result<DetectorConfig> {
    let Ok(path) = std::env::var(CONFIG_ENV) else {
        info!("Using default configuration");
        return Ok(DetectorConfig::default());
    };
    let text = std::fs::read_to_string(&path).with_context(|| format!("reading {path}"))?;
    let config = DetectorConfig::from_json(&text).with_context(|| format!("parsing {path}"))?;
    info!("Loaded configuration from {path}");
    Ok(config)
}
