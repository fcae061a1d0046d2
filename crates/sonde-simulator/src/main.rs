//! Desktop simulator for the sonde-rs sampling core.
//!
//! Wires `sonde-core` to synthetic peripherals and replays a compressed day
//! in the life of the buoy: the modem registers and blinks its netlight, the
//! water sensor gets submerged, midnight passes, and the main loop drains
//! buffers as they fill.
//!
//! ```text
//! RUST_LOG=info cargo run -p sonde-simulator -- [seconds]
//! ```
//!
//! Simulated time advances in 1 ms steps. Every interrupt the device would
//! take is delivered in that step, in the order the hardware priorities allow.

mod board;

use log::{debug, error, info};

use board::{Line, SimAdc, SimBoard, SimClock, SimPin, SimTime, SimTimer, level_at};
use sonde_core::config::{Cadence, CoreConfig};
use sonde_core::core_state::{CoreError, FastTickOutcome, Peripherals, SensorCore, SharedCore};
use sonde_core::hal::CalendarTime;
use sonde_core::signals::MonitoredPins;

// ---------------------------------------------------------------------------
// Scenario constants
// ---------------------------------------------------------------------------

const DEFAULT_DURATION_SECS: u64 = 600;

/// Simulation step
const STEP_US: u64 = 1_000;

const MODEM_POWERED_AT_MS: u64 = 5_000;
const SUBMERGED_AT_MS: u64 = 60_000;

/// Thirty seconds before a leap-day midnight
const START: CalendarTime = CalendarTime::new(2024, 2, 28, 23, 59, 30);

static CORE: SharedCore<SimBoard> = SharedCore::new();

/// Slow cadences compressed so buffers fill within a short run.
///
/// Battery and depth land in the same step every 35 s on purpose: depth fires
/// second, takes over the converter, and that battery reading is abandoned.
fn scenario_config() -> CoreConfig {
    CoreConfig {
        cadence: Cadence {
            battery_tick_ms: 7_000,
            depth_tick_ms: 5_000,
            ..Cadence::default()
        },
        ..CoreConfig::default()
    }
}

fn build_core(time: &SimTime, config: CoreConfig) -> Result<SensorCore<SimBoard>, CoreError> {
    let peripherals = Peripherals::<SimBoard> {
        pins: MonitoredPins {
            water: SimPin::new(
                Line::Water {
                    submerged_at_ms: SUBMERGED_AT_MS,
                },
                time.clone(),
            ),
            netlight: SimPin::new(Line::Netlight, time.clone()),
            sim_status: SimPin::new(
                Line::SimStatus {
                    powered_at_ms: MODEM_POWERED_AT_MS,
                },
                time.clone(),
            ),
        },
        water_timer: SimTimer::new(time.clone()),
        netlight_timer: SimTimer::new(time.clone()),
        adc: SimAdc::new(time.clone()),
        clock: SimClock::new(time.clone(), START),
    };
    SensorCore::new(peripherals, config)
}

fn mean(samples: &[u16]) -> u32 {
    if samples.is_empty() {
        return 0;
    }
    samples.iter().map(|&s| s as u32).sum::<u32>() / samples.len() as u32
}

/// What the device's main loop does between interrupts
#[derive(Default)]
struct Consumer {
    water_present: bool,
    netlight_on: bool,
    axis_batches: u32,
    depth_batches: u32,
    battery_batches: u32,
    midnights: u32,
}

impl Consumer {
    fn poll(&mut self, core: &mut SensorCore<SimBoard>, now_ms: u64) {
        let snapshot = core.snapshot();
        let state = core.state_mut();

        if snapshot.x_axis.is_full && snapshot.y_axis.is_full {
            let x = state.x_axis_mut().drain(mean);
            let y = state.y_axis_mut().drain(mean);
            self.axis_batches += 1;
            debug!("[{:>7} ms] accel batch {}: mean x {} y {}", now_ms, self.axis_batches, x, y);
        }

        if snapshot.depth.is_full {
            let depth = state.depth_mut().drain(mean);
            self.depth_batches += 1;
            info!("[{:>7} ms] depth batch {}: mean {}", now_ms, self.depth_batches, depth);
        }

        if snapshot.battery.is_full {
            let battery = state.battery_mut().drain(mean);
            self.battery_batches += 1;
            info!("[{:>7} ms] battery batch {}: mean {}", now_ms, self.battery_batches, battery);
        }

        if state.take_midnight() {
            self.midnights += 1;
            let today = state.calendar().current;
            info!(
                "[{:>7} ms] midnight: now {:04}-{:02}-{:02}",
                now_ms, today.year, today.month, today.day
            );
        }

        if snapshot.water_present != self.water_present {
            self.water_present = snapshot.water_present;
            info!("[{:>7} ms] water present: {}", now_ms, self.water_present);
        }

        if snapshot.netlight_on != self.netlight_on {
            self.netlight_on = snapshot.netlight_on;
            debug!("[{:>7} ms] netlight on: {}", now_ms, self.netlight_on);
        }
    }
}

fn every(now_ms: u64, period_ms: u32) -> bool {
    period_ms != 0 && now_ms != 0 && now_ms % period_ms as u64 == 0
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let duration_secs = std::env::args()
        .nth(1)
        .and_then(|arg| arg.parse().ok())
        .unwrap_or(DEFAULT_DURATION_SECS);

    let time = SimTime::default();
    let config = scenario_config();
    let cadence = config.cadence;

    let core = match build_core(&time, config) {
        Ok(core) => core,
        Err(e) => {
            error!("failed to build sensor core: {}", e);
            std::process::exit(1);
        }
    };
    CORE.install(core);
    CORE.with(|core| core.prime_calendar());

    info!(
        "simulating {} s: fast {} ms, clock {} ms, depth {} ms, battery {} ms",
        duration_secs,
        cadence.fast_tick().as_millis(),
        cadence.clock_tick().as_millis(),
        cadence.depth_tick().as_millis(),
        cadence.battery_tick().as_millis()
    );

    let lines = [
        Line::Water {
            submerged_at_ms: SUBMERGED_AT_MS,
        },
        Line::Netlight,
        Line::SimStatus {
            powered_at_ms: MODEM_POWERED_AT_MS,
        },
    ];
    let mut levels = lines.map(|line| level_at(line, 0));
    let mut consumer = Consumer::default();

    for _ in 0..duration_secs * 1_000_000 / STEP_US {
        time.advance_us(STEP_US);
        let now_ms = time.now_ms();

        // Timer interrupts outrank the pin-change interrupt.
        if every(now_ms, cadence.fast_tick_ms) {
            match CORE.with(|core| core.on_fast_tick()) {
                Some(Err(e)) => {
                    error!("fatal: {}", e);
                    std::process::exit(1);
                }
                Some(Ok(FastTickOutcome::Deferred(channel))) => {
                    debug!("[{:>7} ms] fast tick deferred by {}", now_ms, channel.label());
                }
                _ => {}
            }
        }

        if every(now_ms, cadence.clock_tick_ms) {
            CORE.with(|core| core.on_second_tick());
        }

        if every(now_ms, cadence.battery_tick_ms) {
            CORE.with(|core| core.on_battery_tick());
        }

        if every(now_ms, cadence.depth_tick_ms) {
            CORE.with(|core| core.on_depth_tick());
        }

        CORE.with(|core| {
            if let Some(channel) = core.adc_mut().take_completed() {
                core.on_conversion_complete(channel);
            }
        });

        let now_levels = lines.map(|line| level_at(line, now_ms));
        if now_levels != levels {
            levels = now_levels;
            CORE.with(|core| core.on_pin_change());
        }

        CORE.with(|core| consumer.poll(core, now_ms));
    }

    if let Some(snapshot) = CORE.snapshot() {
        info!("final state: {:?}", snapshot);
    }
    info!(
        "done: {} accel batches, {} depth batches, {} battery batches, {} midnight(s)",
        consumer.axis_batches, consumer.depth_batches, consumer.battery_batches, consumer.midnights
    );
}
