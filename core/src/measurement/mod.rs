#![deny(unsafe_code)]
#![deny(warnings)]
//! Measurement loop
//!
//! The loop is a state machine advanced one step per [`MeasurementLoop::poll`]:
//!
//! ```text
//!  Initial -> Inactive --activate--> Wake -> Measure -> SleepSensor -> Transmit
//!                ^   |                 ^                                  |
//!                |   +--end--> Final   |                                  v
//!                +------end/deactivate-+------ timer ----------------- Sleeping
//! ```
//!
//! Each poll evaluates the current state's exit condition once. On a
//! transition the new state's entry action runs in the same poll. Polls that
//! find no condition satisfied change nothing, so the loop can be polled from
//! a busy scheduler without cost.
//!
//! Activate/deactivate requests arrive through a shared [`RequestFlags`] and
//! are only acted on while parked (`Inactive`) or between cycles
//! (`Sleeping`). A measurement or uplink in progress always finishes.

mod cadence;
mod fsm;
mod requests;

pub use cadence::TxCycle;
pub use fsm::{next_state, Inputs, Request, State};
pub use requests::RequestFlags;

use hal_abstractions::{Clock, Co2Sensor, PowerControl, UplinkRadio};

use crate::config::LoopConfig;
use crate::error::EncodeError;
use crate::sleep::{SleepContext, SleepPolicy};
use crate::timer::Timer;
use crate::uplink::{Measurement, TxBuffer, UplinkEncoder};

/// Auxiliary loop state next to [`State`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LoopFlags {
    /// Polled by the scheduler
    pub registered: bool,
    /// Started and not yet final
    pub running: bool,
    /// `end()` was called
    pub exit: bool,
    /// Producing uplinks
    pub active: bool,
    /// The last read succeeded
    pub measurement_valid: bool,
    /// Sensor answered the startup probe
    pub sensor_present: bool,
    /// Uplink submitted, result not yet known
    pub tx_pending: bool,
    /// Uplink finished, not yet consumed by the loop
    pub tx_complete: bool,
    /// The last uplink failed
    pub tx_error: bool,
}

/// The node's measurement loop
///
/// Owns the clock, sensor, radio and power collaborators. Requests are
/// shared through `requests`, so other contexts can raise them while the
/// loop is borrowed by the scheduler.
pub struct MeasurementLoop<'r, C, S, R, P> {
    clock: C,
    sensor: S,
    radio: R,
    power: P,
    requests: &'r RequestFlags,
    config: LoopConfig,
    state: State,
    flags: LoopFlags,
    probed: bool,
    timer: Timer,
    sleep: SleepPolicy,
    encoder: UplinkEncoder,
    cadence: TxCycle,
    cycle_start: u32,
    measurement: Measurement,
    tx_buffer: TxBuffer,
}

impl<'r, C, S, R, P> MeasurementLoop<'r, C, S, R, P>
where
    C: Clock,
    S: Co2Sensor,
    R: UplinkRadio,
    P: PowerControl,
{
    /// Create a stopped loop; call [`begin`](Self::begin) to start it
    pub fn new(
        clock: C,
        sensor: S,
        radio: R,
        power: P,
        requests: &'r RequestFlags,
        config: LoopConfig,
    ) -> Self {
        Self {
            clock,
            sensor,
            radio,
            power,
            requests,
            state: State::Initial,
            flags: LoopFlags::default(),
            probed: false,
            timer: Timer::new(),
            sleep: SleepPolicy::new(config.sleep),
            encoder: UplinkEncoder::new(config.diag_every),
            cadence: TxCycle::new(
                config.tx_cycle_ms,
                config.fast_tx_cycle_ms,
                config.fast_cycle_count,
            ),
            cycle_start: 0,
            measurement: Measurement::default(),
            tx_buffer: TxBuffer::new(),
            config,
        }
    }

    /// Start the loop
    ///
    /// Probes the sensor on the first call only. Calling `begin` on a
    /// running loop does nothing.
    pub fn begin(&mut self) {
        self.flags.registered = true;
        if self.flags.running {
            return;
        }

        if !self.probed {
            self.probed = true;
            self.flags.sensor_present = self.sensor.probe();
            if self.flags.sensor_present {
                info!("CO2 sensor found");
            } else {
                warn!("No CO2 sensor found, sending diagnostics only");
            }
        }

        self.flags.exit = false;
        self.flags.running = true;
        self.state = State::Initial;
        self.enter(State::Initial);
    }

    /// Ask the loop to stop
    ///
    /// The loop finishes any cycle in progress, parks, and then reaches
    /// [`State::Final`] and deregisters itself.
    pub fn end(&mut self) {
        if !self.flags.running {
            return;
        }
        debug!("Stop requested");
        self.flags.exit = true;
    }

    /// Ask the loop to start (`true`) or stop (`false`) producing uplinks
    pub fn request_active(&self, enable: bool) {
        self.requests.request_active(enable);
    }

    /// Use `ms` between cycles for the next `count` cycles, then return to
    /// the permanent cycle; `count == 0` sets the permanent cycle
    pub fn set_tx_cycle_time(&mut self, ms: u32, count: u32) {
        if count == 0 {
            info!("Uplink cycle {} ms", ms);
        } else {
            info!("Uplink cycle {} ms for {} cycles", ms, count);
        }
        self.cadence.set(ms, count);
    }

    /// Report the outcome of the uplink in flight
    ///
    /// The radio completion is also collected on every poll; this is for
    /// drivers that signal completion from their own context. A call with no
    /// uplink in flight is ignored.
    pub fn send_buffer_done(&mut self, success: bool) {
        if !self.flags.tx_pending {
            return;
        }
        self.flags.tx_pending = false;
        self.flags.tx_complete = true;
        self.flags.tx_error = !success;
        if !success {
            warn!("Uplink failed");
        }
    }

    /// Advance the loop by at most one transition
    pub fn poll(&mut self) {
        if !self.flags.registered {
            return;
        }

        self.timer.update(self.clock.now_ms());
        self.collect_tx_result();
        self.dispatch();
    }

    /// Can the node deep-sleep right now?
    ///
    /// Only while parked (`Inactive`) or between cycles (`Sleeping`). A
    /// cycle in progress, a loop not yet parked and a stopped loop never
    /// qualify.
    pub fn check_deep_sleep(&self) -> bool {
        match self.state {
            State::Inactive | State::Sleeping => {
                self.sleep.check_deep_sleep(&self.sleep_context())
            }
            _ => false,
        }
    }

    /// Current state
    pub fn state(&self) -> State {
        self.state
    }

    /// Snapshot of the auxiliary flags
    pub fn flags(&self) -> LoopFlags {
        self.flags
    }

    /// Configuration the loop was built with
    pub fn config(&self) -> &LoopConfig {
        &self.config
    }

    /// This cycle's measurement; sensor fields valid only with
    /// `measurement_valid`
    pub fn measurement(&self) -> &Measurement {
        &self.measurement
    }

    /// The last uplink payload
    pub fn tx_buffer(&self) -> &[u8] {
        &self.tx_buffer
    }

    /// The loop's one-shot timer (settle or cadence wait)
    pub fn timer(&self) -> &Timer {
        &self.timer
    }

    /// Uplink cadence
    pub fn tx_cycle(&self) -> &TxCycle {
        &self.cadence
    }

    /// The sensor, for board code and inspection
    pub fn sensor(&self) -> &S {
        &self.sensor
    }

    /// Mutable sensor access, e.g. for driver calibration between cycles
    pub fn sensor_mut(&mut self) -> &mut S {
        &mut self.sensor
    }

    /// The uplink radio
    pub fn radio(&self) -> &R {
        &self.radio
    }

    /// Mutable radio access
    pub fn radio_mut(&mut self) -> &mut R {
        &mut self.radio
    }

    /// The power controller
    pub fn power(&self) -> &P {
        &self.power
    }

    /// Mutable power controller access
    pub fn power_mut(&mut self) -> &mut P {
        &mut self.power
    }

    fn collect_tx_result(&mut self) {
        if !self.flags.tx_pending {
            return;
        }
        if let Some(result) = self.radio.poll_complete() {
            if let Err(e) = result {
                warn!("Radio: {:?}", e);
            }
            self.send_buffer_done(result.is_ok());
        }
    }

    fn dispatch(&mut self) {
        let current = self.state;
        let inputs = self.sample(current);

        match next_state(current, &inputs) {
            Some(next) => self.transition(current, next),
            None if current == State::Sleeping => {
                if self.sleep_between_cycles() {
                    self.transition(current, State::Wake);
                }
            }
            None => {}
        }
    }

    /// Sample the conditions `state` waits on, consuming the ones it uses
    fn sample(&mut self, state: State) -> Inputs {
        let request = if state.accepts_requests() {
            self.requests.take()
        } else {
            None
        };

        let timer_fired = matches!(state, State::Sleeping | State::Wake) && self.timer.timed_out();
        let sensor_ready = state == State::Wake
            && !timer_fired
            && self.flags.sensor_present
            && self.sensor.is_ready();

        Inputs {
            request,
            exit: self.flags.exit,
            timer_fired,
            sensor_ready,
            tx_complete: state == State::Transmit && self.flags.tx_complete,
        }
    }

    fn transition(&mut self, from: State, to: State) {
        debug!("{} -> {}", from.name(), to.name());
        match (from, to) {
            (State::Inactive, State::Wake) => {
                info!("Measurement loop active");
                self.flags.active = true;
            }
            (State::Transmit, State::Sleeping) => {
                self.flags.tx_complete = false;
                if self.cadence.advance() {
                    info!("Fast start done, uplink cycle {} ms", self.cadence.current_ms());
                }
            }
            _ => {}
        }

        self.state = to;
        self.enter(to);
    }

    fn enter(&mut self, state: State) {
        match state {
            State::Initial => {
                self.measurement = Measurement::default();
                self.flags.measurement_valid = false;
                self.encoder.reset();
                self.cadence
                    .restart(self.config.fast_tx_cycle_ms, self.config.fast_cycle_count);
            }
            State::Inactive => {
                self.timer.clear();
                if self.flags.active {
                    info!("Measurement loop inactive");
                }
                self.flags.active = false;
            }
            State::Sleeping => {
                let now = self.clock.now_ms();
                let elapsed = now.wrapping_sub(self.cycle_start);
                let delay = self.cadence.current_ms().saturating_sub(elapsed);
                debug!("Next measurement in {} ms", delay);
                self.timer.set(now, delay);
                self.sleep.rearm_alert();
            }
            State::Wake => {
                let now = self.clock.now_ms();
                self.cycle_start = now;
                if self.flags.sensor_present {
                    if let Err(e) = self.sensor.wake() {
                        warn!("Sensor wake: {:?}", e);
                    }
                }
                self.timer.set(now, self.config.settle_ms);
            }
            State::Measure => {
                self.timer.clear();
                self.measure();
            }
            State::SleepSensor => {
                if self.flags.sensor_present {
                    if let Err(e) = self.sensor.sleep() {
                        warn!("Sensor sleep: {:?}", e);
                    }
                }
            }
            State::Transmit => self.start_uplink(),
            State::Final => {
                self.timer.clear();
                self.flags.registered = false;
                self.flags.running = false;
                info!("Measurement loop stopped");
            }
        }
    }

    fn measure(&mut self) {
        self.flags.measurement_valid = false;
        if self.flags.sensor_present {
            match self.sensor.read() {
                Ok(reading) => {
                    debug!(
                        "T={} RH={} CO2={}",
                        reading.temperature_c,
                        reading.humidity_pct,
                        reading.co2_ppm
                    );
                    self.measurement.set_reading(&reading);
                    self.flags.measurement_valid = true;
                }
                Err(e) => warn!("Sensor read: {:?}", e),
            }
        }

        self.measurement.vbat = self.power.battery_voltage();
        self.measurement.vcc = self.power.supply_voltage();
        self.measurement.boot_count = self.power.boot_count();
    }

    fn start_uplink(&mut self) {
        self.flags.tx_pending = true;
        self.flags.tx_complete = false;
        self.flags.tx_error = false;

        match self.encoder.fill(
            &mut self.tx_buffer,
            &self.measurement,
            self.flags.measurement_valid,
        ) {
            Ok(sent) => trace!("Uplink fields {:?}", sent),
            Err(EncodeError::Overflow { sent, dropped }) => {
                warn!("Uplink overflow, dropped {:?}", dropped);
                trace!("Uplink fields {:?}", sent);
            }
            Err(e @ EncodeError::NoRoom) => {
                error!("Uplink not built: {:?}", e);
                self.send_buffer_done(false);
                return;
            }
        }

        let port = self.config.uplink_port;
        let confirmed = self.config.confirmed_uplink;
        if let Err(e) = self.radio.send(port, &self.tx_buffer, confirmed) {
            warn!("Radio send: {:?}", e);
            self.send_buffer_done(false);
        }
    }

    fn sleep_context(&self) -> SleepContext {
        SleepContext {
            active: self.flags.active,
            tx_pending: self.flags.tx_pending,
            remaining_ms: self.timer.remaining(self.clock.now_ms()),
            console_attached: self.power.console_attached(),
        }
    }

    /// Sleep between cycles if allowed
    ///
    /// Returns `true` if the wake deadline passed while asleep.
    fn sleep_between_cycles(&mut self) -> bool {
        let duration = self.sleep.deep_sleep_duration(&self.sleep_context());
        self.sleep.do_sleep_alert(duration.is_some());

        let Some(ms) = duration else {
            return false;
        };
        self.sleep.do_deep_sleep(&mut self.power, ms);

        self.timer.update(self.clock.now_ms());
        self.timer.timed_out()
    }
}
