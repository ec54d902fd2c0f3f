//! Host-side fakes for the hardware traits

use core::cell::Cell;
use std::vec::Vec;

use hal_abstractions::{
    Clock, Co2Sensor, PowerControl, RadioError, Reading, SensorError, UplinkRadio,
};

/// Clock whose time only moves when a test moves it
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Cell<u32>,
}

impl ManualClock {
    pub fn new(now: u32) -> Self {
        Self {
            now: Cell::new(now),
        }
    }

    pub fn advance(&self, ms: u32) {
        self.now.set(self.now.get().wrapping_add(ms));
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u32 {
        self.now.get()
    }
}

pub const SAMPLE: Reading = Reading {
    temperature_c: 21.5,
    humidity_pct: 50.0,
    co2_ppm: 400.0,
};

/// Scripted sensor with call counters
#[derive(Debug)]
pub struct FakeSensor {
    pub present: bool,
    pub ready: bool,
    pub reading: Result<Reading, SensorError>,
    pub probes: u32,
    pub wakes: u32,
    pub sleeps: u32,
    pub reads: u32,
}

impl FakeSensor {
    pub fn new() -> Self {
        Self {
            present: true,
            ready: false,
            reading: Ok(SAMPLE),
            probes: 0,
            wakes: 0,
            sleeps: 0,
            reads: 0,
        }
    }

    pub fn absent() -> Self {
        Self {
            present: false,
            ..Self::new()
        }
    }

    pub fn failing(error: SensorError) -> Self {
        Self {
            reading: Err(error),
            ..Self::new()
        }
    }
}

impl Co2Sensor for FakeSensor {
    fn probe(&mut self) -> bool {
        self.probes += 1;
        self.present
    }

    fn wake(&mut self) -> Result<(), SensorError> {
        self.wakes += 1;
        Ok(())
    }

    fn sleep(&mut self) -> Result<(), SensorError> {
        self.sleeps += 1;
        Ok(())
    }

    fn is_ready(&mut self) -> bool {
        self.ready
    }

    fn read(&mut self) -> Result<Reading, SensorError> {
        self.reads += 1;
        self.reading
    }
}

/// One payload handed to the radio
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentUplink {
    pub port: u8,
    pub payload: Vec<u8>,
    pub confirmed: bool,
}

/// Radio that records uplinks
///
/// By default every submitted uplink completes successfully on the next
/// `poll_complete`. Set `auto_complete` to `None` to finish transmissions by
/// hand with [`FakeRadio::finish`].
#[derive(Debug)]
pub struct FakeRadio {
    pub sent: Vec<SentUplink>,
    pub submit_error: Option<RadioError>,
    pub auto_complete: Option<Result<(), RadioError>>,
    in_flight: bool,
    result: Option<Result<(), RadioError>>,
}

impl FakeRadio {
    pub fn new() -> Self {
        Self {
            sent: Vec::new(),
            submit_error: None,
            auto_complete: Some(Ok(())),
            in_flight: false,
            result: None,
        }
    }

    pub fn finish(&mut self, result: Result<(), RadioError>) {
        assert!(self.in_flight, "no transmission in flight");
        self.result = Some(result);
    }

    pub fn last_payload(&self) -> &[u8] {
        self.sent.last().map(|s| s.payload.as_slice()).unwrap_or(&[])
    }
}

impl UplinkRadio for FakeRadio {
    fn send(&mut self, port: u8, payload: &[u8], confirmed: bool) -> Result<(), RadioError> {
        if let Some(error) = self.submit_error {
            return Err(error);
        }
        self.sent.push(SentUplink {
            port,
            payload: payload.to_vec(),
            confirmed,
        });
        self.in_flight = true;
        self.result = self.auto_complete;
        Ok(())
    }

    fn poll_complete(&mut self) -> Option<Result<(), RadioError>> {
        if !self.in_flight {
            return None;
        }
        let result = self.result.take()?;
        self.in_flight = false;
        Some(result)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerEvent {
    Prepare,
    Sleep(u32),
    Recover,
}

/// Power control that records the deep-sleep bracket
///
/// With a clock attached, `deep_sleep` advances it by the slept time.
#[derive(Debug)]
pub struct FakePower<'c> {
    clock: Option<&'c ManualClock>,
    pub events: Vec<PowerEvent>,
    pub vbat: Option<f32>,
    pub vcc: Option<f32>,
    pub boot_count: Option<u32>,
    pub console_attached: bool,
}

impl<'c> FakePower<'c> {
    pub fn new(clock: Option<&'c ManualClock>) -> Self {
        Self {
            clock,
            events: Vec::new(),
            vbat: None,
            vcc: None,
            boot_count: None,
            console_attached: false,
        }
    }

    pub fn sleeps(&self) -> impl Iterator<Item = u32> + '_ {
        self.events.iter().filter_map(|event| match event {
            PowerEvent::Sleep(ms) => Some(*ms),
            _ => None,
        })
    }
}

impl PowerControl for FakePower<'_> {
    fn deep_sleep_prepare(&mut self) {
        self.events.push(PowerEvent::Prepare);
    }

    fn deep_sleep(&mut self, duration_ms: u32) {
        self.events.push(PowerEvent::Sleep(duration_ms));
        if let Some(clock) = self.clock {
            clock.advance(duration_ms);
        }
    }

    fn deep_sleep_recovery(&mut self) {
        self.events.push(PowerEvent::Recover);
    }

    fn battery_voltage(&mut self) -> Option<f32> {
        self.vbat
    }

    fn supply_voltage(&mut self) -> Option<f32> {
        self.vcc
    }

    fn boot_count(&self) -> Option<u32> {
        self.boot_count
    }

    fn console_attached(&self) -> bool {
        self.console_attached
    }
}
