#![deny(unsafe_code)]
#![deny(warnings)]
//! Measurement loop states and the pure transition function
//!
//! [`next_state`] only decides. Every side effect (timers, sensor, radio,
//! flags) belongs to the executor in [`super::MeasurementLoop`].

/// Measurement loop states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum State {
    /// Reset the measurement and cadence bookkeeping
    Initial,
    /// Parked, waiting for an activate request
    Inactive,
    /// Waiting for the next measurement cycle
    Sleeping,
    /// Sensor waking up, waiting for it to settle
    Wake,
    /// Taking the measurement
    Measure,
    /// Putting the sensor back to sleep
    SleepSensor,
    /// Uplink in flight
    Transmit,
    /// Stopped
    Final,
}

impl State {
    /// Short name for log output
    pub const fn name(self) -> &'static str {
        match self {
            Self::Initial => "Initial",
            Self::Inactive => "Inactive",
            Self::Sleeping => "Sleeping",
            Self::Wake => "Wake",
            Self::Measure => "Measure",
            Self::SleepSensor => "SleepSensor",
            Self::Transmit => "Transmit",
            Self::Final => "Final",
        }
    }

    /// States that consume pending activate/deactivate requests
    pub const fn accepts_requests(self) -> bool {
        matches!(self, Self::Inactive | Self::Sleeping)
    }
}

/// A consumed activate/deactivate request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Request {
    Activate,
    Deactivate,
}

/// Conditions sampled for one dispatch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Inputs {
    /// Request consumed by this dispatch
    pub request: Option<Request>,
    /// `end()` has been called
    pub exit: bool,
    /// The armed timer expired
    pub timer_fired: bool,
    /// Sensor has a fresh sample
    pub sensor_ready: bool,
    /// The uplink completed (either way)
    pub tx_complete: bool,
}

/// Exit condition of `state` under `inputs`
///
/// `None` means remain in `state`.
pub fn next_state(state: State, inputs: &Inputs) -> Option<State> {
    match state {
        State::Initial => Some(State::Inactive),
        State::Inactive => {
            if inputs.exit {
                Some(State::Final)
            } else if inputs.request == Some(Request::Activate) {
                Some(State::Wake)
            } else {
                None
            }
        }
        State::Sleeping => {
            if inputs.exit || inputs.request == Some(Request::Deactivate) {
                Some(State::Inactive)
            } else if inputs.timer_fired {
                Some(State::Wake)
            } else {
                None
            }
        }
        State::Wake => (inputs.timer_fired || inputs.sensor_ready).then_some(State::Measure),
        State::Measure => Some(State::SleepSensor),
        State::SleepSensor => Some(State::Transmit),
        State::Transmit => inputs.tx_complete.then_some(State::Sleeping),
        State::Final => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [State; 8] = [
        State::Initial,
        State::Inactive,
        State::Sleeping,
        State::Wake,
        State::Measure,
        State::SleepSensor,
        State::Transmit,
        State::Final,
    ];

    #[test]
    fn test_waiting_states_hold_without_inputs() {
        let idle = Inputs::default();
        for state in [
            State::Inactive,
            State::Sleeping,
            State::Wake,
            State::Transmit,
            State::Final,
        ] {
            assert_eq!(next_state(state, &idle), None, "{}", state.name());
        }
    }

    #[test]
    fn test_unconditional_steps() {
        let idle = Inputs::default();
        assert_eq!(next_state(State::Initial, &idle), Some(State::Inactive));
        assert_eq!(next_state(State::Measure, &idle), Some(State::SleepSensor));
        assert_eq!(next_state(State::SleepSensor, &idle), Some(State::Transmit));
    }

    #[test]
    fn test_inactive() {
        let activate = Inputs {
            request: Some(Request::Activate),
            ..Inputs::default()
        };
        let deactivate = Inputs {
            request: Some(Request::Deactivate),
            ..Inputs::default()
        };
        let exit = Inputs {
            exit: true,
            ..activate
        };

        assert_eq!(next_state(State::Inactive, &activate), Some(State::Wake));
        assert_eq!(next_state(State::Inactive, &deactivate), None);
        assert_eq!(next_state(State::Inactive, &exit), Some(State::Final));
    }

    #[test]
    fn test_sleeping() {
        let timer = Inputs {
            timer_fired: true,
            ..Inputs::default()
        };
        let activate = Inputs {
            request: Some(Request::Activate),
            ..Inputs::default()
        };
        let deactivate = Inputs {
            request: Some(Request::Deactivate),
            ..timer
        };
        let exit = Inputs {
            exit: true,
            ..timer
        };

        assert_eq!(next_state(State::Sleeping, &timer), Some(State::Wake));
        assert_eq!(next_state(State::Sleeping, &activate), None);
        assert_eq!(next_state(State::Sleeping, &deactivate), Some(State::Inactive));
        assert_eq!(next_state(State::Sleeping, &exit), Some(State::Inactive));
    }

    #[test]
    fn test_wake_leaves_on_timer_or_ready() {
        let ready = Inputs {
            sensor_ready: true,
            ..Inputs::default()
        };
        let timer = Inputs {
            timer_fired: true,
            ..Inputs::default()
        };
        assert_eq!(next_state(State::Wake, &ready), Some(State::Measure));
        assert_eq!(next_state(State::Wake, &timer), Some(State::Measure));
    }

    #[test]
    fn test_transmit_waits_for_completion() {
        let done = Inputs {
            tx_complete: true,
            ..Inputs::default()
        };
        assert_eq!(next_state(State::Transmit, &done), Some(State::Sleeping));
    }

    #[test]
    fn test_final_is_terminal() {
        let everything = Inputs {
            request: Some(Request::Activate),
            exit: true,
            timer_fired: true,
            sensor_ready: true,
            tx_complete: true,
        };
        assert_eq!(next_state(State::Final, &everything), None);
    }

    #[test]
    fn test_only_parked_states_take_requests() {
        let takers: usize = ALL.iter().filter(|s| s.accepts_requests()).count();
        assert_eq!(takers, 2);
        assert!(State::Inactive.accepts_requests());
        assert!(State::Sleeping.accepts_requests());
    }
}
