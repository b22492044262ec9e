use log::warn;
use statig::blocking::IntoStateMachineExt as _;

use super::{
    config::GestureConfig,
    hsm::{DispatchContext, GestureHsm},
    table::{TransitionTable, GESTURE_TRANSITIONS},
    trace::GestureTraceSample,
    types::{ActionBuffer, GestureState, InputEvent, RejectReason},
};
use crate::config::ConfigError;

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct GestureOutput {
    pub actions: ActionBuffer,
    pub trace: GestureTraceSample,
}

impl GestureOutput {
    pub fn completed(&self) -> bool {
        self.actions.contains_completion()
    }

    pub fn rejection(&self) -> Option<RejectReason> {
        self.actions.rejection()
    }

    pub fn state_change(&self) -> Option<(GestureState, GestureState)> {
        self.actions.state_change()
    }
}

/// Inverted-V mouse gesture recognizer. `Default` yields a recognizer that
/// ignores packets until [`GestureRecognizer::init`] succeeds.
#[derive(Default)]
pub struct GestureRecognizer {
    machine: Option<statig::blocking::StateMachine<GestureHsm>>,
}

impl GestureRecognizer {
    pub fn new(config: GestureConfig) -> Result<Self, ConfigError> {
        let mut recognizer = Self::default();
        recognizer.init(config)?;
        Ok(recognizer)
    }

    pub fn init(&mut self, config: GestureConfig) -> Result<(), ConfigError> {
        self.init_on(config, &GESTURE_TRANSITIONS)
    }

    /// Builds a recognizer that resolves triggers through `table`.
    pub(crate) fn with_table(
        config: GestureConfig,
        table: &'static TransitionTable,
    ) -> Result<Self, ConfigError> {
        let mut recognizer = Self::default();
        recognizer.init_on(config, table)?;
        Ok(recognizer)
    }

    fn init_on(
        &mut self,
        config: GestureConfig,
        table: &'static TransitionTable,
    ) -> Result<(), ConfigError> {
        config.validate()?;
        self.machine = Some(GestureHsm::new(config, table).state_machine());
        Ok(())
    }

    pub fn init_with(&mut self, min_x_displacement: i32, tolerance: u32) -> Result<(), ConfigError> {
        self.init(GestureConfig::new(min_x_displacement, tolerance)?)
    }

    pub fn is_initialized(&self) -> bool {
        self.machine.is_some()
    }

    pub fn handle(&mut self, event: InputEvent) -> GestureOutput {
        self.handle_packet(Some(event))
    }

    pub fn handle_packet(&mut self, event: Option<InputEvent>) -> GestureOutput {
        let Some(event) = event else {
            return self.idle_output();
        };
        if self.ended() {
            return self.idle_output();
        }
        let Some(machine) = self.machine.as_mut() else {
            warn!("gesture: packet ignored, recognizer not initialized");
            return GestureOutput::default();
        };

        let mut context = DispatchContext::default();
        machine.handle_with_context(&event, &mut context);
        GestureOutput {
            actions: context.actions,
            trace: machine.inner().last_trace,
        }
    }

    pub fn ended(&self) -> bool {
        self.state() == GestureState::Final
    }

    pub fn state(&self) -> GestureState {
        self.hsm().map_or(GestureState::Initial, |hsm| hsm.current)
    }

    pub fn accumulated_x(&self) -> i32 {
        self.hsm().map_or(0, |hsm| hsm.accumulated_x)
    }

    pub fn config(&self) -> Option<GestureConfig> {
        self.hsm().map(|hsm| hsm.config)
    }

    pub fn buttons_were_clear_at_init(&self) -> bool {
        self.hsm().is_some_and(|hsm| hsm.buttons_were_clear_at_init)
    }

    pub fn last_event(&self) -> Option<InputEvent> {
        self.hsm().map(|hsm| hsm.last_event)
    }

    pub fn last_trace(&self) -> GestureTraceSample {
        self.hsm().map(|hsm| hsm.last_trace).unwrap_or_default()
    }

    fn hsm(&self) -> Option<&GestureHsm> {
        self.machine.as_ref().map(|machine| machine.inner())
    }

    fn idle_output(&self) -> GestureOutput {
        GestureOutput {
            actions: ActionBuffer::new(),
            trace: self.last_trace(),
        }
    }
}
