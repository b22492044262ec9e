use super::types::{ButtonSet, GestureState, RejectReason, Step, Trigger};

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct GestureTraceSample {
    pub packet_index: u32,
    pub state: GestureState,
    pub buttons: ButtonSet,
    pub delta_x: i32,
    pub delta_y: i32,
    pub overflow: bool,
    pub accumulated_x: i32,
    pub trigger: Option<Trigger>,
    pub reject_reason: RejectReason,
}

impl GestureTraceSample {
    pub(super) fn record_step(&mut self, step: Step) {
        match step {
            Step::Stay => {}
            Step::Reject(reason) => self.reject_reason = reason,
            Step::Advance(trigger) => self.trigger = Some(trigger),
        }
    }
}
