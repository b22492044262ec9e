use core::fmt;

use heapless::Vec;
use log::warn;

const ACTION_SLOTS: usize = 4;

/// One decoded mouse packet as delivered by the packet source.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct InputEvent {
    pub left_button: bool,
    pub middle_button: bool,
    pub right_button: bool,
    pub delta_x: i32,
    pub delta_y: i32,
    pub x_overflow: bool,
    pub y_overflow: bool,
}

impl InputEvent {
    pub const fn buttons(&self) -> ButtonSet {
        ButtonSet {
            left: self.left_button,
            middle: self.middle_button,
            right: self.right_button,
        }
    }

    pub const fn overflowed(&self) -> bool {
        self.x_overflow || self.y_overflow
    }
}

impl fmt::Display for InputEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "lb={} mb={} rb={} x={} y={} x_ov={} y_ov={}",
            u8::from(self.left_button),
            u8::from(self.middle_button),
            u8::from(self.right_button),
            self.delta_x,
            self.delta_y,
            u8::from(self.x_overflow),
            u8::from(self.y_overflow),
        )
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Button {
    Left,
    Middle,
    Right,
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct ButtonSet {
    pub left: bool,
    pub middle: bool,
    pub right: bool,
}

impl ButtonSet {
    pub const NONE: Self = Self {
        left: false,
        middle: false,
        right: false,
    };

    pub const fn only(button: Button) -> Self {
        match button {
            Button::Left => Self {
                left: true,
                ..Self::NONE
            },
            Button::Middle => Self {
                middle: true,
                ..Self::NONE
            },
            Button::Right => Self {
                right: true,
                ..Self::NONE
            },
        }
    }

    pub const fn is_clear(self) -> bool {
        !self.left && !self.middle && !self.right
    }

    pub const fn is_only(self, button: Button) -> bool {
        match button {
            Button::Left => self.left && !self.middle && !self.right,
            Button::Middle => !self.left && self.middle && !self.right,
            Button::Right => !self.left && !self.middle && self.right,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
#[repr(u8)]
pub enum GestureState {
    #[default]
    Initial = 0,
    DrawingUp = 1,
    Vertex = 2,
    DrawingDown = 3,
    Final = 4,
}

impl GestureState {
    pub const COUNT: usize = 5;
    pub const ALL: [Self; Self::COUNT] = [
        Self::Initial,
        Self::DrawingUp,
        Self::Vertex,
        Self::DrawingDown,
        Self::Final,
    ];

    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Initial => "initial",
            Self::DrawingUp => "drawing_up",
            Self::Vertex => "vertex",
            Self::DrawingDown => "drawing_down",
            Self::Final => "final",
        }
    }

    pub fn from_label(raw: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|state| state.label().eq_ignore_ascii_case(raw.trim()))
    }
}

/// Button edge that moves the gesture forward. Columns of the transition table.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
#[repr(u8)]
pub enum Trigger {
    LeftClick = 0,
    RightClick = 1,
    LeftRelease = 2,
    RightRelease = 3,
}

impl Trigger {
    pub const COUNT: usize = 4;
    pub const ALL: [Self; Self::COUNT] = [
        Self::LeftClick,
        Self::RightClick,
        Self::LeftRelease,
        Self::RightRelease,
    ];
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[repr(u8)]
pub enum RejectReason {
    #[default]
    None = 0,
    Overflow = 1,
    BackwardMotion = 2,
    ShallowSlope = 3,
    ButtonCombo = 4,
    PrematureRelease = 5,
    ExcessMotion = 6,
    ButtonsHeldAtInit = 7,
}

impl RejectReason {
    pub const fn as_u8(self) -> u8 {
        self as u8
    }
}

/// What a state handler decided for one packet.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Step {
    Stay,
    Reject(RejectReason),
    Advance(Trigger),
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum GestureAction {
    StateChanged {
        from: GestureState,
        to: GestureState,
    },
    StrokeRejected {
        state: GestureState,
        reason: RejectReason,
    },
    GestureCompleted,
    UndefinedTransition {
        state: GestureState,
        trigger: Trigger,
    },
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ActionBuffer {
    slots: Vec<GestureAction, ACTION_SLOTS>,
}

impl ActionBuffer {
    pub const MAX: usize = ACTION_SLOTS;

    pub const fn new() -> Self {
        Self { slots: Vec::new() }
    }

    /// A packet produces at most three actions; a full buffer drops the newest.
    pub fn push(&mut self, action: GestureAction) {
        if let Err(dropped) = self.slots.push(action) {
            warn!("gesture: action buffer full, dropped={:?}", dropped);
            debug_assert!(false, "action buffer overflow");
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &GestureAction> {
        self.slots.iter()
    }

    pub fn state_change(&self) -> Option<(GestureState, GestureState)> {
        self.iter().find_map(|action| match action {
            GestureAction::StateChanged { from, to } => Some((*from, *to)),
            _ => None,
        })
    }

    pub fn rejection(&self) -> Option<RejectReason> {
        self.iter().find_map(|action| match action {
            GestureAction::StrokeRejected { reason, .. } => Some(*reason),
            _ => None,
        })
    }

    pub fn contains_completion(&self) -> bool {
        self.iter()
            .any(|action| matches!(action, GestureAction::GestureCompleted))
    }

    pub fn contains_undefined_transition(&self) -> bool {
        self.iter()
            .any(|action| matches!(action, GestureAction::UndefinedTransition { .. }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_buffer_holds_a_full_packet() {
        let mut actions = ActionBuffer::new();
        actions.push(GestureAction::StrokeRejected {
            state: GestureState::DrawingUp,
            reason: RejectReason::Overflow,
        });
        actions.push(GestureAction::StateChanged {
            from: GestureState::DrawingDown,
            to: GestureState::Final,
        });
        actions.push(GestureAction::GestureCompleted);
        assert_eq!(actions.len(), 3);
        assert!(actions.contains_completion());
        assert_eq!(actions.rejection(), Some(RejectReason::Overflow));
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "action buffer overflow")]
    fn overfilled_action_buffer_is_caught_in_debug_builds() {
        let mut actions = ActionBuffer::new();
        for _ in 0..=ActionBuffer::MAX {
            actions.push(GestureAction::GestureCompleted);
        }
    }
}
