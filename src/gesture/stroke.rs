use super::{
    config::GestureConfig,
    types::{Button, InputEvent, RejectReason, Step, Trigger},
};

/// Which leg of the inverted V is being drawn.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    pub const fn button(self) -> Button {
        match self {
            Self::Up => Button::Left,
            Self::Down => Button::Right,
        }
    }

    pub const fn release(self) -> Trigger {
        match self {
            Self::Up => Trigger::LeftRelease,
            Self::Down => Trigger::RightRelease,
        }
    }

    const fn against(self, delta_y: i32) -> bool {
        match self {
            Self::Up => delta_y < 0,
            Self::Down => delta_y > 0,
        }
    }
}

fn exceeds(delta: i32, tolerance: u32) -> bool {
    delta.unsigned_abs() > tolerance
}

fn reset(accumulated_x: &mut i32, reason: RejectReason) -> Step {
    *accumulated_x = 0;
    Step::Reject(reason)
}

pub fn initial_step(event: &InputEvent, buttons_were_clear: bool) -> Step {
    if event.overflowed() {
        return Step::Reject(RejectReason::Overflow);
    }
    if !buttons_were_clear {
        return Step::Reject(RejectReason::ButtonsHeldAtInit);
    }

    let buttons = event.buttons();
    if buttons.is_clear() {
        return Step::Stay;
    }
    if buttons.is_only(Button::Left) {
        return Step::Advance(Trigger::LeftClick);
    }
    Step::Reject(RejectReason::ButtonCombo)
}

/// Shared handler for both legs; `direction` picks the held button and the Y sign.
pub fn directional_step(
    direction: Direction,
    event: &InputEvent,
    accumulated_x: &mut i32,
    config: &GestureConfig,
) -> Step {
    if event.overflowed() {
        return reset(accumulated_x, RejectReason::Overflow);
    }

    let buttons = event.buttons();
    if !buttons.is_only(direction.button()) {
        if !buttons.is_clear() {
            return reset(accumulated_x, RejectReason::ButtonCombo);
        }
        if *accumulated_x >= config.min_x_displacement {
            *accumulated_x = 0;
            return Step::Advance(direction.release());
        }
        return reset(accumulated_x, RejectReason::PrematureRelease);
    }

    if event.delta_x < 0 && exceeds(event.delta_x, config.tolerance) {
        return reset(accumulated_x, RejectReason::BackwardMotion);
    }
    if direction.against(event.delta_y) && exceeds(event.delta_y, config.tolerance) {
        return reset(accumulated_x, RejectReason::BackwardMotion);
    }

    let dx = event.delta_x.unsigned_abs();
    let dy = event.delta_y.unsigned_abs();
    if dx == 0 {
        return Step::Stay;
    }

    // Truncating on purpose: a 3/2 sample has slope 1.
    if dy / dx <= config.min_slope {
        return reset(accumulated_x, RejectReason::ShallowSlope);
    }

    let dx = i32::try_from(dx).unwrap_or(i32::MAX);
    *accumulated_x = accumulated_x.saturating_add(dx);
    Step::Stay
}

pub fn vertex_step(event: &InputEvent, config: &GestureConfig) -> Step {
    if event.overflowed() {
        return Step::Reject(RejectReason::Overflow);
    }
    if exceeds(event.delta_x, config.tolerance) || exceeds(event.delta_y, config.tolerance) {
        return Step::Reject(RejectReason::ExcessMotion);
    }

    let buttons = event.buttons();
    if buttons.is_clear() {
        return Step::Stay;
    }
    if buttons.is_only(Button::Right) {
        return Step::Advance(Trigger::RightClick);
    }
    if buttons.is_only(Button::Left) {
        return Step::Advance(Trigger::LeftClick);
    }
    Step::Reject(RejectReason::ButtonCombo)
}
