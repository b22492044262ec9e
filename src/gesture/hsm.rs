use log::{debug, error, info};
use statig::prelude::*;

use super::{
    config::GestureConfig,
    stroke::{directional_step, initial_step, vertex_step, Direction},
    table::TransitionTable,
    trace::GestureTraceSample,
    types::{ActionBuffer, GestureAction, GestureState, InputEvent, Step},
};

#[derive(Default)]
pub(super) struct DispatchContext {
    pub(super) actions: ActionBuffer,
}

pub(super) struct GestureHsm {
    pub(super) config: GestureConfig,
    table: &'static TransitionTable,
    pub(super) current: GestureState,
    pub(super) accumulated_x: i32,
    pub(super) buttons_were_clear_at_init: bool,
    pub(super) last_event: InputEvent,
    pub(super) packets: u32,
    pub(super) last_trace: GestureTraceSample,
}

impl GestureHsm {
    pub(super) fn new(config: GestureConfig, table: &'static TransitionTable) -> Self {
        Self {
            config,
            table,
            current: GestureState::Initial,
            accumulated_x: 0,
            buttons_were_clear_at_init: true,
            last_event: InputEvent::default(),
            packets: 0,
            last_trace: GestureTraceSample::default(),
        }
    }

    fn begin(&mut self, event: &InputEvent) {
        self.last_event = *event;
        self.packets = self.packets.wrapping_add(1);
        self.last_trace = GestureTraceSample {
            packet_index: self.packets,
            state: self.current,
            buttons: event.buttons(),
            delta_x: event.delta_x,
            delta_y: event.delta_y,
            overflow: event.overflowed(),
            accumulated_x: self.accumulated_x,
            ..GestureTraceSample::default()
        };
    }

    fn resolve(&mut self, context: &mut DispatchContext, step: Step) -> Outcome<State> {
        self.last_trace.record_step(step);
        let outcome = match step {
            Step::Stay => Handled,
            Step::Reject(reason) => {
                debug!(
                    "gesture: reject state={:?} reason={:?} packet={}",
                    self.current, reason, self.packets
                );
                context.actions.push(GestureAction::StrokeRejected {
                    state: self.current,
                    reason,
                });
                self.buttons_were_clear_at_init = self.last_event.buttons().is_clear();
                self.enter(context, GestureState::Initial)
            }
            Step::Advance(trigger) => match self.table.target(self.current, trigger) {
                Some(target) => self.enter(context, target),
                None => {
                    error!(
                        "gesture: undefined transition state={:?} trigger={:?}",
                        self.current, trigger
                    );
                    context.actions.push(GestureAction::UndefinedTransition {
                        state: self.current,
                        trigger,
                    });
                    Handled
                }
            },
        };
        self.last_trace.state = self.current;
        self.last_trace.accumulated_x = self.accumulated_x;
        outcome
    }

    fn enter(&mut self, context: &mut DispatchContext, target: GestureState) -> Outcome<State> {
        let from = self.current;
        if from == target {
            return Handled;
        }

        self.current = target;
        context
            .actions
            .push(GestureAction::StateChanged { from, to: target });
        debug!("gesture: transition from={:?} to={:?}", from, target);

        if target == GestureState::Final {
            context.actions.push(GestureAction::GestureCompleted);
            info!("gesture: inverted V recognized packets={}", self.packets);
        }
        Transition(Self::state_for(target))
    }

    fn state_for(target: GestureState) -> State {
        match target {
            GestureState::Initial => State::idle(),
            GestureState::DrawingUp => State::drawing_up(),
            GestureState::Vertex => State::vertex(),
            GestureState::DrawingDown => State::drawing_down(),
            GestureState::Final => State::completed(),
        }
    }
}

#[state_machine(initial = "State::idle()")]
impl GestureHsm {
    #[state]
    fn idle(&mut self, context: &mut DispatchContext, event: &InputEvent) -> Outcome<State> {
        self.begin(event);
        let step = initial_step(event, self.buttons_were_clear_at_init);
        self.resolve(context, step)
    }

    #[state]
    fn drawing_up(&mut self, context: &mut DispatchContext, event: &InputEvent) -> Outcome<State> {
        self.begin(event);
        let step = directional_step(Direction::Up, event, &mut self.accumulated_x, &self.config);
        self.resolve(context, step)
    }

    #[state]
    fn vertex(&mut self, context: &mut DispatchContext, event: &InputEvent) -> Outcome<State> {
        self.begin(event);
        let step = vertex_step(event, &self.config);
        self.resolve(context, step)
    }

    #[state]
    fn drawing_down(
        &mut self,
        context: &mut DispatchContext,
        event: &InputEvent,
    ) -> Outcome<State> {
        self.begin(event);
        let step = directional_step(
            Direction::Down,
            event,
            &mut self.accumulated_x,
            &self.config,
        );
        self.resolve(context, step)
    }

    #[state]
    fn completed(&mut self, event: &InputEvent) -> Outcome<State> {
        self.begin(event);
        Handled
    }
}
