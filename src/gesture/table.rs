use super::types::{GestureState, Trigger};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TableDefect {
    FinalHasExit { trigger: Trigger },
    DeadEnd { state: GestureState },
    TargetsInitial { from: GestureState, trigger: Trigger },
}

/// `(state, trigger) -> state` lookup. Missing entries are undefined transitions.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct TransitionTable {
    targets: [[Option<GestureState>; Trigger::COUNT]; GestureState::COUNT],
}

impl TransitionTable {
    pub const fn empty() -> Self {
        Self {
            targets: [[None; Trigger::COUNT]; GestureState::COUNT],
        }
    }

    pub const fn with(mut self, from: GestureState, trigger: Trigger, to: GestureState) -> Self {
        self.targets[from as usize][trigger as usize] = Some(to);
        self
    }

    pub const fn target(&self, from: GestureState, trigger: Trigger) -> Option<GestureState> {
        self.targets[from as usize][trigger as usize]
    }

    /// Rejections are routed to `Initial` outside the table, so no entry may target it.
    pub const fn defect(&self) -> Option<TableDefect> {
        let mut s = 0;
        while s < GestureState::COUNT {
            let from = GestureState::ALL[s];
            let mut exits = 0;
            let mut t = 0;
            while t < Trigger::COUNT {
                if let Some(to) = self.targets[s][t] {
                    let trigger = Trigger::ALL[t];
                    if matches!(from, GestureState::Final) {
                        return Some(TableDefect::FinalHasExit { trigger });
                    }
                    if matches!(to, GestureState::Initial) {
                        return Some(TableDefect::TargetsInitial { from, trigger });
                    }
                    exits += 1;
                }
                t += 1;
            }
            if exits == 0 && !matches!(from, GestureState::Final) {
                return Some(TableDefect::DeadEnd { state: from });
            }
            s += 1;
        }
        None
    }

    pub fn validated(self) -> Result<Self, TableDefect> {
        match self.defect() {
            Some(defect) => Err(defect),
            None => Ok(self),
        }
    }
}

pub const GESTURE_TRANSITIONS: TransitionTable = TransitionTable::empty()
    .with(GestureState::Initial, Trigger::LeftClick, GestureState::DrawingUp)
    .with(GestureState::DrawingUp, Trigger::LeftRelease, GestureState::Vertex)
    .with(GestureState::Vertex, Trigger::LeftClick, GestureState::DrawingUp)
    .with(GestureState::Vertex, Trigger::RightClick, GestureState::DrawingDown)
    .with(GestureState::DrawingDown, Trigger::RightRelease, GestureState::Final);

const _: () = assert!(
    GESTURE_TRANSITIONS.defect().is_none(),
    "gesture transition table is malformed"
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inverted_v_path_is_defined() {
        let path = [
            (GestureState::Initial, Trigger::LeftClick, GestureState::DrawingUp),
            (GestureState::DrawingUp, Trigger::LeftRelease, GestureState::Vertex),
            (GestureState::Vertex, Trigger::RightClick, GestureState::DrawingDown),
            (GestureState::DrawingDown, Trigger::RightRelease, GestureState::Final),
        ];
        for (from, trigger, to) in path {
            assert_eq!(GESTURE_TRANSITIONS.target(from, trigger), Some(to));
        }
        assert_eq!(
            GESTURE_TRANSITIONS.target(GestureState::Vertex, Trigger::LeftClick),
            Some(GestureState::DrawingUp)
        );
    }

    #[test]
    fn uncovered_pairs_are_undefined() {
        let defined = 5;
        let undefined = GestureState::ALL
            .into_iter()
            .flat_map(|state| Trigger::ALL.into_iter().map(move |trigger| (state, trigger)))
            .filter(|(state, trigger)| GESTURE_TRANSITIONS.target(*state, *trigger).is_none())
            .count();
        assert_eq!(undefined, GestureState::COUNT * Trigger::COUNT - defined);

        for trigger in Trigger::ALL {
            assert_eq!(GESTURE_TRANSITIONS.target(GestureState::Final, trigger), None);
        }
        assert_eq!(
            GESTURE_TRANSITIONS.target(GestureState::Initial, Trigger::RightClick),
            None
        );
    }

    #[test]
    fn validation_flags_malformed_tables() {
        assert!(GESTURE_TRANSITIONS.validated().is_ok());

        let final_exit = GESTURE_TRANSITIONS.with(
            GestureState::Final,
            Trigger::LeftClick,
            GestureState::DrawingUp,
        );
        assert_eq!(
            final_exit.validated(),
            Err(TableDefect::FinalHasExit {
                trigger: Trigger::LeftClick
            })
        );

        let back_to_initial = GESTURE_TRANSITIONS.with(
            GestureState::Vertex,
            Trigger::LeftRelease,
            GestureState::Initial,
        );
        assert_eq!(
            back_to_initial.defect(),
            Some(TableDefect::TargetsInitial {
                from: GestureState::Vertex,
                trigger: Trigger::LeftRelease
            })
        );

        let dead_end = TransitionTable::empty().with(
            GestureState::Initial,
            Trigger::LeftClick,
            GestureState::DrawingUp,
        );
        assert_eq!(
            dead_end.defect(),
            Some(TableDefect::DeadEnd {
                state: GestureState::DrawingUp
            })
        );
    }
}
