pub mod config;
pub mod engine;
mod hsm;
pub mod stroke;
pub mod table;
pub mod trace;
pub mod types;


pub use config::{GestureConfig, MIN_SLOPE};
pub use engine::{GestureOutput, GestureRecognizer};
pub use table::{TableDefect, TransitionTable, GESTURE_TRANSITIONS};
pub use trace::GestureTraceSample;
pub use types::{
    ActionBuffer, Button, ButtonSet, GestureAction, GestureState, InputEvent, RejectReason, Step,
    Trigger,
};
