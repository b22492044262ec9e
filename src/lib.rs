//! Recognition of the "inverted V" mouse gesture from a stream of decoded
//! PS/2 packets, plus the driver loop that feeds it.

pub mod config;
pub mod driver;
pub mod gesture;

pub use config::{load_resolved, ConfigError, GestureConfigFile, ResolvedConfig};
pub use driver::{
    DriverError, GestureSession, IterSource, Notification, PacketSource, SessionLimits,
    SessionOutcome, SessionReport,
};
pub use gesture::{
    GestureConfig, GestureOutput, GestureRecognizer, GestureState, InputEvent, RejectReason,
    MIN_SLOPE,
};
