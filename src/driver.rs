//! Driver loop that feeds packets from a source into a [`GestureRecognizer`].
//!
//! The recognizer itself has no notion of time; idle timeouts and operator
//! aborts live here.

use core::fmt::Display;

use log::{debug, info, warn};
use thiserror::Error;

use crate::{
    config::{ConfigError, POSITIVE_U32},
    gesture::{GestureOutput, GestureRecognizer, InputEvent},
};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Notification {
    Packet(InputEvent),
    TimerTick,
    Abort,
}

pub trait PacketSource {
    type Error: Display;

    /// `Ok(None)` means the source is closed and no more notifications follow.
    fn recv(&mut self) -> Result<Option<Notification>, Self::Error>;
}

pub struct IterSource<I> {
    inner: I,
}

impl<I> IterSource<I> {
    pub fn new(inner: I) -> Self {
        Self { inner }
    }
}

impl<I: Iterator<Item = Notification>> PacketSource for IterSource<I> {
    type Error = core::convert::Infallible;

    fn recv(&mut self) -> Result<Option<Notification>, Self::Error> {
        Ok(self.inner.next())
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct SessionLimits {
    pub timer_hz: u32,
    /// Seconds without a packet before the session gives up. `None` waits forever.
    pub idle_timeout_s: Option<u32>,
    pub max_receive_errors: u32,
}

impl SessionLimits {
    pub const DEFAULT_TIMER_HZ: u32 = 60;
    pub const DEFAULT_MAX_RECEIVE_ERRORS: u32 = 16;

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.timer_hz == 0 {
            return Err(ConfigError::OutOfRange {
                key: "session.timer_hz",
                requirement: POSITIVE_U32,
                value: 0,
            });
        }
        if self.idle_timeout_s == Some(0) {
            return Err(ConfigError::OutOfRange {
                key: "session.idle_timeout_s",
                requirement: POSITIVE_U32,
                value: 0,
            });
        }
        Ok(())
    }
}

impl Default for SessionLimits {
    fn default() -> Self {
        Self {
            timer_hz: Self::DEFAULT_TIMER_HZ,
            idle_timeout_s: None,
            max_receive_errors: Self::DEFAULT_MAX_RECEIVE_ERRORS,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SessionOutcome {
    Completed,
    IdleTimeout,
    Aborted,
    SourceClosed,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct SessionReport {
    pub outcome: SessionOutcome,
    pub packets: u32,
    pub ticks: u32,
    pub rejections: u32,
}

#[derive(Debug, Error)]
pub enum DriverError {
    #[error("gesture recognizer is not initialized")]
    NotInitialized,
    #[error("packet source failed {attempts} times in a row: {last}")]
    ReceiveFailed { attempts: u32, last: String },
    #[error(transparent)]
    Config(#[from] ConfigError),
}

struct IdleTimer {
    timer_hz: u32,
    timeout_s: Option<u32>,
    remaining_s: u32,
    ticks: u32,
}

impl IdleTimer {
    fn new(limits: &SessionLimits) -> Self {
        Self {
            timer_hz: limits.timer_hz,
            timeout_s: limits.idle_timeout_s,
            remaining_s: limits.idle_timeout_s.unwrap_or(0),
            ticks: 0,
        }
    }

    fn reset(&mut self) {
        self.remaining_s = self.timeout_s.unwrap_or(0);
        self.ticks = 0;
    }

    /// Returns true once the idle budget is spent.
    fn tick(&mut self) -> bool {
        if self.timeout_s.is_none() {
            return false;
        }
        self.ticks += 1;
        if self.ticks >= self.timer_hz {
            self.ticks = 0;
            self.remaining_s = self.remaining_s.saturating_sub(1);
        }
        self.remaining_s == 0
    }
}

pub struct GestureSession {
    recognizer: GestureRecognizer,
    limits: SessionLimits,
}

impl GestureSession {
    pub fn new(recognizer: GestureRecognizer, limits: SessionLimits) -> Result<Self, DriverError> {
        limits.validate()?;
        if !recognizer.is_initialized() {
            return Err(DriverError::NotInitialized);
        }
        Ok(Self { recognizer, limits })
    }

    pub fn recognizer(&self) -> &GestureRecognizer {
        &self.recognizer
    }

    pub fn into_recognizer(self) -> GestureRecognizer {
        self.recognizer
    }

    pub fn run<S: PacketSource>(&mut self, source: &mut S) -> Result<SessionReport, DriverError> {
        self.run_with(source, |_, _| {})
    }

    /// Like [`GestureSession::run`], calling `observer` after every handled packet.
    pub fn run_with<S, F>(
        &mut self,
        source: &mut S,
        mut observer: F,
    ) -> Result<SessionReport, DriverError>
    where
        S: PacketSource,
        F: FnMut(&InputEvent, &GestureOutput),
    {
        let mut idle = IdleTimer::new(&self.limits);
        let mut packets = 0u32;
        let mut ticks = 0u32;
        let mut rejections = 0u32;
        let mut failures = 0u32;

        let outcome = loop {
            if self.recognizer.ended() {
                break SessionOutcome::Completed;
            }

            let notification = match source.recv() {
                Ok(Some(notification)) => {
                    failures = 0;
                    notification
                }
                Ok(None) => break SessionOutcome::SourceClosed,
                Err(err) => {
                    failures += 1;
                    warn!("gesture: receive failed attempt={failures} err={err}");
                    if failures > self.limits.max_receive_errors {
                        return Err(DriverError::ReceiveFailed {
                            attempts: failures,
                            last: err.to_string(),
                        });
                    }
                    continue;
                }
            };

            match notification {
                Notification::Packet(event) => {
                    packets = packets.saturating_add(1);
                    debug!("gesture: packet {event}");
                    let output = self.recognizer.handle(event);
                    if output.rejection().is_some() {
                        rejections = rejections.saturating_add(1);
                    }
                    observer(&event, &output);
                    idle.reset();
                }
                Notification::TimerTick => {
                    ticks = ticks.saturating_add(1);
                    if idle.tick() {
                        break SessionOutcome::IdleTimeout;
                    }
                }
                Notification::Abort => break SessionOutcome::Aborted,
            }
        };

        info!(
            "gesture: session finished outcome={outcome:?} packets={packets} ticks={ticks} rejections={rejections}"
        );
        Ok(SessionReport {
            outcome,
            packets,
            ticks,
            rejections,
        })
    }
}
