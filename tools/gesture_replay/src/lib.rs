use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

use anyhow::{anyhow, bail, Context, Result};
use mouse_gesture::{
    GestureConfig, GestureRecognizer, GestureSession, GestureState, InputEvent, IterSource,
    Notification, RejectReason, SessionLimits, SessionReport,
};

pub mod logging;

pub const TRACE_HEADER: &str = "packet,lb,mb,rb,dx,dy,x_ov,y_ov";

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ReplayRow {
    pub packet: u32,
    pub from: GestureState,
    pub to: GestureState,
    pub reject_reason: RejectReason,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ReplayReport {
    pub session: SessionReport,
    pub rows: Vec<ReplayRow>,
    pub final_state: GestureState,
}

impl ReplayReport {
    /// States entered during the replay, starting with `Initial`.
    pub fn visited(&self) -> Vec<GestureState> {
        let mut visited = vec![GestureState::Initial];
        visited.extend(self.rows.iter().map(|row| row.to));
        visited
    }
}

pub fn parse_trace(path: &Path) -> Result<Vec<Notification>> {
    let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    let reader = BufReader::new(file);

    let mut out = Vec::new();
    for (line_no, line_result) in reader.lines().enumerate() {
        let line_no = line_no + 1;
        let line =
            line_result.with_context(|| format!("failed to read {}:{line_no}", path.display()))?;
        if let Some(notification) = parse_trace_line(&line)
            .with_context(|| format!("{}:{line_no} invalid trace line", path.display()))?
        {
            out.push(notification);
        }
    }
    Ok(out)
}

pub fn parse_trace_line(line: &str) -> Result<Option<Notification>> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') || trimmed == TRACE_HEADER {
        return Ok(None);
    }

    let parts: Vec<&str> = trimmed.split(',').map(str::trim).collect();
    match parts[0] {
        "tick" => Ok(Some(Notification::TimerTick)),
        "abort" => Ok(Some(Notification::Abort)),
        "packet" => {
            if parts.len() != 8 {
                bail!("expected 8 columns for packet, got {}", parts.len());
            }
            Ok(Some(Notification::Packet(InputEvent {
                left_button: parse_flag(parts[1], "lb")?,
                middle_button: parse_flag(parts[2], "mb")?,
                right_button: parse_flag(parts[3], "rb")?,
                delta_x: parse_delta(parts[4], "dx")?,
                delta_y: parse_delta(parts[5], "dy")?,
                x_overflow: parse_flag(parts[6], "x_ov")?,
                y_overflow: parse_flag(parts[7], "y_ov")?,
            })))
        }
        other => Err(anyhow!("unknown record kind '{other}'")),
    }
}

pub fn parse_expected_states(path: &Path) -> Result<Vec<GestureState>> {
    let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    let reader = BufReader::new(file);

    let mut states = Vec::new();
    for (line_no, line_result) in reader.lines().enumerate() {
        let line_no = line_no + 1;
        let line =
            line_result.with_context(|| format!("failed to read {}:{line_no}", path.display()))?;
        let token = line.trim();
        if token.is_empty() || token.starts_with('#') {
            continue;
        }
        let state = GestureState::from_label(token).ok_or_else(|| {
            anyhow!(
                "{}:{line_no} invalid expected state: {token}",
                path.display()
            )
        })?;
        states.push(state);
    }
    Ok(states)
}

pub fn replay(
    notifications: Vec<Notification>,
    config: GestureConfig,
    limits: SessionLimits,
) -> Result<ReplayReport> {
    let recognizer = GestureRecognizer::new(config)?;
    let mut session = GestureSession::new(recognizer, limits)?;
    let mut source = IterSource::new(notifications.into_iter());

    let mut rows = Vec::new();
    let mut packet = 0u32;
    let report = session.run_with(&mut source, |_, output| {
        packet += 1;
        if let Some((from, to)) = output.state_change() {
            rows.push(ReplayRow {
                packet,
                from,
                to,
                reject_reason: output.rejection().unwrap_or_default(),
            });
        }
    })?;

    Ok(ReplayReport {
        session: report,
        rows,
        final_state: session.recognizer().state(),
    })
}

pub fn check_expected(report: &ReplayReport, expected: &[GestureState]) -> Result<()> {
    let actual = report.visited();
    if actual != expected {
        bail!(
            "state sequence mismatch\nexpected: {}\nactual:   {}",
            labels(expected),
            labels(&actual)
        );
    }
    Ok(())
}

fn labels(states: &[GestureState]) -> String {
    states
        .iter()
        .map(|state| state.label())
        .collect::<Vec<_>>()
        .join(",")
}

fn parse_flag(raw: &str, field: &str) -> Result<bool> {
    match raw {
        "0" => Ok(false),
        "1" => Ok(true),
        _ => Err(anyhow!("{field} must be 0 or 1, got '{raw}'")),
    }
}

fn parse_delta(raw: &str, field: &str) -> Result<i32> {
    raw.parse::<i32>()
        .with_context(|| format!("invalid {field} '{raw}'"))
}
