//! Serial console operator input.
//!
//! At install time the operator types the measured river depth (mm) on the
//! console. A background thread forwards complete lines over a channel so
//! the calibration wait can time out instead of blocking forever.
//!
//! Lines that do not parse as an integer are logged and skipped; the wait
//! continues until a valid value arrives or the deadline passes.
//!
//! After calibration the same console accepts tuning commands, polled
//! once per cycle:
//!
//! ```text
//! cadence <ms>        normal cadence
//! fast-cadence <ms>   accelerated cadence
//! fast-above <mm>     accelerated-mode threshold
//! ignore <mm>         ignore threshold
//! heartbeat every     heartbeat on every idle cycle
//! heartbeat <n>       heartbeat after n idle cycles
//! save                persist the running configuration
//! ```

use std::io::{self, BufRead, BufReader, Read};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, TryRecvError};
use std::thread;
use std::time::{Duration, Instant};

use log::{debug, warn};

use crate::app::commands::AppCommand;
use crate::app::ports::OperatorInput;
use crate::decision::HeartbeatPolicy;

pub struct ConsoleInput {
    lines: Receiver<String>,
}

impl ConsoleInput {
    /// Read from the process stdin (UART0 / USB-CDC on the node).
    pub fn stdin() -> io::Result<Self> {
        Self::from_reader(io::stdin())
    }

    /// Read lines from any byte source.
    pub fn from_reader<R: Read + Send + 'static>(reader: R) -> io::Result<Self> {
        let (tx, rx) = mpsc::channel();
        thread::Builder::new()
            .name("console-rx".into())
            .spawn(move || {
                for line in BufReader::new(reader).lines() {
                    match line {
                        Ok(line) => {
                            if tx.send(line).is_err() {
                                break;
                            }
                        }
                        Err(e) => {
                            warn!("console: read error: {}", e);
                            break;
                        }
                    }
                }
                debug!("console: reader finished");
            })?;
        Ok(Self { lines: rx })
    }
}

impl ConsoleInput {
    /// Next pending command, without blocking. Unknown lines are logged
    /// and dropped.
    pub fn poll_command(&mut self) -> Option<AppCommand> {
        loop {
            match self.lines.try_recv() {
                Ok(line) => {
                    if line.trim().is_empty() {
                        continue;
                    }
                    match parse_command(&line) {
                        Some(cmd) => return Some(cmd),
                        None => warn!("console: unknown command '{}'", line.trim()),
                    }
                }
                Err(TryRecvError::Empty | TryRecvError::Disconnected) => return None,
            }
        }
    }
}

/// Parse one console line as a tuning command.
pub fn parse_command(line: &str) -> Option<AppCommand> {
    let mut words = line.split_whitespace();
    let verb = words.next()?;
    let arg = words.next();
    if words.next().is_some() {
        return None;
    }
    let cmd = match (verb, arg) {
        ("cadence", Some(ms)) => AppCommand::SetCadence(ms.parse().ok()?),
        ("fast-cadence", Some(ms)) => AppCommand::SetAcceleratedCadence(ms.parse().ok()?),
        ("fast-above", Some(mm)) => AppCommand::SetAccelerationThreshold(mm.parse().ok()?),
        ("ignore", Some(mm)) => AppCommand::SetIgnoreThreshold(mm.parse().ok()?),
        ("heartbeat", Some("every")) => AppCommand::SetHeartbeatPolicy(HeartbeatPolicy::EveryIdleCycle),
        ("heartbeat", Some(n)) => AppCommand::SetHeartbeatPolicy(HeartbeatPolicy::AfterIdleCycles(n.parse().ok()?)),
        ("save", None) => AppCommand::SaveConfig,
        _ => return None,
    };
    Some(cmd)
}

/// Parse one console line as a baseline depth.
pub fn parse_baseline(line: &str) -> Option<i32> {
    line.trim().parse().ok()
}

impl OperatorInput for ConsoleInput {
    fn read_baseline(&mut self, timeout: Duration) -> Option<i32> {
        let deadline = Instant::now() + timeout;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.lines.recv_timeout(remaining) {
                Ok(line) => match parse_baseline(&line) {
                    Some(value) => return Some(value),
                    None if line.trim().is_empty() => {}
                    None => warn!("console: '{}' is not a depth in mm", line.trim()),
                },
                Err(RecvTimeoutError::Timeout) => return None,
                Err(RecvTimeoutError::Disconnected) => {
                    warn!("console: input closed before a baseline arrived");
                    return None;
                }
            }
        }
    }
}
