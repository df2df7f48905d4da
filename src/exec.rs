//! Launching the simulator and timing it.
//!
//! Every run is blocking: the child is started, awaited, and its wall-clock
//! duration measured around the wait. There is no timeout.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::process::{Child, ExitStatus, Stdio};
use std::time::{Duration, Instant};

use log::debug;

use crate::command::SimCommand;
use crate::compare::{Comparison, Labeled, OutputComparator};
use crate::error::{HarnessError, Result};

/// Where the child's standard output goes.
#[derive(Debug)]
pub enum OutputSink {
    /// Share the harness's stdout; the child's stderr is folded into it too.
    Inherit,
    /// Write stdout to a file.
    File(File),
}

fn spawn(cmd: &SimCommand, stdout: Stdio, stderr: Stdio) -> Result<Child> {
    debug!("Executing {}", cmd);
    cmd.to_command()
        .stdout(stdout)
        .stderr(stderr)
        .spawn()
        .map_err(|source| HarnessError::Launch {
            command: cmd.to_string(),
            source,
        })
}

fn check_status(cmd: &SimCommand, status: ExitStatus) -> Result<()> {
    if status.success() {
        Ok(())
    } else {
        Err(HarnessError::ExitStatus {
            command: cmd.to_string(),
            code: status.code().unwrap_or(-1),
        })
    }
}

/// Run `cmd` to completion and return its wall-clock duration.
pub fn run_timed(cmd: &SimCommand, sink: OutputSink) -> Result<Duration> {
    let (stdout, stderr) = match sink {
        OutputSink::Inherit => (Stdio::inherit(), Stdio::from(io::stdout())),
        OutputSink::File(file) => (Stdio::from(file), Stdio::inherit()),
    };
    let start = Instant::now();
    let mut child = spawn(cmd, stdout, stderr)?;
    let status = child.wait()?;
    let elapsed = start.elapsed();
    check_status(cmd, status)?;
    Ok(elapsed)
}

/// Run `cmd` while streaming its stdout against a recorded capture.
///
/// Whatever the comparison leaves unread is drained so the child never
/// blocks on a full pipe. The child is always reaped and its exit status
/// checked before any read error is reported; mismatches are returned for
/// the caller to judge.
pub fn run_checked<R: BufRead>(
    cmd: &SimCommand,
    capture: Labeled<'_, R>,
    comparator: &OutputComparator,
) -> Result<(Duration, Comparison)> {
    let capture_name = capture.name.to_string();
    let start = Instant::now();
    let mut child = spawn(cmd, Stdio::piped(), Stdio::inherit())?;
    let compared = match child.stdout.take() {
        Some(stdout) => {
            let mut reader = BufReader::new(stdout);
            let name = cmd.program().to_string();
            let result = comparator.compare(capture, Labeled::new(&name, &mut reader));
            let drained = io::copy(&mut reader, &mut io::sink());
            result.and_then(|c| drained.map(|_| c))
        }
        None => Ok(Comparison::default()),
    };
    let status = child.wait()?;
    let elapsed = start.elapsed();
    check_status(cmd, status)?;
    let comparison = compared.map_err(|e| HarnessError::file(capture_name.as_str(), e))?;
    Ok((elapsed, comparison))
}
