//! Child process runner with combined output capture and cancellation.

use crate::capture::OutputCapture;
use crate::types::CancelToken;
use std::io::{self, Read};
use std::process::{Command, Stdio};
use std::thread;
use std::time::Duration;

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// How a child process ended.
pub(crate) struct Completed {
    /// Exit code, -1 when terminated by a signal
    pub exit_code: i32,
    /// Combined stdout and stderr
    pub output: String,
    /// The child was killed because of a cancellation request
    pub cancelled: bool,
}

/// Run `command`, interleaving stdout and stderr into one buffer.
///
/// When `cancel` trips while the child runs, the child is killed and
/// whatever was captured up to that point is returned.
pub(crate) fn run_combined(mut command: Command, cancel: Option<&CancelToken>) -> io::Result<Completed> {
    command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    let mut child = command.spawn()?;
    let capture = OutputCapture::new();

    let streams: [Option<Box<dyn Read + Send>>; 2] = [
        child.stdout.take().map(|s| Box::new(s) as Box<dyn Read + Send>),
        child.stderr.take().map(|s| Box::new(s) as Box<dyn Read + Send>),
    ];
    let readers: Vec<_> = streams
        .into_iter()
        .flatten()
        .map(|mut stream| {
            let mut sink = capture.clone();
            thread::spawn(move || {
                let _ = io::copy(&mut stream, &mut sink);
            })
        })
        .collect();

    loop {
        if let Some(status) = child.try_wait()? {
            for reader in readers {
                let _ = reader.join();
            }
            return Ok(Completed {
                exit_code: status.code().unwrap_or(-1),
                output: capture.contents(),
                cancelled: false,
            });
        }

        if cancel.is_some_and(CancelToken::is_cancelled) {
            // Already exited is fine
            let _ = child.kill();
            let status = child.wait()?;
            // Grandchildren may still hold the pipes open; don't wait on readers.
            return Ok(Completed {
                exit_code: status.code().unwrap_or(-1),
                output: capture.contents(),
                cancelled: true,
            });
        }

        thread::sleep(POLL_INTERVAL);
    }
}
