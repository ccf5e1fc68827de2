//! Line-oriented operator I/O
//!
//! The session asks a `Console` for one line at a time and prints whole
//! lines back. `StdConsole` is the terminal; tests drive the session with a
//! scripted console instead.

use std::io::{self, BufRead, Write};

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc;

#[async_trait]
pub trait Console: Send {
    /// Show `prompt` and return the next line without its terminator.
    ///
    /// `Ok(None)` means the input is exhausted.
    async fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>>;

    fn say(&mut self, line: &str);
}

/// Operator input the session could not use
#[derive(Error, Debug)]
pub enum InputError {
    #[error("invalid ID '{0}': expected a whole number")]
    InvalidId(String),

    #[error("end of input")]
    EndOfInput,
}

/// Stdin/stdout console
///
/// Stdin is read on a detached thread so a pending read never holds up
/// shutdown after an interrupt.
pub struct StdConsole {
    lines: mpsc::Receiver<io::Result<String>>,
}

impl StdConsole {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel(1);
        std::thread::spawn(move || {
            let stdin = io::stdin();
            for line in stdin.lock().lines() {
                let failed = line.is_err();
                if tx.blocking_send(line).is_err() || failed {
                    break;
                }
            }
        });
        Self { lines: rx }
    }
}

impl Default for StdConsole {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Console for StdConsole {
    async fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>> {
        {
            let mut stdout = io::stdout().lock();
            stdout.write_all(prompt.as_bytes())?;
            stdout.flush()?;
        }

        self.lines.recv().await.transpose()
    }

    fn say(&mut self, line: &str) {
        println!("{line}");
    }
}

#[cfg(test)]
pub use scripted::ScriptedConsole;
