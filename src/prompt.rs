//! Interactive confirmation for destructive actions.
//!
//! The engine never prompts directly: it asks a [`Confirm`] implementation,
//! so `--yes` swaps in [`AutoConfirm`] and tests inject a scripted answer.

use std::io::{BufRead as _, Write as _};

/// Decides whether a pending destructive action may proceed.
pub trait Confirm {
    /// `true` to proceed with the described action, `false` to abort the
    /// remaining run.
    fn confirm(&self, description: &str) -> bool;
}

/// Blocking `[Y/n]` prompt on stdin.
///
/// Re-asks on unrecognised input; EOF and read errors count as a refusal.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdinConfirm;

impl Confirm for StdinConfirm {
    fn confirm(&self, description: &str) -> bool {
        let stdin = std::io::stdin();
        loop {
            print!("{description} [Y/n]? ");
            if std::io::stdout().flush().is_err() {
                return false;
            }
            let mut reply = String::new();
            match stdin.lock().read_line(&mut reply) {
                Ok(0) | Err(_) => return false,
                Ok(_) => {}
            }
            match reply.trim().to_lowercase().as_str() {
                "y" | "yes" => return true,
                "n" | "no" => return false,
                other => {
                    println!("Invalid reply {other:?}, please answer y/yes or n/no.");
                }
            }
        }
    }
}

/// Accepts every prompt; used for `--yes`.
#[derive(Debug, Default, Clone, Copy)]
pub struct AutoConfirm;

impl Confirm for AutoConfirm {
    fn confirm(&self, _description: &str) -> bool {
        true
    }
}

/// Scripted answers for tests, consumed in order; `false` once exhausted.
#[cfg(test)]
#[derive(Debug)]
pub struct ScriptedConfirm {
    answers: std::sync::Mutex<std::collections::VecDeque<bool>>,
    asked: std::sync::atomic::AtomicUsize,
}

#[cfg(test)]
impl ScriptedConfirm {
    /// Create a confirmer that will give the listed answers in order.
    pub fn new(answers: &[bool]) -> Self {
        Self {
            answers: std::sync::Mutex::new(answers.iter().copied().collect()),
            asked: std::sync::atomic::AtomicUsize::new(0),
        }
    }

    /// How many times the confirmer was consulted.
    pub fn asked(&self) -> usize {
        self.asked.load(std::sync::atomic::Ordering::SeqCst)
    }
}

#[cfg(test)]
impl Confirm for ScriptedConfirm {
    fn confirm(&self, _description: &str) -> bool {
        self.asked
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        self.answers
            .lock()
            .map_or(false, |mut q| q.pop_front().unwrap_or(false))
    }
}
