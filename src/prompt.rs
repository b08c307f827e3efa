use std::io::{self, BufRead, Write};

/// Synchronous yes/no confirmation, injected wherever a destructive action
/// needs an explicit go-ahead.
pub trait ConfirmationPrompt {
    fn confirm(&mut self, message: &str) -> bool;
}

/// Interactive prompt on stdin/stdout. Anything other than an answer
/// starting with `y`/`Y` counts as a decline.
pub struct TerminalPrompt;

impl ConfirmationPrompt for TerminalPrompt {
    fn confirm(&mut self, message: &str) -> bool {
        print!("{message} [y/N] ");
        if io::stdout().flush().is_err() {
            return false;
        }
        let mut answer = String::new();
        match io::stdin().lock().read_line(&mut answer) {
            Ok(_) => answer.trim().to_lowercase().starts_with('y'),
            Err(_) => false,
        }
    }
}

/// Scripted answer for `--yes` flows and tests.
pub struct AutoConfirm(pub bool);

impl ConfirmationPrompt for AutoConfirm {
    fn confirm(&mut self, _message: &str) -> bool {
        self.0
    }
}
