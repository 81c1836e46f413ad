//! Status lines for the `init` and `config` commands.

use owo_colors::OwoColorize;
use std::fmt::Display;

/// Outcome shown in the left column of a status line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mark {
    Done,
    Skipped,
    Warn,
    Failed,
    Note,
}

impl Mark {
    fn tag(self) -> &'static str {
        match self {
            Mark::Done => "ok",
            Mark::Skipped => "skip",
            Mark::Warn => "warn",
            Mark::Failed => "fail",
            Mark::Note => "note",
        }
    }
}

/// Writes aligned status lines, colored unless `--no-color` was given.
#[derive(Debug, Clone, Copy)]
pub struct Reporter {
    color: bool,
}

impl Reporter {
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    /// Formats one status line without printing it.
    pub fn line(&self, mark: Mark, text: &str) -> String {
        let tag = format!("{:>4}", mark.tag());
        if !self.color {
            return format!("  {} {}", tag, text);
        }

        let tag = match mark {
            Mark::Done => tag.green().bold().to_string(),
            Mark::Skipped => tag.dimmed().to_string(),
            Mark::Warn => tag.yellow().bold().to_string(),
            Mark::Failed => tag.red().bold().to_string(),
            Mark::Note => tag.cyan().to_string(),
        };
        format!("  {} {}", tag, text)
    }

    /// Prints a status line; failures go to stderr.
    pub fn emit(&self, mark: Mark, text: impl Display) {
        let line = self.line(mark, &text.to_string());
        if mark == Mark::Failed {
            eprintln!("{}", line);
        } else {
            println!("{}", line);
        }
    }

    pub fn title(&self, text: &str) {
        println!();
        if self.color {
            println!("{}", text.bold().underline());
        } else {
            println!("{}\n{}", text, "-".repeat(text.chars().count()));
        }
    }

    /// Prints `key` padded to a fixed column, then `value`.
    pub fn field(&self, key: &str, value: impl Display) {
        let key = format!("{:<16}", key);
        if self.color {
            println!("  {} {}", key.dimmed(), value);
        } else {
            println!("  {} {}", key, value);
        }
    }
}
