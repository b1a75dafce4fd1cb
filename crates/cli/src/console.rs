//! Terminal progress output.

use std::path::Path;

use opsify_core::{ConversionListener, ProgressSnapshot, TaskError};

/// Prints one line per finished file.
#[derive(Debug, Default)]
pub struct ConsoleListener {
    quiet: bool,
}

impl ConsoleListener {
    /// A listener that only reports failures.
    pub fn quiet() -> Self {
        Self { quiet: true }
    }
}

impl ConversionListener for ConsoleListener {
    fn on_start(&self, total: usize) {
        if !self.quiet {
            println!("Converting {} file(s)", total);
        }
    }

    fn on_file_done(&self, input: &Path, output: &Path, done: usize, total: usize) {
        if !self.quiet {
            println!("{} {} -> {}", counter(done, total), input.display(), output.display());
        }
    }

    fn on_error(&self, input: &Path, cause: &TaskError, done: usize, total: usize) {
        eprintln!("{} FAILED {}: {}", counter(done, total), input.display(), cause);
    }
}

fn counter(done: usize, total: usize) -> String {
    let progress = ProgressSnapshot::new(done, total);
    let width = total.to_string().len();
    format!(
        "[{:>width$}/{} {:>3.0}%]",
        progress.done,
        progress.total,
        progress.fraction() * 100.0,
        width = width
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counter_shows_padded_count_and_percent() {
        assert_eq!(counter(6, 120), "[  6/120   5%]");
        assert_eq!(counter(1, 1), "[1/1 100%]");
        assert_eq!(counter(1, 2), "[1/2  50%]");
    }
}
