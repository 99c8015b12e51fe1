//! Coloured terminal output.
//!
//! Progress and results go to stdout; warnings and errors go to stderr.
//! Colour is used only when the stream is a terminal.

use std::io::{self, IsTerminal, Write};
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

/// Output manager for colored terminal output
#[derive(Debug, Clone)]
pub struct OutputManager {
    verbose: bool,
    quiet: bool,
    stdout_color: ColorChoice,
    stderr_color: ColorChoice,
}

impl OutputManager {
    /// Creates an output manager.
    ///
    /// `quiet` suppresses everything except errors and wins over `verbose`.
    pub fn new(verbose: bool, quiet: bool) -> Self {
        Self {
            verbose: verbose && !quiet,
            quiet,
            stdout_color: color_choice(io::stdout().is_terminal()),
            stderr_color: color_choice(io::stderr().is_terminal()),
        }
    }

    /// Whether verbose output is enabled.
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    /// Print a message only in verbose mode
    pub fn verbose(&self, message: &str) -> io::Result<()> {
        if !self.verbose {
            return Ok(());
        }
        let mut out = self.stdout();
        out.set_color(ColorSpec::new().set_dimmed(true))?;
        writeln!(out, "{message}")?;
        out.reset()
    }

    /// Print a plain message unless quiet
    pub fn println(&self, message: &str) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        writeln!(self.stdout(), "{message}")
    }

    /// Print a progress message unless quiet
    pub fn progress(&self, message: &str) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        let mut out = self.stdout();
        out.set_color(ColorSpec::new().set_fg(Some(Color::Cyan)))?;
        write!(out, "→ ")?;
        out.reset()?;
        writeln!(out, "{message}")
    }

    /// Print a success message unless quiet
    pub fn success(&self, message: &str) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        let mut out = self.stdout();
        out.set_color(ColorSpec::new().set_fg(Some(Color::Green)).set_bold(true))?;
        write!(out, "✓ ")?;
        out.reset()?;
        writeln!(out, "{message}")
    }

    /// Print a section header unless quiet
    pub fn section(&self, title: &str) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        let mut out = self.stdout();
        out.set_color(ColorSpec::new().set_bold(true))?;
        writeln!(out, "\n{title}")?;
        writeln!(out, "{}", "=".repeat(title.chars().count()))?;
        out.reset()
    }

    /// Print an indented line unless quiet
    pub fn indent(&self, message: &str) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        writeln!(self.stdout(), "   {message}")
    }

    /// Print a warning to stderr unless quiet
    pub fn warn(&self, message: &str) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        let mut err = self.stderr();
        err.set_color(ColorSpec::new().set_fg(Some(Color::Yellow)).set_bold(true))?;
        write!(err, "⚠ warning: ")?;
        err.reset()?;
        writeln!(err, "{message}")
    }

    /// Print an error to stderr, even when quiet
    pub fn error(&self, message: &str) -> io::Result<()> {
        let mut err = self.stderr();
        err.set_color(ColorSpec::new().set_fg(Some(Color::Red)).set_bold(true))?;
        write!(err, "✗ error: ")?;
        err.reset()?;
        writeln!(err, "{message}")
    }

    fn stdout(&self) -> StandardStream {
        StandardStream::stdout(self.stdout_color)
    }

    fn stderr(&self) -> StandardStream {
        StandardStream::stderr(self.stderr_color)
    }
}

fn color_choice(is_terminal: bool) -> ColorChoice {
    if is_terminal {
        ColorChoice::Auto
    } else {
        ColorChoice::Never
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quiet_overrides_verbose() {
        let output = OutputManager::new(true, true);
        assert!(!output.is_verbose());
        assert!(OutputManager::new(true, false).is_verbose());
    }

    #[test]
    fn quiet_output_writes_nothing() {
        let output = OutputManager::new(false, true);
        output.progress("hidden").unwrap();
        output.success("hidden").unwrap();
        output.warn("hidden").unwrap();
    }
}
