//! Colored terminal output for packaging runs.
//!
//! Status lines go to stdout, errors to stderr. `quiet` silences everything
//! except errors and `verbose` enables the `→` detail lines.

use std::io::{self, Write};

use termcolor::{BufferWriter, Color, ColorChoice, ColorSpec, WriteColor};

/// Output manager for consistent colored terminal output
#[derive(Debug)]
pub struct OutputManager {
    stdout: BufferWriter,
    verbose: bool,
    quiet: bool,
}

impl OutputManager {
    /// Create a new output manager
    pub fn new(verbose: bool, quiet: bool) -> Self {
        Self {
            stdout: BufferWriter::stdout(ColorChoice::Auto),
            verbose,
            quiet,
        }
    }

    fn symbol_line(
        writer: &BufferWriter,
        symbol: &str,
        color: Color,
        message: &str,
    ) -> io::Result<()> {
        let mut buffer = writer.buffer();
        buffer.set_color(ColorSpec::new().set_fg(Some(color)).set_bold(true))?;
        write!(&mut buffer, "{symbol}")?;
        buffer.reset()?;
        writeln!(&mut buffer, " {message}")?;
        writer.print(&buffer)
    }

    /// Print a success message
    pub fn success(&self, message: &str) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        Self::symbol_line(&self.stdout, "✓", Color::Green, message)
    }

    /// Print a detail message (only in verbose mode)
    pub fn verbose(&self, message: &str) -> io::Result<()> {
        if !self.verbose || self.quiet {
            return Ok(());
        }
        Self::symbol_line(&self.stdout, "→", Color::Blue, message)
    }

    /// Print an error message (always shown)
    pub fn error(&self, message: &str) {
        let stderr = BufferWriter::stderr(ColorChoice::Auto);
        if Self::symbol_line(&stderr, "✗", Color::Red, message).is_err() {
            eprintln!("✗ {message}");
        }
    }

    /// Print recovery suggestions under an error
    pub fn suggestions(&self, suggestions: &[String]) {
        if suggestions.is_empty() {
            return;
        }
        let stderr = BufferWriter::stderr(ColorChoice::Auto);
        let mut buffer = stderr.buffer();
        let _ = writeln!(&mut buffer, "\n💡 Recovery suggestions:");
        for suggestion in suggestions {
            let _ = writeln!(&mut buffer, "    {suggestion}");
        }
        let _ = stderr.print(&buffer);
    }
}
