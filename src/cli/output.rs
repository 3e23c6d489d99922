//! Styled terminal output.

use anstyle::{AnsiColor, Color, Style};
use std::io::{self, IsTerminal, Write};

const SECTION: Style = Style::new()
    .bold()
    .fg_color(Some(Color::Ansi(AnsiColor::Cyan)));
const SUCCESS: Style = Style::new().fg_color(Some(Color::Ansi(AnsiColor::Green)));
const WARNING: Style = Style::new()
    .bold()
    .fg_color(Some(Color::Ansi(AnsiColor::Yellow)));
const ERROR: Style = Style::new()
    .bold()
    .fg_color(Some(Color::Ansi(AnsiColor::Red)));
const DIM: Style = Style::new().dimmed();

/// Writes user-facing progress to stdout and problems to stderr.
#[derive(Debug, Clone)]
pub struct OutputManager {
    verbose: bool,
    color: bool,
}

impl OutputManager {
    /// Colors are used when stdout is a terminal and `NO_COLOR` is unset.
    pub fn new(verbose: bool) -> Self {
        let color = io::stdout().is_terminal() && std::env::var_os("NO_COLOR").is_none();
        Self { verbose, color }
    }

    fn paint(&self, style: Style, text: &str) -> String {
        if self.color {
            format!("{style}{text}{style:#}")
        } else {
            text.to_string()
        }
    }

    /// Print section header
    pub fn section(&self, title: &str) -> io::Result<()> {
        writeln!(io::stdout().lock(), "{}", self.paint(SECTION, &format!("==> {title}")))
    }

    /// Print progress message
    pub fn progress(&self, message: &str) -> io::Result<()> {
        writeln!(io::stdout().lock(), "{message}")
    }

    /// Print success message
    pub fn success(&self, message: &str) -> io::Result<()> {
        writeln!(io::stdout().lock(), "{}", self.paint(SUCCESS, &format!("✓ {message}")))
    }

    /// Print indented text
    pub fn indent(&self, message: &str) -> io::Result<()> {
        writeln!(io::stdout().lock(), "    {}", self.paint(DIM, message))
    }

    /// Print verbose message if in verbose mode
    pub fn verbose(&self, message: &str) -> io::Result<()> {
        if !self.verbose {
            return Ok(());
        }
        writeln!(io::stdout().lock(), "{}", self.paint(DIM, message))
    }

    /// Print warning message
    pub fn warn(&self, message: &str) -> io::Result<()> {
        writeln!(io::stderr().lock(), "{}", self.paint(WARNING, &format!("Warning! {message}")))
    }

    /// Print error message
    pub fn error(&self, message: &str) -> io::Result<()> {
        writeln!(io::stderr().lock(), "{}", self.paint(ERROR, &format!("Error: {message}")))
    }
}
