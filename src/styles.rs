use anstyle::{AnsiColor, Color, Style};
use clap::ValueEnum;
use std::fmt;

/// When to colour the human-readable report
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum ColorChoice {
    /// Colour if stdout is a terminal that supports it
    #[default]
    Auto,
    /// Always colour
    Always,
    /// Never colour
    Never,
}

impl From<ColorChoice> for anstream::ColorChoice {
    fn from(choice: ColorChoice) -> Self {
        match choice {
            ColorChoice::Auto => anstream::ColorChoice::Auto,
            ColorChoice::Always => anstream::ColorChoice::Always,
            ColorChoice::Never => anstream::ColorChoice::Never,
        }
    }
}

const GREEN: Style = Style::new().fg_color(Some(Color::Ansi(AnsiColor::Green)));
const BOLD_GREEN: Style = GREEN.bold();
const YELLOW: Style = Style::new().fg_color(Some(Color::Ansi(AnsiColor::Yellow)));

#[must_use]
pub(crate) fn as_count(content: &str) -> StyledStr<'_> {
    StyledStr { prefix: BOLD_GREEN, content }
}
#[must_use]
pub(crate) fn as_label(content: &str) -> StyledStr<'_> {
    StyledStr { prefix: GREEN, content }
}
#[must_use]
pub(crate) fn as_warning(content: &str) -> StyledStr<'_> {
    StyledStr { prefix: YELLOW, content }
}

pub(crate) struct StyledStr<'a> {
    prefix: Style,
    content: &'a str,
}
impl StyledStr<'_> {
    #[must_use]
    pub fn len(&self) -> usize {
        self.content.len()
    }
}
impl fmt::Display for StyledStr<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.prefix.render(), self.content, self.prefix.render_reset())
    }
}
