// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use clap::builder::styling::{Ansi256Color, Color, Style, Styles};
use std::io::IsTerminal;

pub mod codes {
    /// Section headers: pastel cyan / steel blue
    pub const HEADER: u8 = 74;
    /// Commands and literals: light grey
    pub const LITERAL: u8 = 250;
    /// Descriptions and context: medium grey
    pub const CONTEXT: u8 = 245;
    /// Muted / secondary text: darker grey
    pub const MUTED: u8 = 240;
    /// Crash headline: soft red
    pub const ALERT: u8 = 167;
}

/// Determine if color output should be enabled.
///
/// Priority: `NO_COLOR=1` disables → `COLOR=1` forces → TTY check.
pub fn should_colorize() -> bool {
    if std::env::var("NO_COLOR").is_ok_and(|v| v == "1") {
        return false;
    }
    if std::env::var("COLOR").is_ok_and(|v| v == "1") {
        return true;
    }
    std::io::stdout().is_terminal()
}

/// Build clap `Styles` using the project palette.
pub fn styles() -> Styles {
    if !should_colorize() {
        return Styles::plain();
    }
    Styles::styled()
        .header(Style::new().fg_color(Some(Color::Ansi256(Ansi256Color(codes::HEADER)))))
        .literal(Style::new().fg_color(Some(Color::Ansi256(Ansi256Color(codes::LITERAL)))))
        .placeholder(Style::new().fg_color(Some(Color::Ansi256(Ansi256Color(codes::CONTEXT)))))
}

/// Palette for rendering a crash screen; plain when colour is off
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    enabled: bool,
}

impl Palette {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    /// Colour decided by [`should_colorize`]
    pub fn detect() -> Self {
        Self::new(should_colorize())
    }

    fn paint(&self, code: u8, text: &str) -> String {
        if self.enabled {
            format!("\x1b[38;5;{code}m{text}{RESET}")
        } else {
            text.to_string()
        }
    }

    pub fn header(&self, text: &str) -> String {
        self.paint(codes::HEADER, text)
    }

    pub fn literal(&self, text: &str) -> String {
        self.paint(codes::LITERAL, text)
    }

    pub fn context(&self, text: &str) -> String {
        self.paint(codes::CONTEXT, text)
    }

    pub fn muted(&self, text: &str) -> String {
        self.paint(codes::MUTED, text)
    }

    pub fn alert(&self, text: &str) -> String {
        self.paint(codes::ALERT, text)
    }
}

const RESET: &str = "\x1b[0m";

#[cfg(test)]
#[path = "color_tests.rs"]
mod tests;
