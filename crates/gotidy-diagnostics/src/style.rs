// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Display roles and their terminal styles
//!
//! Formatting code never talks to a color backend directly: it asks
//! [`Styles::style`] to dress a piece of text for a [`Role`]. Plain styles
//! return the text untouched, which keeps non-terminal output and tests free
//! of escape codes.

use owo_colors::{OwoColorize, Style};

/// What a piece of report text represents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// Failure headers, failure messages, panic output
    Error,
    /// Lines added in an assertion diff
    DiffAdded,
    /// Lines removed in an assertion diff
    DiffRemoved,
    /// Labels for auxiliary sections
    Info,
    /// `file:line:` locations
    Location,
    /// Passing status and clean summaries
    Success,
    /// Skips and packages without tests
    Warning,
}

/// One style per [`Role`]
#[derive(Debug, Default, Clone)]
pub struct Styles {
    is_colorized: bool,
    error: Style,
    diff_added: Style,
    diff_removed: Style,
    info: Style,
    location: Style,
    success: Style,
    warning: Style,
}

impl Styles {
    /// Styles that leave text untouched
    #[must_use]
    pub fn plain() -> Self {
        Self::default()
    }

    /// Styles for a color terminal
    #[must_use]
    pub fn colorized() -> Self {
        let mut styles = Self::default();
        styles.colorize();
        styles
    }

    /// Switch every role to its terminal color
    pub fn colorize(&mut self) {
        self.is_colorized = true;
        self.error = Style::new().red();
        self.diff_added = Style::new().green();
        self.diff_removed = Style::new().red();
        self.info = Style::new().blue();
        self.location = Style::new().cyan();
        self.success = Style::new().green();
        self.warning = Style::new().yellow();
    }

    /// Whether any role emits escape codes
    #[must_use]
    pub fn is_colorized(&self) -> bool {
        self.is_colorized
    }

    /// Dress `text` for `role`
    ///
    /// Empty text is returned as-is so no bare escape sequences are emitted.
    #[must_use]
    pub fn style(&self, text: &str, role: Role) -> String {
        if !self.is_colorized || text.is_empty() {
            return text.to_string();
        }

        text.style(self.for_role(role)).to_string()
    }

    fn for_role(&self, role: Role) -> Style {
        match role {
            Role::Error => self.error,
            Role::DiffAdded => self.diff_added,
            Role::DiffRemoved => self.diff_removed,
            Role::Info => self.info,
            Role::Location => self.location,
            Role::Success => self.success,
            Role::Warning => self.warning,
        }
    }
}
