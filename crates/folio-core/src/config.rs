#![forbid(unsafe_code)]

//! Page configuration.
//!
//! Every constant the page behavior depends on lives here: scroll thresholds,
//! observer thresholds, timer delays, class names, DOM selectors, and the
//! user-facing feedback texts. Defaults reproduce the shipped page exactly;
//! hosts may override any subset from JSON.

use core::fmt;
use core::time::Duration;

use serde::{Deserialize, Serialize};

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PageConfig {
    pub scroll: ScrollConfig,
    pub reveal: RevealConfig,
    pub form: FormConfig,
    pub classes: ClassNames,
    pub selectors: Selectors,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrollConfig {
    /// Header compacts once the scroll offset is strictly greater than this.
    pub compact_after: f64,
    /// Added to the scroll offset to find the section under the header.
    pub active_tracking_offset: f64,
    /// Subtracted from a section's top when scrolling to it.
    pub header_offset: f64,
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            compact_after: 100.0,
            active_tracking_offset: 150.0,
            header_offset: 80.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RevealConfig {
    pub skills_threshold: f64,
    pub cards_threshold: f64,
    pub skill_fill_delay_ms: u64,
}

impl RevealConfig {
    #[must_use]
    pub const fn skill_fill_delay(&self) -> Duration {
        Duration::from_millis(self.skill_fill_delay_ms)
    }
}

impl Default for RevealConfig {
    fn default() -> Self {
        Self {
            skills_threshold: 0.5,
            cards_threshold: 0.1,
            skill_fill_delay_ms: 100,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormConfig {
    pub success_ttl_ms: u64,
    pub missing_fields_text: String,
    pub invalid_email_text: String,
    pub success_text: String,
}

impl FormConfig {
    #[must_use]
    pub const fn success_ttl(&self) -> Duration {
        Duration::from_millis(self.success_ttl_ms)
    }
}

impl Default for FormConfig {
    fn default() -> Self {
        Self {
            success_ttl_ms: 5000,
            missing_fields_text: "Please fill in all fields".to_string(),
            invalid_email_text: "Please enter a valid email address".to_string(),
            success_text: "Thank you for your message! I'll get back to you soon.".to_string(),
        }
    }
}

/// Presentation classes toggled on page elements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassNames {
    pub scrolled: String,
    pub active: String,
    pub revealed: String,
    pub loaded: String,
}

impl Default for ClassNames {
    fn default() -> Self {
        Self {
            scrolled: "scrolled".to_string(),
            active: "active".to_string(),
            revealed: "fade-in".to_string(),
            loaded: "loaded".to_string(),
        }
    }
}

/// Selectors used once, at registration, to capture element handles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Selectors {
    pub navbar: String,
    pub nav_toggle: String,
    pub nav_menu: String,
    pub nav_links: String,
    pub sections: String,
    pub skills_section: String,
    pub skill_bars: String,
    pub cards: String,
    pub contact_form: String,
    pub name_field: String,
    pub email_field: String,
    pub message_field: String,
    pub year_slot: String,
}

impl Default for Selectors {
    fn default() -> Self {
        Self {
            navbar: "#navbar".to_string(),
            nav_toggle: "#navToggle".to_string(),
            nav_menu: "#navMenu".to_string(),
            nav_links: ".nav-link".to_string(),
            sections: "section[id]".to_string(),
            skills_section: "#skills".to_string(),
            skill_bars: ".skill-progress".to_string(),
            cards: ".project-card, .skill-category, .stat-item".to_string(),
            contact_form: "#contactForm".to_string(),
            name_field: "#name".to_string(),
            email_field: "#email".to_string(),
            message_field: "#message".to_string(),
            year_slot: "#currentYear".to_string(),
        }
    }
}

/// Configuration error.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Input was not valid JSON for [`PageConfig`].
    Parse(String),
    /// A visibility threshold outside `[0, 1]`.
    ThresholdOutOfRange { field: &'static str, value: f64 },
    /// A pixel offset that is negative or not finite.
    InvalidOffset { field: &'static str, value: f64 },
    /// A class name that is empty or contains whitespace.
    InvalidClassName { field: &'static str, value: String },
    /// An empty selector.
    EmptySelector { field: &'static str },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse(msg) => write!(f, "invalid page config: {msg}"),
            Self::ThresholdOutOfRange { field, value } => {
                write!(f, "{field} must be within [0, 1], got {value}")
            }
            Self::InvalidOffset { field, value } => {
                write!(f, "{field} must be a finite, non-negative offset, got {value}")
            }
            Self::InvalidClassName { field, value } => {
                write!(f, "{field} is not a usable class name: {value:?}")
            }
            Self::EmptySelector { field } => write!(f, "selector {field} is empty"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl PageConfig {
    /// Parse a (possibly partial) JSON object and validate the result.
    ///
    /// Missing keys fall back to defaults, so `{}` is the stock page.
    pub fn from_json(input: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(input).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        check_threshold("reveal.skills_threshold", self.reveal.skills_threshold)?;
        check_threshold("reveal.cards_threshold", self.reveal.cards_threshold)?;

        check_offset("scroll.compact_after", self.scroll.compact_after)?;
        check_offset("scroll.active_tracking_offset", self.scroll.active_tracking_offset)?;
        check_offset("scroll.header_offset", self.scroll.header_offset)?;

        check_class("classes.scrolled", &self.classes.scrolled)?;
        check_class("classes.active", &self.classes.active)?;
        check_class("classes.revealed", &self.classes.revealed)?;
        check_class("classes.loaded", &self.classes.loaded)?;

        let s = &self.selectors;
        for (field, value) in [
            ("selectors.navbar", &s.navbar),
            ("selectors.nav_toggle", &s.nav_toggle),
            ("selectors.nav_menu", &s.nav_menu),
            ("selectors.nav_links", &s.nav_links),
            ("selectors.sections", &s.sections),
            ("selectors.skills_section", &s.skills_section),
            ("selectors.skill_bars", &s.skill_bars),
            ("selectors.cards", &s.cards),
            ("selectors.contact_form", &s.contact_form),
            ("selectors.name_field", &s.name_field),
            ("selectors.email_field", &s.email_field),
            ("selectors.message_field", &s.message_field),
            ("selectors.year_slot", &s.year_slot),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::EmptySelector { field });
            }
        }
        Ok(())
    }
}

fn check_threshold(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::ThresholdOutOfRange { field, value })
    }
}

fn check_offset(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidOffset { field, value })
    }
}

fn check_class(field: &'static str, value: &str) -> Result<(), ConfigError> {
    if value.is_empty() || value.chars().any(char::is_whitespace) {
        Err(ConfigError::InvalidClassName {
            field,
            value: value.to_string(),
        })
    } else {
        Ok(())
    }
}
