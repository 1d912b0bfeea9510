#![forbid(unsafe_code)]

//! Page chrome: footer year, reduced-motion preference, load marker, and the
//! console banner.

use serde::{Deserialize, Serialize};

use crate::effect::ConsoleLine;
use crate::nav::ScrollBehavior;

/// Media query the host evaluates once at startup.
pub const REDUCED_MOTION_QUERY: &str = "(prefers-reduced-motion: reduce)";

/// The user's motion preference as reported by the host.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MotionPreference {
    #[default]
    NoPreference,
    Reduce,
}

impl MotionPreference {
    #[must_use]
    pub const fn from_media_match(matches: bool) -> Self {
        if matches { Self::Reduce } else { Self::NoPreference }
    }

    #[must_use]
    pub const fn is_reduced(self) -> bool {
        matches!(self, Self::Reduce)
    }

    /// Behavior actually used for a requested scroll.
    #[must_use]
    pub const fn resolve(self, requested: ScrollBehavior) -> ScrollBehavior {
        match self {
            Self::Reduce => ScrollBehavior::Instant,
            Self::NoPreference => requested,
        }
    }

    /// Document-wide override to install, if any.
    #[must_use]
    pub const fn root_scroll_behavior(self) -> Option<ScrollBehavior> {
        match self {
            Self::Reduce => Some(ScrollBehavior::Instant),
            Self::NoPreference => None,
        }
    }
}

/// Footer text for a calendar year.
#[must_use]
pub fn footer_year_text(year: i32) -> String {
    format!("{year:04}")
}

const BANNER: [(&str, &str); 3] = [
    (
        "🎸 Buffer Punk Portfolio 🎸",
        "color: #ff2d55; font-size: 24px; font-weight: bold;",
    ),
    (
        "Like what you see? Let's build something awesome together!",
        "color: #00d9ff; font-size: 14px;",
    ),
    (
        "Email: hello@bufferpunk.com",
        "color: #a1a1aa; font-size: 12px;",
    ),
];

/// The developer-console banner, one styled line per entry.
#[must_use]
pub fn banner() -> Vec<ConsoleLine> {
    BANNER
        .iter()
        .map(|(text, css)| ConsoleLine {
            text: (*text).to_string(),
            css: (*css).to_string(),
        })
        .collect()
}
