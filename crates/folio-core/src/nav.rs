#![forbid(unsafe_code)]

//! Navigation controller: sticky header, mobile menu, smooth in-page
//! scrolling, active-link tracking, and Escape dismissal.
//!
//! State is two independent flags (`scrolled`, `menu_open`) plus the derived
//! active link. Every transition goes through a named method that reports
//! whether anything changed, so the caller only emits DOM effects on change.

use serde::{Deserialize, Serialize};

use crate::chrome::MotionPreference;
use crate::config::ScrollConfig;
use crate::geometry::{SectionBounds, section_at};

/// Browser scroll animation mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScrollBehavior {
    Smooth,
    Instant,
}

impl ScrollBehavior {
    /// Value for the CSS `scroll-behavior` property.
    #[must_use]
    pub const fn as_css(self) -> &'static str {
        match self {
            Self::Smooth => "smooth",
            Self::Instant => "auto",
        }
    }
}

/// A programmatic scroll for the host to perform.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScrollRequest {
    pub top: f64,
    pub behavior: ScrollBehavior,
}

/// Normalized keyboard key for menu handling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Key {
    Escape,
    Other(String),
}

impl Key {
    /// Normalize a DOM `KeyboardEvent.key` value. Legacy `"Esc"` maps to Escape.
    #[must_use]
    pub fn from_dom_key(key: &str) -> Self {
        match key {
            "Escape" | "Esc" => Self::Escape,
            other => Self::Other(other.to_string()),
        }
    }
}

/// Same-page section id referenced by an `href`, if it is a fragment link.
#[must_use]
pub fn fragment_target(href: &str) -> Option<&str> {
    href.strip_prefix('#').filter(|id| !id.is_empty())
}

/// A navigation link captured at registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavLink {
    href: String,
}

impl NavLink {
    #[must_use]
    pub fn new(href: impl Into<String>) -> Self {
        Self { href: href.into() }
    }

    #[must_use]
    pub fn href(&self) -> &str {
        &self.href
    }

    #[must_use]
    pub fn target(&self) -> Option<&str> {
        fragment_target(&self.href)
    }
}

/// Menu open/close transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuTransition {
    Opened,
    Closed,
}

impl MenuTransition {
    #[must_use]
    pub const fn is_open(self) -> bool {
        matches!(self, Self::Opened)
    }
}

/// Change of the active link; `None` means no link is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActiveChange {
    pub previous: Option<usize>,
    pub current: Option<usize>,
}

/// Outcome of activating a navigation link.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinkActivation {
    /// `Some(Closed)` if the menu was open and has been closed.
    pub menu: Option<MenuTransition>,
    /// Where to scroll, if the link's target section exists.
    pub scroll: Option<ScrollRequest>,
}

/// Navigation state owned by the page controller.
#[derive(Debug, Clone)]
pub struct NavController {
    links: Vec<NavLink>,
    scrolled: bool,
    menu_open: bool,
    active: Option<usize>,
    motion: MotionPreference,
    compact_after: f64,
    tracking_offset: f64,
    header_offset: f64,
}

impl NavController {
    #[must_use]
    pub fn new(links: Vec<NavLink>, config: &ScrollConfig) -> Self {
        Self {
            links,
            scrolled: false,
            menu_open: false,
            active: None,
            motion: MotionPreference::NoPreference,
            compact_after: config.compact_after,
            tracking_offset: config.active_tracking_offset,
            header_offset: config.header_offset,
        }
    }

    #[must_use]
    pub fn links(&self) -> &[NavLink] {
        &self.links
    }

    #[must_use]
    pub const fn is_scrolled(&self) -> bool {
        self.scrolled
    }

    #[must_use]
    pub const fn is_menu_open(&self) -> bool {
        self.menu_open
    }

    #[must_use]
    pub const fn active_link(&self) -> Option<usize> {
        self.active
    }

    #[must_use]
    pub const fn motion(&self) -> MotionPreference {
        self.motion
    }

    pub fn set_motion(&mut self, motion: MotionPreference) {
        self.motion = motion;
    }

    /// Re-evaluate the compacted header. Returns the new state if it changed.
    pub fn update_scrolled(&mut self, scroll_y: f64) -> Option<bool> {
        let scrolled = scroll_y > self.compact_after;
        if scrolled == self.scrolled {
            return None;
        }
        self.scrolled = scrolled;
        tracing::debug!(scroll_y, scrolled, "header compaction changed");
        Some(scrolled)
    }

    pub fn toggle_menu(&mut self) -> MenuTransition {
        self.menu_open = !self.menu_open;
        let transition = if self.menu_open {
            MenuTransition::Opened
        } else {
            MenuTransition::Closed
        };
        tracing::info!(open = self.menu_open, "mobile menu toggled");
        transition
    }

    /// Force the menu closed. Returns `None` if it was already closed.
    pub fn close_menu(&mut self) -> Option<MenuTransition> {
        if !self.menu_open {
            return None;
        }
        self.menu_open = false;
        tracing::info!("mobile menu closed");
        Some(MenuTransition::Closed)
    }

    /// Escape closes an open menu; every other key, or Escape on a closed
    /// menu, is ignored.
    pub fn handle_key(&mut self, key: &Key) -> Option<MenuTransition> {
        match key {
            Key::Escape => self.close_menu(),
            Key::Other(_) => None,
        }
    }

    /// Activate link `index`: close the menu and resolve the smooth scroll.
    ///
    /// `target_top` is the document offset of the element the link's fragment
    /// names, as resolved by the host; any element with that id qualifies, not
    /// only tracked sections. Unknown link indices, non-fragment links, and
    /// unresolved targets produce no scroll; the menu is still closed for
    /// known links.
    pub fn activate_link(&mut self, index: usize, target_top: Option<f64>) -> LinkActivation {
        let Some(link) = self.links.get(index) else {
            tracing::warn!(index, "activation for unregistered nav link");
            return LinkActivation {
                menu: None,
                scroll: None,
            };
        };
        let scroll = link
            .target()
            .and(target_top)
            .map(|top| ScrollRequest {
                top: top - self.header_offset,
                behavior: self.motion.resolve(ScrollBehavior::Smooth),
            });
        if scroll.is_none() {
            tracing::debug!(href = link.href(), "nav link target not found");
        }
        LinkActivation {
            menu: self.close_menu(),
            scroll,
        }
    }

    /// Point tested against sections for a given scroll offset.
    #[must_use]
    pub fn tracking_point(&self, scroll_y: f64) -> f64 {
        scroll_y + self.tracking_offset
    }

    /// Recompute the active link. Returns the change, if any.
    pub fn update_active(&mut self, scroll_y: f64, sections: &[SectionBounds]) -> Option<ActiveChange> {
        let point = self.tracking_point(scroll_y);
        let current = section_at(sections, point)
            .and_then(|section| self.links.iter().position(|l| l.target() == Some(section.id.as_str())));
        if current == self.active {
            return None;
        }
        let change = ActiveChange {
            previous: self.active,
            current,
        };
        self.active = current;
        tracing::debug!(point, previous = ?change.previous, current = ?change.current, "active link changed");
        Some(change)
    }
}
