#![forbid(unsafe_code)]

//! DOM effects emitted by the controller for the host to apply.
//!
//! The core never touches the page. Every reaction is expressed as a
//! [`DomEffect`] against a typed [`ElementRef`] handle captured at
//! registration. Effects are serializable so hosts outside Rust can consume
//! them as JSON.

use serde::{Deserialize, Serialize};

use crate::contact::{FeedbackMessage, MessageId};
use crate::nav::ScrollBehavior;

/// Typed handle to an element captured once at registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "element", content = "index", rename_all = "snake_case")]
pub enum ElementRef {
    /// `<html>`; carries the document-wide scroll behavior.
    Root,
    Body,
    Navbar,
    NavToggle,
    NavMenu,
    NavLink(usize),
    SkillsSection,
    SkillBar(usize),
    Card(usize),
    ContactForm,
    YearSlot,
}

/// A styled developer-console line (`%c` formatting).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsoleLine {
    pub text: String,
    pub css: String,
}

/// One mutation for the host to perform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DomEffect {
    /// Add (`enabled`) or remove a presentation class.
    SetClass {
        target: ElementRef,
        class: String,
        enabled: bool,
    },
    /// Write an inline `width` style.
    SetWidth { target: ElementRef, width: String },
    /// Force the style engine to commit pending inline styles on `target`
    /// (e.g. by reading its layout size) before anything else happens.
    FlushStyles { target: ElementRef },
    /// Replace the element's text content.
    SetText { target: ElementRef, text: String },
    /// Scroll the window to an absolute vertical offset.
    ScrollTo { top: f64, behavior: ScrollBehavior },
    /// Set the document-wide CSS `scroll-behavior`.
    SetRootScrollBehavior { behavior: ScrollBehavior },
    /// Stop native intersection observation of `target`.
    Unobserve { target: ElementRef },
    /// Attach a feedback message to the contact form.
    ShowFeedback { message: FeedbackMessage },
    /// Detach the feedback message with this id, if it is still attached.
    RemoveFeedback { id: MessageId },
    /// Clear every contact-form field.
    ResetForm,
    /// Print a styled line to the developer console.
    Console { line: ConsoleLine },
}

impl DomEffect {
    #[must_use]
    pub fn add_class(target: ElementRef, class: &str) -> Self {
        Self::SetClass {
            target,
            class: class.to_string(),
            enabled: true,
        }
    }

    #[must_use]
    pub fn remove_class(target: ElementRef, class: &str) -> Self {
        Self::SetClass {
            target,
            class: class.to_string(),
            enabled: false,
        }
    }

    #[must_use]
    pub fn set_class(target: ElementRef, class: &str, enabled: bool) -> Self {
        Self::SetClass {
            target,
            class: class.to_string(),
            enabled,
        }
    }
}
