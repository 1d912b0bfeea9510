#![forbid(unsafe_code)]

//! `folio-core` holds the behavior of the Folio portfolio page, independent of
//! any browser.
//!
//! Design goals:
//! - **Host-driven I/O**: the embedding environment pushes DOM events and
//!   applies the [`DomEffect`]s that come back.
//! - **Deterministic time**: the host advances the clock explicitly; the two
//!   delayed transitions (skill-bar fill, feedback expiry) are scheduled tasks.
//! - **Typed handles**: elements are captured once at registration and then
//!   addressed through [`ElementRef`], never re-queried.
//!
//! The `folio-web` crate binds this to a real page through `wasm-bindgen`.

pub mod chrome;
pub mod config;
pub mod contact;
pub mod controller;
pub mod effect;
pub mod geometry;
pub mod nav;
pub mod reveal;
pub mod schedule;
pub mod visibility;

pub use chrome::{MotionPreference, REDUCED_MOTION_QUERY};
pub use config::{ConfigError, PageConfig};
pub use contact::{ContactSubmission, FeedbackKind, FeedbackMessage, MessageId, ValidationError};
pub use controller::{FolioController, PageEvent, PageManifest};
pub use effect::{ConsoleLine, DomEffect, ElementRef};
pub use geometry::SectionBounds;
pub use nav::{Key, ScrollBehavior};
