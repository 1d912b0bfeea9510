#![forbid(unsafe_code)]

//! Host-driven page controller.
//!
//! [`FolioController`] owns every piece of page state and turns host events
//! into [`DomEffect`]s. The host (JavaScript via `folio-web`, or a test)
//! controls the loop:
//!
//! 1. Register the page once with a [`PageManifest`].
//! 2. Push events via [`FolioController::dispatch`].
//! 3. Advance time via [`FolioController::advance_time`] or
//!    [`FolioController::set_time`]; wake up at [`FolioController::next_deadline`].
//! 4. Apply every returned effect, in order.
//!
//! # Example
//!
//! ```
//! use core::time::Duration;
//! use folio_core::{FolioController, PageConfig, PageEvent, PageManifest};
//!
//! let manifest = PageManifest {
//!     nav_links: vec!["#about".into()],
//!     ..PageManifest::default()
//! };
//! let mut page = FolioController::new(manifest, PageConfig::default()).unwrap();
//! let effects = page.dispatch(PageEvent::MenuToggle);
//! assert_eq!(effects.len(), 2);
//! assert!(page.nav().is_menu_open());
//! assert!(page.advance_time(Duration::from_millis(16)).is_empty());
//! ```

use core::time::Duration;

use serde::{Deserialize, Serialize};

use crate::chrome::{MotionPreference, banner, footer_year_text};
use crate::config::{ConfigError, PageConfig};
use crate::contact::{ContactForm, ContactSubmission, MessageId};
use crate::effect::{DomEffect, ElementRef};
use crate::geometry::SectionBounds;
use crate::nav::{Key, MenuTransition, NavController, NavLink};
use crate::reveal::{CardRevealer, SkillBarAnimator};
use crate::schedule::{TaskHandle, TaskQueue};

/// What the host found on the page at registration time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageManifest {
    /// `href` of each navigation link, in document order.
    pub nav_links: Vec<String>,
    /// Inline target width of each skill bar, in document order.
    pub skill_bar_widths: Vec<String>,
    pub card_count: usize,
    pub has_skills_section: bool,
    pub has_year_slot: bool,
    pub has_contact_form: bool,
}

/// One host event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PageEvent {
    /// Page initialization with the host's clock year and media preference.
    Init { year: i32, reduced_motion: bool },
    /// Window scrolled; `sections` is the current geometry of every section.
    Scroll {
        scroll_y: f64,
        sections: Vec<SectionBounds>,
    },
    /// Intersection ratio change for the skills section.
    SkillsVisibility { ratio: f64 },
    /// Intersection ratio change for a card.
    CardVisibility { card: usize, ratio: f64 },
    MenuToggle,
    /// Nav link clicked; `target_top` is the document offset of the element
    /// its fragment names, if the host found one.
    NavLinkClick {
        link: usize,
        target_top: Option<f64>,
    },
    KeyDown { key: Key },
    Submit { submission: ContactSubmission },
    /// Full page load completed.
    Load,
}

impl PageEvent {
    /// Whether the host must suppress the browser's default action.
    #[must_use]
    pub const fn suppresses_default(&self) -> bool {
        matches!(self, Self::NavLinkClick { .. } | Self::Submit { .. })
    }
}

/// Delayed work owned by the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
enum DeferredTask {
    RestoreSkillWidth { bar: usize, width: String },
    DismissFeedback { message: MessageId },
}

/// The page controller.
#[derive(Debug, Clone)]
pub struct FolioController {
    config: PageConfig,
    manifest: PageManifest,
    nav: NavController,
    skills: SkillBarAnimator,
    cards: CardRevealer,
    form: ContactForm,
    tasks: TaskQueue<DeferredTask>,
    /// Expiry of the currently attached success message.
    dismiss_task: Option<TaskHandle>,
    initialized: bool,
    loaded: bool,
}

impl FolioController {
    /// Create a controller for a registered page. Fails only on invalid
    /// configuration.
    pub fn new(manifest: PageManifest, config: PageConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let links = manifest.nav_links.iter().map(NavLink::new).collect();
        let nav = NavController::new(links, &config.scroll);
        let skills = SkillBarAnimator::new(
            manifest.skill_bar_widths.clone(),
            manifest.has_skills_section,
            &config.reveal,
        );
        let cards = CardRevealer::new(manifest.card_count, &config.reveal);
        let form = ContactForm::new(&config.form);
        tracing::debug!(
            links = manifest.nav_links.len(),
            bars = manifest.skill_bar_widths.len(),
            cards = manifest.card_count,
            "page registered"
        );
        Ok(Self {
            config,
            manifest,
            nav,
            skills,
            cards,
            form,
            tasks: TaskQueue::new(),
            dismiss_task: None,
            initialized: false,
            loaded: false,
        })
    }

    #[must_use]
    pub const fn config(&self) -> &PageConfig {
        &self.config
    }

    #[must_use]
    pub const fn manifest(&self) -> &PageManifest {
        &self.manifest
    }

    #[must_use]
    pub const fn nav(&self) -> &NavController {
        &self.nav
    }

    #[must_use]
    pub const fn skills(&self) -> &SkillBarAnimator {
        &self.skills
    }

    #[must_use]
    pub const fn cards(&self) -> &CardRevealer {
        &self.cards
    }

    #[must_use]
    pub const fn form(&self) -> &ContactForm {
        &self.form
    }

    #[must_use]
    pub const fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Current controller time.
    #[must_use]
    pub const fn now(&self) -> Duration {
        self.tasks.now()
    }

    /// When the host should next call [`Self::set_time`], if anything is pending.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Duration> {
        self.tasks.next_deadline()
    }

    /// Number of pending deferred tasks.
    #[must_use]
    pub fn pending_tasks(&self) -> usize {
        self.tasks.len()
    }

    /// Handle one event and return the effects to apply, in order.
    pub fn dispatch(&mut self, event: PageEvent) -> Vec<DomEffect> {
        let mut out = Vec::new();
        match event {
            PageEvent::Init {
                year,
                reduced_motion,
            } => self.on_init(year, MotionPreference::from_media_match(reduced_motion), &mut out),
            PageEvent::Scroll { scroll_y, sections } => self.on_scroll(scroll_y, &sections, &mut out),
            PageEvent::SkillsVisibility { ratio } => self.on_skills_visibility(ratio, &mut out),
            PageEvent::CardVisibility { card, ratio } => {
                self.on_card_visibility(card, ratio, &mut out);
            }
            PageEvent::MenuToggle => {
                let transition = self.nav.toggle_menu();
                self.push_menu(transition, &mut out);
            }
            PageEvent::NavLinkClick { link, target_top } => {
                self.on_nav_link(link, target_top, &mut out);
            }
            PageEvent::KeyDown { key } => {
                if let Some(transition) = self.nav.handle_key(&key) {
                    self.push_menu(transition, &mut out);
                }
            }
            PageEvent::Submit { submission } => self.on_submit(submission, &mut out),
            PageEvent::Load => self.on_load(&mut out),
        }
        out
    }

    /// Advance the controller clock by `dt` and run due tasks.
    pub fn advance_time(&mut self, dt: Duration) -> Vec<DomEffect> {
        let due = self.tasks.advance(dt);
        self.run_tasks(due)
    }

    /// Move the controller clock to `now` and run due tasks.
    pub fn set_time(&mut self, now: Duration) -> Vec<DomEffect> {
        let due = self.tasks.set_time(now);
        self.run_tasks(due)
    }

    fn on_init(&mut self, year: i32, motion: MotionPreference, out: &mut Vec<DomEffect>) {
        if self.initialized {
            tracing::warn!("page already initialized; ignoring repeated init");
            return;
        }
        self.initialized = true;

        if self.manifest.has_year_slot {
            out.push(DomEffect::SetText {
                target: ElementRef::YearSlot,
                text: footer_year_text(year),
            });
        }

        self.nav.set_motion(motion);
        if let Some(behavior) = motion.root_scroll_behavior() {
            tracing::info!("reduced motion requested; disabling smooth scrolling");
            out.push(DomEffect::SetRootScrollBehavior { behavior });
        }

        out.extend(banner().into_iter().map(|line| DomEffect::Console { line }));
    }

    fn on_scroll(&mut self, scroll_y: f64, sections: &[SectionBounds], out: &mut Vec<DomEffect>) {
        if let Some(scrolled) = self.nav.update_scrolled(scroll_y) {
            out.push(DomEffect::set_class(
                ElementRef::Navbar,
                &self.config.classes.scrolled,
                scrolled,
            ));
        }
        if let Some(change) = self.nav.update_active(scroll_y, sections) {
            let class = &self.config.classes.active;
            if let Some(previous) = change.previous {
                out.push(DomEffect::remove_class(ElementRef::NavLink(previous), class));
            }
            if let Some(current) = change.current {
                out.push(DomEffect::add_class(ElementRef::NavLink(current), class));
            }
        }
    }

    fn on_skills_visibility(&mut self, ratio: f64, out: &mut Vec<DomEffect>) {
        let Some(plan) = self.skills.record(ratio) else {
            return;
        };
        out.push(DomEffect::Unobserve {
            target: ElementRef::SkillsSection,
        });
        let delay = self.config.reveal.skill_fill_delay();
        for fill in plan {
            let target = ElementRef::SkillBar(fill.bar);
            out.push(DomEffect::SetWidth {
                target,
                width: "0".to_string(),
            });
            // The zero width must be committed or the browser skips the transition.
            out.push(DomEffect::FlushStyles { target });
            self.tasks.schedule(
                delay,
                DeferredTask::RestoreSkillWidth {
                    bar: fill.bar,
                    width: fill.width,
                },
            );
        }
    }

    fn on_card_visibility(&mut self, card: usize, ratio: f64, out: &mut Vec<DomEffect>) {
        if self.cards.record(card, ratio) {
            let target = ElementRef::Card(card);
            out.push(DomEffect::add_class(target, &self.config.classes.revealed));
            out.push(DomEffect::Unobserve { target });
        }
    }

    fn on_nav_link(&mut self, link: usize, target_top: Option<f64>, out: &mut Vec<DomEffect>) {
        let activation = self.nav.activate_link(link, target_top);
        if let Some(transition) = activation.menu {
            self.push_menu(transition, out);
        }
        if let Some(scroll) = activation.scroll {
            out.push(DomEffect::ScrollTo {
                top: scroll.top,
                behavior: scroll.behavior,
            });
        }
    }

    fn on_submit(&mut self, submission: ContactSubmission, out: &mut Vec<DomEffect>) {
        if !self.manifest.has_contact_form {
            tracing::warn!("submit received but no contact form is registered");
            return;
        }
        // The message it would expire is about to be replaced.
        if let Some(handle) = self.dismiss_task.take() {
            self.tasks.cancel(handle);
        }
        let outcome = self.form.submit(submission);
        if let Some(id) = outcome.replaced {
            out.push(DomEffect::RemoveFeedback { id });
        }
        let id = outcome.shown.id;
        let success = outcome.is_success();
        out.push(DomEffect::ShowFeedback {
            message: outcome.shown,
        });
        if success {
            out.push(DomEffect::ResetForm);
            self.dismiss_task = Some(self.tasks.schedule(
                self.config.form.success_ttl(),
                DeferredTask::DismissFeedback { message: id },
            ));
        }
    }

    fn on_load(&mut self, out: &mut Vec<DomEffect>) {
        if self.loaded {
            return;
        }
        self.loaded = true;
        out.push(DomEffect::add_class(ElementRef::Body, &self.config.classes.loaded));
    }

    fn push_menu(&self, transition: MenuTransition, out: &mut Vec<DomEffect>) {
        let class = &self.config.classes.active;
        let open = transition.is_open();
        out.push(DomEffect::set_class(ElementRef::NavMenu, class, open));
        out.push(DomEffect::set_class(ElementRef::NavToggle, class, open));
    }

    fn run_tasks(&mut self, due: Vec<DeferredTask>) -> Vec<DomEffect> {
        let mut out = Vec::new();
        for task in due {
            match task {
                DeferredTask::RestoreSkillWidth { bar, width } => {
                    out.push(DomEffect::SetWidth {
                        target: ElementRef::SkillBar(bar),
                        width,
                    });
                }
                DeferredTask::DismissFeedback { message } => {
                    self.dismiss_task = None;
                    if self.form.dismiss(message) {
                        out.push(DomEffect::RemoveFeedback { id: message });
                    } else {
                        tracing::trace!(id = message.get(), "feedback already gone");
                    }
                }
            }
        }
        out
    }
}
