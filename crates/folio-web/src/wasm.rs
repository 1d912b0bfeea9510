#![forbid(unsafe_code)]

use core::time::Duration;
use std::cell::RefCell;
use std::rc::{Rc, Weak};

use folio_core::config::Selectors;
use folio_core::nav::fragment_target;
use folio_core::{
    DomEffect, ElementRef, FolioController, Key, MessageId, PageConfig, PageEvent, PageManifest,
    REDUCED_MOTION_QUERY, ScrollBehavior, SectionBounds,
};
use gloo::events::{EventListener, EventListenerOptions};
use gloo::timers::callback::Timeout;
use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{
    Document, Element, HtmlElement, HtmlFormElement, HtmlInputElement, HtmlTextAreaElement,
    IntersectionObserver, IntersectionObserverEntry, IntersectionObserverInit, KeyboardEvent,
    ScrollToOptions, Window,
};

use crate::console_layer::{ConsoleLayer, ConsoleLevel, ConsoleSink};
use crate::lifecycle::rollback_on_err;

type Shared = Rc<RefCell<Runtime>>;
type ObserverCallback = Closure<dyn FnMut(js_sys::Array, IntersectionObserver)>;

/// Browser `console.*` sink.
struct WebConsole;

impl ConsoleSink for WebConsole {
    fn write_line(&self, level: ConsoleLevel, line: &str) {
        let line = JsValue::from_str(line);
        match level {
            ConsoleLevel::Error => web_sys::console::error_1(&line),
            ConsoleLevel::Warn => web_sys::console::warn_1(&line),
            ConsoleLevel::Info => web_sys::console::info_1(&line),
            ConsoleLevel::Debug => web_sys::console::debug_1(&line),
        }
    }
}

fn install_logging(level: Level) {
    let subscriber =
        tracing_subscriber::registry().with(ConsoleLayer::new(WebConsole, level));
    if tracing::subscriber::set_global_default(subscriber).is_err() {
        tracing::debug!("console logging already installed");
    }
}

/// Element handles captured once at mount.
struct PageHandles {
    document: Document,
    root: Option<HtmlElement>,
    body: Option<HtmlElement>,
    navbar: Option<Element>,
    nav_toggle: Option<Element>,
    nav_menu: Option<Element>,
    nav_links: Vec<Element>,
    sections: Vec<HtmlElement>,
    skills_section: Option<Element>,
    skill_bars: Vec<HtmlElement>,
    cards: Vec<Element>,
    contact_form: Option<HtmlFormElement>,
    name_field: Option<Element>,
    email_field: Option<Element>,
    message_field: Option<Element>,
    year_slot: Option<Element>,
}

impl PageHandles {
    fn capture(document: Document, selectors: &Selectors) -> Result<Self, JsValue> {
        let one = |selector: &str| document.query_selector(selector);
        let root = document
            .document_element()
            .and_then(|el| el.dyn_into::<HtmlElement>().ok());
        let body = document.body();
        let contact_form = one(&selectors.contact_form)?
            .and_then(|el| el.dyn_into::<HtmlFormElement>().ok());
        Ok(Self {
            root,
            body,
            navbar: one(&selectors.navbar)?,
            nav_toggle: one(&selectors.nav_toggle)?,
            nav_menu: one(&selectors.nav_menu)?,
            nav_links: query_all(&document, &selectors.nav_links)?,
            sections: query_all(&document, &selectors.sections)?,
            skills_section: one(&selectors.skills_section)?,
            skill_bars: query_all(&document, &selectors.skill_bars)?,
            cards: query_all(&document, &selectors.cards)?,
            contact_form,
            name_field: one(&selectors.name_field)?,
            email_field: one(&selectors.email_field)?,
            message_field: one(&selectors.message_field)?,
            year_slot: one(&selectors.year_slot)?,
            document,
        })
    }

    fn manifest(&self) -> PageManifest {
        PageManifest {
            nav_links: self
                .nav_links
                .iter()
                .map(|link| link.get_attribute("href").unwrap_or_default())
                .collect(),
            skill_bar_widths: self
                .skill_bars
                .iter()
                .map(|bar| bar.style().get_property_value("width").unwrap_or_default())
                .collect(),
            card_count: self.cards.len(),
            has_skills_section: self.skills_section.is_some(),
            has_year_slot: self.year_slot.is_some(),
            has_contact_form: self.contact_form.is_some(),
        }
    }

    /// Current section geometry, in document coordinates.
    fn section_bounds(&self) -> Vec<SectionBounds> {
        self.sections
            .iter()
            .map(|section| {
                SectionBounds::new(
                    section.id(),
                    f64::from(section.offset_top()),
                    f64::from(section.offset_height()),
                )
            })
            .collect()
    }

    /// Document offset of whatever element a nav link's fragment names.
    fn link_target_top(&self, link: usize) -> Option<f64> {
        let href = self.nav_links.get(link)?.get_attribute("href")?;
        let id = fragment_target(&href)?;
        let target = self.document.get_element_by_id(id)?;
        let target = target.dyn_ref::<HtmlElement>()?;
        Some(f64::from(target.offset_top()))
    }

    fn element(&self, target: ElementRef) -> Option<&Element> {
        match target {
            ElementRef::Root => self.root.as_ref().map(|el| el.unchecked_ref::<Element>()),
            ElementRef::Body => self.body.as_ref().map(|el| el.unchecked_ref::<Element>()),
            ElementRef::Navbar => self.navbar.as_ref(),
            ElementRef::NavToggle => self.nav_toggle.as_ref(),
            ElementRef::NavMenu => self.nav_menu.as_ref(),
            ElementRef::NavLink(i) => self.nav_links.get(i),
            ElementRef::SkillsSection => self.skills_section.as_ref(),
            ElementRef::SkillBar(i) => self.skill_bars.get(i).map(|el| el.unchecked_ref::<Element>()),
            ElementRef::Card(i) => self.cards.get(i),
            ElementRef::ContactForm => self
                .contact_form
                .as_ref()
                .map(|el| el.unchecked_ref::<Element>()),
            ElementRef::YearSlot => self.year_slot.as_ref(),
        }
    }

    fn html_element(&self, target: ElementRef) -> Option<&HtmlElement> {
        self.element(target).and_then(|el| el.dyn_ref::<HtmlElement>())
    }

    fn submission(&self) -> folio_core::ContactSubmission {
        folio_core::ContactSubmission::new(
            field_value(self.name_field.as_ref()),
            field_value(self.email_field.as_ref()),
            field_value(self.message_field.as_ref()),
        )
    }
}

fn query_all<T: JsCast>(document: &Document, selector: &str) -> Result<Vec<T>, JsValue> {
    let list = document.query_selector_all(selector)?;
    Ok((0..list.length())
        .filter_map(|i| list.item(i))
        .filter_map(|node| node.dyn_into::<T>().ok())
        .collect())
}

fn field_value(field: Option<&Element>) -> String {
    let Some(field) = field else {
        return String::new();
    };
    if let Some(input) = field.dyn_ref::<HtmlInputElement>() {
        input.value()
    } else if let Some(area) = field.dyn_ref::<HtmlTextAreaElement>() {
        area.value()
    } else {
        String::new()
    }
}

fn current_year() -> i32 {
    i32::try_from(js_sys::Date::new_0().get_full_year()).unwrap_or_default()
}

fn web_scroll_behavior(behavior: ScrollBehavior) -> web_sys::ScrollBehavior {
    match behavior {
        ScrollBehavior::Smooth => web_sys::ScrollBehavior::Smooth,
        ScrollBehavior::Instant => web_sys::ScrollBehavior::Instant,
    }
}

/// Mounted page state shared by every listener.
struct Runtime {
    window: Window,
    controller: FolioController,
    handles: PageHandles,
    feedback: Option<(MessageId, Element)>,
    skills_observer: Option<IntersectionObserver>,
    card_observer: Option<IntersectionObserver>,
    timer: Option<Timeout>,
    origin_ms: f64,
}

impl Runtime {
    fn elapsed(&self) -> Duration {
        let now = self
            .window
            .performance()
            .map_or(self.origin_ms, |perf| perf.now());
        Duration::from_secs_f64((now - self.origin_ms).max(0.0) / 1000.0)
    }

    /// Bring the controller clock up to wall time, applying anything that came due.
    fn sync_clock(&mut self) {
        let now = self.elapsed();
        let due = self.controller.set_time(now);
        self.apply_all(due);
    }

    fn apply_all(&mut self, effects: Vec<DomEffect>) {
        for effect in effects {
            if let Err(err) = self.apply(effect) {
                tracing::warn!(error = ?err, "failed to apply DOM effect");
            }
        }
    }

    fn apply(&mut self, effect: DomEffect) -> Result<(), JsValue> {
        match effect {
            DomEffect::SetClass {
                target,
                class,
                enabled,
            } => {
                if let Some(el) = self.handles.element(target) {
                    el.class_list().toggle_with_force(&class, enabled)?;
                }
            }
            DomEffect::SetWidth { target, width } => {
                if let Some(el) = self.handles.html_element(target) {
                    el.style().set_property("width", &width)?;
                }
            }
            DomEffect::FlushStyles { target } => {
                if let Some(el) = self.handles.html_element(target) {
                    // Reading layout commits the pending inline style.
                    let _ = el.offset_width();
                }
            }
            DomEffect::SetText { target, text } => {
                if let Some(el) = self.handles.element(target) {
                    el.set_text_content(Some(&text));
                }
            }
            DomEffect::ScrollTo { top, behavior } => {
                let options = ScrollToOptions::new();
                options.set_top(top);
                options.set_behavior(web_scroll_behavior(behavior));
                self.window.scroll_to_with_scroll_to_options(&options);
            }
            DomEffect::SetRootScrollBehavior { behavior } => {
                if let Some(root) = &self.handles.root {
                    root.style()
                        .set_property("scroll-behavior", behavior.as_css())?;
                }
            }
            DomEffect::Unobserve { target } => {
                let observer = match target {
                    ElementRef::SkillsSection => self.skills_observer.as_ref(),
                    ElementRef::Card(_) => self.card_observer.as_ref(),
                    _ => None,
                };
                if let (Some(observer), Some(el)) = (observer, self.handles.element(target)) {
                    observer.unobserve(el);
                }
            }
            DomEffect::ShowFeedback { message } => {
                let Some(form) = &self.handles.contact_form else {
                    return Ok(());
                };
                let div = self.handles.document.create_element("div")?;
                div.set_class_name(&message.class_name());
                div.set_attribute("style", &message.inline_style())?;
                div.set_text_content(Some(&message.text));
                form.append_child(&div)?;
                self.feedback = Some((message.id, div));
            }
            DomEffect::RemoveFeedback { id } => {
                if self.feedback.as_ref().is_some_and(|(shown, _)| *shown == id) {
                    if let Some((_, el)) = self.feedback.take() {
                        el.remove();
                    }
                }
            }
            DomEffect::ResetForm => {
                if let Some(form) = &self.handles.contact_form {
                    form.reset();
                }
            }
            DomEffect::Console { line } => {
                web_sys::console::log_2(
                    &JsValue::from_str(&format!("%c{}", line.text)),
                    &JsValue::from_str(&line.css),
                );
            }
        }
        Ok(())
    }

    /// Keep exactly one timer armed for the controller's next deadline.
    fn rearm(&mut self, shared: Weak<RefCell<Runtime>>) {
        self.timer = None;
        let Some(deadline) = self.controller.next_deadline() else {
            return;
        };
        let delay = deadline.saturating_sub(self.elapsed());
        let millis = u32::try_from(delay.as_millis()).unwrap_or(u32::MAX);
        self.timer = Some(Timeout::new(millis, move || {
            if let Some(shared) = shared.upgrade() {
                tick(&shared);
            }
        }));
    }
}

fn dispatch(shared: &Shared, event: PageEvent) {
    let Ok(mut rt) = shared.try_borrow_mut() else {
        tracing::warn!(?event, "re-entrant page event dropped");
        return;
    };
    rt.sync_clock();
    let effects = rt.controller.dispatch(event);
    rt.apply_all(effects);
    rt.rearm(Rc::downgrade(shared));
}

fn tick(shared: &Shared) {
    let Ok(mut rt) = shared.try_borrow_mut() else {
        return;
    };
    rt.sync_clock();
    rt.rearm(Rc::downgrade(shared));
}

fn scroll_event(shared: &Shared) -> PageEvent {
    let rt = shared.borrow();
    PageEvent::Scroll {
        scroll_y: rt.window.scroll_y().unwrap_or_default(),
        sections: rt.handles.section_bounds(),
    }
}

fn nav_click_event(shared: &Shared, link: usize) -> PageEvent {
    PageEvent::NavLinkClick {
        link,
        target_top: shared.borrow().handles.link_target_top(link),
    }
}

fn observer(
    threshold: f64,
    callback: &ObserverCallback,
) -> Result<IntersectionObserver, JsValue> {
    let init = IntersectionObserverInit::new();
    init.set_threshold(&JsValue::from_f64(threshold));
    IntersectionObserver::new_with_options(callback.as_ref().unchecked_ref(), &init)
}

fn visibility_entries(entries: &js_sys::Array) -> impl Iterator<Item = IntersectionObserverEntry> + '_ {
    entries
        .iter()
        .filter_map(|entry| entry.dyn_into::<IntersectionObserverEntry>().ok())
}

/// The Folio page enhancement layer, mounted on the current document.
#[wasm_bindgen]
pub struct FolioPage {
    runtime: Option<Shared>,
    listeners: Vec<EventListener>,
    observer_callbacks: Vec<ObserverCallback>,
}

#[wasm_bindgen]
impl FolioPage {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            runtime: None,
            listeners: Vec::new(),
            observer_callbacks: Vec::new(),
        }
    }

    /// Capture the page and start listening.
    ///
    /// `options` is an optional plain object with the same shape as the
    /// page configuration, plus an optional `log_level` string.
    pub fn mount(&mut self, options: Option<JsValue>) -> Result<(), JsValue> {
        if self.runtime.is_some() {
            return Err(JsValue::from_str("FolioPage is already mounted"));
        }
        let options = match options {
            Some(value) if !value.is_undefined() && !value.is_null() => {
                String::from(js_sys::JSON::stringify(&value)?)
            }
            _ => "{}".to_string(),
        };
        let level = serde_json::from_str::<serde_json::Value>(&options)
            .ok()
            .and_then(|v| v.get("log_level")?.as_str()?.parse::<Level>().ok())
            .unwrap_or(Level::INFO);
        install_logging(level);

        let config =
            PageConfig::from_json(&options).map_err(|err| JsValue::from_str(&err.to_string()))?;
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
        let document = window
            .document()
            .ok_or_else(|| JsValue::from_str("no document"))?;
        let handles = PageHandles::capture(document.clone(), &config.selectors)?;
        let manifest = handles.manifest();
        let reduced_motion = window
            .match_media(REDUCED_MOTION_QUERY)
            .ok()
            .flatten()
            .is_some_and(|query| query.matches());
        let skills_threshold = config.reveal.skills_threshold;
        let cards_threshold = config.reveal.cards_threshold;
        let controller =
            FolioController::new(manifest, config).map_err(|err| JsValue::from_str(&err.to_string()))?;
        let origin_ms = window.performance().map_or(0.0, |perf| perf.now());

        let shared: Shared = Rc::new(RefCell::new(Runtime {
            window: window.clone(),
            controller,
            handles,
            feedback: None,
            skills_observer: None,
            card_observer: None,
            timer: None,
            origin_ms,
        }));

        self.runtime = Some(Rc::clone(&shared));
        rollback_on_err(
            self,
            |page| page.observe(&shared, skills_threshold, cards_threshold),
            FolioPage::destroy,
        )?;
        self.listen(&shared, &window, &document);

        dispatch(
            &shared,
            PageEvent::Init {
                year: current_year(),
                reduced_motion,
            },
        );
        // A reload can restore a scrolled position before any scroll event.
        let initial = scroll_event(&shared);
        dispatch(&shared, initial);
        if document.ready_state() == "complete" {
            dispatch(&shared, PageEvent::Load);
        }

        tracing::info!("page mounted");
        Ok(())
    }

    #[wasm_bindgen(js_name = isMounted)]
    pub fn is_mounted(&self) -> bool {
        self.runtime.is_some()
    }

    #[wasm_bindgen(js_name = isMenuOpen)]
    pub fn is_menu_open(&self) -> bool {
        self.runtime
            .as_ref()
            .is_some_and(|rt| rt.borrow().controller.nav().is_menu_open())
    }

    /// Explicit teardown for JS callers. Stops observers, timers, and
    /// listeners so the page can be remounted.
    pub fn destroy(&mut self) {
        self.listeners.clear();
        if let Some(shared) = self.runtime.take() {
            let mut rt = shared.borrow_mut();
            rt.timer = None;
            for observer in [rt.skills_observer.take(), rt.card_observer.take()]
                .into_iter()
                .flatten()
            {
                observer.disconnect();
            }
        }
        self.observer_callbacks.clear();
    }
}

impl FolioPage {
    fn observe(
        &mut self,
        shared: &Shared,
        skills_threshold: f64,
        cards_threshold: f64,
    ) -> Result<(), JsValue> {
        let mut rt = shared.borrow_mut();

        if let Some(section) = rt.handles.skills_section.clone() {
            let state = Rc::clone(shared);
            let callback: ObserverCallback =
                Closure::new(move |entries: js_sys::Array, _observer: IntersectionObserver| {
                    for entry in visibility_entries(&entries) {
                        let ratio = entry.intersection_ratio();
                        dispatch(&state, PageEvent::SkillsVisibility { ratio });
                    }
                });
            let skills = observer(skills_threshold, &callback)?;
            skills.observe(&section);
            rt.skills_observer = Some(skills);
            self.observer_callbacks.push(callback);
        }

        if !rt.handles.cards.is_empty() {
            let state = Rc::clone(shared);
            let callback: ObserverCallback =
                Closure::new(move |entries: js_sys::Array, _observer: IntersectionObserver| {
                    for entry in visibility_entries(&entries) {
                        let target = entry.target();
                        let card = state.borrow().handles.cards.iter().position(|c| *c == target);
                        if let Some(card) = card {
                            let ratio = entry.intersection_ratio();
                            dispatch(&state, PageEvent::CardVisibility { card, ratio });
                        }
                    }
                });
            let cards = observer(cards_threshold, &callback)?;
            for card in &rt.handles.cards {
                cards.observe(card);
            }
            rt.card_observer = Some(cards);
            self.observer_callbacks.push(callback);
        }
        Ok(())
    }

    fn listen(&mut self, shared: &Shared, window: &Window, document: &Document) {
        let state = Rc::clone(shared);
        self.listeners.push(EventListener::new(window, "scroll", move |_| {
            let event = scroll_event(&state);
            dispatch(&state, event);
        }));

        let state = Rc::clone(shared);
        self.listeners.push(EventListener::new(window, "load", move |_| {
            dispatch(&state, PageEvent::Load);
        }));

        let state = Rc::clone(shared);
        self.listeners.push(EventListener::new(document, "keydown", move |event| {
            if let Some(event) = event.dyn_ref::<KeyboardEvent>() {
                let key = Key::from_dom_key(&event.key());
                dispatch(&state, PageEvent::KeyDown { key });
            }
        }));

        let rt = shared.borrow();

        if let Some(toggle) = &rt.handles.nav_toggle {
            let state = Rc::clone(shared);
            self.listeners.push(EventListener::new(toggle, "click", move |_| {
                dispatch(&state, PageEvent::MenuToggle);
            }));
        }

        for (index, link) in rt.handles.nav_links.iter().enumerate() {
            let state = Rc::clone(shared);
            self.listeners.push(EventListener::new_with_options(
                link,
                "click",
                EventListenerOptions::enable_prevent_default(),
                move |event| {
                    let page_event = nav_click_event(&state, index);
                    if page_event.suppresses_default() {
                        event.prevent_default();
                    }
                    dispatch(&state, page_event);
                },
            ));
        }

        if let Some(form) = &rt.handles.contact_form {
            let state = Rc::clone(shared);
            self.listeners.push(EventListener::new_with_options(
                form,
                "submit",
                EventListenerOptions::enable_prevent_default(),
                move |event| {
                    let submission = state.borrow().handles.submission();
                    let page_event = PageEvent::Submit { submission };
                    if page_event.suppresses_default() {
                        event.prevent_default();
                    }
                    dispatch(&state, page_event);
                },
            ));
        }
    }
}

impl Default for FolioPage {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for FolioPage {
    fn drop(&mut self) {
        self.destroy();
    }
}
