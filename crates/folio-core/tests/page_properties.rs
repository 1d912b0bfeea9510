//! End-to-end behavior of the page controller, driven the way the browser
//! host drives it: events in, effects out, time advanced explicitly.

use core::time::Duration;

use folio_core::{
    ContactSubmission, DomEffect, ElementRef, FeedbackKind, FolioController, Key, PageConfig,
    PageEvent, PageManifest, ScrollBehavior, SectionBounds,
};
use pretty_assertions::assert_eq;

fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_test_writer()
        .try_init();
}

fn manifest() -> PageManifest {
    PageManifest {
        nav_links: vec![
            "#home".into(),
            "#about".into(),
            "#skills".into(),
            "#contact".into(),
        ],
        skill_bar_widths: vec!["95%".into(), "85%".into(), "70%".into()],
        card_count: 4,
        has_skills_section: true,
        has_year_slot: true,
        has_contact_form: true,
    }
}

fn page() -> FolioController {
    init_logging();
    FolioController::new(manifest(), PageConfig::default()).unwrap()
}

fn sections() -> Vec<SectionBounds> {
    vec![
        SectionBounds::new("about", 500.0, 300.0),
        SectionBounds::new("skills", 800.0, 400.0),
    ]
}

fn scroll(p: &mut FolioController, scroll_y: f64) -> Vec<DomEffect> {
    p.dispatch(PageEvent::Scroll {
        scroll_y,
        sections: sections(),
    })
}

fn active_links(effects: &[DomEffect]) -> Vec<usize> {
    effects
        .iter()
        .filter_map(|e| match e {
            DomEffect::SetClass {
                target: ElementRef::NavLink(i),
                enabled: true,
                ..
            } => Some(*i),
            _ => None,
        })
        .collect()
}

fn submit(p: &mut FolioController, name: &str, email: &str, message: &str) -> Vec<DomEffect> {
    p.dispatch(PageEvent::Submit {
        submission: ContactSubmission::new(name, email, message),
    })
}

#[test]
fn header_compacts_strictly_above_one_hundred() {
    let mut p = page();
    for y in [0.0, 50.0, 100.0] {
        scroll(&mut p, y);
        assert!(!p.nav().is_scrolled(), "offset {y}");
    }
    let effects = scroll(&mut p, 101.0);
    assert!(p.nav().is_scrolled());
    assert!(effects.contains(&DomEffect::add_class(ElementRef::Navbar, "scrolled")));

    // Re-applying the same state emits nothing.
    let effects = scroll(&mut p, 102.0);
    assert!(!effects.iter().any(|e| matches!(
        e,
        DomEffect::SetClass {
            target: ElementRef::Navbar,
            ..
        }
    )));

    let effects = scroll(&mut p, 100.0);
    assert!(effects.contains(&DomEffect::remove_class(ElementRef::Navbar, "scrolled")));
}

#[test]
fn even_number_of_toggles_restores_menu() {
    let mut p = page();
    for _ in 0..6 {
        p.dispatch(PageEvent::MenuToggle);
    }
    assert!(!p.nav().is_menu_open());
    p.dispatch(PageEvent::MenuToggle);
    assert!(p.nav().is_menu_open());
}

#[test]
fn active_link_tracks_section_under_header() {
    let mut p = page();
    // point = scroll_y + 150
    assert_eq!(active_links(&scroll(&mut p, 500.0)), vec![1]);
    assert_eq!(p.nav().active_link(), Some(1));

    let effects = scroll(&mut p, 750.0);
    assert_eq!(active_links(&effects), vec![2]);
    assert!(effects.contains(&DomEffect::remove_class(ElementRef::NavLink(1), "active")));

    let effects = scroll(&mut p, 1850.0);
    assert!(active_links(&effects).is_empty());
    assert!(effects.contains(&DomEffect::remove_class(ElementRef::NavLink(2), "active")));
    assert_eq!(p.nav().active_link(), None);
}

#[test]
fn contact_form_outcomes() {
    let mut p = page();

    let effects = submit(&mut p, "", "a@b.com", "hi");
    let shown = p.form().feedback().unwrap();
    assert_eq!(shown.kind, FeedbackKind::Error);
    assert_eq!(shown.text, "Please fill in all fields");
    assert!(!effects.contains(&DomEffect::ResetForm));

    submit(&mut p, "A", "not-an-email", "hi");
    assert_eq!(
        p.form().feedback().unwrap().text,
        "Please enter a valid email address"
    );

    let effects = submit(&mut p, "A", "a@b.com", "hi");
    assert_eq!(p.form().feedback().unwrap().kind, FeedbackKind::Success);
    assert!(effects.contains(&DomEffect::ResetForm));
}

#[test]
fn two_submissions_leave_exactly_one_message() {
    let mut p = page();
    let mut attached = Vec::new();
    for effects in [
        submit(&mut p, "A", "a@b.com", "hi"),
        submit(&mut p, "", "", ""),
    ] {
        for effect in effects {
            match effect {
                DomEffect::ShowFeedback { message } => attached.push(message.id),
                DomEffect::RemoveFeedback { id } => attached.retain(|m| *m != id),
                _ => {}
            }
        }
    }
    assert_eq!(attached.len(), 1);
    assert_eq!(p.form().feedback().map(|m| m.id), attached.first().copied());

    // Nothing left pending may remove the error message.
    assert!(p.advance_time(Duration::from_secs(6)).is_empty());
    assert!(p.form().feedback().is_some());
}

#[test]
fn card_reveal_fires_once_across_enter_exit_enter() {
    let mut p = page();
    // Below the fold, partly in, scrolled past, fully back in.
    let mut reveals = 0;
    for ratio in [0.0, 0.25, 0.0, 1.0] {
        reveals += p
            .dispatch(PageEvent::CardVisibility { card: 2, ratio })
            .iter()
            .filter(|e| matches!(e, DomEffect::SetClass { .. }))
            .count();
    }
    assert_eq!(reveals, 1);
    assert!(p.cards().is_revealed(2));
}

#[test]
fn reduced_motion_still_reaches_target_instantly() {
    let mut p = page();
    let init = p.dispatch(PageEvent::Init {
        year: 2026,
        reduced_motion: true,
    });
    assert!(init.contains(&DomEffect::SetRootScrollBehavior {
        behavior: ScrollBehavior::Instant
    }));

    let effects = p.dispatch(PageEvent::NavLinkClick {
        link: 2,
        target_top: Some(800.0),
    });
    assert_eq!(
        effects,
        vec![DomEffect::ScrollTo {
            top: 720.0,
            behavior: ScrollBehavior::Instant
        }]
    );
}

#[test]
fn full_visit_timeline() {
    let mut p = page();
    let init = p.dispatch(PageEvent::Init {
        year: 2026,
        reduced_motion: false,
    });
    assert_eq!(
        init[0],
        DomEffect::SetText {
            target: ElementRef::YearSlot,
            text: "2026".into()
        }
    );

    p.set_time(Duration::from_millis(300));
    assert_eq!(
        p.dispatch(PageEvent::Load),
        vec![DomEffect::add_class(ElementRef::Body, "loaded")]
    );

    p.dispatch(PageEvent::MenuToggle);
    let effects = p.dispatch(PageEvent::NavLinkClick {
        link: 2,
        target_top: Some(800.0),
    });
    assert!(!p.nav().is_menu_open());
    assert_eq!(
        effects.last(),
        Some(&DomEffect::ScrollTo {
            top: 720.0,
            behavior: ScrollBehavior::Smooth
        })
    );

    // Skills section scrolls into view; bars collapse now and refill 100ms later.
    let collapse = p.dispatch(PageEvent::SkillsVisibility { ratio: 0.55 });
    assert_eq!(
        collapse
            .iter()
            .filter(|e| matches!(e, DomEffect::SetWidth { width, .. } if width == "0"))
            .count(),
        3
    );
    assert_eq!(p.next_deadline(), Some(Duration::from_millis(400)));
    let restore = p.set_time(Duration::from_millis(400));
    assert_eq!(
        restore,
        vec![
            DomEffect::SetWidth {
                target: ElementRef::SkillBar(0),
                width: "95%".into()
            },
            DomEffect::SetWidth {
                target: ElementRef::SkillBar(1),
                width: "85%".into()
            },
            DomEffect::SetWidth {
                target: ElementRef::SkillBar(2),
                width: "70%".into()
            },
        ]
    );

    assert!(
        p.dispatch(PageEvent::KeyDown {
            key: Key::Escape
        })
        .is_empty()
    );

    submit(&mut p, "Ada", "ada@example.com", "Hello");
    assert_eq!(p.pending_tasks(), 1);
    let expired = p.set_time(Duration::from_millis(5400));
    assert!(matches!(expired.as_slice(), [DomEffect::RemoveFeedback { .. }]));
    assert_eq!(p.pending_tasks(), 0);
    assert_eq!(p.next_deadline(), None);
}

#[test]
fn custom_config_changes_classes_and_offsets() {
    init_logging();
    let config = PageConfig::from_json(
        r#"{"scroll":{"header_offset":0},"classes":{"revealed":"visible","active":"current"}}"#,
    )
    .unwrap();
    let mut p = FolioController::new(manifest(), config).unwrap();

    let effects = p.dispatch(PageEvent::NavLinkClick {
        link: 1,
        target_top: Some(500.0),
    });
    assert_eq!(
        effects,
        vec![DomEffect::ScrollTo {
            top: 500.0,
            behavior: ScrollBehavior::Smooth
        }]
    );

    let effects = p.dispatch(PageEvent::CardVisibility {
        card: 0,
        ratio: 1.0,
    });
    assert_eq!(
        effects[0],
        DomEffect::add_class(ElementRef::Card(0), "visible")
    );

    let effects = p.dispatch(PageEvent::MenuToggle);
    assert_eq!(
        effects[0],
        DomEffect::add_class(ElementRef::NavMenu, "current")
    );
}

#[test]
fn nav_link_to_element_outside_tracked_sections_scrolls() {
    init_logging();
    let mut p = FolioController::new(
        PageManifest {
            nav_links: vec!["#home".into()],
            ..manifest()
        },
        PageConfig::default(),
    )
    .unwrap();

    // `#home` is a `<header>`, so it never shows up in the section list.
    scroll(&mut p, 0.0);
    assert_eq!(p.nav().active_link(), None);

    let effects = p.dispatch(PageEvent::NavLinkClick {
        link: 0,
        target_top: Some(0.0),
    });
    assert_eq!(
        effects,
        vec![DomEffect::ScrollTo {
            top: -80.0,
            behavior: ScrollBehavior::Smooth
        }]
    );

    let effects = p.dispatch(PageEvent::NavLinkClick {
        link: 0,
        target_top: None,
    });
    assert!(effects.is_empty());
}
