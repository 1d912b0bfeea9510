#![forbid(unsafe_code)]

//! Scroll-triggered reveal animations built on [`VisibilityObserver`].
//!
//! - Skill bars fill in once when the skills section is half visible.
//! - Cards receive the reveal class the first time a tenth of them is visible.

use crate::config::RevealConfig;
use crate::visibility::VisibilityObserver;

/// Observation key for the skills section (there is only one).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SkillsSection;

/// One skill bar's collapse-then-restore step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkillFill {
    pub bar: usize,
    /// Width to restore after the fill delay.
    pub width: String,
}

/// Skill-bar fill animation.
#[derive(Debug, Clone)]
pub struct SkillBarAnimator {
    widths: Vec<String>,
    observer: VisibilityObserver<SkillsSection>,
}

impl SkillBarAnimator {
    /// `widths` are the inline target widths recorded at registration, in
    /// document order. Without a skills section there is nothing to observe.
    #[must_use]
    pub fn new(widths: Vec<String>, has_section: bool, config: &RevealConfig) -> Self {
        let mut observer = VisibilityObserver::new(config.skills_threshold);
        if has_section {
            observer.observe(SkillsSection);
        }
        Self { widths, observer }
    }

    #[must_use]
    pub fn bar_count(&self) -> usize {
        self.widths.len()
    }

    #[must_use]
    pub fn target_width(&self, bar: usize) -> Option<&str> {
        self.widths.get(bar).map(String::as_str)
    }

    #[must_use]
    pub fn has_played(&self) -> bool {
        self.observer.has_fired(SkillsSection)
    }

    #[must_use]
    pub fn is_armed(&self) -> bool {
        self.observer.is_watching(SkillsSection)
    }

    /// Report the skills section's intersection ratio. Returns the fill plan
    /// on the first crossing, `None` otherwise.
    pub fn record(&mut self, ratio: f64) -> Option<Vec<SkillFill>> {
        if !self.observer.record(SkillsSection, ratio) {
            return None;
        }
        tracing::info!(bars = self.widths.len(), "skills section revealed");
        Some(
            self.widths
                .iter()
                .enumerate()
                .map(|(bar, width)| SkillFill {
                    bar,
                    width: width.clone(),
                })
                .collect(),
        )
    }
}

/// Fade-in reveal for cards.
#[derive(Debug, Clone)]
pub struct CardRevealer {
    observer: VisibilityObserver<usize>,
}

impl CardRevealer {
    #[must_use]
    pub fn new(card_count: usize, config: &RevealConfig) -> Self {
        let mut observer = VisibilityObserver::new(config.cards_threshold);
        observer.observe_all(0..card_count);
        Self { observer }
    }

    #[must_use]
    pub fn is_revealed(&self, card: usize) -> bool {
        self.observer.has_fired(card)
    }

    #[must_use]
    pub fn pending(&self) -> usize {
        self.observer.pending()
    }

    /// Returns `true` if this report reveals `card`.
    pub fn record(&mut self, card: usize, ratio: f64) -> bool {
        self.observer.record(card, ratio)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn skill_bars_fill_once_at_half_visibility() {
        let mut anim = SkillBarAnimator::new(
            vec!["90%".into(), "75%".into()],
            true,
            &RevealConfig::default(),
        );
        assert!(anim.is_armed());
        assert_eq!(anim.record(0.49), None);

        let plan = anim.record(0.5).unwrap();
        assert_eq!(
            plan,
            vec![
                SkillFill {
                    bar: 0,
                    width: "90%".into()
                },
                SkillFill {
                    bar: 1,
                    width: "75%".into()
                },
            ]
        );
        assert!(anim.has_played());
        assert_eq!(anim.record(1.0), None);
    }

    #[test]
    fn missing_skills_section_never_fires() {
        let mut anim = SkillBarAnimator::new(vec!["50%".into()], false, &RevealConfig::default());
        assert!(!anim.is_armed());
        assert_eq!(anim.record(1.0), None);
        assert_eq!(anim.target_width(0), Some("50%"));
    }

    #[test]
    fn cards_reveal_independently_and_never_revert() {
        let mut cards = CardRevealer::new(3, &RevealConfig::default());
        assert!(!cards.record(1, 0.05));
        assert!(cards.record(1, 0.1));
        assert!(!cards.record(1, 0.0));
        assert!(cards.is_revealed(1));
        assert!(!cards.is_revealed(0));
        assert_eq!(cards.pending(), 2);
        assert!(!cards.record(7, 1.0));
    }
}
