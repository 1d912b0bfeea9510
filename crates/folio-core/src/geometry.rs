#![forbid(unsafe_code)]

//! Vertical section spans for active-link tracking.
//!
//! All units are CSS pixels as reported by the host. Values are `f64`
//! because the DOM reports fractional offsets on zoomed or high-DPI pages.

use serde::{Deserialize, Serialize};

/// Vertical span of an identified page section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionBounds {
    pub id: String,
    pub top: f64,
    pub height: f64,
}

impl SectionBounds {
    #[must_use]
    pub fn new(id: impl Into<String>, top: f64, height: f64) -> Self {
        Self {
            id: id.into(),
            top,
            height,
        }
    }

    /// Half-open containment: `top <= point < top + height`.
    #[must_use]
    pub fn contains(&self, point: f64) -> bool {
        self.top <= point && point < self.top + self.height
    }
}

/// Section containing `point`. When sections overlap, the later one in
/// document order wins.
#[must_use]
pub fn section_at(sections: &[SectionBounds], point: f64) -> Option<&SectionBounds> {
    sections.iter().rev().find(|section| section.contains(point))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn section_containment_is_half_open() {
        let s = SectionBounds::new("about", 500.0, 300.0);
        assert!(!s.contains(499.9));
        assert!(s.contains(500.0));
        assert!(s.contains(799.9));
        assert!(!s.contains(800.0));
    }

    #[test]
    fn overlapping_sections_prefer_later() {
        let sections = vec![
            SectionBounds::new("a", 0.0, 1000.0),
            SectionBounds::new("b", 400.0, 200.0),
        ];
        assert_eq!(section_at(&sections, 450.0).map(|s| s.id.as_str()), Some("b"));
        assert_eq!(section_at(&sections, 700.0).map(|s| s.id.as_str()), Some("a"));
        assert!(section_at(&sections, 1500.0).is_none());
    }
}
