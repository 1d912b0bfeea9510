#![forbid(unsafe_code)]

//! One-shot threshold visibility observation.
//!
//! A [`VisibilityObserver`] tracks a set of targets against a single
//! threshold (fraction of the target's area inside the viewport). The host
//! reports intersection ratios as they change; the observer reports each
//! target exactly once, the first time it crosses the threshold, and then
//! stops watching it for good. A fired target cannot be re-armed.

/// Whether `ratio` counts as having crossed `threshold`.
///
/// A target must actually intersect (`ratio > 0`), so a threshold of `0`
/// fires on the first visible pixel rather than immediately.
#[must_use]
pub fn crosses(ratio: f64, threshold: f64) -> bool {
    ratio > 0.0 && ratio >= threshold
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TargetState {
    Watching,
    Fired,
}

#[derive(Debug, Clone)]
struct Observed<K> {
    key: K,
    state: TargetState,
}

/// Fire-once visibility observer keyed by `K`.
#[derive(Debug, Clone)]
pub struct VisibilityObserver<K> {
    threshold: f64,
    targets: Vec<Observed<K>>,
}

impl<K: Copy + Eq + core::fmt::Debug> VisibilityObserver<K> {
    /// Create an observer. The threshold is clamped into `[0, 1]`.
    #[must_use]
    pub fn new(threshold: f64) -> Self {
        let threshold = if threshold.is_nan() {
            0.0
        } else {
            threshold.clamp(0.0, 1.0)
        };
        Self {
            threshold,
            targets: Vec::new(),
        }
    }

    #[must_use]
    pub const fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Start watching `key`. Already-watched and already-fired keys are ignored.
    pub fn observe(&mut self, key: K) {
        if self.targets.iter().any(|t| t.key == key) {
            return;
        }
        self.targets.push(Observed {
            key,
            state: TargetState::Watching,
        });
    }

    pub fn observe_all(&mut self, keys: impl IntoIterator<Item = K>) {
        for key in keys {
            self.observe(key);
        }
    }

    /// Stop watching a key that has not fired yet. Fired keys stay retired.
    pub fn unobserve(&mut self, key: K) {
        self.targets
            .retain(|t| t.key != key || t.state == TargetState::Fired);
    }

    #[must_use]
    pub fn is_watching(&self, key: K) -> bool {
        self.targets
            .iter()
            .any(|t| t.key == key && t.state == TargetState::Watching)
    }

    #[must_use]
    pub fn has_fired(&self, key: K) -> bool {
        self.targets
            .iter()
            .any(|t| t.key == key && t.state == TargetState::Fired)
    }

    /// Number of targets still waiting to fire.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.targets
            .iter()
            .filter(|t| t.state == TargetState::Watching)
            .count()
    }

    /// Nothing left to watch; the host may disconnect its native observer.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.pending() == 0
    }

    /// Report the current intersection ratio of `key`.
    ///
    /// Returns `true` exactly once per key: on the first report that crosses
    /// the threshold. Reports for unknown or retired keys return `false`.
    pub fn record(&mut self, key: K, ratio: f64) -> bool {
        let threshold = self.threshold;
        let Some(target) = self
            .targets
            .iter_mut()
            .find(|t| t.key == key && t.state == TargetState::Watching)
        else {
            return false;
        };
        if !crosses(ratio, threshold) {
            return false;
        }
        target.state = TargetState::Fired;
        tracing::debug!(target_key = ?key, ratio, threshold, "visibility threshold crossed");
        true
    }

    /// Report a batch of samples, returning the keys that fired in input order.
    pub fn record_all(&mut self, samples: impl IntoIterator<Item = (K, f64)>) -> Vec<K> {
        samples
            .into_iter()
            .filter_map(|(key, ratio)| self.record(key, ratio).then_some(key))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn fires_once_across_enter_exit_enter() {
        let mut obs = VisibilityObserver::new(0.5);
        obs.observe(7u32);

        assert!(!obs.record(7, 0.2));
        assert!(obs.record(7, 0.6));
        assert!(!obs.record(7, 0.0));
        assert!(!obs.record(7, 1.0));
        assert!(obs.has_fired(7));
        assert!(obs.is_idle());
    }

    #[test]
    fn threshold_boundary_is_inclusive() {
        let mut obs = VisibilityObserver::new(0.1);
        obs.observe(0usize);
        assert!(!obs.record(0, 0.099));
        assert!(obs.record(0, 0.1));
    }

    #[test]
    fn zero_threshold_needs_an_intersection() {
        let mut obs = VisibilityObserver::new(0.0);
        obs.observe(1u8);
        assert!(!obs.record(1, 0.0));
        assert!(obs.record(1, 0.01));
    }

    #[test]
    fn fired_targets_cannot_be_rearmed() {
        let mut obs = VisibilityObserver::new(0.5);
        obs.observe('a');
        assert!(obs.record('a', 0.9));
        obs.unobserve('a');
        obs.observe('a');
        assert!(!obs.is_watching('a'));
        assert!(!obs.record('a', 0.9));
    }

    #[test]
    fn unobserve_drops_unfired_target() {
        let mut obs = VisibilityObserver::new(0.5);
        obs.observe_all([1, 2, 3]);
        obs.unobserve(2);
        assert_eq!(obs.pending(), 2);
        assert!(!obs.record(2, 1.0));
    }

    #[test]
    fn empty_observer_does_nothing() {
        let mut obs: VisibilityObserver<u16> = VisibilityObserver::new(0.5);
        assert!(obs.is_idle());
        assert!(obs.record_all([(1, 1.0), (2, 1.0)]).is_empty());
    }

    #[test]
    fn record_all_reports_in_input_order() {
        let mut obs = VisibilityObserver::new(0.1);
        obs.observe_all([0usize, 1, 2]);
        let fired = obs.record_all([(2, 0.5), (0, 0.05), (1, 0.3), (2, 0.9)]);
        assert_eq!(fired, vec![2, 1]);
        assert_eq!(obs.pending(), 1);
    }

    #[test]
    fn threshold_is_clamped() {
        assert_eq!(VisibilityObserver::<u8>::new(3.0).threshold(), 1.0);
        assert_eq!(VisibilityObserver::<u8>::new(-1.0).threshold(), 0.0);
        assert_eq!(VisibilityObserver::<u8>::new(f64::NAN).threshold(), 0.0);
    }
}
