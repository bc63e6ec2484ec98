//! Fix quality heuristic.
//!
//! Decides whether a new fix should replace the current best one. Recency
//! wins outside a fixed time window; inside it, accuracy decides, with
//! same-provider continuity as the tie-breaker.

use std::time::Duration;

use chrono::TimeDelta;
use serde::{Deserialize, Serialize};

use super::types::LocationFix;

/// Default window within which fixes are compared on accuracy.
pub const DEFAULT_SIGNIFICANT_AGE: Duration = Duration::from_secs(60);

/// Default accuracy loss (meters) tolerated for a newer same-provider fix.
pub const DEFAULT_SIGNIFICANT_ACCURACY_DELTA: f64 = 200.0;

/// Thresholds for [`QualityPolicy::is_better`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QualityPolicy {
    /// Age difference beyond which the newer fix always wins
    #[serde(rename = "significant_age_ms", with = "super::duration_millis")]
    pub significant_age: Duration,

    /// Accuracy loss (meters) beyond which a newer fix is rejected
    pub significant_accuracy_delta: f64,
}

impl Default for QualityPolicy {
    fn default() -> Self {
        Self {
            significant_age: DEFAULT_SIGNIFICANT_AGE,
            significant_accuracy_delta: DEFAULT_SIGNIFICANT_ACCURACY_DELTA,
        }
    }
}

impl QualityPolicy {
    /// Determines whether `candidate` should replace `current_best`.
    ///
    /// Decision order:
    ///
    /// 1. No current best: accept.
    /// 2. No candidate: reject.
    /// 3. Candidate significantly newer: accept. Significantly older: reject.
    /// 4. Candidate more accurate: accept.
    /// 5. Candidate newer and not less accurate: accept.
    /// 6. Candidate newer, not significantly less accurate and from the same
    ///    provider: accept.
    /// 7. Otherwise reject.
    ///
    /// Accuracy deltas are truncated to whole meters before comparison.
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono::{Duration, Utc};
    /// use waypoint_core::location::{LocationFix, QualityPolicy};
    ///
    /// let policy = QualityPolicy::default();
    /// let now = Utc::now();
    /// let current = LocationFix::new(37.7749, -122.4194, 50.0, now);
    /// let sharper = LocationFix::new(37.7750, -122.4195, 10.0, now - Duration::seconds(5));
    ///
    /// assert!(policy.is_better(Some(&sharper), Some(&current)));
    /// assert!(policy.is_better(None, None));
    /// ```
    #[must_use]
    pub fn is_better(
        &self,
        candidate: Option<&LocationFix>,
        current_best: Option<&LocationFix>,
    ) -> bool {
        let Some(current) = current_best else {
            return true;
        };
        let Some(candidate) = candidate else {
            return false;
        };

        let age_delta = candidate.timestamp - current.timestamp;
        let threshold = TimeDelta::from_std(self.significant_age).unwrap_or(TimeDelta::MAX);

        if age_delta > threshold {
            return true;
        }
        if age_delta < -threshold {
            return false;
        }
        let is_newer = age_delta > TimeDelta::zero();

        let accuracy_delta = (candidate.accuracy - current.accuracy).trunc();
        let is_more_accurate = accuracy_delta < 0.0;
        let is_less_accurate = accuracy_delta > 0.0;
        let is_significantly_less_accurate = accuracy_delta > self.significant_accuracy_delta;

        if is_more_accurate {
            return true;
        }
        if is_newer && !is_less_accurate {
            return true;
        }
        is_newer && !is_significantly_less_accurate && candidate.same_provider(current)
    }

    /// Returns whichever of `candidate` and `incumbent` is better.
    ///
    /// The candidate wins whenever [`is_better`](Self::is_better) accepts it,
    /// which includes the case where the incumbent is absent.
    #[must_use]
    pub fn pick<'a>(
        &self,
        candidate: Option<&'a LocationFix>,
        incumbent: Option<&'a LocationFix>,
    ) -> Option<&'a LocationFix> {
        if self.is_better(candidate, incumbent) {
            candidate
        } else {
            incumbent
        }
    }
}

/// [`QualityPolicy::is_better`] with the default thresholds.
#[must_use]
pub fn is_better_location(
    candidate: Option<&LocationFix>,
    current_best: Option<&LocationFix>,
) -> bool {
    QualityPolicy::default().is_better(candidate, current_best)
}
