//! Culling heuristic over a sow's litter-size history.
//!
//! Two independent rules. Both may fire for the same birth; callers receive
//! every flag and decide how to surface them.

use serde::Serialize;

use crate::profile::CullingThresholds;

/// Which rule raised a culling flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CullingReason {
    /// Every one of the last `history_depth` litters was below the minimum.
    ChronicLowYield,
    /// The litter just recorded is below the minimum or above the maximum.
    OutOfRangeLitter,
}

impl CullingReason {
    pub fn title(self) -> &'static str {
        match self {
            Self::ChronicLowYield => "culling: chronic low yield",
            Self::OutOfRangeLitter => "culling: out-of-range litter size",
        }
    }

    /// Notification type string.
    pub fn notification_type(self) -> &'static str {
        match self {
            Self::ChronicLowYield => "culling.chronic_low_yield",
            Self::OutOfRangeLitter => "culling.out_of_range_litter",
        }
    }
}

/// A single raised flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CullingFlag {
    pub reason: CullingReason,
    pub message: String,
    /// Litter sizes the rule looked at, most recent first.
    pub litters: Vec<i32>,
}

/// Result of evaluating both rules for one birth.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CullingAssessment {
    pub flags: Vec<CullingFlag>,
}

impl CullingAssessment {
    pub fn is_flagged(&self) -> bool {
        !self.flags.is_empty()
    }

    pub fn has(&self, reason: CullingReason) -> bool {
        self.flags.iter().any(|f| f.reason == reason)
    }
}

/// Stateless decision function parameterised by thresholds.
#[derive(Debug, Clone, Copy)]
pub struct CullingAdvisor {
    thresholds: CullingThresholds,
}

impl CullingAdvisor {
    pub fn new(thresholds: CullingThresholds) -> Self {
        Self { thresholds }
    }

    /// Evaluate a birth.
    ///
    /// `history` holds earlier litter sizes, most recent first. Zero-sized
    /// litters are ignored and only the first `history_depth` remaining
    /// entries are considered.
    pub fn evaluate(&self, sow_tag: &str, history: &[i32], current: i32) -> CullingAssessment {
        let t = self.thresholds;
        let recent: Vec<i32> = history
            .iter()
            .copied()
            .filter(|&size| size > 0)
            .take(t.history_depth)
            .collect();

        let mut flags = Vec::new();

        if recent.len() >= t.history_depth && recent.iter().all(|&size| size < t.min_viable_litter)
        {
            flags.push(CullingFlag {
                reason: CullingReason::ChronicLowYield,
                message: format!(
                    "Sow {sow_tag}: the last {} litters ({}) were all below {}.",
                    recent.len(),
                    join_sizes(&recent),
                    t.min_viable_litter
                ),
                litters: recent.clone(),
            });
        }

        if current < t.min_viable_litter || current > t.max_sane_litter {
            flags.push(CullingFlag {
                reason: CullingReason::OutOfRangeLitter,
                message: format!(
                    "Sow {sow_tag}: litter of {current} is outside {}..={}.",
                    t.min_viable_litter, t.max_sane_litter
                ),
                litters: vec![current],
            });
        }

        CullingAssessment { flags }
    }
}

fn join_sizes(sizes: &[i32]) -> String {
    sizes
        .iter()
        .map(i32::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
