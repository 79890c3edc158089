//! Breeding rule profile: the data-driven table behind every offset and
//! threshold the engine uses.
//!
//! A profile is keyed by species. [`BreedingProfile::swine`] is the built-in
//! default; other profiles can be loaded from JSON and must pass
//! [`BreedingProfile::validate`] before use.

use serde::{Deserialize, Serialize};

use crate::alert::AlertSeverity;
use crate::error::CoreError;

/// Placeholder replaced with the sow's tag in milestone messages.
pub const SOW_PLACEHOLDER: &str = "{sow}";

/// One alert-producing milestone, offset from a reference date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MilestoneRule {
    /// Stable machine name, e.g. `"nesting_box"`. Stored as the alert name.
    pub key: String,
    /// Human label.
    pub label: String,
    /// Days after the reference date (mating or birth).
    pub offset_days: i64,
    pub severity: AlertSeverity,
    /// Message template; `{sow}` is replaced with the sow's tag.
    pub message: String,
}

impl MilestoneRule {
    pub fn render_message(&self, sow_tag: &str) -> String {
        self.message.replace(SOW_PLACEHOLDER, sow_tag)
    }
}

/// Inclusive range of day offsets, one alert per day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayWindow {
    pub first: i64,
    pub last: i64,
}

impl DayWindow {
    pub fn days(self) -> impl Iterator<Item = i64> {
        self.first..=self.last
    }

    pub fn len(self) -> usize {
        if self.last < self.first {
            0
        } else {
            (self.last - self.first + 1) as usize
        }
    }

    pub fn is_empty(self) -> bool {
        self.len() == 0
    }
}

/// Litter-size thresholds used by the culling heuristic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CullingThresholds {
    /// Litters below this size count as low yield.
    pub min_viable_litter: i32,
    /// Litters above this size are treated as implausible.
    pub max_sane_litter: i32,
    /// How many past litters the chronic-low-yield rule inspects.
    pub history_depth: usize,
}

/// Everything species-specific about a breeding cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreedingProfile {
    pub species: String,
    /// Mating to expected birth.
    pub gestation_days: i64,
    /// Mating to the pregnancy-confirmation marker stored on the record.
    pub pregnancy_check_days: i64,
    /// Severity and message of the immediate "breeding recorded" alert.
    pub mating_confirmation: MilestoneRule,
    /// Alerts offset from the mating date (besides the birth-check window).
    pub pre_birth_milestones: Vec<MilestoneRule>,
    /// Days after mating on which a daily birth check is raised.
    pub birth_check_window: DayWindow,
    pub birth_check_severity: AlertSeverity,
    /// Alerts offset from the actual birth date.
    pub post_birth_milestones: Vec<MilestoneRule>,
    /// Birth to weaning.
    pub weaning_days: i64,
    /// Rest after weaning before the sow may be mated again.
    pub rest_days: i64,
    /// Alert raised on the weaning date once piglets are registered.
    pub relocation: MilestoneRule,
    pub culling: CullingThresholds,
    /// How many piglet rows a litter may carry beyond its recorded size.
    pub litter_tolerance: i64,
    /// Upper bound accepted for a recorded litter size.
    pub max_recordable_litter: i32,
}

impl BreedingProfile {
    /// The built-in profile for pigs.
    pub fn swine() -> Self {
        Self {
            species: "swine".to_string(),
            gestation_days: 114,
            pregnancy_check_days: 21,
            mating_confirmation: MilestoneRule {
                key: "breeding_recorded".to_string(),
                label: "Breeding recorded".to_string(),
                offset_days: 0,
                severity: AlertSeverity::Medium,
                message: "Sow {sow} was mated. Confirm pregnancy in 21 days.".to_string(),
            },
            pre_birth_milestones: vec![MilestoneRule {
                key: "nesting_box".to_string(),
                label: "Prepare nesting box".to_string(),
                offset_days: 110,
                severity: AlertSeverity::Medium,
                message: "Prepare the nesting box for sow {sow}.".to_string(),
            }],
            birth_check_window: DayWindow {
                first: 110,
                last: 114,
            },
            birth_check_severity: AlertSeverity::High,
            post_birth_milestones: vec![
                MilestoneRule {
                    key: "fostering_check".to_string(),
                    label: "Fostering check".to_string(),
                    offset_days: 4,
                    severity: AlertSeverity::Medium,
                    message: "Check whether piglets of sow {sow} need fostering.".to_string(),
                },
                MilestoneRule {
                    key: "nesting_box_removal".to_string(),
                    label: "Remove nesting box".to_string(),
                    offset_days: 20,
                    severity: AlertSeverity::Low,
                    message: "Remove the nesting box from sow {sow}'s pen.".to_string(),
                },
                MilestoneRule {
                    key: "weaning".to_string(),
                    label: "Weaning".to_string(),
                    offset_days: 42,
                    severity: AlertSeverity::High,
                    message: "Wean the litter of sow {sow}.".to_string(),
                },
            ],
            weaning_days: 42,
            rest_days: 7,
            relocation: MilestoneRule {
                key: "relocate_piglets".to_string(),
                label: "Relocate piglets".to_string(),
                offset_days: 42,
                severity: AlertSeverity::Medium,
                message: "Move the weaned piglets of sow {sow} to a nursery pen.".to_string(),
            },
            culling: CullingThresholds {
                min_viable_litter: 5,
                max_sane_litter: 10,
                history_depth: 3,
            },
            litter_tolerance: 1,
            max_recordable_litter: 30,
        }
    }

    /// Parse a profile from JSON and validate it.
    pub fn from_json(raw: &str) -> Result<Self, CoreError> {
        let profile: Self = serde_json::from_str(raw)
            .map_err(|e| CoreError::Validation(format!("Invalid breeding profile: {e}")))?;
        profile.validate()?;
        Ok(profile)
    }

    /// Days after birth before the sow may be mated again.
    pub fn remating_interval_days(&self) -> i64 {
        self.weaning_days + self.rest_days
    }

    /// Number of alerts one mating produces.
    pub fn mating_alert_count(&self) -> usize {
        1 + self.pre_birth_milestones.len() + self.birth_check_window.len()
    }

    /// Check internal consistency of the rule table.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.species.trim().is_empty() {
            return Err(CoreError::Validation("Profile species must not be empty".into()));
        }
        if self.gestation_days <= 0 {
            return Err(CoreError::Validation(format!(
                "gestation_days must be positive, got {}",
                self.gestation_days
            )));
        }
        if !(0..self.gestation_days).contains(&self.pregnancy_check_days) {
            return Err(CoreError::Validation(format!(
                "pregnancy_check_days must fall inside gestation, got {}",
                self.pregnancy_check_days
            )));
        }
        let window = self.birth_check_window;
        if window.is_empty() || window.first < 0 {
            return Err(CoreError::Validation(format!(
                "birth_check_window {}..={} is empty or negative",
                window.first, window.last
            )));
        }
        if self.weaning_days <= 0 || self.rest_days < 0 {
            return Err(CoreError::Validation(
                "weaning_days must be positive and rest_days non-negative".into(),
            ));
        }
        let culling = self.culling;
        if culling.min_viable_litter < 0 || culling.min_viable_litter > culling.max_sane_litter {
            return Err(CoreError::Validation(format!(
                "culling thresholds inverted: min {} > max {}",
                culling.min_viable_litter, culling.max_sane_litter
            )));
        }
        if culling.history_depth == 0 {
            return Err(CoreError::Validation("culling history_depth must be at least 1".into()));
        }
        if self.litter_tolerance < 0 || self.max_recordable_litter <= 0 {
            return Err(CoreError::Validation(
                "litter_tolerance must be non-negative and max_recordable_litter positive".into(),
            ));
        }

        let mut keys: Vec<&str> = Vec::new();
        let all_rules = std::iter::once(&self.mating_confirmation)
            .chain(&self.pre_birth_milestones)
            .chain(&self.post_birth_milestones)
            .chain(std::iter::once(&self.relocation));
        for rule in all_rules {
            if rule.key.trim().is_empty() {
                return Err(CoreError::Validation("Milestone key must not be empty".into()));
            }
            if rule.offset_days < 0 {
                return Err(CoreError::Validation(format!(
                    "Milestone '{}' has a negative offset",
                    rule.key
                )));
            }
            if keys.contains(&rule.key.as_str()) {
                return Err(CoreError::Validation(format!(
                    "Duplicate milestone key '{}'",
                    rule.key
                )));
            }
            keys.push(&rule.key);
        }
        Ok(())
    }
}

impl Default for BreedingProfile {
    fn default() -> Self {
        Self::swine()
    }
}
