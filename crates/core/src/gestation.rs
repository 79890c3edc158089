//! Gestation milestones computed from a mating date.
//!
//! Pure calendar-day arithmetic in UTC over the offsets of a
//! [`BreedingProfile`].

use serde::Serialize;

use crate::alert::AlertSeverity;
use crate::calendar::{parse_calendar_date, shift_days, Clock};
use crate::error::CoreError;
use crate::profile::{BreedingProfile, MilestoneRule, SOW_PLACEHOLDER};
use crate::types::CalendarDate;

/// Key of the pregnancy-confirmation marker. Stored on the record, never an alert.
pub const PREGNANCY_CHECK_KEY: &str = "pregnancy_check";

/// Prefix of the per-day birth-check alert keys (`birth_check_day_110`, ...).
pub const BIRTH_CHECK_KEY_PREFIX: &str = "birth_check_day_";

/// Whether a milestone materialises as an alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MilestoneKind {
    /// Recorded on the breeding record only.
    Marker,
    /// Persisted as a scheduled alert.
    Alert,
}

/// One entry of the gestation milestone table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Milestone {
    pub key: String,
    pub label: String,
    pub offset_days: i64,
    pub severity: AlertSeverity,
    pub kind: MilestoneKind,
    /// Message template; `{sow}` is replaced with the sow's tag.
    pub message: String,
}

/// A milestone pinned to a concrete calendar day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScheduledMilestone {
    pub milestone: Milestone,
    pub due_on: CalendarDate,
}

impl Milestone {
    pub fn render_message(&self, sow_tag: &str) -> String {
        self.message.replace(SOW_PLACEHOLDER, sow_tag)
    }
}

impl From<&MilestoneRule> for Milestone {
    fn from(rule: &MilestoneRule) -> Self {
        Self {
            key: rule.key.clone(),
            label: rule.label.clone(),
            offset_days: rule.offset_days,
            severity: rule.severity,
            kind: MilestoneKind::Alert,
            message: rule.message.clone(),
        }
    }
}

/// Stateless date calculator bound to a breeding profile.
#[derive(Debug, Clone, Copy)]
pub struct GestationCalculator<'a> {
    profile: &'a BreedingProfile,
}

impl<'a> GestationCalculator<'a> {
    pub fn new(profile: &'a BreedingProfile) -> Self {
        Self { profile }
    }

    /// Mating date plus the profile's gestation length.
    pub fn expected_birth_date(&self, mating: CalendarDate) -> Result<CalendarDate, CoreError> {
        shift_days(mating, self.profile.gestation_days)
    }

    /// Like [`expected_birth_date`](Self::expected_birth_date) but for raw
    /// caller input. Fails with [`CoreError::InvalidDate`] for unparseable input.
    pub fn expected_birth_date_from_str(&self, mating: &str) -> Result<CalendarDate, CoreError> {
        let mating = parse_calendar_date("mating_date", mating)?;
        self.expected_birth_date(mating)
    }

    /// Day on which pregnancy should be confirmed.
    pub fn pregnancy_check_date(&self, mating: CalendarDate) -> Result<CalendarDate, CoreError> {
        shift_days(mating, self.profile.pregnancy_check_days)
    }

    /// Birth date plus the weaning period.
    pub fn weaning_date(&self, birth: CalendarDate) -> Result<CalendarDate, CoreError> {
        shift_days(birth, self.profile.weaning_days)
    }

    /// First day a sow that gave birth on `last_birth` may be mated again.
    pub fn earliest_remating_date(
        &self,
        last_birth: CalendarDate,
    ) -> Result<CalendarDate, CoreError> {
        shift_days(last_birth, self.profile.remating_interval_days())
    }

    /// The fixed gestation milestone table, ordered by offset.
    ///
    /// Contains the pregnancy-confirmation marker, every pre-birth milestone
    /// and one birth-check alert per day of the birth-check window.
    pub fn milestone_offsets(&self) -> Vec<Milestone> {
        let profile = self.profile;
        let mut milestones = Vec::with_capacity(profile.mating_alert_count() + 1);

        milestones.push(Milestone {
            key: PREGNANCY_CHECK_KEY.to_string(),
            label: "Pregnancy confirmation".to_string(),
            offset_days: profile.pregnancy_check_days,
            severity: AlertSeverity::Medium,
            kind: MilestoneKind::Marker,
            message: "Confirm pregnancy of sow {sow}.".to_string(),
        });
        milestones.extend(profile.pre_birth_milestones.iter().map(Milestone::from));
        milestones.extend(profile.birth_check_window.days().map(|day| Milestone {
            key: format!("{BIRTH_CHECK_KEY_PREFIX}{day}"),
            label: format!("Birth check (day {day})"),
            offset_days: day,
            severity: profile.birth_check_severity,
            kind: MilestoneKind::Alert,
            message: format!("Check sow {{sow}} for signs of farrowing (day {day})."),
        }));

        // Stable sort keeps nesting-box ahead of the same-day birth check.
        milestones.sort_by_key(|m| m.offset_days);
        milestones
    }

    /// Alert-producing gestation milestones pinned to dates after `mating`.
    pub fn mating_schedule(
        &self,
        mating: CalendarDate,
    ) -> Result<Vec<ScheduledMilestone>, CoreError> {
        self.milestone_offsets()
            .into_iter()
            .filter(|m| m.kind == MilestoneKind::Alert)
            .map(|milestone| {
                let due_on = shift_days(mating, milestone.offset_days)?;
                Ok(ScheduledMilestone { milestone, due_on })
            })
            .collect()
    }

    /// Post-birth milestones pinned to dates after `birth`.
    pub fn post_birth_schedule(
        &self,
        birth: CalendarDate,
    ) -> Result<Vec<ScheduledMilestone>, CoreError> {
        self.profile
            .post_birth_milestones
            .iter()
            .map(|rule| {
                Ok(ScheduledMilestone {
                    milestone: Milestone::from(rule),
                    due_on: shift_days(birth, rule.offset_days)?,
                })
            })
            .collect()
    }

    /// True when today is past the expected birth date plus `grace_days`.
    ///
    /// Used for reporting only; never blocks a write.
    pub fn is_overdue(
        &self,
        mating: CalendarDate,
        grace_days: i64,
        clock: &dyn Clock,
    ) -> Result<bool, CoreError> {
        let deadline = shift_days(self.expected_birth_date(mating)?, grace_days)?;
        Ok(clock.today() > deadline)
    }
}
