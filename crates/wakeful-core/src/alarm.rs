//! Alarm definitions.
//!
//! An [`AlarmDefinition`] is owned by the persistence layer and is
//! read-only to the lifecycle: the core copies what it needs into its
//! runtime state when an alarm is armed.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Stable alarm identifier, assigned by the owning application.
/// Survives reschedules and snoozes of the same user alarm.
pub type AlarmId = u32;

/// Closed weekday enumeration with ISO numbering (Mon=1 .. Sun=7).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Weekday {
    Mon,
    Tue,
    Wed,
    Thu,
    Fri,
    Sat,
    Sun,
}

impl Weekday {
    /// ISO weekday number, Monday = 1 .. Sunday = 7.
    pub fn iso_number(self) -> u32 {
        match self {
            Weekday::Mon => 1,
            Weekday::Tue => 2,
            Weekday::Wed => 3,
            Weekday::Thu => 4,
            Weekday::Fri => 5,
            Weekday::Sat => 6,
            Weekday::Sun => 7,
        }
    }

    /// Parse an ISO weekday number (1..=7).
    pub fn from_iso_number(n: u32) -> Option<Self> {
        match n {
            1 => Some(Weekday::Mon),
            2 => Some(Weekday::Tue),
            3 => Some(Weekday::Wed),
            4 => Some(Weekday::Thu),
            5 => Some(Weekday::Fri),
            6 => Some(Weekday::Sat),
            7 => Some(Weekday::Sun),
            _ => None,
        }
    }

    pub fn is_weekend(self) -> bool {
        matches!(self, Weekday::Sat | Weekday::Sun)
    }
}

impl From<chrono::Weekday> for Weekday {
    fn from(w: chrono::Weekday) -> Self {
        // chrono's number_from_monday uses the same ISO mapping.
        Weekday::from_iso_number(w.number_from_monday()).unwrap_or(Weekday::Mon)
    }
}

impl From<Weekday> for chrono::Weekday {
    fn from(w: Weekday) -> Self {
        match w {
            Weekday::Mon => chrono::Weekday::Mon,
            Weekday::Tue => chrono::Weekday::Tue,
            Weekday::Wed => chrono::Weekday::Wed,
            Weekday::Thu => chrono::Weekday::Thu,
            Weekday::Fri => chrono::Weekday::Fri,
            Weekday::Sat => chrono::Weekday::Sat,
            Weekday::Sun => chrono::Weekday::Sun,
        }
    }
}

/// The rule governing which future calendar days an alarm may fire on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum Recurrence {
    /// Fires once at the next matching wall-clock time.
    Once,
    /// Fires every day.
    Daily,
    /// Fires on Saturdays and Sundays.
    Weekend,
    /// Fires on an explicit, non-empty set of weekdays.
    Custom { days: BTreeSet<Weekday> },
}

impl Recurrence {
    /// Whether `day` is eligible for this recurrence.
    /// `Once` and `Daily` accept any day.
    pub fn matches_day(&self, day: Weekday) -> bool {
        match self {
            Recurrence::Once | Recurrence::Daily => true,
            Recurrence::Weekend => day.is_weekend(),
            Recurrence::Custom { days } => days.contains(&day),
        }
    }

    /// Whether the alarm repeats after firing.
    pub fn repeats(&self) -> bool {
        !matches!(self, Recurrence::Once)
    }
}

/// A user-defined alarm.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlarmDefinition {
    pub id: AlarmId,
    /// Wall-clock hour, 0..=23.
    pub hour: u32,
    /// Wall-clock minute, 0..=59.
    pub minute: u32,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub message: String,
    pub recurrence: Recurrence,
    /// Ceiling on the number of snoozes per firing cycle.
    #[serde(default = "default_max_snoozes")]
    pub max_snoozes: u32,
    /// Snooze duration in minutes, must be positive.
    #[serde(default = "default_snooze_duration")]
    pub snooze_duration_min: u32,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_max_snoozes() -> u32 {
    3
}
fn default_snooze_duration() -> u32 {
    5
}
fn default_true() -> bool {
    true
}

impl AlarmDefinition {
    /// Check the definition invariants: wall-clock range, non-empty
    /// custom weekday set, positive snooze duration.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.hour > 23 || self.minute > 59 {
            return Err(ValidationError::InvalidTimeOfDay {
                hour: self.hour,
                minute: self.minute,
            });
        }
        if let Recurrence::Custom { days } = &self.recurrence {
            if days.is_empty() {
                return Err(ValidationError::EmptyWeekdaySet);
            }
        }
        if self.snooze_duration_min == 0 {
            return Err(ValidationError::InvalidSnoozeDuration(self.snooze_duration_min));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_def() -> AlarmDefinition {
        AlarmDefinition {
            id: 1,
            hour: 7,
            minute: 30,
            title: "Wake up".into(),
            message: "Time to get up".into(),
            recurrence: Recurrence::Daily,
            max_snoozes: 3,
            snooze_duration_min: 5,
            is_active: true,
        }
    }

    #[test]
    fn iso_numbering_round_trips() {
        for n in 1..=7 {
            let day = Weekday::from_iso_number(n).unwrap();
            assert_eq!(day.iso_number(), n);
        }
        assert!(Weekday::from_iso_number(0).is_none());
        assert!(Weekday::from_iso_number(8).is_none());
    }

    #[test]
    fn chrono_mapping_agrees_on_iso_numbers() {
        for n in 1..=7 {
            let day = Weekday::from_iso_number(n).unwrap();
            let c: chrono::Weekday = day.into();
            assert_eq!(c.number_from_monday(), n);
            assert_eq!(Weekday::from(c), day);
        }
    }

    #[test]
    fn weekend_membership() {
        assert!(Weekday::Sat.is_weekend());
        assert!(Weekday::Sun.is_weekend());
        assert!(!Weekday::Fri.is_weekend());
    }

    #[test]
    fn valid_definition_passes() {
        assert!(base_def().validate().is_ok());
    }

    #[test]
    fn rejects_out_of_range_time() {
        let mut def = base_def();
        def.hour = 24;
        assert!(matches!(
            def.validate(),
            Err(ValidationError::InvalidTimeOfDay { .. })
        ));
    }

    #[test]
    fn rejects_empty_custom_set() {
        let mut def = base_def();
        def.recurrence = Recurrence::Custom {
            days: BTreeSet::new(),
        };
        assert_eq!(def.validate(), Err(ValidationError::EmptyWeekdaySet));
    }

    #[test]
    fn rejects_zero_snooze_duration() {
        let mut def = base_def();
        def.snooze_duration_min = 0;
        assert_eq!(
            def.validate(),
            Err(ValidationError::InvalidSnoozeDuration(0))
        );
    }

    #[test]
    fn definition_json_round_trip() {
        let def = AlarmDefinition {
            recurrence: Recurrence::Custom {
                days: [Weekday::Mon, Weekday::Wed].into_iter().collect(),
            },
            ..base_def()
        };
        let json = serde_json::to_string(&def).unwrap();
        let back: AlarmDefinition = serde_json::from_str(&json).unwrap();
        assert_eq!(back, def);
    }

    #[test]
    fn missing_optional_fields_take_defaults() {
        let json = r#"{"id":9,"hour":6,"minute":0,"recurrence":{"mode":"daily"}}"#;
        let def: AlarmDefinition = serde_json::from_str(json).unwrap();
        assert_eq!(def.max_snoozes, 3);
        assert_eq!(def.snooze_duration_min, 5);
        assert!(def.is_active);
    }
}
