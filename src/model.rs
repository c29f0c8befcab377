use std::collections::BTreeSet;

use chrono::{NaiveDate, NaiveTime};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Dense shift identifier, re-assigned `0..M` after the constant catalogue
/// is extracted (see `calendar::CalendarIndex`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ShiftId(pub u32);

impl ShiftId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Strong identifier for a worker (`medewerker_id` in the source tables).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct WorkerId(String);

impl WorkerId {
    pub fn new<S: AsRef<str>>(s: S) -> Self {
        Self(s.as_ref().to_owned())
    }
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for WorkerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Mandatory vs. facultative shift, per the weekly template cell value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ShiftRequirement {
    Mandatory,
    Facultative,
}

impl ShiftRequirement {
    pub fn weight(self) -> f64 {
        match self {
            ShiftRequirement::Mandatory => 1.0,
            ShiftRequirement::Facultative => 0.5,
        }
    }
}

/// A concrete, dated occurrence of a recurring weekly template row.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ShiftInstance {
    pub id: ShiftId,
    pub name: String,
    pub date: NaiveDate,
    /// 1-based index within the horizon.
    pub week: u32,
    /// Stable across runs: weeks since the fixed Monday epoch.
    pub global_week: i64,
    /// 0 = Monday .. 6 = Sunday.
    pub day_of_week: u8,
    /// 0-based day within the horizon: `7*(week-1) + day_of_week`.
    pub absolute_day: u32,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub duration_min: u32,
    pub qualification: BTreeSet<u8>,
    pub is_night: bool,
    pub requirement: ShiftRequirement,
}

impl ShiftInstance {
    /// Lowest (highest-competency) code in `qualification`, the shift's
    /// effective requirement per the qualification rule.
    pub fn required_level(&self) -> Option<u8> {
        self.qualification.iter().min().copied()
    }

    /// First of D/A/N appearing in `name`, else `Other`.
    pub fn type_letter(&self) -> ShiftType {
        for ch in self.name.chars() {
            match ch {
                'D' => return ShiftType::Day,
                'A' => return ShiftType::Evening,
                'N' => return ShiftType::Night,
                _ => {}
            }
        }
        ShiftType::Other
    }

    pub fn is_weekend(&self) -> bool {
        self.day_of_week == 5 || self.day_of_week == 6
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ShiftType {
    Day,
    Evening,
    Night,
    Other,
}

/// A row of the constant-shift catalogue ("KOK", "FM" — never a decision
/// variable, extracted before shift-id densification).
#[derive(Debug, Clone)]
pub struct ConstantShiftTemplate {
    pub name: String,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub duration_min: u32,
}

/// Per-worker switch governing night-shift eligibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum NightPolicy {
    Forbidden,
    Only,
    Other,
    Allowed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum WeekendPreference {
    PrefersWeekends,
    NoPreference,
}

/// Parsed `day/evening/night` preference string.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DayPreference {
    pub day: bool,
    pub evening: bool,
    pub night: bool,
}

/// Parametric personal rule, dispatched on by the Model Builder — data,
/// never an opaque worker-id literal (see DESIGN.md, C7.1/C10).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum PersonalRule {
    NightsOnly,
    WeekendOnly,
    FridayEveningOrWeekend,
    ForbiddenWeekdays(BTreeSet<u8>),
    MaxTwoInRowWithTwoOff,
    SevenOnSevenOffNights,
    MaxThreePerWeekEveningOrNightOnly,
}

#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Worker {
    pub id: WorkerId,
    pub name: String,
    pub hire_date: NaiveDate,
    pub termination_date: NaiveDate,
    pub birthdate: NaiveDate,
    /// Effective weekly cap after constant-schedule deduction; imputed
    /// from `max_days_per_week * 9 * 60` when the raw contract is zero.
    pub contract_minutes: u32,
    pub max_days_per_week: u32,
    pub age: u32,
    pub qualification: BTreeSet<u8>,
    pub night_policy: NightPolicy,
    pub weekend_preference: WeekendPreference,
    pub pattern_length: Option<u32>,
    pub day_preference: DayPreference,
    pub min_consecutive: Option<u32>,
    pub max_consecutive: Option<u32>,
    pub min_rest_after_block: Option<u32>,
    pub do_not_schedule: bool,
    pub personal_rules: Vec<PersonalRule>,
}

impl Worker {
    pub fn qualification_level(&self) -> Option<u8> {
        self.qualification.iter().min().copied()
    }

    pub fn qualification_max(&self) -> Option<u8> {
        self.qualification.iter().max().copied()
    }

    pub fn has_personal_rule(&self, rule: &PersonalRule) -> bool {
        self.personal_rules.contains(rule)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum UnavailabilityKind {
    Available,
    Unavailable,
    ConstantSchedule,
}

#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct UnavailabilityEntry {
    pub worker_id: WorkerId,
    pub date: NaiveDate,
    pub kind: UnavailabilityKind,
    pub from_time: Option<NaiveTime>,
    pub to_time: Option<NaiveTime>,
}

/// Canonicalised form of a previously worked shift. Read-only; used for
/// continuity lookups only — prior assignments never enter the decision
/// space of the current horizon.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PriorAssignment {
    /// `None` for fabricated blank-history rows (worker_id = bottom).
    pub worker_id: Option<WorkerId>,
    pub date: NaiveDate,
    pub shift_id: Option<ShiftId>,
    pub is_night: bool,
    /// May be zero or negative for dates preceding the current horizon.
    pub week: i64,
    pub global_week: i64,
}
