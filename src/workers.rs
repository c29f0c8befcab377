//! Worker Normaliser (spec §4.3): derives per-worker contract minutes, age,
//! qualification set, preference fields and night policy, applying the
//! exclusion rules of §3 before the pool is handed to later stages.

use std::collections::BTreeSet;

use chrono::NaiveDate;

use crate::error::{Result, RosterError};
use crate::model::{DayPreference, NightPolicy, PersonalRule, WeekendPreference, Worker, WorkerId};

/// Raw, pre-normalisation worker row, per §6 external input columns.
#[derive(Debug, Clone)]
pub struct RawWorker {
    pub worker_id: String,
    pub name: String,
    pub competency_levels: Vec<u8>,
    pub hire_date: Option<NaiveDate>,
    pub termination_date: Option<NaiveDate>,
    pub birthdate: NaiveDate,
    pub weekly_contract_hours: f64,
    pub max_days_per_week: u32,
    /// Comma-separated `day/evening/night` preference tokens.
    pub preferences: String,
    pub pattern_length: Option<u32>,
    pub min_consecutive: Option<u32>,
    pub max_consecutive: Option<u32>,
    pub min_rest_after_block: Option<u32>,
    pub night_policy: NightPolicy,
    pub weekend_preference: WeekendPreference,
    pub do_not_schedule: bool,
    pub personal_rules: Vec<PersonalRule>,
}

const FAR_FUTURE: i32 = 9999;

fn far_future_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(FAR_FUTURE, 12, 31).unwrap()
}

fn far_past_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(1, 1, 1).unwrap()
}

fn age_on(birthdate: NaiveDate, reference: NaiveDate) -> u32 {
    let mut age = reference.year() - birthdate.year();
    let had_birthday_this_year = (reference.month(), reference.day()) >= (birthdate.month(), birthdate.day());
    if !had_birthday_this_year {
        age -= 1;
    }
    age.max(0) as u32
}

use chrono::Datelike;

/// Normalises the raw worker pool, excluding workers outside the horizon's
/// employment window, flagged `do_not_schedule`, or carrying an excluded
/// qualification code (per §3: codes 5/6 exclude the worker entirely).
pub fn normalise(
    raw: &[RawWorker],
    horizon_start: NaiveDate,
    horizon_end: NaiveDate,
    reference_date: NaiveDate,
) -> Result<Vec<Worker>> {
    let mut out = Vec::new();
    for r in raw {
        // "wensen = niet plannen" early exclusion, before any other filter.
        if r.do_not_schedule {
            continue;
        }

        let hire_date = r.hire_date.unwrap_or_else(far_past_date);
        let termination_date = r.termination_date.unwrap_or_else(far_future_date);
        if termination_date < horizon_start || hire_date > horizon_end {
            continue;
        }

        let mut qualification: BTreeSet<u8> = r.competency_levels.iter().copied().collect();
        if qualification.is_empty() {
            return Err(RosterError::MissingField {
                entity: "worker",
                field: "competency_levels",
            });
        }
        if qualification.contains(&5) || qualification.contains(&6) {
            continue;
        }
        if qualification.contains(&7) {
            qualification.insert(3);
        }

        let max_days_per_week = r.max_days_per_week;
        let contract_minutes = if r.weekly_contract_hours <= 0.0 {
            max_days_per_week * 9 * 60
        } else {
            (r.weekly_contract_hours * 60.0).round() as u32
        };

        let age = age_on(r.birthdate, reference_date);
        let day_preference = parse_day_preference(&r.preferences);

        out.push(Worker {
            id: WorkerId::new(&r.worker_id),
            name: r.name.clone(),
            hire_date,
            termination_date,
            birthdate: r.birthdate,
            contract_minutes,
            max_days_per_week,
            age,
            qualification,
            night_policy: r.night_policy,
            weekend_preference: r.weekend_preference,
            pattern_length: r.pattern_length,
            day_preference,
            min_consecutive: r.min_consecutive,
            max_consecutive: r.max_consecutive,
            min_rest_after_block: r.min_rest_after_block,
            do_not_schedule: false,
            personal_rules: r.personal_rules.clone(),
        });
    }
    Ok(out)
}

fn parse_day_preference(raw: &str) -> DayPreference {
    let mut out = DayPreference::default();
    for token in raw.split(',') {
        match token.trim().to_ascii_lowercase().as_str() {
            "day" => out.day = true,
            "evening" => out.evening = true,
            "night" => out.night = true,
            _ => {}
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_raw(id: &str) -> RawWorker {
        RawWorker {
            worker_id: id.into(),
            name: id.into(),
            competency_levels: vec![3],
            hire_date: None,
            termination_date: None,
            birthdate: NaiveDate::from_ymd_opt(1990, 1, 1).unwrap(),
            weekly_contract_hours: 36.0,
            max_days_per_week: 5,
            preferences: "day,evening".into(),
            pattern_length: None,
            min_consecutive: None,
            max_consecutive: None,
            min_rest_after_block: None,
            night_policy: NightPolicy::Allowed,
            weekend_preference: WeekendPreference::NoPreference,
            do_not_schedule: false,
            personal_rules: Vec::new(),
        }
    }

    #[test]
    fn excludes_qualification_5_and_6() {
        let start = NaiveDate::from_ymd_opt(2025, 1, 6).unwrap();
        let end = NaiveDate::from_ymd_opt(2025, 1, 12).unwrap();
        let mut raw = base_raw("w1");
        raw.competency_levels = vec![5];
        let workers = normalise(&[raw], start, end, start).unwrap();
        assert!(workers.is_empty());
    }

    #[test]
    fn augments_7_with_3() {
        let start = NaiveDate::from_ymd_opt(2025, 1, 6).unwrap();
        let end = NaiveDate::from_ymd_opt(2025, 1, 12).unwrap();
        let mut raw = base_raw("w1");
        raw.competency_levels = vec![7];
        let workers = normalise(&[raw], start, end, start).unwrap();
        assert!(workers[0].qualification.contains(&3));
        assert!(workers[0].qualification.contains(&7));
    }

    #[test]
    fn imputes_contract_minutes_when_zero() {
        let start = NaiveDate::from_ymd_opt(2025, 1, 6).unwrap();
        let end = NaiveDate::from_ymd_opt(2025, 1, 12).unwrap();
        let mut raw = base_raw("w1");
        raw.weekly_contract_hours = 0.0;
        raw.max_days_per_week = 4;
        let workers = normalise(&[raw], start, end, start).unwrap();
        assert_eq!(workers[0].contract_minutes, 4 * 9 * 60);
    }

    #[test]
    fn excludes_terminated_before_horizon() {
        let start = NaiveDate::from_ymd_opt(2025, 1, 6).unwrap();
        let end = NaiveDate::from_ymd_opt(2025, 1, 12).unwrap();
        let mut raw = base_raw("w1");
        raw.termination_date = Some(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
        let workers = normalise(&[raw], start, end, start).unwrap();
        assert!(workers.is_empty());
    }

    #[test]
    fn do_not_schedule_flag_excludes_before_other_filters() {
        let start = NaiveDate::from_ymd_opt(2025, 1, 6).unwrap();
        let end = NaiveDate::from_ymd_opt(2025, 1, 12).unwrap();
        let mut raw = base_raw("w1");
        raw.do_not_schedule = true;
        raw.competency_levels = vec![3]; // would otherwise pass
        let workers = normalise(&[raw], start, end, start).unwrap();
        assert!(workers.is_empty());
    }
}
