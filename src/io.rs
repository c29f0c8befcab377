//! Thin CSV/JSON ingestion and export helpers for the CLI demo (spec §1
//! places spreadsheet ingestion out of core scope; this module exists
//! purely as an external-collaborator convenience — `builder.rs` and
//! `validator.rs` never import it). Grounded in the teacher's
//! `import_people_csv`/`import_shifts_csv` style: `csv::ReaderBuilder`,
//! `anyhow::Context`/`bail` for row-level errors.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use anyhow::{bail, Context};
use chrono::{NaiveDate, NaiveTime};
use csv::{ReaderBuilder, WriterBuilder};

use crate::calendar::{TemplateCell, TemplateRow, WeeklyTemplate};
use crate::constant_schedule::{ConstantScheduleRow, Weekday7};
use crate::history::RawPriorAssignment;
use crate::model::{NightPolicy, PersonalRule, UnavailabilityEntry, UnavailabilityKind, WeekendPreference, WorkerId};
use crate::solver::AssignmentRow;
use crate::workers::RawWorker;

fn parse_opt_date(raw: &str) -> anyhow::Result<Option<NaiveDate>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    Ok(Some(NaiveDate::parse_from_str(raw, "%Y-%m-%d").with_context(|| format!("invalid date: {raw}"))?))
}

fn parse_opt_time(raw: &str) -> anyhow::Result<Option<NaiveTime>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    Ok(Some(NaiveTime::parse_from_str(raw, "%H:%M").with_context(|| format!("invalid time: {raw}"))?))
}

fn parse_night_policy(raw: &str) -> anyhow::Result<NightPolicy> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "forbidden" => Ok(NightPolicy::Forbidden),
        "only" => Ok(NightPolicy::Only),
        "other" => Ok(NightPolicy::Other),
        "allowed" | "" => Ok(NightPolicy::Allowed),
        other => bail!("unknown night_policy: {other}"),
    }
}

fn parse_weekend_preference(raw: &str) -> WeekendPreference {
    if raw.trim().eq_ignore_ascii_case("prefers_weekends") {
        WeekendPreference::PrefersWeekends
    } else {
        WeekendPreference::NoPreference
    }
}

fn parse_bool(raw: &str) -> bool {
    matches!(raw.trim().to_ascii_lowercase().as_str(), "true" | "1" | "yes")
}

/// `rule_token[:arg]` pairs, semicolon-separated.
fn parse_personal_rules(raw: &str) -> anyhow::Result<Vec<PersonalRule>> {
    raw.split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|token| {
            let (name, arg) = token.split_once(':').unwrap_or((token, ""));
            match name {
                "nights_only" => Ok(PersonalRule::NightsOnly),
                "weekend_only" => Ok(PersonalRule::WeekendOnly),
                "friday_evening_or_weekend" => Ok(PersonalRule::FridayEveningOrWeekend),
                "max_two_in_row_two_off" => Ok(PersonalRule::MaxTwoInRowWithTwoOff),
                "seven_on_seven_off" => Ok(PersonalRule::SevenOnSevenOffNights),
                "max_three_per_week_an" => Ok(PersonalRule::MaxThreePerWeekEveningOrNightOnly),
                "forbidden_weekdays" => {
                    let days: BTreeSet<u8> = arg.split(',').filter(|s| !s.is_empty()).map(|d| d.trim().parse()).collect::<Result<_, _>>()?;
                    Ok(PersonalRule::ForbiddenWeekdays(days))
                }
                other => bail!("unknown personal rule: {other}"),
            }
        })
        .collect()
}

/// Header: `worker_id,name,competency_levels,hire_date,termination_date,
/// birthdate,weekly_contract_hours,max_days_per_week,preferences,
/// pattern_length,min_consecutive,max_consecutive,min_rest_after_block,
/// night_policy,weekend_preference,do_not_schedule,personal_rules`
pub fn import_workers_csv<P: AsRef<Path>>(path: P) -> anyhow::Result<Vec<RawWorker>> {
    let mut rdr = ReaderBuilder::new().has_headers(true).from_path(path)?;
    let mut out = Vec::new();
    for rec in rdr.records() {
        let rec = rec?;
        let worker_id = rec.get(0).context("missing worker_id")?.trim().to_string();
        let name = rec.get(1).context("missing name")?.trim().to_string();
        let competency_levels = rec
            .get(2)
            .context("missing competency_levels")?
            .split(',')
            .filter(|s| !s.trim().is_empty())
            .map(|s| s.trim().parse::<u8>().with_context(|| format!("invalid competency level for {worker_id}")))
            .collect::<anyhow::Result<Vec<_>>>()?;
        let hire_date = parse_opt_date(rec.get(3).unwrap_or(""))?;
        let termination_date = parse_opt_date(rec.get(4).unwrap_or(""))?;
        let birthdate = NaiveDate::parse_from_str(rec.get(5).context("missing birthdate")?.trim(), "%Y-%m-%d")?;
        let weekly_contract_hours: f64 = rec.get(6).unwrap_or("0").trim().parse().unwrap_or(0.0);
        let max_days_per_week: u32 = rec.get(7).context("missing max_days_per_week")?.trim().parse()?;
        let preferences = rec.get(8).unwrap_or("").to_string();
        let pattern_length = rec.get(9).and_then(|s| s.trim().parse().ok());
        let min_consecutive = rec.get(10).and_then(|s| s.trim().parse().ok());
        let max_consecutive = rec.get(11).and_then(|s| s.trim().parse().ok());
        let min_rest_after_block = rec.get(12).and_then(|s| s.trim().parse().ok());
        let night_policy = parse_night_policy(rec.get(13).unwrap_or(""))?;
        let weekend_preference = parse_weekend_preference(rec.get(14).unwrap_or(""));
        let do_not_schedule = parse_bool(rec.get(15).unwrap_or(""));
        let personal_rules = parse_personal_rules(rec.get(16).unwrap_or(""))?;
        out.push(RawWorker {
            worker_id,
            name,
            competency_levels,
            hire_date,
            termination_date,
            birthdate,
            weekly_contract_hours,
            max_days_per_week,
            preferences,
            pattern_length,
            min_consecutive,
            max_consecutive,
            min_rest_after_block,
            night_policy,
            weekend_preference,
            do_not_schedule,
            personal_rules,
        });
    }
    Ok(out)
}

/// Header: `name,start,end,qualification,mon,tue,wed,thu,fri,sat,sun`
/// (cell values `yes|facultative|no`).
pub fn import_template_csv<P: AsRef<Path>>(path: P) -> anyhow::Result<WeeklyTemplate> {
    let mut rdr = ReaderBuilder::new().has_headers(true).from_path(path)?;
    let mut rows = Vec::new();
    for rec in rdr.records() {
        let rec = rec?;
        let shift_name = rec.get(0).context("missing shift name")?.trim().to_string();
        let start_time = NaiveTime::parse_from_str(rec.get(1).context("missing start")?.trim(), "%H:%M")?;
        let end_time = NaiveTime::parse_from_str(rec.get(2).context("missing end")?.trim(), "%H:%M")?;
        let qualification: BTreeSet<u8> =
            rec.get(3).unwrap_or("").split(',').filter(|s| !s.trim().is_empty()).map(|s| s.trim().parse()).collect::<Result<_, _>>()?;
        let mut cells = [TemplateCell::No; 7];
        for (i, cell) in cells.iter_mut().enumerate() {
            let raw = rec.get(4 + i).unwrap_or("no").trim().to_ascii_lowercase();
            *cell = match raw.as_str() {
                "yes" => TemplateCell::Yes,
                "facultative" => TemplateCell::Facultative,
                _ => TemplateCell::No,
            };
        }
        rows.push(TemplateRow { shift_name, start_time, end_time, qualification, cells });
    }
    Ok(WeeklyTemplate { rows })
}

/// Header: `worker_id,date,shift_name,start_time,end_time`
pub fn import_prior_assignments_csv<P: AsRef<Path>>(path: P) -> anyhow::Result<Vec<RawPriorAssignment>> {
    let mut rdr = ReaderBuilder::new().has_headers(true).from_path(path)?;
    let mut out = Vec::new();
    for rec in rdr.records() {
        let rec = rec?;
        let worker_id = rec.get(0).context("missing worker_id")?.trim().to_string();
        let date = NaiveDate::parse_from_str(rec.get(1).context("missing date")?.trim(), "%Y-%m-%d")?;
        let shift_name = rec.get(2).map(str::trim).filter(|s| !s.is_empty()).map(str::to_string);
        let start_time = parse_opt_time(rec.get(3).unwrap_or(""))?;
        let end_time = parse_opt_time(rec.get(4).unwrap_or(""))?;
        out.push(RawPriorAssignment { worker_id, date, shift_name, start_time, end_time });
    }
    Ok(out)
}

/// Header: `worker_id,date,kind,from_time,to_time` (`kind` ∈
/// `available|unavailable`).
pub fn import_unavailability_csv<P: AsRef<Path>>(path: P) -> anyhow::Result<Vec<UnavailabilityEntry>> {
    let mut rdr = ReaderBuilder::new().has_headers(true).from_path(path)?;
    let mut out = Vec::new();
    for rec in rdr.records() {
        let rec = rec?;
        let worker_id = WorkerId::new(rec.get(0).context("missing worker_id")?.trim());
        let date = NaiveDate::parse_from_str(rec.get(1).context("missing date")?.trim(), "%Y-%m-%d")?;
        let kind = match rec.get(2).unwrap_or("unavailable").trim() {
            "available" => UnavailabilityKind::Available,
            _ => UnavailabilityKind::Unavailable,
        };
        let from_time = parse_opt_time(rec.get(3).unwrap_or(""))?;
        let to_time = parse_opt_time(rec.get(4).unwrap_or(""))?;
        out.push(UnavailabilityEntry { worker_id, date, kind, from_time, to_time });
    }
    Ok(out)
}

/// Header: `worker_id,week_index,weekday,shift_name` (`weekday` ∈
/// `mon|tue|wed|thu|fri|sat|sun`).
pub fn import_constant_schedule_csv<P: AsRef<Path>>(path: P) -> anyhow::Result<Vec<ConstantScheduleRow>> {
    let mut rdr = ReaderBuilder::new().has_headers(true).from_path(path)?;
    let mut out = Vec::new();
    for rec in rdr.records() {
        let rec = rec?;
        let worker_id = rec.get(0).context("missing worker_id")?.trim().to_string();
        let week_index: u32 = rec.get(1).context("missing week_index")?.trim().parse()?;
        let weekday = match rec.get(2).unwrap_or("").trim().to_ascii_lowercase().as_str() {
            "mon" => Weekday7::Monday,
            "tue" => Weekday7::Tuesday,
            "wed" => Weekday7::Wednesday,
            "thu" => Weekday7::Thursday,
            "fri" => Weekday7::Friday,
            "sat" => Weekday7::Saturday,
            "sun" => Weekday7::Sunday,
            other => bail!("unknown weekday: {other}"),
        };
        let shift_name = rec.get(3).context("missing shift_name")?.trim().to_string();
        out.push(ConstantScheduleRow { worker_id, week_index, weekday, shift_name });
    }
    Ok(out)
}

/// Export CSV: `shift_id,name,date,worker_id,shift_filled`.
pub fn export_assignments_csv<P: AsRef<Path>>(path: P, assignments: &[AssignmentRow], calendar: &crate::calendar::CalendarIndex) -> anyhow::Result<()> {
    let mut w = WriterBuilder::new().has_headers(true).from_path(path)?;
    w.write_record(["shift_id", "name", "date", "worker_id", "shift_filled"])?;
    for row in assignments {
        let shift = calendar.shift(row.shift_id);
        w.write_record([
            row.shift_id.0.to_string(),
            shift.name.clone(),
            shift.date.to_string(),
            row.worker_id.as_ref().map(|w| w.as_str().to_string()).unwrap_or_default(),
            row.shift_filled.to_string(),
        ])?;
    }
    w.flush()?;
    Ok(())
}

/// Export JSON of the solve report plus violation list.
pub fn export_report_json<P: AsRef<Path>>(path: P, report: &crate::solver::SolveReport, violations: &[String]) -> anyhow::Result<()> {
    let payload = serde_json::json!({
        "status": format!("{:?}", report.status),
        "objective_value": report.objective_value,
        "iterations": report.iterations,
        "elapsed_ms": report.elapsed.as_millis(),
        "violations": violations,
    });
    fs::write(path, serde_json::to_string_pretty(&payload)?)?;
    Ok(())
}
