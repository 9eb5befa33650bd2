use chrono::NaiveDate;
use regex::Regex;
use std::sync::OnceLock;

use super::{mismatch, ValueError, ValueHandler, ValueNode, ValueResult};
use crate::core::vocabulary::xsd;
use crate::core::Vocabulary;
use crate::model::{DataValue, TimeValue};
use crate::sink::RdfObject;

pub const PRECISION_MONTH: u8 = 10;
pub const PRECISION_DAY: u8 = 11;

fn time_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^([+-]?)(\d+)-(\d{2})-(\d{2})T(\d{2}):(\d{2}):(\d{2})Z$").expect("time pattern is valid")
    })
}

/// Turn a stored timestamp into an `xsd:dateTime` lexical form.
///
/// Month and day are stored as `00` below their precision; those are
/// replaced by `01`. A date that still is not a calendar date is rejected.
pub fn clean_time(time: &str, precision: u8) -> ValueResult<String> {
    let caps = time_pattern()
        .captures(time.trim())
        .ok_or_else(|| ValueError::Malformed(format!("invalid timestamp: {}", time)))?;

    let negative = &caps[1] == "-";
    let digits = caps[2].trim_start_matches('0');
    let year = if digits.is_empty() { "0" } else { digits };

    let mut month: u32 = caps[3].parse().unwrap_or(0);
    let mut day: u32 = caps[4].parse().unwrap_or(0);

    if precision < PRECISION_MONTH {
        month = month.max(1);
        day = day.max(1);
    } else if precision < PRECISION_DAY {
        day = day.max(1);
    }

    if !(1..=12).contains(&month) || day == 0 {
        return Err(ValueError::Malformed(format!("invalid date: {}", time)));
    }

    if precision >= PRECISION_DAY {
        if let Ok(y) = year.parse::<i32>() {
            let y = if negative { -y } else { y };
            if NaiveDate::from_ymd_opt(y, month, day).is_none() {
                return Err(ValueError::Malformed(format!("invalid date: {}", time)));
            }
        }
    }

    Ok(format!(
        "{}{:0>4}-{:02}-{:02}T{}:{}:{}Z",
        if negative { "-" } else { "" },
        year,
        month,
        day,
        &caps[5],
        &caps[6],
        &caps[7]
    ))
}

pub struct TimeHandler;

impl TimeHandler {
    fn time(value: &DataValue) -> ValueResult<&TimeValue> {
        match value {
            DataValue::Time(t) => Ok(t),
            other => Err(mismatch("time", other)),
        }
    }
}

impl ValueHandler for TimeHandler {
    fn simple_value(&self, value: &DataValue, _vocabulary: &Vocabulary) -> ValueResult<RdfObject> {
        let time = Self::time(value)?;
        Ok(RdfObject::typed(clean_time(&time.time, time.precision)?, xsd::DATE_TIME))
    }

    fn value_node(&self, value: &DataValue, _vocabulary: &Vocabulary) -> ValueResult<Option<ValueNode>> {
        let time = Self::time(value)?;
        let calendar = url::Url::parse(&time.calendarmodel).map_err(|e| {
            ValueError::Malformed(format!("invalid calendar model {}: {}", time.calendarmodel, e))
        })?;

        Ok(Some(
            ValueNode::new("TimeValue")
                .with("timeValue", RdfObject::typed(clean_time(&time.time, time.precision)?, xsd::DATE_TIME))
                .with("timePrecision", RdfObject::typed(time.precision.to_string(), xsd::INTEGER))
                .with("timeTimezone", RdfObject::typed(time.timezone.to_string(), xsd::INTEGER))
                .with("timeCalendarModel", RdfObject::iri(calendar.as_str())),
        ))
    }
}
