use std::sync::Arc;

use chrono::{DateTime, Datelike, Duration, LocalResult, NaiveDate, Offset, TimeZone, Utc, Weekday};
use chrono_tz::Tz;
use tracing::debug;

use crate::error::HoursError;
use crate::types::{DayTable, Location, Planet, PlanetaryHour, SunTimes};

pub const HOURS_PER_DAY: usize = 24;
pub const HOURS_PER_PHASE: usize = 12;

pub const CHALDEAN_ORDER: [Planet; 7] = [
    Planet::Sun,
    Planet::Venus,
    Planet::Mercury,
    Planet::Moon,
    Planet::Saturn,
    Planet::Jupiter,
    Planet::Mars,
];

pub const DAY_TO_PLANET_INDEX: [usize; 7] = [0, 3, 6, 2, 5, 1, 4];

pub fn day_ruler(weekday: Weekday) -> Planet {
    planet_for_hour(weekday, 0)
}

pub fn planet_for_hour(weekday: Weekday, index: usize) -> Planet {
    let first = DAY_TO_PLANET_INDEX[weekday.num_days_from_sunday() as usize];
    CHALDEAN_ORDER[(first + index) % CHALDEAN_ORDER.len()]
}

/// Move `instant` onto `date` in `tz`, keeping its local time of day.
///
/// Ambiguous wall times take the earlier instant. Wall times inside a
/// spring-forward gap are read with the offset in force before the gap, which
/// pushes them forward by the gap length.
pub fn reanchor(instant: DateTime<Utc>, date: NaiveDate, tz: Tz) -> Result<DateTime<Tz>, HoursError> {
    let time = instant.with_timezone(&tz).time();
    let naive = date.and_time(time);
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) => Ok(dt),
        LocalResult::Ambiguous(earliest, _) => Ok(earliest),
        LocalResult::None => {
            let before = tz
                .from_local_datetime(&(naive - Duration::hours(3)))
                .earliest()
                .ok_or(HoursError::NonexistentLocalTime { date, time, zone: tz })?;
            let offset = before.offset().fix();
            let utc = naive - Duration::seconds(offset.local_minus_utc() as i64);
            Ok(tz.from_utc_datetime(&utc))
        }
    }
}

pub fn compute_day_table(
    sun: &SunTimes,
    for_date: NaiveDate,
    location: &Arc<Location>,
) -> Result<DayTable, HoursError> {
    let tz = location.timezone;
    let next_date = for_date.succ_opt().ok_or(HoursError::DateOutOfRange(for_date))?;
    let sunrise = reanchor(sun.sunrise, for_date, tz)?;
    let sunset = reanchor(sun.sunset, for_date, tz)?;
    // The night ends at the next date's sunrise, which differs by the offset change across DST.
    let next_sunrise = reanchor(sun.sunrise, next_date, tz)?;

    let day_duration = sunset.signed_duration_since(sunrise);
    let night_duration = next_sunrise.signed_duration_since(sunset);
    if day_duration <= Duration::zero() || night_duration <= Duration::zero() {
        return Err(HoursError::InvalidDayLength { sunrise, sunset });
    }

    let weekday = for_date.weekday();
    let mut hours = Vec::with_capacity(HOURS_PER_DAY);

    for i in 0..HOURS_PER_PHASE as i32 {
        hours.push(PlanetaryHour {
            start: sunrise + day_duration * i / 12,
            end: sunrise + day_duration * (i + 1) / 12,
            planet: planet_for_hour(weekday, i as usize),
            hour_number: (i + 1) as u8,
            location: Arc::clone(location),
        });
    }

    for i in 0..HOURS_PER_PHASE as i32 {
        hours.push(PlanetaryHour {
            start: sunset + night_duration * i / 12,
            end: sunset + night_duration * (i + 1) / 12,
            planet: planet_for_hour(weekday, HOURS_PER_PHASE + i as usize),
            hour_number: (i + 13) as u8,
            location: Arc::clone(location),
        });
    }

    debug!(
        date = %for_date,
        zone = %tz,
        sunrise = %sunrise,
        sunset = %sunset,
        "computed planetary hour table"
    );

    Ok(DayTable {
        date: for_date,
        ruler: day_ruler(weekday),
        hours,
    })
}

pub fn hour_progress(hour: &PlanetaryHour, now: DateTime<Utc>) -> f64 {
    if now < hour.start {
        return 0.0;
    }
    if now > hour.end {
        return 100.0;
    }
    let total = hour.duration().num_milliseconds() as f64;
    if total <= 0.0 {
        return 100.0;
    }
    let elapsed = now.signed_duration_since(hour.start).num_milliseconds() as f64;
    (elapsed / total * 100.0).clamp(0.0, 100.0)
}
