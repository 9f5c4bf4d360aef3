use std::sync::Arc;

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc, Weekday};
use chrono_tz::Tz;
use proptest::prelude::*;

use planetary_hours::hours::*;
use planetary_hours::types::*;
use planetary_hours::HoursError;

macro_rules! assert_approx {
    ($left:expr, $right:expr, $tol:expr) => {
        let (l, r) = ($left as f64, $right as f64);
        assert!(
            (l - r).abs() <= $tol,
            "assert_approx failed: left={}, right={}, diff={}, tol={}",
            l, r, (l - r).abs(), $tol
        );
    };
}

fn utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn location_in(tz: Tz) -> Arc<Location> {
    Arc::new(Location {
        latitude: 0.0,
        longitude: 0.0,
        city: Some("Test".to_string()),
        state: None,
        country: None,
        timezone: tz,
    })
}

fn sun(sunrise: DateTime<Utc>, sunset: DateTime<Utc>) -> SunTimes {
    SunTimes { sunrise, sunset }
}

// 2025-01-05 is a Sunday.
const SUNDAY: (i32, u32, u32) = (2025, 1, 5);

fn sunday_table() -> DayTable {
    let (y, m, d) = SUNDAY;
    let s = sun(utc(y, m, d, 6, 0), utc(y, m, d, 18, 0));
    compute_day_table(&s, date(y, m, d), &location_in(Tz::UTC)).unwrap()
}

// ── Equal day and night ──

#[test]
fn test_sunday_twelve_hour_day() {
    let table = sunday_table();
    assert_eq!(table.len(), HOURS_PER_DAY);
    assert_eq!(table.ruler, Planet::Sun);

    let first = &table.hours[0];
    assert_eq!(first.hour_number, 1);
    assert_eq!(first.start, utc(2025, 1, 5, 6, 0));
    assert_eq!(first.end, utc(2025, 1, 5, 7, 0));
    assert_eq!(first.planet, Planet::Sun);

    let twelfth = &table.hours[11];
    assert_eq!(twelfth.hour_number, 12);
    assert_eq!(twelfth.start, utc(2025, 1, 5, 17, 0));
    assert_eq!(twelfth.end, utc(2025, 1, 5, 18, 0));

    let thirteenth = &table.hours[12];
    assert_eq!(thirteenth.hour_number, 13);
    assert_eq!(thirteenth.start, utc(2025, 1, 5, 18, 0));
    assert_eq!(thirteenth.end, utc(2025, 1, 5, 19, 0));
    assert_eq!(thirteenth.planet, Planet::Jupiter);
}

#[test]
fn test_last_hour_ends_at_next_sunrise() {
    let table = sunday_table();
    assert_eq!(table.hours[23].hour_number, 24);
    assert_eq!(table.hours[23].end, utc(2025, 1, 6, 6, 0));
}

// ── Unequal day and night ──

#[test]
fn test_ten_hour_day() {
    let s = sun(utc(2025, 1, 5, 7, 0), utc(2025, 1, 5, 17, 0));
    let table = compute_day_table(&s, date(2025, 1, 5), &location_in(Tz::UTC)).unwrap();

    assert_eq!(table.hours[0].duration(), Duration::minutes(50));
    assert_eq!(table.hours[1].start, utc(2025, 1, 5, 7, 50));
    assert_eq!(table.hours[12].duration(), Duration::minutes(70));
    assert_eq!(table.hours[12].start, utc(2025, 1, 5, 17, 0));
    assert_eq!(table.hours[23].end, utc(2025, 1, 6, 7, 0));
}

#[test]
fn test_odd_durations_stay_contiguous() {
    let sunrise = Utc.with_ymd_and_hms(2025, 6, 1, 5, 13, 7).unwrap();
    let sunset = Utc.with_ymd_and_hms(2025, 6, 1, 20, 41, 53).unwrap();
    let table = compute_day_table(&sun(sunrise, sunset), date(2025, 6, 1), &location_in(Tz::UTC)).unwrap();

    for pair in table.hours.windows(2) {
        assert_eq!(pair[0].end, pair[1].start);
    }
    assert_eq!(table.sunrise().unwrap(), sunrise);
    assert_eq!(table.sunset().unwrap(), sunset);
    assert_eq!(table.hours[23].end, sunrise + Duration::days(1));
}

// ── Rulers ──

#[test]
fn test_day_rulers() {
    let expected = [
        (Weekday::Sun, Planet::Sun),
        (Weekday::Mon, Planet::Moon),
        (Weekday::Tue, Planet::Mars),
        (Weekday::Wed, Planet::Mercury),
        (Weekday::Thu, Planet::Jupiter),
        (Weekday::Fri, Planet::Venus),
        (Weekday::Sat, Planet::Saturn),
    ];
    for (weekday, planet) in expected {
        assert_eq!(day_ruler(weekday), planet, "{:?}", weekday);
    }
}

#[test]
fn test_first_hour_is_ruler_for_each_weekday() {
    let location = location_in(Tz::UTC);
    for offset in 0..7 {
        let d = date(2025, 1, 5) + Duration::days(offset);
        let s = sun(utc(2025, 1, 5, 6, 0), utc(2025, 1, 5, 18, 0));
        let table = compute_day_table(&s, d, &location).unwrap();
        assert_eq!(table.hours[0].planet, table.ruler);
        assert_eq!(table.ruler, day_ruler(chrono::Datelike::weekday(&d)));
    }
}

#[test]
fn test_chaldean_sequence_across_all_hours() {
    let table = sunday_table();
    let planets: Vec<Planet> = table.hours.iter().map(|h| h.planet).collect();
    for (i, planet) in planets.iter().enumerate() {
        assert_eq!(*planet, CHALDEAN_ORDER[i % 7], "hour {}", i + 1);
    }
}

#[test]
fn test_monday_starts_with_moon_then_saturn() {
    assert_eq!(planet_for_hour(Weekday::Mon, 0), Planet::Moon);
    assert_eq!(planet_for_hour(Weekday::Mon, 1), Planet::Saturn);
    assert_eq!(planet_for_hour(Weekday::Mon, 2), Planet::Jupiter);
    // Hour 25 would be Tuesday's first hour.
    assert_eq!(planet_for_hour(Weekday::Mon, 24), Planet::Mars);
}

// ── Re-anchoring ──

#[test]
fn test_reanchor_keeps_local_time_of_day() {
    let tz = chrono_tz::America::Sao_Paulo;
    // 08:30 UTC is 05:30 in São Paulo.
    let anchored = reanchor(utc(2025, 1, 5, 8, 30), date(2025, 3, 10), tz).unwrap();
    assert_eq!(anchored, utc(2025, 3, 10, 8, 30));
    assert_eq!(anchored.format("%H:%M").to_string(), "05:30");
}

#[test]
fn test_table_reused_for_other_date() {
    let location = location_in(chrono_tz::America::Sao_Paulo);
    let s = sun(utc(2025, 1, 5, 8, 30), utc(2025, 1, 5, 21, 45));
    let table = compute_day_table(&s, date(2025, 1, 8), &location).unwrap();
    assert_eq!(table.date, date(2025, 1, 8));
    assert_eq!(table.hours[0].start, utc(2025, 1, 8, 8, 30));
    assert_eq!(table.hours[11].end, utc(2025, 1, 8, 21, 45));
    assert_eq!(table.ruler, Planet::Mercury);
}

#[test]
fn test_reanchor_into_spring_forward_gap() {
    let tz = chrono_tz::America::New_York;
    // 02:30 EST on 2025-03-08; 02:30 does not exist on 2025-03-09.
    let anchored = reanchor(utc(2025, 3, 8, 7, 30), date(2025, 3, 9), tz).unwrap();
    assert_eq!(anchored, utc(2025, 3, 9, 7, 30));
    assert_eq!(anchored.format("%H:%M").to_string(), "03:30");
}

#[test]
fn test_reanchor_into_ambiguous_hour_takes_earlier() {
    let tz = chrono_tz::America::New_York;
    // 01:30 EDT on 2025-11-01; 01:30 happens twice on 2025-11-02.
    let anchored = reanchor(utc(2025, 11, 1, 5, 30), date(2025, 11, 2), tz).unwrap();
    assert_eq!(anchored, utc(2025, 11, 2, 5, 30));
}

// ── Clock changes ──

fn new_york_sun() -> SunTimes {
    // 06:30 and 17:00 EDT.
    sun(utc(2025, 11, 1, 10, 30), utc(2025, 11, 1, 21, 0))
}

#[test]
fn test_fall_back_night_reaches_next_sunrise() {
    let location = location_in(chrono_tz::America::New_York);
    let saturday = compute_day_table(&new_york_sun(), date(2025, 11, 1), &location).unwrap();
    let sunday = compute_day_table(&new_york_sun(), date(2025, 11, 2), &location).unwrap();

    // 06:30 EST on Sunday is an hour later in UTC than 06:30 EDT.
    assert_eq!(saturday.hours[23].end, utc(2025, 11, 2, 11, 30));
    assert_eq!(saturday.hours[23].end, sunday.hours[0].start);
    assert_eq!(saturday.hours[12].duration(), Duration::seconds(14 * 3600 + 1800) / 12);
}

#[test]
fn test_spring_forward_night_reaches_next_sunrise() {
    let location = location_in(chrono_tz::America::New_York);
    let saturday = compute_day_table(&new_york_sun(), date(2025, 3, 8), &location).unwrap();
    let sunday = compute_day_table(&new_york_sun(), date(2025, 3, 9), &location).unwrap();

    assert_eq!(saturday.hours[12].start, utc(2025, 3, 8, 22, 0));
    assert_eq!(saturday.hours[23].end, utc(2025, 3, 9, 10, 30));
    assert_eq!(saturday.hours[23].end, sunday.hours[0].start);
}

// ── Invalid spans ──

#[test]
fn test_sunset_before_sunrise_is_error() {
    let s = sun(utc(2025, 1, 5, 18, 0), utc(2025, 1, 5, 6, 0));
    let result = compute_day_table(&s, date(2025, 1, 5), &location_in(Tz::UTC));
    assert!(matches!(result, Err(HoursError::InvalidDayLength { .. })));
}

#[test]
fn test_sunset_equal_sunrise_is_error() {
    let s = sun(utc(2025, 1, 5, 12, 0), utc(2025, 1, 5, 12, 0));
    let result = compute_day_table(&s, date(2025, 1, 5), &location_in(Tz::UTC));
    assert!(matches!(result, Err(HoursError::InvalidDayLength { .. })));
}

#[test]
fn test_zone_decides_day_span() {
    // Honolulu reads these instants as 07:00 and 18:30 on the same local day.
    let tz = chrono_tz::Pacific::Honolulu;
    let ok = sun(utc(2025, 1, 5, 17, 0), utc(2025, 1, 6, 4, 30));
    assert!(compute_day_table(&ok, date(2025, 1, 5), &location_in(tz)).is_ok());

    // Same instants read in UTC put the sunset before the sunrise.
    let result = compute_day_table(&ok, date(2025, 1, 5), &location_in(Tz::UTC));
    assert!(matches!(result, Err(HoursError::InvalidDayLength { .. })));
}

// ── Table accessors ──

#[test]
fn test_phases_and_halves() {
    let table = sunday_table();
    assert_eq!(table.day_hours().len(), 12);
    assert_eq!(table.night_hours().len(), 12);
    assert!(table.day_hours().iter().all(|h| h.phase() == HourPhase::Day));
    assert!(table.night_hours().iter().all(|h| h.phase() == HourPhase::Night));
}

#[test]
fn test_position_of_half_open() {
    let table = sunday_table();
    assert_eq!(table.position_of(utc(2025, 1, 5, 6, 0)), Some(0));
    assert_eq!(table.position_of(utc(2025, 1, 5, 6, 59)), Some(0));
    assert_eq!(table.position_of(utc(2025, 1, 5, 7, 0)), Some(1));
    assert_eq!(table.position_of(utc(2025, 1, 6, 5, 59)), Some(23));
    assert_eq!(table.position_of(utc(2025, 1, 6, 6, 0)), None);
    assert_eq!(table.position_of(utc(2025, 1, 5, 5, 59)), None);
}

#[test]
fn test_location_attached_to_every_hour() {
    let location = location_in(Tz::UTC);
    let s = sun(utc(2025, 1, 5, 6, 0), utc(2025, 1, 5, 18, 0));
    let table = compute_day_table(&s, date(2025, 1, 5), &location).unwrap();
    assert!(table.hours.iter().all(|h| Arc::ptr_eq(&h.location, &location)));
}

#[test]
fn test_deterministic() {
    assert_eq!(sunday_table(), sunday_table());
}

// ── Progress ──

#[test]
fn test_hour_progress() {
    let table = sunday_table();
    let hour = &table.hours[0];
    assert_approx!(hour_progress(hour, utc(2025, 1, 5, 5, 0)), 0.0, 1e-9);
    assert_approx!(hour_progress(hour, utc(2025, 1, 5, 6, 0)), 0.0, 1e-9);
    assert_approx!(hour_progress(hour, utc(2025, 1, 5, 6, 30)), 50.0, 1e-9);
    assert_approx!(hour_progress(hour, utc(2025, 1, 5, 6, 45)), 75.0, 1e-9);
    assert_approx!(hour_progress(hour, utc(2025, 1, 5, 9, 0)), 100.0, 1e-9);
}

// ── Properties ──

proptest! {
    #[test]
    fn prop_table_is_contiguous_and_covers_one_day(
        day_offset in 0i64..3650,
        sunrise_secs in 0i64..86_000,
        day_secs in 60i64..86_340,
    ) {
        prop_assume!(sunrise_secs + day_secs < 86_400);
        let d = date(2000, 1, 1) + Duration::days(day_offset);
        let midnight = d.and_hms_opt(0, 0, 0).unwrap().and_utc();
        let sunrise = midnight + Duration::seconds(sunrise_secs);
        let sunset = sunrise + Duration::seconds(day_secs);

        let table = compute_day_table(&sun(sunrise, sunset), d, &location_in(Tz::UTC)).unwrap();

        prop_assert_eq!(table.len(), 24);
        prop_assert_eq!(table.hours[0].start, sunrise);
        prop_assert_eq!(table.hours[11].end, sunset);
        prop_assert_eq!(table.hours[23].end, sunrise + Duration::days(1));
        for pair in table.hours.windows(2) {
            prop_assert_eq!(pair[0].end, pair[1].start);
            prop_assert!(pair[0].start < pair[0].end);
        }
        for (i, hour) in table.hours.iter().enumerate() {
            prop_assert_eq!(hour.hour_number as usize, i + 1);
        }
    }

    #[test]
    fn prop_planets_follow_chaldean_cycle(day_offset in 0i64..3650) {
        let d = date(2000, 1, 1) + Duration::days(day_offset);
        let s = sun(utc(2000, 1, 1, 6, 0), utc(2000, 1, 1, 18, 0));
        let table = compute_day_table(&s, d, &location_in(Tz::UTC)).unwrap();
        let start = CHALDEAN_ORDER.iter().position(|p| *p == table.ruler).unwrap();
        for (i, hour) in table.hours.iter().enumerate() {
            prop_assert_eq!(hour.planet, CHALDEAN_ORDER[(start + i) % 7]);
        }
    }
}
