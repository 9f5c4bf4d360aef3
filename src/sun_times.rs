use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::SunTimesError;
use crate::solar::{self, Daylight, DEGREES_PER_HOUR};
use crate::types::{GeoPoint, SunTimes};

pub trait SunTimesProvider: Send + Sync {
    fn sun_times(&self, point: GeoPoint, date: NaiveDate) -> Result<SunTimes, SunTimesError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FallbackPolicy {
    #[default]
    SeasonalEstimate,
    Pending,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedSunTimes(pub SunTimes);

impl SunTimesProvider for FixedSunTimes {
    fn sun_times(&self, _point: GeoPoint, _date: NaiveDate) -> Result<SunTimes, SunTimesError> {
        Ok(self.0)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DeclinationEstimate;

impl SunTimesProvider for DeclinationEstimate {
    fn sun_times(&self, point: GeoPoint, date: NaiveDate) -> Result<SunTimes, SunTimesError> {
        let n = solar::day_of_year(date);
        let decl = solar::solar_declination(n);
        let half_arc = match solar::daylight_half_arc(point.latitude, decl) {
            Daylight::HalfArc(h) => h,
            Daylight::PolarDay => return Err(SunTimesError::PolarDay(date)),
            Daylight::PolarNight => return Err(SunTimesError::PolarNight(date)),
        };
        let half_day_minutes = half_arc / DEGREES_PER_HOUR * 60.0;
        let noon = solar::solar_noon_utc_minutes(point.longitude, n);
        let midnight = date.and_time(NaiveTime::MIN).and_utc();

        Ok(SunTimes {
            sunrise: midnight + minutes(noon - half_day_minutes),
            sunset: midnight + minutes(noon + half_day_minutes),
        })
    }
}

/// Minutes before/after 06:00 for sunrise per month, northern hemisphere.
/// Sunset moves by the same amount in the opposite direction from 18:00.
pub const SEASONAL_SUNRISE_SHIFT: [f64; 12] = [
    -60.0, -40.0, -20.0, 0.0, 20.0, 30.0, 20.0, 0.0, -20.0, -40.0, -60.0, -70.0,
];

#[derive(Debug, Clone, Copy)]
pub struct SeasonalEstimate {
    pub zone: Tz,
}

impl SeasonalEstimate {
    pub fn new(zone: Tz) -> Self {
        Self { zone }
    }
}

impl SunTimesProvider for SeasonalEstimate {
    fn sun_times(&self, point: GeoPoint, date: NaiveDate) -> Result<SunTimes, SunTimesError> {
        let latitude_scale = point.latitude.abs() / 90.0;
        let mut shift = SEASONAL_SUNRISE_SHIFT[date.month0() as usize] * latitude_scale;
        if point.latitude < 0.0 {
            shift = -shift;
        }

        let sunrise = local_instant(self.zone, date, 6)? + minutes(shift);
        let sunset = local_instant(self.zone, date, 18)? + minutes(-shift);
        Ok(SunTimes { sunrise, sunset })
    }
}

fn local_instant(zone: Tz, date: NaiveDate, hour: u32) -> Result<DateTime<Utc>, SunTimesError> {
    let time = NaiveTime::from_hms_opt(hour, 0, 0)
        .ok_or_else(|| SunTimesError::InvalidResponse(format!("hour {hour}")))?;
    zone.from_local_datetime(&date.and_time(time))
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or_else(|| SunTimesError::Unavailable(format!("{date} {time} does not exist in {zone}")))
}

fn minutes(value: f64) -> Duration {
    Duration::seconds((value * 60.0).round() as i64)
}
