use chrono::{DateTime, NaiveDate, NaiveTime};
use chrono_tz::Tz;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum HoursError {
    #[error("invalid day length: sunrise {sunrise} to sunset {sunset}")]
    InvalidDayLength {
        sunrise: DateTime<Tz>,
        sunset: DateTime<Tz>,
    },

    #[error("local time {time} does not exist on {date} in {zone}")]
    NonexistentLocalTime {
        date: NaiveDate,
        time: NaiveTime,
        zone: Tz,
    },

    #[error("no calendar day follows {0}")]
    DateOutOfRange(NaiveDate),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SunTimesError {
    #[error("sun times unavailable: {0}")]
    Unavailable(String),

    #[error("invalid sun times response: {0}")]
    InvalidResponse(String),

    #[error("sun never sets on {0}")]
    PolarDay(NaiveDate),

    #[error("sun never rises on {0}")]
    PolarNight(NaiveDate),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LocationError {
    #[error("location not found: {0}")]
    NotFound(String),

    #[error("location permission denied")]
    PermissionDenied,

    #[error("location lookup timed out")]
    Timeout,

    #[error("location service unavailable: {0}")]
    Unavailable(String),

    #[error("invalid coordinates: {latitude}, {longitude}")]
    InvalidCoordinates { latitude: f64, longitude: f64 },

    #[error("could not resolve a time zone for {latitude}, {longitude}")]
    TimezoneUnresolved { latitude: f64, longitude: f64 },
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Hours(#[from] HoursError),

    #[error(transparent)]
    SunTimes(#[from] SunTimesError),

    #[error(transparent)]
    Location(#[from] LocationError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
