use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Planet {
    Sun,
    Moon,
    Mercury,
    Venus,
    Mars,
    Jupiter,
    Saturn,
}

impl fmt::Display for Planet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Planet::Sun => "Sun",
            Planet::Moon => "Moon",
            Planet::Mercury => "Mercury",
            Planet::Venus => "Venus",
            Planet::Mars => "Mars",
            Planet::Jupiter => "Jupiter",
            Planet::Saturn => "Saturn",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum HourPhase {
    Day,
    Night,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
}

impl Place {
    pub fn at(point: GeoPoint) -> Self {
        Self {
            latitude: point.latitude,
            longitude: point.longitude,
            city: None,
            state: None,
            country: None,
        }
    }

    pub fn point(&self) -> GeoPoint {
        GeoPoint {
            latitude: self.latitude,
            longitude: self.longitude,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    pub timezone: Tz,
}

impl Location {
    pub fn from_place(place: Place, timezone: Tz) -> Self {
        Self {
            latitude: place.latitude,
            longitude: place.longitude,
            city: place.city,
            state: place.state,
            country: place.country,
            timezone,
        }
    }

    pub fn point(&self) -> GeoPoint {
        GeoPoint {
            latitude: self.latitude,
            longitude: self.longitude,
        }
    }

    pub fn place(&self) -> Place {
        Place {
            latitude: self.latitude,
            longitude: self.longitude,
            city: self.city.clone(),
            state: self.state.clone(),
            country: self.country.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SunTimes {
    pub sunrise: DateTime<Utc>,
    pub sunset: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlanetaryHour {
    pub start: DateTime<Tz>,
    pub end: DateTime<Tz>,
    pub planet: Planet,
    /// 1..=12 for day hours, 13..=24 for night hours.
    pub hour_number: u8,
    pub location: Arc<Location>,
}

impl PlanetaryHour {
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant < self.end
    }

    pub fn phase(&self) -> HourPhase {
        if self.hour_number <= 12 {
            HourPhase::Day
        } else {
            HourPhase::Night
        }
    }

    pub fn duration(&self) -> chrono::Duration {
        self.end.signed_duration_since(self.start)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayTable {
    pub date: NaiveDate,
    pub ruler: Planet,
    pub hours: Vec<PlanetaryHour>,
}

impl DayTable {
    pub fn get(&self, index: usize) -> Option<&PlanetaryHour> {
        self.hours.get(index)
    }

    pub fn len(&self) -> usize {
        self.hours.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hours.is_empty()
    }

    pub fn position_of(&self, instant: DateTime<Utc>) -> Option<usize> {
        self.hours.iter().position(|h| h.contains(instant))
    }

    pub fn day_hours(&self) -> &[PlanetaryHour] {
        &self.hours[..self.hours.len().min(12)]
    }

    pub fn night_hours(&self) -> &[PlanetaryHour] {
        &self.hours[self.hours.len().min(12)..]
    }

    pub fn sunrise(&self) -> Option<DateTime<Tz>> {
        self.hours.first().map(|h| h.start)
    }

    pub fn sunset(&self) -> Option<DateTime<Tz>> {
        self.hours.get(11).map(|h| h.end)
    }
}

/// One row of the manuscript reference table. The JSON keys follow the
/// Portuguese table the data ships in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceRow {
    #[serde(rename = "Dia")]
    pub day_name: String,
    #[serde(rename = "Hora")]
    pub hour_ordinal: String,
    #[serde(rename = "Planeta")]
    pub planet: String,
    #[serde(rename = "Harleianus", default)]
    pub harleianus: String,
    #[serde(rename = "Monacensis", default)]
    pub monacensis: String,
    #[serde(rename = "Gennadianus", default)]
    pub gennadianus: String,
}
