use std::fs;
use std::path::Path;
use std::sync::OnceLock;

use chrono_tz::Tz;
use tracing::{debug, info, warn};
use tzf_rs::DefaultFinder;

use crate::error::LocationError;
use crate::types::{GeoPoint, Location, Place};

pub const MAX_SUGGESTIONS: usize = 5;
pub const DEFAULT_TIMEZONE: Tz = chrono_tz::America::Sao_Paulo;
pub const DETECTED_CITY: &str = "Localização detectada";

pub fn default_place() -> Place {
    Place {
        latitude: -23.5505,
        longitude: -46.6333,
        city: Some("São Paulo".to_string()),
        state: Some("SP".to_string()),
        country: Some("Brasil".to_string()),
    }
}

pub fn default_location() -> Location {
    Location::from_place(default_place(), DEFAULT_TIMEZONE)
}

pub trait TimeZoneResolver: Send + Sync {
    fn resolve_timezone(&self, point: GeoPoint) -> Result<Tz, LocationError>;
}

pub trait LocationSearch: Send + Sync {
    fn search(&self, query: &str) -> Result<Place, LocationError>;

    fn suggest(&self, query: &str) -> Result<Vec<Place>, LocationError>;
}

pub trait IpLocator: Send + Sync {
    fn locate(&self) -> Result<Place, LocationError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Accuracy {
    #[default]
    Coarse,
    High,
}

pub trait DeviceLocator: Send + Sync {
    fn locate(&self, accuracy: Accuracy) -> Result<GeoPoint, LocationError>;
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedTimeZone(pub Tz);

impl TimeZoneResolver for FixedTimeZone {
    fn resolve_timezone(&self, point: GeoPoint) -> Result<Tz, LocationError> {
        validate_point(point)?;
        Ok(self.0)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BoundaryTimeZone;

impl TimeZoneResolver for BoundaryTimeZone {
    fn resolve_timezone(&self, point: GeoPoint) -> Result<Tz, LocationError> {
        static FINDER: OnceLock<DefaultFinder> = OnceLock::new();
        let point = validate_point(point)?;
        let finder = FINDER.get_or_init(DefaultFinder::new);
        // tzf takes longitude first.
        let name = finder.get_tz_name(point.longitude, point.latitude);
        name.parse::<Tz>().map_err(|_| {
            warn!(name, latitude = point.latitude, longitude = point.longitude, "no zone for coordinates");
            LocationError::TimezoneUnresolved {
                latitude: point.latitude,
                longitude: point.longitude,
            }
        })
    }
}

pub fn validate_point(point: GeoPoint) -> Result<GeoPoint, LocationError> {
    let valid = point.latitude.is_finite()
        && point.longitude.is_finite()
        && (-90.0..=90.0).contains(&point.latitude)
        && (-180.0..=180.0).contains(&point.longitude);
    if valid {
        Ok(point)
    } else {
        Err(LocationError::InvalidCoordinates {
            latitude: point.latitude,
            longitude: point.longitude,
        })
    }
}

pub fn resolve_location(place: Place, resolver: &dyn TimeZoneResolver) -> Result<Location, LocationError> {
    let point = validate_point(place.point())?;
    let timezone = resolver.resolve_timezone(point)?;
    Ok(Location::from_place(place, timezone))
}

pub fn search_location(search: &dyn LocationSearch, query: &str) -> Result<Place, LocationError> {
    let query = query.trim();
    if query.is_empty() {
        return Err(LocationError::NotFound(String::new()));
    }
    let place = search.search(query)?;
    validate_point(place.point())?;
    Ok(place)
}

pub fn suggest_locations(search: &dyn LocationSearch, query: &str) -> Result<Vec<Place>, LocationError> {
    let query = query.trim();
    if query.is_empty() {
        return Ok(Vec::new());
    }
    let places = search
        .suggest(query)?
        .into_iter()
        .filter(|p| validate_point(p.point()).is_ok())
        .take(MAX_SUGGESTIONS)
        .collect();
    Ok(places)
}

#[derive(Debug, Clone, Default)]
pub struct PlaceIndex {
    places: Vec<Place>,
}

impl PlaceIndex {
    pub fn new(places: Vec<Place>) -> Self {
        Self { places }
    }

    pub fn from_json_str(json: &str) -> crate::Result<Self> {
        let places: Vec<Place> = serde_json::from_str(json)?;
        Ok(Self::new(places))
    }

    pub fn load(path: impl AsRef<Path>) -> crate::Result<Self> {
        let path = path.as_ref();
        let index = Self::from_json_str(&fs::read_to_string(path)?)?;
        debug!(path = %path.display(), places = index.len(), "loaded gazetteer");
        Ok(index)
    }

    pub fn len(&self) -> usize {
        self.places.len()
    }

    pub fn is_empty(&self) -> bool {
        self.places.is_empty()
    }
}

impl LocationSearch for PlaceIndex {
    fn search(&self, query: &str) -> Result<Place, LocationError> {
        self.suggest(query)?
            .into_iter()
            .next()
            .ok_or_else(|| LocationError::NotFound(query.to_string()))
    }

    // Prefix matches on the city first, then matches anywhere in "city state country".
    fn suggest(&self, query: &str) -> Result<Vec<Place>, LocationError> {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return Ok(Vec::new());
        }
        let mut prefix = Vec::new();
        let mut anywhere = Vec::new();
        for place in &self.places {
            let city = place.city.as_deref().unwrap_or("").to_lowercase();
            let label = [place.city.as_deref(), place.state.as_deref(), place.country.as_deref()]
                .into_iter()
                .flatten()
                .collect::<Vec<_>>()
                .join(" ")
                .to_lowercase();
            if city.starts_with(&query) {
                prefix.push(place.clone());
            } else if label.contains(&query) {
                anywhere.push(place.clone());
            }
        }
        prefix.extend(anywhere);
        Ok(prefix)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationSource {
    Manual,
    Saved,
    Ip,
    IpWithDevice,
    Device,
    Default,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Detected {
    pub place: Place,
    pub timezone: Option<Tz>,
    pub source: LocationSource,
}

impl Detected {
    pub fn into_location(self, resolver: &dyn TimeZoneResolver) -> Result<Location, LocationError> {
        match self.timezone {
            Some(tz) => Ok(Location::from_place(self.place, tz)),
            None => resolve_location(self.place, resolver),
        }
    }
}

pub fn detect_location(
    saved: Option<&Location>,
    ip: Option<&dyn IpLocator>,
    device: Option<&dyn DeviceLocator>,
    fallback: &Location,
) -> Detected {
    if let Some(location) = saved {
        return Detected {
            place: location.place(),
            timezone: Some(location.timezone),
            source: LocationSource::Saved,
        };
    }

    let from_ip = ip.and_then(|locator| match locator.locate() {
        Ok(place) if validate_point(place.point()).is_ok() => Some(place),
        Ok(place) => {
            warn!(latitude = place.latitude, longitude = place.longitude, "ignoring invalid IP location");
            None
        }
        Err(err) => {
            warn!(error = %err, "IP location failed");
            None
        }
    });

    let from_device = device.and_then(|locator| match locator.locate(Accuracy::Coarse) {
        Ok(point) => validate_point(point).ok(),
        Err(err) => {
            warn!(error = %err, "device location failed");
            None
        }
    });

    let detected = match (from_ip, from_device) {
        (Some(place), Some(point)) => Detected {
            place: Place {
                latitude: point.latitude,
                longitude: point.longitude,
                ..place
            },
            timezone: None,
            source: LocationSource::IpWithDevice,
        },
        (Some(place), None) => Detected {
            place,
            timezone: None,
            source: LocationSource::Ip,
        },
        (None, Some(point)) => Detected {
            place: Place {
                city: Some(DETECTED_CITY.to_string()),
                ..Place::at(point)
            },
            timezone: None,
            source: LocationSource::Device,
        },
        (None, None) => Detected {
            place: fallback.place(),
            timezone: Some(fallback.timezone),
            source: LocationSource::Default,
        },
    };
    info!(source = ?detected.source, "location detected");
    detected
}
