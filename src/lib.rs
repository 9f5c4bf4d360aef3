pub mod clock;
pub mod config;
pub mod error;
pub mod hours;
pub mod location;
pub mod names;
pub mod navigator;
pub mod reference;
pub mod session;
pub mod solar;
pub mod store;
pub mod sun_times;
pub mod types;

pub use clock::{Clock, ManualClock, SystemClock};

pub use config::Config;

pub use error::{ConfigError, Error, HoursError, LocationError, Result, StoreError, SunTimesError};

pub use hours::{
    compute_day_table, day_ruler, hour_progress, planet_for_hour, reanchor, CHALDEAN_ORDER,
    DAY_TO_PLANET_INDEX, HOURS_PER_DAY, HOURS_PER_PHASE,
};

pub use location::{
    default_location, detect_location, resolve_location, search_location, suggest_locations,
    Accuracy, BoundaryTimeZone, Detected, DeviceLocator, FixedTimeZone, IpLocator, LocationSearch,
    LocationSource, PlaceIndex, TimeZoneResolver, MAX_SUGGESTIONS,
};

pub use navigator::{HourNavigator, Navigation, NavigatorMode, NavigatorState};

pub use reference::ReferenceTable;

pub use session::{Command, Session, Status, Suggester, View};

pub use store::LocationStore;

pub use sun_times::{
    DeclinationEstimate, FallbackPolicy, FixedSunTimes, SeasonalEstimate, SunTimesProvider,
};

pub use types::{
    DayTable, GeoPoint, HourPhase, Location, Place, Planet, PlanetaryHour, ReferenceRow, SunTimes,
};
