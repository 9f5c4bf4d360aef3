use chrono::{Datelike, NaiveDate};

pub const EARTH_AXIAL_TILT: f64 = 23.45;
pub const DEGREES_PER_HOUR: f64 = 15.0;
pub const MINUTES_PER_DEGREE: f64 = 4.0;

pub fn deg_to_rad(deg: f64) -> f64 {
    deg * (std::f64::consts::PI / 180.0)
}

pub fn rad_to_deg(rad: f64) -> f64 {
    rad * (180.0 / std::f64::consts::PI)
}

pub fn day_of_year(date: NaiveDate) -> i32 {
    date.ordinal() as i32
}

pub fn intermediate_angle_b(n: i32) -> f64 {
    deg_to_rad((n - 1) as f64 * (360.0 / 365.0))
}

pub fn equation_of_time(n: i32) -> f64 {
    let b = intermediate_angle_b(n);
    229.18
        * (0.000075
            + 0.001868 * b.cos()
            - 0.032077 * b.sin()
            - 0.014615 * (2.0 * b).cos()
            - 0.040849 * (2.0 * b).sin())
}

pub fn solar_declination(n: i32) -> f64 {
    EARTH_AXIAL_TILT * deg_to_rad(360.0 * ((284 + n) as f64 / 365.0)).sin()
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Daylight {
    HalfArc(f64),
    PolarDay,
    PolarNight,
}

pub fn daylight_half_arc(latitude: f64, declination: f64) -> Daylight {
    let lat_rad = deg_to_rad(latitude);
    let decl_rad = deg_to_rad(declination);
    let cos_h = -lat_rad.tan() * decl_rad.tan();

    if cos_h >= 1.0 {
        Daylight::PolarNight
    } else if cos_h <= -1.0 {
        Daylight::PolarDay
    } else {
        Daylight::HalfArc(rad_to_deg(cos_h.acos()))
    }
}

pub fn solar_noon_utc_minutes(longitude: f64, n: i32) -> f64 {
    720.0 - MINUTES_PER_DEGREE * longitude - equation_of_time(n)
}
