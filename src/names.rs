use chrono::{Datelike, NaiveDate, Weekday};

use crate::hours::day_ruler;
use crate::types::{Location, Planet};

pub const DAYS_PT: [&str; 7] = [
    "Domingo",
    "Segunda-feira",
    "Terça-feira",
    "Quarta-feira",
    "Quinta-feira",
    "Sexta-feira",
    "Sábado",
];

pub const DAYS_CLASSICAL: [&str; 7] = [
    "Dia do Sol",
    "Dia da Lua",
    "Dia de Marte",
    "Dia de Mercúrio",
    "Dia de Júpiter",
    "Dia de Vênus",
    "Dia de Saturno",
];

pub const MONTHS_PT: [&str; 12] = [
    "janeiro",
    "fevereiro",
    "março",
    "abril",
    "maio",
    "junho",
    "julho",
    "agosto",
    "setembro",
    "outubro",
    "novembro",
    "dezembro",
];

pub fn day_name(weekday: Weekday) -> &'static str {
    DAYS_PT[weekday.num_days_from_sunday() as usize]
}

pub fn classical_day_name(weekday: Weekday) -> &'static str {
    DAYS_CLASSICAL[weekday.num_days_from_sunday() as usize]
}

pub fn planet_name(planet: Planet) -> &'static str {
    match planet {
        Planet::Sun => "Sol",
        Planet::Moon => "Lua",
        Planet::Mercury => "Mercúrio",
        Planet::Venus => "Vênus",
        Planet::Mars => "Marte",
        Planet::Jupiter => "Júpiter",
        Planet::Saturn => "Saturno",
    }
}

pub fn planet_symbol(planet: Planet) -> &'static str {
    match planet {
        Planet::Sun => "☉",
        Planet::Moon => "☾",
        Planet::Mercury => "☿",
        Planet::Venus => "♀",
        Planet::Mars => "♂",
        Planet::Jupiter => "♃",
        Planet::Saturn => "♄",
    }
}

pub fn planet_with_preposition(planet: Planet) -> String {
    match planet {
        Planet::Sun => "do Sol".to_string(),
        Planet::Moon => "da Lua".to_string(),
        other => format!("de {}", planet_name(other)),
    }
}

pub fn ordinal(n: u8) -> String {
    format!("{n}ª")
}

pub fn format_date(date: NaiveDate) -> String {
    format!(
        "{}, {} de {} de {}",
        day_name(date.weekday()),
        date.day(),
        MONTHS_PT[date.month0() as usize],
        date.year()
    )
}

pub fn format_location(location: Option<&Location>) -> String {
    let Some(location) = location else {
        return "Localização não detectada".to_string();
    };
    let city = location
        .city
        .as_deref()
        .filter(|c| !c.is_empty())
        .unwrap_or("Cidade não identificada");
    match location.state.as_deref().filter(|s| !s.is_empty()) {
        Some(state) => format!("{city} - {state}"),
        None => city.to_string(),
    }
}

pub fn headline(date: NaiveDate, hour_planet: Planet) -> String {
    let weekday = date.weekday();
    format!(
        "{} {}, Hora {} {}",
        classical_day_name(weekday),
        planet_symbol(day_ruler(weekday)),
        planet_with_preposition(hour_planet),
        planet_symbol(hour_planet)
    )
}
