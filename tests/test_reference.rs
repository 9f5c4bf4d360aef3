use std::io::Write;
use std::sync::Arc;

use chrono::{NaiveDate, TimeZone, Utc, Weekday};

use planetary_hours::names::*;
use planetary_hours::reference::*;
use planetary_hours::types::*;
use planetary_hours::{compute_day_table, Error};

const TABLE: &str = r#"[
  {"Dia": "Domingo", "Hora": "1ª", "Planeta": "Sol",
   "Harleianus": "Favorável para pedir favores a reis.",
   "Monacensis": "(Missing)",
   "Gennadianus": "Bom para viagens."},
  {"Dia": "Domingo", "Hora": "13ª", "Planeta": "Júpiter",
   "Harleianus": "", "Monacensis": "Bom para negócios.", "Gennadianus": "(Missing)"},
  {"Dia": "Segunda-feira", "Hora": "1ª", "Planeta": "Lua",
   "Harleianus": "Bom para semear."},
  {"Dia": "Domingo", "Hora": "1ª", "Planeta": "Sol",
   "Harleianus": "duplicada", "Monacensis": "", "Gennadianus": ""}
]"#;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

// ── Lookup ──

#[test]
fn test_lookup_exact_match() {
    let table = ReferenceTable::from_json_str(TABLE).unwrap();
    assert_eq!(table.len(), 4);

    let row = table.lookup("Domingo", 1).unwrap();
    assert_eq!(row.planet, "Sol");
    assert_eq!(row.harleianus, "Favorável para pedir favores a reis.");

    let row = table.lookup("Domingo", 13).unwrap();
    assert_eq!(row.planet, "Júpiter");
}

#[test]
fn test_lookup_absent() {
    let table = ReferenceTable::from_json_str(TABLE).unwrap();
    assert!(table.lookup("Domingo", 2).is_none());
    assert!(table.lookup("Sábado", 1).is_none());
    assert!(table.lookup("domingo", 1).is_none());
}

#[test]
fn test_first_duplicate_wins() {
    let table = ReferenceTable::from_json_str(TABLE).unwrap();
    let row = table.lookup("Domingo", 1).unwrap();
    assert_ne!(row.harleianus, "duplicada");
}

#[test]
fn test_missing_fields_default_to_empty() {
    let table = ReferenceTable::from_json_str(TABLE).unwrap();
    let row = table.lookup("Segunda-feira", 1).unwrap();
    assert_eq!(row.monacensis, "");
    assert_eq!(row.gennadianus, "");
}

#[test]
fn test_empty_table() {
    let table = ReferenceTable::default();
    assert!(table.is_empty());
    assert!(table.lookup("Domingo", 1).is_none());
}

#[test]
fn test_malformed_json_is_error() {
    let result = ReferenceTable::from_json_str("{\"Dia\": 1}");
    assert!(matches!(result, Err(Error::Json(_))));
}

// ── Manuscripts ──

#[test]
fn test_manuscripts_skip_missing_and_empty() {
    let table = ReferenceTable::from_json_str(TABLE).unwrap();

    let notes = table.lookup("Domingo", 1).unwrap().manuscripts();
    assert_eq!(
        notes,
        vec![
            ("Harleianus", "Favorável para pedir favores a reis."),
            ("Gennadianus", "Bom para viagens."),
        ]
    );

    let notes = table.lookup("Domingo", 13).unwrap().manuscripts();
    assert_eq!(notes, vec![("Monacensis", "Bom para negócios.")]);
    assert!(!notes.iter().any(|(_, text)| *text == MISSING_TEXT));
}

// ── Lookup from a computed hour ──

#[test]
fn test_lookup_hour_uses_weekday_and_ordinal() {
    let table = ReferenceTable::from_json_str(TABLE).unwrap();
    let location = Arc::new(Location {
        latitude: 0.0,
        longitude: 0.0,
        city: None,
        state: None,
        country: None,
        timezone: chrono_tz::Tz::UTC,
    });
    let sun = SunTimes {
        sunrise: Utc.with_ymd_and_hms(2025, 1, 5, 6, 0, 0).unwrap(),
        sunset: Utc.with_ymd_and_hms(2025, 1, 5, 18, 0, 0).unwrap(),
    };
    let day = compute_day_table(&sun, date(2025, 1, 5), &location).unwrap();

    let row = table.lookup_hour(day.date, &day.hours[12]).unwrap();
    assert_eq!(row.hour_ordinal, "13ª");
    assert_eq!(row.planet, planet_name(day.hours[12].planet));

    assert!(table.lookup_hour(day.date, &day.hours[1]).is_none());
}

#[test]
fn test_load_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(TABLE.as_bytes()).unwrap();
    let table = ReferenceTable::load(file.path()).unwrap();
    assert_eq!(table.rows().len(), 4);
}

#[test]
fn test_load_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let result = ReferenceTable::load(dir.path().join("absent.json"));
    assert!(matches!(result, Err(Error::Io(_))));
}

// ── Display names ──

#[test]
fn test_ordinals() {
    assert_eq!(ordinal(1), "1ª");
    assert_eq!(ordinal(24), "24ª");
}

#[test]
fn test_day_names() {
    assert_eq!(day_name(Weekday::Sun), "Domingo");
    assert_eq!(day_name(Weekday::Sat), "Sábado");
    assert_eq!(classical_day_name(Weekday::Tue), "Dia de Marte");
}

#[test]
fn test_format_date() {
    assert_eq!(format_date(date(2025, 1, 5)), "Domingo, 5 de janeiro de 2025");
    assert_eq!(format_date(date(2024, 3, 15)), "Sexta-feira, 15 de março de 2024");
}

#[test]
fn test_headline() {
    assert_eq!(headline(date(2025, 1, 5), Planet::Venus), "Dia do Sol ☉, Hora de Vênus ♀");
    assert_eq!(headline(date(2025, 1, 6), Planet::Sun), "Dia da Lua ☾, Hora do Sol ☉");
}

#[test]
fn test_format_location() {
    let mut location = Location {
        latitude: -23.5505,
        longitude: -46.6333,
        city: Some("São Paulo".to_string()),
        state: Some("SP".to_string()),
        country: Some("Brasil".to_string()),
        timezone: chrono_tz::America::Sao_Paulo,
    };
    assert_eq!(format_location(Some(&location)), "São Paulo - SP");

    location.state = None;
    assert_eq!(format_location(Some(&location)), "São Paulo");

    location.city = None;
    assert_eq!(format_location(Some(&location)), "Cidade não identificada");

    assert_eq!(format_location(None), "Localização não detectada");
}
