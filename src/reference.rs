use std::collections::HashMap;
use std::fs;
use std::path::Path;

use chrono::{Datelike, NaiveDate};
use tracing::debug;

use crate::error::Result;
use crate::names::{day_name, ordinal};
use crate::types::{PlanetaryHour, ReferenceRow};

pub const MISSING_TEXT: &str = "(Missing)";

impl ReferenceRow {
    pub fn manuscripts(&self) -> Vec<(&'static str, &str)> {
        [
            ("Harleianus", self.harleianus.as_str()),
            ("Monacensis", self.monacensis.as_str()),
            ("Gennadianus", self.gennadianus.as_str()),
        ]
        .into_iter()
        .filter(|(_, text)| !text.trim().is_empty() && *text != MISSING_TEXT)
        .collect()
    }
}

#[derive(Debug, Clone, Default)]
pub struct ReferenceTable {
    rows: Vec<ReferenceRow>,
    index: HashMap<(String, String), usize>,
}

impl ReferenceTable {
    pub fn new(rows: Vec<ReferenceRow>) -> Self {
        let mut index = HashMap::with_capacity(rows.len());
        for (i, row) in rows.iter().enumerate() {
            index
                .entry((row.day_name.clone(), row.hour_ordinal.clone()))
                .or_insert(i);
        }
        Self { rows, index }
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let rows: Vec<ReferenceRow> = serde_json::from_str(json)?;
        Ok(Self::new(rows))
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)?;
        let table = Self::from_json_str(&json)?;
        debug!(path = %path.display(), rows = table.len(), "loaded reference table");
        Ok(table)
    }

    pub fn rows(&self) -> &[ReferenceRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn lookup(&self, day_name: &str, hour_number: u8) -> Option<&ReferenceRow> {
        let key = (day_name.to_string(), ordinal(hour_number));
        self.index.get(&key).map(|&i| &self.rows[i])
    }

    pub fn lookup_hour(&self, date: NaiveDate, hour: &PlanetaryHour) -> Option<&ReferenceRow> {
        self.lookup(day_name(date.weekday()), hour.hour_number)
    }
}
