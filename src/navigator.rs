use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use tracing::{debug, info, warn};

use crate::error::HoursError;
use crate::hours::compute_day_table;
use crate::types::{DayTable, Location, PlanetaryHour, SunTimes};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigatorMode {
    AutoFollow,
    ManualPin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    Previous,
    Next,
    SelectDate(NaiveDate),
    ResetToNow,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NavigatorState {
    pub selected_date: NaiveDate,
    pub selected_hour_index: Option<usize>,
    pub is_manually_navigating: bool,
    pub day_table: DayTable,
}

impl NavigatorState {
    pub fn mode(&self) -> NavigatorMode {
        if self.is_manually_navigating {
            NavigatorMode::ManualPin
        } else {
            NavigatorMode::AutoFollow
        }
    }

    pub fn current_hour(&self) -> Option<&PlanetaryHour> {
        self.selected_hour_index.and_then(|i| self.day_table.get(i))
    }
}

#[derive(Debug, Clone)]
pub struct HourNavigator {
    location: Arc<Location>,
    sun: SunTimes,
    state: NavigatorState,
}

impl HourNavigator {
    pub fn new(location: Arc<Location>, sun: SunTimes, now: DateTime<Utc>) -> Result<Self, HoursError> {
        let today = local_date(&location, now);
        let day_table = compute_day_table(&sun, today, &location)?;
        let mut navigator = Self {
            location,
            sun,
            state: NavigatorState {
                selected_date: today,
                selected_hour_index: None,
                is_manually_navigating: false,
                day_table,
            },
        };
        navigator.reset_to_now(now);
        Ok(navigator)
    }

    pub fn state(&self) -> &NavigatorState {
        &self.state
    }

    pub fn location(&self) -> &Arc<Location> {
        &self.location
    }

    pub fn sun_times(&self) -> &SunTimes {
        &self.sun
    }

    pub fn mode(&self) -> NavigatorMode {
        self.state.mode()
    }

    pub fn current_hour(&self) -> Option<&PlanetaryHour> {
        self.state.current_hour()
    }

    pub fn today(&self, now: DateTime<Utc>) -> NaiveDate {
        local_date(&self.location, now)
    }

    pub fn can_go_previous(&self) -> bool {
        matches!(self.state.selected_hour_index, Some(i) if i > 0)
    }

    pub fn can_go_next(&self) -> bool {
        matches!(self.state.selected_hour_index, Some(i) if i + 1 < self.state.day_table.len())
    }

    pub fn on_tick(&mut self, now: DateTime<Utc>) {
        if self.state.is_manually_navigating {
            return;
        }
        match self.state.day_table.position_of(now) {
            Some(index) => {
                if self.state.selected_hour_index != Some(index) {
                    debug!(index, "live hour advanced");
                }
                self.state.selected_hour_index = Some(index);
            }
            // Rescanning an unmatched today repeats the same search.
            None if self.state.selected_hour_index.is_none() && self.state.selected_date == self.today(now) => {}
            None => {
                self.reset_to_now(now);
            }
        }
    }

    pub fn on_user_navigate(&mut self, navigation: Navigation, now: DateTime<Utc>) -> Result<(), HoursError> {
        match navigation {
            Navigation::Previous => {
                self.go_to_previous_hour();
            }
            Navigation::Next => {
                self.go_to_next_hour();
            }
            Navigation::SelectDate(date) => self.select_date(date, now)?,
            Navigation::ResetToNow => {
                self.reset_to_now(now);
            }
        }
        Ok(())
    }

    pub fn go_to_previous_hour(&mut self) -> bool {
        if !self.can_go_previous() {
            return false;
        }
        if let Some(index) = self.state.selected_hour_index.as_mut() {
            *index -= 1;
        }
        self.state.is_manually_navigating = true;
        true
    }

    pub fn go_to_next_hour(&mut self) -> bool {
        if !self.can_go_next() {
            return false;
        }
        if let Some(index) = self.state.selected_hour_index.as_mut() {
            *index += 1;
        }
        self.state.is_manually_navigating = true;
        true
    }

    pub fn select_date(&mut self, date: NaiveDate, now: DateTime<Utc>) -> Result<(), HoursError> {
        let day_table = compute_day_table(&self.sun, date, &self.location)?;
        if date == self.today(now) {
            self.state = NavigatorState {
                selected_date: date,
                selected_hour_index: None,
                is_manually_navigating: false,
                day_table,
            };
            self.on_tick(now);
        } else {
            self.state = NavigatorState {
                selected_date: date,
                selected_hour_index: Some(0),
                is_manually_navigating: true,
                day_table,
            };
        }
        debug!(%date, mode = ?self.state.mode(), "date selected");
        Ok(())
    }

    pub fn reset_to_now(&mut self, now: DateTime<Utc>) -> Option<usize> {
        let today = self.today(now);
        let candidates = [today.pred_opt(), Some(today), today.succ_opt()];

        for date in candidates.into_iter().flatten() {
            match compute_day_table(&self.sun, date, &self.location) {
                Ok(day_table) => {
                    if let Some(index) = day_table.position_of(now) {
                        self.state = NavigatorState {
                            selected_date: date,
                            selected_hour_index: Some(index),
                            is_manually_navigating: false,
                            day_table,
                        };
                        debug!(%date, index, "reset to live hour");
                        return Some(index);
                    }
                }
                Err(err) => warn!(%date, error = %err, "skipping candidate day"),
            }
        }

        warn!(%now, "no planetary hour contains the current instant");
        self.state.selected_date = today;
        self.state.selected_hour_index = None;
        self.state.is_manually_navigating = false;
        if let Ok(day_table) = compute_day_table(&self.sun, today, &self.location) {
            self.state.day_table = day_table;
        }
        None
    }

    pub fn on_location_resolved(
        &mut self,
        location: Arc<Location>,
        sun: SunTimes,
        now: DateTime<Utc>,
    ) -> Result<(), HoursError> {
        let today = local_date(&location, now);
        compute_day_table(&sun, today, &location)?;
        info!(
            city = location.city.as_deref().unwrap_or("-"),
            zone = %location.timezone,
            "location changed"
        );
        self.location = location;
        self.sun = sun;
        self.reset_to_now(now);
        Ok(())
    }

    pub fn on_sun_times(&mut self, sun: SunTimes, now: DateTime<Utc>) -> Result<(), HoursError> {
        let day_table = compute_day_table(&sun, self.state.selected_date, &self.location)?;
        self.sun = sun;
        if self.state.is_manually_navigating {
            let last = day_table.len().saturating_sub(1);
            self.state.selected_hour_index = self.state.selected_hour_index.map(|i| i.min(last));
            self.state.day_table = day_table;
        } else {
            self.reset_to_now(now);
        }
        Ok(())
    }
}

fn local_date(location: &Location, now: DateTime<Utc>) -> NaiveDate {
    now.with_timezone(&location.timezone).date_naive()
}
