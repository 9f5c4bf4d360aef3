use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use tokio::sync::{mpsc, watch};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::clock::Clock;
use crate::config::Config;
use crate::error::{Error, HoursError, LocationError, SunTimesError};
use crate::hours::hour_progress;
use crate::location::{resolve_location, suggest_locations, Detected, LocationSearch, TimeZoneResolver};
use crate::navigator::{HourNavigator, Navigation, NavigatorMode};
use crate::reference::ReferenceTable;
use crate::store::LocationStore;
use crate::sun_times::{FallbackPolicy, SeasonalEstimate, SunTimesProvider};
use crate::types::{Location, Place, PlanetaryHour, ReferenceRow, SunTimes};

#[derive(Debug, Clone, PartialEq)]
pub enum Status {
    Pending,
    Ready { approximate: bool },
    Failed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Navigate(Navigation),
    ChangeLocation(Place),
    Shutdown,
}

#[derive(Debug, Clone, PartialEq)]
pub struct View {
    pub status: Status,
    pub location: Option<Arc<Location>>,
    pub selected_date: Option<NaiveDate>,
    pub mode: Option<NavigatorMode>,
    pub hour: Option<PlanetaryHour>,
    pub progress: Option<f64>,
    pub reference: Option<ReferenceRow>,
    pub can_go_previous: bool,
    pub can_go_next: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LocationRequest {
    pub seq: u64,
    pub place: Place,
    pub timezone: Option<Tz>,
    pub persist: bool,
}

#[derive(Debug)]
pub enum SunFetch {
    Fetched(SunTimes),
    Failed(SunTimesError),
}

#[derive(Debug)]
pub struct LocationUpdate {
    pub seq: u64,
    pub persist: bool,
    pub result: Result<(Arc<Location>, SunFetch), LocationError>,
}

pub struct Session {
    config: Config,
    sun_provider: Arc<dyn SunTimesProvider>,
    resolver: Arc<dyn TimeZoneResolver>,
    clock: Arc<dyn Clock>,
    reference: ReferenceTable,
    store: Option<LocationStore>,
    navigator: Option<HourNavigator>,
    latest_request: u64,
    status: Status,
}

impl Session {
    pub fn new(
        config: Config,
        sun_provider: Arc<dyn SunTimesProvider>,
        resolver: Arc<dyn TimeZoneResolver>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            config,
            sun_provider,
            resolver,
            clock,
            reference: ReferenceTable::default(),
            store: None,
            navigator: None,
            latest_request: 0,
            status: Status::Pending,
        }
    }

    pub fn with_reference(mut self, reference: ReferenceTable) -> Self {
        self.reference = reference;
        self
    }

    pub fn with_store(mut self, store: LocationStore) -> Self {
        self.store = Some(store);
        self
    }

    pub fn status(&self) -> &Status {
        &self.status
    }

    pub fn navigator(&self) -> Option<&HourNavigator> {
        self.navigator.as_ref()
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub fn request_location(&mut self, place: Place, persist: bool) -> LocationRequest {
        self.latest_request += 1;
        LocationRequest {
            seq: self.latest_request,
            place,
            timezone: None,
            persist,
        }
    }

    pub fn request_detected(&mut self, detected: Detected) -> LocationRequest {
        let mut request = self.request_location(detected.place, false);
        request.timezone = detected.timezone;
        request
    }

    pub fn lookup(&self, request: LocationRequest) -> impl std::future::Future<Output = LocationUpdate> + Send + 'static {
        let resolver = Arc::clone(&self.resolver);
        let provider = Arc::clone(&self.sun_provider);
        let now = self.clock.now();
        async move {
            let LocationRequest {
                seq,
                place,
                timezone,
                persist,
            } = request;
            let joined = tokio::task::spawn_blocking(move || -> Result<(Arc<Location>, SunFetch), LocationError> {
                let location = match timezone {
                    Some(tz) => Location::from_place(place, tz),
                    None => resolve_location(place, resolver.as_ref())?,
                };
                let today = now.with_timezone(&location.timezone).date_naive();
                let fetch = match provider.sun_times(location.point(), today) {
                    Ok(sun) => SunFetch::Fetched(sun),
                    Err(err) => SunFetch::Failed(err),
                };
                Ok((Arc::new(location), fetch))
            })
            .await;
            let result = joined.unwrap_or_else(|e| Err(LocationError::Unavailable(e.to_string())));
            LocationUpdate { seq, persist, result }
        }
    }

    pub fn apply(&mut self, update: LocationUpdate) -> bool {
        if update.seq != self.latest_request {
            debug!(seq = update.seq, latest = self.latest_request, "dropping superseded lookup");
            return false;
        }

        let (location, fetch) = match update.result {
            Ok(resolved) => resolved,
            Err(err) => {
                warn!(error = %err, "location lookup failed");
                self.status = Status::Failed(err.to_string());
                return true;
            }
        };

        let now = self.clock.now();
        let (sun, approximate) = match fetch {
            SunFetch::Fetched(sun) => (sun, false),
            SunFetch::Failed(err) => {
                warn!(error = %err, policy = ?self.config.fallback, "sun times unavailable");
                match self.config.fallback {
                    FallbackPolicy::SeasonalEstimate => {
                        let today = now.with_timezone(&location.timezone).date_naive();
                        match SeasonalEstimate::new(location.timezone).sun_times(location.point(), today) {
                            Ok(sun) => (sun, true),
                            Err(err) => {
                                self.fail_or_pend(Error::from(err));
                                return true;
                            }
                        }
                    }
                    FallbackPolicy::Pending => {
                        self.fail_or_pend(Error::from(err));
                        return true;
                    }
                }
            }
        };

        match self.install(Arc::clone(&location), sun, now) {
            Ok(()) => {
                self.status = Status::Ready { approximate };
                if update.persist {
                    self.persist(&location);
                }
            }
            Err(err) => {
                warn!(error = %err, "cannot compute planetary hours");
                self.status = Status::Failed(err.to_string());
            }
        }
        true
    }

    fn install(&mut self, location: Arc<Location>, sun: SunTimes, now: DateTime<Utc>) -> Result<(), HoursError> {
        match self.navigator.as_mut() {
            Some(navigator) => navigator.on_location_resolved(location, sun, now),
            None => {
                self.navigator = Some(HourNavigator::new(location, sun, now)?);
                Ok(())
            }
        }
    }

    fn fail_or_pend(&mut self, err: Error) {
        self.status = if self.navigator.is_some() {
            Status::Failed(err.to_string())
        } else {
            Status::Pending
        };
    }

    fn persist(&self, location: &Location) {
        if let Some(store) = &self.store {
            if let Err(err) = store.save(location) {
                warn!(error = %err, "could not save location");
            }
        }
    }

    pub fn tick(&mut self) {
        let now = self.clock.now();
        if let Some(navigator) = self.navigator.as_mut() {
            navigator.on_tick(now);
        }
    }

    pub fn navigate(&mut self, navigation: Navigation) -> Result<(), HoursError> {
        let now = self.clock.now();
        match self.navigator.as_mut() {
            Some(navigator) => navigator.on_user_navigate(navigation, now),
            None => Ok(()),
        }
    }

    pub fn view(&self) -> View {
        let now = self.clock.now();
        let Some(navigator) = self.navigator.as_ref() else {
            return View {
                status: self.status.clone(),
                location: None,
                selected_date: None,
                mode: None,
                hour: None,
                progress: None,
                reference: None,
                can_go_previous: false,
                can_go_next: false,
            };
        };
        let state = navigator.state();
        let hour = navigator.current_hour().cloned();
        View {
            status: self.status.clone(),
            location: Some(Arc::clone(navigator.location())),
            selected_date: Some(state.selected_date),
            mode: Some(navigator.mode()),
            progress: hour.as_ref().map(|h| hour_progress(h, now)),
            reference: hour
                .as_ref()
                .and_then(|h| self.reference.lookup_hour(state.selected_date, h))
                .cloned(),
            hour,
            can_go_previous: navigator.can_go_previous(),
            can_go_next: navigator.can_go_next(),
        }
    }

    pub async fn run(mut self, mut commands: mpsc::Receiver<Command>, views: watch::Sender<View>) -> Self {
        let (updates_tx, mut updates_rx) = mpsc::channel::<LocationUpdate>(8);
        let mut ticker = tokio::time::interval(self.config.tick_interval());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        info!("session started");
        loop {
            tokio::select! {
                _ = ticker.tick() => self.tick(),
                command = commands.recv() => match command {
                    None | Some(Command::Shutdown) => break,
                    Some(Command::Navigate(navigation)) => {
                        if let Err(err) = self.navigate(navigation) {
                            warn!(error = %err, ?navigation, "navigation failed");
                        }
                    }
                    Some(Command::ChangeLocation(place)) => {
                        let request = self.request_location(place, true);
                        self.spawn_lookup(request, &updates_tx);
                    }
                },
                Some(update) = updates_rx.recv() => {
                    self.apply(update);
                }
            }
            views.send_replace(self.view());
        }
        info!("session stopped");
        self
    }

    pub fn spawn_lookup(&self, request: LocationRequest, updates: &mpsc::Sender<LocationUpdate>) {
        let lookup = self.lookup(request);
        let updates = updates.clone();
        tokio::spawn(async move {
            let update = lookup.await;
            if updates.send(update).await.is_err() {
                debug!("session gone before lookup finished");
            }
        });
    }
}

#[derive(Clone)]
pub struct Suggester {
    search: Arc<dyn LocationSearch>,
    debounce: Duration,
    latest: Arc<AtomicU64>,
}

impl Suggester {
    pub fn new(search: Arc<dyn LocationSearch>, debounce: Duration) -> Self {
        Self {
            search,
            debounce,
            latest: Arc::new(AtomicU64::new(0)),
        }
    }

    pub async fn suggest(&self, query: String) -> Option<Result<Vec<Place>, LocationError>> {
        let seq = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
        tokio::time::sleep(self.debounce).await;
        if self.latest.load(Ordering::SeqCst) != seq {
            return None;
        }

        let search = Arc::clone(&self.search);
        let result = tokio::task::spawn_blocking(move || suggest_locations(search.as_ref(), &query))
            .await
            .unwrap_or_else(|e| Err(LocationError::Unavailable(e.to_string())));

        if self.latest.load(Ordering::SeqCst) != seq {
            return None;
        }
        Some(result)
    }
}
