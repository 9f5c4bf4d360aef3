use std::path::PathBuf;
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use chrono_tz::Tz;
use clap::{Args, Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::{mpsc, watch};
use tracing_subscriber::EnvFilter;

use planetary_hours::names::{format_date, format_location, headline, ordinal, planet_name, planet_symbol};
use planetary_hours::{
    compute_day_table, detect_location, search_location, BoundaryTimeZone, Command, Config,
    DayTable, DeclinationEstimate, Detected, FallbackPolicy, HourNavigator, Location,
    LocationSource, LocationStore, Navigation, Place, PlaceIndex, PlanetaryHour, ReferenceTable,
    Result, SeasonalEstimate, Session, Status, Suggester, SunTimes, SunTimesProvider, SystemClock,
    TimeZoneResolver, View,
};

#[derive(Parser)]
#[command(name = "planetary-hours", version, about = "Planetary hours for a location")]
struct Cli {
    /// TOML configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// JSON manuscript reference table (overrides the config).
    #[arg(long, global = true)]
    reference: Option<PathBuf>,

    /// JSON array of places for `s` and `?` in watch mode (overrides the config).
    #[arg(long, global = true)]
    gazetteer: Option<PathBuf>,

    /// Print JSON instead of text.
    #[arg(long, global = true)]
    json: bool,

    #[command(flatten)]
    place: PlaceArgs,

    #[command(subcommand)]
    command: Cmd,
}

#[derive(Args)]
struct PlaceArgs {
    #[arg(long, global = true, allow_hyphen_values = true)]
    lat: Option<f64>,

    #[arg(long, global = true, allow_hyphen_values = true)]
    lon: Option<f64>,

    /// IANA zone of --lat/--lon, e.g. America/Sao_Paulo. Looked up from the coordinates when omitted.
    #[arg(long, global = true, value_parser = parse_tz)]
    tz: Option<Tz>,

    #[arg(long, global = true)]
    city: Option<String>,

    #[arg(long, global = true)]
    state: Option<String>,
}

#[derive(Subcommand)]
enum Cmd {
    /// Print all 24 hours of a day.
    Table {
        /// Civil date, YYYY-MM-DD. Defaults to today.
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Print the hour in effect now.
    Now,
    /// Follow the live hour. Reads p/n/r/d DATE/l LAT LON/s NAME/? NAME/q from stdin.
    Watch,
}

fn parse_tz(value: &str) -> std::result::Result<Tz, String> {
    value.parse::<Tz>().map_err(|_| format!("unknown time zone: {value}"))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("planetary_hours=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    if let Some(path) = &cli.reference {
        config.reference_table = Some(path.clone());
    }
    let reference = match &config.reference_table {
        Some(path) => ReferenceTable::load(path)?,
        None => ReferenceTable::default(),
    };

    if let Some(path) = &cli.gazetteer {
        config.gazetteer = Some(path.clone());
    }
    let gazetteer = match &config.gazetteer {
        Some(path) => PlaceIndex::load(path)?,
        None => PlaceIndex::default(),
    };

    let resolver: Arc<dyn TimeZoneResolver> = Arc::new(BoundaryTimeZone);
    let store = LocationStore::new(&config.state_dir);

    match cli.command {
        Cmd::Table { date } => {
            let location = Arc::new(startup_location(&cli.place, &config, &store, resolver.as_ref())?);
            let date = date.unwrap_or_else(|| Utc::now().with_timezone(&location.timezone).date_naive());
            let sun = sun_times_for(&location, date, config.fallback)?;
            let table = compute_day_table(&sun, date, &location)?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&table)?);
            } else {
                print_table(&table, &location);
            }
        }
        Cmd::Now => {
            let location = Arc::new(startup_location(&cli.place, &config, &store, resolver.as_ref())?);
            let now = Utc::now();
            let today = now.with_timezone(&location.timezone).date_naive();
            let sun = sun_times_for(&location, today, config.fallback)?;
            let mut navigator = HourNavigator::new(Arc::clone(&location), sun, now)?;
            navigator.on_tick(now);
            match navigator.current_hour() {
                Some(hour) if cli.json => println!("{}", serde_json::to_string_pretty(hour)?),
                Some(hour) => {
                    let date = navigator.state().selected_date;
                    println!("{}", format_date(date));
                    println!("{}", format_location(Some(&location)));
                    println!("{}", headline(date, hour.planet));
                    println!("{}", hour_line(hour));
                    if let Some(row) = reference.lookup_hour(date, hour) {
                        for (name, text) in row.manuscripts() {
                            println!("  {name}: {text}");
                        }
                    }
                }
                None => println!("No planetary hour covers the current instant."),
            }
        }
        Cmd::Watch => watch_hours(cli.place, config, reference, gazetteer, store, resolver).await?,
    }
    Ok(())
}

// Command-line coordinates, else the saved location, else the configured default.
fn startup_detected(args: &PlaceArgs, config: &Config, store: &LocationStore) -> Detected {
    match place_from_args(args) {
        Some(place) => Detected {
            place,
            timezone: args.tz,
            source: LocationSource::Manual,
        },
        None => {
            let saved = store.load_or_none();
            detect_location(saved.as_ref(), None, None, &config.default_location)
        }
    }
}

fn startup_location(
    args: &PlaceArgs,
    config: &Config,
    store: &LocationStore,
    resolver: &dyn TimeZoneResolver,
) -> Result<Location> {
    Ok(startup_detected(args, config, store).into_location(resolver)?)
}

fn place_from_args(args: &PlaceArgs) -> Option<Place> {
    Some(Place {
        latitude: args.lat?,
        longitude: args.lon?,
        city: args.city.clone(),
        state: args.state.clone(),
        country: None,
    })
}

fn sun_times_for(location: &Location, date: NaiveDate, fallback: FallbackPolicy) -> Result<SunTimes> {
    match DeclinationEstimate.sun_times(location.point(), date) {
        Ok(sun) => Ok(sun),
        Err(err) if fallback == FallbackPolicy::SeasonalEstimate => {
            tracing::warn!(error = %err, "using seasonal estimate");
            Ok(SeasonalEstimate::new(location.timezone).sun_times(location.point(), date)?)
        }
        Err(err) => Err(err.into()),
    }
}

fn hour_line(hour: &PlanetaryHour) -> String {
    format!(
        "{} hora ({} - {})  {} {}",
        ordinal(hour.hour_number),
        hour.start.format("%H:%M"),
        hour.end.format("%H:%M"),
        planet_name(hour.planet),
        planet_symbol(hour.planet)
    )
}

fn print_table(table: &DayTable, location: &Location) {
    println!("{}", format_date(table.date));
    println!("{}", format_location(Some(location)));
    println!();
    for hour in &table.hours {
        println!("{}", hour_line(hour));
    }
}

async fn watch_hours(
    args: PlaceArgs,
    config: Config,
    reference: ReferenceTable,
    gazetteer: PlaceIndex,
    store: LocationStore,
    resolver: Arc<dyn TimeZoneResolver>,
) -> Result<()> {
    let startup = startup_detected(&args, &config, &store);
    let gazetteer = Arc::new(gazetteer);
    let suggester = Suggester::new(gazetteer.clone(), config.suggest_debounce());

    let mut session = Session::new(
        config,
        Arc::new(DeclinationEstimate),
        resolver,
        Arc::new(SystemClock),
    )
    .with_reference(reference)
    .with_store(store);

    let request = session.request_detected(startup);
    let update = session.lookup(request).await;
    session.apply(update);

    let (command_tx, command_rx) = mpsc::channel(16);
    let (view_tx, mut view_rx) = watch::channel(session.view());
    let runner = tokio::spawn(session.run(command_rx, view_tx));

    let input_tx = command_tx.clone();
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            let line = line.trim();
            if let Some(query) = line.strip_prefix("? ") {
                print_suggestions(&suggester, query).await;
                continue;
            }
            let command = match line.strip_prefix("s ") {
                Some(query) => match search_location(gazetteer.as_ref(), query) {
                    Ok(place) => Command::ChangeLocation(place),
                    Err(err) => {
                        eprintln!("{err}");
                        continue;
                    }
                },
                None => match parse_command(line) {
                    Some(command) => command,
                    None => {
                        eprintln!("commands: p, n, r, d YYYY-MM-DD, l LAT LON, s NAME, ? NAME, q");
                        continue;
                    }
                },
            };
            let quit = command == Command::Shutdown;
            if input_tx.send(command).await.is_err() || quit {
                break;
            }
        }
    });

    let ctrl_c_tx = command_tx.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() && ctrl_c_tx.send(Command::Shutdown).await.is_err() {
            tracing::debug!("session already stopped");
        }
    });
    drop(command_tx);

    let mut last_line = String::new();
    while view_rx.changed().await.is_ok() {
        let line = describe(&view_rx.borrow_and_update());
        if line != last_line {
            println!("{line}");
            last_line = line;
        }
    }

    if let Err(err) = runner.await {
        tracing::warn!(error = %err, "session task failed");
    }
    Ok(())
}

async fn print_suggestions(suggester: &Suggester, query: &str) {
    match suggester.suggest(query.to_string()).await {
        Some(Ok(places)) if places.is_empty() => eprintln!("no matches for {query}"),
        Some(Ok(places)) => {
            for place in places {
                eprintln!(
                    "  {} ({:.4}, {:.4})",
                    [place.city.as_deref(), place.state.as_deref(), place.country.as_deref()]
                        .into_iter()
                        .flatten()
                        .collect::<Vec<_>>()
                        .join(", "),
                    place.latitude,
                    place.longitude
                );
            }
        }
        Some(Err(err)) => eprintln!("{err}"),
        None => {}
    }
}

fn parse_command(line: &str) -> Option<Command> {
    let mut parts = line.split_whitespace();
    let command = match parts.next()? {
        "p" => Command::Navigate(Navigation::Previous),
        "n" => Command::Navigate(Navigation::Next),
        "r" => Command::Navigate(Navigation::ResetToNow),
        "d" => Command::Navigate(Navigation::SelectDate(parts.next()?.parse().ok()?)),
        "l" => {
            let latitude = parts.next()?.parse().ok()?;
            let longitude = parts.next()?.parse().ok()?;
            Command::ChangeLocation(Place {
                latitude,
                longitude,
                city: None,
                state: None,
                country: None,
            })
        }
        "q" => Command::Shutdown,
        _ => return None,
    };
    Some(command)
}

fn describe(view: &View) -> String {
    match (&view.status, &view.hour, view.selected_date) {
        (Status::Pending, _, _) => "waiting for location...".to_string(),
        (status, Some(hour), Some(date)) => {
            let mut line = format!(
                "{} | {} | {} | {}",
                format_location(view.location.as_deref()),
                headline(date, hour.planet),
                hour_line(hour),
                format_date(date)
            );
            if let Status::Failed(reason) = status {
                line.push_str(&format!(" (error: {reason})"));
            }
            if matches!(status, Status::Ready { approximate: true }) {
                line.push_str(" (approximate)");
            }
            line
        }
        (Status::Failed(reason), None, _) => format!("error: {reason}"),
        _ => "no planetary hour covers the current instant".to_string(),
    }
}
