pub mod models {
    pub mod household;
    pub mod requests;
    pub mod rows;
}

pub mod api {
    pub mod error;
    pub mod home_services;
    pub mod houses;
    pub mod locations;
    pub mod paint_records;
    pub mod plants;
    pub mod reference;
    pub mod reminders;
}

pub mod cache;
pub mod client;
pub mod config;
pub mod schema;
pub mod session;
pub mod store;
pub mod utils;
pub mod views;
pub mod services {
    pub mod seed;
}

use crate::api::error::ApiError;
use crate::cache::EntityKind;
use crate::client::RestStore;
use crate::config::Config;
use crate::models::household::*;
use crate::models::requests::*;
use crate::session::{HouseSession, SessionError};
use crate::views::{Dashboard, ListState, NO_HOUSE_SELECTED, PageRow, Route};
use chrono::{Local, NaiveDate};
use diesel::PgConnection;
use diesel::prelude::*;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use log::{error, info};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};

#[derive(Debug)]
struct LoadedEnvFile {
    path: PathBuf,
    explicit: bool,
}

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

const USAGE: &str = "usage: household [--env-file PATH] [--json] <command>

commands:
  migrate                          apply schema migrations to DATABASE_URL
  houses                           list houses
  dashboard                        upcoming items and recent updates
  list <page>                      paint-records | home-services | plant-inventory | house-reminders | rooms
  options                          reference data and select options
  create <kind> <json>             create a house, room, paint record, service, plant or reminder
  update <kind> <id> <json>        partial update
  delete <kind> <id> [--yes]       delete after confirmation
  complete-reminder <id>           mark a reminder as done
  seed                             create a demo house with records";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Migrate,
    Houses,
    Dashboard,
    List(EntityKind),
    Options,
    Create { kind: EntityKind, json: String },
    Update { kind: EntityKind, id: String, json: String },
    Delete { kind: EntityKind, id: String, confirmed: bool },
    CompleteReminder(String),
    Seed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Cli {
    env_file: Option<PathBuf>,
    json: bool,
    command: Command,
}

fn apply_database_migrations(conn: &mut PgConnection) -> Result<(), String> {
    match conn.run_pending_migrations(MIGRATIONS) {
        Ok(applied) => {
            if applied.is_empty() {
                info!("Database schema is up to date; no migrations were applied");
            } else {
                let names = applied.iter().map(|v| v.to_string()).collect::<Vec<_>>().join(", ");
                info!("Applied {} database migration(s): {}", applied.len(), names);
            }
            Ok(())
        }
        Err(e) => Err(format!("Applying database migrations failed: {}", e)),
    }
}

fn migrate() -> Result<String, String> {
    let mut conn =
        PgConnection::establish(&config::database_url()).map_err(|e| format!("DB connection failed: {}", e))?;
    info!("Connected to database");
    apply_database_migrations(&mut conn)?;
    Ok("Database schema is up to date.\n".to_string())
}

fn run(cli: Cli) -> Result<String, String> {
    if cli.command == Command::Migrate {
        return migrate();
    }

    let cfg = Config::from_env()?;
    info!(
        "Config loaded (store={}, timeout={}s, house={})",
        cfg.store_url,
        cfg.request_timeout.as_secs(),
        cfg.house.as_ref().map(|h| h.to_string()).unwrap_or_else(|| "-".to_string())
    );

    let store = RestStore::new(&cfg.store_url, &cfg.store_key, cfg.request_timeout);
    let mut session = HouseSession::new(&store);
    session
        .load_houses()
        .map_err(|e| format!("loading houses failed: {}", e))?;
    if let Some(id) = &cfg.house {
        session.select(id).map_err(|e| e.to_string())?;
    }

    execute(&mut session, cli.command, cli.json, Local::now().date_naive())
}

fn execute(session: &mut HouseSession<'_>, command: Command, json: bool, today: NaiveDate) -> Result<String, String> {
    match command {
        Command::Migrate => migrate(),
        Command::Houses if session.is_loading() && !json => {
            Ok(views::render_list::<House>("Houses", "", &ListState::Loading))
        }
        Command::Houses => {
            let houses = session.houses().to_vec();
            show_list("Houses", "No houses yet. Create one to get started.", houses, json)
        }
        Command::Dashboard => dashboard(session, today),
        Command::List(kind) => list(session, kind, json),
        Command::Options => options(session, json),
        Command::Create { kind, json: payload } => create(session, kind, &payload, json),
        Command::Update { kind, id, json: payload } => update(session, kind, &id, &payload, json),
        Command::Delete { kind, id, confirmed } => delete(session, kind, &id, confirmed),
        Command::CompleteReminder(id) => {
            let reminder = session
                .complete_reminder(&ReminderId(id))
                .map_err(|e| save_error(EntityKind::Reminders, e))?;
            show_one(&reminder, json)
        }
        Command::Seed => {
            let summary = services::seed::run(session, today)?;
            Ok(format!(
                "Seeded {} room(s), {} paint record(s), {} service(s), {} plant(s), {} reminder(s).\n",
                summary.rooms, summary.paint_records, summary.home_services, summary.plants, summary.reminders
            ))
        }
    }
}

// =====================
// Output helpers
// =====================

fn to_json<T: Serialize>(value: &T) -> Result<String, String> {
    serde_json::to_string_pretty(value)
        .map(|s| s + "\n")
        .map_err(|e| format!("serializing output failed: {}", e))
}

fn show_list<T: PageRow + Serialize>(title: &str, empty: &str, rows: Vec<T>, json: bool) -> Result<String, String> {
    if json {
        return to_json(&rows);
    }
    Ok(views::render_list(title, empty, &ListState::from_rows(rows)))
}

fn show_one<T: PageRow + Serialize>(row: &T, json: bool) -> Result<String, String> {
    if json {
        return to_json(row);
    }
    Ok(views::render_table(T::headers(), &[row.cells()]))
}

fn page_text(kind: EntityKind) -> (&'static str, &'static str) {
    let route = Route::ALL.into_iter().find(|r| r.kind() == Some(kind));
    match (kind, route) {
        (_, Some(route)) => (route.title(), route.empty_message()),
        (EntityKind::Locations, None) => ("Rooms", "No rooms"),
        _ => ("Houses", "No houses yet. Create one to get started."),
    }
}

fn read_error(err: SessionError) -> String {
    match err {
        SessionError::NoHouseSelected => NO_HOUSE_SELECTED.to_string(),
        other => other.to_string(),
    }
}

/// Validation and location problems are shown as-is; anything else is logged
/// and replaced by the generic failure text.
fn save_error(kind: EntityKind, err: SessionError) -> String {
    match err {
        SessionError::NoHouseSelected => NO_HOUSE_SELECTED.to_string(),
        SessionError::Api(ApiError::Validation(v)) => v.to_string(),
        SessionError::Api(ApiError::InvalidLocation) => ApiError::InvalidLocation.to_string(),
        other => {
            error!("Saving {} failed: {}", kind, other);
            views::save_failure(kind)
        }
    }
}

fn parse_payload<T: DeserializeOwned>(payload: &str) -> Result<T, String> {
    let mut de = serde_json::Deserializer::from_str(payload);
    serde_path_to_error::deserialize(&mut de).map_err(|e| format!("invalid payload at {}: {}", e.path(), e.inner()))
}

// =====================
// Commands
// =====================

fn list(session: &mut HouseSession<'_>, kind: EntityKind, json: bool) -> Result<String, String> {
    let (title, empty) = page_text(kind);
    if session.current().is_none() && kind != EntityKind::Houses {
        return Ok(format!("{}\n\n{}\n", title, NO_HOUSE_SELECTED));
    }
    match kind {
        EntityKind::Houses => show_list(title, empty, session.houses().to_vec(), json),
        EntityKind::Locations => show_list(title, empty, session.locations().map_err(read_error)?, json),
        EntityKind::PaintRecords => show_list(title, empty, session.paint_records().map_err(read_error)?, json),
        EntityKind::HomeServices => show_list(title, empty, session.home_services().map_err(read_error)?, json),
        EntityKind::Plants => show_list(title, empty, session.plants().map_err(read_error)?, json),
        EntityKind::Reminders => show_list(title, empty, session.reminders().map_err(read_error)?, json),
        other => Err(format!("{} is reference data; see `household options`", other)),
    }
}

fn dashboard(session: &mut HouseSession<'_>, today: NaiveDate) -> Result<String, String> {
    let Some(house) = session.current().cloned() else {
        return Ok(format!("{}\n\n{}\n", Route::Dashboard.title(), NO_HOUSE_SELECTED));
    };
    let paint = session.paint_records().map_err(read_error)?;
    let services = session.home_services().map_err(read_error)?;
    let plants = session.plants().map_err(read_error)?;
    let reminders = session.reminders().map_err(read_error)?;
    Ok(Dashboard::build(today, &paint, &services, &plants, &reminders).render(&house))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Options {
    paint_manufacturers: Vec<SelectOption>,
    service_types: Vec<SelectOption>,
    recurrences: Vec<SelectOption>,
    plant_types: Vec<SelectOption>,
    sun_requirements: Vec<SelectOption>,
}

fn options(session: &mut HouseSession<'_>, json: bool) -> Result<String, String> {
    let option = |value: &str, label: &str| SelectOption {
        value: value.to_string(),
        label: label.to_string(),
    };
    let options = Options {
        paint_manufacturers: session
            .manufacturers()
            .map_err(read_error)?
            .iter()
            .map(|m| option(m.id.as_str(), &m.name))
            .collect(),
        service_types: session
            .service_types()
            .map_err(read_error)?
            .iter()
            .map(|s| option(s.id.as_str(), &s.name))
            .collect(),
        recurrences: session
            .recurrences()
            .map_err(read_error)?
            .iter()
            .map(|r| option(r.id.as_str(), &r.name))
            .collect(),
        plant_types: session.plant_type_options().map_err(read_error)?,
        sun_requirements: session.sun_options().map_err(read_error)?,
    };
    if json {
        return to_json(&options);
    }

    let sections = [
        ("Paint manufacturers", &options.paint_manufacturers),
        ("Service types", &options.service_types),
        ("Recurrences", &options.recurrences),
        ("Plant types", &options.plant_types),
        ("Sun requirements", &options.sun_requirements),
    ];
    let mut out = String::new();
    for (title, items) in sections {
        let rows = items
            .iter()
            .map(|o| vec![o.value.clone(), o.label.clone()])
            .collect::<Vec<_>>();
        out.push_str(title);
        out.push('\n');
        if rows.is_empty() {
            out.push_str("  (none)\n");
        } else {
            out.push_str(&views::render_table(&["Value", "Label"], &rows));
        }
        out.push('\n');
    }
    Ok(out)
}

fn create(session: &mut HouseSession<'_>, kind: EntityKind, payload: &str, json: bool) -> Result<String, String> {
    let fail = |e| save_error(kind, e);
    match kind {
        EntityKind::Houses => show_one(&session.create_house(&parse_payload(payload)?).map_err(fail)?, json),
        EntityKind::Locations => show_one(&session.create_location(parse_payload(payload)?).map_err(fail)?, json),
        EntityKind::PaintRecords => {
            show_one(&session.create_paint_record(parse_payload(payload)?).map_err(fail)?, json)
        }
        EntityKind::HomeServices => {
            show_one(&session.create_home_service(parse_payload(payload)?).map_err(fail)?, json)
        }
        EntityKind::Plants => show_one(&session.create_plant(parse_payload(payload)?).map_err(fail)?, json),
        EntityKind::Reminders => show_one(&session.create_reminder(parse_payload(payload)?).map_err(fail)?, json),
        other => Err(format!("{} rows are managed by migrations", other)),
    }
}

fn update(
    session: &mut HouseSession<'_>,
    kind: EntityKind,
    id: &str,
    payload: &str,
    json: bool,
) -> Result<String, String> {
    let fail = |e| save_error(kind, e);
    match kind {
        EntityKind::Houses => {
            let changes: HouseChanges = parse_payload(payload)?;
            show_one(&session.update_house(&HouseId::from(id), &changes).map_err(fail)?, json)
        }
        EntityKind::PaintRecords => {
            let changes: PaintRecordChanges = parse_payload(payload)?;
            show_one(
                &session.update_paint_record(&PaintRecordId::from(id), &changes).map_err(fail)?,
                json,
            )
        }
        EntityKind::HomeServices => {
            let changes: HomeServiceChanges = parse_payload(payload)?;
            show_one(
                &session.update_home_service(&HomeServiceId::from(id), &changes).map_err(fail)?,
                json,
            )
        }
        EntityKind::Plants => {
            let changes: PlantChanges = parse_payload(payload)?;
            show_one(&session.update_plant(&PlantId::from(id), &changes).map_err(fail)?, json)
        }
        EntityKind::Reminders => {
            let changes: ReminderChanges = parse_payload(payload)?;
            show_one(&session.update_reminder(&ReminderId::from(id), &changes).map_err(fail)?, json)
        }
        other => Err(format!("{} rows cannot be updated", other)),
    }
}

fn describe_row<T: PageRow>(rows: Vec<T>, matches: impl Fn(&T) -> bool) -> Option<String> {
    rows.iter().find(|r| matches(r)).map(PageRow::describe)
}

fn delete(session: &mut HouseSession<'_>, kind: EntityKind, id: &str, confirmed: bool) -> Result<String, String> {
    let name = match kind {
        EntityKind::Houses => describe_row(session.houses().to_vec(), |h| h.id.as_str() == id),
        EntityKind::PaintRecords => describe_row(session.paint_records().map_err(read_error)?, |r| r.id.as_str() == id),
        EntityKind::HomeServices => describe_row(session.home_services().map_err(read_error)?, |s| s.id.as_str() == id),
        EntityKind::Plants => describe_row(session.plants().map_err(read_error)?, |p| p.id.as_str() == id),
        EntityKind::Reminders => describe_row(session.reminders().map_err(read_error)?, |r| r.id.as_str() == id),
        other => return Err(format!("{} rows cannot be deleted", other)),
    };
    let name = name.ok_or_else(|| format!("No {} with id {}", kind, id))?;

    let prompt = views::delete_prompt(kind, &name);
    if !confirmed {
        return Ok(format!("{}\nRe-run with --yes to confirm.\n", prompt));
    }

    let result = match kind {
        EntityKind::Houses => session.delete_house(&HouseId::from(id)),
        EntityKind::PaintRecords => session.delete_paint_record(&PaintRecordId::from(id)),
        EntityKind::HomeServices => session.delete_home_service(&HomeServiceId::from(id)),
        EntityKind::Plants => session.delete_plant(&PlantId::from(id)),
        _ => session.delete_reminder(&ReminderId::from(id)),
    };
    result.map_err(|e| {
        error!("Deleting {} {} failed: {}", kind, id, e);
        format!("Failed to delete {}. Please try again.", kind)
    })?;
    Ok(format!("Deleted {}.\n", name))
}

// =====================
// Command line and environment
// =====================

fn parse_kind(name: &str) -> Result<EntityKind, String> {
    EntityKind::from_name(name).ok_or_else(|| format!("unknown kind: {}", name))
}

fn parse_cli(args: impl IntoIterator<Item = String>) -> Result<Cli, String> {
    let mut args = args.into_iter();
    let mut env_file: Option<PathBuf> = None;
    let mut json = false;
    let mut yes = false;
    let mut positional = Vec::new();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--env-file" => {
                if env_file.is_some() {
                    return Err("`--env-file` provided more than once".to_string());
                }
                let value = args
                    .next()
                    .ok_or_else(|| "`--env-file` requires a path argument".to_string())?;
                env_file = Some(PathBuf::from(value));
            }
            s if s.starts_with("--env-file=") => {
                if env_file.is_some() {
                    return Err("`--env-file` provided more than once".to_string());
                }
                let path_str = &s["--env-file=".len()..];
                if path_str.is_empty() {
                    return Err("`--env-file` requires a path argument".to_string());
                }
                env_file = Some(PathBuf::from(path_str));
            }
            "--json" => json = true,
            "--yes" | "-y" => yes = true,
            "--" => {
                positional.extend(args.by_ref());
                break;
            }
            s if s.starts_with("--") => return Err(format!("unrecognised argument: {}", s)),
            _ => positional.push(arg.clone()),
        }
    }

    let words = positional.iter().map(String::as_str).collect::<Vec<_>>();
    let command = match words.as_slice() {
        ["migrate"] => Command::Migrate,
        ["houses"] => Command::Houses,
        ["dashboard"] | [] => Command::Dashboard,
        ["list", page] => {
            let kind = Route::from_path(page)
                .and_then(Route::kind)
                .or_else(|| EntityKind::from_name(page))
                .ok_or_else(|| format!("unknown page: {}", page))?;
            Command::List(kind)
        }
        ["options"] => Command::Options,
        ["create", kind, payload] => Command::Create {
            kind: parse_kind(kind)?,
            json: payload.to_string(),
        },
        ["update", kind, id, payload] => Command::Update {
            kind: parse_kind(kind)?,
            id: id.to_string(),
            json: payload.to_string(),
        },
        ["delete", kind, id] => Command::Delete {
            kind: parse_kind(kind)?,
            id: id.to_string(),
            confirmed: yes,
        },
        ["complete-reminder", id] => Command::CompleteReminder(id.to_string()),
        ["seed"] => Command::Seed,
        _ => return Err(format!("unrecognised command: {}\n\n{}", positional.join(" "), USAGE)),
    };

    Ok(Cli { env_file, json, command })
}

fn load_env(cli: &Cli) -> Result<Option<LoadedEnvFile>, String> {
    if let Some(path) = &cli.env_file {
        if !path.is_file() {
            return Err(format!("env file not found: {}", path.display()));
        }
        load_env_file(path)?;
        Ok(Some(LoadedEnvFile {
            path: path.clone(),
            explicit: true,
        }))
    } else {
        let cwd = std::env::current_dir().map_err(|e| format!("unable to read current directory: {}", e))?;
        let default_path = cwd.join(".env");
        if default_path.is_file() {
            load_env_file(&default_path)?;
            Ok(Some(LoadedEnvFile {
                path: default_path,
                explicit: false,
            }))
        } else {
            Ok(None)
        }
    }
}

fn load_env_file(path: &Path) -> Result<(), String> {
    use std::fs::File;
    use std::io::{BufRead, BufReader};

    let file = File::open(path).map_err(|e| format!("failed to open {}: {}", path.display(), e))?;
    let reader = BufReader::new(file);

    for (index, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| format!("failed to read {} at line {}: {}", path.display(), index + 1, e))?;
        match parse_env_assignment(&line) {
            Ok(Some((key, value))) => {
                // Values already in the process environment win.
                if std::env::var_os(&key).is_none() {
                    // Updating process-level environment variables is unsafe on some targets.
                    unsafe {
                        std::env::set_var(key, value);
                    }
                }
            }
            Ok(None) => {}
            Err(e) => {
                return Err(format!("{}:{}: {}", path.display(), index + 1, e));
            }
        }
    }

    Ok(())
}

fn parse_env_assignment(line: &str) -> Result<Option<(String, String)>, String> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Ok(None);
    }

    let without_export = trimmed
        .strip_prefix("export ")
        .map(|s| s.trim_start())
        .unwrap_or(trimmed);

    let (key, value_part) = without_export
        .split_once('=')
        .ok_or_else(|| "missing '=' in assignment".to_string())?;
    let key = key.trim();

    if key.is_empty() {
        return Err("environment variable name cannot be empty".to_string());
    }
    if key.chars().any(|c| c.is_whitespace()) {
        return Err(format!("environment variable name contains whitespace: {}", key));
    }

    let value = parse_env_value(value_part)?;
    Ok(Some((key.to_string(), value)))
}

fn parse_env_value(raw: &str) -> Result<String, String> {
    let trimmed = raw.trim();
    if let Some(rest) = trimmed.strip_prefix('"') {
        parse_quoted(rest, '"', true)
    } else if let Some(rest) = trimmed.strip_prefix('\'') {
        parse_quoted(rest, '\'', false)
    } else {
        let value = trimmed.split('#').next().unwrap_or_default().trim_end();
        Ok(value.to_string())
    }
}

/// Read up to the closing `quote`; only double quotes honour backslash escapes.
fn parse_quoted(input: &str, quote: char, escapes: bool) -> Result<String, String> {
    let mut result = String::new();
    let mut chars = input.chars();
    let mut escape = false;

    while let Some(ch) = chars.next() {
        if escape {
            result.push(match ch {
                'n' => '\n',
                'r' => '\r',
                't' => '\t',
                other => other,
            });
            escape = false;
            continue;
        }
        if escapes && ch == '\\' {
            escape = true;
        } else if ch == quote {
            let remainder = chars.as_str().trim();
            return if remainder.is_empty() || remainder.starts_with('#') {
                Ok(result)
            } else {
                Err(format!("unexpected characters after closing {} quote", quote))
            };
        } else {
            result.push(ch);
        }
    }

    Err(format!("unterminated {}-quoted value", quote))
}

fn main() {
    let cli = match parse_cli(std::env::args().skip(1)) {
        Ok(cli) => cli,
        Err(err) => {
            eprintln!("fatal: {}", err);
            std::process::exit(2);
        }
    };
    let loaded_env = match load_env(&cli) {
        Ok(info) => info,
        Err(err) => {
            eprintln!("fatal: {}", err);
            std::process::exit(1);
        }
    };

    // Init logging after environment so RUST_LOG from .env is respected.
    let default_filter = env_logger::Env::default().default_filter_or("info");
    env_logger::Builder::from_env(default_filter)
        .format_timestamp_secs()
        .init();

    if let Some(info) = loaded_env.as_ref() {
        let origin = if info.explicit { "CLI-specified" } else { "default" };
        info!("Environment loaded from {} .env file: {}", origin, info.path.display());
    }

    info!(
        "household {} (git {}) starting",
        env!("CARGO_PKG_VERSION"),
        env!("BUILD_TIME_GIT_HASH")
    );
    match run(cli) {
        Ok(output) => print!("{}", output),
        Err(e) => {
            error!("fatal: {}", e);
            eprintln!("{}", e);
            std::process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::tables;
    use crate::store::memory::{MemoryStore, Op};
    use serde_json::json;

    const TS: &str = "2024-03-01T00:00:00.000Z";

    fn args(line: &str) -> Vec<String> {
        line.split_whitespace().map(str::to_string).collect()
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 4, 1).unwrap()
    }

    fn store_with_house() -> MemoryStore {
        let store = MemoryStore::with_reference_data();
        store.seed(
            tables::HOUSES,
            json!({ "id": "h1", "name": "Test House", "owners": [], "address": null, "created_at": TS, "updated_at": TS }),
        );
        store.seed(
            tables::LOCATIONS,
            json!({ "id": "l1", "name": "Living Room", "description": null, "house_id": "h1", "created_at": TS, "updated_at": TS }),
        );
        store
    }

    fn exec(store: &MemoryStore, command: Command) -> Result<String, String> {
        let mut session = HouseSession::new(store);
        session.load_houses().map_err(|e| e.to_string())?;
        execute(&mut session, command, false, today())
    }

    #[test]
    fn parses_commands_and_flags() {
        let cli = parse_cli(args("--env-file=.env.test --json list paint-records")).unwrap();
        assert_eq!(cli.env_file, Some(PathBuf::from(".env.test")));
        assert!(cli.json);
        assert_eq!(cli.command, Command::List(EntityKind::PaintRecords));

        let cli = parse_cli(args("delete plant p1 --yes")).unwrap();
        assert_eq!(
            cli.command,
            Command::Delete {
                kind: EntityKind::Plants,
                id: "p1".to_string(),
                confirmed: true
            }
        );

        assert_eq!(parse_cli(args("list /house-reminders")).unwrap().command, Command::List(EntityKind::Reminders));
        assert_eq!(parse_cli(Vec::new()).unwrap().command, Command::Dashboard);
    }

    #[test]
    fn rejects_bad_arguments() {
        assert!(parse_cli(args("--env-file")).unwrap_err().contains("requires a path"));
        assert!(parse_cli(args("--env-file=a --env-file=b")).unwrap_err().contains("more than once"));
        assert!(parse_cli(args("list garage")).unwrap_err().contains("unknown page"));
        assert!(parse_cli(args("create shed {}")).unwrap_err().contains("unknown kind"));
        assert!(parse_cli(args("--verbose")).unwrap_err().contains("unrecognised argument"));
    }

    #[test]
    fn env_assignments_follow_shell_quoting() {
        assert_eq!(parse_env_assignment("# comment").unwrap(), None);
        assert_eq!(
            parse_env_assignment("export HOUSEHOLD_STORE_URL=http://localhost:3000 # local").unwrap(),
            Some(("HOUSEHOLD_STORE_URL".to_string(), "http://localhost:3000".to_string()))
        );
        assert_eq!(
            parse_env_assignment(r#"KEY="a \"quoted\"\tvalue""#).unwrap(),
            Some(("KEY".to_string(), "a \"quoted\"\tvalue".to_string()))
        );
        assert_eq!(
            parse_env_assignment(r"KEY='raw \n value'").unwrap(),
            Some(("KEY".to_string(), r"raw \n value".to_string()))
        );
        assert_eq!(parse_env_assignment("KEY=").unwrap(), Some(("KEY".to_string(), String::new())));
        assert!(parse_env_assignment("NO_EQUALS").is_err());
        assert!(parse_env_assignment("BAD KEY=1").is_err());
        assert!(parse_env_assignment("KEY=\"open").unwrap_err().contains("unterminated"));
        assert!(parse_env_assignment("KEY='x' trailing").unwrap_err().contains("after closing"));
    }

    #[test]
    fn pages_without_a_house_say_so() {
        let store = MemoryStore::new();
        let out = exec(&store, Command::List(EntityKind::Plants)).unwrap();
        assert_eq!(out, "Plants\n\nNo House Selected\n");
        let out = exec(&store, Command::Dashboard).unwrap();
        assert!(out.contains(NO_HOUSE_SELECTED));
    }

    #[test]
    fn create_then_list_reminders() {
        let store = store_with_house();
        let payload = r#"{ "title": "Replace filter", "details": "16x25x1", "dueDate": "2024-04-10" }"#;
        exec(&store, Command::Create { kind: EntityKind::Reminders, json: payload.to_string() }).unwrap();

        let out = exec(&store, Command::List(EntityKind::Reminders)).unwrap();

        assert!(out.starts_with("House Reminders\n\n"));
        assert!(out.contains("Replace filter"));
        assert!(out.contains("Apr 10, 2024"));
        let rows = store.rows(tables::REMINDERS);
        assert_eq!(rows[0]["house_id"], "h1");
    }

    #[test]
    fn validation_messages_are_shown_verbatim() {
        let store = store_with_house();
        let payload = r#"{ "title": " ", "details": "x", "dueDate": "2024-04-10" }"#;
        let err = exec(&store, Command::Create { kind: EntityKind::Reminders, json: payload.to_string() }).unwrap_err();
        assert_eq!(err, "Title is required");
    }

    #[test]
    fn store_failures_become_the_generic_message() {
        let store = store_with_house();
        store.fail_next(Op::Insert, tables::PLANTS, "Database error");
        let payload = r#"{ "name": "Fern", "locationId": "l1", "type": "indoor",
            "sunRequirements": "partial shade", "maxHeight": 24, "maxWidth": 12 }"#;
        let err = exec(&store, Command::Create { kind: EntityKind::Plants, json: payload.to_string() }).unwrap_err();
        assert_eq!(err, "Failed to save plant. Please try again.");
    }

    #[test]
    fn malformed_payload_points_at_the_field() {
        let store = store_with_house();
        let payload = r#"{ "title": "x", "details": "x", "dueDate": "tomorrow" }"#;
        let err = exec(&store, Command::Create { kind: EntityKind::Reminders, json: payload.to_string() }).unwrap_err();
        assert!(err.starts_with("invalid payload at dueDate"));
    }

    #[test]
    fn houses_before_the_first_load_show_loading() {
        let store = store_with_house();
        let mut session = HouseSession::new(&store);
        let out = execute(&mut session, Command::Houses, false, today()).unwrap();
        assert_eq!(out, "Houses\n\nLoading...\n");

        session.load_houses().unwrap();
        let out = execute(&mut session, Command::Houses, false, today()).unwrap();
        assert!(out.contains("Test House"));
    }

    #[test]
    fn delete_needs_confirmation() {
        let store = store_with_house();
        store.seed(
            tables::PLANTS,
            json!({
                "id": "p1", "name": "Fern", "location_id": "l1", "type": "indoor", "sun_requirements": "partial shade",
                "max_height": 24.0, "max_width": 12.0, "notes": null, "house_id": "h1", "created_at": TS, "updated_at": TS
            }),
        );
        let delete = |confirmed| Command::Delete {
            kind: EntityKind::Plants,
            id: "p1".to_string(),
            confirmed,
        };

        let out = exec(&store, delete(false)).unwrap();
        assert!(out.starts_with("Are you sure you want to delete Fern? This action cannot be undone."));
        assert_eq!(store.count(Op::Delete, tables::PLANTS), 0);

        let out = exec(&store, delete(true)).unwrap();
        assert_eq!(out, "Deleted Fern.\n");
        assert!(store.rows(tables::PLANTS).is_empty());
    }

    #[test]
    fn dashboard_lists_upcoming_reminders() {
        let store = store_with_house();
        store.seed(
            tables::REMINDERS,
            json!({
                "id": "r1", "title": "Clean gutters", "details": "x", "due_date": "2024-04-20", "recurrence_id": null,
                "completed": false, "house_id": "h1", "created_at": TS, "updated_at": TS
            }),
        );
        let out = exec(&store, Command::Dashboard).unwrap();
        assert!(out.starts_with("Dashboard - Test House"));
        assert!(out.contains("Apr 20, 2024  Clean gutters"));
    }
}
