//! Page-level presentation: routes, list states, prompts and the dashboard,
//! rendered as plain text for the terminal.

use chrono::NaiveDate;
use std::fmt::Write as _;

use crate::cache::EntityKind;
use crate::models::household::*;
use crate::utils::{format_date, serde_enum_name, title_case};

pub const NO_HOUSE_SELECTED: &str = "No House Selected";

/// How many upcoming items the dashboard shows.
const UPCOMING_LIMIT: usize = 5;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Route {
    Dashboard,
    PaintRecords,
    HomeServices,
    PlantInventory,
    HouseReminders,
}

impl Route {
    pub const ALL: [Route; 5] = [
        Route::Dashboard,
        Route::PaintRecords,
        Route::HomeServices,
        Route::PlantInventory,
        Route::HouseReminders,
    ];

    /// Accepts the path with or without its leading slash.
    pub fn from_path(path: &str) -> Option<Route> {
        let trimmed = path.trim().trim_start_matches('/');
        Route::ALL
            .into_iter()
            .find(|r| r.path().trim_start_matches('/') == trimmed)
    }

    pub fn path(self) -> &'static str {
        match self {
            Route::Dashboard => "/",
            Route::PaintRecords => "/paint-records",
            Route::HomeServices => "/home-services",
            Route::PlantInventory => "/plant-inventory",
            Route::HouseReminders => "/house-reminders",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Route::Dashboard => "Dashboard",
            Route::PaintRecords => "Paint",
            Route::HomeServices => "Home Services",
            Route::PlantInventory => "Plants",
            Route::HouseReminders => "House Reminders",
        }
    }

    pub fn empty_message(self) -> &'static str {
        match self {
            Route::Dashboard => "No active reminders or upcoming services",
            Route::PaintRecords => "No paint found. Add one to get started.",
            Route::HomeServices => "No service records found. Schedule your first service.",
            Route::PlantInventory => "No plants found. Add your first plant to get started.",
            Route::HouseReminders => "No reminders",
        }
    }

    pub fn kind(self) -> Option<EntityKind> {
        match self {
            Route::Dashboard => None,
            Route::PaintRecords => Some(EntityKind::PaintRecords),
            Route::HomeServices => Some(EntityKind::HomeServices),
            Route::PlantInventory => Some(EntityKind::Plants),
            Route::HouseReminders => Some(EntityKind::Reminders),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ListState<T> {
    Loading,
    Empty,
    Loaded(Vec<T>),
}

impl<T> ListState<T> {
    pub fn from_rows(rows: Vec<T>) -> Self {
        if rows.is_empty() {
            ListState::Empty
        } else {
            ListState::Loaded(rows)
        }
    }

    pub fn rows(&self) -> &[T] {
        match self {
            ListState::Loaded(rows) => rows,
            _ => &[],
        }
    }
}

pub fn delete_prompt(kind: EntityKind, name: &str) -> String {
    match kind {
        EntityKind::Houses => format!(
            "Are you sure you want to delete {}? This will also delete all associated records.",
            name
        ),
        _ => format!("Are you sure you want to delete {}? This action cannot be undone.", name),
    }
}

pub fn save_failure(kind: EntityKind) -> String {
    format!("Failed to save {}. Please try again.", kind.noun())
}

// =====================
// Tables
// =====================

/// A row type that can be listed on a page.
pub trait PageRow {
    fn headers() -> &'static [&'static str];
    fn cells(&self) -> Vec<String>;
    /// Name used in the delete confirmation.
    fn describe(&self) -> String;
}

fn or_dash(value: Option<&str>) -> String {
    match value {
        Some(v) if !v.trim().is_empty() => v.to_string(),
        _ => "-".to_string(),
    }
}

fn enum_label<T: serde::Serialize>(value: &T) -> String {
    serde_enum_name(value).map(|s| title_case(&s)).unwrap_or_default()
}

impl PageRow for House {
    fn headers() -> &'static [&'static str] {
        &["ID", "Name", "Owners", "Address"]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.name.clone(),
            or_dash(Some(self.owners.join(", ").as_str())),
            or_dash(Some(self.address.to_string().as_str())),
        ]
    }

    fn describe(&self) -> String {
        self.name.clone()
    }
}

impl PageRow for Location {
    fn headers() -> &'static [&'static str] {
        &["ID", "Room", "Description"]
    }

    fn cells(&self) -> Vec<String> {
        vec![self.id.to_string(), self.name.clone(), or_dash(self.description.as_deref())]
    }

    fn describe(&self) -> String {
        self.name.clone()
    }
}

impl PageRow for PaintRecord {
    fn headers() -> &'static [&'static str] {
        &["ID", "Color", "Paint", "Finish", "Room", "Manufacturer", "Painted"]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.color.clone(),
            self.paint_type.clone(),
            self.finish_type.clone(),
            or_dash(self.location.as_ref().map(|l| l.name.as_str())),
            or_dash(self.manufacturer.as_ref().map(|m| m.name.as_str())),
            format_date(self.date),
        ]
    }

    fn describe(&self) -> String {
        let room = self
            .location
            .as_ref()
            .map(|l| l.name.as_str())
            .unwrap_or("Unknown Room");
        format!("{} ({}) for {}", self.color, self.finish_type, room)
    }
}

impl PageRow for HomeService {
    fn headers() -> &'static [&'static str] {
        &["ID", "Service", "Provider", "Date", "Status", "Repeats"]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.service_name().to_string(),
            self.provider.clone(),
            format_date(self.date),
            enum_label(&self.status),
            or_dash(self.recurrence.as_ref().map(|r| r.name.as_str())),
        ]
    }

    fn describe(&self) -> String {
        format!("the {} service with {}", self.service_name(), self.provider)
    }
}

impl PageRow for Plant {
    fn headers() -> &'static [&'static str] {
        &["ID", "Name", "Type", "Sun", "Location", "Size (H x W)"]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.name.clone(),
            enum_label(&self.plant_type),
            enum_label(&self.sun_requirements),
            or_dash(self.location.as_ref().map(|l| l.name.as_str())),
            format!("{} x {}", self.max_height, self.max_width),
        ]
    }

    fn describe(&self) -> String {
        self.name.clone()
    }
}

impl PageRow for Reminder {
    fn headers() -> &'static [&'static str] {
        &["ID", "Title", "Due", "Repeats", "Done"]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.title.clone(),
            format_date(self.due_date),
            or_dash(self.recurrence.as_ref().map(|r| r.name.as_str())),
            if self.completed { "yes" } else { "no" }.to_string(),
        ]
    }

    fn describe(&self) -> String {
        format!("\"{}\"", self.title)
    }
}

fn pad_line<'a>(cells: impl Iterator<Item = &'a str>, widths: &[usize]) -> String {
    let padded = cells
        .zip(widths)
        .map(|(cell, w)| format!("{:<width$}", cell, width = *w))
        .collect::<Vec<_>>();
    padded.join("  ").trim_end().to_string()
}

/// Left-aligned columns padded to the widest cell, two spaces apart.
pub fn render_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths = headers.iter().map(|h| h.chars().count()).collect::<Vec<_>>();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if let Some(w) = widths.get_mut(i) {
                *w = (*w).max(cell.chars().count());
            }
        }
    }
    let rules = widths.iter().map(|w| "-".repeat(*w)).collect::<Vec<_>>();

    let mut out = String::new();
    out.push_str(&pad_line(headers.iter().copied(), &widths));
    out.push('\n');
    out.push_str(&pad_line(rules.iter().map(String::as_str), &widths));
    out.push('\n');
    for row in rows {
        out.push_str(&pad_line(row.iter().map(String::as_str), &widths));
        out.push('\n');
    }
    out
}

/// Title, then the loading text, the empty-state message or the table.
pub fn render_list<T: PageRow>(title: &str, empty: &str, state: &ListState<T>) -> String {
    let mut out = format!("{}\n\n", title);
    match state {
        ListState::Loading => out.push_str("Loading...\n"),
        ListState::Empty => {
            out.push_str(empty);
            out.push('\n');
        }
        ListState::Loaded(rows) => {
            let cells = rows.iter().map(PageRow::cells).collect::<Vec<_>>();
            out.push_str(&render_table(T::headers(), &cells));
        }
    }
    out
}

// =====================
// Dashboard
// =====================

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum UpcomingKind {
    Reminder,
    Service,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpcomingItem {
    pub kind: UpcomingKind,
    pub id: String,
    pub title: String,
    pub date: NaiveDate,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Counts {
    pub paint_records: usize,
    pub home_services: usize,
    pub plants: usize,
    pub reminders: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Dashboard {
    pub counts: Counts,
    /// Open reminders and scheduled services from `today` on, soonest first.
    pub upcoming: Vec<UpcomingItem>,
    pub recent_paint: Option<PaintRecord>,
    pub recent_service: Option<HomeService>,
    pub recent_plant: Option<Plant>,
}

impl Dashboard {
    pub fn build(
        today: NaiveDate,
        paint_records: &[PaintRecord],
        home_services: &[HomeService],
        plants: &[Plant],
        reminders: &[Reminder],
    ) -> Dashboard {
        let reminders_due = reminders.iter().filter(|r| !r.completed).map(|r| UpcomingItem {
            kind: UpcomingKind::Reminder,
            id: r.id.to_string(),
            title: r.title.clone(),
            date: r.due_date,
        });
        let services_due = home_services
            .iter()
            .filter(|s| s.status == ServiceStatus::Scheduled && s.date >= today)
            .map(|s| UpcomingItem {
                kind: UpcomingKind::Service,
                id: s.id.to_string(),
                title: format!("{} - {}", s.service_name(), s.provider),
                date: s.date,
            });

        // stable: reminders stay ahead of services due the same day
        let mut upcoming = reminders_due.chain(services_due).collect::<Vec<_>>();
        upcoming.sort_by_key(|item| item.date);

        Dashboard {
            counts: Counts {
                paint_records: paint_records.len(),
                home_services: home_services.len(),
                plants: plants.len(),
                reminders: reminders.len(),
            },
            upcoming,
            recent_paint: paint_records.iter().max_by_key(|p| p.date).cloned(),
            recent_service: home_services.iter().max_by_key(|s| s.date).cloned(),
            recent_plant: plants.iter().max_by_key(|p| p.created_at).cloned(),
        }
    }

    pub fn render(&self, house: &House) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{} - {}\n", Route::Dashboard.title(), house.name);

        let _ = writeln!(out, "Upcoming");
        if self.upcoming.is_empty() {
            let _ = writeln!(out, "  {}", Route::Dashboard.empty_message());
        }
        for item in self.upcoming.iter().take(UPCOMING_LIMIT) {
            let marker = match item.kind {
                UpcomingKind::Reminder => "[ ]",
                UpcomingKind::Service => "[S]",
            };
            let _ = writeln!(out, "  {} {}  {}", marker, format_date(item.date), item.title);
        }

        let _ = writeln!(out, "\nRecent Updates");
        if let Some(p) = &self.recent_paint {
            let _ = writeln!(out, "  New Paint    {} ({})", p.color, format_date(p.date));
        }
        if let Some(s) = &self.recent_service {
            let _ = writeln!(out, "  Service      {} ({})", s.service_name(), format_date(s.date));
        }
        if let Some(p) = &self.recent_plant {
            let _ = writeln!(out, "  New Plant    {} ({})", p.name, format_date(p.created_at.date_naive()));
        }

        let c = &self.counts;
        let _ = writeln!(
            out,
            "\nPaint {}  Services {}  Plants {}  Reminders {}",
            c.paint_records, c.home_services, c.plants, c.reminders
        );
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn ts() -> chrono::DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap()
    }

    fn day(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, m, d).unwrap()
    }

    fn reminder(id: &str, title: &str, due: NaiveDate, completed: bool) -> Reminder {
        Reminder {
            id: id.into(),
            title: title.to_string(),
            details: String::new(),
            due_date: due,
            recurrence_id: None,
            recurrence: None,
            completed,
            house_id: "h1".into(),
            created_at: ts(),
            updated_at: ts(),
        }
    }

    fn service(id: &str, date: NaiveDate, status: ServiceStatus) -> HomeService {
        HomeService {
            id: id.into(),
            service_type_id: "st1".into(),
            service_type: None,
            provider: "Acme".to_string(),
            date,
            status,
            recurrence_id: None,
            recurrence: None,
            notes: None,
            house_id: "h1".into(),
            created_at: ts(),
            updated_at: ts(),
        }
    }

    #[test]
    fn routes_round_trip_through_paths() {
        for route in Route::ALL {
            assert_eq!(Route::from_path(route.path()), Some(route));
        }
        assert_eq!(Route::from_path("plant-inventory"), Some(Route::PlantInventory));
        assert_eq!(Route::from_path("/garage"), None);
        assert_eq!(Route::HomeServices.title(), "Home Services");
    }

    #[test]
    fn list_state_distinguishes_empty_from_loaded() {
        assert_eq!(ListState::<Plant>::from_rows(vec![]), ListState::Empty);
        let state = ListState::from_rows(vec![reminder("r1", "Filter", day(4, 1), false)]);
        assert_eq!(state.rows().len(), 1);
        assert!(ListState::<Plant>::Loading.rows().is_empty());
    }

    #[test]
    fn empty_pages_show_their_message() {
        let route = Route::PlantInventory;
        let out = render_list::<Plant>(route.title(), route.empty_message(), &ListState::Empty);
        assert_eq!(out, "Plants\n\nNo plants found. Add your first plant to get started.\n");
        let out = render_list::<PaintRecord>("Paint", "", &ListState::Loading);
        assert!(out.ends_with("Loading...\n"));
    }

    #[test]
    fn prompts_name_the_entity() {
        assert_eq!(
            delete_prompt(EntityKind::Plants, "Fern"),
            "Are you sure you want to delete Fern? This action cannot be undone."
        );
        assert_eq!(
            delete_prompt(EntityKind::Houses, "Lake Cabin"),
            "Are you sure you want to delete Lake Cabin? This will also delete all associated records."
        );
        assert_eq!(save_failure(EntityKind::PaintRecords), "Failed to save paint record. Please try again.");
    }

    #[test]
    fn tables_align_columns() {
        let out = render_table(
            &["Name", "Due"],
            &[
                vec!["Replace filter".to_string(), "Apr 1, 2024".to_string()],
                vec!["Gutters".to_string(), "Oct 1, 2024".to_string()],
            ],
        );
        let lines = out.lines().collect::<Vec<_>>();
        assert_eq!(lines[0], "Name            Due");
        assert_eq!(lines[1], "--------------  -----------");
        assert_eq!(lines[3], "Gutters         Oct 1, 2024");
    }

    #[test]
    fn reminder_rows_show_formatted_dates() {
        let cells = reminder("r1", "Filter", day(3, 1), true).cells();
        assert_eq!(cells[2], "Mar 1, 2024");
        assert_eq!(cells[4], "yes");
    }

    #[test]
    fn dashboard_merges_open_reminders_and_scheduled_services() {
        let today = day(4, 1);
        let reminders = vec![
            reminder("r1", "Clean gutters", day(5, 1), false),
            reminder("r2", "Done already", day(4, 2), true),
            reminder("r3", "Overdue filter", day(3, 15), false),
        ];
        let services = vec![
            service("s1", day(4, 10), ServiceStatus::Scheduled),
            service("s2", day(3, 1), ServiceStatus::Scheduled),
            service("s3", day(4, 5), ServiceStatus::Completed),
            service("s4", day(5, 1), ServiceStatus::Scheduled),
        ];

        let dashboard = Dashboard::build(today, &[], &services, &[], &reminders);

        let ids = dashboard.upcoming.iter().map(|i| i.id.as_str()).collect::<Vec<_>>();
        assert_eq!(ids, vec!["r3", "s1", "r1", "s4"]);
        assert_eq!(dashboard.upcoming[1].title, "Unknown Service Type - Acme");
        assert_eq!(dashboard.counts.home_services, 4);
        assert_eq!(dashboard.recent_service.as_ref().map(|s| s.id.as_str()), Some("s4"));
        assert!(dashboard.recent_paint.is_none());
    }

    #[test]
    fn empty_dashboard_says_so() {
        let house = House {
            id: "h1".into(),
            name: "Test House".to_string(),
            owners: vec![],
            address: Address::default(),
            created_at: ts(),
            updated_at: ts(),
        };
        let out = Dashboard::build(day(4, 1), &[], &[], &[], &[]).render(&house);
        assert!(out.starts_with("Dashboard - Test House\n"));
        assert!(out.contains("No active reminders or upcoming services"));
    }
}
