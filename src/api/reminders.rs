use log::{debug, info};

use crate::api::error::{ApiError, decode, decode_all};
use crate::models::household::{HouseId, Reminder, ReminderId};
use crate::models::requests::{NewReminder, ReminderChanges};
use crate::models::rows::ReminderRow;
use crate::schema::{columns, embeds, tables};
use crate::store::{Direction, Embed, Query, Store};

const EMBEDS: &[Embed] = &[embeds::RECURRENCE];

/// Soonest due first, completed ones included.
pub fn list(store: &dyn Store, house_id: &HouseId) -> Result<Vec<Reminder>, ApiError> {
    let query = Query::all()
        .embed(EMBEDS)
        .eq(columns::HOUSE_ID, house_id.as_str())
        .order_by(columns::DUE_DATE, Direction::Asc);
    let rows = store.select(tables::REMINDERS, &query)?;
    debug!("Reminders: fetched {} row(s) for house {}", rows.len(), house_id);
    decode_all::<ReminderRow, Reminder>(rows)
}

pub fn create(store: &dyn Store, new: &NewReminder) -> Result<Reminder, ApiError> {
    new.validate()?;
    let row = store.insert(tables::REMINDERS, &new.to_row(), EMBEDS)?;
    let reminder: Reminder = decode::<ReminderRow>(row)?.into();
    info!("Reminders: created {} due {} ({})", reminder.title, reminder.due_date, reminder.id);
    Ok(reminder)
}

pub fn update(store: &dyn Store, id: &ReminderId, changes: &ReminderChanges) -> Result<Reminder, ApiError> {
    changes.validate()?;
    let row = store.update(tables::REMINDERS, id.as_str(), &changes.to_changes()?, EMBEDS)?;
    decode::<ReminderRow>(row).map(Reminder::from)
}

pub fn complete(store: &dyn Store, id: &ReminderId) -> Result<Reminder, ApiError> {
    let reminder = update(store, id, &ReminderChanges::completed())?;
    info!("Reminders: completed {}", id);
    Ok(reminder)
}

pub fn delete(store: &dyn Store, id: &ReminderId) -> Result<(), ApiError> {
    store.delete(tables::REMINDERS, id.as_str())?;
    info!("Reminders: deleted {}", id);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::{MemoryStore, Op};
    use chrono::NaiveDate;
    use serde_json::json;

    const TS: &str = "2024-03-01T00:00:00.000Z";

    fn store_with_house() -> MemoryStore {
        let store = MemoryStore::with_reference_data();
        store.seed(
            tables::HOUSES,
            json!({ "id": "h1", "name": "Test House", "owners": [], "address": null, "created_at": TS, "updated_at": TS }),
        );
        store
    }

    fn reminder(title: &str, due: (i32, u32, u32)) -> NewReminder {
        NewReminder {
            title: title.to_string(),
            details: format!("{} details", title),
            due_date: NaiveDate::from_ymd_opt(due.0, due.1, due.2).unwrap(),
            recurrence_id: Some("r-monthly".into()),
            completed: false,
            house_id: "h1".into(),
        }
    }

    #[test]
    fn list_is_ordered_by_due_date() {
        let store = store_with_house();
        create(&store, &reminder("Clean gutters", (2024, 10, 1))).unwrap();
        create(&store, &reminder("Replace filter", (2024, 4, 1))).unwrap();

        let reminders = list(&store, &HouseId::from("h1")).unwrap();

        let titles = reminders.iter().map(|r| r.title.as_str()).collect::<Vec<_>>();
        assert_eq!(titles, vec!["Replace filter", "Clean gutters"]);
        assert_eq!(reminders[0].recurrence.as_ref().map(|r| r.name.as_str()), Some("Monthly"));
    }

    #[test]
    fn complete_sets_only_the_flag() {
        let store = store_with_house();
        let created = create(&store, &reminder("Replace filter", (2024, 4, 1))).unwrap();
        assert!(!created.completed);

        let done = complete(&store, &created.id).unwrap();

        assert!(done.completed);
        assert_eq!(done.title, created.title);
        assert_eq!(done.due_date, created.due_date);
        assert_eq!(done.recurrence, created.recurrence);
    }

    #[test]
    fn blank_details_are_rejected() {
        let store = store_with_house();
        let mut new = reminder("Replace filter", (2024, 4, 1));
        new.details = String::new();
        assert_eq!(create(&store, &new).unwrap_err().to_string(), "Details are required");
        assert!(store.calls().is_empty());
    }

    #[test]
    fn failures_carry_the_store_message() {
        let store = MemoryStore::new();
        store.fail_next(Op::Update, tables::REMINDERS, "Record not found");
        let err = complete(&store, &ReminderId::from("1")).unwrap_err();
        assert_eq!(err.to_string(), "Record not found");

        store.fail_next(Op::Delete, tables::REMINDERS, "Record not found");
        assert_eq!(delete(&store, &ReminderId::from("999")).unwrap_err().to_string(), "Record not found");
    }
}
