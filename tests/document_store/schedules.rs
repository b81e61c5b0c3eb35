//! Timer records end to end.

use crate::common::store;
use chrono::{TimeZone, Utc};
use flowstore::{ScheduleStore, Value};

#[test]
fn schedules_fire_at_or_before_now() {
    let store = store();
    let schedules = ScheduleStore::new(store.clone());

    let morning = Utc.with_ymd_and_hms(2021, 3, 14, 9, 0, 0).unwrap();
    let noon = Utc.with_ymd_and_hms(2021, 3, 14, 12, 0, 0).unwrap();
    let evening = Utc.with_ymd_and_hms(2021, 3, 14, 18, 0, 0).unwrap();

    let due_id = schedules
        .put_schedule("0_0!exp!wf-1", morning, Value::from("dispatch"))
        .unwrap();
    schedules
        .put_schedule("0_1!exp!wf-1", evening, Value::from("later"))
        .unwrap();

    let due = schedules.get_due(noon).unwrap();
    assert_eq!(due.len(), 1);
    assert_eq!(due[0].id(), Some(due_id.as_str()));

    // the fired schedule is deleted like any other document
    assert!(store.delete(&due[0], false).unwrap().is_applied());
    assert!(schedules.get_due(noon).unwrap().is_empty());
    assert_eq!(schedules.get_due(evening).unwrap().len(), 1);
}

#[test]
fn schedule_ids_are_unique() {
    let store = store();
    let schedules = ScheduleStore::new(store);
    let now = Utc::now();
    let a = schedules.put_schedule("o", now, Value::Null).unwrap();
    let b = schedules.put_schedule("o", now, Value::Null).unwrap();
    assert_ne!(a, b);
}
