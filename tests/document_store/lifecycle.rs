//! Document lifecycle: create, update, conflict, delete, purge.

use crate::common::{doc, store};
use flowstore::{Driver, IdSelector, PutOptions, QueryOptions, Value, WriteOutcome};

#[test]
fn create_read_update_read() {
    let store = store();

    let mut d = doc(serde_json::json!({"id": "a", "type": "t", "name": "x"}));
    assert!(store.put(&mut d, PutOptions::default()).unwrap().is_applied());

    let stored = store.get("t", "a").unwrap().unwrap();
    assert_eq!(stored.id(), Some("a"));
    assert_eq!(stored.doc_type(), Some("t"));
    assert_eq!(stored.rev(), Some(0));
    assert_eq!(stored.get("name").unwrap().as_str(), Some("x"));
    assert!(stored.put_at().is_some());

    let mut update = doc(serde_json::json!({"id": "a", "type": "t", "name": "y", "rev": 0}));
    assert!(store
        .put(&mut update, PutOptions::default())
        .unwrap()
        .is_applied());

    let stored = store.get("t", "a").unwrap().unwrap();
    assert_eq!(stored.rev(), Some(1));
    assert_eq!(stored.get("name").unwrap().as_str(), Some("y"));
}

#[test]
fn conflicting_update_gets_the_authoritative_document() {
    let store = store();

    let mut d = doc(serde_json::json!({"id": "a", "type": "t", "v": 1}));
    assert!(store.put(&mut d, PutOptions::default()).unwrap().is_applied());
    let mut first = doc(serde_json::json!({"id": "a", "type": "t", "v": 2, "rev": 0}));
    assert!(store
        .put(&mut first, PutOptions::default())
        .unwrap()
        .is_applied());

    let mut second = doc(serde_json::json!({"id": "a", "type": "t", "v": 3, "rev": 0}));
    let WriteOutcome::Conflict(current) = store.put(&mut second, PutOptions::default()).unwrap()
    else {
        panic!("expected a conflict");
    };
    assert_eq!(current.rev(), Some(1));
    assert_eq!(current.get("v").unwrap().as_int(), Some(2));

    // retry from the authoritative revision succeeds
    let mut retry = current.clone();
    retry.set("v", 3i64);
    assert!(store
        .put(&mut retry, PutOptions::default())
        .unwrap()
        .is_applied());
    assert_eq!(store.get("t", "a").unwrap().unwrap().rev(), Some(2));
}

#[test]
fn mongo_style_operator_documents_round_trip() {
    let store = store();

    let payload = serde_json::json!({
        "id": "exp-1",
        "type": "expressions",
        "tree": {"$or": [{"fei.wfid": "wf-1"}, {"$and": [{"a.b.c": null}]}]}
    });
    let mut d = doc(payload.clone());
    assert!(store.put(&mut d, PutOptions::default()).unwrap().is_applied());

    let stored = store.get("expressions", "exp-1").unwrap().unwrap();
    assert_eq!(stored.get("tree").unwrap(), &Value::from(payload["tree"].clone()));
}

#[test]
fn delete_then_stale_create_is_gone() {
    let store = store();

    let mut d = doc(serde_json::json!({"id": "a", "type": "t"}));
    assert!(store.put(&mut d, PutOptions::default()).unwrap().is_applied());
    let stored = store.get("t", "a").unwrap().unwrap();
    assert!(store.delete(&stored, false).unwrap().is_applied());

    // a caller still holding the deleted revision
    let mut stale = stored.clone();
    stale.set("late", true);
    assert_eq!(
        store.put(&mut stale, PutOptions::default()).unwrap(),
        WriteOutcome::Gone
    );
}

#[test]
fn get_many_by_workflow_id() {
    let store = store();
    for id in ["0_0!aaa!wf-1", "0_1!bbb!wf-1", "0_0!ccc!wf-2"] {
        let mut d = doc(serde_json::json!({"id": id, "type": "expressions", "wfid": "x"}));
        assert!(store.put(&mut d, PutOptions::default()).unwrap().is_applied());
    }

    let hits = store
        .get_many(
            "expressions",
            &[IdSelector::Matches("wf-1".into())],
            &QueryOptions::default(),
        )
        .unwrap();
    let ids: Vec<_> = hits.iter().map(|d| d.id().unwrap()).collect();
    assert_eq!(ids, vec!["0_0!aaa!wf-1", "0_1!bbb!wf-1"]);

    let limited = store
        .get_many(
            "expressions",
            &[IdSelector::Matches("wf".into())],
            &QueryOptions {
                limit: Some(2),
                descending: true,
                ..QueryOptions::default()
            },
        )
        .unwrap();
    let ids: Vec<_> = limited.iter().map(|d| d.id().unwrap()).collect();
    assert_eq!(ids, vec!["0_1!bbb!wf-1", "0_0!ccc!wf-2"]);
}

#[test]
fn purge_spares_foreign_collections() {
    let store = store();
    for doc_type in ["msgs", "errors", "expressions"] {
        let mut d = doc(serde_json::json!({"id": "a", "type": doc_type}));
        assert!(store.put(&mut d, PutOptions::default()).unwrap().is_applied());
    }
    store
        .driver()
        .save("audit_log", "entry-1", Value::from(serde_json::json!({})))
        .unwrap();

    store.purge().unwrap();

    for doc_type in ["msgs", "errors", "expressions"] {
        assert!(store.get(doc_type, "a").unwrap().is_none());
    }
    assert!(store
        .driver()
        .find_one("audit_log", "entry-1")
        .unwrap()
        .is_some());
}
