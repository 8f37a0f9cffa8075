use chrono::{TimeZone, Utc};
use pocketnotes_core::{
    Group, Note, PersistenceGateway, SqliteGateway, StorageError, GROUPS_KEY, NOTES_KEY,
};

fn sample_groups() -> Vec<Group> {
    vec![
        Group::new("Work", "#0369A1"),
        Group::new("Personal", "#15803D"),
    ]
}

#[test]
fn save_then_load_groups_preserves_order_and_fields() {
    let mut gateway = SqliteGateway::open_in_memory().unwrap();
    let groups = sample_groups();

    gateway.save_groups(&groups).unwrap();

    assert_eq!(gateway.load_groups().unwrap(), groups);
}

#[test]
fn resaving_loaded_collections_is_idempotent() {
    let mut gateway = SqliteGateway::open_in_memory().unwrap();
    let groups = sample_groups();
    let created = Utc.with_ymd_and_hms(2024, 2, 29, 23, 59, 59).unwrap()
        + chrono::Duration::nanoseconds(123_456_789);
    let notes = vec![
        Note::new(groups[0].id.clone(), "first", Some("#0369A1".to_string()), created),
        Note::new(groups[1].id.clone(), "second", None, created),
    ];
    gateway.save_groups(&groups).unwrap();
    gateway.save_notes(&notes).unwrap();
    let groups_before = gateway.raw_payload(GROUPS_KEY).unwrap();
    let notes_before = gateway.raw_payload(NOTES_KEY).unwrap();

    let loaded_groups = gateway.load_groups().unwrap();
    let loaded_notes = gateway.load_notes().unwrap();
    gateway.save_groups(&loaded_groups).unwrap();
    gateway.save_notes(&loaded_notes).unwrap();

    assert_eq!(gateway.raw_payload(GROUPS_KEY).unwrap(), groups_before);
    assert_eq!(gateway.raw_payload(NOTES_KEY).unwrap(), notes_before);
    assert_eq!(loaded_notes, notes);
}

#[test]
fn timestamps_round_trip_with_full_precision() {
    let mut gateway = SqliteGateway::open_in_memory().unwrap();
    let at = Utc.with_ymd_and_hms(2023, 11, 5, 6, 7, 8).unwrap()
        + chrono::Duration::nanoseconds(987_654_321);
    let note = Note::new("g1", "precise", None, at);

    gateway.save_notes(std::slice::from_ref(&note)).unwrap();
    let loaded = gateway.load_notes().unwrap();

    assert_eq!(loaded[0].created_at, at);
    assert_eq!(loaded[0].updated_at, at);
    let payload = gateway.raw_payload(NOTES_KEY).unwrap().unwrap();
    assert!(payload.contains("2023-11-05T06:07:08.987654321Z"));
}

#[test]
fn legacy_browser_payload_loads_without_group_color() {
    let gateway = SqliteGateway::open_in_memory().unwrap();
    gateway
        .connection()
        .execute(
            "INSERT INTO collections (key, payload) VALUES (?1, ?2);",
            [
                NOTES_KEY,
                r#"[{"id":"x1y2z3","content":"legacy","groupId":"abc123","createdAt":"2024-01-01T09:30:00.000Z","updatedAt":"2024-01-02T10:00:00.000Z"}]"#,
            ],
        )
        .unwrap();

    let notes = gateway.load_notes().unwrap();
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].group_color, None);
    assert_eq!(notes[0].group_id, "abc123");
    assert!(notes[0].updated_at > notes[0].created_at);
}

#[test]
fn corrupted_payload_is_storage_unavailable_not_empty() {
    let gateway = SqliteGateway::open_in_memory().unwrap();
    gateway
        .connection()
        .execute(
            "INSERT INTO collections (key, payload) VALUES (?1, ?2);",
            [GROUPS_KEY, "{not json"],
        )
        .unwrap();

    let err = gateway.load_groups().unwrap_err();
    assert!(matches!(
        err,
        StorageError::Corrupted {
            key: GROUPS_KEY,
            ..
        }
    ));
    assert!(err.to_string().starts_with("storage unavailable"));
}

#[test]
fn failed_combined_write_keeps_both_previous_payloads() {
    let mut gateway = SqliteGateway::open_in_memory().unwrap();
    let groups = sample_groups();
    let notes = vec![Note::new(groups[0].id.clone(), "keep me", None, Utc::now())];
    gateway.save_collections(&groups, &notes).unwrap();
    let groups_before = gateway.raw_payload(GROUPS_KEY).unwrap();
    let notes_before = gateway.raw_payload(NOTES_KEY).unwrap();

    reject_writes_to(&gateway, NOTES_KEY);
    let err = gateway.save_collections(&groups[1..], &[]).unwrap_err();

    assert!(matches!(err, StorageError::Db(_)));
    assert_eq!(gateway.raw_payload(GROUPS_KEY).unwrap(), groups_before);
    assert_eq!(gateway.raw_payload(NOTES_KEY).unwrap(), notes_before);
}

#[test]
fn file_backed_gateway_persists_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notes.sqlite3");
    let groups = sample_groups();

    {
        let mut gateway = SqliteGateway::open(&path).unwrap();
        gateway.save_groups(&groups).unwrap();
    }

    let reopened = SqliteGateway::open(&path).unwrap();
    assert_eq!(reopened.load_groups().unwrap(), groups);
}

fn reject_writes_to(gateway: &SqliteGateway, key: &str) {
    gateway
        .connection()
        .execute_batch(&format!(
            "CREATE TRIGGER reject_insert BEFORE INSERT ON collections
             WHEN NEW.key = '{key}'
             BEGIN SELECT RAISE(ABORT, 'forced write failure'); END;
             CREATE TRIGGER reject_update BEFORE UPDATE ON collections
             WHEN NEW.key = '{key}'
             BEGIN SELECT RAISE(ABORT, 'forced write failure'); END;"
        ))
        .unwrap();
}
