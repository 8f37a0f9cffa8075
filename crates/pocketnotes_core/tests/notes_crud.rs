use chrono::{Duration, TimeZone, Utc};
use pocketnotes_core::{
    ManualClock, NoteService, NoteServiceError, PersistenceGateway, SqliteGateway, NOTES_KEY,
};

fn clock() -> ManualClock {
    ManualClock::new(Utc.with_ymd_and_hms(2024, 4, 1, 9, 0, 0).unwrap())
}

#[test]
fn create_note_trims_content_and_stamps_both_timestamps() {
    let mut gateway = SqliteGateway::open_in_memory().unwrap();
    let clock = clock();
    let mut service = NoteService::new(&mut gateway, &clock);

    let note = service
        .create_note("g1", "  remember the milk \n", Some("#0369A1"))
        .unwrap();

    assert_eq!(note.content, "remember the milk");
    assert_eq!(note.group_id, "g1");
    assert_eq!(note.group_color.as_deref(), Some("#0369A1"));
    assert_eq!(note.created_at, Utc.with_ymd_and_hms(2024, 4, 1, 9, 0, 0).unwrap());
    assert_eq!(note.updated_at, note.created_at);
    assert_eq!(service.get_note(&note.id).unwrap(), Some(note));
}

#[test]
fn create_note_rejects_blank_content_without_writing() {
    let mut gateway = SqliteGateway::open_in_memory().unwrap();
    let clock = clock();

    let err = NoteService::new(&mut gateway, &clock)
        .create_note("g1", " \t\n ", None)
        .unwrap_err();

    assert!(matches!(err, NoteServiceError::EmptyContent));
    assert_eq!(gateway.raw_payload(NOTES_KEY).unwrap(), None);
}

#[test]
fn edit_note_replaces_content_and_advances_updated_at_only() {
    let mut gateway = SqliteGateway::open_in_memory().unwrap();
    let clock = clock();
    let mut service = NoteService::new(&mut gateway, &clock);
    let created = service.create_note("g1", "draft", None).unwrap();

    let later = clock.advance(Duration::minutes(10));
    let edited = service.edit_note(&created.id, "  final  ").unwrap();

    assert_eq!(edited.content, "final");
    assert_eq!(edited.created_at, created.created_at);
    assert_eq!(edited.updated_at, later);
    assert_eq!(service.get_note(&created.id).unwrap(), Some(edited));
}

#[test]
fn edit_note_with_empty_content_leaves_note_unchanged() {
    let mut gateway = SqliteGateway::open_in_memory().unwrap();
    let clock = clock();
    let created = NoteService::new(&mut gateway, &clock)
        .create_note("g1", "keep", None)
        .unwrap();
    let payload_before = gateway.raw_payload(NOTES_KEY).unwrap();

    clock.advance(Duration::minutes(1));
    let err = NoteService::new(&mut gateway, &clock)
        .edit_note(&created.id, "")
        .unwrap_err();

    assert!(matches!(err, NoteServiceError::EmptyContent));
    assert_eq!(gateway.raw_payload(NOTES_KEY).unwrap(), payload_before);
    let stored = gateway.load_notes().unwrap();
    assert_eq!(stored[0].content, "keep");
    assert_eq!(stored[0].updated_at, created.updated_at);
}

#[test]
fn edit_and_delete_missing_note_return_not_found() {
    let mut gateway = SqliteGateway::open_in_memory().unwrap();
    let clock = clock();
    let mut service = NoteService::new(&mut gateway, &clock);
    service.create_note("g1", "present", None).unwrap();

    assert!(matches!(
        service.edit_note("ghost", "text").unwrap_err(),
        NoteServiceError::NoteNotFound(ref id) if id == "ghost"
    ));
    assert!(matches!(
        service.delete_note("ghost").unwrap_err(),
        NoteServiceError::NoteNotFound(_)
    ));
    assert_eq!(service.list_notes_for_group("g1").unwrap().len(), 1);
}

#[test]
fn delete_note_removes_only_the_target() {
    let mut gateway = SqliteGateway::open_in_memory().unwrap();
    let clock = clock();
    let mut service = NoteService::new(&mut gateway, &clock);
    let first = service.create_note("g1", "first", None).unwrap();
    let second = service.create_note("g1", "second", None).unwrap();

    let removed = service.delete_note(&first.id).unwrap();

    assert_eq!(removed, first);
    assert_eq!(service.list_notes_for_group("g1").unwrap(), vec![second]);
}

#[test]
fn list_notes_for_group_filters_and_keeps_collection_order() {
    let mut gateway = SqliteGateway::open_in_memory().unwrap();
    let clock = clock();
    let mut service = NoteService::new(&mut gateway, &clock);
    let a1 = service.create_note("a", "a1", None).unwrap();
    service.create_note("b", "b1", None).unwrap();
    clock.advance(Duration::seconds(1));
    let a2 = service.create_note("a", "a2", None).unwrap();

    assert_eq!(service.list_notes_for_group("a").unwrap(), vec![a1, a2]);
    assert!(service.list_notes_for_group("c").unwrap().is_empty());
}
