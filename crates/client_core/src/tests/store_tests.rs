use super::*;
use serde_json::json;

fn record(id: i64, title: &str) -> AppointmentRecord {
    AppointmentRecord {
        id: Some(AppointmentId(id)),
        title: Some(title.to_string()),
        date: Some("2024-05-01T09:30:00Z".to_string()),
        ..AppointmentRecord::default()
    }
}

fn loaded(records: Vec<AppointmentRecord>) -> AppointmentState {
    reduce(&AppointmentState::default(), Action::FetchSuccess(records))
}

#[test]
fn fetch_lifecycle_moves_through_phases() {
    let idle = AppointmentState::default();
    assert_eq!(idle.phase(), StorePhase::Idle);

    let fetching = reduce(&idle, Action::FetchStart);
    assert!(fetching.loading);
    assert_eq!(fetching.phase(), StorePhase::Fetching);

    let failed = reduce(&fetching, Action::FetchError("connection refused".into()));
    assert!(!failed.loading);
    assert_eq!(failed.error.as_deref(), Some("connection refused"));
    assert_eq!(failed.phase(), StorePhase::Errored);

    let done = reduce(&fetching, Action::FetchSuccess(vec![record(1, "a")]));
    assert!(!done.loading);
    assert_eq!(done.appointments, vec![record(1, "a")]);
}

#[test]
fn fetch_success_replaces_the_whole_list() {
    let state = loaded(vec![record(1, "a"), record(2, "b")]);
    let next = reduce(&state, Action::FetchSuccess(vec![record(3, "c")]));
    assert_eq!(next.appointments, vec![record(3, "c")]);
}

#[test]
fn add_appends_after_fetched_records() {
    let state = loaded(vec![record(1, "a"), record(2, "b"), record(3, "c")]);
    let next = reduce(&state, Action::Add(record(4, "d")));
    assert_eq!(
        next.appointments,
        vec![record(1, "a"), record(2, "b"), record(3, "c"), record(4, "d")]
    );
}

#[test]
fn delete_removes_only_the_matching_record() {
    let state = loaded(vec![record(1, "a"), record(2, "b"), record(3, "c")]);
    let next = reduce(&state, Action::Delete(AppointmentId(2)));
    assert_eq!(next.appointments, vec![record(1, "a"), record(3, "c")]);
}

#[test]
fn delete_of_unknown_id_is_a_no_op() {
    let state = loaded(vec![record(1, "a"), record(2, "b")]);
    let next = reduce(&state, Action::Delete(AppointmentId(99)));
    assert_eq!(next, state);
}

#[test]
fn update_replaces_in_place_by_id() {
    let state = loaded(vec![record(1, "a"), record(2, "b"), record(3, "c")]);
    let replacement = AppointmentRecord::from(shared::domain::UiAppointment {
        id: Some(AppointmentId(2)),
        name: "b2".into(),
        date: "2024-05-02".into(),
        time: "10:00".into(),
        ..Default::default()
    });

    let next = reduce(&state, Action::Update(replacement.clone()));
    assert_eq!(
        next.appointments,
        vec![record(1, "a"), replacement, record(3, "c")]
    );
}

#[test]
fn update_without_match_is_a_no_op() {
    let state = loaded(vec![record(1, "a")]);
    assert_eq!(reduce(&state, Action::Update(record(5, "e"))), state);

    let mut anonymous = record(1, "z");
    anonymous.id = None;
    assert_eq!(reduce(&state, Action::Update(anonymous)), state);
}

#[test]
fn reduce_is_pure() {
    let state = loaded(vec![record(1, "a"), record(2, "b")]);
    let before = state.clone();
    for action in [
        Action::FetchStart,
        Action::Add(record(3, "c")),
        Action::Delete(AppointmentId(1)),
        Action::Update(record(2, "b2")),
        Action::FetchError("boom".into()),
    ] {
        let first = reduce(&state, action.clone());
        let second = reduce(&state, action);
        assert_eq!(first, second);
        assert_eq!(state, before);
    }
}

#[test]
fn actions_round_trip_through_tagged_json() {
    let value = serde_json::to_value(Action::Delete(AppointmentId(7))).expect("json");
    assert_eq!(value, json!({ "type": "DELETE_APPOINTMENT", "payload": 7 }));

    let parsed = Action::from_value(json!({ "type": "FETCH_APPOINTMENTS_START" })).expect("start");
    assert_eq!(parsed, Action::FetchStart);
}

#[test]
fn unknown_actions_are_rejected() {
    assert_eq!(
        Action::from_value(json!({ "type": "ARCHIVE_APPOINTMENT", "payload": 1 })),
        Err(StoreError::UnknownAction("ARCHIVE_APPOINTMENT".into()))
    );
    assert!(matches!(
        Action::from_value(json!({ "payload": 1 })),
        Err(StoreError::MalformedAction(_))
    ));
    assert!(matches!(
        Action::from_value(json!({ "type": "DELETE_APPOINTMENT", "payload": "x" })),
        Err(StoreError::MalformedAction(_))
    ));
}

#[tokio::test]
async fn store_rejects_unknown_action_without_changing_state() {
    let store = AppointmentStore::with_state(loaded(vec![record(1, "a")]));
    let before = store.snapshot().await;

    let err = store
        .dispatch_value(json!({ "type": "RESET", "payload": null }))
        .await
        .expect_err("should reject");
    assert_eq!(err, StoreError::UnknownAction("RESET".into()));
    assert_eq!(*store.snapshot().await, *before);
}

#[tokio::test]
async fn store_broadcasts_each_applied_action_in_order() {
    let store = AppointmentStore::new();
    let mut changes = store.subscribe();

    store.dispatch(Action::FetchStart).await;
    store
        .dispatch(Action::FetchSuccess(vec![record(1, "a")]))
        .await;
    store.dispatch(Action::Add(record(2, "b"))).await;

    let first = changes.recv().await.expect("first");
    assert_eq!(first.action, "FETCH_APPOINTMENTS_START");
    assert!(first.state.loading);

    let second = changes.recv().await.expect("second");
    assert_eq!(second.action, "FETCH_APPOINTMENTS_SUCCESS");
    assert_eq!(second.state.appointments.len(), 1);

    let third = changes.recv().await.expect("third");
    assert_eq!(third.action, "ADD_APPOINTMENT");
    assert_eq!(*third.state, *store.snapshot().await);
}
