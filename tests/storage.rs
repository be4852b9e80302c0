#![forbid(unsafe_code)]
mod common;

use common::*;
use permanence::{
    AssignmentId, AssignmentInput, JsonStorage, MemoryStorage, RosterError, RosterService, Storage,
    Term,
};
use std::fs;
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;
use tempfile::tempdir;

#[test]
fn missing_file_loads_empty_roster() {
    let dir = tempdir().unwrap();
    let storage = JsonStorage::open(dir.path().join("roster.json")).unwrap();
    let roster = storage.load().unwrap();
    assert!(roster.members.is_empty());
    assert!(roster.assignments.is_empty());
}

#[test]
fn failed_transaction_leaves_file_untouched() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("roster.json");
    let storage = JsonStorage::open(&path).unwrap();
    storage.save(&two_by_two().into_roster()).unwrap();
    let before = fs::read(&path).unwrap();

    let result: Result<(), RosterError> = storage.transaction(|roster| {
        roster.members.clear();
        Err(RosterError::InvalidInput("abort".into()))
    });
    assert!(result.is_err());
    assert_eq!(fs::read(&path).unwrap(), before);

    storage
        .transaction(|roster| {
            roster.members.retain(|m| m.name == "Alice");
            Ok::<_, RosterError>(())
        })
        .unwrap();
    assert_eq!(storage.load().unwrap().members.len(), 1);
}

#[test]
fn service_generate_then_rejected_edit_is_not_persisted() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("roster.json");
    let storage = JsonStorage::open(&path).unwrap();
    storage.save(&two_by_two().into_roster()).unwrap();
    let service = RosterService::new(storage, settings());

    let outcome = service.generate(&first_week(&[1, 2])).unwrap();
    assert_eq!(outcome.assignments_created, 10);
    let before = fs::read(&path).unwrap();

    // id 2 = Bob, Reading Room, lundi
    let err = service
        .update_assignment(
            AssignmentId::new(2),
            &AssignmentInput {
                member: 2,
                room: 1,
                weekday: 1,
                term: "FIRST_TERM".into(),
            },
        )
        .unwrap_err();
    assert_eq!(err.status_code(), 409);
    assert_eq!(fs::read(&path).unwrap(), before);

    let findings = service.verify(Term::First).unwrap();
    assert!(!permanence::scheduler::has_errors(&findings));
    service.publish(Term::First).unwrap();
    assert!(service.storage().load().unwrap().is_published(Term::First));
}

#[test]
fn infeasible_generation_commits_nothing() {
    let mut roster = two_by_two().into_roster();
    roster.upsert_rooms(vec![permanence::Room::new(3, "Archive", 1).unwrap()]);
    let service = RosterService::new(MemoryStorage::new(roster.clone()), settings());

    let err = service.generate(&first_week(&[1, 2])).unwrap_err();
    assert!(matches!(err, RosterError::GenerationInfeasible { .. }));
    assert_eq!(service.storage().load().unwrap(), roster);
}

#[test]
fn storage_errors_are_unrecoverable() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("roster.json");
    fs::write(&path, b"{ not json").unwrap();
    let service = RosterService::new(JsonStorage::open(&path).unwrap(), settings());

    let err = service.verify(Term::First).unwrap_err();
    assert!(matches!(err, RosterError::Storage(_)));
    assert_eq!(err.status_code(), 500);
    assert!(!err.is_recoverable());
}

#[test]
fn concurrent_writers_on_one_file_do_not_lose_updates() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("roster.json");
    let start = Arc::new(Barrier::new(2));

    let writers: Vec<_> = [alice(), bob()]
        .into_iter()
        .map(|member| {
            let path = path.clone();
            let start = Arc::clone(&start);
            thread::spawn(move || {
                // une instance par écrivain, comme deux processus CLI
                let storage = JsonStorage::open(&path).unwrap();
                start.wait();
                storage.transaction(|roster| {
                    thread::sleep(Duration::from_millis(100));
                    roster.upsert_members(vec![member]);
                    Ok::<_, RosterError>(())
                })
            })
        })
        .collect();
    for writer in writers {
        writer.join().unwrap().unwrap();
    }

    let members = JsonStorage::open(&path).unwrap().load().unwrap().members;
    assert_eq!(members.len(), 2);
}
