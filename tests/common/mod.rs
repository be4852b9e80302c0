#![allow(dead_code)]
use chrono::NaiveDate;
use permanence::{
    GenerationRequest, Member, MemberId, Room, Roster, Scheduler, Settings, TermCalendar,
};

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// 1er sept. 2025 → 31 janv. 2026, puis → 31 juil. 2026.
pub fn calendar() -> TermCalendar {
    TermCalendar::for_academic_year(2025).unwrap()
}

pub fn settings() -> Settings {
    Settings::for_date(date(2025, 10, 1)).unwrap()
}

pub fn alice() -> Member {
    Member::new(1, "Alice", 5, "5-A")
}

pub fn bob() -> Member {
    Member::new(2, "Bob", 6, "6-B")
}

pub fn carol() -> Member {
    Member::new(3, "Carol", 6, "6-A")
}

pub fn library() -> Room {
    Room::new(1, "Library", 1).unwrap()
}

pub fn reading_room() -> Room {
    Room::new(2, "Reading Room", 1).unwrap()
}

pub fn roster(members: Vec<Member>, rooms: Vec<Room>) -> Roster {
    let mut roster = Roster::default();
    roster.upsert_members(members);
    roster.upsert_rooms(rooms);
    roster
}

/// Deux salles de capacité 1, Alice et Bob.
pub fn two_by_two() -> Scheduler {
    Scheduler::from_roster(roster(vec![alice(), bob()], vec![library(), reading_room()]))
}

/// Semaine du lundi 1er au vendredi 5 septembre 2025 (FIRST_TERM).
pub fn first_week(members: &[u64]) -> GenerationRequest {
    GenerationRequest {
        term: Some(permanence::Term::First),
        members: members.iter().copied().map(MemberId::new).collect(),
        start: date(2025, 9, 1),
        end: date(2025, 9, 5),
        exclusions: Vec::new(),
        force_regenerate: false,
    }
}
