use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

macro_rules! numeric_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(u64);

        impl $name {
            pub const fn new(raw: u64) -> Self {
                Self(raw)
            }
            pub const fn get(self) -> u64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

numeric_id!(
    /// Identifiant fort pour Member
    MemberId
);
numeric_id!(
    /// Identifiant fort pour Room
    RoomId
);
numeric_id!(
    /// Identifiant fort pour Assignment
    AssignmentId
);

/// Fonction au sein du comité.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Role {
    Chair,
    Secretary,
    #[default]
    Member,
    Custom(String),
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.trim();
        Ok(match raw.to_ascii_lowercase().as_str() {
            "chair" => Self::Chair,
            "secretary" => Self::Secretary,
            "" | "member" => Self::Member,
            _ => Self::Custom(raw.to_string()),
        })
    }
}

/// Élève membre du comité bibliothèque.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub id: MemberId,
    pub name: String,
    pub grade: u8,
    pub class: String,
    #[serde(default)]
    pub role: Role,
}

impl Member {
    pub fn new<N: Into<String>, C: Into<String>>(id: u64, name: N, grade: u8, class: C) -> Self {
        Self {
            id: MemberId::new(id),
            name: name.into(),
            grade,
            class: class.into(),
            role: Role::Member,
        }
    }
}

/// Salle à tenir ; `capacity` borne le nombre de permanences par jour et par trimestre.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    pub id: RoomId,
    pub name: String,
    pub capacity: u32,
}

impl Room {
    pub fn new<N: Into<String>>(id: u64, name: N, capacity: u32) -> Result<Self, String> {
        if capacity == 0 {
            return Err("room capacity must be at least 1".to_string());
        }
        Ok(Self {
            id: RoomId::new(id),
            name: name.into(),
            capacity,
        })
    }
}

/// Les deux semestres de l'année scolaire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Term {
    #[serde(rename = "FIRST_TERM")]
    First,
    #[serde(rename = "SECOND_TERM")]
    Second,
}

impl Term {
    pub const ALL: [Term; 2] = [Term::First, Term::Second];

    pub const fn label(self) -> &'static str {
        match self {
            Self::First => "FIRST_TERM",
            Self::Second => "SECOND_TERM",
        }
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Term {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "FIRST_TERM" | "FIRST" | "1" => Ok(Self::First),
            "SECOND_TERM" | "SECOND" | "2" => Ok(Self::Second),
            _ => Err(format!("unknown term: {s:?} (expected FIRST_TERM or SECOND_TERM)")),
        }
    }
}

/// Jour ouvré d'une permanence récurrente (1 = lundi ... 5 = vendredi).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Weekday {
    Monday = 1,
    Tuesday = 2,
    Wednesday = 3,
    Thursday = 4,
    Friday = 5,
}

impl Weekday {
    pub const ALL: [Weekday; 5] = [
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
    ];

    pub const fn number(self) -> u8 {
        self as u8
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Monday => "Monday",
            Self::Tuesday => "Tuesday",
            Self::Wednesday => "Wednesday",
            Self::Thursday => "Thursday",
            Self::Friday => "Friday",
        }
    }

    /// `None` pour samedi et dimanche.
    pub fn from_chrono(day: chrono::Weekday) -> Option<Self> {
        Self::try_from(day.number_from_monday() as u8).ok()
    }

    pub fn to_chrono(self) -> chrono::Weekday {
        match self {
            Self::Monday => chrono::Weekday::Mon,
            Self::Tuesday => chrono::Weekday::Tue,
            Self::Wednesday => chrono::Weekday::Wed,
            Self::Thursday => chrono::Weekday::Thu,
            Self::Friday => chrono::Weekday::Fri,
        }
    }
}

impl TryFrom<u8> for Weekday {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::Monday),
            2 => Ok(Self::Tuesday),
            3 => Ok(Self::Wednesday),
            4 => Ok(Self::Thursday),
            5 => Ok(Self::Friday),
            other => Err(format!("weekday must be between 1 and 5, got {other}")),
        }
    }
}

impl From<Weekday> for u8 {
    fn from(day: Weekday) -> Self {
        day.number()
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Emplacement récurrent occupé (ou candidat) : "ce membre tient cette salle chaque <jour> du trimestre".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Placement {
    pub member: MemberId,
    pub room: RoomId,
    pub weekday: Weekday,
    pub term: Term,
}

/// Permanence persistée.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    pub id: AssignmentId,
    pub member: MemberId,
    pub room: RoomId,
    pub weekday: Weekday,
    pub term: Term,
}

impl Assignment {
    pub fn from_placement(id: AssignmentId, placement: Placement) -> Self {
        Self {
            id,
            member: placement.member,
            room: placement.room,
            weekday: placement.weekday,
            term: placement.term,
        }
    }

    pub fn placement(&self) -> Placement {
        Placement {
            member: self.member,
            room: self.room,
            weekday: self.weekday,
            term: self.term,
        }
    }
}

/// Indisponibilité ponctuelle, uniquement consommée à la génération.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExclusionDate {
    pub member: MemberId,
    pub date: NaiveDate,
    #[serde(default)]
    pub reason: String,
}

impl ExclusionDate {
    pub fn new<R: Into<String>>(member: MemberId, date: NaiveDate, reason: R) -> Self {
        Self {
            member,
            date,
            reason: reason.into(),
        }
    }
}

/// Roster complet : annuaire + permanences + état de publication par trimestre.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Roster {
    #[serde(default)]
    pub members: Vec<Member>,
    #[serde(default)]
    pub rooms: Vec<Room>,
    #[serde(default)]
    pub assignments: Vec<Assignment>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub published: BTreeSet<Term>,
    /// Plus grand identifiant d'assignation déjà attribué, suppressions comprises.
    #[serde(default)]
    pub last_assignment_id: u64,
}

impl Roster {
    pub fn find_member(&self, id: MemberId) -> Option<&Member> {
        self.members.iter().find(|m| m.id == id)
    }
    pub fn find_room(&self, id: RoomId) -> Option<&Room> {
        self.rooms.iter().find(|r| r.id == id)
    }
    pub fn find_assignment(&self, id: AssignmentId) -> Option<&Assignment> {
        self.assignments.iter().find(|a| a.id == id)
    }
    pub fn find_assignment_mut(&mut self, id: AssignmentId) -> Option<&mut Assignment> {
        self.assignments.iter_mut().find(|a| a.id == id)
    }

    pub fn assignments_in(&self, term: Term) -> impl Iterator<Item = &Assignment> {
        self.assignments.iter().filter(move |a| a.term == term)
    }

    /// Prochain identifiant libre (max + 1), stable d'une exécution à l'autre.
    /// Un identifiant supprimé n'est jamais réattribué.
    pub fn next_assignment_id(&self) -> AssignmentId {
        let max = self.assignments.iter().map(|a| a.id.get()).max().unwrap_or(0);
        AssignmentId::new(max.max(self.last_assignment_id) + 1)
    }

    pub fn push_assignment(&mut self, placement: Placement) -> AssignmentId {
        let id = self.next_assignment_id();
        self.assignments.push(Assignment::from_placement(id, placement));
        self.last_assignment_id = id.get();
        id
    }

    /// Retire toutes les permanences d'un trimestre ; renvoie le nombre supprimé.
    pub fn clear_term(&mut self, term: Term) -> usize {
        let before = self.assignments.len();
        self.assignments.retain(|a| a.term != term);
        self.published.remove(&term);
        before - self.assignments.len()
    }

    pub fn is_published(&self, term: Term) -> bool {
        self.published.contains(&term)
    }

    /// Tout changement repasse le trimestre en brouillon.
    pub fn mark_draft(&mut self, term: Term) {
        self.published.remove(&term);
    }

    pub fn mark_published(&mut self, term: Term) {
        self.published.insert(term);
    }

    pub fn upsert_members(&mut self, members: Vec<Member>) {
        for member in members {
            match self.members.iter_mut().find(|m| m.id == member.id) {
                Some(existing) => *existing = member,
                None => self.members.push(member),
            }
        }
        self.members.sort_by_key(|m| m.id);
    }

    pub fn upsert_rooms(&mut self, rooms: Vec<Room>) {
        for room in rooms {
            match self.rooms.iter_mut().find(|r| r.id == room.id) {
                Some(existing) => *existing = room,
                None => self.rooms.push(room),
            }
        }
        self.rooms.sort_by_key(|r| r.id);
    }
}
