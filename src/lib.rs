#![forbid(unsafe_code)]
//! Permanence — planning hebdomadaire des permanences du comité bibliothèque (sans BD).
//!
//! - Stockage fichier JSON, écritures atomiques et transactionnelles.
//! - Génération équilibrée (charge minimale puis identifiant), exclusions respectées.
//! - Garde de contraintes partagée : capacité, doublons, une salle par jour.
//! - Vérification avant publication, éditions unitaires revalidées.

pub mod calendar;
pub mod changelog;
pub mod config;
pub mod io;
pub mod model;
pub mod scheduler;
pub mod service;
pub mod storage;

pub use calendar::{TermCalendar, TermWindow};
pub use changelog::{ChangeRenderer, TextChangeLog};
pub use config::Settings;
pub use model::{
    Assignment, AssignmentId, ExclusionDate, Member, MemberId, Placement, Role, Room, RoomId,
    Roster, Term, Weekday,
};
pub use scheduler::{
    AssignmentInput, ChangeSummary, Finding, FindingRule, Gap, GapReason, GenerateOptions,
    GenerationOutcome, GenerationRequest, PolicyKind, RosterError, Scheduler, Severity,
    UpdatedAssignment, Violation, VerifyOptions,
};
pub use service::RosterService;
pub use storage::{JsonStorage, MemoryStorage, Storage};
