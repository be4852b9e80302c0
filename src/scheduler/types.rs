use crate::model::{Assignment, AssignmentId, ExclusionDate, MemberId, Placement, RoomId, Term, Weekday};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Stratégie de répartition de charge utilisée par le générateur.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PolicyKind {
    /// Charge minimale, puis plus petit identifiant.
    #[default]
    Balanced,
    /// Tourniquet sur la liste ordonnée des membres.
    Rotation,
}

/// Options de génération
#[derive(Debug, Clone, Copy, Default)]
pub struct GenerateOptions {
    pub policy: PolicyKind,
    /// Transforme toute case vide en `GenerationInfeasible`.
    pub fail_on_gaps: bool,
}

/// Options de vérification
#[derive(Debug, Clone)]
pub struct VerifyOptions {
    pub balance_threshold: u32,
    /// Niveaux dont les membres entrent dans le calcul d'équilibre (vide = membres présents au planning).
    pub eligible_grades: Vec<u8>,
}

impl Default for VerifyOptions {
    fn default() -> Self {
        Self {
            balance_threshold: 1,
            eligible_grades: Vec::new(),
        }
    }
}

/// Demande de génération telle que reçue d'un collaborateur.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// `None` : tous les trimestres recoupant [start, end].
    #[serde(default)]
    pub term: Option<Term>,
    /// Ordre significatif ; vide = membres éligibles par niveau.
    #[serde(default)]
    pub members: Vec<MemberId>,
    pub start: NaiveDate,
    pub end: NaiveDate,
    #[serde(default)]
    pub exclusions: Vec<ExclusionDate>,
    #[serde(default)]
    pub force_regenerate: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GapReason {
    /// Aucun membre libre ce jour-là.
    NoCandidate,
    /// Au moins un membre aurait convenu sans son exclusion.
    Excluded,
}

/// Case (salle, jour) laissée vide.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Gap {
    pub term: Term,
    pub weekday: Weekday,
    pub room: RoomId,
    pub room_name: String,
    pub reason: GapReason,
}

impl fmt::Display for Gap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} / {} / {}", self.term, self.weekday, self.room_name)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationOutcome {
    pub terms: Vec<Term>,
    pub assignments_created: usize,
    pub created: Vec<AssignmentId>,
    pub gaps: Vec<Gap>,
}

/// Conflit détecté par la garde de contraintes.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    #[error("{member_name} already staffs {room_name} on {weekday} ({term})")]
    DuplicateAssignment {
        member: MemberId,
        member_name: String,
        room: RoomId,
        room_name: String,
        weekday: Weekday,
        term: Term,
    },
    #[error("{room_name} is full on {weekday} ({term}): capacity {capacity}, staffed by {}", .occupants.join(", "))]
    RoomCapacityExceeded {
        room: RoomId,
        room_name: String,
        capacity: u32,
        weekday: Weekday,
        term: Term,
        occupants: Vec<String>,
    },
    #[error("{member_name} already staffs {other_room_name} on {weekday} ({term})")]
    MemberDoubleBooked {
        member: MemberId,
        member_name: String,
        other_room_name: String,
        weekday: Weekday,
        term: Term,
    },
}

impl Violation {
    pub const fn code(&self) -> &'static str {
        match self {
            Self::DuplicateAssignment { .. } => "DUPLICATE_ASSIGNMENT",
            Self::RoomCapacityExceeded { .. } => "ROOM_CAPACITY_EXCEEDED",
            Self::MemberDoubleBooked { .. } => "MEMBER_DOUBLE_BOOKED",
        }
    }
}

#[derive(Error, Debug)]
pub enum RosterError {
    #[error("assignment not found: {0}")]
    AssignmentNotFound(AssignmentId),
    #[error("member not found: {0}")]
    MemberNotFound(MemberId),
    #[error("room not found: {0}")]
    RoomNotFound(RoomId),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error(transparent)]
    Violation(#[from] Violation),
    #[error("generation infeasible: {} cell(s) cannot be filled", .cells.len())]
    GenerationInfeasible { cells: Vec<Gap> },
    #[error("{term} cannot be published: {errors} error finding(s)")]
    NotPublishable { term: Term, errors: usize },
    #[error("storage failure: {0:#}")]
    Storage(#[from] anyhow::Error),
}

impl RosterError {
    /// Code HTTP équivalent.
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::AssignmentNotFound(_) | Self::MemberNotFound(_) | Self::RoomNotFound(_) => 404,
            Self::InvalidInput(_) => 400,
            Self::Violation(_) => 409,
            Self::GenerationInfeasible { .. } | Self::NotPublishable { .. } => 422,
            Self::Storage(_) => 500,
        }
    }

    /// Seules les pannes de stockage ne se corrigent pas en ajustant la demande.
    pub const fn is_recoverable(&self) -> bool {
        !matches!(self, Self::Storage(_))
    }
}

/// Saisie brute d'une permanence (formulaire, CLI) ; validée avant toute contrainte.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignmentInput {
    pub member: u64,
    pub room: u64,
    pub weekday: u8,
    pub term: String,
}

impl AssignmentInput {
    pub fn parse(&self) -> Result<Placement, RosterError> {
        let weekday = Weekday::try_from(self.weekday).map_err(RosterError::InvalidInput)?;
        let term = self.term.parse::<Term>().map_err(RosterError::InvalidInput)?;
        Ok(Placement {
            member: MemberId::new(self.member),
            room: RoomId::new(self.room),
            weekday,
            term,
        })
    }
}

/// Champs modifiés par une édition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ChangeSummary {
    pub member_changed: bool,
    pub room_changed: bool,
    pub day_changed: bool,
    pub term_changed: bool,
}

impl ChangeSummary {
    pub fn between(before: &Assignment, after: &Assignment) -> Self {
        Self {
            member_changed: before.member != after.member,
            room_changed: before.room != after.room,
            day_changed: before.weekday != after.weekday,
            term_changed: before.term != after.term,
        }
    }

    pub const fn is_noop(&self) -> bool {
        !(self.member_changed || self.room_changed || self.day_changed || self.term_changed)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdatedAssignment {
    pub before: Assignment,
    pub after: Assignment,
    pub changes: ChangeSummary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Ok,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Ok => "ok",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FindingRule {
    Completeness,
    Balance,
    Integrity,
}

impl FindingRule {
    pub const fn code(self) -> &'static str {
        match self {
            Self::Completeness => "COMPLETENESS",
            Self::Balance => "BALANCE",
            Self::Integrity => "INTEGRITY",
        }
    }
}

/// Résultat d'une règle de vérification, recalculé à la demande.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    pub severity: Severity,
    pub rule: FindingRule,
    pub message: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<String>,
}

impl Finding {
    pub(super) fn new<M: Into<String>>(severity: Severity, rule: FindingRule, message: M) -> Self {
        Self {
            severity,
            rule,
            message: message.into(),
            details: Vec::new(),
        }
    }

    pub(super) fn with_details(mut self, details: Vec<String>) -> Self {
        self.details = details;
        self
    }
}
