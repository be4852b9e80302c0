mod generate;
pub mod guard;
mod mutate;
pub mod policy;
mod types;
mod verify;

pub use policy::{BalancedLoad, LoadBook, LoadPolicy, Rotation};
pub use types::{
    AssignmentInput, ChangeSummary, Finding, FindingRule, Gap, GapReason, GenerateOptions,
    GenerationOutcome, GenerationRequest, PolicyKind, RosterError, Severity, UpdatedAssignment,
    Violation, VerifyOptions,
};
pub use verify::has_errors;

use crate::calendar::TermCalendar;
use crate::model::{Assignment, AssignmentId, Roster, Term};

/// Scheduler : encapsule le Roster sur lequel portent génération, vérification et éditions.
///
/// Chaque opération laisse le roster intact lorsqu'elle échoue.
#[derive(Debug, Default)]
pub struct Scheduler {
    roster: Roster,
}

impl Scheduler {
    pub fn new() -> Self {
        Self {
            roster: Roster::default(),
        }
    }

    pub fn from_roster(roster: Roster) -> Self {
        Self { roster }
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }
    pub fn roster_mut(&mut self) -> &mut Roster {
        &mut self.roster
    }
    pub fn into_roster(self) -> Roster {
        self.roster
    }

    /// Remplit chaque case (salle, jour) des trimestres visés ; les cases impossibles deviennent des trous.
    pub fn generate(
        &mut self,
        request: &GenerationRequest,
        calendar: &TermCalendar,
        eligible_grades: &[u8],
        opts: GenerateOptions,
    ) -> Result<GenerationOutcome, RosterError> {
        generate::generate(self, request, calendar, eligible_grades, opts)
    }

    /// Constats triés par gravité (erreurs, avertissements, ok).
    pub fn verify(&self, term: Term, opts: &VerifyOptions) -> Vec<Finding> {
        verify::verify(&self.roster, term, opts)
    }

    pub fn update_assignment(
        &mut self,
        id: AssignmentId,
        input: &AssignmentInput,
    ) -> Result<UpdatedAssignment, RosterError> {
        mutate::update(self, id, input)
    }

    pub fn add_assignment(&mut self, input: &AssignmentInput) -> Result<Assignment, RosterError> {
        mutate::add(self, input)
    }

    pub fn delete_assignment(&mut self, id: AssignmentId) -> Result<Assignment, RosterError> {
        mutate::delete(self, id)
    }

    pub fn publish(&mut self, term: Term, opts: &VerifyOptions) -> Result<Vec<Finding>, RosterError> {
        mutate::publish(self, term, opts)
    }
}
