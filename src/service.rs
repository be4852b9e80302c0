//! Les opérations exposées aux collaborateurs (pages, CLI), chacune dans une transaction du stockage.

use crate::config::Settings;
use crate::io::{self, ExportFormat};
use crate::model::{Assignment, AssignmentId, Member, Room, Term};
use crate::scheduler::{
    AssignmentInput, Finding, GenerationOutcome, GenerationRequest, RosterError, Scheduler,
    UpdatedAssignment,
};
use crate::storage::Storage;
use std::io::Write;
use tracing::{info, warn};

pub struct RosterService<S> {
    storage: S,
    settings: Settings,
}

impl<S: Storage> RosterService<S> {
    pub fn new(storage: S, settings: Settings) -> Self {
        Self { storage, settings }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    fn with_scheduler<T, F>(&self, f: F) -> Result<T, RosterError>
    where
        F: FnOnce(&mut Scheduler) -> Result<T, RosterError>,
    {
        self.storage.transaction(|roster| {
            let mut scheduler = Scheduler::from_roster(std::mem::take(roster));
            let out = f(&mut scheduler);
            *roster = scheduler.into_roster();
            out
        })
    }

    pub fn import_members(&self, members: Vec<Member>) -> Result<usize, RosterError> {
        let count = members.len();
        self.storage.transaction(|roster| {
            roster.upsert_members(members);
            Ok::<_, RosterError>(())
        })?;
        info!(count, "members imported");
        Ok(count)
    }

    pub fn import_rooms(&self, rooms: Vec<Room>) -> Result<usize, RosterError> {
        let count = rooms.len();
        self.storage.transaction(|roster| {
            roster.upsert_rooms(rooms);
            Ok::<_, RosterError>(())
        })?;
        info!(count, "rooms imported");
        Ok(count)
    }

    pub fn generate(&self, request: &GenerationRequest) -> Result<GenerationOutcome, RosterError> {
        let settings = &self.settings;
        let result = self.with_scheduler(|scheduler| {
            scheduler.generate(
                request,
                &settings.calendar,
                &settings.eligible_grades,
                settings.generate_options(),
            )
        });
        match &result {
            Ok(outcome) => info!(
                created = outcome.assignments_created,
                gaps = outcome.gaps.len(),
                "generation committed"
            ),
            Err(err) => warn!(error = %err, "generation rolled back"),
        }
        result
    }

    /// Lecture seule.
    pub fn verify(&self, term: Term) -> Result<Vec<Finding>, RosterError> {
        let roster = self.storage.load()?;
        Ok(Scheduler::from_roster(roster).verify(term, &self.settings.verify_options()))
    }

    pub fn update_assignment(
        &self,
        id: AssignmentId,
        input: &AssignmentInput,
    ) -> Result<UpdatedAssignment, RosterError> {
        let result = self.with_scheduler(|scheduler| scheduler.update_assignment(id, input));
        if let Err(err) = &result {
            warn!(assignment = %id, error = %err, "edit rejected");
        }
        result
    }

    pub fn add_assignment(&self, input: &AssignmentInput) -> Result<Assignment, RosterError> {
        self.with_scheduler(|scheduler| scheduler.add_assignment(input))
    }

    pub fn delete_assignment(&self, id: AssignmentId) -> Result<Assignment, RosterError> {
        self.with_scheduler(|scheduler| scheduler.delete_assignment(id))
    }

    pub fn publish(&self, term: Term) -> Result<Vec<Finding>, RosterError> {
        let opts = self.settings.verify_options();
        let findings = self.with_scheduler(|scheduler| scheduler.publish(term, &opts))?;
        info!(%term, "term published");
        Ok(findings)
    }

    pub fn export<W: Write>(
        &self,
        writer: W,
        term: Option<Term>,
        format: ExportFormat,
    ) -> Result<(), RosterError> {
        let roster = self.storage.load()?;
        io::export(writer, &roster, term, format)?;
        Ok(())
    }
}
