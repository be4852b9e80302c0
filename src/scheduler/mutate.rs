use super::{
    guard, verify, AssignmentInput, ChangeSummary, Finding, RosterError, Scheduler, Severity,
    UpdatedAssignment, VerifyOptions,
};
use crate::model::{Assignment, AssignmentId, Placement, Room, Term};

/// Résout membre et salle ; chaque référence manquante a son erreur.
fn resolve<'a>(scheduler: &'a Scheduler, placement: &Placement) -> Result<&'a Room, RosterError> {
    if scheduler.roster.find_member(placement.member).is_none() {
        return Err(RosterError::MemberNotFound(placement.member));
    }
    scheduler
        .roster
        .find_room(placement.room)
        .ok_or(RosterError::RoomNotFound(placement.room))
}

pub(super) fn update(
    scheduler: &mut Scheduler,
    id: AssignmentId,
    input: &AssignmentInput,
) -> Result<UpdatedAssignment, RosterError> {
    let placement = input.parse()?;
    let before = scheduler
        .roster
        .find_assignment(id)
        .cloned()
        .ok_or(RosterError::AssignmentNotFound(id))?;
    let room = resolve(scheduler, &placement)?;

    guard::check(&placement, &scheduler.roster.assignments, room, &scheduler.roster, Some(id))?;

    let after = Assignment::from_placement(id, placement);
    let changes = ChangeSummary::between(&before, &after);
    if !changes.is_noop() {
        let slot = scheduler
            .roster
            .find_assignment_mut(id)
            .ok_or(RosterError::AssignmentNotFound(id))?;
        *slot = after.clone();
        scheduler.roster.mark_draft(before.term);
        scheduler.roster.mark_draft(after.term);
    }

    Ok(UpdatedAssignment {
        before,
        after,
        changes,
    })
}

pub(super) fn add(scheduler: &mut Scheduler, input: &AssignmentInput) -> Result<Assignment, RosterError> {
    let placement = input.parse()?;
    let room = resolve(scheduler, &placement)?;
    guard::check(&placement, &scheduler.roster.assignments, room, &scheduler.roster, None)?;

    let id = scheduler.roster.push_assignment(placement);
    scheduler.roster.mark_draft(placement.term);
    Ok(Assignment::from_placement(id, placement))
}

pub(super) fn delete(scheduler: &mut Scheduler, id: AssignmentId) -> Result<Assignment, RosterError> {
    let pos = scheduler
        .roster
        .assignments
        .iter()
        .position(|a| a.id == id)
        .ok_or(RosterError::AssignmentNotFound(id))?;
    let removed = scheduler.roster.assignments.remove(pos);
    scheduler.roster.mark_draft(removed.term);
    Ok(removed)
}

pub(super) fn publish(
    scheduler: &mut Scheduler,
    term: Term,
    opts: &VerifyOptions,
) -> Result<Vec<Finding>, RosterError> {
    let findings = verify::verify(&scheduler.roster, term, opts);
    let errors = findings
        .iter()
        .filter(|f| f.severity == Severity::Error)
        .count();
    if errors > 0 {
        return Err(RosterError::NotPublishable { term, errors });
    }
    scheduler.roster.mark_published(term);
    Ok(findings)
}
