use super::policy::{policy_for, LoadBook};
use super::{
    guard, Gap, GapReason, GenerateOptions, GenerationOutcome, GenerationRequest, RosterError,
    Scheduler,
};
use crate::calendar::TermCalendar;
use crate::model::{ExclusionDate, MemberId, Placement, Room, Roster, Term, Weekday};
use std::collections::BTreeSet;
use tracing::{debug, info, warn};

pub(super) fn generate(
    scheduler: &mut Scheduler,
    request: &GenerationRequest,
    calendar: &TermCalendar,
    eligible_grades: &[u8],
    opts: GenerateOptions,
) -> Result<GenerationOutcome, RosterError> {
    if request.end < request.start {
        return Err(RosterError::InvalidInput(format!(
            "end date {} is before start date {}",
            request.end, request.start
        )));
    }

    let mut work = scheduler.roster.clone();
    if work.rooms.is_empty() {
        return Err(RosterError::InvalidInput("no rooms configured".to_string()));
    }

    let members = eligible_members(&work, &request.members, eligible_grades)?;
    let blackout = blackout_slots(&work, &request.exclusions, calendar)?;

    let windows: Vec<_> = calendar
        .overlapping(request.start, request.end)
        .into_iter()
        .filter(|(term, _)| request.term.map_or(true, |t| t == *term))
        .collect();
    if windows.is_empty() {
        return Err(RosterError::InvalidInput(format!(
            "{} .. {} does not overlap {}",
            request.start,
            request.end,
            request.term.map_or_else(|| "any term".to_string(), |t| t.to_string())
        )));
    }

    for (term, _) in &windows {
        let existing = work.assignments_in(*term).count();
        if existing == 0 {
            continue;
        }
        if !request.force_regenerate {
            return Err(RosterError::InvalidInput(format!(
                "{term} already holds {existing} assignment(s); regenerate with force to replace them"
            )));
        }
        work.clear_term(*term);
        info!(%term, removed = existing, "cleared term before regeneration");
    }

    let mut rooms: Vec<Room> = work.rooms.clone();
    rooms.sort_by_key(|r| r.id);

    if members.len() < rooms.len() {
        // un membre ne tient qu'une salle par jour : les salles en surnombre ne seront jamais pourvues
        let cells: Vec<Gap> = windows
            .iter()
            .flat_map(|(term, window)| {
                let short = &rooms[members.len()..];
                window.weekdays().into_iter().flat_map(move |weekday| {
                    short.iter().map(move |room| Gap {
                        term: *term,
                        weekday,
                        room: room.id,
                        room_name: room.name.clone(),
                        reason: GapReason::NoCandidate,
                    })
                })
            })
            .collect();
        return Err(RosterError::GenerationInfeasible { cells });
    }

    let mut loads = LoadBook::with_members(members.iter().copied());
    let mut policy = policy_for(opts.policy, &members);
    let mut outcome = GenerationOutcome::default();

    for (term, window) in &windows {
        let term = *term;
        outcome.terms.push(term);
        for weekday in window.weekdays() {
            for room in &rooms {
                let mut candidates = Vec::new();
                let mut blocked_by_exclusion = false;
                for member in &members {
                    let placement = Placement {
                        member: *member,
                        room: room.id,
                        weekday,
                        term,
                    };
                    if guard::check(&placement, &work.assignments, room, &work, None).is_err() {
                        continue;
                    }
                    if blackout.contains(&(*member, term, weekday)) {
                        blocked_by_exclusion = true;
                        continue;
                    }
                    candidates.push(*member);
                }

                match policy.pick(&candidates, &loads) {
                    Some(member) => {
                        let id = work.push_assignment(Placement {
                            member,
                            room: room.id,
                            weekday,
                            term,
                        });
                        loads.record(member);
                        outcome.created.push(id);
                        debug!(%term, %weekday, room = %room.name, %member, "placed");
                    }
                    None => {
                        let gap = Gap {
                            term,
                            weekday,
                            room: room.id,
                            room_name: room.name.clone(),
                            reason: if blocked_by_exclusion {
                                GapReason::Excluded
                            } else {
                                GapReason::NoCandidate
                            },
                        };
                        warn!(gap = %gap, reason = ?gap.reason, "cell left empty");
                        outcome.gaps.push(gap);
                    }
                }
            }
        }
        work.mark_draft(term);
    }

    if opts.fail_on_gaps && !outcome.gaps.is_empty() {
        return Err(RosterError::GenerationInfeasible { cells: outcome.gaps });
    }

    outcome.assignments_created = outcome.created.len();
    info!(
        policy = policy.name(),
        created = outcome.assignments_created,
        gaps = outcome.gaps.len(),
        spread = loads.spread(),
        "roster generated"
    );
    scheduler.roster = work;
    Ok(outcome)
}

/// Membres retenus, dans l'ordre de la demande ou par identifiant à défaut.
fn eligible_members(
    roster: &Roster,
    requested: &[MemberId],
    eligible_grades: &[u8],
) -> Result<Vec<MemberId>, RosterError> {
    if requested.is_empty() {
        let mut ids: Vec<MemberId> = roster
            .members
            .iter()
            .filter(|m| eligible_grades.contains(&m.grade))
            .map(|m| m.id)
            .collect();
        ids.sort();
        return Ok(ids);
    }

    let mut seen = BTreeSet::new();
    for id in requested {
        if roster.find_member(*id).is_none() {
            return Err(RosterError::MemberNotFound(*id));
        }
        if !seen.insert(*id) {
            return Err(RosterError::InvalidInput(format!("member {id} listed twice")));
        }
    }
    Ok(requested.to_vec())
}

/// Traduit chaque date d'exclusion en (membre, trimestre, jour) interdit.
fn blackout_slots(
    roster: &Roster,
    exclusions: &[ExclusionDate],
    calendar: &TermCalendar,
) -> Result<BTreeSet<(MemberId, Term, Weekday)>, RosterError> {
    let mut out = BTreeSet::new();
    for exclusion in exclusions {
        if roster.find_member(exclusion.member).is_none() {
            return Err(RosterError::MemberNotFound(exclusion.member));
        }
        match calendar.resolve(exclusion.date) {
            Some((term, weekday)) => {
                out.insert((exclusion.member, term, weekday));
            }
            None => warn!(
                member = %exclusion.member,
                date = %exclusion.date,
                "exclusion outside any term weekday, ignored"
            ),
        }
    }
    Ok(out)
}
