use super::guard::{self, member_name};
use super::policy::LoadBook;
use super::{Finding, FindingRule, Severity, Violation, VerifyOptions};
use crate::model::{Room, Roster, Term, Weekday};

pub(super) fn verify(roster: &Roster, term: Term, opts: &VerifyOptions) -> Vec<Finding> {
    let mut findings = Vec::new();
    findings.extend(completeness(roster, term));
    findings.extend(balance(roster, term, opts));
    findings.extend(integrity(roster, term));
    findings.sort_by_key(|f| f.severity);
    findings
}

pub fn has_errors(findings: &[Finding]) -> bool {
    findings.iter().any(|f| f.severity == Severity::Error)
}

fn completeness(roster: &Roster, term: Term) -> Vec<Finding> {
    let mut rooms: Vec<&Room> = roster.rooms.iter().collect();
    rooms.sort_by_key(|r| r.id);

    let mut out = Vec::new();
    for weekday in Weekday::ALL {
        for room in &rooms {
            let staffed: Vec<String> = roster
                .assignments_in(term)
                .filter(|a| a.room == room.id && a.weekday == weekday)
                .map(|a| member_name(roster, a.member))
                .collect();
            if staffed.is_empty() {
                out.push(
                    Finding::new(
                        Severity::Warning,
                        FindingRule::Completeness,
                        format!("{} has nobody on {weekday}", room.name),
                    )
                    .with_details(vec![format!("term: {term}"), format!("room id: {}", room.id)]),
                );
            } else if staffed.len() > room.capacity as usize {
                let mut details = staffed.clone();
                details.push(cell_key(&room.name, weekday, term));
                details.push(format!(
                    "see also: {} ROOM_CAPACITY_EXCEEDED",
                    FindingRule::Integrity.code()
                ));
                out.push(
                    Finding::new(
                        Severity::Error,
                        FindingRule::Completeness,
                        format!(
                            "{} holds {} members on {weekday} for a capacity of {}",
                            room.name,
                            staffed.len(),
                            room.capacity
                        ),
                    )
                    .with_details(details),
                );
            }
        }
    }

    if out.is_empty() {
        out.push(Finding::new(
            Severity::Ok,
            FindingRule::Completeness,
            format!("all {} cells of {term} are staffed", rooms.len() * Weekday::ALL.len()),
        ));
    }
    out
}

/// Clé commune aux constats qui décrivent la même case.
fn cell_key(room_name: &str, weekday: Weekday, term: Term) -> String {
    format!("cell: {room_name} / {weekday} / {term}")
}

fn balance(roster: &Roster, term: Term, opts: &VerifyOptions) -> Option<Finding> {
    let eligible = roster
        .members
        .iter()
        .filter(|m| opts.eligible_grades.contains(&m.grade))
        .map(|m| m.id);
    let mut loads = LoadBook::with_members(eligible);
    for a in roster.assignments_in(term) {
        loads.record(a.member);
    }

    if loads.iter().next().is_none() {
        return None;
    }

    let spread = loads.spread();
    let details = loads
        .iter()
        .map(|(member, count)| format!("{}: {count}", member_name(roster, member)))
        .collect();

    let finding = if spread > opts.balance_threshold {
        Finding::new(
            Severity::Warning,
            FindingRule::Balance,
            format!("load spread is {spread}, above the threshold of {}", opts.balance_threshold),
        )
    } else {
        Finding::new(
            Severity::Ok,
            FindingRule::Balance,
            format!("load spread is {spread}"),
        )
    };
    Some(finding.with_details(details))
}

fn integrity(roster: &Roster, term: Term) -> Vec<Finding> {
    let mut out: Vec<Finding> = guard::audit(roster, term)
        .into_iter()
        .map(|violation| {
            let mut details = vec![violation.code().to_string()];
            if let Violation::RoomCapacityExceeded {
                room_name,
                weekday,
                term,
                ..
            } = &violation
            {
                details.push(cell_key(room_name, *weekday, *term));
                details.push(format!("see also: {}", FindingRule::Completeness.code()));
            }
            Finding::new(Severity::Error, FindingRule::Integrity, violation.to_string())
                .with_details(details)
        })
        .collect();

    for a in roster.assignments_in(term) {
        if roster.find_member(a.member).is_none() {
            out.push(Finding::new(
                Severity::Error,
                FindingRule::Integrity,
                format!("assignment {} references unknown member {}", a.id, a.member),
            ));
        }
        if roster.find_room(a.room).is_none() {
            out.push(Finding::new(
                Severity::Error,
                FindingRule::Integrity,
                format!("assignment {} references unknown room {}", a.id, a.room),
            ));
        }
    }

    if out.is_empty() {
        out.push(Finding::new(
            Severity::Ok,
            FindingRule::Integrity,
            "no duplicate, over-capacity or double-booked assignment",
        ));
    }
    out
}
