use super::Violation;
use crate::model::{
    Assignment, AssignmentId, MemberId, Placement, Room, RoomId, Roster, Term, Weekday,
};
use std::collections::{BTreeMap, BTreeSet};

/// Vérifie qu'un candidat peut rejoindre l'instantané `existing`.
///
/// `replacing` exclut l'assignation modifiée en place : elle ne compte ni comme doublon ni dans
/// l'occupation de la salle. Fonction pure, partagée par le générateur et l'éditeur.
pub fn check(
    candidate: &Placement,
    existing: &[Assignment],
    room: &Room,
    directory: &Roster,
    replacing: Option<AssignmentId>,
) -> Result<(), Violation> {
    let others = existing.iter().filter(|a| {
        Some(a.id) != replacing && a.term == candidate.term && a.weekday == candidate.weekday
    });

    let mut occupants = Vec::new();
    let mut other_room = None;
    for a in others {
        if a.member == candidate.member && a.room == candidate.room {
            return Err(Violation::DuplicateAssignment {
                member: candidate.member,
                member_name: member_name(directory, candidate.member),
                room: room.id,
                room_name: room.name.clone(),
                weekday: candidate.weekday,
                term: candidate.term,
            });
        }
        if a.room == candidate.room {
            occupants.push(a.member);
        } else if a.member == candidate.member {
            other_room.get_or_insert(a.room);
        }
    }

    if occupants.len() >= room.capacity as usize {
        return Err(Violation::RoomCapacityExceeded {
            room: room.id,
            room_name: room.name.clone(),
            capacity: room.capacity,
            weekday: candidate.weekday,
            term: candidate.term,
            occupants: occupants.into_iter().map(|m| member_name(directory, m)).collect(),
        });
    }

    if let Some(other) = other_room {
        return Err(Violation::MemberDoubleBooked {
            member: candidate.member,
            member_name: member_name(directory, candidate.member),
            other_room_name: room_name(directory, other),
            weekday: candidate.weekday,
            term: candidate.term,
        });
    }

    Ok(())
}

/// Re-dérive toutes les violations présentes dans un roster persisté (édition hors-bande comprise).
pub fn audit(roster: &Roster, term: Term) -> Vec<Violation> {
    let mut pairs: BTreeMap<(MemberId, RoomId, Weekday), usize> = BTreeMap::new();
    let mut cells: BTreeMap<(RoomId, Weekday), Vec<MemberId>> = BTreeMap::new();
    let mut days: BTreeMap<(MemberId, Weekday), BTreeSet<RoomId>> = BTreeMap::new();

    for a in roster.assignments_in(term) {
        *pairs.entry((a.member, a.room, a.weekday)).or_default() += 1;
        cells.entry((a.room, a.weekday)).or_default().push(a.member);
        days.entry((a.member, a.weekday)).or_default().insert(a.room);
    }

    let mut out = Vec::new();

    for ((member, room, weekday), count) in pairs {
        if count > 1 {
            out.push(Violation::DuplicateAssignment {
                member,
                member_name: member_name(roster, member),
                room,
                room_name: room_name(roster, room),
                weekday,
                term,
            });
        }
    }

    for ((room_id, weekday), members) in cells {
        let Some(room) = roster.find_room(room_id) else {
            continue;
        };
        if members.len() > room.capacity as usize {
            out.push(Violation::RoomCapacityExceeded {
                room: room_id,
                room_name: room.name.clone(),
                capacity: room.capacity,
                weekday,
                term,
                occupants: members.iter().map(|m| member_name(roster, *m)).collect(),
            });
        }
    }

    for ((member, weekday), rooms) in days {
        if rooms.len() > 1 {
            out.push(Violation::MemberDoubleBooked {
                member,
                member_name: member_name(roster, member),
                other_room_name: rooms
                    .iter()
                    .map(|r| room_name(roster, *r))
                    .collect::<Vec<_>>()
                    .join(" + "),
                weekday,
                term,
            });
        }
    }

    out
}

pub(super) fn member_name(roster: &Roster, id: MemberId) -> String {
    roster
        .find_member(id)
        .map_or_else(|| format!("member #{id}"), |m| m.name.clone())
}

pub(super) fn room_name(roster: &Roster, id: RoomId) -> String {
    roster
        .find_room(id)
        .map_or_else(|| format!("room #{id}"), |r| r.name.clone())
}
