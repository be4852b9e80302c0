use crate::model::{Assignment, Roster};
use crate::scheduler::UpdatedAssignment;

/// Permet de customiser le rendu d'une modification (journal texte, notification, etc.).
pub trait ChangeRenderer {
    fn render(&self, roster: &Roster, change: &UpdatedAssignment) -> String;
}

/// Une ligne lisible :
/// `#12 Alice @ Library / Monday / FIRST_TERM -> Bob @ Library / Monday / FIRST_TERM (member)`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TextChangeLog;

impl ChangeRenderer for TextChangeLog {
    fn render(&self, roster: &Roster, change: &UpdatedAssignment) -> String {
        let flags = change.changes;
        if flags.is_noop() {
            return format!("#{} unchanged ({})", change.before.id, describe(roster, &change.before));
        }

        let mut touched = Vec::new();
        if flags.member_changed {
            touched.push("member");
        }
        if flags.room_changed {
            touched.push("room");
        }
        if flags.day_changed {
            touched.push("day");
        }
        if flags.term_changed {
            touched.push("term");
        }

        format!(
            "#{} {} -> {} ({})",
            change.before.id,
            describe(roster, &change.before),
            describe(roster, &change.after),
            touched.join(", ")
        )
    }
}

fn describe(roster: &Roster, assignment: &Assignment) -> String {
    let member = roster
        .find_member(assignment.member)
        .map_or_else(|| format!("member #{}", assignment.member), |m| m.name.clone());
    let room = roster
        .find_room(assignment.room)
        .map_or_else(|| format!("room #{}", assignment.room), |r| r.name.clone());
    format!("{member} @ {room} / {} / {}", assignment.weekday, assignment.term)
}
