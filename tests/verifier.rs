#![forbid(unsafe_code)]
mod common;

use common::*;
use permanence::{
    Assignment, AssignmentId, FindingRule, GenerateOptions, MemberId, RoomId, RosterError,
    Scheduler, Severity, Term, VerifyOptions, Weekday,
};

fn generated() -> Scheduler {
    let mut s = two_by_two();
    s.generate(&first_week(&[1, 2]), &calendar(), &[5, 6], GenerateOptions::default())
        .unwrap();
    s
}

#[test]
fn complete_roster_is_all_ok() {
    let s = generated();
    let findings = s.verify(Term::First, &VerifyOptions::default());
    assert_eq!(findings.len(), 3);
    assert!(findings.iter().all(|f| f.severity == Severity::Ok));
}

#[test]
fn single_empty_cell_yields_one_completeness_warning() {
    let mut s = generated();
    let monday_reading = s
        .roster()
        .assignments
        .iter()
        .find(|a| a.weekday == Weekday::Monday && a.room == RoomId::new(2))
        .map(|a| a.id)
        .unwrap();
    s.delete_assignment(monday_reading).unwrap();

    let findings = s.verify(Term::First, &VerifyOptions::default());
    let warnings: Vec<_> = findings
        .iter()
        .filter(|f| f.severity == Severity::Warning)
        .collect();
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].rule, FindingRule::Completeness);
    assert!(warnings[0].message.contains("Reading Room"));
    assert!(warnings[0].message.contains("Monday"));
    assert_eq!(findings[0].severity, Severity::Warning);
    assert!(!findings.iter().any(|f| f.severity == Severity::Error));
}

#[test]
fn hand_edited_duplicate_is_reported_as_errors_first() {
    let mut s = generated();
    let copy = s.roster().assignments[0].clone();
    let id = s.roster().next_assignment_id();
    s.roster_mut().assignments.push(Assignment { id, ..copy });

    let findings = s.verify(Term::First, &VerifyOptions::default());
    assert_eq!(findings[0].severity, Severity::Error);

    let errors: Vec<_> = findings
        .iter()
        .filter(|f| f.severity == Severity::Error)
        .collect();
    assert!(errors
        .iter()
        .any(|f| f.rule == FindingRule::Integrity && f.details.contains(&"DUPLICATE_ASSIGNMENT".to_string())));
    assert!(errors
        .iter()
        .any(|f| f.rule == FindingRule::Integrity
            && f.details.contains(&"ROOM_CAPACITY_EXCEEDED".to_string())));
    assert!(errors.iter().any(|f| f.rule == FindingRule::Completeness));
    assert!(permanence::scheduler::has_errors(&findings));
}

#[test]
fn balance_spread_above_threshold_is_a_warning() {
    let mut s = Scheduler::from_roster(roster(vec![alice(), bob(), carol()], vec![library()]));
    for day in 1..=5u8 {
        s.add_assignment(&permanence::AssignmentInput {
            member: 1,
            room: 1,
            weekday: day,
            term: "FIRST_TERM".into(),
        })
        .unwrap();
    }

    let strict = VerifyOptions {
        balance_threshold: 1,
        eligible_grades: vec![5, 6],
    };
    let findings = s.verify(Term::First, &strict);
    let balance = findings
        .iter()
        .find(|f| f.rule == FindingRule::Balance)
        .unwrap();
    assert_eq!(balance.severity, Severity::Warning);
    assert!(balance.message.contains('5'));
    assert_eq!(balance.details, vec!["Alice: 5", "Bob: 0", "Carol: 0"]);
    assert!(!findings.iter().any(|f| f.severity == Severity::Error));

    // sans niveaux éligibles, seuls les membres présents comptent
    let findings = s.verify(Term::First, &VerifyOptions::default());
    let balance = findings
        .iter()
        .find(|f| f.rule == FindingRule::Balance)
        .unwrap();
    assert_eq!(balance.severity, Severity::Ok);
}

#[test]
fn dangling_reference_is_an_error() {
    let mut s = generated();
    let id = s.roster().next_assignment_id();
    s.roster_mut().assignments.push(Assignment {
        id,
        member: MemberId::new(77),
        room: RoomId::new(1),
        weekday: Weekday::Monday,
        term: Term::Second,
    });

    let findings = s.verify(Term::Second, &VerifyOptions::default());
    assert!(findings
        .iter()
        .any(|f| f.severity == Severity::Error && f.message.contains("unknown member 77")));
}

#[test]
fn publish_requires_no_error_and_edits_reset_it() {
    let mut s = generated();
    s.publish(Term::First, &VerifyOptions::default()).unwrap();
    assert!(s.roster().is_published(Term::First));

    let victim: AssignmentId = s.roster().assignments[0].id;
    s.delete_assignment(victim).unwrap();
    assert!(!s.roster().is_published(Term::First));

    // un avertissement n'empêche pas la publication
    s.publish(Term::First, &VerifyOptions::default()).unwrap();
    assert!(s.roster().is_published(Term::First));

    let copy = s.roster().assignments[0].clone();
    let id = s.roster().next_assignment_id();
    s.roster_mut().assignments.push(Assignment { id, ..copy });
    s.roster_mut().mark_draft(Term::First);
    let err = s.publish(Term::First, &VerifyOptions::default()).unwrap_err();
    assert!(matches!(err, RosterError::NotPublishable { term: Term::First, .. }));
    assert!(!s.roster().is_published(Term::First));
}

#[test]
fn over_capacity_findings_point_at_the_same_cell() {
    let mut s = generated();
    let id = s.roster().next_assignment_id();
    s.roster_mut().assignments.push(Assignment {
        id,
        member: MemberId::new(2),
        room: RoomId::new(1),
        weekday: Weekday::Monday,
        term: Term::First,
    });

    let findings = s.verify(Term::First, &VerifyOptions::default());
    let cell = "cell: Library / Monday / FIRST_TERM".to_string();
    let over: Vec<_> = findings
        .iter()
        .filter(|f| f.severity == Severity::Error && f.details.contains(&cell))
        .collect();
    assert_eq!(over.len(), 2);
    assert!(over
        .iter()
        .any(|f| f.rule == FindingRule::Completeness
            && f.details.contains(&"see also: INTEGRITY ROOM_CAPACITY_EXCEEDED".to_string())));
    assert!(over
        .iter()
        .any(|f| f.rule == FindingRule::Integrity
            && f.details.contains(&"see also: COMPLETENESS".to_string())));
}
