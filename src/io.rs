use crate::model::{ExclusionDate, Member, MemberId, Roster, Room, Term};
use anyhow::{bail, Context};
use chrono::NaiveDate;
use csv::{ReaderBuilder, StringRecord, WriterBuilder};
use serde::Serialize;
use std::io::Write;
use std::path::Path;
use tracing::warn;

fn field<'a>(rec: &'a StringRecord, idx: usize, name: &str) -> anyhow::Result<&'a str> {
    let value = rec.get(idx).with_context(|| format!("missing {name}"))?.trim();
    if value.is_empty() {
        bail!("empty {name}");
    }
    Ok(value)
}

/// Import des membres: header `id,name,grade,class[,role]`
pub fn import_members_csv<P: AsRef<Path>>(path: P) -> anyhow::Result<Vec<Member>> {
    let mut rdr = ReaderBuilder::new().has_headers(true).from_path(path)?;
    let mut out = Vec::new();
    for rec in rdr.records() {
        let rec = rec?;
        let id: u64 = field(&rec, 0, "id")?.parse().context("member id")?;
        let name = field(&rec, 1, "name")?;
        let grade: u8 = field(&rec, 2, "grade")?
            .parse()
            .with_context(|| format!("invalid grade for member {id}"))?;
        let class = field(&rec, 3, "class")?;
        let mut member = Member::new(id, name, grade, class);
        if let Some(role) = rec.get(4) {
            member.role = role.parse().map_err(anyhow::Error::msg)?;
        }
        out.push(member);
    }
    Ok(out)
}

/// Import des salles: header `id,name,capacity`
pub fn import_rooms_csv<P: AsRef<Path>>(path: P) -> anyhow::Result<Vec<Room>> {
    let mut rdr = ReaderBuilder::new().has_headers(true).from_path(path)?;
    let mut out = Vec::new();
    for rec in rdr.records() {
        let rec = rec?;
        let id: u64 = field(&rec, 0, "id")?.parse().context("room id")?;
        let name = field(&rec, 1, "name")?;
        let capacity: u32 = field(&rec, 2, "capacity")?
            .parse()
            .with_context(|| format!("invalid capacity for room {id}"))?;
        let room = Room::new(id, name, capacity)
            .map_err(anyhow::Error::msg)
            .with_context(|| format!("room {id}"))?;
        out.push(room);
    }
    Ok(out)
}

/// Import des exclusions: header `member_id,date[,reason]` (date `YYYY-MM-DD`)
pub fn import_exclusions_csv<P: AsRef<Path>>(path: P) -> anyhow::Result<Vec<ExclusionDate>> {
    let mut rdr = ReaderBuilder::new().has_headers(true).from_path(path)?;
    let mut out = Vec::new();
    for rec in rdr.records() {
        let rec = rec?;
        let member: u64 = field(&rec, 0, "member_id")?.parse().context("member_id")?;
        let raw = field(&rec, 1, "date")?;
        let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .with_context(|| format!("invalid date: {raw}"))?;
        let reason = rec.get(2).map(str::trim).unwrap_or("");
        out.push(ExclusionDate::new(MemberId::new(member), date, reason));
    }
    Ok(out)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Json,
}

/// Ligne aplatie du planning ; libellés identiques à ceux du générateur.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportRow {
    pub term: &'static str,
    pub weekday: &'static str,
    pub room: String,
    pub grade: u8,
    pub class: String,
    pub name: String,
}

/// Lignes triées par trimestre, jour, salle puis membre.
///
/// Une référence orpheline reste exportée, avec `member #id` / `room #id` à la place du nom.
pub fn export_rows(roster: &Roster, term: Option<Term>) -> Vec<ExportRow> {
    let mut assignments: Vec<_> = roster
        .assignments
        .iter()
        .filter(|a| term.map_or(true, |t| a.term == t))
        .collect();
    assignments.sort_by_key(|a| (a.term, a.weekday, a.room, a.member));

    assignments
        .into_iter()
        .map(|a| {
            let member = roster.find_member(a.member);
            let room = roster.find_room(a.room);
            if member.is_none() || room.is_none() {
                warn!(assignment = %a.id, "dangling reference exported with a placeholder");
            }
            ExportRow {
                term: a.term.label(),
                weekday: a.weekday.label(),
                room: room.map_or_else(|| format!("room #{}", a.room), |r| r.name.clone()),
                grade: member.map_or(0, |m| m.grade),
                class: member.map_or_else(String::new, |m| m.class.clone()),
                name: member.map_or_else(|| format!("member #{}", a.member), |m| m.name.clone()),
            }
        })
        .collect()
}

pub fn export<W: Write>(
    mut writer: W,
    roster: &Roster,
    term: Option<Term>,
    format: ExportFormat,
) -> anyhow::Result<()> {
    let rows = export_rows(roster, term);
    match format {
        ExportFormat::Csv => {
            let mut w = WriterBuilder::new().has_headers(true).from_writer(&mut writer);
            if rows.is_empty() {
                w.write_record(["term", "weekday", "room", "grade", "class", "name"])?;
            }
            for row in &rows {
                w.serialize(row)?;
            }
            w.flush()?;
        }
        ExportFormat::Json => {
            serde_json::to_writer_pretty(&mut writer, &rows)?;
            writer.write_all(b"\n")?;
        }
    }
    writer.flush()?;
    Ok(())
}
