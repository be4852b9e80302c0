//! Résolution date calendaire → (trimestre, jour ouvré).
//!
//! Les bornes des trimestres sont une donnée fournie par l'appelant (configuration),
//! jamais un état global dérivé de l'horloge.

use crate::model::{Term, Weekday};
use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// Intervalle de dates inclusif [start, end].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl TermWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, String> {
        if end < start {
            return Err(format!("term window end {end} is before start {start}"));
        }
        Ok(Self { start, end })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Intersection avec [start, end], `None` si disjoint.
    pub fn clamp(&self, start: NaiveDate, end: NaiveDate) -> Option<TermWindow> {
        let lo = self.start.max(start);
        let hi = self.end.min(end);
        (lo <= hi).then_some(TermWindow { start: lo, end: hi })
    }

    /// Jours ouvrés présents au moins une fois dans la fenêtre.
    pub fn weekdays(&self) -> Vec<Weekday> {
        let span = (self.end - self.start).num_days();
        if span >= 6 {
            return Weekday::ALL.to_vec();
        }
        let mut out: Vec<Weekday> = (0..=span)
            .filter_map(|offset| Weekday::from_chrono((self.start + Duration::days(offset)).weekday()))
            .collect();
        out.sort();
        out
    }
}

/// Calendrier scolaire : une fenêtre par trimestre.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermCalendar {
    pub first: TermWindow,
    pub second: TermWindow,
}

impl TermCalendar {
    pub fn new(first: TermWindow, second: TermWindow) -> Result<Self, String> {
        let calendar = Self { first, second };
        calendar.validate()?;
        Ok(calendar)
    }

    /// Année scolaire débutant en septembre `year` :
    /// 1er sept. → 31 janv., puis 1er févr. → 31 juil.
    pub fn for_academic_year(year: i32) -> Option<Self> {
        Some(Self {
            first: TermWindow {
                start: NaiveDate::from_ymd_opt(year, 9, 1)?,
                end: NaiveDate::from_ymd_opt(year + 1, 1, 31)?,
            },
            second: TermWindow {
                start: NaiveDate::from_ymd_opt(year + 1, 2, 1)?,
                end: NaiveDate::from_ymd_opt(year + 1, 7, 31)?,
            },
        })
    }

    pub fn validate(&self) -> Result<(), String> {
        for (term, window) in self.windows() {
            if window.end < window.start {
                return Err(format!("{term}: end {} is before start {}", window.end, window.start));
            }
        }
        if self.second.start <= self.first.end {
            return Err("SECOND_TERM must start after FIRST_TERM ends".to_string());
        }
        Ok(())
    }

    pub fn window(&self, term: Term) -> TermWindow {
        match term {
            Term::First => self.first,
            Term::Second => self.second,
        }
    }

    pub fn windows(&self) -> [(Term, TermWindow); 2] {
        [(Term::First, self.first), (Term::Second, self.second)]
    }

    pub fn term_of(&self, date: NaiveDate) -> Option<Term> {
        self.windows()
            .into_iter()
            .find(|(_, window)| window.contains(date))
            .map(|(term, _)| term)
    }

    /// `None` hors trimestre ou le week-end.
    pub fn resolve(&self, date: NaiveDate) -> Option<(Term, Weekday)> {
        let term = self.term_of(date)?;
        let weekday = Weekday::from_chrono(date.weekday())?;
        Some((term, weekday))
    }

    /// Trimestres recoupant [start, end], avec la portion recoupée.
    pub fn overlapping(&self, start: NaiveDate, end: NaiveDate) -> Vec<(Term, TermWindow)> {
        self.windows()
            .into_iter()
            .filter_map(|(term, window)| window.clamp(start, end).map(|w| (term, w)))
            .collect()
    }
}
