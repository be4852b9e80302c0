use crate::calendar::TermCalendar;
use crate::scheduler::{GenerateOptions, PolicyKind, VerifyOptions};
use anyhow::{bail, Context, Result};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Réglages persistés (JSON) : calendrier scolaire et politique de génération.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    pub calendar: TermCalendar,
    #[serde(default = "default_eligible_grades")]
    pub eligible_grades: Vec<u8>,
    #[serde(default = "default_balance_threshold")]
    pub balance_threshold: u32,
    #[serde(default)]
    pub policy: PolicyKind,
    #[serde(default)]
    pub fail_on_gaps: bool,
}

fn default_eligible_grades() -> Vec<u8> {
    vec![5, 6]
}

const fn default_balance_threshold() -> u32 {
    1
}

impl Settings {
    /// Réglages par défaut pour l'année scolaire contenant `today`.
    pub fn for_date(today: NaiveDate) -> Result<Self> {
        let year = if today.month() >= 9 { today.year() } else { today.year() - 1 };
        let calendar = TermCalendar::for_academic_year(year).context("academic year out of range")?;
        Ok(Self {
            calendar,
            eligible_grades: default_eligible_grades(),
            balance_threshold: default_balance_threshold(),
            policy: PolicyKind::default(),
            fail_on_gaps: false,
        })
    }

    pub fn validate(&self) -> Result<()> {
        self.calendar.validate().map_err(anyhow::Error::msg)?;
        if self.eligible_grades.is_empty() {
            bail!("eligible_grades cannot be empty");
        }
        Ok(())
    }

    pub fn generate_options(&self) -> GenerateOptions {
        GenerateOptions {
            policy: self.policy,
            fail_on_gaps: self.fail_on_gaps,
        }
    }

    pub fn verify_options(&self) -> VerifyOptions {
        VerifyOptions {
            balance_threshold: self.balance_threshold,
            eligible_grades: self.eligible_grades.clone(),
        }
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let data = fs::read(path).with_context(|| format!("reading settings {}", path.display()))?;
        let settings: Settings = serde_json::from_slice(&data)
            .with_context(|| format!("parsing settings {}", path.display()))?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        self.validate()?;
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).with_context(|| format!("writing settings {}", path.display()))?;
        Ok(())
    }
}
