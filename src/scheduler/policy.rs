//! Choix du membre pour une case, parmi les candidats déjà filtrés par la garde.
//!
//! Le générateur ne connaît que le trait ; remplacer la politique d'équité ne touche ni la garde
//! ni le parcours des cases.

use super::PolicyKind;
use crate::model::MemberId;
use std::collections::BTreeMap;
use std::fmt;

/// Compteur courant de permanences par membre.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadBook {
    counts: BTreeMap<MemberId, u32>,
}

impl LoadBook {
    /// Tous les membres partent de zéro, pour qu'un membre jamais placé compte dans l'écart.
    pub fn with_members<I: IntoIterator<Item = MemberId>>(members: I) -> Self {
        Self {
            counts: members.into_iter().map(|m| (m, 0)).collect(),
        }
    }

    pub fn load(&self, member: MemberId) -> u32 {
        self.counts.get(&member).copied().unwrap_or(0)
    }

    pub fn record(&mut self, member: MemberId) {
        *self.counts.entry(member).or_default() += 1;
    }

    /// Écart entre le plus chargé et le moins chargé.
    pub fn spread(&self) -> u32 {
        let max = self.counts.values().max().copied().unwrap_or(0);
        let min = self.counts.values().min().copied().unwrap_or(0);
        max - min
    }

    pub fn iter(&self) -> impl Iterator<Item = (MemberId, u32)> + '_ {
        self.counts.iter().map(|(m, c)| (*m, *c))
    }
}

pub trait LoadPolicy: fmt::Debug {
    fn name(&self) -> &'static str;

    /// `candidates` respecte l'ordre de la demande ; `None` si vide.
    fn pick(&mut self, candidates: &[MemberId], loads: &LoadBook) -> Option<MemberId>;
}

/// Charge minimale, égalité départagée par identifiant croissant.
#[derive(Debug, Default, Clone, Copy)]
pub struct BalancedLoad;

impl LoadPolicy for BalancedLoad {
    fn name(&self) -> &'static str {
        "balanced"
    }

    fn pick(&mut self, candidates: &[MemberId], loads: &LoadBook) -> Option<MemberId> {
        candidates.iter().copied().min_by_key(|m| (loads.load(*m), *m))
    }
}

/// Tourniquet : reprend après le dernier membre placé, saute les indisponibles.
#[derive(Debug, Clone)]
pub struct Rotation {
    order: Vec<MemberId>,
    cursor: usize,
}

impl Rotation {
    pub fn new(order: Vec<MemberId>) -> Self {
        Self { order, cursor: 0 }
    }
}

impl LoadPolicy for Rotation {
    fn name(&self) -> &'static str {
        "rotation"
    }

    fn pick(&mut self, candidates: &[MemberId], _loads: &LoadBook) -> Option<MemberId> {
        let total = self.order.len();
        for step in 0..total {
            let idx = (self.cursor + step) % total;
            let member = self.order[idx];
            if candidates.contains(&member) {
                self.cursor = (idx + 1) % total;
                return Some(member);
            }
        }
        None
    }
}

pub fn policy_for(kind: PolicyKind, order: &[MemberId]) -> Box<dyn LoadPolicy> {
    match kind {
        PolicyKind::Balanced => Box::new(BalancedLoad),
        PolicyKind::Rotation => Box::new(Rotation::new(order.to_vec())),
    }
}
