//! Contest data model and unit conversion.
//!
//! Everything here is a read-only projection of contract state, except
//! [`VotePack`], which is client-side catalog data.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use thiserror::Error;

use crate::blockchain::types::{u64_string, AccountAddress, ChainError, ChainResult};

/// Octas per APT.
pub const OCTAS_PER_APT: u64 = 100_000_000;

/// Allowed suggestion length in characters, after trimming.
pub const MIN_NAME_CHARS: usize = 2;
pub const MAX_NAME_CHARS: usize = 50;

/// Convert a display amount in APT into octas, rounding to the nearest octa.
pub fn apt_to_octas(apt: f64) -> ChainResult<u64> {
    if !apt.is_finite() || apt < 0.0 {
        return Err(ChainError::InvalidAmount(format!(
            "{} is not a non-negative APT amount",
            apt
        )));
    }
    let octas = (apt * OCTAS_PER_APT as f64).round();
    if octas >= u64::MAX as f64 {
        return Err(ChainError::InvalidAmount(format!("{} APT overflows u64 octas", apt)));
    }
    Ok(octas as u64)
}

/// Convert octas into a display amount in APT.
pub fn octas_to_apt(octas: u64) -> f64 {
    octas as f64 / OCTAS_PER_APT as f64
}

/// A proposed mascot name and its vote counters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NameSuggestion {
    pub id: u64,
    pub name: String,
    pub free_votes: u64,
    pub boost_votes: u64,
    /// Sum of free and boost votes.
    pub total_votes: u64,
    pub submitted_by: AccountAddress,
    /// Unix seconds.
    pub timestamp: u64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct MoveSuggestion {
    #[serde(with = "u64_string")]
    id: u64,
    name: String,
    #[serde(with = "u64_string")]
    free_votes: u64,
    #[serde(with = "u64_string")]
    boost_votes: u64,
    submitted_by: AccountAddress,
    #[serde(with = "u64_string")]
    timestamp: u64,
}

impl From<MoveSuggestion> for NameSuggestion {
    fn from(raw: MoveSuggestion) -> Self {
        Self {
            id: raw.id,
            name: raw.name,
            free_votes: raw.free_votes,
            boost_votes: raw.boost_votes,
            total_votes: raw.free_votes.saturating_add(raw.boost_votes),
            submitted_by: raw.submitted_by,
            timestamp: raw.timestamp,
        }
    }
}

/// Order by total votes, most first; ties keep the earlier suggestion first.
pub fn sort_by_votes(suggestions: &mut [NameSuggestion]) {
    suggestions.sort_by(|a, b| b.total_votes.cmp(&a.total_votes).then(a.id.cmp(&b.id)));
}

/// A registered participant's vote balances.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserAccount {
    pub free_votes_remaining: u64,
    pub boost_votes_owned: u64,
    /// Lifetime spend on vote packs, in octas.
    pub total_spent: u64,
    /// Suggestion ids this user has already given a free vote.
    pub free_voted: BTreeSet<u64>,
    pub suggestions_count: u64,
}

impl UserAccount {
    pub fn total_spent_apt(&self) -> f64 {
        octas_to_apt(self.total_spent)
    }

    pub fn has_free_voted(&self, suggestion_id: u64) -> bool {
        self.free_voted.contains(&suggestion_id)
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct MoveUserAccount {
    #[serde(with = "u64_string")]
    free_votes_remaining: u64,
    #[serde(with = "u64_string")]
    boost_votes_owned: u64,
    #[serde(with = "u64_string")]
    total_spent: u64,
    #[serde(default)]
    free_voted_names: Vec<MoveU64>,
    #[serde(with = "u64_string")]
    suggestions_count: u64,
}

#[derive(Debug, Deserialize)]
struct MoveU64(#[serde(with = "u64_string")] u64);

impl From<MoveUserAccount> for UserAccount {
    fn from(raw: MoveUserAccount) -> Self {
        Self {
            free_votes_remaining: raw.free_votes_remaining,
            boost_votes_owned: raw.boost_votes_owned,
            total_spent: raw.total_spent,
            free_voted: raw.free_voted_names.into_iter().map(|id| id.0).collect(),
            suggestions_count: raw.suggestions_count,
        }
    }
}

/// Aggregate value collected from vote pack purchases.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Default)]
pub struct PrizePool {
    /// Display total in APT.
    pub total: f64,
    pub total_octas: u64,
    pub contributors: u64,
}

impl PrizePool {
    pub fn from_octas(total_octas: u64, contributors: u64) -> Self {
        Self {
            total: octas_to_apt(total_octas),
            total_octas,
            contributors,
        }
    }
}

/// A purchasable bundle of boost votes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VotePack {
    pub id: String,
    pub name: String,
    pub votes: u64,
    /// Price in APT.
    pub price: f64,
    #[serde(default)]
    pub popular: bool,
}

impl VotePack {
    fn new(id: &str, name: &str, votes: u64, price: f64, popular: bool) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            votes,
            price,
            popular,
        }
    }

    /// Catalog used when the config file defines no packs.
    pub fn default_catalog() -> Vec<VotePack> {
        vec![
            Self::new("basic", "Basic Pack", 10, 0.1, false),
            Self::new("standard", "Standard Pack", 25, 0.3, true),
            Self::new("premium", "Premium Pack", 50, 0.6, false),
            Self::new("ultimate", "Ultimate Pack", 100, 1.0, false),
        ]
    }

    pub fn price_per_vote(&self) -> f64 {
        self.price / self.votes as f64
    }
}

pub fn find_pack<'a>(packs: &'a [VotePack], id: &str) -> Option<&'a VotePack> {
    packs.iter().find(|pack| pack.id == id)
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NameError {
    #[error("Please enter a name suggestion")]
    Empty,
    #[error("Name must be at least {} characters long", MIN_NAME_CHARS)]
    TooShort,
    #[error("Name must be at most {} characters long", MAX_NAME_CHARS)]
    TooLong,
}

/// Trim and length-check a suggestion before submitting it.
///
/// Advisory only: the contract has the final say on what it accepts.
pub fn validate_suggestion_name(name: &str) -> Result<String, NameError> {
    let trimmed = name.trim();
    let chars = trimmed.chars().count();
    if chars == 0 {
        Err(NameError::Empty)
    } else if chars < MIN_NAME_CHARS {
        Err(NameError::TooShort)
    } else if chars > MAX_NAME_CHARS {
        Err(NameError::TooLong)
    } else {
        Ok(trimmed.to_string())
    }
}
