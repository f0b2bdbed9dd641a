//! Mapping of contract failures to user-facing messages.
//!
//! The gateway passes contract errors through untouched. Callers that show
//! them to people use [`ContestAbort::classify`] on the error text.

use serde::Serialize;

use crate::blockchain::types::ChainError;

/// Known reasons a contest transaction fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ContestAbort {
    DuplicateName,
    MaxSuggestionsReached,
    VotingEnded,
    AlreadyVotedFree,
    InsufficientPayment,
    NotConfigured,
    Other,
}

const ABORT_CODES: &[(&str, ContestAbort)] = &[
    ("E_DUPLICATE_NAME", ContestAbort::DuplicateName),
    ("E_MAX_SUGGESTIONS_REACHED", ContestAbort::MaxSuggestionsReached),
    ("E_VOTING_ENDED", ContestAbort::VotingEnded),
    ("E_ALREADY_VOTED_FREE", ContestAbort::AlreadyVotedFree),
    ("E_INSUFFICIENT_PAYMENT", ContestAbort::InsufficientPayment),
];

impl ContestAbort {
    /// Classify an error message by the abort code it embeds.
    pub fn classify(message: &str) -> Self {
        ABORT_CODES
            .iter()
            .find(|(code, _)| message.contains(code))
            .map(|(_, kind)| *kind)
            .unwrap_or(ContestAbort::Other)
    }

    pub fn from_error(error: &ChainError) -> Self {
        match error {
            ChainError::NotConfigured(_) => ContestAbort::NotConfigured,
            other => Self::classify(&other.to_string()),
        }
    }

    /// Text to show a user; `None` when the raw error is all there is.
    pub fn user_message(&self) -> Option<&'static str> {
        match self {
            ContestAbort::DuplicateName => Some("This name has already been suggested"),
            ContestAbort::MaxSuggestionsReached => {
                Some("You have reached the maximum number of suggestions")
            }
            ContestAbort::VotingEnded => Some("Voting period has ended"),
            ContestAbort::AlreadyVotedFree => {
                Some("You have already voted for this name with a free vote")
            }
            ContestAbort::InsufficientPayment => Some("You don't have enough boost votes"),
            ContestAbort::NotConfigured => Some("Contract not configured. Please check the setup."),
            ContestAbort::Other => None,
        }
    }
}

/// User-facing description of a failed contest transaction.
pub fn describe_failure(error: &ChainError) -> String {
    ContestAbort::from_error(error)
        .user_message()
        .map(str::to_string)
        .unwrap_or_else(|| error.to_string())
}
