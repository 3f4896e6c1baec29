use std::fmt;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Header fields without which a hand cannot be stored or attributed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequiredField {
    HandId,
    TableInfo,
    EndTime,
}

impl fmt::Display for RequiredField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RequiredField::HandId => "hand id",
            RequiredField::TableInfo => "table info",
            RequiredField::EndTime => "end time",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    #[error("invalid hand format: {missing} not found")]
    InvalidHandFormat { missing: RequiredField },
    #[error("malformed line '{line}': {reason}")]
    MalformedActionLine { line: String, reason: &'static str },
    #[error("no hero identifiable: hand has no dealt cards")]
    NoHeroIdentifiable,
    #[error("player {player_id} is not seated in this hand")]
    PlayerNotSeated { player_id: u64 },
    #[error("invalid amount '{0}'")]
    InvalidAmount(String),
    #[error("invalid card '{0}'")]
    InvalidCard(String),
    #[error("hand {index} of batch: {source}")]
    Batch {
        index: usize,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    pub(crate) fn malformed(line: &str, reason: &'static str) -> Self {
        Error::MalformedActionLine {
            line: line.to_string(),
            reason,
        }
    }
}
