use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use serde_with::{DeserializeFromStr, SerializeDisplay};

use crate::{
    amount::Amount,
    card::Card,
    result::{Error, Result},
};

/// Verbs of a player action line, in the order they are searched for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionType {
    Folds,
    Checks,
    Calls,
    Bets,
    Raises,
    Collected,
    Posts,
}

impl ActionType {
    pub const ACTIONS: [ActionType; 7] = [
        ActionType::Folds,
        ActionType::Checks,
        ActionType::Calls,
        ActionType::Bets,
        ActionType::Raises,
        ActionType::Collected,
        ActionType::Posts,
    ];

    pub fn from_verb(verb: &str) -> Option<Self> {
        Self::ACTIONS
            .into_iter()
            .find(|action| action.to_str() == verb)
    }

    pub fn to_str(self) -> &'static str {
        match self {
            ActionType::Folds => "folds",
            ActionType::Checks => "checks",
            ActionType::Calls => "calls",
            ActionType::Bets => "bets",
            ActionType::Raises => "raises",
            ActionType::Collected => "collected",
            ActionType::Posts => "posts",
        }
    }

    /// Chips leave the player's stack.
    pub fn is_contribution(self) -> bool {
        matches!(
            self,
            ActionType::Bets | ActionType::Calls | ActionType::Raises | ActionType::Posts
        )
    }
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_str())
    }
}

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Street {
    Flop = 1,
    Turn = 2,
    River = 3,
}

impl Street {
    pub fn to_str(self) -> &'static str {
        match self {
            Street::Flop => "FLOP",
            Street::Turn => "TURN",
            Street::River => "RIVER",
        }
    }

    pub fn from_marker(s: &str) -> Option<Self> {
        match s {
            "FLOP" => Some(Street::Flop),
            "TURN" => Some(Street::Turn),
            "RIVER" => Some(Street::River),
            _ => None,
        }
    }
}

/// Which runout a stage belongs to when the hand was run twice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Run {
    First,
    Second,
}

impl Run {
    pub fn to_str(self) -> &'static str {
        match self {
            Run::First => "FIRST",
            Run::Second => "SECOND",
        }
    }

    pub fn from_marker(s: &str) -> Option<Self> {
        match s {
            "FIRST" => Some(Run::First),
            "SECOND" => Some(Run::Second),
            _ => None,
        }
    }
}

/// Stage name of a board change, e.g. `TURN` or `SECOND RIVER`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, SerializeDisplay, DeserializeFromStr)]
pub struct StageChange {
    pub run: Option<Run>,
    pub street: Street,
}

impl fmt::Display for StageChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.run {
            Some(run) => write!(f, "{} {}", run.to_str(), self.street.to_str()),
            None => f.write_str(self.street.to_str()),
        }
    }
}

impl FromStr for StageChange {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || Error::malformed(s, "unknown stage");
        let mut words = s.split_whitespace();
        let (run, street) = match (words.next(), words.next(), words.next()) {
            (Some(street), None, None) => (None, street),
            (Some(run), Some(street), None) => {
                (Some(Run::from_marker(run).ok_or_else(invalid)?), street)
            }
            _ => return Err(invalid()),
        };
        let street = Street::from_marker(street).ok_or_else(invalid)?;
        Ok(Self { run, street })
    }
}

/// One line of a hand, in the order it appears in the log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "label", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Event {
    /// Folds, checks, calls, bets, raises, blind/ante/straddle posts and
    /// pot collections.
    PlayerAction {
        player_id: u64,
        action_type: ActionType,
        amount: Amount,
        is_all_in: bool,
    },
    /// Flop, turn or river, carrying only the cards revealed by this stage.
    BoardChange {
        change_type: StageChange,
        new_board: Vec<Card>,
    },
    UncalledBet {
        player_id: u64,
        amount: Amount,
    },
    DealtCards {
        player_id: u64,
        cards: Vec<Card>,
    },
    ShowCards {
        player_id: u64,
        cards: Vec<Card>,
    },
    Unknown {
        text: String,
    },
}

impl Event {
    pub fn label(&self) -> &'static str {
        match self {
            Event::PlayerAction { .. } => "PLAYER_ACTION",
            Event::BoardChange { .. } => "BOARD_CHANGE",
            Event::UncalledBet { .. } => "UNCALLED_BET",
            Event::DealtCards { .. } => "DEALT_CARDS",
            Event::ShowCards { .. } => "SHOW_CARDS",
            Event::Unknown { .. } => "UNKNOWN",
        }
    }

    pub fn player_id(&self) -> Option<u64> {
        match self {
            Event::PlayerAction { player_id, .. }
            | Event::UncalledBet { player_id, .. }
            | Event::DealtCards { player_id, .. }
            | Event::ShowCards { player_id, .. } => Some(*player_id),
            Event::BoardChange { .. } | Event::Unknown { .. } => None,
        }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Event::Unknown { .. })
    }
}
