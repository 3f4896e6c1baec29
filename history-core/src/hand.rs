use log::debug;
use serde::{Deserialize, Serialize};

use crate::{
    amount::Amount,
    balance,
    event::Event,
    metadata::{HandMetadata, MetadataParser},
    parser::EventParser,
    result::Result,
};

/// Metadata and event log recovered from one hand block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedHand {
    pub metadata: HandMetadata,
    pub events: Vec<Event>,
}

impl ParsedHand {
    pub fn balance(&self, player_id: u64) -> Result<Amount> {
        balance::compute_balance(player_id, &self.metadata.players, &self.events)
    }

    pub fn hero(&self) -> Result<u64> {
        balance::find_hero(&self.events)
    }

    pub fn hero_balance(&self) -> Result<(u64, Amount)> {
        balance::hero_balance(&self.metadata, &self.events)
    }
}

#[derive(Default)]
pub struct HandParser {
    metadata: MetadataParser,
    events: EventParser,
}

impl HandParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn parse_metadata(&self, text: &str) -> Result<HandMetadata> {
        self.metadata.parse(text)
    }

    pub fn parse_events(&self, text: &str) -> Result<Vec<Event>> {
        self.events.parse(text)
    }

    pub fn parse(&self, text: &str) -> Result<ParsedHand> {
        let metadata = self.parse_metadata(text)?;
        let events = self.parse_events(text)?;
        debug!(
            "hand {}: {} seats, {} events",
            metadata.hand_id,
            metadata.players.len(),
            events.len()
        );
        Ok(ParsedHand { metadata, events })
    }
}
