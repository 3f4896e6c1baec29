use std::fmt;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::{
    hand::{HandParser, ParsedHand},
    result::{Error, Result},
};

/// What a batch does when one of its hands fails to parse.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BatchPolicy {
    /// The first failure aborts the whole batch.
    #[default]
    AllOrNothing,
    /// Failed hands are reported and the rest of the batch goes on.
    BestEffort,
}

impl BatchPolicy {
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "all-or-nothing" => Some(BatchPolicy::AllOrNothing),
            "best-effort" => Some(BatchPolicy::BestEffort),
            _ => None,
        }
    }

    pub fn to_str(self) -> &'static str {
        match self {
            BatchPolicy::AllOrNothing => "all-or-nothing",
            BatchPolicy::BestEffort => "best-effort",
        }
    }
}

impl fmt::Display for BatchPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_str())
    }
}

/// Splits an upload into hand blocks. Blocks are separated by one or more
/// blank lines; whitespace-only blocks are dropped.
pub fn split_hands(text: &str) -> Vec<&str> {
    let mut hands = Vec::new();
    let mut start: Option<usize> = None;
    let mut end = 0;
    let mut offset = 0;
    for line in text.split_inclusive('\n') {
        let next_offset = offset + line.len();
        if line.trim().is_empty() {
            if let Some(block_start) = start.take() {
                hands.push(&text[block_start..end]);
            }
        } else {
            start.get_or_insert(offset);
            end = next_offset;
        }
        offset = next_offset;
    }
    if let Some(block_start) = start {
        hands.push(&text[block_start..end]);
    }
    hands
}

#[derive(Debug, PartialEq, Eq)]
pub struct HandFailure {
    pub index: usize,
    pub error: Error,
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub hands: Vec<ParsedHand>,
    pub failures: Vec<HandFailure>,
}

pub struct BatchParser {
    parser: HandParser,
    policy: BatchPolicy,
}

impl BatchParser {
    pub fn new(policy: BatchPolicy) -> Self {
        Self {
            parser: HandParser::new(),
            policy,
        }
    }

    pub fn policy(&self) -> BatchPolicy {
        self.policy
    }

    /// Parses hands one at a time, in upload order. Nothing is parsed ahead
    /// of the item the caller is holding.
    pub fn hands<'a>(
        &'a self,
        text: &'a str,
    ) -> impl Iterator<Item = (usize, Result<ParsedHand>)> + 'a {
        split_hands(text)
            .into_iter()
            .enumerate()
            .map(|(index, block)| (index, self.parser.parse(block)))
    }

    pub fn parse(&self, text: &str) -> Result<BatchReport> {
        let mut report = BatchReport::default();
        for (index, hand) in self.hands(text) {
            match (hand, self.policy) {
                (Ok(hand), _) => report.hands.push(hand),
                (Err(err), BatchPolicy::AllOrNothing) => {
                    return Err(Error::Batch {
                        index,
                        source: Box::new(err),
                    });
                }
                (Err(err), BatchPolicy::BestEffort) => {
                    warn!("batch: skipping hand {index}: {err}");
                    report.failures.push(HandFailure { index, error: err });
                }
            }
        }
        debug!(
            "batch: {} hands parsed, {} failed",
            report.hands.len(),
            report.failures.len()
        );
        Ok(report)
    }
}

impl Default for BatchParser {
    fn default() -> Self {
        Self::new(BatchPolicy::default())
    }
}
