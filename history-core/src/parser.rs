use log::trace;
use regex::Regex;

use crate::{
    amount::{Amount, REGEX_PRICE},
    card::{parse_cards, Card, REGEX_CARD},
    classifier::{LineClassifier, LineKind},
    event::{ActionType, Event, StageChange},
    result::{Error, Result},
};

/// Turns the lines of one hand into its ordered event log.
pub struct EventParser {
    classifier: LineClassifier,
    re_player_id: Regex,
    re_action_type: Regex,
    re_amount: Regex,
    re_stage: Regex,
    re_board_cards: Regex,
    re_uncalled_bet: Regex,
    re_dealt_cards: Regex,
    re_showed_cards: Regex,
}

impl EventParser {
    pub fn new() -> Self {
        const RE_PLAYER_ID: &str = r"^(\d+):?\s";
        const RE_ACTION_TYPE: &str = r"\b(folds|checks|calls|bets|raises|collected|posts)\b";
        const RE_STAGE: &str = r"\*\*\* ((?:(?:FIRST|SECOND) )?(?:FLOP|TURN|RIVER)) \*\*\*";
        const RE_SHOWED_CARDS: &str = r"^Seat \d+: (\d+)\b.*?\bshowed \[([^\]]*)\]";

        let re_board_cards = format!(r"\[\s?({REGEX_CARD}(?:\s{REGEX_CARD})*)\s?\]");
        let re_uncalled_bet = format!(r"^Uncalled bet \({REGEX_PRICE}\) returned to (\d+)");
        let re_dealt_cards = r"^Dealt to (\d+) \[([^\]]*)\]";

        Self {
            classifier: LineClassifier::new(),
            re_player_id: Regex::new(RE_PLAYER_ID).unwrap(),
            re_action_type: Regex::new(RE_ACTION_TYPE).unwrap(),
            re_amount: Regex::new(REGEX_PRICE).unwrap(),
            re_stage: Regex::new(RE_STAGE).unwrap(),
            re_board_cards: Regex::new(&re_board_cards).unwrap(),
            re_uncalled_bet: Regex::new(&re_uncalled_bet).unwrap(),
            re_dealt_cards: Regex::new(re_dealt_cards).unwrap(),
            re_showed_cards: Regex::new(RE_SHOWED_CARDS).unwrap(),
        }
    }

    /// Parses every line of `text`, dropping lines no parser is responsible
    /// for. A line that was classified but lacks a required field fails the
    /// whole hand.
    pub fn parse(&self, text: &str) -> Result<Vec<Event>> {
        let mut events = Vec::new();
        for line in text.lines().map(str::trim) {
            let event = self.parse_line(line)?;
            if event.is_unknown() {
                trace!("parser: dropping line '{line}'");
                continue;
            }
            events.push(event);
        }
        Ok(events)
    }

    pub fn parse_line(&self, line: &str) -> Result<Event> {
        let line = line.trim();
        match self.classifier.classify(line) {
            LineKind::PlayerAction => self.parse_player_action(line),
            LineKind::BoardChange => self.parse_board_change(line),
            LineKind::UncalledBet => self.parse_uncalled_bet(line),
            LineKind::DealtCards => self.parse_dealt_cards(line),
            LineKind::ShowCards => self.parse_show_cards(line),
            LineKind::Unknown => Ok(Event::Unknown {
                text: line.to_string(),
            }),
        }
    }

    pub fn parse_player_action(&self, line: &str) -> Result<Event> {
        let Some(player_id) = self.re_player_id.captures(line) else {
            return Err(Error::malformed(line, "player id not found"));
        };
        let player_id = parse_player_id(line, &player_id[1])?;

        let Some(action_type) = self.re_action_type.captures(line) else {
            return Err(Error::malformed(line, "action type not found"));
        };
        let Some(action_type) = ActionType::from_verb(&action_type[1]) else {
            return Err(Error::malformed(line, "action type not found"));
        };

        // Folds and checks carry no amount.
        let amount = match self.re_amount.captures(line) {
            Some(amount) => Amount::parse_price(&amount[1])?,
            None => Amount::ZERO,
        };

        Ok(Event::PlayerAction {
            player_id,
            action_type,
            amount,
            is_all_in: line.contains("all-in"),
        })
    }

    /// Only the last bracket group is taken: a turn line repeats the flop
    /// before the new card.
    pub fn parse_board_change(&self, line: &str) -> Result<Event> {
        let Some(stage) = self.re_stage.captures(line) else {
            return Err(Error::malformed(line, "stage not found"));
        };
        let change_type: StageChange = stage[1].parse()?;

        let Some(new_board) = self.re_board_cards.captures_iter(line).last() else {
            return Err(Error::malformed(line, "board cards not found"));
        };
        let new_board = parse_line_cards(line, &new_board[1])?;

        Ok(Event::BoardChange {
            change_type,
            new_board,
        })
    }

    pub fn parse_uncalled_bet(&self, line: &str) -> Result<Event> {
        let Some(uncalled) = self.re_uncalled_bet.captures(line) else {
            return Err(Error::malformed(line, "uncalled amount or player not found"));
        };
        let [amount, player_id] = uncalled.extract().1;
        Ok(Event::UncalledBet {
            player_id: parse_player_id(line, player_id)?,
            amount: Amount::parse_price(amount)?,
        })
    }

    pub fn parse_dealt_cards(&self, line: &str) -> Result<Event> {
        let Some(dealt) = self.re_dealt_cards.captures(line) else {
            return Err(Error::malformed(line, "dealt player or cards not found"));
        };
        let [player_id, cards] = dealt.extract().1;
        Ok(Event::DealtCards {
            player_id: parse_player_id(line, player_id)?,
            cards: parse_line_cards(line, cards)?,
        })
    }

    pub fn parse_show_cards(&self, line: &str) -> Result<Event> {
        let Some(showed) = self.re_showed_cards.captures(line) else {
            return Err(Error::malformed(line, "shown player or cards not found"));
        };
        let [player_id, cards] = showed.extract().1;
        Ok(Event::ShowCards {
            player_id: parse_player_id(line, player_id)?,
            cards: parse_line_cards(line, cards)?,
        })
    }
}

impl Default for EventParser {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_player_id(line: &str, player_id: &str) -> Result<u64> {
    player_id
        .parse()
        .map_err(|_| Error::malformed(line, "player id out of range"))
}

fn parse_line_cards(line: &str, cards: &str) -> Result<Vec<Card>> {
    let cards = parse_cards(cards).map_err(|_| Error::malformed(line, "invalid card"))?;
    if cards.is_empty() {
        return Err(Error::malformed(line, "no cards"));
    }
    Ok(cards)
}
