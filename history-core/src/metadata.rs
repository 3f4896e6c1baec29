use std::collections::HashSet;

use chrono::NaiveDateTime;
use log::warn;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

use crate::{
    amount::{Amount, REGEX_RAW_PRICE},
    card::{parse_cards, Card},
    result::{Error, RequiredField, Result},
};

/// Placeholder for summary values the log does not state.
pub const UNKNOWN: &str = "Unknown";

const START_DATE_FORMAT: &str = "%Y/%m/%d %H:%M:%S UTC";
const END_DATE_FORMAT: &str = "%Y/%m/%d %H:%M:%S";

#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Blinds {
    pub small_blind: String,
    pub big_blind: String,
    pub ante: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatStack {
    pub seat: u8,
    pub player_id: u64,
    pub stack: String,
}

impl SeatStack {
    pub fn starting_stack(&self) -> Result<Amount> {
        Amount::parse_price(&self.stack)
    }
}

#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandMetadata {
    pub room: String,
    pub hand_id: String,
    pub game_type: String,
    pub blinds: Blinds,
    pub start_date_time: String,
    pub end_date_time: String,
    pub club_id: String,
    pub table_id: String,
    pub max_seats: u8,
    pub button_seat: u8,
    pub players: Vec<SeatStack>,
    pub total_pot: String,
    pub rake: String,
    pub boards: Vec<Vec<Card>>,
    pub hero_cards: Option<Vec<Card>>,
}

impl HandMetadata {
    pub fn seat_of(&self, player_id: u64) -> Option<&SeatStack> {
        self.players
            .iter()
            .find(|seat| seat.player_id == player_id)
    }

    pub fn started_at(&self) -> Option<NaiveDateTime> {
        NaiveDateTime::parse_from_str(&self.start_date_time, START_DATE_FORMAT).ok()
    }

    pub fn ended_at(&self) -> Option<NaiveDateTime> {
        NaiveDateTime::parse_from_str(&self.end_date_time, END_DATE_FORMAT).ok()
    }

    pub fn small_blind_amount(&self) -> Option<Amount> {
        Amount::parse_price(&self.blinds.small_blind).ok()
    }

    pub fn big_blind_amount(&self) -> Option<Amount> {
        Amount::parse_price(&self.blinds.big_blind).ok()
    }

    pub fn ante_amount(&self) -> Option<Amount> {
        self.blinds
            .ante
            .as_deref()
            .and_then(|ante| Amount::parse_price(ante).ok())
    }

    /// `None` when the summary did not state the pot.
    pub fn total_pot_amount(&self) -> Option<Amount> {
        Amount::parse_price(&self.total_pot).ok()
    }

    pub fn rake_amount(&self) -> Option<Amount> {
        Amount::parse_price(&self.rake).ok()
    }

    pub fn was_run_twice(&self) -> bool {
        self.boards.len() > 1
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandHeader {
    pub room: String,
    pub hand_id: String,
    pub game_type: String,
    pub blinds: Blinds,
    pub start_date_time: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableInfo {
    pub club_id: String,
    pub table_id: String,
    pub max_seats: u8,
    pub button_seat: u8,
}

/// Collects the independently scanned pieces of a hand. `build` either yields
/// a complete record or names the first load-bearing field that is missing.
#[derive(Debug, Clone, Default)]
pub struct MetadataBuilder {
    header: Option<HandHeader>,
    table: Option<TableInfo>,
    end_date_time: Option<String>,
    players: Vec<SeatStack>,
    total_pot: Option<String>,
    rake: Option<String>,
    boards: Vec<Vec<Card>>,
    hero_cards: Option<Vec<Card>>,
}

impl MetadataBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn header(mut self, header: HandHeader) -> Self {
        self.header = Some(header);
        self
    }

    pub fn table(mut self, table: TableInfo) -> Self {
        self.table = Some(table);
        self
    }

    pub fn end_date_time(mut self, end_date_time: impl Into<String>) -> Self {
        self.end_date_time = Some(end_date_time.into());
        self
    }

    /// Seats are kept in seat order. A seat number or player id seen twice
    /// keeps its first entry.
    pub fn players(mut self, players: impl IntoIterator<Item = SeatStack>) -> Self {
        let mut seats = HashSet::new();
        let mut player_ids = HashSet::new();
        let mut unique = Vec::new();
        for player in players {
            if !seats.insert(player.seat) || !player_ids.insert(player.player_id) {
                warn!(
                    "metadata: dropping duplicate seat {} for player {}",
                    player.seat, player.player_id
                );
                continue;
            }
            unique.push(player);
        }
        unique.sort_by_key(|player| player.seat);
        self.players = unique;
        self
    }

    pub fn total_pot(mut self, total_pot: Option<String>) -> Self {
        self.total_pot = total_pot;
        self
    }

    pub fn rake(mut self, rake: Option<String>) -> Self {
        self.rake = rake;
        self
    }

    pub fn boards(mut self, boards: Vec<Vec<Card>>) -> Self {
        self.boards = boards;
        self
    }

    pub fn hero_cards(mut self, hero_cards: Option<Vec<Card>>) -> Self {
        self.hero_cards = hero_cards;
        self
    }

    pub fn build(self) -> Result<HandMetadata> {
        let missing = |missing| Error::InvalidHandFormat { missing };
        let header = self.header.ok_or_else(|| missing(RequiredField::HandId))?;
        let table = self.table.ok_or_else(|| missing(RequiredField::TableInfo))?;
        let end_date_time = self
            .end_date_time
            .ok_or_else(|| missing(RequiredField::EndTime))?;

        Ok(HandMetadata {
            room: header.room,
            hand_id: header.hand_id,
            game_type: header.game_type,
            blinds: header.blinds,
            start_date_time: header.start_date_time,
            end_date_time,
            club_id: table.club_id,
            table_id: table.table_id,
            max_seats: table.max_seats,
            button_seat: table.button_seat,
            players: self.players,
            total_pot: self.total_pot.unwrap_or_else(|| UNKNOWN.to_string()),
            rake: self.rake.unwrap_or_else(|| UNKNOWN.to_string()),
            boards: self.boards,
            hero_cards: self.hero_cards,
        })
    }
}

/// Scans a whole hand block for its header, table, seats and summary.
pub struct MetadataParser {
    re_header: Regex,
    re_price: Regex,
    re_ante: Regex,
    re_table_info: Regex,
    re_seat_config: Regex,
    re_end_time: Regex,
    re_total_pot: Regex,
    re_rake: Regex,
    re_board: Regex,
    re_hero_cards: Regex,
}

impl MetadataParser {
    pub fn new() -> Self {
        const REGEX_DATE: &str = r"\d{4}/\d{2}/\d{2} \d{2}:\d{2}:\d{2}";

        let re_header = format!(r"(?m)^\s*(\S+) Hand #(\d+):\s+(.+?)\s+-\s+({REGEX_DATE} UTC)");
        let re_ante = format!(r"- Ante {REGEX_RAW_PRICE}");
        const RE_TABLE_INFO: &str =
            r"Table 'ClubId:(\d+),Table:([^']+)' (\d+)-max Seat #(\d+) is the button";
        let re_seat_config = format!(r"(?m)^\s*Seat (\d+): (\d+) \({REGEX_RAW_PRICE} in chips\)");
        let re_end_time = format!(r"Hand ended at ({REGEX_DATE})");
        let re_total_pot = format!(r"Total pot {REGEX_RAW_PRICE}");
        let re_rake = format!(r"Rake {REGEX_RAW_PRICE}");
        const RE_BOARD: &str = r"(?m)^\s*(?:(?:FIRST|SECOND|THIRD) )?Board \[([^\]]+)\]";
        const RE_HERO_CARDS: &str = r"Dealt to \S+ \[([^\]]+)\]";

        Self {
            re_header: Regex::new(&re_header).unwrap(),
            re_price: Regex::new(REGEX_RAW_PRICE).unwrap(),
            re_ante: Regex::new(&re_ante).unwrap(),
            re_table_info: Regex::new(RE_TABLE_INFO).unwrap(),
            re_seat_config: Regex::new(&re_seat_config).unwrap(),
            re_end_time: Regex::new(&re_end_time).unwrap(),
            re_total_pot: Regex::new(&re_total_pot).unwrap(),
            re_rake: Regex::new(&re_rake).unwrap(),
            re_board: Regex::new(RE_BOARD).unwrap(),
            re_hero_cards: Regex::new(RE_HERO_CARDS).unwrap(),
        }
    }

    pub fn parse(&self, text: &str) -> Result<HandMetadata> {
        let mut builder = MetadataBuilder::new()
            .players(self.parse_seats(text))
            .total_pot(self.first_capture(&self.re_total_pot, text))
            .rake(self.first_capture(&self.re_rake, text))
            .boards(self.parse_boards(text))
            .hero_cards(self.parse_hero_cards(text));
        if let Some(header) = self.parse_header(text) {
            builder = builder.header(header);
        }
        if let Some(table) = self.parse_table_info(text) {
            builder = builder.table(table);
        }
        if let Some(end_date_time) = self.first_capture(&self.re_end_time, text) {
            builder = builder.end_date_time(end_date_time);
        }
        builder.build()
    }

    fn first_capture(&self, regex: &Regex, text: &str) -> Option<String> {
        regex
            .captures(text)
            .map(|captures| captures[1].to_string())
    }

    pub fn parse_header(&self, text: &str) -> Option<HandHeader> {
        let [room, hand_id, description, start_date_time] =
            self.re_header.captures(text)?.extract().1;

        let game_type = description
            .split('(')
            .next()
            .unwrap_or_default()
            .trim()
            .to_string();
        let mut prices = self
            .re_price
            .find_iter(description)
            .map(|price| price.as_str().to_string());
        let small_blind = prices.next().unwrap_or_else(|| UNKNOWN.to_string());
        let big_blind = prices.next().unwrap_or_else(|| UNKNOWN.to_string());
        let ante = self.first_capture(&self.re_ante, description);

        Some(HandHeader {
            room: room.to_string(),
            hand_id: hand_id.to_string(),
            game_type,
            blinds: Blinds {
                small_blind,
                big_blind,
                ante,
            },
            start_date_time: start_date_time.to_string(),
        })
    }

    pub fn parse_table_info(&self, text: &str) -> Option<TableInfo> {
        let [club_id, table_id, max_seats, button_seat] =
            self.re_table_info.captures(text)?.extract().1;
        Some(TableInfo {
            club_id: club_id.to_string(),
            table_id: table_id.to_string(),
            max_seats: max_seats.parse().ok()?,
            button_seat: button_seat.parse().ok()?,
        })
    }

    pub fn parse_seats(&self, text: &str) -> Vec<SeatStack> {
        self.re_seat_config
            .captures_iter(text)
            .filter_map(|captures| {
                let [seat, player_id, stack] = captures.extract().1;
                let (Ok(seat), Ok(player_id)) = (seat.parse::<u8>(), player_id.parse::<u64>()) else {
                    warn!("metadata: skipping seat line '{}'", &captures[0]);
                    return None;
                };
                Some(SeatStack {
                    seat,
                    player_id,
                    stack: stack.to_string(),
                })
            })
            .collect()
    }

    pub fn parse_boards(&self, text: &str) -> Vec<Vec<Card>> {
        self.re_board
            .captures_iter(text)
            .filter_map(|captures| match parse_cards(&captures[1]) {
                Ok(cards) => Some(cards),
                Err(err) => {
                    warn!("metadata: skipping board: {err}");
                    None
                }
            })
            .collect()
    }

    pub fn parse_hero_cards(&self, text: &str) -> Option<Vec<Card>> {
        let cards = self.first_capture(&self.re_hero_cards, text)?;
        parse_cards(&cards)
            .inspect_err(|err| warn!("metadata: ignoring hero cards: {err}"))
            .ok()
    }
}

impl Default for MetadataParser {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::test_data;

    fn cards(tokens: &str) -> Vec<Card> {
        parse_cards(tokens).unwrap()
    }

    #[test]
    fn parsing_is_idempotent() {
        let parser = MetadataParser::new();
        for hand in test_data::HANDS {
            assert_eq!(parser.parse(hand).unwrap(), parser.parse(hand).unwrap());
        }
    }

    #[test]
    fn parse_basic_hand() {
        let metadata = MetadataParser::new().parse(test_data::BASIC).unwrap();
        assert_eq!(metadata.room, "SupremaPoker");
        assert_eq!(metadata.hand_id, "2626887300344");
        assert_eq!(metadata.game_type, "5 Card Omaha Pot Limit");
        assert_eq!(
            metadata.blinds,
            Blinds {
                small_blind: "¥0.30".to_string(),
                big_blind: "¥0.60".to_string(),
                ante: None,
            }
        );
        assert_eq!(metadata.start_date_time, "2024/07/15 20:40:11 UTC");
        assert_eq!(metadata.end_date_time, "2024/07/15 20:40:45");
        assert_eq!(metadata.club_id, "14625");
        assert_eq!(metadata.table_id, "SPMA_14625_26268873");
        assert_eq!(metadata.max_seats, 6);
        assert_eq!(metadata.button_seat, 2);
        assert_eq!(metadata.players.len(), 6);
        assert_eq!(
            metadata.players[0],
            SeatStack {
                seat: 1,
                player_id: 1172370,
                stack: "¥53.40".to_string(),
            }
        );
        assert_eq!(metadata.players[3].stack, "¥60");
        assert_eq!(metadata.total_pot, "¥6.30");
        assert_eq!(metadata.rake, "¥0.35");
        assert_eq!(metadata.boards, vec![cards("5s Kd 3c")]);
        assert_eq!(metadata.hero_cards, Some(cards("Qd 7c 4c 8c 6s")));
        assert!(!metadata.was_run_twice());
    }

    #[test]
    fn parse_ante_hand() {
        let metadata = MetadataParser::new().parse(test_data::ANTE).unwrap();
        assert_eq!(metadata.hand_id, "2627490400059");
        assert_eq!(metadata.blinds.ante.as_deref(), Some("¥0.50"));
        assert_eq!(metadata.blinds.small_blind, "¥0.50");
        assert_eq!(metadata.blinds.big_blind, "¥1");
        assert_eq!(metadata.total_pot, "¥16");
        assert_eq!(metadata.rake, "¥0.80");
        assert_eq!(metadata.ante_amount(), Some(Amount::from_cents(50)));
        assert_eq!(metadata.total_pot_amount(), Some(Amount::from_cents(1600)));
        assert_eq!(metadata.button_seat, 1);
        let seats: Vec<_> = metadata.players.iter().map(|seat| seat.seat).collect();
        assert_eq!(seats, [1, 3, 4, 5, 6]);
        assert_eq!(metadata.hero_cards, None);
    }

    #[test]
    fn no_ante_is_none() {
        let parser = MetadataParser::new();
        for hand in [test_data::BASIC, test_data::SHOWDOWN, test_data::STRADDLE] {
            let metadata = parser.parse(hand).unwrap();
            assert_eq!(metadata.blinds.ante, None);
            assert_eq!(metadata.ante_amount(), None);
        }
    }

    #[test]
    fn run_twice_has_two_boards_in_order() {
        let metadata = MetadataParser::new().parse(test_data::RUN_TWICE).unwrap();
        assert_eq!(
            metadata.boards,
            vec![cards("4c 9h Js Ks Ad"), cards("7c As 2d 6h 2h")]
        );
        assert!(metadata.was_run_twice());
        assert_eq!(metadata.players.len(), 5);
        assert_eq!(metadata.hero_cards, Some(cards("9s Th Tc Kd 8s")));
    }

    #[test]
    fn missing_required_fields() {
        let parser = MetadataParser::new();
        let cases = [
            ("SupremaPoker Hand #", RequiredField::HandId),
            ("Table 'ClubId:", RequiredField::TableInfo),
            ("Hand ended at", RequiredField::EndTime),
        ];
        for (needle, missing) in cases {
            let broken = test_data::BASIC.replace(needle, "Garbage");
            assert_eq!(
                parser.parse(&broken),
                Err(Error::InvalidHandFormat { missing }),
                "{needle}"
            );
        }
        assert_eq!(
            parser.parse(""),
            Err(Error::InvalidHandFormat {
                missing: RequiredField::HandId
            })
        );
    }

    #[test]
    fn missing_summary_degrades() {
        let text = test_data::BASIC.replace("Total pot ¥6.30 | Rake ¥0.35\n", "");
        let metadata = MetadataParser::new().parse(&text).unwrap();
        assert_eq!(metadata.total_pot, UNKNOWN);
        assert_eq!(metadata.rake, UNKNOWN);
        assert_eq!(metadata.total_pot_amount(), None);
    }

    #[test]
    fn duplicate_seats_keep_first() {
        let metadata = MetadataBuilder::new()
            .header(HandHeader {
                room: "SupremaPoker".to_string(),
                hand_id: "1".to_string(),
                game_type: "5 Card Omaha Pot Limit".to_string(),
                blinds: Blinds {
                    small_blind: "¥1".to_string(),
                    big_blind: "¥2".to_string(),
                    ante: None,
                },
                start_date_time: "2024/07/15 20:40:11 UTC".to_string(),
            })
            .table(TableInfo {
                club_id: "1".to_string(),
                table_id: "T".to_string(),
                max_seats: 6,
                button_seat: 1,
            })
            .end_date_time("2024/07/15 20:40:45")
            .players([
                SeatStack { seat: 3, player_id: 30, stack: "¥3".to_string() },
                SeatStack { seat: 1, player_id: 10, stack: "¥1".to_string() },
                SeatStack { seat: 3, player_id: 31, stack: "¥4".to_string() },
                SeatStack { seat: 2, player_id: 10, stack: "¥5".to_string() },
            ])
            .build()
            .unwrap();
        let players: Vec<_> = metadata
            .players
            .iter()
            .map(|seat| (seat.seat, seat.player_id))
            .collect();
        assert_eq!(players, [(1, 10), (3, 30)]);
    }

    #[test]
    fn timestamps() {
        let metadata = MetadataParser::new().parse(test_data::BASIC).unwrap();
        let day = NaiveDate::from_ymd_opt(2024, 7, 15).unwrap();
        assert_eq!(
            metadata.started_at(),
            Some(day.and_hms_opt(20, 40, 11).unwrap())
        );
        assert_eq!(metadata.ended_at(), Some(day.and_hms_opt(20, 40, 45).unwrap()));
    }

    #[test]
    fn indented_hand_text() {
        let indented: String = test_data::BASIC
            .lines()
            .map(|line| format!("        {line}\n"))
            .collect();
        let parser = MetadataParser::new();
        assert_eq!(
            parser.parse(&indented).unwrap(),
            parser.parse(test_data::BASIC).unwrap()
        );
    }

    #[test]
    fn metadata_json_omits_missing_ante() {
        let metadata = MetadataParser::new().parse(test_data::BASIC).unwrap();
        let json = serde_json::to_value(&metadata).unwrap();
        assert!(json["blinds"].get("ante").is_none());
        assert_eq!(json["boards"][0][1], "Kd");
        let parsed: HandMetadata = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, metadata);
    }
}
