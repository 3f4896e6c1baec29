use regex::Regex;

/// Shape of a single hand history line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    PlayerAction,
    BoardChange,
    UncalledBet,
    DealtCards,
    ShowCards,
    Unknown,
}

pub struct LineClassifier {
    re_action_verb: Regex,
    re_seat_line: Regex,
    re_stage_marker: Regex,
    re_seat_showed: Regex,
}

impl LineClassifier {
    pub fn new() -> Self {
        const RE_ACTION_VERB: &str = r"\b(?:bets|folds|calls|raises|posts|checks|collected)\b";
        const RE_SEAT_LINE: &str = r"^Seat \d+:";
        const RE_STAGE_MARKER: &str = r"\*\*\* (?:(?:FIRST|SECOND) )?(?:FLOP|TURN|RIVER) \*\*\*";
        const RE_SEAT_SHOWED: &str = r"^Seat \d+: \d+\b.*\bshowed \[";

        Self {
            re_action_verb: Regex::new(RE_ACTION_VERB).unwrap(),
            re_seat_line: Regex::new(RE_SEAT_LINE).unwrap(),
            re_stage_marker: Regex::new(RE_STAGE_MARKER).unwrap(),
            re_seat_showed: Regex::new(RE_SEAT_SHOWED).unwrap(),
        }
    }

    /// Picks the parser for one line. First matching rule wins.
    ///
    /// Seat lines never count as player actions: the summary section repeats
    /// pot collections there (`Seat 2: 458625 (button) collected (¥5.95)`).
    pub fn classify(&self, line: &str) -> LineKind {
        let line = line.trim();
        let seat_line = self.re_seat_line.is_match(line);
        if !seat_line && self.re_action_verb.is_match(line) {
            LineKind::PlayerAction
        } else if self.re_stage_marker.is_match(line) {
            LineKind::BoardChange
        } else if line.starts_with("Uncalled bet") {
            LineKind::UncalledBet
        } else if line.starts_with("Dealt to") {
            LineKind::DealtCards
        } else if seat_line && self.re_seat_showed.is_match(line) {
            LineKind::ShowCards
        } else {
            LineKind::Unknown
        }
    }
}

impl Default for LineClassifier {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_lines() {
        use LineKind::*;

        let classifier = LineClassifier::new();
        let cases = [
            ("1165261: posts small blind ¥0.30", PlayerAction),
            ("353625: posts the ante ¥0.50", PlayerAction),
            ("657898: posts straddle ¥2", PlayerAction),
            ("636899: folds", PlayerAction),
            ("1176294: checks", PlayerAction),
            ("458625: raises ¥2.10 to ¥2.70", PlayerAction),
            ("353625: calls ¥25.75 and is all-in", PlayerAction),
            ("458625 collected ¥5.95 from pot", PlayerAction),
            ("*** FLOP *** [5s Kd 3c] {Rake: ¥0}", BoardChange),
            ("*** TURN *** [4d Jd 4c] [Jc] {Rake: ¥0}", BoardChange),
            ("*** SECOND RIVER *** [7c As 2d 6h] [2h]", BoardChange),
            ("Uncalled bet (¥4.70) returned to 458625", UncalledBet),
            ("Dealt to 657898 [Qd 7c 4c 8c 6s]", DealtCards),
            ("Seat 1: 353625 showed [Jd Js Qh Qs 8c]", ShowCards),
            (
                "Seat 6: 657898 showed [As 3h 5h 4h Qs] and won (¥48.05) with a full house",
                ShowCards,
            ),
            ("Seat 2: 458625 (button) collected (¥5.95)", Unknown),
            ("Seat 3: 1165261 (small blind) folded before Flop", Unknown),
            ("Seat 1: 1172370 (¥53.40 in chips)", Unknown),
            ("*** HOLE CARDS ***", Unknown),
            ("*** FIRST SHOW DOWN ***", Unknown),
            ("*** SUMMARY ***", Unknown),
            ("657898: shows [As 3h 5h 4h Qs] (a full house, Fours full of Threes)", Unknown),
            ("802228: mucks hand", Unknown),
            ("Total pot ¥6.30 | Rake ¥0.35", Unknown),
            ("Board [5s Kd 3c]", Unknown),
            ("Hand ended at 2024/07/15 20:40:45", Unknown),
            ("", Unknown),
        ];
        for (line, expected) in cases {
            assert_eq!(classifier.classify(line), expected, "{line}");
        }
    }

    #[test]
    fn classify_trims_indentation() {
        let classifier = LineClassifier::new();
        assert_eq!(
            classifier.classify("        Dealt to 657898 [Qd 7c 4c 8c 6s]"),
            LineKind::DealtCards
        );
    }

    #[test]
    fn verbs_must_be_whole_words() {
        let classifier = LineClassifier::new();
        assert_eq!(classifier.classify("raisesx callsy"), LineKind::Unknown);
    }
}
