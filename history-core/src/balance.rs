use log::debug;

use crate::{
    amount::Amount,
    event::{ActionType, Event},
    metadata::{HandMetadata, SeatStack},
    result::{Error, Result},
};

/// Net result of `player_id` over one hand: stack after replaying the player's
/// contributions and collections, minus the starting stack.
///
/// Only player actions move chips here. Uncalled bets, board changes and
/// reveals are ignored.
pub fn compute_balance(player_id: u64, seats: &[SeatStack], events: &[Event]) -> Result<Amount> {
    let Some(seat) = seats.iter().find(|seat| seat.player_id == player_id) else {
        return Err(Error::PlayerNotSeated { player_id });
    };
    let starting_stack = seat.starting_stack()?;

    let mut stack = starting_stack;
    for event in events {
        let Event::PlayerAction {
            player_id: actor,
            action_type,
            amount,
            ..
        } = event
        else {
            continue;
        };
        if *actor != player_id {
            continue;
        }
        let next = if action_type.is_contribution() {
            stack.checked_sub(*amount)
        } else if *action_type == ActionType::Collected {
            stack.checked_add(*amount)
        } else {
            continue;
        };
        let Some(next) = next else {
            return Err(Error::InvalidAmount(amount.to_string()));
        };
        stack = next;
    }

    let Some(balance) = stack.checked_sub(starting_stack) else {
        return Err(Error::InvalidAmount(stack.to_string()));
    };
    debug!("balance: player {player_id} seat {} result {balance}", seat.seat);
    Ok(balance)
}

/// The hero is the player of the first `DealtCards` event.
// TODO: Pick the player whose dealt cards match `HandMetadata::hero_cards`
// once logs with more than one visible deal show up.
pub fn find_hero(events: &[Event]) -> Result<u64> {
    events
        .iter()
        .find_map(|event| match event {
            Event::DealtCards { player_id, .. } => Some(*player_id),
            _ => None,
        })
        .ok_or(Error::NoHeroIdentifiable)
}

pub fn hero_balance(metadata: &HandMetadata, events: &[Event]) -> Result<(u64, Amount)> {
    let hero = find_hero(events)?;
    let balance = compute_balance(hero, &metadata.players, events)?;
    Ok((hero, balance))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{hand::HandParser, test_data};

    fn cents(cents: i64) -> Amount {
        Amount::from_cents(cents)
    }

    #[test]
    fn hero_balances_of_fixtures() {
        let parser = HandParser::new();
        let cases = [
            (test_data::BASIC, 657898, -60),
            // Raise increments count, not the raised-to total.
            (test_data::SHOWDOWN, 657898, -(250 + 365 + 1460) + 4805),
            (test_data::ALL_IN, 657898, -50),
            (test_data::RUN_TWICE, 657898, -(50 + 50 + 350)),
            (test_data::STRADDLE, 657898, -200),
        ];
        for (text, hero, expected) in cases {
            let hand = parser.parse(text).unwrap();
            assert_eq!(
                hero_balance(&hand.metadata, &hand.events).unwrap(),
                (hero, cents(expected))
            );
        }
    }

    #[test]
    fn winner_balance() {
        let hand = HandParser::new().parse(test_data::ANTE).unwrap();
        // ante 0.50, call 6, bet 16, collected 15.20
        let balance = compute_balance(353625, &hand.metadata.players, &hand.events).unwrap();
        assert_eq!(balance, cents(-50 - 600 - 1600 + 1520));
    }

    #[test]
    fn folding_player_without_posts_is_even() {
        let hand = HandParser::new().parse(test_data::BASIC).unwrap();
        let balance = compute_balance(636899, &hand.metadata.players, &hand.events).unwrap();
        assert_eq!(balance, Amount::ZERO);
    }

    #[test]
    fn no_dealt_cards_means_no_hero() {
        let hand = HandParser::new().parse(test_data::ANTE).unwrap();
        assert_eq!(find_hero(&hand.events), Err(Error::NoHeroIdentifiable));
        assert_eq!(
            hero_balance(&hand.metadata, &hand.events),
            Err(Error::NoHeroIdentifiable)
        );
    }

    #[test]
    fn unseated_player() {
        let hand = HandParser::new().parse(test_data::BASIC).unwrap();
        assert_eq!(
            compute_balance(42, &hand.metadata.players, &hand.events),
            Err(Error::PlayerNotSeated { player_id: 42 })
        );
    }

    #[test]
    fn overflowing_contributions() {
        let hand = HandParser::new().parse(test_data::BASIC).unwrap();
        let huge = Amount::from_cents(i64::MAX / 2 + 1);
        let bet = Event::PlayerAction {
            player_id: 458625,
            action_type: ActionType::Bets,
            amount: huge,
            is_all_in: false,
        };
        assert_eq!(
            compute_balance(458625, &hand.metadata.players, &[bet.clone(), bet.clone(), bet]),
            Err(Error::InvalidAmount(huge.to_string()))
        );
    }

    #[test]
    fn balance_is_recomputed_from_events() {
        let hand = HandParser::new().parse(test_data::BASIC).unwrap();
        let seats = &hand.metadata.players;
        let first = compute_balance(458625, seats, &hand.events).unwrap();
        let second = compute_balance(458625, seats, &hand.events).unwrap();
        assert_eq!(first, second);
        // raise 2.10, bet 4.70, collected 5.95
        assert_eq!(first, cents(-210 - 470 + 595));
        assert_eq!(compute_balance(458625, seats, &[]).unwrap(), Amount::ZERO);
    }
}
