use std::{
    fs,
    path::{Path, PathBuf},
    process::ExitCode,
};

use clap::{Parser, Subcommand};
use history_core::{
    amount::Amount,
    batch::{BatchParser, BatchPolicy},
    result::Error as ParseError,
};
use serde_json::json;

use crate::{config::Config, db::DB, result::Result};

mod config;
mod db;
mod result;

#[derive(Parser)]
#[command(name = "history", about = "Parse and store poker hand histories")]
struct Cli {
    /// SQLite database, overrides HISTORY_DATABASE and the config file.
    #[arg(long, global = true)]
    database: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print every hand of a history file as JSON.
    Parse { file: PathBuf },
    /// Print the per-hand balance of a player, the hero by default.
    Balance {
        file: PathBuf,
        #[arg(long)]
        player: Option<u64>,
    },
    /// Parse a history file and store its hands.
    Import {
        file: PathBuf,
        #[arg(long)]
        owner: Option<String>,
        #[arg(long, value_parser = parse_policy)]
        policy: Option<BatchPolicy>,
    },
    /// List the stored hands of an owner.
    Hands {
        #[arg(long)]
        owner: Option<String>,
    },
    Show {
        hand_id: String,
        #[arg(long)]
        owner: Option<String>,
    },
    Delete {
        hand_id: String,
        #[arg(long)]
        owner: Option<String>,
    },
}

fn parse_policy(s: &str) -> std::result::Result<BatchPolicy, String> {
    BatchPolicy::from_str(s)
        .ok_or_else(|| format!("expected all-or-nothing or best-effort, got '{s}'"))
}

fn main() -> ExitCode {
    env_logger::init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut config = config::load()?;
    if let Some(database) = cli.database {
        config.database = database;
    }

    match cli.command {
        Command::Parse { file } => parse(&config, &file),
        Command::Balance { file, player } => balance(&config, &file, player),
        Command::Import {
            file,
            owner,
            policy,
        } => {
            let owner = owner_of(&config, owner)?;
            let policy = policy.unwrap_or(config.policy);
            import(&config, &owner, &file, policy)
        }
        Command::Hands { owner } => {
            let owner = owner_of(&config, owner)?;
            let db = DB::open(&config.database)?;
            let hands: Vec<_> = db
                .hands_by_owner(&owner)?
                .into_iter()
                .map(|stored| {
                    json!({
                        "id": stored.id,
                        "owner": stored.owner,
                        "hand_id": stored.hand.metadata.hand_id,
                        "room": stored.hand.metadata.room,
                        "game_type": stored.hand.metadata.game_type,
                        "table_id": stored.hand.metadata.table_id,
                        "started_at": stored.started_at,
                        "hero_id": stored.hero_id,
                        "hero_balance": stored.hero_balance,
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&hands)?);
            Ok(())
        }
        Command::Show { hand_id, owner } => {
            let owner = owner_of(&config, owner)?;
            let db = DB::open(&config.database)?;
            let Some(stored) = db.hand_by_id(&owner, &hand_id)? else {
                return Err(format!("hand {hand_id} not found for owner {owner}").into());
            };
            println!("{}", serde_json::to_string_pretty(&stored.hand)?);
            Ok(())
        }
        Command::Delete { hand_id, owner } => {
            let owner = owner_of(&config, owner)?;
            let db = DB::open(&config.database)?;
            if !db.delete_hand(&owner, &hand_id)? {
                return Err(format!("hand {hand_id} not found for owner {owner}").into());
            }
            Ok(())
        }
    }
}

fn owner_of(config: &Config, owner: Option<String>) -> Result<String> {
    owner
        .or_else(|| config.owner.clone())
        .ok_or_else(|| "no owner: pass --owner or set HISTORY_OWNER".into())
}

fn parse(config: &Config, file: &Path) -> Result<()> {
    let text = fs::read_to_string(file)?;
    let report = BatchParser::new(config.policy).parse(&text)?;
    for failure in &report.failures {
        eprintln!("hand {}: {}", failure.index, failure.error);
    }
    println!("{}", serde_json::to_string_pretty(&report.hands)?);
    Ok(())
}

fn balance(config: &Config, file: &Path, player: Option<u64>) -> Result<()> {
    let text = fs::read_to_string(file)?;
    for (hand_id, player, balance) in balances(config.policy, &text, player)? {
        println!("{hand_id}\t{player}\t{balance}");
    }
    Ok(())
}

/// Balance of `player`, or of each hand's hero, per hand of `text`. Hands
/// without that player are skipped; other failing hands follow `policy`.
fn balances(
    policy: BatchPolicy,
    text: &str,
    player: Option<u64>,
) -> Result<Vec<(String, u64, Amount)>> {
    let mut balances = Vec::new();
    for (index, hand) in BatchParser::new(policy).hands(text) {
        let balance = hand.and_then(|hand| {
            let balance = match player {
                Some(player) => hand.balance(player).map(|balance| (player, balance)),
                None => hand.hero_balance(),
            };
            Ok((hand.metadata.hand_id, balance?))
        });
        match (balance, policy) {
            (Ok((hand_id, (player, balance))), _) => {
                balances.push((hand_id, player, balance));
            }
            (Err(err @ (ParseError::PlayerNotSeated { .. } | ParseError::NoHeroIdentifiable)), _)
            | (Err(err), BatchPolicy::BestEffort) => {
                eprintln!("hand {index}: {err}");
            }
            (Err(err), BatchPolicy::AllOrNothing) => {
                return Err(ParseError::Batch {
                    index,
                    source: Box::new(err),
                }
                .into());
            }
        }
    }
    Ok(balances)
}

fn import(config: &Config, owner: &str, file: &Path, policy: BatchPolicy) -> Result<()> {
    let text = fs::read_to_string(file)?;
    let mut db = DB::open(&config.database)?;
    let import = db.import(owner, &text, policy)?;
    for failure in &import.failures {
        eprintln!("hand {}: {}", failure.index, failure.error);
    }
    println!(
        "{} added, {} duplicates, {} failed",
        import.added,
        import.duplicates,
        import.failures.len()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASIC: &str = include_str!("../../history-core/src/test_data/basic.txt");
    const BATCH: &str = include_str!("../../history-core/src/test_data/batch.txt");

    #[test]
    fn balances_skip_hands_without_the_player() {
        for policy in [BatchPolicy::AllOrNothing, BatchPolicy::BestEffort] {
            let balances = balances(policy, BATCH, Some(353625)).unwrap();
            let hand_ids: Vec<_> = balances
                .iter()
                .map(|(hand_id, ..)| hand_id.as_str())
                .collect();
            assert!(hand_ids.contains(&"2627490400059"), "{hand_ids:?}");
            assert!(!hand_ids.contains(&"2626887300344"));
            let ante = balances
                .iter()
                .find(|(hand_id, ..)| hand_id == "2627490400059")
                .unwrap();
            assert_eq!(
                ante,
                &("2627490400059".to_string(), 353625, Amount::from_cents(-730))
            );
        }
    }

    #[test]
    fn hero_balances_skip_hands_without_hero() {
        let balances = balances(BatchPolicy::AllOrNothing, BATCH, None).unwrap();
        assert_eq!(balances.len(), 5);
        assert_eq!(
            balances[0],
            ("2626887300344".to_string(), 657898, Amount::from_cents(-60))
        );
    }

    #[test]
    fn broken_hand_follows_policy() {
        let text = format!("{}\n{BASIC}", BASIC.replace("Hand ended at", "Hand stopped at"));
        let err = balances(BatchPolicy::AllOrNothing, &text, None).unwrap_err();
        assert!(err.to_string().contains("hand 0 of batch"), "{err}");

        let balances = balances(BatchPolicy::BestEffort, &text, None).unwrap();
        assert_eq!(balances.len(), 1);
    }
}
