use std::path::Path;

use chrono::NaiveDateTime;
use history_core::{
    amount::Amount,
    batch::{BatchParser, BatchPolicy, HandFailure},
    hand::ParsedHand,
    result::Error as ParseError,
};
use log::{debug, info, warn};
use rusqlite::{Connection, OptionalExtension, Row, Transaction};

use crate::result::Result;

pub struct DB {
    conn: Connection,
}

const SCHEMA: &str = include_str!("schema.sql");

const HAND_COLUMNS: &str = "id, owner, hand_id, started_at, hero_id, hero_balance, metadata, events";

impl DB {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path)?;
        Self::init(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.pragma_update(None, "encoding", "UTF-8")?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        conn.execute_batch(SCHEMA)?;

        let db = Self { conn };
        db.check_schema()?;
        Ok(db)
    }

    fn check_schema(&self) -> Result<()> {
        let mem = Connection::open_in_memory()?;
        mem.execute_batch(SCHEMA)?;

        // Only a simple check, schemas might still be equal,
        // except for some formatting etc.
        if Self::schema(&self.conn)? != Self::schema(&mem)? {
            Err("db: schema does not match expected schema".into())
        } else {
            Ok(())
        }
    }

    fn schema(conn: &Connection) -> Result<Vec<String>> {
        let mut stmt = conn.prepare(
            "SELECT sql FROM sqlite_schema
            WHERE name NOT LIKE 'sqlite_%'
            ORDER BY name",
        )?;
        let sql: std::result::Result<Vec<String>, _> =
            stmt.query_map((), |row| row.get(0))?.collect();
        Ok(sql?)
    }

    /// Parses and stores an upload hand by hand. Each hand is written before
    /// the next one is parsed. Under `AllOrNothing` a failing hand rolls back
    /// the whole upload.
    pub fn import(&mut self, owner: &str, text: &str, policy: BatchPolicy) -> Result<Import> {
        let parser = BatchParser::new(policy);
        let mut import = Import::default();
        let tx = self.conn.transaction()?;

        for (index, hand) in parser.hands(text) {
            let hand = hand.and_then(|hand| {
                let hero = match hand.hero_balance() {
                    Ok(hero) => Some(hero),
                    Err(ParseError::NoHeroIdentifiable) => None,
                    Err(err) => return Err(err),
                };
                Ok((hand, hero))
            });
            let (hand, hero) = match (hand, policy) {
                (Ok(hand), _) => hand,
                (Err(err), BatchPolicy::AllOrNothing) => {
                    return Err(ParseError::Batch {
                        index,
                        source: Box::new(err),
                    }
                    .into());
                }
                (Err(err), BatchPolicy::BestEffort) => {
                    warn!("import: skipping hand {index}: {err}");
                    import.failures.push(HandFailure { index, error: err });
                    continue;
                }
            };

            match Self::insert_hand(&tx, owner, &hand, hero)? {
                Some(_) => import.added += 1,
                None => {
                    debug!("import: hand {} already stored", hand.metadata.hand_id);
                    import.duplicates += 1;
                }
            }
        }

        tx.commit()?;
        info!(
            "import: owner {owner}: {} added, {} duplicates, {} failed",
            import.added,
            import.duplicates,
            import.failures.len()
        );
        Ok(import)
    }

    /// Returns `None` if the owner already has a hand with the same hand id.
    fn insert_hand(
        tx: &Transaction<'_>,
        owner: &str,
        hand: &ParsedHand,
        hero: Option<(u64, Amount)>,
    ) -> Result<Option<u64>> {
        let metadata = &hand.metadata;
        if Self::has_hand(tx, owner, &metadata.hand_id)? {
            return Ok(None);
        }

        let hero_id = hero.map(|(hero, _)| hero);
        let hero_balance = hero.map(|(_, balance)| balance.cents());

        tx.execute(
            "INSERT INTO hands(
                owner,
                hand_id,
                room,
                game_type,
                club_id,
                table_id,
                started_at,
                hero_id,
                hero_balance,
                metadata,
                events
            ) VALUES(?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            rusqlite::params![
                owner,
                metadata.hand_id,
                metadata.room,
                metadata.game_type,
                metadata.club_id,
                metadata.table_id,
                metadata.started_at(),
                hero_id,
                hero_balance,
                serde_json::to_string(metadata)?,
                serde_json::to_string(&hand.events)?,
            ],
        )?;
        Ok(Some(u64::try_from(tx.last_insert_rowid())?))
    }

    fn has_hand(tx: &Transaction<'_>, owner: &str, hand_id: &str) -> Result<bool> {
        let mut stmt = tx.prepare("SELECT COUNT(*) FROM hands WHERE owner = ? AND hand_id = ?")?;
        let count: u64 = stmt.query_row((owner, hand_id), |row| row.get(0))?;
        Ok(count != 0)
    }

    pub fn hands_by_owner(&self, owner: &str) -> Result<Vec<StoredHand>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {HAND_COLUMNS} FROM hands WHERE owner = ? ORDER BY started_at, id"
        ))?;
        let rows = stmt
            .query_map((owner,), StoredRow::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        rows.into_iter().map(StoredRow::into_hand).collect()
    }

    pub fn hand_by_id(&self, owner: &str, hand_id: &str) -> Result<Option<StoredHand>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {HAND_COLUMNS} FROM hands WHERE owner = ? AND hand_id = ?"
        ))?;
        let row = stmt
            .query_row((owner, hand_id), StoredRow::from_row)
            .optional()?;
        row.map(StoredRow::into_hand).transpose()
    }

    pub fn delete_hand(&self, owner: &str, hand_id: &str) -> Result<bool> {
        let deleted = self.conn.execute(
            "DELETE FROM hands WHERE owner = ? AND hand_id = ?",
            (owner, hand_id),
        )?;
        Ok(deleted != 0)
    }
}

#[derive(Debug, Default)]
pub struct Import {
    pub added: u64,
    pub duplicates: u64,
    pub failures: Vec<HandFailure>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredHand {
    pub id: u64,
    pub owner: String,
    pub started_at: Option<NaiveDateTime>,
    pub hero_id: Option<u64>,
    pub hero_balance: Option<Amount>,
    pub hand: ParsedHand,
}

struct StoredRow {
    id: u64,
    owner: String,
    started_at: Option<NaiveDateTime>,
    hero_id: Option<u64>,
    hero_balance: Option<i64>,
    metadata: String,
    events: String,
}

impl StoredRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            owner: row.get("owner")?,
            started_at: row.get("started_at")?,
            hero_id: row.get("hero_id")?,
            hero_balance: row.get("hero_balance")?,
            metadata: row.get("metadata")?,
            events: row.get("events")?,
        })
    }

    fn into_hand(self) -> Result<StoredHand> {
        let hand = ParsedHand {
            metadata: serde_json::from_str(&self.metadata)?,
            events: serde_json::from_str(&self.events)?,
        };
        Ok(StoredHand {
            id: self.id,
            owner: self.owner,
            started_at: self.started_at,
            hero_id: self.hero_id,
            hero_balance: self.hero_balance.map(Amount::from_cents),
            hand,
        })
    }
}
