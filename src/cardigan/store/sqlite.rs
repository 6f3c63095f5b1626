use super::{sample_ids, text_key, AuthorTally, DeckStatus, DeckStore};
use crate::error::{CardError, Result};
use crate::index::CardId;
use crate::model::{Author, Card, CardKind, FillCard, PromptCard};
use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rusqlite::{params, Connection, ErrorCode, OptionalExtension, TransactionBehavior};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, warn};

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// One SQLite database file per deck.
///
/// Each request opens its own store, does its work and drops it. Concurrent
/// writers to the same file are serialized by SQLite; saves take the write
/// lock up front so the duplicate check and the write can't interleave.
pub struct SqliteStore {
    conn: Connection,
    rng: StdRng,
}

impl SqliteStore {
    /// Opens the database at `path`, creating the file and its tables if needed.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        debug!(path = %path.display(), "Opening deck database");
        let conn = Connection::open(path)?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        let store = Self {
            conn,
            rng: StdRng::from_entropy(),
        };
        store.migrate()?;
        Ok(store)
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    fn migrate(&self) -> Result<()> {
        self.conn.execute_batch(
            r#"
            PRAGMA journal_mode=WAL;

            CREATE TABLE IF NOT EXISTS prompt_cards (
              id INTEGER PRIMARY KEY AUTOINCREMENT,
              text TEXT NOT NULL,
              text_key TEXT NOT NULL UNIQUE,
              user_id TEXT NOT NULL,
              user_name TEXT NOT NULL,
              created_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS fill_cards (
              id INTEGER PRIMARY KEY AUTOINCREMENT,
              text TEXT NOT NULL,
              text_key TEXT NOT NULL UNIQUE,
              user_id TEXT NOT NULL,
              user_name TEXT NOT NULL,
              created_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS config (
              key TEXT PRIMARY KEY,
              value TEXT NOT NULL
            );
            "#,
        )?;
        Ok(())
    }
}

impl DeckStore for SqliteStore {
    fn draw_prompt(&mut self) -> Result<PromptCard> {
        let tx = self.conn.transaction()?;
        let pool = ids_tx(&tx, CardKind::Prompt, &[])?;
        let picked = sample_ids(&mut self.rng, CardKind::Prompt, &pool, 1)?;
        let card = get_tx(&tx, CardId::new(CardKind::Prompt, picked[0]))?;
        tx.commit()?;
        card.into_prompt()
    }

    fn draw_fills_excluding(&mut self, count: usize, exclude: &[i64]) -> Result<Vec<FillCard>> {
        let tx = self.conn.transaction()?;
        let pool = ids_tx(&tx, CardKind::Fill, exclude)?;
        let picked = sample_ids(&mut self.rng, CardKind::Fill, &pool, count)?;
        let cards = picked
            .into_iter()
            .map(|n| get_tx(&tx, CardId::new(CardKind::Fill, n))?.into_fill())
            .collect::<Result<Vec<_>>>()?;
        tx.commit()?;
        Ok(cards)
    }

    fn save(&mut self, card: &Card) -> Result<i64> {
        let kind = card.kind();
        let table = kind.table();
        let key = text_key(card.text());
        let author = card.author();

        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        if let Some(existing) = find_by_key_tx(&tx, kind, &key)? {
            if Some(existing) != card.id() {
                let id = CardId::new(kind, existing);
                warn!(%id, "Rejected duplicate card");
                return Err(CardError::DuplicateCard { id });
            }
        }

        let written = match card.id() {
            Some(n) => tx
                .execute(
                    &format!(
                        "UPDATE {table} SET text = ?1, text_key = ?2 WHERE id = ?3"
                    ),
                    params![card.text(), key, n],
                )
                .map(|changed| (changed, n)),
            None => tx
                .execute(
                    &format!(
                        "INSERT INTO {table} (text, text_key, user_id, user_name, created_at) VALUES (?1, ?2, ?3, ?4, ?5)"
                    ),
                    params![
                        card.text(),
                        key,
                        author.id,
                        author.name,
                        card.created_at().to_rfc3339()
                    ],
                )
                .map(|changed| (changed, tx.last_insert_rowid())),
        };

        let id = match written {
            Ok((0, n)) => return Err(CardError::NotFound(CardId::new(kind, n))),
            Ok((_, n)) => n,
            Err(rusqlite::Error::SqliteFailure(e, _)) if e.code == ErrorCode::ConstraintViolation => {
                let existing = find_by_key_tx(&tx, kind, &key)?.unwrap_or_default();
                return Err(CardError::DuplicateCard {
                    id: CardId::new(kind, existing),
                });
            }
            Err(e) => return Err(e.into()),
        };

        tx.commit()?;
        debug!(id = %CardId::new(kind, id), "Saved card");
        Ok(id)
    }

    fn get(&self, id: CardId) -> Result<Card> {
        get_tx(&self.conn, id)
    }

    fn search(&self, term: &str) -> Result<Vec<Card>> {
        let needle = text_key(term);
        let mut found = Vec::new();
        for kind in CardKind::ALL {
            let mut stmt = self.conn.prepare(&format!(
                "SELECT id, text, user_id, user_name, created_at FROM {} WHERE instr(text_key, ?1) > 0 ORDER BY id",
                kind.table()
            ))?;
            let rows = stmt.query_map(params![needle], |row| card_from_row(kind, row))?;
            for card in rows {
                found.push(card?);
            }
        }
        Ok(found)
    }

    fn status(&self) -> Result<DeckStatus> {
        let mut tallies: BTreeMap<String, AuthorTally> = BTreeMap::new();
        for kind in CardKind::ALL {
            let mut stmt = self.conn.prepare(&format!(
                "SELECT user_id, MAX(user_name), COUNT(*) FROM {} GROUP BY user_id",
                kind.table()
            ))?;
            let rows = stmt.query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    count_from_row(row, 2)?,
                ))
            })?;
            for row in rows {
                let (author_id, name, count) = row?;
                let tally = tallies
                    .entry(author_id.clone())
                    .or_insert_with(|| AuthorTally {
                        author_id,
                        name,
                        prompts: 0,
                        fills: 0,
                    });
                match kind {
                    CardKind::Prompt => tally.prompts += count,
                    CardKind::Fill => tally.fills += count,
                }
            }
        }
        Ok(DeckStatus::from_tallies(tallies.into_values()))
    }

    fn get_config(&self, key: &str) -> Result<Option<String>> {
        Ok(self
            .conn
            .query_row(
                "SELECT value FROM config WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?)
    }

    fn set_config(&mut self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            "INSERT INTO config (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, value],
        )?;
        Ok(())
    }

    fn set_config_if_absent(&mut self, key: &str, value: &str) -> Result<String> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        let inserted = tx.execute(
            "INSERT OR IGNORE INTO config (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        let current: String = tx.query_row(
            "SELECT value FROM config WHERE key = ?1",
            params![key],
            |row| row.get(0),
        )?;
        tx.commit()?;
        if inserted > 0 {
            debug!(key, "Seeded config value");
        }
        Ok(current)
    }
}

fn ids_tx(conn: &Connection, kind: CardKind, exclude: &[i64]) -> Result<Vec<i64>> {
    let mut stmt = conn.prepare(&format!("SELECT id FROM {} ORDER BY id", kind.table()))?;
    let ids = stmt
        .query_map([], |row| row.get::<_, i64>(0))?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(ids.into_iter().filter(|id| !exclude.contains(id)).collect())
}

fn get_tx(conn: &Connection, id: CardId) -> Result<Card> {
    conn.query_row(
        &format!(
            "SELECT id, text, user_id, user_name, created_at FROM {} WHERE id = ?1",
            id.kind.table()
        ),
        params![id.number],
        |row| card_from_row(id.kind, row),
    )
    .optional()?
    .ok_or(CardError::NotFound(id))
}

fn find_by_key_tx(conn: &Connection, kind: CardKind, key: &str) -> Result<Option<i64>> {
    Ok(conn
        .query_row(
            &format!("SELECT id FROM {} WHERE text_key = ?1", kind.table()),
            params![key],
            |row| row.get(0),
        )
        .optional()?)
}

fn count_from_row(row: &rusqlite::Row<'_>, idx: usize) -> rusqlite::Result<usize> {
    let count: i64 = row.get(idx)?;
    usize::try_from(count).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Integer, Box::new(e))
    })
}

fn card_from_row(kind: CardKind, row: &rusqlite::Row<'_>) -> rusqlite::Result<Card> {
    let id: i64 = row.get(0)?;
    let text: String = row.get(1)?;
    let author = Author::new(row.get::<_, String>(2)?, row.get::<_, String>(3)?);
    let raw_created: String = row.get(4)?;
    let created_at = DateTime::parse_from_rfc3339(&raw_created)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(4, rusqlite::types::Type::Text, Box::new(e))
        })?;

    Ok(match kind {
        CardKind::Prompt => Card::Prompt(PromptCard {
            id: Some(id),
            text,
            author,
            created_at,
        }),
        CardKind::Fill => Card::Fill(FillCard {
            id: Some(id),
            text,
            author,
            created_at,
        }),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::{Arc, Barrier};
    use std::thread;
    use tempfile::TempDir;

    fn setup() -> (TempDir, SqliteStore) {
        let dir = TempDir::new().unwrap();
        let store = SqliteStore::open(dir.path().join("test-cards.db"))
            .unwrap()
            .with_seed(1);
        (dir, store)
    }

    fn alice() -> Author {
        Author::new("U1", "alice")
    }

    fn add(store: &mut SqliteStore, kind: CardKind, text: &str) -> i64 {
        store.save(&Card::new(kind, text, alice())).unwrap()
    }

    #[test]
    fn creates_schema_and_reopens() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("deck-cards.db");
        {
            let mut store = SqliteStore::open(&path).unwrap();
            add(&mut store, CardKind::Fill, "gravity");
        }
        let store = SqliteStore::open(&path).unwrap();
        assert_eq!(store.get_by_kind_id("F1").unwrap().text(), "gravity");
    }

    #[test]
    fn save_assigns_ids_and_get_returns_card() {
        let (_dir, mut store) = setup();
        for i in 1..=6 {
            add(&mut store, CardKind::Fill, &format!("fill {i}"));
        }
        for i in 1..=7 {
            let id = add(&mut store, CardKind::Prompt, &format!("prompt {i} :blank:"));
            assert_eq!(id, i);
        }

        let card = store.get_by_kind_id("P7").unwrap();
        assert_eq!(card.text(), "prompt 7 :blank:");
        assert_eq!(card.author(), &alice());
        assert_eq!(card.id_string(), "P7");
    }

    #[test]
    fn get_rejects_malformed_and_missing_ids() {
        let (_dir, store) = setup();
        assert!(matches!(
            store.get_by_kind_id("X7"),
            Err(CardError::InvalidId(_))
        ));
        assert!(matches!(store.get_by_kind_id("P"), Err(CardError::InvalidId(_))));
        assert!(matches!(store.get_by_kind_id("P7"), Err(CardError::NotFound(_))));
    }

    #[test]
    fn duplicate_save_leaves_store_unchanged() {
        let (_dir, mut store) = setup();
        add(&mut store, CardKind::Fill, "The Chicken");
        let err = store
            .save(&Card::new(CardKind::Fill, "the chicken", alice()))
            .unwrap_err();
        assert!(matches!(err, CardError::DuplicateCard { id } if id.to_string() == "F1"));
        assert_eq!(store.status().unwrap().fill_count, 1);
    }

    #[test]
    fn update_in_place_keeps_id_and_allows_case_change() {
        let (_dir, mut store) = setup();
        add(&mut store, CardKind::Fill, "gravity");
        let mut card = store.get_by_kind_id("F1").unwrap();
        card.set_text("Gravity".into());
        assert_eq!(store.save(&card).unwrap(), 1);
        assert_eq!(store.get_by_kind_id("F1").unwrap().text(), "Gravity");
        assert_eq!(store.status().unwrap().fill_count, 1);
    }

    #[test]
    fn update_keeps_original_author() {
        let (_dir, mut store) = setup();
        add(&mut store, CardKind::Fill, "gravity");
        let Card::Fill(mut fill) = store.get_by_kind_id("F1").unwrap() else {
            panic!("expected a fill card");
        };
        fill.text = "levity".into();
        fill.author = Author::new("U2", "bob");
        store.save(&Card::Fill(fill)).unwrap();

        let card = store.get_by_kind_id("F1").unwrap();
        assert_eq!(card.text(), "levity");
        assert_eq!(card.author(), &alice());
    }

    #[test]
    fn update_of_unknown_id_is_not_found() {
        let (_dir, mut store) = setup();
        let mut card = Card::new(CardKind::Fill, "ghost", alice());
        card.set_id(99);
        assert!(matches!(store.save(&card), Err(CardError::NotFound(_))));
    }

    #[test]
    fn draw_fills_is_without_replacement() {
        let (_dir, mut store) = setup();
        for i in 1..=4 {
            add(&mut store, CardKind::Fill, &format!("fill {i}"));
        }
        for _ in 0..10 {
            let fills = store.draw_fills(4).unwrap();
            let ids: HashSet<_> = fills.iter().map(|f| f.id).collect();
            assert_eq!(ids.len(), 4);
        }
        assert!(matches!(
            store.draw_fills(5),
            Err(CardError::DeckExhausted { wanted: 5, available: 4, .. })
        ));
    }

    #[test]
    fn draw_fills_respects_exclusions() {
        let (_dir, mut store) = setup();
        for i in 1..=3 {
            add(&mut store, CardKind::Fill, &format!("fill {i}"));
        }
        let fills = store.draw_fills_excluding(2, &[2]).unwrap();
        assert!(fills.iter().all(|f| f.id != Some(2)));
        assert!(store.draw_fills_excluding(3, &[2]).is_err());
    }

    #[test]
    fn draw_prompt_on_empty_deck_is_exhausted() {
        let (_dir, mut store) = setup();
        assert!(matches!(
            store.draw_prompt(),
            Err(CardError::DeckExhausted { kind: CardKind::Prompt, .. })
        ));
    }

    #[test]
    fn search_returns_prompts_then_fills() {
        let (_dir, mut store) = setup();
        add(&mut store, CardKind::Fill, "A Dare");
        add(&mut store, CardKind::Prompt, "I dare you to :blank:.");
        add(&mut store, CardKind::Fill, "gravity");

        let found = store.search("DARE").unwrap();
        let ids: Vec<String> = found.iter().map(|c| c.id_string()).collect();
        assert_eq!(ids, vec!["P1", "F1"]);
        assert!(store.search("zebra").unwrap().is_empty());
    }

    #[test]
    fn status_groups_by_author_id() {
        let (_dir, mut store) = setup();
        add(&mut store, CardKind::Prompt, "p1");
        add(&mut store, CardKind::Fill, "f1");
        store
            .save(&Card::new(CardKind::Fill, "f2", Author::new("U2", "bob")))
            .unwrap();

        let status = store.status().unwrap();
        assert_eq!(status.prompt_count, 1);
        assert_eq!(status.fill_count, 2);
        assert_eq!(
            status.per_author,
            vec![
                AuthorTally {
                    author_id: "U1".into(),
                    name: "alice".into(),
                    prompts: 1,
                    fills: 1
                },
                AuthorTally {
                    author_id: "U2".into(),
                    name: "bob".into(),
                    prompts: 0,
                    fills: 1
                },
            ]
        );
    }

    #[test]
    fn count_conversion_rejects_negative_counts() {
        let (_dir, store) = setup();
        let err = store
            .conn
            .query_row("SELECT -1", [], |row| count_from_row(row, 0))
            .unwrap_err();
        assert!(matches!(err, rusqlite::Error::FromSqlConversionFailure(0, _, _)));

        let ok = store
            .conn
            .query_row("SELECT 3", [], |row| count_from_row(row, 0))
            .unwrap();
        assert_eq!(ok, 3);
    }

    #[test]
    fn config_upsert_and_set_once() {
        let (_dir, mut store) = setup();
        assert_eq!(store.get_config("token").unwrap(), None);
        assert_eq!(store.set_config_if_absent("token", "tok1").unwrap(), "tok1");
        assert_eq!(store.set_config_if_absent("token", "tok2").unwrap(), "tok1");
        store.set_config("token", "tok3").unwrap();
        assert_eq!(store.get_config("token").unwrap().as_deref(), Some("tok3"));
    }

    #[test]
    fn concurrent_duplicate_saves_admit_exactly_one() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("race-cards.db");
        SqliteStore::open(&path).unwrap();

        let threads = 8;
        let barrier = Arc::new(Barrier::new(threads));
        let handles: Vec<_> = (0..threads)
            .map(|i| {
                let path = path.clone();
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    let mut store = SqliteStore::open(&path).unwrap();
                    barrier.wait();
                    let text = if i % 2 == 0 { "Same Card" } else { "same card" };
                    store.save(&Card::new(CardKind::Fill, text, Author::new("U1", "a")))
                })
            })
            .collect();

        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        let ok = results.iter().filter(|r| r.is_ok()).count();
        assert_eq!(ok, 1);
        assert!(results
            .iter()
            .filter_map(|r| r.as_ref().err())
            .all(|e| matches!(e, CardError::DuplicateCard { .. })));

        let store = SqliteStore::open(&path).unwrap();
        assert_eq!(store.status().unwrap().fill_count, 1);
    }
}
