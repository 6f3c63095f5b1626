//! # Storage Layer
//!
//! A deck is one storage unit holding a prompt collection, a fill collection
//! and a small key-value config area. The [`DeckStore`] trait is the only way
//! the rest of the crate touches it.
//!
//! ## Implementations
//!
//! - [`sqlite::SqliteStore`]: production storage, one SQLite file per deck
//!   (`<data_dir>/<deck>-cards.db`).
//! - [`memory::InMemoryStore`]: no persistence, used by command tests.
//!
//! ## Rules every implementation keeps
//!
//! - Ids are assigned on first save, per kind, increasing, never reused.
//! - Two cards of the same kind never share text when compared
//!   case-insensitively. The check and the write happen atomically.
//! - Draws sample uniformly without replacement within one call.
//! - Nothing is ever deleted.

use crate::error::{CardError, Result};
use crate::index::CardId;
use crate::model::{Card, CardKind, FillCard, PromptCard};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;
use std::str::FromStr;

pub mod memory;
pub mod sqlite;

/// Per-author card counts, grouped by author id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthorTally {
    pub author_id: String,
    pub name: String,
    pub prompts: usize,
    pub fills: usize,
}

/// Report from the `status` operation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DeckStatus {
    pub prompt_count: usize,
    pub fill_count: usize,
    /// Sorted by author name, then author id.
    pub per_author: Vec<AuthorTally>,
}

impl DeckStatus {
    pub(crate) fn from_tallies(tallies: impl IntoIterator<Item = AuthorTally>) -> Self {
        let mut per_author: Vec<AuthorTally> = tallies.into_iter().collect();
        per_author.sort_by(|a, b| {
            a.name
                .to_lowercase()
                .cmp(&b.name.to_lowercase())
                .then_with(|| a.author_id.cmp(&b.author_id))
        });
        Self {
            prompt_count: per_author.iter().map(|t| t.prompts).sum(),
            fill_count: per_author.iter().map(|t| t.fills).sum(),
            per_author,
        }
    }
}

/// Abstract interface for deck storage.
pub trait DeckStore {
    /// Picks one prompt card uniformly at random.
    fn draw_prompt(&mut self) -> Result<PromptCard>;

    /// Picks `count` distinct fill cards, skipping the ids in `exclude`.
    fn draw_fills_excluding(&mut self, count: usize, exclude: &[i64]) -> Result<Vec<FillCard>>;

    /// Picks `count` distinct fill cards uniformly at random.
    fn draw_fills(&mut self, count: usize) -> Result<Vec<FillCard>> {
        self.draw_fills_excluding(count, &[])
    }

    /// Inserts a new card (no id) or updates an existing one in place. An
    /// update replaces only the text; author and creation time stay as stored.
    /// Fails with `DuplicateCard` if another card of the same kind already
    /// has the same text, ignoring case. Returns the card's id.
    fn save(&mut self, card: &Card) -> Result<i64>;

    /// Looks up a card by its typed id.
    fn get(&self, id: CardId) -> Result<Card>;

    /// Looks up a card by its rendered id (`P7`, `F3`).
    fn get_by_kind_id(&self, id: &str) -> Result<Card> {
        self.get(CardId::from_str(id)?)
    }

    /// Case-insensitive substring search. Prompts first, then fills, each in
    /// id order.
    fn search(&self, term: &str) -> Result<Vec<Card>>;

    fn status(&self) -> Result<DeckStatus>;

    fn get_config(&self, key: &str) -> Result<Option<String>>;

    /// Upserts a config value.
    fn set_config(&mut self, key: &str, value: &str) -> Result<()>;

    /// Stores `value` only if `key` has no value yet, atomically. Returns the
    /// value in effect afterwards.
    fn set_config_if_absent(&mut self, key: &str, value: &str) -> Result<String>;
}

/// Key the dedup rule compares on.
pub fn text_key(text: &str) -> String {
    text.to_lowercase()
}

/// Samples `count` distinct ids from `pool` without replacement.
pub(crate) fn sample_ids<R: Rng + ?Sized>(
    rng: &mut R,
    kind: CardKind,
    pool: &[i64],
    count: usize,
) -> Result<Vec<i64>> {
    if pool.len() < count {
        return Err(CardError::DeckExhausted {
            kind,
            wanted: count,
            available: pool.len(),
        });
    }
    Ok(pool.choose_multiple(rng, count).copied().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    #[test]
    fn sample_ids_never_repeats() {
        let mut rng = StdRng::seed_from_u64(7);
        let pool: Vec<i64> = (1..=10).collect();
        for count in 0..=10 {
            let picked = sample_ids(&mut rng, CardKind::Fill, &pool, count).unwrap();
            assert_eq!(picked.len(), count);
            let unique: HashSet<_> = picked.iter().collect();
            assert_eq!(unique.len(), count);
        }
    }

    #[test]
    fn sample_ids_fails_when_pool_too_small() {
        let mut rng = StdRng::seed_from_u64(7);
        let err = sample_ids(&mut rng, CardKind::Fill, &[1, 2], 3).unwrap_err();
        assert!(matches!(
            err,
            CardError::DeckExhausted {
                kind: CardKind::Fill,
                wanted: 3,
                available: 2
            }
        ));
    }

    #[test]
    fn status_sums_and_sorts_tallies() {
        let status = DeckStatus::from_tallies(vec![
            AuthorTally {
                author_id: "U2".into(),
                name: "zed".into(),
                prompts: 1,
                fills: 4,
            },
            AuthorTally {
                author_id: "U1".into(),
                name: "Alice".into(),
                prompts: 2,
                fills: 0,
            },
        ]);
        assert_eq!(status.prompt_count, 3);
        assert_eq!(status.fill_count, 4);
        assert_eq!(status.per_author[0].name, "Alice");
    }
}
