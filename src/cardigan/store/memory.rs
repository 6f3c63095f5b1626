use super::{sample_ids, text_key, AuthorTally, DeckStatus, DeckStore};
use crate::error::{CardError, Result};
use crate::index::CardId;
use crate::model::{Card, CardKind, FillCard, PromptCard};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::{BTreeMap, HashMap};

/// In-memory storage for testing and development.
/// Does NOT persist data.
pub struct InMemoryStore {
    cards: BTreeMap<CardId, Card>,
    next_ids: HashMap<CardKind, i64>,
    config: HashMap<String, String>,
    rng: StdRng,
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self {
            cards: BTreeMap::new(),
            next_ids: HashMap::new(),
            config: HashMap::new(),
            rng: StdRng::from_entropy(),
        }
    }
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    fn ids_of(&self, kind: CardKind, exclude: &[i64]) -> Vec<i64> {
        self.cards
            .keys()
            .filter(|id| id.kind == kind && !exclude.contains(&id.number))
            .map(|id| id.number)
            .collect()
    }
}

impl DeckStore for InMemoryStore {
    fn draw_prompt(&mut self) -> Result<PromptCard> {
        let pool = self.ids_of(CardKind::Prompt, &[]);
        let picked = sample_ids(&mut self.rng, CardKind::Prompt, &pool, 1)?;
        self.get(CardId::new(CardKind::Prompt, picked[0]))?
            .into_prompt()
    }

    fn draw_fills_excluding(&mut self, count: usize, exclude: &[i64]) -> Result<Vec<FillCard>> {
        let pool = self.ids_of(CardKind::Fill, exclude);
        let picked = sample_ids(&mut self.rng, CardKind::Fill, &pool, count)?;
        picked
            .into_iter()
            .map(|n| self.get(CardId::new(CardKind::Fill, n))?.into_fill())
            .collect()
    }

    fn save(&mut self, card: &Card) -> Result<i64> {
        let kind = card.kind();
        let key = text_key(card.text());

        if let Some(existing) = self
            .cards
            .values()
            .find(|c| c.kind() == kind && text_key(c.text()) == key)
        {
            if existing.id() != card.id() {
                return Err(CardError::DuplicateCard {
                    id: existing
                        .card_id()
                        .ok_or_else(|| CardError::InvalidId(existing.id_string()))?,
                });
            }
        }

        let id = match card.id() {
            Some(n) => {
                let slot = self
                    .cards
                    .get_mut(&CardId::new(kind, n))
                    .ok_or(CardError::NotFound(CardId::new(kind, n)))?;
                slot.set_text(card.text().to_string());
                n
            }
            None => {
                let next = self.next_ids.entry(kind).or_insert(0);
                *next += 1;
                let n = *next;
                let mut stored = card.clone();
                stored.set_id(n);
                self.cards.insert(CardId::new(kind, n), stored);
                n
            }
        };
        Ok(id)
    }

    fn get(&self, id: CardId) -> Result<Card> {
        self.cards.get(&id).cloned().ok_or(CardError::NotFound(id))
    }

    fn search(&self, term: &str) -> Result<Vec<Card>> {
        let needle = text_key(term);
        Ok(self
            .cards
            .values()
            .filter(|c| text_key(c.text()).contains(&needle))
            .cloned()
            .collect())
    }

    fn status(&self) -> Result<DeckStatus> {
        let mut tallies: BTreeMap<String, AuthorTally> = BTreeMap::new();
        for card in self.cards.values() {
            let author = card.author();
            let tally = tallies
                .entry(author.id.clone())
                .or_insert_with(|| AuthorTally {
                    author_id: author.id.clone(),
                    name: author.name.clone(),
                    prompts: 0,
                    fills: 0,
                });
            match card.kind() {
                CardKind::Prompt => tally.prompts += 1,
                CardKind::Fill => tally.fills += 1,
            }
        }
        Ok(DeckStatus::from_tallies(tallies.into_values()))
    }

    fn get_config(&self, key: &str) -> Result<Option<String>> {
        Ok(self.config.get(key).cloned())
    }

    fn set_config(&mut self, key: &str, value: &str) -> Result<()> {
        self.config.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn set_config_if_absent(&mut self, key: &str, value: &str) -> Result<String> {
        Ok(self
            .config
            .entry(key.to_string())
            .or_insert_with(|| value.to_string())
            .clone())
    }
}

// --- Test Fixtures ---

#[cfg(any(test, feature = "test_utils"))]
pub mod fixtures {
    use super::*;
    use crate::model::Author;

    pub struct StoreFixture {
        pub store: InMemoryStore,
        author: Author,
    }

    impl Default for StoreFixture {
        fn default() -> Self {
            Self::new()
        }
    }

    impl StoreFixture {
        pub fn new() -> Self {
            Self {
                store: InMemoryStore::new().with_seed(42),
                author: Author::new("U0", "fixture"),
            }
        }

        pub fn by(mut self, id: &str, name: &str) -> Self {
            self.author = Author::new(id, name);
            self
        }

        pub fn with_prompt(mut self, text: &str) -> Self {
            let card = Card::new(CardKind::Prompt, text, self.author.clone());
            self.store.save(&card).unwrap();
            self
        }

        pub fn with_fill(mut self, text: &str) -> Self {
            let card = Card::new(CardKind::Fill, text, self.author.clone());
            self.store.save(&card).unwrap();
            self
        }

        pub fn with_fills(mut self, count: usize) -> Self {
            for i in 0..count {
                self = self.with_fill(&format!("Fill {}", i + 1));
            }
            self
        }
    }
}
