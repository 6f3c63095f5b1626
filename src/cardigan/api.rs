//! # API Facade
//!
//! The API layer is a **thin facade** over the command layer. It is the single
//! entry point for deck operations, whatever transport sits in front of it.
//!
//! The facade:
//! - **Dispatches** to the appropriate command function
//! - **Normalizes inputs** (rendered ids like `P7` or `F2-F4` become [`CardId`]s)
//! - **Returns structured types** (`Result<CmdResult>`)
//!
//! It holds no business logic and formats no replies; that is the job of
//! `commands/*.rs` and [`crate::dispatch`] respectively.
//!
//! `DeckApi<S: DeckStore>` is generic over the storage backend:
//! - Production: `DeckApi<SqliteStore>`, built by [`open_deck`]
//! - Testing: `DeckApi<InMemoryStore>`

use crate::commands;
use crate::config::StoreOptions;
use crate::error::Result;
use crate::gate::{self, Access};
use crate::index::{parse_id_or_range, CardId};
use crate::model::{Author, CardKind};
use crate::store::sqlite::SqliteStore;
use crate::store::DeckStore;
use std::str::FromStr;

/// The main API facade for one opened deck.
pub struct DeckApi<S: DeckStore> {
    store: S,
}

/// Opens (creating if needed) the deck named `deck_id`.
pub fn open_deck(options: &StoreOptions, deck_id: &str) -> Result<DeckApi<SqliteStore>> {
    let path = options.deck_path(deck_id)?;
    Ok(DeckApi::new(SqliteStore::open(path)?))
}

impl<S: DeckStore> DeckApi<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn draw_round(&mut self) -> Result<commands::CmdResult> {
        commands::draw::run(&mut self.store)
    }

    pub fn deal<I: AsRef<str>>(&mut self, ids: &[I]) -> Result<commands::CmdResult> {
        let ids = parse_ids(ids)?;
        commands::deal::run(&mut self.store, &ids)
    }

    pub fn add_card(
        &mut self,
        kind: CardKind,
        author: Author,
        raw_text: &str,
    ) -> Result<commands::CmdResult> {
        commands::add::run(&mut self.store, kind, author, raw_text)
    }

    pub fn edit_card(&mut self, id: &str, raw_text: &str) -> Result<commands::CmdResult> {
        let id = CardId::from_str(id)?;
        commands::edit::run(&mut self.store, id, raw_text)
    }

    pub fn search(&self, text: &str) -> Result<commands::CmdResult> {
        commands::search::run(&self.store, text)
    }

    pub fn status(&self) -> Result<commands::CmdResult> {
        commands::status::run(&self.store)
    }

    pub fn check_access(&mut self, credential: &str) -> Result<Access> {
        gate::check_access(&mut self.store, credential)
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

fn parse_ids<I: AsRef<str>>(inputs: &[I]) -> Result<Vec<CardId>> {
    let mut ids = Vec::with_capacity(inputs.len());
    for input in inputs {
        ids.extend(parse_id_or_range(input.as_ref())?);
    }
    Ok(ids)
}

pub use commands::{CmdMessage, CmdResult, MessageLevel, Round};
