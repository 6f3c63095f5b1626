use crate::index::CardId;
use crate::model::CardKind;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CardError {
    #[error("Bad deck name: {0:?} (letters and digits only)")]
    InvalidDeckId(String),

    #[error("Not enough {kind} cards! Wanted {wanted}, only {available} available.")]
    DeckExhausted {
        kind: CardKind,
        wanted: usize,
        available: usize,
    },

    #[error("That card already exists as {id}.")]
    DuplicateCard { id: CardId },

    #[error("Invalid card id: {0}")]
    InvalidId(String),

    #[error("No such card: {0}")]
    NotFound(CardId),

    #[error("A new card needs some text.")]
    EmptyCard,

    #[error("Edit needs a card id and some new text.")]
    EmptyEdit,

    #[error("Card {0} already says that.")]
    NoOpEdit(CardId),

    #[error("Database error: {0}")]
    Sql(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(String),
}

impl CardError {
    /// True for errors that belong to the deck's own rules, as opposed to
    /// storage or environment failures.
    pub fn is_expected(&self) -> bool {
        matches!(
            self,
            CardError::InvalidDeckId(_)
                | CardError::DeckExhausted { .. }
                | CardError::DuplicateCard { .. }
                | CardError::InvalidId(_)
                | CardError::NotFound(_)
                | CardError::EmptyCard
                | CardError::EmptyEdit
                | CardError::NoOpEdit(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, CardError>;
