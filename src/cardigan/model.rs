use crate::error::{CardError, Result};
use crate::index::CardId;
use crate::text::BLANK;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The two card collections a deck holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardKind {
    Prompt,
    Fill,
}

impl CardKind {
    pub const ALL: [CardKind; 2] = [CardKind::Prompt, CardKind::Fill];

    pub const fn table(self) -> &'static str {
        match self {
            CardKind::Prompt => "prompt_cards",
            CardKind::Fill => "fill_cards",
        }
    }

    pub const fn prefix(self) -> char {
        match self {
            CardKind::Prompt => 'P',
            CardKind::Fill => 'F',
        }
    }

    /// Emoji used when echoing a card of this kind back to the channel.
    pub const fn marker(self) -> &'static str {
        match self {
            CardKind::Prompt => ":black_square:",
            CardKind::Fill => ":white_square:",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            CardKind::Prompt => "prompt",
            CardKind::Fill => "fill",
        }
    }

    pub fn from_prefix(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'P' => Some(CardKind::Prompt),
            'F' => Some(CardKind::Fill),
            _ => None,
        }
    }
}

impl fmt::Display for CardKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Whoever submitted a card. Identity comes from the transport and is opaque here.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Author {
    pub id: String,
    pub name: String,
}

impl Author {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// A card with blanks to be filled in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptCard {
    pub id: Option<i64>,
    pub text: String,
    pub author: Author,
    pub created_at: DateTime<Utc>,
}

impl PromptCard {
    pub const KIND: CardKind = CardKind::Prompt;

    pub fn new(text: impl Into<String>, author: Author) -> Self {
        Self {
            id: None,
            text: text.into(),
            author,
            created_at: Utc::now(),
        }
    }

    /// Number of fills this prompt consumes. A prompt without an explicit
    /// blank still takes one fill, appended at the end.
    pub fn pick_count(&self) -> usize {
        self.text.matches(BLANK).count().max(1)
    }

    /// Extra cards a client may pre-draw to give players a choice.
    pub fn draw_count(&self) -> usize {
        let pick = self.pick_count();
        if pick >= 3 {
            pick - 1
        } else {
            0
        }
    }

    pub fn card_id(&self) -> Option<CardId> {
        self.id.map(|n| CardId::new(Self::KIND, n))
    }
}

/// A card that goes into a prompt's blank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FillCard {
    pub id: Option<i64>,
    pub text: String,
    pub author: Author,
    pub created_at: DateTime<Utc>,
}

impl FillCard {
    pub const KIND: CardKind = CardKind::Fill;

    pub fn new(text: impl Into<String>, author: Author) -> Self {
        Self {
            id: None,
            text: text.into(),
            author,
            created_at: Utc::now(),
        }
    }

    pub fn card_id(&self) -> Option<CardId> {
        self.id.map(|n| CardId::new(Self::KIND, n))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Card {
    Prompt(PromptCard),
    Fill(FillCard),
}

impl Card {
    pub fn new(kind: CardKind, text: impl Into<String>, author: Author) -> Self {
        match kind {
            CardKind::Prompt => Card::Prompt(PromptCard::new(text, author)),
            CardKind::Fill => Card::Fill(FillCard::new(text, author)),
        }
    }

    pub fn kind(&self) -> CardKind {
        match self {
            Card::Prompt(_) => CardKind::Prompt,
            Card::Fill(_) => CardKind::Fill,
        }
    }

    pub fn id(&self) -> Option<i64> {
        match self {
            Card::Prompt(c) => c.id,
            Card::Fill(c) => c.id,
        }
    }

    pub fn set_id(&mut self, id: i64) {
        match self {
            Card::Prompt(c) => c.id = Some(id),
            Card::Fill(c) => c.id = Some(id),
        }
    }

    pub fn text(&self) -> &str {
        match self {
            Card::Prompt(c) => &c.text,
            Card::Fill(c) => &c.text,
        }
    }

    pub fn set_text(&mut self, text: String) {
        match self {
            Card::Prompt(c) => c.text = text,
            Card::Fill(c) => c.text = text,
        }
    }

    pub fn author(&self) -> &Author {
        match self {
            Card::Prompt(c) => &c.author,
            Card::Fill(c) => &c.author,
        }
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        match self {
            Card::Prompt(c) => c.created_at,
            Card::Fill(c) => c.created_at,
        }
    }

    /// Kind-prefixed id (`P7`, `F3`), or `None` before the card is saved.
    pub fn card_id(&self) -> Option<CardId> {
        self.id().map(|n| CardId::new(self.kind(), n))
    }

    /// Unwraps a prompt card; anything else is reported as the wrong kind of id.
    pub fn into_prompt(self) -> Result<PromptCard> {
        match self {
            Card::Prompt(card) => Ok(card),
            other => Err(CardError::InvalidId(format!(
                "{} is not a prompt card",
                other.id_string()
            ))),
        }
    }

    pub fn into_fill(self) -> Result<FillCard> {
        match self {
            Card::Fill(card) => Ok(card),
            other => Err(CardError::InvalidId(format!(
                "{} is not a fill card",
                other.id_string()
            ))),
        }
    }

    /// Same as [`Card::card_id`] but rendered, with `?` for unsaved cards.
    pub fn id_string(&self) -> String {
        self.card_id()
            .map(|id| id.to_string())
            .unwrap_or_else(|| format!("{}?", self.kind().prefix()))
    }
}
