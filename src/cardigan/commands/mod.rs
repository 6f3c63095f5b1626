use crate::model::{Card, FillCard, PromptCard};
use crate::store::DeckStatus;
use serde::ser::{Serialize, SerializeStruct, Serializer};

pub mod add;
pub mod deal;
pub mod draw;
pub mod edit;
pub mod search;
pub mod status;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageLevel {
    Info,
    Success,
}

#[derive(Debug, Clone)]
pub struct CmdMessage {
    pub level: MessageLevel,
    pub content: String,
}

impl CmdMessage {
    pub fn info(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Info,
            content: content.into(),
        }
    }

    pub fn success(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Success,
            content: content.into(),
        }
    }
}

/// A drawn or dealt round: the prompt, the fills in blank order, and the
/// rendered phrase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Round {
    pub prompt: PromptCard,
    pub fills: Vec<FillCard>,
    pub text: String,
}

impl Round {
    pub fn new(prompt: PromptCard, fills: Vec<FillCard>) -> Self {
        let text = crate::text::render(&prompt, &fills);
        Self {
            prompt,
            fills,
            text,
        }
    }
}

// Clients only need the card text, ids and the pick/draw hints, not authors.
impl Serialize for Round {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(serde::Serialize)]
        struct PromptView<'a> {
            text: &'a str,
            pick: usize,
            draw: usize,
            card_id: Option<String>,
        }

        #[derive(serde::Serialize)]
        struct FillView<'a> {
            text: &'a str,
            card_id: Option<String>,
        }

        let prompt = PromptView {
            text: &self.prompt.text,
            pick: self.prompt.pick_count(),
            draw: self.prompt.draw_count(),
            card_id: self.prompt.card_id().map(|id| id.to_string()),
        };
        let fills: Vec<FillView<'_>> = self
            .fills
            .iter()
            .map(|f| FillView {
                text: &f.text,
                card_id: f.card_id().map(|id| id.to_string()),
            })
            .collect();

        let mut state = serializer.serialize_struct("Round", 3)?;
        state.serialize_field("prompt", &prompt)?;
        state.serialize_field("fills", &fills)?;
        state.serialize_field("text", &self.text)?;
        state.end()
    }
}

#[derive(Debug, Default)]
pub struct CmdResult {
    pub affected_cards: Vec<Card>,
    pub listed_cards: Vec<Card>,
    pub round: Option<Round>,
    pub status: Option<DeckStatus>,
    pub messages: Vec<CmdMessage>,
}

impl CmdResult {
    pub fn add_message(&mut self, message: CmdMessage) {
        self.messages.push(message);
    }

    pub fn with_affected_cards(mut self, cards: Vec<Card>) -> Self {
        self.affected_cards = cards;
        self
    }

    pub fn with_listed_cards(mut self, cards: Vec<Card>) -> Self {
        self.listed_cards = cards;
        self
    }

    pub fn with_round(mut self, round: Round) -> Self {
        self.round = Some(round);
        self
    }

    pub fn with_status(mut self, status: DeckStatus) -> Self {
        self.status = Some(status);
        self
    }
}
