//! Reply envelope handed back to the chat transport.
use crate::commands::Round;
use crate::error::CardError;
use serde::Serialize;

/// Who sees the reply: the whole channel, or only whoever sent the command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    InChannel,
    Ephemeral,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Attachment {
    pub text: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Reply {
    pub response_type: Visibility,
    pub text: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<Attachment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw: Option<Round>,
}

impl Reply {
    pub fn in_channel(text: impl Into<String>) -> Self {
        Self {
            response_type: Visibility::InChannel,
            text: text.into(),
            attachments: Vec::new(),
            raw: None,
        }
    }

    pub fn ephemeral(text: impl Into<String>) -> Self {
        Self {
            response_type: Visibility::Ephemeral,
            text: text.into(),
            attachments: Vec::new(),
            raw: None,
        }
    }

    pub fn with_attachment(mut self, text: impl Into<String>) -> Self {
        self.attachments.push(Attachment { text: text.into() });
        self
    }

    pub fn with_raw(mut self, round: Round) -> Self {
        self.raw = Some(round);
        self
    }

    /// Errors are only ever shown to the requester. Anything outside the
    /// deck's own rules is flagged as unexpected.
    pub fn from_error(err: &CardError) -> Self {
        if err.is_expected() {
            Self::ephemeral(err.to_string())
        } else {
            Self::ephemeral(format!("Unexpected error! {err}"))
        }
    }

    pub fn is_ephemeral(&self) -> bool {
        self.response_type == Visibility::Ephemeral
    }

}
