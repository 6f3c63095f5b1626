use crate::commands::{CmdMessage, CmdResult};
use crate::error::{CardError, Result};
use crate::model::{Author, Card, CardKind};
use crate::store::DeckStore;
use crate::text::normalize_blanks;
use tracing::info;

/// Adds a new card after normalizing its blanks.
pub fn run<S: DeckStore>(
    store: &mut S,
    kind: CardKind,
    author: Author,
    raw_text: &str,
) -> Result<CmdResult> {
    let text = normalize_blanks(raw_text.trim());
    if text.is_empty() {
        return Err(CardError::EmptyCard);
    }

    let mut card = Card::new(kind, text, author);
    let id = store.save(&card)?;
    card.set_id(id);
    info!(id = %card.id_string(), author = %card.author().name, "Added card");

    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!(
        "New card: {} {} _{}_",
        kind.marker(),
        card.id_string(),
        card.text()
    )));
    Ok(result.with_affected_cards(vec![card]))
}
