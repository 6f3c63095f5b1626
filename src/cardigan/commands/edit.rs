use crate::commands::{CmdMessage, CmdResult};
use crate::error::{CardError, Result};
use crate::index::CardId;
use crate::store::DeckStore;
use crate::text::normalize_blanks;
use tracing::info;

/// Replaces a card's text, keeping its id and author.
pub fn run<S: DeckStore>(store: &mut S, id: CardId, raw_text: &str) -> Result<CmdResult> {
    let text = normalize_blanks(raw_text.trim());
    if text.is_empty() {
        return Err(CardError::EmptyEdit);
    }

    let mut card = store.get(id)?;
    if card.text() == text {
        return Err(CardError::NoOpEdit(id));
    }

    let previous = card.text().to_string();
    card.set_text(text);
    store.save(&card)?;
    info!(%id, from = %previous, to = %card.text(), "Edited card");

    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!(
        "Card {}: {} _{}_",
        id,
        id.kind.marker(),
        card.text()
    )));
    Ok(result.with_affected_cards(vec![card]))
}
