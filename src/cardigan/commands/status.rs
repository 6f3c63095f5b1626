use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::model::CardKind;
use crate::store::DeckStore;

pub fn run<S: DeckStore>(store: &S) -> Result<CmdResult> {
    let status = store.status()?;

    let mut result = CmdResult::default();
    result.add_message(CmdMessage::info(format!(
        "Cards: {} {}, {} {}",
        CardKind::Fill.marker(),
        status.fill_count,
        CardKind::Prompt.marker(),
        status.prompt_count
    )));
    Ok(result.with_status(status))
}
