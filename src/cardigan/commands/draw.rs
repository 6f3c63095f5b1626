use crate::commands::{CmdResult, Round};
use crate::error::Result;
use crate::store::DeckStore;
use tracing::debug;

/// Draws a random prompt and as many random fills as it has blanks.
pub fn run<S: DeckStore>(store: &mut S) -> Result<CmdResult> {
    let prompt = store.draw_prompt()?;
    let fills = store.draw_fills(prompt.pick_count())?;
    let round = Round::new(prompt, fills);
    debug!(text = %round.text, "Drew round");
    Ok(CmdResult::default().with_round(round))
}
