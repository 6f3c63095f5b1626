use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::store::DeckStore;

pub fn run<S: DeckStore>(store: &S, term: &str) -> Result<CmdResult> {
    let term = term.trim();
    let found = store.search(term)?;

    let mut result = CmdResult::default();
    result.add_message(CmdMessage::info(match found.len() {
        0 => format!("No cards match \"{term}\"."),
        1 => format!("1 card matches \"{term}\":"),
        n => format!("{n} cards match \"{term}\":"),
    }));
    Ok(result.with_listed_cards(found))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::fixtures::StoreFixture;

    #[test]
    fn lists_prompts_before_fills() {
        let store = StoreFixture::new()
            .with_fill("a DARE")
            .with_prompt("Truth or :blank:? Dare.")
            .with_fill("gravity")
            .store;

        let result = run(&store, "dare").unwrap();
        let ids: Vec<String> = result.listed_cards.iter().map(|c| c.id_string()).collect();
        assert_eq!(ids, vec!["P1", "F1"]);
        assert_eq!(result.messages[0].content, "2 cards match \"dare\":");
    }

    #[test]
    fn no_match_is_not_an_error() {
        let store = StoreFixture::new().with_fill("gravity").store;
        let result = run(&store, "zebra").unwrap();
        assert!(result.listed_cards.is_empty());
        assert_eq!(result.messages[0].content, "No cards match \"zebra\".");
    }
}
