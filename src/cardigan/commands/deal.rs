use crate::commands::{CmdResult, Round};
use crate::error::Result;
use crate::index::CardId;
use crate::model::{CardKind, FillCard};
use crate::store::DeckStore;

/// Deals a round from specific cards.
///
/// A leading prompt id picks the prompt; otherwise a random one is drawn. All
/// remaining ids must name fill cards. Every id is resolved before anything
/// random happens, so a bad id fails the whole deal. Missing fills are topped
/// up at random, never repeating a dealt card.
pub fn run<S: DeckStore>(store: &mut S, ids: &[CardId]) -> Result<CmdResult> {
    let (prompt, fill_ids) = match ids.split_first() {
        Some((first, rest)) if first.kind == CardKind::Prompt => {
            (Some(store.get(*first)?.into_prompt()?), rest)
        }
        _ => (None, ids),
    };

    let mut fills: Vec<FillCard> = fill_ids
        .iter()
        .map(|id| store.get(*id)?.into_fill())
        .collect::<Result<_>>()?;

    let prompt = match prompt {
        Some(prompt) => prompt,
        None => store.draw_prompt()?,
    };

    let missing = prompt.pick_count().saturating_sub(fills.len());
    if missing > 0 {
        let dealt: Vec<i64> = fills.iter().filter_map(|f| f.id).collect();
        fills.extend(store.draw_fills_excluding(missing, &dealt)?);
    }

    Ok(CmdResult::default().with_round(Round::new(prompt, fills)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CardError;
    use crate::index::parse_id_or_range;
    use crate::store::memory::fixtures::StoreFixture;

    fn ids(s: &str) -> Vec<CardId> {
        s.split_whitespace()
            .flat_map(|t| parse_id_or_range(t).unwrap())
            .collect()
    }

    fn deck() -> StoreFixture {
        StoreFixture::new()
            .with_prompt("Why did :blank: cross the road?")
            .with_prompt(":blank: beats :blank:.")
            .with_fill("the chicken")
            .with_fill("gravity")
            .with_fill("a dare")
    }

    #[test]
    fn deals_exact_cards() {
        let mut store = deck().store;
        let round = run(&mut store, &ids("P2 F3 F1")).unwrap().round.unwrap();
        assert_eq!(round.text, "*A dare* beats *the chicken*.");
    }

    #[test]
    fn tops_up_missing_fills_without_repeats() {
        let mut store = deck().store;
        for _ in 0..10 {
            let round = run(&mut store, &ids("P2 F2")).unwrap().round.unwrap();
            assert_eq!(round.fills.len(), 2);
            assert_eq!(round.fills[0].text, "gravity");
            assert_ne!(round.fills[1].id, Some(2));
        }
    }

    #[test]
    fn fills_only_draws_random_prompt() {
        let mut store = deck().store;
        let round = run(&mut store, &ids("F1")).unwrap().round.unwrap();
        assert_eq!(round.fills[0].text, "the chicken");
        assert_eq!(round.fills.len(), round.prompt.pick_count().max(1));
    }

    #[test]
    fn empty_list_behaves_like_draw() {
        let mut store = deck().store;
        let round = run(&mut store, &[]).unwrap().round.unwrap();
        assert_eq!(round.fills.len(), round.prompt.pick_count());
    }

    #[test]
    fn extra_fills_are_appended() {
        let mut store = deck().store;
        let round = run(&mut store, &ids("P1 F1 F2 F3")).unwrap().round.unwrap();
        assert_eq!(
            round.text,
            "Why did *the chicken* cross the road? gravity and a dare."
        );
    }

    #[test]
    fn unknown_fill_aborts() {
        let mut store = deck().store;
        assert!(matches!(
            run(&mut store, &ids("P1 F9")),
            Err(CardError::NotFound(_))
        ));
    }

    #[test]
    fn prompt_in_fill_position_is_invalid() {
        let mut store = deck().store;
        assert!(matches!(
            run(&mut store, &ids("F1 P2")),
            Err(CardError::InvalidId(_))
        ));
    }

    #[test]
    fn top_up_fails_when_deck_too_small() {
        let mut store = StoreFixture::new()
            .with_prompt(":blank: :blank: :blank:")
            .with_fill("only")
            .store;
        assert!(matches!(
            run(&mut store, &ids("P1 F1")),
            Err(CardError::DeckExhausted { .. })
        ));
    }
}
