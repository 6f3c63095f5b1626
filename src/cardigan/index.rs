//! Kind-prefixed card ids.
//!
//! Every card is addressed as its kind prefix followed by the store-assigned
//! number: `P7` is prompt card 7, `F3` is fill card 3. The numbers come from
//! separate sequences per kind, so `P1` and `F1` are different cards. Ids never
//! change once assigned.
//!
//! Lists of ids may use ranges (`F2-F4`), which expand to every id in between.
use crate::error::{CardError, Result};
use crate::model::CardKind;
use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CardId {
    pub kind: CardKind,
    pub number: i64,
}

impl CardId {
    pub fn new(kind: CardKind, number: i64) -> Self {
        Self { kind, number }
    }
}

impl fmt::Display for CardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.kind.prefix(), self.number)
    }
}

impl Serialize for CardId {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl FromStr for CardId {
    type Err = CardError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || CardError::InvalidId(s.to_string());

        let mut chars = s.chars();
        let kind = chars
            .next()
            .and_then(CardKind::from_prefix)
            .ok_or_else(invalid)?;
        let digits = chars.as_str();
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        let number = digits.parse::<i64>().map_err(|_| invalid())?;
        Ok(CardId::new(kind, number))
    }
}

const MAX_RANGE_LEN: i64 = 100;

/// Parses one id or an inclusive range of ids of the same kind.
pub fn parse_id_or_range(s: &str) -> Result<Vec<CardId>> {
    let Some((start, end)) = s.split_once('-') else {
        return Ok(vec![s.parse()?]);
    };

    let start: CardId = start.parse()?;
    let end: CardId = end.parse()?;
    if start.kind != end.kind {
        return Err(CardError::InvalidId(format!(
            "{s} (cannot mix {} and {} cards in a range)",
            start.kind, end.kind
        )));
    }
    if start.number > end.number {
        return Err(CardError::InvalidId(format!(
            "{s} (start must be <= end)"
        )));
    }
    if end.number - start.number >= MAX_RANGE_LEN {
        return Err(CardError::InvalidId(format!(
            "{s} (ranges cover at most {MAX_RANGE_LEN} cards)"
        )));
    }
    Ok((start.number..=end.number)
        .map(|n| CardId::new(start.kind, n))
        .collect())
}
