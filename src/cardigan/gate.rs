//! Read-only / read-write decision for a request.
//!
//! A deck remembers a single access token in its config area. The first
//! request that presents a credential seeds it; after that, requests with the
//! same credential may add and edit cards, and everybody else may only draw,
//! deal, search and look at status. There is no rotation: only an explicit
//! `set_config` call can replace the token.
//!
//! The gate only reports the decision. Callers decide what to refuse.
use crate::error::Result;
use crate::store::DeckStore;
use serde::Serialize;
use tracing::{debug, info};

pub const TOKEN_KEY: &str = "token";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Access {
    ReadWrite,
    ReadOnly,
}

impl Access {
    pub fn can_write(self) -> bool {
        self == Access::ReadWrite
    }
}

pub fn check_access<S: DeckStore>(store: &mut S, credential: &str) -> Result<Access> {
    if credential.is_empty() {
        debug!("No credential presented; read-only");
        return Ok(Access::ReadOnly);
    }

    let token = store.set_config_if_absent(TOKEN_KEY, credential)?;
    if token == credential {
        Ok(Access::ReadWrite)
    } else {
        info!("Credential does not match deck token; read-only");
        Ok(Access::ReadOnly)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::InMemoryStore;

    #[test]
    fn first_credential_seeds_token() {
        let mut store = InMemoryStore::new();
        assert_eq!(check_access(&mut store, "tok1").unwrap(), Access::ReadWrite);
        assert_eq!(
            store.get_config(TOKEN_KEY).unwrap().as_deref(),
            Some("tok1")
        );
    }

    #[test]
    fn mismatch_is_read_only_and_does_not_overwrite() {
        let mut store = InMemoryStore::new();
        check_access(&mut store, "tok1").unwrap();
        assert_eq!(check_access(&mut store, "tok2").unwrap(), Access::ReadOnly);
        assert_eq!(check_access(&mut store, "tok1").unwrap(), Access::ReadWrite);
        assert_eq!(
            store.get_config(TOKEN_KEY).unwrap().as_deref(),
            Some("tok1")
        );
    }

    #[test]
    fn empty_credential_never_seeds() {
        let mut store = InMemoryStore::new();
        assert_eq!(check_access(&mut store, "").unwrap(), Access::ReadOnly);
        assert_eq!(store.get_config(TOKEN_KEY).unwrap(), None);
    }
}
