//! Turn the `--vault-id` argument into a password.
//!
//! A purely numeric argument is an object id and is fetched directly. Any
//! other argument is a search needle: every search hit whose `host` or
//! `username` equals the needle is fetched, and the last one in response
//! order wins.

use zeroize::Zeroizing;

use crate::client::VaultApi;
use crate::errors::Result;

/// What the user asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupQuery {
    NumericId(u64),
    SearchNeedle(String),
}

impl LookupQuery {
    /// Classify `input`. Only a string made entirely of ASCII digits
    /// (no sign, whitespace, or fraction) counts as an id.
    pub fn parse(input: &str) -> Self {
        let all_digits = !input.is_empty() && input.bytes().all(|b| b.is_ascii_digit());
        match all_digits.then(|| input.parse::<u64>().ok()).flatten() {
            Some(id) => Self::NumericId(id),
            None => Self::SearchNeedle(input.to_owned()),
        }
    }
}

/// Outcome of a lookup.
#[derive(Debug)]
pub enum LookupResult {
    Secret(Zeroizing<String>),
    NotFound,
}

impl LookupResult {
    fn from_password(password: Option<Zeroizing<String>>) -> Self {
        match password {
            Some(secret) if !secret.is_empty() => Self::Secret(secret),
            _ => Self::NotFound,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, Self::Secret(_))
    }
}

/// Resolve `input` against the vault.
///
/// A numeric id that does not exist yields `NotFound`; it is never retried
/// as a search needle.
pub fn resolve(input: &str, api: &impl VaultApi) -> Result<LookupResult> {
    match LookupQuery::parse(input) {
        LookupQuery::NumericId(id) => {
            tracing::debug!(id, "looking up object by id");
            api.get_password(id).map(LookupResult::from_password)
        }
        LookupQuery::SearchNeedle(needle) => search_last_match(&needle, api),
    }
}

fn search_last_match(needle: &str, api: &impl VaultApi) -> Result<LookupResult> {
    let mut best: Option<Zeroizing<String>> = None;

    for record in api.search(needle)? {
        if record.host() != Some(needle) && record.username() != Some(needle) {
            continue;
        }
        tracing::info!(
            "Found match for \"{}\" (Object-ID {} in Vault-ID {})",
            needle,
            record.id,
            record.group_id
        );
        // Last match wins, even when it has no password.
        best = api.get_password(record.id)?;
    }

    Ok(LookupResult::from_password(best))
}
