//! `--vault-id` — check the session, resolve the id or needle, and print
//! the decrypted password.

use std::io::Write;
use std::path::Path;

use crate::cli::{output, RunConfig};
use crate::client::VaultClient;
use crate::errors::Result;
use crate::resolve::{resolve, LookupQuery, LookupResult};
use crate::session;

/// Execute a lookup using the session stored in `rc_path`.
///
/// Returns `Ok(true)` once the secret has been written to `out`, and
/// `Ok(false)` when the session was rejected or nothing was found (the
/// reason is already on stderr).
pub fn execute(config: &RunConfig, rc_path: &Path, out: &mut impl Write) -> Result<bool> {
    let session = session::load(rc_path)?;
    let client = VaultClient::new(&session);
    fetch(config, &client, out)
}

/// Check the session, reporting the reason for a failure on stderr.
///
/// Callers only branch on the result.
pub fn auth_check(client: &VaultClient) -> bool {
    match client.check_auth() {
        Ok(()) => true,
        Err(e) => {
            output::error(&e.to_string());
            false
        }
    }
}

/// Run the lookup against an already configured client.
pub fn fetch(config: &RunConfig, client: &VaultClient, out: &mut impl Write) -> Result<bool> {
    if !auth_check(client) {
        return Ok(false);
    }

    match resolve(&config.vault_id, client)? {
        LookupResult::Secret(secret) => {
            output::secret(out, &secret)?;
            Ok(true)
        }
        LookupResult::NotFound => {
            match LookupQuery::parse(&config.vault_id) {
                LookupQuery::NumericId(id) => output::warning(&format!(
                    "Could not find any credentials in Object-ID \"{id}\"."
                )),
                LookupQuery::SearchNeedle(needle) => output::warning(&format!(
                    "Could not find credentials matching the search string \"{needle}\"."
                )),
            }
            Ok(false)
        }
    }
}
