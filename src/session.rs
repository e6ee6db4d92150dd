//! Session state written by the StoredSafe login tool.
//!
//! The rc file is plain text. Two lines matter: `token:<value>` holds the
//! session token and `mysite:<value>` holds the server hostname. A value of
//! `none` means the user logged out (or never logged in). This module only
//! reads the file; it is never written here.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;
use zeroize::Zeroizing;

use crate::errors::{Result, VaultClientError};

/// File name of the rc file inside the user's home directory.
pub const RC_FILE_NAME: &str = ".storedsafe-client.rc";

/// Value the login tool writes after a logout.
const LOGGED_OUT: &str = "none";

/// Server host and auth token of an active StoredSafe session.
#[derive(Clone)]
pub struct SessionState {
    server_host: String,
    auth_token: Zeroizing<String>,
}

impl fmt::Debug for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionState")
            .field("server_host", &self.server_host)
            .field("auth_token", &"<redacted>")
            .finish()
    }
}

impl SessionState {
    /// Build a session directly, bypassing the rc file.
    pub fn new(server_host: impl Into<String>, auth_token: impl Into<String>) -> Self {
        Self {
            server_host: server_host.into(),
            auth_token: Zeroizing::new(auth_token.into()),
        }
    }

    pub fn server_host(&self) -> &str {
        &self.server_host
    }

    pub fn auth_token(&self) -> &str {
        &self.auth_token
    }
}

/// Path of the rc file: `~/.storedsafe-client.rc`.
///
/// Falls back to the current directory when no home directory is known.
pub fn default_rc_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(RC_FILE_NAME)
}

fn token_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"token:([a-zA-Z0-9]+)\r?$").expect("token pattern is valid"))
}

fn server_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"mysite:([a-zA-Z0-9.]+)\r?$").expect("server pattern is valid"))
}

/// Pull the captured value out of `line`, if it is well-formed.
fn capture<'a>(pattern: &Regex, line: &'a str) -> Option<&'a str> {
    pattern
        .captures(line)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Load the session state from the rc file at `path`.
///
/// Fails with `ConfigMissing` when the file is absent, `InvalidToken` /
/// `InvalidServer` when either value is `none`, and `TokenNotFound` /
/// `ServerNotFound` when no well-formed line was found.
pub fn load(path: &Path) -> Result<SessionState> {
    if !path.is_file() {
        return Err(VaultClientError::ConfigMissing(path.to_path_buf()));
    }

    let contents = Zeroizing::new(fs::read_to_string(path)?);

    let mut token: Option<&str> = None;
    let mut server: Option<&str> = None;

    for line in contents.lines() {
        if line.contains("token") {
            if let Some(value) = capture(token_pattern(), line) {
                if value == LOGGED_OUT {
                    return Err(VaultClientError::InvalidToken(path.to_path_buf()));
                }
                token = Some(value);
            }
        }
        if line.contains("mysite") {
            if let Some(value) = capture(server_pattern(), line) {
                if value == LOGGED_OUT {
                    return Err(VaultClientError::InvalidServer(path.to_path_buf()));
                }
                server = Some(value);
            }
        }
    }

    let token = token.ok_or_else(|| VaultClientError::TokenNotFound(path.to_path_buf()))?;
    let server = server.ok_or_else(|| VaultClientError::ServerNotFound(path.to_path_buf()))?;

    tracing::debug!(server, rc_file = %path.display(), "loaded session state");

    Ok(SessionState::new(server, token))
}
