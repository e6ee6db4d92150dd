use std::path::PathBuf;
use thiserror::Error;

/// All errors that can occur while fetching a password from StoredSafe.
///
/// A lookup that simply finds nothing is not an error; see
/// [`crate::resolve::LookupResult::NotFound`].
#[derive(Debug, Error)]
pub enum VaultClientError {
    // --- Session file errors ---
    #[error("Can not open \"{}\".", .0.display())]
    ConfigMissing(PathBuf),

    #[error("Could not find a valid token in \"{}\"", .0.display())]
    TokenNotFound(PathBuf),

    #[error("Could not find a valid server in \"{}\"", .0.display())]
    ServerNotFound(PathBuf),

    #[error("No valid token found in \"{}\". Have you logged in?", .0.display())]
    InvalidToken(PathBuf),

    #[error("No valid server specified in \"{}\". Have you logged in?", .0.display())]
    InvalidServer(PathBuf),

    // --- Remote service errors ---
    #[error("Can not reach \"{url}\"")]
    Unreachable {
        url: String,
        #[source]
        source: ureq::Error,
    },

    #[error("Not logged in to StoredSafe.")]
    NotAuthenticated,

    #[error("Session not authenticated with server. Token invalid?")]
    SessionInvalid,

    #[error("Request to \"{url}\" failed with HTTP status {status}")]
    RequestFailed { url: String, status: u16 },

    // --- IO errors ---
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for StoredSafe client results.
pub type Result<T> = std::result::Result<T, VaultClientError>;
