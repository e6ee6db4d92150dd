//! `--version` — display the client version.

/// Version line printed for `--version`.
pub fn version_line() -> String {
    format!("storedsafe-vault-client {}", env!("CARGO_PKG_VERSION"))
}

/// Execute the `--version` command.
pub fn execute() {
    println!("{}", version_line());
}
