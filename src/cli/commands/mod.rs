//! Command implementations. `get` performs the lookup; `version` prints
//! the crate version.

pub mod get;
pub mod version;
