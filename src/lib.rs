pub mod cli;
pub mod client;
pub mod errors;
pub mod resolve;
pub mod session;
