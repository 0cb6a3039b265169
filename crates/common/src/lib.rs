//! Common types, payload definitions, and errors shared across multipass crates.

pub mod error;
pub mod protocol;
pub mod secret;

pub use error::MultipassError;
pub use protocol::{CustomerData, Payload};
pub use secret::SharedSecret;
