//! Multipass single sign-on tokens.
//!
//! A token carries an opaque payload (usually customer JSON) encrypted with
//! AES-128-CBC and authenticated with HMAC-SHA256, both keyed from one shared
//! secret, and encoded as URL-safe base64.
//!
//! ```no_run
//! use common::{CustomerData, Payload, SharedSecret};
//!
//! let secret = SharedSecret::new("hard-to-guess-multipass-secret");
//! let customer = CustomerData::new("a@example.com", "2015-07-24T12:36:40-0400");
//! let token = multipass::build(&secret, &Payload::from_json(&customer)?)?;
//! println!("https://store.example.com/account/login/multipass/{token}");
//! # Ok::<(), common::MultipassError>(())
//! ```

pub mod config;
pub mod crypto;
pub mod telemetry;
pub mod token;

pub use token::{build, PaddingMode, Token, TokenBuilder, TokenReader};
