//! Token assembly and transport encoding.
//!
//! # Wire format
//!
//! ```text
//! offset 0        16             16+N           16+N+32
//!        |  IV    |  ciphertext  |  HMAC tag    |
//! ```
//!
//! `N` is a non-zero multiple of 16. The tag covers bytes `[0, 16+N)`. The
//! frame is encoded as URL-safe base64 (`-` and `_`); `=` padding is kept by
//! default and can be dropped via [`PaddingMode::Unpadded`]. The reader accepts
//! either.

pub mod builder;
pub mod encoder;
pub mod frame;
pub mod reader;

pub use builder::{build, TokenBuilder};
pub use encoder::{PaddingMode, Token};
pub use reader::TokenReader;
