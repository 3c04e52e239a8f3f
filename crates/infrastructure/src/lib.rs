//! Ferrous Dig Infrastructure Layer
//!
//! Wire codec, transport and lookup engine for the dig client. Everything
//! network-facing lives here; `ferrous-dig-domain` holds the value types.
pub mod dns;
