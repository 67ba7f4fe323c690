//! Audio primitives: mu-law decoding, energy measurement, WAV encoding.
//!
//! Everything here is pure and stateless; the session layer owns all state.

pub mod energy;
pub mod mulaw;
pub mod wav;

pub use energy::rms;
pub use mulaw::{decode, decode_sample};
pub use wav::encode_wav;
