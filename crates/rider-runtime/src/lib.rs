#![forbid(unsafe_code)]

//! Rider runtime: validation modes and the caller-owned evidence ledger.
//!
//! ## Module layout
//!
//! | Module     | Contents                                   |
//! |------------|--------------------------------------------|
//! | `mode`     | [`RuntimeMode`] enum (Strict / Hardened)   |
//! | `evidence` | [`EvidenceLedger`] sequenced resolution log |

pub mod evidence;
pub mod mode;

pub use evidence::{EvidenceLedger, Sequenced};
pub use mode::RuntimeMode;
