//! # Sleeve
//!
//! Sleeve wallets embed a quantum-secure fallback in the generation of
//! standard curve-based wallets: the 24-word recovery phrase handed to the
//! user is a one-way commitment to a hidden WOTS+ public key. The standard
//! phrase transacts on sr25519 accounts today; after a migration, the quantum
//! phrase can prove ownership of the same account with the WOTS+ key.
//!
//! The crate provides the WOTS+ one-time signature engine, hardened-only
//! BIP32 derivation, the Sleeve composition itself, and the SS58 address and
//! multisig derivation used to materialize account identifiers.

pub mod address;
pub mod bip32;
pub mod error;
pub mod hasher;
pub mod sleeve;
pub mod wots;

pub use error::Error;
pub use sleeve::{GenSpec, Sleeve, WalletRecord};
