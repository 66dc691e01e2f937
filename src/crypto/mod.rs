//! Encryption of the shared value store.
//!
//! This module provides:
//! - The external cipher seam and its GnuPG implementation (`cipher`)
//! - The plaintext/ciphertext lifecycle around it (`gate`)

pub mod cipher;
pub mod gate;

pub use cipher::{Cipher, GpgCipher};
pub use gate::{ArtifactState, CryptoGate, PassphraseSource};
