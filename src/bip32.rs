//! Hardened-only BIP32 derivation over the secp256k1 group order.
//!
//! Only hardened children are supported: every derivation folds the parent
//! private key into the HMAC, so no public-only derivation path exists for a
//! Sleeve wallet. Non-hardened indices are rejected outright.

use hmac::{Hmac, Mac};
use k256::elliptic_curve::{Field, PrimeField};
use k256::{FieldBytes, Scalar};
use sha2::Sha512;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::error::Error;

/// First hardened child index, the reserved top bit of the index space.
pub const FIRST_HARDENED_INDEX: u32 = 0x8000_0000;

/// Byte length of node keys and chain codes.
pub const KEY_SIZE: usize = 32;

const MIN_SEED_SIZE: usize = 16;
const MAX_SEED_SIZE: usize = 64;

// HMAC key fixed by BIP32 for master node derivation.
const MASTER_HMAC_KEY: &[u8] = b"Bitcoin seed";

/// A BIP32 node: private key scalar and chain code, both 32 bytes.
///
/// The key is guaranteed to be a scalar in `[1, N-1]`. Both halves are
/// zeroized on drop; the chain code keys every child derivation and is as
/// sensitive as the key itself under hardened-only use.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct Node {
    pub key: [u8; KEY_SIZE],
    pub code: [u8; KEY_SIZE],
}

impl Node {
    /// Derives the master node from a 16..=64 byte seed.
    ///
    /// The astronomically improbable case of the HMAC output falling outside
    /// `[1, N-1]` surfaces as [`Error::KeyOutOfRange`].
    pub fn master(seed: &[u8]) -> Result<Self, Error> {
        if seed.len() < MIN_SEED_SIZE || seed.len() > MAX_SEED_SIZE {
            return Err(Error::SeedSize(seed.len()));
        }
        let mut mac = Hmac::<Sha512>::new_from_slice(MASTER_HMAC_KEY)
            .expect("HMAC accepts keys of any length");
        mac.update(seed);
        let mut digest = Zeroizing::new([0u8; 64]);
        digest.copy_from_slice(&mac.finalize().into_bytes());

        let mut node = Node {
            key: [0u8; KEY_SIZE],
            code: [0u8; KEY_SIZE],
        };
        node.key.copy_from_slice(&digest[..KEY_SIZE]);
        node.code.copy_from_slice(&digest[KEY_SIZE..]);
        validate_private_key(&node.key)?;
        Ok(node)
    }

    /// Replaces this node with its hardened child at `index`.
    ///
    /// `index` must carry the hardened bit; soft derivation indices return
    /// [`Error::NonHardenedIndex`]. A child scalar of zero is an error so the
    /// caller can retry with a different index, though hitting one means the
    /// universe has been unreasonably patient.
    pub fn compute_hardened_child(&mut self, index: u32) -> Result<(), Error> {
        if index < FIRST_HARDENED_INDEX {
            return Err(Error::NonHardenedIndex(index));
        }

        let mut mac =
            Hmac::<Sha512>::new_from_slice(&self.code).expect("HMAC accepts keys of any length");
        mac.update(&[0u8]);
        mac.update(&self.key);
        mac.update(&index.to_be_bytes());
        let mut digest = Zeroizing::new([0u8; 64]);
        digest.copy_from_slice(&mac.finalize().into_bytes());

        // Left half must be a canonical scalar; zero is fine here, the sum
        // below is what has to stay non-zero.
        let il = Option::<Scalar>::from(Scalar::from_repr(FieldBytes::clone_from_slice(
            &digest[..KEY_SIZE],
        )))
        .ok_or(Error::KeyOutOfRange)?;
        let parent = validate_private_key(&self.key)?;

        let child = il + parent;
        if bool::from(child.is_zero()) {
            return Err(Error::KeyOutOfRange);
        }

        self.key = child.to_repr().into();
        self.code.copy_from_slice(&digest[KEY_SIZE..]);
        Ok(())
    }
}

/// Builds the master node from `seed` and walks the hardened `path` in order.
pub fn compute_node(seed: &[u8], path: &[u32]) -> Result<Node, Error> {
    let mut node = Node::master(seed)?;
    for &index in path {
        node.compute_hardened_child(index)?;
    }
    Ok(node)
}

// Treats the key as a big-endian 256-bit integer and rejects zero and
// anything >= the secp256k1 group order.
fn validate_private_key(key: &[u8; KEY_SIZE]) -> Result<Scalar, Error> {
    let scalar = Option::<Scalar>::from(Scalar::from_repr(FieldBytes::from(*key)))
        .ok_or(Error::KeyOutOfRange)?;
    if bool::from(scalar.is_zero()) {
        return Err(Error::KeyOutOfRange);
    }
    Ok(scalar)
}
