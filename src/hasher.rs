//! Uniform interface over the hash functions used across the crate.
//!
//! WOTS+ chains, the Sleeve composition and the address layer are all
//! parameterized by hash choice. [`HashType`] tags the supported algorithms
//! and hands out either a one-shot digest or a streaming [`Hasher`], so the
//! callers never branch on the concrete algorithm themselves.

use core::fmt;

use blake2::digest::consts::U32;
use blake2::{Blake2b, Blake2b512};
use sha2::{Digest, Sha256};
use sha3::{Sha3_224, Sha3_256};

type Blake2b256 = Blake2b<U32>;

/// Hash algorithms available to WOTS+ parameter sets and the wallet layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HashType {
    Blake2b256,
    Blake2b512,
    Blake3_256,
    Sha3_224,
    Sha3_256,
    Sha2_256,
}

impl HashType {
    /// Digest size in bytes.
    pub const fn size(self) -> usize {
        match self {
            HashType::Blake2b256 => 32,
            HashType::Blake2b512 => 64,
            HashType::Blake3_256 => 32,
            HashType::Sha3_224 => 28,
            HashType::Sha3_256 => 32,
            HashType::Sha2_256 => 32,
        }
    }

    /// Creates a streaming hasher for this algorithm.
    pub fn hasher(self) -> Hasher {
        let inner = match self {
            HashType::Blake2b256 => Inner::Blake2b256(Blake2b256::new()),
            HashType::Blake2b512 => Inner::Blake2b512(Blake2b512::new()),
            HashType::Blake3_256 => Inner::Blake3(Box::new(blake3::Hasher::new())),
            HashType::Sha3_224 => Inner::Sha3_224(Sha3_224::new()),
            HashType::Sha3_256 => Inner::Sha3_256(Sha3_256::new()),
            HashType::Sha2_256 => Inner::Sha2_256(Sha256::new()),
        };
        Hasher { inner }
    }

    /// One-shot digest of `data`.
    pub fn hash(self, data: &[u8]) -> Vec<u8> {
        let mut hasher = self.hasher();
        hasher.update(data);
        hasher.finalize_reset()
    }
}

impl fmt::Display for HashType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            HashType::Blake2b256 => "BLAKE2B_256",
            HashType::Blake2b512 => "BLAKE2B_512",
            HashType::Blake3_256 => "BLAKE3_256",
            HashType::Sha3_224 => "SHA3_224",
            HashType::Sha3_256 => "SHA3_256",
            HashType::Sha2_256 => "SHA2_256",
        };
        f.write_str(name)
    }
}

/// Streaming absorber over one of the supported algorithms.
///
/// `finalize_reset` emits the digest and leaves the hasher ready for the next
/// message, which is the access pattern of the WOTS+ chain function.
#[derive(Clone)]
pub struct Hasher {
    inner: Inner,
}

#[derive(Clone)]
enum Inner {
    Blake2b256(Blake2b256),
    Blake2b512(Blake2b512),
    // blake3 keeps a large internal state, box it to keep Hasher small
    Blake3(Box<blake3::Hasher>),
    Sha3_224(Sha3_224),
    Sha3_256(Sha3_256),
    Sha2_256(Sha256),
}

impl Hasher {
    pub fn update(&mut self, data: &[u8]) {
        match &mut self.inner {
            Inner::Blake2b256(h) => h.update(data),
            Inner::Blake2b512(h) => h.update(data),
            Inner::Blake3(h) => {
                h.update(data);
            }
            Inner::Sha3_224(h) => h.update(data),
            Inner::Sha3_256(h) => h.update(data),
            Inner::Sha2_256(h) => h.update(data),
        }
    }

    /// Returns the digest of everything absorbed so far and resets the state.
    pub fn finalize_reset(&mut self) -> Vec<u8> {
        match &mut self.inner {
            Inner::Blake2b256(h) => h.finalize_reset().to_vec(),
            Inner::Blake2b512(h) => h.finalize_reset().to_vec(),
            Inner::Blake3(h) => {
                let digest = h.finalize();
                h.reset();
                digest.as_bytes().to_vec()
            }
            Inner::Sha3_224(h) => h.finalize_reset().to_vec(),
            Inner::Sha3_256(h) => h.finalize_reset().to_vec(),
            Inner::Sha2_256(h) => h.finalize_reset().to_vec(),
        }
    }

    /// Discards any absorbed input.
    pub fn reset(&mut self) {
        match &mut self.inner {
            Inner::Blake2b256(h) => Digest::reset(h),
            Inner::Blake2b512(h) => Digest::reset(h),
            Inner::Blake3(h) => {
                h.reset();
            }
            Inner::Sha3_224(h) => Digest::reset(h),
            Inner::Sha3_256(h) => Digest::reset(h),
            Inner::Sha2_256(h) => Digest::reset(h),
        }
    }

    /// Digest size in bytes.
    pub fn size(&self) -> usize {
        match &self.inner {
            Inner::Blake2b256(_) => 32,
            Inner::Blake2b512(_) => 64,
            Inner::Blake3(_) => 32,
            Inner::Sha3_224(_) => 28,
            Inner::Sha3_256(_) => 32,
            Inner::Sha2_256(_) => 32,
        }
    }
}
