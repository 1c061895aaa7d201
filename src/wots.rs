//! # Winternitz One-Time Signature Plus (WOTS+)
//!
//! Hash-ladder one-time signatures over byte-wide chunks (`W = 256`). A key
//! expands its 32-byte seed into one secret chunk per ladder; signing walks
//! each ladder as far as the corresponding digest byte, and verification
//! finishes the walk and compares the compressed ladder tops.
//!
//! Chains are masked: before every hash application the current value is
//! XORed with a randomization element derived from the public seed, and the
//! ladder position is absorbed alongside it.
//!
//! ## One-time use
//!
//! Nothing in the API stops a key from signing twice. Two signatures under
//! the same key reveal secret chunks and break unforgeability; callers own
//! the discipline of discarding a key after its single signature.

use rand::{CryptoRng, RngCore};
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::error::Error;
use crate::hasher::Hasher;
use crate::wots::params::{Params, ParamsEncoding, PK_HASH, PK_SIZE, SEED_SIZE, W};

pub mod params;

/// A WOTS+ key: a parameter set and the two 32-byte seeds everything is
/// derived from. Secret material is zeroized on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct Key {
    #[zeroize(skip)]
    params: Params,
    seed: [u8; SEED_SIZE],
    public_seed: [u8; SEED_SIZE],
}

impl Key {
    /// Creates a key by drawing both seeds from `rng`.
    ///
    /// Exactly `2 * SEED_SIZE` bytes are consumed; a failing source is
    /// reported as [`Error::EntropyRead`], never padded over.
    pub fn new<R: RngCore + CryptoRng>(params: Params, rng: &mut R) -> Result<Self, Error> {
        let mut seed = [0u8; SEED_SIZE];
        let mut public_seed = [0u8; SEED_SIZE];
        rng.try_fill_bytes(&mut seed)
            .map_err(|e| Error::EntropyRead(e.to_string()))?;
        rng.try_fill_bytes(&mut public_seed)
            .map_err(|e| Error::EntropyRead(e.to_string()))?;
        Ok(Key {
            params,
            seed,
            public_seed,
        })
    }

    /// Creates a key from an externally supplied seed pair, typically the
    /// key and chain code of a BIP32 node.
    pub fn from_seed(
        params: Params,
        seed: &[u8; SEED_SIZE],
        public_seed: &[u8; SEED_SIZE],
    ) -> Self {
        Key {
            params,
            seed: *seed,
            public_seed: *public_seed,
        }
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    /// Computes the compressed public key: BLAKE2b-256 over the public seed
    /// followed by every ladder top.
    pub fn compute_pk(&self) -> [u8; PK_SIZE] {
        let n = self.params.n;
        let secrets = self.expand_secrets();
        let randomizers = compute_randomizers(&self.params, &self.public_seed);
        let mut prf = self.params.prf_hash.hasher();

        let mut pk_hasher = PK_HASH.hasher();
        pk_hasher.update(&self.public_seed);

        let mut value = Zeroizing::new(vec![0u8; n]);
        for i in 0..self.params.total {
            value.copy_from_slice(&secrets[i * n..(i + 1) * n]);
            chain(
                &self.params,
                &mut prf,
                &self.public_seed,
                &randomizers,
                &mut value,
                0,
                W - 1,
            );
            pk_hasher.update(&value);
        }

        let mut pk = [0u8; PK_SIZE];
        pk.copy_from_slice(&pk_hasher.finalize_reset());
        pk
    }

    /// Signs a message, walking each ladder as far as its digest chunk.
    ///
    /// The returned signature carries the params encoding byte followed by
    /// the public seed and one partial walk per ladder. Keys built from a
    /// custom parameter set produce an [`ParamsEncoding::Invalid`] tag, which
    /// no decoder accepts.
    pub fn sign(&self, msg: &[u8]) -> Vec<u8> {
        let n = self.params.n;
        let secrets = self.expand_secrets();
        let randomizers = compute_randomizers(&self.params, &self.public_seed);
        let mut prf = self.params.prf_hash.hasher();

        let mut signature = Vec::with_capacity(self.params.signature_size());
        signature.push(u8::from(ParamsEncoding::from_params(&self.params)));
        signature.extend_from_slice(&self.public_seed);

        let mut value = Zeroizing::new(vec![0u8; n]);
        for (i, &chunk) in self.params.message_chunks(msg).iter().enumerate() {
            value.copy_from_slice(&secrets[i * n..(i + 1) * n]);
            chain(
                &self.params,
                &mut prf,
                &self.public_seed,
                &randomizers,
                &mut value,
                0,
                chunk as usize,
            );
            signature.extend_from_slice(&value);
        }
        signature
    }

    // Expands the seed into one secret chunk per ladder:
    // SK_i = PRF(seed || LE16(i))[..n]
    fn expand_secrets(&self) -> Zeroizing<Vec<u8>> {
        let n = self.params.n;
        let mut prf = self.params.prf_hash.hasher();
        let mut secrets = Zeroizing::new(vec![0u8; n * self.params.total]);
        for i in 0..self.params.total {
            prf.update(&self.seed);
            prf.update(&(i as u16).to_le_bytes());
            let digest = Zeroizing::new(prf.finalize_reset());
            secrets[i * n..(i + 1) * n].copy_from_slice(&digest[..n]);
        }
        secrets
    }
}

// Randomization elements shared by every ladder of a key:
// R_j = PRF(public_seed || LE16(j))[..n] for j in 0..W-1, stored flat.
pub(crate) fn compute_randomizers(params: &Params, public_seed: &[u8]) -> Vec<u8> {
    let n = params.n;
    let mut prf = params.prf_hash.hasher();
    let mut randomizers = vec![0u8; n * (W - 1)];
    for j in 0..W - 1 {
        prf.update(public_seed);
        prf.update(&(j as u16).to_le_bytes());
        let digest = prf.finalize_reset();
        randomizers[j * n..(j + 1) * n].copy_from_slice(&digest[..n]);
    }
    randomizers
}

// The chain function. Interprets `value` as the ladder element at position
// `start` and advances it `steps` positions in place:
//
//   value = PRF(public_seed || pos+1 || (value ^ R_pos))[..n]
//
// The mask uses the randomization element at the current position, not the
// step count.
pub(crate) fn chain(
    params: &Params,
    prf: &mut Hasher,
    public_seed: &[u8],
    randomizers: &[u8],
    value: &mut [u8],
    start: usize,
    steps: usize,
) {
    let n = params.n;
    for pos in start..start + steps {
        if pos >= W - 1 {
            break;
        }
        for (z, byte) in value.iter_mut().enumerate() {
            *byte ^= randomizers[pos * n + z];
        }
        prf.update(public_seed);
        prf.update(&[(pos + 1) as u8]);
        prf.update(value);
        let digest = prf.finalize_reset();
        value.copy_from_slice(&digest[..n]);
    }
}
