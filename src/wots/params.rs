//! WOTS+ parameter sets and the tagged signature surfaces built on them.
//!
//! Five named sets exist. Level0 through Level3 trade signature size against
//! security margin and are meant for transaction signatures; Consensus is
//! reserved for a future on-chain migration proof and is therefore rejected
//! by [`decode_transaction_signature`].

use core::fmt;

use crate::error::Error;
use crate::hasher::HashType;
use crate::wots::{chain, compute_randomizers};

/// Winternitz parameter: every ladder consumes one byte of the digest.
pub const W: usize = 256;

/// Byte length of WOTS+ seeds and public seeds.
pub const SEED_SIZE: usize = 32;

/// Byte length of a compressed WOTS+ public key, independent of params.
pub const PK_SIZE: usize = 32;

/// Largest supported message-digest length in bytes.
pub const MAX_MSG_SIZE: usize = 32;

/// Hash used to compress the public key ladder tops.
pub(crate) const PK_HASH: HashType = HashType::Blake2b256;

///////////////////////////////////////////////////////////////////////
// LEVEL0 WOTS+ INSTANTIATION
//
// N = 160 bits, M = 192 bits
// PRF hash: BLAKE2b-256, MSG hash: SHA3-224
// Classical security 139.30, post quantum 80
///////////////////////////////////////////////////////////////////////
const LEVEL0_PARAMS: Params = Params::named(20, 24, HashType::Blake2b256, HashType::Sha3_224);

///////////////////////////////////////////////////////////////////////
// LEVEL1 WOTS+ INSTANTIATION
//
// N = 192 bits, M = 192 bits
// Classical security 171.30, post quantum 96
///////////////////////////////////////////////////////////////////////
const LEVEL1_PARAMS: Params = Params::named(24, 24, HashType::Blake2b256, HashType::Sha3_224);

///////////////////////////////////////////////////////////////////////
// LEVEL2 WOTS+ INSTANTIATION
//
// N = 224 bits, M = 192 bits
// Classical security 203.30, post quantum 112
///////////////////////////////////////////////////////////////////////
const LEVEL2_PARAMS: Params = Params::named(28, 24, HashType::Blake2b256, HashType::Sha3_224);

///////////////////////////////////////////////////////////////////////
// LEVEL3 WOTS+ INSTANTIATION
//
// N = 256 bits, M = 192 bits
// Classical security 235.30, post quantum 128
///////////////////////////////////////////////////////////////////////
const LEVEL3_PARAMS: Params = Params::named(32, 24, HashType::Blake2b256, HashType::Sha3_224);

///////////////////////////////////////////////////////////////////////
// CONSENSUS WOTS+ INSTANTIATION
//
// N = 256 bits, M = 256 bits
// PRF hash: BLAKE2b-256, MSG hash: SHA3-256
//
// WARNING: transactions signed with consensus params are discarded,
// don't use these for wallets
///////////////////////////////////////////////////////////////////////
const CONSENSUS_PARAMS: Params = Params::named(32, 32, HashType::Blake2b256, HashType::Sha3_256);

/// Immutable WOTS+ parameter set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Params {
    pub(crate) n: usize,
    pub(crate) m: usize,
    pub(crate) total: usize,
    pub(crate) prf_hash: HashType,
    pub(crate) msg_hash: HashType,
}

impl Params {
    /// Validating constructor for custom parameter sets.
    ///
    /// Returns `None` when the message size is out of bounds or either hash
    /// is too short for the requested `n`/`m`.
    pub fn new(n: usize, m: usize, prf_hash: HashType, msg_hash: HashType) -> Option<Self> {
        if m < 1 || m > MAX_MSG_SIZE {
            return None;
        }
        if n == 0 || n > prf_hash.size() || m > msg_hash.size() {
            return None;
        }
        Some(Self::named(n, m, prf_hash, msg_hash))
    }

    // Const constructor for the named sets; invalid combinations fail the build.
    const fn named(n: usize, m: usize, prf_hash: HashType, msg_hash: HashType) -> Self {
        assert!(m >= 1 && m <= MAX_MSG_SIZE);
        assert!(n >= 1 && n <= prf_hash.size() && m <= msg_hash.size());
        let checksum_chunks = if m == 1 { 1 } else { 2 };
        Params {
            n,
            m,
            total: m + checksum_chunks,
            prf_hash,
            msg_hash,
        }
    }

    /// Hash output length `n` in bytes.
    pub fn n(&self) -> usize {
        self.n
    }

    /// Message-digest length `m` in bytes.
    pub fn m(&self) -> usize {
        self.m
    }

    /// Number of ladders, message chunks plus checksum chunks.
    pub fn total(&self) -> usize {
        self.total
    }

    /// Full signature size in bytes, including the leading encoding byte.
    pub fn signature_size(&self) -> usize {
        1 + SEED_SIZE + self.n * self.total
    }

    /// Splits the message digest into ladder chunks and appends the checksum.
    ///
    /// The checksum sums `W-1 - chunk` over the message chunks; it fits one
    /// byte when `m == 1` and two big-endian bytes otherwise.
    pub(crate) fn message_chunks(&self, msg: &[u8]) -> Vec<u8> {
        let digest = self.msg_hash.hash(msg);
        let mut chunks = Vec::with_capacity(self.total);
        chunks.extend_from_slice(&digest[..self.m]);

        let checksum: u16 = chunks.iter().map(|&c| (W - 1) as u16 - c as u16).sum();
        if self.total - self.m == 1 {
            chunks.push(checksum as u8);
        } else {
            chunks.extend_from_slice(&checksum.to_be_bytes());
        }
        chunks
    }

    /// Recovers the compressed public key from a signature over `msg`.
    ///
    /// `signature` is the inner payload, without the leading encoding byte.
    /// `out` must be an empty vector with capacity for at least [`PK_SIZE`]
    /// bytes; the recovered key is appended to it.
    pub fn decode(&self, out: &mut Vec<u8>, msg: &[u8], signature: &[u8]) -> Result<(), Error> {
        if !out.is_empty() || out.capacity() < PK_SIZE {
            return Err(Error::OutputBuffer);
        }
        let expected = SEED_SIZE + self.n * self.total;
        if signature.len() != expected {
            return Err(Error::SignatureLength(signature.len(), expected));
        }

        let public_seed = &signature[..SEED_SIZE];
        let walks = &signature[SEED_SIZE..];
        let randomizers = compute_randomizers(self, public_seed);
        let mut prf = self.prf_hash.hasher();

        let mut tops = vec![0u8; self.n * self.total];
        let mut value = vec![0u8; self.n];
        for (i, &chunk) in self.message_chunks(msg).iter().enumerate() {
            let start = chunk as usize;
            value.copy_from_slice(&walks[i * self.n..(i + 1) * self.n]);
            chain(
                self,
                &mut prf,
                public_seed,
                &randomizers,
                &mut value,
                start,
                W - 1 - start,
            );
            tops[i * self.n..(i + 1) * self.n].copy_from_slice(&value);
        }

        let mut pk_hasher = PK_HASH.hasher();
        pk_hasher.update(public_seed);
        pk_hasher.update(&tops);
        out.extend_from_slice(&pk_hasher.finalize_reset());
        Ok(())
    }

    /// Checks a signature against a compressed public key.
    ///
    /// `signature` is the inner payload, without the leading encoding byte.
    pub fn verify(&self, msg: &[u8], signature: &[u8], pk: &[u8]) -> Result<bool, Error> {
        if pk.len() != PK_SIZE {
            return Err(Error::PublicKeyLength(pk.len()));
        }
        let mut decoded = Vec::with_capacity(PK_SIZE);
        self.decode(&mut decoded, msg, signature)?;
        Ok(decoded == pk)
    }
}

impl fmt::Display for Params {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "N: {}, M: {}, PRF: {}, MSG: {}",
            self.n, self.m, self.prf_hash, self.msg_hash
        )
    }
}

/// 8-bit tag identifying a named parameter set on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ParamsEncoding {
    Level0 = 0,
    Level1 = 1,
    Level2 = 2,
    Level3 = 3,
    Consensus = 4,
    Invalid = 5,
}

impl ParamsEncoding {
    /// The parameter set behind this tag, `None` for [`ParamsEncoding::Invalid`].
    pub fn params(self) -> Option<Params> {
        match self {
            ParamsEncoding::Level0 => Some(LEVEL0_PARAMS),
            ParamsEncoding::Level1 => Some(LEVEL1_PARAMS),
            ParamsEncoding::Level2 => Some(LEVEL2_PARAMS),
            ParamsEncoding::Level3 => Some(LEVEL3_PARAMS),
            ParamsEncoding::Consensus => Some(CONSENSUS_PARAMS),
            ParamsEncoding::Invalid => None,
        }
    }

    /// Maps a parameter set back to its tag, [`ParamsEncoding::Invalid`] for
    /// sets that are not one of the five named ones.
    pub fn from_params(params: &Params) -> Self {
        match *params {
            LEVEL0_PARAMS => ParamsEncoding::Level0,
            LEVEL1_PARAMS => ParamsEncoding::Level1,
            LEVEL2_PARAMS => ParamsEncoding::Level2,
            LEVEL3_PARAMS => ParamsEncoding::Level3,
            CONSENSUS_PARAMS => ParamsEncoding::Consensus,
            _ => ParamsEncoding::Invalid,
        }
    }
}

impl Default for ParamsEncoding {
    fn default() -> Self {
        ParamsEncoding::Level0
    }
}

impl From<u8> for ParamsEncoding {
    fn from(value: u8) -> Self {
        match value {
            0 => ParamsEncoding::Level0,
            1 => ParamsEncoding::Level1,
            2 => ParamsEncoding::Level2,
            3 => ParamsEncoding::Level3,
            4 => ParamsEncoding::Consensus,
            _ => ParamsEncoding::Invalid,
        }
    }
}

impl From<ParamsEncoding> for u8 {
    fn from(value: ParamsEncoding) -> Self {
        value as u8
    }
}

/// Verifies a tagged signature against a compressed public key.
///
/// All named parameter sets are accepted here, including Consensus.
pub fn verify(msg: &[u8], signature: &[u8], pk: &[u8]) -> Result<bool, Error> {
    let params = decode_signature_params(msg, signature, true)?;
    params.verify(msg, &signature[1..], pk)
}

/// Recovers the compressed public key from a tagged transaction signature.
///
/// Consensus-tagged signatures are rejected: that parameter set is reserved
/// for the on-chain migration proof and must never sign transactions.
pub fn decode_transaction_signature(
    out: &mut Vec<u8>,
    msg: &[u8],
    signature: &[u8],
) -> Result<(), Error> {
    let params = decode_signature_params(msg, signature, false)?;
    params.decode(out, msg, &signature[1..])
}

fn decode_signature_params(
    msg: &[u8],
    signature: &[u8],
    consensus_allowed: bool,
) -> Result<Params, Error> {
    if msg.is_empty() || signature.is_empty() {
        return Err(Error::EmptyMessageOrSignature);
    }
    let encoding = ParamsEncoding::from(signature[0]);
    if encoding == ParamsEncoding::Consensus && !consensus_allowed {
        return Err(Error::ConsensusNotAllowed);
    }
    encoding
        .params()
        .ok_or(Error::UnknownParamsEncoding(signature[0]))
}
