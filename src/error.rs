use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum Error {
    #[error("failed to read entropy: {0}")]
    EntropyRead(String),
    #[error("unsupported entropy size: got {0} bytes, expected {1}")]
    EntropySize(usize, usize),
    #[error("invalid mnemonic: {0}")]
    Mnemonic(String),
    #[error("account {0} overflows the hardened index space")]
    AccountTooLarge(u32),
    #[error("unknown WOTS+ params encoding: {0}")]
    UnknownParamsEncoding(u8),
    #[error("seed must be between 16 and 64 bytes, got {0}")]
    SeedSize(usize),
    #[error("index {0} is not a hardened derivation index")]
    NonHardenedIndex(u32),
    #[error("derived private key is out of range")]
    KeyOutOfRange,
    #[error("message or signature is empty")]
    EmptyMessageOrSignature,
    #[error("consensus params can't be used for transaction signatures")]
    ConsensusNotAllowed,
    #[error("invalid signature length: got {0} bytes, expected {1}")]
    SignatureLength(usize, usize),
    #[error("invalid public key length: got {0} bytes, expected 32")]
    PublicKeyLength(usize),
    #[error("output buffer must be empty with capacity for at least 32 bytes")]
    OutputBuffer,
    #[error("base58 decoding failed: {0}")]
    Base58(String),
    #[error("invalid address length: got {0} bytes, expected {1}")]
    AddressLength(usize, usize),
    #[error("incorrect network id: got {0}, expected {1}")]
    NetworkMismatch(u8, u8),
    #[error("address checksum mismatch")]
    ChecksumMismatch,
    #[error("signatories can't be empty")]
    NoSignatories,
    #[error("too many signatories: got {0}, max 63")]
    TooManySignatories(usize),
    #[error("threshold can't be zero")]
    ZeroThreshold,
    #[error("invalid threshold: got {0}, with {1} signatories")]
    ThresholdTooLarge(u16, usize),
    #[error("sr25519 key derivation failed: {0}")]
    Sr25519(String),
}

impl From<bip39::Error> for Error {
    fn from(e: bip39::Error) -> Self {
        Error::Mnemonic(e.to_string())
    }
}

impl From<bs58::decode::Error> for Error {
    fn from(e: bs58::decode::Error) -> Self {
        Error::Base58(e.to_string())
    }
}

impl From<schnorrkel::SignatureError> for Error {
    fn from(e: schnorrkel::SignatureError) -> Self {
        Error::Sr25519(e.to_string())
    }
}
