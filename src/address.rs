//! SS58 addresses, Substrate multisig derivation and the sr25519 bridge.
//!
//! An SS58 address is `base58(network || pubkey || checksum)` where the
//! two-byte checksum is BLAKE2b-512 over `"SS58PRE" || network || pubkey`.
//! The sr25519 bridge follows the subkey derivation: PBKDF2 over the BIP39
//! *entropy* (not the phrase), expanded through schnorrkel's Ed25519 mode.

use bip39::{Language, Mnemonic};
use schnorrkel::{ExpansionMode, MiniSecretKey};
use sha2::Sha512;
use subtle::ConstantTimeEq;
use zeroize::Zeroizing;

use crate::error::Error;
use crate::hasher::HashType;

/// Network prefix of the public testnet.
pub const TESTNET_PREFIX: u8 = 42;

/// Network prefix of xx network mainnet.
pub const XX_NETWORK_PREFIX: u8 = 55;

/// Maximum number of multisig signatories, the largest count whose SCALE
/// compact length encoding still fits a single byte.
pub const MAX_SIGNATORIES: usize = 63;

const SS58_CHECKSUM_PREFIX: &[u8] = b"SS58PRE";
const MULTISIG_DOMAIN_TAG: &[u8] = b"modlpy/utilisuba";

const NETWORK_ID_LEN: usize = 1;
const PUB_KEY_LEN: usize = 32;
const CHECKSUM_LEN: usize = 2;
const ADDRESS_LEN: usize = NETWORK_ID_LEN + PUB_KEY_LEN + CHECKSUM_LEN;
const CHECKSUM_POS: usize = NETWORK_ID_LEN + PUB_KEY_LEN;

/// Testnet address of the standard sr25519 account behind `mnemonic`.
pub fn testnet_address_from_mnemonic(mnemonic: &str) -> Result<String, Error> {
    let pubkey = sr25519_public_from_mnemonic(mnemonic)?;
    Ok(generate_ss58_address(TESTNET_PREFIX, &pubkey))
}

/// xx network address of the standard sr25519 account behind `mnemonic`.
pub fn xx_network_address_from_mnemonic(mnemonic: &str) -> Result<String, Error> {
    let pubkey = sr25519_public_from_mnemonic(mnemonic)?;
    Ok(generate_ss58_address(XX_NETWORK_PREFIX, &pubkey))
}

/// Checks that `address` is a well-formed testnet SS58 address.
pub fn validate_testnet_address(address: &str) -> Result<(), Error> {
    validate_ss58_address(TESTNET_PREFIX, address).map(|_| ())
}

/// Checks that `address` is a well-formed xx network SS58 address.
pub fn validate_xx_network_address(address: &str) -> Result<(), Error> {
    validate_ss58_address(XX_NETWORK_PREFIX, address).map(|_| ())
}

/// Encodes a 32-byte public key as an SS58 address under `network`.
pub(crate) fn generate_ss58_address(network: u8, pubkey: &[u8]) -> String {
    let mut hasher = HashType::Blake2b512.hasher();
    hasher.update(SS58_CHECKSUM_PREFIX);
    hasher.update(&[network]);
    hasher.update(pubkey);
    let checksum = hasher.finalize_reset();

    let mut data = Vec::with_capacity(ADDRESS_LEN);
    data.push(network);
    data.extend_from_slice(pubkey);
    data.extend_from_slice(&checksum[..CHECKSUM_LEN]);
    bs58::encode(data).into_string()
}

// Decodes and fully validates an address, returning the embedded public key.
fn validate_ss58_address(network: u8, address: &str) -> Result<[u8; PUB_KEY_LEN], Error> {
    let data = bs58::decode(address).into_vec()?;
    if data.len() != ADDRESS_LEN {
        return Err(Error::AddressLength(data.len(), ADDRESS_LEN));
    }
    if data[0] != network {
        return Err(Error::NetworkMismatch(data[0], network));
    }

    let mut hasher = HashType::Blake2b512.hasher();
    hasher.update(SS58_CHECKSUM_PREFIX);
    hasher.update(&data[..CHECKSUM_POS]);
    let computed = hasher.finalize_reset();
    if computed[..CHECKSUM_LEN].ct_eq(&data[CHECKSUM_POS..]).into() {
        let mut pubkey = [0u8; PUB_KEY_LEN];
        pubkey.copy_from_slice(&data[NETWORK_ID_LEN..CHECKSUM_POS]);
        Ok(pubkey)
    } else {
        Err(Error::ChecksumMismatch)
    }
}

fn extract_network_id(address: &str) -> Result<u8, Error> {
    let data = bs58::decode(address).into_vec()?;
    if data.len() != ADDRESS_LEN {
        return Err(Error::AddressLength(data.len(), ADDRESS_LEN));
    }
    Ok(data[0])
}

// Standard Substrate sr25519 account derivation, compatible with subkey:
// the mnemonic's entropy feeds PBKDF2-HMAC-SHA512, the first 32 bytes of
// which expand to a schnorrkel keypair in Ed25519 mode.
fn sr25519_public_from_mnemonic(mnemonic: &str) -> Result<[u8; 32], Error> {
    let parsed = Mnemonic::parse_in_normalized(Language::English, mnemonic)?;
    let (entropy, entropy_len) = parsed.to_entropy_array();

    let mut seed = Zeroizing::new([0u8; 64]);
    pbkdf2::pbkdf2_hmac::<Sha512>(&entropy[..entropy_len], b"mnemonic", 2048, &mut *seed);

    let mini = MiniSecretKey::from_bytes(&seed[..32])?;
    Ok(mini
        .expand_to_keypair(ExpansionMode::Ed25519)
        .public
        .to_bytes())
}

/// A multisig account: its signatory addresses and signing threshold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultisigDescriptor {
    pub signatories: Vec<String>,
    pub threshold: u16,
}

impl MultisigDescriptor {
    pub fn new(signatories: Vec<String>, threshold: u16) -> Self {
        MultisigDescriptor {
            signatories,
            threshold,
        }
    }

    /// Derives the multisig account address:
    ///
    /// `BLAKE2b-256("modlpy/utilisuba" || u8(size << 2) || sorted_pubkeys || LE16(threshold))`
    ///
    /// encoded as SS58 under the signatories' shared network. The pubkey sort
    /// makes the result invariant under signatory permutations. The length
    /// prefix reproduces SCALE compact encoding of the size, valid only up to
    /// 63 signatories, hence the cap.
    pub fn address(&self) -> Result<String, Error> {
        let size = self.signatories.len();
        if size == 0 {
            return Err(Error::NoSignatories);
        }
        if size > MAX_SIGNATORIES {
            return Err(Error::TooManySignatories(size));
        }
        if self.threshold == 0 {
            return Err(Error::ZeroThreshold);
        }
        if size < self.threshold as usize {
            return Err(Error::ThresholdTooLarge(self.threshold, size));
        }

        let network = extract_network_id(&self.signatories[0])?;
        let mut keys = Vec::with_capacity(size);
        for signatory in &self.signatories {
            keys.push(validate_ss58_address(network, signatory)?);
        }
        keys.sort_unstable();

        let mut hasher = HashType::Blake2b256.hasher();
        hasher.update(MULTISIG_DOMAIN_TAG);
        hasher.update(&[(size as u8) << 2]);
        for key in &keys {
            hasher.update(key);
        }
        hasher.update(&self.threshold.to_le_bytes());
        let account = hasher.finalize_reset();

        Ok(generate_ss58_address(network, &account))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Generated with `subkey inspect` for the Trezor test-vector mnemonic.
    const TEST_MNEMONIC: &str = "hamster diagram private dutch cause delay private meat slide \
                                 toddler razor book happy fancy gospel tennis maple dilemma loan \
                                 word shrug inflict delay length";
    const TESTNET_ADDRESS: &str = "5HQpup8uJbTnbNRDkiHM1t5g2aXyQuKTL2UpqBGpYZbU2Qqh";
    const XX_NETWORK_ADDRESS: &str = "6aeQGiB9JNqEd8gFXdievbYCRtPo8HWDnFgXq4djZgKogpRH";

    #[test]
    fn address_generation_consistency() {
        assert_eq!(
            testnet_address_from_mnemonic(TEST_MNEMONIC).unwrap(),
            TESTNET_ADDRESS
        );
        assert_eq!(
            xx_network_address_from_mnemonic(TEST_MNEMONIC).unwrap(),
            XX_NETWORK_ADDRESS
        );
    }

    #[test]
    fn validation_consistency() {
        validate_testnet_address(TESTNET_ADDRESS).unwrap();
        validate_xx_network_address(XX_NETWORK_ADDRESS).unwrap();

        // cross-network validation fails on the prefix
        assert_eq!(
            validate_xx_network_address(TESTNET_ADDRESS),
            Err(Error::NetworkMismatch(TESTNET_PREFIX, XX_NETWORK_PREFIX))
        );
        assert_eq!(
            validate_testnet_address(XX_NETWORK_ADDRESS),
            Err(Error::NetworkMismatch(XX_NETWORK_PREFIX, TESTNET_PREFIX))
        );
    }

    #[test]
    fn invalid_mnemonic_rejected() {
        let bad = "one two three xx    network   sleeve implementation";
        assert!(matches!(
            testnet_address_from_mnemonic(bad),
            Err(Error::Mnemonic(_))
        ));
        assert!(matches!(
            xx_network_address_from_mnemonic(bad),
            Err(Error::Mnemonic(_))
        ));
    }

    #[test]
    fn malformed_addresses_rejected() {
        // first `T` lowercased, breaking the checksum
        let bad_checksum = "5HQpup8uJbtnbNRDkiHM1t5g2aXyQuKTL2UpqBGpYZbU2Qqh";
        assert_eq!(
            validate_testnet_address(bad_checksum),
            Err(Error::ChecksumMismatch)
        );

        let too_short = "5hQpup8uJbTnbNRDkiHM1t5g2aXyQu";
        assert!(matches!(
            validate_testnet_address(too_short),
            Err(Error::AddressLength(_, ADDRESS_LEN))
        ));

        let too_long = "5HQpup8uJbTnbNRDkiHM1t5g2aXyQuKTL2UpqBGpYZbU2Qqhaaaaaa";
        assert!(matches!(
            validate_testnet_address(too_long),
            Err(Error::AddressLength(_, ADDRESS_LEN))
        ));

        // `l` is not in the base58 alphabet
        assert!(matches!(
            validate_testnet_address("l111"),
            Err(Error::Base58(_))
        ));
    }

    #[test]
    fn round_trip_and_tamper() {
        let pubkey = [0x5au8; PUB_KEY_LEN];
        let address = generate_ss58_address(TESTNET_PREFIX, &pubkey);
        assert_eq!(validate_ss58_address(TESTNET_PREFIX, &address).unwrap(), pubkey);

        // flipping any payload byte must invalidate the address
        let mut data = bs58::decode(&address).into_vec().unwrap();
        data[10] ^= 0xff;
        let mutated = bs58::encode(&data).into_string();
        assert!(validate_ss58_address(TESTNET_PREFIX, &mutated).is_err());
    }

    const SIGNATORIES: [&str; 3] = [
        "5EfQfwGBaiM8P5uBCent4Ks8WH6heTGX1nTChN2aEzNuoQSw",
        "5Hg7cT1PucPmYBmz9nA3mBVTNwjKH4ZSVVtMRzLFqwuvAn3J",
        "5DtdLQrKzjWcE8C9GvhNHijn6wiac8wJ6i34qSoEQ39Kohpb",
    ];
    const MULTISIG_ADDRESS: &str = "5FBUiZFN9NnnEC7ie1hwU4fUJhtRCCrz4tqVBMr46dCh8ZAG";

    fn descriptor(signatories: &[&str], threshold: u16) -> MultisigDescriptor {
        MultisigDescriptor::new(
            signatories.iter().map(|s| s.to_string()).collect(),
            threshold,
        )
    }

    #[test]
    fn multisig_reference_address() {
        assert_eq!(
            descriptor(&SIGNATORIES, 2).address().unwrap(),
            MULTISIG_ADDRESS
        );
    }

    #[test]
    fn multisig_permutation_invariance() {
        let swapped = [SIGNATORIES[1], SIGNATORIES[0], SIGNATORIES[2]];
        assert_eq!(
            descriptor(&swapped, 2).address().unwrap(),
            MULTISIG_ADDRESS
        );
        let rotated = [SIGNATORIES[2], SIGNATORIES[0], SIGNATORIES[1]];
        assert_eq!(
            descriptor(&rotated, 2).address().unwrap(),
            MULTISIG_ADDRESS
        );
    }

    #[test]
    fn multisig_constraints() {
        assert_eq!(descriptor(&[], 1).address(), Err(Error::NoSignatories));
        assert_eq!(
            descriptor(&SIGNATORIES, 0).address(),
            Err(Error::ZeroThreshold)
        );
        assert_eq!(
            descriptor(&SIGNATORIES, 4).address(),
            Err(Error::ThresholdTooLarge(4, 3))
        );

        let many: Vec<String> = (0..64).map(|_| SIGNATORIES[0].to_string()).collect();
        assert_eq!(
            MultisigDescriptor::new(many, 2).address(),
            Err(Error::TooManySignatories(64))
        );

        // mixed networks: one signatory re-encoded under the mainnet prefix
        let pubkey = validate_ss58_address(TESTNET_PREFIX, SIGNATORIES[1]).unwrap();
        let mixed = [
            SIGNATORIES[0],
            &generate_ss58_address(XX_NETWORK_PREFIX, &pubkey),
            SIGNATORIES[2],
        ];
        assert!(matches!(
            descriptor(&mixed, 2).address(),
            Err(Error::NetworkMismatch(_, _))
        ));
    }
}
