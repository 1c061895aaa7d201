//! The Sleeve composition: folding a WOTS+ public key into the entropy of a
//! standard BIP39 mnemonic.
//!
//! A Sleeve wallet carries two 24-word phrases. The quantum phrase is the
//! input mnemonic; walking the BIP32 path it selects deterministically yields
//! a WOTS+ key whose compressed public key is hashed, together with the node
//! key, into the entropy of the output (standard) phrase. The standard phrase
//! transacts on curve-based accounts today, while remaining a one-way
//! commitment to the hidden post-quantum key.

use core::fmt;

use bip39::{Language, Mnemonic};
use rand::{CryptoRng, RngCore};
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::address::{testnet_address_from_mnemonic, xx_network_address_from_mnemonic};
use crate::bip32::{compute_node, FIRST_HARDENED_INDEX};
use crate::error::Error;
use crate::hasher::HashType;
use crate::wots::params::ParamsEncoding;
use crate::wots::Key;

/// Entropy drawn for a new wallet: 32 bytes, a 24-word mnemonic.
pub const ENTROPY_SIZE: usize = 32;

/// BIP44 purpose index of the Sleeve path.
pub const PURPOSE: u32 = 44;

/// Registered coin type of xx network.
pub const COIN_TYPE: u32 = 1955;

// Domain separator committing the WOTS+ public key into the output entropy.
// Output mnemonics are corpus-defined by this constant; never change it.
const SLEEVE_DOMAIN_TAG: &[u8] = b"xx network sleeve";

/// Generation spec: which account and WOTS+ security level a wallet uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenSpec {
    account: u32,
    params: ParamsEncoding,
}

impl GenSpec {
    pub fn new(account: u32, params: ParamsEncoding) -> Self {
        GenSpec { account, params }
    }

    pub fn account(&self) -> u32 {
        self.account
    }

    pub fn params(&self) -> ParamsEncoding {
        self.params
    }

    /// The hardened derivation path `m/44'/1955'/account'/level'/0'`.
    ///
    /// Fails when the account collides with the reserved hardened bit or the
    /// params encoding is unknown.
    pub fn path(&self) -> Result<DerivationPath, Error> {
        if self.account >= FIRST_HARDENED_INDEX {
            return Err(Error::AccountTooLarge(self.account));
        }
        if self.params.params().is_none() {
            return Err(Error::UnknownParamsEncoding(u8::from(self.params)));
        }
        let level = u8::from(self.params) as u32;
        Ok(DerivationPath(vec![
            FIRST_HARDENED_INDEX | PURPOSE,
            FIRST_HARDENED_INDEX | COIN_TYPE,
            FIRST_HARDENED_INDEX | self.account,
            FIRST_HARDENED_INDEX | level,
            FIRST_HARDENED_INDEX,
        ]))
    }
}

impl Default for GenSpec {
    /// Account 0 at the default security level.
    fn default() -> Self {
        GenSpec::new(0, ParamsEncoding::default())
    }
}

/// A hardened derivation path, displayed as `//44//1955//0//0//0`.
///
/// The display form is presentational; the internal walk always uses the
/// numeric hardened indices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivationPath(Vec<u32>);

impl DerivationPath {
    pub fn indices(&self) -> &[u32] {
        &self.0
    }
}

impl fmt::Display for DerivationPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for index in &self.0 {
            write!(f, "//{}", index & !FIRST_HARDENED_INDEX)?;
        }
        Ok(())
    }
}

/// A generated Sleeve wallet: the quantum phrase and the standard phrase it
/// commits to. Both are zeroized on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct Sleeve {
    mnemonic: String,
    output_mnemonic: String,
}

impl Sleeve {
    /// Generates a wallet from 32 fresh bytes of `rng` entropy.
    pub fn new<R: RngCore + CryptoRng>(
        rng: &mut R,
        passphrase: &str,
        spec: GenSpec,
    ) -> Result<Self, Error> {
        let mut entropy = Zeroizing::new([0u8; ENTROPY_SIZE]);
        rng.try_fill_bytes(&mut *entropy)
            .map_err(|e| Error::EntropyRead(e.to_string()))?;
        Sleeve::from_entropy(&*entropy, passphrase, spec)
    }

    /// Generates a wallet from caller-supplied entropy, which must be
    /// exactly [`ENTROPY_SIZE`] bytes.
    pub fn from_entropy(entropy: &[u8], passphrase: &str, spec: GenSpec) -> Result<Self, Error> {
        if entropy.len() != ENTROPY_SIZE {
            return Err(Error::EntropySize(entropy.len(), ENTROPY_SIZE));
        }
        let mnemonic = Mnemonic::from_entropy_in(Language::English, entropy)?;
        Sleeve::derive(&mnemonic, passphrase, spec)
    }

    /// Recovers a wallet from its quantum phrase. The phrase's BIP39
    /// checksum is verified and it must carry 32 bytes of entropy.
    pub fn from_mnemonic(mnemonic: &str, passphrase: &str, spec: GenSpec) -> Result<Self, Error> {
        let mnemonic = Mnemonic::parse_in_normalized(Language::English, mnemonic)?;
        let (_, entropy_len) = mnemonic.to_entropy_array();
        if entropy_len != ENTROPY_SIZE {
            return Err(Error::EntropySize(entropy_len, ENTROPY_SIZE));
        }
        Sleeve::derive(&mnemonic, passphrase, spec)
    }

    /// The quantum recovery phrase.
    pub fn mnemonic(&self) -> &str {
        &self.mnemonic
    }

    /// The standard recovery phrase committed to the WOTS+ public key.
    pub fn output_mnemonic(&self) -> &str {
        &self.output_mnemonic
    }

    fn derive(mnemonic: &Mnemonic, passphrase: &str, spec: GenSpec) -> Result<Self, Error> {
        let path = spec.path()?;
        let params = spec
            .params()
            .params()
            .ok_or(Error::UnknownParamsEncoding(u8::from(spec.params())))?;

        let seed = Zeroizing::new(mnemonic.to_seed(passphrase));
        let node = compute_node(&*seed, path.indices())?;

        let wots_key = Key::from_seed(params, &node.key, &node.code);
        let pk = wots_key.compute_pk();

        let mut hasher = HashType::Sha3_256.hasher();
        hasher.update(SLEEVE_DOMAIN_TAG);
        hasher.update(&node.key);
        let commitment_key = Zeroizing::new(hasher.finalize_reset());

        hasher.update(&commitment_key);
        hasher.update(&pk);
        let output_entropy = Zeroizing::new(hasher.finalize_reset());

        let output_mnemonic = Mnemonic::from_entropy_in(Language::English, &output_entropy)?;
        Ok(Sleeve {
            mnemonic: mnemonic.to_string(),
            output_mnemonic: output_mnemonic.to_string(),
        })
    }
}

/// One wallet worth of output: both phrases, the path, and the account
/// address, plus any additionally derived display addresses.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialization", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serialization", serde(rename_all = "PascalCase"))]
pub struct WalletRecord {
    pub quantum_phrase: String,
    pub passphrase: String,
    #[cfg_attr(feature = "serialization", serde(rename = "DerivationPath"))]
    pub path: String,
    pub standard_phrase: String,
    pub address: String,
    #[cfg_attr(feature = "serialization", serde(default))]
    pub derived_addresses: Vec<String>,
}

impl WalletRecord {
    /// Assembles the record for `sleeve`, deriving the account address under
    /// the testnet or mainnet prefix.
    pub fn new(
        sleeve: &Sleeve,
        passphrase: &str,
        spec: GenSpec,
        testnet: bool,
    ) -> Result<Self, Error> {
        let address = if testnet {
            testnet_address_from_mnemonic(sleeve.output_mnemonic())?
        } else {
            xx_network_address_from_mnemonic(sleeve.output_mnemonic())?
        };
        Ok(WalletRecord {
            quantum_phrase: sleeve.mnemonic().to_string(),
            passphrase: passphrase.to_string(),
            path: spec.path()?.to_string(),
            standard_phrase: sleeve.output_mnemonic().to_string(),
            address,
            derived_addresses: Vec::new(),
        })
    }
}

impl fmt::Display for WalletRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "quantum recovery phrase: {}", self.quantum_phrase)?;
        writeln!(f, "passphrase: {}", self.passphrase)?;
        writeln!(f, "path: {}", self.path)?;
        writeln!(f, "standard recovery phrase: {}", self.standard_phrase)?;
        write!(f, "address: {}", self.address)?;
        for derived in &self.derived_addresses {
            write!(f, "\nderived address: {derived}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wots::params::PK_SIZE;
    use rand::rngs::OsRng;

    // https://github.com/trezor/python-mnemonic/blob/master/vectors.json
    const VECTOR_ENTROPY: &str =
        "68a79eaca2324873eacc50cb9c6eca8cc68ea5d936f98787c60c7ebc74e6ce7c";
    const VECTOR_MNEMONIC: &str = "hamster diagram private dutch cause delay private meat slide \
                                   toddler razor book happy fancy gospel tennis maple dilemma \
                                   loan word shrug inflict delay length";
    // Standard phrase committed by the vector mnemonic under the default spec
    // with an empty passphrase.
    const VECTOR_OUTPUT_MNEMONIC: &str =
        "speed bar erosion clog exist siren giraffe liar sick hire lazy disagree pig monitor \
         loan owner solve grant excess drop broom render roast primary";

    #[test]
    fn reference_vector() {
        let sleeve = Sleeve::from_mnemonic(VECTOR_MNEMONIC, "", GenSpec::default()).unwrap();
        assert_eq!(sleeve.output_mnemonic(), VECTOR_OUTPUT_MNEMONIC);
    }

    #[test]
    fn entropy_round_trip() {
        let entropy = hex::decode(VECTOR_ENTROPY).unwrap();
        let sleeve = Sleeve::from_entropy(&entropy, "TREZOR", GenSpec::default()).unwrap();
        assert_eq!(sleeve.mnemonic(), VECTOR_MNEMONIC);
    }

    #[test]
    fn recovery_is_deterministic() {
        let entropy = hex::decode(VECTOR_ENTROPY).unwrap();
        let from_entropy =
            Sleeve::from_entropy(&entropy, "TREZOR", GenSpec::default()).unwrap();
        let recovered =
            Sleeve::from_mnemonic(VECTOR_MNEMONIC, "TREZOR", GenSpec::default()).unwrap();
        let again = Sleeve::from_mnemonic(VECTOR_MNEMONIC, "TREZOR", GenSpec::default()).unwrap();

        assert_eq!(from_entropy.output_mnemonic(), recovered.output_mnemonic());
        assert_eq!(recovered.output_mnemonic(), again.output_mnemonic());

        // a different passphrase commits to a different wallet
        let other = Sleeve::from_mnemonic(VECTOR_MNEMONIC, "", GenSpec::default()).unwrap();
        assert_ne!(other.output_mnemonic(), recovered.output_mnemonic());
    }

    // Mnemonic whose path-derived WOTS+ key has a pinned compressed public
    // key; exercises seed -> node -> key end to end.
    #[test]
    fn wots_key_reference() {
        let mnemonic = "hole define scout taxi help project army vocal sudden wealth volume fan \
                        pigeon raven hen spoil cup because crowd wage awkward public reform pluck";
        let parsed = Mnemonic::parse_in_normalized(Language::English, mnemonic).unwrap();
        let seed = parsed.to_seed("");

        let path = [0x8000_002C, 0x8000_07A3, 0x8000_0000, 0x8000_0000, 0x8000_0000];
        let node = compute_node(&seed, &path).unwrap();
        let key = Key::from_seed(
            ParamsEncoding::default().params().unwrap(),
            &node.key,
            &node.code,
        );
        assert_eq!(
            hex::encode(key.compute_pk()),
            "7bd49cdc5f70766c70c973a2d6c76b964333ac853c5ae8ecbfef5f1fde08705a"
        );
        assert_eq!(key.compute_pk().len(), PK_SIZE);
    }

    #[test]
    fn generation_with_rng() {
        let sleeve = Sleeve::new(&mut OsRng, "", GenSpec::default()).unwrap();
        assert_eq!(sleeve.mnemonic().split_whitespace().count(), 24);
        assert_eq!(sleeve.output_mnemonic().split_whitespace().count(), 24);
    }

    #[test]
    fn spec_validation() {
        let spec = GenSpec::new(1992, ParamsEncoding::Level3);
        assert!(Sleeve::new(&mut OsRng, "", spec).is_ok());

        let spec = GenSpec::new(FIRST_HARDENED_INDEX, ParamsEncoding::Level3);
        assert_eq!(
            Sleeve::new(&mut OsRng, "", spec).err(),
            Some(Error::AccountTooLarge(FIRST_HARDENED_INDEX))
        );

        let spec = GenSpec::new(1992, ParamsEncoding::Invalid);
        assert_eq!(
            Sleeve::new(&mut OsRng, "", spec).err(),
            Some(Error::UnknownParamsEncoding(5))
        );
    }

    #[test]
    fn entropy_size_enforced() {
        // one byte short of a 24-word mnemonic
        assert!(matches!(
            Sleeve::from_entropy(&[0u8; ENTROPY_SIZE - 1], "", GenSpec::default()),
            Err(Error::EntropySize(_, ENTROPY_SIZE))
        ));
        // valid BIP39 entropy size, but not enough for a Sleeve
        assert!(matches!(
            Sleeve::from_entropy(&[0u8; 16], "", GenSpec::default()),
            Err(Error::EntropySize(16, ENTROPY_SIZE))
        ));
    }

    #[test]
    fn bad_mnemonics_rejected() {
        let spec = GenSpec::default();
        // wrong word count
        assert!(Sleeve::from_mnemonic("one two three", "", spec).is_err());
        // 24 words with one word outside the wordlist
        let unknown_word = "armed output survey rent myself sentence warm eyebrow scan isolate \
                            thunder point bulk skirt sketch bird palm sleep dash jazz list \
                            behave spin xxnetwork";
        assert!(Sleeve::from_mnemonic(unknown_word, "", spec).is_err());
        // 24 valid words with a broken checksum
        let bad_checksum = "armed output survey rent myself sentence warm eyebrow scan isolate \
                            thunder point bulk skirt sketch bird palm sleep dash jazz list \
                            behave spin spin";
        assert!(Sleeve::from_mnemonic(bad_checksum, "", spec).is_err());
        // a 12-word phrase is valid BIP39 but too small for a Sleeve
        let twelve = "legal winner thank year wave sausage worth useful legal winner thank yellow";
        assert!(matches!(
            Sleeve::from_mnemonic(twelve, "", spec),
            Err(Error::EntropySize(16, ENTROPY_SIZE))
        ));
    }

    #[test]
    fn path_display() {
        let path = GenSpec::new(3, ParamsEncoding::Level2).path().unwrap();
        assert_eq!(path.to_string(), "//44//1955//3//2//0");
        assert_eq!(
            path.indices(),
            [0x8000_002C, 0x8000_07A3, 0x8000_0003, 0x8000_0002, 0x8000_0000]
        );
    }

    #[test]
    fn wallet_record_display() {
        let entropy = hex::decode(VECTOR_ENTROPY).unwrap();
        let sleeve = Sleeve::from_entropy(&entropy, "TREZOR", GenSpec::default()).unwrap();
        let record = WalletRecord::new(&sleeve, "TREZOR", GenSpec::default(), true).unwrap();

        assert_eq!(record.quantum_phrase, VECTOR_MNEMONIC);
        assert_eq!(record.path, "//44//1955//0//0//0");
        assert!(record.derived_addresses.is_empty());
        let text = record.to_string();
        assert!(text.starts_with("quantum recovery phrase: "));
        assert!(text.contains(&record.address));
    }

    #[cfg(feature = "serialization")]
    #[test]
    fn wallet_record_json() {
        let entropy = hex::decode(VECTOR_ENTROPY).unwrap();
        let sleeve = Sleeve::from_entropy(&entropy, "", GenSpec::default()).unwrap();
        let record = WalletRecord::new(&sleeve, "", GenSpec::default(), false).unwrap();

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["QuantumPhrase"], VECTOR_MNEMONIC);
        assert_eq!(json["DerivationPath"], "//44//1955//0//0//0");
        assert_eq!(json["DerivedAddresses"], serde_json::json!([]));

        let back: WalletRecord = serde_json::from_value(json).unwrap();
        assert_eq!(back, record);
    }
}
