//! Recovers the standard recovery phrase and address embedded in a quantum
//! phrase:
//!
//! ```text
//! cargo run --example recover -- word1 word2 ... word24
//! ```

use sleeve::sleeve::{GenSpec, Sleeve, WalletRecord};

fn main() {
    let words: Vec<String> = std::env::args().skip(1).collect();
    if words.is_empty() {
        eprintln!("usage: recover <24-word quantum recovery phrase>");
        std::process::exit(1);
    }

    let spec = GenSpec::default();
    match Sleeve::from_mnemonic(&words.join(" "), "", spec) {
        Ok(sleeve) => {
            let record =
                WalletRecord::new(&sleeve, "", spec, false).expect("address derivation failed");
            println!("{record}");
        }
        Err(e) => {
            eprintln!("recovery failed: {e}");
            std::process::exit(1);
        }
    }
}
