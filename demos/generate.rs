//! Generates a fresh Sleeve wallet and prints the three outputs that must be
//! stored: the quantum phrase, the standard phrase, and the account address.

use rand::rngs::OsRng;
use sleeve::sleeve::{GenSpec, Sleeve, WalletRecord};

fn main() {
    let spec = GenSpec::default();
    let sleeve = Sleeve::new(&mut OsRng, "", spec).expect("wallet generation failed");
    let record = WalletRecord::new(&sleeve, "", spec, false).expect("address derivation failed");

    println!("Sleeve wallet generated.");
    println!();
    println!("Store ALL of the following in a safe place. The quantum phrase is");
    println!("the only way to use the post-quantum fallback key in the future.");
    println!();
    println!("{record}");
}
