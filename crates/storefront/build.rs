//! Build script for the storefront crate.
//!
//! Fingerprints the stylesheet so templates can link a content-addressed
//! filename and the asset can be cached forever.

use std::env;
use std::fs;
use std::path::Path;

use sha2::{Digest, Sha256};

fn main() {
    fingerprint_stylesheet();
}

/// Hash `static/css/main.css`, copy it to `static/css/derived/main.<hash>.css`,
/// and expose the hash to the crate via `env!("CSS_HASH")`.
fn fingerprint_stylesheet() {
    let manifest_dir =
        env::var("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR must be set by Cargo");
    let source = Path::new(&manifest_dir).join("static/css/main.css");

    println!("cargo:rerun-if-changed={}", source.display());

    let bytes = match fs::read(&source) {
        Ok(bytes) => bytes,
        Err(e) => {
            // Tolerate a missing stylesheet so fresh checkouts still build.
            println!("cargo:warning=could not read main.css: {e}");
            println!("cargo:rustc-env=CSS_HASH=");
            return;
        }
    };

    let digest = format!("{:x}", Sha256::digest(&bytes));
    let short = &digest[..8];
    println!("cargo:rustc-env=CSS_HASH={short}");

    let derived = Path::new(&manifest_dir).join("static/css/derived");
    fs::create_dir_all(&derived).expect("failed to create derived CSS directory");
    fs::copy(&source, derived.join(format!("main.{short}.css")))
        .expect("failed to copy fingerprinted stylesheet");
}
