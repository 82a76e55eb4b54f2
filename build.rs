// Copyright © 2024 Keycloakify FTL. All rights reserved.
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Build script that refuses to compile on toolchains older than the
//! crate's minimum supported Rust version.

/// Minimum supported Rust version, kept in sync with `rust-version` in `Cargo.toml`.
const MIN_RUSTC_VERSION: &str = "1.85.0";

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-changed=templates");

    if version_check::is_min_version(MIN_RUSTC_VERSION) != Some(true) {
        eprintln!(
            "'keycloakify-ftl' requires Rust {} or newer.",
            MIN_RUSTC_VERSION
        );
        std::process::exit(1);
    }
}
