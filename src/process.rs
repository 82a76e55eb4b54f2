// Copyright © 2024 Keycloakify FTL. All rights reserved.
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! File reading and writing shared by the build steps.

use std::fs;
use std::path::Path;

use crate::core::error::{KeycloakifyError, Result};

/// Reads content from a file at the specified path.
///
/// # Errors
///
/// Returns `IOError` carrying the path if the file cannot be read.
pub fn read_content<P: AsRef<Path>>(path: P) -> Result<String> {
    let path_ref = path.as_ref();
    fs::read_to_string(path_ref)
        .map_err(|e| KeycloakifyError::io_error(path_ref.to_path_buf(), e))
}

/// Writes content to a file, creating missing parent directories.
///
/// # Errors
///
/// Returns `IOError` carrying the failing path.
pub fn write_content<P: AsRef<Path>>(path: P, content: &str) -> Result<()> {
    let path_ref = path.as_ref();
    if let Some(parent) = path_ref.parent() {
        fs::create_dir_all(parent).map_err(|e| {
            KeycloakifyError::io_error(parent.to_path_buf(), e)
        })?;
    }
    fs::write(path_ref, content)
        .map_err(|e| KeycloakifyError::io_error(path_ref.to_path_buf(), e))
}
