//! Deterministic identification of configurations and pipeline outputs.
//!
//! - `SettingsFingerprint`: BLAKE3 of the canonical JSON of a `LorentzianConfig`.
//!   Two contexts configured identically share a fingerprint; the registry uses
//!   it to detect reconfiguration.
//! - `OutputDigest`: BLAKE3 over the byte encoding of every output array, used
//!   to check that rebuilding a window twice is byte-identical.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{EngineError, Result};
use crate::settings::LorentzianConfig;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SettingsFingerprint(pub String);

impl SettingsFingerprint {
    pub fn of(config: &LorentzianConfig) -> Result<Self> {
        // Struct fields serialize in declaration order, so the JSON is canonical.
        let json = serde_json::to_string(config)
            .map_err(|e| EngineError::config(format!("config is not serializable: {e}")))?;
        Ok(Self(blake3::hash(json.as_bytes()).to_hex().to_string()))
    }
}

impl fmt::Display for SettingsFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Hash of a pipeline output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OutputDigest(pub [u8; 32]);

impl OutputDigest {
    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{b:02x}")).collect()
    }
}

impl fmt::Display for OutputDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Incremental builder for an [`OutputDigest`].
///
/// Every section is length-prefixed so arrays of different lengths cannot
/// collide by concatenation.
pub struct DigestBuilder {
    hasher: blake3::Hasher,
}

impl DigestBuilder {
    pub fn new() -> Self {
        Self {
            hasher: blake3::Hasher::new(),
        }
    }

    pub fn bools(mut self, values: &[bool]) -> Self {
        self.hasher.update(&(values.len() as u64).to_le_bytes());
        for &v in values {
            self.hasher.update(&[v as u8]);
        }
        self
    }

    pub fn ints(mut self, values: &[i64]) -> Self {
        self.hasher.update(&(values.len() as u64).to_le_bytes());
        for v in values {
            self.hasher.update(&v.to_le_bytes());
        }
        self
    }

    pub fn floats(mut self, values: &[f64]) -> Self {
        self.hasher.update(&(values.len() as u64).to_le_bytes());
        for v in values {
            self.hasher.update(&v.to_bits().to_le_bytes());
        }
        self
    }

    pub fn finish(self) -> OutputDigest {
        OutputDigest(*self.hasher.finalize().as_bytes())
    }
}

impl Default for DigestBuilder {
    fn default() -> Self {
        Self::new()
    }
}
