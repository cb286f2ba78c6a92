//! Self-describing password hash encoding.
//!
//! ```text
//! scrypt$v=1$norm=NFC$N=16384,r=8,p=1$<saltHex>$<derivedKeyHex>
//! ```
//!
//! Every parameter needed to re-verify travels with the hash, so changing
//! the configured cost only affects newly hashed passwords.

use std::fmt;
use std::str::FromStr;

use unicode_normalization::UnicodeNormalization;

/// Algorithm tag of the encoded format.
pub const ALGORITHM: &str = "scrypt";

/// Current format version.
pub const VERSION: u32 = 1;

/// Errors produced while parsing an encoded hash.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EncodingError {
    /// The string does not have the expected six `$`-separated fields.
    #[error("malformed password hash: {0}")]
    Malformed(&'static str),
    /// The algorithm tag is not `scrypt`.
    #[error("unsupported password hash algorithm: '{0}'")]
    UnsupportedAlgorithm(String),
    /// The version field is not supported by this build.
    #[error("unsupported password hash version: '{0}'")]
    UnsupportedVersion(String),
    /// The normalization form is not one of NFC, NFD, NFKC, NFKD.
    #[error("unknown normalization form: '{0}'")]
    UnknownNormalization(String),
    /// The salt or derived key is not valid hex.
    #[error("invalid hex field: {0}")]
    InvalidHex(#[from] hex::FromHexError),
}

/// Unicode normalization form applied to a password before hashing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NormalizationForm {
    /// Canonical composition.
    Nfc,
    /// Canonical decomposition.
    Nfd,
    /// Compatibility composition.
    Nfkc,
    /// Compatibility decomposition.
    Nfkd,
}

impl NormalizationForm {
    /// Return the form name as written in encoded hashes.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Nfc => "NFC",
            Self::Nfd => "NFD",
            Self::Nfkc => "NFKC",
            Self::Nfkd => "NFKD",
        }
    }

    /// Normalize `input` into this form.
    pub fn apply(&self, input: &str) -> String {
        match self {
            Self::Nfc => input.nfc().collect(),
            Self::Nfd => input.nfd().collect(),
            Self::Nfkc => input.nfkc().collect(),
            Self::Nfkd => input.nfkd().collect(),
        }
    }
}

impl fmt::Display for NormalizationForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NormalizationForm {
    type Err = EncodingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "NFC" => Ok(Self::Nfc),
            "NFD" => Ok(Self::Nfd),
            "NFKC" => Ok(Self::Nfkc),
            "NFKD" => Ok(Self::Nfkd),
            other => Err(EncodingError::UnknownNormalization(other.to_string())),
        }
    }
}

/// scrypt cost parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CostParams {
    /// `N = 2^log_n`.
    pub log_n: u8,
    /// Block size.
    pub r: u32,
    /// Parallelism.
    pub p: u32,
}

impl CostParams {
    /// The CPU/memory cost factor `N`.
    pub fn n(&self) -> u64 {
        1u64 << self.log_n
    }

    /// Approximate working memory of one derivation (`128 * r * N`).
    pub fn memory_bytes(&self) -> u128 {
        128 * u128::from(self.r) * u128::from(self.n())
    }

    fn parse(field: &str) -> Result<Self, EncodingError> {
        let (mut n, mut r, mut p) = (None, None, None);
        for pair in field.split(',') {
            let (key, value) = pair
                .split_once('=')
                .ok_or(EncodingError::Malformed("cost parameter without '='"))?;
            match key {
                "N" => n = value.parse::<u64>().ok(),
                "r" => r = value.parse::<u32>().ok(),
                "p" => p = value.parse::<u32>().ok(),
                _ => return Err(EncodingError::Malformed("unknown cost parameter")),
            }
        }

        let n = n.ok_or(EncodingError::Malformed("missing or invalid N"))?;
        if n < 2 || !n.is_power_of_two() {
            return Err(EncodingError::Malformed("N must be a power of two greater than 1"));
        }
        Ok(Self {
            log_n: n.trailing_zeros() as u8,
            r: r.ok_or(EncodingError::Malformed("missing or invalid r"))?,
            p: p.ok_or(EncodingError::Malformed("missing or invalid p"))?,
        })
    }
}

impl fmt::Display for CostParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "N={},r={},p={}", self.n(), self.r, self.p)
    }
}

/// A parsed encoded password hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedHash {
    /// Normalization applied to the password before the pepper HMAC.
    pub normalization: NormalizationForm,
    /// scrypt cost parameters used for this hash.
    pub params: CostParams,
    /// Per-password random salt.
    pub salt: Vec<u8>,
    /// scrypt output.
    pub derived_key: Vec<u8>,
}

impl FromStr for EncodedHash {
    type Err = EncodingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fields: Vec<&str> = s.split('$').collect();
        let [algorithm, version, norm, params, salt, derived_key] = fields.as_slice() else {
            return Err(EncodingError::Malformed("expected six '$'-separated fields"));
        };

        if *algorithm != ALGORITHM {
            return Err(EncodingError::UnsupportedAlgorithm(algorithm.to_string()));
        }
        if version.strip_prefix("v=").and_then(|v| v.parse::<u32>().ok()) != Some(VERSION) {
            return Err(EncodingError::UnsupportedVersion(version.to_string()));
        }
        let normalization = norm
            .strip_prefix("norm=")
            .ok_or(EncodingError::Malformed("missing norm= prefix"))?
            .parse()?;

        Ok(Self {
            normalization,
            params: CostParams::parse(params)?,
            salt: decode_lower_hex(salt)?,
            derived_key: decode_lower_hex(derived_key)?,
        })
    }
}

/// Decode a hex field, accepting only the lowercase form that `Display` writes.
fn decode_lower_hex(field: &str) -> Result<Vec<u8>, EncodingError> {
    if field.bytes().any(|b| b.is_ascii_uppercase()) {
        return Err(EncodingError::Malformed("hex fields must be lowercase"));
    }
    Ok(hex::decode(field)?)
}

impl fmt::Display for EncodedHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{ALGORITHM}$v={VERSION}$norm={}${}${}${}",
            self.normalization,
            self.params,
            hex::encode(&self.salt),
            hex::encode(&self.derived_key)
        )
    }
}
