//! Digest step. The canonical string is hashed as UTF-8 and rendered as
//! uppercase hexadecimal. MD5 stays the default because existing partners
//! sign with it.

use std::fmt::{self, Display};
use std::str::FromStr;

use md5::Md5;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256, Sha512};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown digest algorithm: {0}")]
pub struct UnknownAlgorithm(pub String);

/// Hash function applied to the canonical string.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DigestAlgorithm {
    #[default]
    Md5,
    Sha256,
    Sha512,
}

impl DigestAlgorithm {
    pub fn as_str(&self) -> &'static str {
        match self {
            DigestAlgorithm::Md5 => "md5",
            DigestAlgorithm::Sha256 => "sha256",
            DigestAlgorithm::Sha512 => "sha512",
        }
    }

    /// Produces the raw digest of the provided bytes.
    pub fn digest(&self, data: &[u8]) -> Vec<u8> {
        match self {
            DigestAlgorithm::Md5 => Md5::digest(data).to_vec(),
            DigestAlgorithm::Sha256 => Sha256::digest(data).to_vec(),
            DigestAlgorithm::Sha512 => Sha512::digest(data).to_vec(),
        }
    }

    /// Returns the digest as uppercase hexadecimal, the signature wire form.
    pub fn digest_hex_upper(&self, data: &[u8]) -> String {
        hex::encode_upper(self.digest(data))
    }
}

impl Display for DigestAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DigestAlgorithm {
    type Err = UnknownAlgorithm;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "md5" => Ok(DigestAlgorithm::Md5),
            "sha256" | "sha-256" => Ok(DigestAlgorithm::Sha256),
            "sha512" | "sha-512" => Ok(DigestAlgorithm::Sha512),
            _ => Err(UnknownAlgorithm(value.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::DigestAlgorithm;

    #[test]
    fn md5_matches_reference_vectors() {
        let md5 = DigestAlgorithm::Md5;
        assert_eq!(md5.digest_hex_upper(b""), "D41D8CD98F00B204E9800998ECF8427E");
        assert_eq!(md5.digest_hex_upper(b"abc"), "900150983CD24FB0D6963F7D28E17F72");
    }

    #[test]
    fn sha256_matches_reference_vector() {
        assert_eq!(
            DigestAlgorithm::Sha256.digest_hex_upper(b"abc"),
            "BA7816BF8F01CFEA414140DE5DAE2223B00361A396177A9CB410FF61F20015AD"
        );
    }

    #[test]
    fn output_is_uppercase_and_fixed_length() {
        for (algorithm, len) in [
            (DigestAlgorithm::Md5, 32),
            (DigestAlgorithm::Sha256, 64),
            (DigestAlgorithm::Sha512, 128),
        ] {
            let hex = algorithm.digest_hex_upper("小一".as_bytes());
            assert_eq!(hex.len(), len);
            assert!(hex.chars().all(|c| c.is_ascii_digit() || c.is_ascii_uppercase()));
        }
    }

    #[test]
    fn parses_algorithm_names() {
        assert_eq!("MD5".parse::<DigestAlgorithm>(), Ok(DigestAlgorithm::Md5));
        assert_eq!("sha-256".parse::<DigestAlgorithm>(), Ok(DigestAlgorithm::Sha256));
        assert_eq!(" sha512 ".parse::<DigestAlgorithm>(), Ok(DigestAlgorithm::Sha512));
        let err = "crc32".parse::<DigestAlgorithm>().unwrap_err();
        assert!(format!("{err}").contains("crc32"));
    }

    #[test]
    fn deserializes_lowercase_names() {
        let algorithm: DigestAlgorithm = serde_json::from_str("\"sha256\"").expect("valid name");
        assert_eq!(algorithm, DigestAlgorithm::Sha256);
        assert_eq!(DigestAlgorithm::default(), DigestAlgorithm::Md5);
    }
}
