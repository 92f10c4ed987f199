//! Registry of supported content-reduction algorithms.
//!
//! # Overview
//!
//! [`Algorithm`] is a closed set of digest functions, from cheap checksums
//! (CRC, Adler) through general-purpose hashes (FNV-1a, MD5) to cryptographic
//! hashes (SHA family). Each variant has a stable lowercase identifier used for
//! selection on the command line and in config files, a display name, and an
//! output width.
//!
//! [`Algorithm::create`] returns a fresh [`ContentHasher`]. Hashers are
//! stateful accumulators and must never be shared between files.
//!
//! # Example
//!
//! ```
//! use dupegroup::scanner::Algorithm;
//!
//! let algo: Algorithm = "SHA256".parse().unwrap();
//! assert_eq!(algo, Algorithm::Sha256);
//!
//! let mut hasher = algo.create();
//! hasher.update(b"hello");
//! assert_eq!(hasher.finalize_hex().len(), 64);
//! ```

use std::fmt;
use std::str::FromStr;

use crc::{Crc, CRC_32_ISCSI, CRC_64_GO_ISO};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::Digest;

static CRC32_CASTAGNOLI: Crc<u32> = Crc::<u32>::new(&CRC_32_ISCSI);
static CRC64_ISO: Crc<u64> = Crc::<u64>::new(&CRC_64_GO_ISO);

/// A supported digest algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum Algorithm {
    /// CRC-32 with the Castagnoli polynomial
    Crc32,
    /// CRC-64 with the ISO polynomial
    Crc64,
    /// Adler-32 checksum
    Adler32,
    /// 64-bit FNV-1a
    Fnv1a,
    /// MD5
    Md5,
    /// SHA-1
    Sha1,
    /// SHA-256
    #[default]
    Sha256,
    /// SHA-512
    Sha512,
}

impl Algorithm {
    /// Every supported algorithm, in declaration order.
    pub const ALL: [Algorithm; 8] = [
        Algorithm::Crc32,
        Algorithm::Crc64,
        Algorithm::Adler32,
        Algorithm::Fnv1a,
        Algorithm::Md5,
        Algorithm::Sha1,
        Algorithm::Sha256,
        Algorithm::Sha512,
    ];

    /// Stable lowercase token used to select the algorithm.
    #[must_use]
    pub fn identifier(self) -> &'static str {
        match self {
            Self::Crc32 => "crc32",
            Self::Crc64 => "crc64",
            Self::Adler32 => "adler32",
            Self::Fnv1a => "fnv1a",
            Self::Md5 => "md5",
            Self::Sha1 => "sha1",
            Self::Sha256 => "sha256",
            Self::Sha512 => "sha512",
        }
    }

    /// Human-readable name for presentation.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Crc32 => "CRC-32 (Castagnoli)",
            Self::Crc64 => "CRC-64 (ISO)",
            Self::Adler32 => "Adler-32",
            Self::Fnv1a => "FNV-1a (64 bit)",
            Self::Md5 => "MD5",
            Self::Sha1 => "SHA-1",
            Self::Sha256 => "SHA-256",
            Self::Sha512 => "SHA-512",
        }
    }

    /// Digest width in bytes.
    #[must_use]
    pub fn output_len(self) -> usize {
        match self {
            Self::Crc32 | Self::Adler32 => 4,
            Self::Crc64 | Self::Fnv1a => 8,
            Self::Md5 => 16,
            Self::Sha1 => 20,
            Self::Sha256 => 32,
            Self::Sha512 => 64,
        }
    }

    /// Whether the algorithm is a collision-resistant cryptographic hash.
    ///
    /// Only the SHA-2 family qualifies. Checksums and FNV are built for error
    /// detection; MD5 and SHA-1 have practical collision attacks.
    #[must_use]
    pub fn is_cryptographic(self) -> bool {
        matches!(self, Self::Sha256 | Self::Sha512)
    }

    /// Create a fresh hasher for this algorithm.
    #[must_use]
    pub fn create(self) -> ContentHasher {
        let state = match self {
            Self::Crc32 => HasherState::Crc32(CRC32_CASTAGNOLI.digest()),
            Self::Crc64 => HasherState::Crc64(CRC64_ISO.digest()),
            Self::Adler32 => HasherState::Adler32(adler2::Adler32::new()),
            Self::Fnv1a => HasherState::Fnv1a(fnv::FnvHasher::default()),
            Self::Md5 => HasherState::Md5(md5::Md5::new()),
            Self::Sha1 => HasherState::Sha1(sha1::Sha1::new()),
            Self::Sha256 => HasherState::Sha256(sha2::Sha256::new()),
            Self::Sha512 => HasherState::Sha512(sha2::Sha512::new()),
        };
        ContentHasher {
            algorithm: self,
            state,
        }
    }

    /// All identifiers, sorted lexicographically.
    #[must_use]
    pub fn identifiers() -> Vec<&'static str> {
        let mut ids: Vec<&'static str> = Self::ALL.iter().map(|a| a.identifier()).collect();
        ids.sort_unstable();
        ids
    }

    /// Resolve an identifier by exact, case-insensitive match.
    ///
    /// # Errors
    ///
    /// Returns [`AlgorithmError::Unknown`] listing every valid identifier.
    pub fn resolve(identifier: &str) -> Result<Self, AlgorithmError> {
        Self::ALL
            .iter()
            .copied()
            .find(|a| a.identifier().eq_ignore_ascii_case(identifier))
            .ok_or_else(|| AlgorithmError::Unknown {
                given: identifier.to_string(),
                choices: Self::identifiers().join(", "),
            })
    }

    /// Closest identifier to an unknown token, if any is reasonably close.
    #[must_use]
    pub fn suggest(identifier: &str) -> Option<&'static str> {
        let wanted = identifier.trim().to_ascii_lowercase();
        Self::ALL
            .iter()
            .map(|a| (a.identifier(), strsim::jaro_winkler(&wanted, a.identifier())))
            .filter(|(_, score)| *score > 0.8)
            .max_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(id, _)| id)
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Algorithm {
    type Err = AlgorithmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::resolve(s)
    }
}

impl Serialize for Algorithm {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.identifier())
    }
}

impl<'de> Deserialize<'de> for Algorithm {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let token = String::deserialize(deserializer)?;
        Self::resolve(&token).map_err(serde::de::Error::custom)
    }
}

/// Errors from algorithm selection.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum AlgorithmError {
    /// The identifier does not name a supported algorithm.
    #[error("unknown algorithm '{given}'; try one of: {choices}")]
    Unknown {
        /// The token as given by the user
        given: String,
        /// Valid identifiers, sorted and comma-separated
        choices: String,
    },
}

enum HasherState {
    Crc32(crc::Digest<'static, u32>),
    Crc64(crc::Digest<'static, u64>),
    Adler32(adler2::Adler32),
    Fnv1a(fnv::FnvHasher),
    Md5(md5::Md5),
    Sha1(sha1::Sha1),
    Sha256(sha2::Sha256),
    Sha512(sha2::Sha512),
}

/// Streaming digest accumulator for a single file.
pub struct ContentHasher {
    algorithm: Algorithm,
    state: HasherState,
}

impl ContentHasher {
    /// The algorithm this hasher computes.
    #[must_use]
    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// Feed more bytes.
    pub fn update(&mut self, data: &[u8]) {
        match &mut self.state {
            HasherState::Crc32(d) => d.update(data),
            HasherState::Crc64(d) => d.update(data),
            HasherState::Adler32(d) => d.write_slice(data),
            HasherState::Fnv1a(d) => std::hash::Hasher::write(d, data),
            HasherState::Md5(d) => d.update(data),
            HasherState::Sha1(d) => d.update(data),
            HasherState::Sha256(d) => d.update(data),
            HasherState::Sha512(d) => d.update(data),
        }
    }

    /// Consume the hasher and return the raw digest bytes.
    ///
    /// Integer checksums are returned big-endian.
    #[must_use]
    pub fn finalize(self) -> Vec<u8> {
        match self.state {
            HasherState::Crc32(d) => d.finalize().to_be_bytes().to_vec(),
            HasherState::Crc64(d) => d.finalize().to_be_bytes().to_vec(),
            HasherState::Adler32(d) => d.checksum().to_be_bytes().to_vec(),
            HasherState::Fnv1a(d) => std::hash::Hasher::finish(&d).to_be_bytes().to_vec(),
            HasherState::Md5(d) => d.finalize().to_vec(),
            HasherState::Sha1(d) => d.finalize().to_vec(),
            HasherState::Sha256(d) => d.finalize().to_vec(),
            HasherState::Sha512(d) => d.finalize().to_vec(),
        }
    }

    /// Consume the hasher and return the rendered digest.
    #[must_use]
    pub fn finalize_hex(self) -> String {
        render_digest(&self.finalize())
    }
}

impl fmt::Debug for ContentHasher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContentHasher")
            .field("algorithm", &self.algorithm)
            .finish_non_exhaustive()
    }
}

/// Render digest bytes as lowercase hex with no prefix or separators.
#[must_use]
pub fn render_digest(bytes: &[u8]) -> String {
    hex::encode(bytes)
}
