//! Hash strategies that place keys and virtual points on the ring.
//!
//! Every strategy must be a pure function of its input: two clients that
//! disagree on a fingerprint disagree on which node owns the key.

use std::{
	fmt::{self, Debug, Display},
	str::FromStr,
	sync::Arc
};
use md5::Md5;
use serde::{Deserialize, Serialize};
use sha1::{Digest, Sha1};
use super::{
	error::*,
	ring::Fingerprint
};

/// Seed used by the murmur strategy
pub const MURMUR_SEED: u64 = 0x1234ABCD;

/// Maps arbitrary bytes to a fingerprint
pub trait HashFunction: Send + Sync + Debug {
	/// Name shown in logs and by the cli
	fn name(&self) -> &str;

	fn digest(&self, data: &[u8]) -> Fingerprint;
}

/// CRC-32 (IEEE) checksum
#[derive(Debug, Clone, Copy, Default)]
pub struct Crc32;

impl HashFunction for Crc32 {
	fn name(&self) -> &str {
		"crc32"
	}

	fn digest(&self, data: &[u8]) -> Fingerprint {
		crc32fast::hash(data) as Fingerprint
	}
}

/// Full 128-bit MD5 digest read as a big-endian integer
#[derive(Debug, Clone, Copy, Default)]
pub struct Md5Digest;

impl HashFunction for Md5Digest {
	fn name(&self) -> &str {
		"md5"
	}

	fn digest(&self, data: &[u8]) -> Fingerprint {
		let digest = Md5::digest(data);
		leading_bits(&digest)
	}
}

/// SHA-1 digest reduced to its leading 128 bits
#[derive(Debug, Clone, Copy, Default)]
pub struct Sha1Digest;

impl HashFunction for Sha1Digest {
	fn name(&self) -> &str {
		"sha1"
	}

	fn digest(&self, data: &[u8]) -> Fingerprint {
		let digest = Sha1::digest(data);
		leading_bits(&digest)
	}
}

/// MurmurHash64A folded from the signed 64-bit domain
#[derive(Debug, Clone, Copy)]
pub struct Murmur {
	seed: u64
}

impl Murmur {
	pub fn new(seed: u64) -> Self {
		Murmur { seed }
	}
}

impl Default for Murmur {
	fn default() -> Self {
		Murmur::new(MURMUR_SEED)
	}
}

impl HashFunction for Murmur {
	fn name(&self) -> &str {
		"murmur"
	}

	fn digest(&self, data: &[u8]) -> Fingerprint {
		fold_signed(murmur2::murmur64a(data, self.seed))
	}
}

/// Read a 64-bit hash as a signed long and shift it into the unsigned domain.
///
/// Values above `i64::MAX` become negative first, so the fold keeps the
/// ordering a signed 64-bit comparison would give: `i64::MIN` maps to 0
/// and `i64::MAX` maps to `u64::MAX`.
pub fn fold_signed(value: u64) -> Fingerprint {
	let signed = value as i64;
	(signed as i128 - i64::MIN as i128) as Fingerprint
}

// big-endian integer from the first 16 bytes of a digest
fn leading_bits(digest: &[u8]) -> Fingerprint {
	let mut bytes = [0u8; 16];
	bytes.copy_from_slice(&digest[..16]);
	Fingerprint::from_be_bytes(bytes)
}

/// Built-in hash strategies, selectable by name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum HashMethod {
	#[default]
	Crc32,
	Md5,
	Sha1,
	Murmur
}

impl HashMethod {
	pub const ALL: [HashMethod; 4] = [
		HashMethod::Crc32,
		HashMethod::Md5,
		HashMethod::Sha1,
		HashMethod::Murmur
	];

	pub fn name(&self) -> &'static str {
		match self {
			HashMethod::Crc32 => "crc32",
			HashMethod::Md5 => "md5",
			HashMethod::Sha1 => "sha1",
			HashMethod::Murmur => "murmur"
		}
	}

	/// Instantiate the strategy
	pub fn build(&self) -> Arc<dyn HashFunction> {
		match self {
			HashMethod::Crc32 => Arc::new(Crc32),
			HashMethod::Md5 => Arc::new(Md5Digest),
			HashMethod::Sha1 => Arc::new(Sha1Digest),
			HashMethod::Murmur => Arc::new(Murmur::default())
		}
	}
}

impl Display for HashMethod {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.name())
	}
}

impl FromStr for HashMethod {
	type Err = RingError;

	fn from_str(s: &str) -> RingResult<Self> {
		HashMethod::ALL
			.into_iter()
			.find(|m| m.name() == s)
			.ok_or_else(|| RingError::UnknownHashMethod(s.to_string()))
	}
}

impl TryFrom<String> for HashMethod {
	type Error = RingError;

	fn try_from(s: String) -> RingResult<Self> {
		s.parse()
	}
}

impl From<HashMethod> for String {
	fn from(method: HashMethod) -> Self {
		method.name().to_string()
	}
}
