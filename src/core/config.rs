use std::default::Default;
use serde::{Deserialize, Serialize};
use super::{
	error::*,
	hash::HashMethod
};

/// Virtual points per node unless configured otherwise
pub const DEFAULT_REPLICAS: usize = 128;
/// Virtual points per node for the murmur preset
pub const MURMUR_REPLICAS: usize = 160;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
	// number of virtual points per node
	pub replicas: usize,
	pub hash_method: HashMethod
}

impl Config {
	/// 160 murmur-placed points per node
	pub fn murmur() -> Self {
		Self {
			replicas: MURMUR_REPLICAS,
			hash_method: HashMethod::Murmur
		}
	}

	pub fn validate(&self) -> RingResult<()> {
		if self.replicas == 0 {
			return Err(RingError::InvalidReplicas);
		}
		Ok(())
	}
}

impl Default for Config {
	fn default() -> Self {
		Self {
			replicas: DEFAULT_REPLICAS,
			hash_method: HashMethod::Crc32
		}
	}
}
