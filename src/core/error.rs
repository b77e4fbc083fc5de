use thiserror::Error;
use std::result::Result;
use super::ring::Fingerprint;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RingError {
	#[error("Unknown hash method {0:?}")]
	UnknownHashMethod(String),
	#[error("Number of replicas must be positive")]
	InvalidReplicas,
	#[error("Node {0} is already on the ring")]
	DuplicateNode(String),
	#[error("Node {0} is not on the ring")]
	NodeNotFound(String),
	#[error("Fingerprint {fingerprint} of node {node} collides with node {owner}")]
	FingerprintCollision {
		fingerprint: Fingerprint,
		node: String,
		owner: String
	},
	#[error("Virtual point {fingerprint} of node {node} is missing from the ring")]
	MissingPoint {
		fingerprint: Fingerprint,
		node: String
	}
}

impl RingError {
	/// Whether the error comes from how the ring was configured
	/// rather than from a topology change
	pub fn is_configuration(&self) -> bool {
		matches!(self, RingError::UnknownHashMethod(_) | RingError::InvalidReplicas)
	}
}

pub type RingResult<T> = Result<T, RingError>;
