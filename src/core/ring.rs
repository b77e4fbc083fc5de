use std::fmt::Display;
use super::hash::HashFunction;

/// Position of a key or virtual point on the ring
pub type Fingerprint = u128;

// Strictly in range: id in (start, end)
pub fn in_range(id: Fingerprint, start: Fingerprint, end: Fingerprint) -> bool {
	if end > start {
		// (start, id, end)
		id > start && id < end
	}
	else {
		// end <= start
		// case 1: (start, id, end + MAX_VAL)
		// case 2: (start, id + MAX_VAL, end + MAX_VAL)
		id > start || id < end
	}
}

// Arc owned by a virtual point: id in (start, end]
pub fn in_arc(id: Fingerprint, start: Fingerprint, end: Fingerprint) -> bool {
	in_range(id, start, end) || id == end
}

/// Label hashed to place one replica of a node.
///
/// Changing this format moves every virtual point,
/// so rings built with different formats can't be mixed.
pub fn vnode_label<N: Display + ?Sized>(node: &N, index: usize) -> String {
	format!("{}:{}", node, index)
}

/// Fingerprints of all replicas of a node, in replica order
pub fn vnode_fingerprints<N: Display + ?Sized>(
	hasher: &dyn HashFunction,
	node: &N,
	replicas: usize
) -> Vec<Fingerprint> {
	(0..replicas)
		.map(|i| hasher.digest(vnode_label(node, i).as_bytes()))
		.collect()
}
