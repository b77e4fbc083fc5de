//! Sorted index of virtual points.
//!
//! One vector, strictly ascending by fingerprint, is the only record of
//! who owns what: exact owner lookups and successor searches both
//! binary-search it, so the two can never drift apart.

use std::{
	iter::FusedIterator,
	sync::Arc
};
use log::warn;
use super::{
	error::*,
	ring::*,
	RingNode
};

/// One replica of a node placed on the ring
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VirtualPoint<N> {
	pub fingerprint: Fingerprint,
	pub node: N
}

#[derive(Debug, Clone)]
pub struct RingIndex<N> {
	points: Vec<VirtualPoint<N>>,
	// nodes in the order they were added
	nodes: Vec<N>
}

impl<N> Default for RingIndex<N> {
	fn default() -> Self {
		RingIndex {
			points: Vec::new(),
			nodes: Vec::new()
		}
	}
}

impl<N: RingNode> RingIndex<N> {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn is_empty(&self) -> bool {
		self.points.is_empty()
	}

	/// Number of virtual points
	pub fn len(&self) -> usize {
		self.points.len()
	}

	pub fn node_count(&self) -> usize {
		self.nodes.len()
	}

	pub fn nodes(&self) -> &[N] {
		&self.nodes
	}

	pub fn points(&self) -> &[VirtualPoint<N>] {
		&self.points
	}

	pub fn contains(&self, node: &N) -> bool {
		self.nodes.contains(node)
	}

	pub fn point(&self, pos: usize) -> Option<&VirtualPoint<N>> {
		self.points.get(pos)
	}

	/// Owner of the point at exactly this fingerprint
	pub fn owner_of(&self, fingerprint: Fingerprint) -> Option<&N> {
		self.search(fingerprint)
			.ok()
			.map(|pos| &self.points[pos].node)
	}

	fn search(&self, fingerprint: Fingerprint) -> Result<usize, usize> {
		self.points.binary_search_by(|p| p.fingerprint.cmp(&fingerprint))
	}

	/// Add a node with the fingerprints of all its replicas.
	///
	/// Nothing changes unless every fingerprint is free.
	pub fn insert(&mut self, node: N, fingerprints: &[Fingerprint]) -> RingResult<()> {
		if self.contains(&node) {
			return Err(RingError::DuplicateNode(node.to_string()));
		}

		let mut sorted = fingerprints.to_vec();
		sorted.sort_unstable();
		// two replicas of the same node
		if let Some(pair) = sorted.windows(2).find(|pair| pair[0] == pair[1]) {
			warn!("{}: replicas collide at fingerprint {}", node, pair[0]);
			return Err(RingError::FingerprintCollision {
				fingerprint: pair[0],
				node: node.to_string(),
				owner: node.to_string()
			});
		}
		for &fingerprint in sorted.iter() {
			if let Some(owner) = self.owner_of(fingerprint) {
				warn!("{}: fingerprint {} already owned by {}", node, fingerprint, owner);
				return Err(RingError::FingerprintCollision {
					fingerprint,
					node: node.to_string(),
					owner: owner.to_string()
				});
			}
		}

		self.points.extend(sorted.into_iter().map(|fingerprint| VirtualPoint {
			fingerprint,
			node: node.clone()
		}));
		self.points.sort_unstable_by_key(|p| p.fingerprint);
		self.nodes.push(node);
		Ok(())
	}

	/// Remove a node given the same fingerprints it was inserted with
	pub fn remove(&mut self, node: &N, fingerprints: &[Fingerprint]) -> RingResult<()> {
		let slot = self.nodes.iter()
			.position(|n| n == node)
			.ok_or_else(|| RingError::NodeNotFound(node.to_string()))?;

		let mut positions = Vec::with_capacity(fingerprints.len());
		for &fingerprint in fingerprints {
			match self.search(fingerprint) {
				Ok(pos) if self.points[pos].node == *node => positions.push(pos),
				_ => {
					warn!("{}: no virtual point at fingerprint {}", node, fingerprint);
					return Err(RingError::MissingPoint {
						fingerprint,
						node: node.to_string()
					});
				}
			}
		}

		positions.sort_unstable();
		positions.dedup();
		// back to front so the remaining positions stay valid
		for pos in positions.into_iter().rev() {
			self.points.remove(pos);
		}
		self.nodes.remove(slot);
		Ok(())
	}

	/// Position of the first point at or after `fingerprint`.
	///
	/// A fingerprint past the last point wraps around to the first one.
	/// Returns `None` only when the ring is empty.
	pub fn locate(&self, fingerprint: Fingerprint) -> Option<usize> {
		if self.points.is_empty() {
			return None;
		}
		let pos = self.points.partition_point(|p| p.fingerprint < fingerprint);
		if pos == self.points.len() {
			Some(0)
		}
		else {
			Some(pos)
		}
	}

	/// Owner of `fingerprint` and the position of its point
	pub fn successor(&self, fingerprint: Fingerprint) -> Option<(&N, usize)> {
		self.locate(fingerprint)
			.map(|pos| (&self.points[pos].node, pos))
	}

	// every point once, clockwise from the successor of `fingerprint`
	fn walk(&self, fingerprint: Fingerprint) -> impl Iterator<Item = &VirtualPoint<N>> {
		let start = self.locate(fingerprint).unwrap_or(0);
		self.points[start..].iter().chain(self.points[..start].iter())
	}

	/// Every point once in ring order, starting at the owner of `fingerprint`
	pub fn owners(self: &Arc<Self>, fingerprint: Fingerprint) -> Owners<N> {
		Owners {
			start: self.locate(fingerprint).unwrap_or(0),
			index: self.clone(),
			visited: 0
		}
	}

	/// Up to `count` distinct nodes in ring order from the owner of `fingerprint`
	pub fn distinct_nodes(&self, fingerprint: Fingerprint, count: usize) -> Vec<N> {
		let wanted = count.min(self.nodes.len());
		let mut found: Vec<N> = Vec::with_capacity(wanted);
		for point in self.walk(fingerprint) {
			if found.len() == wanted {
				break;
			}
			if !found.contains(&point.node) {
				found.push(point.node.clone());
			}
		}
		found
	}

	/// Arcs `(start, end]` of the ring owned by `node`, one per virtual point
	pub fn owned_ranges(&self, node: &N) -> Vec<(Fingerprint, Fingerprint)> {
		let len = self.points.len();
		self.points.iter()
			.enumerate()
			.filter(|(_, p)| p.node == *node)
			.map(|(i, p)| {
				let prev = &self.points[(i + len - 1) % len];
				(prev.fingerprint, p.fingerprint)
			})
			.collect()
	}

	/// Whether a key at `fingerprint` lands on one of `node`'s points
	pub fn owns(&self, node: &N, fingerprint: Fingerprint) -> bool {
		self.owned_ranges(node)
			.into_iter()
			.any(|(start, end)| in_arc(fingerprint, start, end))
	}
}

/// Iterator over every virtual point of a ring snapshot.
///
/// Starts at a key's owner and wraps past the end of the ring,
/// so it always yields exactly one pair per point.
/// Cloning it gives an independent iterator from the current position.
#[derive(Debug, Clone)]
pub struct Owners<N> {
	index: Arc<RingIndex<N>>,
	start: usize,
	visited: usize
}

impl<N> Owners<N> {
	/// Position of the first pair, `None` on an empty ring
	pub fn start(&self) -> Option<usize> {
		if self.index.points.is_empty() {
			None
		}
		else {
			Some(self.start)
		}
	}

	/// Rewind to the first pair
	pub fn restart(&mut self) {
		self.visited = 0;
	}
}

impl<N: RingNode> Iterator for Owners<N> {
	type Item = (Fingerprint, N);

	fn next(&mut self) -> Option<Self::Item> {
		let len = self.index.points.len();
		if self.visited >= len {
			return None;
		}
		let point = &self.index.points[(self.start + self.visited) % len];
		self.visited += 1;
		Some((point.fingerprint, point.node.clone()))
	}

	fn size_hint(&self) -> (usize, Option<usize>) {
		let left = self.index.points.len() - self.visited;
		(left, Some(left))
	}
}

impl<N: RingNode> ExactSizeIterator for Owners<N> {}

impl<N: RingNode> FusedIterator for Owners<N> {}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::core::hash::{Crc32, HashFunction};

	fn index(nodes: Vec<(&str, Vec<Fingerprint>)>) -> RingIndex<String> {
		let mut index = RingIndex::new();
		for (node, fingerprints) in nodes {
			index.insert(node.to_string(), &fingerprints).unwrap();
		}
		index
	}

	#[test]
	fn test_insert_keeps_points_sorted() {
		let index = index(vec![("a", vec![50, 10]), ("b", vec![30, 70])]);
		let fingerprints: Vec<_> = index.points().iter().map(|p| p.fingerprint).collect();
		assert_eq!(fingerprints, vec![10, 30, 50, 70]);
		assert_eq!(index.owner_of(30), Some(&"b".to_string()));
		assert_eq!(index.owner_of(31), None);
		assert_eq!(index.nodes(), &["a".to_string(), "b".to_string()]);
	}

	#[test]
	fn test_locate_ties_and_wraparound() {
		let index = index(vec![("a", vec![10, 50]), ("b", vec![30, 70])]);
		// exact hit owns the key
		assert_eq!(index.locate(30), Some(1));
		assert_eq!(index.locate(31), Some(2));
		assert_eq!(index.locate(0), Some(0));
		// past the last point wraps to the first, not the last
		assert_eq!(index.locate(71), Some(0));
		assert_eq!(index.successor(Fingerprint::MAX), Some((&"a".to_string(), 0)));
	}

	#[test]
	fn test_empty_index() {
		let index: Arc<RingIndex<String>> = Arc::new(RingIndex::new());
		assert_eq!(index.locate(5), None);
		assert_eq!(index.successor(5), None);
		assert!(index.distinct_nodes(5, 3).is_empty());
		let owners = index.owners(5);
		assert_eq!(owners.start(), None);
		assert_eq!(owners.count(), 0);
	}

	#[test]
	fn test_duplicate_node_rejected() {
		let mut index = index(vec![("a", vec![10])]);
		let err = index.insert("a".to_string(), &[20]).unwrap_err();
		assert_eq!(err, RingError::DuplicateNode("a".to_string()));
		assert_eq!(index.len(), 1);
	}

	#[test]
	fn test_collision_leaves_index_unchanged() {
		let mut index = index(vec![("a", vec![10, 20])]);
		let err = index.insert("b".to_string(), &[15, 20]).unwrap_err();
		assert_eq!(err, RingError::FingerprintCollision {
			fingerprint: 20,
			node: "b".to_string(),
			owner: "a".to_string()
		});
		assert_eq!(index.len(), 2);
		assert!(!index.contains(&"b".to_string()));

		// replicas of one node colliding with each other
		let err = index.insert("c".to_string(), &[40, 40]).unwrap_err();
		assert!(matches!(err, RingError::FingerprintCollision { fingerprint: 40, .. }));
		assert_eq!(index.node_count(), 1);
	}

	#[test]
	fn test_remove_is_positional() {
		let mut index = index(vec![("a", vec![10, 50]), ("b", vec![30, 70]), ("c", vec![20, 60])]);
		index.remove(&"b".to_string(), &[30, 70]).unwrap();
		let fingerprints: Vec<_> = index.points().iter().map(|p| p.fingerprint).collect();
		assert_eq!(fingerprints, vec![10, 20, 50, 60]);
		assert_eq!(index.nodes(), &["a".to_string(), "c".to_string()]);
	}

	#[test]
	fn test_remove_errors() {
		let mut index = index(vec![("a", vec![10, 50]), ("b", vec![30])]);
		assert_eq!(
			index.remove(&"z".to_string(), &[10]),
			Err(RingError::NodeNotFound("z".to_string()))
		);
		// fingerprint owned by someone else
		assert_eq!(
			index.remove(&"a".to_string(), &[10, 30]),
			Err(RingError::MissingPoint { fingerprint: 30, node: "a".to_string() })
		);
		assert_eq!(index.len(), 3);
	}

	#[test]
	fn test_owners_wraps_from_near_the_end() {
		let index = Arc::new(index(vec![("a", vec![10, 50]), ("b", vec![30, 70])]));
		let owners: Vec<_> = index.owners(60).collect();
		assert_eq!(owners, vec![
			(70, "b".to_string()),
			(10, "a".to_string()),
			(30, "b".to_string()),
			(50, "a".to_string())
		]);

		let mut owners = index.owners(60);
		assert_eq!(owners.len(), 4);
		owners.next();
		let rest = owners.clone();
		assert_eq!(rest.len(), 3);
		owners.restart();
		assert_eq!(owners.count(), 4);
	}

	#[test]
	fn test_distinct_nodes() {
		let index = index(vec![("a", vec![10, 20]), ("b", vec![30]), ("c", vec![40])]);
		assert_eq!(index.distinct_nodes(15, 2), vec!["a".to_string(), "b".to_string()]);
		assert_eq!(index.distinct_nodes(35, 10), vec!["c".to_string(), "a".to_string(), "b".to_string()]);
	}

	#[test]
	fn test_owned_ranges() {
		let index = index(vec![("a", vec![10, 50]), ("b", vec![30, 70])]);
		assert_eq!(index.owned_ranges(&"a".to_string()), vec![(70, 10), (30, 50)]);
		assert!(index.owns(&"a".to_string(), 5));
		assert!(index.owns(&"a".to_string(), 80));
		assert!(index.owns(&"a".to_string(), 50));
		assert!(!index.owns(&"a".to_string(), 30));
	}

	mod property_tests {
		use super::*;
		use proptest::prelude::*;

		proptest! {
			/// points == replicas * nodes after any add/remove sequence
			#[test]
			fn prop_point_count_matches_nodes(
				replicas in 1usize..16,
				ops in prop::collection::vec((0u8..8, any::<bool>()), 0..64)
			) {
				let mut index = RingIndex::new();
				for (id, add) in ops {
					let node = format!("node-{}", id);
					let fingerprints = vnode_fingerprints(&Crc32 as &dyn HashFunction, &node, replicas);
					let _ = if add {
						index.insert(node, &fingerprints)
					} else {
						index.remove(&node, &fingerprints)
					};
					prop_assert_eq!(index.len(), replicas * index.node_count());
					prop_assert!(index.points().windows(2).all(|w| w[0].fingerprint < w[1].fingerprint));
				}
			}
		}
	}
}
