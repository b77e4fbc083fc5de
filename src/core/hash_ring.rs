//! Consistent hash ring shared between threads.
//!
//! Lookups never wait on a topology change: every change builds a new
//! [`RingIndex`] on the side and publishes it by swapping an `Arc`.
//! Readers clone the `Arc` of whatever snapshot is current and work on it
//! without holding any lock.

use std::sync::Arc;
use log::debug;
use parking_lot::{Mutex, RwLock};
use super::{
	config::*,
	error::*,
	hash::HashFunction,
	index::*,
	ring::*,
	RingNode
};

/// A key whose owner differs between two snapshots
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reassignment<K, N> {
	pub key: K,
	pub from: N,
	pub to: N
}

#[derive(Debug)]
pub struct HashRing<N> {
	hasher: Arc<dyn HashFunction>,
	replicas: usize,
	current: RwLock<Arc<RingIndex<N>>>,
	// serializes add/remove
	update: Mutex<()>
}

impl<N: RingNode> HashRing<N> {
	/// Empty ring. Fails if the config is invalid.
	pub fn new(config: Config) -> RingResult<Self> {
		config.validate()?;
		Self::with_hasher(config.replicas, config.hash_method.build())
	}

	/// Ring holding `nodes`, added in order
	pub fn with_nodes<I>(config: Config, nodes: I) -> RingResult<Self>
	where
		I: IntoIterator<Item = N>
	{
		let ring = Self::new(config)?;
		// build once and publish once
		let mut index = RingIndex::new();
		for node in nodes {
			let fingerprints = vnode_fingerprints(ring.hasher.as_ref(), &node, ring.replicas);
			index.insert(node, &fingerprints)?;
		}
		debug!("ring built with {} nodes ({} points)", index.node_count(), index.len());
		ring.publish(index);
		Ok(ring)
	}

	/// Empty ring placing keys with a custom hash function
	pub fn with_hasher(replicas: usize, hasher: Arc<dyn HashFunction>) -> RingResult<Self> {
		if replicas == 0 {
			return Err(RingError::InvalidReplicas);
		}
		Ok(HashRing {
			hasher,
			replicas,
			current: RwLock::new(Arc::new(RingIndex::new())),
			update: Mutex::new(())
		})
	}

	/// Place `replicas` virtual points for `node`
	pub fn add_node(&self, node: N) -> RingResult<()> {
		let _guard = self.update.lock();
		let fingerprints = vnode_fingerprints(self.hasher.as_ref(), &node, self.replicas);
		let mut next = RingIndex::clone(&self.snapshot());
		next.insert(node.clone(), &fingerprints)?;
		debug!("{}: added to ring ({} points)", node, next.len());
		self.publish(next);
		Ok(())
	}

	/// Remove every virtual point of `node`
	pub fn remove_node(&self, node: &N) -> RingResult<()> {
		let _guard = self.update.lock();
		// placement is a pure function of the node, so the points can be recomputed
		let fingerprints = vnode_fingerprints(self.hasher.as_ref(), node, self.replicas);
		let mut next = RingIndex::clone(&self.snapshot());
		next.remove(node, &fingerprints)?;
		debug!("{}: removed from ring ({} points)", node, next.len());
		self.publish(next);
		Ok(())
	}

	fn publish(&self, index: RingIndex<N>) {
		*self.current.write() = Arc::new(index);
	}

	/// The ring as it is right now.
	/// Later changes don't affect the returned snapshot.
	pub fn snapshot(&self) -> Arc<RingIndex<N>> {
		self.current.read().clone()
	}

	pub fn fingerprint<K: AsRef<[u8]>>(&self, key: K) -> Fingerprint {
		self.hasher.digest(key.as_ref())
	}

	/// Node owning `key`, `None` on an empty ring
	pub fn get_node<K: AsRef<[u8]>>(&self, key: K) -> Option<N> {
		self.get_node_pos(key).map(|(node, _)| node)
	}

	/// Node owning `key` and the position of its virtual point,
	/// `None` on an empty ring
	pub fn get_node_pos<K: AsRef<[u8]>>(&self, key: K) -> Option<(N, usize)> {
		let fingerprint = self.fingerprint(key);
		self.snapshot()
			.successor(fingerprint)
			.map(|(node, pos)| (node.clone(), pos))
	}

	/// All virtual points in ring order, starting at the owner of `key`
	pub fn iter_owners<K: AsRef<[u8]>>(&self, key: K) -> Owners<N> {
		let fingerprint = self.fingerprint(key);
		self.snapshot().owners(fingerprint)
	}

	/// Up to `count` distinct nodes for `key`: its owner first,
	/// then the fallbacks in ring order
	pub fn get_nodes<K: AsRef<[u8]>>(&self, key: K, count: usize) -> Vec<N> {
		let fingerprint = self.fingerprint(key);
		self.snapshot().distinct_nodes(fingerprint, count)
	}

	/// Keys whose owner changed since `before`.
	///
	/// Only keys that had an owner in both rings are reported.
	pub fn reassignments<K>(&self, before: &RingIndex<N>, keys: &[K]) -> Vec<Reassignment<K, N>>
	where
		K: AsRef<[u8]> + Clone
	{
		let after = self.snapshot();
		keys.iter()
			.filter_map(|key| {
				let fingerprint = self.fingerprint(key);
				match (before.successor(fingerprint), after.successor(fingerprint)) {
					(Some((from, _)), Some((to, _))) if from != to => Some(Reassignment {
						key: key.clone(),
						from: from.clone(),
						to: to.clone()
					}),
					_ => None
				}
			})
			.collect()
	}

	pub fn contains(&self, node: &N) -> bool {
		self.snapshot().contains(node)
	}

	/// Nodes in the order they were added
	pub fn nodes(&self) -> Vec<N> {
		self.snapshot().nodes().to_vec()
	}

	pub fn node_count(&self) -> usize {
		self.snapshot().node_count()
	}

	pub fn point_count(&self) -> usize {
		self.snapshot().len()
	}

	pub fn replicas(&self) -> usize {
		self.replicas
	}

	pub fn hash_name(&self) -> &str {
		self.hasher.name()
	}
}
