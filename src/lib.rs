//! Consistent hashing for routing keys to the nodes of a sharded data store.
//!
//! ```
//! use shard_ring::core::{Config, HashRing};
//!
//! let ring = HashRing::with_nodes(Config::default(), vec!["redis-a", "redis-b", "redis-c"]).unwrap();
//! let owner = ring.get_node("user:42").unwrap();
//! assert!(["redis-a", "redis-b", "redis-c"].contains(&owner));
//! ```

pub mod core;
