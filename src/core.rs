pub mod config;
pub mod error;
pub mod hash;
pub mod hash_ring;
pub mod index;
pub mod ring;

pub use config::*;
pub use error::*;
pub use hash::*;
pub use hash_ring::*;
pub use index::*;
pub use ring::Fingerprint;

use std::fmt::Display;

/// Anything that can own keys on the ring.
///
/// The `Display` form names the node's virtual points,
/// so it must be stable across processes and restarts.
pub trait RingNode: Clone + Eq + Display + Send + Sync + 'static {}

impl<T> RingNode for T where T: Clone + Eq + Display + Send + Sync + 'static {}
