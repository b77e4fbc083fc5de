use shard_ring::core::{
	Fingerprint,
	HashRing,
	RingNode
};
use rand::Rng;

pub fn init_logger() {
	let _ = env_logger::builder().is_test(true).try_init();
}

// Random 8-byte keys
pub fn sample_keys<T: Rng>(rng: &mut T, count: usize) -> Vec<Vec<u8>> {
	(0..count)
		.map(|_| Vec::from(rng.gen::<[u8; 8]>()))
		.collect()
}

// Generate key whose fingerprint is above `start`
pub fn generate_key_above<T: Rng, N: RingNode>(
	rng: &mut T,
	ring: &HashRing<N>,
	start: Fingerprint
) -> Vec<u8> {
	loop {
		let key = rng.gen::<[u8; 8]>();
		if ring.fingerprint(&key) > start {
			return Vec::from(key);
		}
	}
}

pub fn owners<N: RingNode>(ring: &HashRing<N>, keys: &[Vec<u8>]) -> Vec<N> {
	keys.iter()
		.map(|key| ring.get_node(key).expect("ring is not empty"))
		.collect()
}
