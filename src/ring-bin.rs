use shard_ring::core::{
	config::*,
	HashMethod,
	HashRing
};
use clap::Parser;
use inquire::{Text, CustomUserError};
use anyhow::anyhow;
use log::info;

#[derive(Parser)]
struct Args {
	/// Initial nodes, added in order
	nodes: Vec<String>,

	/// Virtual points per node
	#[clap(short, long, default_value_t = DEFAULT_REPLICAS)]
	replicas: usize,

	/// Hash method (crc32, md5, sha1 or murmur)
	#[clap(short = 'm', long, default_value = "crc32")]
	hash_method: String
}

const COMMANDS: [&str; 6] = [
	"get",
	"pos",
	"owners",
	"add",
	"remove",
	"nodes"
];

fn suggest_command(v: &str) -> Result<Vec<String>, CustomUserError> {
	let mut result = Vec::new();
	for command in COMMANDS {
		if v.len() > 0 && command.starts_with(v) {
			result.push(command.to_string());
		}
	}
	Ok(result)
}

fn complete_command(v: &str) -> Result<Option<String>, CustomUserError> {
	let result = suggest_command(v)?;
	let command = if result.len() > 0 {
		Some(result[0].clone() + " ")
	}
	else {
		None
	};
	Ok(command)
}

fn execute_command(ring: &HashRing<String>, command: &str) -> anyhow::Result<()> {
	let words: Vec<_> = command.split_whitespace().collect();
	if words.len() == 0 {
		return Err(anyhow!("invalid command"));
	}

	match words[0] {
		"get" => {
			if words.len() != 2 {
				return Err(anyhow!("get: invalid number of arguments"));
			}
			match ring.get_node(words[1]) {
				Some(node) => println!("{}", node),
				None => return Err(anyhow!("get: ring is empty"))
			};
		},
		"pos" => {
			if words.len() != 2 {
				return Err(anyhow!("pos: invalid number of arguments"));
			}
			match ring.get_node_pos(words[1]) {
				Some((node, pos)) => println!("{} at {} (key fingerprint {})", node, pos, ring.fingerprint(words[1])),
				None => return Err(anyhow!("pos: ring is empty"))
			};
		},
		"owners" => {
			if words.len() < 2 || words.len() > 3 {
				return Err(anyhow!("owners: invalid number of arguments"));
			}
			if words.len() == 3 {
				let count: usize = words[2].parse()?;
				for node in ring.get_nodes(words[1], count) {
					println!("{}", node);
				}
			}
			else {
				for (fingerprint, node) in ring.iter_owners(words[1]) {
					println!("{:>40} {}", fingerprint, node);
				}
			}
		},
		"add" => {
			if words.len() != 2 {
				return Err(anyhow!("add: invalid number of arguments"));
			}
			ring.add_node(words[1].to_string())?;
		},
		"remove" => {
			if words.len() != 2 {
				return Err(anyhow!("remove: invalid number of arguments"));
			}
			ring.remove_node(&words[1].to_string())?;
		},
		"nodes" => {
			for node in ring.nodes() {
				println!("{}", node);
			}
			println!("{} nodes, {} points", ring.node_count(), ring.point_count());
		},
		_ => {
			return Err(anyhow!("invalid command"));
		}
	};
	Ok(())
}


fn main() -> anyhow::Result<()> {
	env_logger::init();
	let args = Args::parse();

	let config = Config {
		replicas: args.replicas,
		hash_method: args.hash_method.parse::<HashMethod>()?
	};
	let ring = HashRing::with_nodes(config, args.nodes)?;
	info!("ring ready: {} nodes, {} points, {} hashing", ring.node_count(), ring.point_count(), ring.hash_name());

	loop {
		let command = Text::new("")
			.with_suggester(&suggest_command)
			.with_completer(&complete_command)
			.prompt()?;

		match execute_command(&ring, &command) {
			Ok(_) => (),
			Err(e) => println!("Error: {}", e)
		};
	}
}
