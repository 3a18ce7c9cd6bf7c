mod print_error;

use std::{collections::HashSet, path::PathBuf, process::ExitCode};
use clap::Parser;
use log::info;
use print_error::PrintError;
use shared::{VecMinMax, VecMinMaxFromIterator};
use tr_reader::{model::{Level, Mesh, TEXTILE_SIZE}, Version};

/// Decodes a Tomb Raider level file and prints what it holds.
#[derive(Parser)]
#[command(name = "tr_dump")]
struct Args {
	/// Level file
	path: PathBuf,
	/// Layout to decode: tr1, tr1-demo, tr1-ub, tr2, tr2-demo, tr3, tr4, tr4-demo or tr5
	#[arg(long)]
	version: Version,
	/// Fill in 32-bit textiles from the 8 or 16-bit ones
	#[arg(long)]
	normalize: bool,
}

fn print_summary(level: &Level) {
	let rooms = &level.rooms;
	println!("version: {}", level.version);
	println!(
		"{}x{} textiles: {} total, {} 8-bit, {} 16-bit, {} 32-bit",
		TEXTILE_SIZE,
		TEXTILE_SIZE,
		level.num_textiles(),
		level.textiles8.len(),
		level.textiles16.len(),
		level.textiles32.len(),
	);
	println!(
		"rooms: {} ({} water), {} vertices, {} rectangles, {} triangles, {} portals, {} lights",
		rooms.len(),
		rooms.iter().filter(|r| r.flags.water()).count(),
		rooms.iter().map(|r| r.vertices.len()).sum::<usize>(),
		rooms.iter().map(|r| r.rectangles.len()).sum::<usize>(),
		rooms.iter().map(|r| r.triangles.len()).sum::<usize>(),
		rooms.iter().map(|r| r.portals.len()).sum::<usize>(),
		rooms.iter().map(|r| r.lights.len()).sum::<usize>(),
	);
	let bounds = rooms
		.iter()
		.flat_map(|r| r.vertices.iter().map(move |v| r.offset + v.position))
		.min_max();
	if let Some(bounds) = bounds {
		println!("world bounds: {} to {}", bounds.min, bounds.max);
	}
	println!("meshes: {} decoded, {} pointers", level.meshes.len(), level.mesh_indices.len());
	let mesh_bounds = level.meshes.iter().filter_map(Mesh::bounds).flat_map(|b| [b.min, b.max]).min_max();
	if let Some(mesh_bounds) = mesh_bounds {
		println!("mesh bounds: {} to {}", mesh_bounds.min, mesh_bounds.max);
	}
	let coloured = level
		.meshes
		.iter()
		.flat_map(|m| {
			let rectangles = m.coloured_rectangles.iter().map(|f| f.texture);
			rectangles.chain(m.coloured_triangles.iter().map(|f| f.texture))
		})
		.collect::<Vec<_>>();
	if !coloured.is_empty() {
		let colours = coloured
			.iter()
			.filter_map(|&texture| level.face_colour(texture))
			.map(|c| c.to_rgba32())
			.collect::<HashSet<_>>();
		println!("coloured faces: {} using {} palette colours", coloured.len(), colours.len());
	}
	println!(
		"moveables: {} ({} without a decoded frame), {} frames, {} animations, {} mesh tree nodes",
		level.moveables.len(),
		level.moveables.iter().filter(|m| m.frame_index.is_none()).count(),
		level.frames.len(),
		level.animations.len(),
		level.mesh_trees.len(),
	);
	println!("static meshes: {}", level.static_meshes.len());
	println!(
		"textures: {} object, {} sprite, {} sprite sequences",
		level.object_textures.len(),
		level.sprite_textures.len(),
		level.sprite_sequences.len(),
	);
	match bounds {
		Some(bounds) => println!(
			"items: {} ({} outside room geometry)",
			level.items.len(),
			level.items.iter().filter(|i| !bounds.contains_point(i.position)).count(),
		),
		None => println!("items: {}", level.items.len()),
	}
	if let Some(flags) = level.tr5_flags {
		println!("lara type: {}, weather: {}", flags.lara_type, flags.weather);
	}
	println!("skipped: {:?}", level.skipped);
}

fn main() -> ExitCode {
	env_logger::init();
	let args = Args::parse();
	let msg = format!("failed to decode {} as {}", args.path.display(), args.version);
	let Some(mut level) = tr_reader::decode_file(&args.path, args.version).print_err(msg) else {
		return ExitCode::FAILURE;
	};
	if args.normalize {
		tr_reader::normalize(&mut level);
		info!("normalized to {} 32-bit textiles", level.textiles32.len());
	}
	print_summary(&level);
	ExitCode::SUCCESS
}
