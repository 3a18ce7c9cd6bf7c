use std::io::Read;
use byteorder::{ReadBytesExt, LE};
use glam::vec3;
use log::trace;
use shared::MinMax;
use crate::{
	error::{ensure, ResultExt},
	frame::read_frames_and_moveables,
	generation::Generation,
	mesh::read_mesh_data,
	model::{
		Colour, Item, Level, MeshTree, ObjectTexture, ObjectTextureVertex, SpriteSequence, SpriteTexture, StaticMesh,
		LIGHTMAP_SIZE, PALETTE_SIZE,
	},
	read_boxed_slice_with, read_list,
	stream::{ByteStream, ReadExt, SeekExt},
	DecodeError, Readable, Result, Step,
};

/// Highest textile index a texture may reference.
pub(crate) const MAX_TILE: u16 = 64;

/// Older intensities count down from 8191; this flips them to count up.
pub(crate) fn rescale_intensity(v: i32) -> u16 {
	((8191 - v) << 2) as u16
}

/// Rescales only values that are not "use the mesh light" (negative).
pub(crate) fn rescale_if_set(v: i16) -> i16 {
	match v >= 0 {
		true => rescale_intensity(v as i32) as i16,
		false => v,
	}
}

/// Three 6-bit channels, alpha 0.
pub(crate) fn read_colour<R: Read>(reader: &mut R) -> Result<Colour> {
	let r = reader.read_u8()? << 2;
	let g = reader.read_u8()? << 2;
	let b = reader.read_u8()? << 2;
	Ok(Colour { r, g, b, a: 0 })
}

/// Four channels each shifted like `read_colour`.
pub(crate) fn read_colour4<R: Read>(reader: &mut R) -> Result<Colour> {
	let Colour { r, g, b, .. } = read_colour(reader)?;
	let a = reader.read_u8()? << 2;
	Ok(Colour { r, g, b, a })
}

pub(crate) fn read_palette<R: Read>(reader: &mut R) -> Result<Box<[Colour]>> {
	read_boxed_slice_with(reader, PALETTE_SIZE, read_colour)
}

pub(crate) fn read_palette16<R: Read>(reader: &mut R) -> Result<Box<[Colour]>> {
	read_boxed_slice_with(reader, PALETTE_SIZE, read_colour4)
}

pub(crate) fn read_lightmap<R: Read>(reader: &mut R) -> Result<Box<[u8]>> {
	Ok(reader.read_bytes(LIGHTMAP_SIZE)?.into_boxed_slice())
}

/// On-disk rotation, 65536 units per turn, to degrees.
pub(crate) fn read_rotation<R: Read>(reader: &mut R) -> Result<f32> {
	Ok(reader.read_u16::<LE>()? as f32 / 16384.0 * -90.0)
}

/// Reads a count and seeks past that many fixed-size records.
pub(crate) fn skip_u32_records<S: ByteStream>(stream: &mut S, record_size: u64, what: &str) -> Result<u32> {
	let count = stream.read_u32::<LE>()?;
	trace!("skipping {} {} ({} bytes each)", count, what, record_size);
	stream.skip_bytes(count as u64 * record_size)?;
	Ok(count)
}

pub(crate) fn skip_u16_records<S: ByteStream>(stream: &mut S, record_size: u64, what: &str) -> Result<u32> {
	let count = stream.read_u16::<LE>()?;
	trace!("skipping {} {} ({} bytes each)", count, what, record_size);
	stream.skip_bytes(count as u64 * record_size)?;
	Ok(count as u32)
}

/// Records with a per-generation layout, behind a u32 count.
pub(crate) fn read_u32_list_with<R: Read, T>(reader: &mut R, read: fn(&mut R) -> Result<T>) -> Result<Box<[T]>> {
	let count = reader.read_u32::<LE>()? as usize;
	read_boxed_slice_with(reader, count, read)
}

fn read_bounding_box<R: Read>(reader: &mut R) -> Result<MinMax<glam::Vec3>> {
	let [x0, x1, y0, y1, z0, z1] = <[i16; 6]>::read(reader)?;
	Ok(MinMax {
		min: vec3(x0 as f32, -(y0 as f32), -(z0 as f32)),
		max: vec3(x1 as f32, -(y1 as f32), -(z1 as f32)),
	})
}

pub(crate) fn read_static_mesh<R: Read>(reader: &mut R) -> Result<StaticMesh> {
	Ok(StaticMesh {
		object_id: reader.read_u32::<LE>()?,
		mesh: reader.read_u16::<LE>()?,
		visibility_box: read_bounding_box(reader)?,
		collision_box: read_bounding_box(reader)?,
		flags: reader.read_u16::<LE>()?,
	})
}

pub(crate) fn read_mesh_trees<R: Read>(reader: &mut R) -> Result<Box<[MeshTree]>> {
	let num_words = reader.read_u32::<LE>()?;
	ensure!(num_words % 4 == 0, "mesh tree data of {} words is not a multiple of 4", num_words);
	read_boxed_slice_with(reader, num_words as usize / 4, |reader| {
		let flags = reader.read_u32::<LE>()?;
		let offset = reader.read_vertex32()?;
		Ok(MeshTree { flags, offset })
	})
}

fn check_tile(tile: u16, what: &str) -> Result<()> {
	ensure!(tile <= MAX_TILE, "{} references textile {}, limit is {}", what, tile, MAX_TILE);
	Ok(())
}

pub(crate) fn read_sprite_textures<R: Read>(reader: &mut R) -> Result<Box<[SpriteTexture]>> {
	let textures = read_list::<_, SpriteTexture, u32>(reader)?;
	for texture in textures.iter() {
		check_tile(texture.tile, "sprite texture")?;
	}
	Ok(textures)
}

pub(crate) fn read_sprite_sequences<R: Read>(reader: &mut R) -> Result<Box<[SpriteSequence]>> {
	read_u32_list_with(reader, |reader| {
		Ok(SpriteSequence {
			object_id: reader.read_i32::<LE>()?,
			length: reader.read_i16::<LE>()?.wrapping_neg(),
			offset: reader.read_i16::<LE>()?,
		})
	})
}

/// TR1-3 layout, 20 bytes.
pub(crate) fn read_object_texture_tr1<R: Read>(reader: &mut R) -> Result<ObjectTexture> {
	let transparency_flags = reader.read_u16::<LE>()?;
	let tile = reader.read_u8()?;
	check_tile(tile as u16, "object texture")?;
	let tile_flags = reader.read_u8()?;
	if tile_flags != 0 {
		return Err(DecodeError::unsupported(format!("object texture tile flags {:#04x}", tile_flags)));
	}
	Ok(ObjectTexture {
		transparency_flags,
		tile,
		tile_flags,
		flags: 0,
		vertices: Readable::read(reader)?,
		unknown1: 0,
		unknown2: 0,
		x_size: 0,
		y_size: 0,
	})
}

/// TR4 layout, 38 bytes.
pub(crate) fn read_object_texture_tr4<R: Read>(reader: &mut R) -> Result<ObjectTexture> {
	let transparency_flags = reader.read_u16::<LE>()?;
	let tile = reader.read_u8()?;
	check_tile(tile as u16, "object texture")?;
	let tile_flags = reader.read_u8()?;
	if tile_flags != 0 && tile_flags != 0x80 {
		return Err(DecodeError::unsupported(format!("object texture tile flags {:#04x}", tile_flags)));
	}
	let flags = reader.read_u16::<LE>()?;
	let vertices = <[ObjectTextureVertex; 4]>::read(reader)?.map(|v| ObjectTextureVertex {
		xcoordinate: if v.xcoordinate == 0 { 1 } else { v.xcoordinate },
		ycoordinate: if v.ycoordinate == 0 { 1 } else { v.ycoordinate },
		..v
	});
	Ok(ObjectTexture {
		transparency_flags,
		tile,
		tile_flags,
		flags,
		vertices,
		unknown1: reader.read_u32::<LE>()?,
		unknown2: reader.read_u32::<LE>()?,
		x_size: reader.read_u32::<LE>()?,
		y_size: reader.read_u32::<LE>()?,
	})
}

/// `intensity` maps the on-disk values; without a second intensity the first is copied.
pub(crate) fn read_item_raw<R: Read>(reader: &mut R, intensity: fn(i16) -> i16, has_intensity2: bool) -> Result<Item> {
	let object_id = reader.read_i16::<LE>()?;
	let room = reader.read_i16::<LE>()?;
	let position = reader.read_vertex32()?;
	let rotation = read_rotation(reader)?;
	let intensity1 = intensity(reader.read_i16::<LE>()?);
	let intensity2 = match has_intensity2 {
		true => intensity(reader.read_i16::<LE>()?),
		false => intensity1,
	};
	let flags = reader.read_u16::<LE>()?;
	Ok(Item { object_id, room, position, rotation, intensity1, intensity2, flags })
}

/// Floor data through static meshes, laid out the same in every generation.
pub(crate) fn read_object_sections<G: Generation, S: ByteStream>(stream: &mut S, level: &mut Level) -> Result<()> {
	level.skipped.floor_data = skip_u32_records(stream, 2, "floor data words").during(Step::FloorData)?;
	let (meshes, mesh_indices) = read_mesh_data::<G, _>(stream).during(Step::Meshes)?;
	level.meshes = meshes;
	level.mesh_indices = mesh_indices;
	level.animations = read_u32_list_with(stream, G::read_animation).during(Step::Animations)?;
	level.skipped.state_changes = skip_u32_records(stream, 6, "state changes").during(Step::AnimationTables)?;
	level.skipped.anim_dispatches = skip_u32_records(stream, 8, "anim dispatches").during(Step::AnimationTables)?;
	level.skipped.anim_commands = skip_u32_records(stream, 2, "anim command words").during(Step::AnimationTables)?;
	level.mesh_trees = read_mesh_trees(stream).during(Step::MeshTrees)?;
	let (frames, moveables) = read_frames_and_moveables::<G, _>(stream).during(Step::Frames)?;
	level.frames = frames;
	level.moveables = moveables;
	level.static_meshes = read_u32_list_with(stream, read_static_mesh).during(Step::StaticMeshes)?;
	trace!(
		"{} meshes, {} animations, {} frames, {} moveables, {} static meshes",
		level.meshes.len(),
		level.animations.len(),
		level.frames.len(),
		level.moveables.len(),
		level.static_meshes.len(),
	);
	Ok(())
}

/// Cameras, sound sources, boxes, overlaps and zones, which every generation skips the same way.
pub(crate) fn skip_world_sections<S: ByteStream>(stream: &mut S, level: &mut Level, box_size: u64, zone_size: u64, flyby: bool) -> Result<()> {
	level.skipped.cameras = skip_u32_records(stream, 16, "cameras").during(Step::Cameras)?;
	if flyby {
		level.skipped.flyby_cameras = skip_u32_records(stream, 40, "flyby cameras").during(Step::Cameras)?;
	}
	level.skipped.sound_sources = skip_u32_records(stream, 16, "sound sources").during(Step::SoundSources)?;
	let boxes = skip_u32_records(stream, box_size, "boxes").during(Step::Boxes)?;
	level.skipped.boxes = boxes;
	level.skipped.overlaps = skip_u32_records(stream, 2, "overlap words").during(Step::Boxes)?;
	stream.skip_bytes(boxes as u64 * zone_size).during(Step::Boxes)?;
	level.skipped.animated_textures = skip_u32_records(stream, 2, "animated texture words").during(Step::AnimatedTextures)?;
	Ok(())
}

/// Demo data, sound map, sound details and sample indices that close every level.
pub(crate) fn skip_sound_sections<S: ByteStream>(stream: &mut S, level: &mut Level, sound_map_len: u64) -> Result<()> {
	level.skipped.demo_data = skip_u16_records(stream, 1, "demo data bytes").during(Step::DemoData)?;
	stream.skip_bytes(sound_map_len * 2).during(Step::Sounds)?;
	level.skipped.sound_details = skip_u32_records(stream, 8, "sound details").during(Step::Sounds)?;
	Ok(())
}

#[cfg(test)]
mod tests {
	use std::io::Cursor;
	use crate::ErrorKind;
	use super::*;

	#[test]
	fn rescale_counts_up() {
		assert_eq!(rescale_intensity(8191), 0);
		assert_eq!(rescale_intensity(0), 32764);
		assert_eq!(rescale_if_set(4095), 16384);
		assert_eq!(rescale_if_set(-1), -1);
	}

	#[test]
	fn rescale_truncates_to_16_bits() {
		assert_eq!(rescale_intensity(-8192), ((8191 + 8192) << 2) as u16);
		assert_eq!(rescale_intensity(65535), rescale_intensity(-1));
	}

	#[test]
	fn colours_are_shifted_to_8_bits() {
		let colour = read_colour(&mut Cursor::new([63u8, 1, 0])).unwrap();
		assert_eq!(colour, Colour { r: 252, g: 4, b: 0, a: 0 });
		let colour = read_colour4(&mut Cursor::new([1u8, 2, 3, 4])).unwrap();
		assert_eq!(colour, Colour { r: 4, g: 8, b: 12, a: 16 });
	}

	#[test]
	fn rotations_become_degrees() {
		let rotation = read_rotation(&mut Cursor::new(16384u16.to_le_bytes())).unwrap();
		assert_eq!(rotation, -90.0);
	}

	fn object_texture_bytes(tile: u8, tile_flags: u8) -> Vec<u8> {
		let mut bytes = vec![];
		bytes.extend_from_slice(&1u16.to_le_bytes());
		bytes.push(tile);
		bytes.push(tile_flags);
		bytes.extend_from_slice(&[0, 0, 0, 255, 1, 0, 0, 255, 1, 255, 1, 255, 0, 255, 1, 0]);
		bytes
	}

	#[test]
	fn object_texture_limits() {
		let texture = read_object_texture_tr1(&mut Cursor::new(object_texture_bytes(3, 0))).unwrap();
		assert_eq!(texture.tile, 3);
		assert_eq!(texture.vertices[1].xcoordinate, 1);
		let e = read_object_texture_tr1(&mut Cursor::new(object_texture_bytes(65, 0))).unwrap_err();
		assert_eq!(e.kind(), ErrorKind::Format);
		let e = read_object_texture_tr1(&mut Cursor::new(object_texture_bytes(1, 1))).unwrap_err();
		assert_eq!(e.kind(), ErrorKind::Unsupported);
	}

	#[test]
	fn tr4_object_texture_zero_coordinates_become_one() {
		let mut bytes = object_texture_bytes(2, 0x80);
		bytes.splice(4..4, 0x10u16.to_le_bytes());
		bytes.extend_from_slice(&[0; 16]);
		let texture = read_object_texture_tr4(&mut Cursor::new(bytes)).unwrap();
		assert_eq!(texture.flags, 0x10);
		assert!(texture.vertices.iter().all(|v| v.xcoordinate != 0 && v.ycoordinate != 0));
		assert_eq!(texture.vertices[0].xpixel, 0);
	}

	#[test]
	fn sprite_sequence_length_is_negated() {
		let mut bytes = 1u32.to_le_bytes().to_vec();
		bytes.extend_from_slice(&190i32.to_le_bytes());
		bytes.extend_from_slice(&(-4i16).to_le_bytes());
		bytes.extend_from_slice(&12i16.to_le_bytes());
		let sequences = read_sprite_sequences(&mut Cursor::new(bytes)).unwrap();
		assert_eq!(sequences[0], SpriteSequence { object_id: 190, length: 4, offset: 12 });
	}

	#[test]
	fn mesh_tree_word_count_must_divide_by_4() {
		let e = read_mesh_trees(&mut Cursor::new(6u32.to_le_bytes())).unwrap_err();
		assert_eq!(e.kind(), ErrorKind::Format);
	}

	#[test]
	fn static_mesh_boxes_flip_y_and_z() {
		let mut bytes = 5u32.to_le_bytes().to_vec();
		bytes.extend_from_slice(&9u16.to_le_bytes());
		for v in [-1i16, 1, -2, 2, -3, 3, 0, 0, 0, 0, 0, 0] {
			bytes.extend_from_slice(&v.to_le_bytes());
		}
		bytes.extend_from_slice(&2u16.to_le_bytes());
		let mesh = read_static_mesh(&mut Cursor::new(bytes)).unwrap();
		assert_eq!(mesh.visibility_box.min, vec3(-1.0, 2.0, 3.0));
		assert_eq!(mesh.visibility_box.max, vec3(1.0, -2.0, -3.0));
		assert_eq!(mesh.flags, 2);
	}
}
