use std::io::{Cursor, Read};
use byteorder::{ReadBytesExt, LE};
use glam::{IVec3, Vec4};
use log::trace;
use shared::MinMax;
use crate::{
	common::{
		read_object_sections, read_object_texture_tr4, read_sprite_sequences, read_sprite_textures,
		read_u32_list_with, skip_sound_sections, skip_u32_records, skip_world_sections,
	},
	error::{ensure, ResultExt},
	generation::{read_raw_room_static_mesh, Generation},
	mesh::read_lit_face,
	model::{
		Colour, Face, FloatLight, Level, LightDetail, ObjectTexture, Portal, Room, RoomFlags, RoomLayer, RoomLight,
		RoomVertex, Sector, Tr5LevelFlags, Tr5RoomInfo,
	},
	read_boxed_slice, read_boxed_slice_with, read_list, read_list_with,
	stream::{ByteStream, ReadExt, SeekExt},
	textile::read_compressed_textiles,
	tr4::{expect_tagged_marker, flip_yz},
	Readable, Result, Step, Version,
};

const XELA: u32 = 0x414C_4558;
const CD: u32 = 0xCDCD_CDCD;
/// Offsets inside a room body count from the end of its header.
const ROOM_HEADER_SIZE: u64 = 208;
const ROOM_VERTEX_SIZE: u32 = 28;
const MAX_ROOM_LIGHTS: u16 = 512;
const MAX_ROOM_STATIC_MESHES: u16 = 512;
const MAX_ROOM_TRIANGLES: u32 = 512;
const MAX_ROOM_RECTANGLES: u32 = 1024;

/// Tomb Raider Chronicles.
pub(crate) struct Tr5;

impl Generation for Tr5 {
	const LIT_MESH_FACES: bool = true;
	const MOVEABLE_FILLER: bool = true;

	fn read_object_texture<R: Read>(reader: &mut R) -> Result<ObjectTexture> {
		let texture = read_object_texture_tr4(reader)?;
		reader.expect_u16_any(&[0], "object texture filler")?;
		Ok(texture)
	}
}

/// On-disk TR5 room light, 88 bytes.
#[derive(Readable)]
struct LightRecord {
	position: [f32; 3],
	colour: [f32; 3],
	#[skip_4]
	r_inner: f32,
	r_outer: f32,
	#[skip_12]
	direction: [f32; 3],
	position2: IVec3,
	direction2: IVec3,
	light_type: u8,
	separator: [u8; 3],
}

fn read_light<R: Read>(reader: &mut R) -> Result<RoomLight> {
	let record = LightRecord::read(reader)?;
	ensure!(record.separator == [0xCD; 3], "light separator is {:02x?}", record.separator);
	Ok(RoomLight {
		position: flip_yz(record.position.into()),
		detail: LightDetail::Float(FloatLight {
			colour: record.colour.into(),
			r_inner: record.r_inner,
			r_outer: record.r_outer,
			direction: flip_yz(record.direction.into()),
			position2: flip_yz(record.position2.as_vec3()),
			direction2: flip_yz(record.direction2.as_vec3()),
			light_type: record.light_type,
		}),
	})
}

/// On-disk room layer, 56 bytes.
#[derive(Readable)]
struct LayerRecord {
	num_vertices: u16,
	unknown_l1: u16,
	unknown_l2: u16,
	num_rectangles: u16,
	num_triangles: u16,
	unknown_l3: u16,
	unknown_l4: u16,
	filler: u16,
	bounding_box: MinMax<[f32; 3]>,
	filler2: u32,
	unknown_l6: [i16; 6],
}

fn read_layer<R: Read>(reader: &mut R) -> Result<RoomLayer> {
	let record = LayerRecord::read(reader)?;
	ensure!(record.filler == 0, "layer filler is {:#06x}", record.filler);
	ensure!(record.filler2 == 0, "layer filler is {:#010x}", record.filler2);
	Ok(RoomLayer {
		num_vertices: record.num_vertices,
		unknown_l1: record.unknown_l1,
		unknown_l2: record.unknown_l2,
		num_rectangles: record.num_rectangles,
		num_triangles: record.num_triangles,
		unknown_l3: record.unknown_l3,
		unknown_l4: record.unknown_l4,
		bounding_box: MinMax {
			min: flip_yz(record.bounding_box.min.into()),
			max: flip_yz(record.bounding_box.max.into()),
		},
		unknown_l6: record.unknown_l6,
	})
}

/// BGRA bytes to 0-1 floats.
fn read_bgra<R: Read>(reader: &mut R) -> Result<Vec4> {
	let [b, g, r, a] = <[u8; 4]>::read(reader)?.map(|c| c as f32 / 255.0);
	Ok(Vec4::new(r, g, b, a))
}

fn read_vertex<R: Read>(reader: &mut R) -> Result<RoomVertex> {
	let position = reader.read_vertex_float()?;
	let normal = reader.read_vertex_float()?;
	let colour = read_bgra(reader)?;
	Ok(RoomVertex { position, lighting1: 0, attributes: 0, lighting2: 0, normal, colour })
}

/// Face counts use the separator value for "none".
fn read_face_count<R: Read>(reader: &mut R, max: u32, what: &str) -> Result<u32> {
	let count = match reader.read_u32::<LE>()? {
		CD => 0,
		count => count,
	};
	ensure!(count <= max, "room has {} {}, at most {} allowed", count, what, max);
	Ok(count)
}

fn expect_cd<R: Read>(reader: &mut R, count: usize, what: &str) -> Result<()> {
	for _ in 0..count {
		reader.expect_u32(CD, what)?;
	}
	Ok(())
}

/// Shifts a layer's face indices past the vertices of earlier layers.
fn offset_face<const N: usize>(face: Face<N>, base: u32) -> Result<Face<N>> {
	let mut vertices = face.vertices;
	for v in vertices.iter_mut() {
		let shifted = *v as u32 + base;
		ensure!(shifted <= u16::MAX as u32, "room vertex index {} does not fit 16 bits", shifted);
		*v = shifted as u16;
	}
	Ok(Face { vertices, ..face })
}

/// Room body after `XELA` and its size, with offsets relative to the end of the header.
fn read_room_body(body: &mut Cursor<Vec<u8>>) -> Result<Room> {
	body.expect_u32(CD, "room separator")?;
	let _portal_offset = body.read_u32::<LE>()?;//portals always follow the sectors
	let sector_offset = body.read_u32::<LE>()?;
	body.expect_u32_any(&[0, CD], "room separator")?;
	let static_offset = body.read_u32::<LE>()?;
	let offset = body.read_vertex32()?;
	let y_bottom = body.read_i32::<LE>()?.wrapping_neg();
	let y_top = body.read_i32::<LE>()?.wrapping_neg();
	let num_z = body.read_u16::<LE>()?;
	let num_x = body.read_u16::<LE>()?;
	let light_colour = read_bgra(body)?;
	let num_lights = body.read_u16::<LE>()?;
	ensure!(num_lights <= MAX_ROOM_LIGHTS, "room has {} lights, at most {} allowed", num_lights, MAX_ROOM_LIGHTS);
	let num_statics = body.read_u16::<LE>()?;
	ensure!(
		num_statics <= MAX_ROOM_STATIC_MESHES,
		"room has {} static meshes, at most {} allowed",
		num_statics,
		MAX_ROOM_STATIC_MESHES,
	);
	let unknown_r1 = body.read_u16::<LE>()?;
	let unknown_r2 = body.read_u16::<LE>()?;
	body.expect_u32(0x7FFF, "room filler")?;
	body.expect_u32(0x7FFF, "room filler")?;
	expect_cd(body, 2, "room separator")?;
	body.expect_u32(0xFFFF_FFFF, "room separator")?;
	let unknown_r3 = body.read_i16::<LE>()?;
	let flags = RoomFlags(body.read_u16::<LE>()?);
	let unknown_r4 = body.read_u32::<LE>()?;
	let unknown_r5 = body.read_u32::<LE>()?;
	let unknown_r6 = body.read_u32::<LE>()?;
	body.expect_u32_any(&[0, CD], "room separator")?;
	let unknown_r7a = body.read_u16::<LE>()?;
	let unknown_r7b = body.read_u16::<LE>()?;
	let room_x = body.read_f32::<LE>()?;
	let unknown_r8 = body.read_u32::<LE>()?;
	let room_z = -body.read_f32::<LE>()?;
	expect_cd(body, 4, "room separator")?;
	body.expect_u32_any(&[0, CD], "room separator")?;
	expect_cd(body, 1, "room separator")?;
	let num_triangles = read_face_count(body, MAX_ROOM_TRIANGLES, "triangles")?;
	let num_rectangles = read_face_count(body, MAX_ROOM_RECTANGLES, "rectangles")?;
	body.expect_u32(0, "room separator")?;
	let light_size = body.read_u32::<LE>()?;
	let num_lights2 = body.read_u32::<LE>()?;
	ensure!(num_lights2 == num_lights as u32, "room light counts differ: {} and {}", num_lights, num_lights2);
	let unknown_r9 = body.read_u32::<LE>()?;
	let room_y_top = -body.read_f32::<LE>()?;
	let room_y_bottom = -body.read_f32::<LE>()?;
	let num_layers = body.read_u32::<LE>()?;
	let layer_offset = body.read_u32::<LE>()?;
	let vertices_offset = body.read_u32::<LE>()?;
	let poly_offset = body.read_u32::<LE>()?;
	let poly_offset2 = body.read_u32::<LE>()?;
	ensure!(poly_offset == poly_offset2, "room polygon offsets differ: {} and {}", poly_offset, poly_offset2);
	let vertices_size = body.read_u32::<LE>()?;
	ensure!(
		vertices_size % ROOM_VERTEX_SIZE == 0,
		"room vertex data of {} bytes is not a multiple of {}",
		vertices_size,
		ROOM_VERTEX_SIZE,
	);
	expect_cd(body, 4, "room separator")?;

	let lights = read_boxed_slice_with(body, num_lights as usize, read_light)?;

	body.seek_to(ROOM_HEADER_SIZE + sector_offset as u64)?;
	let sectors = read_boxed_slice::<_, Sector>(body, num_z as usize * num_x as usize)?;
	let portals = read_list::<_, Portal, u16>(body)?;

	body.seek_to(ROOM_HEADER_SIZE + static_offset as u64)?;
	let static_meshes = read_boxed_slice_with(body, num_statics as usize, read_raw_room_static_mesh)?;

	body.seek_to(ROOM_HEADER_SIZE + layer_offset as u64)?;
	let layers = read_boxed_slice_with(body, num_layers as usize, read_layer)?;
	let layer_sum = |count: fn(&RoomLayer) -> u16| layers.iter().map(|l| count(l) as u32).sum::<u32>();
	let num_vertices = vertices_size / ROOM_VERTEX_SIZE;
	ensure!(
		layer_sum(|l| l.num_rectangles) == num_rectangles
			&& layer_sum(|l| l.num_triangles) == num_triangles
			&& layer_sum(|l| l.num_vertices) == num_vertices,
		"room layers don't add up to {} rectangles, {} triangles and {} vertices",
		num_rectangles,
		num_triangles,
		num_vertices,
	);

	body.seek_to(ROOM_HEADER_SIZE + poly_offset as u64)?;
	let mut rectangles = Vec::with_capacity(num_rectangles as usize);
	let mut triangles = Vec::with_capacity(num_triangles as usize);
	let mut base = 0;
	for layer in layers.iter() {
		for _ in 0..layer.num_rectangles {
			rectangles.push(offset_face(read_lit_face::<_, 4>(body)?, base)?);
		}
		for _ in 0..layer.num_triangles {
			triangles.push(offset_face(read_lit_face::<_, 3>(body)?, base)?);
		}
		base += layer.num_vertices as u32;
	}

	body.seek_to(ROOM_HEADER_SIZE + vertices_offset as u64)?;
	let vertices = read_boxed_slice_with(body, num_vertices as usize, read_vertex)?;

	trace!(
		"room at {}: {} layers, {} vertices, {} rectangles, {} triangles, {} lights",
		offset,
		layers.len(),
		vertices.len(),
		rectangles.len(),
		triangles.len(),
		lights.len(),
	);
	Ok(Room {
		offset,
		y_bottom,
		y_top,
		layers,
		vertices,
		rectangles: rectangles.into_boxed_slice(),
		triangles: triangles.into_boxed_slice(),
		sprites: Box::default(),
		portals,
		num_z_sectors: num_z,
		num_x_sectors: num_x,
		sectors,
		intensity1: 32767,
		intensity2: 32767,
		light_mode: 0,
		lights,
		static_meshes,
		alternate_room: -1,
		flags,
		fog_colour: Colour::default(),
		light_colour,
		tr5: Some(Tr5RoomInfo {
			unknown_r1,
			unknown_r2,
			unknown_r3,
			unknown_r4,
			unknown_r5,
			unknown_r6,
			unknown_r7a,
			unknown_r7b,
			unknown_r8,
			unknown_r9,
			light_size,
			room_x,
			room_z,
			room_y_top,
			room_y_bottom,
		}),
	})
}

fn read_room<S: ByteStream>(stream: &mut S) -> Result<Room> {
	stream.expect_u32(XELA, "room tag")?;
	let size = stream.read_u32::<LE>()?;
	let mut body = Cursor::new(stream.read_bytes(size as usize)?);
	read_room_body(&mut body)
}

fn read_level_flags<R: Read>(reader: &mut R) -> Result<Tr5LevelFlags> {
	let lara_type = reader.read_u16::<LE>()?;
	let weather = reader.read_u16::<LE>()?;
	for _ in 0..7 {
		reader.expect_u32(0, "level flag")?;
	}
	let size1 = reader.read_u32::<LE>()?;
	let size2 = reader.read_u32::<LE>()?;
	trace!("lara type {}, weather {}, level data sizes {} and {}", lara_type, weather, size1, size2);
	Ok(Tr5LevelFlags { lara_type, weather })
}

pub(crate) fn read_level<S: ByteStream>(stream: &mut S, version: Version) -> Result<Level> {
	let mut level = Level::new(version);
	read_compressed_textiles(stream, &mut level, 3).during(Step::Textiles)?;
	level.tr5_flags = Some(read_level_flags(stream).during(Step::LevelData)?);
	stream.expect_u32(0, "unused").during(Step::LevelData)?;
	level.rooms = read_list_with::<_, _, u32, _>(stream, read_room).during(Step::Rooms)?;
	trace!("{} rooms", level.rooms.len());
	read_object_sections::<Tr5, _>(stream, &mut level)?;
	stream.expect_marker(b"SPR\0").during(Step::Markers)?;
	level.sprite_textures = read_sprite_textures(stream).during(Step::SpriteTextures)?;
	level.sprite_sequences = read_sprite_sequences(stream).during(Step::SpriteSequences)?;
	skip_world_sections(stream, &mut level, 8, 20, true)?;
	expect_tagged_marker(stream, &[0, 1, 2, 3, 4], b"TEX\0").during(Step::Markers)?;
	level.object_textures = read_u32_list_with(stream, Tr5::read_object_texture).during(Step::ObjectTextures)?;
	level.items = read_u32_list_with(stream, Tr5::read_item).during(Step::Items)?;
	level.skipped.ai_objects = skip_u32_records(stream, 24, "ai objects").during(Step::AiObjects)?;
	skip_sound_sections(stream, &mut level, 450)?;
	level.skipped.sample_indices = skip_u32_records(stream, 4, "sample indices").during(Step::Sounds)?;
	Ok(level)
}
