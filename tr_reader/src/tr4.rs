use std::io::{Cursor, Read};
use byteorder::ReadBytesExt;
use glam::{vec3, IVec3, Vec3};
use log::trace;
use crate::{
	common::{
		read_object_sections, read_object_texture_tr4, read_sprite_sequences, read_sprite_textures,
		read_u32_list_with, skip_sound_sections, skip_u32_records, skip_world_sections,
	},
	error::{ensure, ResultExt},
	generation::{read_animation, Ambient, Generation, RoomLayout},
	inflate::Segment,
	model::{Animation, Colour, ColouredLight, Level, LightDetail, ObjectTexture, RoomLight, RoomVertex},
	read_list_with,
	room::read_room,
	stream::{ByteStream, ReadExt},
	textile::read_compressed_textiles,
	tr3::{read_raw_ambient, read_raw_room_vertex},
	Readable, Result, Step, Version,
};

/// Tomb Raider: The Last Revelation and its demo.
pub(crate) struct Tr4;

impl Generation for Tr4 {
	const LIT_MESH_FACES: bool = true;

	fn read_animation<R: Read>(reader: &mut R) -> Result<Animation> {
		read_animation(reader, true)
	}

	fn read_object_texture<R: Read>(reader: &mut R) -> Result<ObjectTexture> {
		read_object_texture_tr4(reader)
	}
}

/// On-disk TR4 room light, 46 bytes.
#[derive(Readable)]
struct LightRecord {
	position: IVec3,
	colour: [u8; 3],
	light_type: u8,
	#[skip_1]
	intensity: u8,
	r_inner: f32,
	r_outer: f32,
	length: f32,
	cutoff: f32,
	direction: [f32; 3],
}

/// Mirrors y and z of an on-disk vector.
pub(crate) fn flip_yz(v: Vec3) -> Vec3 {
	vec3(v.x, -v.y, -v.z)
}

impl RoomLayout for Tr4 {
	const VERTEX_LIGHT_SCALE: f32 = 16383.0;
	const FOG_COLOUR: bool = true;

	fn read_room_vertex<R: Read>(reader: &mut R) -> Result<RoomVertex> {
		read_raw_room_vertex(reader)
	}

	fn read_room_ambient<R: Read>(reader: &mut R) -> Result<Ambient> {
		read_raw_ambient(reader)
	}

	fn read_room_light<R: Read>(reader: &mut R) -> Result<RoomLight> {
		let record = LightRecord::read(reader)?;
		let [r, g, b] = record.colour.map(|c| c << 2);
		Ok(RoomLight {
			position: flip_yz(record.position.as_vec3()),
			detail: LightDetail::Coloured(ColouredLight {
				colour: Colour { r, g, b, a: 0 },
				light_type: record.light_type,
				intensity: record.intensity,
				r_inner: record.r_inner,
				r_outer: record.r_outer,
				length: record.length,
				cutoff: record.cutoff,
				direction: flip_yz(record.direction.into()),
			}),
		})
	}
}

/// A marker byte from `allowed` followed by a literal tag.
pub(crate) fn expect_tagged_marker<R: Read>(reader: &mut R, allowed: &[u8], tag: &[u8]) -> Result<u8> {
	let value = reader.read_u8()?;
	ensure!(allowed.contains(&value), "byte before {:?} has value {}", String::from_utf8_lossy(tag), value);
	reader.expect_marker(tag)?;
	Ok(value)
}

/// Reads the level-data segment and returns a stream over its inflated bytes.
pub(crate) fn open_level_data<S: ByteStream>(stream: &mut S) -> Result<Cursor<Vec<u8>>> {
	let segment = Segment::read(stream)?;
	ensure!(segment.compressed_size != 0, "level data segment is empty");
	trace!("level data: {} bytes compressed, {} inflated", segment.compressed_size, segment.uncompressed_size);
	segment.inflate(stream)
}

fn read_level_data<S: ByteStream>(stream: &mut S, level: &mut Level) -> Result<()> {
	stream.expect_u32(0, "unused").during(Step::LevelData)?;
	level.rooms = read_list_with::<_, _, u16, _>(stream, read_room::<Tr4, _>).during(Step::Rooms)?;
	trace!("{} rooms", level.rooms.len());
	read_object_sections::<Tr4, _>(stream, level)?;
	stream.expect_marker(b"SPR").during(Step::Markers)?;
	level.sprite_textures = read_sprite_textures(stream).during(Step::SpriteTextures)?;
	level.sprite_sequences = read_sprite_sequences(stream).during(Step::SpriteSequences)?;
	skip_world_sections(stream, level, 8, 20, true)?;
	expect_tagged_marker(stream, &[0, 1, 2, 4], b"TEX").during(Step::Markers)?;
	level.object_textures = read_u32_list_with(stream, Tr4::read_object_texture).during(Step::ObjectTextures)?;
	level.items = read_u32_list_with(stream, Tr4::read_item).during(Step::Items)?;
	level.skipped.ai_objects = skip_u32_records(stream, 24, "ai objects").during(Step::AiObjects)?;
	skip_sound_sections(stream, level, 370)?;
	level.skipped.sample_indices = skip_u32_records(stream, 4, "sample indices").during(Step::Sounds)?;
	for _ in 0..3 {
		stream.expect_u16_any(&[0, 0xCDCD], "trailing filler").during(Step::Trailer)?;
	}
	Ok(())
}

pub(crate) fn read_level<S: ByteStream>(stream: &mut S, version: Version) -> Result<Level> {
	let mut level = Level::new(version);
	read_compressed_textiles(stream, &mut level, 2).during(Step::Textiles)?;
	let mut level_data = open_level_data(stream).during(Step::LevelData)?;
	read_level_data(&mut level_data, &mut level)?;
	Ok(level)
}
