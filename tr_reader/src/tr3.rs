use std::io::Read;
use byteorder::{ReadBytesExt, LE};
use glam::{Vec3, Vec4};
use log::trace;
use crate::{
	common::{
		read_lightmap, read_object_sections, read_sprite_sequences, read_sprite_textures, read_u32_list_with,
		skip_sound_sections, skip_u16_records, skip_u32_records, skip_world_sections,
	},
	error::ResultExt,
	generation::{Ambient, Generation, RoomLayout},
	model::{Level, RoomLight, RoomVertex},
	read_list_with,
	room::read_room,
	stream::{ByteStream, ReadExt},
	tr2::{read_fade_light, read_palettes_and_textiles},
	Result, Step, Version,
};

/// Tomb Raider III. Lighting is stored on the 0-32767 scale.
pub(crate) struct Tr3;

impl Generation for Tr3 {}

/// Raw vertex layout shared by TR3 and TR4.
pub(crate) fn read_raw_room_vertex<R: Read>(reader: &mut R) -> Result<RoomVertex> {
	Ok(RoomVertex {
		position: reader.read_vertex16()?,
		lighting1: reader.read_i16::<LE>()?,
		attributes: reader.read_u16::<LE>()?,
		lighting2: reader.read_i16::<LE>()?,
		normal: Vec3::ZERO,
		colour: Vec4::ZERO,
	})
}

pub(crate) fn read_raw_ambient<R: Read>(reader: &mut R) -> Result<Ambient> {
	let intensity1 = reader.read_i16::<LE>()?;
	let intensity2 = reader.read_i16::<LE>()?;
	Ok(Ambient { intensity1, intensity2, light_mode: 0 })
}

impl RoomLayout for Tr3 {
	const FOG_COLOUR: bool = true;

	fn read_room_vertex<R: Read>(reader: &mut R) -> Result<RoomVertex> {
		read_raw_room_vertex(reader)
	}

	fn read_room_ambient<R: Read>(reader: &mut R) -> Result<Ambient> {
		read_raw_ambient(reader)
	}

	fn read_room_light<R: Read>(reader: &mut R) -> Result<RoomLight> {
		read_fade_light(reader)
	}
}

pub(crate) fn read_level<S: ByteStream>(stream: &mut S, version: Version) -> Result<Level> {
	let mut level = Level::new(version);
	read_palettes_and_textiles(stream, &mut level)?;
	level.rooms = read_list_with::<_, _, u16, _>(stream, read_room::<Tr3, _>).during(Step::Rooms)?;
	trace!("{} rooms", level.rooms.len());
	read_object_sections::<Tr3, _>(stream, &mut level)?;
	level.sprite_textures = read_sprite_textures(stream).during(Step::SpriteTextures)?;
	level.sprite_sequences = read_sprite_sequences(stream).during(Step::SpriteSequences)?;
	skip_world_sections(stream, &mut level, 8, 20, false)?;
	level.object_textures = read_u32_list_with(stream, Tr3::read_object_texture).during(Step::ObjectTextures)?;
	level.items = read_u32_list_with(stream, Tr3::read_item).during(Step::Items)?;
	level.lightmap = read_lightmap(stream).during(Step::Lightmap)?;
	level.skipped.cinematic_frames = skip_u16_records(stream, 16, "cinematic frames").during(Step::Cinematics)?;
	skip_sound_sections(stream, &mut level, 370)?;
	level.skipped.sample_indices = skip_u32_records(stream, 4, "sample indices").during(Step::Sounds)?;
	Ok(level)
}

#[cfg(test)]
mod tests {
	use std::io::Cursor;
	use super::*;

	#[test]
	fn vertex_lighting_is_raw() {
		let mut bytes = vec![0u8; 6];
		for v in [16000i16, 0x10, -5] {
			bytes.extend_from_slice(&v.to_le_bytes());
		}
		let vertex = Tr3::read_room_vertex(&mut Cursor::new(bytes)).unwrap();
		assert_eq!((vertex.lighting1, vertex.attributes, vertex.lighting2), (16000, 0x10, -5));
	}

	#[test]
	fn items_keep_both_intensities() {
		let mut bytes = vec![0u8; 18];
		bytes.extend_from_slice(&100i16.to_le_bytes());
		bytes.extend_from_slice(&200i16.to_le_bytes());
		bytes.extend_from_slice(&0u16.to_le_bytes());
		let item = Tr3::read_item(&mut Cursor::new(bytes)).unwrap();
		assert_eq!((item.intensity1, item.intensity2), (100, 200));
	}
}
