use std::io::Read;
use byteorder::{ReadBytesExt, LE};
use glam::{Vec3, Vec4};
use log::trace;
use crate::{
	common::{
		read_item_raw, read_lightmap, read_object_sections, read_palette, read_palette16, read_rotation,
		read_sprite_sequences, read_sprite_textures, read_u32_list_with, rescale_if_set, rescale_intensity,
		skip_sound_sections, skip_u16_records, skip_u32_records, skip_world_sections,
	},
	error::ResultExt,
	generation::{Ambient, Generation, RoomLayout},
	model::{Item, Level, LightDetail, RoomLight, RoomStaticMesh, RoomVertex},
	read_list_with,
	room::read_room,
	stream::{ByteStream, ReadExt},
	textile::{read_textile16, read_textile8, read_textile_count, read_textiles},
	Result, Step, Version,
};

/// Tomb Raider II and its demo.
pub(crate) struct Tr2;

impl Generation for Tr2 {
	fn read_item<R: Read>(reader: &mut R) -> Result<Item> {
		read_item_raw(reader, rescale_if_set, true)
	}
}

/// Two-intensity light shared by TR2 and TR3.
pub(crate) fn read_fade_light<R: Read>(reader: &mut R) -> Result<RoomLight> {
	let position = reader.read_vertex32()?;
	Ok(RoomLight {
		position,
		detail: LightDetail::Fade {
			intensity1: reader.read_u16::<LE>()?,
			intensity2: reader.read_u16::<LE>()?,
			fade1: reader.read_u32::<LE>()?,
			fade2: reader.read_u32::<LE>()?,
		},
	})
}

impl RoomLayout for Tr2 {
	fn read_room_vertex<R: Read>(reader: &mut R) -> Result<RoomVertex> {
		let position = reader.read_vertex16()?;
		let lighting1 = rescale_intensity(reader.read_i16::<LE>()? as i32) as i16;
		let attributes = reader.read_u16::<LE>()?;
		let lighting2 = rescale_intensity(reader.read_i16::<LE>()? as i32) as i16;
		Ok(RoomVertex { position, lighting1, attributes, lighting2, normal: Vec3::ZERO, colour: Vec4::ZERO })
	}

	fn read_room_ambient<R: Read>(reader: &mut R) -> Result<Ambient> {
		let intensity1 = rescale_intensity(reader.read_i16::<LE>()? as i32) as i16;
		let intensity2 = rescale_intensity(reader.read_i16::<LE>()? as i32) as i16;
		let light_mode = reader.read_i16::<LE>()?;
		Ok(Ambient { intensity1, intensity2, light_mode })
	}

	fn read_room_light<R: Read>(reader: &mut R) -> Result<RoomLight> {
		read_fade_light(reader)
	}

	fn read_room_static_mesh<R: Read>(reader: &mut R) -> Result<RoomStaticMesh> {
		let position = reader.read_vertex32()?;
		let rotation = read_rotation(reader)?;
		let intensity1 = rescale_if_set(reader.read_i16::<LE>()?);
		let intensity2 = rescale_if_set(reader.read_i16::<LE>()?);
		let object_id = reader.read_u16::<LE>()?;
		Ok(RoomStaticMesh { position, rotation, intensity1, intensity2, object_id })
	}
}

/// Palettes and paired 8/16-bit textiles that open TR2 and TR3 files.
pub(crate) fn read_palettes_and_textiles<S: ByteStream>(stream: &mut S, level: &mut Level) -> Result<()> {
	level.palette = read_palette(stream).during(Step::Palette)?;
	level.palette16 = read_palette16(stream).during(Step::Palette)?;
	let num_textiles = read_textile_count(stream).during(Step::Textiles)?;
	level.textiles8 = read_textiles(stream, num_textiles, read_textile8).during(Step::Textiles)?;
	level.textiles16 = read_textiles(stream, num_textiles, read_textile16).during(Step::Textiles)?;
	trace!("{} 8 and 16-bit textiles", num_textiles);
	stream.expect_u32(0, "unused").during(Step::LevelData)?;
	Ok(())
}

pub(crate) fn read_level<S: ByteStream>(stream: &mut S, version: Version) -> Result<Level> {
	let demo = version == Version::Tr2Demo;
	let mut level = Level::new(version);
	read_palettes_and_textiles(stream, &mut level)?;
	level.rooms = read_list_with::<_, _, u16, _>(stream, read_room::<Tr2, _>).during(Step::Rooms)?;
	trace!("{} rooms", level.rooms.len());
	read_object_sections::<Tr2, _>(stream, &mut level)?;
	level.object_textures = read_u32_list_with(stream, Tr2::read_object_texture).during(Step::ObjectTextures)?;
	level.sprite_textures = read_sprite_textures(stream).during(Step::SpriteTextures)?;
	level.sprite_sequences = read_sprite_sequences(stream).during(Step::SpriteSequences)?;
	if demo {
		level.lightmap = read_lightmap(stream).during(Step::Lightmap)?;
	}
	skip_world_sections(stream, &mut level, 8, 20, false)?;
	level.items = read_u32_list_with(stream, Tr2::read_item).during(Step::Items)?;
	if !demo {
		level.lightmap = read_lightmap(stream).during(Step::Lightmap)?;
	}
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
	fn both_vertex_lightings_are_rescaled() {
		let mut bytes = vec![0u8; 6];
		for v in [8191i16, 7, 0] {
			bytes.extend_from_slice(&v.to_le_bytes());
		}
		let vertex = Tr2::read_room_vertex(&mut Cursor::new(bytes)).unwrap();
		assert_eq!(vertex.lighting1, 0);
		assert_eq!(vertex.attributes, 7);
		assert_eq!(vertex.lighting2, 32764);
	}

	#[test]
	fn ambient_keeps_light_mode_raw() {
		let mut bytes = vec![];
		for v in [8191i16, 4095, 3] {
			bytes.extend_from_slice(&v.to_le_bytes());
		}
		let ambient = Tr2::read_room_ambient(&mut Cursor::new(bytes)).unwrap();
		assert_eq!(ambient, Ambient { intensity1: 0, intensity2: 16384, light_mode: 3 });
	}

	#[test]
	fn item_intensities_rescale_independently() {
		let mut bytes = vec![0u8; 18];
		bytes.extend_from_slice(&(-1i16).to_le_bytes());
		bytes.extend_from_slice(&8191i16.to_le_bytes());
		bytes.extend_from_slice(&0u16.to_le_bytes());
		let item = Tr2::read_item(&mut Cursor::new(bytes)).unwrap();
		assert_eq!((item.intensity1, item.intensity2), (-1, 0));
	}
}
