use std::io::Read;
use byteorder::{ReadBytesExt, LE};
use glam::{Vec3, Vec4};
use log::trace;
use crate::{
	common::{
		read_item_raw, read_lightmap, read_object_sections, read_palette, read_rotation, read_sprite_sequences,
		read_sprite_textures, read_u32_list_with, rescale_if_set, rescale_intensity, skip_sound_sections,
		skip_u16_records, skip_u32_records, skip_world_sections,
	},
	error::ResultExt,
	frame::read_legacy_rotations,
	generation::{Ambient, Generation, RoomLayout},
	model::{FrameRotation, Item, Level, LightDetail, RoomLight, RoomStaticMesh, RoomVertex},
	read_list_with,
	room::read_room,
	stream::{ByteStream, ReadExt},
	textile::{read_textile8, read_textile_count, read_textiles},
	Result, Step, Version,
};

/// Tomb Raider, its demo and Unfinished Business.
pub(crate) struct Tr1;

impl Generation for Tr1 {
	fn read_item<R: Read>(reader: &mut R) -> Result<Item> {
		read_item_raw(reader, rescale_if_set, false)
	}

	fn read_frame_rotations<R: Read>(reader: &mut R, num_meshes: u16) -> Result<Box<[FrameRotation]>> {
		read_legacy_rotations(reader, num_meshes)
	}
}

impl RoomLayout for Tr1 {
	fn read_room_vertex<R: Read>(reader: &mut R) -> Result<RoomVertex> {
		let position = reader.read_vertex16()?;
		let lighting = rescale_intensity(reader.read_i16::<LE>()? as i32) as i16;
		Ok(RoomVertex {
			position,
			lighting1: lighting,
			attributes: 0,
			lighting2: lighting,
			normal: Vec3::ZERO,
			colour: Vec4::ZERO,
		})
	}

	fn read_room_ambient<R: Read>(reader: &mut R) -> Result<Ambient> {
		let intensity = rescale_intensity(reader.read_i16::<LE>()? as i32) as i16;
		Ok(Ambient { intensity1: intensity, intensity2: intensity, light_mode: 0 })
	}

	fn read_room_light<R: Read>(reader: &mut R) -> Result<RoomLight> {
		let position = reader.read_vertex32()?;
		let intensity = rescale_intensity(reader.read_u16::<LE>()? as i32);
		let fade = reader.read_u32::<LE>()?;
		Ok(RoomLight {
			position,
			detail: LightDetail::Fade { intensity1: intensity, intensity2: intensity, fade1: fade, fade2: fade },
		})
	}

	fn read_room_static_mesh<R: Read>(reader: &mut R) -> Result<RoomStaticMesh> {
		let position = reader.read_vertex32()?;
		let rotation = read_rotation(reader)?;
		let intensity = rescale_if_set(reader.read_i16::<LE>()?);
		let object_id = reader.read_u16::<LE>()?;
		Ok(RoomStaticMesh { position, rotation, intensity1: intensity, intensity2: intensity, object_id })
	}
}

pub(crate) fn read_level<S: ByteStream>(stream: &mut S, version: Version) -> Result<Level> {
	// the demo and Unfinished Business move the palette ahead of the cameras
	let early_palette = matches!(version, Version::Tr1Demo | Version::Tr1UnfinishedBusiness);
	let mut level = Level::new(version);
	let num_textiles = read_textile_count(stream).during(Step::Textiles)?;
	level.textiles8 = read_textiles(stream, num_textiles, read_textile8).during(Step::Textiles)?;
	trace!("{} 8-bit textiles", level.textiles8.len());
	stream.expect_u32(0, "unused").during(Step::LevelData)?;
	level.rooms = read_list_with::<_, _, u16, _>(stream, read_room::<Tr1, _>).during(Step::Rooms)?;
	trace!("{} rooms", level.rooms.len());
	read_object_sections::<Tr1, _>(stream, &mut level)?;
	level.object_textures = read_u32_list_with(stream, Tr1::read_object_texture).during(Step::ObjectTextures)?;
	level.sprite_textures = read_sprite_textures(stream).during(Step::SpriteTextures)?;
	level.sprite_sequences = read_sprite_sequences(stream).during(Step::SpriteSequences)?;
	if early_palette {
		level.palette = read_palette(stream).during(Step::Palette)?;
	}
	skip_world_sections(stream, &mut level, 20, 12, false)?;
	level.items = read_u32_list_with(stream, Tr1::read_item).during(Step::Items)?;
	level.lightmap = read_lightmap(stream).during(Step::Lightmap)?;
	if !early_palette {
		level.palette = read_palette(stream).during(Step::Palette)?;
	}
	level.skipped.cinematic_frames = skip_u16_records(stream, 16, "cinematic frames").during(Step::Cinematics)?;
	skip_sound_sections(stream, &mut level, 256)?;
	level.skipped.samples = skip_u32_records(stream, 1, "sample bytes").during(Step::Sounds)?;
	level.skipped.sample_indices = skip_u32_records(stream, 4, "sample indices").during(Step::Sounds)?;
	Ok(level)
}
