use std::io::Read;
use byteorder::{ReadBytesExt, LE};
use crate::{
	common::{read_item_raw, read_rotation, read_object_texture_tr1},
	frame::read_packed_rotations,
	model::{Animation, AnimationMotion, FrameRotation, Item, Moveable, ObjectTexture, RoomLight, RoomStaticMesh, RoomVertex},
	stream::ReadExt,
	error::ensure,
	Result,
};

/// Record layouts that differ between generations, picked once per level.
pub(crate) trait Generation {
	/// Mesh faces carry a lighting word
	const LIT_MESH_FACES: bool = false;
	/// Moveables end in a 0xFFEF filler
	const MOVEABLE_FILLER: bool = false;

	fn read_animation<R: Read>(reader: &mut R) -> Result<Animation> {
		read_animation(reader, false)
	}

	fn read_object_texture<R: Read>(reader: &mut R) -> Result<ObjectTexture> {
		read_object_texture_tr1(reader)
	}

	fn read_item<R: Read>(reader: &mut R) -> Result<Item> {
		read_item_raw(reader, |i| i, true)
	}

	fn read_moveable<R: Read>(reader: &mut R) -> Result<Moveable> {
		let object_id = reader.read_u32::<LE>()?;
		let num_meshes = reader.read_u16::<LE>()?;
		let starting_mesh = reader.read_u16::<LE>()?;
		let mesh_tree = reader.read_u32::<LE>()?;
		ensure!(mesh_tree % 4 == 0, "moveable {} mesh tree offset {} is not a multiple of 4", object_id, mesh_tree);
		let frame_offset = reader.read_u32::<LE>()?;
		let animation_index = reader.read_u16::<LE>()?;
		if Self::MOVEABLE_FILLER {
			reader.expect_u16_any(&[0xFFEF], "moveable filler")?;
		}
		Ok(Moveable {
			object_id,
			num_meshes,
			starting_mesh,
			mesh_tree_index: mesh_tree / 4,
			frame_offset,
			frame_index: None,
			animation_index,
		})
	}

	fn read_frame_rotations<R: Read>(reader: &mut R, num_meshes: u16) -> Result<Box<[FrameRotation]>> {
		read_packed_rotations(reader, num_meshes)
	}
}

/// Room record layouts of the generations with uncompressed room bodies.
pub(crate) trait RoomLayout: Generation {
	/// Divisor turning vertex lighting into a colour
	const VERTEX_LIGHT_SCALE: f32 = 32767.0;
	/// Rooms end in a fog colour
	const FOG_COLOUR: bool = false;

	fn read_room_vertex<R: Read>(reader: &mut R) -> Result<RoomVertex>;
	fn read_room_ambient<R: Read>(reader: &mut R) -> Result<Ambient>;
	fn read_room_light<R: Read>(reader: &mut R) -> Result<RoomLight>;

	fn read_room_static_mesh<R: Read>(reader: &mut R) -> Result<RoomStaticMesh> {
		read_raw_room_static_mesh(reader)
	}
}

/// Room static mesh with both intensities as stored, TR3 onwards.
pub(crate) fn read_raw_room_static_mesh<R: Read>(reader: &mut R) -> Result<RoomStaticMesh> {
	let position = reader.read_vertex32()?;
	let rotation = read_rotation(reader)?;
	let intensity1 = reader.read_i16::<LE>()?;
	let intensity2 = reader.read_i16::<LE>()?;
	let object_id = reader.read_u16::<LE>()?;
	Ok(RoomStaticMesh { position, rotation, intensity1, intensity2, object_id })
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct Ambient {
	pub intensity1: i16,
	pub intensity2: i16,
	pub light_mode: i16,
}

fn read_motion<R: Read>(reader: &mut R) -> Result<AnimationMotion> {
	Ok(AnimationMotion {
		unknown: reader.read_i16::<LE>()?,
		speed: reader.read_i16::<LE>()?,
		accel_lo: reader.read_i16::<LE>()?,
		accel_hi: reader.read_i16::<LE>()?,
	})
}

pub(crate) fn read_animation<R: Read>(reader: &mut R, lateral: bool) -> Result<Animation> {
	let frame_offset = reader.read_u32::<LE>()?;
	let frame_rate = reader.read_u8()?;
	let frame_size = reader.read_u8()?;
	let state_id = reader.read_u16::<LE>()?;
	let motion = read_motion(reader)?;
	let lateral_motion = match lateral {
		true => Some(read_motion(reader)?),
		false => None,
	};
	Ok(Animation {
		frame_offset,
		frame_rate,
		frame_size,
		state_id,
		motion,
		lateral_motion,
		frame_start: reader.read_u16::<LE>()?,
		frame_end: reader.read_u16::<LE>()?,
		next_animation: reader.read_u16::<LE>()?,
		next_frame: reader.read_u16::<LE>()?,
		num_state_changes: reader.read_u16::<LE>()?,
		state_change_offset: reader.read_u16::<LE>()?,
		num_anim_commands: reader.read_u16::<LE>()?,
		anim_command: reader.read_u16::<LE>()?,
	})
}

#[cfg(test)]
mod tests {
	use std::io::Cursor;
	use crate::{tr1::Tr1, tr4::Tr4, tr5::Tr5, ErrorKind};
	use super::*;

	fn moveable_bytes(mesh_tree: u32, filler: Option<u16>) -> Vec<u8> {
		let mut bytes = vec![];
		bytes.extend_from_slice(&7u32.to_le_bytes());
		bytes.extend_from_slice(&3u16.to_le_bytes());
		bytes.extend_from_slice(&10u16.to_le_bytes());
		bytes.extend_from_slice(&mesh_tree.to_le_bytes());
		bytes.extend_from_slice(&64u32.to_le_bytes());
		bytes.extend_from_slice(&2u16.to_le_bytes());
		if let Some(filler) = filler {
			bytes.extend_from_slice(&filler.to_le_bytes());
		}
		bytes
	}

	#[test]
	fn mesh_tree_offset_becomes_index() {
		let moveable = Tr1::read_moveable(&mut Cursor::new(moveable_bytes(24, None))).unwrap();
		assert_eq!(moveable.mesh_tree_index, 6);
		assert_eq!(moveable.frame_offset, 64);
		assert_eq!(moveable.frame_index, None);
	}

	#[test]
	fn unaligned_mesh_tree_offset_is_rejected() {
		let e = Tr1::read_moveable(&mut Cursor::new(moveable_bytes(6, None))).unwrap_err();
		assert_eq!(e.kind(), ErrorKind::Format);
	}

	#[test]
	fn tr5_moveable_filler_is_checked() {
		assert!(Tr5::read_moveable(&mut Cursor::new(moveable_bytes(8, Some(0xFFEF)))).is_ok());
		let e = Tr5::read_moveable(&mut Cursor::new(moveable_bytes(8, Some(0)))).unwrap_err();
		assert_eq!(e.kind(), ErrorKind::Format);
	}

	#[test]
	fn tr4_animations_have_lateral_motion() {
		let bytes = (0..40u8).collect::<Vec<_>>();
		let animation = Tr4::read_animation(&mut Cursor::new(&bytes)).unwrap();
		assert!(animation.lateral_motion.is_some());
		assert_eq!(animation.anim_command, u16::from_le_bytes([38, 39]));
		let animation = Tr1::read_animation(&mut Cursor::new(&bytes)).unwrap();
		assert!(animation.lateral_motion.is_none());
		assert_eq!(animation.anim_command, u16::from_le_bytes([30, 31]));
	}
}
