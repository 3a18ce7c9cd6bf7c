use std::io::Read;
use byteorder::{ReadBytesExt, LE};
use glam::{vec3, Vec3, Vec4};
use log::trace;
use crate::{
	common::read_colour,
	error::ensure,
	generation::RoomLayout,
	model::{Colour, Portal, Room, RoomFlags, RoomSprite, Sector},
	read_boxed_slice, read_list, read_list_with,
	stream::{ByteStream, ReadExt, SeekExt},
	Readable, Result,
};

const AXES: [Vec3; 6] = [Vec3::X, Vec3::NEG_X, Vec3::Y, Vec3::NEG_Y, Vec3::Z, Vec3::NEG_Z];

/// Portals must face straight along one axis.
impl Readable for Portal {
	fn read<R: Read>(reader: &mut R) -> Result<Self> {
		let adjoining_room = reader.read_u16::<LE>()?;
		let normal = reader.read_vertex16()?;
		ensure!(AXES.contains(&normal), "portal to room {} has off-axis normal {}", adjoining_room, normal);
		let vertices = [
			reader.read_vertex16()?,
			reader.read_vertex16()?,
			reader.read_vertex16()?,
			reader.read_vertex16()?,
		];
		Ok(Portal { adjoining_room, normal, vertices })
	}
}

pub(crate) struct Sectors {
	pub num_z: u16,
	pub num_x: u16,
	pub sectors: Box<[Sector]>,
}

impl Readable for Sectors {
	fn read<R: Read>(reader: &mut R) -> Result<Self> {
		let num_z = reader.read_u16::<LE>()?;
		let num_x = reader.read_u16::<LE>()?;
		let sectors = read_boxed_slice(reader, num_z as usize * num_x as usize)?;
		Ok(Sectors { num_z, num_x, sectors })
	}
}

pub(crate) fn light_colour(intensity: i16) -> Vec4 {
	let v = intensity as f32 / 32767.0;
	Vec4::new(v, v, v, 1.0)
}

/// Uncompressed room layout of TR1-4.
pub(crate) fn read_room<G: RoomLayout, S: ByteStream>(stream: &mut S) -> Result<Room> {
	let x = stream.read_i32::<LE>()?;
	let z = stream.read_i32::<LE>()?;
	let offset = vec3(x as f32, 0.0, -(z as f32));
	let y_bottom = stream.read_i32::<LE>()?.wrapping_neg();
	let y_top = stream.read_i32::<LE>()?.wrapping_neg();
	let num_data_words = stream.read_u32::<LE>()?;
	let data_start = stream.tell()?;
	let mut vertices = read_list_with::<_, _, u16, _>(stream, G::read_room_vertex)?;
	for vertex in vertices.iter_mut() {
		let v = vertex.lighting1 as f32 / G::VERTEX_LIGHT_SCALE;
		vertex.colour = Vec4::new(v, v, v, 1.0);
	}
	let rectangles = read_list::<_, _, u16>(stream)?;
	let triangles = read_list::<_, _, u16>(stream)?;
	let sprites = read_list::<_, RoomSprite, u16>(stream)?;
	// the geometry counts don't always cover the whole data block
	stream.seek_to(data_start + num_data_words as u64 * 2)?;
	let portals = read_list::<_, Portal, u16>(stream)?;
	let Sectors { num_z, num_x, sectors } = Sectors::read(stream)?;
	let ambient = G::read_room_ambient(stream)?;
	let lights = read_list_with::<_, _, u16, _>(stream, G::read_room_light)?;
	let static_meshes = read_list_with::<_, _, u16, _>(stream, G::read_room_static_mesh)?;
	let alternate_room = stream.read_i16::<LE>()?;
	let flags = RoomFlags(stream.read_u16::<LE>()?);
	let fog_colour = match G::FOG_COLOUR {
		true => read_colour(stream)?,
		false => Colour::default(),
	};
	trace!(
		"room at ({}, {}): {} vertices, {} rectangles, {} triangles, {} portals, {}x{} sectors",
		x,
		z,
		vertices.len(),
		rectangles.len(),
		triangles.len(),
		portals.len(),
		num_x,
		num_z,
	);
	Ok(Room {
		offset,
		y_bottom,
		y_top,
		layers: Box::default(),
		vertices,
		rectangles,
		triangles,
		sprites,
		portals,
		num_z_sectors: num_z,
		num_x_sectors: num_x,
		sectors,
		intensity1: ambient.intensity1,
		intensity2: ambient.intensity2,
		light_mode: ambient.light_mode,
		lights,
		static_meshes,
		alternate_room,
		flags,
		fog_colour,
		light_colour: light_colour(ambient.intensity1),
		tr5: None,
	})
}

#[cfg(test)]
mod tests {
	use std::io::Cursor;
	use crate::{tr1::Tr1, ErrorKind};
	use super::*;

	fn portal_bytes(normal: [i16; 3]) -> Vec<u8> {
		let mut bytes = 3u16.to_le_bytes().to_vec();
		for v in normal.into_iter().chain([0; 12]) {
			bytes.extend_from_slice(&v.to_le_bytes());
		}
		bytes
	}

	#[test]
	fn axis_normals_are_accepted() {
		for normal in [[1, 0, 0], [-1, 0, 0], [0, 1, 0], [0, -1, 0], [0, 0, 1], [0, 0, -1]] {
			let portal = Portal::read(&mut Cursor::new(portal_bytes(normal))).unwrap();
			assert_eq!(portal.adjoining_room, 3);
			assert_eq!(portal.normal.length(), 1.0);
		}
	}

	#[test]
	fn off_axis_normal_is_rejected() {
		let e = Portal::read(&mut Cursor::new(portal_bytes([1, 1, 0]))).unwrap_err();
		assert_eq!(e.kind(), ErrorKind::Format);
		let e = Portal::read(&mut Cursor::new(portal_bytes([0, 0, 2]))).unwrap_err();
		assert_eq!(e.kind(), ErrorKind::Format);
	}

	#[test]
	fn sectors_read_as_a_grid() {
		let mut bytes = vec![];
		bytes.extend_from_slice(&2u16.to_le_bytes());
		bytes.extend_from_slice(&3u16.to_le_bytes());
		for i in 0..6u8 {
			bytes.extend_from_slice(&[i, 0, 0, 0, 255, 0xF8, i, 8]);
		}
		let sectors = Sectors::read(&mut Cursor::new(bytes)).unwrap();
		assert_eq!((sectors.num_z, sectors.num_x), (2, 3));
		assert_eq!(sectors.sectors.len(), 6);
		assert!(sectors.sectors[4].room_below.is_none());
		assert_eq!(sectors.sectors[4].room_above.map(|r| r.get()), Some(4));
		assert_eq!(sectors.sectors[4].floor, -8);
	}

	#[test]
	fn extreme_heights_dont_overflow() {
		let mut bytes = vec![];
		for v in [0, 0, i32::MIN, i32::MAX] {
			bytes.extend_from_slice(&v.to_le_bytes());
		}
		// empty geometry, portals, sectors, lights and static meshes
		bytes.extend_from_slice(&4u32.to_le_bytes());
		bytes.extend_from_slice(&[0; 14]);
		bytes.extend_from_slice(&4095i16.to_le_bytes());
		bytes.extend_from_slice(&[0; 4]);
		bytes.extend_from_slice(&(-1i16).to_le_bytes());
		bytes.extend_from_slice(&0u16.to_le_bytes());
		let room = read_room::<Tr1, _>(&mut Cursor::new(bytes)).unwrap();
		assert_eq!(room.y_bottom, i32::MIN);
		assert_eq!(room.y_top, -i32::MAX);
		assert_eq!(room.alternate(), None);
	}
}
