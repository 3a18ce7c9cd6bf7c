use bitfield::bitfield;
use glam::{Vec3, Vec4};
use nonmax::NonMaxU8;
use shared::MinMax;
use crate::Readable;
use super::{Colour, Face};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RoomVertex {
	/// Relative to Room
	pub position: Vec3,
	pub lighting1: i16,
	pub attributes: u16,
	pub lighting2: i16,
	/// TR5
	pub normal: Vec3,
	/// RGBA, 0 to 1
	pub colour: Vec4,
}

#[derive(Readable, Clone, Copy, Debug, PartialEq, Eq)]
pub struct RoomSprite {
	/// Index into Room.vertices
	pub vertex: i16,
	/// Index into sprite_textures
	pub texture: i16,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Portal {
	/// Index into rooms
	pub adjoining_room: u16,
	/// One of the six axis unit vectors
	pub normal: Vec3,
	/// Relative to Room
	pub vertices: [Vec3; 4],
}

#[derive(Readable, Clone, Copy, Debug, PartialEq, Eq)]
pub struct Sector {
	/// Index into floor data
	pub floor_data_index: u16,
	pub box_index: u16,
	/// Index into rooms
	pub room_below: Option<NonMaxU8>,
	pub floor: i8,
	/// Index into rooms
	pub room_above: Option<NonMaxU8>,
	pub ceiling: i8,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RoomLight {
	/// World coords
	pub position: Vec3,
	pub detail: LightDetail,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum LightDetail {
	/// TR1-3
	Fade {
		intensity1: u16,
		intensity2: u16,
		fade1: u32,
		fade2: u32,
	},
	/// TR4
	Coloured(ColouredLight),
	/// TR5
	Float(FloatLight),
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ColouredLight {
	pub colour: Colour,
	pub light_type: u8,
	pub intensity: u8,
	pub r_inner: f32,
	pub r_outer: f32,
	pub length: f32,
	pub cutoff: f32,
	pub direction: Vec3,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FloatLight {
	/// RGB, 0 to 1
	pub colour: Vec3,
	pub r_inner: f32,
	pub r_outer: f32,
	pub direction: Vec3,
	pub position2: Vec3,
	pub direction2: Vec3,
	pub light_type: u8,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RoomStaticMesh {
	/// World coords
	pub position: Vec3,
	/// Degrees
	pub rotation: f32,
	pub intensity1: i16,
	pub intensity2: i16,
	/// Id into static_meshes
	pub object_id: u16,
}

bitfield! {
	#[derive(Clone, Copy, Default, PartialEq, Eq)]
	pub struct RoomFlags(u16);
	impl Debug;
	pub water, _: 0;
}

/// TR5 rooms are split into layers that each own a run of vertices and faces.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RoomLayer {
	pub num_vertices: u16,
	pub unknown_l1: u16,
	pub unknown_l2: u16,
	pub num_rectangles: u16,
	pub num_triangles: u16,
	pub unknown_l3: u16,
	pub unknown_l4: u16,
	pub bounding_box: MinMax<Vec3>,
	pub unknown_l6: [i16; 6],
}

/// TR5 room header values with no decoded meaning.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Tr5RoomInfo {
	pub unknown_r1: u16,
	pub unknown_r2: u16,
	pub unknown_r3: i16,
	pub unknown_r4: u32,
	pub unknown_r5: u32,
	pub unknown_r6: u32,
	pub unknown_r7a: u16,
	pub unknown_r7b: u16,
	pub unknown_r8: u32,
	pub unknown_r9: u32,
	pub light_size: u32,
	pub room_x: f32,
	pub room_z: f32,
	pub room_y_top: f32,
	pub room_y_bottom: f32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Room {
	/// World coords
	pub offset: Vec3,
	pub y_bottom: i32,
	pub y_top: i32,
	/// TR5
	pub layers: Box<[RoomLayer]>,
	pub vertices: Box<[RoomVertex]>,
	/// `vertices` index into Room.vertices
	pub rectangles: Box<[Face<4>]>,
	/// `vertices` index into Room.vertices
	pub triangles: Box<[Face<3>]>,
	pub sprites: Box<[RoomSprite]>,
	pub portals: Box<[Portal]>,
	pub num_z_sectors: u16,
	pub num_x_sectors: u16,
	/// Row-major
	pub sectors: Box<[Sector]>,
	pub intensity1: i16,
	pub intensity2: i16,
	pub light_mode: i16,
	pub lights: Box<[RoomLight]>,
	pub static_meshes: Box<[RoomStaticMesh]>,
	/// Index into rooms, -1 if none
	pub alternate_room: i16,
	pub flags: RoomFlags,
	/// TR3-4
	pub fog_colour: Colour,
	/// RGBA, 0 to 1
	pub light_colour: Vec4,
	pub tr5: Option<Tr5RoomInfo>,
}

impl Room {
	pub fn sector(&self, x: u16, z: u16) -> Option<&Sector> {
		if x >= self.num_x_sectors || z >= self.num_z_sectors {
			return None;
		}
		self.sectors.get(x as usize * self.num_z_sectors as usize + z as usize)
	}

	pub fn alternate(&self) -> Option<u16> {
		u16::try_from(self.alternate_room).ok()
	}
}
