use glam::{U16Vec3, Vec3};
use shared::{MinMax, VecMinMaxFromIterator};
use crate::Readable;
use super::Face;

#[derive(Clone, Debug, PartialEq)]
pub enum MeshLighting {
	Normals(Box<[Vec3]>),
	/// Per-vertex intensity
	Lights(Box<[i16]>),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Mesh {
	pub centre: Vec3,
	pub collision_size: i32,
	/// Relative to the owning moveable or static mesh
	pub vertices: Box<[Vec3]>,
	pub lighting: MeshLighting,
	/// `texture` indexes object_textures
	pub textured_rectangles: Box<[Face<4>]>,
	pub textured_triangles: Box<[Face<3>]>,
	/// TR1-3, `texture` indexes the palettes
	pub coloured_rectangles: Box<[Face<4>]>,
	/// TR1-3
	pub coloured_triangles: Box<[Face<3>]>,
}

impl Mesh {
	/// Empty when the mesh carries light intensities.
	pub fn normals(&self) -> &[Vec3] {
		match &self.lighting {
			MeshLighting::Normals(normals) => normals,
			MeshLighting::Lights(_) => &[],
		}
	}

	/// Empty when the mesh carries normals.
	pub fn lights(&self) -> &[i16] {
		match &self.lighting {
			MeshLighting::Normals(_) => &[],
			MeshLighting::Lights(lights) => lights,
		}
	}

	pub fn bounds(&self) -> Option<MinMax<Vec3>> {
		self.vertices.iter().copied().min_max()
	}
}

/// Fixed-point motion values
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AnimationMotion {
	pub unknown: i16,
	pub speed: i16,
	pub accel_lo: i16,
	pub accel_hi: i16,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Animation {
	/// Byte offset into frame data
	pub frame_offset: u32,
	/// 30ths of a second
	pub frame_rate: u8,
	/// u16 words per frame
	pub frame_size: u8,
	pub state_id: u16,
	pub motion: AnimationMotion,
	/// TR4
	pub lateral_motion: Option<AnimationMotion>,
	pub frame_start: u16,
	pub frame_end: u16,
	/// Index into animations
	pub next_animation: u16,
	pub next_frame: u16,
	pub num_state_changes: u16,
	pub state_change_offset: u16,
	pub num_anim_commands: u16,
	pub anim_command: u16,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MeshTree {
	/// Bit 0 pops the parent stack, bit 1 pushes
	pub flags: u32,
	/// Relative to parent
	pub offset: Vec3,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Moveable {
	pub object_id: u32,
	pub num_meshes: u16,
	/// Index into mesh_indices
	pub starting_mesh: u16,
	/// Index into mesh_trees
	pub mesh_tree_index: u32,
	/// Byte offset into frame data, zero once resolved
	pub frame_offset: u32,
	/// Index into frames
	pub frame_index: Option<u32>,
	/// Index into animations
	pub animation_index: u16,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Axis {
	X,
	Y,
	Z,
}

/// 1024 units per full turn, except TR4-5 single-axis rotations which use 4096.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameRotation {
	Single(Axis, u16),
	All(U16Vec3),
}

impl FrameRotation {
	pub fn angles(&self) -> U16Vec3 {
		match *self {
			FrameRotation::Single(Axis::X, a) => U16Vec3::new(a, 0, 0),
			FrameRotation::Single(Axis::Y, a) => U16Vec3::new(0, a, 0),
			FrameRotation::Single(Axis::Z, a) => U16Vec3::new(0, 0, a),
			FrameRotation::All(angles) => angles,
		}
	}
}

#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
	/// Byte offset into frame data this was decoded from
	pub byte_offset: u32,
	pub bounding_box: MinMax<Vec3>,
	pub offset: Vec3,
	/// One per mesh
	pub rotations: Box<[FrameRotation]>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StaticMesh {
	pub object_id: u32,
	/// Index into mesh_indices
	pub mesh: u16,
	pub visibility_box: MinMax<Vec3>,
	pub collision_box: MinMax<Vec3>,
	pub flags: u16,
}

#[derive(Readable, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ObjectTextureVertex {
	pub xcoordinate: i8,
	pub xpixel: u8,
	pub ycoordinate: i8,
	pub ypixel: u8,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ObjectTexture {
	pub transparency_flags: u16,
	/// Index into textiles
	pub tile: u8,
	pub tile_flags: u8,
	/// TR4-5
	pub flags: u16,
	pub vertices: [ObjectTextureVertex; 4],
	pub unknown1: u32,
	pub unknown2: u32,
	pub x_size: u32,
	pub y_size: u32,
}

#[derive(Readable, Clone, Copy, Debug, PartialEq, Eq)]
pub struct SpriteTexture {
	/// Index into textiles
	pub tile: u16,
	pub x: u8,
	pub y: u8,
	pub width: u16,
	pub height: u16,
	pub left: i16,
	pub top: i16,
	pub right: i16,
	pub bottom: i16,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SpriteSequence {
	pub object_id: i32,
	pub length: i16,
	/// Index into sprite_textures
	pub offset: i16,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Item {
	pub object_id: i16,
	/// Index into rooms
	pub room: i16,
	/// World coords
	pub position: Vec3,
	/// Degrees
	pub rotation: f32,
	pub intensity1: i16,
	pub intensity2: i16,
	pub flags: u16,
}
