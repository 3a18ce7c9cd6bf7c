mod object;
mod room;

pub use object::*;
pub use room::*;

use std::fmt;
use bitfield::bitfield;
use crate::Version;

pub const TEXTILE_SIZE: usize = 256;
pub const NUM_PIXELS: usize = TEXTILE_SIZE * TEXTILE_SIZE;
pub const PALETTE_SIZE: usize = 256;
pub const LIGHTMAP_SIZE: usize = 32 * 256;

/// One 256x256 texture page.
#[derive(Clone, PartialEq, Eq)]
pub struct Textile<P> {
	/// Row-major, `NUM_PIXELS` long
	pub pixels: Box<[P]>,
}

impl<P: Copy + Default> Textile<P> {
	pub fn blank() -> Self {
		Textile { pixels: vec![P::default(); NUM_PIXELS].into_boxed_slice() }
	}
}

impl<P> fmt::Debug for Textile<P> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "Textile({} pixels)", self.pixels.len())
	}
}

/// Palette indices
pub type Textile8 = Textile<u8>;
/// ARGB 1-5-5-5
pub type Textile16 = Textile<u16>;
/// `0xAABBGGRR`, red in the low byte
pub type Textile32 = Textile<u32>;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Colour {
	pub r: u8,
	pub g: u8,
	pub b: u8,
	pub a: u8,
}

impl Colour {
	/// Packs as a 32-bit textile pixel.
	pub fn to_rgba32(self) -> u32 {
		self.r as u32 | (self.g as u32) << 8 | (self.b as u32) << 16 | (self.a as u32) << 24
	}
}

/// Textile categories of the compressed formats, zero otherwise.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TextileCounts {
	pub room: u16,
	pub object: u16,
	pub bump: u16,
	pub misc: u16,
}

impl TextileCounts {
	pub fn total(&self) -> usize {
		self.room as usize + self.object as usize + self.bump as usize + self.misc as usize
	}
}

bitfield! {
	#[derive(Clone, Copy, PartialEq, Eq)]
	pub struct TextureDetails(u16);
	impl Debug;
	/// Index into palette, coloured faces
	pub palette3_index, _: 7, 0;
	/// Index into palette16, coloured faces
	pub palette4_index, _: 15, 8;
	/// Index into object_textures
	pub texture_index, _: 14, 0;
	pub double_sided, _: 15;
}

bitfield! {
	#[derive(Clone, Copy, Default, PartialEq, Eq)]
	pub struct FaceLighting(u16);
	impl Debug;
	pub additive, _: 0;
	pub shine_strength, _: 7, 1;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Face<const N: usize> {
	/// Index into the owning vertex list
	pub vertices: [u16; N],
	pub texture: TextureDetails,
	/// Zero before TR4
	pub lighting: FaceLighting,
}

/// TR5 header values with no known meaning beyond these two.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Tr5LevelFlags {
	pub lara_type: u16,
	pub weather: u16,
}

/// Record counts of sections that are read only for their size.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SkippedSections {
	/// u16 words
	pub floor_data: u32,
	pub state_changes: u32,
	pub anim_dispatches: u32,
	/// u16 words
	pub anim_commands: u32,
	pub cameras: u32,
	pub flyby_cameras: u32,
	pub sound_sources: u32,
	pub boxes: u32,
	/// u16 words
	pub overlaps: u32,
	/// u16 words
	pub animated_textures: u32,
	pub ai_objects: u32,
	pub cinematic_frames: u32,
	/// Bytes
	pub demo_data: u32,
	pub sound_details: u32,
	/// Bytes
	pub samples: u32,
	pub sample_indices: u32,
}

/// Everything decoded from one level file.
#[derive(Clone, Debug)]
pub struct Level {
	pub version: Version,
	pub textile_counts: TextileCounts,
	/// True when the 32-bit textile segment was present on disk
	pub has_32bit_textiles: bool,
	pub textiles8: Vec<Textile8>,
	pub textiles16: Vec<Textile16>,
	pub textiles32: Vec<Textile32>,
	/// TR1-3
	pub palette: Box<[Colour]>,
	/// TR2-3
	pub palette16: Box<[Colour]>,
	pub rooms: Box<[Room]>,
	pub meshes: Box<[Mesh]>,
	/// Index into meshes
	pub mesh_indices: Box<[u32]>,
	pub animations: Box<[Animation]>,
	pub mesh_trees: Box<[MeshTree]>,
	pub frames: Box<[Frame]>,
	pub moveables: Box<[Moveable]>,
	pub static_meshes: Box<[StaticMesh]>,
	pub object_textures: Box<[ObjectTexture]>,
	pub sprite_textures: Box<[SpriteTexture]>,
	pub sprite_sequences: Box<[SpriteSequence]>,
	pub items: Box<[Item]>,
	/// TR1-3
	pub lightmap: Box<[u8]>,
	pub tr5_flags: Option<Tr5LevelFlags>,
	pub skipped: SkippedSections,
}

impl Level {
	pub(crate) fn new(version: Version) -> Self {
		Level {
			version,
			textile_counts: TextileCounts::default(),
			has_32bit_textiles: false,
			textiles8: vec![],
			textiles16: vec![],
			textiles32: vec![],
			palette: Box::new([]),
			palette16: Box::new([]),
			rooms: Box::new([]),
			meshes: Box::new([]),
			mesh_indices: Box::new([]),
			animations: Box::new([]),
			mesh_trees: Box::new([]),
			frames: Box::new([]),
			moveables: Box::new([]),
			static_meshes: Box::new([]),
			object_textures: Box::new([]),
			sprite_textures: Box::new([]),
			sprite_sequences: Box::new([]),
			items: Box::new([]),
			lightmap: Box::new([]),
			tr5_flags: None,
			skipped: SkippedSections::default(),
		}
	}

	/// Number of textiles, misc slots included.
	pub fn num_textiles(&self) -> usize {
		match self.textile_counts.total() {
			0 => self.textiles8.len().max(self.textiles16.len()),
			total => total,
		}
	}

	/// The mesh a mesh_indices entry points at.
	pub fn mesh(&self, mesh_index: usize) -> Option<&Mesh> {
		let arena_index = *self.mesh_indices.get(mesh_index)?;
		self.meshes.get(arena_index as usize)
	}

	/// The resolved first frame of a moveable.
	pub fn frame(&self, moveable: &Moveable) -> Option<&Frame> {
		self.frames.get(moveable.frame_index? as usize)
	}

	/// Colour of a TR1-3 coloured mesh face: the low byte indexes `palette` in TR1,
	/// the high byte indexes `palette16` in TR2 and TR3.
	pub fn face_colour(&self, texture: TextureDetails) -> Option<Colour> {
		match self.version.generation() {
			1 => self.palette.get(texture.palette3_index() as usize).copied(),
			2 | 3 => self.palette16.get(texture.palette4_index() as usize).copied(),
			_ => None,
		}
	}
}
