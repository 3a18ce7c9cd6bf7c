use std::{collections::BTreeMap, io::{Cursor, Read}};
use byteorder::{ReadBytesExt, LE};
use glam::U16Vec3;
use log::{debug, trace};
use shared::MinMax;
use crate::{
	error::ensure,
	generation::Generation,
	model::{Axis, Frame, FrameRotation, Moveable},
	read_boxed_slice_with,
	stream::ReadExt,
	Result,
};

const SINGLE_AXIS_MASK: u16 = 0x03ff;

/// Three 10-bit angles packed across two words.
pub fn decode_legacy_rotation(word1: u16, word2: u16) -> U16Vec3 {
	U16Vec3 {
		x: (word1 & 0x3ff0) >> 4,
		y: ((word1 & 0x000f) << 6) | ((word2 & 0xfc00) >> 10),
		z: word2 & 0x03ff,
	}
}

/// A rotation word whose top two bits pick the axis and whose low 10 bits hold the angle,
/// or the first of two words when the top bits are 0. `next_word` is only called for the two-word form.
pub fn decode_packed_rotation<F>(word: u16, next_word: F) -> Result<FrameRotation>
where F: FnOnce() -> Result<u16> {
	let axis = match word >> 14 {
		0 => return Ok(FrameRotation::All(decode_legacy_rotation(word, next_word()?))),
		1 => Axis::X,
		2 => Axis::Y,
		_ => Axis::Z,
	};
	Ok(FrameRotation::Single(axis, word & SINGLE_AXIS_MASK))
}

pub(crate) fn read_packed_rotations<R: Read>(reader: &mut R, num_meshes: u16) -> Result<Box<[FrameRotation]>> {
	read_boxed_slice_with(reader, num_meshes as usize, |reader| {
		let word = reader.read_u16::<LE>()?;
		decode_packed_rotation(word, || Ok(reader.read_u16::<LE>()?))
	})
}

/// TR1 frames count their rotations and store each word pair second word first.
pub(crate) fn read_legacy_rotations<R: Read>(reader: &mut R, num_meshes: u16) -> Result<Box<[FrameRotation]>> {
	let count = reader.read_u16::<LE>()?;
	ensure!(count == num_meshes, "frame has {} rotations for {} meshes", count, num_meshes);
	read_boxed_slice_with(reader, count as usize, |reader| {
		let word2 = reader.read_u16::<LE>()?;
		let word1 = reader.read_u16::<LE>()?;
		Ok(FrameRotation::All(decode_legacy_rotation(word1, word2)))
	})
}

pub(crate) fn read_frame<G: Generation, R: Read>(reader: &mut R, byte_offset: u32, num_meshes: u16) -> Result<Frame> {
	let min = reader.read_vertex16()?;
	let max = reader.read_vertex16()?;
	let offset = reader.read_vertex16()?;
	let rotations = G::read_frame_rotations(reader, num_meshes)?;
	Ok(Frame { byte_offset, bounding_box: MinMax { min, max }, offset, rotations })
}

/// Reads the frame blob and the moveables, then decodes each distinct frame offset once and points
/// the moveables at the result. Moveables whose frame can't be decoded keep their byte offset.
pub(crate) fn read_frames_and_moveables<G: Generation, R: Read>(reader: &mut R) -> Result<(Box<[Frame]>, Box<[Moveable]>)> {
	let num_words = reader.read_u32::<LE>()?;
	let blob = reader.read_bytes(num_words as usize * 2)?;
	let num_moveables = reader.read_u32::<LE>()?;
	let mut moveables = read_boxed_slice_with(reader, num_moveables as usize, G::read_moveable)?;
	let mut offsets = BTreeMap::new();
	for moveable in moveables.iter() {
		offsets.entry(moveable.frame_offset).or_insert(moveable.num_meshes);
	}
	let mut frames = Vec::with_capacity(offsets.len());
	let mut frame_indices = BTreeMap::new();
	for (&offset, &num_meshes) in &offsets {
		if offset as usize >= blob.len() {
			debug!("frame offset {} is outside {} bytes of frame data", offset, blob.len());
			continue;
		}
		let mut cursor = Cursor::new(&blob[offset as usize..]);
		match read_frame::<G, _>(&mut cursor, offset, num_meshes) {
			Ok(frame) => {
				frame_indices.insert(offset, frames.len() as u32);
				frames.push(frame);
			},
			Err(e) => debug!("frame at {} not decoded: {}", offset, e),
		}
	}
	for moveable in moveables.iter_mut() {
		if let Some(&index) = frame_indices.get(&moveable.frame_offset) {
			moveable.frame_index = Some(index);
			moveable.frame_offset = 0;
		}
	}
	trace!("{} frame words, {} moveables, {} frames", num_words, moveables.len(), frames.len());
	Ok((frames.into_boxed_slice(), moveables))
}
