use std::{collections::BTreeMap, io::{Cursor, Read}};
use byteorder::{ReadBytesExt, LE};
use log::trace;
use crate::{
	error::ensure,
	generation::Generation,
	model::{Face, FaceLighting, Mesh, MeshLighting, TextureDetails},
	read_boxed_slice_with, read_list_with,
	stream::ReadExt,
	Readable, Result,
};

/// Face without a lighting word, TR1-3 and every room face before TR5.
impl<const N: usize> Readable for Face<N> {
	fn read<R: Read>(reader: &mut R) -> Result<Self> {
		let vertices = <[u16; N]>::read(reader)?;
		let texture = TextureDetails(reader.read_u16::<LE>()?);
		Ok(Face { vertices, texture, lighting: FaceLighting(0) })
	}
}

/// Face followed by a lighting word, TR4-5 meshes and TR5 rooms.
pub(crate) fn read_lit_face<R: Read, const N: usize>(reader: &mut R) -> Result<Face<N>> {
	let face = Face::<N>::read(reader)?;
	let lighting = FaceLighting(reader.read_u16::<LE>()?);
	Ok(Face { lighting, ..face })
}

fn read_faces<G: Generation, R: Read, const N: usize>(reader: &mut R) -> Result<Box<[Face<N>]>> {
	match G::LIT_MESH_FACES {
		true => read_list_with::<_, _, u16, _>(reader, read_lit_face),
		false => read_list_with::<_, _, u16, _>(reader, Face::<N>::read),
	}
}

pub(crate) fn read_mesh<G: Generation, R: Read>(reader: &mut R) -> Result<Mesh> {
	let centre = reader.read_vertex16()?;
	let collision_size = reader.read_i32::<LE>()?;
	let vertices = read_list_with::<_, _, i16, _>(reader, |r| r.read_vertex16())?;
	let lighting = match reader.read_i16::<LE>()? {
		num if num >= 0 => MeshLighting::Normals(read_boxed_slice_with(reader, num as usize, |r| r.read_vertex16())?),
		num => MeshLighting::Lights(read_boxed_slice_with(reader, num.unsigned_abs() as usize, |r| {
			Ok(r.read_i16::<LE>()?)
		})?),
	};
	let textured_rectangles = read_faces::<G, _, 4>(reader)?;
	let textured_triangles = read_faces::<G, _, 3>(reader)?;
	let (coloured_rectangles, coloured_triangles) = match G::LIT_MESH_FACES {
		true => (Box::default(), Box::default()),
		false => (read_faces::<G, _, 4>(reader)?, read_faces::<G, _, 3>(reader)?),
	};
	Ok(Mesh {
		centre,
		collision_size,
		vertices,
		lighting,
		textured_rectangles,
		textured_triangles,
		coloured_rectangles,
		coloured_triangles,
	})
}

/// Decodes each distinct mesh offset once, in ascending order, and rewrites the offsets to arena indices.
pub(crate) fn resolve_meshes<G: Generation>(blob: &[u8], offsets: &[u32]) -> Result<(Box<[Mesh]>, Box<[u32]>)> {
	let mut index_map = BTreeMap::new();
	for &offset in offsets {
		ensure!((offset as usize) < blob.len(), "mesh offset {} is outside {} bytes of mesh data", offset, blob.len());
		index_map.insert(offset, 0);
	}
	let mut meshes = Vec::with_capacity(index_map.len());
	for (&offset, index) in index_map.iter_mut() {
		*index = meshes.len() as u32;
		meshes.push(read_mesh::<G, _>(&mut Cursor::new(&blob[offset as usize..]))?);
	}
	let indices = offsets.iter().map(|offset| index_map[offset]).collect();
	Ok((meshes.into_boxed_slice(), indices))
}

/// Mesh blob in u16 words, then the table of byte offsets into it.
pub(crate) fn read_mesh_data<G: Generation, R: Read>(reader: &mut R) -> Result<(Box<[Mesh]>, Box<[u32]>)> {
	let num_words = reader.read_u32::<LE>()?;
	let blob = reader.read_bytes(num_words as usize * 2)?;
	let offsets = read_list_with::<_, _, u32, _>(reader, |r| Ok(r.read_u32::<LE>()?))?;
	let resolved = resolve_meshes::<G>(&blob, &offsets)?;
	trace!("{} mesh words, {} mesh pointers, {} meshes", num_words, offsets.len(), resolved.0.len());
	Ok(resolved)
}
