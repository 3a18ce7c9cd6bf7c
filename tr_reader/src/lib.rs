extern crate self as tr_reader;

pub mod model;
pub mod stream;
mod common;
mod error;
mod frame;
mod generation;
mod impls;
mod inflate;
mod mesh;
mod normalize;
mod room;
mod textile;
mod tr1;
mod tr2;
mod tr3;
mod tr4;
mod tr5;
mod version;

use std::{fs::File, io::{BufReader, Read}, path::Path};
use log::debug;
use num_traits::AsPrimitive;
pub(crate) use tr_derive::Readable;

pub use error::{DecodeError, ErrorKind, Result, Step};
pub use frame::{decode_legacy_rotation, decode_packed_rotation};
pub use inflate::inflate;
pub use model::Level;
pub use normalize::{normalize, texel16_to_32};
pub use stream::ByteStream;
pub use version::{Decoder, DecoderState, ParseVersionError, Version};

pub(crate) trait Readable: Sized {
	fn read<R: Read>(reader: &mut R) -> Result<Self>;
}

pub(crate) fn read_boxed_slice<R: Read, T: Readable>(reader: &mut R, len: usize) -> Result<Box<[T]>> {
	read_boxed_slice_with(reader, len, T::read)
}

/// Like `read_boxed_slice` for records whose layout depends on the generation.
pub(crate) fn read_boxed_slice_with<R: Read, T, F>(reader: &mut R, len: usize, mut read: F) -> Result<Box<[T]>>
where F: FnMut(&mut R) -> Result<T> {
	let mut vec = Vec::with_capacity(len.min(1 << 16));
	for _ in 0..len {
		vec.push(read(reader)?);
	}
	Ok(vec.into_boxed_slice())
}

pub(crate) fn read_list<R: Read, T: Readable, L: Readable + AsPrimitive<usize>>(reader: &mut R) -> Result<Box<[T]>> {
	let len = L::read(reader)?.as_();
	read_boxed_slice(reader, len)
}

pub(crate) fn read_list_with<R, T, L, F>(reader: &mut R, read: F) -> Result<Box<[T]>>
where R: Read, L: Readable + AsPrimitive<usize>, F: FnMut(&mut R) -> Result<T> {
	let len = L::read(reader)?.as_();
	read_boxed_slice_with(reader, len, read)
}

/// Discards bytes from a plain reader.
pub(crate) fn skip<R: Read>(reader: &mut R, num: usize) -> Result<()> {
	let copied = std::io::copy(&mut reader.take(num as u64), &mut std::io::sink())?;
	if copied < num as u64 {
		return Err(std::io::Error::from(std::io::ErrorKind::UnexpectedEof).into());
	}
	Ok(())
}

/// Decodes a whole level. The version tag picks the layout, the magic only confirms it.
pub fn decode<S: ByteStream>(stream: S, version: Version) -> Result<Level> {
	Decoder::new(stream, version).decode()
}

pub fn decode_file<P: AsRef<Path>>(path: P, version: Version) -> Result<Level> {
	let path = path.as_ref();
	debug!("decoding {} as {}", path.display(), version);
	let file = File::open(path)?;
	decode(BufReader::new(file), version)
}
