use std::io::{Cursor, Read};
use byteorder::{ReadBytesExt, LE};
use compress::zlib::Decoder;
use log::trace;
use crate::{error::ensure, stream::{ByteStream, ReadExt, SeekExt}, DecodeError, Result};

/// Size header in front of a zlib compressed segment.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Segment {
	pub uncompressed_size: u32,
	pub compressed_size: u32,
}

impl Segment {
	pub fn read<R: Read>(reader: &mut R) -> Result<Self> {
		let uncompressed_size = reader.read_u32::<LE>()?;
		let compressed_size = reader.read_u32::<LE>()?;
		Ok(Segment { uncompressed_size, compressed_size })
	}

	/// Reads the compressed bytes and returns a stream over the inflated ones.
	pub fn inflate<R: Read>(&self, reader: &mut R) -> Result<Cursor<Vec<u8>>> {
		let compressed = reader.read_bytes(self.compressed_size as usize)?;
		let bytes = inflate(&compressed, self.uncompressed_size as usize)?;
		trace!("inflated {} bytes into {}", self.compressed_size, bytes.len());
		Ok(Cursor::new(bytes))
	}

	pub fn skip<S: ByteStream>(&self, stream: &mut S) -> Result<()> {
		trace!("skipping {} compressed bytes", self.compressed_size);
		stream.skip_bytes(self.compressed_size as u64)
	}
}

/// Deflate can't expand a byte into more than this many.
const MAX_DEFLATE_RATIO: usize = 1032;

/// Inflates a zlib stream that must come out at exactly `uncompressed_size` bytes.
pub fn inflate(compressed: &[u8], uncompressed_size: usize) -> Result<Vec<u8>> {
	ensure!(uncompressed_size > 0, "compressed segment declares zero uncompressed bytes");
	ensure!(
		uncompressed_size <= compressed.len().saturating_mul(MAX_DEFLATE_RATIO),
		"segment declares {} uncompressed bytes for {} compressed",
		uncompressed_size,
		compressed.len(),
	);
	let mut bytes = Vec::with_capacity(uncompressed_size);
	Decoder::new(compressed)
		.take(uncompressed_size as u64 + 1)//one extra to detect overlong data
		.read_to_end(&mut bytes)
		.map_err(|e| DecodeError::format(format!("inflate failed: {}", e)))?;
	ensure!(
		bytes.len() == uncompressed_size,
		"inflated {} bytes, segment declares {}",
		bytes.len(),
		uncompressed_size,
	);
	Ok(bytes)
}
