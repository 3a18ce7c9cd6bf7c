use std::io::Read;
use byteorder::{ReadBytesExt, LE};
use log::trace;
use crate::{
	error::ensure,
	inflate::Segment,
	model::{Level, Textile, Textile16, Textile32, Textile8, TextileCounts, NUM_PIXELS},
	stream::ByteStream,
	Result,
};

/// Bytes in one 32-bit textile.
const TEXTILE32_BYTES: u32 = NUM_PIXELS as u32 * 4;

pub(crate) fn read_textile8<R: Read>(reader: &mut R) -> Result<Textile8> {
	let mut pixels = vec![0; NUM_PIXELS].into_boxed_slice();
	reader.read_exact(&mut pixels)?;
	Ok(Textile { pixels })
}

pub(crate) fn read_textile16<R: Read>(reader: &mut R) -> Result<Textile16> {
	let mut pixels = vec![0; NUM_PIXELS].into_boxed_slice();
	reader.read_u16_into::<LE>(&mut pixels)?;
	Ok(Textile { pixels })
}

/// Swaps the on-disk BGRA order to red in the low byte.
pub(crate) fn bgra_to_rgba(p: u32) -> u32 {
	p & 0xff00ff00 | (p & 0x00ff0000) >> 16 | (p & 0x000000ff) << 16
}

pub(crate) fn read_textile32<R: Read>(reader: &mut R) -> Result<Textile32> {
	let mut pixels = vec![0; NUM_PIXELS].into_boxed_slice();
	reader.read_u32_into::<LE>(&mut pixels)?;
	for p in pixels.iter_mut() {
		*p = bgra_to_rgba(*p);
	}
	Ok(Textile { pixels })
}

pub(crate) fn read_textile_count<R: Read>(reader: &mut R) -> Result<usize> {
	Ok(reader.read_u32::<LE>()? as usize)
}

pub(crate) fn read_textiles<R: Read, T>(reader: &mut R, count: usize, read: fn(&mut R) -> Result<Textile<T>>) -> Result<Vec<Textile<T>>> {
	let mut textiles = Vec::with_capacity(count.min(256));
	for _ in 0..count {
		textiles.push(read(reader)?);
	}
	Ok(textiles)
}

/// Textile counts and the three compressed textile segments of TR4 and TR5.
pub(crate) fn read_compressed_textiles<S: ByteStream>(stream: &mut S, level: &mut Level, num_misc: u16) -> Result<()> {
	let counts = TextileCounts {
		room: stream.read_u16::<LE>()?,
		object: stream.read_u16::<LE>()?,
		bump: stream.read_u16::<LE>()?,
		misc: num_misc,
	};
	let num_textiles = counts.total();
	let num_main = num_textiles - num_misc as usize;
	level.textile_counts = counts;
	trace!("{} room, {} object, {} bump textiles", counts.room, counts.object, counts.bump);

	let segment = Segment::read(stream)?;
	ensure!(segment.uncompressed_size != 0, "32-bit textile segment declares zero bytes");
	if segment.compressed_size > 0 {
		let mut nested = segment.inflate(stream)?;
		let mut textiles = read_textiles(&mut nested, num_main, read_textile32)?;
		textiles.resize_with(num_textiles, Textile::blank);
		level.textiles32 = textiles;
		level.has_32bit_textiles = true;
	}

	let segment = Segment::read(stream)?;
	ensure!(segment.uncompressed_size != 0, "16-bit textile segment declares zero bytes");
	if segment.compressed_size > 0 {
		if level.textiles32.is_empty() {
			let mut nested = segment.inflate(stream)?;
			level.textiles16 = read_textiles(&mut nested, num_main, read_textile16)?;
		} else {
			segment.skip(stream)?;
		}
	}

	let segment = Segment::read(stream)?;
	ensure!(segment.uncompressed_size != 0, "misc textile segment declares zero bytes");
	if segment.compressed_size > 0 {
		let num_present = segment.uncompressed_size / TEXTILE32_BYTES;
		ensure!(
			num_present <= num_misc as u32,
			"misc textile segment holds {} textiles, at most {} allowed",
			num_present,
			num_misc,
		);
		if level.textiles32.is_empty() {
			level.textiles32.resize_with(num_textiles, Textile::blank);
		}
		let mut nested = segment.inflate(stream)?;
		for slot in &mut level.textiles32[num_main..num_main + num_present as usize] {
			*slot = read_textile32(&mut nested)?;
		}
	}
	Ok(())
}
