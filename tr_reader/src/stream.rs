use std::io::{self, Read, Seek, SeekFrom};
use byteorder::{ReadBytesExt, LE};
use glam::{vec3, Vec3};
use crate::{error::ensure, Result};

/// Anything the decoder can read from. Closing is dropping.
pub trait ByteStream: Read + Seek {}

impl<T: Read + Seek + ?Sized> ByteStream for T {}

/// Readers for the on-disk coordinate system, which mirrors y and z.
pub(crate) trait ReadExt: Read {
	fn read_vertex16(&mut self) -> Result<Vec3> {
		let x = self.read_i16::<LE>()?;
		let y = self.read_i16::<LE>()?;
		let z = self.read_i16::<LE>()?;
		Ok(vec3(x as f32, -(y as f32), -(z as f32)))
	}

	fn read_vertex32(&mut self) -> Result<Vec3> {
		let x = self.read_i32::<LE>()?;
		let y = self.read_i32::<LE>()?;
		let z = self.read_i32::<LE>()?;
		Ok(vec3(x as f32, -(y as f32), -(z as f32)))
	}

	fn read_vertex_float(&mut self) -> Result<Vec3> {
		let x = self.read_f32::<LE>()?;
		let y = self.read_f32::<LE>()?;
		let z = self.read_f32::<LE>()?;
		Ok(vec3(x, -y, -z))
	}

	/// Grows with the bytes actually present, so a corrupt length fails as a short read.
	fn read_bytes(&mut self, len: usize) -> Result<Vec<u8>> {
		let mut bytes = Vec::with_capacity(len.min(1 << 16));
		Read::take(&mut *self, len as u64).read_to_end(&mut bytes)?;
		if bytes.len() < len {
			return Err(io::Error::new(
				io::ErrorKind::UnexpectedEof,
				format!("read of {} bytes found only {}", len, bytes.len()),
			).into());
		}
		Ok(bytes)
	}

	/// Separator constant that must match exactly.
	fn expect_u32(&mut self, expected: u32, what: &str) -> Result<()> {
		let value = self.read_u32::<LE>()?;
		ensure!(value == expected, "{}: expected {:#010x}, found {:#010x}", what, expected, value);
		Ok(())
	}

	/// Separator that may take any of a few values.
	fn expect_u32_any(&mut self, expected: &[u32], what: &str) -> Result<u32> {
		let value = self.read_u32::<LE>()?;
		ensure!(expected.contains(&value), "{}: unexpected value {:#010x}", what, value);
		Ok(value)
	}

	fn expect_u16_any(&mut self, expected: &[u16], what: &str) -> Result<u16> {
		let value = self.read_u16::<LE>()?;
		ensure!(expected.contains(&value), "{}: unexpected value {:#06x}", what, value);
		Ok(value)
	}

	/// Literal section marker such as `SPR`.
	fn expect_marker(&mut self, marker: &[u8]) -> Result<()> {
		let found = self.read_bytes(marker.len())?;
		ensure!(
			found == marker,
			"expected marker {:?}, found {:?}",
			String::from_utf8_lossy(marker),
			String::from_utf8_lossy(&found),
		);
		Ok(())
	}
}

impl<R: Read + ?Sized> ReadExt for R {}

pub(crate) trait SeekExt: Seek {
	fn tell(&mut self) -> Result<u64> {
		Ok(self.stream_position()?)
	}

	fn seek_to(&mut self, pos: u64) -> Result<()> {
		self.seek(SeekFrom::Start(pos))?;
		Ok(())
	}

	/// Seeks forward, failing like a short read if that would pass the end.
	fn skip_bytes(&mut self, len: u64) -> Result<()> {
		let pos = self.stream_position()?;
		let end = self.seek(SeekFrom::End(0))?;
		let target = pos.saturating_add(len);
		if target > end {
			self.seek(SeekFrom::Start(end))?;
			return Err(io::Error::new(
				io::ErrorKind::UnexpectedEof,
				format!("skip of {} bytes at {} passes end of stream at {}", len, pos, end),
			).into());
		}
		self.seek(SeekFrom::Start(target))?;
		Ok(())
	}
}

impl<S: Seek + ?Sized> SeekExt for S {}
