use log::debug;
use crate::model::{Colour, Level, Textile, Textile16, Textile32, Textile8};

/// ARGB 1-5-5-5 to `0xAABBGGRR`. Without the opacity bit the pixel is transparent black.
pub fn texel16_to_32(c: u16) -> u32 {
	if c & 0x8000 == 0 {
		return 0;
	}
	let c = c as u32;
	let r = (c & 0x7c00) >> 7;
	let g = (c & 0x03e0) >> 2;
	let b = (c & 0x001f) << 3;
	r | g << 8 | b << 16 | 0xff000000
}

/// Palette index to `0xAABBGGRR`. Index 0 is transparent black.
fn texel8_to_32(index: u8, palette: &[Colour]) -> u32 {
	match (index, palette.get(index as usize)) {
		(0, _) | (_, None) => 0,
		(_, Some(colour)) => Colour { a: 0xff, ..*colour }.to_rgba32(),
	}
}

fn convert16(textile: &Textile16) -> Textile32 {
	Textile { pixels: textile.pixels.iter().map(|&c| texel16_to_32(c)).collect() }
}

fn convert8(textile: &Textile8, palette: &[Colour]) -> Textile32 {
	Textile { pixels: textile.pixels.iter().map(|&i| texel8_to_32(i, palette)).collect() }
}

/// Fills in 32-bit textiles for levels that don't store them. The result only depends on the
/// decoded 8 and 16-bit textiles, so running this again changes nothing.
pub fn normalize(level: &mut Level) {
	if level.has_32bit_textiles {
		return;
	}
	if level.version.generation() == 1 {
		level.textiles32 = level.textiles8.iter().map(|t| convert8(t, &level.palette)).collect();
		debug!("converted {} palette textiles", level.textiles32.len());
		return;
	}
	let num_textiles = level.num_textiles();
	if level.textiles32.len() < num_textiles {
		level.textiles32.resize_with(num_textiles, Textile::blank);
	}
	for (dst, src) in level.textiles32.iter_mut().zip(&level.textiles16) {
		*dst = convert16(src);
	}
	debug!("converted {} 16-bit textiles", level.textiles16.len());
}
