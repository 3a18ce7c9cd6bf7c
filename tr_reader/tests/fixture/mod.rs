//! Builders for small synthetic level files.
#![allow(dead_code)]

use std::io::Write;
use byteorder::{WriteBytesExt, LE};
use flate2::{write::ZlibEncoder, Compression};
use tr_reader::Version;

pub const TEXTILE_PIXELS: usize = 256 * 256;
/// First pixel of every 32-bit room textile, BGRA on disk
pub const TEXEL32: [u8; 4] = [0x10, 0x20, 0x30, 0xFF];
/// First pixel of every misc textile, BGRA on disk
pub const MISC_TEXEL32: [u8; 4] = [0x40, 0x50, 0x60, 0x80];
/// First pixel of every 16-bit textile
pub const TEXEL16: u16 = 0x801F;

#[derive(Default)]
pub struct Bytes(pub Vec<u8>);

impl Bytes {
	pub fn u8(&mut self, v: u8) -> &mut Self {
		self.0.write_u8(v).unwrap();
		self
	}

	pub fn u16(&mut self, v: u16) -> &mut Self {
		self.0.write_u16::<LE>(v).unwrap();
		self
	}

	pub fn i16(&mut self, v: i16) -> &mut Self {
		self.0.write_i16::<LE>(v).unwrap();
		self
	}

	pub fn u32(&mut self, v: u32) -> &mut Self {
		self.0.write_u32::<LE>(v).unwrap();
		self
	}

	pub fn i32(&mut self, v: i32) -> &mut Self {
		self.0.write_i32::<LE>(v).unwrap();
		self
	}

	pub fn f32(&mut self, v: f32) -> &mut Self {
		self.0.write_f32::<LE>(v).unwrap();
		self
	}

	pub fn bytes(&mut self, v: &[u8]) -> &mut Self {
		self.0.extend_from_slice(v);
		self
	}

	pub fn zeros(&mut self, len: usize) -> &mut Self {
		self.0.resize(self.0.len() + len, 0);
		self
	}

	pub fn len(&self) -> usize {
		self.0.len()
	}
}

pub fn deflate(bytes: &[u8]) -> Vec<u8> {
	let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
	encoder.write_all(bytes).unwrap();
	encoder.finish().unwrap()
}

/// Size header and zlib data, or an absent segment when `data` is empty.
fn segment(out: &mut Bytes, data: &[u8]) {
	if data.is_empty() {
		out.u32(1).u32(0);
		return;
	}
	let compressed = deflate(data);
	out.u32(data.len() as u32).u32(compressed.len() as u32).bytes(&compressed);
}

/// Vertices and faces that TR5 stores as one layer. Other generations concatenate the layers,
/// shifting face indices past the vertices of earlier layers.
#[derive(Clone, Default)]
pub struct Layer {
	pub vertices: Vec<[i16; 3]>,
	pub rectangles: Vec<[u16; 4]>,
	pub triangles: Vec<[u16; 3]>,
}

impl Layer {
	pub fn square() -> Self {
		Layer {
			vertices: vec![[0, 0, 0], [1024, 0, 0], [1024, 0, 1024], [0, 0, 1024]],
			rectangles: vec![[0, 1, 2, 3]],
			triangles: vec![],
		}
	}

	pub fn triangle() -> Self {
		Layer {
			vertices: vec![[0, -256, 0], [512, -256, 0], [0, -256, 512]],
			rectangles: vec![],
			triangles: vec![[0, 1, 2]],
		}
	}
}

#[derive(Clone)]
pub struct RoomDesc {
	pub x: i32,
	pub z: i32,
	pub layers: Vec<Layer>,
	pub portal_normals: Vec<[i16; 3]>,
	pub water: bool,
	pub y_bottom: i32,
	/// TR5 only, declares one rectangle more than the layers hold
	pub bad_rectangle_count: bool,
}

impl RoomDesc {
	pub fn new(x: i32, z: i32) -> Self {
		RoomDesc {
			x,
			z,
			layers: vec![Layer::square()],
			portal_normals: vec![[1, 0, 0]],
			water: false,
			y_bottom: 0,
			bad_rectangle_count: false,
		}
	}

	fn flattened(&self) -> Layer {
		let mut flat = Layer::default();
		for layer in &self.layers {
			let base = flat.vertices.len() as u16;
			flat.vertices.extend_from_slice(&layer.vertices);
			flat.rectangles.extend(layer.rectangles.iter().map(|r| r.map(|i| i + base)));
			flat.triangles.extend(layer.triangles.iter().map(|t| t.map(|i| i + base)));
		}
		flat
	}
}

fn write_portals(out: &mut Bytes, room: &RoomDesc) {
	out.u16(room.portal_normals.len() as u16);
	for normal in &room.portal_normals {
		out.u16(1);
		for v in normal {
			out.i16(*v);
		}
		out.zeros(24);
	}
}

/// One sector with no room below and room 3 above.
fn write_sector(out: &mut Bytes) {
	out.u16(0).u16(0).u8(255).u8(0xFC).u8(3).u8(8);
}

/// Uncompressed room layout of TR1-4.
fn write_room(out: &mut Bytes, generation: u8, room: &RoomDesc) {
	out.i32(room.x).i32(room.z).i32(room.y_bottom).i32(-1024);
	let flat = room.flattened();
	let mut data = Bytes::default();
	data.u16(flat.vertices.len() as u16);
	for v in &flat.vertices {
		data.i16(v[0]).i16(v[1]).i16(v[2]);
		match generation {
			1 => data.i16(4095),
			_ => data.i16(4095).u16(0).i16(4095),
		};
	}
	data.u16(flat.rectangles.len() as u16);
	for r in &flat.rectangles {
		r.iter().for_each(|&i| {
			data.u16(i);
		});
		data.u16(3);
	}
	data.u16(flat.triangles.len() as u16);
	for t in &flat.triangles {
		t.iter().for_each(|&i| {
			data.u16(i);
		});
		data.u16(3);
	}
	data.u16(0);
	out.u32(data.len() as u32 / 2).bytes(&data.0);
	write_portals(out, room);
	out.u16(1).u16(1);
	write_sector(out);
	match generation {
		1 => out.i16(4095),
		2 => out.i16(4095).i16(4095).i16(1),
		_ => out.i16(4095).i16(4095),
	};
	out.u16(0).u16(0).i16(-1).u16(room.water as u16);
	if generation >= 3 {
		out.u8(1).u8(2).u8(3);
	}
}

const CD: u32 = 0xCDCD_CDCD;

/// Compressed-era room: `XELA`, the body size and a body with a 208-byte header.
fn write_tr5_room(out: &mut Bytes, room: &RoomDesc) {
	let num_vertices = room.layers.iter().map(|l| l.vertices.len()).sum::<usize>();
	let num_rectangles = room.layers.iter().map(|l| l.rectangles.len()).sum::<usize>();
	let num_triangles = room.layers.iter().map(|l| l.triangles.len()).sum::<usize>();

	let mut sections = Bytes::default();
	let sector_offset = sections.len() as u32;
	write_sector(&mut sections);
	write_portals(&mut sections, room);
	let static_offset = sections.len() as u32;
	let layer_offset = static_offset;
	for layer in &room.layers {
		sections
			.u16(layer.vertices.len() as u16)
			.u16(0)
			.u16(0)
			.u16(layer.rectangles.len() as u16)
			.u16(layer.triangles.len() as u16)
			.u16(0)
			.u16(0)
			.u16(0);
		for v in [-1.0, -2.0, -3.0, 1.0, 2.0, 3.0] {
			sections.f32(v);
		}
		sections.u32(0).zeros(12);
	}
	let poly_offset = sections.len() as u32;
	for layer in &room.layers {
		for r in &layer.rectangles {
			r.iter().for_each(|&i| {
				sections.u16(i);
			});
			sections.u16(3).u16(0);
		}
		for t in &layer.triangles {
			t.iter().for_each(|&i| {
				sections.u16(i);
			});
			sections.u16(3).u16(0);
		}
	}
	let vertices_offset = sections.len() as u32;
	for layer in &room.layers {
		for v in &layer.vertices {
			sections.f32(v[0] as f32).f32(v[1] as f32).f32(v[2] as f32);
			sections.f32(0.0).f32(-1.0).f32(0.0);
			sections.bytes(&[0, 0, 255, 255]);
		}
	}

	let mut body = Bytes::default();
	body.u32(CD).u32(0).u32(sector_offset).u32(0).u32(static_offset);
	body.i32(room.x).i32(0).i32(room.z).i32(room.y_bottom).i32(-1024);
	body.u16(1).u16(1).bytes(&[0, 0, 255, 255]);
	body.u16(0).u16(0).u16(0).u16(0);
	body.u32(0x7FFF).u32(0x7FFF).u32(CD).u32(CD).u32(0xFFFF_FFFF);
	body.i16(0).u16(room.water as u16);
	body.u32(0).u32(0).u32(0).u32(0);
	body.u16(0).u16(0).f32(room.x as f32).u32(0).f32(-room.z as f32);
	body.u32(CD).u32(CD).u32(CD).u32(CD).u32(CD).u32(CD);
	body.u32(num_triangles as u32);
	body.u32(num_rectangles as u32 + room.bad_rectangle_count as u32);
	body.u32(0).u32(0).u32(0).u32(0);
	body.f32(1024.0).f32(0.0);
	body.u32(room.layers.len() as u32).u32(layer_offset).u32(vertices_offset).u32(poly_offset).u32(poly_offset);
	body.u32(num_vertices as u32 * 28);
	body.u32(CD).u32(CD).u32(CD).u32(CD);
	assert_eq!(body.len(), 208);
	body.bytes(&sections.0);

	out.u32(0x414C_4558).u32(body.len() as u32).bytes(&body.0);
}

/// One mesh with a vertex and a normal and no faces.
fn mesh_bytes(generation: u8) -> Vec<u8> {
	let mut mesh = Bytes::default();
	mesh.i16(0).i16(0).i16(0).i32(64);
	mesh.i16(1).i16(10).i16(20).i16(30);
	mesh.i16(1).i16(0).i16(-16384).i16(0);
	let num_face_lists = if generation >= 4 { 2 } else { 4 };
	for _ in 0..num_face_lists {
		mesh.u16(0);
	}
	mesh.0
}

/// One frame for a one-mesh moveable.
fn frame_bytes(generation: u8) -> Vec<u8> {
	let mut frame = Bytes::default();
	for v in [-8, -16, -8, 8, 0, 8, 0, -32, 0] {
		frame.i16(v);
	}
	match generation {
		1 => frame.u16(1).u16(0xABCD).u16(0x1234),
		_ => frame.u16(0x4001),
	};
	frame.0
}

/// Floor data through static meshes: one mesh pointed at twice and one moveable.
fn write_object_sections(out: &mut Bytes, generation: u8) {
	out.u32(0);
	let mesh = mesh_bytes(generation);
	out.u32(mesh.len() as u32 / 2).bytes(&mesh).u32(2).u32(0).u32(0);
	out.u32(0);
	out.u32(0).u32(0).u32(0);
	out.u32(0);
	let frame = frame_bytes(generation);
	out.u32(frame.len() as u32 / 2).bytes(&frame);
	out.u32(1).u32(0).u16(1).u16(0).u32(0).u32(0).u16(0);
	if generation == 5 {
		out.u16(0xFFEF);
	}
	out.u32(0);
}

/// Cameras through animated textures, all empty.
fn write_world_sections(out: &mut Bytes, flyby: bool) {
	out.u32(0);
	if flyby {
		out.u32(0);
	}
	out.u32(0).u32(0).u32(0).u32(0);
}

fn write_items(out: &mut Bytes, generation: u8) {
	out.u32(1);
	out.i16(7).i16(0).i32(1024).i32(-512).i32(2048).u16(0);
	match generation {
		1 => out.i16(-1),
		_ => out.i16(-1).i16(-1),
	};
	out.u16(0x3E00);
}

fn write_sound_sections(out: &mut Bytes, sound_map_len: usize) {
	out.u16(0).zeros(sound_map_len * 2).u32(0);
}

fn palette(colour: [u8; 3]) -> Vec<u8> {
	let mut palette = vec![0; 768];
	palette[3..6].copy_from_slice(&colour);
	palette
}

fn textile8() -> Vec<u8> {
	let mut textile = vec![0; TEXTILE_PIXELS];
	textile[0] = 1;
	textile
}

fn textile16() -> Vec<u8> {
	let mut textile = vec![0; TEXTILE_PIXELS * 2];
	textile[..2].copy_from_slice(&TEXEL16.to_le_bytes());
	textile
}

pub struct Fixture {
	pub version: Version,
	pub rooms: Vec<RoomDesc>,
	pub num_textiles: u16,
	/// TR4-5: whether the 32-bit textile segment is present
	pub textiles32: bool,
	/// Palette entry 1, 6 bits per channel
	pub palette_colour: [u8; 3],
}

impl Fixture {
	pub fn new(version: Version) -> Self {
		Fixture {
			version,
			rooms: vec![RoomDesc::new(0, 0), RoomDesc { water: true, ..RoomDesc::new(1024, 2048) }],
			num_textiles: 0,
			textiles32: true,
			palette_colour: [1, 2, 3],
		}
	}

	pub fn build(&self) -> Vec<u8> {
		match self.version.generation() {
			1 => self.build_tr1(),
			2 | 3 => self.build_tr2_tr3(),
			_ => self.build_compressed(),
		}
	}

	fn write_textiles8(&self, out: &mut Bytes) {
		for _ in 0..self.num_textiles {
			out.bytes(&textile8());
		}
	}

	fn build_tr1(&self) -> Vec<u8> {
		let early_palette = matches!(self.version, Version::Tr1Demo | Version::Tr1UnfinishedBusiness);
		let mut out = Bytes::default();
		out.u32(0x20).u32(self.num_textiles as u32);
		self.write_textiles8(&mut out);
		out.u32(0);
		out.u16(self.rooms.len() as u16);
		for room in &self.rooms {
			write_room(&mut out, 1, room);
		}
		write_object_sections(&mut out, 1);
		out.u32(0).u32(0).u32(0);
		if early_palette {
			out.bytes(&palette(self.palette_colour));
		}
		write_world_sections(&mut out, false);
		write_items(&mut out, 1);
		out.zeros(8192);
		if !early_palette {
			out.bytes(&palette(self.palette_colour));
		}
		out.u16(0);
		write_sound_sections(&mut out, 256);
		out.u32(0).u32(0);
		out.0
	}

	fn build_tr2_tr3(&self) -> Vec<u8> {
		let generation = self.version.generation();
		let demo = self.version == Version::Tr2Demo;
		let mut out = Bytes::default();
		out.u32(if generation == 2 { 0x2D } else { 0xFF08_0038 });
		out.bytes(&palette(self.palette_colour)).zeros(1024);
		out.u32(self.num_textiles as u32);
		self.write_textiles8(&mut out);
		for _ in 0..self.num_textiles {
			out.bytes(&textile16());
		}
		out.u32(0);
		out.u16(self.rooms.len() as u16);
		for room in &self.rooms {
			write_room(&mut out, generation, room);
		}
		write_object_sections(&mut out, generation);
		if generation == 2 {
			out.u32(0).u32(0).u32(0);
			if demo {
				out.zeros(8192);
			}
			write_world_sections(&mut out, false);
			write_items(&mut out, 2);
			if !demo {
				out.zeros(8192);
			}
		} else {
			out.u32(0).u32(0);
			write_world_sections(&mut out, false);
			out.u32(0);
			write_items(&mut out, 3);
			out.zeros(8192);
		}
		out.u16(0);
		write_sound_sections(&mut out, 370);
		out.u32(0);
		out.0
	}

	fn build_compressed(&self) -> Vec<u8> {
		let tr5 = self.version == Version::Tr5;
		let num_misc = if tr5 { 3 } else { 2 };
		let mut out = Bytes::default();
		out.u32(0x0034_5254).u16(self.num_textiles).u16(0).u16(0);
		let mut textiles32 = vec![];
		let mut textiles16 = vec![];
		for _ in 0..self.num_textiles {
			let mut textile = vec![0; TEXTILE_PIXELS * 4];
			textile[..4].copy_from_slice(&TEXEL32);
			textiles32.extend_from_slice(&textile);
			textiles16.extend_from_slice(&textile16());
		}
		if !self.textiles32 {
			textiles32.clear();
		}
		segment(&mut out, &textiles32);
		segment(&mut out, &textiles16);
		let mut misc = vec![0; TEXTILE_PIXELS * 4 * num_misc];
		for textile in misc.chunks_mut(TEXTILE_PIXELS * 4) {
			textile[..4].copy_from_slice(&MISC_TEXEL32);
		}
		segment(&mut out, &misc);
		match tr5 {
			true => {
				out.u16(2).u16(1).zeros(28).u32(0).u32(0);
				out.u32(0);
				out.u32(self.rooms.len() as u32);
				for room in &self.rooms {
					write_tr5_room(&mut out, room);
				}
				write_object_sections(&mut out, 5);
				out.bytes(b"SPR\0").u32(0).u32(0);
				write_world_sections(&mut out, true);
				out.u8(3).bytes(b"TEX\0").u32(0);
				write_items(&mut out, 5);
				out.u32(0);
				write_sound_sections(&mut out, 450);
				out.u32(0);
			},
			false => {
				let mut data = Bytes::default();
				data.u32(0);
				data.u16(self.rooms.len() as u16);
				for room in &self.rooms {
					write_room(&mut data, 4, room);
				}
				write_object_sections(&mut data, 4);
				data.bytes(b"SPR").u32(0).u32(0);
				write_world_sections(&mut data, true);
				data.u8(0).bytes(b"TEX").u32(0);
				write_items(&mut data, 4);
				data.u32(0);
				write_sound_sections(&mut data, 370);
				data.u32(0);
				data.u16(0).u16(0xCDCD).u16(0);
				segment(&mut out, &data.0);
			},
		}
		out.0
	}
}
