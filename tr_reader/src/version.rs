use std::{fmt, str::FromStr};
use byteorder::{ReadBytesExt, LE};
use log::{debug, trace};
use thiserror::Error;
use crate::{
	error::ResultExt, model::Level, stream::{ByteStream, SeekExt}, tr1, tr2, tr3, tr4, tr5, DecodeError, Result,
	Step,
};

pub const TR1_MAGIC: u32 = 0x0000_0020;
pub const TR2_MAGIC: u32 = 0x0000_002D;
pub const TR3_MAGICS: [u32; 2] = [0xFF08_0038, 0xFF18_0038];
/// Shared by TR4 and TR5, only the requested version tells them apart
pub const TR4_MAGIC: u32 = 0x0034_5254;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Version {
	Tr1,
	Tr1Demo,
	Tr1UnfinishedBusiness,
	Tr2,
	Tr2Demo,
	Tr3,
	Tr4,
	Tr4Demo,
	Tr5,
}

impl Version {
	pub const ALL: [Version; 9] = [
		Version::Tr1,
		Version::Tr1Demo,
		Version::Tr1UnfinishedBusiness,
		Version::Tr2,
		Version::Tr2Demo,
		Version::Tr3,
		Version::Tr4,
		Version::Tr4Demo,
		Version::Tr5,
	];

	/// 1 through 5
	pub fn generation(self) -> u8 {
		match self {
			Version::Tr1 | Version::Tr1Demo | Version::Tr1UnfinishedBusiness => 1,
			Version::Tr2 | Version::Tr2Demo => 2,
			Version::Tr3 => 3,
			Version::Tr4 | Version::Tr4Demo => 4,
			Version::Tr5 => 5,
		}
	}

	pub fn magics(self) -> &'static [u32] {
		match self.generation() {
			1 => &[TR1_MAGIC],
			2 => &[TR2_MAGIC],
			3 => &TR3_MAGICS,
			_ => &[TR4_MAGIC],
		}
	}

	pub fn name(self) -> &'static str {
		match self {
			Version::Tr1 => "tr1",
			Version::Tr1Demo => "tr1-demo",
			Version::Tr1UnfinishedBusiness => "tr1-ub",
			Version::Tr2 => "tr2",
			Version::Tr2Demo => "tr2-demo",
			Version::Tr3 => "tr3",
			Version::Tr4 => "tr4",
			Version::Tr4Demo => "tr4-demo",
			Version::Tr5 => "tr5",
		}
	}
}

impl fmt::Display for Version {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.name())
	}
}

#[derive(Debug, Error)]
#[error("unknown version tag {0:?}, expected one of tr1, tr1-demo, tr1-ub, tr2, tr2-demo, tr3, tr4, tr4-demo, tr5")]
pub struct ParseVersionError(String);

impl FromStr for Version {
	type Err = ParseVersionError;

	fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
		let lower = s.to_ascii_lowercase();
		Version::ALL
			.into_iter()
			.find(|v| v.name() == lower)
			.ok_or_else(|| ParseVersionError(s.to_owned()))
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DecoderState {
	Unopened,
	MagicValidated,
	Decoding,
	Decoded,
	/// Terminal, nothing decoded is kept
	Failed,
}

/// Walks one stream through magic validation and the pipeline of one version.
pub struct Decoder<S> {
	stream: S,
	version: Version,
	state: DecoderState,
}

impl<S: ByteStream> Decoder<S> {
	pub fn new(stream: S, version: Version) -> Self {
		Decoder { stream, version, state: DecoderState::Unopened }
	}

	pub fn state(&self) -> DecoderState {
		self.state
	}

	pub fn version(&self) -> Version {
		self.version
	}

	pub fn into_inner(self) -> S {
		self.stream
	}

	/// Reads the first four bytes and checks them against the version.
	pub fn validate_magic(&mut self) -> Result<u32> {
		if self.state != DecoderState::Unopened {
			return Err(DecodeError::unsupported(format!("magic already read, decoder is {:?}", self.state)));
		}
		let result = self.read_magic().during(Step::Magic);
		self.state = match result {
			Ok(_) => DecoderState::MagicValidated,
			Err(_) => DecoderState::Failed,
		};
		result
	}

	fn read_magic(&mut self) -> Result<u32> {
		self.stream.seek_to(0)?;
		let magic = self.stream.read_u32::<LE>()?;
		if !self.version.magics().contains(&magic) {
			return Err(DecodeError::wrong_version(format!(
				"magic {:#010x} does not match {}",
				magic,
				self.version,
			)));
		}
		trace!("magic {:#010x} accepted for {}", magic, self.version);
		Ok(magic)
	}

	/// Runs the whole pipeline. Any error leaves the decoder failed.
	pub fn decode(&mut self) -> Result<Level> {
		if self.state == DecoderState::Unopened {
			self.validate_magic()?;
		}
		if self.state != DecoderState::MagicValidated {
			return Err(DecodeError::unsupported(format!("cannot decode, decoder is {:?}", self.state)));
		}
		self.state = DecoderState::Decoding;
		let stream = &mut self.stream;
		let result = match self.version {
			Version::Tr1 | Version::Tr1Demo | Version::Tr1UnfinishedBusiness => tr1::read_level(stream, self.version),
			Version::Tr2 | Version::Tr2Demo => tr2::read_level(stream, self.version),
			Version::Tr3 => tr3::read_level(stream, self.version),
			Version::Tr4 | Version::Tr4Demo => tr4::read_level(stream, self.version),
			Version::Tr5 => tr5::read_level(stream, self.version),
		};
		match result {
			Ok(level) => {
				self.state = DecoderState::Decoded;
				debug!(
					"decoded {}: {} rooms, {} meshes, {} moveables, {} items",
					self.version,
					level.rooms.len(),
					level.meshes.len(),
					level.moveables.len(),
					level.items.len(),
				);
				Ok(level)
			},
			Err(e) => {
				self.state = DecoderState::Failed;
				debug!("decoding {} failed: {}", self.version, e);
				Err(e)
			},
		}
	}
}
