use std::{fmt, io, panic::Location};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, DecodeError>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
	/// Short read or unusable stream
	Io,
	/// Bad magic or separator, inconsistent sizes, out of range references
	Format,
	/// Magic does not match the requested version
	WrongVersion,
	/// Valid looking layout that is not handled
	Unsupported,
}

impl fmt::Display for ErrorKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(match self {
			ErrorKind::Io => "io error",
			ErrorKind::Format => "format error",
			ErrorKind::WrongVersion => "wrong version",
			ErrorKind::Unsupported => "unsupported",
		})
	}
}

/// Logical decode step an error was raised in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Step {
	Magic,
	Palette,
	Textiles,
	LevelData,
	Rooms,
	FloorData,
	Meshes,
	Animations,
	AnimationTables,
	MeshTrees,
	Frames,
	StaticMeshes,
	ObjectTextures,
	SpriteTextures,
	SpriteSequences,
	Markers,
	Cameras,
	SoundSources,
	Boxes,
	AnimatedTextures,
	Items,
	AiObjects,
	Lightmap,
	Cinematics,
	DemoData,
	Sounds,
	Trailer,
}

impl fmt::Display for Step {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(match self {
			Step::Magic => "magic",
			Step::Palette => "palette",
			Step::Textiles => "textiles",
			Step::LevelData => "level data",
			Step::Rooms => "rooms",
			Step::FloorData => "floor data",
			Step::Meshes => "meshes",
			Step::Animations => "animations",
			Step::AnimationTables => "animation tables",
			Step::MeshTrees => "mesh trees",
			Step::Frames => "frames and moveables",
			Step::StaticMeshes => "static meshes",
			Step::ObjectTextures => "object textures",
			Step::SpriteTextures => "sprite textures",
			Step::SpriteSequences => "sprite sequences",
			Step::Markers => "section markers",
			Step::Cameras => "cameras",
			Step::SoundSources => "sound sources",
			Step::Boxes => "boxes",
			Step::AnimatedTextures => "animated textures",
			Step::Items => "items",
			Step::AiObjects => "ai objects",
			Step::Lightmap => "lightmap",
			Step::Cinematics => "cinematic frames",
			Step::DemoData => "demo data",
			Step::Sounds => "sounds",
			Step::Trailer => "trailer",
		})
	}
}

struct StepName<'a>(&'a Option<Step>);

impl fmt::Display for StepName<'_> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match *self.0 {
			Some(step) => step.fmt(f),
			None => f.write_str("unknown step"),
		}
	}
}

#[derive(Debug, Error)]
#[error("{kind} in {}: {message} (at {location})", StepName(.step))]
pub struct DecodeError {
	kind: ErrorKind,
	step: Option<Step>,
	message: String,
	location: &'static Location<'static>,
	#[source]
	source: Option<io::Error>,
}

impl DecodeError {
	#[track_caller]
	fn new(kind: ErrorKind, message: String) -> Self {
		DecodeError { kind, step: None, message, location: Location::caller(), source: None }
	}

	#[track_caller]
	pub fn format(message: impl Into<String>) -> Self {
		Self::new(ErrorKind::Format, message.into())
	}

	#[track_caller]
	pub fn unsupported(message: impl Into<String>) -> Self {
		Self::new(ErrorKind::Unsupported, message.into())
	}

	#[track_caller]
	pub fn wrong_version(message: impl Into<String>) -> Self {
		Self::new(ErrorKind::WrongVersion, message.into())
	}

	pub fn kind(&self) -> ErrorKind {
		self.kind
	}

	pub fn step(&self) -> Option<Step> {
		self.step
	}

	pub fn message(&self) -> &str {
		&self.message
	}

	/// Where in this crate the error was raised
	pub fn location(&self) -> &'static Location<'static> {
		self.location
	}

	/// Keeps the innermost step.
	pub(crate) fn during(mut self, step: Step) -> Self {
		self.step.get_or_insert(step);
		self
	}
}

impl From<io::Error> for DecodeError {
	#[track_caller]
	fn from(e: io::Error) -> Self {
		DecodeError {
			kind: ErrorKind::Io,
			step: None,
			message: e.to_string(),
			location: Location::caller(),
			source: Some(e),
		}
	}
}

pub(crate) trait ResultExt<T> {
	fn during(self, step: Step) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
	fn during(self, step: Step) -> Result<T> {
		self.map_err(|e| e.during(step))
	}
}

/// Returns a format error from the enclosing function unless the condition holds.
macro_rules! ensure {
	($cond:expr, $($arg:tt)*) => {
		if !$cond {
			return Err(crate::DecodeError::format(format!($($arg)*)));
		}
	};
}

pub(crate) use ensure;
