//! Error types for atlas parsing and sprite assembly.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while converting an Aseprite export into a sprite resource.
#[derive(Debug, Error)]
pub enum SpriteError {
	/// A required companion file (pixel sheet or palette) does not exist
	#[error("Missing companion asset: {path}")]
	MissingAsset {
		/// Path that was expected to hold the companion data
		path: PathBuf,
	},

	/// An animation tag declares a direction outside forward/reverse/pingpong
	#[error("Tag `{tag}` declares unknown animation direction `{direction}`")]
	UnknownDirection {
		/// Name of the offending tag
		tag: String,
		/// The direction string as found in the atlas
		direction: String,
	},

	/// A count, offset or address exceeds its fixed-width record field
	#[error("Capacity overflow: {field} = {value} exceeds the maximum of {max}")]
	CapacityOverflow {
		/// Which record field overflowed
		field: &'static str,
		/// The value that did not fit
		value: usize,
		/// Largest value the field can hold
		max: usize,
	},

	/// The atlas JSON deserialized but violates the export conventions
	#[error("Malformed atlas: {message}")]
	MalformedAtlas {
		/// What was wrong with the atlas description
		message: String,
	},

	/// Strict mode only: an expected (tag, frame, layer) cel is absent
	#[error("No cel for tag `{tag}` frame {frame} layer `{layer}`")]
	MissingCel {
		/// Tag being assembled
		tag: String,
		/// Frame index within the tag
		frame: u32,
		/// Layer that contributed nothing
		layer: String,
	},

	/// Atlas JSON deserialization error
	#[error(transparent)]
	Json(#[from] serde_json::Error),

	/// IO error
	#[error(transparent)]
	Io(#[from] std::io::Error),
}

/// Narrows a value to `u8`, reporting the record field on overflow.
pub(crate) fn checked_u8(field: &'static str, value: usize) -> Result<u8, SpriteError> {
	u8::try_from(value).map_err(|_| SpriteError::CapacityOverflow {
		field,
		value,
		max: u8::MAX as usize,
	})
}

/// Narrows a value to `u16`, reporting the record field on overflow.
pub(crate) fn checked_u16(field: &'static str, value: usize) -> Result<u16, SpriteError> {
	u16::try_from(value).map_err(|_| SpriteError::CapacityOverflow {
		field,
		value,
		max: u16::MAX as usize,
	})
}
