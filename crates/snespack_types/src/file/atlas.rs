//! Aseprite atlas description parsing.
//!
//! Sprites are authored in Aseprite and exported as a packed sheet plus a
//! JSON description. The export is expected to use hash output with split
//! layers, split tags and trimmed cels, and the item filename pattern
//! `{tag}__{tagframe}__{layer}`, so every entry in the `frames` map names
//! exactly one cel: the pixels one layer contributes to one animation frame.
//!
//! # Expected JSON shape
//!
//! ```json
//! {
//!     "frames": {
//!         "Forward__0__Plane": {
//!             "frame": { "x": 0, "y": 0, "w": 64, "h": 32 },
//!             "spriteSourceSize": { "x": 0, "y": 0, "w": 64, "h": 32 },
//!             "sourceSize": { "w": 64, "h": 32 },
//!             "duration": 100
//!         }
//!     },
//!     "meta": {
//!         "image": "plane.png",
//!         "size": { "w": 128, "h": 96 },
//!         "frameTags": [
//!             { "name": "Forward", "from": 0, "to": 0, "direction": "forward" }
//!         ],
//!         "layers": [{ "name": "Plane" }]
//!     }
//! }
//! ```
//!
//! [`parse`] turns that description into an [`AtlasModel`] keyed by
//! `(tag, frame index, layer)`. Parsing is pure: it never reads files and
//! never serializes anything.

use std::collections::HashMap;

use serde::Deserialize;

use crate::file::error::SpriteError;

/// Animation playback direction declared by a tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Direction {
	/// Play frames first to last
	Forward = 0,

	/// Play frames last to first
	Reverse = 1,

	/// Play forward, then backward
	Pingpong = 2,
}

impl Direction {
	/// Wire encoding of the direction (forward=0, reverse=1, pingpong=2).
	pub fn code(self) -> u8 {
		self as u8
	}

	/// Parses an Aseprite direction string.
	///
	/// Anything outside `forward`/`reverse`/`pingpong` is ambiguous for the
	/// runtime and rejected.
	fn parse(tag: &str, direction: &str) -> Result<Self, SpriteError> {
		match direction {
			"forward" => Ok(Self::Forward),
			"reverse" => Ok(Self::Reverse),
			"pingpong" => Ok(Self::Pingpong),
			other => Err(SpriteError::UnknownDirection {
				tag: tag.to_string(),
				direction: other.to_string(),
			}),
		}
	}
}

impl std::fmt::Display for Direction {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let name = match self {
			Self::Forward => "forward",
			Self::Reverse => "reverse",
			Self::Pingpong => "pingpong",
		};
		write!(f, "{name}")
	}
}

/// Pixel rectangle as exported by Aseprite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct AtlasRect {
	/// Left edge in pixels
	pub x: u32,
	/// Top edge in pixels
	pub y: u32,
	/// Width in pixels
	pub w: u32,
	/// Height in pixels
	pub h: u32,
}

/// Width/height pair as exported by Aseprite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct AtlasSize {
	/// Width in pixels
	pub w: u32,
	/// Height in pixels
	pub h: u32,
}

/// One trimmed cel: the pixels a single layer contributes to a single frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cel {
	/// Location of the trimmed pixels within the packed sheet
	pub frame: AtlasRect,

	/// Trimmed region relative to the untrimmed layer canvas
	pub trim: AtlasRect,

	/// Untrimmed layer canvas size
	pub source: AtlasSize,

	/// Display duration in milliseconds (authoring metadata, never serialized)
	pub duration: u32,
}

/// One declared animation tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagDecl {
	/// Tag name, unique within the sprite
	pub name: String,

	/// First frame index of the clip within the whole timeline
	pub from: u32,

	/// Last frame index of the clip (inclusive)
	pub to: u32,

	/// Playback direction
	pub direction: Direction,
}

impl TagDecl {
	/// Number of frames in the clip.
	pub fn frame_count(&self) -> u32 {
		self.to - self.from + 1
	}
}

/// Parsed atlas model keyed by `(tag, frame index, layer)`.
///
/// An absent key means that layer contributes nothing to that frame. This is
/// the single documented default: lookups go through [`AtlasModel::cel`] and
/// return `None`, never an implicitly constructed empty cel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AtlasModel {
	/// Packed sheet image filename from the export
	pub image: String,

	/// Packed sheet dimensions
	pub size: AtlasSize,

	/// Layer names in authoring order (topmost first, as declared)
	pub layers: Vec<String>,

	/// Declared animation tags in export order
	pub tags: Vec<TagDecl>,

	/// Cels keyed by (tag, frame index within the tag, layer)
	cels: HashMap<(String, u32, String), Cel>,
}

impl AtlasModel {
	/// Looks up the cel for `(tag, frame, layer)`.
	///
	/// Returns `None` when the combination is absent from the atlas, meaning
	/// the layer contributes nothing to that frame.
	pub fn cel(&self, tag: &str, frame: u32, layer: &str) -> Option<&Cel> {
		// HashMap borrowed-key lookup needs owned Strings here; cels are few
		// and this runs once per (tag, frame, layer) at build time.
		self.cels.get(&(tag.to_string(), frame, layer.to_string()))
	}

	/// Total number of cels in the atlas.
	pub fn cel_count(&self) -> usize {
		self.cels.len()
	}
}

// Raw serde mirror of the Aseprite JSON export.

#[derive(Debug, Deserialize)]
struct RawAtlas {
	frames: HashMap<String, RawCel>,
	meta: RawMeta,
}

#[derive(Debug, Deserialize)]
struct RawCel {
	frame: AtlasRect,
	#[serde(rename = "spriteSourceSize")]
	sprite_source_size: AtlasRect,
	#[serde(rename = "sourceSize")]
	source_size: AtlasSize,
	#[serde(default)]
	duration: u32,
}

#[derive(Debug, Deserialize)]
struct RawMeta {
	image: String,
	size: AtlasSize,
	#[serde(rename = "frameTags")]
	frame_tags: Vec<RawTag>,
	layers: Vec<RawLayer>,
}

#[derive(Debug, Deserialize)]
struct RawTag {
	name: String,
	from: u32,
	to: u32,
	direction: String,
}

#[derive(Debug, Deserialize)]
struct RawLayer {
	name: String,
}

/// Splits a `{tag}__{tagframe}__{layer}` cel key into its parts.
///
/// The layer name is the last `__`-separated field and the frame index the
/// second to last, so tag names containing `__` still parse.
fn split_cel_key(key: &str) -> Result<(String, u32, String), SpriteError> {
	let mut parts = key.rsplitn(3, "__");
	let (Some(layer), Some(frame), Some(tag)) = (parts.next(), parts.next(), parts.next()) else {
		return Err(SpriteError::MalformedAtlas {
			message: format!("cel key `{key}` is not of the form tag__frame__layer"),
		});
	};

	let frame: u32 = frame.parse().map_err(|_| SpriteError::MalformedAtlas {
		message: format!("cel key `{key}` has non-numeric frame index `{frame}`"),
	})?;

	Ok((tag.to_string(), frame, layer.to_string()))
}

/// Parses an Aseprite JSON export into an [`AtlasModel`].
///
/// # Errors
///
/// Returns an error if:
/// - The JSON does not deserialize
/// - A cel key does not follow the `tag__frame__layer` pattern
/// - A tag declares an unknown playback direction
/// - A tag declares a reversed frame range (`to < from`)
pub fn parse(json: &str) -> Result<AtlasModel, SpriteError> {
	let raw: RawAtlas = serde_json::from_str(json)?;

	let mut tags = Vec::with_capacity(raw.meta.frame_tags.len());
	for tag in raw.meta.frame_tags {
		let direction = Direction::parse(&tag.name, &tag.direction)?;
		if tag.to < tag.from {
			return Err(SpriteError::MalformedAtlas {
				message: format!(
					"tag `{}` declares a reversed frame range {}..{}",
					tag.name, tag.from, tag.to
				),
			});
		}
		tags.push(TagDecl {
			name: tag.name,
			from: tag.from,
			to: tag.to,
			direction,
		});
	}

	let layers: Vec<String> = raw.meta.layers.into_iter().map(|layer| layer.name).collect();

	let mut cels = HashMap::with_capacity(raw.frames.len());
	for (key, cel) in raw.frames {
		let (tag, frame, layer) = split_cel_key(&key)?;
		cels.insert(
			(tag, frame, layer),
			Cel {
				frame: cel.frame,
				trim: cel.sprite_source_size,
				source: cel.source_size,
				duration: cel.duration,
			},
		);
	}

	log::debug!(
		"parsed atlas `{}`: {} cels, {} tags, {} layers",
		raw.meta.image,
		cels.len(),
		tags.len(),
		layers.len()
	);

	Ok(AtlasModel {
		image: raw.meta.image,
		size: raw.meta.size,
		layers,
		tags,
		cels,
	})
}

#[cfg(test)]
mod tests {
	use super::*;

	const SAMPLE: &str = r#"{
		"frames": {
			"Forward__0__Plane": {
				"frame": { "x": 0, "y": 0, "w": 64, "h": 32 },
				"rotated": false,
				"trimmed": false,
				"spriteSourceSize": { "x": 0, "y": 0, "w": 64, "h": 32 },
				"sourceSize": { "w": 64, "h": 32 },
				"duration": 100
			},
			"Forward__1__Plane": {
				"frame": { "x": 64, "y": 0, "w": 64, "h": 32 },
				"spriteSourceSize": { "x": 0, "y": 0, "w": 64, "h": 32 },
				"sourceSize": { "w": 64, "h": 32 },
				"duration": 100
			}
		},
		"meta": {
			"image": "plane.png",
			"size": { "w": 128, "h": 96 },
			"frameTags": [
				{ "name": "Forward", "from": 0, "to": 1, "direction": "forward" }
			],
			"layers": [{ "name": "Plane", "opacity": 255, "blendMode": "normal" }]
		}
	}"#;

	#[test]
	fn test_parse_sample_export() {
		let model = parse(SAMPLE).unwrap();

		assert_eq!(model.image, "plane.png");
		assert_eq!(model.size, AtlasSize { w: 128, h: 96 });
		assert_eq!(model.layers, vec!["Plane".to_string()]);
		assert_eq!(model.cel_count(), 2);

		assert_eq!(model.tags.len(), 1);
		let tag = &model.tags[0];
		assert_eq!(tag.name, "Forward");
		assert_eq!(tag.frame_count(), 2);
		assert_eq!(tag.direction, Direction::Forward);

		let cel = model.cel("Forward", 1, "Plane").expect("cel should exist");
		assert_eq!(cel.frame.x, 64);
		assert_eq!(cel.frame.w, 64);
		assert_eq!(cel.duration, 100);
	}

	#[test]
	fn test_absent_combination_is_none() {
		let model = parse(SAMPLE).unwrap();
		assert!(model.cel("Forward", 2, "Plane").is_none());
		assert!(model.cel("Forward", 0, "Shadow").is_none());
		assert!(model.cel("Backward", 0, "Plane").is_none());
	}

	#[test]
	fn test_unknown_direction_is_fatal() {
		let json = SAMPLE.replace("\"forward\"", "\"sideways\"");
		let err = parse(&json).expect_err("direction validation should fail");
		match err {
			SpriteError::UnknownDirection {
				tag,
				direction,
			} => {
				assert_eq!(tag, "Forward");
				assert_eq!(direction, "sideways");
			}
			_ => panic!("Unexpected error: {err:?}"),
		}
	}

	#[test]
	fn test_reversed_frame_range_rejected() {
		let json =
			SAMPLE.replace("\"from\": 0, \"to\": 1", "\"from\": 2, \"to\": 1");
		let err = parse(&json).expect_err("range validation should fail");
		match err {
			SpriteError::MalformedAtlas {
				message,
			} => assert!(message.contains("reversed frame range")),
			_ => panic!("Unexpected error: {err:?}"),
		}
	}

	#[test]
	fn test_malformed_cel_key_rejected() {
		let json = SAMPLE.replace("Forward__0__Plane", "Forward_0_Plane");
		let err = parse(&json).expect_err("key validation should fail");
		assert!(matches!(err, SpriteError::MalformedAtlas { .. }));
	}

	#[test]
	fn test_non_numeric_frame_index_rejected() {
		let json = SAMPLE.replace("Forward__0__Plane", "Forward__a__Plane");
		let err = parse(&json).expect_err("key validation should fail");
		match err {
			SpriteError::MalformedAtlas {
				message,
			} => assert!(message.contains("non-numeric")),
			_ => panic!("Unexpected error: {err:?}"),
		}
	}

	#[test]
	fn test_tag_name_may_contain_separator() {
		let (tag, frame, layer) = split_cel_key("idle__left__3__Body").unwrap();
		assert_eq!(tag, "idle__left");
		assert_eq!(frame, 3);
		assert_eq!(layer, "Body");
	}

	#[test]
	fn test_direction_codes() {
		assert_eq!(Direction::Forward.code(), 0);
		assert_eq!(Direction::Reverse.code(), 1);
		assert_eq!(Direction::Pingpong.code(), 2);
	}
}
