//! `.sprite` resource support for the `snespack` converter.
//!
//! A `.sprite` resource is the flat, self-describing binary the game ROM
//! links in for one animated sprite. It is assembled from an Aseprite atlas
//! description plus two companion blobs (the 4BPP pixel sheet and the
//! console-native palette) and navigated by the runtime through fixed-width
//! relative offset tables, without a general parser.
//!
//! # File structure
//!
//! - **Sprite header** (25 bytes): `SPR`, 8-byte name, palette/sheet word
//!   counts and offsets, tag metadata count/offset, tag count/offset
//! - **Palette blob**: raw console-native palette words
//! - **Sheet blob**: raw 4BPP pixel data
//! - **Tag metadata table**: one `TMD` entry (5 bytes) per tag
//! - **Tag payload**: `TAG` records back to back, each owning its frame
//!   metadata table and `FRM` records, which in turn own `FLM` tables,
//!   `LYR` records and fixed-size `TIL` records
//!
//! All multi-byte fields are little-endian. Section offsets in the sprite
//! header are relative to the first byte after the header; offsets inside
//! every record are relative to that record's own children blob.
//!
//! # Examples
//!
//! ```no_run
//! use snespack_types::file::{atlas, BuildOptions, SpriteFile};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let json = std::fs::read_to_string("hawk.json")?;
//! let model = atlas::parse(&json)?;
//!
//! let sheet = std::fs::read("hawk.bin")?;
//! let palette = std::fs::read("hawk.pal")?; // already console-native
//!
//! let sprite = SpriteFile::build(&model, "hawk", palette, sheet, &BuildOptions::default())?;
//! sprite.save("hawk.sprite")?;
//!
//! for symbol in sprite.tag_symbols()? {
//!     println!("{} => {:#06X}", symbol.name, symbol.offset);
//! }
//! # Ok(())
//! # }
//! ```

pub mod assets;
pub mod oam;
pub mod record;

pub use assets::{AssetPaths, RawAssets};
pub use oam::{SizeClass, Tile};
pub use record::{Frame, Layer, Tag};

use std::path::Path;

use crate::file::atlas::AtlasModel;
use crate::file::error::{SpriteError, checked_u8, checked_u16};

use record::magic;

/// Sprite file constants.
pub mod constants {
	/// Serialized size of the sprite header
	pub const HEADER_SIZE: usize = 25;

	/// Stored length of the sprite name field
	pub const NAME_LEN: usize = 8;

	/// Serialized size of one `TMD` metadata entry
	pub const TAG_META_ENTRY_SIZE: usize = 5;
}

/// Options controlling sprite assembly.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuildOptions {
	/// Fail with [`SpriteError::MissingCel`] when an expected
	/// `(tag, frame, layer)` combination is absent from the atlas instead
	/// of silently omitting the layer.
	pub strict: bool,
}

/// Name and absolute location of one tag record, for the ROM linker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagSymbol {
	/// Tag name as declared in the atlas
	pub name: String,

	/// Absolute byte offset of the `TAG` record within the sprite buffer
	pub offset: usize,
}

/// Sprite resource: a named collection of animation tags plus the raw
/// palette and pixel-sheet blobs they index into.
///
/// Built once from an [`AtlasModel`], immutable afterwards, serialized
/// exactly once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct File {
	/// Sprite name, truncated to 8 ASCII bytes on serialization
	name: String,

	/// Console-native palette blob
	palette: Vec<u8>,

	/// 4BPP pixel sheet blob
	sheet: Vec<u8>,

	/// Animation tags in declaration order
	tags: Vec<Tag>,
}

impl File {
	/// Assembles a sprite from a parsed atlas model and its companion blobs.
	///
	/// For every declared tag, every frame index in its range and every
	/// layer name in reverse authoring order (later-declared layers are
	/// drawn first), the matching cel is decomposed into hardware tiles and
	/// appended as a layer record. Absent combinations contribute nothing
	/// unless [`BuildOptions::strict`] is set; layers that decompose to zero
	/// tiles are dropped rather than stored empty.
	///
	/// # Errors
	///
	/// Returns an error if a record field overflows its fixed width, or in
	/// strict mode if an expected cel is missing.
	pub fn build(
		model: &AtlasModel,
		name: &str,
		palette: Vec<u8>,
		sheet: Vec<u8>,
		options: &BuildOptions,
	) -> Result<Self, SpriteError> {
		// Later-declared layers are drawn first, so iterate the authoring
		// list back to front while keeping the declared index as layer id.
		let draw_order: Vec<(u8, &str)> = {
			let mut order = Vec::with_capacity(model.layers.len());
			for (id, layer) in model.layers.iter().enumerate() {
				order.push((checked_u8("layer id", id)?, layer.as_str()));
			}
			order.reverse();
			order
		};

		let mut tags = Vec::with_capacity(model.tags.len());
		for decl in &model.tags {
			log::info!(
				"building tag `{}`: {} frames ({})",
				decl.name,
				decl.frame_count(),
				decl.direction
			);

			let mut frames = Vec::with_capacity(decl.frame_count() as usize);
			for frame_index in 0..decl.frame_count() {
				let mut frame = Frame::default();
				for &(layer_id, layer_name) in &draw_order {
					let Some(cel) = model.cel(&decl.name, frame_index, layer_name) else {
						if options.strict {
							return Err(SpriteError::MissingCel {
								tag: decl.name.clone(),
								frame: frame_index,
								layer: layer_name.to_string(),
							});
						}
						log::debug!(
							"no cel for `{}` frame {frame_index} layer `{layer_name}`, skipping",
							decl.name
						);
						continue;
					};

					let (_, tiles) =
						oam::decompose(cel.frame.x, cel.frame.y, cel.frame.w, cel.frame.h)?;
					if tiles.is_empty() {
						continue;
					}

					frame.layers.push(Layer {
						layer_id,
						rx: checked_u8("layer rx", cel.trim.x as usize)?,
						ry: checked_u8("layer ry", cel.trim.y as usize)?,
						tiles,
					});
				}
				frames.push(frame);
			}

			let oam_budget = checked_u8("tag OAM budget", oam_budget(&frames))?;
			tags.push(Tag {
				name: decl.name.clone(),
				direction: decl.direction,
				oam_budget,
				frames,
			});
		}

		Ok(Self {
			name: name.to_string(),
			palette,
			sheet,
			tags,
		})
	}

	/// Sprite name.
	pub fn name(&self) -> &str {
		&self.name
	}

	/// Animation tags in declaration order.
	pub fn tags(&self) -> &[Tag] {
		&self.tags
	}

	/// Console-native palette blob.
	pub fn palette(&self) -> &[u8] {
		&self.palette
	}

	/// 4BPP pixel sheet blob.
	pub fn sheet(&self) -> &[u8] {
		&self.sheet
	}

	/// Serializes the whole sprite to a flat buffer.
	///
	/// Section order is palette, sheet, tag metadata table, tag payload;
	/// the header records each section's offset relative to the byte after
	/// the header. Blob sizes are stored as 16-bit-word counts because the
	/// target memory bus is word-oriented.
	///
	/// # Errors
	///
	/// Returns [`SpriteError::CapacityOverflow`] when any count or section
	/// offset exceeds its fixed-width header field.
	pub fn to_bytes(&self) -> Result<Vec<u8>, SpriteError> {
		let table = record::pack_children(&self.tags, "tag offset", Tag::to_bytes)?;

		let tag_count = checked_u8("tag count", self.tags.len())?;
		let palette_words = checked_u16("palette word count", self.palette.len() / 2)?;
		let sheet_words = checked_u16("sheet word count", self.sheet.len() / 2)?;

		let sheet_offset = checked_u16("sheet offset", self.palette.len())?;
		let tag_meta_offset =
			checked_u16("tag metadata offset", self.palette.len() + self.sheet.len())?;
		let tag_offset = checked_u16("tag offset", self.tag_payload_base())?;

		log::debug!(
			"serializing sprite `{}`: palette at 0, sheet at {sheet_offset}, tag metadata at {tag_meta_offset}, tags at {tag_offset}",
			self.name
		);

		let mut bytes = Vec::with_capacity(
			constants::HEADER_SIZE + self.tag_payload_base() + table.payload.len(),
		);
		bytes.extend_from_slice(magic::SPRITE);
		bytes.extend_from_slice(&encode_name(&self.name));
		bytes.extend_from_slice(&palette_words.to_le_bytes());
		bytes.extend_from_slice(&0u16.to_le_bytes()); // palette leads the data area
		bytes.extend_from_slice(&sheet_words.to_le_bytes());
		bytes.extend_from_slice(&sheet_offset.to_le_bytes());
		bytes.push(tag_count); // metadata entry count, one entry per tag
		bytes.extend_from_slice(&tag_meta_offset.to_le_bytes());
		bytes.push(tag_count);
		bytes.extend_from_slice(&tag_offset.to_le_bytes());

		bytes.extend_from_slice(&self.palette);
		bytes.extend_from_slice(&self.sheet);
		for offset in &table.offsets {
			bytes.extend_from_slice(magic::TAG_META);
			bytes.extend_from_slice(&offset.to_le_bytes());
		}
		bytes.extend_from_slice(&table.payload);

		Ok(bytes)
	}

	/// Saves the serialized sprite to disk.
	///
	/// The buffer is written to a sibling temp file first and renamed into
	/// place, so a failed run never leaves a partial `.sprite` behind.
	pub fn save(&self, path: impl AsRef<Path>) -> Result<(), SpriteError> {
		let bytes = self.to_bytes()?;
		let path = path.as_ref();

		let mut tmp_name = path.as_os_str().to_owned();
		tmp_name.push(".tmp");
		let tmp = std::path::PathBuf::from(tmp_name);

		std::fs::write(&tmp, &bytes)?;
		std::fs::rename(&tmp, path)?;

		log::info!("wrote {} ({} bytes)", path.display(), bytes.len());
		Ok(())
	}

	/// Absolute byte offset of each `TAG` record within the serialized
	/// buffer, in declaration order. Consumed by the ROM linker listing.
	pub fn tag_symbols(&self) -> Result<Vec<TagSymbol>, SpriteError> {
		let base = constants::HEADER_SIZE + self.tag_payload_base();

		let mut symbols = Vec::with_capacity(self.tags.len());
		let mut running = 0usize;
		for tag in &self.tags {
			symbols.push(TagSymbol {
				name: tag.name.clone(),
				offset: base + running,
			});
			running += tag.to_bytes()?.len();
		}

		Ok(symbols)
	}

	/// Offset of the tag payload within the data area after the header.
	fn tag_payload_base(&self) -> usize {
		self.palette.len() + self.sheet.len() + self.tags.len() * constants::TAG_META_ENTRY_SIZE
	}
}

impl std::fmt::Display for File {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "Sprite `{}`: {} tags", self.name, self.tags.len())
	}
}

/// Peak simultaneous hardware tile count across a tag's frames.
fn oam_budget(frames: &[Frame]) -> usize {
	frames.iter().map(Frame::tile_count).max().unwrap_or(0)
}

/// Encodes a sprite name into its fixed 8-byte header field.
///
/// ASCII characters beyond the eighth are dropped, non-ASCII characters are
/// replaced with `?`, and short names are zero-padded. No terminator beyond
/// the padding.
fn encode_name(name: &str) -> [u8; constants::NAME_LEN] {
	let mut field = [0u8; constants::NAME_LEN];
	for (dst, ch) in field.iter_mut().zip(name.chars()) {
		*dst = if ch.is_ascii() { ch as u8 } else { b'?' };
	}
	field
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::file::atlas::Direction;

	fn frame_with_tiles(count: usize) -> Frame {
		let tiles = (0..count)
			.map(|i| Tile {
				tile_table_address: i as u8,
				size_class: SizeClass::Small,
				rx: 0,
				ry: 0,
			})
			.collect();
		Frame {
			layers: vec![Layer {
				layer_id: 0,
				rx: 0,
				ry: 0,
				tiles,
			}],
		}
	}

	#[test]
	fn test_oam_budget_is_max_of_frame_totals() {
		let frames =
			vec![frame_with_tiles(3), frame_with_tiles(5), frame_with_tiles(2)];
		assert_eq!(oam_budget(&frames), 5);
	}

	#[test]
	fn test_oam_budget_sums_across_layers() {
		let mut frame = frame_with_tiles(3);
		frame.layers.push(Layer {
			layer_id: 1,
			rx: 0,
			ry: 0,
			tiles: vec![Tile {
				tile_table_address: 9,
				size_class: SizeClass::Small,
				rx: 0,
				ry: 0,
			}],
		});
		assert_eq!(oam_budget(std::slice::from_ref(&frame)), 4);
	}

	#[test]
	fn test_oam_budget_empty_tag() {
		assert_eq!(oam_budget(&[]), 0);
	}

	#[test]
	fn test_encode_name_pads_short_names() {
		assert_eq!(&encode_name("hawk"), b"hawk\0\0\0\0");
	}

	#[test]
	fn test_encode_name_truncates_long_names() {
		// From an ASCII source longer than 8 characters, exactly 8 bytes
		// are stored with no terminator.
		assert_eq!(&encode_name("ForwardFacing"), b"ForwardF");
	}

	#[test]
	fn test_encode_name_replaces_non_ascii() {
		assert_eq!(&encode_name("h\u{00e4}wk"), b"h?wk\0\0\0\0");
	}

	#[test]
	fn test_header_layout() {
		let sprite = File {
			name: "hawk".to_string(),
			palette: vec![0xAA; 32],
			sheet: vec![0xBB; 128],
			tags: vec![Tag {
				name: "Idle".to_string(),
				direction: Direction::Forward,
				oam_budget: 1,
				frames: vec![frame_with_tiles(1)],
			}],
		};
		let bytes = sprite.to_bytes().unwrap();

		assert_eq!(&bytes[0..3], b"SPR");
		assert_eq!(&bytes[3..11], b"hawk\0\0\0\0");
		assert_eq!(u16::from_le_bytes([bytes[11], bytes[12]]), 16); // palette words
		assert_eq!(u16::from_le_bytes([bytes[13], bytes[14]]), 0); // palette offset
		assert_eq!(u16::from_le_bytes([bytes[15], bytes[16]]), 64); // sheet words
		assert_eq!(u16::from_le_bytes([bytes[17], bytes[18]]), 32); // sheet offset
		assert_eq!(bytes[19], 1); // tag metadata count
		assert_eq!(u16::from_le_bytes([bytes[20], bytes[21]]), 32 + 128);
		assert_eq!(bytes[22], 1); // tag count
		let tag_offset = u16::from_le_bytes([bytes[23], bytes[24]]);
		assert_eq!(tag_offset as usize, 32 + 128 + constants::TAG_META_ENTRY_SIZE);

		// Sections land where the header says.
		let base = constants::HEADER_SIZE;
		assert_eq!(bytes[base], 0xAA);
		assert_eq!(bytes[base + 32], 0xBB);
		assert_eq!(&bytes[base + 160..base + 163], b"TMD");
		assert_eq!(&bytes[base + tag_offset as usize..base + tag_offset as usize + 3], b"TAG");
	}

	#[test]
	fn test_tag_symbols_point_at_tag_records() {
		let tag = |name: &str, frames: Vec<Frame>| Tag {
			name: name.to_string(),
			direction: Direction::Forward,
			oam_budget: 0,
			frames,
		};
		let sprite = File {
			name: "hawk".to_string(),
			palette: vec![0; 4],
			sheet: vec![0; 8],
			tags: vec![
				tag("Idle", vec![frame_with_tiles(2)]),
				tag("Run", vec![frame_with_tiles(1), frame_with_tiles(1)]),
			],
		};

		let bytes = sprite.to_bytes().unwrap();
		let symbols = sprite.tag_symbols().unwrap();

		assert_eq!(symbols.len(), 2);
		assert_eq!(symbols[0].name, "Idle");
		assert_eq!(symbols[1].name, "Run");
		for symbol in &symbols {
			assert_eq!(&bytes[symbol.offset..symbol.offset + 3], b"TAG");
		}
		assert!(symbols[1].offset > symbols[0].offset);
	}

	#[test]
	fn test_serialization_is_idempotent() {
		let sprite = File {
			name: "hawk".to_string(),
			palette: vec![1, 2, 3, 4],
			sheet: vec![5, 6, 7, 8],
			tags: vec![Tag {
				name: "Idle".to_string(),
				direction: Direction::Reverse,
				oam_budget: 2,
				frames: vec![frame_with_tiles(2)],
			}],
		};
		assert_eq!(sprite.to_bytes().unwrap(), sprite.to_bytes().unwrap());
	}
}
