//! Hierarchical record building: Layer, Frame and Tag.
//!
//! Every level of the sprite tree follows the same pattern: children are
//! serialized independently in order, a fixed-width metadata table records
//! each child's start offset within the concatenated payload, and the
//! parent record is `magic + header fields + metadata table + payload`.
//! Offsets are always relative to the start of that level's children blob,
//! never absolute, so any sub-tree is self-contained and relocatable and
//! the runtime can jump straight to the Nth child.
//!
//! Tiles are the exception: all tiles within a layer share one fixed record
//! size, so they carry no metadata table and are addressed by index.
//!
//! Offsets are derived purely from the lengths of already-encoded children;
//! headers are only emitted once the table is fixed.

use crate::file::atlas::Direction;
use crate::file::error::{SpriteError, checked_u8, checked_u16};

use super::oam::{Tile, constants::TILE_RECORD_SIZE};

/// Record magic values. Three ASCII bytes each, present for structural
/// self-description and debugging; the runtime navigates by offsets alone.
pub mod magic {
	/// Tile record
	pub const TILE: &[u8; 3] = b"TIL";

	/// Layer record
	pub const LAYER: &[u8; 3] = b"LYR";

	/// Frame layer metadata entry
	pub const FRAME_LAYER_META: &[u8; 3] = b"FLM";

	/// Frame record
	pub const FRAME: &[u8; 3] = b"FRM";

	/// Tag frame metadata entry
	pub const TAG_FRAME_META: &[u8; 3] = b"FMD";

	/// Tag record
	pub const TAG: &[u8; 3] = b"TAG";

	/// Tag metadata entry
	pub const TAG_META: &[u8; 3] = b"TMD";

	/// Sprite header
	pub const SPRITE: &[u8; 3] = b"SPR";
}

/// Offset table over a level's serialized children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ChildTable {
	/// Start offset of each child within [`ChildTable::payload`]
	pub offsets: Vec<u16>,

	/// Children serialized back to back, in list order
	pub payload: Vec<u8>,
}

/// Serializes `children` in order and derives the relative offset table.
///
/// Each offset is the running sum of the byte lengths of strictly preceding
/// siblings, checked against the 16-bit field width named by `offset_field`.
pub(crate) fn pack_children<T>(
	children: &[T],
	offset_field: &'static str,
	encode: impl Fn(&T) -> Result<Vec<u8>, SpriteError>,
) -> Result<ChildTable, SpriteError> {
	let encoded: Vec<Vec<u8>> = children.iter().map(encode).collect::<Result<_, _>>()?;

	let mut offsets = Vec::with_capacity(encoded.len());
	let mut running = 0usize;
	for bytes in &encoded {
		offsets.push(checked_u16(offset_field, running)?);
		running += bytes.len();
	}

	let mut payload = Vec::with_capacity(running);
	for bytes in encoded {
		payload.extend_from_slice(&bytes);
	}

	Ok(ChildTable {
		offsets,
		payload,
	})
}

/// Hardware tiles covering one authoring layer within one frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layer {
	/// Index of the layer in the declared authoring layer list
	pub layer_id: u8,

	/// Horizontal offset of the trimmed region within the layer canvas
	pub rx: u8,

	/// Vertical offset of the trimmed region within the layer canvas
	pub ry: u8,

	/// Row-major hardware tiles covering the trimmed region
	pub tiles: Vec<Tile>,
}

impl Layer {
	/// Serialized size of the layer header (`LYR` + 4 bytes + u16)
	pub const HEADER_SIZE: usize = 9;

	/// Serializes the layer header followed by its tile payload.
	///
	/// # Errors
	///
	/// Returns [`SpriteError::CapacityOverflow`] when the tile count does
	/// not fit its byte-wide field.
	pub fn to_bytes(&self) -> Result<Vec<u8>, SpriteError> {
		let tile_count = checked_u8("layer tile count", self.tiles.len())?;

		let mut bytes = Vec::with_capacity(Self::HEADER_SIZE + self.tiles.len() * TILE_RECORD_SIZE);
		bytes.extend_from_slice(magic::LAYER);
		bytes.push(self.layer_id);
		bytes.push(self.rx);
		bytes.push(self.ry);
		bytes.push(tile_count);
		// Tiles start at the beginning of the payload and are addressed by
		// index * TILE_RECORD_SIZE, so the table offset is always zero.
		bytes.extend_from_slice(&0u16.to_le_bytes());

		for tile in &self.tiles {
			bytes.extend_from_slice(&tile.to_bytes());
		}

		Ok(bytes)
	}
}

/// One animation step: an ordered list of layers, reverse authoring order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Frame {
	/// Layers contributing to this frame; layers with zero tiles are absent
	pub layers: Vec<Layer>,
}

impl Frame {
	/// Serialized size of the frame header (`FRM` + 3 bytes + 2 u16)
	pub const HEADER_SIZE: usize = 10;

	/// Serialized size of one `FLM` metadata entry
	pub const META_ENTRY_SIZE: usize = 6;

	/// Total hardware tile count across this frame's layers.
	///
	/// Feeds the owning tag's OAM budget.
	pub fn tile_count(&self) -> usize {
		self.layers.iter().map(|layer| layer.tiles.len()).sum()
	}

	/// Serializes the frame header, its layer metadata table and the layer
	/// payload.
	pub fn to_bytes(&self) -> Result<Vec<u8>, SpriteError> {
		let table = pack_children(&self.layers, "frame layer offset", Layer::to_bytes)?;

		let layer_count = checked_u8("frame layer count", self.layers.len())?;
		let meta_len = self.layers.len() * Self::META_ENTRY_SIZE;
		let layer_offset = checked_u16("frame layer payload offset", meta_len)?;

		let mut bytes = Vec::with_capacity(Self::HEADER_SIZE + meta_len + table.payload.len());
		bytes.extend_from_slice(magic::FRAME);
		bytes.push(layer_count);
		bytes.push(layer_count); // metadata entry count, one entry per layer
		bytes.extend_from_slice(&0u16.to_le_bytes()); // metadata table leads the blob
		bytes.push(layer_count);
		bytes.extend_from_slice(&layer_offset.to_le_bytes());

		for (layer, offset) in self.layers.iter().zip(&table.offsets) {
			bytes.extend_from_slice(magic::FRAME_LAYER_META);
			bytes.push(layer.layer_id);
			bytes.extend_from_slice(&offset.to_le_bytes());
		}
		bytes.extend_from_slice(&table.payload);

		Ok(bytes)
	}
}

/// One animation clip: a named, directed sequence of frames.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
	/// Tag name. Display-only: referenced by the symbol listing, never
	/// serialized into the record.
	pub name: String,

	/// Playback direction
	pub direction: Direction,

	/// Peak simultaneous hardware tile count across this tag's frames, a
	/// planning value for the runtime's sprite-slot allocator
	pub oam_budget: u8,

	/// Ordered frames of the clip
	pub frames: Vec<Frame>,
}

impl Tag {
	/// Serialized size of the tag header (`TAG` + 4 bytes + 2 u16)
	pub const HEADER_SIZE: usize = 11;

	/// Serialized size of one `FMD` metadata entry
	pub const META_ENTRY_SIZE: usize = 5;

	/// Serializes the tag header, its frame metadata table and the frame
	/// payload.
	pub fn to_bytes(&self) -> Result<Vec<u8>, SpriteError> {
		let table = pack_children(&self.frames, "tag frame offset", Frame::to_bytes)?;

		let frame_count = checked_u8("tag frame count", self.frames.len())?;
		let meta_len = self.frames.len() * Self::META_ENTRY_SIZE;
		let frame_offset = checked_u16("tag frame payload offset", meta_len)?;

		log::debug!(
			"serializing tag `{}`: {} frames, OAM budget {}",
			self.name,
			self.frames.len(),
			self.oam_budget
		);

		let mut bytes = Vec::with_capacity(Self::HEADER_SIZE + meta_len + table.payload.len());
		bytes.extend_from_slice(magic::TAG);
		bytes.push(self.direction.code());
		bytes.push(self.oam_budget);
		bytes.push(frame_count); // metadata entry count, one entry per frame
		bytes.extend_from_slice(&0u16.to_le_bytes()); // metadata table leads the blob
		bytes.push(frame_count);
		bytes.extend_from_slice(&frame_offset.to_le_bytes());

		for offset in &table.offsets {
			bytes.extend_from_slice(magic::TAG_FRAME_META);
			bytes.extend_from_slice(&offset.to_le_bytes());
		}
		bytes.extend_from_slice(&table.payload);

		Ok(bytes)
	}
}
