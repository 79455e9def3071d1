//! Hardware (OAM) tile decomposition.
//!
//! SNES hardware sprites come in fixed sizes. A trimmed cel region rarely
//! matches one, so each region is chopped into a row-major grid of hardware
//! tiles that the runtime places individually.
//!
//! # Size class rule
//!
//! A region uses small (8x8) tiles when either dimension is below the large
//! tile edge (32 pixels), and large (32x32) tiles otherwise. The decision is
//! made once per region, never per tile.
//!
//! # Address rule
//!
//! Every tile carries an index into the shared tile-table memory, laid out
//! as 16 single-tile (8x8) cells per row. The base address of a region at
//! sheet position `(x, y)` is `16 * (y / 8) + x / 8`. Stepping one tile to
//! the right advances the address by `edge / 8`; stepping to the next tile
//! row advances it by a size-class stride (0x10 for small, 0x40 for large,
//! because a large tile spans four 8-pixel rows of the table) and resets
//! the column.

use crate::file::error::{SpriteError, checked_u8};

/// OAM decomposition constants.
pub mod constants {
	/// Edge length of a small hardware tile in pixels
	pub const SMALL_TILE_DIM: u32 = 8;

	/// Edge length of a large hardware tile in pixels
	pub const LARGE_TILE_DIM: u32 = 32;

	/// Single-tile cells per row of the shared tile-table memory
	pub const TILE_TABLE_COLUMNS: u32 = 16;

	/// Tile-table row stride for small tiles
	pub const SMALL_ROW_STRIDE: u32 = 0x10;

	/// Tile-table row stride for large tiles
	pub const LARGE_ROW_STRIDE: u32 = 0x40;

	/// Serialized size of one tile record (magic + 4 fields)
	pub const TILE_RECORD_SIZE: usize = 7;
}

/// Hardware sprite size class, chosen once for a whole region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum SizeClass {
	/// 8x8 hardware tiles
	Small = 0,

	/// 32x32 hardware tiles
	Large = 1,
}

impl SizeClass {
	/// Picks the size class for a region: small when either dimension is
	/// below the large tile edge, large otherwise.
	pub fn for_region(w: u32, h: u32) -> Self {
		if w < constants::LARGE_TILE_DIM || h < constants::LARGE_TILE_DIM {
			Self::Small
		} else {
			Self::Large
		}
	}

	/// Wire encoding of the size class (small=0, large=1).
	pub fn code(self) -> u8 {
		self as u8
	}

	/// Tile edge length in pixels.
	pub fn dimension(self) -> u32 {
		match self {
			Self::Small => constants::SMALL_TILE_DIM,
			Self::Large => constants::LARGE_TILE_DIM,
		}
	}

	/// Tile-table address stride between consecutive tile rows.
	pub fn row_stride(self) -> u32 {
		match self {
			Self::Small => constants::SMALL_ROW_STRIDE,
			Self::Large => constants::LARGE_ROW_STRIDE,
		}
	}
}

/// One hardware tile covering part of a layer region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tile {
	/// Index into the shared tile-table memory holding this tile's pixels
	pub tile_table_address: u8,

	/// Size class shared by every tile of the region
	pub size_class: SizeClass,

	/// Horizontal pixel offset relative to the layer's trimmed origin
	pub rx: u8,

	/// Vertical pixel offset relative to the layer's trimmed origin
	pub ry: u8,
}

impl Tile {
	/// Serializes the tile record (`TIL` + 4 bytes).
	pub fn to_bytes(&self) -> [u8; constants::TILE_RECORD_SIZE] {
		[
			b'T',
			b'I',
			b'L',
			self.tile_table_address,
			self.size_class.code(),
			self.rx,
			self.ry,
		]
	}
}

/// Decomposes a pixel region into an ordered sequence of hardware tiles.
///
/// `(sheet_x, sheet_y)` is the region's absolute position within the packed
/// sheet and `(w, h)` its extent. Tiles are emitted in row-major order, top
/// row left to right. A zero-area region yields an empty tile list; callers
/// drop such layers entirely.
///
/// # Errors
///
/// Returns [`SpriteError::CapacityOverflow`] when a tile-table address or a
/// relative offset does not fit its byte-wide record field.
pub fn decompose(
	sheet_x: u32,
	sheet_y: u32,
	w: u32,
	h: u32,
) -> Result<(SizeClass, Vec<Tile>), SpriteError> {
	let size_class = SizeClass::for_region(w, h);
	let dim = size_class.dimension();

	let cols = w.div_ceil(dim);
	let rows = h.div_ceil(dim);

	let base = constants::TILE_TABLE_COLUMNS * (sheet_y / 8) + sheet_x / 8;

	let mut tiles = Vec::with_capacity((cols * rows) as usize);
	for row in 0..rows {
		let row_base = base + row * size_class.row_stride();
		for col in 0..cols {
			let address = row_base + col * (dim / 8);
			tiles.push(Tile {
				tile_table_address: checked_u8("tile table address", address as usize)?,
				size_class,
				rx: checked_u8("tile rx", (col * dim) as usize)?,
				ry: checked_u8("tile ry", (row * dim) as usize)?,
			});
		}
	}

	log::debug!(
		"decomposed {w}x{h} region at ({sheet_x}, {sheet_y}) into {} {size_class:?} tiles ({cols}x{rows})",
		tiles.len()
	);

	Ok((size_class, tiles))
}
