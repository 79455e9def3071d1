//! File type support for the `snespack` converter.

mod error;

pub mod atlas;
pub mod sprite;

// Re-export unified error type
pub use error::SpriteError;

// Re-export main types
pub use atlas::{AtlasModel, AtlasRect, AtlasSize, Cel, Direction, TagDecl};
pub use sprite::{
	AssetPaths, BuildOptions, File as SpriteFile, Frame, Layer, RawAssets, SizeClass, Tag,
	TagSymbol, Tile,
};
