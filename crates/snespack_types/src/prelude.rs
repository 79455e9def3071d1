//! Prelude module for `snespack_types`.
//!
//! This module provides a convenient way to import commonly used types.
//!
//! # Examples
//!
//! ```no_run
//! use snespack_types::prelude::*;
//!
//! # fn main() -> Result<(), SpriteError> {
//! let paths = AssetPaths::from_sprite_dir("resources/sprites/hawk")?;
//! paths.check()?;
//! # Ok(())
//! # }
//! ```

// File module types
#[doc(inline)]
pub use crate::file::{
	// Atlas types
	AtlasModel,
	AtlasRect,
	AtlasSize,

	// Sprite types
	AssetPaths,
	BuildOptions,
	Cel,
	Direction,
	Frame,
	Layer,
	RawAssets,
	SizeClass,

	// Error type
	SpriteError,
	SpriteFile,
	Tag,
	TagDecl,
	TagSymbol,
	Tile,
};
