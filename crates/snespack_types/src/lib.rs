//! Core data types and `.sprite` resource encoding for the `snespack`
//! converter.
//!
//! Sprites are authored in Aseprite and exported as a packed pixel sheet
//! plus a JSON atlas description. This crate turns that description and its
//! two companion blobs (4BPP pixel sheet, console-native palette) into the
//! flat binary resource the SNES runtime consumes: a tree of Tile, Layer,
//! Frame and Tag records navigated through fixed-width relative offset
//! tables.
//!
//! # Pipeline
//!
//! 1. [`file::sprite::assets`] — resolve and load the companion files
//!    (existence is checked before any other work)
//! 2. [`file::atlas`] — parse the Aseprite JSON into an [`file::AtlasModel`]
//! 3. [`file::sprite::oam`] — decompose each cel into hardware tiles
//! 4. [`file::SpriteFile`] — assemble and serialize the resource
//!
//! # Examples
//!
//! Using the prelude (recommended):
//!
//! ```no_run
//! use snespack_types::prelude::*;
//!
//! # fn main() -> Result<(), SpriteError> {
//! let paths = AssetPaths::from_sprite_dir("resources/sprites/hawk")?;
//! let raw = snespack_types::file::sprite::assets::load(&paths)?;
//!
//! let model = snespack_types::file::atlas::parse(&raw.atlas_json)?;
//! let sprite =
//!     SpriteFile::build(&model, "hawk", raw.palette, raw.sheet, &BuildOptions::default())?;
//! sprite.save("hawk.sprite")?;
//! # Ok(())
//! # }
//! ```

pub mod file;

/// `use snespack_types::prelude::*;` to import commonly used items.
pub mod prelude;
