//! Companion asset resolution and loading.
//!
//! A sprite conversion needs three inputs living side by side: the atlas
//! JSON, the 4BPP pixel sheet (`.bin`) and the palette (`.pal`). The caller
//! supplies fully resolved paths; nothing in this crate ever consults the
//! process working directory. Existence of every companion is verified
//! before any parsing or tree construction, so a missing file aborts the
//! run before work starts.

use std::path::{Path, PathBuf};

use crate::file::error::SpriteError;

/// Fully resolved input paths for one sprite conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetPaths {
	/// Atlas JSON description
	pub atlas: PathBuf,

	/// 4BPP pixel sheet blob
	pub sheet: PathBuf,

	/// Raw palette blob
	pub palette: PathBuf,
}

impl AssetPaths {
	/// Resolves the conventional sprite-directory layout:
	/// `{dir}/{dirname}.json`, `{dir}/{dirname}.bin`, `{dir}/{dirname}.pal`.
	///
	/// # Errors
	///
	/// Fails when no sprite name can be derived from the directory path.
	pub fn from_sprite_dir(dir: impl AsRef<Path>) -> Result<Self, SpriteError> {
		let dir = dir.as_ref();
		let name = dir
			.file_name()
			.and_then(std::ffi::OsStr::to_str)
			.ok_or_else(|| SpriteError::MalformedAtlas {
				message: format!("cannot derive a sprite name from `{}`", dir.display()),
			})?;

		Ok(Self {
			atlas: dir.join(format!("{name}.json")),
			sheet: dir.join(format!("{name}.bin")),
			palette: dir.join(format!("{name}.pal")),
		})
	}

	/// Verifies that every companion file exists.
	///
	/// # Errors
	///
	/// Returns [`SpriteError::MissingAsset`] naming the first absent path.
	pub fn check(&self) -> Result<(), SpriteError> {
		for path in [&self.atlas, &self.sheet, &self.palette] {
			if !path.is_file() {
				return Err(SpriteError::MissingAsset {
					path: path.clone(),
				});
			}
		}
		Ok(())
	}
}

/// Companion data as read from disk. The palette arrives in whatever format
/// the authoring pipeline produced; conversion to the console's native
/// encoding happens outside this crate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawAssets {
	/// Atlas JSON text
	pub atlas_json: String,

	/// 4BPP pixel sheet bytes
	pub sheet: Vec<u8>,

	/// Raw palette bytes
	pub palette: Vec<u8>,
}

/// Checks that all companions exist, then reads them.
///
/// The existence pass runs first so that a missing sheet or palette is
/// reported before any atlas parsing happens.
pub fn load(paths: &AssetPaths) -> Result<RawAssets, SpriteError> {
	paths.check()?;

	let atlas_json = std::fs::read_to_string(&paths.atlas)?;
	let sheet = std::fs::read(&paths.sheet)?;
	let palette = std::fs::read(&paths.palette)?;

	log::info!(
		"loaded companions: {} ({} bytes), {} ({} bytes)",
		paths.sheet.display(),
		sheet.len(),
		paths.palette.display(),
		palette.len()
	);

	Ok(RawAssets {
		atlas_json,
		sheet,
		palette,
	})
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_conventional_layout() {
		let paths = AssetPaths::from_sprite_dir("resources/sprites/hawk").unwrap();
		assert_eq!(paths.atlas, PathBuf::from("resources/sprites/hawk/hawk.json"));
		assert_eq!(paths.sheet, PathBuf::from("resources/sprites/hawk/hawk.bin"));
		assert_eq!(paths.palette, PathBuf::from("resources/sprites/hawk/hawk.pal"));
	}

	#[test]
	fn test_check_reports_missing_companion() {
		let paths = AssetPaths::from_sprite_dir("/nonexistent/hawk").unwrap();
		let err = paths.check().expect_err("nothing exists under /nonexistent");
		match err {
			SpriteError::MissingAsset {
				path,
			} => assert_eq!(path, PathBuf::from("/nonexistent/hawk/hawk.json")),
			_ => panic!("Unexpected error: {err:?}"),
		}
	}

	#[test]
	fn test_load_fails_before_reading_anything() {
		let paths = AssetPaths::from_sprite_dir("/nonexistent/hawk").unwrap();
		assert!(matches!(load(&paths), Err(SpriteError::MissingAsset { .. })));
	}
}
