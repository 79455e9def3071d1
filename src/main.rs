//! Aseprite to SNES sprite resource converter.
//!
//! Converts an Aseprite sprite export into the `.sprite` binary resource
//! the game ROM links in, plus a WLA-DX include file mapping each animation
//! tag to its byte offset within the resource.
//!
//! The input directory is expected to contain three companion files named
//! after the directory:
//!
//! - `{name}.json` — the Aseprite atlas description (hash output, split
//!   layers and tags, trimmed cels, `{tag}__{tagframe}__{layer}` filenames)
//! - `{name}.bin` — the 4BPP pixel sheet
//! - `{name}.pal` — the RGB888 palette, converted here to BGR555
//!
//! # Usage
//!
//! ```bash
//! # Convert a sprite, linking its data into ROM bank 3
//! snespack -i resources/sprites/hawk -b 3
//!
//! # Fail on missing (tag, frame, layer) cels instead of skipping them
//! snespack -i resources/sprites/hawk -b 3 --strict
//!
//! # Verbose build tracing
//! RUST_LOG=debug snespack -i resources/sprites/hawk -b 3
//! ```

use std::path::PathBuf;

use clap::Parser;
use snespack_types::file::sprite::assets;
use snespack_types::file::{AssetPaths, BuildOptions, SpriteFile, TagSymbol, atlas};

#[derive(Parser)]
#[command(name = "snespack")]
#[command(version)]
#[command(about = "Aseprite to SNES sprite resource converter", long_about = None)]
struct Cli {
	/// Sprite directory containing {name}.json, {name}.bin and {name}.pal
	#[arg(short, long, value_name = "SPRITE_DIR")]
	input: PathBuf,

	/// ROM bank the sprite data is linked into
	#[arg(short, long, value_name = "BANK")]
	bank: u8,

	/// Output .sprite path (defaults to {dir}/{name}.sprite)
	#[arg(short, long, value_name = "OUTPUT")]
	output: Option<PathBuf>,

	/// Fail when an expected (tag, frame, layer) cel is missing
	#[arg(long)]
	strict: bool,
}

fn main() {
	// Initialize logger with default level set to info if RUST_LOG is not set
	env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

	let cli = Cli::parse();
	if let Err(err) = run(&cli) {
		log::error!("{err}");
		std::process::exit(1);
	}
}

fn run(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
	let paths = AssetPaths::from_sprite_dir(&cli.input)?;
	let raw = assets::load(&paths)?;

	let model = atlas::parse(&raw.atlas_json)?;

	let name = paths
		.atlas
		.file_stem()
		.and_then(std::ffi::OsStr::to_str)
		.unwrap_or("sprite")
		.to_string();

	let palette = rgb_to_bgr555(&raw.palette);
	let sprite = SpriteFile::build(
		&model,
		&name,
		palette,
		raw.sheet,
		&BuildOptions {
			strict: cli.strict,
		},
	)?;

	let output = cli
		.output
		.clone()
		.unwrap_or_else(|| cli.input.join(format!("{name}.sprite")));
	sprite.save(&output)?;

	let listing = render_include(&name, &sprite.tag_symbols()?, cli.bank);
	let include_path = cli.input.join(format!("{name}.i"));
	write_atomic(&include_path, listing.as_bytes())?;
	log::info!("wrote {} ({} bytes)", include_path.display(), listing.len());

	Ok(())
}

/// Writes `bytes` to a sibling temp file and renames it into place, so a
/// failed run never leaves a stale or partial file behind.
fn write_atomic(path: &std::path::Path, bytes: &[u8]) -> std::io::Result<()> {
	let mut tmp_name = path.as_os_str().to_owned();
	tmp_name.push(".tmp");
	let tmp = PathBuf::from(tmp_name);

	std::fs::write(&tmp, bytes)?;
	std::fs::rename(&tmp, path)
}

/// Converts packed RGB888 triplets to little-endian BGR555 words, the
/// console's native palette encoding. A trailing partial triplet is dropped.
fn rgb_to_bgr555(rgb: &[u8]) -> Vec<u8> {
	let mut out = Vec::with_capacity(rgb.len() / 3 * 2);
	for color in rgb.chunks_exact(3) {
		let r = u16::from(color[0] >> 3);
		let g = u16::from(color[1] >> 3);
		let b = u16::from(color[2] >> 3);
		let word = (b << 10) | (g << 5) | r;
		out.extend_from_slice(&word.to_le_bytes());
	}
	out
}

/// Renders the WLA-DX include file mapping tag names to their offsets
/// within the sprite resource.
fn render_include(name: &str, symbols: &[TagSymbol], bank: u8) -> String {
	let pretty = pretty_name(name);

	let mut out = format!("; Generated by snespack for {name}\n");
	out.push_str(&format!(
		"Sprite_{pretty}@Data: .incbin \"resources/sprites/{name}/{name}.sprite\"\n"
	));

	for symbol in symbols {
		let tag = symbol.name.replace('-', "_");
		let define = format!("Sprite_{pretty}@Tag@{tag}");
		out.push_str(&format!(
			".define {:<40} ${:04X} ; {}\n",
			define, symbol.offset, symbol.offset
		));
	}

	out.push_str(&format!(".define {:<40} {bank}", format!("Sprite_{pretty}@Bank")));
	out
}

/// Turns a sprite directory name into an assembly-friendly identifier:
/// `-`-separated chunks are capitalized and joined with `_`.
fn pretty_name(name: &str) -> String {
	name.split('-')
		.map(|chunk| {
			let mut chars = chunk.chars();
			match chars.next() {
				Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
				None => String::new(),
			}
		})
		.collect::<Vec<_>>()
		.join("_")
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_rgb_to_bgr555_packs_words() {
		// Pure red, pure green, pure blue at full intensity.
		let rgb = [0xFF, 0x00, 0x00, 0x00, 0xFF, 0x00, 0x00, 0x00, 0xFF];
		let words = rgb_to_bgr555(&rgb);
		assert_eq!(words.len(), 6);

		let red = u16::from_le_bytes([words[0], words[1]]);
		let green = u16::from_le_bytes([words[2], words[3]]);
		let blue = u16::from_le_bytes([words[4], words[5]]);
		assert_eq!(red, 0x001F);
		assert_eq!(green, 0x03E0);
		assert_eq!(blue, 0x7C00);
	}

	#[test]
	fn test_rgb_to_bgr555_drops_partial_triplet() {
		assert_eq!(rgb_to_bgr555(&[0xFF, 0xFF]).len(), 0);
	}

	#[test]
	fn test_pretty_name() {
		assert_eq!(pretty_name("hawk"), "Hawk");
		assert_eq!(pretty_name("blue-falcon"), "Blue_Falcon");
	}

	#[test]
	fn test_write_atomic_leaves_no_temp_file() {
		let dir = std::env::temp_dir().join(format!("snespack-include-{}", std::process::id()));
		std::fs::create_dir_all(&dir).unwrap();

		let path = dir.join("hawk.i");
		write_atomic(&path, b"; listing\n").unwrap();

		assert_eq!(std::fs::read(&path).unwrap(), b"; listing\n");
		assert!(!dir.join("hawk.i.tmp").exists());

		std::fs::remove_dir_all(&dir).unwrap();
	}

	#[test]
	fn test_render_include_layout() {
		let symbols = vec![
			TagSymbol {
				name: "Idle".to_string(),
				offset: 0x1234,
			},
			TagSymbol {
				name: "run-fast".to_string(),
				offset: 0x2000,
			},
		];
		let listing = render_include("hawk", &symbols, 3);

		assert!(listing.starts_with("; Generated by snespack for hawk\n"));
		assert!(listing.contains(
			"Sprite_Hawk@Data: .incbin \"resources/sprites/hawk/hawk.sprite\"\n"
		));
		assert!(listing.contains("Sprite_Hawk@Tag@Idle"));
		assert!(listing.contains("$1234 ; 4660"));
		assert!(listing.contains("Sprite_Hawk@Tag@run_fast"));
		assert!(listing.ends_with("3"));
		assert!(listing.contains("Sprite_Hawk@Bank"));
	}
}
