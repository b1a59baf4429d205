//! Extracts a color palette from an image on the command line.

#![deny(unsafe_code)]
#![warn(clippy::pedantic, clippy::cargo)]
#![warn(clippy::use_debug, clippy::dbg_macro, clippy::todo, clippy::unimplemented)]
#![warn(clippy::unwrap_used, clippy::unwrap_in_result)]
#![warn(clippy::unneeded_field_pattern, clippy::rest_pat_in_fully_bound_structs)]
#![warn(clippy::unnecessary_self_imports)]
#![warn(clippy::str_to_string, clippy::string_to_string, clippy::string_slice)]
#![warn(missing_docs, clippy::missing_docs_in_private_items, rustdoc::all)]
#![warn(clippy::float_cmp_const, clippy::lossy_float_literal)]
#![allow(clippy::module_name_repetitions)]

mod cli;

use cli::{ColorizeOutput, FormatOutput, Options};

use clap::Parser;
use colored::Colorize;
use image::DynamicImage;
use palette::Srgb;
use std::{
	fmt::{self, Display},
	path::Path,
	process::ExitCode,
	time::Instant,
};
use swatch::{ExtractError, Extractor};

/// Record the running time of a function and print the elapsed time
macro_rules! time {
	($name: literal, $verbose: expr, $func_call: expr) => {{
		let start = Instant::now();
		let result = $func_call;
		if $verbose {
			println!("{} took {}ms", $name, start.elapsed().as_millis());
		}
		result
	}};
}

/// Everything that can go wrong before colors reach stdout
#[derive(Debug)]
enum CliError {
	/// Failed to read or decode the image file
	ImageLoad(image::ImageError),
	/// The analysis engine rejected a request
	Extract(ExtractError),
}

impl Display for CliError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			CliError::ImageLoad(e) => write!(f, "Failed to load the image file: {e}"),
			CliError::Extract(e) => write!(f, "Failed to analyze the image: {e}"),
		}
	}
}

impl From<ExtractError> for CliError {
	fn from(e: ExtractError) -> Self {
		CliError::Extract(e)
	}
}

fn main() -> ExitCode {
	let options = Options::parse();

	// Returning Result<_> uses Debug printing instead of Display
	if let Err(e) = extract_and_print_palette(&options) {
		eprintln!("{e}");
		ExitCode::FAILURE
	} else {
		ExitCode::SUCCESS
	}
}

/// Load an image, extract its palette, and print the result using the given
/// options
fn extract_and_print_palette(options: &Options) -> Result<(), CliError> {
	let img = time!("Image loading", options.verbose, load_image(&options.image))?;

	let mut extractor = Extractor::with_seed(img.into_rgb8(), options.seed);
	// The clap range parser already restricted quality to 1..=10
	let _ = extractor.set_quality(options.quality);

	time!("Sampling", options.verbose, extractor.sample())?;

	let mut palette = time!(
		"Palette extraction",
		options.verbose,
		extractor.palette(u32::from(options.colors), options.method.into())
	)?;

	if options.reverse {
		palette.reverse();
	}

	print_palette(&palette, options);

	if options.average {
		let color = extractor.average_color()?;
		println!("average  {}", colorize_text(format_color(color, options.output), color, options.colorize));
	}

	if options.dominant {
		let color = extractor.dominant_color()?;
		println!("dominant {}", colorize_text(format_color(color, options.output), color, options.colorize));
	}

	Ok(())
}

/// Load the image at the given path
fn load_image(path: &Path) -> Result<DynamicImage, CliError> {
	image::open(path).map_err(CliError::ImageLoad)
}

/// Print one line with all palette colors
fn print_palette(palette: &[Srgb<u8>], options: &Options) {
	let delimiter = match options.output {
		FormatOutput::Swatch => "",
		FormatOutput::Hex | FormatOutput::Rgb => " ",
	};

	let line = palette
		.iter()
		.map(|&color| colorize_text(format_color(color, options.output), color, options.colorize))
		.collect::<Vec<_>>()
		.join(delimiter);

	println!("{line}");
}

/// Render a single color as text in the requested format
fn format_color(color: Srgb<u8>, output: FormatOutput) -> String {
	match output {
		FormatOutput::Hex => format!("#{color:X}"),
		FormatOutput::Rgb => format!("({},{},{})", color.red, color.green, color.blue),
		FormatOutput::Swatch => "   ".on_truecolor(color.red, color.green, color.blue).to_string(),
	}
}

/// Apply the colorize option to already formatted text
fn colorize_text(text: String, color: Srgb<u8>, colorize: Option<ColorizeOutput>) -> String {
	match colorize {
		Some(ColorizeOutput::Fg) => text.truecolor(color.red, color.green, color.blue).to_string(),
		Some(ColorizeOutput::Bg) => text.on_truecolor(color.red, color.green, color.blue).to_string(),
		None => text,
	}
}
