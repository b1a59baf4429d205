//! Command line interface definition and arg parsing

use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use swatch::QuantizeMethod;

/// Supported output formats for the final colors
#[derive(Copy, Clone, ValueEnum)]
pub enum FormatOutput {
	/// sRGB hexcode
	Hex,
	/// sRGB (r,g,b) triple
	Rgb,
	/// Whitespace with true color background
	Swatch,
}

/// Quantization algorithms selectable on the command line
#[derive(Copy, Clone, ValueEnum)]
pub enum MethodOption {
	/// Recursive median-cut partitioning
	MedianCut,
	/// Iterative k-means clustering
	KMeans,
}

impl From<MethodOption> for QuantizeMethod {
	fn from(method: MethodOption) -> Self {
		match method {
			MethodOption::MedianCut => QuantizeMethod::MedianCut,
			MethodOption::KMeans => QuantizeMethod::Kmeans,
		}
	}
}

/// Ways to colorize the output text
#[derive(Copy, Clone, ValueEnum)]
pub enum ColorizeOutput {
	/// Foreground
	Fg,
	/// Background
	Bg,
}

/// Extract a color palette from an image using median-cut partitioning or
/// k-means clustering.
///
/// The image's average color and dominant color can be printed alongside the
/// palette.
#[derive(Parser)]
#[command(version)]
pub struct Options {
	/// The path to the input image
	pub image: PathBuf,

	/// The number of colors to extract
	///
	/// Median-cut rounds this up to the next power of two internally, and
	/// k-means uses at least 2 clusters, so the output can hold more or
	/// fewer colors than requested.
	#[arg(short = 'k', long, default_value_t = 8)]
	pub colors: u8,

	/// The quantization algorithm to use
	#[arg(short, long, default_value = "median-cut")]
	pub method: MethodOption,

	/// Sampling stride in pixels
	///
	/// Every quality-th pixel per row and column is read, so 1 samples every
	/// pixel and 10 roughly every hundredth.
	#[arg(short, long, default_value_t = 10, value_parser = clap::value_parser!(u32).range(1..=10))]
	pub quality: u32,

	/// The seed value used for the random number generator
	#[arg(long, default_value_t = 0)]
	pub seed: u64,

	/// The format to print the colors in
	#[arg(short, long, default_value = "hex")]
	pub output: FormatOutput,

	/// Color the foreground or background for each printed color
	#[arg(short, long)]
	pub colorize: Option<ColorizeOutput>,

	/// Reverse the printed order of the colors
	#[arg(short, long)]
	pub reverse: bool,

	/// Also print the image-wide average color
	#[arg(long)]
	pub average: bool,

	/// Also print the dominant color
	#[arg(long)]
	pub dominant: bool,

	/// Print additional information, such as per stage timings
	#[arg(long)]
	pub verbose: bool,
}
