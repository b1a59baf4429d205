//! Extract a representative color palette from an image.
//!
//! Pixels are sampled at a configurable stride and reduced to a small set of
//! representative colors by one of two quantization methods:
//! recursive median-cut partitioning or iterative k-means clustering.
//! The image-wide average color and the dominant color
//! (the average of the most populous bucket) are derived along the way.
//!
//! # Examples
//!
//! ## Read an image file and get an 8 color palette.
//!
//! ```no_run
//! use swatch::{Extractor, QuantizeMethod};
//!
//! let pixels = image::open("some image").unwrap().into_rgb8();
//! let mut extractor = Extractor::new(pixels);
//! extractor.sample().unwrap();
//! let palette = extractor.palette(8, QuantizeMethod::MedianCut).unwrap();
//! ```
//!
//! ## Compare both methods over the same sample set.
//!
//! ```no_run
//! use swatch::{Extractor, QuantizeMethod};
//!
//! let pixels = image::open("some image").unwrap().into_rgb8();
//! let mut extractor = Extractor::with_seed(pixels, 42);
//! extractor.sample().unwrap();
//!
//! let cut = extractor.palette(8, QuantizeMethod::MedianCut).unwrap();
//! let kmeans = extractor.palette(8, QuantizeMethod::Kmeans).unwrap();
//! ```
//!
//! # Arguments
//!
//! ## Quality
//!
//! The sampling stride in pixels, in the range `1..=10`.
//! A stride of 1 reads every pixel, while a stride of 10 reads roughly every
//! hundredth, trading color accuracy for speed. The default is 10.
//!
//! ## Colors
//!
//! The number of palette colors to extract.
//! Median-cut always produces a power of two number of buckets, so the
//! requested count is rounded up to the next power of two internally.
//! K-means uses at least 2 clusters. Either method can return fewer colors
//! than requested when buckets end up empty.
//!
//! ## Seed
//!
//! K-means picks its starting centroids at random. [`Extractor::with_seed`]
//! pins the generator for reproducible palettes; [`Extractor::new`] seeds it
//! from system entropy.

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
#![allow(clippy::enum_glob_use)]

use image::{ImageBuffer, RgbImage};
use palette::Srgb;
use rand::SeedableRng;
use rand_xoshiro::Xoroshiro128PlusPlus;
use std::{
	cmp::Ordering,
	error::Error,
	fmt::{self, Display},
};

mod kmeans;
mod median_cut;

/// Sampling stride used when none is configured
const DEFAULT_QUALITY: u32 = 10;

/// A decoded grid of pixels that an [`Extractor`] can sample from.
///
/// The engine only ever reads colors through this narrow interface;
/// decoding files into pixels is the job of an image codec such as the
/// [`image`] crate, for whose [`RgbImage`] an implementation is provided.
pub trait PixelSource {
	/// Width of the grid in pixels
	fn width(&self) -> u32;

	/// Height of the grid in pixels
	fn height(&self) -> u32;

	/// The RGB color at `(x, y)`; both coordinates are within bounds
	fn pixel_color(&self, x: u32, y: u32) -> Srgb<u8>;
}

impl PixelSource for RgbImage {
	fn width(&self) -> u32 {
		ImageBuffer::width(self)
	}

	fn height(&self) -> u32 {
		ImageBuffer::height(self)
	}

	fn pixel_color(&self, x: u32, y: u32) -> Srgb<u8> {
		let image::Rgb([r, g, b]) = *self.get_pixel(x, y);
		Srgb::new(r, g, b)
	}
}

/// Reasons a request cannot be served.
///
/// Every variant reflects a precondition violated by the caller; the engine
/// performs no retries and no partial recovery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractError {
	/// No pixel source is attached to the extractor
	NotLoaded,
	/// No colors have been sampled yet
	NoSampleData,
	/// No palette has been computed yet
	PaletteNotComputed,
}

impl Display for ExtractError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			ExtractError::NotLoaded => write!(f, "no pixel source is attached"),
			ExtractError::NoSampleData => write!(f, "no sample data, call sample() first"),
			ExtractError::PaletteNotComputed => write!(f, "no palette has been computed yet"),
		}
	}
}

impl Error for ExtractError {}

/// Quantization algorithm used to group samples into buckets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantizeMethod {
	/// Recursive partitioning along the channel with the widest value range
	MedianCut,
	/// Iterative clustering around k centroids
	Kmeans,
}

/// A color analysis session over a single pixel source.
///
/// The extractor owns its sample set and caches derived results,
/// so one instance covers one image; [`Extractor::attach`] swaps in a new
/// source and discards everything derived from the old one.
#[derive(Debug, Clone)]
pub struct Extractor<S> {
	/// The attached pixel source, if any
	source: Option<S>,
	/// Sampling stride in pixels, in `1..=10`
	quality: u32,
	/// Generator used to pick the initial k-means centroids
	rng: Xoroshiro128PlusPlus,
	/// Colors gathered by [`Extractor::sample`], in scan order
	samples: Vec<Srgb<u8>>,
	/// Cached image-wide average color
	average: Option<Srgb<u8>>,
	/// Average color of the most populous bucket from the last palette
	dominant: Option<Srgb<u8>>,
}

impl<S> Extractor<S> {
	/// Create an extractor with no pixel source attached.
	///
	/// [`Extractor::sample`] fails with [`ExtractError::NotLoaded`] until a
	/// source is provided via [`Extractor::attach`].
	#[must_use]
	pub fn detached() -> Self {
		Self {
			source: None,
			quality: DEFAULT_QUALITY,
			rng: Xoroshiro128PlusPlus::from_entropy(),
			samples: Vec::new(),
			average: None,
			dominant: None,
		}
	}

	/// Attach a new pixel source, discarding the sample set and every cached
	/// result derived from the previous source.
	pub fn attach(&mut self, source: S) {
		self.source = Some(source);
		self.samples.clear();
		self.average = None;
		self.dominant = None;
	}

	/// The sampling stride currently in use
	#[must_use]
	pub fn quality(&self) -> u32 {
		self.quality
	}

	/// Set the sampling stride, accepting only values in `1..=10`.
	///
	/// Out of range values are rejected by returning `false` and leave the
	/// current stride untouched. Changing the stride does not invalidate an
	/// existing sample set; attach a source again to resample.
	pub fn set_quality(&mut self, quality: u32) -> bool {
		if (1..=10).contains(&quality) {
			self.quality = quality;
			true
		} else {
			false
		}
	}
}

impl<S: PixelSource> Extractor<S> {
	/// Create an extractor for the given pixel source with a fresh random
	/// seed.
	#[must_use]
	pub fn new(source: S) -> Self {
		Self::from_rng(source, Xoroshiro128PlusPlus::from_entropy())
	}

	/// Create an extractor whose k-means centroid seeding is reproducible
	/// across runs.
	#[must_use]
	pub fn with_seed(source: S, seed: u64) -> Self {
		Self::from_rng(source, Xoroshiro128PlusPlus::seed_from_u64(seed))
	}

	/// Build an extractor around an already constructed generator
	fn from_rng(source: S, rng: Xoroshiro128PlusPlus) -> Self {
		Self {
			source: Some(source),
			quality: DEFAULT_QUALITY,
			rng,
			samples: Vec::new(),
			average: None,
			dominant: None,
		}
	}

	/// Walk the pixel grid at the configured stride and collect one color
	/// sample per visited coordinate.
	///
	/// The first call reads the source; later calls return the existing
	/// sample set without revisiting any pixels.
	///
	/// # Errors
	///
	/// Returns [`ExtractError::NotLoaded`] when no pixel source is attached.
	pub fn sample(&mut self) -> Result<&[Srgb<u8>], ExtractError> {
		let source = self.source.as_ref().ok_or(ExtractError::NotLoaded)?;

		if self.samples.is_empty() {
			let (width, height) = (source.width(), source.height());

			for x in (0..width).step_by(self.quality as usize) {
				for y in (0..height).step_by(self.quality as usize) {
					self.samples.push(source.pixel_color(x, y));
				}
			}
		}

		Ok(&self.samples)
	}

	/// Reduce the sample set to at most `colors` representative colors using
	/// the given quantization method.
	///
	/// Median-cut rounds `colors` up to the next power of two number of
	/// buckets; k-means clusters around `max(colors, 2)` centroids. Empty
	/// buckets contribute no palette entry, so the result can be shorter
	/// than requested. The returned palette is sorted by the composite
	/// channel order (see [`Extractor::dominant_color`] for the dominant
	/// bucket, which is cached by this call).
	///
	/// # Errors
	///
	/// Returns [`ExtractError::NoSampleData`] when [`Extractor::sample`] has
	/// not produced any colors yet.
	pub fn palette(&mut self, colors: u32, method: QuantizeMethod) -> Result<Vec<Srgb<u8>>, ExtractError> {
		if self.samples.is_empty() {
			return Err(ExtractError::NoSampleData);
		}

		let buckets: Vec<Vec<Srgb<u8>>> = match method {
			QuantizeMethod::MedianCut => {
				let ranges = median_cut::partition(&mut self.samples, split_depth(colors));
				ranges.into_iter().map(|range| self.samples[range].to_vec()).collect()
			},
			QuantizeMethod::Kmeans => kmeans::cluster(&self.samples, colors, &mut self.rng),
		};

		// Largest bucket wins, the first encountered on ties
		let mut dominant = 0;
		for (i, bucket) in buckets.iter().enumerate().skip(1) {
			if bucket.len() > buckets[dominant].len() {
				dominant = i;
			}
		}
		self.dominant = average(&buckets[dominant]);

		let mut palette: Vec<Srgb<u8>> = buckets.iter().filter_map(|bucket| average(bucket)).collect();
		palette.sort_by(palette_order);

		Ok(palette)
	}

	/// The average color over the whole sample set.
	///
	/// Computed once with integer truncated channel means and cached for the
	/// lifetime of the sample set.
	///
	/// # Errors
	///
	/// Returns [`ExtractError::NoSampleData`] when [`Extractor::sample`] has
	/// not produced any colors yet.
	pub fn average_color(&mut self) -> Result<Srgb<u8>, ExtractError> {
		if let Some(color) = self.average {
			return Ok(color);
		}

		let color = average(&self.samples).ok_or(ExtractError::NoSampleData)?;
		self.average = Some(color);
		Ok(color)
	}

	/// The average color of the most populous bucket from the last
	/// [`Extractor::palette`] call.
	///
	/// # Errors
	///
	/// Returns [`ExtractError::PaletteNotComputed`] when no palette has been
	/// computed yet.
	pub fn dominant_color(&self) -> Result<Srgb<u8>, ExtractError> {
		self.dominant.ok_or(ExtractError::PaletteNotComputed)
	}
}

/// Smallest exponent `p` such that `2^p` buckets cover the requested color
/// count
fn split_depth(colors: u32) -> u32 {
	let mut pow = 0;
	while (1u64 << pow) < u64::from(colors) {
		pow += 1;
	}
	pow
}

/// Per-channel integer truncated mean of a bucket, or `None` when the bucket
/// is empty
fn average(colors: &[Srgb<u8>]) -> Option<Srgb<u8>> {
	if colors.is_empty() {
		return None;
	}

	let (mut r, mut g, mut b) = (0u64, 0u64, 0u64);
	for color in colors {
		r += u64::from(color.red);
		g += u64::from(color.green);
		b += u64::from(color.blue);
	}

	let n = colors.len() as u64;
	// Channel means of u8 values stay within u8 range
	#[allow(clippy::cast_possible_truncation)]
	let mean = Srgb::new((r / n) as u8, (g / n) as u8, (b / n) as u8);
	Some(mean)
}

/// Composite palette order: the sum of the three per-channel comparisons
/// decides, so a deficit in one channel can be offset by the other two.
/// This is not a lexicographic tuple order.
fn palette_order(x: &Srgb<u8>, y: &Srgb<u8>) -> Ordering {
	/// A single channel comparison as its -1/0/+1 contribution
	fn channel(a: u8, b: u8) -> i32 {
		match a.cmp(&b) {
			Ordering::Less => -1,
			Ordering::Equal => 0,
			Ordering::Greater => 1,
		}
	}

	let sum = channel(x.red, y.red) + channel(x.green, y.green) + channel(x.blue, y.blue);
	sum.cmp(&0)
}
