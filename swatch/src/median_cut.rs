//! Recursive median-cut partitioning of a color sample buffer.

use palette::Srgb;
use std::ops::Range;

/// RGB channel selector for per-channel reads during partitioning
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Channel {
	/// Red component
	Red,
	/// Green component
	Green,
	/// Blue component
	Blue,
}

impl Channel {
	/// The value of this channel in `color`
	fn of(self, color: Srgb<u8>) -> u8 {
		match self {
			Channel::Red => color.red,
			Channel::Green => color.green,
			Channel::Blue => color.blue,
		}
	}
}

/// Split `samples` into `2^depth` contiguous buckets, reordering the buffer
/// in place so that every bucket occupies one of the returned ranges.
///
/// The ranges cover the buffer exactly once, in order. Buckets can be empty
/// when there are fewer samples than buckets.
pub(crate) fn partition(samples: &mut [Srgb<u8>], depth: u32) -> Vec<Range<usize>> {
	let mut buckets = Vec::new();
	split(samples, 0, samples.len(), depth, &mut buckets);
	buckets
}

/// Recursive halving step: reorder `[start, end)` by its widest channel and
/// cut at the half point until `depth` reaches zero
fn split(samples: &mut [Srgb<u8>], start: usize, end: usize, depth: u32, buckets: &mut Vec<Range<usize>>) {
	if depth == 0 {
		buckets.push(start..end);
		return;
	}

	if start < end {
		let channel = widest_channel(&samples[start..end]);
		// Sample counts stay far below isize::MAX
		#[allow(clippy::cast_possible_wrap)]
		sort_range(samples, channel, start as isize, (end - 1) as isize);
	}

	// The lower half takes the extra element on odd sizes
	let half = (end - start + 1) / 2;
	split(samples, start, start + half, depth - 1, buckets);
	split(samples, start + half, end, depth - 1, buckets);
}

/// The channel with the largest value range across `samples`; red wins ties
/// over green and blue, and green wins ties over blue
fn widest_channel(samples: &[Srgb<u8>]) -> Channel {
	let r = channel_range(samples, Channel::Red);
	let g = channel_range(samples, Channel::Green);
	let b = channel_range(samples, Channel::Blue);

	if r >= g && r >= b {
		Channel::Red
	} else if g >= r && g >= b {
		Channel::Green
	} else {
		Channel::Blue
	}
}

/// Difference between the largest and smallest value of `channel`;
/// `samples` must be non-empty
fn channel_range(samples: &[Srgb<u8>], channel: Channel) -> u8 {
	let mut min = u8::MAX;
	let mut max = u8::MIN;

	for &color in samples {
		let value = channel.of(color);
		min = min.min(value);
		max = max.max(value);
	}

	max - min
}

/// Hoare-style quicksort over `samples[low..=high]` keyed on `channel`,
/// pivoting on the middle element
fn sort_range(samples: &mut [Srgb<u8>], channel: Channel, low: isize, high: isize) {
	let mut i = low;
	let mut j = high;

	// The scans stop at the pivot value at the latest, so i and j stay
	// within [low - 1, high + 1] and are only used as indices in between
	#[allow(clippy::cast_sign_loss)]
	{
		let pivot = channel.of(samples[(low + (high - low) / 2) as usize]);

		while i <= j {
			while channel.of(samples[i as usize]) < pivot {
				i += 1;
			}

			while channel.of(samples[j as usize]) > pivot {
				j -= 1;
			}

			if i <= j {
				samples.swap(i as usize, j as usize);
				i += 1;
				j -= 1;
			}
		}
	}

	if low < j {
		sort_range(samples, channel, low, j);
	}

	if i < high {
		sort_range(samples, channel, i, high);
	}
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
	use super::*;

	/// Deterministic spread of 24 colors with all channels varying
	fn test_colors() -> Vec<Srgb<u8>> {
		(0u16..24)
			.map(|i| Srgb::new((i * 31 % 256) as u8, (i * 67 % 256) as u8, (i * 101 % 256) as u8))
			.collect()
	}

	#[test]
	fn yields_exactly_two_pow_depth_buckets() {
		let mut samples = test_colors();
		let len = samples.len();
		let buckets = partition(&mut samples, 3);

		assert_eq!(buckets.len(), 8);

		// Contiguous cover of the whole buffer
		let mut expected_start = 0;
		for bucket in &buckets {
			assert_eq!(bucket.start, expected_start);
			expected_start = bucket.end;
		}
		assert_eq!(expected_start, len);
	}

	#[test]
	fn reordering_preserves_the_sample_multiset() {
		let mut samples = test_colors();
		let mut expected = samples.clone();

		partition(&mut samples, 2);

		let key = |color: &Srgb<u8>| (color.red, color.green, color.blue);
		samples.sort_by_key(key);
		expected.sort_by_key(key);
		assert_eq!(samples, expected);
	}

	#[test]
	fn empty_input_still_produces_empty_buckets() {
		let buckets = partition(&mut [], 2);
		assert_eq!(buckets, vec![0..0, 0..0, 0..0, 0..0]);
	}

	#[test]
	fn depth_zero_keeps_a_single_bucket() {
		let mut samples = test_colors();
		let len = samples.len();
		let buckets = partition(&mut samples, 0);
		assert_eq!(buckets, vec![0..len]);
	}

	#[test]
	fn odd_ranges_split_with_the_larger_lower_half() {
		let mut samples = vec![Srgb::new(255, 0, 0), Srgb::new(0, 0, 0), Srgb::new(128, 0, 0)];
		let buckets = partition(&mut samples, 1);
		assert_eq!(buckets, vec![0..2, 2..3]);
	}

	#[test]
	fn halves_are_ordered_on_the_widest_channel() {
		let mut samples = test_colors();
		let channel = widest_channel(&samples);
		let buckets = partition(&mut samples, 1);

		let left_max = samples[buckets[0].clone()].iter().map(|&c| channel.of(c)).max().unwrap();
		let right_min = samples[buckets[1].clone()].iter().map(|&c| channel.of(c)).min().unwrap();
		assert!(left_max <= right_min);
	}

	#[test]
	fn red_wins_channel_ties() {
		let samples = [Srgb::new(0, 0, 0), Srgb::new(255, 255, 255)];
		assert_eq!(widest_channel(&samples), Channel::Red);
	}

	#[test]
	fn green_wins_ties_over_blue() {
		let samples = [Srgb::new(10, 0, 0), Srgb::new(10, 255, 255)];
		assert_eq!(widest_channel(&samples), Channel::Green);
	}

	#[test]
	fn blue_wins_when_strictly_widest() {
		let samples = [Srgb::new(10, 20, 0), Srgb::new(30, 40, 200)];
		assert_eq!(widest_channel(&samples), Channel::Blue);
	}
}
