//! Iterative k-means clustering of color samples in RGB space.

use palette::Srgb;
use rand::Rng;

/// Hard ceiling on clustering passes.
///
/// The convergence rule alone cannot rule out a sample oscillating between
/// two equidistant centroids, so the loop is bounded. Typical images
/// converge in well under a hundred passes.
const MAX_ITERATIONS: u32 = 512;

/// Outcome of a clustering run: final centroid positions and the centroid
/// label assigned to each sample
struct Clustering {
	/// Final centroid positions
	centroids: Vec<Srgb<u8>>,
	/// Index into `centroids` for every input sample
	assignment: Vec<usize>,
}

/// Group `samples` around `k` centroids (clamped to at least 2), returning
/// the member colors of each centroid in centroid order.
///
/// Member lists can be empty when centroids collapse onto the same position
/// or never attract a sample; callers treat those as valid degenerate
/// buckets. `samples` must be non-empty.
pub(crate) fn cluster(samples: &[Srgb<u8>], k: u32, rng: &mut impl Rng) -> Vec<Vec<Srgb<u8>>> {
	let Clustering { centroids, assignment } = compute(samples, usize::max(k as usize, 2), rng);

	let mut members = vec![Vec::new(); centroids.len()];
	for (&color, &center) in samples.iter().zip(&assignment) {
		members[center].push(color);
	}

	members
}

/// Run assignment and re-centering passes until a full pass moves no
/// sample, or the iteration bound is reached
fn compute(samples: &[Srgb<u8>], k: usize, rng: &mut impl Rng) -> Clustering {
	debug_assert!(!samples.is_empty());

	// Each centroid starts on a random sample, drawn with replacement;
	// identical starting centroids merely leave some clusters empty
	let mut centroids: Vec<Srgb<u8>> = (0..k).map(|_| samples[rng.gen_range(0..samples.len())]).collect();

	let mut assignment: Vec<Option<usize>> = vec![None; samples.len()];

	for _ in 0..MAX_ITERATIONS {
		let mut changed = false;

		for (&color, label) in samples.iter().zip(&mut assignment) {
			let nearest = nearest_centroid(color, &centroids);
			if *label != Some(nearest) {
				*label = Some(nearest);
				changed = true;
			}
		}

		if !changed {
			break;
		}

		recenter(samples, &assignment, &mut centroids);
	}

	let assignment = assignment.into_iter().flatten().collect();
	Clustering { centroids, assignment }
}

/// Index of the centroid closest to `color`; ties keep the lowest index
/// since only a strictly smaller distance displaces the running minimum
fn nearest_centroid(color: Srgb<u8>, centroids: &[Srgb<u8>]) -> usize {
	let mut min_center = 0;
	let mut min_dist = distance(centroids[0], color);

	for (i, &centroid) in centroids.iter().enumerate().skip(1) {
		let dist = distance(centroid, color);
		if dist < min_dist {
			min_dist = dist;
			min_center = i;
		}
	}

	min_center
}

/// Euclidean distance between two colors in RGB space
fn distance(x: Srgb<u8>, y: Srgb<u8>) -> f64 {
	let dr = f64::from(i32::from(x.red) - i32::from(y.red));
	let dg = f64::from(i32::from(x.green) - i32::from(y.green));
	let db = f64::from(i32::from(x.blue) - i32::from(y.blue));
	(dr * dr + dg * dg + db * db).sqrt()
}

/// Move every centroid with members to the integer truncated mean of its
/// member colors; centroids without members keep their position
fn recenter(samples: &[Srgb<u8>], assignment: &[Option<usize>], centroids: &mut [Srgb<u8>]) {
	let mut sums = vec![[0u64; 3]; centroids.len()];
	let mut counts = vec![0u64; centroids.len()];

	for (&color, label) in samples.iter().zip(assignment) {
		if let Some(center) = *label {
			sums[center][0] += u64::from(color.red);
			sums[center][1] += u64::from(color.green);
			sums[center][2] += u64::from(color.blue);
			counts[center] += 1;
		}
	}

	for ((centroid, sum), &count) in centroids.iter_mut().zip(&sums).zip(&counts) {
		if count > 0 {
			// Channel means of u8 values stay within u8 range
			#[allow(clippy::cast_possible_truncation)]
			let mean = Srgb::new((sum[0] / count) as u8, (sum[1] / count) as u8, (sum[2] / count) as u8);
			*centroid = mean;
		}
	}
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
	use super::*;
	use rand::{RngCore, SeedableRng};
	use rand_xoshiro::Xoroshiro128PlusPlus;

	/// Generator that always yields zero, pinning every random sample index
	/// to the first sample
	struct ZeroRng;

	impl RngCore for ZeroRng {
		fn next_u32(&mut self) -> u32 {
			0
		}

		fn next_u64(&mut self) -> u64 {
			0
		}

		fn fill_bytes(&mut self, dest: &mut [u8]) {
			dest.fill(0);
		}

		fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
			dest.fill(0);
			Ok(())
		}
	}

	/// Deterministic spread of 30 colors with all channels varying
	fn test_colors() -> Vec<Srgb<u8>> {
		(0u16..30)
			.map(|i| Srgb::new((i * 53 % 256) as u8, (i * 19 % 256) as u8, (i * 83 % 256) as u8))
			.collect()
	}

	#[test]
	fn separates_primaries_from_identical_seeds() {
		let samples = vec![
			Srgb::new(255, 0, 0),
			Srgb::new(255, 0, 0),
			Srgb::new(0, 255, 0),
			Srgb::new(0, 0, 255),
		];

		// Both centroids start on the first sample; the empty one keeps its
		// red position and later captures the red samples
		let members = cluster(&samples, 2, &mut ZeroRng);

		assert_eq!(
			members,
			vec![
				vec![Srgb::new(0, 255, 0), Srgb::new(0, 0, 255)],
				vec![Srgb::new(255, 0, 0), Srgb::new(255, 0, 0)],
			]
		);
	}

	#[test]
	fn every_sample_lands_in_exactly_one_cluster() {
		let samples = test_colors();
		let mut rng = Xoroshiro128PlusPlus::seed_from_u64(123);

		let members = cluster(&samples, 5, &mut rng);
		assert_eq!(members.len(), 5);

		let mut clustered: Vec<Srgb<u8>> = members.into_iter().flatten().collect();
		let mut expected = samples;

		let key = |color: &Srgb<u8>| (color.red, color.green, color.blue);
		clustered.sort_by_key(key);
		expected.sort_by_key(key);
		assert_eq!(clustered, expected);
	}

	#[test]
	fn requested_cluster_count_is_clamped_to_two() {
		let samples = test_colors();
		let mut rng = Xoroshiro128PlusPlus::seed_from_u64(0);

		assert_eq!(cluster(&samples, 0, &mut rng).len(), 2);
		assert_eq!(cluster(&samples, 1, &mut rng).len(), 2);
	}

	#[test]
	fn converged_assignment_is_a_fixed_point() {
		let samples = test_colors();
		let mut rng = Xoroshiro128PlusPlus::seed_from_u64(7);

		let Clustering { centroids, assignment } = compute(&samples, 4, &mut rng);

		assert_eq!(assignment.len(), samples.len());
		for (&color, &center) in samples.iter().zip(&assignment) {
			assert_eq!(nearest_centroid(color, &centroids), center);
		}
	}

	#[test]
	fn identical_samples_leave_the_second_cluster_empty() {
		let samples = vec![Srgb::new(200, 10, 10); 5];
		let mut rng = Xoroshiro128PlusPlus::seed_from_u64(99);

		let members = cluster(&samples, 2, &mut rng);

		assert_eq!(members[0].len(), 5);
		assert!(members[1].is_empty());
	}
}
