use criterion::{black_box, criterion_group, criterion_main, Criterion};
use palette::Srgb;
use swatch::{Extractor, PixelSource, QuantizeMethod};

/// Deterministic synthetic pixel grid with a smooth color gradient
struct Gradient {
	width: u32,
	height: u32,
}

impl PixelSource for Gradient {
	fn width(&self) -> u32 {
		self.width
	}

	fn height(&self) -> u32 {
		self.height
	}

	fn pixel_color(&self, x: u32, y: u32) -> Srgb<u8> {
		Srgb::new((x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8)
	}
}

fn sampled_extractor(quality: u32) -> Extractor<Gradient> {
	let mut extractor = Extractor::with_seed(Gradient { width: 512, height: 512 }, 0);
	assert!(extractor.set_quality(quality));
	extractor.sample().expect("source is attached");
	extractor
}

fn sampling(c: &mut Criterion) {
	for quality in [1, 4, 10] {
		c.bench_function(&format!("sample 512x512 quality {quality}"), |b| {
			b.iter(|| {
				let mut extractor = Extractor::new(Gradient { width: 512, height: 512 });
				assert!(extractor.set_quality(black_box(quality)));
				extractor.sample().expect("source is attached").len()
			});
		});
	}
}

fn median_cut(c: &mut Criterion) {
	for k in [8, 64] {
		let mut extractor = sampled_extractor(2);
		c.bench_function(&format!("median cut 512x512 k={k}"), |b| {
			b.iter(|| extractor.palette(black_box(k), QuantizeMethod::MedianCut).expect("samples exist"));
		});
	}
}

fn kmeans(c: &mut Criterion) {
	for k in [8, 16] {
		let mut extractor = sampled_extractor(4);
		c.bench_function(&format!("kmeans 512x512 k={k}"), |b| {
			b.iter(|| extractor.palette(black_box(k), QuantizeMethod::Kmeans).expect("samples exist"));
		});
	}
}

criterion_group!(benches, sampling, median_cut, kmeans);
criterion_main!(benches);
