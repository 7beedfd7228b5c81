#[macro_use]
extern crate criterion;
extern crate mandelzoom;
extern crate num;

use criterion::Criterion;
use mandelzoom::{escape_time, render_frame, FrameBuffer, FrameDescriptor, PlaneMapper, Viewport};
use num::Complex;
use std::path::PathBuf;

fn frame(size: usize) -> FrameDescriptor {
    let viewport = Viewport::centered(Complex::new(-0.5, 0.0), 3.0, size, size);
    FrameDescriptor {
        index: 0,
        center: Complex::new(-0.5, 0.0),
        xscale: 3.0,
        plane: PlaneMapper::new(size, size, viewport).unwrap(),
        max_iterations: 500,
        output: PathBuf::from("bench.jpg"),
    }
}

fn escape_benchmark(c: &mut Criterion) {
    c.bench_function("escape_time inside", |b| {
        b.iter(|| escape_time(Complex::new(-0.1, 0.1), 1000))
    });
    c.bench_function("escape_time boundary", |b| {
        b.iter(|| escape_time(Complex::new(-0.743643, 0.131825), 1000))
    });
}

fn frame_benchmark(c: &mut Criterion) {
    let f = frame(200);
    c.bench_function("frame 200x200 one worker", move |b| {
        let mut fb = FrameBuffer::new(200, 200).unwrap();
        b.iter(|| render_frame(&f, &mut fb, 1).unwrap())
    });
    let f = frame(200);
    c.bench_function("frame 200x200 eight workers", move |b| {
        let mut fb = FrameBuffer::new(200, 200).unwrap();
        b.iter(|| render_frame(&f, &mut fb, 8).unwrap())
    });
}

criterion_group!(benches, escape_benchmark, frame_benchmark);
criterion_main!(benches);
