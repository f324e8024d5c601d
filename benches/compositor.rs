use std::time::Duration;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use termgui::core::{Compositor, Diagnostics, GuiConfig, System};
use termgui::term::{encode_diff_into, encode_full_into, CellBuffer, HeadlessSurface};
use termgui::types::{PixelImage, Rgb};

fn full_image(width: u16, height: u16) -> PixelImage {
    let n = width as usize * height as usize;
    let background: Vec<Rgb> = (0..n).map(|i| Rgb::gray((i % 256) as u8)).collect();
    let foreground = background.iter().map(|bg| bg.contrast_gray()).collect();
    PixelImage::new(width, height)
        .with_background(background)
        .with_foreground(foreground)
        .with_glyphs((0..n).map(|i| if i % 3 == 0 { "▚" } else { "x" }))
        .with_styles((0..n).map(|i| (i % 128) as u8).collect())
}

fn bench_composite_full(c: &mut Criterion) {
    let compositor = Compositor::new(Diagnostics::detached());
    let image = full_image(200, 60);
    let mut canvas = CellBuffer::new(200, 60);

    c.bench_function("composite_full_200x60", |b| {
        b.iter(|| compositor.draw(black_box(&image), &mut canvas))
    });
}

fn bench_composite_luma(c: &mut Criterion) {
    let compositor = Compositor::new(Diagnostics::detached());
    let image = PixelImage::new(200, 60).with_background(
        (0..200 * 60).map(|i| Rgb::new((i % 256) as u8, 64, 200)).collect(),
    );
    let mut canvas = CellBuffer::new(200, 60);

    c.bench_function("composite_luma_200x60", |b| {
        b.iter(|| compositor.draw(black_box(&image), &mut canvas))
    });
}

fn bench_encode(c: &mut Criterion) {
    let compositor = Compositor::new(Diagnostics::detached());
    let mut prev = CellBuffer::new(1, 1);
    let mut next = CellBuffer::new(1, 1);
    compositor.draw(&full_image(200, 60), &mut prev);
    compositor.draw(&PixelImage::solid(200, 60, Rgb::BLACK), &mut next);
    let mut out = Vec::with_capacity(256 * 1024);

    c.bench_function("encode_full_200x60", |b| {
        b.iter(|| {
            out.clear();
            encode_full_into(black_box(&prev), &mut out).unwrap();
        })
    });

    c.bench_function("encode_diff_200x60", |b| {
        b.iter(|| {
            out.clear();
            encode_diff_into(black_box(&prev), black_box(&next), &mut out).unwrap();
        })
    });
}

fn bench_system_update(c: &mut Criterion) {
    let mut sys = System::new(
        HeadlessSurface::new(200, 60),
        &GuiConfig::default(),
        None,
        Diagnostics::detached(),
    )
    .unwrap();
    let image = full_image(200, 60);

    c.bench_function("system_draw_update_200x60", |b| {
        b.iter(|| {
            sys.draw(black_box(&image));
            sys.update(Duration::from_millis(16))
        })
    });
}

criterion_group!(
    benches,
    bench_composite_full,
    bench_composite_luma,
    bench_encode,
    bench_system_update
);
criterion_main!(benches);
