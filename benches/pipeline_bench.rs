//! Benchmarks for the journal-scan processing pipeline
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use image::DynamicImage;
use journal_scan::pipeline::split_sentences;
use journal_scan::recognize::{sort_tags_descending, RecognitionMode, Tag};
use journal_scan::{PageSplitter, ProcessOptions, TagLabel};

/// Benchmark option builder construction
fn bench_option_builders(c: &mut Criterion) {
    let mut group = c.benchmark_group("option_builders");

    group.bench_function("ProcessOptions::default", |b| {
        b.iter(|| black_box(ProcessOptions::default()))
    });

    group.bench_function("ProcessOptions::builder_chain", |b| {
        b.iter(|| {
            black_box(
                ProcessOptions::default()
                    .with_gutter_width(12)
                    .with_jpeg_quality(85)
                    .with_mode(RecognitionMode::Text)
                    .with_save_images(true)
                    .with_verbose(true),
            )
        })
    });

    group.finish();
}

/// Benchmark spread splitting geometry
fn bench_split(c: &mut Criterion) {
    let mut group = c.benchmark_group("split");

    let sizes = [(400u32, 300u32), (2480, 1748)];
    for (width, height) in sizes {
        let image = DynamicImage::new_rgb8(width, height);
        group.bench_with_input(
            BenchmarkId::new("split_spread", format!("{}x{}", width, height)),
            &image,
            |b, image| b.iter(|| black_box(PageSplitter::split(image.clone(), true, 10).unwrap())),
        );
    }

    let image = DynamicImage::new_rgb8(400, 300);
    group.bench_function("split_disabled", |b| {
        b.iter(|| black_box(PageSplitter::split(image.clone(), false, 0).unwrap()))
    });

    group.finish();
}

/// Benchmark sentence splitting on representative line lengths
fn bench_sentence_splitting(c: &mut Criterion) {
    let mut group = c.benchmark_group("sentence_splitting");

    let samples = [
        ("short", "One sentence."),
        ("mixed", "First sentence. Second one! A question? And a trailing fragment"),
        (
            "long",
            "The quick brown fox jumps over the lazy dog. Pack my box with five \
             dozen liquor jugs. How vexingly quick daft zebras jump! Sphinx of \
             black quartz, judge my vow. The five boxing wizards jump quickly.",
        ),
    ];
    for (name, text) in samples {
        group.bench_with_input(BenchmarkId::new("split_sentences", name), &text, |b, text| {
            b.iter(|| black_box(split_sentences(text)))
        });
    }

    group.finish();
}

/// Benchmark tag sorting and label rendering
fn bench_tags(c: &mut Criterion) {
    let mut group = c.benchmark_group("tags");

    let tags: Vec<Tag> = (0..50)
        .map(|i| Tag {
            name: format!("tag_{}", i),
            probability: (i as f64 * 0.7919) % 1.0,
        })
        .collect();
    group.bench_function("sort_tags_descending", |b| {
        b.iter(|| {
            let mut tags = tags.clone();
            sort_tags_descending(&mut tags);
            black_box(tags)
        })
    });

    group.bench_function("TagLabel::render", |b| {
        let label = TagLabel {
            name: "handwriting".to_string(),
            probability: 0.9345,
        };
        b.iter(|| black_box(label.render()))
    });

    group.finish();
}

/// Benchmark formatting helpers
fn bench_format_functions(c: &mut Criterion) {
    let mut group = c.benchmark_group("format_functions");

    let durations = [0.5, 5.0, 65.0, 3661.0];
    for dur in durations {
        group.bench_with_input(
            BenchmarkId::new("format_duration", format!("{:.0}s", dur)),
            &dur,
            |b, &dur| {
                let d = std::time::Duration::from_secs_f64(dur);
                b.iter(|| black_box(journal_scan::format_duration(d)))
            },
        );
    }

    group.bench_function("format_percent", |b| {
        b.iter(|| black_box(journal_scan::format_percent(0.9345)))
    });

    group.finish();
}

/// Benchmark ExitCode operations
fn bench_exit_codes(c: &mut Criterion) {
    use journal_scan::ExitCode;

    let mut group = c.benchmark_group("exit_codes");

    group.bench_function("ExitCode::code", |b| {
        b.iter(|| black_box(ExitCode::OutputError.code()))
    });

    group.bench_function("ExitCode::description", |b| {
        b.iter(|| black_box(ExitCode::InputNotFound.description()))
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_option_builders,
    bench_split,
    bench_sentence_splitting,
    bench_tags,
    bench_format_functions,
    bench_exit_codes,
);

criterion_main!(benches);
