use criterion::{black_box, criterion_group, criterion_main, Criterion};
use morse_core::test_utils::KeyingScript;
use morse_core::{default_config, KeyingEncoder, TrainingSession};

const TEXT: &str = "THE QUICK BROWN FOX JUMPS OVER THE LAZY DOG 0123456789";

fn criterion_benchmark(c: &mut Criterion) {
    let mut script = KeyingScript::new(60, 0);
    script.text(TEXT).flush();
    let events = script.into_events();

    c.bench_function("decode pangram", |b| {
        b.iter(|| {
            let mut session = TrainingSession::new(default_config()).unwrap();
            for event in &events {
                black_box(session.process(*event).unwrap());
            }
        })
    });

    c.bench_function("encode pangram", |b| {
        let encoder = KeyingEncoder::default();
        b.iter(|| encoder.encode_text_at(black_box(TEXT), 60.0).filter_map(Result::ok).count())
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
