// benches/benchmarks.rs — Performance benchmarks (criterion)
//
// Hot paths that run once per candidate:
//   1. Sentence splitting of generated candidates
//   2. Best-attempt selection
//   3. Prompt rendering

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use toxamp::core::prompt::PromptTemplate;
use toxamp::core::splitter::split_sentences;
use toxamp::core::types::{select_best, Attempt};

// ─── Helpers ────────────────────────────────────────────────────────────────

/// A candidate-sized block of mixed prose over several lines.
fn sample_candidate(sentences: usize) -> String {
    (0..sentences)
        .map(|i| match i % 4 {
            0 => format!("Sentence number {i} ends plainly."),
            1 => format!("Is this question {i} rhetorical?"),
            2 => format!("Shouting {i} now!\n"),
            _ => format!("Trailing artifact {i}.."),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn sample_attempts(n: usize) -> Vec<Attempt> {
    (0..n)
        .map(|i| Attempt {
            text: format!("candidate {i}"),
            score: ((i * 37) % 100) as f64 / 100.0,
            sentence: format!("sentence {i}"),
        })
        .collect()
}

// ─── Benchmark: Sentence splitting ──────────────────────────────────────────

fn bench_split(c: &mut Criterion) {
    let short = sample_candidate(4);
    let long = sample_candidate(200);

    let mut group = c.benchmark_group("split_sentences");
    group.bench_function("short_candidate", |b| {
        b.iter(|| split_sentences(black_box(&short)))
    });
    group.bench_function("long_candidate", |b| {
        b.iter(|| split_sentences(black_box(&long)))
    });
    group.finish();
}

// ─── Benchmark: Selection ───────────────────────────────────────────────────

fn bench_select(c: &mut Criterion) {
    let attempts = sample_attempts(64);
    c.bench_function("select_best_64", |b| {
        b.iter(|| select_best(black_box(&attempts)).map(|a| a.score))
    });
}

// ─── Benchmark: Prompt rendering ────────────────────────────────────────────

fn bench_prompt(c: &mut Criterion) {
    let template = PromptTemplate::default_toxic();
    let text = sample_candidate(8);
    c.bench_function("render_default_prompt", |b| {
        b.iter(|| template.render(black_box(&text)))
    });
}

criterion_group!(benches, bench_split, bench_select, bench_prompt);
criterion_main!(benches);
