use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

use scriptaudit_ai::{normalize, normalize_detailed, repair::repair};

const CLEAN: &str = r#"{"analysis":{"technicalTerms":["API","SDK"],"readabilityScore":8.5,"suggestions":["Open with a question [IMPLEMENTED]"],"overallScore":8.0,"prioritizedImprovements":["Add a worked example"],"sections":{"introduction":{"score":8,"suggestions":[],"readabilityMetrics":{"fleschKincaid":9.5,"wordsPerSentence":14,"technicalTerms":["API"]}}}},"rewrittenScript":{"learningObjectives":["Call the API"],"introduction":"Ever wondered how apps talk? [VISUAL CUE: diagram]","mainContent":"An API is a contract.","conclusion":"You now know the basics.","callToAction":"Try the sandbox today."}}"#;

fn fenced_smart_quotes() -> String {
    let curly: String = CLEAN
        .chars()
        .enumerate()
        .map(|(i, c)| match c {
            '"' if i % 2 == 0 => '\u{201C}',
            '"' => '\u{201D}',
            c => c,
        })
        .collect();
    format!("Here is the analysis:\n```json\n{curly}\n```\nHope this helps!")
}

fn truncated() -> &'static str {
    let cut = CLEAN.find("\"callToAction\"").unwrap_or(CLEAN.len());
    &CLEAN[..cut]
}

fn bench_normalize_paths(c: &mut Criterion) {
    let mut group = c.benchmark_group("normalize_paths");
    let fenced = fenced_smart_quotes();
    let script = "An API is a contract between two programs. ".repeat(20);

    let inputs: [(&str, &str); 4] = [
        ("direct", CLEAN),
        ("repaired", fenced.as_str()),
        ("truncated", truncated()),
        ("garbage", "<html><body>502 Bad Gateway</body></html>"),
    ];

    for (name, raw) in inputs {
        group.throughput(Throughput::Bytes(raw.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(name), raw, |b, raw| {
            b.iter(|| normalize(black_box(raw), black_box(&script)));
        });
    }

    group.finish();
}

fn bench_repair_scaling(c: &mut Criterion) {
    let mut group = c.benchmark_group("repair_scaling");

    for copies in [1usize, 8, 32] {
        let body = vec![CLEAN; copies].join(",");
        let text = format!("{{'items': [{body},],}}");
        group.throughput(Throughput::Bytes(text.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(copies), &text, |b, text| {
            b.iter(|| repair(black_box(text)));
        });
    }

    group.finish();
}

fn bench_prose_wrapped_fragments(c: &mut Criterion) {
    let raw = format!("Sure! First a note {{\"n\": 1}} and then the result: {CLEAN} trailing {{oops");
    c.bench_function("fragment_extraction", |b| {
        b.iter(|| normalize_detailed(black_box(&raw), ""));
    });
}

criterion_group!(
    benches,
    bench_normalize_paths,
    bench_repair_scaling,
    bench_prose_wrapped_fragments
);
criterion_main!(benches);
