use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use mangarelay_core::{Document, LinkBase, extract_detail, extract_listing, normalize_text};

fn fixture(name: &str) -> String {
    std::fs::read_to_string(format!("../../tests/fixtures/manganato/{}", name)).unwrap()
}

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse");

    for name in ["listing.html", "detail.html", "chapter.html"] {
        let html = fixture(name);
        group.bench_with_input(BenchmarkId::new("document", name), &html, |b, html| {
            b.iter(|| Document::parse(black_box(html)))
        });
    }

    group.finish();
}

fn bench_listing(c: &mut Criterion) {
    let doc = Document::parse(&fixture("listing.html"));
    let links = LinkBase::default();

    c.bench_function("extract_listing", |b| {
        b.iter(|| extract_listing(black_box(&doc), &links, "chapmanganato.to"))
    });
}

fn bench_detail(c: &mut Criterion) {
    let doc = Document::parse(&fixture("detail.html"));
    let links = LinkBase::default();

    c.bench_function("extract_detail", |b| b.iter(|| extract_detail(black_box(&doc), &links)));
}

fn bench_normalize(c: &mut Criterion) {
    let raw = "Description : Solo Leveling summary is updating . <b>Come visit</b> MangaNato.com sometime to read the \
               latest chapter of Solo Leveling.  &ldquo;Hunters&rdquo; are known ,,  everywhere!!  Hope you enjoy it.";

    c.bench_function("normalize_text", |b| b.iter(|| normalize_text(black_box(raw))));
}

criterion_group!(benches, bench_parse, bench_listing, bench_detail, bench_normalize);
criterion_main!(benches);
