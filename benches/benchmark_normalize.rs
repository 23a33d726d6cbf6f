use criterion::{criterion_group, criterion_main, Criterion};
use scanshape::compiler::ScanConfigCompiler;
use scanshape::findings::{RawFindings, RawHost, RawPort};
use scanshape::normalizer::normalize;
use std::hint::black_box;

const TARGET: &str = "203.0.113.5";

fn wide_findings() -> RawFindings {
    let mut host = RawHost::new("up");
    // descending, duplicated and mostly closed, the worst case for the normalizer
    for port in (1..=u16::MAX).rev() {
        let state = if port % 7 == 0 { "open" } else { "closed" };
        host = host.with_port("tcp", RawPort::new(port, state));
        if port % 11 == 0 {
            host = host
                .with_port("udp", RawPort::new(port, "open|filtered"))
                .with_port("udp", RawPort::new(port, "open"));
        }
    }

    let mut raw = RawFindings {
        elapsed: Some("812.44".to_owned()),
        ..RawFindings::default()
    };
    raw.hosts.insert(TARGET.to_owned(), host);
    raw
}

fn bench_normalize(c: &mut Criterion) {
    let raw = wide_findings();
    c.bench_function("normalize all ports", |b| {
        b.iter(|| normalize(black_box(&raw), black_box(TARGET)));
    });
}

fn bench_compile(c: &mut Criterion) {
    let compiler = ScanConfigCompiler::default();
    c.bench_function("compile custom request", |b| {
        b.iter(|| {
            compiler.compile(
                black_box(Some(TARGET)),
                black_box(Some("UDP")),
                black_box(Some("custom")),
                black_box(Some(" 22, 80, 443, 1000-2000 ")),
            )
        });
    });
}

criterion_group!(benches, bench_normalize, bench_compile);
criterion_main!(benches);
