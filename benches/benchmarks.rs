//! Performance benchmarks for treescribe

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use treescribe::content::is_binary;
use treescribe::test_utils::TestDir;
use treescribe::{OutputConfig, PatternSet, TreeFormatter, WalkerConfig, scan};

const RULES: &[&str] = &[
    "# build output",
    "target/",
    "*.o",
    "*.log",
    "!important.log",
    "/dist/",
    "docs/**/*.pdf",
    "node_modules/",
    "[Tt]humbs.db",
];

const RUST_SOURCE: &str = r#"//! Module documentation

use std::path::Path;

/// Main function documentation
fn main() {
    println!("Hello, world!");
}
"#;

/// Create a tree of `count` source files spread over a few directories.
fn create_tree_with_files(count: usize) -> TestDir {
    let dir = TestDir::new();
    for i in 0..count {
        dir.add_file(&format!("mod_{}/file_{}.rs", i % 8, i), RUST_SOURCE);
    }
    dir.add_file("target/debug/app.o", "obj");
    dir.add_dir("node_modules/left-pad/lib");
    dir.add_bytes("assets/logo.png", &[0x89, b'P', b'N', b'G', 0, 0, 0, 0]);
    dir
}

fn bench_rule_matching(c: &mut Criterion) {
    let rules = PatternSet::compile(RULES).unwrap();
    let mut group = c.benchmark_group("rule_matching");

    group.bench_function("compile", |b| {
        b.iter(|| PatternSet::compile(black_box(RULES)))
    });

    group.bench_function("basename_hit", |b| {
        b.iter(|| rules.matches(black_box("src/deep/nested/server.log"), false))
    });

    group.bench_function("negated", |b| {
        b.iter(|| rules.matches(black_box("important.log"), false))
    });

    group.bench_function("miss", |b| {
        b.iter(|| rules.matches(black_box("src/deep/nested/server.rs"), false))
    });

    group.bench_function("double_star", |b| {
        b.iter(|| rules.matches(black_box("docs/a/b/c/manual.pdf"), false))
    });

    group.finish();
}

fn bench_binary_detection(c: &mut Criterion) {
    let text = RUST_SOURCE.repeat(64);
    let text = &text.as_bytes()[..8 * 1024];
    let binary: Vec<u8> = (0..8 * 1024).map(|i| (i % 251) as u8 + 1).collect();

    let mut group = c.benchmark_group("binary_detection");
    group.bench_function("text_8k", |b| b.iter(|| is_binary(black_box(text))));
    group.bench_function("binary_8k", |b| b.iter(|| is_binary(black_box(&binary))));
    group.finish();
}

fn bench_scan(c: &mut Criterion) {
    let mut group = c.benchmark_group("scan");

    for count in [10, 100, 500] {
        let dir = create_tree_with_files(count);
        let mut config = WalkerConfig::new(dir.path());
        config.rules = PatternSet::compile(RULES).unwrap();

        group.bench_function(format!("{}_files", count), |b| {
            b.iter(|| scan(black_box(&config)).unwrap())
        });
    }

    group.finish();
}

fn bench_render(c: &mut Criterion) {
    let dir = create_tree_with_files(200);
    let tree = scan(&WalkerConfig::new(dir.path())).unwrap();
    let formatter = TreeFormatter::new(OutputConfig::default());

    c.bench_function("render_200_files", |b| {
        b.iter(|| formatter.format(black_box(&tree)))
    });
}

criterion_group!(
    benches,
    bench_rule_matching,
    bench_binary_detection,
    bench_scan,
    bench_render,
);
criterion_main!(benches);
