use camino::Utf8Path;
use criterion::{criterion_group, criterion_main, Criterion, Throughput};
use std::hint::black_box;
use ueindex::models::ScanSettings;
use ueindex::services::{classify, split_specifiers, DeclarationScanner};

fn synthetic_header(types: usize) -> String {
    let mut text = String::from("#pragma once\n\n");
    for i in 0..types {
        text.push_str(&format!(
            "UCLASS(Blueprintable, meta = (DisplayName = \"Type {i}, generated\"))\n\
             class GAME_API AType{i} : public AType{parent}\n\
             {{\n    GENERATED_BODY()\n\npublic:\n    /* {{ not a scope }} */\n    int32 Value{i} = {i};\n}};\n\n",
            parent = i.saturating_sub(1)
        ));
    }
    text
}

fn bench_scan_source(c: &mut Criterion) {
    let scanner = DeclarationScanner::new(ScanSettings::default());
    let text = synthetic_header(500);

    let mut group = c.benchmark_group("declaration_scan");
    group.throughput(Throughput::Bytes(text.len() as u64));
    group.bench_function("scan_source_500_types", |b| {
        b.iter(|| scanner.scan_source(black_box(&text), Utf8Path::new("Bench/Types.h"), "Bench"))
    });
    group.finish();
}

fn bench_split_specifiers(c: &mut Criterion) {
    let args = r#"BlueprintType, Blueprintable, meta = (DisplayName = "A, B", Categories = "X.Y"), Config = Game"#;
    c.bench_function("split_specifiers", |b| b.iter(|| split_specifiers(black_box(args))));
}

fn bench_classify(c: &mut Criterion) {
    let paths = [
        "Maps/Arena.umap",
        "Characters/Hero/BP_Hero.uasset",
        "Environment/Materials/Rock.uasset",
        "Misc/Unsorted/readme.uasset",
    ];
    c.bench_function("classify", |b| {
        b.iter(|| {
            for path in &paths {
                black_box(classify(Utf8Path::new(path)));
            }
        })
    });
}

criterion_group!(benches, bench_scan_source, bench_split_specifiers, bench_classify);
criterion_main!(benches);
