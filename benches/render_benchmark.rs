//! Benchmarks for building and rendering a stack
//!
//! This benchmark suite measures:
//! - Settings parsing and validation
//! - Declaring the full stack
//! - Graph analysis of the declared program
//! - Rendering to YAML and JSON
//! - Diffing two rendered programs

use chrono::{TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use edgestack::components::{declare_stack, StackInputs};
use edgestack::diff::diff_programs;
use edgestack::render::{render, RenderFormat};
use edgestack::settings::StackSettings;

const PROJECT_YAML: &str = "name: acme\ndescription: Edge stack for acme\n";

fn stack_yaml(allowed_ranges: usize) -> String {
    let ranges: Vec<String> = (0..allowed_ranges)
        .map(|i| format!("\"10.{}.{}.0/24\"", i / 256, i % 256))
        .collect();

    format!(
        r#"config:
  project:url: https://github.com/acme/edge
  azure-native:location: westeurope
  azure-native:tenantID: 00000000-0000-0000-0000-000000000001
  azure-native:subscriptionID: 00000000-0000-0000-0000-000000000002
  frontDoor:params:
    sku: Standard_AzureFrontDoor
    afdUriPrefix: "https://portal.azure.com/#@acme/resource/subscriptions/x/resourceGroups"
    afdUriSuffix: providers/Microsoft.Cdn/profiles
  vnet:params:
    vnetAddressPrefixes: 10.0.0.0/16
    snAddressPrefixes: 10.0.1.0/24
  storageAccount:params:
    sku: Standard_LRS
    kind: StorageV2
  waf:params:
    allowedIpRanges: [{}]
"#,
        ranges.join(", ")
    )
}

fn inputs(stack: &str, allowed_ranges: usize) -> StackInputs {
    let settings =
        StackSettings::from_documents(PROJECT_YAML, &stack_yaml(allowed_ranges), stack).unwrap();
    StackInputs::from_settings(&settings)
        .unwrap()
        .with_issued_at(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap())
}

// ============================================================================
// Build
// ============================================================================

fn bench_settings(c: &mut Criterion) {
    let stack = stack_yaml(16);

    c.bench_function("settings_parse_and_validate", |b| {
        b.iter(|| {
            let settings =
                StackSettings::from_documents(black_box(PROJECT_YAML), black_box(&stack), "prod")
                    .unwrap();
            StackInputs::from_settings(&settings).unwrap()
        })
    });
}

fn bench_declare(c: &mut Criterion) {
    let inputs = inputs("prod", 16);

    c.bench_function("declare_stack", |b| {
        b.iter(|| declare_stack(black_box(&inputs)).unwrap())
    });

    let stack = declare_stack(&inputs).unwrap();
    c.bench_function("graph_execution_order", |b| {
        b.iter(|| black_box(&stack.program).graph().execution_order().unwrap())
    });
}

// ============================================================================
// Render
// ============================================================================

fn bench_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("render");

    for allowed_ranges in &[0usize, 64, 1024] {
        let stack = declare_stack(&inputs("staging", *allowed_ranges)).unwrap();
        group.throughput(Throughput::Elements(*allowed_ranges as u64));

        group.bench_with_input(
            BenchmarkId::new("yaml", allowed_ranges),
            allowed_ranges,
            |b, _| b.iter(|| render(black_box(&stack.program), RenderFormat::Yaml).unwrap()),
        );
        group.bench_with_input(
            BenchmarkId::new("json", allowed_ranges),
            allowed_ranges,
            |b, _| b.iter(|| render(black_box(&stack.program), RenderFormat::Json).unwrap()),
        );
    }

    group.finish();
}

fn bench_diff(c: &mut Criterion) {
    let old = render(
        &declare_stack(&inputs("staging", 64)).unwrap().program,
        RenderFormat::Yaml,
    )
    .unwrap();
    let new = render(
        &declare_stack(&inputs("staging", 65)).unwrap().program,
        RenderFormat::Yaml,
    )
    .unwrap();

    c.bench_function("diff_programs", |b| {
        b.iter(|| diff_programs(black_box(&old), black_box(&new), "old", "new"))
    });
}

criterion_group!(benches, bench_settings, bench_declare, bench_render, bench_diff);
criterion_main!(benches);
