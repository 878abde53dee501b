use criterion::{black_box, criterion_group, criterion_main, Criterion};
use plugin_host::config::HostConfig;
use plugin_host::plugin::{
    CommandTable, PackageLoader, PackageManifest, Plugin, PluginManager, PluginMetadata,
    PluginResult, PluginScope, TypeCatalog, TypeDefinition, MANIFEST_ENTRY,
};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;
use zip::write::SimpleFileOptions;

const MANIFEST: &str = r#"
name = "bench"
version = "1.2.3"
description = "Benchmark package"
author = "Bench"
license = "MIT"
min_host_version = "0.1.0"
types = ["bench.Idle"]
"#;

struct Idle;

impl Plugin for Idle {
    fn metadata(&self) -> PluginMetadata {
        PluginMetadata::new("idle", "Bench", "1.0")
    }

    fn on_enable(&self, _scope: &PluginScope) -> PluginResult<()> {
        Ok(())
    }
}

fn write_package(dir: &Path, file: &str) -> PathBuf {
    let path = dir.join(file);
    let mut writer = zip::ZipWriter::new(std::fs::File::create(&path).unwrap());
    writer
        .start_file(MANIFEST_ENTRY, SimpleFileOptions::default())
        .unwrap();
    writer.write_all(MANIFEST.as_bytes()).unwrap();
    writer.finish().unwrap();
    path
}

fn bench_manifest(c: &mut Criterion) {
    let dir = TempDir::new().unwrap();
    let archive = write_package(dir.path(), "bench.pkg");

    let mut group = c.benchmark_group("manifest");

    group.bench_function("parse_toml", |b| {
        b.iter(|| {
            let manifest = PackageManifest::from_toml_str(black_box(MANIFEST)).unwrap();
            black_box(manifest);
        })
    });

    group.bench_function("inspect_archive", |b| {
        b.iter(|| {
            let manifest = PackageLoader::inspect(black_box(&archive)).unwrap();
            black_box(manifest);
        })
    });

    group.finish();
}

fn bench_reload(c: &mut Criterion) {
    let runtime = tokio::runtime::Runtime::new().unwrap();

    let mut group = c.benchmark_group("reload");

    for count in [1usize, 16, 64] {
        let dir = TempDir::new().unwrap();
        for index in 0..count {
            write_package(dir.path(), &format!("bench-{:03}.pkg", index));
        }

        let catalog = TypeCatalog::new()
            .with_type(TypeDefinition::new("bench.Idle").with_plugin(|| Ok(Box::new(Idle))));
        let manager = PluginManager::with_shared_types(
            HostConfig::default().with_plugins_dir(dir.path()),
            Arc::new(CommandTable::new()),
            catalog,
            runtime.handle().clone(),
        );

        group.bench_function(format!("{}_packages", count), |b| {
            b.iter(|| {
                manager.reload();
                black_box(manager.plugin_count());
            })
        });

        manager.disable_all();
    }

    group.finish();
}

criterion_group!(benches, bench_manifest, bench_reload);
criterion_main!(benches);
