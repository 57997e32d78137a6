//! Mauka Tables Benchmarks
//!
//! Criterion benchmarks for the hash-indexed containers and the Bloom filter.
//!
//! To run the benchmarks:
//! ```bash
//! cargo bench --features benchmarking
//! ```

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use criterion::{
    black_box, criterion_group, criterion_main, measurement::WallTime, BatchSize, BenchmarkId,
    Criterion, SamplingMode, Throughput,
};

use mauka_tables::data_structures::{
    KonaBloomFilter, LeiLinkedMap, MoanaLruCache, NaluCircularMap, PukaProbeMap,
    PukaProbeMapConfig, TableConfig,
};
use mauka_tables::workload::key_at;

const SIZES: [usize; 3] = [100, 1_000, 10_000];

/// Benchmark inserts into each single-writer container at a fixed capacity.
fn bench_inserts(c: &mut Criterion) {
    let mut group = c.benchmark_group("insert");
    group.sampling_mode(SamplingMode::Flat);
    group.measurement_time(Duration::from_secs(2));

    for &size in &SIZES {
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("nalu", size), &size, |b, &size| {
            b.iter(|| {
                let mut map = NaluCircularMap::new(TableConfig::fixed(size / 2)).unwrap();
                for i in 0..size {
                    map.insert(black_box(i), i).unwrap();
                }
                map
            });
        });
        group.bench_with_input(BenchmarkId::new("lei", size), &size, |b, &size| {
            b.iter(|| {
                let mut map = LeiLinkedMap::new(TableConfig::fixed(size / 2)).unwrap();
                for i in 0..size {
                    map.insert(black_box(i), i);
                }
                map
            });
        });
        group.bench_with_input(BenchmarkId::new("puka", size), &size, |b, &size| {
            b.iter(|| {
                let mut map = PukaProbeMap::new(PukaProbeMapConfig::default()).unwrap();
                for i in 0..size {
                    map.insert(black_box(i), i).unwrap();
                }
                map
            });
        });
    }

    group.finish();
}

/// Benchmark lookups that mostly miss, where the probe map's filter pays off.
fn bench_miss_heavy_lookups(c: &mut Criterion) {
    let mut group = c.benchmark_group("miss_heavy_lookup");
    group.measurement_time(Duration::from_secs(2));

    let size = 10_000u64;
    let mut puka = PukaProbeMap::new(PukaProbeMapConfig::default()).unwrap();
    let mut lei = LeiLinkedMap::new(TableConfig::new().with_capacity(size as usize)).unwrap();
    for i in 0..size {
        puka.insert(i, i).unwrap();
        lei.insert(i, i);
    }

    group.throughput(Throughput::Elements(size));
    group.bench_function("puka", |b| {
        b.iter(|| (size..size * 2).filter(|k| puka.contains_key(black_box(k))).count());
    });
    group.bench_function("lei", |b| {
        b.iter(|| (size..size * 2).filter(|k| lei.contains_key(black_box(k))).count());
    });

    group.finish();
}

/// Benchmark the LRU cache under a read-heavy multi-threaded workload.
fn bench_moana_lru(c: &mut Criterion) {
    let mut group = c.benchmark_group("moana_lru");
    group.sampling_mode(SamplingMode::Flat);
    group.measurement_time(Duration::from_secs(3));

    let operations = 20_000usize;
    for threads in [1usize, 2, 4, num_cpus::get().max(1)] {
        group.throughput(Throughput::Elements(operations as u64));
        group.bench_with_input(
            BenchmarkId::new("read_heavy", threads),
            &threads,
            |b, &threads| {
                b.iter_batched(
                    || Arc::new(MoanaLruCache::new(TableConfig::fixed(1_024)).unwrap()),
                    |cache| {
                        let handles: Vec<_> = (0..threads)
                            .map(|t| {
                                let cache = Arc::clone(&cache);
                                thread::spawn(move || {
                                    for i in (t..operations).step_by(threads) {
                                        let key = key_at(i, 4_096);
                                        if i % 5 == 0 {
                                            cache.put(key, i);
                                        } else {
                                            black_box(cache.get(&key));
                                        }
                                    }
                                })
                            })
                            .collect();
                        for handle in handles {
                            handle.join().unwrap();
                        }
                    },
                    BatchSize::SmallInput,
                );
            },
        );
    }

    group.finish();
}

/// Benchmark the Kona Bloom Filter
fn bench_kona_bloom_filter(c: &mut Criterion) {
    let mut group = c.benchmark_group("kona_bloom_filter");
    group.sampling_mode(SamplingMode::Flat);
    group.measurement_time(Duration::from_secs(2));

    for &size in &SIZES {
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("insert", size), &size, |b, &size| {
            b.iter(|| {
                let mut filter = KonaBloomFilter::new(size, 0.01).unwrap();
                for i in 0..size {
                    filter.insert(black_box(&i));
                }
                filter
            });
        });

        let mut filter = KonaBloomFilter::new(size, 0.01).unwrap();
        for i in 0..size {
            filter.insert(&i);
        }
        group.bench_with_input(BenchmarkId::new("contains", size), &size, |b, &size| {
            b.iter(|| (0..size * 2).filter(|i| filter.contains(black_box(i))).count());
        });
    }

    group.finish();
}

// Group all benchmarks together
criterion_group! {
    name = benches;
    config = Criterion::default()
        .with_measurement(WallTime)
        .significance_level(0.01)
        .noise_threshold(0.02)
        .confidence_level(0.99);
    targets = bench_inserts, bench_miss_heavy_lookups, bench_moana_lru, bench_kona_bloom_filter
}

criterion_main!(benches);
