//! Deterministic synthetic workload used by the `exercise` command.
//!
//! Every container configured in [`TablesConfig`] is driven through the same sequence
//! of reads, inserts and removals. Key `i` of the sequence is
//! `i * 2654435761 mod key_space`, so runs are reproducible without a random number
//! generator. The LRU cache is driven from several threads at once; the other
//! containers are single-writer.

use std::sync::Arc;
use std::thread;
use std::time::Instant;

use serde::Serialize;

use crate::config::{TablesConfig, WorkloadSettings};
use crate::data_structures::{
    KonaBloomFilter, LeiLinkedMap, MoanaLruCache, NaluCircularMap, OhanaMultiMap, PukaProbeMap,
};
use crate::error::{MaukaError, MaukaResult};

/// Knuth's multiplicative hashing constant.
const KEY_STRIDE: u64 = 2_654_435_761;

/// Key used by operation `i`.
pub fn key_at(i: usize, key_space: u64) -> u64 {
    (i as u64).wrapping_mul(KEY_STRIDE) % key_space
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Op {
    Read,
    Insert,
    Remove,
}

/// Uniform value in [0, 1) derived from the operation index.
fn unit(i: usize) -> f64 {
    let mixed = (i as u64 ^ 0x5DEE_CE66).wrapping_mul(0x9E37_79B9_7F4A_7C15);
    (mixed >> 11) as f64 / (1u64 << 53) as f64
}

fn op_at(i: usize, settings: &WorkloadSettings) -> Op {
    let roll = unit(i);
    if roll < settings.read_ratio {
        return Op::Read;
    }
    let write_share = 1.0 - settings.read_ratio;
    if write_share > 0.0 && (roll - settings.read_ratio) / write_share < settings.remove_ratio {
        Op::Remove
    } else {
        Op::Insert
    }
}

/// Outcome of driving one container.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ContainerReport {
    pub name: &'static str,
    pub operations: usize,
    pub hits: usize,
    pub misses: usize,
    pub inserts: usize,
    pub removals: usize,
    pub final_len: usize,
    pub evictions: u64,
    pub elapsed_ms: f64,
    /// Whether lookup and enumeration agreed on the final key set
    pub consistent: bool,
}

/// Accuracy of the standalone Bloom filter.
#[derive(Debug, Clone, Serialize)]
pub struct BloomReport {
    pub bit_count: usize,
    pub hash_count: u32,
    pub inserted: usize,
    pub estimated_items: f64,
    pub fill_ratio: f64,
    pub probes: usize,
    pub false_positives: usize,
    pub false_negatives: usize,
}

/// Full result of an `exercise` run.
#[derive(Debug, Clone, Serialize)]
pub struct WorkloadReport {
    pub threads: usize,
    pub containers: Vec<ContainerReport>,
    pub bloom: BloomReport,
}

#[derive(Debug, Default, Clone, Copy)]
struct Tally {
    hits: usize,
    misses: usize,
    inserts: usize,
    removals: usize,
}

impl Tally {
    fn merge(mut self, other: Tally) -> Tally {
        self.hits += other.hits;
        self.misses += other.misses;
        self.inserts += other.inserts;
        self.removals += other.removals;
        self
    }
}

/// The operations the workload needs from a single-writer container.
trait Exercised {
    const NAME: &'static str;

    fn read(&mut self, key: u64) -> bool;
    fn write(&mut self, key: u64, value: u64) -> MaukaResult<()>;
    fn delete(&mut self, key: u64) -> bool;
    fn len(&self) -> usize;
    fn evictions(&self) -> u64;
    /// Every enumerated key is found by lookup and the counts agree.
    fn consistent(&self) -> bool;
}

impl Exercised for NaluCircularMap<u64, u64> {
    const NAME: &'static str = "nalu";

    fn read(&mut self, key: u64) -> bool {
        self.get(&key).is_some()
    }

    fn write(&mut self, key: u64, value: u64) -> MaukaResult<()> {
        self.insert(key, value)?;
        Ok(())
    }

    fn delete(&mut self, key: u64) -> bool {
        self.remove(&key).is_some()
    }

    fn len(&self) -> usize {
        NaluCircularMap::len(self)
    }

    fn evictions(&self) -> u64 {
        NaluCircularMap::evictions(self)
    }

    fn consistent(&self) -> bool {
        self.iter().count() == NaluCircularMap::len(self)
            && self.iter().all(|(k, _)| self.contains_key(k))
    }
}

impl Exercised for LeiLinkedMap<u64, u64> {
    const NAME: &'static str = "lei";

    fn read(&mut self, key: u64) -> bool {
        // reads refresh the entry, like an access-ordered map
        self.move_to_back(&key)
    }

    fn write(&mut self, key: u64, value: u64) -> MaukaResult<()> {
        self.push_back(key, value);
        Ok(())
    }

    fn delete(&mut self, key: u64) -> bool {
        self.remove(&key).is_some()
    }

    fn len(&self) -> usize {
        LeiLinkedMap::len(self)
    }

    fn evictions(&self) -> u64 {
        LeiLinkedMap::evictions(self)
    }

    fn consistent(&self) -> bool {
        self.iter().count() == LeiLinkedMap::len(self)
            && self.iter().rev().count() == LeiLinkedMap::len(self)
            && self.iter().all(|(k, _)| self.contains_key(k))
    }
}

impl Exercised for OhanaMultiMap<u64, u64> {
    const NAME: &'static str = "ohana";

    fn read(&mut self, key: u64) -> bool {
        self.get(&key).is_some()
    }

    fn write(&mut self, key: u64, value: u64) -> MaukaResult<()> {
        self.insert(key, value);
        Ok(())
    }

    fn delete(&mut self, key: u64) -> bool {
        self.remove(&key).is_some()
    }

    fn len(&self) -> usize {
        OhanaMultiMap::len(self)
    }

    fn evictions(&self) -> u64 {
        OhanaMultiMap::evictions(self)
    }

    fn consistent(&self) -> bool {
        self.iter().count() == OhanaMultiMap::len(self)
            && self.iter_pairs().count() == self.value_count()
            && self.iter().all(|(k, _)| self.contains_key(k))
    }
}

impl Exercised for PukaProbeMap<u64, u64> {
    const NAME: &'static str = "puka";

    fn read(&mut self, key: u64) -> bool {
        self.get(&key).is_some()
    }

    fn write(&mut self, key: u64, value: u64) -> MaukaResult<()> {
        self.insert(key, value)?;
        Ok(())
    }

    fn delete(&mut self, key: u64) -> bool {
        self.remove(&key).is_some()
    }

    fn len(&self) -> usize {
        PukaProbeMap::len(self)
    }

    fn evictions(&self) -> u64 {
        0
    }

    fn consistent(&self) -> bool {
        self.iter().count() == PukaProbeMap::len(self)
            && self.iter().all(|(k, _)| self.contains_key(k))
    }
}

fn drive<C: Exercised>(mut container: C, settings: &WorkloadSettings) -> MaukaResult<ContainerReport> {
    let started = Instant::now();
    let mut tally = Tally::default();
    for i in 0..settings.operations {
        let key = key_at(i, settings.key_space);
        match op_at(i, settings) {
            Op::Read => {
                if container.read(key) {
                    tally.hits += 1;
                } else {
                    tally.misses += 1;
                }
            }
            Op::Insert => {
                container.write(key, i as u64)?;
                tally.inserts += 1;
            }
            Op::Remove => {
                if container.delete(key) {
                    tally.removals += 1;
                }
            }
        }
    }

    let report = report(C::NAME, settings.operations, tally, started)
        .finish(container.len(), container.evictions(), container.consistent());
    tracing::debug!(container = C::NAME, len = report.final_len, "Workload finished");
    Ok(report)
}

fn report(name: &'static str, operations: usize, tally: Tally, started: Instant) -> ContainerReport {
    ContainerReport {
        name,
        operations,
        hits: tally.hits,
        misses: tally.misses,
        inserts: tally.inserts,
        removals: tally.removals,
        elapsed_ms: started.elapsed().as_secs_f64() * 1_000.0,
        ..ContainerReport::default()
    }
}

impl ContainerReport {
    fn finish(mut self, final_len: usize, evictions: u64, consistent: bool) -> Self {
        self.final_len = final_len;
        self.evictions = evictions;
        self.consistent = consistent;
        self
    }
}

fn drive_lru(
    cache: MoanaLruCache<u64, u64>,
    settings: &WorkloadSettings,
    threads: usize,
) -> MaukaResult<ContainerReport> {
    let started = Instant::now();
    let cache = Arc::new(cache);

    let handles: Vec<_> = (0..threads)
        .map(|worker| {
            let cache = Arc::clone(&cache);
            let settings = settings.clone();
            thread::Builder::new()
                .name(format!("moana-worker-{worker}"))
                .spawn(move || {
                    let mut tally = Tally::default();
                    for i in (worker..settings.operations).step_by(threads) {
                        let key = key_at(i, settings.key_space);
                        match op_at(i, &settings) {
                            Op::Read => {
                                if cache.get(&key).is_some() {
                                    tally.hits += 1;
                                } else {
                                    tally.misses += 1;
                                }
                            }
                            Op::Insert => {
                                cache.put(key, i as u64);
                                tally.inserts += 1;
                            }
                            Op::Remove => {
                                if cache.remove(&key).is_some() {
                                    tally.removals += 1;
                                }
                            }
                        }
                    }
                    tally
                })
        })
        .collect::<Result<_, _>>()?;

    let mut tally = Tally::default();
    for handle in handles {
        let worker = handle
            .join()
            .map_err(|_| MaukaError::Custom("LRU workload thread panicked".to_string()))?;
        tally = tally.merge(worker);
    }

    Ok(report("moana", settings.operations, tally, started).finish(
        cache.len(),
        cache.evictions(),
        cache.consistency_check(),
    ))
}

fn exercise_bloom(config: &TablesConfig) -> MaukaResult<BloomReport> {
    let mut filter = KonaBloomFilter::with_config(config.bloom.to_filter_config())?;
    let inserted = config.bloom.expected_items.min(config.workload.operations);
    for i in 0..inserted as u64 {
        filter.insert(&i);
    }

    let false_negatives = (0..inserted as u64).filter(|i| !filter.contains(i)).count();
    let probes = inserted.max(1_000);
    let false_positives = (0..probes as u64)
        .map(|i| u64::MAX - i)
        .filter(|i| filter.contains(i))
        .count();

    Ok(BloomReport {
        bit_count: filter.bit_count(),
        hash_count: filter.hash_count(),
        inserted,
        estimated_items: filter.estimate_item_count(),
        fill_ratio: filter.fill_ratio(),
        probes,
        false_positives,
        false_negatives,
    })
}

/// Builds every configured container and drives it through the workload.
///
/// # Errors
///
/// Container construction faults and internal insert failures are returned as
/// [`MaukaError::Table`]; a panicking worker thread becomes [`MaukaError::Custom`].
pub fn run(config: &TablesConfig) -> MaukaResult<WorkloadReport> {
    let settings = &config.workload;
    let hashing = &config.hashing;
    let threads = settings.thread_count();

    tracing::info!(
        operations = settings.operations,
        key_space = settings.key_space,
        threads,
        "Running synthetic workload"
    );

    let containers = vec![
        drive(
            NaluCircularMap::new(config.nalu.to_table_config(hashing))?,
            settings,
        )?,
        drive(LeiLinkedMap::new(config.lei.to_table_config(hashing))?, settings)?,
        drive(
            OhanaMultiMap::new(config.ohana.to_table_config(hashing))?,
            settings,
        )?,
        drive_lru(
            MoanaLruCache::new(config.moana.to_table_config(hashing))?,
            settings,
            threads,
        )?,
        drive(
            PukaProbeMap::new(config.puka.to_probe_config(hashing))?,
            settings,
        )?,
    ];

    for report in containers.iter().filter(|report| !report.consistent) {
        tracing::warn!(container = report.name, "Index and ordering disagree after workload");
    }

    Ok(WorkloadReport {
        threads,
        containers,
        bloom: exercise_bloom(config)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config() -> TablesConfig {
        let mut config = TablesConfig::default();
        config.workload.operations = 5_000;
        config.workload.key_space = 512;
        config.workload.threads = Some(4);
        config.nalu.capacity = 64;
        config.lei.capacity = 64;
        config.ohana.capacity = 64;
        config.moana.capacity = 64;
        config.bloom.expected_items = 1_000;
        config
    }

    #[test]
    fn test_keys_are_deterministic_and_in_range() {
        let first: Vec<_> = (0..100).map(|i| key_at(i, 97)).collect();
        let second: Vec<_> = (0..100).map(|i| key_at(i, 97)).collect();
        assert_eq!(first, second);
        assert!(first.iter().all(|&k| k < 97));
    }

    #[test]
    fn test_op_mix_follows_ratios() {
        let settings = WorkloadSettings {
            read_ratio: 1.0,
            ..WorkloadSettings::default()
        };
        assert!((0..1_000).all(|i| op_at(i, &settings) == Op::Read));

        let settings = WorkloadSettings {
            read_ratio: 0.0,
            remove_ratio: 0.0,
            ..WorkloadSettings::default()
        };
        assert!((0..1_000).all(|i| op_at(i, &settings) == Op::Insert));
    }

    #[test]
    fn test_run_reports_every_container() {
        let report = run(&small_config()).unwrap();
        let names: Vec<_> = report.containers.iter().map(|c| c.name).collect();
        assert_eq!(names, vec!["nalu", "lei", "ohana", "moana", "puka"]);
        assert!(report.containers.iter().all(|c| c.consistent));
        assert!(report
            .containers
            .iter()
            .filter(|c| matches!(c.name, "nalu" | "lei" | "ohana"))
            .all(|c| c.final_len <= 64));
        assert_eq!(report.bloom.false_negatives, 0);
        assert_eq!(report.threads, 4);
    }

    #[test]
    fn test_report_serializes() {
        let report = run(&small_config()).unwrap();
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["containers"].as_array().map(Vec::len), Some(5));
        assert!(json["bloom"]["bit_count"].as_u64().unwrap() > 0);
    }
}
