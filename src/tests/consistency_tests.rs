//! Index/ordering consistency across every container.
//!
//! Random operation sequences are replayed against each container and a
//! `std::collections::HashMap` model. Unbounded containers must agree with the model
//! exactly. Bounded ones are also replayed against small FIFO and LRU models, so the
//! entry chosen for eviction is checked after every step.

use std::collections::{HashMap, HashSet, VecDeque};

use proptest::prelude::*;

use super::{deque_op_strategy, op_sequence_over, op_sequence_strategy, DequeOp, TableOp};
use crate::data_structures::{
    LeiLinkedMap, MoanaLruCache, NaluCircularMap, OhanaMultiMap, PukaProbeMap, PukaProbeMapConfig,
    TableConfig,
};

fn dynamic() -> TableConfig {
    TableConfig::new().with_capacity(4)
}

/// Least-recently-used reference: front is most recent, and both reads and writes
/// refresh a key.
struct LruModel {
    order: VecDeque<u16>,
    values: HashMap<u16, u32>,
    capacity: usize,
}

impl LruModel {
    fn new(capacity: usize) -> Self {
        Self {
            order: VecDeque::new(),
            values: HashMap::new(),
            capacity,
        }
    }

    fn touch(&mut self, key: u16) {
        self.order.retain(|&k| k != key);
        self.order.push_front(key);
    }

    fn put(&mut self, key: u16, value: u32) -> Option<u32> {
        let previous = self.values.insert(key, value);
        self.touch(key);
        if self.order.len() > self.capacity {
            if let Some(evicted) = self.order.pop_back() {
                self.values.remove(&evicted);
            }
        }
        previous
    }

    fn get(&mut self, key: u16) -> Option<u32> {
        let value = self.values.get(&key).copied();
        if value.is_some() {
            self.touch(key);
        }
        value
    }

    fn remove(&mut self, key: u16) -> Option<u32> {
        self.order.retain(|&k| k != key);
        self.values.remove(&key)
    }

    fn clear(&mut self) {
        self.order.clear();
        self.values.clear();
    }

    fn sorted_keys(&self) -> Vec<u16> {
        let mut keys: Vec<_> = self.order.iter().copied().collect();
        keys.sort_unstable();
        keys
    }
}

/// Bounded deque reference: a full container evicts from the end opposite the insert.
struct DequeModel<V> {
    entries: VecDeque<(u16, V)>,
    capacity: usize,
}

impl<V> DequeModel<V> {
    fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            capacity,
        }
    }

    fn position(&self, key: u16) -> Option<usize> {
        self.entries.iter().position(|(k, _)| *k == key)
    }

    fn take(&mut self, key: u16) -> Option<V> {
        let pos = self.position(key)?;
        self.entries.remove(pos).map(|(_, v)| v)
    }

    fn push_back(&mut self, key: u16, value: V) {
        if self.entries.len() >= self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back((key, value));
    }

    fn push_front(&mut self, key: u16, value: V) {
        if self.entries.len() >= self.capacity {
            self.entries.pop_back();
        }
        self.entries.push_front((key, value));
    }
}

fn assert_same_keys<'a>(enumerated: impl Iterator<Item = &'a u16>, model: &HashMap<u16, u32>) {
    let keys: HashSet<u16> = enumerated.copied().collect();
    let expected: HashSet<u16> = model.keys().copied().collect();
    assert_eq!(keys, expected);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn nalu_matches_model(ops in op_sequence_strategy(200)) {
        let mut map = NaluCircularMap::new(dynamic()).unwrap();
        let mut model = HashMap::new();
        for op in ops {
            match op {
                TableOp::Insert(k, v) => {
                    prop_assert_eq!(map.insert(k, v).unwrap(), model.insert(k, v));
                }
                TableOp::Remove(k) => prop_assert_eq!(map.remove(&k), model.remove(&k)),
                TableOp::Get(k) => prop_assert_eq!(map.get(&k), model.get(&k)),
                TableOp::Clear => {
                    map.clear();
                    model.clear();
                }
            }
        }
        prop_assert_eq!(map.len(), model.len());
        assert_same_keys(map.iter().map(|(k, _)| k), &model);
        prop_assert_eq!(map.recent_window(usize::MAX).len(), model.len());
    }

    #[test]
    fn lei_matches_model(ops in op_sequence_strategy(200)) {
        let mut map = LeiLinkedMap::new(dynamic()).unwrap();
        let mut model = HashMap::new();
        for op in ops {
            match op {
                TableOp::Insert(k, v) => prop_assert_eq!(map.insert(k, v), model.insert(k, v)),
                TableOp::Remove(k) => prop_assert_eq!(map.remove(&k), model.remove(&k)),
                TableOp::Get(k) => prop_assert_eq!(map.get(&k), model.get(&k)),
                TableOp::Clear => {
                    map.clear();
                    model.clear();
                }
            }
        }
        assert_same_keys(map.iter().map(|(k, _)| k), &model);
        let forward: Vec<_> = map.iter().map(|(k, _)| *k).collect();
        let mut backward: Vec<_> = map.iter().rev().map(|(k, _)| *k).collect();
        backward.reverse();
        prop_assert_eq!(forward, backward);
    }

    #[test]
    fn ohana_matches_model(ops in op_sequence_strategy(200)) {
        let mut map = OhanaMultiMap::new(dynamic()).unwrap();
        let mut model: HashMap<u16, Vec<u32>> = HashMap::new();
        for op in ops {
            match op {
                TableOp::Insert(k, v) => {
                    map.insert(k, v);
                    model.entry(k).or_default().push(v);
                }
                TableOp::Remove(k) => prop_assert_eq!(map.remove(&k), model.remove(&k)),
                TableOp::Get(k) => {
                    prop_assert_eq!(map.get(&k), model.get(&k).map(Vec::as_slice));
                }
                TableOp::Clear => {
                    map.clear();
                    model.clear();
                }
            }
        }
        prop_assert_eq!(map.len(), model.len());
        prop_assert_eq!(map.value_count(), model.values().map(Vec::len).sum::<usize>());
        for (k, values) in map.iter() {
            prop_assert_eq!(Some(values), model.get(k).map(Vec::as_slice));
        }
    }

    #[test]
    fn moana_matches_model(ops in op_sequence_strategy(200)) {
        let cache = MoanaLruCache::new(dynamic()).unwrap();
        let mut model = HashMap::new();
        for op in ops {
            match op {
                TableOp::Insert(k, v) => prop_assert_eq!(cache.put(k, v), model.insert(k, v)),
                TableOp::Remove(k) => prop_assert_eq!(cache.remove(&k), model.remove(&k)),
                TableOp::Get(k) => prop_assert_eq!(cache.get(&k), model.get(&k).copied()),
                TableOp::Clear => {
                    cache.clear();
                    model.clear();
                }
            }
        }
        prop_assert!(cache.consistency_check());
        assert_same_keys(cache.keys().iter(), &model);
    }

    #[test]
    fn puka_matches_model(ops in op_sequence_strategy(300)) {
        let config = PukaProbeMapConfig::new().with_initial_capacity(4);
        let mut map = PukaProbeMap::new(config).unwrap();
        let mut model = HashMap::new();
        for op in ops {
            match op {
                TableOp::Insert(k, v) => {
                    prop_assert_eq!(map.insert(k, v).unwrap(), model.insert(k, v));
                }
                TableOp::Remove(k) => prop_assert_eq!(map.remove(&k), model.remove(&k)),
                TableOp::Get(k) => prop_assert_eq!(map.get(&k), model.get(&k)),
                TableOp::Clear => {
                    map.clear();
                    model.clear();
                }
            }
        }
        prop_assert_eq!(map.len(), model.len());
        assert_same_keys(map.iter().map(|(k, _)| k), &model);
    }

    #[test]
    fn bounded_containers_stay_consistent(ops in op_sequence_strategy(200), capacity in 1usize..8) {
        let mut nalu = NaluCircularMap::new(TableConfig::fixed(capacity)).unwrap();
        let mut lei = LeiLinkedMap::new(TableConfig::fixed(capacity)).unwrap();
        let mut ohana = OhanaMultiMap::new(TableConfig::fixed(capacity)).unwrap();
        let moana = MoanaLruCache::new(TableConfig::fixed(capacity)).unwrap();

        for op in ops {
            match op {
                TableOp::Insert(k, v) => {
                    nalu.insert(k, v).unwrap();
                    lei.insert(k, v);
                    ohana.insert(k, v);
                    moana.put(k, v);
                }
                TableOp::Remove(k) => {
                    nalu.remove(&k);
                    lei.remove(&k);
                    ohana.remove(&k);
                    moana.remove(&k);
                }
                TableOp::Get(k) => {
                    nalu.get(&k);
                    lei.get(&k);
                    ohana.get(&k);
                    moana.get(&k);
                }
                TableOp::Clear => {
                    nalu.clear();
                    lei.clear();
                    ohana.clear();
                    moana.clear();
                }
            }
            prop_assert!(nalu.len() <= capacity);
            prop_assert!(lei.len() <= capacity);
            prop_assert!(ohana.len() <= capacity);
            prop_assert!(moana.len() <= capacity);
        }

        prop_assert!(nalu.iter().all(|(k, _)| nalu.contains_key(k)));
        prop_assert_eq!(nalu.iter().count(), nalu.len());
        prop_assert!(lei.iter().all(|(k, _)| lei.contains_key(k)));
        prop_assert_eq!(lei.iter().count(), lei.len());
        prop_assert!(ohana.iter().all(|(k, _)| ohana.contains_key(k)));
        prop_assert_eq!(ohana.iter().count(), ohana.len());
        prop_assert!(moana.consistency_check());
    }

    #[test]
    fn cursor_walk_matches_iteration(ops in op_sequence_strategy(100)) {
        let mut map = LeiLinkedMap::new(dynamic()).unwrap();
        for op in ops {
            if let TableOp::Insert(k, v) = op {
                map.insert(k, v);
            }
        }

        let mut cursor = map.cursor();
        let mut walked = Vec::new();
        while let Some(entry) = map.advance(&mut cursor).unwrap() {
            walked.push(entry);
        }
        let iterated: Vec<_> = map.iter().map(|(k, v)| (*k, *v)).collect();
        prop_assert_eq!(walked, iterated);
        prop_assert!(cursor.is_finished());
    }

    #[test]
    fn moana_evicts_least_recently_used(ops in op_sequence_over(12, 300), capacity in 1usize..6) {
        let cache = MoanaLruCache::new(TableConfig::fixed(capacity)).unwrap();
        let mut model = LruModel::new(capacity);
        for op in ops {
            match op {
                TableOp::Insert(k, v) => prop_assert_eq!(cache.put(k, v), model.put(k, v)),
                TableOp::Remove(k) => prop_assert_eq!(cache.remove(&k), model.remove(k)),
                TableOp::Get(k) => prop_assert_eq!(cache.get(&k), model.get(k)),
                TableOp::Clear => {
                    cache.clear();
                    model.clear();
                }
            }
            let mut keys = cache.keys();
            keys.sort_unstable();
            prop_assert_eq!(keys, model.sorted_keys());
        }
        for (k, v) in &model.values {
            prop_assert_eq!(cache.peek(k), Some(*v));
        }
        prop_assert!(cache.consistency_check());
    }

    #[test]
    fn lei_evicts_from_the_opposite_end(ops in deque_op_strategy(12, 300), capacity in 1usize..6) {
        let mut map = LeiLinkedMap::new(TableConfig::fixed(capacity)).unwrap();
        let mut model = DequeModel::new(capacity);
        for op in ops {
            match op {
                DequeOp::Insert(k, v) => {
                    let expected = match model.position(k) {
                        Some(pos) => Some(std::mem::replace(&mut model.entries[pos].1, v)),
                        None => {
                            model.push_back(k, v);
                            None
                        }
                    };
                    prop_assert_eq!(map.insert(k, v), expected);
                }
                DequeOp::PushBack(k, v) => {
                    let expected = model.take(k);
                    model.push_back(k, v);
                    prop_assert_eq!(map.push_back(k, v), expected);
                }
                DequeOp::PushFront(k, v) => {
                    let expected = model.take(k);
                    model.push_front(k, v);
                    prop_assert_eq!(map.push_front(k, v), expected);
                }
                DequeOp::Remove(k) => prop_assert_eq!(map.remove(&k), model.take(k)),
                DequeOp::PopFront => prop_assert_eq!(map.pop_front().ok(), model.entries.pop_front()),
                DequeOp::PopBack => prop_assert_eq!(map.pop_back().ok(), model.entries.pop_back()),
            }
            let entries: Vec<_> = map.iter().map(|(k, v)| (*k, *v)).collect();
            prop_assert_eq!(&entries, &Vec::from(model.entries.clone()));
        }
    }

    #[test]
    fn ohana_evicts_oldest_key(ops in op_sequence_over(12, 300), capacity in 1usize..6) {
        let mut map = OhanaMultiMap::new(TableConfig::fixed(capacity)).unwrap();
        let mut model: DequeModel<Vec<u32>> = DequeModel::new(capacity);
        for op in ops {
            match op {
                TableOp::Insert(k, v) => {
                    map.insert(k, v);
                    match model.position(k) {
                        Some(pos) => model.entries[pos].1.push(v),
                        None => model.push_back(k, vec![v]),
                    }
                }
                TableOp::Remove(k) => prop_assert_eq!(map.remove(&k), model.take(k)),
                TableOp::Get(k) => {
                    let expected = model.position(k).map(|pos| model.entries[pos].1.as_slice());
                    prop_assert_eq!(map.get(&k), expected);
                }
                TableOp::Clear => {
                    map.clear();
                    model.entries.clear();
                }
            }
            let entries: Vec<_> = map.iter().map(|(k, values)| (*k, values.to_vec())).collect();
            prop_assert_eq!(&entries, &Vec::from(model.entries.clone()));
        }
    }
}
