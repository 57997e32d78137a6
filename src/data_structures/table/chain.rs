// Copyright (c) 2025 Mauka MCP Authors
//
// Licensed under dual license:
// - MIT License (LICENSE-MIT or https://opensource.org/licenses/MIT)
// - Apache License, Version 2.0 (LICENSE-APACHE or https://www.apache.org/licenses/LICENSE-2.0)

//! Separate-chaining bucket index over slot indices.
//!
//! The index owns only the bucket heads. Chain links live inside the nodes themselves
//! (see [`ChainLink`]) so the same node can also sit in an ordering structure. Every
//! method takes the node slots explicitly, which lets a container keep its nodes in a
//! [`NodeArena`](super::NodeArena) or in a fixed ring.

/// Access to the hash-chain link stored in a node.
pub(crate) trait ChainLink {
    fn chain_hash(&self) -> u32;
    fn chain_next(&self) -> Option<usize>;
    fn set_chain_next(&mut self, next: Option<usize>);
}

#[derive(Debug, Clone)]
pub(crate) struct ChainIndex {
    heads: Vec<Option<usize>>,
}

impl ChainIndex {
    pub(crate) fn with_buckets(bucket_count: usize) -> Self {
        Self {
            heads: vec![None; bucket_count.max(1)],
        }
    }

    pub(crate) fn bucket_count(&self) -> usize {
        self.heads.len()
    }

    #[inline]
    fn bucket_of(&self, hash: u32) -> usize {
        hash as usize % self.heads.len()
    }

    /// Walks the chain for `hash` and returns the first node accepted by `matches`,
    /// together with the number of nodes visited.
    pub(crate) fn find<N, F>(&self, slots: &[Option<N>], hash: u32, mut matches: F) -> (Option<usize>, usize)
    where
        N: ChainLink,
        F: FnMut(&N) -> bool,
    {
        let mut visited = 0;
        let mut cursor = self.heads[self.bucket_of(hash)];
        while let Some(idx) = cursor {
            let Some(node) = slots.get(idx).and_then(Option::as_ref) else {
                break;
            };
            visited += 1;
            if node.chain_hash() == hash && matches(node) {
                return (Some(idx), visited);
            }
            cursor = node.chain_next();
        }
        (None, visited)
    }

    /// Pushes the node at `idx` onto the head of its chain.
    pub(crate) fn link<N: ChainLink>(&mut self, slots: &mut [Option<N>], idx: usize) {
        let Some(node) = slots.get_mut(idx).and_then(Option::as_mut) else {
            return;
        };
        let bucket = self.bucket_of(node.chain_hash());
        node.set_chain_next(self.heads[bucket]);
        self.heads[bucket] = Some(idx);
    }

    /// Removes the node at `idx` from its chain. Returns `false` if it was not linked.
    pub(crate) fn unlink<N: ChainLink>(&mut self, slots: &mut [Option<N>], idx: usize) -> bool {
        let Some(hash) = slots.get(idx).and_then(Option::as_ref).map(N::chain_hash) else {
            return false;
        };
        let bucket = self.bucket_of(hash);

        let mut prev: Option<usize> = None;
        let mut cursor = self.heads[bucket];
        while let Some(current) = cursor {
            let Some(next) = slots.get(current).and_then(Option::as_ref).map(N::chain_next) else {
                return false;
            };
            if current == idx {
                match prev {
                    None => self.heads[bucket] = next,
                    Some(p) => {
                        if let Some(prev_node) = slots[p].as_mut() {
                            prev_node.set_chain_next(next);
                        }
                    }
                }
                if let Some(node) = slots[idx].as_mut() {
                    node.set_chain_next(None);
                }
                return true;
            }
            prev = Some(current);
            cursor = next;
        }
        false
    }

    /// Resizes to `bucket_count` and relinks every occupied slot.
    pub(crate) fn rebuild<N: ChainLink>(&mut self, bucket_count: usize, slots: &mut [Option<N>]) {
        self.heads = vec![None; bucket_count.max(1)];
        for idx in 0..slots.len() {
            if slots[idx].is_some() {
                self.link(slots, idx);
            }
        }
    }

    pub(crate) fn clear(&mut self) {
        self.heads.iter_mut().for_each(|head| *head = None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct TestNode {
        key: u32,
        next: Option<usize>,
    }

    impl ChainLink for TestNode {
        fn chain_hash(&self) -> u32 {
            self.key
        }

        fn chain_next(&self) -> Option<usize> {
            self.next
        }

        fn set_chain_next(&mut self, next: Option<usize>) {
            self.next = next;
        }
    }

    fn node(key: u32) -> Option<TestNode> {
        Some(TestNode { key, next: None })
    }

    #[test]
    fn test_colliding_keys_share_a_chain() {
        // 3 buckets: keys 1, 4 and 7 all land in bucket 1.
        let mut slots = vec![node(1), node(4), node(7), node(2)];
        let mut index = ChainIndex::with_buckets(3);
        for idx in 0..slots.len() {
            index.link(&mut slots, idx);
        }

        let (found, visited) = index.find(&slots, 1, |n| n.key == 1);
        assert_eq!(found, Some(0));
        assert_eq!(visited, 3);

        let (found, visited) = index.find(&slots, 2, |n| n.key == 2);
        assert_eq!(found, Some(3));
        assert_eq!(visited, 1);

        let (missing, _) = index.find(&slots, 10, |n| n.key == 10);
        assert_eq!(missing, None);
    }

    #[test]
    fn test_unlink_middle_of_chain() {
        let mut slots = vec![node(1), node(4), node(7)];
        let mut index = ChainIndex::with_buckets(3);
        for idx in 0..slots.len() {
            index.link(&mut slots, idx);
        }

        assert!(index.unlink(&mut slots, 1));
        assert!(!index.unlink(&mut slots, 1));
        slots[1] = None;

        assert_eq!(index.find(&slots, 4, |n| n.key == 4).0, None);
        assert_eq!(index.find(&slots, 1, |n| n.key == 1).0, Some(0));
        assert_eq!(index.find(&slots, 7, |n| n.key == 7).0, Some(2));
    }

    #[test]
    fn test_rebuild_relinks_everything() {
        let mut slots = vec![node(5), None, node(9), node(13)];
        let mut index = ChainIndex::with_buckets(1);
        index.rebuild(7, &mut slots);
        assert_eq!(index.bucket_count(), 7);
        for key in [5, 9, 13] {
            assert!(index.find(&slots, key, |n| n.key == key).0.is_some());
        }
    }
}
