// Copyright (c) 2025 Mauka MCP Authors
//
// Licensed under dual license:
// - MIT License (LICENSE-MIT or https://opensource.org/licenses/MIT)
// - Apache License, Version 2.0 (LICENSE-APACHE or https://www.apache.org/licenses/LICENSE-2.0)

//! Intrusive doubly linked ordering over slot indices.
//!
//! ```text
//!   head ─► [i3] ◄──► [i0] ◄──► [i7] ◄── tail
//! ```
//!
//! The list stores only `head`/`tail`; `prev`/`next` live in the nodes (see
//! [`OrderLink`]), independent of their hash-chain link.

/// Access to the ordering links stored in a node.
pub(crate) trait OrderLink {
    fn prev(&self) -> Option<usize>;
    fn next(&self) -> Option<usize>;
    fn set_prev(&mut self, prev: Option<usize>);
    fn set_next(&mut self, next: Option<usize>);
}

#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct LinkedOrder {
    head: Option<usize>,
    tail: Option<usize>,
}

fn node_mut<N>(slots: &mut [Option<N>], idx: usize) -> Option<&mut N> {
    slots.get_mut(idx).and_then(Option::as_mut)
}

fn set_next<N: OrderLink>(slots: &mut [Option<N>], idx: usize, next: Option<usize>) {
    if let Some(node) = node_mut(slots, idx) {
        node.set_next(next);
    }
}

fn set_prev<N: OrderLink>(slots: &mut [Option<N>], idx: usize, prev: Option<usize>) {
    if let Some(node) = node_mut(slots, idx) {
        node.set_prev(prev);
    }
}

impl LinkedOrder {
    pub(crate) fn head(&self) -> Option<usize> {
        self.head
    }

    pub(crate) fn tail(&self) -> Option<usize> {
        self.tail
    }

    pub(crate) fn push_back<N: OrderLink>(&mut self, slots: &mut [Option<N>], idx: usize) {
        let tail = self.tail;
        let Some(node) = node_mut(slots, idx) else {
            return;
        };
        node.set_prev(tail);
        node.set_next(None);
        match tail {
            Some(t) => set_next(slots, t, Some(idx)),
            None => self.head = Some(idx),
        }
        self.tail = Some(idx);
    }

    pub(crate) fn push_front<N: OrderLink>(&mut self, slots: &mut [Option<N>], idx: usize) {
        let head = self.head;
        let Some(node) = node_mut(slots, idx) else {
            return;
        };
        node.set_prev(None);
        node.set_next(head);
        match head {
            Some(h) => set_prev(slots, h, Some(idx)),
            None => self.tail = Some(idx),
        }
        self.head = Some(idx);
    }

    /// Unlinks `idx` from its neighbours. The node itself stays in `slots`.
    pub(crate) fn detach<N: OrderLink>(&mut self, slots: &mut [Option<N>], idx: usize) {
        let Some((prev, next)) = slots
            .get(idx)
            .and_then(Option::as_ref)
            .map(|node| (node.prev(), node.next()))
        else {
            return;
        };

        match prev {
            Some(p) => set_next(slots, p, next),
            None => self.head = next,
        }
        match next {
            Some(n) => set_prev(slots, n, prev),
            None => self.tail = prev,
        }
        if let Some(node) = node_mut(slots, idx) {
            node.set_prev(None);
            node.set_next(None);
        }
    }

    pub(crate) fn move_to_front<N: OrderLink>(&mut self, slots: &mut [Option<N>], idx: usize) {
        if self.head == Some(idx) {
            return;
        }
        self.detach(slots, idx);
        self.push_front(slots, idx);
    }

    pub(crate) fn move_to_back<N: OrderLink>(&mut self, slots: &mut [Option<N>], idx: usize) {
        if self.tail == Some(idx) {
            return;
        }
        self.detach(slots, idx);
        self.push_back(slots, idx);
    }

    /// Links a detached `idx` directly behind `anchor`.
    pub(crate) fn insert_after<N: OrderLink>(
        &mut self,
        slots: &mut [Option<N>],
        anchor: usize,
        idx: usize,
    ) {
        let Some(next) = slots
            .get(anchor)
            .and_then(Option::as_ref)
            .map(|node| node.next())
        else {
            return;
        };
        let Some(node) = node_mut(slots, idx) else {
            return;
        };
        node.set_prev(Some(anchor));
        node.set_next(next);
        set_next(slots, anchor, Some(idx));
        match next {
            Some(n) => set_prev(slots, n, Some(idx)),
            None => self.tail = Some(idx),
        }
    }

    pub(crate) fn next_of<N: OrderLink>(slots: &[Option<N>], idx: usize) -> Option<usize> {
        slots.get(idx).and_then(Option::as_ref).and_then(N::next)
    }

    pub(crate) fn prev_of<N: OrderLink>(slots: &[Option<N>], idx: usize) -> Option<usize> {
        slots.get(idx).and_then(Option::as_ref).and_then(N::prev)
    }

    pub(crate) fn clear(&mut self) {
        self.head = None;
        self.tail = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default)]
    struct TestNode {
        prev: Option<usize>,
        next: Option<usize>,
    }

    impl OrderLink for TestNode {
        fn prev(&self) -> Option<usize> {
            self.prev
        }

        fn next(&self) -> Option<usize> {
            self.next
        }

        fn set_prev(&mut self, prev: Option<usize>) {
            self.prev = prev;
        }

        fn set_next(&mut self, next: Option<usize>) {
            self.next = next;
        }
    }

    fn forward(order: &LinkedOrder, slots: &[Option<TestNode>]) -> Vec<usize> {
        let mut out = Vec::new();
        let mut cursor = order.head();
        while let Some(idx) = cursor {
            out.push(idx);
            cursor = LinkedOrder::next_of(slots, idx);
        }
        out
    }

    fn backward(order: &LinkedOrder, slots: &[Option<TestNode>]) -> Vec<usize> {
        let mut out = Vec::new();
        let mut cursor = order.tail();
        while let Some(idx) = cursor {
            out.push(idx);
            cursor = LinkedOrder::prev_of(slots, idx);
        }
        out
    }

    fn slots(n: usize) -> Vec<Option<TestNode>> {
        (0..n).map(|_| Some(TestNode::default())).collect()
    }

    #[test]
    fn test_push_both_ends() {
        let mut slots = slots(3);
        let mut order = LinkedOrder::default();
        order.push_back(&mut slots, 0);
        order.push_back(&mut slots, 1);
        order.push_front(&mut slots, 2);

        assert_eq!(forward(&order, &slots), vec![2, 0, 1]);
        assert_eq!(backward(&order, &slots), vec![1, 0, 2]);
    }

    #[test]
    fn test_detach_head_middle_tail() {
        let mut slots = slots(4);
        let mut order = LinkedOrder::default();
        for idx in 0..4 {
            order.push_back(&mut slots, idx);
        }

        order.detach(&mut slots, 1);
        assert_eq!(forward(&order, &slots), vec![0, 2, 3]);
        order.detach(&mut slots, 0);
        assert_eq!(forward(&order, &slots), vec![2, 3]);
        order.detach(&mut slots, 3);
        assert_eq!(forward(&order, &slots), vec![2]);
        assert_eq!(order.head(), order.tail());
        order.detach(&mut slots, 2);
        assert_eq!(order.head(), None);
        assert_eq!(order.tail(), None);
    }

    #[test]
    fn test_move_to_front_and_back() {
        let mut slots = slots(3);
        let mut order = LinkedOrder::default();
        for idx in 0..3 {
            order.push_back(&mut slots, idx);
        }

        order.move_to_front(&mut slots, 2);
        assert_eq!(forward(&order, &slots), vec![2, 0, 1]);
        order.move_to_back(&mut slots, 2);
        assert_eq!(forward(&order, &slots), vec![0, 1, 2]);
        assert_eq!(backward(&order, &slots), vec![2, 1, 0]);
    }

    #[test]
    fn test_insert_after_middle_and_tail() {
        let mut slots = slots(4);
        let mut order = LinkedOrder::default();
        order.push_back(&mut slots, 0);
        order.push_back(&mut slots, 1);

        order.insert_after(&mut slots, 0, 2);
        assert_eq!(forward(&order, &slots), vec![0, 2, 1]);
        order.insert_after(&mut slots, 1, 3);
        assert_eq!(forward(&order, &slots), vec![0, 2, 1, 3]);
        assert_eq!(backward(&order, &slots), vec![3, 1, 2, 0]);
        assert_eq!(order.tail(), Some(3));
    }
}
