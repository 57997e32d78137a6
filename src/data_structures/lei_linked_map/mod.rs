// Copyright (c) 2025 Mauka MCP Authors
//
// Licensed under dual license:
// - MIT License (LICENSE-MIT or https://opensource.org/licenses/MIT)
// - Apache License, Version 2.0 (LICENSE-APACHE or https://www.apache.org/licenses/LICENSE-2.0)

//! Lei Linked Map: a hash map that is also a deque.
//!
//! Keys are threaded on a doubly linked list (the "lei"), so entries can be pushed,
//! popped, peeked and moved at either end in O(1) while remaining addressable by key.
//! A fixed-capacity map evicts from the end opposite to the one being pushed.
//!
//! # Example
//!
//! ```
//! use mauka_tables::data_structures::{LeiLinkedMap, TableConfig};
//!
//! let mut lei = LeiLinkedMap::new(TableConfig::fixed(3)).unwrap();
//! lei.push_back("pua", 1);
//! lei.push_back("hala", 2);
//! lei.push_front("maile", 0);
//! lei.push_back("ilima", 3);
//!
//! assert!(!lei.contains_key(&"maile"));
//! assert_eq!(lei.peek_front().unwrap(), (&"pua", &1));
//!
//! lei.move_to_back(&"pua");
//! let order: Vec<_> = lei.iter().map(|(k, _)| *k).collect();
//! assert_eq!(order, vec!["hala", "ilima", "pua"]);
//! ```

mod map;

pub use map::{Iter, LeiLinkedMap};
