// Copyright (c) 2025 Mauka MCP Authors
//
// Licensed under dual license:
// - MIT License (LICENSE-MIT or https://opensource.org/licenses/MIT)
// - Apache License, Version 2.0 (LICENSE-APACHE or https://www.apache.org/licenses/LICENSE-2.0)

//! Building blocks shared by the node-based containers.
//!
//! - [`NodeArena`]: index-addressed node storage with a free-list.
//! - [`ChainIndex`]: separate-chaining bucket heads over node indices.
//! - [`LinkedOrder`]: intrusive doubly linked ordering over node indices.
//! - [`Version`] / [`Cursor`]: mutation detection for detached enumeration.
//! - [`LinkedTable`]: the three above combined with a hasher, shared by the
//!   list-ordered containers.

mod arena;
mod chain;
mod cursor;
mod linked;
mod order;

pub(crate) use arena::NodeArena;
pub(crate) use chain::{ChainIndex, ChainLink};
pub use cursor::Cursor;
pub(crate) use cursor::Version;
pub(crate) use linked::{End, LinkedIter, LinkedTable};
pub(crate) use order::{LinkedOrder, OrderLink};
