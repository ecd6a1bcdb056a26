//! Memory infrastructure for the `byhand` object runtime.
//!
//! Runtime objects are never freed individually. They are bump-allocated
//! into a [`arena::GlobalArena`] and released together when the arena goes
//! away (for the process-wide arena, at exit).

pub mod arena;

pub use arena::{ArenaAllocError, ArenaStats, GlobalArena};
