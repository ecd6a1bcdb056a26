//! `byhand` runtime module.
//!
//! This module provides the object model:
//!
//! - [`header`]: object header, dispatch table layout, the [`Object`] capability
//! - [`object`]: the root type `java.lang.Object` ([`AnyRef`])
//! - [`string`]: the text type `java.lang.String` ([`RuntimeString`])
//! - [`class`]: type descriptors and `isInstance` ([`Class`])
//!
//! # Global Arena
//!
//! Every runtime object is allocated in one process-wide arena and lives
//! until the process exits. References are therefore plain `Copy` handles
//! with no ownership to track.

pub mod class;
pub mod header;
pub mod object;
pub mod string;

pub use class::Class;
pub use header::{Object, ObjectHeader, ObjectVTable};
pub use object::AnyRef;
pub use string::RuntimeString;

use byhand_log::warn;
use byhand_mem::GlobalArena;
use std::sync::OnceLock;

/// Chunk size of the global object arena.
const GLOBAL_ARENA_CHUNK_SIZE: usize = 64 * 1024;

static GLOBAL_ARENA: OnceLock<GlobalArena> = OnceLock::new();

/// Returns the arena all runtime objects are allocated in.
///
/// The first call creates the arena and applies the `BYHAND_LOG`
/// environment variable to the logger.
///
/// # Example
///
/// ```rust
/// use byhand::runtime::get_global_arena;
///
/// let before = get_global_arena().stats().total_allocated;
/// let _s = byhand::RuntimeString::new("Hello");
/// assert!(get_global_arena().stats().total_allocated > before);
/// ```
pub fn get_global_arena() -> &'static GlobalArena {
    GLOBAL_ARENA.get_or_init(|| {
        if let Err(err) = byhand_log::init_from_env() {
            warn!("ignoring {}: {err}", byhand_log::LOG_ENV);
        }
        GlobalArena::new(GLOBAL_ARENA_CHUNK_SIZE)
    })
}

/// The canonical null: "no object".
///
/// `Option<AnyRef>` has the representation of a nullable pointer, so `None`
/// is exactly the null reference. It terminates every superclass chain.
///
/// # Example
///
/// ```rust
/// use byhand::{AnyRef, runtime};
///
/// assert_eq!(AnyRef::class().get_superclass().map(|c| c.get_name().as_str()), None);
/// assert!(runtime::null().is_none());
/// ```
#[must_use]
pub const fn null() -> Option<AnyRef> {
    None
}
