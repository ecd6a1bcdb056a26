//! Bump-pointer arena for long-lived runtime objects.
//!
//! Every object the runtime creates (root instances, strings, class
//! descriptors) and every string payload lives in an arena and is never
//! freed on its own. References handed out by [`GlobalArena::alloc`] stay
//! valid for as long as the arena does, which for the process-wide arena
//! means `'static`.
//!
//! # Architecture
//!
//! - [`GlobalArena`]: thread-safe arena, a list of chunks plus a pointer to
//!   the chunk currently being filled
//! - `Chunk`: one system allocation with an atomic bump pointer
//!
//! Only `Copy` values are accepted. The arena never runs destructors, so
//! restricting it to types without drop glue means nothing is silently
//! leaked beyond the memory itself.
//!
//! # Example
//!
//! ```
//! use byhand_mem::GlobalArena;
//!
//! let arena = GlobalArena::new(8192);
//!
//! let answer = arena.alloc(42u32);
//! let text = arena.alloc_str("Hello");
//!
//! assert_eq!(*answer, 42);
//! assert_eq!(text, "Hello");
//! ```

use byhand_log::trace;
use std::alloc::{self, Layout};
use std::fmt;
use std::ptr::NonNull;
use std::sync::atomic::{AtomicPtr, AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

/// Alignment of every chunk's start address.
const CHUNK_ALIGNMENT: usize = 16;

/// Smallest chunk the arena will request from the system allocator.
const MIN_CHUNK_SIZE: usize = 4096;

/// Growth stops doubling once chunks reach this size.
const MAX_CHUNK_SIZE: usize = 1024 * 1024;

/// The system allocator could not provide a chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArenaAllocError {
    /// Size of the chunk that was requested.
    pub size: usize,
}

impl fmt::Display for ArenaAllocError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Arena allocation failed: could not reserve a {} byte chunk", self.size)
    }
}

impl std::error::Error for ArenaAllocError {}

/// Arena allocation statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArenaStats {
    /// Bytes handed out to callers (excluding alignment padding).
    pub total_allocated: usize,
    /// Number of chunks owned by the arena.
    pub chunk_count: usize,
    /// Sum of all chunk capacities in bytes.
    pub total_capacity: usize,
}

/// One contiguous region with an atomic bump pointer.
struct Chunk {
    start: NonNull<u8>,
    ptr: AtomicPtr<u8>,
    end: usize,
    capacity: usize,
}

impl Chunk {
    fn new(size: usize) -> Result<Box<Self>, ArenaAllocError> {
        let layout = Layout::from_size_align(size, CHUNK_ALIGNMENT)
            .map_err(|_| ArenaAllocError { size })?;

        // SAFETY: layout has a non-zero size (size >= MIN_CHUNK_SIZE)
        let start = unsafe { alloc::alloc(layout) };
        let start = NonNull::new(start).ok_or(ArenaAllocError { size })?;

        Ok(Box::new(Chunk {
            start,
            ptr: AtomicPtr::new(start.as_ptr()),
            end: start.addr().get() + size,
            capacity: size,
        }))
    }

    /// Bumps the pointer by `size` bytes aligned to `align`, or returns
    /// `None` when the chunk cannot fit the request.
    #[inline]
    fn try_alloc(&self, size: usize, align: usize) -> Option<NonNull<u8>> {
        loop {
            let current = self.ptr.load(Ordering::Acquire);
            let aligned = current.addr().checked_add(align - 1)? & !(align - 1);
            let next = aligned.checked_add(size)?;

            if next > self.end {
                return None;
            }

            if self
                .ptr
                .compare_exchange_weak(
                    current,
                    current.with_addr(next),
                    Ordering::AcqRel,
                    Ordering::Acquire,
                )
                .is_ok()
            {
                // SAFETY: aligned lies inside [start, end] and is non-zero
                return Some(unsafe {
                    NonNull::new_unchecked(current.with_addr(aligned))
                });
            }
        }
    }
}

impl Drop for Chunk {
    fn drop(&mut self) {
        // SAFETY: same size and alignment the chunk was allocated with
        unsafe {
            let layout =
                Layout::from_size_align_unchecked(self.capacity, CHUNK_ALIGNMENT);
            alloc::dealloc(self.start.as_ptr(), layout);
        }
    }
}

/// Thread-safe arena for objects that live until the arena is dropped.
///
/// Allocation is a CAS on the current chunk's bump pointer. When the
/// current chunk is full a new one (twice the configured size, capped at
/// 1 MiB, or larger if the request needs it) is pushed onto the chunk list
/// and becomes current. Dropping the arena frees every chunk at once.
pub struct GlobalArena {
    chunks: Mutex<Vec<Box<Chunk>>>,
    current: AtomicPtr<Chunk>,
    chunk_size: usize,
    total_allocated: AtomicUsize,
}

// SAFETY: chunk memory is only reached through the atomic bump pointer and
// the chunk list is guarded by a mutex; chunks are boxed so `current` never
// dangles while the arena is alive.
unsafe impl Send for GlobalArena {}
unsafe impl Sync for GlobalArena {}

impl GlobalArena {
    /// Creates an arena whose chunks are at least `chunk_size` bytes.
    ///
    /// The size is raised to 4 KiB if smaller and rounded up to a power of
    /// two.
    ///
    /// # Panics
    ///
    /// Panics if the first chunk cannot be allocated.
    #[must_use]
    pub fn new(chunk_size: usize) -> Self {
        match Self::try_new(chunk_size) {
            Ok(arena) => arena,
            Err(err) => panic!("{err}"),
        }
    }

    /// Fallible form of [`GlobalArena::new`].
    ///
    /// # Errors
    ///
    /// Returns [`ArenaAllocError`] if the first chunk cannot be allocated.
    pub fn try_new(chunk_size: usize) -> Result<Self, ArenaAllocError> {
        let size = chunk_size.max(MIN_CHUNK_SIZE).next_power_of_two();
        let mut first = Chunk::new(size)?;
        let current: *mut Chunk = &mut *first;

        Ok(GlobalArena {
            chunks: Mutex::new(vec![first]),
            current: AtomicPtr::new(current),
            chunk_size: size,
            total_allocated: AtomicUsize::new(0),
        })
    }

    /// Moves `value` into the arena and returns a reference to it.
    ///
    /// # Panics
    ///
    /// Panics if a new chunk is needed and the system allocator fails.
    #[must_use]
    pub fn alloc<T: Copy>(&self, value: T) -> &T {
        let ptr = self.alloc_raw(Layout::new::<T>()).cast::<T>();

        // SAFETY: ptr is aligned for T, sized for T and owned by no one else
        unsafe {
            ptr.as_ptr().write(value);
            &*ptr.as_ptr()
        }
    }

    /// Copies `s` into the arena.
    #[must_use]
    pub fn alloc_str(&self, s: &str) -> &str {
        if s.is_empty() {
            return "";
        }

        let layout = Layout::for_value(s.as_bytes());
        let ptr = self.alloc_raw(layout);

        // SAFETY: the destination holds exactly s.len() fresh bytes and the
        // copied bytes are valid UTF-8 because they come from a str
        unsafe {
            std::ptr::copy_nonoverlapping(s.as_ptr(), ptr.as_ptr(), s.len());
            let bytes = std::slice::from_raw_parts(ptr.as_ptr(), s.len());
            std::str::from_utf8_unchecked(bytes)
        }
    }

    /// Returns allocation statistics for this arena.
    #[must_use]
    pub fn stats(&self) -> ArenaStats {
        let chunks = self.chunks.lock().unwrap_or_else(PoisonError::into_inner);

        ArenaStats {
            total_allocated: self.total_allocated.load(Ordering::Relaxed),
            chunk_count: chunks.len(),
            total_capacity: chunks.iter().map(|c| c.capacity).sum(),
        }
    }

    fn alloc_raw(&self, layout: Layout) -> NonNull<u8> {
        loop {
            let current = self.current.load(Ordering::Acquire);

            // SAFETY: current always points at a boxed chunk owned by
            // self.chunks, which only grows while the arena is alive
            let chunk = unsafe { &*current };

            if let Some(ptr) = chunk.try_alloc(layout.size(), layout.align()) {
                self.total_allocated
                    .fetch_add(layout.size(), Ordering::Relaxed);
                return ptr;
            }

            self.grow(current, layout.size() + layout.align());
        }
    }

    /// Installs a fresh chunk unless another thread already replaced `full`.
    #[cold]
    fn grow(&self, full: *mut Chunk, min_size: usize) {
        let mut chunks = self.chunks.lock().unwrap_or_else(PoisonError::into_inner);
        if self.current.load(Ordering::Acquire) != full {
            return;
        }

        let size = (self.chunk_size * 2)
            .min(MAX_CHUNK_SIZE)
            .max(min_size.next_power_of_two());

        let mut chunk = match Chunk::new(size) {
            Ok(chunk) => chunk,
            Err(err) => panic!("{err}"),
        };
        let ptr: *mut Chunk = &mut *chunk;

        chunks.push(chunk);
        self.current.store(ptr, Ordering::Release);

        trace!("arena grew to {} chunks (new chunk {size} bytes)", chunks.len());
    }
}

impl fmt::Debug for GlobalArena {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GlobalArena")
            .field("chunk_size", &self.chunk_size)
            .field("stats", &self.stats())
            .finish()
    }
}
