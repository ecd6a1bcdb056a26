//! `java.lang.String`: the runtime's text value type.
//!
//! A [`RuntimeString`] wraps an immutable payload copied into the global
//! arena. Its dispatch table overrides `hashCode`, `equals` and `toString`,
//! adds `length` and `charAt`, and binds the root type's `getClass`
//! unchanged.
//!
//! # Characters
//!
//! `length` and `charAt` count Unicode scalar values (`char`). Payloads
//! that are pure ASCII are flagged at construction and indexed by byte.
//!
//! `hashCode` is the classic string hash and runs over UTF-16 code units,
//! so a character outside the Basic Multilingual Plane contributes its two
//! surrogates. The result is bit-exact for every payload.
//!
//! # Example
//!
//! ```rust
//! use byhand::{Object, RuntimeString};
//!
//! let s = RuntimeString::new("Hello");
//!
//! assert_eq!(s.length(), 5);
//! assert_eq!(s.char_at(0).unwrap(), 'H');
//! assert_eq!(s.hash_code(), 69_609_650);
//! assert!(s.equals(RuntimeString::new("Hello")));
//! ```

use crate::error::{Error, Result};
use crate::runtime::header::{Object, ObjectVTable};
use crate::runtime::{AnyRef, Class, get_global_arena, object};
use byhand_log::debug;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::mem::offset_of;
use std::ptr::NonNull;
use std::sync::OnceLock;

/// Name of the string class descriptor.
pub const STRING_CLASS_NAME: &str = "java.lang.String";

/// Payload contains only ASCII, so characters are bytes.
const FLAG_ASCII: u8 = 0x01;

/// Dispatch table layout for strings.
#[repr(C)]
pub struct StringVTable {
    pub base: ObjectVTable,
    pub length: fn(RuntimeString) -> i32,
    pub char_at: fn(RuntimeString, i32) -> Result<char>,
}

static STRING_VTABLE: StringVTable = StringVTable {
    base: ObjectVTable {
        is_a: RuntimeString::class,
        hash_code,
        equals,
        to_string,
        get_class: object::get_class,
    },
    length,
    char_at,
};

static STRING_CLASS: OnceLock<Class> = OnceLock::new();

#[derive(Clone, Copy)]
#[repr(C)]
pub(crate) struct RawString {
    vtable: &'static StringVTable,
    data: &'static str,
    /// Number of characters in `data`.
    len: usize,
    flags: u8,
}

const _: () = assert!(offset_of!(RawString, vtable) == 0);
const _: () = assert!(offset_of!(StringVTable, base) == 0);

/// A reference to a runtime string.
#[derive(Clone, Copy)]
#[repr(transparent)]
pub struct RuntimeString(NonNull<RawString>);

// SAFETY: strings live in the global arena for the whole process and their
// payload is never mutated.
unsafe impl Send for RuntimeString {}
unsafe impl Sync for RuntimeString {}

impl RuntimeString {
    /// Creates a string holding a copy of `text`.
    #[must_use]
    pub fn new(text: &str) -> Self {
        let arena = get_global_arena();
        let data = arena.alloc_str(text);

        let (len, flags) = if data.is_ascii() {
            (data.len(), FLAG_ASCII)
        } else {
            (data.chars().count(), 0)
        };

        let raw = arena.alloc(RawString {
            vtable: &STRING_VTABLE,
            data,
            len,
            flags,
        });
        RuntimeString(NonNull::from(raw))
    }

    /// The string class descriptor, `java.lang.String`.
    ///
    /// Its superclass is [`AnyRef::class`].
    pub fn class() -> Class {
        *STRING_CLASS.get_or_init(|| {
            Class::new_descriptor(STRING_CLASS_NAME, Some(AnyRef::class()))
        })
    }

    /// Narrows `obj` to a string if its class is, or descends from,
    /// `java.lang.String`.
    #[must_use]
    pub fn from_any(obj: AnyRef) -> Option<Self> {
        if Self::class().is_instance(obj) {
            // SAFETY: only strings carry the string table
            Some(unsafe { Self::from_any_unchecked(obj) })
        } else {
            None
        }
    }

    /// # Safety
    ///
    /// `obj` must point at a `RawString`.
    pub(crate) unsafe fn from_any_unchecked(obj: AnyRef) -> Self {
        RuntimeString(obj.as_ptr().cast())
    }

    /// Number of characters, dispatched.
    #[must_use]
    pub fn length(self) -> i32 {
        (self.vtable().length)(self)
    }

    /// Character at `index` (0-based), dispatched.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IndexOutOfBounds`] if `index < 0` or
    /// `index >= length`.
    pub fn char_at(self, index: i32) -> Result<char> {
        (self.vtable().char_at)(self, index)
    }

    /// The payload.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        self.raw().data
    }

    /// Whether the payload is pure ASCII.
    #[must_use]
    pub fn is_ascii(self) -> bool {
        self.raw().flags & FLAG_ASCII != 0
    }

    pub(crate) fn vtable(self) -> &'static StringVTable {
        self.raw().vtable
    }

    fn raw(self) -> &'static RawString {
        // SAFETY: strings are arena-allocated and never freed or mutated
        unsafe { self.0.as_ref() }
    }
}

impl Object for RuntimeString {
    fn as_any(self) -> AnyRef {
        AnyRef::from_header(self.0.cast())
    }
}

impl PartialEq for RuntimeString {
    fn eq(&self, other: &Self) -> bool {
        self.equals(*other)
    }
}

impl Eq for RuntimeString {}

impl Hash for RuntimeString {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_i32(self.hash_code());
    }
}

impl fmt::Debug for RuntimeString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RuntimeString").field(&self.as_str()).finish()
    }
}

/// `hash = 31 * hash + u` over the UTF-16 code units, with 32-bit
/// wraparound.
fn hash_code(this: AnyRef) -> i32 {
    // SAFETY: bound only in the string table
    let this = unsafe { RuntimeString::from_any_unchecked(this) };

    this.as_str()
        .encode_utf16()
        .fold(0i32, |hash, u| hash.wrapping_mul(31).wrapping_add(i32::from(u)))
}

fn equals(this: AnyRef, other: AnyRef) -> bool {
    let Some(other) = RuntimeString::from_any(other) else {
        return false;
    };

    // SAFETY: bound only in the string table
    let this = unsafe { RuntimeString::from_any_unchecked(this) };
    this.as_str() == other.as_str()
}

fn to_string(this: AnyRef) -> RuntimeString {
    // SAFETY: bound only in the string table
    unsafe { RuntimeString::from_any_unchecked(this) }
}

fn length(this: RuntimeString) -> i32 {
    saturating_length(this.raw().len)
}

/// Character counts above `i32::MAX` report as `i32::MAX`; `charAt` still
/// reaches only the first `i32::MAX` characters.
fn saturating_length(len: usize) -> i32 {
    i32::try_from(len).unwrap_or(i32::MAX)
}

fn char_at(this: RuntimeString, index: i32) -> Result<char> {
    let raw = this.raw();

    let found = usize::try_from(index)
        .ok()
        .filter(|&i| i < raw.len)
        .and_then(|i| {
            if raw.flags & FLAG_ASCII != 0 {
                raw.data.as_bytes().get(i).map(|&b| char::from(b))
            } else {
                raw.data.chars().nth(i)
            }
        });

    found.ok_or_else(|| {
        debug!("charAt({index}) rejected for string of length {}", raw.len);
        Error::IndexOutOfBounds {
            index,
            text: raw.data.to_string(),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_class_descriptor() {
        let class = RuntimeString::class();

        assert_eq!(class.name(), "java.lang.String");
        assert_eq!(class.get_superclass(), Some(AnyRef::class()));
        assert_eq!(RuntimeString::class(), class);
    }

    #[test]
    fn test_hash_code_hello() {
        let expected = 31 * (31 * (31 * (31 * 72 + 101) + 108) + 108) + 111;
        let s = RuntimeString::new("Hello");

        assert_eq!(s.hash_code(), expected);
        assert_eq!(s.hash_code(), 69_609_650);
    }

    #[test]
    fn test_hash_code_empty() {
        assert_eq!(RuntimeString::new("").hash_code(), 0);
    }

    #[test]
    fn test_hash_code_wraps() {
        // Known values of the classic string hash once it overflows.
        assert_eq!(
            RuntimeString::new("The quick brown fox").hash_code(),
            -1_739_336_029
        );
        assert_eq!(RuntimeString::new("polygenelubricants").hash_code(), i32::MIN);
    }

    #[test]
    fn test_hash_code_supplementary_plane() {
        // U+1F600 is the surrogate pair D83D DE00.
        let expected = (31 * 97 + 0xD83D) * 31 + 0xDE00;
        let s = RuntimeString::new("a\u{1F600}");

        assert_eq!(s.hash_code(), expected);
        assert_eq!(s.hash_code(), 1_866_116);
        assert_eq!(s.length(), 2);
    }

    #[test]
    fn test_hash_code_content_based() {
        let a = RuntimeString::new("same text");
        let b = RuntimeString::new("same text");

        assert_ne!(a.as_any(), b.as_any());
        assert_eq!(a.hash_code(), b.hash_code());
    }

    #[test]
    fn test_equals_by_content() {
        let a = RuntimeString::new("abc");
        let b = RuntimeString::new("abc");
        let c = RuntimeString::new("abd");

        assert!(a.equals(b));
        assert!(b.equals(a));
        assert!(!a.equals(c));
        assert!(!a.equals(RuntimeString::new("ab")));
    }

    #[test]
    fn test_equals_rejects_other_types() {
        let s = RuntimeString::new("java.lang.String");

        assert!(!s.equals(AnyRef::new()));
        assert!(!s.equals(RuntimeString::class()));
    }

    #[test]
    fn test_to_string_is_identity() {
        let s = RuntimeString::new("Hello");
        assert_eq!(s.to_string().as_any(), s.as_any());
    }

    #[test]
    fn test_get_class_bound_to_root_implementation() {
        let slot = STRING_VTABLE.base.get_class as usize;
        let root = object::get_class as fn(AnyRef) -> Class as usize;

        assert_eq!(slot, root);
        assert_eq!(RuntimeString::new("x").get_class(), RuntimeString::class());
    }

    #[test]
    fn test_length() {
        assert_eq!(RuntimeString::new("Hello").length(), 5);
        assert_eq!(RuntimeString::new("").length(), 0);
        assert_eq!(RuntimeString::new("héllo").length(), 5);
    }

    #[test]
    fn test_length_saturates() {
        assert_eq!(saturating_length(0), 0);
        assert_eq!(saturating_length(i32::MAX as usize), i32::MAX);
        assert_eq!(saturating_length(i32::MAX as usize + 1), i32::MAX);
        assert_eq!(saturating_length(usize::MAX), i32::MAX);
    }

    #[test]
    fn test_char_at() {
        let s = RuntimeString::new("Hello");

        assert_eq!(s.char_at(0), Ok('H'));
        assert_eq!(s.char_at(1), Ok('e'));
        assert_eq!(s.char_at(4), Ok('o'));
    }

    #[test]
    fn test_char_at_out_of_bounds() {
        let s = RuntimeString::new("Hello");

        for index in [5, -1, i32::MAX, i32::MIN] {
            assert_eq!(
                s.char_at(index),
                Err(Error::IndexOutOfBounds { index, text: "Hello".to_string() })
            );
        }
    }

    #[test]
    fn test_char_at_non_ascii() {
        let s = RuntimeString::new("añb");

        assert!(!s.is_ascii());
        assert_eq!(s.char_at(1), Ok('ñ'));
        assert_eq!(s.char_at(2), Ok('b'));
        assert!(s.char_at(3).is_err());
    }

    #[test]
    fn test_ascii_flag() {
        assert!(RuntimeString::new("plain").is_ascii());
        assert!(RuntimeString::new("").is_ascii());
        assert!(!RuntimeString::new("naïve").is_ascii());
    }

    #[test]
    fn test_from_any() {
        let s = RuntimeString::new("abc");

        assert_eq!(RuntimeString::from_any(s.as_any()), Some(s));
        assert_eq!(RuntimeString::from_any(AnyRef::new()), None);
    }

    #[test]
    fn test_hash_set_membership() {
        use std::collections::HashSet;

        let mut set = HashSet::new();
        set.insert(RuntimeString::new("one"));
        set.insert(RuntimeString::new("two"));

        assert!(set.contains(&RuntimeString::new("one")));
        assert!(!set.insert(RuntimeString::new("two")));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_debug() {
        let debug_str = format!("{:?}", RuntimeString::new("dbg"));
        assert_eq!(debug_str, "RuntimeString(\"dbg\")");
    }
}
