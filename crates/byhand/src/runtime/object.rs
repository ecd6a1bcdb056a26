//! The root type, `java.lang.Object`.
//!
//! [`AnyRef`] is a reference to any runtime object. The functions in this
//! module are the root type's slot implementations: identity hash,
//! identity equality, `Name@hash` stringification and table-based class
//! lookup. Derived tables bind them directly wherever they do not override
//! a slot.
//!
//! # Memory
//!
//! Objects are allocated in the global arena and never freed, so an
//! `AnyRef` is a plain `Copy` handle that any number of holders may share.

use crate::runtime::header::{Object, ObjectHeader, ObjectVTable};
use crate::runtime::{Class, RuntimeString, get_global_arena};
use std::fmt;
use std::ptr::NonNull;
use std::sync::OnceLock;

/// Name of the root class descriptor.
pub const OBJECT_CLASS_NAME: &str = "java.lang.Object";

/// Dispatch table for bare root-type instances.
static OBJECT_VTABLE: ObjectVTable = ObjectVTable {
    is_a: AnyRef::class,
    hash_code,
    equals,
    to_string,
    get_class,
};

static OBJECT_CLASS: OnceLock<Class> = OnceLock::new();

/// A reference to any runtime object.
///
/// # Example
///
/// ```rust
/// use byhand::{AnyRef, Object};
///
/// let a = AnyRef::new();
/// let b = AnyRef::new();
///
/// assert!(a.equals(a));
/// assert!(!a.equals(b));
/// assert_eq!(a.get_class(), AnyRef::class());
/// ```
#[derive(Clone, Copy)]
#[repr(transparent)]
pub struct AnyRef(NonNull<ObjectHeader>);

// SAFETY: runtime objects live in the global arena for the whole process and
// are immutable after construction.
unsafe impl Send for AnyRef {}
unsafe impl Sync for AnyRef {}

impl AnyRef {
    /// Allocates a bare instance of the root type.
    #[must_use]
    pub fn new() -> Self {
        let header = get_global_arena().alloc(ObjectHeader {
            vtable: &OBJECT_VTABLE,
        });
        AnyRef(NonNull::from(header))
    }

    /// The root class descriptor, `java.lang.Object`.
    ///
    /// Created on first call; every later call returns the same descriptor.
    pub fn class() -> Class {
        *OBJECT_CLASS.get_or_init(|| Class::new_descriptor(OBJECT_CLASS_NAME, None))
    }

    /// Wraps a pointer to an object whose first field is a table reference.
    pub(crate) fn from_header(ptr: NonNull<ObjectHeader>) -> Self {
        AnyRef(ptr)
    }

    pub(crate) fn as_ptr(self) -> NonNull<ObjectHeader> {
        self.0
    }

    /// The root view of this object's dispatch table.
    pub(crate) fn vtable(self) -> &'static ObjectVTable {
        // SAFETY: every AnyRef points at a live arena object whose first
        // field is its table reference
        unsafe { self.0.as_ref().vtable }
    }
}

impl Default for AnyRef {
    fn default() -> Self {
        Self::new()
    }
}

impl Object for AnyRef {
    fn as_any(self) -> AnyRef {
        self
    }
}

impl PartialEq for AnyRef {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.0.as_ptr(), other.0.as_ptr())
    }
}

impl Eq for AnyRef {}

impl fmt::Debug for AnyRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnyRef")
            .field("class", &self.get_class().name())
            .field("addr", &self.0)
            .finish()
    }
}

/// Identity hash: the object's address truncated to 32 bits.
#[allow(clippy::cast_possible_truncation)]
pub(crate) fn hash_code(this: AnyRef) -> i32 {
    this.0.addr().get() as i32
}

/// Reference equality.
pub(crate) fn equals(this: AnyRef, other: AnyRef) -> bool {
    this == other
}

/// `<class name>@<hash in hex>`, where both parts are dispatched so that
/// overrides of `getClass` or `hashCode` show up here.
pub(crate) fn to_string(this: AnyRef) -> RuntimeString {
    let class = this.get_class();
    let text = format!("{}@{:x}", class.name(), this.hash_code());
    RuntimeString::new(&text)
}

/// Class lookup through the object's own table.
pub(crate) fn get_class(this: AnyRef) -> Class {
    (this.vtable().is_a)()
}
