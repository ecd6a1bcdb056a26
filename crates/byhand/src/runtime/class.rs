//! `java.lang.Class`: runtime type descriptors.
//!
//! This module implements:
//! - `Class` descriptors (name + superclass link)
//! - The `isInstance` ancestor walk
//! - Lookup of the built-in descriptors by name
//!
//! # Architecture
//!
//! Descriptors form a tree rooted at `java.lang.Object`. Each one is an
//! ordinary runtime object with its own dispatch table: `hashCode`,
//! `equals` and `getClass` are the root type's implementations bound
//! directly, `toString` is overridden, and `getName`, `getSuperclass` and
//! `isInstance` are added.
//!
//! Descriptors are created lazily by their accessors
//! ([`AnyRef::class`], [`RuntimeString::class`], [`Class::class`]), exactly
//! once each, and never destroyed. A descriptor that depends on another
//! (every superclass link) obtains it through that accessor, so creation
//! order never matters.
//!
//! `java.lang.Class` itself descends from `java.lang.Object`; descriptors
//! live in the same hierarchy as every other object.

use crate::runtime::header::{Object, ObjectVTable};
use crate::runtime::{AnyRef, RuntimeString, get_global_arena, object};
use byhand_log::debug;
use fxhash::FxHashMap;
use std::fmt;
use std::mem::offset_of;
use std::ptr::NonNull;
use std::sync::OnceLock;

/// Name of the class descriptor for class descriptors.
pub const CLASS_CLASS_NAME: &str = "java.lang.Class";

/// Dispatch table layout for class descriptors.
#[repr(C)]
pub struct ClassVTable {
    pub base: ObjectVTable,
    pub get_name: fn(Class) -> RuntimeString,
    pub get_superclass: fn(Class) -> Option<Class>,
    pub is_instance: fn(Class, AnyRef) -> bool,
}

static CLASS_VTABLE: ClassVTable = ClassVTable {
    base: ObjectVTable {
        is_a: Class::class,
        hash_code: object::hash_code,
        equals: object::equals,
        to_string,
        get_class: object::get_class,
    },
    get_name,
    get_superclass,
    is_instance,
};

static CLASS_CLASS: OnceLock<Class> = OnceLock::new();

/// Built-in descriptors by name. Filled on first lookup.
static REGISTRY: OnceLock<FxHashMap<&'static str, Class>> = OnceLock::new();

#[derive(Clone, Copy)]
#[repr(C)]
pub(crate) struct RawClass {
    vtable: &'static ClassVTable,
    name: RuntimeString,
    /// `None` only for the root descriptor.
    super_class: Option<Class>,
}

const _: () = assert!(offset_of!(RawClass, vtable) == 0);
const _: () = assert!(offset_of!(ClassVTable, base) == 0);

/// A reference to a class descriptor.
///
/// # Example
///
/// ```rust
/// use byhand::{AnyRef, Class, Object, RuntimeString};
///
/// let string_class = RuntimeString::class();
/// let hello = RuntimeString::new("Hello");
///
/// assert!(string_class.is_instance(hello));
/// assert!(!string_class.is_instance(AnyRef::new()));
/// assert!(AnyRef::class().is_instance(hello));
/// assert_eq!(string_class.to_string().as_str(), "class java.lang.String");
/// ```
#[derive(Clone, Copy)]
#[repr(transparent)]
pub struct Class(NonNull<RawClass>);

// SAFETY: descriptors live in the global arena for the whole process and
// are immutable after construction.
unsafe impl Send for Class {}
unsafe impl Sync for Class {}

impl Class {
    /// Allocates a descriptor. Only the lazily-initialized accessors call
    /// this, so each name is created once.
    pub(crate) fn new_descriptor(name: &str, super_class: Option<Class>) -> Self {
        let raw = get_global_arena().alloc(RawClass {
            vtable: &CLASS_VTABLE,
            name: RuntimeString::new(name),
            super_class,
        });

        debug!(
            "created class descriptor {name} (superclass: {})",
            super_class.map_or("<null>", Class::name)
        );

        Class(NonNull::from(raw))
    }

    /// The descriptor of class descriptors, `java.lang.Class`.
    ///
    /// Its superclass is [`AnyRef::class`].
    pub fn class() -> Class {
        *CLASS_CLASS.get_or_init(|| {
            Class::new_descriptor(CLASS_CLASS_NAME, Some(AnyRef::class()))
        })
    }

    /// Looks up a built-in descriptor by its fully-qualified name.
    ///
    /// # Example
    ///
    /// ```rust
    /// use byhand::{Class, RuntimeString};
    ///
    /// assert_eq!(Class::for_name("java.lang.String"), Some(RuntimeString::class()));
    /// assert_eq!(Class::for_name("java.util.List"), None);
    /// ```
    #[must_use]
    pub fn for_name(name: &str) -> Option<Class> {
        REGISTRY
            .get_or_init(|| {
                [AnyRef::class(), RuntimeString::class(), Class::class()]
                    .into_iter()
                    .map(|class| (class.name(), class))
                    .collect()
            })
            .get(name)
            .copied()
    }

    /// Narrows `obj` to a class descriptor if it is one.
    #[must_use]
    pub fn from_any(obj: AnyRef) -> Option<Self> {
        if Self::class().is_instance(obj) {
            // SAFETY: only descriptors carry the class table
            Some(unsafe { Self::from_any_unchecked(obj) })
        } else {
            None
        }
    }

    /// # Safety
    ///
    /// `obj` must point at a `RawClass`.
    pub(crate) unsafe fn from_any_unchecked(obj: AnyRef) -> Self {
        Class(obj.as_ptr().cast())
    }

    /// Fully-qualified name, dispatched.
    #[must_use]
    pub fn get_name(self) -> RuntimeString {
        (self.vtable().get_name)(self)
    }

    /// Parent descriptor, dispatched. `None` (the canonical null) for the
    /// root.
    #[must_use]
    pub fn get_superclass(self) -> Option<Class> {
        (self.vtable().get_superclass)(self)
    }

    /// Whether `obj`'s class is this class or one of its descendants,
    /// dispatched.
    #[must_use]
    pub fn is_instance(self, obj: impl Object) -> bool {
        (self.vtable().is_instance)(self, obj.as_any())
    }

    /// Whether `other` is this class or one of its descendants.
    ///
    /// # Example
    ///
    /// ```rust
    /// use byhand::{AnyRef, RuntimeString};
    ///
    /// assert!(AnyRef::class().is_assignable_from(RuntimeString::class()));
    /// assert!(!RuntimeString::class().is_assignable_from(AnyRef::class()));
    /// ```
    #[must_use]
    pub fn is_assignable_from(self, other: Class) -> bool {
        walk_ancestors(self, other)
    }

    /// Name as a host string slice.
    #[must_use]
    pub fn name(self) -> &'static str {
        self.get_name().as_str()
    }

    pub(crate) fn vtable(self) -> &'static ClassVTable {
        self.raw().vtable
    }

    fn raw(self) -> &'static RawClass {
        // SAFETY: descriptors are arena-allocated and never freed or mutated
        unsafe { self.0.as_ref() }
    }
}

impl Object for Class {
    fn as_any(self) -> AnyRef {
        AnyRef::from_header(self.0.cast())
    }
}

impl PartialEq for Class {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.0.as_ptr(), other.0.as_ptr())
    }
}

impl Eq for Class {}

impl fmt::Debug for Class {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Class")
            .field("name", &self.name())
            .field("super_class", &self.get_superclass().map(Class::name))
            .finish()
    }
}

/// Walks from `candidate` up the superclass chain looking for `target`.
///
/// Terminates because the chain of every descriptor ends at the root,
/// whose superclass is `None`.
fn walk_ancestors(target: Class, candidate: Class) -> bool {
    let mut current = Some(candidate);

    while let Some(class) = current {
        if target.equals(class) {
            return true;
        }
        current = class.get_superclass();
    }

    false
}

fn to_string(this: AnyRef) -> RuntimeString {
    // SAFETY: bound only in the class table
    let this = unsafe { Class::from_any_unchecked(this) };
    RuntimeString::new(&format!("class {}", this.name()))
}

fn get_name(this: Class) -> RuntimeString {
    this.raw().name
}

fn get_superclass(this: Class) -> Option<Class> {
    this.raw().super_class
}

fn is_instance(this: Class, obj: AnyRef) -> bool {
    walk_ancestors(this, obj.get_class())
}
