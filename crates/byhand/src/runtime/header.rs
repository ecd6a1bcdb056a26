//! Object header and dispatch table layout.
//!
//! Every runtime object starts with a reference to its type's dispatch
//! table. The table for the root type, [`ObjectVTable`], holds the four
//! operations every object answers. Tables of derived types are `#[repr(C)]`
//! structs whose first field is an `ObjectVTable`, so a pointer to any
//! table is also a valid pointer to the root table:
//!
//! ```text
//! object                    StringVTable
//! +------------+            +-----------------------+
//! | vtable  ---+----------> | base: ObjectVTable    |  <- what AnyRef sees
//! | payload... |            |   is_a, hash_code,    |
//! +------------+            |   equals, to_string,  |
//!                           |   get_class           |
//!                           | length                |
//!                           | char_at               |
//!                           +-----------------------+
//! ```
//!
//! Slot implementations always receive the receiver as an [`AnyRef`]. An
//! implementation installed in a derived table may narrow it back to its
//! own type without a check, because only objects of that type point at
//! that table.

use crate::runtime::{AnyRef, Class, RuntimeString};

/// Dispatch table slots shared by every runtime type.
///
/// Tables are immutable statics, one per concrete type, and every slot is
/// filled at compile time, so dispatch can never miss.
#[repr(C)]
pub struct ObjectVTable {
    /// Accessor for the class descriptor of the type this table belongs to.
    ///
    /// Stored as an accessor rather than a `Class` so tables never depend on
    /// descriptor initialization order.
    pub is_a: fn() -> Class,
    pub hash_code: fn(AnyRef) -> i32,
    pub equals: fn(AnyRef, AnyRef) -> bool,
    pub to_string: fn(AnyRef) -> RuntimeString,
    pub get_class: fn(AnyRef) -> Class,
}

/// Leading field of every runtime object.
#[derive(Clone, Copy)]
#[repr(C)]
pub struct ObjectHeader {
    pub(crate) vtable: &'static ObjectVTable,
}

/// The capability every runtime reference has.
///
/// Each method goes through the receiver's dispatch table, so the most
/// specific implementation for the receiver's dynamic type runs no matter
/// which static reference type the caller holds.
///
/// # Example
///
/// ```rust
/// use byhand::{Object, RuntimeString};
///
/// let s = RuntimeString::new("Hello");
/// let a = s.as_any();
///
/// // Same slot, same String implementation, either way.
/// assert_eq!(a.hash_code(), s.hash_code());
/// assert_eq!(a.get_class().name(), "java.lang.String");
/// ```
pub trait Object: Copy {
    /// Views this reference through the root capability.
    fn as_any(self) -> AnyRef;

    fn hash_code(self) -> i32 {
        let this = self.as_any();
        (this.vtable().hash_code)(this)
    }

    fn equals(self, other: impl Object) -> bool {
        let this = self.as_any();
        (this.vtable().equals)(this, other.as_any())
    }

    fn to_string(self) -> RuntimeString {
        let this = self.as_any();
        (this.vtable().to_string)(this)
    }

    fn get_class(self) -> Class {
        let this = self.as_any();
        (this.vtable().get_class)(this)
    }
}
