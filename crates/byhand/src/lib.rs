//! `byhand`: an object runtime built by hand.
//!
//! Virtual dispatch, a single-rooted class hierarchy and `isInstance`,
//! reconstructed from per-type dispatch tables instead of a host object
//! model:
//!
//! - **Dispatch tables**: one immutable table per type; subtypes override
//!   slots or bind the supertype's implementation directly
//! - **Root type** [`AnyRef`] (`java.lang.Object`): identity hash, identity
//!   equality, `Name@hash` stringification
//! - **Text type** [`RuntimeString`] (`java.lang.String`): content hash and
//!   equality, `length`, bounds-checked `charAt`
//! - **Descriptors** [`Class`] (`java.lang.Class`): name, superclass and the
//!   `isInstance` ancestor walk; descriptors are runtime objects too
//!
//! # Example
//!
//! ```rust
//! use byhand::{AnyRef, Object, RuntimeString};
//!
//! let s = RuntimeString::new("Hello");
//! let a: AnyRef = s.as_any();
//!
//! assert_eq!(a.hash_code(), s.hash_code());
//! assert!(a.to_string().equals(s));
//! assert_eq!(s.length(), 5);
//! assert_eq!(s.char_at(0), Ok('H'));
//!
//! assert!(s.get_class().is_instance(a));
//! assert!(AnyRef::class().is_instance(a));
//! ```

pub mod error;
pub mod runtime;

pub use error::{Error, Result};
pub use runtime::{AnyRef, Class, Object, RuntimeString, get_global_arena, null};
