//! The canonical caller scenario: a string viewed through the root type.

mod common;

use byhand::{AnyRef, Class, Error, Object, RuntimeString};

#[test]
fn test_hello_through_root_view() {
    let hello_hash = 31 * (31 * (31 * (31 * 72 + 101) + 108) + 108) + 111;

    // val s: String = new String("Hello")
    let s = RuntimeString::new("Hello");

    // val a: Any = s
    let a: AnyRef = s.as_any();

    assert_eq!(a.hash_code(), hello_hash);
    assert_eq!(s.hash_code(), hello_hash);

    // val s2: String = a.toString()
    let s2 = a.to_string();
    assert!(s2.equals(s));
    assert_eq!(s2.as_str(), "Hello");

    assert_eq!(s.length(), 5);
    assert_eq!(s.char_at(0), Ok('H'));
}

#[test]
fn test_to_string_round_trip() {
    for &text in common::SAMPLE_TEXTS {
        let original = RuntimeString::new(text);
        let fresh = RuntimeString::new(text);

        assert!(original.to_string().equals(fresh), "round trip failed for {text:?}");
    }
}

#[test]
fn test_char_at_bounds_on_five_chars() {
    let s = RuntimeString::new("Hello");

    for (i, expected) in "Hello".chars().enumerate() {
        assert_eq!(s.char_at(i as i32), Ok(expected));
    }

    let err = s.char_at(5).unwrap_err();
    assert_eq!(err, Error::IndexOutOfBounds { index: 5, text: "Hello".to_string() });
    assert_eq!(err.to_string(), "Index 5 out of bounds for string Hello");

    assert!(matches!(s.char_at(-1), Err(Error::IndexOutOfBounds { index: -1, .. })));
}

#[test]
fn test_is_instance_matrix() {
    let s = RuntimeString::new("Hello");
    let bare = AnyRef::new();

    assert!(RuntimeString::class().is_instance(s));
    assert!(!RuntimeString::class().is_instance(bare));
    assert!(AnyRef::class().is_instance(s));
    assert!(AnyRef::class().is_instance(bare));
}

#[test]
fn test_root_to_string_uses_dispatched_parts() {
    let bare = AnyRef::new();
    let expected = format!("{}@{:x}", bare.get_class().name(), bare.hash_code());

    assert_eq!(bare.to_string().as_str(), expected);
    assert!(expected.starts_with("java.lang.Object@"));
}

#[test]
fn test_descriptor_strings() {
    let s = RuntimeString::new("Hello");

    assert_eq!(s.get_class().to_string().as_str(), "class java.lang.String");
    assert_eq!(s.get_class().get_name().as_str(), "java.lang.String");
    assert_eq!(
        s.get_class().get_superclass().map(Class::name),
        Some("java.lang.Object")
    );
    assert_eq!(AnyRef::class().get_superclass(), None);
}
