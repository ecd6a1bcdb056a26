// Common test utilities for integration tests
//
// Shared inputs and reference values used across the integration tests.

#![allow(dead_code)]

use byhand::{AnyRef, Class, Object, RuntimeString};

/// Texts exercised by the property-style tests.
pub const SAMPLE_TEXTS: &[&str] = &[
    "",
    "a",
    "Hello",
    "hello",
    "Hello ",
    "java.lang.Object",
    "class java.lang.String",
    "polygenelubricants",
    "The quick brown fox jumps over the lazy dog",
    "tab\tand\nnewline",
    "naïve café",
    "日本語テキスト",
    "0123456789",
    "a\u{1F600}",
    "emoji \u{1F680} and \u{1D11E}",
];

/// The classic string hash over UTF-16 code units, computed independently
/// of the runtime.
pub fn reference_hash(text: &str) -> i32 {
    let units: Vec<u16> = text.encode_utf16().collect();
    let mut hash: u32 = 0;
    for unit in units {
        hash = hash.wrapping_mul(31).wrapping_add(u32::from(unit));
    }
    hash as i32
}

/// Texts paired with hash values published for the classic string hash.
pub const KNOWN_HASHES: &[(&str, i32)] = &[
    ("", 0),
    ("Hello", 69_609_650),
    ("polygenelubricants", i32::MIN),
    ("a\u{1F600}", 1_866_116),
];

/// One object of every runtime type, viewed as the root type.
pub fn one_of_each() -> Vec<AnyRef> {
    vec![
        AnyRef::new(),
        RuntimeString::new("sample").as_any(),
        Class::class().as_any(),
        RuntimeString::class().as_any(),
        AnyRef::class().as_any(),
    ]
}
