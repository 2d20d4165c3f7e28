//! Assertion helpers for integration tests.

use std::path::Path;

/// Assert that a result is Ok and return the inner value.
#[allow(dead_code)]
pub fn assert_ok<T, E: std::fmt::Debug>(result: Result<T, E>, context: &str) -> T {
    match result {
        Ok(v) => v,
        Err(e) => panic!("{} failed: {:?}", context, e),
    }
}

/// Assert that a result is Err and return the error.
#[allow(dead_code)]
pub fn assert_err<T: std::fmt::Debug, E>(result: Result<T, E>, context: &str) -> E {
    match result {
        Ok(v) => panic!("{} should have failed but got: {:?}", context, v),
        Err(e) => e,
    }
}

/// Assert that an error message contains expected text (case-insensitive).
#[allow(dead_code)]
pub fn assert_error_contains<E: std::fmt::Display>(error: E, expected_text: &str, context: &str) {
    let error_str = error.to_string().to_lowercase();
    assert!(
        error_str.contains(&expected_text.to_lowercase()),
        "{}: error message should contain '{}', got: {}",
        context,
        expected_text,
        error
    );
}

/// Assert that a manifest file has exactly the bytes captured before, or is
/// still absent when `before` is `None`.
#[allow(dead_code)]
pub fn assert_manifest_unchanged(file: &Path, before: Option<&[u8]>, context: &str) {
    match before {
        Some(bytes) => {
            let after = std::fs::read(file)
                .unwrap_or_else(|e| panic!("{}: manifest unreadable: {}", context, e));
            assert!(after == bytes, "{}: manifest bytes changed", context);
        }
        None => assert!(!file.exists(), "{}: manifest was created", context),
    }
}
