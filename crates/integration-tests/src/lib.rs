//! Cross-crate tests for faultline live in `tests/`
