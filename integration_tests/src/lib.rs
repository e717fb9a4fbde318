//! Cross-crate behaviour tests for the name/info workspace live in `tests/`.
