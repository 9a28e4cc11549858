//! Test-only crate. The integration scenarios live in `tests/`.
