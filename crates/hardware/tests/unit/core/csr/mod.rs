//! # CSR File Tests
