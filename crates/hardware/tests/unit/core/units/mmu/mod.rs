//! # MMU Tests
