//! Common utilities and types shared by every part of the reference model.
//!
//! This module provides the fundamental building blocks used across the engine. It includes:
//! 1. **Address Types:** Strong types for virtual and physical addresses.
//! 2. **Constants:** Paging geometry, instruction sizes, and cause-register layout.
//! 3. **Memory Access:** Classification of memory operations (Fetch/Read/Write).
//! 4. **Error Handling:** Trap representations, configuration and engine errors.
//! 5. **Register Width:** XLEN-dependent extension rules.

/// Address type definitions (physical and virtual addresses).
pub mod addr;

/// Common constants used throughout the model.
pub mod constants;

/// Memory access type definitions.
pub mod data;

/// Error types and trap definitions.
pub mod error;

/// Register width handling (sign/zero extension, cause layout).
pub mod xlen;

pub use addr::{PhysAddr, VirtAddr};
pub use constants::{PAGE_SHIFT, PAGE_SIZE};
pub use data::AccessType;
pub use error::{ConfigError, SimError, Trap};
pub use xlen::Xlen;
