//! Compressed (C) extension.
//!
//! RVC parcels are expanded to their 32-bit equivalents before decoding, so the
//! executor only ever sees full-width encodings.

/// Quadrant and slot numbers.
pub mod constants;

/// 16-bit to 32-bit expansion.
pub mod expand;
