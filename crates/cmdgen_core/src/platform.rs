//! Platform Layout Rules
//!
//! The rules the layout compiler shares with both target compilers: how wide
//! a reference id is, how far alignment may go, and the minimum packing
//! boundary of a record.
//!
//! ```rust,ignore
//! use cmdgen_core::Platform;
//!
//! // 64-bit consumer (default)
//! let platform = Platform::default();
//!
//! // 32-bit consumer: 4-byte handles, 4-byte alignment ceiling
//! let platform = Platform::X86;
//! ```

use serde::{Deserialize, Serialize};

use crate::errors::{CodegenError, Result};

/// Widest reference id any target can express as a scalar.
pub const MAX_HANDLE_SIZE: u32 = 8;

/// Default packing floor of both target compilers. A record is never packed
/// tighter than this.
pub const MIN_STRUCT_ALIGNMENT: u32 = 4;

/// Alignment ceilings the two target compilers agree on.
pub const SUPPORTED_MAX_ALIGNMENTS: [u32; 2] = [4, 8];

/// Layout rules for one consumer platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct Platform {
    /// Largest alignment any field may require (the platform ceiling).
    pub max_alignment: u32,
    /// Lower bound of a record's packing boundary.
    pub min_struct_alignment: u32,
    /// Width of a reference id (`Handle` and `AnimationHandle` fields).
    pub handle_size: u32,
}

impl Platform {
    /// 64-bit consumer: 8-byte handles, 8-byte ceiling.
    pub const X64: Self = Self {
        max_alignment: 8,
        min_struct_alignment: 4,
        handle_size: 8,
    };

    /// 32-bit consumer: 4-byte handles, 4-byte ceiling.
    pub const X86: Self = Self {
        max_alignment: 4,
        min_struct_alignment: 4,
        handle_size: 4,
    };

    /// Checks that the rules are internally consistent.
    pub fn validate(&self) -> Result<()> {
        for (what, value) in [
            ("max_alignment", self.max_alignment),
            ("min_struct_alignment", self.min_struct_alignment),
            ("handle_size", self.handle_size),
        ] {
            if !value.is_power_of_two() {
                return Err(CodegenError::InvalidPlatform(format!(
                    "{what} must be a non-zero power of two, got {value}"
                )));
            }
        }
        if !SUPPORTED_MAX_ALIGNMENTS.contains(&self.max_alignment) {
            return Err(CodegenError::InvalidPlatform(format!(
                "max_alignment must be one of {SUPPORTED_MAX_ALIGNMENTS:?}, got {}",
                self.max_alignment
            )));
        }
        if self.min_struct_alignment < MIN_STRUCT_ALIGNMENT {
            return Err(CodegenError::InvalidPlatform(format!(
                "min_struct_alignment ({}) is below the target packing floor of {MIN_STRUCT_ALIGNMENT}",
                self.min_struct_alignment
            )));
        }
        if self.min_struct_alignment > self.max_alignment {
            return Err(CodegenError::InvalidPlatform(format!(
                "min_struct_alignment ({}) exceeds max_alignment ({})",
                self.min_struct_alignment, self.max_alignment
            )));
        }
        if self.handle_size > MAX_HANDLE_SIZE {
            return Err(CodegenError::InvalidPlatform(format!(
                "handle_size ({}) exceeds {MAX_HANDLE_SIZE} bytes",
                self.handle_size
            )));
        }
        if self.handle_size > self.max_alignment {
            return Err(CodegenError::InvalidPlatform(format!(
                "handle_size ({}) exceeds max_alignment ({})",
                self.handle_size, self.max_alignment
            )));
        }
        Ok(())
    }

    /// Packing boundary for a record whose widest field alignment is `observed`.
    #[inline]
    #[must_use]
    pub fn struct_alignment(&self, observed: u32) -> u32 {
        observed.max(self.min_struct_alignment)
    }
}

impl Default for Platform {
    #[inline]
    fn default() -> Self {
        Self::X64
    }
}
