//! Host architecture detection for the vectorized dense path

use crate::constants::*;

/// The SIMD family the host offers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Architecture {
    /// Intel/AMD x86_64 with AVX-512 support
    X86WithAVX512,
    /// Intel/AMD x86_64 without AVX-512 support
    X86WithoutAVX512,
    /// ARM architecture with NEON support
    ArmNeon,
    /// Generic implementation for any architecture
    Generic,
}

impl Architecture {
    /// Check if this architecture has SIMD support
    pub fn has_simd_support(&self) -> bool {
        !matches!(self, Architecture::Generic)
    }

    /// Get the vector width in bytes for this architecture
    pub fn vector_width_bytes(&self) -> usize {
        match self {
            Architecture::X86WithAVX512 => AVX512_VECTOR_WIDTH_BYTES,
            Architecture::X86WithoutAVX512 => AVX2_VECTOR_WIDTH_BYTES,
            Architecture::ArmNeon => NEON_VECTOR_WIDTH_BYTES,
            Architecture::Generic => SCALAR_VECTOR_WIDTH_BYTES,
        }
    }

    /// Number of `f64` lanes in one vector register
    pub fn f64_lanes(&self) -> usize {
        (self.vector_width_bytes() / std::mem::size_of::<f64>()).max(1)
    }
}

/// Detects the current CPU architecture
pub fn detect_architecture() -> Architecture {
    #[cfg(target_arch = "x86_64")]
    {
        #[cfg(target_feature = "avx512f")]
        {
            return Architecture::X86WithAVX512;
        }
        #[cfg(not(target_feature = "avx512f"))]
        {
            if std::is_x86_feature_detected!("avx512f") {
                return Architecture::X86WithAVX512;
            } else {
                return Architecture::X86WithoutAVX512;
            }
        }
    }

    #[cfg(target_arch = "aarch64")]
    {
        return Architecture::ArmNeon;
    }

    #[allow(unreachable_code)]
    Architecture::Generic
}
