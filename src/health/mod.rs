//! Host health sampling.
//!
//! # Data Flow
//! ```text
//! HealthSampler (background task)
//!     → CpuProbe (sysinfo)
//!     → MetricsRegistry CPU gauge
//!     → AlertEvaluator on dashboard queries
//! ```

pub mod sampler;

pub use sampler::{CpuProbe, HealthSampler, SystemCpuProbe};
