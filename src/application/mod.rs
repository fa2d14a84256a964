//! Application layer - Use cases and port interfaces
//!
//! Contains the core business operations and trait definitions
//! for external system interactions.

pub mod batch;
pub mod ports;

// Re-export use cases
pub use batch::{
    BatchAnalysisUseCase, BatchCallbacks, BatchError, BatchInput, BatchOutput, BatchPhase,
    CancelHandle, SkippedResult,
};
