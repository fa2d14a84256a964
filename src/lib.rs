//! BatchScribe - batch call-analytics CLI
//!
//! This crate submits batches of audio files to the Sarvam AI
//! call-analytics job API, uploads them to the SAS-scoped storage
//! location the API designates, polls the job to completion, then
//! downloads and parses the JSON result files.
//!
//! # Architecture
//!
//! The crate follows hexagonal (ports & adapters) architecture:
//!
//! - **Domain**: Core value objects, entities, and errors
//! - **Application**: The batch use case and port interfaces (traits)
//! - **Infrastructure**: Adapter implementations (job API, Data Lake store, config)
//! - **CLI**: Command-line interface, argument parsing, and output formatting

pub mod application;
pub mod cli;
pub mod domain;
pub mod infrastructure;
