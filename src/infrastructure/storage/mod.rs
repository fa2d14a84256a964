//! Storage adapters

pub mod datalake;

pub use datalake::DataLakeStore;
