//! Job API adapters

pub mod sarvam;

pub use sarvam::SarvamJobApi;
