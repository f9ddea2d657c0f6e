pub mod meter;
pub mod processor;
