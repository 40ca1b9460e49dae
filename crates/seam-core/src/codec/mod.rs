//! Reading source images and writing merged results.

pub mod decoder;
pub mod encoder;
