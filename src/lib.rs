// Encoding, packing and reference math for dot-product accelerator fixtures
pub mod error;
pub mod dtype;
pub mod codec;
pub mod pack;
pub mod row;
pub mod sampler;
pub mod reference;
pub mod case;
pub mod fixture;

pub use case::{GenParams, TestCase, Variant};
pub use dtype::DataType;
pub use error::{DotgenError, Result};
pub use row::Row;
