#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

#[doc(inline)]
pub use sitk_process as process;

#[doc(inline)]
pub use sitk_transform as transform;

/// Error types for the filters.
pub mod error;

/// Executable operations built on process objects.
pub mod filter;

pub use crate::error::FilterError;
pub use crate::filter::TransformPointsFilter;
