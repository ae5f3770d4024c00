#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]
//!
//! A [`Transform`] maps physical points and is described by two parameter
//! vectors whose lengths depend on its [`TransformKind`] and dimension. The
//! vectors live in a [`TransformParameterStore`] built on [`CowValue`], so
//! copies of a transform are cheap and independent.

/// Affine transforms with composition helpers.
pub mod affine;

/// Shared values with copy-on-write semantics.
pub mod cow;

/// Error types for the transform module.
pub mod error;

/// Rotations by Euler angles.
pub mod euler;

/// Image grids and displacement fields.
pub mod geometry;

/// Transform kinds and their parameter layouts.
pub mod kind;

mod ops;

/// Parameter storage of a transform.
pub mod parameters;

/// The generic transform.
pub mod transform;

/// Translations.
pub mod translation;

pub use crate::affine::AffineTransform;
pub use crate::cow::CowValue;
pub use crate::error::TransformError;
pub use crate::euler::Euler3DTransform;
pub use crate::geometry::{DisplacementField, ImageGeometry};
pub use crate::kind::{ParameterLayout, TransformKind};
pub use crate::parameters::TransformParameterStore;
pub use crate::transform::Transform;
pub use crate::translation::TranslationTransform;
