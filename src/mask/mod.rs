//! Mask operations, the coverage raster and the compositing pipeline

/// Seven-pass compositor replaying the op log onto a surface
pub mod compositor;
/// Tagged mask operations and the op log
pub mod ops;
/// Coverage raster with paint and erase blending
pub mod surface;

pub use compositor::MaskCompositor;
pub use ops::{MaskOp, MaskOpKind, MaskOpLog};
pub use surface::{BlendMode, MaskSurface};
