//! SpoutBridge GPU - render targets and GPU-side copies
//!
//! The pool and the frame loop only see the [`GpuBackend`] trait; the
//! wgpu implementation lives in [`WgpuBackend`].

pub mod backend;
pub mod context;
pub mod copy;
pub mod pool;
pub mod texture;
pub mod wgpu_backend;

pub use backend::{Flip, GpuBackend, RenderSurface};
pub use context::GpuContext;
pub use copy::CopyEngine;
pub use pool::{Allocation, RenderTargetPool, TargetSlot};
pub use texture::{texture_format, RenderTarget};
pub use wgpu_backend::WgpuBackend;
