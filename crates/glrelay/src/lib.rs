//! Deferred execution of recorded GL command queues.
//!
//! A producer records resource-creation work as [`InitStep`]s and per-frame
//! work as [`RenderStep`]s (render passes, copies, blits, readbacks), then
//! hands each batch to a [`QueueRunner`] on the thread that owns the device
//! context. The runner replays the batch in order, exactly once, against a
//! [`GlDevice`] — a real driver binding, or the recording [`TraceDevice`]
//! used by this crate's tests.
//!
//! Device differences are described once in [`DeviceCaps`]; every
//! capability-gated path (copy-image, framebuffer blits, image readbacks,
//! dual-source fragment outputs) re-checks them at execution time, so one
//! recorded stream degrades gracefully on a lesser device instead of
//! failing.

mod caps;
mod cmd;
mod convert;
mod device;
mod resource;
mod runner;
mod trace;

pub use caps::{DeviceCaps, GlApi};
pub use cmd::{InitStep, Payload, RenderCommand, RenderStep, UniformRef};
pub use convert::{
    pack_rgba8_to_r4g4b4a4, pack_rgba8_to_r5g5b5a1, pack_rgba8_to_r5g6b5, swizzle_rgba8_to_bgra8,
    unpack_rgba8,
};
pub use device::{
    AspectMask, AttribType, BlendFactor, BlendOp, BlitFilter, BufferName, BufferTarget,
    BufferUsageHint, ColorWriteMask, CompareFunc, CopyImageRegion, CullFace, DataFormat, Feature,
    FramebufferName, FramebufferTarget, FrontFace, GlDevice, ImageHandle, IndexFormat, Offset2D,
    Primitive, ProgramName, Rect2D, RenderbufferName, ShaderName, ShaderStage, StencilOp,
    TextureFilter, TextureName, TextureTarget, TextureWrap, VertexArrayName, ViewportRect,
};
pub use resource::{
    AttribSemantic, Buffer, BufferId, Framebuffer, FramebufferId, InputLayout, InputLayoutEntry,
    InputLayoutId, Program, ProgramId, Resources, Shader, ShaderId, Texture, TextureId,
    UniformInitializer, UniformQuery,
};
pub use runner::{QueueRunner, RunnerError};
pub use trace::{DeviceCall, TraceDevice};
