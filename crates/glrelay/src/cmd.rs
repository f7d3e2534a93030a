//! The recorded step vocabulary: init steps, render steps, and the per-pass
//! render commands.
//!
//! Steps are data, not closures. The producer records them on its own thread
//! and the runner consumes each batch by value on the context thread, in
//! recorded order, exactly once. The enums are deliberately wildcard-free in
//! the runner's dispatch so a new step or command variant fails to compile
//! until every interpreter handles it.

use std::sync::Arc;

use crate::device::{
    AspectMask, BlendFactor, BlendOp, BlitFilter, ColorWriteMask, CompareFunc, CullFace,
    DataFormat, FrontFace, IndexFormat, Offset2D, Primitive, Rect2D, StencilOp, TextureFilter,
    TextureWrap, ViewportRect,
};
use crate::resource::{BufferId, FramebufferId, InputLayoutId, ProgramId, ShaderId, TextureId};

/// Bulk bytes attached to an upload step.
///
/// `Owned` transfers ownership into the step: the runner frees the allocation
/// immediately after the device call that consumes it, so peak memory during
/// replay is one payload, not the whole batch. `Shared` only drops the
/// runner's reference; other holders keep the allocation alive.
#[derive(Clone, Debug)]
pub enum Payload {
    Owned(Box<[u8]>),
    Shared(Arc<[u8]>),
}

impl Payload {
    pub fn bytes(&self) -> &[u8] {
        match self {
            Payload::Owned(data) => data,
            Payload::Shared(data) => data,
        }
    }

    pub fn len(&self) -> usize {
        self.bytes().len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes().is_empty()
    }
}

impl From<Vec<u8>> for Payload {
    fn from(data: Vec<u8>) -> Self {
        Payload::Owned(data.into_boxed_slice())
    }
}

impl From<Box<[u8]>> for Payload {
    fn from(data: Box<[u8]>) -> Self {
        Payload::Owned(data)
    }
}

impl From<Arc<[u8]>> for Payload {
    fn from(data: Arc<[u8]>) -> Self {
        Payload::Shared(data)
    }
}

/// How a uniform command names its target: a pre-registered query index
/// (fast path) or a name looked up in the bound program's query table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UniformRef {
    Query(usize),
    Name(String),
}

/// One-time resource creation and upload steps, replayed before any render
/// step of the same frame.
#[derive(Debug)]
pub enum InitStep {
    CreateTexture {
        texture: TextureId,
    },
    CreateBuffer {
        buffer: BufferId,
        size: usize,
    },
    BufferSubData {
        buffer: BufferId,
        offset: usize,
        data: Payload,
    },
    CreateShader {
        shader: ShaderId,
        source: Payload,
    },
    CreateProgram {
        program: ProgramId,
        shaders: Vec<ShaderId>,
        support_dual_source: bool,
    },
    CreateInputLayout {
        input_layout: InputLayoutId,
    },
    CreateFramebuffer {
        framebuffer: FramebufferId,
    },
    TextureImage {
        texture: TextureId,
        level: u32,
        format: DataFormat,
        width: u32,
        height: u32,
        data: Option<Payload>,
        linear_filter: bool,
    },
    TextureSubData {
        texture: TextureId,
        level: u32,
        x: u32,
        y: u32,
        width: u32,
        height: u32,
        format: DataFormat,
        data: Payload,
    },
}

/// Top-level render work: passes and inter-resource transfers.
#[derive(Debug)]
pub enum RenderStep {
    /// A render pass against `framebuffer`, or the backbuffer when `None`.
    Render {
        framebuffer: Option<FramebufferId>,
        commands: Vec<RenderCommand>,
    },
    /// Region copy between two offscreen framebuffers via the copy-image
    /// paths. `aspect` selects exactly one of color or depth.
    Copy {
        src: FramebufferId,
        dst: FramebufferId,
        src_rect: Rect2D,
        dst_pos: Offset2D,
        aspect: AspectMask,
    },
    /// Stretching blit between two offscreen framebuffers, with independent
    /// source and destination rectangles.
    Blit {
        src: FramebufferId,
        dst: FramebufferId,
        src_rect: Rect2D,
        dst_rect: Rect2D,
        aspect: AspectMask,
        filter: BlitFilter,
    },
    /// Synchronous pixel readback into the runner's staging buffer.
    Readback {
        framebuffer: Option<FramebufferId>,
        src_rect: Rect2D,
        aspect: AspectMask,
    },
    /// Synchronous readback of a texture mip level region (desktop only).
    ReadbackImage {
        texture: TextureId,
        mip_level: u32,
        src_rect: Rect2D,
    },
}

/// Commands inside a render pass. Rectangles arrive top-left origin; the
/// runner flips `Viewport` and `Scissor` only when the pass targets the
/// backbuffer.
#[derive(Debug)]
pub enum RenderCommand {
    DepthTest {
        enabled: bool,
        write: bool,
        func: CompareFunc,
    },
    Blend {
        enabled: bool,
        op_color: BlendOp,
        op_alpha: BlendOp,
        src_color: BlendFactor,
        dst_color: BlendFactor,
        src_alpha: BlendFactor,
        dst_alpha: BlendFactor,
        mask: ColorWriteMask,
    },
    /// `color` is packed RGBA8, red in the low byte.
    Clear {
        color: u32,
        depth: f32,
        stencil: u8,
        mask: AspectMask,
    },
    BlendColor {
        color: [f32; 4],
    },
    Viewport {
        rect: ViewportRect,
    },
    Scissor {
        rect: Rect2D,
    },
    /// Uploads `count` (1-4) components from the front of `values`.
    UniformF32 {
        uniform: UniformRef,
        count: u8,
        values: [f32; 4],
    },
    UniformI32 {
        uniform: UniformRef,
        count: u8,
        values: [i32; 4],
    },
    UniformMatrix4 {
        uniform: UniformRef,
        values: [f32; 16],
    },
    StencilFunc {
        enabled: bool,
        func: CompareFunc,
        reference: u8,
        compare_mask: u8,
    },
    StencilOp {
        stencil_fail: StencilOp,
        depth_fail: StencilOp,
        pass: StencilOp,
        write_mask: u8,
    },
    BindTexture {
        slot: u32,
        texture: Option<TextureId>,
    },
    BindProgram {
        program: ProgramId,
    },
    /// Reconciles enabled attribute arrays with the layout's mask, then
    /// points every entry at the bound vertex buffer plus `offset`.
    BindInputLayout {
        input_layout: InputLayoutId,
        offset: usize,
    },
    BindVertexBuffer {
        buffer: Option<BufferId>,
    },
    BindIndexBuffer {
        buffer: Option<BufferId>,
    },
    GenerateMipmap,
    Draw {
        mode: Primitive,
        first: u32,
        count: u32,
    },
    DrawIndexed {
        mode: Primitive,
        count: u32,
        format: IndexFormat,
        offset: usize,
        instances: u32,
    },
    TextureSampler {
        wrap_s: TextureWrap,
        wrap_t: TextureWrap,
        mag_filter: TextureFilter,
        min_filter: TextureFilter,
        /// 0.0 leaves anisotropy untouched.
        anisotropy: f32,
    },
    Raster {
        cull_enable: bool,
        cull_face: CullFace,
        front_face: FrontFace,
        dither: bool,
    },
}
