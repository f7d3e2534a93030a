//! The device boundary: handle newtypes, semantic GL state enums and the
//! [`GlDevice`] trait the runner issues every call through.
//!
//! The enums here are intentionally "semantic" (not the raw GL constants) so
//! the step/command vocabulary stays independent of any particular function
//! loader. A real backend maps each method onto the matching GL entry point;
//! the in-crate [`TraceDevice`](crate::TraceDevice) records the calls instead.

use bitflags::bitflags;

/// Device texture object name. `None` in a binding position means name 0.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TextureName(pub u32);

/// Device buffer object name.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BufferName(pub u32);

/// Device shader object name.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ShaderName(pub u32);

/// Device program object name.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ProgramName(pub u32);

/// Device vertex array object name.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct VertexArrayName(pub u32);

/// Device framebuffer object name.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FramebufferName(pub u32);

/// Device renderbuffer object name.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RenderbufferName(pub u32);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TextureTarget {
    Texture2d,
    TextureCube,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BufferTarget {
    /// Vertex data (`GL_ARRAY_BUFFER`).
    Array,
    /// Index data (`GL_ELEMENT_ARRAY_BUFFER`).
    ElementArray,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BufferUsageHint {
    StaticDraw,
    DynamicDraw,
    StreamDraw,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

/// Toggleable device features (`glEnable`/`glDisable` capabilities).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Feature {
    DepthTest,
    StencilTest,
    Blend,
    ScissorTest,
    CullFace,
    Dither,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CompareFunc {
    Never,
    Less,
    Equal,
    LessEqual,
    Greater,
    NotEqual,
    GreaterEqual,
    Always,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BlendOp {
    Add,
    Subtract,
    ReverseSubtract,
    Min,
    Max,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BlendFactor {
    Zero,
    One,
    SrcColor,
    OneMinusSrcColor,
    DstColor,
    OneMinusDstColor,
    SrcAlpha,
    OneMinusSrcAlpha,
    DstAlpha,
    OneMinusDstAlpha,
    ConstantColor,
    OneMinusConstantColor,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StencilOp {
    Keep,
    Zero,
    Replace,
    IncrementClamp,
    DecrementClamp,
    Invert,
    IncrementWrap,
    DecrementWrap,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CullFace {
    Front,
    Back,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FrontFace {
    Cw,
    Ccw,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TextureWrap {
    ClampToEdge,
    Repeat,
    MirroredRepeat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TextureFilter {
    Nearest,
    Linear,
    NearestMipmapNearest,
    LinearMipmapNearest,
    NearestMipmapLinear,
    LinearMipmapLinear,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Primitive {
    Points,
    Lines,
    LineStrip,
    Triangles,
    TriangleStrip,
    TriangleFan,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum IndexFormat {
    Uint16,
    Uint32,
}

/// Component type of one vertex attribute. The normalize flag travels
/// separately in the input-layout entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AttribType {
    F32,
    U8,
    I8,
    U16,
    I16,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BlitFilter {
    Nearest,
    Linear,
}

/// Framebuffer binding points. `ReadDraw` is the combined `GL_FRAMEBUFFER`
/// binding; `Read`/`Draw` bind one side only (used by blits and readbacks).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FramebufferTarget {
    ReadDraw,
    Read,
    Draw,
}

/// Pixel formats the runner uploads or converts to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DataFormat {
    Rgba8,
    Bgra8,
    /// 16-bit packed, red in the top five bits.
    R5G6B5,
    R5G5B5A1,
    R4G4B4A4,
    /// Single-channel, 8 bits (glyph atlases and similar).
    R8,
}

impl DataFormat {
    pub fn bytes_per_pixel(self) -> usize {
        match self {
            DataFormat::Rgba8 | DataFormat::Bgra8 => 4,
            DataFormat::R5G6B5 | DataFormat::R5G5B5A1 | DataFormat::R4G4B4A4 => 2,
            DataFormat::R8 => 1,
        }
    }
}

bitflags! {
    /// Selects color/depth/stencil aspects, both as a clear mask and as the
    /// aspect of an inter-framebuffer transfer.
    #[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
    pub struct AspectMask: u32 {
        const COLOR = 1 << 0;
        const DEPTH = 1 << 1;
        const STENCIL = 1 << 2;
    }
}

/// Per-channel color write mask, low four bits = RGBA.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ColorWriteMask(pub u8);

impl ColorWriteMask {
    pub const NONE: Self = Self(0);
    pub const ALL: Self = Self(0xF);

    pub fn r(self) -> bool {
        self.0 & 1 != 0
    }

    pub fn g(self) -> bool {
        self.0 & 2 != 0
    }

    pub fn b(self) -> bool {
        self.0 & 4 != 0
    }

    pub fn a(self) -> bool {
        self.0 & 8 != 0
    }
}

/// Integer rectangle, top-left origin as recorded by the producer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Rect2D {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Rect2D {
    pub fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Offset2D {
    pub x: i32,
    pub y: i32,
}

impl Offset2D {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Floating-point viewport rectangle plus depth range, top-left origin.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewportRect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
    pub min_z: f32,
    pub max_z: f32,
}

/// One side of a copy-image transfer: either a texture level or a
/// renderbuffer (depth/stencil attachments are renderbuffers here).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ImageHandle {
    Texture2d(TextureName),
    Renderbuffer(RenderbufferName),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CopyImageRegion {
    pub image: ImageHandle,
    pub level: u32,
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

/// Synchronous boundary between the queue runner and the GL driver.
///
/// Every method maps onto one driver entry point (or one tightly related
/// group of parameter sets) and must execute immediately on the calling
/// thread; the runner assumes it already runs on the context thread.
/// `Option<..Name>` binding arguments bind object name 0 when `None`.
///
/// Implementations may be a real function-loader binding or the in-crate
/// [`TraceDevice`](crate::TraceDevice), which records calls for inspection.
pub trait GlDevice {
    // Limits and process-lifetime objects.

    /// Best-effort query of the maximum anisotropic filtering level.
    fn max_texture_anisotropy(&mut self) -> f32;
    fn gen_vertex_array(&mut self) -> VertexArrayName;
    fn delete_vertex_array(&mut self, vao: VertexArrayName);
    fn bind_vertex_array(&mut self, vao: Option<VertexArrayName>);

    // Textures.

    /// Generates `count` fresh texture names in one driver round-trip.
    fn gen_textures(&mut self, count: u32) -> Vec<TextureName>;
    fn gen_texture(&mut self) -> TextureName {
        let mut names = self.gen_textures(1);
        names.pop().expect("gen_textures(1) returned no name")
    }
    fn delete_textures(&mut self, names: &[TextureName]);
    fn active_texture(&mut self, slot: u32);
    fn bind_texture(&mut self, target: TextureTarget, name: Option<TextureName>);
    /// Allocates (and optionally fills) one mip level. `None` data leaves the
    /// level contents undefined.
    fn tex_image_2d(
        &mut self,
        target: TextureTarget,
        level: u32,
        format: DataFormat,
        width: u32,
        height: u32,
        data: Option<&[u8]>,
    );
    #[allow(clippy::too_many_arguments)]
    fn tex_sub_image_2d(
        &mut self,
        target: TextureTarget,
        level: u32,
        x: u32,
        y: u32,
        width: u32,
        height: u32,
        format: DataFormat,
        data: &[u8],
    );
    fn tex_wrap(&mut self, target: TextureTarget, wrap_s: TextureWrap, wrap_t: TextureWrap);
    fn tex_filter(&mut self, target: TextureTarget, mag: TextureFilter, min: TextureFilter);
    fn tex_max_anisotropy(&mut self, target: TextureTarget, level: f32);
    fn generate_mipmap(&mut self, target: TextureTarget);

    // Buffers.

    fn gen_buffer(&mut self) -> BufferName;
    fn bind_buffer(&mut self, target: BufferTarget, name: Option<BufferName>);
    /// Allocates `size` bytes of backing storage with undefined contents.
    fn buffer_data_uninit(&mut self, target: BufferTarget, size: usize, usage: BufferUsageHint);
    fn buffer_sub_data(&mut self, target: BufferTarget, offset: usize, data: &[u8]);

    // Shaders and programs.

    fn create_shader(&mut self, stage: ShaderStage) -> ShaderName;
    fn shader_source(&mut self, shader: ShaderName, source: &[u8]);
    /// Compiles the shader. `Err` carries the driver's info log (possibly
    /// empty).
    fn compile_shader(&mut self, shader: ShaderName) -> Result<(), String>;
    fn delete_shader(&mut self, shader: ShaderName);
    fn create_program(&mut self) -> ProgramName;
    fn attach_shader(&mut self, program: ProgramName, shader: ShaderName);
    fn bind_attrib_location(&mut self, program: ProgramName, location: u32, name: &str);
    fn bind_frag_data_location(&mut self, program: ProgramName, color: u32, name: &str);
    fn bind_frag_data_location_indexed(
        &mut self,
        program: ProgramName,
        color: u32,
        index: u32,
        name: &str,
    );
    /// Links the program. `Err` carries the driver's link log (possibly
    /// empty).
    fn link_program(&mut self, program: ProgramName) -> Result<(), String>;
    fn use_program(&mut self, program: ProgramName);
    /// Resolves a uniform name to a location; -1 when the uniform is absent.
    fn uniform_location(&mut self, program: ProgramName, name: &str) -> i32;
    /// Uploads 1-4 float components to `location`.
    fn uniform_f32(&mut self, location: i32, values: &[f32]);
    /// Uploads 1-4 integer components to `location`.
    fn uniform_i32(&mut self, location: i32, values: &[i32]);
    fn uniform_matrix4(&mut self, location: i32, values: &[f32; 16]);

    // Fixed-function state.

    fn enable(&mut self, feature: Feature);
    fn disable(&mut self, feature: Feature);
    fn depth_mask(&mut self, write: bool);
    fn depth_func(&mut self, func: CompareFunc);
    fn depth_range(&mut self, min: f32, max: f32);
    fn blend_equation_separate(&mut self, color: BlendOp, alpha: BlendOp);
    fn blend_func_separate(
        &mut self,
        src_color: BlendFactor,
        dst_color: BlendFactor,
        src_alpha: BlendFactor,
        dst_alpha: BlendFactor,
    );
    fn blend_color(&mut self, color: [f32; 4]);
    fn color_mask(&mut self, mask: ColorWriteMask);
    fn clear_color(&mut self, color: [f32; 4]);
    fn clear_depth(&mut self, depth: f32);
    fn clear_stencil(&mut self, stencil: u8);
    fn clear(&mut self, mask: AspectMask);
    fn viewport(&mut self, x: i32, y: i32, w: i32, h: i32);
    fn scissor(&mut self, x: i32, y: i32, w: i32, h: i32);
    fn stencil_func(&mut self, func: CompareFunc, reference: u8, compare_mask: u8);
    fn stencil_op(&mut self, stencil_fail: StencilOp, depth_fail: StencilOp, pass: StencilOp);
    fn stencil_mask(&mut self, write_mask: u8);
    fn front_face(&mut self, winding: FrontFace);
    fn cull_face(&mut self, face: CullFace);

    // Vertex input.

    fn enable_vertex_attrib(&mut self, location: u32);
    fn disable_vertex_attrib(&mut self, location: u32);
    #[allow(clippy::too_many_arguments)]
    fn vertex_attrib_pointer(
        &mut self,
        location: u32,
        count: u8,
        ty: AttribType,
        normalized: bool,
        stride: u32,
        offset: usize,
    );

    // Draws.

    fn draw_arrays(&mut self, mode: Primitive, first: u32, count: u32);
    fn draw_elements(&mut self, mode: Primitive, count: u32, format: IndexFormat, offset: usize);

    // Framebuffers and renderbuffers.

    fn gen_framebuffer(&mut self) -> FramebufferName;
    fn bind_framebuffer(&mut self, target: FramebufferTarget, name: Option<FramebufferName>);
    /// Attaches a 2D texture as color attachment 0 of the bound framebuffer.
    fn framebuffer_color_texture(&mut self, texture: TextureName);
    fn gen_renderbuffer(&mut self) -> RenderbufferName;
    fn bind_renderbuffer(&mut self, name: Option<RenderbufferName>);
    /// Allocates combined depth24+stencil8 storage for the bound renderbuffer.
    fn renderbuffer_storage_depth_stencil(&mut self, width: u32, height: u32);
    /// Attaches a renderbuffer as the bound framebuffer's depth-stencil.
    fn framebuffer_depth_stencil_renderbuffer(&mut self, renderbuffer: RenderbufferName);
    /// Completeness check of the bound framebuffer.
    fn framebuffer_complete(&mut self) -> bool;
    fn blit_framebuffer(
        &mut self,
        src: Rect2D,
        dst: Rect2D,
        mask: AspectMask,
        filter: BlitFilter,
    );

    // Copies and readbacks.

    /// Region copy through the cross-vendor copy-image path.
    fn copy_image_sub_data(
        &mut self,
        src: CopyImageRegion,
        dst: CopyImageRegion,
        width: i32,
        height: i32,
        depth: i32,
    );
    /// Region copy through the vendor fallback entry point.
    fn copy_image_sub_data_vendor(
        &mut self,
        src: CopyImageRegion,
        dst: CopyImageRegion,
        width: i32,
        height: i32,
        depth: i32,
    );
    fn set_pack_alignment(&mut self, alignment: u32);
    /// Reads a rectangle of the read framebuffer as tightly packed RGBA8.
    /// `dst` must hold exactly `width * height * 4` bytes.
    fn read_pixels_rgba8(&mut self, x: i32, y: i32, width: u32, height: u32, dst: &mut [u8]);
    /// Queries the dimensions of one mip level of the bound texture.
    fn tex_level_size(&mut self, target: TextureTarget, level: u32) -> (u32, u32);
    /// Fetches a whole mip level of the bound texture as tightly packed
    /// RGBA8. `dst` must hold exactly `level_w * level_h * 4` bytes.
    fn get_tex_image_rgba8(&mut self, target: TextureTarget, level: u32, dst: &mut [u8]);
}
