//! A [`GlDevice`] that records every call instead of touching a driver.
//!
//! [`TraceDevice`] hands out object names sequentially from 1 per kind, so a
//! test can predict which names a replay will produce and assert on the
//! recorded [`DeviceCall`] sequence. Failure injection (compile/link logs,
//! missing uniforms, incomplete framebuffers) is keyed on those predictable
//! names.

use std::collections::{HashMap, HashSet};

use crate::device::{
    AspectMask, AttribType, BlendFactor, BlendOp, BlitFilter, BufferName, BufferTarget,
    BufferUsageHint, ColorWriteMask, CompareFunc, CopyImageRegion, CullFace, DataFormat, Feature,
    FramebufferName, FramebufferTarget, FrontFace, GlDevice, IndexFormat, Primitive, ProgramName,
    Rect2D, RenderbufferName, ShaderName, ShaderStage, StencilOp, TextureFilter, TextureName,
    TextureTarget, TextureWrap, VertexArrayName,
};

/// One recorded device call. Variants mirror the [`GlDevice`] methods;
/// borrowed arguments are copied so the record outlives the call.
#[derive(Clone, Debug, PartialEq)]
pub enum DeviceCall {
    MaxTextureAnisotropy,
    GenVertexArray,
    DeleteVertexArray {
        vao: VertexArrayName,
    },
    BindVertexArray {
        vao: Option<VertexArrayName>,
    },
    GenTextures {
        count: u32,
    },
    DeleteTextures {
        names: Vec<TextureName>,
    },
    ActiveTexture {
        slot: u32,
    },
    BindTexture {
        target: TextureTarget,
        name: Option<TextureName>,
    },
    TexImage2d {
        target: TextureTarget,
        level: u32,
        format: DataFormat,
        width: u32,
        height: u32,
        data: Option<Vec<u8>>,
    },
    TexSubImage2d {
        target: TextureTarget,
        level: u32,
        x: u32,
        y: u32,
        width: u32,
        height: u32,
        format: DataFormat,
        data: Vec<u8>,
    },
    TexWrap {
        target: TextureTarget,
        wrap_s: TextureWrap,
        wrap_t: TextureWrap,
    },
    TexFilter {
        target: TextureTarget,
        mag: TextureFilter,
        min: TextureFilter,
    },
    TexMaxAnisotropy {
        target: TextureTarget,
        level: f32,
    },
    GenerateMipmap {
        target: TextureTarget,
    },
    GenBuffer,
    BindBuffer {
        target: BufferTarget,
        name: Option<BufferName>,
    },
    BufferDataUninit {
        target: BufferTarget,
        size: usize,
        usage: BufferUsageHint,
    },
    BufferSubData {
        target: BufferTarget,
        offset: usize,
        data: Vec<u8>,
    },
    CreateShader {
        stage: ShaderStage,
    },
    ShaderSource {
        shader: ShaderName,
        source: Vec<u8>,
    },
    CompileShader {
        shader: ShaderName,
    },
    DeleteShader {
        shader: ShaderName,
    },
    CreateProgram,
    AttachShader {
        program: ProgramName,
        shader: ShaderName,
    },
    BindAttribLocation {
        program: ProgramName,
        location: u32,
        name: String,
    },
    BindFragDataLocation {
        program: ProgramName,
        color: u32,
        name: String,
    },
    BindFragDataLocationIndexed {
        program: ProgramName,
        color: u32,
        index: u32,
        name: String,
    },
    LinkProgram {
        program: ProgramName,
    },
    UseProgram {
        program: ProgramName,
    },
    UniformLocation {
        program: ProgramName,
        name: String,
    },
    UniformF32 {
        location: i32,
        values: Vec<f32>,
    },
    UniformI32 {
        location: i32,
        values: Vec<i32>,
    },
    UniformMatrix4 {
        location: i32,
        values: [f32; 16],
    },
    Enable {
        feature: Feature,
    },
    Disable {
        feature: Feature,
    },
    DepthMask {
        write: bool,
    },
    DepthFunc {
        func: CompareFunc,
    },
    DepthRange {
        min: f32,
        max: f32,
    },
    BlendEquationSeparate {
        color: BlendOp,
        alpha: BlendOp,
    },
    BlendFuncSeparate {
        src_color: BlendFactor,
        dst_color: BlendFactor,
        src_alpha: BlendFactor,
        dst_alpha: BlendFactor,
    },
    BlendColor {
        color: [f32; 4],
    },
    ColorMask {
        mask: ColorWriteMask,
    },
    ClearColor {
        color: [f32; 4],
    },
    ClearDepth {
        depth: f32,
    },
    ClearStencil {
        stencil: u8,
    },
    Clear {
        mask: AspectMask,
    },
    Viewport {
        x: i32,
        y: i32,
        w: i32,
        h: i32,
    },
    Scissor {
        x: i32,
        y: i32,
        w: i32,
        h: i32,
    },
    StencilFunc {
        func: CompareFunc,
        reference: u8,
        compare_mask: u8,
    },
    StencilOp {
        stencil_fail: StencilOp,
        depth_fail: StencilOp,
        pass: StencilOp,
    },
    StencilMask {
        write_mask: u8,
    },
    FrontFace {
        winding: FrontFace,
    },
    CullFace {
        face: CullFace,
    },
    EnableVertexAttrib {
        location: u32,
    },
    DisableVertexAttrib {
        location: u32,
    },
    VertexAttribPointer {
        location: u32,
        count: u8,
        ty: AttribType,
        normalized: bool,
        stride: u32,
        offset: usize,
    },
    DrawArrays {
        mode: Primitive,
        first: u32,
        count: u32,
    },
    DrawElements {
        mode: Primitive,
        count: u32,
        format: IndexFormat,
        offset: usize,
    },
    GenFramebuffer,
    BindFramebuffer {
        target: FramebufferTarget,
        name: Option<FramebufferName>,
    },
    FramebufferColorTexture {
        texture: TextureName,
    },
    GenRenderbuffer,
    BindRenderbuffer {
        name: Option<RenderbufferName>,
    },
    RenderbufferStorageDepthStencil {
        width: u32,
        height: u32,
    },
    FramebufferDepthStencilRenderbuffer {
        renderbuffer: RenderbufferName,
    },
    FramebufferComplete,
    BlitFramebuffer {
        src: Rect2D,
        dst: Rect2D,
        mask: AspectMask,
        filter: BlitFilter,
    },
    CopyImageSubData {
        src: CopyImageRegion,
        dst: CopyImageRegion,
        width: i32,
        height: i32,
        depth: i32,
    },
    CopyImageSubDataVendor {
        src: CopyImageRegion,
        dst: CopyImageRegion,
        width: i32,
        height: i32,
        depth: i32,
    },
    SetPackAlignment {
        alignment: u32,
    },
    ReadPixelsRgba8 {
        x: i32,
        y: i32,
        width: u32,
        height: u32,
    },
    TexLevelSize {
        target: TextureTarget,
        level: u32,
    },
    GetTexImageRgba8 {
        target: TextureTarget,
        level: u32,
    },
}

/// Recording device for tests and offline inspection.
#[derive(Debug)]
pub struct TraceDevice {
    calls: Vec<DeviceCall>,
    max_anisotropy_limit: f32,
    next_texture: u32,
    next_buffer: u32,
    next_shader: u32,
    next_program: u32,
    next_vertex_array: u32,
    next_framebuffer: u32,
    next_renderbuffer: u32,
    next_uniform_location: i32,
    compile_failures: HashMap<ShaderName, String>,
    link_failures: HashMap<ProgramName, String>,
    missing_uniforms: HashSet<String>,
    uniform_locations: HashMap<(ProgramName, String), i32>,
    bound_texture: Option<TextureName>,
    tex_levels: HashMap<(TextureName, u32), (u32, u32)>,
    framebuffer_incomplete: bool,
}

impl Default for TraceDevice {
    fn default() -> Self {
        Self {
            calls: Vec::new(),
            max_anisotropy_limit: 16.0,
            next_texture: 1,
            next_buffer: 1,
            next_shader: 1,
            next_program: 1,
            next_vertex_array: 1,
            next_framebuffer: 1,
            next_renderbuffer: 1,
            next_uniform_location: 0,
            compile_failures: HashMap::new(),
            link_failures: HashMap::new(),
            missing_uniforms: HashSet::new(),
            uniform_locations: HashMap::new(),
            bound_texture: None,
            tex_levels: HashMap::new(),
            framebuffer_incomplete: false,
        }
    }
}

impl TraceDevice {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything recorded so far, in call order.
    pub fn calls(&self) -> &[DeviceCall] {
        &self.calls
    }

    pub fn take_calls(&mut self) -> Vec<DeviceCall> {
        std::mem::take(&mut self.calls)
    }

    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }

    /// Makes `compile_shader` on that name fail with `log`. Shader names are
    /// handed out sequentially from 1.
    pub fn fail_compile(&mut self, shader: ShaderName, log: impl Into<String>) {
        self.compile_failures.insert(shader, log.into());
    }

    /// Makes `link_program` on that name fail with `log`.
    pub fn fail_link(&mut self, program: ProgramName, log: impl Into<String>) {
        self.link_failures.insert(program, log.into());
    }

    /// Makes `uniform_location` report `name` as absent (-1).
    pub fn set_missing_uniform(&mut self, name: impl Into<String>) {
        self.missing_uniforms.insert(name.into());
    }

    pub fn set_max_anisotropy(&mut self, limit: f32) {
        self.max_anisotropy_limit = limit;
    }

    /// Makes every completeness check fail.
    pub fn set_framebuffer_incomplete(&mut self) {
        self.framebuffer_incomplete = true;
    }

    fn record(&mut self, call: DeviceCall) {
        self.calls.push(call);
    }

    fn take_name(counter: &mut u32) -> u32 {
        let name = *counter;
        *counter += 1;
        name
    }
}

impl GlDevice for TraceDevice {
    fn max_texture_anisotropy(&mut self) -> f32 {
        self.record(DeviceCall::MaxTextureAnisotropy);
        self.max_anisotropy_limit
    }

    fn gen_vertex_array(&mut self) -> VertexArrayName {
        self.record(DeviceCall::GenVertexArray);
        VertexArrayName(Self::take_name(&mut self.next_vertex_array))
    }

    fn delete_vertex_array(&mut self, vao: VertexArrayName) {
        self.record(DeviceCall::DeleteVertexArray { vao });
    }

    fn bind_vertex_array(&mut self, vao: Option<VertexArrayName>) {
        self.record(DeviceCall::BindVertexArray { vao });
    }

    fn gen_textures(&mut self, count: u32) -> Vec<TextureName> {
        self.record(DeviceCall::GenTextures { count });
        (0..count)
            .map(|_| TextureName(Self::take_name(&mut self.next_texture)))
            .collect()
    }

    fn delete_textures(&mut self, names: &[TextureName]) {
        self.record(DeviceCall::DeleteTextures {
            names: names.to_vec(),
        });
    }

    fn active_texture(&mut self, slot: u32) {
        self.record(DeviceCall::ActiveTexture { slot });
    }

    fn bind_texture(&mut self, target: TextureTarget, name: Option<TextureName>) {
        self.bound_texture = name;
        self.record(DeviceCall::BindTexture { target, name });
    }

    fn tex_image_2d(
        &mut self,
        target: TextureTarget,
        level: u32,
        format: DataFormat,
        width: u32,
        height: u32,
        data: Option<&[u8]>,
    ) {
        if let Some(name) = self.bound_texture {
            self.tex_levels.insert((name, level), (width, height));
        }
        self.record(DeviceCall::TexImage2d {
            target,
            level,
            format,
            width,
            height,
            data: data.map(<[u8]>::to_vec),
        });
    }

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
    ) {
        self.record(DeviceCall::TexSubImage2d {
            target,
            level,
            x,
            y,
            width,
            height,
            format,
            data: data.to_vec(),
        });
    }

    fn tex_wrap(&mut self, target: TextureTarget, wrap_s: TextureWrap, wrap_t: TextureWrap) {
        self.record(DeviceCall::TexWrap {
            target,
            wrap_s,
            wrap_t,
        });
    }

    fn tex_filter(&mut self, target: TextureTarget, mag: TextureFilter, min: TextureFilter) {
        self.record(DeviceCall::TexFilter { target, mag, min });
    }

    fn tex_max_anisotropy(&mut self, target: TextureTarget, level: f32) {
        self.record(DeviceCall::TexMaxAnisotropy { target, level });
    }

    fn generate_mipmap(&mut self, target: TextureTarget) {
        self.record(DeviceCall::GenerateMipmap { target });
    }

    fn gen_buffer(&mut self) -> BufferName {
        self.record(DeviceCall::GenBuffer);
        BufferName(Self::take_name(&mut self.next_buffer))
    }

    fn bind_buffer(&mut self, target: BufferTarget, name: Option<BufferName>) {
        self.record(DeviceCall::BindBuffer { target, name });
    }

    fn buffer_data_uninit(&mut self, target: BufferTarget, size: usize, usage: BufferUsageHint) {
        self.record(DeviceCall::BufferDataUninit {
            target,
            size,
            usage,
        });
    }

    fn buffer_sub_data(&mut self, target: BufferTarget, offset: usize, data: &[u8]) {
        self.record(DeviceCall::BufferSubData {
            target,
            offset,
            data: data.to_vec(),
        });
    }

    fn create_shader(&mut self, stage: ShaderStage) -> ShaderName {
        self.record(DeviceCall::CreateShader { stage });
        ShaderName(Self::take_name(&mut self.next_shader))
    }

    fn shader_source(&mut self, shader: ShaderName, source: &[u8]) {
        self.record(DeviceCall::ShaderSource {
            shader,
            source: source.to_vec(),
        });
    }

    fn compile_shader(&mut self, shader: ShaderName) -> Result<(), String> {
        self.record(DeviceCall::CompileShader { shader });
        match self.compile_failures.get(&shader) {
            Some(log) => Err(log.clone()),
            None => Ok(()),
        }
    }

    fn delete_shader(&mut self, shader: ShaderName) {
        self.record(DeviceCall::DeleteShader { shader });
    }

    fn create_program(&mut self) -> ProgramName {
        self.record(DeviceCall::CreateProgram);
        ProgramName(Self::take_name(&mut self.next_program))
    }

    fn attach_shader(&mut self, program: ProgramName, shader: ShaderName) {
        self.record(DeviceCall::AttachShader { program, shader });
    }

    fn bind_attrib_location(&mut self, program: ProgramName, location: u32, name: &str) {
        self.record(DeviceCall::BindAttribLocation {
            program,
            location,
            name: name.to_owned(),
        });
    }

    fn bind_frag_data_location(&mut self, program: ProgramName, color: u32, name: &str) {
        self.record(DeviceCall::BindFragDataLocation {
            program,
            color,
            name: name.to_owned(),
        });
    }

    fn bind_frag_data_location_indexed(
        &mut self,
        program: ProgramName,
        color: u32,
        index: u32,
        name: &str,
    ) {
        self.record(DeviceCall::BindFragDataLocationIndexed {
            program,
            color,
            index,
            name: name.to_owned(),
        });
    }

    fn link_program(&mut self, program: ProgramName) -> Result<(), String> {
        self.record(DeviceCall::LinkProgram { program });
        match self.link_failures.get(&program) {
            Some(log) => Err(log.clone()),
            None => Ok(()),
        }
    }

    fn use_program(&mut self, program: ProgramName) {
        self.record(DeviceCall::UseProgram { program });
    }

    fn uniform_location(&mut self, program: ProgramName, name: &str) -> i32 {
        self.record(DeviceCall::UniformLocation {
            program,
            name: name.to_owned(),
        });
        if self.missing_uniforms.contains(name) {
            return -1;
        }
        let key = (program, name.to_owned());
        if let Some(&location) = self.uniform_locations.get(&key) {
            return location;
        }
        let location = self.next_uniform_location;
        self.next_uniform_location += 1;
        self.uniform_locations.insert(key, location);
        location
    }

    fn uniform_f32(&mut self, location: i32, values: &[f32]) {
        self.record(DeviceCall::UniformF32 {
            location,
            values: values.to_vec(),
        });
    }

    fn uniform_i32(&mut self, location: i32, values: &[i32]) {
        self.record(DeviceCall::UniformI32 {
            location,
            values: values.to_vec(),
        });
    }

    fn uniform_matrix4(&mut self, location: i32, values: &[f32; 16]) {
        self.record(DeviceCall::UniformMatrix4 {
            location,
            values: *values,
        });
    }

    fn enable(&mut self, feature: Feature) {
        self.record(DeviceCall::Enable { feature });
    }

    fn disable(&mut self, feature: Feature) {
        self.record(DeviceCall::Disable { feature });
    }

    fn depth_mask(&mut self, write: bool) {
        self.record(DeviceCall::DepthMask { write });
    }

    fn depth_func(&mut self, func: CompareFunc) {
        self.record(DeviceCall::DepthFunc { func });
    }

    fn depth_range(&mut self, min: f32, max: f32) {
        self.record(DeviceCall::DepthRange { min, max });
    }

    fn blend_equation_separate(&mut self, color: BlendOp, alpha: BlendOp) {
        self.record(DeviceCall::BlendEquationSeparate { color, alpha });
    }

    fn blend_func_separate(
        &mut self,
        src_color: BlendFactor,
        dst_color: BlendFactor,
        src_alpha: BlendFactor,
        dst_alpha: BlendFactor,
    ) {
        self.record(DeviceCall::BlendFuncSeparate {
            src_color,
            dst_color,
            src_alpha,
            dst_alpha,
        });
    }

    fn blend_color(&mut self, color: [f32; 4]) {
        self.record(DeviceCall::BlendColor { color });
    }

    fn color_mask(&mut self, mask: ColorWriteMask) {
        self.record(DeviceCall::ColorMask { mask });
    }

    fn clear_color(&mut self, color: [f32; 4]) {
        self.record(DeviceCall::ClearColor { color });
    }

    fn clear_depth(&mut self, depth: f32) {
        self.record(DeviceCall::ClearDepth { depth });
    }

    fn clear_stencil(&mut self, stencil: u8) {
        self.record(DeviceCall::ClearStencil { stencil });
    }

    fn clear(&mut self, mask: AspectMask) {
        self.record(DeviceCall::Clear { mask });
    }

    fn viewport(&mut self, x: i32, y: i32, w: i32, h: i32) {
        self.record(DeviceCall::Viewport { x, y, w, h });
    }

    fn scissor(&mut self, x: i32, y: i32, w: i32, h: i32) {
        self.record(DeviceCall::Scissor { x, y, w, h });
    }

    fn stencil_func(&mut self, func: CompareFunc, reference: u8, compare_mask: u8) {
        self.record(DeviceCall::StencilFunc {
            func,
            reference,
            compare_mask,
        });
    }

    fn stencil_op(&mut self, stencil_fail: StencilOp, depth_fail: StencilOp, pass: StencilOp) {
        self.record(DeviceCall::StencilOp {
            stencil_fail,
            depth_fail,
            pass,
        });
    }

    fn stencil_mask(&mut self, write_mask: u8) {
        self.record(DeviceCall::StencilMask { write_mask });
    }

    fn front_face(&mut self, winding: FrontFace) {
        self.record(DeviceCall::FrontFace { winding });
    }

    fn cull_face(&mut self, face: CullFace) {
        self.record(DeviceCall::CullFace { face });
    }

    fn enable_vertex_attrib(&mut self, location: u32) {
        self.record(DeviceCall::EnableVertexAttrib { location });
    }

    fn disable_vertex_attrib(&mut self, location: u32) {
        self.record(DeviceCall::DisableVertexAttrib { location });
    }

    fn vertex_attrib_pointer(
        &mut self,
        location: u32,
        count: u8,
        ty: AttribType,
        normalized: bool,
        stride: u32,
        offset: usize,
    ) {
        self.record(DeviceCall::VertexAttribPointer {
            location,
            count,
            ty,
            normalized,
            stride,
            offset,
        });
    }

    fn draw_arrays(&mut self, mode: Primitive, first: u32, count: u32) {
        self.record(DeviceCall::DrawArrays { mode, first, count });
    }

    fn draw_elements(&mut self, mode: Primitive, count: u32, format: IndexFormat, offset: usize) {
        self.record(DeviceCall::DrawElements {
            mode,
            count,
            format,
            offset,
        });
    }

    fn gen_framebuffer(&mut self) -> FramebufferName {
        self.record(DeviceCall::GenFramebuffer);
        FramebufferName(Self::take_name(&mut self.next_framebuffer))
    }

    fn bind_framebuffer(&mut self, target: FramebufferTarget, name: Option<FramebufferName>) {
        self.record(DeviceCall::BindFramebuffer { target, name });
    }

    fn framebuffer_color_texture(&mut self, texture: TextureName) {
        self.record(DeviceCall::FramebufferColorTexture { texture });
    }

    fn gen_renderbuffer(&mut self) -> RenderbufferName {
        self.record(DeviceCall::GenRenderbuffer);
        RenderbufferName(Self::take_name(&mut self.next_renderbuffer))
    }

    fn bind_renderbuffer(&mut self, name: Option<RenderbufferName>) {
        self.record(DeviceCall::BindRenderbuffer { name });
    }

    fn renderbuffer_storage_depth_stencil(&mut self, width: u32, height: u32) {
        self.record(DeviceCall::RenderbufferStorageDepthStencil { width, height });
    }

    fn framebuffer_depth_stencil_renderbuffer(&mut self, renderbuffer: RenderbufferName) {
        self.record(DeviceCall::FramebufferDepthStencilRenderbuffer { renderbuffer });
    }

    fn framebuffer_complete(&mut self) -> bool {
        self.record(DeviceCall::FramebufferComplete);
        !self.framebuffer_incomplete
    }

    fn blit_framebuffer(&mut self, src: Rect2D, dst: Rect2D, mask: AspectMask, filter: BlitFilter) {
        self.record(DeviceCall::BlitFramebuffer {
            src,
            dst,
            mask,
            filter,
        });
    }

    fn copy_image_sub_data(
        &mut self,
        src: CopyImageRegion,
        dst: CopyImageRegion,
        width: i32,
        height: i32,
        depth: i32,
    ) {
        self.record(DeviceCall::CopyImageSubData {
            src,
            dst,
            width,
            height,
            depth,
        });
    }

    fn copy_image_sub_data_vendor(
        &mut self,
        src: CopyImageRegion,
        dst: CopyImageRegion,
        width: i32,
        height: i32,
        depth: i32,
    ) {
        self.record(DeviceCall::CopyImageSubDataVendor {
            src,
            dst,
            width,
            height,
            depth,
        });
    }

    fn set_pack_alignment(&mut self, alignment: u32) {
        self.record(DeviceCall::SetPackAlignment { alignment });
    }

    /// Fills `dst` with a deterministic gradient: red tracks the absolute
    /// column, green the absolute row, alpha is opaque.
    fn read_pixels_rgba8(&mut self, x: i32, y: i32, width: u32, height: u32, dst: &mut [u8]) {
        assert_eq!(dst.len(), (width * height * 4) as usize);
        for row in 0..height {
            for col in 0..width {
                let i = ((row * width + col) * 4) as usize;
                dst[i] = (x + col as i32) as u8;
                dst[i + 1] = (y + row as i32) as u8;
                dst[i + 2] = 0;
                dst[i + 3] = 0xFF;
            }
        }
        self.record(DeviceCall::ReadPixelsRgba8 {
            x,
            y,
            width,
            height,
        });
    }

    fn tex_level_size(&mut self, target: TextureTarget, level: u32) -> (u32, u32) {
        self.record(DeviceCall::TexLevelSize { target, level });
        let name = self
            .bound_texture
            .expect("tex_level_size with no texture bound");
        *self
            .tex_levels
            .get(&(name, level))
            .unwrap_or_else(|| panic!("no image recorded for {name:?} level {level}"))
    }

    /// Same gradient as `read_pixels_rgba8`, anchored at the level origin.
    fn get_tex_image_rgba8(&mut self, target: TextureTarget, level: u32, dst: &mut [u8]) {
        let name = self
            .bound_texture
            .expect("get_tex_image with no texture bound");
        let (width, height) = *self
            .tex_levels
            .get(&(name, level))
            .unwrap_or_else(|| panic!("no image recorded for {name:?} level {level}"));
        assert_eq!(dst.len(), (width * height * 4) as usize);
        for row in 0..height {
            for col in 0..width {
                let i = ((row * width + col) * 4) as usize;
                dst[i] = col as u8;
                dst[i + 1] = row as u8;
                dst[i + 2] = 0;
                dst[i + 3] = 0xFF;
            }
        }
        self.record(DeviceCall::GetTexImageRgba8 { target, level });
    }
}
