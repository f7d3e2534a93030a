//! The queue runner: replays recorded init and render step batches against a
//! [`GlDevice`].
//!
//! Batches are consumed by value, front to back, exactly once. All methods
//! must run on the thread that owns the device context; nothing here
//! suspends, reorders or retries. Shader compile and program link failures
//! are logged and leave only the affected record invalid; everything else a
//! producer can get wrong (dangling handles, zero-shader programs,
//! out-of-range crops) is a contract violation and panics.

use thiserror::Error;
use tracing::{debug, error, trace, warn};

use crate::caps::{DeviceCaps, GlApi};
use crate::cmd::{InitStep, Payload, RenderCommand, RenderStep, UniformRef};
use crate::convert::{
    pack_rgba8_to_r4g4b4a4, pack_rgba8_to_r5g5b5a1, pack_rgba8_to_r5g6b5, swizzle_rgba8_to_bgra8,
    unpack_rgba8,
};
use crate::device::{
    AspectMask, BlitFilter, BufferTarget, ColorWriteMask, CopyImageRegion, DataFormat, Feature,
    FramebufferTarget, GlDevice, ImageHandle, Offset2D, Rect2D, ShaderName, TextureFilter,
    TextureName, TextureTarget, TextureWrap, VertexArrayName,
};
use crate::resource::{FramebufferId, ProgramId, Resources, ShaderId, TextureId};

/// Names generated per pool refill, in one device call.
const TEXTURE_NAME_BATCH: u32 = 16;

/// Failures of [`QueueRunner::copy_readback_buffer`]. Everything else in the
/// runner either logs and degrades or panics on a broken producer contract.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RunnerError {
    #[error("no readback has been stored")]
    NoReadback,
    #[error("requested {width}x{height} exceeds stored readback {stored_width}x{stored_height}")]
    ReadbackRegionTooLarge {
        width: u32,
        height: u32,
        stored_width: u32,
        stored_height: u32,
    },
    #[error("destination holds {got} bytes, conversion needs {needed}")]
    DestinationTooSmall { needed: usize, got: usize },
    #[error("unsupported readback destination format {0:?}")]
    UnsupportedDestinationFormat(DataFormat),
}

/// Pixels captured by the most recent `Readback`/`ReadbackImage` step,
/// tightly packed RGBA8 rows.
#[derive(Debug)]
struct ReadbackBuffer {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

/// Capability-degradation warnings already emitted; each fires once per
/// runner so a degraded frame loop doesn't flood the log.
#[derive(Debug, Default)]
struct DegradeWarnings {
    copy_image: bool,
    blit: bool,
    readback_aspect: bool,
    readback_image: bool,
}

/// Shadow state for one render pass. Reinitialized at pass start and
/// discarded at pass end; never carried across passes.
#[derive(Debug)]
struct PassState {
    /// Pass targets the default target, so top-left rects need a Y flip.
    default_target: bool,
    /// Pass target height, the flip reference.
    height: u32,
    program: Option<ProgramId>,
    active_slot: u32,
    attr_mask: u32,
}

/// Replays init and render step batches against a device.
///
/// One runner per device context. Capabilities are fixed at construction;
/// each capability-gated path re-checks them at execution time, so the same
/// recorded batch degrades (with a one-time `warn!`) instead of failing on a
/// lesser device.
#[derive(Debug)]
pub struct QueueRunner {
    caps: DeviceCaps,
    max_anisotropy: f32,
    global_vao: Option<VertexArrayName>,
    name_pool: Vec<TextureName>,
    target_width: u32,
    target_height: u32,
    readback: Option<ReadbackBuffer>,
    warned: DegradeWarnings,
}

impl QueueRunner {
    pub fn new(caps: DeviceCaps) -> Self {
        Self {
            caps,
            max_anisotropy: 0.0,
            global_vao: None,
            name_pool: Vec::new(),
            target_width: 0,
            target_height: 0,
            readback: None,
            warned: DegradeWarnings::default(),
        }
    }

    pub fn caps(&self) -> &DeviceCaps {
        &self.caps
    }

    /// Device anisotropy limit queried by [`create_device_objects`].
    ///
    /// [`create_device_objects`]: Self::create_device_objects
    pub fn max_anisotropy(&self) -> f32 {
        self.max_anisotropy
    }

    /// Records the default target's dimensions, used as pass dimensions and
    /// for Y flips when a pass has no framebuffer.
    pub fn set_target_size(&mut self, width: u32, height: u32) {
        self.target_width = width;
        self.target_height = height;
    }

    pub fn target_size(&self) -> (u32, u32) {
        (self.target_width, self.target_height)
    }

    /// Queries limits and creates the shared VAO every pass binds. Call once
    /// after context creation, before the first render pass.
    pub fn create_device_objects(&mut self, dev: &mut dyn GlDevice) {
        self.max_anisotropy = dev.max_texture_anisotropy();
        self.global_vao = Some(dev.gen_vertex_array());
        debug!(max_anisotropy = self.max_anisotropy, "created device objects");
    }

    /// Deletes pooled texture names (one batch call) and the shared VAO.
    /// Safe with an empty pool and safe to call twice.
    pub fn destroy_device_objects(&mut self, dev: &mut dyn GlDevice) {
        if !self.name_pool.is_empty() {
            dev.delete_textures(&self.name_pool);
            self.name_pool.clear();
        }
        if let Some(vao) = self.global_vao.take() {
            dev.delete_vertex_array(vao);
        }
        debug!("destroyed device objects");
    }

    /// Pops a pre-generated texture name, refilling the pool with a batch of
    /// [`TEXTURE_NAME_BATCH`] names in one device call when it runs dry.
    pub fn alloc_texture_name(&mut self, dev: &mut dyn GlDevice) -> TextureName {
        if self.name_pool.is_empty() {
            self.name_pool = dev.gen_textures(TEXTURE_NAME_BATCH);
            trace!(count = TEXTURE_NAME_BATCH, "refilled texture name pool");
        }
        self.name_pool
            .pop()
            .expect("texture name refill returned no names")
    }

    /// Returns a no-longer-used name to the pool for reissue.
    pub fn recycle_texture_name(&mut self, name: TextureName) {
        self.name_pool.push(name);
    }

    /// Executes a resource-creation batch, in order, consuming it.
    pub fn run_init_steps(
        &mut self,
        dev: &mut dyn GlDevice,
        resources: &mut Resources,
        steps: Vec<InitStep>,
    ) {
        trace!(steps = steps.len(), "running init steps");
        for step in steps {
            match step {
                InitStep::CreateTexture { texture } => {
                    let name = dev.gen_texture();
                    let record = &mut resources[texture];
                    record.texture = Some(name);
                    dev.bind_texture(record.target, Some(name));
                }
                InitStep::CreateBuffer { buffer, size } => {
                    let name = dev.gen_buffer();
                    let record = &mut resources[buffer];
                    record.buffer = Some(name);
                    dev.bind_buffer(record.target, Some(name));
                    dev.buffer_data_uninit(record.target, size, record.usage);
                }
                InitStep::BufferSubData {
                    buffer,
                    offset,
                    data,
                } => {
                    let name = resources[buffer]
                        .buffer
                        .expect("buffer upload before its create step");
                    // Uploads go through the array binding point regardless
                    // of the buffer's own target, so the shared VAO's element
                    // binding is left alone.
                    dev.bind_buffer(BufferTarget::Array, Some(name));
                    dev.buffer_sub_data(BufferTarget::Array, offset, data.bytes());
                    drop(data);
                }
                InitStep::CreateShader { shader, source } => {
                    self.init_shader(dev, resources, shader, source);
                }
                InitStep::CreateProgram {
                    program,
                    shaders,
                    support_dual_source,
                } => {
                    self.init_program(dev, resources, program, &shaders, support_dual_source);
                }
                InitStep::CreateInputLayout { input_layout: _ } => {
                    // Layouts are producer-side records, consumed at bind
                    // time; nothing to create on the device.
                }
                InitStep::CreateFramebuffer { framebuffer } => {
                    self.init_framebuffer(dev, resources, framebuffer);
                }
                InitStep::TextureImage {
                    texture,
                    level,
                    format,
                    width,
                    height,
                    data,
                    linear_filter,
                } => {
                    let record = &resources[texture];
                    let name = record
                        .texture
                        .expect("texture upload before its create step");
                    dev.bind_texture(record.target, Some(name));
                    dev.tex_image_2d(
                        record.target,
                        level,
                        format,
                        width,
                        height,
                        data.as_ref().map(|p| p.bytes()),
                    );
                    drop(data);
                    dev.tex_wrap(record.target, TextureWrap::ClampToEdge, TextureWrap::ClampToEdge);
                    let filter = if linear_filter {
                        TextureFilter::Linear
                    } else {
                        TextureFilter::Nearest
                    };
                    dev.tex_filter(record.target, filter, filter);
                }
                InitStep::TextureSubData {
                    texture,
                    level,
                    x,
                    y,
                    width,
                    height,
                    format,
                    data,
                } => {
                    let record = &resources[texture];
                    let name = record
                        .texture
                        .expect("texture upload before its create step");
                    dev.bind_texture(record.target, Some(name));
                    dev.tex_sub_image_2d(
                        record.target,
                        level,
                        x,
                        y,
                        width,
                        height,
                        format,
                        data.bytes(),
                    );
                    drop(data);
                }
            }
        }
    }

    fn init_shader(
        &mut self,
        dev: &mut dyn GlDevice,
        resources: &mut Resources,
        shader: ShaderId,
        source: Payload,
    ) {
        let record = &mut resources[shader];
        let name = dev.create_shader(record.stage);
        record.shader = Some(name);
        dev.shader_source(name, source.bytes());
        drop(source);
        match dev.compile_shader(name) {
            Ok(()) => record.valid = true,
            Err(log) => {
                error!(stage = ?record.stage, %log, "shader compile failed");
                dev.delete_shader(name);
                record.shader = None;
            }
        }
    }

    fn init_program(
        &mut self,
        dev: &mut dyn GlDevice,
        resources: &mut Resources,
        program: ProgramId,
        shaders: &[ShaderId],
        support_dual_source: bool,
    ) {
        assert!(!shaders.is_empty(), "cannot create a program with zero shaders");
        let shader_names: Vec<ShaderName> = shaders
            .iter()
            .map(|&id| {
                resources[id]
                    .shader
                    .expect("program references a shader that did not compile")
            })
            .collect();

        let name = dev.create_program();
        let record = &mut resources[program];
        record.program = Some(name);
        for &shader in &shader_names {
            dev.attach_shader(name, shader);
        }
        for semantic in &record.semantics {
            dev.bind_attrib_location(name, semantic.location, &semantic.name);
        }
        // Fragment-output binding is re-derived from the caps at execution
        // time, not from whatever the producer's context supported.
        if support_dual_source && self.caps.dual_source_blend {
            dev.bind_frag_data_location_indexed(name, 0, 0, "fragColor0");
            dev.bind_frag_data_location_indexed(name, 0, 1, "fragColor1");
        } else if self.caps.named_fragment_output() {
            dev.bind_frag_data_location(name, 0, "fragColor0");
        }
        if let Err(log) = dev.link_program(name) {
            if log.is_empty() {
                error!(
                    shaders = shaders.len(),
                    "could not link program, driver returned no log"
                );
            } else {
                error!(%log, "could not link program");
            }
            return;
        }
        dev.use_program(name);
        for query in &mut record.uniforms {
            query.location = dev.uniform_location(name, &query.name);
        }
        for init in &record.initializers {
            let location = record.uniforms[init.query].location;
            if location != -1 {
                dev.uniform_i32(location, &[init.value]);
            }
        }
        record.valid = true;
    }

    fn init_framebuffer(
        &mut self,
        dev: &mut dyn GlDevice,
        resources: &mut Resources,
        framebuffer: FramebufferId,
    ) {
        let fb_name = dev.gen_framebuffer();
        let color_name = self.alloc_texture_name(dev);

        let record = &mut resources[framebuffer];
        record.framebuffer = Some(fb_name);
        record.color.texture = Some(color_name);

        dev.bind_texture(TextureTarget::Texture2d, Some(color_name));
        dev.tex_image_2d(
            TextureTarget::Texture2d,
            0,
            DataFormat::Rgba8,
            record.width,
            record.height,
            None,
        );
        dev.tex_wrap(
            TextureTarget::Texture2d,
            TextureWrap::ClampToEdge,
            TextureWrap::ClampToEdge,
        );
        dev.tex_filter(
            TextureTarget::Texture2d,
            TextureFilter::Linear,
            TextureFilter::Linear,
        );

        dev.bind_framebuffer(FramebufferTarget::ReadDraw, Some(fb_name));
        dev.framebuffer_color_texture(color_name);

        if record.z_stencil {
            let rb_name = dev.gen_renderbuffer();
            record.z_stencil_buffer = Some(rb_name);
            dev.bind_renderbuffer(Some(rb_name));
            dev.renderbuffer_storage_depth_stencil(record.width, record.height);
            dev.framebuffer_depth_stencil_renderbuffer(rb_name);
        }

        if !dev.framebuffer_complete() {
            error!(
                width = record.width,
                height = record.height,
                z_stencil = record.z_stencil,
                "framebuffer incomplete"
            );
        }
        if record.z_stencil {
            dev.bind_renderbuffer(None);
        }
        // The new framebuffer stays bound, like freshly created textures and
        // buffers stay bound.
    }

    /// Executes a render batch, in order, consuming it.
    pub fn run_steps(
        &mut self,
        dev: &mut dyn GlDevice,
        resources: &mut Resources,
        steps: Vec<RenderStep>,
    ) {
        trace!(steps = steps.len(), "running render steps");
        for step in steps {
            match step {
                RenderStep::Render {
                    framebuffer,
                    commands,
                } => self.perform_render_pass(dev, resources, framebuffer, commands),
                RenderStep::Copy {
                    src,
                    dst,
                    src_rect,
                    dst_pos,
                    aspect,
                } => self.perform_copy(dev, resources, src, dst, src_rect, dst_pos, aspect),
                RenderStep::Blit {
                    src,
                    dst,
                    src_rect,
                    dst_rect,
                    aspect,
                    filter,
                } => self.perform_blit(dev, resources, src, dst, src_rect, dst_rect, aspect, filter),
                RenderStep::Readback {
                    framebuffer,
                    src_rect,
                    aspect,
                } => self.perform_readback(dev, resources, framebuffer, src_rect, aspect),
                RenderStep::ReadbackImage {
                    texture,
                    mip_level,
                    src_rect,
                } => self.perform_readback_image(dev, resources, texture, mip_level, src_rect),
            }
        }
    }

    /// Logs a `debug!` summary line per step without executing anything.
    pub fn log_steps(&self, steps: &[RenderStep]) {
        for (i, step) in steps.iter().enumerate() {
            match step {
                RenderStep::Render {
                    framebuffer,
                    commands,
                } => {
                    debug!(step = i, framebuffer = ?framebuffer, commands = commands.len(), "render pass");
                }
                RenderStep::Copy {
                    src,
                    dst,
                    src_rect,
                    aspect,
                    ..
                } => {
                    debug!(step = i, src = ?src, dst = ?dst, rect = ?src_rect, aspect = ?aspect, "copy");
                }
                RenderStep::Blit {
                    src,
                    dst,
                    aspect,
                    filter,
                    ..
                } => {
                    debug!(step = i, src = ?src, dst = ?dst, aspect = ?aspect, filter = ?filter, "blit");
                }
                RenderStep::Readback {
                    framebuffer,
                    src_rect,
                    aspect,
                } => {
                    debug!(step = i, framebuffer = ?framebuffer, rect = ?src_rect, aspect = ?aspect, "readback");
                }
                RenderStep::ReadbackImage {
                    texture,
                    mip_level,
                    src_rect,
                } => {
                    debug!(step = i, texture = ?texture, level = mip_level, rect = ?src_rect, "readback image");
                }
            }
        }
    }

    fn perform_render_pass(
        &mut self,
        dev: &mut dyn GlDevice,
        resources: &Resources,
        framebuffer: Option<FramebufferId>,
        commands: Vec<RenderCommand>,
    ) {
        // Passes that recorded no work are elided entirely.
        if commands.is_empty() {
            return;
        }

        let (target, height) = match framebuffer {
            Some(id) => {
                let record = &resources[id];
                let name = record
                    .framebuffer
                    .expect("render pass references framebuffer before its create step");
                (Some(name), record.height)
            }
            None => (None, self.target_height),
        };
        dev.bind_framebuffer(FramebufferTarget::ReadDraw, target);

        dev.enable(Feature::ScissorTest);
        let vao = self
            .global_vao
            .expect("render pass requires create_device_objects");
        dev.bind_vertex_array(Some(vao));
        dev.bind_buffer(BufferTarget::Array, None);
        dev.bind_buffer(BufferTarget::ElementArray, None);

        let mut state = PassState {
            default_target: framebuffer.is_none(),
            height,
            program: None,
            active_slot: 0,
            attr_mask: 0,
        };

        for command in commands {
            self.run_render_command(dev, resources, &mut state, command);
        }

        let mut mask = state.attr_mask;
        while mask != 0 {
            dev.disable_vertex_attrib(mask.trailing_zeros());
            mask &= mask - 1;
        }
        if state.active_slot != 0 {
            dev.active_texture(0);
        }
        dev.bind_buffer(BufferTarget::Array, None);
        dev.bind_buffer(BufferTarget::ElementArray, None);
        dev.bind_vertex_array(None);
        dev.disable(Feature::ScissorTest);
    }

    fn run_render_command(
        &self,
        dev: &mut dyn GlDevice,
        resources: &Resources,
        state: &mut PassState,
        command: RenderCommand,
    ) {
        match command {
            RenderCommand::DepthTest {
                enabled,
                write,
                func,
            } => {
                if enabled {
                    dev.enable(Feature::DepthTest);
                    dev.depth_mask(write);
                    dev.depth_func(func);
                } else {
                    dev.disable(Feature::DepthTest);
                }
            }
            RenderCommand::Blend {
                enabled,
                op_color,
                op_alpha,
                src_color,
                dst_color,
                src_alpha,
                dst_alpha,
                mask,
            } => {
                if enabled {
                    dev.enable(Feature::Blend);
                    dev.blend_equation_separate(op_color, op_alpha);
                    dev.blend_func_separate(src_color, dst_color, src_alpha, dst_alpha);
                } else {
                    dev.disable(Feature::Blend);
                }
                dev.color_mask(mask);
            }
            RenderCommand::Clear {
                color,
                depth,
                stencil,
                mask,
            } => {
                // The clear covers the whole target regardless of the
                // scissor rect. The color mask stays fully open afterwards.
                dev.disable(Feature::ScissorTest);
                dev.color_mask(ColorWriteMask::ALL);
                if mask.contains(AspectMask::COLOR) {
                    dev.clear_color(unpack_rgba8(color));
                }
                if mask.contains(AspectMask::DEPTH) {
                    dev.clear_depth(depth);
                }
                if mask.contains(AspectMask::STENCIL) {
                    dev.clear_stencil(stencil);
                }
                dev.clear(mask);
                dev.enable(Feature::ScissorTest);
            }
            RenderCommand::BlendColor { color } => dev.blend_color(color),
            RenderCommand::Viewport { rect } => {
                let y = if state.default_target {
                    state.height as f32 - rect.y - rect.h
                } else {
                    rect.y
                };
                dev.viewport(rect.x as i32, y as i32, rect.w as i32, rect.h as i32);
                dev.depth_range(rect.min_z, rect.max_z);
            }
            RenderCommand::Scissor { rect } => {
                let y = if state.default_target {
                    state.height as i32 - rect.y - rect.h
                } else {
                    rect.y
                };
                dev.scissor(rect.x, y, rect.w, rect.h);
            }
            RenderCommand::UniformF32 {
                uniform,
                count,
                values,
            } => {
                if let Some(location) = resolve_uniform(resources, state, &uniform) {
                    dev.uniform_f32(location, &values[..count as usize]);
                }
            }
            RenderCommand::UniformI32 {
                uniform,
                count,
                values,
            } => {
                if let Some(location) = resolve_uniform(resources, state, &uniform) {
                    dev.uniform_i32(location, &values[..count as usize]);
                }
            }
            RenderCommand::UniformMatrix4 { uniform, values } => {
                if let Some(location) = resolve_uniform(resources, state, &uniform) {
                    dev.uniform_matrix4(location, &values);
                }
            }
            RenderCommand::StencilFunc {
                enabled,
                func,
                reference,
                compare_mask,
            } => {
                if enabled {
                    dev.enable(Feature::StencilTest);
                    dev.stencil_func(func, reference, compare_mask);
                } else {
                    dev.disable(Feature::StencilTest);
                }
            }
            RenderCommand::StencilOp {
                stencil_fail,
                depth_fail,
                pass,
                write_mask,
            } => {
                dev.stencil_op(stencil_fail, depth_fail, pass);
                dev.stencil_mask(write_mask);
            }
            RenderCommand::BindTexture { slot, texture } => {
                if slot != state.active_slot {
                    dev.active_texture(slot);
                    state.active_slot = slot;
                }
                match texture {
                    Some(id) => {
                        let record = &resources[id];
                        dev.bind_texture(record.target, record.texture);
                    }
                    None => dev.bind_texture(TextureTarget::Texture2d, None),
                }
            }
            RenderCommand::BindProgram { program } => {
                let name = resources[program]
                    .program
                    .expect("pass binds a program before its create step");
                dev.use_program(name);
                state.program = Some(program);
            }
            RenderCommand::BindInputLayout {
                input_layout,
                offset,
            } => {
                let layout = &resources[input_layout];
                let mut enable = layout.semantics_mask & !state.attr_mask;
                while enable != 0 {
                    dev.enable_vertex_attrib(enable.trailing_zeros());
                    enable &= enable - 1;
                }
                let mut disable = state.attr_mask & !layout.semantics_mask;
                while disable != 0 {
                    dev.disable_vertex_attrib(disable.trailing_zeros());
                    disable &= disable - 1;
                }
                state.attr_mask = layout.semantics_mask;
                for entry in &layout.entries {
                    dev.vertex_attrib_pointer(
                        entry.location,
                        entry.count,
                        entry.ty,
                        entry.normalized,
                        entry.stride,
                        offset + entry.offset,
                    );
                }
            }
            RenderCommand::BindVertexBuffer { buffer } => {
                let name = buffer.and_then(|id| resources[id].buffer);
                dev.bind_buffer(BufferTarget::Array, name);
            }
            RenderCommand::BindIndexBuffer { buffer } => {
                let name = buffer.and_then(|id| resources[id].buffer);
                dev.bind_buffer(BufferTarget::ElementArray, name);
            }
            RenderCommand::GenerateMipmap => dev.generate_mipmap(TextureTarget::Texture2d),
            RenderCommand::Draw { mode, first, count } => dev.draw_arrays(mode, first, count),
            RenderCommand::DrawIndexed {
                mode,
                count,
                format,
                offset,
                instances,
            } => {
                // Multi-instance indexed drawing is not implemented; such
                // commands are dropped.
                if instances == 1 {
                    dev.draw_elements(mode, count, format, offset);
                }
            }
            RenderCommand::TextureSampler {
                wrap_s,
                wrap_t,
                mag_filter,
                min_filter,
                anisotropy,
            } => {
                dev.tex_wrap(TextureTarget::Texture2d, wrap_s, wrap_t);
                dev.tex_filter(TextureTarget::Texture2d, mag_filter, min_filter);
                if anisotropy != 0.0 {
                    dev.tex_max_anisotropy(
                        TextureTarget::Texture2d,
                        anisotropy.min(self.max_anisotropy),
                    );
                }
            }
            RenderCommand::Raster {
                cull_enable,
                cull_face,
                front_face,
                dither,
            } => {
                if cull_enable {
                    dev.enable(Feature::CullFace);
                    dev.front_face(front_face);
                    dev.cull_face(cull_face);
                } else {
                    dev.disable(Feature::CullFace);
                }
                if dither {
                    dev.enable(Feature::Dither);
                } else {
                    dev.disable(Feature::Dither);
                }
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn perform_copy(
        &mut self,
        dev: &mut dyn GlDevice,
        resources: &Resources,
        src: FramebufferId,
        dst: FramebufferId,
        src_rect: Rect2D,
        dst_pos: Offset2D,
        aspect: AspectMask,
    ) {
        let (src_image, dst_image) = if aspect == AspectMask::COLOR {
            (
                resources[src].color.texture.map(ImageHandle::Texture2d),
                resources[dst].color.texture.map(ImageHandle::Texture2d),
            )
        } else if aspect == AspectMask::DEPTH {
            (
                resources[src].z_stencil_buffer.map(ImageHandle::Renderbuffer),
                resources[dst].z_stencil_buffer.map(ImageHandle::Renderbuffer),
            )
        } else {
            (None, None)
        };
        let (Some(src_image), Some(dst_image)) = (src_image, dst_image) else {
            // Unsupported aspect or an attachment that was never created.
            return;
        };

        if !self.caps.copy_image && !self.caps.copy_image_vendor {
            if !self.warned.copy_image {
                self.warned.copy_image = true;
                warn!("device has no copy-image path, dropping framebuffer copies");
            }
            return;
        }

        let src_region = CopyImageRegion {
            image: src_image,
            level: 0,
            x: src_rect.x,
            y: src_rect.y,
            z: 0,
        };
        let dst_region = CopyImageRegion {
            image: dst_image,
            level: 0,
            x: dst_pos.x,
            y: dst_pos.y,
            z: 0,
        };
        if self.caps.copy_image {
            dev.copy_image_sub_data(src_region, dst_region, src_rect.w, src_rect.h, 1);
        } else {
            dev.copy_image_sub_data_vendor(src_region, dst_region, src_rect.w, src_rect.h, 1);
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn perform_blit(
        &mut self,
        dev: &mut dyn GlDevice,
        resources: &Resources,
        src: FramebufferId,
        dst: FramebufferId,
        src_rect: Rect2D,
        dst_rect: Rect2D,
        aspect: AspectMask,
        filter: BlitFilter,
    ) {
        if !self.caps.framebuffer_blit {
            if !self.warned.blit {
                self.warned.blit = true;
                warn!("device cannot blit framebuffers, dropping blits");
            }
            return;
        }
        let src_name = resources[src]
            .framebuffer
            .expect("blit source framebuffer before its create step");
        let dst_name = resources[dst]
            .framebuffer
            .expect("blit destination framebuffer before its create step");
        dev.bind_framebuffer(FramebufferTarget::Read, Some(src_name));
        dev.bind_framebuffer(FramebufferTarget::Draw, Some(dst_name));
        dev.blit_framebuffer(src_rect, dst_rect, aspect, filter);
        dev.bind_framebuffer(FramebufferTarget::Read, None);
        dev.bind_framebuffer(FramebufferTarget::Draw, None);
    }

    fn perform_readback(
        &mut self,
        dev: &mut dyn GlDevice,
        resources: &Resources,
        framebuffer: Option<FramebufferId>,
        src_rect: Rect2D,
        aspect: AspectMask,
    ) {
        if aspect != AspectMask::COLOR {
            if !self.warned.readback_aspect {
                self.warned.readback_aspect = true;
                warn!(aspect = ?aspect, "only color readbacks are supported, dropping");
            }
            return;
        }
        let name = framebuffer.map(|id| {
            resources[id]
                .framebuffer
                .expect("readback references framebuffer before its create step")
        });
        dev.bind_framebuffer(FramebufferTarget::Read, name);

        let width = src_rect.w.max(0) as u32;
        let height = src_rect.h.max(0) as u32;
        let mut pixels = vec![0u8; (width * height * 4) as usize];
        dev.set_pack_alignment(4);
        dev.read_pixels_rgba8(src_rect.x, src_rect.y, width, height, &mut pixels);
        self.readback = Some(ReadbackBuffer {
            width,
            height,
            pixels,
        });

        dev.bind_framebuffer(FramebufferTarget::Read, None);
    }

    fn perform_readback_image(
        &mut self,
        dev: &mut dyn GlDevice,
        resources: &Resources,
        texture: TextureId,
        mip_level: u32,
        src_rect: Rect2D,
    ) {
        // get_tex_image has no GLES counterpart.
        if self.caps.api == GlApi::Gles {
            if !self.warned.readback_image {
                self.warned.readback_image = true;
                warn!("texture image readback requires a desktop context, dropping");
            }
            return;
        }
        let record = &resources[texture];
        let name = record
            .texture
            .expect("image readback references texture before its create step");
        dev.bind_texture(record.target, Some(name));
        let (level_w, level_h) = dev.tex_level_size(record.target, mip_level);
        let mut scratch = vec![0u8; (level_w * level_h * 4) as usize];
        dev.get_tex_image_rgba8(record.target, mip_level, &mut scratch);

        let width = src_rect.w.max(0) as u32;
        let height = src_rect.h.max(0) as u32;
        let row_bytes = width as usize * 4;
        let mut pixels = vec![0u8; height as usize * row_bytes];
        for row in 0..height as usize {
            let src_row = src_rect.y as usize + row;
            let src_off = (src_row * level_w as usize + src_rect.x as usize) * 4;
            pixels[row * row_bytes..(row + 1) * row_bytes]
                .copy_from_slice(&scratch[src_off..src_off + row_bytes]);
        }
        self.readback = Some(ReadbackBuffer {
            width,
            height,
            pixels,
        });
    }

    /// Converts the stored readback into `dst`, one row at a time.
    ///
    /// Destination rows start every `pixel_stride_px` pixels (in the
    /// destination format's size); source rows are the tightly packed RGBA8
    /// rows recorded by the readback.
    pub fn copy_readback_buffer(
        &self,
        width: u32,
        height: u32,
        dst_format: DataFormat,
        pixel_stride_px: u32,
        dst: &mut [u8],
    ) -> Result<(), RunnerError> {
        let readback = self.readback.as_ref().ok_or(RunnerError::NoReadback)?;
        if width > readback.width || height > readback.height {
            return Err(RunnerError::ReadbackRegionTooLarge {
                width,
                height,
                stored_width: readback.width,
                stored_height: readback.height,
            });
        }
        let bpp = dst_format.bytes_per_pixel();
        let convert: fn(&[u8], &mut [u8]) = match dst_format {
            DataFormat::Rgba8 => |src, dst| dst.copy_from_slice(src),
            DataFormat::Bgra8 => swizzle_rgba8_to_bgra8,
            DataFormat::R5G6B5 => pack_rgba8_to_r5g6b5,
            DataFormat::R5G5B5A1 => pack_rgba8_to_r5g5b5a1,
            DataFormat::R4G4B4A4 => pack_rgba8_to_r4g4b4a4,
            DataFormat::R8 => {
                return Err(RunnerError::UnsupportedDestinationFormat(dst_format));
            }
        };
        let needed = if height == 0 {
            0
        } else {
            (height as usize - 1) * pixel_stride_px as usize * bpp + width as usize * bpp
        };
        if dst.len() < needed {
            return Err(RunnerError::DestinationTooSmall {
                needed,
                got: dst.len(),
            });
        }
        for row in 0..height as usize {
            let src_off = row * readback.width as usize * 4;
            let src_row = &readback.pixels[src_off..src_off + width as usize * 4];
            let dst_off = row * pixel_stride_px as usize * bpp;
            convert(src_row, &mut dst[dst_off..dst_off + width as usize * bpp]);
        }
        Ok(())
    }
}

/// Resolves a uniform reference against the bound program's query table.
/// `None` covers: no bound program, out-of-range query index, unknown name,
/// and a location the driver reported absent.
fn resolve_uniform(
    resources: &Resources,
    state: &PassState,
    uniform: &UniformRef,
) -> Option<i32> {
    let program = &resources[state.program?];
    match uniform {
        UniformRef::Query(index) => {
            let query = program.uniforms.get(*index)?;
            (query.location >= 0).then_some(query.location)
        }
        UniformRef::Name(name) => program.uniform_location(name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::Program;

    fn pass_state(program: Option<ProgramId>) -> PassState {
        PassState {
            default_target: false,
            height: 64,
            program,
            active_slot: 0,
            attr_mask: 0,
        }
    }

    #[test]
    fn uniforms_skip_without_a_bound_program() {
        let resources = Resources::new();
        let state = pass_state(None);
        assert_eq!(
            resolve_uniform(&resources, &state, &UniformRef::Query(0)),
            None
        );
    }

    #[test]
    fn uniforms_resolve_by_query_and_name() {
        let mut resources = Resources::new();
        let mut program = Program::new(Vec::new());
        let q = program.add_uniform_query("u_tex");
        program.uniforms[q].location = 5;
        program.add_uniform_query("u_gone");
        let id = resources.add_program(program);
        let state = pass_state(Some(id));

        assert_eq!(
            resolve_uniform(&resources, &state, &UniformRef::Query(q)),
            Some(5)
        );
        assert_eq!(
            resolve_uniform(&resources, &state, &UniformRef::Name("u_tex".into())),
            Some(5)
        );
        // Unresolved (-1), out of range, and unknown all skip.
        assert_eq!(
            resolve_uniform(&resources, &state, &UniformRef::Query(1)),
            None
        );
        assert_eq!(
            resolve_uniform(&resources, &state, &UniformRef::Query(7)),
            None
        );
        assert_eq!(
            resolve_uniform(&resources, &state, &UniformRef::Name("u_nope".into())),
            None
        );
    }
}
