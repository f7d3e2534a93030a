//! Producer-visible resource handles and the records the runner fills in as
//! init steps execute.
//!
//! Handles are plain indices into [`Resources`]; the producer hands them out
//! at record time and the runner resolves them during replay. A handle used
//! before its create step has executed is a producer bug and indexing panics.

use std::ops::{Index, IndexMut};

use crate::device::{
    AttribType, BufferName, BufferTarget, BufferUsageHint, FramebufferName, ProgramName,
    RenderbufferName, ShaderName, ShaderStage, TextureName, TextureTarget,
};

/// Lightweight handle to a texture record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TextureId(pub u32);

/// Lightweight handle to a buffer record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BufferId(pub u32);

/// Lightweight handle to a shader record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ShaderId(pub u32);

/// Lightweight handle to a program record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ProgramId(pub u32);

/// Lightweight handle to an input-layout record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct InputLayoutId(pub u32);

/// Lightweight handle to a framebuffer record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FramebufferId(pub u32);

/// Texture record. `texture` stays `None` until the create step runs.
#[derive(Debug)]
pub struct Texture {
    pub texture: Option<TextureName>,
    pub target: TextureTarget,
}

/// Buffer record. Target and usage are fixed at record time.
#[derive(Debug)]
pub struct Buffer {
    pub buffer: Option<BufferName>,
    pub target: BufferTarget,
    pub usage: BufferUsageHint,
}

/// Shader record. `valid` flips to true only after a successful compile.
#[derive(Debug)]
pub struct Shader {
    pub shader: Option<ShaderName>,
    pub stage: ShaderStage,
    pub valid: bool,
}

/// Vertex attribute name bound to a fixed location before link.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AttribSemantic {
    pub location: u32,
    pub name: String,
}

/// A uniform the producer wants resolved at link time. `location` is -1
/// until the program links, and stays -1 if the uniform is absent.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UniformQuery {
    pub name: String,
    pub location: i32,
}

/// One-shot integer uniform upload run right after a successful link
/// (sampler slot assignments, typically).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UniformInitializer {
    /// Index into the program's query table.
    pub query: usize,
    pub value: i32,
}

/// Program record: attribute semantics and the uniform query table are
/// recorded up front, the rest is filled in when the create step links.
#[derive(Debug)]
pub struct Program {
    pub program: Option<ProgramName>,
    pub semantics: Vec<AttribSemantic>,
    pub uniforms: Vec<UniformQuery>,
    pub initializers: Vec<UniformInitializer>,
    pub valid: bool,
}

impl Program {
    pub fn new(semantics: Vec<AttribSemantic>) -> Self {
        Self {
            program: None,
            semantics,
            uniforms: Vec::new(),
            initializers: Vec::new(),
            valid: false,
        }
    }

    /// Registers a uniform to resolve at link time; returns its query index.
    pub fn add_uniform_query(&mut self, name: impl Into<String>) -> usize {
        self.uniforms.push(UniformQuery {
            name: name.into(),
            location: -1,
        });
        self.uniforms.len() - 1
    }

    /// Schedules an integer upload for right after link.
    pub fn add_initializer(&mut self, query: usize, value: i32) {
        self.initializers.push(UniformInitializer { query, value });
    }

    /// Looks up a resolved location by name. `None` covers both unknown
    /// names and uniforms the driver reported absent.
    pub fn uniform_location(&self, name: &str) -> Option<i32> {
        self.uniforms
            .iter()
            .find(|q| q.name == name)
            .map(|q| q.location)
            .filter(|&loc| loc >= 0)
    }
}

/// One vertex attribute of an input layout.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InputLayoutEntry {
    pub location: u32,
    pub count: u8,
    pub ty: AttribType,
    pub normalized: bool,
    pub stride: u32,
    pub offset: usize,
}

/// Input-layout record: fully producer-side, the create step issues no
/// device calls. `semantics_mask` has one bit set per attribute location.
#[derive(Debug)]
pub struct InputLayout {
    pub semantics_mask: u32,
    pub entries: Vec<InputLayoutEntry>,
}

impl InputLayout {
    pub fn new(entries: Vec<InputLayoutEntry>) -> Self {
        let mut semantics_mask = 0;
        for entry in &entries {
            semantics_mask |= 1 << entry.location;
        }
        Self {
            semantics_mask,
            entries,
        }
    }
}

/// Offscreen framebuffer record: a color texture plus an optional combined
/// depth-stencil renderbuffer, all created by the create step.
#[derive(Debug)]
pub struct Framebuffer {
    pub framebuffer: Option<FramebufferName>,
    pub width: u32,
    pub height: u32,
    pub color: Texture,
    pub z_stencil: bool,
    pub z_stencil_buffer: Option<RenderbufferName>,
}

impl Framebuffer {
    pub fn new(width: u32, height: u32, z_stencil: bool) -> Self {
        Self {
            framebuffer: None,
            width,
            height,
            color: Texture {
                texture: None,
                target: TextureTarget::Texture2d,
            },
            z_stencil,
            z_stencil_buffer: None,
        }
    }
}

/// Arena of all recorded resources, indexed by the typed ids.
#[derive(Debug, Default)]
pub struct Resources {
    textures: Vec<Texture>,
    buffers: Vec<Buffer>,
    shaders: Vec<Shader>,
    programs: Vec<Program>,
    input_layouts: Vec<InputLayout>,
    framebuffers: Vec<Framebuffer>,
}

impl Resources {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_texture(&mut self, target: TextureTarget) -> TextureId {
        self.textures.push(Texture {
            texture: None,
            target,
        });
        TextureId(self.textures.len() as u32 - 1)
    }

    pub fn add_buffer(&mut self, target: BufferTarget, usage: BufferUsageHint) -> BufferId {
        self.buffers.push(Buffer {
            buffer: None,
            target,
            usage,
        });
        BufferId(self.buffers.len() as u32 - 1)
    }

    pub fn add_shader(&mut self, stage: ShaderStage) -> ShaderId {
        self.shaders.push(Shader {
            shader: None,
            stage,
            valid: false,
        });
        ShaderId(self.shaders.len() as u32 - 1)
    }

    pub fn add_program(&mut self, program: Program) -> ProgramId {
        self.programs.push(program);
        ProgramId(self.programs.len() as u32 - 1)
    }

    pub fn add_input_layout(&mut self, layout: InputLayout) -> InputLayoutId {
        self.input_layouts.push(layout);
        InputLayoutId(self.input_layouts.len() as u32 - 1)
    }

    pub fn add_framebuffer(&mut self, width: u32, height: u32, z_stencil: bool) -> FramebufferId {
        self.framebuffers.push(Framebuffer::new(width, height, z_stencil));
        FramebufferId(self.framebuffers.len() as u32 - 1)
    }
}

impl Index<TextureId> for Resources {
    type Output = Texture;

    fn index(&self, id: TextureId) -> &Texture {
        &self.textures[id.0 as usize]
    }
}

impl IndexMut<TextureId> for Resources {
    fn index_mut(&mut self, id: TextureId) -> &mut Texture {
        &mut self.textures[id.0 as usize]
    }
}

impl Index<BufferId> for Resources {
    type Output = Buffer;

    fn index(&self, id: BufferId) -> &Buffer {
        &self.buffers[id.0 as usize]
    }
}

impl IndexMut<BufferId> for Resources {
    fn index_mut(&mut self, id: BufferId) -> &mut Buffer {
        &mut self.buffers[id.0 as usize]
    }
}

impl Index<ShaderId> for Resources {
    type Output = Shader;

    fn index(&self, id: ShaderId) -> &Shader {
        &self.shaders[id.0 as usize]
    }
}

impl IndexMut<ShaderId> for Resources {
    fn index_mut(&mut self, id: ShaderId) -> &mut Shader {
        &mut self.shaders[id.0 as usize]
    }
}

impl Index<ProgramId> for Resources {
    type Output = Program;

    fn index(&self, id: ProgramId) -> &Program {
        &self.programs[id.0 as usize]
    }
}

impl IndexMut<ProgramId> for Resources {
    fn index_mut(&mut self, id: ProgramId) -> &mut Program {
        &mut self.programs[id.0 as usize]
    }
}

impl Index<InputLayoutId> for Resources {
    type Output = InputLayout;

    fn index(&self, id: InputLayoutId) -> &InputLayout {
        &self.input_layouts[id.0 as usize]
    }
}

impl IndexMut<InputLayoutId> for Resources {
    fn index_mut(&mut self, id: InputLayoutId) -> &mut InputLayout {
        &mut self.input_layouts[id.0 as usize]
    }
}

impl Index<FramebufferId> for Resources {
    type Output = Framebuffer;

    fn index(&self, id: FramebufferId) -> &Framebuffer {
        &self.framebuffers[id.0 as usize]
    }
}

impl IndexMut<FramebufferId> for Resources {
    fn index_mut(&mut self, id: FramebufferId) -> &mut Framebuffer {
        &mut self.framebuffers[id.0 as usize]
    }
}
