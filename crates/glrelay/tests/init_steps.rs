//! Resource-creation batches: device call sequences, record population and
//! failure handling.

mod common;

use std::sync::Arc;

use glrelay::{
    AttribSemantic, AttribType, BufferName, BufferTarget, BufferUsageHint, DataFormat, DeviceCall,
    DeviceCaps, FramebufferName, FramebufferTarget, InitStep, InputLayout, InputLayoutEntry,
    Payload, Program, ProgramName, RenderbufferName, ShaderName, ShaderStage, TextureFilter,
    TextureName, TextureTarget, TextureWrap,
};
use pretty_assertions::assert_eq;

#[test]
fn create_texture_generates_and_binds_a_name() {
    let (mut runner, mut dev, mut resources) = common::ready_runner(DeviceCaps::desktop());
    let tex = resources.add_texture(TextureTarget::TextureCube);

    runner.run_init_steps(
        &mut dev,
        &mut resources,
        vec![InitStep::CreateTexture { texture: tex }],
    );

    assert_eq!(
        dev.calls(),
        vec![
            DeviceCall::GenTextures { count: 1 },
            DeviceCall::BindTexture {
                target: TextureTarget::TextureCube,
                name: Some(TextureName(1)),
            },
        ]
    );
    assert_eq!(resources[tex].texture, Some(TextureName(1)));
}

#[test]
fn create_buffer_allocates_uninitialized_storage() {
    let (mut runner, mut dev, mut resources) = common::ready_runner(DeviceCaps::desktop());
    let buf = resources.add_buffer(BufferTarget::Array, BufferUsageHint::StaticDraw);

    runner.run_init_steps(
        &mut dev,
        &mut resources,
        vec![InitStep::CreateBuffer { buffer: buf, size: 256 }],
    );

    assert_eq!(
        dev.calls(),
        vec![
            DeviceCall::GenBuffer,
            DeviceCall::BindBuffer {
                target: BufferTarget::Array,
                name: Some(BufferName(1)),
            },
            DeviceCall::BufferDataUninit {
                target: BufferTarget::Array,
                size: 256,
                usage: BufferUsageHint::StaticDraw,
            },
        ]
    );
    assert_eq!(resources[buf].buffer, Some(BufferName(1)));
}

#[test]
fn buffer_upload_goes_through_the_array_binding_and_releases_its_reference() {
    let (mut runner, mut dev, mut resources) = common::ready_runner(DeviceCaps::desktop());
    let buf = resources.add_buffer(BufferTarget::ElementArray, BufferUsageHint::DynamicDraw);
    runner.run_init_steps(
        &mut dev,
        &mut resources,
        vec![InitStep::CreateBuffer { buffer: buf, size: 64 }],
    );
    dev.clear_calls();

    let bytes: Arc<[u8]> = Arc::from(vec![7u8; 16].into_boxed_slice());
    runner.run_init_steps(
        &mut dev,
        &mut resources,
        vec![InitStep::BufferSubData {
            buffer: buf,
            offset: 32,
            data: Payload::Shared(bytes.clone()),
        }],
    );

    // Our reference is gone the moment the upload call returns.
    assert_eq!(Arc::strong_count(&bytes), 1);
    // Even index buffers upload through the array binding point.
    assert_eq!(
        dev.calls(),
        vec![
            DeviceCall::BindBuffer {
                target: BufferTarget::Array,
                name: Some(BufferName(1)),
            },
            DeviceCall::BufferSubData {
                target: BufferTarget::Array,
                offset: 32,
                data: vec![7u8; 16],
            },
        ]
    );
}

#[test]
fn create_program_attaches_binds_links_and_resolves() {
    let (mut runner, mut dev, mut resources) = common::ready_runner(DeviceCaps::desktop());
    let vs = resources.add_shader(ShaderStage::Vertex);
    let fs = resources.add_shader(ShaderStage::Fragment);

    let mut program = Program::new(vec![
        AttribSemantic {
            location: 0,
            name: "a_position".to_owned(),
        },
        AttribSemantic {
            location: 1,
            name: "a_uv".to_owned(),
        },
    ]);
    let sampler = program.add_uniform_query("u_tex");
    program.add_initializer(sampler, 0);
    let prog = resources.add_program(program);

    runner.run_init_steps(
        &mut dev,
        &mut resources,
        vec![
            InitStep::CreateShader {
                shader: vs,
                source: b"void main() {}".to_vec().into(),
            },
            InitStep::CreateShader {
                shader: fs,
                source: b"out vec4 fragColor0;".to_vec().into(),
            },
        ],
    );
    assert!(resources[vs].valid);
    assert!(resources[fs].valid);
    dev.clear_calls();

    runner.run_init_steps(
        &mut dev,
        &mut resources,
        vec![InitStep::CreateProgram {
            program: prog,
            shaders: vec![vs, fs],
            support_dual_source: false,
        }],
    );

    assert_eq!(
        dev.calls(),
        vec![
            DeviceCall::CreateProgram,
            DeviceCall::AttachShader {
                program: ProgramName(1),
                shader: ShaderName(1),
            },
            DeviceCall::AttachShader {
                program: ProgramName(1),
                shader: ShaderName(2),
            },
            DeviceCall::BindAttribLocation {
                program: ProgramName(1),
                location: 0,
                name: "a_position".to_owned(),
            },
            DeviceCall::BindAttribLocation {
                program: ProgramName(1),
                location: 1,
                name: "a_uv".to_owned(),
            },
            DeviceCall::BindFragDataLocation {
                program: ProgramName(1),
                color: 0,
                name: "fragColor0".to_owned(),
            },
            DeviceCall::LinkProgram {
                program: ProgramName(1),
            },
            DeviceCall::UseProgram {
                program: ProgramName(1),
            },
            DeviceCall::UniformLocation {
                program: ProgramName(1),
                name: "u_tex".to_owned(),
            },
            DeviceCall::UniformI32 {
                location: 0,
                values: vec![0],
            },
        ]
    );
    assert!(resources[prog].valid);
    assert_eq!(resources[prog].uniform_location("u_tex"), Some(0));
}

#[test]
fn initializers_skip_uniforms_the_driver_reported_absent() {
    let (mut runner, mut dev, mut resources) = common::ready_runner(DeviceCaps::desktop());
    dev.set_missing_uniform("u_unused");
    let fs = resources.add_shader(ShaderStage::Fragment);
    let mut program = Program::new(Vec::new());
    let gone = program.add_uniform_query("u_unused");
    program.add_initializer(gone, 3);
    let prog = resources.add_program(program);

    runner.run_init_steps(
        &mut dev,
        &mut resources,
        vec![
            InitStep::CreateShader {
                shader: fs,
                source: vec![0u8; 4].into(),
            },
            InitStep::CreateProgram {
                program: prog,
                shaders: vec![fs],
                support_dual_source: false,
            },
        ],
    );

    assert!(resources[prog].valid);
    assert_eq!(resources[prog].uniform_location("u_unused"), None);
    assert!(!dev
        .calls()
        .iter()
        .any(|c| matches!(c, DeviceCall::UniformI32 { .. })));
}

fn program_calls(caps: DeviceCaps, support_dual_source: bool) -> Vec<DeviceCall> {
    let (mut runner, mut dev, mut resources) = common::ready_runner(caps);
    let fs = resources.add_shader(ShaderStage::Fragment);
    let prog = resources.add_program(Program::new(Vec::new()));
    runner.run_init_steps(
        &mut dev,
        &mut resources,
        vec![InitStep::CreateShader {
            shader: fs,
            source: vec![0u8; 4].into(),
        }],
    );
    dev.clear_calls();
    runner.run_init_steps(
        &mut dev,
        &mut resources,
        vec![InitStep::CreateProgram {
            program: prog,
            shaders: vec![fs],
            support_dual_source,
        }],
    );
    dev.take_calls()
}

#[test]
fn fragment_output_binding_follows_device_caps() {
    // Requested and supported: both outputs bound at color 0, indices 0/1.
    let dual = program_calls(DeviceCaps::desktop(), true);
    assert!(dual.contains(&DeviceCall::BindFragDataLocationIndexed {
        program: ProgramName(1),
        color: 0,
        index: 0,
        name: "fragColor0".to_owned(),
    }));
    assert!(dual.contains(&DeviceCall::BindFragDataLocationIndexed {
        program: ProgramName(1),
        color: 0,
        index: 1,
        name: "fragColor1".to_owned(),
    }));
    assert!(!dual
        .iter()
        .any(|c| matches!(c, DeviceCall::BindFragDataLocation { .. })));

    // Requested but unsupported on a desktop 3.3+ context: single named
    // output.
    let named = program_calls(
        DeviceCaps {
            dual_source_blend: false,
            ..DeviceCaps::desktop()
        },
        true,
    );
    assert!(named.contains(&DeviceCall::BindFragDataLocation {
        program: ProgramName(1),
        color: 0,
        name: "fragColor0".to_owned(),
    }));
    assert!(!named
        .iter()
        .any(|c| matches!(c, DeviceCall::BindFragDataLocationIndexed { .. })));

    // GLES binds neither, even when the step requests dual-source.
    let neither = program_calls(DeviceCaps::gles(), true);
    assert!(!neither.iter().any(|c| matches!(
        c,
        DeviceCall::BindFragDataLocation { .. } | DeviceCall::BindFragDataLocationIndexed { .. }
    )));
}

#[test]
fn link_failure_marks_only_that_program_and_continues() {
    let (mut runner, mut dev, mut resources) = common::ready_runner(DeviceCaps::desktop());
    dev.fail_link(ProgramName(1), "varying mismatch");

    let fs = resources.add_shader(ShaderStage::Fragment);
    let mut program = Program::new(Vec::new());
    program.add_uniform_query("u_color");
    let prog = resources.add_program(program);
    let tex = resources.add_texture(TextureTarget::Texture2d);

    runner.run_init_steps(
        &mut dev,
        &mut resources,
        vec![
            InitStep::CreateShader {
                shader: fs,
                source: vec![1u8].into(),
            },
            InitStep::CreateProgram {
                program: prog,
                shaders: vec![fs],
                support_dual_source: false,
            },
            InitStep::CreateTexture { texture: tex },
        ],
    );

    assert!(!resources[prog].valid);
    assert_eq!(resources[prog].program, Some(ProgramName(1)));
    assert_eq!(resources[prog].uniform_location("u_color"), None);
    // No post-link work happened for the failed program.
    assert!(!dev.calls().iter().any(|c| matches!(
        c,
        DeviceCall::UseProgram { .. } | DeviceCall::UniformLocation { .. }
    )));
    // The batch still created the texture that followed.
    assert_eq!(resources[tex].texture, Some(TextureName(1)));
}

#[test]
fn compile_failure_deletes_the_shader_and_continues() {
    let (mut runner, mut dev, mut resources) = common::ready_runner(DeviceCaps::desktop());
    dev.fail_compile(ShaderName(1), "unexpected token");

    let bad = resources.add_shader(ShaderStage::Vertex);
    let good = resources.add_shader(ShaderStage::Fragment);
    runner.run_init_steps(
        &mut dev,
        &mut resources,
        vec![
            InitStep::CreateShader {
                shader: bad,
                source: vec![0xDE, 0xAD].into(),
            },
            InitStep::CreateShader {
                shader: good,
                source: vec![0u8].into(),
            },
        ],
    );

    assert_eq!(
        dev.calls(),
        vec![
            DeviceCall::CreateShader {
                stage: ShaderStage::Vertex,
            },
            DeviceCall::ShaderSource {
                shader: ShaderName(1),
                source: vec![0xDE, 0xAD],
            },
            DeviceCall::CompileShader {
                shader: ShaderName(1),
            },
            DeviceCall::DeleteShader {
                shader: ShaderName(1),
            },
            DeviceCall::CreateShader {
                stage: ShaderStage::Fragment,
            },
            DeviceCall::ShaderSource {
                shader: ShaderName(2),
                source: vec![0u8],
            },
            DeviceCall::CompileShader {
                shader: ShaderName(2),
            },
        ]
    );
    assert!(!resources[bad].valid);
    assert_eq!(resources[bad].shader, None);
    assert!(resources[good].valid);
    assert_eq!(resources[good].shader, Some(ShaderName(2)));
}

#[test]
#[should_panic(expected = "zero shaders")]
fn zero_shader_program_is_a_contract_violation() {
    let (mut runner, mut dev, mut resources) = common::ready_runner(DeviceCaps::desktop());
    let prog = resources.add_program(Program::new(Vec::new()));
    runner.run_init_steps(
        &mut dev,
        &mut resources,
        vec![InitStep::CreateProgram {
            program: prog,
            shaders: Vec::new(),
            support_dual_source: false,
        }],
    );
}

#[test]
fn texture_image_uploads_and_sets_sampling_defaults() {
    let (mut runner, mut dev, mut resources) = common::ready_runner(DeviceCaps::desktop());
    let tex = resources.add_texture(TextureTarget::Texture2d);
    runner.run_init_steps(
        &mut dev,
        &mut resources,
        vec![InitStep::CreateTexture { texture: tex }],
    );
    dev.clear_calls();

    runner.run_init_steps(
        &mut dev,
        &mut resources,
        vec![InitStep::TextureImage {
            texture: tex,
            level: 0,
            format: DataFormat::Rgba8,
            width: 2,
            height: 2,
            data: Some(vec![0xAB; 16].into()),
            linear_filter: true,
        }],
    );

    assert_eq!(
        dev.calls(),
        vec![
            DeviceCall::BindTexture {
                target: TextureTarget::Texture2d,
                name: Some(TextureName(1)),
            },
            DeviceCall::TexImage2d {
                target: TextureTarget::Texture2d,
                level: 0,
                format: DataFormat::Rgba8,
                width: 2,
                height: 2,
                data: Some(vec![0xAB; 16]),
            },
            DeviceCall::TexWrap {
                target: TextureTarget::Texture2d,
                wrap_s: TextureWrap::ClampToEdge,
                wrap_t: TextureWrap::ClampToEdge,
            },
            DeviceCall::TexFilter {
                target: TextureTarget::Texture2d,
                mag: TextureFilter::Linear,
                min: TextureFilter::Linear,
            },
        ]
    );
}

#[test]
fn texture_image_without_bytes_allocates_the_level() {
    let (mut runner, mut dev, mut resources) = common::ready_runner(DeviceCaps::desktop());
    let tex = resources.add_texture(TextureTarget::Texture2d);
    runner.run_init_steps(
        &mut dev,
        &mut resources,
        vec![InitStep::CreateTexture { texture: tex }],
    );
    dev.clear_calls();

    runner.run_init_steps(
        &mut dev,
        &mut resources,
        vec![InitStep::TextureImage {
            texture: tex,
            level: 1,
            format: DataFormat::Rgba8,
            width: 4,
            height: 4,
            data: None,
            linear_filter: false,
        }],
    );

    assert!(dev.calls().contains(&DeviceCall::TexImage2d {
        target: TextureTarget::Texture2d,
        level: 1,
        format: DataFormat::Rgba8,
        width: 4,
        height: 4,
        data: None,
    }));
    assert!(dev.calls().contains(&DeviceCall::TexFilter {
        target: TextureTarget::Texture2d,
        mag: TextureFilter::Nearest,
        min: TextureFilter::Nearest,
    }));
}

#[test]
fn texture_sub_data_updates_a_region() {
    let (mut runner, mut dev, mut resources) = common::ready_runner(DeviceCaps::desktop());
    let tex = resources.add_texture(TextureTarget::Texture2d);
    runner.run_init_steps(
        &mut dev,
        &mut resources,
        vec![InitStep::CreateTexture { texture: tex }],
    );
    dev.clear_calls();

    runner.run_init_steps(
        &mut dev,
        &mut resources,
        vec![InitStep::TextureSubData {
            texture: tex,
            level: 0,
            x: 1,
            y: 2,
            width: 2,
            height: 1,
            format: DataFormat::Rgba8,
            data: vec![1, 2, 3, 4, 5, 6, 7, 8].into(),
        }],
    );

    assert_eq!(
        dev.calls(),
        vec![
            DeviceCall::BindTexture {
                target: TextureTarget::Texture2d,
                name: Some(TextureName(1)),
            },
            DeviceCall::TexSubImage2d {
                target: TextureTarget::Texture2d,
                level: 0,
                x: 1,
                y: 2,
                width: 2,
                height: 1,
                format: DataFormat::Rgba8,
                data: vec![1, 2, 3, 4, 5, 6, 7, 8],
            },
        ]
    );
}

#[test]
fn create_framebuffer_builds_attachments_and_stays_bound() {
    let (mut runner, mut dev, mut resources) = common::ready_runner(DeviceCaps::desktop());
    let fb = resources.add_framebuffer(128, 64, true);

    runner.run_init_steps(
        &mut dev,
        &mut resources,
        vec![InitStep::CreateFramebuffer { framebuffer: fb }],
    );

    // The color texture comes from the name pool: one batch of 16, popped
    // from the back.
    let color = TextureName(16);
    assert_eq!(
        dev.calls(),
        vec![
            DeviceCall::GenFramebuffer,
            DeviceCall::GenTextures { count: 16 },
            DeviceCall::BindTexture {
                target: TextureTarget::Texture2d,
                name: Some(color),
            },
            DeviceCall::TexImage2d {
                target: TextureTarget::Texture2d,
                level: 0,
                format: DataFormat::Rgba8,
                width: 128,
                height: 64,
                data: None,
            },
            DeviceCall::TexWrap {
                target: TextureTarget::Texture2d,
                wrap_s: TextureWrap::ClampToEdge,
                wrap_t: TextureWrap::ClampToEdge,
            },
            DeviceCall::TexFilter {
                target: TextureTarget::Texture2d,
                mag: TextureFilter::Linear,
                min: TextureFilter::Linear,
            },
            DeviceCall::BindFramebuffer {
                target: FramebufferTarget::ReadDraw,
                name: Some(FramebufferName(1)),
            },
            DeviceCall::FramebufferColorTexture { texture: color },
            DeviceCall::GenRenderbuffer,
            DeviceCall::BindRenderbuffer {
                name: Some(RenderbufferName(1)),
            },
            DeviceCall::RenderbufferStorageDepthStencil {
                width: 128,
                height: 64,
            },
            DeviceCall::FramebufferDepthStencilRenderbuffer {
                renderbuffer: RenderbufferName(1),
            },
            DeviceCall::FramebufferComplete,
            DeviceCall::BindRenderbuffer { name: None },
        ]
    );
    assert_eq!(resources[fb].framebuffer, Some(FramebufferName(1)));
    assert_eq!(resources[fb].color.texture, Some(color));
    assert_eq!(resources[fb].z_stencil_buffer, Some(RenderbufferName(1)));
}

#[test]
fn create_framebuffer_without_depth_skips_renderbuffer_work() {
    let (mut runner, mut dev, mut resources) = common::ready_runner(DeviceCaps::desktop());
    let fb = resources.add_framebuffer(32, 32, false);

    runner.run_init_steps(
        &mut dev,
        &mut resources,
        vec![InitStep::CreateFramebuffer { framebuffer: fb }],
    );

    assert!(!dev.calls().iter().any(|c| matches!(
        c,
        DeviceCall::GenRenderbuffer
            | DeviceCall::BindRenderbuffer { .. }
            | DeviceCall::RenderbufferStorageDepthStencil { .. }
            | DeviceCall::FramebufferDepthStencilRenderbuffer { .. }
    )));
    assert!(dev.calls().contains(&DeviceCall::FramebufferComplete));
    assert_eq!(resources[fb].z_stencil_buffer, None);
}

#[test]
fn incomplete_framebuffer_keeps_its_handles() {
    let (mut runner, mut dev, mut resources) = common::ready_runner(DeviceCaps::desktop());
    dev.set_framebuffer_incomplete();
    let fb = resources.add_framebuffer(16, 16, true);

    runner.run_init_steps(
        &mut dev,
        &mut resources,
        vec![InitStep::CreateFramebuffer { framebuffer: fb }],
    );

    assert_eq!(resources[fb].framebuffer, Some(FramebufferName(1)));
    assert_eq!(resources[fb].color.texture, Some(TextureName(16)));
}

#[test]
fn create_input_layout_issues_no_device_calls() {
    let (mut runner, mut dev, mut resources) = common::ready_runner(DeviceCaps::desktop());
    let layout = resources.add_input_layout(InputLayout::new(vec![InputLayoutEntry {
        location: 0,
        count: 3,
        ty: AttribType::F32,
        normalized: false,
        stride: 12,
        offset: 0,
    }]));

    runner.run_init_steps(
        &mut dev,
        &mut resources,
        vec![InitStep::CreateInputLayout { input_layout: layout }],
    );

    assert!(dev.calls().is_empty());
}
