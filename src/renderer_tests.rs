use cgmath::{vec4, Vector4};

use super::*;
use crate::{
    buffer::DrawType,
    mesh::DrawPrimitive,
    recording::{DriverCall, RecordingDriver},
    textures::ImageFormat,
};

fn black() -> Vector4<f32> {
    vec4(0.0, 0.0, 0.0, 1.0)
}

// Three Pos3Nor3Uv2 vertices.
const TRIANGLE: [f32; 24] = [
    -0.5, -0.5, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, //
    0.5, -0.5, 0.0, 0.0, 0.0, 1.0, 1.0, 0.0, //
    0.0, 0.5, 0.0, 0.0, 0.0, 1.0, 0.5, 1.0, //
];

fn renderer() -> Renderer<RecordingDriver> {
    Renderer::new(RecordingDriver::with_attributes(&[
        "position",
        "normal",
        "texcoord0",
    ]))
}

/// Shaders, a linked program and a material using it.
fn material(renderer: &mut Renderer<RecordingDriver>) -> (ShaderProgramHandle, MaterialHandle) {
    let vs = renderer
        .add_shader(Shader::vertex("void main() {}"))
        .expect("vertex shader");
    let fs = renderer
        .add_shader(Shader::fragment("void main() {}"))
        .expect("fragment shader");
    let program = renderer
        .add_shader_program(ShaderProgram::new(Some(vs), Some(fs), None))
        .expect("program");
    let material = renderer.add_material(Material::new("flat", Some(program)));
    (program, material)
}

fn triangle(renderer: &mut Renderer<RecordingDriver>, material: MaterialHandle) -> MeshHandle {
    let vertices = renderer
        .add_buffer(Buffer::vertices(&TRIANGLE, DrawType::Static))
        .expect("vertex buffer");
    renderer
        .add_mesh(Mesh::new(
            "triangle",
            vertices,
            None,
            VertexFormat::Pos3Nor3Uv2,
            Some(material),
        ))
        .expect("mesh")
}

fn frame(renderer: &mut Renderer<RecordingDriver>) -> (CameraHandle, RenderQueueHandle) {
    let camera = renderer.add_camera(Camera::new("main"));
    let mut queue = RenderQueue::new();
    queue
        .clear_buffers(true, true, false, black())
        .set_depth_test(true)
        .draw_meshes();
    let queue = renderer.add_render_queue(queue);
    (camera, queue)
}

fn uniform_values(driver: &RecordingDriver) -> Vec<Uniform> {
    driver
        .calls()
        .iter()
        .filter_map(|call| match call {
            DriverCall::SetUniform(_, value) => Some(*value),
            _ => None,
        })
        .collect()
}

#[test]
fn pool_counted_ids_start_at_one_and_increase() {
    let mut renderer = renderer();

    let ids: Vec<_> = (0..3)
        .map(|i| renderer.add_camera(Camera::new(format!("camera {i}"))).id())
        .collect();
    assert_eq!(ids, vec![1, 2, 3]);
    assert_eq!(renderer.count(ResourceKind::Camera), 3);
}

#[test]
fn registering_twice_returns_the_existing_handle() {
    let mut renderer = renderer();
    let handle = renderer
        .add_buffer(Buffer::vertices(&TRIANGLE, DrawType::Static))
        .expect("buffer");

    let again = renderer.buffer(handle).cloned().expect("registered");
    assert_eq!(renderer.add_buffer(again), Ok(handle));

    let creates = renderer
        .driver()
        .calls()
        .iter()
        .filter(|call| matches!(call, DriverCall::CreateBuffer(_)))
        .count();
    assert_eq!(creates, 1);
    assert_eq!(renderer.count(ResourceKind::Buffer), 1);
}

#[test]
fn stale_copy_is_not_mistaken_for_a_reused_driver_name() {
    let mut renderer = Renderer::new(RecordingDriver::new().reusing_names());
    let first = renderer
        .add_buffer(Buffer::vertices(&TRIANGLE, DrawType::Static))
        .expect("vertex buffer");
    let copy = renderer.buffer(first).cloned().expect("registered");
    renderer.remove_buffer(first).expect("buffer was live");

    // The driver hands name 1 out again.
    let second = renderer
        .add_buffer(Buffer::indices(&[0, 1, 2], DrawType::Static))
        .expect("index buffer");
    assert_eq!(second.id(), first.id());
    assert_ne!(second, first);

    let third = renderer.add_buffer(copy).expect("copy registers anew");
    assert_ne!(third, second);
    assert_ne!(third, first);
    assert_eq!(third.id(), 2);

    assert_eq!(renderer.buffer(second).map(|b| b.kind), Some(BufferType::Index));
    assert_eq!(renderer.buffer(third).map(|b| b.kind), Some(BufferType::Vertex));
    assert_eq!(renderer.count(ResourceKind::Buffer), 2);
}

#[test]
fn registering_a_material_twice_returns_the_existing_handle() {
    let mut renderer = renderer();
    let handle = renderer.add_material(Material::new("flat", None));

    let again = renderer.material(handle).cloned().expect("registered");
    assert_eq!(renderer.add_material(again), handle);
    assert_eq!(renderer.count(ResourceKind::Material), 1);

    // A removed material's copy is a new material.
    let copy = renderer.material(handle).cloned().expect("registered");
    renderer.remove_material(handle);
    let fresh = renderer.add_material(copy);
    assert_ne!(fresh, handle);
    assert_eq!(renderer.count(ResourceKind::Material), 1);
}

#[test]
fn registering_a_mesh_twice_builds_one_vertex_array() {
    let mut renderer = renderer();
    let (_, material) = material(&mut renderer);
    let mesh = triangle(&mut renderer, material);
    renderer.driver_mut().clear_calls();

    let again = renderer.mesh(mesh).cloned().expect("registered");
    assert_eq!(renderer.add_mesh(again), Ok(mesh));
    assert!(renderer.driver().calls().is_empty());
    assert_eq!(renderer.count(ResourceKind::Mesh), 1);
}

#[test]
fn empty_buffers_are_created_but_not_uploaded() {
    let mut renderer = renderer();
    renderer
        .add_buffer(Buffer::vertices(&[], DrawType::Dynamic))
        .expect("buffer");

    assert_eq!(renderer.driver().calls(), &[DriverCall::CreateBuffer(1)]);
}

#[test]
fn update_buffer_uploads_the_new_contents() {
    let mut renderer = renderer();
    let handle = renderer
        .add_buffer(Buffer::vertices(&TRIANGLE, DrawType::Dynamic))
        .expect("buffer");
    renderer.driver_mut().clear_calls();

    let data = bytemuck::cast_slice(&[1.0f32, 2.0]).to_vec();
    assert_eq!(renderer.update_buffer(handle, data, 2), Ok(()));
    assert_eq!(renderer.buffer(handle).map(|b| b.count), Some(2));
    assert_eq!(
        renderer.driver().calls(),
        &[DriverCall::UploadBuffer {
            buffer: 1,
            kind: BufferType::Vertex,
            usage: DrawType::Dynamic,
            len: 8,
        }]
    );

    renderer.remove_buffer(handle);
    assert_eq!(
        renderer.update_buffer(handle, Vec::new(), 0),
        Err(RenderError::UnknownHandle(handle.into()))
    );
}

#[test]
fn update_buffer_rejects_a_count_the_data_cannot_hold() {
    let mut renderer = renderer();
    let handle = renderer
        .add_buffer(Buffer::vertices(&TRIANGLE, DrawType::Dynamic))
        .expect("buffer");
    renderer.driver_mut().clear_calls();

    let data = bytemuck::cast_slice(&[1.0f32, 2.0]).to_vec();
    assert_eq!(
        renderer.update_buffer(handle, data, 3),
        Err(RenderError::InvalidBufferData { count: 3, len: 8 })
    );

    let buffer = renderer.buffer(handle).expect("still registered");
    assert_eq!(buffer.count, TRIANGLE.len());
    assert_eq!(buffer.size(), TRIANGLE.len() * 4);
    assert!(renderer.driver().calls().is_empty());
}

#[test]
fn buffer_with_too_little_data_is_never_created() {
    let mut renderer = renderer();
    let buffer = Buffer::new(BufferType::Index, DrawType::Static, vec![0; 10], 3);

    assert_eq!(
        renderer.add_buffer(buffer),
        Err(RenderError::InvalidBufferData { count: 3, len: 10 })
    );
    assert!(renderer.driver().calls().is_empty());
    assert_eq!(renderer.count(ResourceKind::Buffer), 0);
}

#[test]
fn removal_returns_the_resource_detached() {
    let mut renderer = renderer();
    let camera = renderer.add_camera(Camera::new("main"));

    let removed = renderer.remove_camera(camera).expect("camera was live");
    assert_eq!(removed.id(), 0);
    assert_eq!(removed.name, "main");

    assert!(renderer.camera(camera).is_none());
    assert!(renderer.resource(camera.into()).is_none());
    assert!(renderer.remove_camera(camera).is_none());
}

#[test]
fn ids_are_not_reused_after_removal() {
    let mut renderer = renderer();
    let first = renderer.add_material(Material::new("a", None));
    let second = renderer.add_material(Material::new("b", None));
    renderer.remove_material(second);

    let third = renderer.add_material(Material::new("c", None));
    assert_eq!(third.id(), 3);
    assert!(renderer.material(first).is_some());
    assert!(renderer.material(second).is_none());
}

#[test]
fn removing_driver_backed_resources_deletes_the_driver_object() {
    let mut renderer = renderer();
    let (program, material) = material(&mut renderer);
    let mesh = triangle(&mut renderer, material);
    renderer.driver_mut().clear_calls();

    renderer.remove_mesh(mesh).expect("mesh");
    renderer.remove_shader_program(program).expect("program");
    renderer.remove_material(material).expect("material");

    assert_eq!(
        renderer.driver().calls(),
        &[DriverCall::DeleteVertexArray(1), DriverCall::DeleteProgram(1)]
    );
}

#[test]
fn mesh_attributes_follow_the_vertex_format() {
    let mut renderer = renderer();
    let (_, material) = material(&mut renderer);
    triangle(&mut renderer, material);

    let attributes: Vec<_> = renderer
        .driver()
        .calls()
        .iter()
        .filter_map(|call| match call {
            DriverCall::EnableVertexAttribute {
                location,
                components,
                stride,
                offset,
            } => Some((*location, *components, *stride, *offset)),
            _ => None,
        })
        .collect();

    assert_eq!(attributes, vec![(0, 3, 32, 0), (1, 3, 32, 12), (2, 2, 32, 24)]);
}

#[test]
fn attributes_the_program_does_not_use_are_skipped() {
    let mut renderer = Renderer::new(RecordingDriver::with_attributes(&["position"]));
    let (_, material) = material(&mut renderer);
    triangle(&mut renderer, material);

    let enabled = renderer
        .driver()
        .calls()
        .iter()
        .filter(|call| matches!(call, DriverCall::EnableVertexAttribute { .. }))
        .count();
    assert_eq!(enabled, 1);
}

#[test]
fn mesh_without_material_gets_no_attributes() {
    let mut renderer = renderer();
    let vertices = renderer
        .add_buffer(Buffer::vertices(&TRIANGLE, DrawType::Static))
        .expect("buffer");
    renderer.driver_mut().clear_calls();

    renderer
        .add_mesh(Mesh::new("bare", vertices, None, VertexFormat::Pos3Nor3Uv2, None))
        .expect("mesh");

    assert_eq!(
        renderer.driver().calls(),
        &[
            DriverCall::CreateVertexArray(1),
            DriverCall::BindVertexArray(Some(1)),
            DriverCall::BindBuffer(BufferType::Vertex, Some(1)),
            DriverCall::BindVertexArray(None),
        ]
    );
}

#[test]
fn stale_buffer_handle_rolls_the_mesh_back() {
    let mut renderer = renderer();
    let (_, material) = material(&mut renderer);
    let vertices = renderer
        .add_buffer(Buffer::vertices(&TRIANGLE, DrawType::Static))
        .expect("buffer");
    renderer.remove_buffer(vertices);
    renderer.driver_mut().clear_calls();

    let result = renderer.add_mesh(Mesh::new(
        "orphan",
        vertices,
        None,
        VertexFormat::Pos3Nor3Uv2,
        Some(material),
    ));

    assert_eq!(result, Err(RenderError::UnknownHandle(vertices.into())));
    assert_eq!(renderer.count(ResourceKind::Mesh), 0);
    assert_eq!(
        renderer.driver().calls(),
        &[
            DriverCall::CreateVertexArray(1),
            DriverCall::BindVertexArray(Some(1)),
            DriverCall::BindVertexArray(None),
            DriverCall::DeleteVertexArray(1),
        ]
    );
}

#[test]
fn stale_index_buffer_is_an_error() {
    let mut renderer = renderer();
    let vertices = renderer
        .add_buffer(Buffer::vertices(&TRIANGLE, DrawType::Static))
        .expect("vertex buffer");
    let indices = renderer
        .add_buffer(Buffer::indices(&[0, 1, 2], DrawType::Static))
        .expect("index buffer");
    renderer.remove_buffer(indices);

    let result = renderer.add_mesh(Mesh::new(
        "orphan",
        vertices,
        Some(indices),
        VertexFormat::Pos3Nor3Uv2,
        None,
    ));
    assert_eq!(result, Err(RenderError::UnknownHandle(indices.into())));
}

#[test]
fn invalid_texture_data_is_rejected_before_the_driver_sees_it() {
    let mut renderer = renderer();
    let texture = Texture::new_2d("broken", ImageFormat::Rgba, 2, 2, vec![0; 3]);

    assert_eq!(
        renderer.add_texture(texture),
        Err(RenderError::InvalidTextureData {
            expected: 16,
            actual: 3,
        })
    );
    assert!(renderer.driver().calls().is_empty());
}

#[test]
fn failed_shader_diagnostics_do_not_fail_registration() {
    let mut driver = RecordingDriver::new();
    driver.fail_shader(1);
    driver.fail_program(1);
    let mut renderer = Renderer::new(driver);

    let (program, _) = material(&mut renderer);
    assert!(renderer.shader_program(program).is_some());
    assert!(renderer
        .driver()
        .calls()
        .contains(&DriverCall::ShaderStatus(1)));
}

#[test]
fn diagnostics_can_be_switched_off() {
    let config = RendererConfig::default().with_shader_diagnostics(false);
    let mut renderer = Renderer::with_config(RecordingDriver::new(), config);
    material(&mut renderer);

    assert!(!renderer.driver().calls().iter().any(|call| matches!(
        call,
        DriverCall::ShaderStatus(_) | DriverCall::ProgramStatus(_)
    )));
}

#[test]
fn unresolved_stages_are_left_out_of_the_link() {
    let mut renderer = renderer();
    let vs = renderer
        .add_shader(Shader::vertex("void main() {}"))
        .expect("shader");
    let fs = renderer
        .add_shader(Shader::fragment("void main() {}"))
        .expect("shader");
    renderer.remove_shader(fs);

    renderer
        .add_shader_program(ShaderProgram::new(Some(vs), Some(fs), None))
        .expect("program");
    assert!(renderer.driver().calls().contains(&DriverCall::CreateProgram {
        program: 1,
        shaders: vec![1],
    }));
}

#[test]
fn render_frame_ignores_unknown_handles() {
    let mut renderer = renderer();
    let (_, material) = material(&mut renderer);
    triangle(&mut renderer, material);
    let (camera, queue) = frame(&mut renderer);
    renderer.driver_mut().clear_calls();

    renderer.render_frame(CameraHandle::NULL, queue);
    renderer.render_frame(camera, RenderQueueHandle::NULL);
    assert!(renderer.driver().calls().is_empty());
}

#[test]
fn render_frame_without_meshes_issues_no_draws() {
    let mut renderer = renderer();
    let (camera, queue) = frame(&mut renderer);

    renderer.render_frame(camera, queue);
    assert!(renderer.driver().draw_calls().is_empty());
    assert_eq!(
        renderer.driver().calls(),
        &[
            DriverCall::Clear([0.0, 0.0, 0.0, 1.0], ClearMask::new(true, true, false)),
            DriverCall::SetCapability(Capability::DepthTest, true),
            DriverCall::BindVertexArray(None),
        ]
    );
}

#[test]
fn a_queue_replays_the_same_way_every_frame() {
    let mut renderer = renderer();
    let (_, material) = material(&mut renderer);
    triangle(&mut renderer, material);
    let (camera, queue) = frame(&mut renderer);
    let commands = renderer.render_queue(queue).map(RenderQueue::len);
    renderer.driver_mut().clear_calls();

    renderer.render_frame(camera, queue);
    let first = renderer.driver().calls().to_vec();
    renderer.driver_mut().clear_calls();
    renderer.render_frame(camera, queue);

    assert!(!first.is_empty());
    assert_eq!(renderer.driver().calls(), first.as_slice());
    assert_eq!(renderer.render_queue(queue).map(RenderQueue::len), commands);
}

#[test]
fn meshes_draw_indexed_or_as_arrays() {
    let mut renderer = renderer();
    let (_, material) = material(&mut renderer);
    triangle(&mut renderer, material);

    let vertices = renderer
        .add_buffer(Buffer::vertices(&TRIANGLE, DrawType::Static))
        .expect("buffer");
    let indices = renderer
        .add_buffer(Buffer::indices(&[0, 1, 2, 2, 1, 0], DrawType::Static))
        .expect("buffer");
    renderer
        .add_mesh(
            Mesh::new(
                "indexed",
                vertices,
                Some(indices),
                VertexFormat::Pos3Nor3Uv2,
                Some(material),
            )
            .with_primitive(DrawPrimitive::Lines),
        )
        .expect("mesh");

    let (camera, queue) = frame(&mut renderer);
    renderer.render_frame(camera, queue);

    assert_eq!(
        renderer.driver().draw_calls(),
        vec![
            &DriverCall::DrawArrays(DrawPrimitive::Triangles, 3),
            &DriverCall::DrawElements(DrawPrimitive::Lines, 6),
        ]
    );
}

#[test]
fn meshes_without_a_program_are_not_drawn() {
    let mut renderer = renderer();
    let material = renderer.add_material(Material::new("unshaded", None));
    triangle(&mut renderer, material);
    let (camera, queue) = frame(&mut renderer);

    renderer.render_frame(camera, queue);
    assert!(renderer.driver().draw_calls().is_empty());
}

#[test]
fn textures_bind_to_consecutive_units() {
    let mut renderer = renderer();
    let (_, material) = material(&mut renderer);

    let albedo = renderer
        .add_texture(Texture::new_2d("albedo", ImageFormat::Rgba, 1, 1, vec![255; 4]))
        .expect("texture");
    let gone = renderer
        .add_texture(Texture::new_2d("gone", ImageFormat::Rgb, 1, 1, vec![0; 3]))
        .expect("texture");
    let normal = renderer
        .add_texture(Texture::new_2d("normal", ImageFormat::Rgb, 1, 1, vec![128; 3]))
        .expect("texture");
    renderer.remove_texture(gone);

    if let Some(material) = renderer.material_mut(material) {
        material.add_texture("u_albedo", albedo);
        material.add_texture("u_missing", gone);
        material.add_texture("u_normal", normal);
    }
    triangle(&mut renderer, material);
    let (camera, queue) = frame(&mut renderer);
    renderer.render_frame(camera, queue);

    let binds: Vec<_> = renderer
        .driver()
        .calls()
        .iter()
        .filter_map(|call| match call {
            DriverCall::BindTexture { unit, texture, .. } => Some((*unit, *texture)),
            _ => None,
        })
        .collect();
    assert_eq!(binds, vec![(0, 1), (1, 3)]);

    let samplers = uniform_values(renderer.driver());
    assert_eq!(&samplers[..2], &[Uniform::Int(0), Uniform::Int(1)]);
}

#[test]
fn material_uniforms_override_program_uniforms() {
    let mut renderer = renderer();
    let (program, material) = material(&mut renderer);

    if let Some(program) = renderer.shader_program_mut(program) {
        program.set_uniform("u_tint", 1.0f32);
        program.set_uniform("u_scale", 2.0f32);
    }
    if let Some(material) = renderer.material_mut(material) {
        material.set_uniform("u_tint", 0.5f32);
    }
    triangle(&mut renderer, material);
    let (camera, queue) = frame(&mut renderer);
    renderer.render_frame(camera, queue);

    let values = uniform_values(renderer.driver());
    assert!(values.contains(&Uniform::Float(0.5)));
    assert!(values.contains(&Uniform::Float(2.0)));
    assert!(!values.contains(&Uniform::Float(1.0)));
    // view, proj and model follow.
    assert_eq!(values.len(), 5);
}

#[test]
fn blend_factors_are_only_set_when_blending_is_enabled() {
    let mut renderer = renderer();
    let camera = renderer.add_camera(Camera::new("main"));
    let mut queue = RenderQueue::new();
    queue
        .set_blend(false, BlendFactor::One, BlendFactor::Zero)
        .set_blend(true, BlendFactor::SrcAlpha, BlendFactor::OneMinusSrcAlpha);
    let queue = renderer.add_render_queue(queue);

    renderer.render_frame(camera, queue);
    assert_eq!(
        renderer.driver().calls(),
        &[
            DriverCall::SetCapability(Capability::Blend, false),
            DriverCall::SetCapability(Capability::Blend, true),
            DriverCall::BlendFunc(BlendFactor::SrcAlpha, BlendFactor::OneMinusSrcAlpha),
        ]
    );
}

#[test]
fn commands_run_in_queue_order() {
    let mut renderer = renderer();
    let camera = renderer.add_camera(Camera::new("main"));
    let viewport = Viewport::new(0, 0, 640, 480);
    let mut queue = RenderQueue::new();
    queue
        .set_viewport(viewport)
        .set_stencil_test(true)
        .clear_buffers(true, false, true, vec4(1.0, 0.0, 0.0, 1.0));
    let queue = renderer.add_render_queue(queue);

    renderer.render_frame(camera, queue);
    assert_eq!(
        renderer.driver().calls(),
        &[
            DriverCall::Viewport(viewport),
            DriverCall::SetCapability(Capability::StencilTest, true),
            DriverCall::Clear([1.0, 0.0, 0.0, 1.0], ClearMask::new(true, false, true)),
        ]
    );
}

#[test]
fn resources_round_trip_through_the_sum_types() {
    let mut renderer = renderer();
    let handle = renderer
        .add_resource(AnyResource::Light(Light::new(
            cgmath::vec3(0.0, 1.0, 0.0),
            vec4(1.0, 1.0, 1.0, 1.0),
            Default::default(),
            true,
        )))
        .expect("light");

    assert_eq!(handle.kind(), ResourceKind::Light);
    assert!(matches!(
        renderer.resource(handle),
        Some(ResourceRef::Light(light)) if light.is_on
    ));

    let removed = renderer.remove_resource(handle).expect("light was live");
    assert_eq!(removed.kind(), ResourceKind::Light);
    assert_eq!(removed.id(), 0);
    assert_eq!(renderer.count(ResourceKind::Light), 0);
}

#[test]
fn terminate_releases_dependents_first() {
    let mut renderer = renderer();
    let (_, material) = material(&mut renderer);
    renderer
        .add_texture(Texture::new_2d("white", ImageFormat::Rgb, 1, 1, vec![255; 3]))
        .expect("texture");
    let indices = renderer
        .add_buffer(Buffer::indices(&[0, 1, 2], DrawType::Static))
        .expect("buffer");
    let vertices = renderer
        .add_buffer(Buffer::vertices(&TRIANGLE, DrawType::Static))
        .expect("buffer");
    renderer
        .add_mesh(Mesh::new(
            "triangle",
            vertices,
            Some(indices),
            VertexFormat::Pos3Nor3Uv2,
            Some(material),
        ))
        .expect("mesh");
    frame(&mut renderer);
    renderer.driver_mut().clear_calls();

    renderer.terminate();

    assert_eq!(
        renderer.driver().calls(),
        &[
            DriverCall::DeleteVertexArray(1),
            DriverCall::DeleteProgram(1),
            DriverCall::DeleteShader(2),
            DriverCall::DeleteShader(1),
            DriverCall::DeleteTexture(1),
            DriverCall::DeleteBuffer(2),
            DriverCall::DeleteBuffer(1),
        ]
    );
    for kind in ResourceKind::TEARDOWN_ORDER {
        assert_eq!(renderer.count(kind), 0);
    }

    // A second pass has nothing left to release.
    renderer.driver_mut().clear_calls();
    renderer.terminate();
    assert!(renderer.driver().calls().is_empty());
}
