//! Headless driver that records every call instead of talking to a GPU.

use std::collections::{BTreeMap, BTreeSet};

use crate::{
    buffer::{BufferType, DrawType},
    config::TextureSampling,
    driver::{Capability, Driver},
    error::Result,
    mesh::DrawPrimitive,
    render_queue::{BlendFactor, ClearMask},
    shaders::{ShaderType, Uniform},
    textures::{Texture, TextureType},
    viewport::Viewport,
};

#[derive(Debug, Clone, PartialEq)]
pub enum DriverCall {
    CreateBuffer(u32),
    UploadBuffer {
        buffer: u32,
        kind: BufferType,
        usage: DrawType,
        len: usize,
    },
    BindBuffer(BufferType, Option<u32>),
    DeleteBuffer(u32),
    CreateTexture(u32),
    UploadTexture {
        texture: u32,
        kind: TextureType,
        mipmaps: bool,
    },
    BindTexture {
        unit: u32,
        kind: TextureType,
        texture: u32,
    },
    DeleteTexture(u32),
    CreateShader(u32, ShaderType),
    ShaderStatus(u32),
    DeleteShader(u32),
    CreateProgram {
        program: u32,
        shaders: Vec<u32>,
    },
    ProgramStatus(u32),
    UseProgram(Option<u32>),
    DeleteProgram(u32),
    CreateVertexArray(u32),
    BindVertexArray(Option<u32>),
    DeleteVertexArray(u32),
    AttributeLocation(String),
    EnableVertexAttribute {
        location: u32,
        components: i32,
        stride: i32,
        offset: i32,
    },
    UniformLocation(String),
    SetUniform(Option<u32>, Uniform),
    Clear([f32; 4], ClearMask),
    SetCapability(Capability, bool),
    BlendFunc(BlendFactor, BlendFactor),
    Viewport(Viewport),
    DrawElements(DrawPrimitive, i32),
    DrawArrays(DrawPrimitive, i32),
}

impl DriverCall {
    pub fn is_draw(&self) -> bool {
        matches!(self, DriverCall::DrawElements(..) | DriverCall::DrawArrays(..))
    }
}

/// `Driver` that hands out names from per-kind counters starting at 1 and
/// remembers what it was asked to do.
///
/// With `reusing_names` a deleted name is handed out again by the next create
/// of the same kind, the way GL implementations do.
///
/// Attribute lookups only succeed for names passed to `with_attributes`
/// (locations follow the order given); uniform lookups always succeed, each
/// new name getting the next location.
#[derive(Debug, Default)]
pub struct RecordingDriver {
    calls: Vec<DriverCall>,
    reuse_names: bool,
    buffers: Names,
    textures: Names,
    shaders: Names,
    programs: Names,
    vertex_arrays: Names,
    attributes: Vec<String>,
    uniforms: BTreeMap<String, u32>,
    failing_shaders: BTreeSet<u32>,
    failing_programs: BTreeSet<u32>,
}

impl RecordingDriver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_attributes<T: ToString>(attributes: &[T]) -> Self {
        Self {
            attributes: attributes.iter().map(ToString::to_string).collect(),
            ..Self::default()
        }
    }

    pub fn reusing_names(mut self) -> Self {
        self.reuse_names = true;
        self
    }

    pub fn calls(&self) -> &[DriverCall] {
        &self.calls
    }

    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }

    pub fn draw_calls(&self) -> Vec<&DriverCall> {
        self.calls.iter().filter(|call| call.is_draw()).collect()
    }

    /// Reports a compile failure for the shader that will get name `shader`.
    pub fn fail_shader(&mut self, shader: u32) {
        self.failing_shaders.insert(shader);
    }

    /// Reports a link failure for the program that will get name `program`.
    pub fn fail_program(&mut self, program: u32) {
        self.failing_programs.insert(program);
    }

    fn record(&mut self, call: DriverCall) {
        self.calls.push(call);
    }
}

#[derive(Debug, Default)]
struct Names {
    last: u32,
    freed: Vec<u32>,
}

impl Names {
    fn next(&mut self, reuse: bool) -> u32 {
        if reuse {
            if let Some(name) = self.freed.pop() {
                return name;
            }
        }
        self.last += 1;
        self.last
    }

    fn free(&mut self, name: u32) {
        self.freed.push(name);
    }
}

impl Driver for RecordingDriver {
    fn create_buffer(&mut self) -> Result<u32> {
        let buffer = self.buffers.next(self.reuse_names);
        self.record(DriverCall::CreateBuffer(buffer));
        Ok(buffer)
    }

    fn upload_buffer(&mut self, buffer: u32, kind: BufferType, usage: DrawType, data: &[u8]) {
        self.record(DriverCall::UploadBuffer {
            buffer,
            kind,
            usage,
            len: data.len(),
        });
    }

    fn bind_buffer(&mut self, kind: BufferType, buffer: Option<u32>) {
        self.record(DriverCall::BindBuffer(kind, buffer));
    }

    fn delete_buffer(&mut self, buffer: u32) {
        self.buffers.free(buffer);
        self.record(DriverCall::DeleteBuffer(buffer));
    }

    fn create_texture(&mut self) -> Result<u32> {
        let texture = self.textures.next(self.reuse_names);
        self.record(DriverCall::CreateTexture(texture));
        Ok(texture)
    }

    fn upload_texture(&mut self, texture: u32, data: &Texture, sampling: &TextureSampling) {
        self.record(DriverCall::UploadTexture {
            texture,
            kind: data.kind,
            mipmaps: sampling.generate_mipmaps,
        });
    }

    fn bind_texture(&mut self, unit: u32, kind: TextureType, texture: u32) {
        self.record(DriverCall::BindTexture {
            unit,
            kind,
            texture,
        });
    }

    fn delete_texture(&mut self, texture: u32) {
        self.textures.free(texture);
        self.record(DriverCall::DeleteTexture(texture));
    }

    fn create_shader(&mut self, kind: ShaderType, _source: &str) -> Result<u32> {
        let shader = self.shaders.next(self.reuse_names);
        self.record(DriverCall::CreateShader(shader, kind));
        Ok(shader)
    }

    fn shader_status(&mut self, shader: u32) -> std::result::Result<(), String> {
        self.record(DriverCall::ShaderStatus(shader));
        if self.failing_shaders.contains(&shader) {
            Err(format!("shader {shader} failed to compile"))
        } else {
            Ok(())
        }
    }

    fn delete_shader(&mut self, shader: u32) {
        self.shaders.free(shader);
        self.record(DriverCall::DeleteShader(shader));
    }

    fn create_program(&mut self, shaders: &[u32]) -> Result<u32> {
        let program = self.programs.next(self.reuse_names);
        self.record(DriverCall::CreateProgram {
            program,
            shaders: shaders.to_vec(),
        });
        Ok(program)
    }

    fn program_status(&mut self, program: u32) -> std::result::Result<(), String> {
        self.record(DriverCall::ProgramStatus(program));
        if self.failing_programs.contains(&program) {
            Err(format!("program {program} failed to link"))
        } else {
            Ok(())
        }
    }

    fn use_program(&mut self, program: Option<u32>) {
        self.record(DriverCall::UseProgram(program));
    }

    fn delete_program(&mut self, program: u32) {
        self.programs.free(program);
        self.record(DriverCall::DeleteProgram(program));
    }

    fn create_vertex_array(&mut self) -> Result<u32> {
        let vao = self.vertex_arrays.next(self.reuse_names);
        self.record(DriverCall::CreateVertexArray(vao));
        Ok(vao)
    }

    fn bind_vertex_array(&mut self, vertex_array: Option<u32>) {
        self.record(DriverCall::BindVertexArray(vertex_array));
    }

    fn delete_vertex_array(&mut self, vertex_array: u32) {
        self.vertex_arrays.free(vertex_array);
        self.record(DriverCall::DeleteVertexArray(vertex_array));
    }

    fn attribute_location(&mut self, _program: u32, name: &str) -> Option<u32> {
        self.record(DriverCall::AttributeLocation(name.to_string()));
        self.attributes
            .iter()
            .position(|attribute| attribute == name)
            .map(|index| index as u32)
    }

    fn enable_vertex_attribute(&mut self, location: u32, components: i32, stride: i32, offset: i32) {
        self.record(DriverCall::EnableVertexAttribute {
            location,
            components,
            stride,
            offset,
        });
    }

    fn uniform_location(&mut self, _program: u32, name: &str) -> Option<u32> {
        self.record(DriverCall::UniformLocation(name.to_string()));
        let next_location = self.uniforms.len() as u32;
        Some(*self.uniforms.entry(name.to_string()).or_insert(next_location))
    }

    fn set_uniform(&mut self, location: Option<u32>, value: &Uniform) {
        self.record(DriverCall::SetUniform(location, *value));
    }

    fn clear(&mut self, color: [f32; 4], mask: ClearMask) {
        self.record(DriverCall::Clear(color, mask));
    }

    fn set_capability(&mut self, capability: Capability, enabled: bool) {
        self.record(DriverCall::SetCapability(capability, enabled));
    }

    fn blend_func(&mut self, src: BlendFactor, dst: BlendFactor) {
        self.record(DriverCall::BlendFunc(src, dst));
    }

    fn viewport(&mut self, viewport: &Viewport) {
        self.record(DriverCall::Viewport(*viewport));
    }

    fn draw_elements(&mut self, primitive: DrawPrimitive, count: i32) {
        self.record(DriverCall::DrawElements(primitive, count));
    }

    fn draw_arrays(&mut self, primitive: DrawPrimitive, count: i32) {
        self.record(DriverCall::DrawArrays(primitive, count));
    }
}
