//! The narrow set of native calls the renderer is built on.
//!
//! Object names are plain `u32` values handed out by the driver; 0 is never
//! a valid name. Every method corresponds to one native call (or one short,
//! fixed sequence of them, e.g. create + source + compile for shaders).

use crate::{
    buffer::{BufferType, DrawType},
    config::TextureSampling,
    error::Result,
    mesh::DrawPrimitive,
    render_queue::{BlendFactor, ClearMask},
    shaders::{ShaderType, Uniform},
    textures::{Texture, TextureType},
    viewport::Viewport,
};

/// Fixed-function switches toggled by render commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    DepthTest,
    StencilTest,
    Blend,
}

pub trait Driver {
    fn create_buffer(&mut self) -> Result<u32>;
    /// Binds `buffer`, uploads `data` and unbinds again.
    fn upload_buffer(&mut self, buffer: u32, kind: BufferType, usage: DrawType, data: &[u8]);
    fn bind_buffer(&mut self, kind: BufferType, buffer: Option<u32>);
    fn delete_buffer(&mut self, buffer: u32);

    fn create_texture(&mut self) -> Result<u32>;
    /// Binds `texture`, uploads the pixel data, builds mipmaps if asked to,
    /// applies sampling and unbinds again.
    fn upload_texture(&mut self, texture: u32, data: &Texture, sampling: &TextureSampling);
    /// Makes `unit` active and binds `texture` to it.
    fn bind_texture(&mut self, unit: u32, kind: TextureType, texture: u32);
    fn delete_texture(&mut self, texture: u32);

    /// Creates, sources and compiles a shader object.
    fn create_shader(&mut self, kind: ShaderType, source: &str) -> Result<u32>;
    /// `Err` carries the compile log.
    fn shader_status(&mut self, shader: u32) -> std::result::Result<(), String>;
    fn delete_shader(&mut self, shader: u32);

    /// Creates a program, attaches `shaders` and links.
    fn create_program(&mut self, shaders: &[u32]) -> Result<u32>;
    /// `Err` carries the link log.
    fn program_status(&mut self, program: u32) -> std::result::Result<(), String>;
    fn use_program(&mut self, program: Option<u32>);
    fn delete_program(&mut self, program: u32);

    fn create_vertex_array(&mut self) -> Result<u32>;
    fn bind_vertex_array(&mut self, vertex_array: Option<u32>);
    fn delete_vertex_array(&mut self, vertex_array: u32);

    /// `None` when the program has no active attribute of that name.
    fn attribute_location(&mut self, program: u32, name: &str) -> Option<u32>;
    /// Enables `location` and describes it as `components` floats at `offset`
    /// bytes into a vertex of `stride` bytes in the bound vertex buffer.
    fn enable_vertex_attribute(&mut self, location: u32, components: i32, stride: i32, offset: i32);

    fn uniform_location(&mut self, program: u32, name: &str) -> Option<u32>;
    /// Uploads to the current program. A `None` location is ignored.
    fn set_uniform(&mut self, location: Option<u32>, value: &Uniform);

    fn clear(&mut self, color: [f32; 4], mask: ClearMask);
    fn set_capability(&mut self, capability: Capability, enabled: bool);
    fn blend_func(&mut self, src: BlendFactor, dst: BlendFactor);
    fn viewport(&mut self, viewport: &Viewport);

    /// Draws `count` `u32` indices from the bound element buffer.
    fn draw_elements(&mut self, primitive: DrawPrimitive, count: i32);
    fn draw_arrays(&mut self, primitive: DrawPrimitive, count: i32);
}
