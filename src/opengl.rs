use std::{num::NonZeroU32, sync::Arc};

use glow::HasContext;

use crate::{
    buffer::{BufferType, DrawType},
    config::{TextureFilter, TextureSampling, TextureWrap},
    driver::{Capability, Driver},
    error::{RenderError, Result},
    mesh::DrawPrimitive,
    render_queue::{BlendFactor, ClearMask},
    shaders::{ShaderType, Uniform},
    textures::{ImageFormat, Texture, TextureType},
    viewport::Viewport,
};

/// Translation of the renderer's enums into GL constants.
trait ToGl {
    fn to_gl(&self) -> u32;
}

impl ToGl for BufferType {
    fn to_gl(&self) -> u32 {
        match self {
            BufferType::Vertex => glow::ARRAY_BUFFER,
            BufferType::Index => glow::ELEMENT_ARRAY_BUFFER,
        }
    }
}

impl ToGl for DrawType {
    fn to_gl(&self) -> u32 {
        match self {
            DrawType::Static => glow::STATIC_DRAW,
            DrawType::Dynamic => glow::DYNAMIC_DRAW,
        }
    }
}

impl ToGl for TextureType {
    fn to_gl(&self) -> u32 {
        match self {
            TextureType::Texture1D => glow::TEXTURE_1D,
            TextureType::Texture2D => glow::TEXTURE_2D,
            TextureType::Texture3D => glow::TEXTURE_3D,
        }
    }
}

impl ToGl for ImageFormat {
    fn to_gl(&self) -> u32 {
        match self {
            ImageFormat::Rgb => glow::RGB,
            ImageFormat::Rgba => glow::RGBA,
        }
    }
}

impl ToGl for DrawPrimitive {
    fn to_gl(&self) -> u32 {
        match self {
            DrawPrimitive::Triangles => glow::TRIANGLES,
            DrawPrimitive::Points => glow::POINTS,
            DrawPrimitive::Lines => glow::LINES,
        }
    }
}

impl ToGl for BlendFactor {
    fn to_gl(&self) -> u32 {
        match self {
            BlendFactor::Zero => glow::ZERO,
            BlendFactor::One => glow::ONE,
            BlendFactor::SrcColor => glow::SRC_COLOR,
            BlendFactor::OneMinusSrcColor => glow::ONE_MINUS_SRC_COLOR,
            BlendFactor::DstColor => glow::DST_COLOR,
            BlendFactor::OneMinusDstColor => glow::ONE_MINUS_DST_COLOR,
            BlendFactor::SrcAlpha => glow::SRC_ALPHA,
            BlendFactor::OneMinusSrcAlpha => glow::ONE_MINUS_SRC_ALPHA,
            BlendFactor::DstAlpha => glow::DST_ALPHA,
            BlendFactor::OneMinusDstAlpha => glow::ONE_MINUS_DST_ALPHA,
            BlendFactor::ConstantColor => glow::CONSTANT_COLOR,
            BlendFactor::OneMinusConstantColor => glow::ONE_MINUS_CONSTANT_COLOR,
            BlendFactor::ConstantAlpha => glow::CONSTANT_ALPHA,
            BlendFactor::OneMinusConstantAlpha => glow::ONE_MINUS_CONSTANT_ALPHA,
        }
    }
}

impl ToGl for ShaderType {
    fn to_gl(&self) -> u32 {
        match self {
            ShaderType::Vertex => glow::VERTEX_SHADER,
            ShaderType::Fragment => glow::FRAGMENT_SHADER,
            ShaderType::Geometry => glow::GEOMETRY_SHADER,
        }
    }
}

impl ToGl for Capability {
    fn to_gl(&self) -> u32 {
        match self {
            Capability::DepthTest => glow::DEPTH_TEST,
            Capability::StencilTest => glow::STENCIL_TEST,
            Capability::Blend => glow::BLEND,
        }
    }
}

impl ToGl for TextureWrap {
    fn to_gl(&self) -> u32 {
        match self {
            TextureWrap::Repeat => glow::REPEAT,
            TextureWrap::MirroredRepeat => glow::MIRRORED_REPEAT,
            TextureWrap::ClampToEdge => glow::CLAMP_TO_EDGE,
        }
    }
}

impl ToGl for TextureFilter {
    fn to_gl(&self) -> u32 {
        match self {
            TextureFilter::Nearest => glow::NEAREST,
            TextureFilter::Linear => glow::LINEAR,
            TextureFilter::NearestMipmapNearest => glow::NEAREST_MIPMAP_NEAREST,
            TextureFilter::LinearMipmapNearest => glow::LINEAR_MIPMAP_NEAREST,
            TextureFilter::NearestMipmapLinear => glow::NEAREST_MIPMAP_LINEAR,
            TextureFilter::LinearMipmapLinear => glow::LINEAR_MIPMAP_LINEAR,
        }
    }
}

impl ToGl for ClearMask {
    fn to_gl(&self) -> u32 {
        let mut bits = 0;
        if self.color {
            bits |= glow::COLOR_BUFFER_BIT;
        }
        if self.depth {
            bits |= glow::DEPTH_BUFFER_BIT;
        }
        if self.stencil {
            bits |= glow::STENCIL_BUFFER_BIT;
        }
        bits
    }
}

fn name(id: u32) -> Option<NonZeroU32> {
    NonZeroU32::new(id)
}

/// Largest `GL_UNPACK_ALIGNMENT` the texture's rows satisfy, so GL never
/// expects padding the data does not have.
fn unpack_alignment(texture: &Texture) -> i32 {
    let row = texture.row_len();
    [8, 4, 2]
        .into_iter()
        .find(|alignment| row % alignment == 0)
        .unwrap_or(1) as i32
}

/// `Driver` over an OpenGL 3.3 core context. The context must be current on
/// the calling thread for as long as the driver is used.
pub struct GlDriver {
    gl: Arc<glow::Context>,
}

impl GlDriver {
    pub fn new(gl: Arc<glow::Context>) -> Self {
        Self { gl }
    }

    pub fn context(&self) -> &Arc<glow::Context> {
        &self.gl
    }
}

impl Driver for GlDriver {
    fn create_buffer(&mut self) -> Result<u32> {
        let buffer = unsafe { self.gl.create_buffer() }.map_err(RenderError::Driver)?;
        Ok(buffer.0.get())
    }

    fn upload_buffer(&mut self, buffer: u32, kind: BufferType, usage: DrawType, data: &[u8]) {
        let target = kind.to_gl();
        unsafe {
            self.gl
                .bind_buffer(target, name(buffer).map(glow::NativeBuffer));
            self.gl.buffer_data_u8_slice(target, data, usage.to_gl());
            self.gl.bind_buffer(target, None);
        }
    }

    fn bind_buffer(&mut self, kind: BufferType, buffer: Option<u32>) {
        unsafe {
            self.gl.bind_buffer(
                kind.to_gl(),
                buffer.and_then(name).map(glow::NativeBuffer),
            );
        }
    }

    fn delete_buffer(&mut self, buffer: u32) {
        if let Some(buffer) = name(buffer) {
            unsafe { self.gl.delete_buffer(glow::NativeBuffer(buffer)) };
        }
    }

    fn create_texture(&mut self) -> Result<u32> {
        let texture = unsafe { self.gl.create_texture() }.map_err(RenderError::Driver)?;
        Ok(texture.0.get())
    }

    fn upload_texture(&mut self, texture: u32, data: &Texture, sampling: &TextureSampling) {
        let target = data.kind.to_gl();
        let format = data.format.to_gl();
        let pixels = glow::PixelUnpackData::Slice(Some(&data.data));

        unsafe {
            self.gl
                .bind_texture(target, name(texture).map(glow::NativeTexture));
            self.gl
                .pixel_store_i32(glow::UNPACK_ALIGNMENT, unpack_alignment(data));

            match data.kind {
                TextureType::Texture1D => self.gl.tex_image_1d(
                    target,
                    0,
                    format as i32,
                    data.width as i32,
                    0,
                    format,
                    glow::UNSIGNED_BYTE,
                    pixels,
                ),
                TextureType::Texture2D => self.gl.tex_image_2d(
                    target,
                    0,
                    format as i32,
                    data.width as i32,
                    data.height as i32,
                    0,
                    format,
                    glow::UNSIGNED_BYTE,
                    pixels,
                ),
                TextureType::Texture3D => self.gl.tex_image_3d(
                    target,
                    0,
                    format as i32,
                    data.width as i32,
                    data.height as i32,
                    data.depth as i32,
                    0,
                    format,
                    glow::UNSIGNED_BYTE,
                    pixels,
                ),
            }

            if sampling.generate_mipmaps {
                self.gl.generate_mipmap(target);
            }

            let wrap = sampling.wrap.to_gl() as i32;
            self.gl.tex_parameter_i32(target, glow::TEXTURE_WRAP_S, wrap);
            self.gl.tex_parameter_i32(target, glow::TEXTURE_WRAP_T, wrap);
            self.gl.tex_parameter_i32(
                target,
                glow::TEXTURE_MIN_FILTER,
                sampling.min_filter.to_gl() as i32,
            );
            self.gl.tex_parameter_i32(
                target,
                glow::TEXTURE_MAG_FILTER,
                sampling.mag_filter.to_gl() as i32,
            );

            self.gl.bind_texture(target, None);
        }
    }

    fn bind_texture(&mut self, unit: u32, kind: TextureType, texture: u32) {
        unsafe {
            self.gl.active_texture(glow::TEXTURE0 + unit);
            self.gl
                .bind_texture(kind.to_gl(), name(texture).map(glow::NativeTexture));
        }
    }

    fn delete_texture(&mut self, texture: u32) {
        if let Some(texture) = name(texture) {
            unsafe { self.gl.delete_texture(glow::NativeTexture(texture)) };
        }
    }

    fn create_shader(&mut self, kind: ShaderType, source: &str) -> Result<u32> {
        unsafe {
            let shader = self
                .gl
                .create_shader(kind.to_gl())
                .map_err(RenderError::Driver)?;
            self.gl.shader_source(shader, source);
            self.gl.compile_shader(shader);
            Ok(shader.0.get())
        }
    }

    fn shader_status(&mut self, shader: u32) -> std::result::Result<(), String> {
        let Some(shader) = name(shader).map(glow::NativeShader) else {
            return Err("invalid shader name 0".to_string());
        };
        unsafe {
            if self.gl.get_shader_compile_status(shader) {
                Ok(())
            } else {
                Err(self.gl.get_shader_info_log(shader))
            }
        }
    }

    fn delete_shader(&mut self, shader: u32) {
        if let Some(shader) = name(shader) {
            unsafe { self.gl.delete_shader(glow::NativeShader(shader)) };
        }
    }

    fn create_program(&mut self, shaders: &[u32]) -> Result<u32> {
        unsafe {
            let program = self.gl.create_program().map_err(RenderError::Driver)?;
            for shader in shaders.iter().copied().filter_map(name) {
                self.gl.attach_shader(program, glow::NativeShader(shader));
            }
            self.gl.link_program(program);
            Ok(program.0.get())
        }
    }

    fn program_status(&mut self, program: u32) -> std::result::Result<(), String> {
        let Some(program) = name(program).map(glow::NativeProgram) else {
            return Err("invalid program name 0".to_string());
        };
        unsafe {
            if self.gl.get_program_link_status(program) {
                Ok(())
            } else {
                Err(self.gl.get_program_info_log(program))
            }
        }
    }

    fn use_program(&mut self, program: Option<u32>) {
        unsafe {
            self.gl
                .use_program(program.and_then(name).map(glow::NativeProgram));
        }
    }

    fn delete_program(&mut self, program: u32) {
        if let Some(program) = name(program) {
            unsafe { self.gl.delete_program(glow::NativeProgram(program)) };
        }
    }

    fn create_vertex_array(&mut self) -> Result<u32> {
        let vao = unsafe { self.gl.create_vertex_array() }.map_err(RenderError::Driver)?;
        Ok(vao.0.get())
    }

    fn bind_vertex_array(&mut self, vertex_array: Option<u32>) {
        unsafe {
            self.gl
                .bind_vertex_array(vertex_array.and_then(name).map(glow::NativeVertexArray));
        }
    }

    fn delete_vertex_array(&mut self, vertex_array: u32) {
        if let Some(vao) = name(vertex_array) {
            unsafe { self.gl.delete_vertex_array(glow::NativeVertexArray(vao)) };
        }
    }

    fn attribute_location(&mut self, program: u32, attribute: &str) -> Option<u32> {
        let program = name(program).map(glow::NativeProgram)?;
        unsafe { self.gl.get_attrib_location(program, attribute) }
    }

    fn enable_vertex_attribute(&mut self, location: u32, components: i32, stride: i32, offset: i32) {
        unsafe {
            self.gl.enable_vertex_attrib_array(location);
            self.gl
                .vertex_attrib_pointer_f32(location, components, glow::FLOAT, false, stride, offset);
        }
    }

    fn uniform_location(&mut self, program: u32, uniform: &str) -> Option<u32> {
        let program = name(program).map(glow::NativeProgram)?;
        unsafe { self.gl.get_uniform_location(program, uniform) }.map(|location| location.0)
    }

    fn set_uniform(&mut self, location: Option<u32>, value: &Uniform) {
        let Some(location) = location.map(glow::NativeUniformLocation) else {
            return;
        };
        let location = Some(&location);

        unsafe {
            match value {
                Uniform::Float(v) => self.gl.uniform_1_f32(location, *v),
                Uniform::Int(v) => self.gl.uniform_1_i32(location, *v),
                Uniform::UInt(v) => self.gl.uniform_1_u32(location, *v),
                Uniform::Bool(v) => self.gl.uniform_1_i32(location, *v as i32),
                Uniform::Vec2(v) => self.gl.uniform_2_f32(location, v[0], v[1]),
                Uniform::Vec3(v) => self.gl.uniform_3_f32(location, v[0], v[1], v[2]),
                Uniform::Vec4(v) => self.gl.uniform_4_f32(location, v[0], v[1], v[2], v[3]),
                Uniform::Mat3(m) => self.gl.uniform_matrix_3_f32_slice(location, false, m),
                Uniform::Mat4(m) => self.gl.uniform_matrix_4_f32_slice(location, false, m),
            }
        }
    }

    fn clear(&mut self, color: [f32; 4], mask: ClearMask) {
        unsafe {
            self.gl.clear_color(color[0], color[1], color[2], color[3]);
            self.gl.clear(mask.to_gl());
        }
    }

    fn set_capability(&mut self, capability: Capability, enabled: bool) {
        unsafe {
            if enabled {
                self.gl.enable(capability.to_gl());
            } else {
                self.gl.disable(capability.to_gl());
            }
        }
    }

    fn blend_func(&mut self, src: BlendFactor, dst: BlendFactor) {
        unsafe { self.gl.blend_func(src.to_gl(), dst.to_gl()) };
    }

    fn viewport(&mut self, viewport: &Viewport) {
        unsafe {
            self.gl
                .viewport(viewport.x, viewport.y, viewport.width, viewport.height);
        }
    }

    fn draw_elements(&mut self, primitive: DrawPrimitive, count: i32) {
        unsafe {
            self.gl
                .draw_elements(primitive.to_gl(), count, glow::UNSIGNED_INT, 0);
        }
    }

    fn draw_arrays(&mut self, primitive: DrawPrimitive, count: i32) {
        unsafe { self.gl.draw_arrays(primitive.to_gl(), 0, count) };
    }
}
