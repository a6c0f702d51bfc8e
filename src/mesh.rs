use cgmath::{Matrix4, Rad, SquareMatrix, Vector3};

use crate::{
    handles::{BufferHandle, MaterialHandle},
    vertex_format::VertexFormat,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DrawPrimitive {
    #[default]
    Triangles,
    Points,
    Lines,
}

/// Geometry drawn by `RenderCommand::DrawMeshes`.
///
/// The buffers must already be registered when the mesh is; the vertex array
/// built at registration captures the attribute layout of `format` against
/// the material's program at that moment.
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    pub(crate) id: u32,
    pub(crate) generation: u32,
    pub name: String,
    pub vertex_buffer: BufferHandle,
    pub index_buffer: Option<BufferHandle>,
    pub format: VertexFormat,
    pub material: Option<MaterialHandle>,
    pub primitive: DrawPrimitive,
    pub transform: Matrix4<f32>,
}

impl Mesh {
    pub fn new<T: ToString>(
        name: T,
        vertex_buffer: BufferHandle,
        index_buffer: Option<BufferHandle>,
        format: VertexFormat,
        material: Option<MaterialHandle>,
    ) -> Self {
        Self {
            id: 0,
            generation: 0,
            name: name.to_string(),
            vertex_buffer,
            index_buffer,
            format,
            material,
            primitive: DrawPrimitive::Triangles,
            transform: Matrix4::identity(),
        }
    }

    pub fn with_primitive(mut self, primitive: DrawPrimitive) -> Self {
        self.primitive = primitive;
        self
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn translate(&mut self, movement: Vector3<f32>) {
        self.transform = Matrix4::from_translation(movement) * self.transform;
    }

    /// Euler rotation in radians, applied x then y then z in model space.
    pub fn rotate(&mut self, rotation: Vector3<f32>) {
        self.transform = self.transform
            * Matrix4::from_angle_x(Rad(rotation.x))
            * Matrix4::from_angle_y(Rad(rotation.y))
            * Matrix4::from_angle_z(Rad(rotation.z));
    }

    pub fn scale(&mut self, scale: Vector3<f32>) {
        self.transform =
            self.transform * Matrix4::from_nonuniform_scale(scale.x, scale.y, scale.z);
    }
}
