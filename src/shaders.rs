use std::collections::BTreeMap;

use cgmath::{Matrix3, Matrix4, Vector2, Vector3, Vector4};

use crate::handles::ShaderHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderType {
    Vertex,
    Fragment,
    Geometry,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Shader {
    pub(crate) id: u32,
    pub(crate) generation: u32,
    pub kind: ShaderType,
    pub source: String,
}

impl Shader {
    pub fn new<T: ToString>(kind: ShaderType, source: T) -> Self {
        Self {
            id: 0,
            generation: 0,
            kind,
            source: source.to_string(),
        }
    }

    pub fn vertex<T: ToString>(source: T) -> Self {
        Self::new(ShaderType::Vertex, source)
    }

    pub fn fragment<T: ToString>(source: T) -> Self {
        Self::new(ShaderType::Fragment, source)
    }

    pub fn geometry<T: ToString>(source: T) -> Self {
        Self::new(ShaderType::Geometry, source)
    }

    pub fn id(&self) -> u32 {
        self.id
    }
}

/// Value uploaded to a named shader uniform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Uniform {
    Float(f32),
    Int(i32),
    UInt(u32),
    Bool(bool),
    Vec2([f32; 2]),
    Vec3([f32; 3]),
    Vec4([f32; 4]),
    Mat3([f32; 9]),
    Mat4([f32; 16]),
}

impl From<f32> for Uniform {
    fn from(value: f32) -> Self {
        Uniform::Float(value)
    }
}

impl From<i32> for Uniform {
    fn from(value: i32) -> Self {
        Uniform::Int(value)
    }
}

impl From<u32> for Uniform {
    fn from(value: u32) -> Self {
        Uniform::UInt(value)
    }
}

impl From<bool> for Uniform {
    fn from(value: bool) -> Self {
        Uniform::Bool(value)
    }
}

impl From<Vector2<f32>> for Uniform {
    fn from(value: Vector2<f32>) -> Self {
        Uniform::Vec2(value.into())
    }
}

impl From<Vector3<f32>> for Uniform {
    fn from(value: Vector3<f32>) -> Self {
        Uniform::Vec3(value.into())
    }
}

impl From<Vector4<f32>> for Uniform {
    fn from(value: Vector4<f32>) -> Self {
        Uniform::Vec4(value.into())
    }
}

impl From<Matrix3<f32>> for Uniform {
    fn from(value: Matrix3<f32>) -> Self {
        let columns: &[f32; 9] = value.as_ref();
        Uniform::Mat3(*columns)
    }
}

impl From<Matrix4<f32>> for Uniform {
    fn from(value: Matrix4<f32>) -> Self {
        let columns: &[f32; 16] = value.as_ref();
        Uniform::Mat4(*columns)
    }
}

/// Semantic slot a program can rename.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BindingName {
    Position,
    Normal,
    Tangent,
    Uv0,
    Uv1,
    Uv2,
    Uv3,
    CameraPosition,
    ViewMatrix,
    ProjectionMatrix,
    ModelMatrix,
    NormalMatrix,
    MaterialPrefix,
    SamplerPrefix,
    LightPrefix,
    LightCounter,
}

impl BindingName {
    pub fn default_name(&self) -> &'static str {
        match self {
            BindingName::Position => "i_position",
            BindingName::Normal => "i_normal",
            BindingName::Tangent => "i_tangent",
            BindingName::Uv0 => "i_texcoord0",
            BindingName::Uv1 => "i_texcoord1",
            BindingName::Uv2 => "i_texcoord2",
            BindingName::Uv3 => "i_texcoord3",
            BindingName::CameraPosition => "u_cameraPos",
            BindingName::ViewMatrix => "u_viewMat",
            BindingName::ProjectionMatrix => "u_projMat",
            BindingName::ModelMatrix => "u_modelMat",
            BindingName::NormalMatrix => "u_normalMat",
            BindingName::MaterialPrefix => "u_material.",
            BindingName::SamplerPrefix => "u_",
            BindingName::LightPrefix => "u_light",
            BindingName::LightCounter => "u_lightNr",
        }
    }

    pub const ALL: [BindingName; 16] = [
        BindingName::Position,
        BindingName::Normal,
        BindingName::Tangent,
        BindingName::Uv0,
        BindingName::Uv1,
        BindingName::Uv2,
        BindingName::Uv3,
        BindingName::CameraPosition,
        BindingName::ViewMatrix,
        BindingName::ProjectionMatrix,
        BindingName::ModelMatrix,
        BindingName::NormalMatrix,
        BindingName::MaterialPrefix,
        BindingName::SamplerPrefix,
        BindingName::LightPrefix,
        BindingName::LightCounter,
    ];
}

pub type BindingNameMap = BTreeMap<BindingName, String>;
pub type UniformMap = BTreeMap<String, Uniform>;

pub fn default_binding_names() -> BindingNameMap {
    BindingName::ALL
        .iter()
        .map(|binding| (*binding, binding.default_name().to_string()))
        .collect()
}

/// Linked set of shader stages plus the uniforms uploaded with every draw.
#[derive(Debug, Clone, PartialEq)]
pub struct ShaderProgram {
    pub(crate) id: u32,
    pub(crate) generation: u32,
    pub vertex_shader: Option<ShaderHandle>,
    pub fragment_shader: Option<ShaderHandle>,
    pub geometry_shader: Option<ShaderHandle>,
    uniforms: UniformMap,
    binding_names: BindingNameMap,
}

impl ShaderProgram {
    pub fn new(
        vertex_shader: Option<ShaderHandle>,
        fragment_shader: Option<ShaderHandle>,
        geometry_shader: Option<ShaderHandle>,
    ) -> Self {
        Self::with_tables(
            vertex_shader,
            fragment_shader,
            geometry_shader,
            UniformMap::new(),
            BindingNameMap::new(),
        )
    }

    /// An empty `binding_names` table is seeded with the defaults.
    pub fn with_tables(
        vertex_shader: Option<ShaderHandle>,
        fragment_shader: Option<ShaderHandle>,
        geometry_shader: Option<ShaderHandle>,
        uniforms: UniformMap,
        binding_names: BindingNameMap,
    ) -> Self {
        let binding_names = if binding_names.is_empty() {
            default_binding_names()
        } else {
            binding_names
        };

        Self {
            id: 0,
            generation: 0,
            vertex_shader,
            fragment_shader,
            geometry_shader,
            uniforms,
            binding_names,
        }
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    /// Attached stages in vertex, fragment, geometry order.
    pub fn stages(&self) -> impl Iterator<Item = ShaderHandle> + '_ {
        [self.vertex_shader, self.fragment_shader, self.geometry_shader]
            .into_iter()
            .flatten()
    }

    pub fn uniforms(&self) -> &UniformMap {
        &self.uniforms
    }

    pub fn set_uniform<N: ToString, U: Into<Uniform>>(&mut self, name: N, value: U) {
        self.uniforms.insert(name.to_string(), value.into());
    }

    pub fn remove_uniform(&mut self, name: &str) -> Option<Uniform> {
        self.uniforms.remove(name)
    }

    pub fn binding_names(&self) -> &BindingNameMap {
        &self.binding_names
    }

    pub fn binding_name(&self, binding: BindingName) -> Option<&str> {
        self.binding_names.get(&binding).map(String::as_str)
    }

    pub fn add_binding_name<T: ToString>(&mut self, binding: BindingName, name: T) {
        self.binding_names.insert(binding, name.to_string());
    }

    pub fn remove_binding_name(&mut self, binding: BindingName) -> Option<String> {
        self.binding_names.remove(&binding)
    }
}
