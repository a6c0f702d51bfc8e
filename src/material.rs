use std::collections::BTreeMap;

use crate::{
    handles::{ShaderProgramHandle, TextureHandle},
    shaders::{Uniform, UniformMap},
};

/// Program plus the textures and uniform values it is drawn with.
///
/// Texture names double as sampler uniform names. Uniforms set here override
/// program-wide ones of the same name.
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub(crate) id: u32,
    pub(crate) generation: u32,
    pub name: String,
    pub shader_program: Option<ShaderProgramHandle>,
    textures: BTreeMap<String, TextureHandle>,
    uniforms: UniformMap,
}

impl Material {
    pub fn new<T: ToString>(name: T, shader_program: Option<ShaderProgramHandle>) -> Self {
        Self {
            id: 0,
            generation: 0,
            name: name.to_string(),
            shader_program,
            textures: BTreeMap::new(),
            uniforms: UniformMap::new(),
        }
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn textures(&self) -> &BTreeMap<String, TextureHandle> {
        &self.textures
    }

    pub fn add_texture<T: ToString>(&mut self, sampler: T, texture: TextureHandle) {
        self.textures.insert(sampler.to_string(), texture);
    }

    pub fn remove_texture(&mut self, sampler: &str) -> Option<TextureHandle> {
        self.textures.remove(sampler)
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
}
