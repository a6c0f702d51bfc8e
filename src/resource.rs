use crate::{
    buffer::Buffer,
    camera::Camera,
    handles::{
        BufferHandle, CameraHandle, LightHandle, MaterialHandle, MeshHandle, RenderQueueHandle,
        ResourceHandle, ShaderHandle, ShaderProgramHandle, TextureHandle,
    },
    light::Light,
    material::Material,
    mesh::Mesh,
    render_queue::RenderQueue,
    shaders::{Shader, ShaderProgram},
    textures::Texture,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ResourceKind {
    Buffer,
    Texture,
    Shader,
    ShaderProgram,
    Material,
    Camera,
    Light,
    Mesh,
    RenderQueue,
}

impl ResourceKind {
    /// Dependents come before what they depend on.
    pub const TEARDOWN_ORDER: [ResourceKind; 9] = [
        ResourceKind::RenderQueue,
        ResourceKind::Mesh,
        ResourceKind::Light,
        ResourceKind::Camera,
        ResourceKind::Material,
        ResourceKind::ShaderProgram,
        ResourceKind::Shader,
        ResourceKind::Texture,
        ResourceKind::Buffer,
    ];
}

/// Anything the renderer keeps in a pool.
///
/// `id` and `generation` are 0 while the value is detached. While the
/// renderer owns it they match the slot it sits in, which is what tells a
/// registered value apart from a stale copy once a driver reuses the name.
pub trait Resource {
    const KIND: ResourceKind;
    type Handle: ResourceHandle;

    fn id(&self) -> u32;
    fn set_id(&mut self, id: u32);
    fn generation(&self) -> u32;
    fn set_generation(&mut self, generation: u32);

    fn is_registered(&self) -> bool {
        self.id() != 0
    }
}

macro_rules! impl_resource {
    ($ty:ty, $handle:ty, $kind:ident) => {
        impl Resource for $ty {
            const KIND: ResourceKind = ResourceKind::$kind;
            type Handle = $handle;

            fn id(&self) -> u32 {
                self.id
            }

            fn set_id(&mut self, id: u32) {
                self.id = id;
            }

            fn generation(&self) -> u32 {
                self.generation
            }

            fn set_generation(&mut self, generation: u32) {
                self.generation = generation;
            }
        }
    };
}

impl_resource!(Buffer, BufferHandle, Buffer);
impl_resource!(Texture, TextureHandle, Texture);
impl_resource!(Shader, ShaderHandle, Shader);
impl_resource!(ShaderProgram, ShaderProgramHandle, ShaderProgram);
impl_resource!(Material, MaterialHandle, Material);
impl_resource!(Camera, CameraHandle, Camera);
impl_resource!(Light, LightHandle, Light);
impl_resource!(Mesh, MeshHandle, Mesh);
impl_resource!(RenderQueue, RenderQueueHandle, RenderQueue);

/// Owned resource of any kind, for the kind-agnostic register/remove calls.
#[derive(Debug, Clone)]
pub enum AnyResource {
    Buffer(Buffer),
    Texture(Texture),
    Shader(Shader),
    ShaderProgram(ShaderProgram),
    Material(Material),
    Camera(Camera),
    Light(Light),
    Mesh(Mesh),
    RenderQueue(RenderQueue),
}

impl AnyResource {
    pub fn kind(&self) -> ResourceKind {
        match self {
            AnyResource::Buffer(_) => ResourceKind::Buffer,
            AnyResource::Texture(_) => ResourceKind::Texture,
            AnyResource::Shader(_) => ResourceKind::Shader,
            AnyResource::ShaderProgram(_) => ResourceKind::ShaderProgram,
            AnyResource::Material(_) => ResourceKind::Material,
            AnyResource::Camera(_) => ResourceKind::Camera,
            AnyResource::Light(_) => ResourceKind::Light,
            AnyResource::Mesh(_) => ResourceKind::Mesh,
            AnyResource::RenderQueue(_) => ResourceKind::RenderQueue,
        }
    }

    pub fn id(&self) -> u32 {
        match self {
            AnyResource::Buffer(r) => r.id(),
            AnyResource::Texture(r) => r.id(),
            AnyResource::Shader(r) => r.id(),
            AnyResource::ShaderProgram(r) => r.id(),
            AnyResource::Material(r) => r.id(),
            AnyResource::Camera(r) => r.id(),
            AnyResource::Light(r) => r.id(),
            AnyResource::Mesh(r) => r.id(),
            AnyResource::RenderQueue(r) => r.id(),
        }
    }
}

/// Borrowed view of a pooled resource.
#[derive(Debug, Clone, Copy)]
pub enum ResourceRef<'a> {
    Buffer(&'a Buffer),
    Texture(&'a Texture),
    Shader(&'a Shader),
    ShaderProgram(&'a ShaderProgram),
    Material(&'a Material),
    Camera(&'a Camera),
    Light(&'a Light),
    Mesh(&'a Mesh),
    RenderQueue(&'a RenderQueue),
}

impl ResourceRef<'_> {
    pub fn kind(&self) -> ResourceKind {
        match self {
            ResourceRef::Buffer(_) => ResourceKind::Buffer,
            ResourceRef::Texture(_) => ResourceKind::Texture,
            ResourceRef::Shader(_) => ResourceKind::Shader,
            ResourceRef::ShaderProgram(_) => ResourceKind::ShaderProgram,
            ResourceRef::Material(_) => ResourceKind::Material,
            ResourceRef::Camera(_) => ResourceKind::Camera,
            ResourceRef::Light(_) => ResourceKind::Light,
            ResourceRef::Mesh(_) => ResourceKind::Mesh,
            ResourceRef::RenderQueue(_) => ResourceKind::RenderQueue,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn teardown_order_covers_every_kind_once() {
        let mut kinds = ResourceKind::TEARDOWN_ORDER.to_vec();
        kinds.sort();
        kinds.dedup();
        assert_eq!(kinds.len(), 9);
        assert_eq!(ResourceKind::TEARDOWN_ORDER[0], ResourceKind::RenderQueue);
        assert_eq!(ResourceKind::TEARDOWN_ORDER[8], ResourceKind::Buffer);
    }
}
