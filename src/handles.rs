use crate::resource::ResourceKind;

/// Typed reference into one of the renderer's pools.
///
/// The id is the one assigned at registration (driver object name or pool
/// counter), the generation tells apart successive occupants of the same id.
pub trait ResourceHandle: Copy + std::fmt::Debug {
    const KIND: ResourceKind;

    fn from_parts(id: u32, generation: u32) -> Self;
    fn id(&self) -> u32;
    fn generation(&self) -> u32;
}

macro_rules! resource_handle {
    ($name:ident, $variant:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name {
            id: u32,
            generation: u32,
        }

        impl $name {
            /// Never resolves; stands in for "no resource".
            pub const NULL: Self = Self { id: 0, generation: 0 };

            pub fn id(&self) -> u32 {
                self.id
            }

            pub fn is_null(&self) -> bool {
                self.id == 0
            }
        }

        impl ResourceHandle for $name {
            const KIND: ResourceKind = ResourceKind::$variant;

            fn from_parts(id: u32, generation: u32) -> Self {
                Self { id, generation }
            }

            fn id(&self) -> u32 {
                self.id
            }

            fn generation(&self) -> u32 {
                self.generation
            }
        }

        impl From<$name> for AnyHandle {
            fn from(handle: $name) -> Self {
                AnyHandle::$variant(handle)
            }
        }
    };
}

resource_handle!(BufferHandle, Buffer);
resource_handle!(TextureHandle, Texture);
resource_handle!(ShaderHandle, Shader);
resource_handle!(ShaderProgramHandle, ShaderProgram);
resource_handle!(MaterialHandle, Material);
resource_handle!(CameraHandle, Camera);
resource_handle!(LightHandle, Light);
resource_handle!(MeshHandle, Mesh);
resource_handle!(RenderQueueHandle, RenderQueue);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnyHandle {
    Buffer(BufferHandle),
    Texture(TextureHandle),
    Shader(ShaderHandle),
    ShaderProgram(ShaderProgramHandle),
    Material(MaterialHandle),
    Camera(CameraHandle),
    Light(LightHandle),
    Mesh(MeshHandle),
    RenderQueue(RenderQueueHandle),
}

impl AnyHandle {
    pub fn kind(&self) -> ResourceKind {
        match self {
            AnyHandle::Buffer(_) => ResourceKind::Buffer,
            AnyHandle::Texture(_) => ResourceKind::Texture,
            AnyHandle::Shader(_) => ResourceKind::Shader,
            AnyHandle::ShaderProgram(_) => ResourceKind::ShaderProgram,
            AnyHandle::Material(_) => ResourceKind::Material,
            AnyHandle::Camera(_) => ResourceKind::Camera,
            AnyHandle::Light(_) => ResourceKind::Light,
            AnyHandle::Mesh(_) => ResourceKind::Mesh,
            AnyHandle::RenderQueue(_) => ResourceKind::RenderQueue,
        }
    }

    pub fn id(&self) -> u32 {
        match self {
            AnyHandle::Buffer(h) => h.id(),
            AnyHandle::Texture(h) => h.id(),
            AnyHandle::Shader(h) => h.id(),
            AnyHandle::ShaderProgram(h) => h.id(),
            AnyHandle::Material(h) => h.id(),
            AnyHandle::Camera(h) => h.id(),
            AnyHandle::Light(h) => h.id(),
            AnyHandle::Mesh(h) => h.id(),
            AnyHandle::RenderQueue(h) => h.id(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_handles_have_id_zero() {
        assert!(MeshHandle::NULL.is_null());
        assert_eq!(CameraHandle::NULL.id(), 0);
    }

    #[test]
    fn any_handle_keeps_kind_and_id() {
        let handle: AnyHandle = MaterialHandle::from_parts(7, 1).into();
        assert_eq!(handle.kind(), ResourceKind::Material);
        assert_eq!(handle.id(), 7);
        assert_eq!(handle, AnyHandle::Material(MaterialHandle::from_parts(7, 1)));
    }
}
