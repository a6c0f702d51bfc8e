//! Resource-managed OpenGL renderer.
//!
//! Buffers, textures, shaders, materials, cameras, lights, meshes and render
//! queues are registered with a [`Renderer`], which owns them together with
//! the driver objects behind them and hands out typed handles. Frames are
//! drawn by replaying a [`RenderQueue`] through a [`Camera`].
//!
//! All native calls go through the [`Driver`] trait: [`GlDriver`] talks to a
//! `glow` context, [`RecordingDriver`] only records what it was asked to do.

pub mod buffer;
pub mod camera;
pub mod config;
pub mod driver;
pub mod error;
pub mod handles;
pub mod light;
pub mod logging;
pub mod material;
pub mod mesh;
pub mod opengl;
pub mod pool;
pub mod recording;
pub mod render_queue;
pub mod renderer;
pub mod resource;
pub mod shaders;
pub mod textures;
pub mod vertex_format;
pub mod viewport;

pub use buffer::{Buffer, BufferType, DrawType};
pub use camera::Camera;
pub use config::{RendererConfig, TextureFilter, TextureSampling, TextureWrap};
pub use driver::{Capability, Driver};
pub use error::{RenderError, Result};
pub use handles::{
    AnyHandle, BufferHandle, CameraHandle, LightHandle, MaterialHandle, MeshHandle,
    RenderQueueHandle, ResourceHandle, ShaderHandle, ShaderProgramHandle, TextureHandle,
};
pub use light::{Attenuation, Light};
pub use material::Material;
pub use mesh::{DrawPrimitive, Mesh};
pub use opengl::GlDriver;
pub use recording::{DriverCall, RecordingDriver};
pub use render_queue::{BlendFactor, ClearMask, RenderCommand, RenderQueue};
pub use renderer::Renderer;
pub use resource::{AnyResource, Resource, ResourceKind, ResourceRef};
pub use shaders::{BindingName, Shader, ShaderProgram, ShaderType, Uniform};
pub use textures::{ImageFormat, Texture, TextureType};
pub use vertex_format::{VertexChannel, VertexFormat};
pub use viewport::Viewport;
