#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureWrap {
    Repeat,
    MirroredRepeat,
    ClampToEdge,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureFilter {
    Nearest,
    Linear,
    NearestMipmapNearest,
    LinearMipmapNearest,
    NearestMipmapLinear,
    LinearMipmapLinear,
}

/// Sampler state applied to every texture on upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureSampling {
    pub wrap: TextureWrap,
    pub min_filter: TextureFilter,
    /// Only `Nearest` and `Linear` are meaningful here.
    pub mag_filter: TextureFilter,
    pub generate_mipmaps: bool,
}

impl Default for TextureSampling {
    fn default() -> Self {
        Self {
            wrap: TextureWrap::ClampToEdge,
            min_filter: TextureFilter::LinearMipmapLinear,
            mag_filter: TextureFilter::Linear,
            generate_mipmaps: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RendererConfig {
    pub texture_sampling: TextureSampling,
    /// Query compile and link status after creating shaders and programs and
    /// log failures. Registration succeeds either way.
    pub shader_diagnostics: bool,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            texture_sampling: TextureSampling::default(),
            shader_diagnostics: true,
        }
    }
}

impl RendererConfig {
    pub fn with_texture_sampling(mut self, texture_sampling: TextureSampling) -> Self {
        self.texture_sampling = texture_sampling;
        self
    }

    pub fn with_shader_diagnostics(mut self, enabled: bool) -> Self {
        self.shader_diagnostics = enabled;
        self
    }
}
