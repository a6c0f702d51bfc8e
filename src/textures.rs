use crate::error::{RenderError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureType {
    Texture1D,
    Texture2D,
    Texture3D,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageFormat {
    Rgb,
    Rgba,
}

impl ImageFormat {
    pub fn channels(&self) -> usize {
        match self {
            ImageFormat::Rgb => 3,
            ImageFormat::Rgba => 4,
        }
    }
}

/// Unsigned-byte pixel data and its dimensions.
///
/// `height` is ignored for 1D textures and `depth` for 1D and 2D ones.
#[derive(Debug, Clone, PartialEq)]
pub struct Texture {
    pub(crate) id: u32,
    pub(crate) generation: u32,
    pub name: String,
    pub kind: TextureType,
    pub format: ImageFormat,
    pub width: u32,
    pub height: u32,
    pub depth: u32,
    pub data: Vec<u8>,
}

impl Texture {
    pub fn new_2d<T: ToString>(
        name: T,
        format: ImageFormat,
        width: u32,
        height: u32,
        data: Vec<u8>,
    ) -> Self {
        Self {
            id: 0,
            generation: 0,
            name: name.to_string(),
            kind: TextureType::Texture2D,
            format,
            width,
            height,
            depth: 1,
            data,
        }
    }

    pub fn new_1d<T: ToString>(name: T, format: ImageFormat, width: u32, data: Vec<u8>) -> Self {
        Self {
            id: 0,
            generation: 0,
            name: name.to_string(),
            kind: TextureType::Texture1D,
            format,
            width,
            height: 1,
            depth: 1,
            data,
        }
    }

    pub fn new_3d<T: ToString>(
        name: T,
        format: ImageFormat,
        width: u32,
        height: u32,
        depth: u32,
        data: Vec<u8>,
    ) -> Self {
        Self {
            id: 0,
            generation: 0,
            name: name.to_string(),
            kind: TextureType::Texture3D,
            format,
            width,
            height,
            depth,
            data,
        }
    }

    /// Wraps an already decoded RGBA image. Rows are flipped so the first row
    /// of `data` is the bottom of the picture, as GL expects.
    pub fn from_rgba_image<T: ToString>(name: T, pixels: image::RgbaImage) -> Self {
        let flipped = image::imageops::flip_vertical(&pixels);
        let (width, height) = flipped.dimensions();

        Self::new_2d(name, ImageFormat::Rgba, width, height, flipped.into_raw())
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    /// Bytes in one row of pixels, without padding.
    pub fn row_len(&self) -> usize {
        self.width as usize * self.format.channels()
    }

    /// Number of bytes the dimensions call for, rows tightly packed.
    pub fn expected_len(&self) -> usize {
        let texels = match self.kind {
            TextureType::Texture1D => self.width as usize,
            TextureType::Texture2D => self.width as usize * self.height as usize,
            TextureType::Texture3D => {
                self.width as usize * self.height as usize * self.depth as usize
            }
        };
        texels * self.format.channels()
    }

    /// Checks the pixel data covers the whole image. Rows are read tightly
    /// packed, so `expected_len` bytes is enough for any width.
    pub fn validate(&self) -> Result<()> {
        let expected = self.expected_len();
        if self.data.len() < expected {
            return Err(RenderError::InvalidTextureData {
                expected,
                actual: self.data.len(),
            });
        }
        Ok(())
    }
}
