use crate::error::{RenderError, Result};

/// Bytes per element: vertex data is `f32`, index data `u32`.
pub const ELEMENT_SIZE: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferType {
    Vertex,
    Index,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DrawType {
    Static,
    Dynamic,
}

/// Raw vertex or index data plus how the driver should store it.
///
/// `count` is the number of elements (floats for vertex data, `u32` indices
/// for index data), not bytes.
#[derive(Debug, Clone, PartialEq)]
pub struct Buffer {
    pub(crate) id: u32,
    pub(crate) generation: u32,
    pub kind: BufferType,
    pub draw_type: DrawType,
    pub data: Vec<u8>,
    pub count: usize,
}

impl Buffer {
    pub fn new(kind: BufferType, draw_type: DrawType, data: Vec<u8>, count: usize) -> Self {
        Self {
            id: 0,
            generation: 0,
            kind,
            draw_type,
            data,
            count,
        }
    }

    /// Interleaved float vertex data.
    pub fn vertices(vertices: &[f32], draw_type: DrawType) -> Self {
        Self::new(
            BufferType::Vertex,
            draw_type,
            bytemuck::cast_slice(vertices).to_vec(),
            vertices.len(),
        )
    }

    pub fn indices(indices: &[u32], draw_type: DrawType) -> Self {
        Self::new(
            BufferType::Index,
            draw_type,
            bytemuck::cast_slice(indices).to_vec(),
            indices.len(),
        )
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    /// Size in bytes.
    pub fn size(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// `count` elements must fit in `data`, or draws would read past the
    /// uploaded store.
    pub fn validate(&self) -> Result<()> {
        let needed = self.count.saturating_mul(ELEMENT_SIZE);
        if needed > self.data.len() {
            return Err(RenderError::InvalidBufferData {
                count: self.count,
                len: self.data.len(),
            });
        }
        Ok(())
    }
}
