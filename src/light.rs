use cgmath::{Vector3, Vector4};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Attenuation {
    pub constant: f32,
    pub linear: f32,
    pub quadratic: f32,
}

impl Attenuation {
    pub fn new(constant: f32, linear: f32, quadratic: f32) -> Self {
        Self {
            constant,
            linear,
            quadratic,
        }
    }
}

impl Default for Attenuation {
    /// No falloff.
    fn default() -> Self {
        Self::new(1.0, 0.0, 0.0)
    }
}

/// Point light. Kept in its pool for applications to read back; the draw
/// pass does not upload lights itself.
#[derive(Debug, Clone, PartialEq)]
pub struct Light {
    pub(crate) id: u32,
    pub(crate) generation: u32,
    pub position: Vector3<f32>,
    pub color: Vector4<f32>,
    pub attenuation: Attenuation,
    pub is_on: bool,
}

impl Light {
    pub fn new(
        position: Vector3<f32>,
        color: Vector4<f32>,
        attenuation: Attenuation,
        is_on: bool,
    ) -> Self {
        Self {
            id: 0,
            generation: 0,
            position,
            color,
            attenuation,
            is_on,
        }
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn translate(&mut self, movement: Vector3<f32>) {
        self.position += movement;
    }
}
