use cgmath::Vector4;

use crate::viewport::Viewport;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlendFactor {
    Zero,
    One,
    SrcColor,
    OneMinusSrcColor,
    DstColor,
    OneMinusDstColor,
    SrcAlpha,
    OneMinusSrcAlpha,
    DstAlpha,
    OneMinusDstAlpha,
    ConstantColor,
    OneMinusConstantColor,
    ConstantAlpha,
    OneMinusConstantAlpha,
}

/// Which framebuffer planes a clear touches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ClearMask {
    pub color: bool,
    pub depth: bool,
    pub stencil: bool,
}

impl ClearMask {
    pub fn new(color: bool, depth: bool, stencil: bool) -> Self {
        Self {
            color,
            depth,
            stencil,
        }
    }

    pub fn all() -> Self {
        Self::new(true, true, true)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[non_exhaustive]
pub enum RenderCommand {
    ClearBuffers {
        mask: ClearMask,
        clear_color: Vector4<f32>,
    },
    SetDepthTest(bool),
    SetStencilTest(bool),
    /// Factors only apply when `enable` is set.
    SetBlend {
        enable: bool,
        src: BlendFactor,
        dst: BlendFactor,
    },
    SetViewport(Viewport),
    /// Draws every registered mesh that has a material with a program.
    DrawMeshes,
}

/// Commands replayed in order by `Renderer::render_frame`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RenderQueue {
    pub(crate) id: u32,
    pub(crate) generation: u32,
    pub(crate) commands: Vec<RenderCommand>,
}

impl RenderQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn commands(&self) -> &[RenderCommand] {
        &self.commands
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Drops every recorded command, e.g. before rebuilding the next frame.
    pub fn clear(&mut self) {
        self.commands.clear();
    }

    pub fn push(&mut self, command: RenderCommand) -> &mut Self {
        self.commands.push(command);
        self
    }

    pub fn clear_buffers(
        &mut self,
        color: bool,
        depth: bool,
        stencil: bool,
        clear_color: Vector4<f32>,
    ) -> &mut Self {
        self.push(RenderCommand::ClearBuffers {
            mask: ClearMask::new(color, depth, stencil),
            clear_color,
        })
    }

    pub fn set_depth_test(&mut self, enable: bool) -> &mut Self {
        self.push(RenderCommand::SetDepthTest(enable))
    }

    pub fn set_stencil_test(&mut self, enable: bool) -> &mut Self {
        self.push(RenderCommand::SetStencilTest(enable))
    }

    pub fn set_blend(&mut self, enable: bool, src: BlendFactor, dst: BlendFactor) -> &mut Self {
        self.push(RenderCommand::SetBlend { enable, src, dst })
    }

    pub fn set_viewport(&mut self, viewport: Viewport) -> &mut Self {
        self.push(RenderCommand::SetViewport(viewport))
    }

    pub fn draw_meshes(&mut self) -> &mut Self {
        self.push(RenderCommand::DrawMeshes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_keeps_insertion_order() {
        let mut queue = RenderQueue::new();
        queue
            .clear_buffers(true, true, false, Vector4::new(0.1, 0.2, 0.3, 1.0))
            .set_depth_test(true)
            .set_blend(true, BlendFactor::SrcAlpha, BlendFactor::OneMinusSrcAlpha)
            .draw_meshes();

        assert_eq!(queue.len(), 4);
        assert_eq!(
            queue.commands()[0],
            RenderCommand::ClearBuffers {
                mask: ClearMask::new(true, true, false),
                clear_color: Vector4::new(0.1, 0.2, 0.3, 1.0),
            }
        );
        assert_eq!(queue.commands()[1], RenderCommand::SetDepthTest(true));
        assert_eq!(queue.commands()[3], RenderCommand::DrawMeshes);

        queue.clear();
        assert!(queue.is_empty());
    }
}
