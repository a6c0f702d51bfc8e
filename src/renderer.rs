use cgmath::{Matrix4, Vector4};
use log::{debug, trace, warn};

use crate::{
    buffer::{Buffer, BufferType, ELEMENT_SIZE},
    camera::Camera,
    config::RendererConfig,
    driver::{Capability, Driver},
    error::{RenderError, Result},
    handles::{
        AnyHandle, BufferHandle, CameraHandle, LightHandle, MaterialHandle, MeshHandle,
        RenderQueueHandle, ShaderHandle, ShaderProgramHandle, TextureHandle,
    },
    light::Light,
    material::Material,
    mesh::Mesh,
    pool::Pool,
    render_queue::{BlendFactor, ClearMask, RenderCommand, RenderQueue},
    resource::{AnyResource, ResourceKind, ResourceRef},
    shaders::{Shader, ShaderProgram, Uniform},
    textures::Texture,
    vertex_format::VertexFormat,
    viewport::Viewport,
};

/// Fixed uniform names the draw pass uploads the camera and model matrices to.
pub const VIEW_UNIFORM: &str = "view";
pub const PROJECTION_UNIFORM: &str = "proj";
pub const MODEL_UNIFORM: &str = "model";

macro_rules! pool_accessors {
    ($pool:ident, $ty:ty, $handle:ty, $get:ident, $get_mut:ident, $iter:ident) => {
        pub fn $get(&self, handle: $handle) -> Option<&$ty> {
            self.$pool.get(handle)
        }

        pub fn $get_mut(&mut self, handle: $handle) -> Option<&mut $ty> {
            self.$pool.get_mut(handle)
        }

        /// Live entries in id order.
        pub fn $iter(&self) -> impl Iterator<Item = ($handle, &$ty)> {
            self.$pool.iter()
        }
    };
}

/// Owns one pool per resource kind and the driver-side objects behind them,
/// and replays render queues against the driver.
///
/// Resources are registered by value and handed back, detached, when
/// removed. Dropping the renderer releases everything still registered.
pub struct Renderer<D: Driver> {
    driver: D,
    config: RendererConfig,

    buffers: Pool<Buffer>,
    textures: Pool<Texture>,
    shaders: Pool<Shader>,
    shader_programs: Pool<ShaderProgram>,
    materials: Pool<Material>,
    cameras: Pool<Camera>,
    lights: Pool<Light>,
    meshes: Pool<Mesh>,
    render_queues: Pool<RenderQueue>,
}

impl<D: Driver> Renderer<D> {
    pub fn new(driver: D) -> Self {
        Self::with_config(driver, RendererConfig::default())
    }

    pub fn with_config(driver: D, config: RendererConfig) -> Self {
        Self {
            driver,
            config,
            buffers: Pool::new(),
            textures: Pool::new(),
            shaders: Pool::new(),
            shader_programs: Pool::new(),
            materials: Pool::new(),
            cameras: Pool::new(),
            lights: Pool::new(),
            meshes: Pool::new(),
            render_queues: Pool::new(),
        }
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    pub fn driver_mut(&mut self) -> &mut D {
        &mut self.driver
    }

    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    /// Number of live resources of `kind`.
    pub fn count(&self, kind: ResourceKind) -> usize {
        match kind {
            ResourceKind::Buffer => self.buffers.len(),
            ResourceKind::Texture => self.textures.len(),
            ResourceKind::Shader => self.shaders.len(),
            ResourceKind::ShaderProgram => self.shader_programs.len(),
            ResourceKind::Material => self.materials.len(),
            ResourceKind::Camera => self.cameras.len(),
            ResourceKind::Light => self.lights.len(),
            ResourceKind::Mesh => self.meshes.len(),
            ResourceKind::RenderQueue => self.render_queues.len(),
        }
    }

    // ------------------------------------------------------------------
    // Registration
    // ------------------------------------------------------------------

    pub fn add_resource(&mut self, resource: AnyResource) -> Result<AnyHandle> {
        Ok(match resource {
            AnyResource::Buffer(r) => self.add_buffer(r)?.into(),
            AnyResource::Texture(r) => self.add_texture(r)?.into(),
            AnyResource::Shader(r) => self.add_shader(r)?.into(),
            AnyResource::ShaderProgram(r) => self.add_shader_program(r)?.into(),
            AnyResource::Material(r) => self.add_material(r).into(),
            AnyResource::Camera(r) => self.add_camera(r).into(),
            AnyResource::Light(r) => self.add_light(r).into(),
            AnyResource::Mesh(r) => self.add_mesh(r)?.into(),
            AnyResource::RenderQueue(r) => self.add_render_queue(r).into(),
        })
    }

    /// Creates the driver buffer and uploads the data if there is any.
    pub fn add_buffer(&mut self, buffer: Buffer) -> Result<BufferHandle> {
        if let Some(handle) = self.buffers.handle_of(&buffer) {
            return Ok(handle);
        }

        buffer.validate()?;

        let id = self.driver.create_buffer()?;
        if !buffer.is_empty() {
            self.driver
                .upload_buffer(id, buffer.kind, buffer.draw_type, &buffer.data);
        }

        debug!(
            "registered {:?} buffer {} ({} bytes)",
            buffer.kind,
            id,
            buffer.size()
        );
        Ok(self.buffers.insert(id, buffer))
    }

    /// Replaces the contents of a registered buffer and uploads them again.
    /// On error the buffer keeps its previous contents.
    pub fn update_buffer(
        &mut self,
        handle: BufferHandle,
        data: Vec<u8>,
        count: usize,
    ) -> Result<()> {
        let buffer = self
            .buffers
            .get_mut(handle)
            .ok_or(RenderError::UnknownHandle(handle.into()))?;

        if count.saturating_mul(ELEMENT_SIZE) > data.len() {
            return Err(RenderError::InvalidBufferData {
                count,
                len: data.len(),
            });
        }

        buffer.data = data;
        buffer.count = count;
        self.driver
            .upload_buffer(handle.id(), buffer.kind, buffer.draw_type, &buffer.data);
        Ok(())
    }

    pub fn add_texture(&mut self, texture: Texture) -> Result<TextureHandle> {
        if let Some(handle) = self.textures.handle_of(&texture) {
            return Ok(handle);
        }

        texture.validate()?;

        let id = self.driver.create_texture()?;
        self.driver
            .upload_texture(id, &texture, &self.config.texture_sampling);

        debug!(
            "registered {:?} texture '{}' as {} ({}x{}x{})",
            texture.kind, texture.name, id, texture.width, texture.height, texture.depth
        );
        Ok(self.textures.insert(id, texture))
    }

    pub fn add_shader(&mut self, shader: Shader) -> Result<ShaderHandle> {
        if let Some(handle) = self.shaders.handle_of(&shader) {
            return Ok(handle);
        }

        let id = self.driver.create_shader(shader.kind, &shader.source)?;
        if self.config.shader_diagnostics {
            if let Err(log) = self.driver.shader_status(id) {
                warn!("{:?} shader {} failed to compile: {}", shader.kind, id, log);
            }
        }

        debug!("registered {:?} shader {}", shader.kind, id);
        Ok(self.shaders.insert(id, shader))
    }

    /// Stages whose handle does not resolve are left out of the link.
    pub fn add_shader_program(&mut self, program: ShaderProgram) -> Result<ShaderProgramHandle> {
        if let Some(handle) = self.shader_programs.handle_of(&program) {
            return Ok(handle);
        }

        let mut stages = Vec::with_capacity(3);
        for stage in program.stages() {
            match self.shaders.get(stage) {
                Some(shader) => stages.push(shader.id),
                None => debug!("shader {:?} is not registered, skipping stage", stage),
            }
        }

        let id = self.driver.create_program(&stages)?;
        if self.config.shader_diagnostics {
            if let Err(log) = self.driver.program_status(id) {
                warn!("shader program {} failed to link: {}", id, log);
            }
        }

        debug!("registered shader program {} ({} stages)", id, stages.len());
        Ok(self.shader_programs.insert(id, program))
    }

    pub fn add_material(&mut self, material: Material) -> MaterialHandle {
        if let Some(handle) = self.materials.handle_of(&material) {
            return handle;
        }

        let id = self.materials.next_id();
        debug!("registered material '{}' as {}", material.name, id);
        self.materials.insert(id, material)
    }

    pub fn add_camera(&mut self, camera: Camera) -> CameraHandle {
        if let Some(handle) = self.cameras.handle_of(&camera) {
            return handle;
        }

        let id = self.cameras.next_id();
        debug!("registered camera '{}' as {}", camera.name, id);
        self.cameras.insert(id, camera)
    }

    pub fn add_light(&mut self, light: Light) -> LightHandle {
        if let Some(handle) = self.lights.handle_of(&light) {
            return handle;
        }

        let id = self.lights.next_id();
        debug!("registered light {}", id);
        self.lights.insert(id, light)
    }

    pub fn add_render_queue(&mut self, render_queue: RenderQueue) -> RenderQueueHandle {
        if let Some(handle) = self.render_queues.handle_of(&render_queue) {
            return handle;
        }

        let id = self.render_queues.next_id();
        debug!(
            "registered render queue {} ({} commands)",
            id,
            render_queue.len()
        );
        self.render_queues.insert(id, render_queue)
    }

    /// Builds the vertex array for `mesh`.
    ///
    /// The buffers must already be registered. Attributes are only described
    /// when the mesh's material and program resolve; attributes the program
    /// does not use are skipped. On error the vertex array is deleted again.
    pub fn add_mesh(&mut self, mesh: Mesh) -> Result<MeshHandle> {
        if let Some(handle) = self.meshes.handle_of(&mesh) {
            return Ok(handle);
        }

        let vao = self.driver.create_vertex_array()?;
        self.driver.bind_vertex_array(Some(vao));

        if let Err(err) = self.build_vertex_array(&mesh) {
            self.driver.bind_vertex_array(None);
            self.driver.delete_vertex_array(vao);
            warn!("mesh '{}' not registered: {}", mesh.name, err);
            return Err(err);
        }

        self.driver.bind_vertex_array(None);

        debug!(
            "registered mesh '{}' as vertex array {} ({:?})",
            mesh.name, vao, mesh.format
        );
        Ok(self.meshes.insert(vao, mesh))
    }

    fn build_vertex_array(&mut self, mesh: &Mesh) -> Result<()> {
        let (vertex_buffer, vertex_count) = self
            .buffers
            .get(mesh.vertex_buffer)
            .map(|buffer| (buffer.id, buffer.count))
            .ok_or(RenderError::UnknownHandle(mesh.vertex_buffer.into()))?;

        let index_buffer = match mesh.index_buffer {
            Some(handle) => Some(
                self.buffers
                    .get(handle)
                    .map(|buffer| (buffer.id, buffer.count))
                    .ok_or(RenderError::UnknownHandle(handle.into()))?,
            ),
            None => None,
        };

        if vertex_count > 0 {
            self.driver
                .bind_buffer(BufferType::Vertex, Some(vertex_buffer));

            if let Some(program) = self.program_id_for(mesh) {
                self.describe_attributes(program, mesh.format);
            }
        }

        if let Some((index_buffer, index_count)) = index_buffer {
            if index_count > 0 {
                self.driver
                    .bind_buffer(BufferType::Index, Some(index_buffer));
            }
        }

        Ok(())
    }

    fn program_id_for(&self, mesh: &Mesh) -> Option<u32> {
        let material = self.materials.get(mesh.material?)?;
        let program = self.shader_programs.get(material.shader_program?)?;
        Some(program.id)
    }

    /// One enable + describe call per channel of `format` the program uses.
    fn describe_attributes(&mut self, program: u32, format: VertexFormat) {
        let stride = format.stride();

        for layout in format.layouts() {
            let name = layout.channel.attribute_name();
            match self.driver.attribute_location(program, name) {
                Some(location) => self.driver.enable_vertex_attribute(
                    location,
                    layout.size,
                    stride,
                    layout.offset as i32,
                ),
                None => trace!("program {} has no attribute '{}'", program, name),
            }
        }
    }

    // ------------------------------------------------------------------
    // Removal
    // ------------------------------------------------------------------

    pub fn remove_resource(&mut self, handle: AnyHandle) -> Option<AnyResource> {
        match handle {
            AnyHandle::Buffer(h) => self.remove_buffer(h).map(AnyResource::Buffer),
            AnyHandle::Texture(h) => self.remove_texture(h).map(AnyResource::Texture),
            AnyHandle::Shader(h) => self.remove_shader(h).map(AnyResource::Shader),
            AnyHandle::ShaderProgram(h) => self
                .remove_shader_program(h)
                .map(AnyResource::ShaderProgram),
            AnyHandle::Material(h) => self.remove_material(h).map(AnyResource::Material),
            AnyHandle::Camera(h) => self.remove_camera(h).map(AnyResource::Camera),
            AnyHandle::Light(h) => self.remove_light(h).map(AnyResource::Light),
            AnyHandle::Mesh(h) => self.remove_mesh(h).map(AnyResource::Mesh),
            AnyHandle::RenderQueue(h) => self.remove_render_queue(h).map(AnyResource::RenderQueue),
        }
    }

    pub fn remove_buffer(&mut self, handle: BufferHandle) -> Option<Buffer> {
        let buffer = self.buffers.release(handle)?;
        self.driver.delete_buffer(handle.id());
        debug!("removed buffer {}", handle.id());
        Some(buffer)
    }

    pub fn remove_texture(&mut self, handle: TextureHandle) -> Option<Texture> {
        let texture = self.textures.release(handle)?;
        self.driver.delete_texture(handle.id());
        debug!("removed texture {}", handle.id());
        Some(texture)
    }

    pub fn remove_shader(&mut self, handle: ShaderHandle) -> Option<Shader> {
        let shader = self.shaders.release(handle)?;
        self.driver.delete_shader(handle.id());
        debug!("removed shader {}", handle.id());
        Some(shader)
    }

    pub fn remove_shader_program(&mut self, handle: ShaderProgramHandle) -> Option<ShaderProgram> {
        let program = self.shader_programs.release(handle)?;
        self.driver.delete_program(handle.id());
        debug!("removed shader program {}", handle.id());
        Some(program)
    }

    pub fn remove_material(&mut self, handle: MaterialHandle) -> Option<Material> {
        let material = self.materials.release(handle)?;
        debug!("removed material {}", handle.id());
        Some(material)
    }

    pub fn remove_camera(&mut self, handle: CameraHandle) -> Option<Camera> {
        let camera = self.cameras.release(handle)?;
        debug!("removed camera {}", handle.id());
        Some(camera)
    }

    pub fn remove_light(&mut self, handle: LightHandle) -> Option<Light> {
        let light = self.lights.release(handle)?;
        debug!("removed light {}", handle.id());
        Some(light)
    }

    /// Deletes the vertex array only; the mesh's buffers stay registered.
    pub fn remove_mesh(&mut self, handle: MeshHandle) -> Option<Mesh> {
        let mesh = self.meshes.release(handle)?;
        self.driver.delete_vertex_array(handle.id());
        debug!("removed mesh {}", handle.id());
        Some(mesh)
    }

    pub fn remove_render_queue(&mut self, handle: RenderQueueHandle) -> Option<RenderQueue> {
        let render_queue = self.render_queues.release(handle)?;
        debug!("removed render queue {}", handle.id());
        Some(render_queue)
    }

    // ------------------------------------------------------------------
    // Lookup
    // ------------------------------------------------------------------

    /// `None` for handles that were never registered, were removed, or
    /// belong to a previous occupant of the same id.
    pub fn resource(&self, handle: AnyHandle) -> Option<ResourceRef<'_>> {
        match handle {
            AnyHandle::Buffer(h) => self.buffers.get(h).map(ResourceRef::Buffer),
            AnyHandle::Texture(h) => self.textures.get(h).map(ResourceRef::Texture),
            AnyHandle::Shader(h) => self.shaders.get(h).map(ResourceRef::Shader),
            AnyHandle::ShaderProgram(h) => self
                .shader_programs
                .get(h)
                .map(ResourceRef::ShaderProgram),
            AnyHandle::Material(h) => self.materials.get(h).map(ResourceRef::Material),
            AnyHandle::Camera(h) => self.cameras.get(h).map(ResourceRef::Camera),
            AnyHandle::Light(h) => self.lights.get(h).map(ResourceRef::Light),
            AnyHandle::Mesh(h) => self.meshes.get(h).map(ResourceRef::Mesh),
            AnyHandle::RenderQueue(h) => self.render_queues.get(h).map(ResourceRef::RenderQueue),
        }
    }

    pool_accessors!(buffers, Buffer, BufferHandle, buffer, buffer_mut, buffers);
    pool_accessors!(textures, Texture, TextureHandle, texture, texture_mut, textures);
    pool_accessors!(shaders, Shader, ShaderHandle, shader, shader_mut, shaders);
    pool_accessors!(
        shader_programs,
        ShaderProgram,
        ShaderProgramHandle,
        shader_program,
        shader_program_mut,
        shader_programs
    );
    pool_accessors!(materials, Material, MaterialHandle, material, material_mut, materials);
    pool_accessors!(cameras, Camera, CameraHandle, camera, camera_mut, cameras);
    pool_accessors!(lights, Light, LightHandle, light, light_mut, lights);
    pool_accessors!(meshes, Mesh, MeshHandle, mesh, mesh_mut, meshes);
    pool_accessors!(
        render_queues,
        RenderQueue,
        RenderQueueHandle,
        render_queue,
        render_queue_mut,
        render_queues
    );

    // ------------------------------------------------------------------
    // Frame
    // ------------------------------------------------------------------

    /// Replays `render_queue` in order, drawing through `camera`.
    ///
    /// Does nothing at all, not even a driver call, if either handle does
    /// not resolve.
    pub fn render_frame(&mut self, camera: CameraHandle, render_queue: RenderQueueHandle) {
        let Some(camera) = self.cameras.get(camera) else {
            trace!("render_frame: camera {:?} not registered", camera);
            return;
        };
        let (view, projection) = (camera.view, camera.projection);

        // The command list is lent out for the replay and put back after;
        // no command touches the render queue pool.
        let Some(queue) = self.render_queues.get_mut(render_queue) else {
            trace!("render_frame: render queue {:?} not registered", render_queue);
            return;
        };
        let commands = std::mem::take(&mut queue.commands);

        for command in &commands {
            trace!("executing {:?}", command);
            self.execute(command, &view, &projection);
        }

        if let Some(queue) = self.render_queues.get_mut(render_queue) {
            queue.commands = commands;
        }
    }

    fn execute(&mut self, command: &RenderCommand, view: &Matrix4<f32>, projection: &Matrix4<f32>) {
        match *command {
            RenderCommand::ClearBuffers { mask, clear_color } => {
                self.clear_buffers(mask, clear_color)
            }
            RenderCommand::SetDepthTest(enable) => self.set_depth_test(enable),
            RenderCommand::SetStencilTest(enable) => self.set_stencil_test(enable),
            RenderCommand::SetBlend { enable, src, dst } => self.set_blend(enable, src, dst),
            RenderCommand::SetViewport(viewport) => self.set_viewport(&viewport),
            RenderCommand::DrawMeshes => self.draw_meshes_with(view, projection),
        }
    }

    pub fn clear_buffers(&mut self, mask: ClearMask, clear_color: Vector4<f32>) {
        self.driver.clear(clear_color.into(), mask);
    }

    pub fn set_depth_test(&mut self, enable: bool) {
        self.driver.set_capability(Capability::DepthTest, enable);
    }

    pub fn set_stencil_test(&mut self, enable: bool) {
        self.driver.set_capability(Capability::StencilTest, enable);
    }

    pub fn set_blend(&mut self, enable: bool, src: BlendFactor, dst: BlendFactor) {
        self.driver.set_capability(Capability::Blend, enable);
        if enable {
            self.driver.blend_func(src, dst);
        }
    }

    pub fn set_viewport(&mut self, viewport: &Viewport) {
        self.driver.viewport(viewport);
    }

    /// Draws every registered mesh through `camera`. No-op if the camera does
    /// not resolve.
    pub fn draw_meshes(&mut self, camera: CameraHandle) {
        let Some(camera) = self.cameras.get(camera) else {
            return;
        };
        let (view, projection) = (camera.view, camera.projection);
        self.draw_meshes_with(&view, &projection);
    }

    fn draw_meshes_with(&mut self, view: &Matrix4<f32>, projection: &Matrix4<f32>) {
        let Self {
            driver,
            buffers,
            textures,
            shader_programs,
            materials,
            meshes,
            ..
        } = self;

        for (handle, mesh) in meshes.iter() {
            let Some(material) = mesh.material.and_then(|h| materials.get(h)) else {
                continue;
            };
            let Some(program) = material.shader_program.and_then(|h| shader_programs.get(h))
            else {
                continue;
            };

            let index_count = mesh
                .index_buffer
                .and_then(|h| buffers.get(h))
                .map_or(0, |indices| indices.count);
            let vertex_count = buffers
                .get(mesh.vertex_buffer)
                .map_or(0, |vertices| vertices.count / mesh.format.floats_per_vertex());

            driver.bind_vertex_array(Some(handle.id()));
            driver.use_program(Some(program.id));

            let mut unit = 0;
            for (sampler, texture) in material.textures() {
                let Some(texture) = textures.get(*texture) else {
                    trace!("material '{}': texture '{}' not registered", material.name, sampler);
                    continue;
                };
                let location = driver.uniform_location(program.id, sampler);
                driver.bind_texture(unit, texture.kind, texture.id);
                driver.set_uniform(location, &Uniform::Int(unit as i32));
                unit += 1;
            }

            let overrides = material.uniforms();
            let uniforms = program
                .uniforms()
                .iter()
                .filter(|(name, _)| !overrides.contains_key(*name))
                .chain(overrides);
            for (name, value) in uniforms {
                let location = driver.uniform_location(program.id, name);
                driver.set_uniform(location, value);
            }

            for (name, matrix) in [
                (VIEW_UNIFORM, view),
                (PROJECTION_UNIFORM, projection),
                (MODEL_UNIFORM, &mesh.transform),
            ] {
                let location = driver.uniform_location(program.id, name);
                driver.set_uniform(location, &Uniform::from(*matrix));
            }

            if index_count > 0 {
                driver.draw_elements(mesh.primitive, index_count as i32);
            } else {
                driver.draw_arrays(mesh.primitive, vertex_count as i32);
            }
        }

        driver.bind_vertex_array(None);
    }

    // ------------------------------------------------------------------
    // Teardown
    // ------------------------------------------------------------------

    /// Releases every pool, dependents first, and empties them.
    pub fn terminate(&mut self) {
        for kind in ResourceKind::TEARDOWN_ORDER {
            let released = self.release_all(kind);
            if released > 0 {
                debug!("released {} {:?} resources", released, kind);
            }
        }
    }

    fn release_all(&mut self, kind: ResourceKind) -> usize {
        match kind {
            ResourceKind::RenderQueue => self.render_queues.drain_rev().len(),
            ResourceKind::Mesh => {
                let meshes = self.meshes.drain_rev();
                for (id, _) in &meshes {
                    self.driver.delete_vertex_array(*id);
                }
                meshes.len()
            }
            ResourceKind::Light => self.lights.drain_rev().len(),
            ResourceKind::Camera => self.cameras.drain_rev().len(),
            ResourceKind::Material => self.materials.drain_rev().len(),
            ResourceKind::ShaderProgram => {
                let programs = self.shader_programs.drain_rev();
                for (id, _) in &programs {
                    self.driver.delete_program(*id);
                }
                programs.len()
            }
            ResourceKind::Shader => {
                let shaders = self.shaders.drain_rev();
                for (id, _) in &shaders {
                    self.driver.delete_shader(*id);
                }
                shaders.len()
            }
            ResourceKind::Texture => {
                let textures = self.textures.drain_rev();
                for (id, _) in &textures {
                    self.driver.delete_texture(*id);
                }
                textures.len()
            }
            ResourceKind::Buffer => {
                let buffers = self.buffers.drain_rev();
                for (id, _) in &buffers {
                    self.driver.delete_buffer(*id);
                }
                buffers.len()
            }
        }
    }
}

impl<D: Driver> Drop for Renderer<D> {
    fn drop(&mut self) {
        self.terminate();
    }
}

#[cfg(test)]
#[path = "renderer_tests.rs"]
mod tests;
