use std::error::Error;
use std::ffi::CString;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Instant;

use cgmath::{point3, vec3, vec4, Deg};
use clap::{value_parser, Arg, ArgAction, Command};
use glutin::config::ConfigTemplate;
use glutin::context::{ContextApi, ContextAttributesBuilder, PossiblyCurrentContext, Version};
use glutin::display::{Display, DisplayApiPreference};
use glutin::prelude::*;
use glutin::surface::{Surface, SurfaceAttributesBuilder, WindowSurface};
use log::{error, info};
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::raw_window_handle::{HasDisplayHandle, HasWindowHandle};
use winit::window::{Window, WindowId};

use cruel_renderer::logging::{init_logging, LoggingConfig};
use cruel_renderer::{
    BlendFactor, Buffer, Camera, CameraHandle, DrawType, GlDriver, Material, Mesh, MeshHandle,
    RenderQueue, RenderQueueHandle, Renderer, Shader, ShaderProgram, Texture, VertexFormat,
    Viewport,
};

const VERTEX_SHADER: &str = r#"#version 330 core
in vec2 position;
in vec3 color;
in vec2 texcoord0;

uniform mat4 model;
uniform mat4 view;
uniform mat4 proj;

out vec3 v_color;
out vec2 v_uv;

void main() {
    v_color = color;
    v_uv = texcoord0;
    gl_Position = proj * view * model * vec4(position, 0.0, 1.0);
}
"#;

const FRAGMENT_SHADER: &str = r#"#version 330 core
in vec3 v_color;
in vec2 v_uv;

uniform sampler2D u_texture;
uniform float u_opacity;

out vec4 frag_color;

void main() {
    frag_color = vec4(v_color, u_opacity) * texture(u_texture, v_uv);
}
"#;

// Pos2Col3Uv2
#[rustfmt::skip]
const QUAD_VERTICES: [f32; 28] = [
    -0.5, -0.5,   1.0, 0.2, 0.2,   0.0, 0.0,
     0.5, -0.5,   0.2, 1.0, 0.2,   1.0, 0.0,
     0.5,  0.5,   0.2, 0.2, 1.0,   1.0, 1.0,
    -0.5,  0.5,   1.0, 1.0, 0.2,   0.0, 1.0,
];

const QUAD_INDICES: [u32; 6] = [0, 1, 2, 2, 3, 0];

const FOV: f32 = 45.0;
const NEAR_PLANE: f32 = 0.1;
const FAR_PLANE: f32 = 100.0;

#[derive(Debug, Clone)]
struct Options {
    width: u32,
    height: u32,
    blend: bool,
    log_filter: Option<String>,
}

impl Options {
    fn parse() -> Self {
        let matches = Command::new("cruel_renderer_demo")
            .about("Draws a spinning textured quad")
            .arg(
                Arg::new("width")
                    .long("width")
                    .value_parser(value_parser!(u32))
                    .default_value("1280"),
            )
            .arg(
                Arg::new("height")
                    .long("height")
                    .value_parser(value_parser!(u32))
                    .default_value("720"),
            )
            .arg(
                Arg::new("log")
                    .long("log")
                    .help("Log filter, e.g. \"cruel_renderer=debug\""),
            )
            .arg(
                Arg::new("no-blend")
                    .long("no-blend")
                    .help("Draw without alpha blending")
                    .action(ArgAction::SetTrue),
            )
            .get_matches();

        Self {
            width: matches.get_one::<u32>("width").copied().unwrap_or(1280),
            height: matches.get_one::<u32>("height").copied().unwrap_or(720),
            blend: !matches.get_flag("no-blend"),
            log_filter: matches.get_one::<String>("log").cloned(),
        }
    }
}

struct Timer {
    last_frame: Instant,
    delta_time: f32,
}

impl Timer {
    fn new() -> Self {
        Self {
            last_frame: Instant::now(),
            delta_time: 0.0,
        }
    }

    fn update(&mut self) {
        let now = Instant::now();
        self.delta_time = now.duration_since(self.last_frame).as_secs_f32();
        self.last_frame = now;
    }
}

struct Scene {
    camera: CameraHandle,
    queue: RenderQueueHandle,
    quad: MeshHandle,
}

// Drop order matters: the renderer releases its objects while the context
// is still alive.
struct App {
    options: Options,
    timer: Timer,
    scene: Option<Scene>,
    renderer: Option<Renderer<GlDriver>>,
    surface: Option<Surface<WindowSurface>>,
    current_context: Option<PossiblyCurrentContext>,
    window: Option<Window>,
}

impl App {
    fn new(options: Options) -> Self {
        Self {
            options,
            timer: Timer::new(),
            scene: None,
            renderer: None,
            surface: None,
            current_context: None,
            window: None,
        }
    }

    fn init(&mut self, event_loop: &ActiveEventLoop) -> Result<(), Box<dyn Error>> {
        let attributes = Window::default_attributes()
            .with_title("Cruel Renderer")
            .with_inner_size(PhysicalSize::new(self.options.width, self.options.height));
        let window = event_loop.create_window(attributes)?;

        let raw_display = window.display_handle()?.as_raw();
        let raw_window = window.window_handle()?.as_raw();

        #[cfg(target_os = "windows")]
        let preference = DisplayApiPreference::Wgl(Some(raw_window));
        #[cfg(target_os = "macos")]
        let preference = DisplayApiPreference::Cgl;
        #[cfg(not(any(target_os = "windows", target_os = "macos")))]
        let preference = DisplayApiPreference::Egl;

        let display = unsafe { Display::new(raw_display, preference)? };

        let config = unsafe { display.find_configs(ConfigTemplate::default())? }
            .next()
            .ok_or("no matching OpenGL config")?;

        let size = window.inner_size();
        let width = NonZeroU32::new(size.width).ok_or("window has zero width")?;
        let height = NonZeroU32::new(size.height).ok_or("window has zero height")?;

        let surface_attributes =
            SurfaceAttributesBuilder::<WindowSurface>::new().build(raw_window, width, height);
        let context_attributes = ContextAttributesBuilder::new()
            .with_context_api(ContextApi::OpenGl(Some(Version::new(3, 3))))
            .build(Some(raw_window));

        let surface = unsafe { display.create_window_surface(&config, &surface_attributes)? };
        let context = unsafe { display.create_context(&config, &context_attributes)? }
            .make_current(&surface)?;

        let gl = unsafe {
            glow::Context::from_loader_function(|symbol| match CString::new(symbol) {
                Ok(symbol) => display.get_proc_address(&symbol) as *const _,
                Err(_) => std::ptr::null(),
            })
        };

        let mut renderer = Renderer::new(GlDriver::new(Arc::new(gl)));
        let viewport = Viewport::new(0, 0, size.width as i32, size.height as i32);
        let scene = build_scene(&mut renderer, viewport, self.options.blend)?;
        info!(
            "scene ready: {}x{}, blending {}",
            size.width,
            size.height,
            if self.options.blend { "on" } else { "off" }
        );

        self.scene = Some(scene);
        self.renderer = Some(renderer);
        self.surface = Some(surface);
        self.current_context = Some(context);
        self.window = Some(window);
        Ok(())
    }

    fn resize(&mut self, size: PhysicalSize<u32>) {
        let (Some(width), Some(height)) = (NonZeroU32::new(size.width), NonZeroU32::new(size.height))
        else {
            return;
        };

        if let (Some(surface), Some(context)) = (&self.surface, &self.current_context) {
            surface.resize(context, width, height);
        }

        let (Some(renderer), Some(scene)) = (self.renderer.as_mut(), self.scene.as_ref()) else {
            return;
        };

        let viewport = Viewport::new(0, 0, size.width as i32, size.height as i32);
        if let Some(camera) = renderer.camera_mut(scene.camera) {
            camera.projection =
                cgmath::perspective(Deg(FOV), viewport.aspect_ratio(), NEAR_PLANE, FAR_PLANE);
        }
        if let Some(queue) = renderer.render_queue_mut(scene.queue) {
            fill_queue(queue, viewport, self.options.blend);
        }
    }

    fn redraw(&mut self) {
        self.timer.update();

        if let (Some(renderer), Some(scene)) = (self.renderer.as_mut(), self.scene.as_ref()) {
            if let Some(quad) = renderer.mesh_mut(scene.quad) {
                quad.rotate(vec3(0.0, 0.0, self.timer.delta_time));
            }
            renderer.render_frame(scene.camera, scene.queue);
        }

        if let (Some(surface), Some(context)) = (&self.surface, &self.current_context) {
            if let Err(err) = surface.swap_buffers(context) {
                error!("failed to swap buffers: {err}");
            }
        }

        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }

    fn shutdown(&mut self) {
        self.scene = None;
        if let Some(mut renderer) = self.renderer.take() {
            renderer.terminate();
        }
    }
}

fn fill_queue(queue: &mut RenderQueue, viewport: Viewport, blend: bool) {
    queue.clear();
    queue
        .set_viewport(viewport)
        .clear_buffers(true, true, false, vec4(0.08, 0.08, 0.1, 1.0))
        .set_depth_test(true)
        .set_blend(blend, BlendFactor::SrcAlpha, BlendFactor::OneMinusSrcAlpha)
        .draw_meshes();
}

fn checkerboard(size: u32, cell: u32) -> image::RgbaImage {
    image::RgbaImage::from_fn(size, size, |x, y| {
        if (x / cell + y / cell) % 2 == 0 {
            image::Rgba([235, 235, 235, 255])
        } else {
            image::Rgba([40, 40, 40, 255])
        }
    })
}

fn build_scene(
    renderer: &mut Renderer<GlDriver>,
    viewport: Viewport,
    blend: bool,
) -> Result<Scene, Box<dyn Error>> {
    let vertex_shader = renderer.add_shader(Shader::vertex(VERTEX_SHADER))?;
    let fragment_shader = renderer.add_shader(Shader::fragment(FRAGMENT_SHADER))?;
    let program = renderer.add_shader_program(ShaderProgram::new(
        Some(vertex_shader),
        Some(fragment_shader),
        None,
    ))?;

    let texture = renderer.add_texture(Texture::from_rgba_image("checker", checkerboard(64, 8)))?;

    let mut material = Material::new("checker", Some(program));
    material.add_texture("u_texture", texture);
    material.set_uniform("u_opacity", 0.85f32);
    let material = renderer.add_material(material);

    let vertices = renderer.add_buffer(Buffer::vertices(&QUAD_VERTICES, DrawType::Static))?;
    let indices = renderer.add_buffer(Buffer::indices(&QUAD_INDICES, DrawType::Static))?;
    let quad = renderer.add_mesh(Mesh::new(
        "quad",
        vertices,
        Some(indices),
        VertexFormat::Pos2Col3Uv2,
        Some(material),
    ))?;

    let camera = renderer.add_camera(Camera::perspective(
        "main",
        point3(0.0, 0.0, 2.0),
        point3(0.0, 0.0, 0.0),
        FOV,
        viewport.aspect_ratio(),
        NEAR_PLANE,
        FAR_PLANE,
    ));

    let mut queue = RenderQueue::new();
    fill_queue(&mut queue, viewport, blend);
    let queue = renderer.add_render_queue(queue);

    Ok(Scene {
        camera,
        queue,
        quad,
    })
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        if let Err(err) = self.init(event_loop) {
            error!("failed to set up the renderer: {err}");
            event_loop.exit();
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                info!("close requested, shutting down");
                self.shutdown();
                event_loop.exit();
            }
            WindowEvent::Resized(size) => self.resize(size),
            WindowEvent::RedrawRequested => self.redraw(),
            _ => (),
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        self.shutdown();
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let options = Options::parse();

    let mut logging = LoggingConfig::default();
    if let Some(filter) = &options.log_filter {
        logging = logging.with_filter(filter);
    }
    init_logging(logging);

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(options);
    event_loop.run_app(&mut app)?;
    Ok(())
}
