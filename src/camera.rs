use cgmath::{Deg, Matrix4, Point3, SquareMatrix, Vector3};

/// View and projection the draw pass uploads as `view` and `proj`.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    pub(crate) id: u32,
    pub(crate) generation: u32,
    pub name: String,

    pub view: Matrix4<f32>,
    pub projection: Matrix4<f32>,

    pub position: Point3<f32>,
    pub target: Point3<f32>,
    pub up: Vector3<f32>,
}

impl Camera {
    /// Identity view and projection at the origin.
    pub fn new<T: ToString>(name: T) -> Self {
        Self {
            id: 0,
            generation: 0,
            name: name.to_string(),
            view: Matrix4::identity(),
            projection: Matrix4::identity(),
            position: Point3::new(0.0, 0.0, 0.0),
            target: Point3::new(0.0, 0.0, -1.0),
            up: Vector3::unit_y(),
        }
    }

    pub fn perspective<T: ToString>(
        name: T,
        position: Point3<f32>,
        target: Point3<f32>,
        fov: f32, // in deg
        aspect_ratio: f32,
        near_plane: f32,
        far_plane: f32,
    ) -> Self {
        let mut camera = Self::new(name);
        camera.projection = cgmath::perspective(Deg(fov), aspect_ratio, near_plane, far_plane);
        camera.look_at(position, target, Vector3::unit_y());
        camera
    }

    pub fn orthographic<T: ToString>(
        name: T,
        position: Point3<f32>,
        target: Point3<f32>,
        left: f32,
        right: f32,
        bottom: f32,
        top: f32,
        near_plane: f32,
        far_plane: f32,
    ) -> Self {
        let mut camera = Self::new(name);
        camera.projection = cgmath::ortho(left, right, bottom, top, near_plane, far_plane);
        camera.look_at(position, target, Vector3::unit_y());
        camera
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn look_at(&mut self, position: Point3<f32>, target: Point3<f32>, up: Vector3<f32>) {
        self.position = position;
        self.target = target;
        self.up = up;
        self.update_view();
    }

    /// Moves eye and target together.
    pub fn translate(&mut self, movement: Vector3<f32>) {
        self.position += movement;
        self.target += movement;
        self.update_view();
    }

    fn update_view(&mut self) {
        self.view = Matrix4::look_at_rh(self.position, self.target, self.up);
    }
}
