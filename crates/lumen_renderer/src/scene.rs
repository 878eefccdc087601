//! A renderable scene: a root hittable plus the camera looking at it.

use rand::RngCore;

use crate::bvh::{BvhError, BvhNode};
use crate::hittable::{Hittable, HittableList};
use crate::renderer::{ImageBuffer, RenderConfig};
use crate::{scheduler, Camera};

/// Immutable scene graph and camera, shared read-only by all workers.
pub struct Scene {
    world: Box<dyn Hittable>,
    camera: Camera,
}

impl Scene {
    /// Wrap an already assembled root. Initializes the camera.
    pub fn new(world: Box<dyn Hittable>, mut camera: Camera) -> Self {
        camera.initialize();
        Self { world, camera }
    }

    /// Index a flat list of objects in a BVH over the camera's shutter.
    ///
    /// An empty list gives an empty world that renders as background.
    pub fn from_objects(
        objects: Vec<Box<dyn Hittable>>,
        camera: Camera,
        rng: &mut dyn RngCore,
    ) -> Result<Self, BvhError> {
        if objects.is_empty() {
            log::warn!("Scene has no objects, image will be background only");
            return Ok(Self::new(Box::new(HittableList::new()), camera));
        }

        let bvh = BvhNode::new(objects, camera.shutter(), rng)?;
        Ok(Self::new(Box::new(bvh), camera))
    }

    pub fn world(&self) -> &dyn Hittable {
        self.world.as_ref()
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn render(&self, config: &RenderConfig) -> ImageBuffer {
        render_scene(self, config)
    }
}

/// Render `scene` with the parallel row scheduler.
pub fn render_scene(scene: &Scene, config: &RenderConfig) -> ImageBuffer {
    scheduler::render(&scene.camera, scene.world.as_ref(), config)
}
