//! Seam to whatever draws the table.
//!
//! The session tells the view what changed; the view never reaches back into
//! the connection set.

use crate::cubes::{Cube, CubeId, Transform};

pub trait SceneView {
    fn add_cube(&mut self, cube: &Cube);

    fn update_cube(&mut self, id: CubeId, transform: &Transform);

    fn remove_cube(&mut self, id: CubeId);

    /// Draw a link; `intensity` is the edge strength.
    fn show_connection(&mut self, from: &Cube, to: &Cube, intensity: f32);

    fn hide_connection(&mut self, from: CubeId, to: CubeId);
}

/// View that draws nothing.
#[derive(Copy, Clone, Debug, Default)]
pub struct NullView;

impl SceneView for NullView {
    fn add_cube(&mut self, _: &Cube) {}
    fn update_cube(&mut self, _: CubeId, _: &Transform) {}
    fn remove_cube(&mut self, _: CubeId) {}
    fn show_connection(&mut self, _: &Cube, _: &Cube, _: f32) {}
    fn hide_connection(&mut self, _: CubeId, _: CubeId) {}
}
