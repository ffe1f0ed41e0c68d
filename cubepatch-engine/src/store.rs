//! The cube collection the host owns.
//!
//! Ids come from a monotonically increasing counter and are never reused
//! within a store, so a destroyed cube's id cannot alias a new one.

use std::collections::BTreeMap;

use cubepatch_core::math::Vec3;

use crate::cubes::{Cube, CubeId, CubeKind, CubeParams};

/// Cubes indexed by id.
#[derive(Clone, Debug, Default)]
pub struct CubeStore {
    cubes: BTreeMap<CubeId, Cube>,
    next_id: u64,
}

impl CubeStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a cube with default rotation/scale and default params.
    /// Returns `None` for a non-finite position.
    pub fn create_cube(&mut self, kind: CubeKind, position: Vec3) -> Option<&Cube> {
        if !position.is_finite() {
            return None;
        }
        let id = CubeId(self.next_id);
        self.next_id += 1;
        Some(self.cubes.entry(id).or_insert_with(|| Cube::new(id, kind, position)))
    }

    /// Remove a cube; returns it if it existed.
    pub fn destroy_cube(&mut self, id: CubeId) -> Option<Cube> {
        self.cubes.remove(&id)
    }

    #[must_use]
    pub fn get_cube(&self, id: CubeId) -> Option<&Cube> {
        self.cubes.get(&id)
    }

    /// All cubes in id order.
    pub fn cubes(&self) -> impl Iterator<Item = &Cube> {
        self.cubes.values()
    }

    #[must_use]
    pub fn ids(&self) -> Vec<CubeId> {
        self.cubes.keys().copied().collect()
    }

    /// `false` if the id is unknown or the position is not finite.
    pub fn move_cube(&mut self, id: CubeId, position: Vec3) -> bool {
        if !position.is_finite() {
            return false;
        }
        self.with_cube(id, |c| c.transform.position = position)
    }

    /// Sets rotation and re-derives the cube's audio params from it.
    pub fn rotate_cube(&mut self, id: CubeId, rotation: Vec3) -> bool {
        if !rotation.is_finite() {
            return false;
        }
        self.with_cube(id, |c| {
            c.transform.rotation = rotation;
            c.params = CubeParams::from_transform(c.kind, &c.transform);
        })
    }

    pub fn scale_cube(&mut self, id: CubeId, scale: Vec3) -> bool {
        if !scale.is_finite() {
            return false;
        }
        self.with_cube(id, |c| c.transform.scale = scale)
    }

    pub fn set_active(&mut self, id: CubeId, active: bool) -> bool {
        self.with_cube(id, |c| c.is_active = active)
    }

    /// Audio parameters implied by the cube's current transform.
    #[must_use]
    pub fn map_transform_to_audio(&self, id: CubeId) -> Option<CubeParams> {
        self.cubes
            .get(&id)
            .map(|c| CubeParams::from_transform(c.kind, &c.transform))
    }

    pub fn get_cube_mut(&mut self, id: CubeId) -> Option<&mut Cube> {
        self.cubes.get_mut(&id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cubes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cubes.is_empty()
    }

    /// Drop every cube. The id counter keeps counting.
    pub fn clear(&mut self) -> Vec<Cube> {
        std::mem::take(&mut self.cubes).into_values().collect()
    }

    fn with_cube(&mut self, id: CubeId, f: impl FnOnce(&mut Cube)) -> bool {
        match self.cubes.get_mut(&id) {
            Some(cube) => {
                f(cube);
                true
            }
            None => false,
        }
    }
}
