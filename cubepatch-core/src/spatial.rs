//! Uniform spatial grid for neighbourhood queries.
//!
//! Entities are bucketed into cubic cells of edge `cell_size`; an entity at
//! `(x, y, z)` lives in cell `(⌊x/s⌋, ⌊y/s⌋, ⌊z/s⌋)`. The grid is a derived
//! index: it is rebuilt from scratch for every reconciliation and never
//! outlives the call that built it.
//!
//! Contents
//! - `Placed`      : the seam through which the host hands us entities
//! - `CellCoord`   : integer cell coordinate, `Ord` so buckets iterate stably
//! - `cell_of`     : position → cell (floor division, ties toward −∞)
//! - `SpatialGrid` : cell → identifier buckets plus per-entity slots

use alloc::collections::{BTreeMap, BTreeSet};
use alloc::string::ToString;
use core::fmt::{Debug, Display};

use crate::error::ReconcileError;
use crate::math::{m_floor, Vec3};

/// Anything the host can place in the world.
///
/// The engine only ever reads the identifier and the position; it never
/// creates, moves or deletes entities.
pub trait Placed {
    type Id: Ord + Clone + Debug + Display;

    fn id(&self) -> &Self::Id;

    fn position(&self) -> Vec3;
}

impl<K: Ord + Clone + Debug + Display> Placed for (K, Vec3) {
    type Id = K;

    #[inline]
    fn id(&self) -> &K {
        &self.0
    }

    #[inline]
    fn position(&self) -> Vec3 {
        self.1
    }
}

/// Integer coordinate of one grid cell.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CellCoord {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl CellCoord {
    #[inline]
    #[must_use]
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Neighbour at the given offset, or `None` if it falls off the `i32` grid.
    #[inline]
    #[must_use]
    pub fn offset(self, dx: i32, dy: i32, dz: i32) -> Option<Self> {
        Some(Self {
            x: self.x.checked_add(dx)?,
            y: self.y.checked_add(dy)?,
            z: self.z.checked_add(dz)?,
        })
    }

    /// Every cell within `reach` steps on each axis, this one included.
    ///
    /// `reach = 1` is the familiar 3×3×3 block (the cell and its 26 neighbours).
    pub fn neighborhood(self, reach: i32) -> impl Iterator<Item = CellCoord> {
        (-reach..=reach).flat_map(move |dx| {
            (-reach..=reach)
                .flat_map(move |dy| (-reach..=reach).filter_map(move |dz| self.offset(dx, dy, dz)))
        })
    }

    /// Chessboard distance in cells.
    #[inline]
    #[must_use]
    pub fn chebyshev(self, other: Self) -> i64 {
        let dx = (i64::from(self.x) - i64::from(other.x)).abs();
        let dy = (i64::from(self.y) - i64::from(other.y)).abs();
        let dz = (i64::from(self.z) - i64::from(other.z)).abs();
        dx.max(dy).max(dz)
    }
}

/// Map a position to its cell. `None` only for non-finite input.
///
/// Cells beyond the `i32` range saturate to the edge cell. Saturation never
/// pushes two points further apart in cell units, so a proximal pair out
/// there still lands within the scan reach.
#[inline]
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn cell_of(position: Vec3, cell_size: f32) -> Option<CellCoord> {
    if !position.is_finite() {
        return None;
    }
    // `as` saturates float → int.
    let axis = |v: f32| m_floor(v / cell_size) as i32;
    Some(CellCoord {
        x: axis(position.x),
        y: axis(position.y),
        z: axis(position.z),
    })
}

/// Where one entity sits in the grid.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Slot {
    pub position: Vec3,
    pub cell: CellCoord,
}

/// Cell → occupant buckets for one snapshot of the entity collection.
#[derive(Clone, Debug)]
pub struct SpatialGrid<K> {
    cell_size: f32,
    buckets: BTreeMap<CellCoord, BTreeSet<K>>,
    slots: BTreeMap<K, Slot>,
}

impl<K: Ord + Clone + Debug + Display> SpatialGrid<K> {
    /// Empty grid. `cell_size` is assumed validated by the caller.
    #[must_use]
    pub fn new(cell_size: f32) -> Self {
        Self {
            cell_size,
            buckets: BTreeMap::new(),
            slots: BTreeMap::new(),
        }
    }

    /// Bucket every entity of the collection.
    ///
    /// # Errors
    /// Fails on the first entity with a non-finite position or an identifier
    /// seen twice.
    pub fn build<'a, E, I>(entities: I, cell_size: f32) -> Result<Self, ReconcileError>
    where
        E: Placed<Id = K> + 'a,
        I: IntoIterator<Item = &'a E>,
    {
        let mut grid = Self::new(cell_size);
        for entity in entities {
            grid.insert(entity.id().clone(), entity.position())?;
        }
        Ok(grid)
    }

    /// Add one entity.
    ///
    /// # Errors
    /// See [`SpatialGrid::build`].
    pub fn insert(&mut self, id: K, position: Vec3) -> Result<CellCoord, ReconcileError> {
        let Some(cell) = cell_of(position, self.cell_size) else {
            return Err(ReconcileError::NonFinitePosition { entity: id.to_string() });
        };
        if self.slots.contains_key(&id) {
            return Err(ReconcileError::DuplicateEntity { entity: id.to_string() });
        }
        self.buckets.entry(cell).or_default().insert(id.clone());
        self.slots.insert(id, Slot { position, cell });
        Ok(cell)
    }

    #[inline]
    #[must_use]
    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Occupants of a single cell.
    #[inline]
    #[must_use]
    pub fn bucket(&self, cell: CellCoord) -> Option<&BTreeSet<K>> {
        self.buckets.get(&cell)
    }

    #[inline]
    #[must_use]
    pub fn slot(&self, id: &K) -> Option<&Slot> {
        self.slots.get(id)
    }

    /// All entities with their slot, in identifier order.
    pub fn slots(&self) -> impl Iterator<Item = (&K, &Slot)> {
        self.slots.iter()
    }

    /// Visit every occupant of the cells within `reach` of `cell`.
    ///
    /// When the neighbourhood has more cells than the grid has occupied
    /// buckets, the occupied buckets are filtered instead, so huge reaches
    /// cost at most one pass over the grid.
    pub fn for_each_candidate(&self, cell: CellCoord, reach: i32, mut visit: impl FnMut(&K)) {
        let side = u64::try_from(2 * i64::from(reach) + 1).unwrap_or(u64::MAX);
        let volume = side.checked_pow(3).unwrap_or(u64::MAX);
        if volume > self.buckets.len() as u64 {
            for (other, ids) in &self.buckets {
                if other.chebyshev(cell) <= i64::from(reach) {
                    ids.iter().for_each(&mut visit);
                }
            }
        } else {
            for other in cell.neighborhood(reach) {
                if let Some(ids) = self.buckets.get(&other) {
                    ids.iter().for_each(&mut visit);
                }
            }
        }
    }

    /// Number of entities indexed.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Number of occupied cells.
    #[inline]
    #[must_use]
    pub fn cell_count(&self) -> usize {
        self.buckets.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;

    #[test]
    fn floor_division_puts_negatives_below_zero() {
        assert_eq!(cell_of(Vec3::new(0.0, 0.0, 0.0), 3.0), Some(CellCoord::new(0, 0, 0)));
        assert_eq!(cell_of(Vec3::new(2.99, 3.0, -0.01), 3.0), Some(CellCoord::new(0, 1, -1)));
        assert_eq!(cell_of(Vec3::new(-3.0, -3.01, 6.0), 3.0), Some(CellCoord::new(-1, -2, 2)));
    }

    #[test]
    fn cell_assignment_is_deterministic() {
        let p = Vec3::new(-7.25, 13.5, 0.001);
        let first = cell_of(p, 2.5);
        for _ in 0..100 {
            assert_eq!(cell_of(p, 2.5), first);
        }
    }

    #[test]
    fn non_finite_positions_have_no_cell() {
        assert_eq!(cell_of(Vec3::new(f32::NAN, 0.0, 0.0), 3.0), None);
        assert_eq!(cell_of(Vec3::new(0.0, f32::INFINITY, 0.0), 3.0), None);
    }

    #[test]
    fn far_positions_saturate_to_the_edge_cell() {
        assert_eq!(
            cell_of(Vec3::new(1.0e10, -1.0e10, 0.0), 3.0),
            Some(CellCoord::new(i32::MAX, i32::MIN, 0))
        );
        assert_eq!(
            cell_of(Vec3::new(0.0, 0.0, 1.0e30), 1.0e-6),
            Some(CellCoord::new(0, 0, i32::MAX))
        );
    }

    #[test]
    fn far_entities_are_indexed() {
        let entities = [(0_u32, Vec3::new(1.0e10, 0.0, 0.0)), (1, Vec3::new(1.0e10, 1.0, 0.0))];
        let grid = SpatialGrid::build(&entities, 3.0).unwrap();
        assert_eq!(grid.len(), 2);
        let edge = CellCoord::new(i32::MAX, 0, 0);
        let mut seen = Vec::new();
        grid.for_each_candidate(edge, 1, |id| seen.push(*id));
        assert_eq!(seen, [0, 1]);
    }

    #[test]
    fn errors_name_entities_by_display_form() {
        let nan = [("cube-7", Vec3::new(f32::NAN, 0.0, 0.0))];
        assert_eq!(
            SpatialGrid::build(&nan, 3.0).unwrap_err(),
            ReconcileError::NonFinitePosition { entity: "cube-7".into() }
        );
    }

    #[test]
    fn empty_collection_builds_empty_grid() {
        let none: Vec<(u32, Vec3)> = Vec::new();
        let grid = SpatialGrid::build(&none, 3.0).unwrap();
        assert!(grid.is_empty());
        assert_eq!(grid.cell_count(), 0);
    }

    #[test]
    fn shared_cells_share_a_bucket() {
        let entities = [
            ("a", Vec3::new(0.5, 0.5, 0.5)),
            ("b", Vec3::new(2.5, 0.0, 1.0)),
            ("c", Vec3::new(-0.5, 0.0, 0.0)),
        ];
        let grid = SpatialGrid::build(&entities, 3.0).unwrap();
        assert_eq!(grid.len(), 3);
        assert_eq!(grid.cell_count(), 2);
        let origin = grid.bucket(CellCoord::new(0, 0, 0)).unwrap();
        assert!(origin.contains("a") && origin.contains("b"));
        assert_eq!(grid.slot(&"c").unwrap().cell, CellCoord::new(-1, 0, 0));
    }

    #[test]
    fn build_rejects_bad_input() {
        let nan = [(1_u32, Vec3::new(0.0, f32::NAN, 0.0))];
        assert!(matches!(
            SpatialGrid::build(&nan, 3.0),
            Err(ReconcileError::NonFinitePosition { .. })
        ));

        let dup = [(1_u32, Vec3::ZERO), (1_u32, Vec3::ONE)];
        assert!(matches!(
            SpatialGrid::build(&dup, 3.0),
            Err(ReconcileError::DuplicateEntity { .. })
        ));
    }

    #[test]
    fn neighborhood_is_a_full_block() {
        let cells: Vec<_> = CellCoord::new(0, 0, 0).neighborhood(1).collect();
        assert_eq!(cells.len(), 27);
        assert!(cells.contains(&CellCoord::new(-1, 1, -1)));
        assert_eq!(CellCoord::new(5, 5, 5).neighborhood(2).count(), 125);
    }

    #[test]
    fn neighborhood_stops_at_grid_edge() {
        let corner = CellCoord::new(i32::MAX, i32::MAX, i32::MAX);
        assert_eq!(corner.neighborhood(1).count(), 8);
    }

    #[test]
    fn candidates_cover_adjacent_cells_only() {
        let entities = [
            (0_u32, Vec3::new(0.0, 0.0, 0.0)),
            (1, Vec3::new(3.5, 0.0, 0.0)),
            (2, Vec3::new(-0.5, -0.5, -0.5)),
            (3, Vec3::new(7.0, 0.0, 0.0)),
        ];
        let grid = SpatialGrid::build(&entities, 3.0).unwrap();
        let mut seen = Vec::new();
        grid.for_each_candidate(CellCoord::new(0, 0, 0), 1, |id| seen.push(*id));
        seen.sort_unstable();
        assert_eq!(seen, [0, 1, 2]);
    }
}
