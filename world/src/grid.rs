//! Snap-to-cell placement grid.
//!
//! Occupancy is not stored separately: the grid owns the emplacement registry
//! and answers "who stands here" from it, so a cell can never disagree with the
//! emplacement that claims it.

use std::{collections::BTreeSet, time::Duration};

use glam::Vec2;
use lane_defence_core::{CellCoord, EmplacementId, EmplacementKind, EmplacementStats, PlacementError};

use crate::emplacements::{EmplacementRegistry, EmplacementState};

#[derive(Debug)]
pub(crate) struct PlacementGrid {
    cell_size: f32,
    valid_cells: BTreeSet<CellCoord>,
    emplacements: EmplacementRegistry,
}

impl PlacementGrid {
    pub(crate) fn new(cell_size: f32, valid_cells: impl IntoIterator<Item = CellCoord>) -> Self {
        Self {
            cell_size,
            valid_cells: valid_cells.into_iter().collect(),
            emplacements: EmplacementRegistry::new(),
        }
    }

    /// Cell containing `point`, using floor division so negative coordinates
    /// land in negative cells.
    pub(crate) fn cell_of(&self, point: Vec2) -> CellCoord {
        let column = (point.x / self.cell_size).floor() as i32;
        let row = (point.y / self.cell_size).floor() as i32;
        CellCoord::new(column, row)
    }

    pub(crate) fn center_of(&self, cell: CellCoord) -> Vec2 {
        let half = self.cell_size / 2.0;
        Vec2::new(
            cell.column() as f32 * self.cell_size + half,
            cell.row() as f32 * self.cell_size + half,
        )
    }

    /// Centre of the cell containing `point`.
    pub(crate) fn snap_to_cell(&self, point: Vec2) -> Vec2 {
        self.center_of(self.cell_of(point))
    }

    pub(crate) fn availability(&self, cell: CellCoord) -> Result<(), PlacementError> {
        if !self.valid_cells.contains(&cell) {
            return Err(PlacementError::NotPlaceable);
        }
        if self.emplacements.occupant(cell).is_some() {
            return Err(PlacementError::Occupied);
        }
        Ok(())
    }

    pub(crate) fn is_available(&self, cell: CellCoord) -> bool {
        self.availability(cell).is_ok()
    }

    /// Registers an emplacement on `cell`, re-checking availability first.
    pub(crate) fn place(
        &mut self,
        kind: EmplacementKind,
        cell: CellCoord,
        stats: &EmplacementStats,
        now: Duration,
    ) -> Result<EmplacementId, PlacementError> {
        self.availability(cell)?;
        let position = self.center_of(cell);
        Ok(self.emplacements.insert(kind, cell, position, stats, now))
    }

    /// Unregisters an emplacement. Unknown identifiers are ignored.
    pub(crate) fn remove(&mut self, id: EmplacementId) -> Option<EmplacementState> {
        self.emplacements.remove(id)
    }

    pub(crate) fn occupant(&self, cell: CellCoord) -> Option<EmplacementId> {
        self.emplacements.occupant(cell)
    }

    pub(crate) fn emplacements(&self) -> &EmplacementRegistry {
        &self.emplacements
    }

    pub(crate) fn emplacements_mut(&mut self) -> &mut EmplacementRegistry {
        &mut self.emplacements
    }

    pub(crate) fn valid_cells(&self) -> impl Iterator<Item = CellCoord> + '_ {
        self.valid_cells.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lane_defence_core::Gold;

    fn grid() -> PlacementGrid {
        let cells = (1..15).flat_map(|column| (3..10).map(move |row| CellCoord::new(column, row)));
        PlacementGrid::new(64.0, cells)
    }

    fn stats() -> EmplacementStats {
        EmplacementStats {
            cost: Gold::new(100),
            range: 150.0,
            damage: 20.0,
            fire_interval_ms: 1_000,
        }
    }

    #[test]
    fn snapping_uses_floor_division() {
        let grid = grid();
        assert_eq!(grid.snap_to_cell(Vec2::new(100.0, 300.0)), Vec2::new(96.0, 288.0));
        assert_eq!(grid.snap_to_cell(Vec2::new(64.0, 255.9)), Vec2::new(96.0, 224.0));
        assert_eq!(grid.cell_of(Vec2::new(-1.0, -1.0)), CellCoord::new(-1, -1));
        assert_eq!(grid.snap_to_cell(Vec2::new(-1.0, 10.0)), Vec2::new(-32.0, 32.0));
    }

    #[test]
    fn cells_outside_valid_set_are_rejected() {
        let mut grid = grid();
        let cell = CellCoord::new(0, 0);
        assert!(!grid.is_available(cell));
        assert_eq!(
            grid.place(EmplacementKind::Basic, cell, &stats(), Duration::ZERO),
            Err(PlacementError::NotPlaceable)
        );
        assert_eq!(grid.emplacements().iter().count(), 0);
    }

    #[test]
    fn placed_cell_stays_unavailable_until_removed() {
        let mut grid = grid();
        let cell = CellCoord::new(1, 4);
        let id = grid
            .place(EmplacementKind::Basic, cell, &stats(), Duration::ZERO)
            .expect("cell is free");

        assert!(!grid.is_available(cell));
        assert_eq!(grid.occupant(cell), Some(id));
        assert_eq!(
            grid.place(EmplacementKind::Sniper, cell, &stats(), Duration::ZERO),
            Err(PlacementError::Occupied)
        );
        assert_eq!(grid.emplacements().iter().count(), 1);

        assert!(grid.remove(id).is_some());
        assert!(grid.is_available(cell));
        assert!(grid.remove(id).is_none());
    }

    #[test]
    fn placed_emplacement_sits_on_cell_centre() {
        let mut grid = grid();
        let id = grid
            .place(EmplacementKind::Basic, CellCoord::new(2, 5), &stats(), Duration::ZERO)
            .expect("cell is free");
        let state = grid.emplacements().get(id).expect("registered");
        assert_eq!(state.position, Vec2::new(160.0, 352.0));
    }
}
