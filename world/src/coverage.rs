use fieldsweep_core::{is_visible, CellCoord, CellState, Pose, RobotProfile};
use glam::DVec2;

/// Seen/unseen bookkeeping for the cells covering the circular search area.
///
/// Only cells whose centre lies within the search radius are materialized.
/// Because the disk is convex, those cells form one contiguous column span per
/// row, so storage is a flat flag vector plus a span table indexed by row.
/// Flags only ever flip from unseen to seen, except through [`Self::reset`].
#[derive(Clone, Debug)]
pub struct CoverageGrid {
    radius: f64,
    cell_size: f64,
    first_row: i32,
    rows: Vec<RowSpan>,
    seen: Vec<bool>,
    seen_count: usize,
}

#[derive(Clone, Copy, Debug, Default)]
struct RowSpan {
    first_column: i32,
    len: usize,
    offset: usize,
}

impl RowSpan {
    fn column_index(&self, column: i32) -> Option<usize> {
        let delta = usize::try_from(column.checked_sub(self.first_column)?).ok()?;
        (delta < self.len).then_some(self.offset + delta)
    }

    fn last_column(&self) -> Option<i32> {
        let len = i32::try_from(self.len).ok()?;
        (len > 0).then(|| self.first_column + len - 1)
    }
}

impl CoverageGrid {
    /// Materializes every cell whose centre lies within `radius` of the origin.
    ///
    /// `cell_size` must be positive; the world validates it before calling.
    #[must_use]
    pub fn new(radius: f64, cell_size: f64) -> Self {
        let half_extent = (radius / cell_size).ceil() as i32;
        let first_row = -half_extent;
        let mut rows = Vec::new();
        let mut offset = 0;

        for row in -half_extent..half_extent {
            let mut span = RowSpan {
                offset,
                ..RowSpan::default()
            };
            for column in -half_extent..half_extent {
                let center = cell_center(CellCoord::new(column, row), cell_size);
                if center.length() > radius {
                    continue;
                }
                if span.len == 0 {
                    span.first_column = column;
                }
                span.len += 1;
            }
            offset += span.len;
            rows.push(span);
        }

        Self {
            radius,
            cell_size,
            first_row,
            rows,
            seen: vec![false; offset],
            seen_count: 0,
        }
    }

    /// Radius of the search disk in meters.
    #[must_use]
    pub const fn radius(&self) -> f64 {
        self.radius
    }

    /// Side length of each cell in meters.
    #[must_use]
    pub const fn cell_size(&self) -> f64 {
        self.cell_size
    }

    /// Number of cells inside the search disk.
    #[must_use]
    pub fn total_cells(&self) -> usize {
        self.seen.len()
    }

    /// Number of cells inside the search disk that have been observed.
    #[must_use]
    pub const fn seen_cells(&self) -> usize {
        self.seen_count
    }

    /// Fraction of the disk observed so far, within `[0, 1]`.
    ///
    /// A disk without cells reports zero.
    #[must_use]
    pub fn coverage_fraction(&self) -> f64 {
        if self.seen.is_empty() {
            return 0.0;
        }
        self.seen_count as f64 / self.seen.len() as f64
    }

    /// Cell containing `point`.
    #[must_use]
    pub fn cell_at(&self, point: DVec2) -> CellCoord {
        CellCoord::new(
            (point.x / self.cell_size).floor() as i32,
            (point.y / self.cell_size).floor() as i32,
        )
    }

    /// Centre of `cell` in world coordinates.
    #[must_use]
    pub fn center_of(&self, cell: CellCoord) -> DVec2 {
        cell_center(cell, self.cell_size)
    }

    /// Whether `point` lies within the search radius.
    #[must_use]
    pub fn contains_point(&self, point: DVec2) -> bool {
        point.length() <= self.radius
    }

    /// Whether `cell` belongs to the search disk.
    #[must_use]
    pub fn contains_cell(&self, cell: CellCoord) -> bool {
        self.index(cell).is_some()
    }

    /// Whether `cell` has been observed. Cells outside the disk never are.
    #[must_use]
    pub fn is_seen(&self, cell: CellCoord) -> bool {
        self.index(cell).map_or(false, |index| self.seen[index])
    }

    /// Marks every cell whose centre the camera sees from `pose`.
    ///
    /// Only cells within the camera range bounding box are tested. Returns the
    /// number of cells that flipped from unseen to seen, so repeating the call
    /// with the same pose returns zero.
    pub fn mark_seen(&mut self, pose: &Pose, profile: &RobotProfile) -> usize {
        let reach = DVec2::splat(profile.camera_range());
        let low = self.cell_at(pose.position() - reach);
        let high = self.cell_at(pose.position() + reach);
        let mut newly_seen = 0;

        for row in low.row()..=high.row() {
            let Some(span) = self.row_span(row) else {
                continue;
            };
            let Some(last_column) = span.last_column() else {
                continue;
            };

            for column in low.column().max(span.first_column)..=high.column().min(last_column) {
                let Some(index) = span.column_index(column) else {
                    continue;
                };
                if self.seen[index] {
                    continue;
                }
                let center = cell_center(CellCoord::new(column, row), self.cell_size);
                if is_visible(center, pose, profile) {
                    self.seen[index] = true;
                    newly_seen += 1;
                }
            }
        }

        self.seen_count += newly_seen;
        newly_seen
    }

    /// Clears every seen flag.
    pub fn reset(&mut self) {
        self.seen.fill(false);
        self.seen_count = 0;
    }

    /// Iterates over every materialized cell in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = CellState> + '_ {
        self.rows.iter().enumerate().flat_map(move |(row_offset, span)| {
            let row = self.first_row + row_offset as i32;
            (0..span.len).map(move |column_offset| {
                let cell = CellCoord::new(span.first_column + column_offset as i32, row);
                CellState {
                    cell,
                    center: cell_center(cell, self.cell_size),
                    seen: self.seen[span.offset + column_offset],
                }
            })
        })
    }

    fn row_span(&self, row: i32) -> Option<RowSpan> {
        let row_offset = usize::try_from(row.checked_sub(self.first_row)?).ok()?;
        self.rows.get(row_offset).copied()
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        self.row_span(cell.row())?.column_index(cell.column())
    }
}

fn cell_center(cell: CellCoord, cell_size: f64) -> DVec2 {
    DVec2::new(
        (f64::from(cell.column()) + 0.5) * cell_size,
        (f64::from(cell.row()) + 0.5) * cell_size,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use fieldsweep_core::compass_polar;
    use proptest::prelude::*;

    fn realsense() -> RobotProfile {
        RobotProfile::new(1.0, 3.0, 87.0, 58.0)
    }

    #[test]
    fn fresh_grid_reports_zero_coverage() {
        let grid = CoverageGrid::new(10.0, 0.5);
        assert_eq!(grid.coverage_fraction(), 0.0);
        assert_eq!(grid.seen_cells(), 0);
        assert_eq!(grid.total_cells(), 1264);
    }

    #[test]
    fn only_cells_with_centres_in_the_disk_exist() {
        let grid = CoverageGrid::new(10.0, 0.5);
        assert!(grid.cells().all(|state| state.center.length() <= 10.0));
        assert_eq!(grid.cells().count(), grid.total_cells());
        assert!(grid.contains_cell(CellCoord::new(0, 0)));
        assert!(grid.contains_cell(CellCoord::new(-20, -1)));
        assert!(!grid.contains_cell(CellCoord::new(19, 19)));
        assert!(!grid.contains_cell(CellCoord::new(20, 0)));
    }

    #[test]
    fn points_map_to_floor_cells() {
        let grid = CoverageGrid::new(10.0, 0.5);
        assert_eq!(grid.cell_at(DVec2::ZERO), CellCoord::new(0, 0));
        assert_eq!(grid.cell_at(DVec2::new(-0.1, 0.6)), CellCoord::new(-1, 1));
        assert_eq!(grid.center_of(CellCoord::new(-1, 1)), DVec2::new(-0.25, 0.75));
        assert!(grid.contains_point(DVec2::new(0.0, 0.0)));
        assert!(!grid.contains_point(DVec2::new(15.0, 15.0)));
    }

    #[test]
    fn observation_marks_cells_ahead_only() {
        let mut grid = CoverageGrid::new(10.0, 0.5);
        let pose = Pose::new(0.0, 0.0, 0.0);
        let newly_seen = grid.mark_seen(&pose, &realsense());
        assert!(newly_seen > 0);
        assert!(grid.is_seen(grid.cell_at(compass_polar(2.0, 0.0))));
        assert!(!grid.is_seen(grid.cell_at(compass_polar(2.0, 180.0))));
        assert!(grid.coverage_fraction() > 0.0 && grid.coverage_fraction() < 1.0);
    }

    #[test]
    fn repeated_observation_is_idempotent() {
        let mut grid = CoverageGrid::new(10.0, 0.5);
        let pose = Pose::new(1.0, -2.0, 135.0);
        let first = grid.mark_seen(&pose, &realsense());
        let fraction = grid.coverage_fraction();
        assert!(first > 0);
        assert_eq!(grid.mark_seen(&pose, &realsense()), 0);
        assert_eq!(grid.coverage_fraction(), fraction);
    }

    #[test]
    fn observation_outside_the_disk_is_ignored() {
        let mut grid = CoverageGrid::new(10.0, 0.5);
        let pose = Pose::new(30.0, 30.0, 45.0);
        assert_eq!(grid.mark_seen(&pose, &realsense()), 0);
        assert_eq!(grid.coverage_fraction(), 0.0);
    }

    #[test]
    fn empty_disk_reports_zero_coverage() {
        let mut grid = CoverageGrid::new(0.0, 0.5);
        assert_eq!(grid.total_cells(), 0);
        assert_eq!(grid.mark_seen(&Pose::new(0.0, 0.0, 0.0), &realsense()), 0);
        assert_eq!(grid.coverage_fraction(), 0.0);
    }

    #[test]
    fn reset_clears_observations() {
        let mut grid = CoverageGrid::new(10.0, 0.5);
        let _ = grid.mark_seen(&Pose::new(0.0, 0.0, 0.0), &realsense());
        grid.reset();
        assert_eq!(grid.seen_cells(), 0);
        assert!(grid.cells().all(|state| !state.seen));
    }

    #[test]
    fn wide_field_of_view_sees_the_full_range_disk() {
        let mut grid = CoverageGrid::new(10.0, 0.5);
        let omni = RobotProfile::new(1.0, 3.0, 360.0, 58.0);
        let _ = grid.mark_seen(&Pose::new(0.0, 0.0, 0.0), &omni);
        for state in grid.cells() {
            assert_eq!(state.seen, state.center.length() <= 3.0, "{:?}", state.cell);
        }
    }

    proptest! {
        #[test]
        fn coverage_never_decreases(
            poses in proptest::collection::vec((-12.0f64..12.0, -12.0f64..12.0, 0.0f64..360.0), 1..40),
        ) {
            let mut grid = CoverageGrid::new(10.0, 0.5);
            let profile = realsense();
            let mut previous: Vec<bool> = grid.cells().map(|state| state.seen).collect();
            for (x, y, heading) in poses {
                let _ = grid.mark_seen(&Pose::new(x, y, heading), &profile);
                let current: Vec<bool> = grid.cells().map(|state| state.seen).collect();
                for (before, after) in previous.iter().zip(&current) {
                    prop_assert!(!before || *after);
                }
                let fraction = grid.coverage_fraction();
                prop_assert!((0.0..=1.0).contains(&fraction));
                previous = current;
            }
        }
    }
}
