#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for fieldsweep adapters.
//!
//! Renderers receive immutable [`FrameSnapshot`] values and never feed
//! anything back into the simulation.

use std::{collections::HashSet, fmt, io::Write};

use anyhow::{Context, Result as AnyResult};
use fieldsweep_core::{CellCoord, FrameSnapshot};
use glam::DVec2;

/// Rendering backend capable of presenting simulation snapshots.
pub trait RenderingBackend {
    /// Presents a single post-frame snapshot.
    fn present(&mut self, snapshot: &FrameSnapshot) -> AnyResult<()>;
}

/// Characters used by [`AsciiMap`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Glyphs {
    /// Cell inside the search disk that has been observed.
    pub seen: char,
    /// Cell inside the search disk that has not been observed.
    pub unseen: char,
    /// Position outside the search disk.
    pub outside: char,
    /// Cell the robot drove through.
    pub path: char,
    /// Cell currently holding the robot.
    pub robot: char,
}

impl Default for Glyphs {
    fn default() -> Self {
        Self {
            seen: '#',
            unseen: '.',
            outside: ' ',
            path: '*',
            robot: '@',
        }
    }
}

/// Top-down text picture of a snapshot, one character per coverage cell.
///
/// North is up. Rows run from the northernmost cell to the southernmost.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AsciiMap {
    rows: Vec<String>,
}

impl AsciiMap {
    /// Renders `snapshot` for a grid of `cell_size` meter cells.
    #[must_use]
    pub fn from_snapshot(snapshot: &FrameSnapshot, cell_size: f64, glyphs: Glyphs) -> Self {
        let Some(bounds) = Bounds::of(snapshot) else {
            return Self { rows: Vec::new() };
        };

        let to_cell = |point: DVec2| {
            CellCoord::new(
                (point.x / cell_size).floor() as i32,
                (point.y / cell_size).floor() as i32,
            )
        };
        let path: HashSet<CellCoord> = snapshot.path_history.iter().copied().map(to_cell).collect();
        let robot = to_cell(snapshot.pose.position());

        let width = bounds.width();
        let height = bounds.height();
        let mut canvas = vec![vec![glyphs.outside; width]; height];
        for state in &snapshot.cells {
            let Some((column, row)) = bounds.slot(state.cell) else {
                continue;
            };
            canvas[row][column] = if state.cell == robot {
                glyphs.robot
            } else if path.contains(&state.cell) {
                glyphs.path
            } else if state.seen {
                glyphs.seen
            } else {
                glyphs.unseen
            };
        }

        Self {
            rows: canvas
                .into_iter()
                .map(|row| row.into_iter().collect::<String>().trim_end().to_owned())
                .collect(),
        }
    }

    /// Rendered rows, northernmost first.
    #[must_use]
    pub fn rows(&self) -> &[String] {
        &self.rows
    }
}

impl fmt::Display for AsciiMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in &self.rows {
            writeln!(f, "{row}")?;
        }
        Ok(())
    }
}

/// Backend that writes an [`AsciiMap`] and a status line for every snapshot.
#[derive(Debug)]
pub struct TextBackend<W> {
    out: W,
    cell_size: f64,
    glyphs: Glyphs,
}

impl<W: Write> TextBackend<W> {
    /// Creates a backend writing to `out` for a grid of `cell_size` meter cells.
    #[must_use]
    pub fn new(out: W, cell_size: f64) -> Self {
        Self {
            out,
            cell_size,
            glyphs: Glyphs::default(),
        }
    }

    /// Consumes the backend, returning the writer.
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> RenderingBackend for TextBackend<W> {
    fn present(&mut self, snapshot: &FrameSnapshot) -> AnyResult<()> {
        let map = AsciiMap::from_snapshot(snapshot, self.cell_size, self.glyphs);
        write!(self.out, "{map}").context("failed to write coverage map")?;
        writeln!(
            self.out,
            "frame {} | {:.1} s | coverage {:.1}% | pose ({:.2}, {:.2}) heading {:.1}",
            snapshot.frame,
            snapshot.elapsed,
            snapshot.coverage_fraction * 100.0,
            snapshot.pose.x(),
            snapshot.pose.y(),
            snapshot.pose.heading()
        )
        .context("failed to write frame status")?;
        Ok(())
    }
}

#[derive(Clone, Copy, Debug)]
struct Bounds {
    min: CellCoord,
    max: CellCoord,
}

impl Bounds {
    fn of(snapshot: &FrameSnapshot) -> Option<Self> {
        let mut cells = snapshot.cells.iter().map(|state| state.cell);
        let first = cells.next()?;
        let (mut min, mut max) = (first, first);
        for cell in cells {
            min = CellCoord::new(min.column().min(cell.column()), min.row().min(cell.row()));
            max = CellCoord::new(max.column().max(cell.column()), max.row().max(cell.row()));
        }
        Some(Self { min, max })
    }

    fn width(&self) -> usize {
        usize::try_from(self.max.column() - self.min.column() + 1).unwrap_or(0)
    }

    fn height(&self) -> usize {
        usize::try_from(self.max.row() - self.min.row() + 1).unwrap_or(0)
    }

    /// Canvas column and row of `cell`, with the northernmost row first.
    fn slot(&self, cell: CellCoord) -> Option<(usize, usize)> {
        let column = usize::try_from(cell.column() - self.min.column()).ok()?;
        let row = usize::try_from(self.max.row() - cell.row()).ok()?;
        (column < self.width() && row < self.height()).then_some((column, row))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fieldsweep_core::{CellState, Pose};

    fn snapshot(cells: Vec<CellState>, pose: Pose, path: Vec<DVec2>) -> FrameSnapshot {
        FrameSnapshot {
            frame: 7,
            elapsed: 0.7,
            pose,
            coverage_fraction: 0.25,
            path_history: path,
            cells,
            strategy_finished: false,
        }
    }

    fn cell(column: i32, row: i32, seen: bool) -> CellState {
        CellState {
            cell: CellCoord::new(column, row),
            center: DVec2::new(f64::from(column) + 0.5, f64::from(row) + 0.5),
            seen,
        }
    }

    #[test]
    fn north_is_drawn_at_the_top() {
        let cells = vec![
            cell(0, 0, false),
            cell(1, 0, true),
            cell(0, 1, true),
            cell(1, 1, false),
        ];
        let map = AsciiMap::from_snapshot(
            &snapshot(cells, Pose::new(5.0, 5.0, 0.0), Vec::new()),
            1.0,
            Glyphs::default(),
        );
        assert_eq!(map.rows(), ["#.", ".#"]);
    }

    #[test]
    fn robot_and_path_overlay_cells() {
        let cells = vec![cell(0, 0, true), cell(1, 0, true), cell(2, 0, false)];
        let path = vec![DVec2::new(0.2, 0.2), DVec2::new(1.5, 0.5)];
        let map = AsciiMap::from_snapshot(
            &snapshot(cells, Pose::new(1.5, 0.5, 90.0), path),
            1.0,
            Glyphs::default(),
        );
        assert_eq!(map.rows(), ["*@."]);
    }

    #[test]
    fn cells_missing_from_the_disk_render_as_outside() {
        let cells = vec![cell(0, 0, false), cell(2, 0, false)];
        let map = AsciiMap::from_snapshot(
            &snapshot(cells, Pose::new(9.0, 9.0, 0.0), Vec::new()),
            1.0,
            Glyphs::default(),
        );
        assert_eq!(map.to_string(), ". .\n");
    }

    #[test]
    fn empty_snapshot_renders_nothing() {
        let map = AsciiMap::from_snapshot(
            &snapshot(Vec::new(), Pose::new(0.0, 0.0, 0.0), Vec::new()),
            0.5,
            Glyphs::default(),
        );
        assert!(map.rows().is_empty());
    }

    #[test]
    fn text_backend_writes_map_and_status() {
        let mut backend = TextBackend::new(Vec::new(), 1.0);
        backend
            .present(&snapshot(
                vec![cell(0, 0, true)],
                Pose::new(3.0, 3.0, 0.0),
                Vec::new(),
            ))
            .expect("writing to a vector never fails");
        let output = String::from_utf8(backend.into_inner()).expect("utf-8 output");
        assert!(output.starts_with("#\n"));
        assert!(output.contains("coverage 25.0%"));
    }
}
