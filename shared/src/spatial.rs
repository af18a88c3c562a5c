use crate::country::CountryFeature;

const GRID_COLS: usize = 72;
const GRID_ROWS: usize = 36;

/// A flat lon/lat grid of feature bounding boxes. Narrows point lookups to a
/// handful of candidates before the exact polygon test.
pub struct SpatialGrid {
    cells: Vec<Vec<usize>>,
    min_x: f64,
    min_y: f64,
    cell_w: f64,
    cell_h: f64,
}

impl SpatialGrid {
    pub fn build(features: &[CountryFeature]) -> Self {
        let bounds: Vec<_> = features.iter().map(CountryFeature::bounds).collect();

        let (mut min_x, mut min_y, mut max_x, mut max_y) = (f64::MAX, f64::MAX, f64::MIN, f64::MIN);
        for rect in bounds.iter().flatten() {
            min_x = min_x.min(rect.min().x);
            min_y = min_y.min(rect.min().y);
            max_x = max_x.max(rect.max().x);
            max_y = max_y.max(rect.max().y);
        }

        if min_x > max_x || min_y > max_y {
            return Self {
                cells: Vec::new(),
                min_x: 0.0,
                min_y: 0.0,
                cell_w: 1.0,
                cell_h: 1.0,
            };
        }

        // Pad so edge coordinates land inside the grid
        min_x -= 1e-6;
        min_y -= 1e-6;
        max_x += 1e-6;
        max_y += 1e-6;

        let cell_w = (max_x - min_x) / GRID_COLS as f64;
        let cell_h = (max_y - min_y) / GRID_ROWS as f64;
        let mut cells = vec![Vec::new(); GRID_COLS * GRID_ROWS];

        for (idx, rect) in bounds.iter().enumerate() {
            let Some(rect) = rect else {
                continue;
            };
            let col_start = ((rect.min().x - min_x) / cell_w).floor().max(0.0) as usize;
            let col_end = ((rect.max().x - min_x) / cell_w)
                .floor()
                .min(GRID_COLS as f64 - 1.0) as usize;
            let row_start = ((rect.min().y - min_y) / cell_h).floor().max(0.0) as usize;
            let row_end = ((rect.max().y - min_y) / cell_h)
                .floor()
                .min(GRID_ROWS as f64 - 1.0) as usize;

            for row in row_start..=row_end {
                for col in col_start..=col_end {
                    cells[row * GRID_COLS + col].push(idx);
                }
            }
        }

        Self {
            cells,
            min_x,
            min_y,
            cell_w,
            cell_h,
        }
    }

    /// Feature indices whose bounding box may contain the point.
    pub fn candidates(&self, lng: f64, lat: f64) -> &[usize] {
        if self.cells.is_empty() {
            return &[];
        }

        let col = ((lng - self.min_x) / self.cell_w).floor();
        let row = ((lat - self.min_y) / self.cell_h).floor();
        if !(0.0..GRID_COLS as f64).contains(&col) || !(0.0..GRID_ROWS as f64).contains(&row) {
            return &[];
        }

        &self.cells[row as usize * GRID_COLS + col as usize]
    }
}
