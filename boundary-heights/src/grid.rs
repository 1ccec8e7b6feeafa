/// Uniform horizontal grid index with radius and k-nearest queries
use crate::point::{CloudPoint, PointSubset};

/// Mean bucket occupancy the grid is sized for.
const TARGET_POINTS_PER_CELL: f64 = 2.0;
/// Upper bound on grid dimensions to keep bucket tables small.
const MAX_GRID_DIM: usize = 2048;

/// Immutable spatial index over a point subset. Elevation is not a search
/// key: both queries measure distance in the horizontal plane only.
/// Safe to share across threads once built.
pub struct SpatialIndex {
    points: Vec<CloudPoint>,
    origin_x: f64,
    origin_y: f64,
    cell_w: f64,
    cell_h: f64,
    cols: usize,
    rows: usize,
    /// CSR bucket table: indices of `points` grouped by cell, row-major.
    cell_starts: Vec<u32>,
    cell_points: Vec<u32>,
    median_z: Option<f64>,
}

impl SpatialIndex {
    /// Build the index, taking ownership of the subset. An empty subset
    /// produces a valid index whose queries return empty results.
    pub fn build(subset: PointSubset) -> Self {
        let points = subset.points;
        let n = points.len();

        if n == 0 {
            return Self {
                points,
                origin_x: 0.0,
                origin_y: 0.0,
                cell_w: 1.0,
                cell_h: 1.0,
                cols: 0,
                rows: 0,
                cell_starts: vec![0],
                cell_points: Vec::new(),
                median_z: None,
            };
        }

        let mut min_x = f64::INFINITY;
        let mut max_x = f64::NEG_INFINITY;
        let mut min_y = f64::INFINITY;
        let mut max_y = f64::NEG_INFINITY;
        for p in &points {
            min_x = min_x.min(p.x);
            max_x = max_x.max(p.x);
            min_y = min_y.min(p.y);
            max_y = max_y.max(p.y);
        }

        let width = (max_x - min_x).max(f64::EPSILON);
        let height = (max_y - min_y).max(f64::EPSILON);

        // Square-ish cells sized for TARGET_POINTS_PER_CELL occupancy.
        let target_cells = (n as f64 / TARGET_POINTS_PER_CELL).max(1.0);
        let cell = (width * height / target_cells).sqrt().max(f64::EPSILON);
        let cols = ((width / cell).ceil() as usize).clamp(1, MAX_GRID_DIM);
        let rows = ((height / cell).ceil() as usize).clamp(1, MAX_GRID_DIM);
        let cell_w = width / cols as f64;
        let cell_h = height / rows as f64;

        let cell_of = |p: &CloudPoint| -> usize {
            let col = (((p.x - min_x) / cell_w) as usize).min(cols - 1);
            let row = (((p.y - min_y) / cell_h) as usize).min(rows - 1);
            row * cols + col
        };

        // Counting pass, prefix sum, then a fill pass in subset order so
        // bucket contents keep a deterministic insertion order.
        let mut cell_starts = vec![0u32; cols * rows + 1];
        for p in &points {
            cell_starts[cell_of(p) + 1] += 1;
        }
        for i in 1..cell_starts.len() {
            cell_starts[i] += cell_starts[i - 1];
        }

        let mut cell_points = vec![0u32; n];
        let mut cursor = cell_starts.clone();
        for (idx, p) in points.iter().enumerate() {
            let cell = cell_of(p);
            cell_points[cursor[cell] as usize] = idx as u32;
            cursor[cell] += 1;
        }

        let mut zs: Vec<f64> = points.iter().map(|p| p.z).collect();
        zs.sort_unstable_by(f64::total_cmp);
        let median_z = if zs.len() % 2 == 1 {
            Some(zs[zs.len() / 2])
        } else {
            Some((zs[zs.len() / 2 - 1] + zs[zs.len() / 2]) / 2.0)
        };

        Self {
            points,
            origin_x: min_x,
            origin_y: min_y,
            cell_w,
            cell_h,
            cols,
            rows,
            cell_starts,
            cell_points,
            median_z,
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Median of all indexed elevations, `None` for an empty index.
    /// Used as the run-wide fallback for unresolved vertices.
    pub fn median_elevation(&self) -> Option<f64> {
        self.median_z
    }

    /// All points within horizontal distance `r` of `(x, y)`, closest
    /// first. A nonzero `k_cap` keeps only the `k_cap` closest. Ties at
    /// equal distance break by subset insertion order.
    pub fn radius_query(&self, x: f64, y: f64, r: f64, k_cap: usize) -> Vec<CloudPoint> {
        if self.points.is_empty() || r < 0.0 {
            return Vec::new();
        }

        let c0 = ((x - r - self.origin_x) / self.cell_w).floor() as i64;
        let c1 = ((x + r - self.origin_x) / self.cell_w).floor() as i64;
        let r0 = ((y - r - self.origin_y) / self.cell_h).floor() as i64;
        let r1 = ((y + r - self.origin_y) / self.cell_h).floor() as i64;
        if c1 < 0 || r1 < 0 || c0 >= self.cols as i64 || r0 >= self.rows as i64 {
            return Vec::new();
        }

        let r2 = r * r;
        let mut hits: Vec<(f64, u32)> = Vec::new();
        for row in r0.max(0)..=r1.min(self.rows as i64 - 1) {
            for col in c0.max(0)..=c1.min(self.cols as i64 - 1) {
                self.scan_cell(col as usize, row as usize, x, y, |d2, idx| {
                    if d2 <= r2 {
                        hits.push((d2, idx));
                    }
                });
            }
        }

        Self::sort_hits(&mut hits);
        if k_cap > 0 {
            hits.truncate(k_cap);
        }
        hits.into_iter()
            .map(|(_, idx)| self.points[idx as usize])
            .collect()
    }

    /// The `k` horizontally closest points to `(x, y)`, unbounded radius,
    /// fewer when the index holds fewer. Same tie-breaking as
    /// `radius_query`. Searches cells in expanding rings around the query.
    pub fn knn_query(&self, x: f64, y: f64, k: usize) -> Vec<CloudPoint> {
        if self.points.is_empty() || k == 0 {
            return Vec::new();
        }

        let qc = (((x - self.origin_x) / self.cell_w).floor() as i64).clamp(0, self.cols as i64 - 1);
        let qr = (((y - self.origin_y) / self.cell_h).floor() as i64).clamp(0, self.rows as i64 - 1);
        let min_cell = self.cell_w.min(self.cell_h);
        let max_ring = self.cols.max(self.rows) as i64;

        let mut hits: Vec<(f64, u32)> = Vec::new();
        let mut ring = 0i64;
        loop {
            self.scan_ring(qc, qr, ring, x, y, &mut hits);

            if hits.len() >= k {
                Self::sort_hits(&mut hits);
                // Cells beyond this ring are at least ring * min_cell away
                // from anywhere in the query's (clamped) cell.
                let bound = ring as f64 * min_cell;
                if hits[k - 1].0 <= bound * bound {
                    break;
                }
            }
            if ring > max_ring {
                break;
            }
            ring += 1;
        }

        Self::sort_hits(&mut hits);
        hits.truncate(k);
        hits.into_iter()
            .map(|(_, idx)| self.points[idx as usize])
            .collect()
    }

    /// Visit candidates in every in-bounds cell at Chebyshev distance
    /// `ring` from `(qc, qr)`.
    fn scan_ring(&self, qc: i64, qr: i64, ring: i64, x: f64, y: f64, hits: &mut Vec<(f64, u32)>) {
        let mut visit = |col: i64, row: i64| {
            if col >= 0 && row >= 0 && col < self.cols as i64 && row < self.rows as i64 {
                self.scan_cell(col as usize, row as usize, x, y, |d2, idx| {
                    hits.push((d2, idx));
                });
            }
        };

        if ring == 0 {
            visit(qc, qr);
            return;
        }
        for col in (qc - ring)..=(qc + ring) {
            visit(col, qr - ring);
            visit(col, qr + ring);
        }
        for row in (qr - ring + 1)..=(qr + ring - 1) {
            visit(qc - ring, row);
            visit(qc + ring, row);
        }
    }

    fn scan_cell(&self, col: usize, row: usize, x: f64, y: f64, mut take: impl FnMut(f64, u32)) {
        let cell = row * self.cols + col;
        let start = self.cell_starts[cell] as usize;
        let end = self.cell_starts[cell + 1] as usize;
        for &idx in &self.cell_points[start..end] {
            let p = &self.points[idx as usize];
            let dx = p.x - x;
            let dy = p.y - y;
            take(dx * dx + dy * dy, idx);
        }
    }

    /// Stable order: distance first, subset index second.
    fn sort_hits(hits: &mut [(f64, u32)]) {
        hits.sort_unstable_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
    }
}
