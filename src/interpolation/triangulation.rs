//! Delaunay triangulation of scattered source points.
//!
//! Triangles are built incrementally (Bowyer-Watson) inside a large
//! super-triangle that is stripped afterwards. Every surviving triangle
//! stores the affine transform mapping a point to its barycentric
//! coordinates, and an R-tree over triangle bounding boxes answers point
//! location queries.

use std::collections::HashSet;

use rstar::{Envelope, PointDistance, RTree, RTreeObject, AABB};

use crate::error::{RegridError, Result};

/// Barycentric coordinates at or above this are treated as inside
const INSIDE_TOLERANCE: f64 = -1e-10;

/// Relative error allowance for the in-circle predicate
const INCIRCLE_EPSILON: f64 = 1e-12;

/// Half-width of the super-triangle in units of the point cloud's span
const SUPER_TRIANGLE_SCALE: f64 = 1.0e3;

/// Bounding box of one triangle, for the R-tree
#[derive(Debug, Clone)]
struct SimplexEnvelope {
    simplex: usize,
    aabb: AABB<[f64; 2]>,
}

impl RTreeObject for SimplexEnvelope {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.aabb
    }
}

impl PointDistance for SimplexEnvelope {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        Envelope::distance_2(&self.aabb, point)
    }

    fn contains_point(&self, point: &[f64; 2]) -> bool {
        Envelope::contains_point(&self.aabb, point)
    }
}

/// An immutable triangulation of a planar point set.
///
/// Vertex indices refer to positions in the slice passed to
/// [`Triangulation::new`].
pub struct Triangulation {
    points: Vec<[f64; 2]>,
    simplices: Vec<[usize; 3]>,
    /// Inverse of `[[x0 - x2, x1 - x2], [y0 - y2, y1 - y2]]` per simplex
    transforms: Vec<[[f64; 2]; 2]>,
    tree: RTree<SimplexEnvelope>,
}

impl Triangulation {
    /// Triangulate `points`. Repeated coordinates are kept only once.
    pub fn new(points: &[[f64; 2]]) -> Result<Self> {
        let mut seen = HashSet::with_capacity(points.len());
        let unique: Vec<usize> = (0..points.len())
            .filter(|&k| {
                let [x, y] = points[k];
                x.is_finite() && y.is_finite() && seen.insert((x.to_bits(), y.to_bits()))
            })
            .collect();

        if unique.len() < 3 {
            return Err(RegridError::DegenerateInput {
                message: format!(
                    "need at least 3 distinct source points to triangulate, got {}",
                    unique.len()
                ),
            });
        }

        let coords: Vec<[f64; 2]> = unique.iter().map(|&k| points[k]).collect();
        let mut simplices = Vec::new();
        let mut transforms = Vec::new();
        for tri in bowyer_watson(&coords) {
            let vertices = tri.map(|v| unique[v]);
            if let Some(transform) = affine_transform(points, vertices) {
                simplices.push(vertices);
                transforms.push(transform);
            }
        }

        if simplices.is_empty() {
            return Err(RegridError::DegenerateInput {
                message: "source points are collinear; no triangle can be formed".to_string(),
            });
        }

        let envelopes = simplices
            .iter()
            .enumerate()
            .map(|(simplex, tri)| SimplexEnvelope {
                simplex,
                aabb: AABB::from_points(tri.iter().map(|&v| &points[v])),
            })
            .collect();

        Ok(Self {
            points: points.to_vec(),
            simplices,
            transforms,
            tree: RTree::bulk_load(envelopes),
        })
    }

    /// Vertex triples of all triangles
    pub fn simplices(&self) -> &[[usize; 3]] {
        &self.simplices
    }

    pub fn len(&self) -> usize {
        self.simplices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.simplices.is_empty()
    }

    /// Barycentric coordinates of `point` with respect to `simplex`.
    ///
    /// Computed as `T · (point − v2)` for the first two weights; the third
    /// is `1 − w0 − w1`. Weights may be negative outside the triangle.
    pub fn barycentric(&self, simplex: usize, point: [f64; 2]) -> [f64; 3] {
        let t = &self.transforms[simplex];
        let base = self.points[self.simplices[simplex][2]];
        let dx = point[0] - base[0];
        let dy = point[1] - base[1];
        let w0 = t[0][0] * dx + t[0][1] * dy;
        let w1 = t[1][0] * dx + t[1][1] * dy;
        [w0, w1, 1.0 - w0 - w1]
    }

    /// The triangle containing `point`, if it lies inside the convex hull
    pub fn find_simplex(&self, point: [f64; 2]) -> Option<usize> {
        // On a shared edge prefer the candidate with the largest minimum weight
        self.tree
            .locate_all_at_point(&point)
            .map(|env| (env.simplex, min_weight(self.barycentric(env.simplex, point))))
            .filter(|&(_, w)| w >= INSIDE_TOLERANCE)
            .max_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(simplex, _)| simplex)
    }

    /// The triangle closest to `point` in the plane
    pub fn nearest_simplex(&self, point: [f64; 2]) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for env in self.tree.nearest_neighbor_iter(&point) {
            // Box distance is a lower bound for the triangle distance
            if let Some((_, d)) = best {
                if Envelope::distance_2(&env.aabb, &point) > d {
                    break;
                }
            }
            let d = self.distance_2(env.simplex, point);
            if best.map_or(true, |(_, bd)| d < bd) {
                best = Some((env.simplex, d));
            }
        }
        best.map(|(simplex, _)| simplex)
    }

    /// Squared planar distance from `point` to the triangle `simplex`
    fn distance_2(&self, simplex: usize, point: [f64; 2]) -> f64 {
        if min_weight(self.barycentric(simplex, point)) >= 0.0 {
            return 0.0;
        }
        let [a, b, c] = self.simplices[simplex].map(|v| self.points[v]);
        segment_distance_2(point, a, b)
            .min(segment_distance_2(point, b, c))
            .min(segment_distance_2(point, c, a))
    }
}

impl std::fmt::Debug for Triangulation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Triangulation")
            .field("points", &self.points.len())
            .field("simplices", &self.simplices.len())
            .finish()
    }
}

fn min_weight(w: [f64; 3]) -> f64 {
    w[0].min(w[1]).min(w[2])
}

fn segment_distance_2(p: [f64; 2], a: [f64; 2], b: [f64; 2]) -> f64 {
    let (abx, aby) = (b[0] - a[0], b[1] - a[1]);
    let (apx, apy) = (p[0] - a[0], p[1] - a[1]);
    let len_2 = abx * abx + aby * aby;
    let t = if len_2 > 0.0 {
        ((apx * abx + apy * aby) / len_2).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let dx = apx - t * abx;
    let dy = apy - t * aby;
    dx * dx + dy * dy
}

/// Inverse of the edge matrix of a triangle, or None when it is degenerate
fn affine_transform(points: &[[f64; 2]], [v0, v1, v2]: [usize; 3]) -> Option<[[f64; 2]; 2]> {
    let (p0, p1, p2) = (points[v0], points[v1], points[v2]);
    let a = p0[0] - p2[0];
    let b = p1[0] - p2[0];
    let c = p0[1] - p2[1];
    let d = p1[1] - p2[1];
    let det = a * d - b * c;
    let scale = (a.abs() + b.abs()) * (c.abs() + d.abs());
    if det == 0.0 || det.abs() <= f64::EPSILON * scale {
        return None;
    }
    Some([[d / det, -b / det], [-c / det, a / det]])
}

fn orient(a: [f64; 2], b: [f64; 2], c: [f64; 2]) -> f64 {
    (b[0] - a[0]) * (c[1] - a[1]) - (b[1] - a[1]) * (c[0] - a[0])
}

/// Whether `p` lies strictly inside the circumcircle of the
/// counter-clockwise triangle (a, b, c)
fn in_circumcircle(a: [f64; 2], b: [f64; 2], c: [f64; 2], p: [f64; 2]) -> bool {
    let (adx, ady) = (a[0] - p[0], a[1] - p[1]);
    let (bdx, bdy) = (b[0] - p[0], b[1] - p[1]);
    let (cdx, cdy) = (c[0] - p[0], c[1] - p[1]);

    let alift = adx * adx + ady * ady;
    let blift = bdx * bdx + bdy * bdy;
    let clift = cdx * cdx + cdy * cdy;

    let bc = bdx * cdy - cdx * bdy;
    let ca = cdx * ady - adx * cdy;
    let ab = adx * bdy - bdx * ady;

    let det = alift * bc + blift * ca + clift * ab;
    let permanent = alift * bc.abs() + blift * ca.abs() + clift * ab.abs();
    det > INCIRCLE_EPSILON * permanent
}

/// Marks a missing neighbour on the outer edge of the super-triangle
const NO_NEIGHBOUR: usize = usize::MAX;

/// Working triangle with its neighbours and cached circumcircle.
///
/// `n[k]` is the triangle across the edge opposite `v[k]`.
struct Cell {
    v: [usize; 3],
    n: [usize; 3],
    center: [f64; 2],
    radius_2: f64,
    alive: bool,
}

impl Cell {
    fn new(pts: &[[f64; 2]], v: [usize; 3], n: [usize; 3]) -> Self {
        let (a, b, c) = (pts[v[0]], pts[v[1]], pts[v[2]]);
        let d = 2.0 * orient(a, b, c);
        let (center, radius_2) = if d == 0.0 {
            ([0.0, 0.0], f64::INFINITY)
        } else {
            let (bx, by) = (b[0] - a[0], b[1] - a[1]);
            let (cx, cy) = (c[0] - a[0], c[1] - a[1]);
            let b2 = bx * bx + by * by;
            let c2 = cx * cx + cy * cy;
            let ux = (cy * b2 - by * c2) / d;
            let uy = (bx * c2 - cx * b2) / d;
            ([a[0] + ux, a[1] + uy], ux * ux + uy * uy)
        };
        Self {
            v,
            n,
            center,
            radius_2,
            alive: true,
        }
    }

    /// Counter-clockwise edge opposite vertex `k`
    fn edge(&self, k: usize) -> (usize, usize) {
        (self.v[(k + 1) % 3], self.v[(k + 2) % 3])
    }

    fn contains(&self, pts: &[[f64; 2]], p: [f64; 2]) -> bool {
        (0..3).all(|k| {
            let (a, b) = self.edge(k);
            orient(pts[a], pts[b], p) >= 0.0
        })
    }

    fn circumcircle_contains(&self, pts: &[[f64; 2]], p: [f64; 2]) -> bool {
        let dx = p[0] - self.center[0];
        let dy = p[1] - self.center[1];
        // Cheap rejection before the exact-ish predicate
        if dx * dx + dy * dy > self.radius_2 * (1.0 + 1e-6) {
            return false;
        }
        in_circumcircle(pts[self.v[0]], pts[self.v[1]], pts[self.v[2]], p)
    }
}

/// Incremental Delaunay mesh with adjacency, seeded by a super-triangle
struct Mesh {
    pts: Vec<[f64; 2]>,
    cells: Vec<Cell>,
    last: usize,
}

impl Mesh {
    fn new(mut pts: Vec<[f64; 2]>, center: [f64; 2], r: f64) -> Self {
        let n = pts.len();
        let [cx, cy] = center;
        pts.push([cx - 2.0 * r, cy - r]);
        pts.push([cx + 2.0 * r, cy - r]);
        pts.push([cx, cy + 2.0 * r]);
        let root = Cell::new(&pts, [n, n + 1, n + 2], [NO_NEIGHBOUR; 3]);
        Self {
            pts,
            cells: vec![root],
            last: 0,
        }
    }

    /// Walk from the most recent triangle towards `p`
    fn locate(&self, p: [f64; 2]) -> usize {
        let mut t = self.last;
        'walk: for step in 0..=self.cells.len() {
            let cell = &self.cells[t];
            // Rotate the first edge tried so the walk cannot cycle
            for e in 0..3 {
                let k = (e + step) % 3;
                let (a, b) = cell.edge(k);
                if cell.n[k] != NO_NEIGHBOUR && orient(self.pts[a], self.pts[b], p) < 0.0 {
                    t = cell.n[k];
                    continue 'walk;
                }
            }
            return t;
        }

        // Only reached when rounding defeats the walk
        self.cells
            .iter()
            .position(|c| c.alive && c.contains(&self.pts, p))
            .or_else(|| {
                self.cells
                    .iter()
                    .position(|c| c.alive && c.circumcircle_contains(&self.pts, p))
            })
            .unwrap_or(self.last)
    }

    /// Insert point `i`: remove every triangle whose circumcircle holds it
    /// and fan the cavity boundary around the new vertex
    fn insert(&mut self, i: usize) {
        let p = self.pts[i];
        let start = self.locate(p);

        // The cavity is connected, so grow it through neighbours
        self.cells[start].alive = false;
        let mut cavity = vec![start];
        let mut next = 0;
        while next < cavity.len() {
            let t = cavity[next];
            next += 1;
            for nb in self.cells[t].n {
                if nb != NO_NEIGHBOUR
                    && self.cells[nb].alive
                    && self.cells[nb].circumcircle_contains(&self.pts, p)
                {
                    self.cells[nb].alive = false;
                    cavity.push(nb);
                }
            }
        }

        // (a, b, triangle outside, removed triangle inside)
        let mut boundary = Vec::with_capacity(cavity.len() + 2);
        for &t in &cavity {
            let cell = &self.cells[t];
            for k in 0..3 {
                let nb = cell.n[k];
                if nb == NO_NEIGHBOUR || self.cells[nb].alive {
                    let (a, b) = cell.edge(k);
                    boundary.push((a, b, nb, t));
                }
            }
        }

        let first = self.cells.len();
        let slot = |found: Option<usize>| found.map_or(NO_NEIGHBOUR, |j| first + j);
        for (j, &(a, b, outside, removed)) in boundary.iter().enumerate() {
            let id = first + j;
            // [a, b, i] meets [b, c, i] across (b, i) and [z, a, i] across (i, a)
            let after = slot(boundary.iter().position(|e| e.0 == b));
            let before = slot(boundary.iter().position(|e| e.1 == a));

            if outside != NO_NEIGHBOUR {
                for link in self.cells[outside].n.iter_mut() {
                    if *link == removed {
                        *link = id;
                    }
                }
            }
            self.cells
                .push(Cell::new(&self.pts, [a, b, i], [after, before, outside]));
        }
        self.last = first;
    }

    /// Surviving triangles among the first `n` points
    fn into_simplices(self, n: usize) -> Vec<[usize; 3]> {
        self.cells
            .into_iter()
            .filter(|cell| cell.alive && cell.v.iter().all(|&k| k < n))
            .map(|cell| cell.v)
            .collect()
    }
}

/// Insertion order: horizontal strips of the bounding box, walked in a
/// snake pattern, so consecutive points are close and walks stay short
fn insertion_order(coords: &[[f64; 2]], min_y: f64, span: f64) -> Vec<usize> {
    let strips = ((coords.len() as f64 / 2.0).sqrt().ceil() as usize).max(1);
    let strip_of = |p: [f64; 2]| (((p[1] - min_y) / span * strips as f64) as usize).min(strips - 1);

    let mut order: Vec<usize> = (0..coords.len()).collect();
    order.sort_by(|&a, &b| {
        let (sa, sb) = (strip_of(coords[a]), strip_of(coords[b]));
        sa.cmp(&sb).then_with(|| {
            let (xa, xb) = (coords[a][0], coords[b][0]);
            if sa % 2 == 0 {
                xa.total_cmp(&xb)
            } else {
                xb.total_cmp(&xa)
            }
        })
    });
    order
}

/// Triangulate distinct points, returning counter-clockwise vertex triples
fn bowyer_watson(coords: &[[f64; 2]]) -> Vec<[usize; 3]> {
    let n = coords.len();
    let (mut min_x, mut min_y) = (f64::INFINITY, f64::INFINITY);
    let (mut max_x, mut max_y) = (f64::NEG_INFINITY, f64::NEG_INFINITY);
    for p in coords {
        min_x = min_x.min(p[0]);
        min_y = min_y.min(p[1]);
        max_x = max_x.max(p[0]);
        max_y = max_y.max(p[1]);
    }
    let span = (max_x - min_x).max(max_y - min_y).max(f64::MIN_POSITIVE);
    let center = [(min_x + max_x) / 2.0, (min_y + max_y) / 2.0];

    let mut mesh = Mesh::new(coords.to_vec(), center, SUPER_TRIANGLE_SCALE * span);
    for i in insertion_order(coords, min_y, span) {
        mesh.insert(i);
    }
    mesh.into_simplices(n)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_square() -> Vec<[f64; 2]> {
        vec![[0.0, 0.0], [0.0, 1.0], [1.0, 0.0], [1.0, 1.0]]
    }

    #[test]
    fn test_square_has_two_triangles() {
        let tri = Triangulation::new(&unit_square()).unwrap();
        assert_eq!(tri.len(), 2);
        for simplex in tri.simplices() {
            let mut sorted = *simplex;
            sorted.sort_unstable();
            assert!(sorted.windows(2).all(|w| w[0] != w[1]));
        }
    }

    #[test]
    fn test_regular_grid_triangle_count() {
        // A convex n-point set with h hull points has 2n - 2 - h triangles
        let mut points = Vec::new();
        for i in 0..5 {
            for j in 0..4 {
                points.push([i as f64, j as f64]);
            }
        }
        let tri = Triangulation::new(&points).unwrap();
        assert_eq!(tri.len(), 2 * 20 - 2 - 14);
    }

    #[test]
    fn test_barycentric_sums_to_one() {
        let tri = Triangulation::new(&unit_square()).unwrap();
        let p = [0.3, 0.6];
        let simplex = tri.find_simplex(p).unwrap();
        let w = tri.barycentric(simplex, p);
        assert!((w.iter().sum::<f64>() - 1.0).abs() < 1e-12);
        assert!(w.iter().all(|&x| x >= 0.0));

        // Reconstruct the point from the weights
        let verts = tri.simplices()[simplex].map(|v| unit_square()[v]);
        let x: f64 = (0..3).map(|k| w[k] * verts[k][0]).sum();
        let y: f64 = (0..3).map(|k| w[k] * verts[k][1]).sum();
        assert!((x - p[0]).abs() < 1e-12);
        assert!((y - p[1]).abs() < 1e-12);
    }

    #[test]
    fn test_find_simplex_outside_hull() {
        let tri = Triangulation::new(&unit_square()).unwrap();
        assert!(tri.find_simplex([1.5, 0.5]).is_none());
        assert!(tri.find_simplex([1.0, 1.0]).is_some());
        assert!(tri.nearest_simplex([1.5, 0.5]).is_some());
    }

    #[test]
    fn test_nearest_simplex_touches_point() {
        let points = vec![[0.0, 0.0], [2.0, 0.0], [0.0, 2.0], [2.0, 2.0], [4.0, 1.0]];
        let tri = Triangulation::new(&points).unwrap();
        let simplex = tri.nearest_simplex([5.0, 1.0]).unwrap();
        assert!(tri.simplices()[simplex].contains(&4));
    }

    #[test]
    fn test_duplicates_are_ignored() {
        let mut points = unit_square();
        points.push([0.0, 0.0]);
        let tri = Triangulation::new(&points).unwrap();
        assert_eq!(tri.len(), 2);
        assert!(tri.simplices().iter().all(|s| !s.contains(&4)));
    }

    #[test]
    fn test_collinear_points_are_degenerate() {
        let points = vec![[0.0, 0.0], [1.0, 1.0], [2.0, 2.0], [3.0, 3.0]];
        let result = Triangulation::new(&points);
        assert!(matches!(result, Err(RegridError::DegenerateInput { .. })));

        let too_few = vec![[0.0, 0.0], [1.0, 0.0]];
        assert!(Triangulation::new(&too_few).is_err());
    }

    fn area(points: &[[f64; 2]], [a, b, c]: [usize; 3]) -> f64 {
        orient(points[a], points[b], points[c]) / 2.0
    }

    #[test]
    fn test_scattered_points_are_delaunay() {
        // Deterministic scatter, inserted in no particular order
        let points: Vec<[f64; 2]> = (0..300)
            .map(|k| {
                let k = k as f64;
                [
                    (0.5 + k * 0.618_033_988_75).fract() * 7.0,
                    (0.5 + k * 0.754_877_666_25).fract() * 3.0,
                ]
            })
            .collect();
        let tri = Triangulation::new(&points).unwrap();

        for &simplex in tri.simplices() {
            assert!(area(&points, simplex) > 0.0, "not counter-clockwise");
            let [a, b, c] = simplex.map(|v| points[v]);
            for (k, &p) in points.iter().enumerate() {
                if simplex.contains(&k) {
                    continue;
                }
                assert!(!in_circumcircle(a, b, c, p), "point {} inside {:?}", k, simplex);
            }
        }
    }

    #[test]
    fn test_large_grid_covers_its_hull() {
        let (nx, ny) = (60, 45);
        let mut points = Vec::with_capacity(nx * ny);
        for i in 0..nx {
            for j in 0..ny {
                points.push([-10.0 + 0.25 * i as f64, 50.0 + 0.2 * j as f64]);
            }
        }
        let tri = Triangulation::new(&points).unwrap();

        let n = nx * ny;
        let hull = 2 * (nx + ny) - 4;
        assert_eq!(tri.len(), 2 * n - 2 - hull);

        let total: f64 = tri.simplices().iter().map(|&s| area(&points, s)).sum();
        let expected = 0.25 * (nx - 1) as f64 * 0.2 * (ny - 1) as f64;
        assert!((total - expected).abs() < 1e-9 * expected);

        // Every cell centre is located
        for i in 0..nx - 1 {
            for j in 0..ny - 1 {
                let p = [-10.0 + 0.25 * (i as f64 + 0.5), 50.0 + 0.2 * (j as f64 + 0.5)];
                assert!(tri.find_simplex(p).is_some());
            }
        }
    }

    #[test]
    fn test_insertion_order_visits_every_point_once() {
        let points: Vec<[f64; 2]> = (0..50).map(|k| [(k * 7 % 50) as f64, (k % 5) as f64]).collect();
        let mut order = insertion_order(&points, 0.0, 49.0);
        order.sort_unstable();
        assert_eq!(order, (0..50).collect::<Vec<_>>());
    }

    #[test]
    fn test_in_circumcircle() {
        let (a, b, c) = ([0.0, 0.0], [1.0, 0.0], [0.0, 1.0]);
        assert!(in_circumcircle(a, b, c, [0.4, 0.4]));
        assert!(!in_circumcircle(a, b, c, [2.0, 2.0]));
        // Cocircular point is not strictly inside
        assert!(!in_circumcircle(a, b, c, [1.0, 1.0]));
    }
}
