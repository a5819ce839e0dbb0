//! Geographic grid addressing.
//!
//! Cells are stored row-major with `x` as longitude and `y` as latitude. Signed geographic
//! coordinates run from `-width/2..width/2` and `-height/2..height/2`; anything outside that
//! range is wrapped around the sphere by [`normalize`].

/// Width of the planetary grid: one cell per degree of longitude.
pub const GRID_WIDTH: usize = 360;

/// Height of the planetary grid: one cell per degree of latitude.
pub const GRID_HEIGHT: usize = 180;

/// Axis-neighbor offsets in the order up, down, left, right.
pub const NEIGHBORS_4: [(i32, i32); 4] = [(0, -1), (0, 1), (-1, 0), (1, 0)];

/// Map a signed longitude/latitude pair onto a valid `(x, y)` index of a `width`×`height` grid.
///
/// Longitude wraps toroidally. Latitude that runs past a pole re-enters on the same pole
/// shifted by half the width, so every wrap across a pole flips the row order. The row is
/// mirrored whenever the number of pole crossings is odd, regardless of which pole was crossed.
///
/// `width` must be even for the half-width shift to land on a cell.
pub fn normalize(x: i32, y: i32, width: usize, height: usize) -> (usize, usize) {
    let w = width as i64;
    let h = height as i64;
    let half_w = w / 2;

    let mut y = y as i64 + h / 2;
    let mut x = x as i64;

    let wraps = y.div_euclid(h);
    if wraps != 0 {
        y = y.rem_euclid(h);
        x += wraps.abs() * half_w;
        if wraps.abs() % 2 == 1 {
            y = h - 1 - y;
        }
    }

    let x = (x + half_w).rem_euclid(w);
    (x as usize, y as usize)
}

/// A 2D grid addressed like the surface of a sphere.
#[derive(Clone, Debug, PartialEq)]
pub struct Tilemap<T> {
    pub width: usize,
    pub height: usize,
    data: Vec<T>,
}

impl<T: Clone + Default> Tilemap<T> {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![T::default(); width * height],
        }
    }
}

impl<T: Clone> Tilemap<T> {
    pub fn new_with(width: usize, height: usize, value: T) -> Self {
        Self {
            width,
            height,
            data: vec![value; width * height],
        }
    }

    /// Build a map by evaluating `f` at every `(x, y)`.
    pub fn from_fn(width: usize, height: usize, mut f: impl FnMut(usize, usize) -> T) -> Self {
        let mut data = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                data.push(f(x, y));
            }
        }
        Self { width, height, data }
    }

    fn index(&self, x: usize, y: usize) -> usize {
        let x = x % self.width;
        y * self.width + x
    }

    pub fn get(&self, x: usize, y: usize) -> &T {
        &self.data[self.index(x, y)]
    }

    pub fn get_mut(&mut self, x: usize, y: usize) -> &mut T {
        let idx = self.index(x, y);
        &mut self.data[idx]
    }

    pub fn set(&mut self, x: usize, y: usize, value: T) {
        let idx = self.index(x, y);
        self.data[idx] = value;
    }

    /// Get a cell by signed geographic coordinates. Never fails: every pair is wrapped.
    pub fn get_geo(&self, x: i32, y: i32) -> &T {
        let (gx, gy) = normalize(x, y, self.width, self.height);
        self.get(gx, gy)
    }

    /// Set a cell by signed geographic coordinates.
    pub fn set_geo(&mut self, x: i32, y: i32, value: T) {
        let (gx, gy) = normalize(x, y, self.width, self.height);
        self.set(gx, gy, value);
    }

    /// Index of the cell `(dx, dy)` away from grid position `(x, y)`, wrapped around the sphere.
    pub fn offset(&self, x: usize, y: usize, dx: i32, dy: i32) -> (usize, usize) {
        let gx = x as i32 - (self.width / 2) as i32 + dx;
        let gy = y as i32 - (self.height / 2) as i32 + dy;
        normalize(gx, gy, self.width, self.height)
    }

    /// The four axis neighbors of `(x, y)` in up, down, left, right order.
    pub fn neighbors(&self, x: usize, y: usize) -> [(usize, usize); 4] {
        NEIGHBORS_4.map(|(dx, dy)| self.offset(x, y, dx, dy))
    }

    pub fn fill(&mut self, value: T) {
        self.data.fill(value);
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Project every cell through `f` into a new map of the same size.
    pub fn map<U>(&self, f: impl Fn(&T) -> U) -> Tilemap<U> {
        Tilemap {
            width: self.width,
            height: self.height,
            data: self.data.iter().map(f).collect(),
        }
    }

    /// Iterate over all cells with their coordinates.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, &T)> {
        self.data.iter().enumerate().map(move |(idx, val)| {
            let x = idx % self.width;
            let y = idx / self.width;
            (x, y, val)
        })
    }

    /// Iterate mutably over all cells with their coordinates.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (usize, usize, &mut T)> {
        let width = self.width;
        self.data.iter_mut().enumerate().map(move |(idx, val)| {
            let x = idx % width;
            let y = idx / width;
            (x, y, val)
        })
    }

    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.data.iter()
    }
}

impl Tilemap<f32> {
    /// Lowest and highest value on the map.
    pub fn min_max(&self) -> (f32, f32) {
        let mut min_val = f32::MAX;
        let mut max_val = f32::MIN;
        for &v in &self.data {
            if v < min_val {
                min_val = v;
            }
            if v > max_val {
                max_val = v;
            }
        }
        (min_val, max_val)
    }

    /// Rescale values into `0.0..=1.0`. A constant map becomes all zeros.
    pub fn normalized(&self) -> Tilemap<f32> {
        let (min_val, max_val) = self.min_max();
        let range = max_val - min_val;
        if range <= 0.0 || !range.is_finite() {
            return Tilemap::new_with(self.width, self.height, 0.0);
        }
        self.map(|&v| (v - min_val) / range)
    }
}
