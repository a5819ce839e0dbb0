use std::ops::{Add, AddAssign, Div, Mul, Sub};

use rand::Rng;
use rand_chacha::ChaCha8Rng;

/// Identifier of a tectonic plate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct PlateId(pub u16);

impl PlateId {
    /// Sentinel for cells the flood fill has not reached yet.
    pub const NONE: PlateId = PlateId(u16::MAX);

    pub fn is_none(&self) -> bool {
        *self == Self::NONE
    }

    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

/// A 2D vector used for plate motion, boundary blends and wind.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn length(&self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    pub fn distance(&self, other: &Vec2) -> f32 {
        (*self - *other).length()
    }

    /// Unit vector in the same direction; the zero vector stays zero.
    pub fn normalize(&self) -> Self {
        let len = self.length();
        if len > 0.0001 {
            Self {
                x: self.x / len,
                y: self.y / len,
            }
        } else {
            Self::ZERO
        }
    }

    /// Rotate counter-clockwise by `angle` radians.
    pub fn rotate(&self, angle: f32) -> Self {
        let (s, c) = angle.sin_cos();
        Self {
            x: self.x * c - self.y * s,
            y: self.x * s + self.y * c,
        }
    }

    /// Average of a set of vectors; zero when the set is empty.
    pub fn mean(vectors: &[Vec2]) -> Self {
        if vectors.is_empty() {
            return Self::ZERO;
        }
        let sum = vectors.iter().fold(Self::ZERO, |acc, v| acc + *v);
        sum / vectors.len() as f32
    }
}

impl Add for Vec2 {
    type Output = Vec2;
    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Vec2 {
    fn add_assign(&mut self, rhs: Vec2) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Vec2 {
    type Output = Vec2;
    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f32> for Vec2 {
    type Output = Vec2;
    fn mul(self, rhs: f32) -> Vec2 {
        Vec2::new(self.x * rhs, self.y * rhs)
    }
}

impl Div<f32> for Vec2 {
    type Output = Vec2;
    /// Division by zero yields the zero vector instead of infinities.
    fn div(self, rhs: f32) -> Vec2 {
        if rhs == 0.0 {
            return Vec2::ZERO;
        }
        Vec2::new(self.x / rhs, self.y / rhs)
    }
}

/// A tectonic plate. Immutable once generated.
#[derive(Clone, Debug, PartialEq)]
pub struct Plate {
    pub id: PlateId,
    /// Direction of motion, each component in `-1.0..1.0`.
    pub motion: Vec2,
    /// Constant elevation offset in `-1.0..1.0`.
    pub elevation_bias: f32,
    /// Color for the plate debug layer.
    pub color: [u8; 3],
}

impl Plate {
    /// The only plate of a single-plate planet. Draws nothing from the random stream.
    pub fn stationary(id: PlateId) -> Self {
        Self {
            id,
            motion: Vec2::ZERO,
            elevation_bias: 0.0,
            color: [128, 128, 128],
        }
    }

    /// Generate a plate with random motion, bias and debug color.
    pub fn random(id: PlateId, rng: &mut ChaCha8Rng) -> Self {
        let motion = Vec2::new(rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0));
        let color = [rng.gen(), rng.gen(), rng.gen()];
        let elevation_bias = rng.gen_range(-1.0..1.0);

        Self {
            id,
            motion,
            elevation_bias,
            color,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_normalize_zero_vector() {
        assert_eq!(Vec2::ZERO.normalize(), Vec2::ZERO);
        let v = Vec2::new(3.0, 4.0).normalize();
        assert!((v.length() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_divide_by_zero_is_zero() {
        assert_eq!(Vec2::new(1.0, 2.0) / 0.0, Vec2::ZERO);
        assert_eq!(Vec2::mean(&[]), Vec2::ZERO);
    }

    #[test]
    fn test_rotate_quarter_turn() {
        let v = Vec2::new(1.0, 0.0).rotate(std::f32::consts::FRAC_PI_2);
        assert!(v.x.abs() < 1e-6);
        assert!((v.y - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_random_plate_is_deterministic() {
        let mut a = ChaCha8Rng::seed_from_u64(9);
        let mut b = ChaCha8Rng::seed_from_u64(9);
        assert_eq!(Plate::random(PlateId(3), &mut a), Plate::random(PlateId(3), &mut b));
    }

    #[test]
    fn test_random_plate_ranges() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        for i in 0..50 {
            let plate = Plate::random(PlateId(i), &mut rng);
            assert!(plate.motion.x.abs() <= 1.0 && plate.motion.y.abs() <= 1.0);
            assert!(plate.elevation_bias.abs() <= 1.0);
        }
    }
}
