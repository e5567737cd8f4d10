use std::fmt;

use derive_more::{Add, Constructor, Mul, Sub, Sum};
use serde::{Deserialize, Serialize};

/// One of the six bounding faces of an obstruction, identified by the FDS
/// orientation id (`±1`, `±2`, `±3` for the negative/positive X, Y and Z
/// directions; there is no face `0`).
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub enum Orientation {
    NegX,
    PosX,
    NegY,
    PosY,
    NegZ,
    PosZ,
}

impl Orientation {
    pub fn from_id(id: i32) -> Option<Self> {
        match id {
            -1 => Some(Orientation::NegX),
            1 => Some(Orientation::PosX),
            -2 => Some(Orientation::NegY),
            2 => Some(Orientation::PosY),
            -3 => Some(Orientation::NegZ),
            3 => Some(Orientation::PosZ),
            _ => None,
        }
    }

    pub fn id(&self) -> i32 {
        match self {
            Orientation::NegX => -1,
            Orientation::PosX => 1,
            Orientation::NegY => -2,
            Orientation::PosY => 2,
            Orientation::NegZ => -3,
            Orientation::PosZ => 3,
        }
    }

    pub fn iter() -> impl Iterator<Item = Orientation> {
        [
            Orientation::NegX,
            Orientation::PosX,
            Orientation::NegY,
            Orientation::PosY,
            Orientation::NegZ,
            Orientation::PosZ,
        ]
        .into_iter()
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id())
    }
}

#[derive(
    Add, Sub, Mul, Sum, Constructor, Default, PartialEq, Debug, Copy, Clone, Serialize, Deserialize,
)]
pub struct Vec3<T> {
    pub x: T,
    pub y: T,
    pub z: T,
}

pub type Vec3F = Vec3<f32>;
pub type Vec3I = Vec3<i32>;

impl Vec3F {
    pub const ZERO: Vec3F = Vec3F {
        x: 0.,
        y: 0.,
        z: 0.,
    };
}

impl<T> From<(T, T, T)> for Vec3<T> {
    fn from((x, y, z): (T, T, T)) -> Self {
        Vec3 { x, y, z }
    }
}

/// Three spatial extents plus the time slot in `w`.
///
/// For dimensions, `w` is the number of timesteps; for spacings, `w` is the
/// emission interval in seconds between two timesteps.
#[derive(
    Add, Sub, Mul, Sum, Constructor, Default, PartialEq, Debug, Copy, Clone, Serialize, Deserialize,
)]
pub struct Vec4<T> {
    pub x: T,
    pub y: T,
    pub z: T,
    pub w: T,
}

pub type Vec4F = Vec4<f32>;
pub type IVec4 = Vec4<i64>;

impl<T: Copy> Vec4<T> {
    pub fn spatial(&self) -> Vec3<T> {
        Vec3::new(self.x, self.y, self.z)
    }
}

impl IVec4 {
    /// Number of cells in one frame (the time slot does not participate).
    pub fn cell_count(&self) -> i64 {
        self.x * self.y * self.z
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn orientation_ids_roundtrip() {
        for o in Orientation::iter() {
            assert_eq!(Orientation::from_id(o.id()), Some(o));
        }
        assert_eq!(Orientation::from_id(0), None);
        assert_eq!(Orientation::from_id(4), None);
    }

    #[test]
    fn cell_count_ignores_time() {
        let dims = IVec4::new(4, 5, 6, 100);
        assert_eq!(dims.cell_count(), 120);
    }
}
