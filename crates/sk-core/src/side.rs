//! Closed left/right key domain for paired limbs.

use core::fmt;

/// Which side of the robot a limb belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub const BOTH: [Side; 2] = [Side::Left, Side::Right];

    pub fn opposite(self) -> Self {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Left => write!(f, "left"),
            Side::Right => write!(f, "right"),
        }
    }
}

/// A value for each [`Side`], stored inline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Sided<T> {
    pub left: T,
    pub right: T,
}

impl<T> Sided<T> {
    pub fn new(left: T, right: T) -> Self {
        Self { left, right }
    }

    /// Same value on both sides.
    pub fn splat(value: T) -> Self
    where
        T: Clone,
    {
        Self {
            left: value.clone(),
            right: value,
        }
    }

    pub fn get(&self, side: Side) -> &T {
        match side {
            Side::Left => &self.left,
            Side::Right => &self.right,
        }
    }

    pub fn get_mut(&mut self, side: Side) -> &mut T {
        match side {
            Side::Left => &mut self.left,
            Side::Right => &mut self.right,
        }
    }

    pub fn map<U>(self, mut f: impl FnMut(Side, T) -> U) -> Sided<U> {
        Sided {
            left: f(Side::Left, self.left),
            right: f(Side::Right, self.right),
        }
    }

    /// Like [`Sided::map`] but short-circuits on the first error (left first).
    pub fn try_map<U, E>(self, mut f: impl FnMut(Side, T) -> Result<U, E>) -> Result<Sided<U>, E> {
        Ok(Sided {
            left: f(Side::Left, self.left)?,
            right: f(Side::Right, self.right)?,
        })
    }

    pub fn as_ref(&self) -> Sided<&T> {
        Sided {
            left: &self.left,
            right: &self.right,
        }
    }

    /// Iterate `(side, value)` pairs, left then right.
    pub fn iter(&self) -> impl Iterator<Item = (Side, &T)> {
        [(Side::Left, &self.left), (Side::Right, &self.right)].into_iter()
    }
}
