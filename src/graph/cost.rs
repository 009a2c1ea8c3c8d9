use std::ops::Add;

use pathfinding::num_traits::Zero;

use crate::graph::item::Edge;

/// Cumulative routing cost: travel time in milliseconds, tie-broken by
/// distance in centimeters.
///
/// Integer units keep the cost totally ordered for the search; the
/// derived lexicographic `Ord` makes time the primary criterion and
/// distance the tie-break.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct TimeAndDistance(pub u64, pub u64);

impl TimeAndDistance {
    #[inline]
    pub fn from_edge(edge: &Edge) -> Self {
        TimeAndDistance(
            (edge.travel_time * 1_000.0) as u64,
            (edge.distance * 100.0) as u64,
        )
    }

    #[inline]
    pub fn seconds(&self) -> f64 {
        self.0 as f64 / 1_000.0
    }

    #[inline]
    pub fn meters(&self) -> f64 {
        self.1 as f64 / 100.0
    }
}

impl Add<Self> for TimeAndDistance {
    type Output = TimeAndDistance;

    fn add(self, rhs: Self) -> Self::Output {
        TimeAndDistance(self.0 + rhs.0, self.1 + rhs.1)
    }
}

impl Zero for TimeAndDistance {
    fn zero() -> Self {
        TimeAndDistance(0, 0)
    }

    fn is_zero(&self) -> bool {
        self.0 == 0 && self.1 == 0
    }
}
