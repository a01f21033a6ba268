//! Straight-line routes between placed modules.
//!
//! Routes ignore obstacles: the distance is the metric length of the segment
//! between the two module centres.

use crate::module::PlacedObject;
use moonbase_core::{Error, Grid, ObjectId, Result, RouteId, DEFAULT_WALKING_SPEED};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A computed route between two placed modules.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Route {
    pub id: RouteId,
    pub start: ObjectId,
    pub end: ObjectId,
    /// Centre-to-centre distance in metres.
    pub distance_m: f64,
    /// Walking time in minutes.
    pub time_min: f64,
}

impl Route {
    /// Returns true if the route starts or ends at `object`.
    pub fn touches(&self, object: ObjectId) -> bool {
        self.start == object || self.end == object
    }

    /// Walking time rounded for display: `ceil(round(distance) / speed)`.
    pub fn display_minutes(&self, walking_speed: f64) -> u64 {
        whole_minutes(self.distance_m, walking_speed)
    }
}

/// `ceil(round(distance_m) / walking_speed)`, saturating at zero.
pub fn whole_minutes(distance_m: f64, walking_speed: f64) -> u64 {
    let minutes = (distance_m.round() / walking_speed).ceil();
    if minutes.is_finite() && minutes > 0.0 {
        minutes as u64
    } else {
        0
    }
}

/// Computes route distance and time on a given grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RouteEngine {
    grid: Grid,
    walking_speed: f64,
}

impl RouteEngine {
    /// Creates an engine using the default walking speed.
    pub fn new(grid: Grid) -> Self {
        Self {
            grid,
            walking_speed: DEFAULT_WALKING_SPEED,
        }
    }

    /// Sets the walking speed in m/min.
    pub fn with_walking_speed(mut self, speed: f64) -> Self {
        self.walking_speed = speed;
        self
    }

    /// Returns the walking speed in m/min.
    pub fn walking_speed(&self) -> f64 {
        self.walking_speed
    }

    /// Metric distance between the centres of two objects.
    pub fn distance(&self, a: &PlacedObject, b: &PlacedObject) -> f64 {
        self.grid.scaled_distance(a.center(), b.center())
    }

    /// Builds the route from `a` to `b`.
    pub fn compute_route(&self, id: RouteId, a: &PlacedObject, b: &PlacedObject) -> Result<Route> {
        if !self.walking_speed.is_finite() || self.walking_speed <= 0.0 {
            return Err(Error::InvalidInput(format!(
                "walking speed must be positive, got {}",
                self.walking_speed
            )));
        }
        if a.id == b.id {
            return Err(Error::InvalidInput(format!(
                "route endpoints must differ, both are {}",
                a.id
            )));
        }

        let distance_m = self.distance(a, b);
        Ok(Route {
            id,
            start: a.id,
            end: b.id,
            distance_m,
            time_min: distance_m / self.walking_speed,
        })
    }

    /// Recomputes the distance and time of an existing route in place.
    pub fn refresh(&self, route: &mut Route, a: &PlacedObject, b: &PlacedObject) {
        route.distance_m = self.distance(a, b);
        route.time_min = route.distance_m / self.walking_speed;
    }
}
