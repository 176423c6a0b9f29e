//! Speed maps: piecewise speed curves over a marker pair's span.
//!
//! A speed map is an ascending list of `(time, speed)` control points. The first
//! point sits on the pair's start time and the last on its end time; between
//! points the speed is interpolated (see `clipmarks-timing`).

use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// A single control point of a speed map.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpeedPoint {
    /// Source time in seconds.
    pub x: f64,
    /// Playback speed multiplier at `x`.
    pub y: f64,
}

impl SpeedPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Which marker of a pair is being addressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkerSide {
    Start,
    End,
}

impl MarkerSide {
    pub fn opposite(self) -> Self {
        match self {
            Self::Start => Self::End,
            Self::End => Self::Start,
        }
    }
}

impl std::fmt::Display for MarkerSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Start => f.write_str("start"),
            Self::End => f.write_str("end"),
        }
    }
}

/// Ordered speed control points spanning a marker pair.
///
/// Invariants (checked by [`SpeedMap::new`] and on deserialization):
/// - at least two points
/// - `x` never decreases, and the last `x` is strictly after the first
/// - every `y` is positive and finite
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<SpeedPoint>", into = "Vec<SpeedPoint>")]
pub struct SpeedMap {
    points: Vec<SpeedPoint>,
}

impl SpeedMap {
    /// Build a speed map, validating its invariants.
    pub fn new(points: Vec<SpeedPoint>) -> Result<Self, ModelError> {
        validate_points(&points)?;
        Ok(Self { points })
    }

    /// A two-point map with the same speed at both ends.
    pub fn constant(start: f64, end: f64, speed: f64) -> Result<Self, ModelError> {
        Self::new(vec![SpeedPoint::new(start, speed), SpeedPoint::new(end, speed)])
    }

    /// The control points in ascending time order.
    pub fn points(&self) -> &[SpeedPoint] {
        &self.points
    }

    /// Number of control points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Always false for a valid map; present for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first(&self) -> SpeedPoint {
        self.points[0]
    }

    pub fn last(&self) -> SpeedPoint {
        self.points[self.points.len() - 1]
    }

    /// Time of the first point (the pair start).
    pub fn start(&self) -> f64 {
        self.first().x
    }

    /// Time of the last point (the pair end).
    pub fn end(&self) -> f64 {
        self.last().x
    }

    /// Adjacent point pairs, one per segment.
    pub fn segments(&self) -> impl Iterator<Item = (SpeedPoint, SpeedPoint)> + '_ {
        self.points.windows(2).map(|w| (w[0], w[1]))
    }

    /// True when any two adjacent points differ in speed.
    pub fn is_variable_speed(&self) -> bool {
        self.segments().any(|(left, right)| left.y != right.y)
    }

    /// True for the plain two-point map with equal speeds.
    pub fn is_uniform_pair(&self) -> bool {
        self.points.len() == 2 && self.points[0].y == self.points[1].y
    }

    /// Set the uniform speed.
    ///
    /// The first point always takes the new speed; the last point follows only
    /// when the map is a plain two-point constant map.
    pub fn set_uniform_speed(&mut self, speed: f64) -> Result<(), ModelError> {
        check_speed(speed)?;
        if self.is_uniform_pair() {
            self.points[1].y = speed;
        }
        self.points[0].y = speed;
        Ok(())
    }

    /// Move one boundary of the map to `new_time`.
    ///
    /// Fails without touching the map when the move would put the start at or
    /// after the end (or the end at or before the start). Points that fall
    /// outside the new span are dropped and returned in ascending order.
    pub fn set_boundary(
        &mut self,
        side: MarkerSide,
        new_time: f64,
    ) -> Result<Vec<SpeedPoint>, ModelError> {
        let (start, end) = (self.start(), self.end());
        if !new_time.is_finite() {
            return Err(ModelError::ordering(side, new_time, start, end));
        }

        let dropped = match side {
            MarkerSide::Start => {
                if new_time >= end {
                    return Err(ModelError::ordering(side, new_time, start, end));
                }
                self.points[0].x = new_time;
                let (kept, dropped): (Vec<SpeedPoint>, Vec<SpeedPoint>) =
                    self.points.iter().partition(|p| p.x >= new_time);
                self.points = kept;
                dropped
            }
            MarkerSide::End => {
                if new_time <= start {
                    return Err(ModelError::ordering(side, new_time, start, end));
                }
                let last = self.points.len() - 1;
                self.points[last].x = new_time;
                let (kept, dropped): (Vec<SpeedPoint>, Vec<SpeedPoint>) =
                    self.points.iter().partition(|p| p.x <= new_time);
                self.points = kept;
                dropped
            }
        };

        Ok(dropped)
    }

    /// Undo a boundary move: put the boundary back at `old_time` and re-insert
    /// the points the move dropped.
    pub fn restore_boundary(
        &mut self,
        side: MarkerSide,
        old_time: f64,
        dropped: &[SpeedPoint],
    ) -> Result<(), ModelError> {
        let mut points = self.points.clone();
        match side {
            MarkerSide::Start => {
                points[0].x = old_time;
                points.splice(1..1, dropped.iter().copied());
            }
            MarkerSide::End => {
                let last = points.len() - 1;
                points[last].x = old_time;
                points.splice(last..last, dropped.iter().copied());
            }
        }
        validate_points(&points)?;
        self.points = points;
        Ok(())
    }

    /// Same times, speeds in reverse order. Times the reverse leg of a
    /// forward-reverse loop.
    pub fn reversed(&self) -> Self {
        let points = self
            .points
            .iter()
            .zip(self.points.iter().rev())
            .map(|(p, rev)| SpeedPoint::new(p.x, rev.y))
            .collect();
        Self { points }
    }

    /// Check the invariants.
    pub fn validate(&self) -> Result<(), ModelError> {
        validate_points(&self.points)
    }
}

impl TryFrom<Vec<SpeedPoint>> for SpeedMap {
    type Error = ModelError;

    fn try_from(points: Vec<SpeedPoint>) -> Result<Self, Self::Error> {
        Self::new(points)
    }
}

impl From<SpeedMap> for Vec<SpeedPoint> {
    fn from(map: SpeedMap) -> Self {
        map.points
    }
}

pub(crate) fn check_speed(speed: f64) -> Result<(), ModelError> {
    if speed.is_finite() && speed > 0.0 {
        Ok(())
    } else {
        Err(ModelError::InvalidSpeed { speed })
    }
}

fn validate_points(points: &[SpeedPoint]) -> Result<(), ModelError> {
    if points.len() < 2 {
        return Err(ModelError::invalid_speed_map(format!(
            "expected at least 2 points, got {}",
            points.len()
        )));
    }
    for (i, p) in points.iter().enumerate() {
        if !p.x.is_finite() {
            return Err(ModelError::invalid_speed_map(format!(
                "point {i} has non-finite time"
            )));
        }
        if !(p.y.is_finite() && p.y > 0.0) {
            return Err(ModelError::invalid_speed_map(format!(
                "point {i} has non-positive speed {}",
                p.y
            )));
        }
    }
    if let Some(i) = points.windows(2).position(|w| w[1].x < w[0].x) {
        return Err(ModelError::invalid_speed_map(format!(
            "point {} at {} precedes point {} at {}",
            i + 1,
            points[i + 1].x,
            i,
            points[i].x
        )));
    }
    if points[points.len() - 1].x <= points[0].x {
        return Err(ModelError::invalid_speed_map(
            "map must span a positive time range",
        ));
    }
    Ok(())
}
