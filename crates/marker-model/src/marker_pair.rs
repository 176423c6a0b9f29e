//! Marker pairs: a marked source range with its speed map, crop and overrides.

use serde::{Deserialize, Deserializer, Serialize};

use crate::crop::Crop;
use crate::error::ModelError;
use crate::settings::EncodeOptions;
use crate::speed_map::{check_speed, MarkerSide, SpeedMap, SpeedPoint};

/// How far a stored map endpoint may drift from the pair boundary before the
/// map is rejected instead of realigned.
const ENDPOINT_TOLERANCE: f64 = 1e-6;

/// Preview-only loop sub-range inside a marker pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeedMapLoop {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<f64>,
    #[serde(default = "default_loop_enabled")]
    pub enabled: bool,
}

fn default_loop_enabled() -> bool {
    true
}

impl Default for SpeedMapLoop {
    fn default() -> Self {
        Self {
            start: None,
            end: None,
            enabled: true,
        }
    }
}

impl SpeedMapLoop {
    /// The loop range, if the loop is enabled and lies strictly inside
    /// `(pair_start, pair_end)`.
    pub fn active_range(&self, pair_start: f64, pair_end: f64) -> Option<(f64, f64)> {
        if !self.enabled {
            return None;
        }
        let (start, end) = (self.start?, self.end?);
        (pair_start < start && start < end && end < pair_end).then_some((start, end))
    }
}

/// One marker-time edit.
#[derive(Debug, Clone, PartialEq)]
pub struct MoveRecord {
    pub side: MarkerSide,
    pub from_time: f64,
    pub to_time: f64,
    /// Speed points the move dropped, in ascending time order.
    pub dropped: Vec<SpeedPoint>,
}

/// Undo/redo stacks of marker-time edits for a single pair.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MoveHistory {
    undo: Vec<MoveRecord>,
    redo: Vec<MoveRecord>,
}

impl MoveHistory {
    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    /// Most recent edit that `undo` would revert.
    pub fn last(&self) -> Option<&MoveRecord> {
        self.undo.last()
    }

    pub fn undo_len(&self) -> usize {
        self.undo.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo.len()
    }
}

/// A start/end mark on the source timeline.
///
/// `start`, `end` and `speed` are read through the speed map so that the map
/// endpoints and the pair boundaries cannot disagree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "MarkerPairRecord", into = "MarkerPairRecord")]
pub struct MarkerPair {
    speed_map: SpeedMap,
    pub crop: Crop,
    pub overrides: EncodeOptions,
    pub speed_map_loop: SpeedMapLoop,
    /// Cached output duration in seconds; recomputed whenever the map changes.
    pub output_duration: f64,
    move_history: MoveHistory,
}

impl MarkerPair {
    /// A constant-speed pair over `[start, end]`.
    ///
    /// The output duration starts at the naive `(end - start) / speed` estimate
    /// until a caller with a frame rate recomputes it.
    pub fn new(start: f64, end: f64, speed: f64, crop: Crop) -> Result<Self, ModelError> {
        if !(start.is_finite() && end.is_finite()) || end <= start {
            return Err(ModelError::EndBeforeStart { time: end, start });
        }
        check_speed(speed)?;
        let speed_map = SpeedMap::constant(start, end, speed)?;
        Ok(Self::with_speed_map(speed_map, crop))
    }

    /// A pair whose boundaries and speed come from `speed_map`.
    pub fn with_speed_map(speed_map: SpeedMap, crop: Crop) -> Self {
        let naive = (speed_map.end() - speed_map.start()) / speed_map.first().y;
        Self {
            speed_map,
            crop,
            overrides: EncodeOptions::default(),
            speed_map_loop: SpeedMapLoop::default(),
            output_duration: naive,
            move_history: MoveHistory::default(),
        }
    }

    pub fn start(&self) -> f64 {
        self.speed_map.start()
    }

    pub fn end(&self) -> f64 {
        self.speed_map.end()
    }

    /// Uniform speed, i.e. the speed of the first map point.
    pub fn speed(&self) -> f64 {
        self.speed_map.first().y
    }

    pub fn speed_map(&self) -> &SpeedMap {
        &self.speed_map
    }

    pub fn move_history(&self) -> &MoveHistory {
        &self.move_history
    }

    /// Source span in seconds.
    pub fn duration(&self) -> f64 {
        self.end() - self.start()
    }

    /// Output length assuming the uniform speed applies throughout.
    pub fn naive_output_duration(&self) -> f64 {
        self.duration() / self.speed()
    }

    /// True when `time` lies within `[start, end]`.
    pub fn contains(&self, time: f64) -> bool {
        self.start() <= time && time <= self.end()
    }

    pub fn is_variable_speed(&self) -> bool {
        self.speed_map.is_variable_speed()
    }

    pub fn set_speed(&mut self, speed: f64) -> Result<(), ModelError> {
        self.speed_map.set_uniform_speed(speed)
    }

    /// Replace the speed map. Its endpoints must match the current boundaries.
    pub fn replace_speed_map(&mut self, map: SpeedMap) -> Result<(), ModelError> {
        let points = align_endpoints(map.into(), self.start(), self.end())?;
        self.speed_map = SpeedMap::new(points)?;
        Ok(())
    }

    /// Move one boundary, recording the edit for undo.
    ///
    /// A rejected move leaves the pair and its history untouched.
    pub fn move_boundary(&mut self, side: MarkerSide, new_time: f64) -> Result<(), ModelError> {
        let from_time = self.boundary(side);
        let dropped = self.speed_map.set_boundary(side, new_time)?;
        self.move_history.undo.push(MoveRecord {
            side,
            from_time,
            to_time: new_time,
            dropped,
        });
        self.move_history.redo.clear();
        Ok(())
    }

    /// Revert the latest boundary move. Returns the side that moved, or `None`
    /// when there is nothing to undo.
    pub fn undo_move(&mut self) -> Result<Option<MarkerSide>, ModelError> {
        let Some(record) = self.move_history.undo.pop() else {
            return Ok(None);
        };
        if let Err(err) =
            self.speed_map
                .restore_boundary(record.side, record.from_time, &record.dropped)
        {
            self.move_history.undo.push(record);
            return Err(err);
        }
        let side = record.side;
        self.move_history.redo.push(record);
        Ok(Some(side))
    }

    /// Re-apply the latest undone boundary move.
    pub fn redo_move(&mut self) -> Result<Option<MarkerSide>, ModelError> {
        let Some(mut record) = self.move_history.redo.pop() else {
            return Ok(None);
        };
        match self.speed_map.set_boundary(record.side, record.to_time) {
            Ok(dropped) => {
                let side = record.side;
                record.dropped = dropped;
                self.move_history.undo.push(record);
                Ok(Some(side))
            }
            Err(err) => {
                self.move_history.redo.push(record);
                Err(err)
            }
        }
    }

    /// Current time of the given boundary.
    pub fn boundary(&self, side: MarkerSide) -> f64 {
        match side {
            MarkerSide::Start => self.start(),
            MarkerSide::End => self.end(),
        }
    }
}

/// Snap stored map endpoints onto the pair boundaries.
fn align_endpoints(
    mut points: Vec<SpeedPoint>,
    start: f64,
    end: f64,
) -> Result<Vec<SpeedPoint>, ModelError> {
    let (Some(first), Some(last)) = (points.first(), points.last()) else {
        return Err(ModelError::invalid_speed_map("map has no points"));
    };
    if (first.x - start).abs() > ENDPOINT_TOLERANCE || (last.x - end).abs() > ENDPOINT_TOLERANCE {
        return Err(ModelError::invalid_speed_map(format!(
            "map spans [{}, {}] but the pair spans [{start}, {end}]",
            first.x, last.x
        )));
    }
    let last_index = points.len() - 1;
    points[0].x = start;
    points[last_index].x = end;
    Ok(points)
}

/// On-disk shape of a marker pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MarkerPairRecord {
    start: f64,
    end: f64,
    #[serde(default)]
    crop: Crop,
    #[serde(default = "default_speed", deserialize_with = "lenient_speed")]
    speed: f64,
    #[serde(default)]
    overrides: EncodeOptions,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    speed_map: Option<Vec<SpeedPoint>>,
    #[serde(default)]
    speed_map_loop: SpeedMapLoop,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    output_duration: Option<f64>,
}

fn default_speed() -> f64 {
    1.0
}

/// Older documents sometimes stored the speed as a string.
fn lenient_speed<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrString {
        Number(f64),
        String(String),
    }

    match NumberOrString::deserialize(deserializer)? {
        NumberOrString::Number(speed) => Ok(speed),
        NumberOrString::String(text) => text.trim().parse().map_err(serde::de::Error::custom),
    }
}

impl TryFrom<MarkerPairRecord> for MarkerPair {
    type Error = ModelError;

    fn try_from(record: MarkerPairRecord) -> Result<Self, Self::Error> {
        let speed_map = match record.speed_map {
            Some(points) => {
                SpeedMap::new(align_endpoints(points, record.start, record.end)?)?
            }
            None => {
                check_speed(record.speed)?;
                if record.end <= record.start {
                    return Err(ModelError::EndBeforeStart {
                        time: record.end,
                        start: record.start,
                    });
                }
                SpeedMap::constant(record.start, record.end, record.speed)?
            }
        };

        let mut pair = MarkerPair::with_speed_map(speed_map, record.crop);
        pair.overrides = record.overrides;
        pair.speed_map_loop = record.speed_map_loop;
        if let Some(duration) = record.output_duration.filter(|d| d.is_finite() && *d >= 0.0) {
            pair.output_duration = duration;
        }
        Ok(pair)
    }
}

impl From<MarkerPair> for MarkerPairRecord {
    fn from(pair: MarkerPair) -> Self {
        let speed_map = pair
            .is_variable_speed()
            .then(|| pair.speed_map.points().to_vec());
        Self {
            start: pair.start(),
            end: pair.end(),
            crop: pair.crop,
            speed: pair.speed(),
            overrides: pair.overrides,
            speed_map,
            speed_map_loop: pair.speed_map_loop,
            output_duration: Some(pair.output_duration),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp_pair() -> MarkerPair {
        let map = SpeedMap::new(vec![
            SpeedPoint::new(0.0, 1.0),
            SpeedPoint::new(5.0, 2.0),
            SpeedPoint::new(10.0, 1.0),
        ])
        .unwrap();
        MarkerPair::with_speed_map(map, Crop::FULL)
    }

    #[test]
    fn test_new_pair_defaults() {
        let pair = MarkerPair::new(1.0, 3.0, 0.5, Crop::FULL).unwrap();
        assert_eq!(pair.start(), 1.0);
        assert_eq!(pair.end(), 3.0);
        assert_eq!(pair.speed(), 0.5);
        assert_eq!(pair.output_duration, 4.0);
        assert!(pair.speed_map_loop.enabled);
        assert!(pair.overrides.is_empty());
        assert!(!pair.is_variable_speed());
    }

    #[test]
    fn test_new_pair_rejects_inverted_range() {
        assert!(MarkerPair::new(3.0, 3.0, 1.0, Crop::FULL).is_err());
        assert!(MarkerPair::new(3.0, 1.0, 1.0, Crop::FULL).is_err());
        assert!(MarkerPair::new(0.0, 1.0, 0.0, Crop::FULL).is_err());
    }

    #[test]
    fn test_move_and_undo_redo() {
        let mut pair = ramp_pair();
        pair.move_boundary(MarkerSide::Start, 6.0).unwrap();
        assert_eq!(pair.start(), 6.0);
        assert_eq!(pair.speed_map().len(), 2);

        assert_eq!(pair.undo_move().unwrap(), Some(MarkerSide::Start));
        assert_eq!(pair.speed_map(), ramp_pair().speed_map());

        assert_eq!(pair.redo_move().unwrap(), Some(MarkerSide::Start));
        assert_eq!(pair.start(), 6.0);
        assert_eq!(pair.speed_map().len(), 2);
        assert!(pair.move_history().can_undo());
        assert!(!pair.move_history().can_redo());
    }

    #[test]
    fn test_rejected_move_keeps_history() {
        let mut pair = ramp_pair();
        let err = pair.move_boundary(MarkerSide::End, 0.0).unwrap_err();
        assert!(err.is_ordering_violation());
        assert_eq!(pair.end(), 10.0);
        assert!(!pair.move_history().can_undo());
    }

    #[test]
    fn test_new_move_clears_redo() {
        let mut pair = ramp_pair();
        pair.move_boundary(MarkerSide::End, 8.0).unwrap();
        pair.undo_move().unwrap();
        assert!(pair.move_history().can_redo());
        pair.move_boundary(MarkerSide::End, 9.0).unwrap();
        assert!(!pair.move_history().can_redo());
        assert_eq!(pair.undo_move().unwrap(), Some(MarkerSide::End));
        assert_eq!(pair.end(), 10.0);
        assert_eq!(pair.undo_move().unwrap(), None);
    }

    #[test]
    fn test_speed_map_loop_activity() {
        let mut lp = SpeedMapLoop {
            start: Some(2.0),
            end: Some(4.0),
            enabled: true,
        };
        assert_eq!(lp.active_range(0.0, 10.0), Some((2.0, 4.0)));
        assert_eq!(lp.active_range(2.0, 10.0), None);
        assert_eq!(lp.active_range(0.0, 4.0), None);
        lp.enabled = false;
        assert_eq!(lp.active_range(0.0, 10.0), None);
        assert_eq!(SpeedMapLoop::default().active_range(0.0, 10.0), None);
    }

    #[test]
    fn test_constant_pair_omits_speed_map() {
        let pair = MarkerPair::new(0.0, 2.0, 1.0, Crop::FULL).unwrap();
        let value = serde_json::to_value(&pair).unwrap();
        assert!(value.get("speedMap").is_none());
        assert_eq!(value["crop"], "0:0:iw:ih");
        assert_eq!(value["speedMapLoop"]["enabled"], true);

        let value = serde_json::to_value(ramp_pair()).unwrap();
        assert_eq!(value["speedMap"].as_array().unwrap().len(), 3);
    }

    #[test]
    fn test_missing_speed_map_loads_constant() {
        let raw = r#"{"start":1,"end":4,"speed":0.5,"crop":"0:0:iw:ih"}"#;
        let pair: MarkerPair = serde_json::from_str(raw).unwrap();
        assert_eq!(pair.speed_map().len(), 2);
        assert_eq!(pair.speed_map().last().y, 0.5);
        assert!(pair.speed_map_loop.enabled);
    }

    #[test]
    fn test_string_speed_is_accepted() {
        let raw = r#"{"start":0,"end":2,"speed":"0.5"}"#;
        let pair: MarkerPair = serde_json::from_str(raw).unwrap();
        assert_eq!(pair.speed(), 0.5);
    }

    #[test]
    fn test_speed_map_endpoints_must_match() {
        let raw = r#"{"start":0,"end":4,"speed":1,
            "speedMap":[{"x":0,"y":1},{"x":2,"y":2},{"x":6,"y":1}]}"#;
        assert!(serde_json::from_str::<MarkerPair>(raw).is_err());
    }

    #[test]
    fn test_replace_speed_map_checks_span() {
        let mut pair = MarkerPair::new(0.0, 4.0, 1.0, Crop::FULL).unwrap();
        let wrong = SpeedMap::constant(0.0, 5.0, 2.0).unwrap();
        assert!(pair.replace_speed_map(wrong).is_err());

        let ok = SpeedMap::new(vec![
            SpeedPoint::new(0.0, 1.0),
            SpeedPoint::new(2.0, 0.5),
            SpeedPoint::new(4.0, 1.0),
        ])
        .unwrap();
        pair.replace_speed_map(ok).unwrap();
        assert!(pair.is_variable_speed());
    }
}
