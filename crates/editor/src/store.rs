//! The ordered collection of marker pairs and every edit applied to it.
//!
//! Pairs are addressed by 0-based index; the 1-based "pair number" shown to
//! users is purely positional. Every edit that changes a speed map refreshes
//! the pair's cached output duration at the store's frame rate.

use clipmarks_common::FrameClock;
use clipmarks_model::{
    Crop, CropResolution, EncodeOptions, MarkerPair, MarkerSide, MarkersFile, ModelError,
    Settings, SpeedMap,
};
use clipmarks_timing::OutputDurationEngine;

use crate::error::EditorError;
use crate::history::PairHistory;
use crate::merge_list;

/// Result of a two-step marker placement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlacedMarker {
    /// A start marker was recorded at this (frame-snapped) time.
    Start(f64),
    /// The end marker completed the pair at this index.
    Pair(usize),
}

/// Ordered marker pairs plus pair-level history.
#[derive(Debug, Clone)]
pub struct MarkerPairStore {
    pairs: Vec<MarkerPair>,
    history: PairHistory,
    pending_start: Option<f64>,
    clock: FrameClock,
    engine: OutputDurationEngine,
}

impl MarkerPairStore {
    /// An empty store timing clips at `fps`.
    pub fn new(fps: f64) -> Result<Self, EditorError> {
        let engine = OutputDurationEngine::new(fps)?;
        let clock = FrameClock::new(fps).ok_or(clipmarks_timing::TimingError::InvalidFps { fps })?;
        Ok(Self {
            pairs: Vec::new(),
            history: PairHistory::default(),
            pending_start: None,
            clock,
            engine,
        })
    }

    /// A store over existing pairs. Output durations are recomputed.
    pub fn with_pairs(pairs: Vec<MarkerPair>, fps: f64) -> Result<Self, EditorError> {
        let mut store = Self::new(fps)?;
        store.pairs = pairs;
        store.refresh_all_durations();
        Ok(store)
    }

    pub fn from_markers_file(file: &MarkersFile, fps: f64) -> Result<Self, EditorError> {
        Self::with_pairs(file.marker_pairs.clone(), fps)
    }

    /// Replace the pairs of `file` with the store's pairs.
    pub fn write_to(&self, file: &mut MarkersFile) {
        file.marker_pairs = self.pairs.clone();
    }

    pub fn fps(&self) -> f64 {
        self.engine.fps()
    }

    /// Change the frame rate and recompute every output duration.
    pub fn set_fps(&mut self, fps: f64) -> Result<(), EditorError> {
        self.engine = OutputDurationEngine::new(fps)?;
        self.clock = FrameClock::new(fps).ok_or(clipmarks_timing::TimingError::InvalidFps { fps })?;
        self.refresh_all_durations();
        Ok(())
    }

    pub fn pairs(&self) -> &[MarkerPair] {
        &self.pairs
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&MarkerPair> {
        self.pairs.get(index)
    }

    pub fn pair(&self, index: usize) -> Result<&MarkerPair, EditorError> {
        self.pairs
            .get(index)
            .ok_or_else(|| EditorError::out_of_range(index, self.pairs.len()))
    }

    pub fn history(&self) -> &PairHistory {
        &self.history
    }

    /// Start time waiting for its end marker, if any.
    pub fn pending_start(&self) -> Option<f64> {
        self.pending_start
    }

    pub fn cancel_pending_start(&mut self) -> Option<f64> {
        self.pending_start.take()
    }

    /// Create a pair over `[start, end]` with the session defaults.
    ///
    /// `speed` overrides `settings.new_marker_speed`. Clears the pair redo list.
    pub fn add_pair(
        &mut self,
        start: f64,
        end: f64,
        settings: &Settings,
        speed: Option<f64>,
    ) -> Result<usize, EditorError> {
        let speed = speed.unwrap_or(settings.new_marker_speed);
        let crop = settings.new_marker_crop.clamped(settings.crop_resolution());
        let mut pair = MarkerPair::new(start, end, speed, crop)?;
        pair.output_duration = self.engine.output_duration(pair.speed_map());

        self.pairs.push(pair);
        self.history.clear();
        let index = self.pairs.len() - 1;
        tracing::info!(number = index + 1, start, end, speed, "Added marker pair");
        Ok(index)
    }

    /// Place a marker at `time`, snapped down to the frame grid.
    ///
    /// The first call records a pending start; the second creates the pair.
    /// An end at or before the pending start is rejected and the start is kept.
    pub fn place_marker(&mut self, time: f64, settings: &Settings) -> Result<PlacedMarker, EditorError> {
        let time = self.clock.snap_down(time);
        match self.pending_start {
            None => {
                self.pending_start = Some(time);
                tracing::debug!(time, "Start marker placed");
                Ok(PlacedMarker::Start(time))
            }
            Some(start) => {
                if time <= start {
                    let err = ModelError::EndBeforeStart { time, start };
                    tracing::warn!(%err, "Rejected end marker");
                    return Err(err.into());
                }
                let index = self.add_pair(start, time, settings, None)?;
                self.pending_start = None;
                Ok(PlacedMarker::Pair(index))
            }
        }
    }

    /// Move one boundary of a pair.
    ///
    /// Points outside the new span are dropped; the move is recorded for undo
    /// and the pair's redo stack is cleared. A move that would invert the pair
    /// is rejected and leaves the pair unchanged.
    pub fn move_pair_boundary(
        &mut self,
        index: usize,
        side: MarkerSide,
        new_time: f64,
    ) -> Result<(), EditorError> {
        let engine = self.engine;
        let pair = self.pair_mut(index)?;
        if let Err(err) = pair.move_boundary(side, new_time) {
            tracing::warn!(number = index + 1, %side, new_time, %err, "Rejected marker move");
            return Err(err.into());
        }
        pair.output_duration = engine.output_duration(pair.speed_map());
        tracing::debug!(number = index + 1, %side, new_time, "Moved marker");
        Ok(())
    }

    /// Undo the latest boundary move of a pair. Returns the side restored.
    pub fn undo_move(&mut self, index: usize) -> Result<Option<MarkerSide>, EditorError> {
        let engine = self.engine;
        let pair = self.pair_mut(index)?;
        let side = pair.undo_move()?;
        if side.is_some() {
            pair.output_duration = engine.output_duration(pair.speed_map());
        }
        Ok(side)
    }

    /// Redo the latest undone boundary move of a pair.
    pub fn redo_move(&mut self, index: usize) -> Result<Option<MarkerSide>, EditorError> {
        let engine = self.engine;
        let pair = self.pair_mut(index)?;
        let side = pair.redo_move()?;
        if side.is_some() {
            pair.output_duration = engine.output_duration(pair.speed_map());
        }
        Ok(side)
    }

    pub fn delete_pair(&mut self, index: usize) -> Result<MarkerPair, EditorError> {
        if index >= self.pairs.len() {
            return Err(EditorError::out_of_range(index, self.pairs.len()));
        }
        let removed = self.pairs.remove(index);
        tracing::info!(number = index + 1, "Deleted marker pair");
        Ok(removed)
    }

    /// Move the pair at `from` so that it ends up at `to`. Other pairs keep
    /// their relative order.
    pub fn reorder_pair(&mut self, from: usize, to: usize) -> Result<(), EditorError> {
        let len = self.pairs.len();
        if from >= len {
            return Err(EditorError::out_of_range(from, len));
        }
        if to >= len {
            return Err(EditorError::out_of_range(to, len));
        }
        let pair = self.pairs.remove(from);
        self.pairs.insert(to, pair);
        tracing::debug!(from = from + 1, to = to + 1, "Reordered marker pair");
        Ok(())
    }

    /// Undo the newest pair, parking it for redo. A pending start marker is
    /// discarded first and counts as the undone step.
    pub fn undo_pair(&mut self) -> bool {
        if self.pending_start.take().is_some() {
            tracing::debug!("Discarded pending start marker");
            return true;
        }
        match self.pairs.pop() {
            Some(pair) => {
                tracing::info!(number = self.pairs.len() + 1, "Undid marker pair");
                self.history.push(pair);
                true
            }
            None => false,
        }
    }

    /// Restore the most recently undone pair with all of its data. Returns
    /// its index.
    pub fn redo_pair(&mut self) -> Option<usize> {
        let mut pair = self.history.pop()?;
        pair.output_duration = self.engine.output_duration(pair.speed_map());
        self.pairs.push(pair);
        let index = self.pairs.len() - 1;
        tracing::info!(number = index + 1, "Redid marker pair");
        Some(index)
    }

    pub fn set_speed(&mut self, index: usize, speed: f64) -> Result<(), EditorError> {
        let engine = self.engine;
        let pair = self.pair_mut(index)?;
        pair.set_speed(speed)?;
        pair.output_duration = engine.output_duration(pair.speed_map());
        Ok(())
    }

    /// Set a pair's crop, clamped to the crop resolution.
    pub fn set_crop(&mut self, index: usize, crop: Crop, res: CropResolution) -> Result<(), EditorError> {
        self.pair_mut(index)?.crop = crop.clamped(res);
        Ok(())
    }

    pub fn set_overrides(&mut self, index: usize, overrides: EncodeOptions) -> Result<(), EditorError> {
        self.pair_mut(index)?.overrides = overrides;
        Ok(())
    }

    /// Replace a pair's speed map after validating that it spans the pair.
    pub fn replace_speed_map(&mut self, index: usize, map: SpeedMap) -> Result<(), EditorError> {
        let engine = self.engine;
        let pair = self.pair_mut(index)?;
        pair.replace_speed_map(map)?;
        pair.output_duration = engine.output_duration(pair.speed_map());
        Ok(())
    }

    /// Apply `speed` to every pair. Variable maps keep their later points.
    pub fn update_all_speeds(&mut self, speed: f64) -> Result<(), EditorError> {
        // Validate once up front so a bad speed leaves every pair untouched.
        SpeedMap::constant(0.0, 1.0, speed)?;
        for pair in &mut self.pairs {
            pair.set_speed(speed)?;
            pair.output_duration = self.engine.output_duration(pair.speed_map());
        }
        tracing::info!(speed, pairs = self.pairs.len(), "Updated all marker speeds");
        Ok(())
    }

    pub fn update_all_crops(&mut self, crop: Crop, res: CropResolution) {
        let crop = crop.clamped(res);
        for pair in &mut self.pairs {
            pair.crop = crop;
        }
        tracing::info!(%crop, pairs = self.pairs.len(), "Updated all marker crops");
    }

    /// Switch the crop resolution, rescaling every pair crop and the new-marker
    /// crop. Symbolic `iw`/`ih` components are left as they are.
    pub fn rescale_crops(&mut self, settings: &mut Settings, new_res: CropResolution) {
        let old = settings.crop_resolution();
        let scale_x = new_res.width as f64 / old.width as f64;
        let scale_y = new_res.height as f64 / old.height as f64;

        for pair in &mut self.pairs {
            pair.crop = pair.crop.rescaled(scale_x, scale_y).clamped(new_res);
        }
        settings.new_marker_crop = settings
            .new_marker_crop
            .rescaled(scale_x, scale_y)
            .clamped(new_res);
        settings.set_crop_resolution(new_res);
        tracing::info!(from = %old, to = %new_res, "Rescaled crops");
    }

    /// Index of the shortest pair containing `time`; the first wins on ties.
    pub fn shortest_active_pair(&self, time: f64) -> Option<usize> {
        self.pairs
            .iter()
            .enumerate()
            .filter(|(_, pair)| pair.contains(time))
            .fold(None, |best: Option<(usize, f64)>, (index, pair)| match best {
                Some((_, best_len)) if best_len <= pair.duration() => best,
                _ => Some((index, pair.duration())),
            })
            .map(|(index, _)| index)
    }

    /// Estimated duration of each merge-list group.
    pub fn merge_list_duration(&self, list: &str) -> Vec<f64> {
        merge_list::durations(list, &self.pairs)
    }

    /// Pair numbers of each non-empty merge-list group, in concatenation order.
    pub fn merge_list(&self, list: &str) -> Vec<(String, Vec<usize>)> {
        merge_list::expand(list)
    }

    fn pair_mut(&mut self, index: usize) -> Result<&mut MarkerPair, EditorError> {
        let len = self.pairs.len();
        self.pairs
            .get_mut(index)
            .ok_or_else(|| EditorError::out_of_range(index, len))
    }

    fn refresh_all_durations(&mut self) {
        for pair in &mut self.pairs {
            pair.output_duration = self.engine.output_duration(pair.speed_map());
        }
    }
}
