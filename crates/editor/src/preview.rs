//! Frame-driven preview routines.
//!
//! The host calls a tick once per rendered frame and keeps re-arming it until
//! the tick returns [`TickOutcome::Stop`].

use clipmarks_model::Settings;
use clipmarks_timing::sample;

use crate::session::EditorSession;
use crate::store::MarkerPairStore;

/// Whether the host should schedule the tick again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Continue,
    Stop,
}

/// The video player as seen by preview ticks.
pub trait PlayerControl {
    /// Current playback position in source seconds.
    fn current_time(&self) -> f64;
    fn set_playback_rate(&mut self, rate: f64);
    fn seek_to(&mut self, time: f64);
}

/// Per-frame inputs to a tick.
pub struct FrameContext<'a> {
    pub settings: &'a Settings,
    pub player: &'a mut dyn PlayerControl,
}

/// Drive playback speed from the speed map of the shortest pair under the
/// playhead.
///
/// The player rate is only touched when it changes. Outside every pair the
/// rate goes back to 1. Once ducking is switched off the rate is reset and
/// the tick stops.
pub fn speed_ducking_tick(
    session: &mut EditorSession,
    store: &MarkerPairStore,
    ctx: FrameContext<'_>,
) -> TickOutcome {
    let now = ctx.player.current_time();

    let rate = match store.shortest_active_pair(now).and_then(|i| store.get(i)) {
        Some(pair) => {
            if ctx.settings.speed_maps_enabled(&pair.overrides) {
                let round_multiple = ctx.settings.round_speed_map_easing(&pair.overrides);
                sample(
                    pair.speed_map(),
                    now,
                    session.easing,
                    round_multiple,
                    session.round_precision,
                )
            } else {
                pair.speed()
            }
        }
        None => 1.0,
    };

    if rate != session.prev_rate {
        ctx.player.set_playback_rate(rate);
        tracing::trace!(rate, now, "Preview rate changed");
        session.prev_rate = rate;
    }

    if session.speed_ducking {
        TickOutcome::Continue
    } else {
        ctx.player.set_playback_rate(1.0);
        session.prev_rate = 1.0;
        TickOutcome::Stop
    }
}

/// Keep playback inside the selected pair, or inside its speed-map loop
/// range when that loop is active.
pub fn marker_looping_tick(
    session: &mut EditorSession,
    store: &MarkerPairStore,
    ctx: FrameContext<'_>,
) -> TickOutcome {
    if let Some(pair) = session.selected_pair.and_then(|i| store.get(i)) {
        let now = ctx.player.current_time();
        let (start, end) = pair
            .speed_map_loop
            .active_range(pair.start(), pair.end())
            .unwrap_or((pair.start(), pair.end()));
        if !(start <= now && now <= end) {
            ctx.player.seek_to(start);
        }
    }

    if session.marker_looping {
        TickOutcome::Continue
    } else {
        TickOutcome::Stop
    }
}
