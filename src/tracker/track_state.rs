/// Lifecycle state of a track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrackState {
    /// Spawned but not yet matched `min_hits` times
    #[default]
    Tentative,
    /// Enough matches and still within `max_age`; reported as visible
    Confirmed,
    /// Unmatched counter exceeded `max_age`; terminal, identity released
    Deleted,
}
