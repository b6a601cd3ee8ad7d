//! Track identities and the pools they are drawn from.

use std::collections::VecDeque;
use std::fmt;

use crate::error::TrackerError;

/// Identity of a track, unique among the active tracks of one stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TrackId(pub u64);

impl TrackId {
    /// Single-letter label (`1 -> 'A'`, ..., `26 -> 'Z'`) for small identities.
    pub fn letter(self) -> Option<char> {
        match self.0 {
            1..=26 => char::from_u32('A' as u32 + (self.0 - 1) as u32),
            _ => None,
        }
    }
}

impl fmt::Display for TrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Display form of a [`TrackId`] in the style of the pool it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackLabel {
    id: TrackId,
    lettered: bool,
}

impl fmt::Display for TrackLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.id.letter() {
            Some(letter) if self.lettered => write!(f, "{letter}"),
            _ => write!(f, "{}", self.id),
        }
    }
}

/// Source of identities for new tracks.
///
/// The unbounded pool hands out 1, 2, 3, ... and never reuses a value. The
/// bounded pool cycles a fixed set of identities in FIFO order: a released
/// identity goes to the back of the queue. A lettered bounded pool labels
/// its identities `A`, `B`, ... instead of `1`, `2`, ...
#[derive(Debug, Clone, PartialEq)]
pub enum IdentityPool {
    Unbounded {
        next: u64,
    },
    Bounded {
        capacity: usize,
        free: VecDeque<TrackId>,
        lettered: bool,
    },
}

impl Default for IdentityPool {
    fn default() -> Self {
        Self::unbounded()
    }
}

impl IdentityPool {
    pub fn unbounded() -> Self {
        Self::Unbounded { next: 1 }
    }

    /// A pool holding identities `1..=capacity`.
    pub fn bounded(capacity: usize) -> Self {
        Self::Bounded {
            capacity,
            free: (1..=capacity as u64).map(TrackId).collect(),
            lettered: false,
        }
    }

    /// Eleven identities, shown as the letters `A` to `K`.
    pub fn alphabetic() -> Self {
        Self::Bounded {
            capacity: 11,
            free: (1..=11).map(TrackId).collect(),
            lettered: true,
        }
    }

    pub fn allocate(&mut self) -> Result<TrackId, TrackerError> {
        match self {
            Self::Unbounded { next } => {
                let id = TrackId(*next);
                *next += 1;
                Ok(id)
            }
            Self::Bounded { capacity, free, .. } => free
                .pop_front()
                .ok_or(TrackerError::IdentityPoolExhausted {
                    capacity: *capacity,
                }),
        }
    }

    /// Return an identity whose track has been deleted.
    pub fn release(&mut self, id: TrackId) {
        match self {
            Self::Unbounded { .. } => {}
            Self::Bounded { free, .. } => {
                debug_assert!(!free.contains(&id), "identity {id} released twice");
                free.push_back(id);
            }
        }
    }

    /// How `id` is shown in logs and overlays.
    pub fn label(&self, id: TrackId) -> TrackLabel {
        let lettered = matches!(self, Self::Bounded { lettered: true, .. });
        TrackLabel { id, lettered }
    }

    /// Identities that can still be allocated, `None` when unbounded.
    pub fn available(&self) -> Option<usize> {
        match self {
            Self::Unbounded { .. } => None,
            Self::Bounded { free, .. } => Some(free.len()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unbounded_is_monotonic() {
        let mut pool = IdentityPool::unbounded();
        let a = pool.allocate().unwrap();
        pool.release(a);
        let b = pool.allocate().unwrap();
        assert_eq!(a, TrackId(1));
        assert_eq!(b, TrackId(2));
        assert_eq!(pool.available(), None);
    }

    #[test]
    fn test_bounded_reuses_in_fifo_order() {
        let mut pool = IdentityPool::bounded(2);
        let a = pool.allocate().unwrap();
        let b = pool.allocate().unwrap();
        assert_eq!(
            pool.allocate(),
            Err(TrackerError::IdentityPoolExhausted { capacity: 2 })
        );

        pool.release(b);
        pool.release(a);
        assert_eq!(pool.available(), Some(2));
        assert_eq!(pool.allocate().unwrap(), b);
        assert_eq!(pool.allocate().unwrap(), a);
    }

    #[test]
    fn test_alphabetic_labels() {
        let mut pool = IdentityPool::alphabetic();
        let labels: Vec<char> = (0..11)
            .map(|_| pool.allocate().unwrap().letter().unwrap())
            .collect();
        assert_eq!(labels.iter().collect::<String>(), "ABCDEFGHIJK");
        assert!(pool.allocate().is_err());
        assert_eq!(TrackId(27).letter(), None);
    }

    #[test]
    fn test_label_follows_pool_style() {
        let alphabetic = IdentityPool::alphabetic();
        assert_eq!(alphabetic.label(TrackId(1)).to_string(), "A");
        assert_eq!(alphabetic.label(TrackId(11)).to_string(), "K");
        assert_eq!(alphabetic.available(), Some(11));

        assert_eq!(IdentityPool::bounded(11).label(TrackId(1)).to_string(), "1");
        assert_eq!(IdentityPool::unbounded().label(TrackId(3)).to_string(), "3");
        assert_eq!(TrackId(1).to_string(), "1");
    }
}
