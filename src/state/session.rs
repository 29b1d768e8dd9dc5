//! Camera session bookkeeping: the explicit two-state phase that gates
//! start/stop, the live stream, where the viewer and IP overlay came from in
//! the DOM, and the token that supersedes an in-flight entrance animation.

use std::cell::Cell;
use std::rc::Rc;

use web_sys::{Element, MediaStream};

use crate::interaction::InteractionHandlers;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SessionPhase {
    #[default]
    Inactive,
    Active,
}

/// Original DOM location of a relocated element, captured on session start so
/// stop can put it back in order.
pub struct DomHome {
    pub parent: Element,
    pub next_sibling: Option<Element>,
}

#[derive(Default)]
pub struct CameraSession {
    pub phase: SessionPhase,
    pub stream: Option<MediaStream>,
    pub viewer_home: Option<DomHome>,
    pub overlay_home: Option<DomHome>,
    /// Whether the viewer carried `camera-controls` before the session
    /// stripped it; restored on stop.
    pub had_camera_controls: bool,
    pub handlers: Option<InteractionHandlers>,
    pub animation: AnimationToken,
}

/// Generation counter shared between the chained entrance-animation stages.
/// Each stage captures the generation it was started under and bails if a
/// newer `begin` or `cancel` has bumped it since.
#[derive(Clone, Default)]
pub struct AnimationToken(Rc<Cell<u32>>);

impl AnimationToken {
    /// Starts a new animation run, invalidating any stages still pending
    /// from a previous run. Returns the new generation.
    pub fn begin(&self) -> u32 {
        let generation = self.0.get().wrapping_add(1);
        self.0.set(generation);
        generation
    }

    pub fn cancel(&self) {
        self.0.set(self.0.get().wrapping_add(1));
    }

    pub fn is_current(&self, generation: u32) -> bool {
        self.0.get() == generation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn begin_supersedes_earlier_generation() {
        let token = AnimationToken::default();
        let first = token.begin();
        assert!(token.is_current(first));
        let second = token.begin();
        assert!(!token.is_current(first));
        assert!(token.is_current(second));
    }

    #[test]
    fn cancel_invalidates_without_starting_a_run() {
        let token = AnimationToken::default();
        let generation = token.begin();
        token.cancel();
        assert!(!token.is_current(generation));
    }

    #[test]
    fn clones_share_the_same_counter() {
        let token = AnimationToken::default();
        let clone = token.clone();
        let generation = token.begin();
        assert!(clone.is_current(generation));
        clone.cancel();
        assert!(!token.is_current(generation));
    }

    #[test]
    fn session_defaults_inactive_with_nothing_attached() {
        let s = CameraSession::default();
        assert_eq!(s.phase, SessionPhase::Inactive);
        assert!(s.stream.is_none());
        assert!(s.handlers.is_none());
        assert!(s.viewer_home.is_none());
        assert!(!s.had_camera_controls);
    }
}
