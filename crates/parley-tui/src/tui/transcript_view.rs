//! State management for transcript scrolling and latest-turn following

/// How close to the bottom (in rows) the viewport may sit and still count
/// as following the latest turn.
pub const FOLLOW_MARGIN: usize = 48;

/// Scroll state for the transcript view.
///
/// Follow intent is derived from viewport position, never toggled on its
/// own: every user scroll recomputes it from the distance to the bottom,
/// so scrolling up detaches the view and scrolling back near the bottom
/// re-attaches it without a dedicated key.
#[derive(Debug)]
pub struct TranscriptListState {
    /// Current scroll offset (row-based)
    pub offset: usize,
    /// Total content height (cached during render)
    pub total_content_height: usize,
    /// Viewport height (cached during render)
    pub last_viewport_height: u16,
    following_latest: bool,
}

impl Default for TranscriptListState {
    fn default() -> Self {
        Self::new()
    }
}

impl TranscriptListState {
    pub fn new() -> Self {
        Self {
            offset: 0,
            total_content_height: 0,
            last_viewport_height: 0,
            following_latest: true,
        }
    }

    pub fn following_latest(&self) -> bool {
        self.following_latest
    }

    /// Rows between the bottom of the viewport and the bottom of the
    /// content. Zero when everything fits.
    pub fn distance_to_bottom(&self) -> usize {
        self.max_offset().saturating_sub(self.offset)
    }

    pub fn scroll_up(&mut self, amount: usize) -> bool {
        let previous = self.offset;
        self.offset = self.offset.saturating_sub(amount);
        self.update_following();
        self.offset != previous
    }

    pub fn scroll_down(&mut self, amount: usize) -> bool {
        let previous = self.offset;
        self.offset = self.offset.saturating_add(amount).min(self.max_offset());
        self.update_following();
        self.offset != previous
    }

    pub fn scroll_to_top(&mut self) {
        self.offset = 0;
        self.update_following();
    }

    /// Jump to the newest turn and resume following.
    pub fn scroll_to_latest(&mut self) {
        self.offset = self.max_offset();
        self.following_latest = true;
    }

    /// Cache the measured content and viewport heights for this frame.
    /// While following, the offset snaps to the bottom so freshly arrived
    /// turns scroll into view; otherwise the position is preserved (only
    /// clamped when the content shrank underneath it).
    pub fn begin_render(&mut self, total_content_height: usize, viewport_height: u16) {
        self.total_content_height = total_content_height;
        self.last_viewport_height = viewport_height;

        let max_offset = self.max_offset();
        if self.following_latest {
            self.offset = max_offset;
        } else {
            self.offset = self.offset.min(max_offset);
        }
    }

    pub fn page_size(&self) -> usize {
        (self.last_viewport_height as usize).saturating_sub(1).max(1)
    }

    fn update_following(&mut self) {
        self.following_latest = self.distance_to_bottom() < FOLLOW_MARGIN;
    }

    fn max_offset(&self) -> usize {
        self.total_content_height
            .saturating_sub(self.last_viewport_height as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(total: usize, viewport: u16) -> TranscriptListState {
        let mut state = TranscriptListState::new();
        state.begin_render(total, viewport);
        state
    }

    #[test]
    fn new_state_follows_and_snaps_to_bottom() {
        let state = state(500, 40);
        assert!(state.following_latest());
        assert_eq!(state.offset, 460);
        assert_eq!(state.distance_to_bottom(), 0);
    }

    #[test]
    fn scrolling_far_up_detaches_the_view() {
        let mut state = state(500, 40);
        state.scroll_up(200);
        assert_eq!(state.distance_to_bottom(), 200);
        assert!(!state.following_latest());

        // New turns grow the content; the reading position holds.
        state.begin_render(560, 40);
        assert_eq!(state.offset, 260);
        assert!(!state.following_latest());
    }

    #[test]
    fn near_bottom_counts_as_following() {
        let mut state = state(500, 40);
        state.scroll_up(10);
        assert_eq!(state.distance_to_bottom(), 10);
        assert!(state.following_latest());

        // Growth while following pulls the view to the new bottom.
        state.begin_render(560, 40);
        assert_eq!(state.offset, 520);
        assert_eq!(state.distance_to_bottom(), 0);
    }

    #[test]
    fn scrolling_back_down_reattaches() {
        let mut state = state(500, 40);
        state.scroll_up(200);
        assert!(!state.following_latest());

        state.scroll_down(190);
        assert_eq!(state.distance_to_bottom(), 10);
        assert!(state.following_latest());
    }

    #[test]
    fn scroll_to_latest_resumes_following_from_anywhere() {
        let mut state = state(500, 40);
        state.scroll_to_top();
        assert_eq!(state.offset, 0);
        assert!(!state.following_latest());

        state.scroll_to_latest();
        assert_eq!(state.offset, 460);
        assert!(state.following_latest());
    }

    #[test]
    fn short_content_always_follows() {
        let mut state = state(20, 40);
        assert_eq!(state.distance_to_bottom(), 0);
        assert!(state.following_latest());
        assert!(!state.scroll_down(5));
    }

    #[test]
    fn offset_clamps_when_content_shrinks() {
        let mut state = state(500, 40);
        state.scroll_up(200);
        state.begin_render(100, 40);
        assert_eq!(state.offset, 60);
    }
}
