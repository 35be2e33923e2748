// src/app/state.rs

use std::collections::VecDeque;
use std::time::Duration;

use crate::engine::Notice;
use crate::ui::UI_CONFIG;
use crate::utils::AppInstant;

/// A notice plus the moment it went up.
#[derive(Debug, Clone)]
pub(crate) struct TimedNotice {
    pub(crate) notice: Notice,
    pub(crate) shown_at: AppInstant,
}

/// Transient toast queue. Oldest entries fall off first, either by age or when the board is full.
#[derive(Debug)]
pub(crate) struct NoticeBoard {
    entries: VecDeque<TimedNotice>,
    ttl: Duration,
    capacity: usize,
}

impl Default for NoticeBoard {
    fn default() -> Self {
        Self::new(UI_CONFIG.notice_ttl, UI_CONFIG.max_notices)
    }
}

impl NoticeBoard {
    pub(crate) fn new(ttl: Duration, capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            ttl,
            capacity: capacity.max(1),
        }
    }

    pub(crate) fn push(&mut self, notice: Notice) {
        self.push_at(notice, AppInstant::now());
    }

    fn push_at(&mut self, notice: Notice, shown_at: AppInstant) {
        // Same text twice in a row just restarts the timer.
        if let Some(last) = self.entries.back_mut() {
            if last.notice == notice {
                last.shown_at = shown_at;
                return;
            }
        }
        while self.entries.len() >= self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(TimedNotice { notice, shown_at });
    }

    /// Drop expired notices. Returns true while anything is still visible.
    pub(crate) fn expire(&mut self, now: AppInstant) -> bool {
        let ttl = self.ttl;
        self.entries
            .retain(|e| now.saturating_duration_since(e.shown_at) < ttl);
        !self.entries.is_empty()
    }

    pub(crate) fn dismiss(&mut self, index: usize) {
        self.entries.remove(index);
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &TimedNotice> {
        self.entries.iter()
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn ttl(&self) -> Duration {
        self.ttl
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::NoticeLevel;

    #[test]
    fn notices_expire_after_ttl() {
        let mut board = NoticeBoard::new(Duration::from_secs(4), 4);
        let t0 = AppInstant::now();
        board.push_at(Notice::new(NoticeLevel::Info, "hello"), t0);
        assert!(board.expire(t0 + Duration::from_secs(3)));
        assert!(!board.expire(t0 + Duration::from_secs(4)));
        assert_eq!(board.len(), 0);
    }

    #[test]
    fn full_board_drops_oldest() {
        let mut board = NoticeBoard::new(Duration::from_secs(4), 2);
        let t0 = AppInstant::now();
        for text in ["a", "b", "c"] {
            board.push_at(Notice::new(NoticeLevel::Warning, text), t0);
        }
        let texts: Vec<_> = board.iter().map(|e| e.notice.text.as_str()).collect();
        assert_eq!(texts, vec!["b", "c"]);
    }

    #[test]
    fn repeated_notice_restarts_timer() {
        let mut board = NoticeBoard::new(Duration::from_secs(4), 4);
        let t0 = AppInstant::now();
        let warn = Notice::new(NoticeLevel::Warning, "Still checking FVG…");
        board.push_at(warn.clone(), t0);
        board.push_at(warn, t0 + Duration::from_secs(3));
        assert_eq!(board.len(), 1);
        assert!(board.expire(t0 + Duration::from_secs(5)));
    }
}
