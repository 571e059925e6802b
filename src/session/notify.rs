//! Transient user-visible messages.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// How long a notice stays on screen.
pub const NOTICE_TTL: Duration = Duration::from_secs(4);
const MAX_NOTICES: usize = 8;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Level {
    Info,
    Error,
}

#[derive(Clone, Debug)]
pub struct Notice {
    pub level: Level,
    pub message: String,
    pub created: Instant,
}

#[derive(Debug, Default)]
pub struct Notifications {
    notices: VecDeque<Notice>,
}

impl Notifications {
    pub fn info(&mut self, message: impl Into<String>) {
        self.push(Level::Info, message.into());
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.push(Level::Error, message.into());
    }

    fn push(&mut self, level: Level, message: String) {
        if self.notices.len() == MAX_NOTICES {
            self.notices.pop_front();
        }
        self.notices.push_back(Notice {
            level,
            message,
            created: Instant::now(),
        });
    }

    /// Most recent notice, if any.
    pub fn latest(&self) -> Option<&Notice> {
        self.notices.back()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Notice> {
        self.notices.iter()
    }

    pub fn errors(&self) -> impl Iterator<Item = &Notice> {
        self.notices.iter().filter(|n| n.level == Level::Error)
    }

    /// Drop notices older than [`NOTICE_TTL`].
    pub fn expire(&mut self, now: Instant) {
        self.notices
            .retain(|n| now.saturating_duration_since(n.created) < NOTICE_TTL);
    }

    pub fn clear(&mut self) {
        self.notices.clear();
    }
}
