// 7.0: toast queue. a notification is visible for `visible_ms`, then exiting for
// `exit_ms`, then gone. dismissing skips straight to exiting.
// the queue runs on the terminal clock, callers drive it with tick(now).

use crate::i18n::{Language, MessageKey};
use crate::types::Timestamp;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NotificationId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Success,
    Error,
    Info,
    Warning,
    Liquidation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Visible,
    Exiting { since: Timestamp },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: NotificationId,
    pub kind: NotificationKind,
    pub title: String,
    pub body: String,
    pub created_at: Timestamp,
    pub phase: Phase,
}

impl Notification {
    pub fn is_exiting(&self) -> bool {
        matches!(self.phase, Phase::Exiting { .. })
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct NotificationTimings {
    pub visible_ms: i64,
    pub exit_ms: i64,
}

impl Default for NotificationTimings {
    fn default() -> Self {
        Self {
            visible_ms: 3_000,
            exit_ms: 300,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NotificationQueue {
    timings: NotificationTimings,
    items: Vec<Notification>,
    next_id: u64,
}

impl NotificationQueue {
    pub fn new(timings: NotificationTimings) -> Self {
        Self {
            timings,
            items: Vec::new(),
            next_id: 1,
        }
    }

    // 7.1: oldest first, same order they stack on screen
    pub fn push(
        &mut self,
        kind: NotificationKind,
        title: impl Into<String>,
        body: impl Into<String>,
        now: Timestamp,
    ) -> NotificationId {
        let id = NotificationId(self.next_id);
        self.next_id += 1;
        self.items.push(Notification {
            id,
            kind,
            title: title.into(),
            body: body.into(),
            created_at: now,
            phase: Phase::Visible,
        });
        id
    }

    pub fn push_message(
        &mut self,
        kind: NotificationKind,
        key: &MessageKey,
        lang: Language,
        now: Timestamp,
    ) -> NotificationId {
        self.push(kind, key.title(lang), key.body(lang), now)
    }

    // 7.2: starts the exit early. unknown or already exiting ids are left alone
    pub fn dismiss(&mut self, id: NotificationId, now: Timestamp) {
        if let Some(n) = self.items.iter_mut().find(|n| n.id == id) {
            if n.phase == Phase::Visible {
                n.phase = Phase::Exiting { since: now };
            }
        }
    }

    // 7.3: advances phases. returns how many were removed
    pub fn tick(&mut self, now: Timestamp) -> usize {
        let NotificationTimings { visible_ms, exit_ms } = self.timings;

        for n in &mut self.items {
            if n.phase == Phase::Visible && now.as_millis() - n.created_at.as_millis() >= visible_ms {
                n.phase = Phase::Exiting {
                    since: n.created_at.plus_millis(visible_ms),
                };
            }
        }

        let before = self.items.len();
        self.items.retain(|n| match n.phase {
            Phase::Exiting { since } => now.as_millis() - since.as_millis() < exit_ms,
            Phase::Visible => true,
        });
        before - self.items.len()
    }

    pub fn active(&self) -> &[Notification] {
        &self.items
    }

    pub fn latest(&self) -> Option<&Notification> {
        self.items.last()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
