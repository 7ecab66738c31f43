use std::collections::VecDeque;

use log::debug;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::directory::UserId;

/// A pending friend request. Carries ids only — the inbox never owns
/// user records and knows nothing about friendship state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FriendRequest {
    pub from: UserId,
    pub to: UserId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SendError {
    #[error("request is already pending")]
    AlreadyPending,
}

/// FIFO inbox of pending friend requests, shared across all recipients.
///
/// A single queue rather than one per recipient: every query is an O(n)
/// scan, acceptable while pending volume stays small relative to user
/// count. Arrival order is preserved, so entries for any one recipient
/// are FIFO among themselves.
#[derive(Debug, Default)]
pub struct RequestInbox {
    queue: VecDeque<FriendRequest>,
}

impl RequestInbox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Exact-pair scan: (from, to) pending right now.
    pub fn exists(&self, from: UserId, to: UserId) -> bool {
        self.queue.iter().any(|r| r.from == from && r.to == to)
    }

    /// Append a request unless the same pair is already pending.
    pub fn send(&mut self, from: UserId, to: UserId) -> Result<(), SendError> {
        if self.exists(from, to) {
            return Err(SendError::AlreadyPending);
        }
        self.queue.push_back(FriendRequest { from, to });
        Ok(())
    }

    /// Bulk restore from (from, to) pairs. Shares `send`'s dedup logic;
    /// duplicate rows are skipped, never fatal.
    pub fn load_requests<I>(&mut self, requests: I)
    where
        I: IntoIterator<Item = (UserId, UserId)>,
    {
        for (from, to) in requests {
            if let Err(e) = self.send(from, to) {
                debug!("skipping request {}->{}: {}", from, to, e);
            }
        }
    }

    /// Pending requests addressed to `recipient`, oldest first. Does not
    /// mutate the inbox.
    pub fn pending_for(&self, recipient: UserId) -> impl Iterator<Item = &FriendRequest> {
        self.queue.iter().filter(move |r| r.to == recipient)
    }

    /// Remove and return the earliest pending request addressed to
    /// `recipient`. This is the sole accept path; turning the returned
    /// pair into a friendship edge is the caller's job.
    pub fn pop_first_for(&mut self, recipient: UserId) -> Option<FriendRequest> {
        let pos = self.queue.iter().position(|r| r.to == recipient)?;
        self.queue.remove(pos)
    }

    /// Full pending list in arrival order — the snapshot an external
    /// persistence collaborator serializes.
    pub fn requests(&self) -> impl Iterator<Item = &FriendRequest> {
        self.queue.iter()
    }
}
