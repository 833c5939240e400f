// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Inter-minion messages.
//!
//! A message id is `<nanos>-<sender>-<suffix>`: a zero-padded, strictly
//! increasing nanosecond timestamp, the sender's name and a random suffix.
//! Ids sort lexicographically in send order, so they double as the mailbox
//! ordering key.

use crate::name::MinionName;
use rand::distr::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

crate::define_id! {
    /// Unique, send-ordered message identifier.
    pub struct MessageId;
}

const SUFFIX_LEN: usize = 6;

static LAST_NANOS: AtomicU64 = AtomicU64::new(0);

/// Nanoseconds since the epoch, bumped so no two calls in this process return
/// the same value.
fn monotonic_nanos() -> u64 {
    let wall = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos() as u64;
    let mut last = LAST_NANOS.load(Ordering::Relaxed);
    loop {
        let next = wall.max(last + 1);
        match LAST_NANOS.compare_exchange_weak(last, next, Ordering::SeqCst, Ordering::Relaxed) {
            Ok(_) => return next,
            Err(observed) => last = observed,
        }
    }
}

impl MessageId {
    /// Allocate a fresh id for a message from `sender`.
    pub fn generate(sender: &MinionName) -> Self {
        let suffix: String = rand::rng()
            .sample_iter(&Alphanumeric)
            .take(SUFFIX_LEN)
            .map(char::from)
            .collect();
        Self(format!("{:020}-{}-{}", monotonic_nanos(), sender, suffix))
    }
}

/// One immutable message in a recipient's mailbox.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub from: MinionName,
    pub to: MinionName,
    pub body: String,
    pub timestamp_ms: u64,
}

impl Message {
    pub fn new(from: MinionName, to: MinionName, body: impl Into<String>, timestamp_ms: u64) -> Self {
        Self {
            id: MessageId::generate(&from),
            from,
            to,
            body: body.into(),
            timestamp_ms,
        }
    }
}

#[cfg(test)]
#[path = "message_tests.rs"]
mod tests;
