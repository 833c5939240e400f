// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-recipient durable message queues.
//!
//! Each message is one record in the recipient's mailbox scope, keyed by its
//! id. Ids sort in send order, so listing the scope yields the inbox in order.
//! A `clear` racing an in-flight `send` to the same recipient may or may not
//! remove the new message.

use crate::error::{Entity, MinionError};
use mn_core::{Clock, Message, MinionName};
use mn_storage::{MinionStore, Scope, Store, StoreError};

const MESSAGE_EXT: &str = ".json";

/// Sends, lists and clears messages between registered minions.
#[derive(Clone)]
pub struct Mailbox<S, C> {
    minions: MinionStore<S>,
    clock: C,
}

impl<S: Store, C: Clock> Mailbox<S, C> {
    pub fn new(store: S, clock: C) -> Self {
        Self {
            minions: MinionStore::new(store),
            clock,
        }
    }

    /// Deliver one message from `from` to `to`.
    pub fn send(&self, from: &str, to: &str, body: &str) -> Result<Message, MinionError> {
        let from = self.registered(from, Entity::Sender)?;
        let to = self.registered(to, Entity::Recipient)?;
        self.deliver(Message::new(from, to, body, self.clock.epoch_ms()))
    }

    /// All messages for `name`, oldest first.
    pub fn inbox(&self, name: &str) -> Result<Vec<Message>, MinionError> {
        self.registered(name, Entity::Recipient)?;
        let scope = Scope::mailbox(name);
        let mut messages = Vec::new();
        for key in self.message_keys(&scope)? {
            let Some(bytes) = self.minions.raw().get(&scope, &key)? else {
                continue;
            };
            match serde_json::from_slice::<Message>(&bytes) {
                Ok(message) => messages.push(message),
                Err(e) => {
                    tracing::warn!(recipient = name, key = %key, error = %e, "skipping unreadable message")
                }
            }
        }
        Ok(messages)
    }

    /// Send `body` to every other registered minion. Returns the sent messages.
    pub fn broadcast(&self, from: &str, body: &str) -> Result<Vec<Message>, MinionError> {
        let sender = self.registered(from, Entity::Sender)?;
        let mut sent = Vec::new();
        for name in self.minions.names()? {
            if name == from {
                continue;
            }
            let to = MinionName::parse(name)?;
            sent.push(self.deliver(Message::new(
                sender.clone(),
                to,
                body,
                self.clock.epoch_ms(),
            ))?);
        }
        tracing::info!(from, recipients = sent.len(), "broadcast");
        Ok(sent)
    }

    /// Delete every message for `name`. Returns how many were removed.
    pub fn clear(&self, name: &str) -> Result<usize, MinionError> {
        self.registered(name, Entity::Recipient)?;
        let scope = Scope::mailbox(name);
        let mut cleared = 0;
        for key in self.message_keys(&scope)? {
            if self.minions.raw().delete(&scope, &key)? {
                cleared += 1;
            }
        }
        tracing::debug!(recipient = name, cleared, "cleared mailbox");
        Ok(cleared)
    }

    /// Number of messages waiting for `name`. Zero for unknown names.
    pub fn count(&self, name: &str) -> Result<usize, MinionError> {
        if MinionName::parse(name).is_err() {
            return Ok(0);
        }
        Ok(self.message_keys(&Scope::mailbox(name))?.len())
    }

    fn deliver(&self, message: Message) -> Result<Message, MinionError> {
        let json = serde_json::to_vec(&message).map_err(|source| StoreError::Corrupt {
            key: message.id.to_string(),
            source,
        })?;
        let key = format!("{}{}", message.id, MESSAGE_EXT);
        self.minions
            .raw()
            .put(&Scope::mailbox(message.to.as_str()), &key, &json)?;
        tracing::debug!(from = %message.from, to = %message.to, id = %message.id, "sent");
        Ok(message)
    }

    fn message_keys(&self, scope: &Scope) -> Result<Vec<String>, MinionError> {
        Ok(self
            .minions
            .raw()
            .list_keys(scope)?
            .into_iter()
            .filter(|key| key.ends_with(MESSAGE_EXT))
            .collect())
    }

    fn registered(&self, name: &str, kind: Entity) -> Result<MinionName, MinionError> {
        let parsed =
            MinionName::parse(name).map_err(|_| MinionError::not_found(kind, name))?;
        if !self.minions.exists(name)? {
            return Err(MinionError::not_found(kind, name));
        }
        Ok(parsed)
    }
}

#[cfg(test)]
#[path = "mailbox_tests.rs"]
mod tests;
