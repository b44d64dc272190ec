use std::collections::{HashMap, HashSet};

use crate::broker::registry::ClientId;

/// Channel membership: which client ids receive a broadcast scoped to a
/// channel name.
///
/// Channels are created implicitly on first subscription and never explicitly
/// destroyed; a channel whose last member leaves persists as an empty entry.
/// There is deliberately no client-facing unsubscribe, membership ends only
/// when the member's session ends, via `remove_everywhere`.
///
/// A reverse index (id to the set of channels it joined) keeps disconnect
/// cleanup proportional to the channels the id is actually in, instead of a
/// scan over every channel.
#[derive(Debug, Default)]
pub struct SubscriptionIndex {
    channels: HashMap<String, HashSet<ClientId>>,
    memberships: HashMap<ClientId, HashSet<String>>,
}

impl SubscriptionIndex {
    pub fn new() -> Self {
        Self {
            channels: HashMap::new(),
            memberships: HashMap::new(),
        }
    }

    /// Adds `id` to the member set of `channel`, creating the channel if
    /// absent. Subscribing twice has no additional effect.
    pub fn subscribe(&mut self, id: &str, channel: &str) {
        self.channels
            .entry(channel.to_string())
            .or_default()
            .insert(id.to_string());
        self.memberships
            .entry(id.to_string())
            .or_default()
            .insert(channel.to_string());
    }

    /// The member set of `channel`; empty if the channel is unknown.
    pub fn members_of(&self, channel: &str) -> HashSet<ClientId> {
        self.channels.get(channel).cloned().unwrap_or_default()
    }

    /// Removes `id` from every channel it joined. Called on disconnect so
    /// that member sets only ever name live sessions.
    pub fn remove_everywhere(&mut self, id: &str) {
        let Some(joined) = self.memberships.remove(id) else {
            return;
        };
        for channel in joined {
            if let Some(members) = self.channels.get_mut(&channel) {
                members.remove(id);
            }
        }
    }

    pub fn is_subscribed(&self, id: &str, channel: &str) -> bool {
        self.channels
            .get(channel)
            .is_some_and(|members| members.contains(id))
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }
}
