//! Channel registry for SUBSCRIBE / PUBLISH.
//!
//! Publishing pushes the encoded message onto each subscriber's outbound queue while
//! the broker lock is held; the socket writes happen on the subscribers' writer tasks.

use std::collections::{BTreeSet, HashMap};

use bytes::Bytes;
use tokio::sync::mpsc;

use crate::{client::ClientId, resp::RespValue};

#[derive(Debug, Default)]
pub struct PubSubBroker {
    channels: HashMap<String, HashMap<ClientId, mpsc::UnboundedSender<Bytes>>>,
    subscriptions: HashMap<ClientId, BTreeSet<String>>,
}

impl PubSubBroker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `client` to `channel`. Returns the client's total number of subscriptions.
    pub fn subscribe(
        &mut self,
        client: ClientId,
        channel: &str,
        outbound: mpsc::UnboundedSender<Bytes>,
    ) -> usize {
        self.channels
            .entry(channel.to_string())
            .or_default()
            .insert(client, outbound);

        let subscribed = self.subscriptions.entry(client).or_default();
        subscribed.insert(channel.to_string());
        subscribed.len()
    }

    /// Removes `client` from `channel`, dropping the channel once nobody listens.
    /// Returns the client's remaining number of subscriptions.
    pub fn unsubscribe(&mut self, client: ClientId, channel: &str) -> usize {
        if let Some(subscribers) = self.channels.get_mut(channel) {
            subscribers.remove(&client);
            if subscribers.is_empty() {
                self.channels.remove(channel);
            }
        }

        let Some(subscribed) = self.subscriptions.get_mut(&client) else {
            return 0;
        };

        subscribed.remove(channel);
        let remaining = subscribed.len();
        if remaining == 0 {
            self.subscriptions.remove(&client);
        }

        remaining
    }

    /// Channels `client` is subscribed to, in name order.
    pub fn channels_of(&self, client: ClientId) -> Vec<String> {
        self.subscriptions
            .get(&client)
            .map(|channels| channels.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Delivers `message` to every current subscriber of `channel`.
    /// Returns the number of subscribers the message was handed to.
    pub fn publish(&mut self, channel: &str, message: &str) -> usize {
        let Some(subscribers) = self.channels.get_mut(channel) else {
            return 0;
        };

        let payload = Bytes::from(
            RespValue::array_of_bulk_strings(["message", channel, message]).encode(),
        );

        subscribers.retain(|_, outbound| outbound.send(payload.clone()).is_ok());
        let delivered = subscribers.len();

        if delivered == 0 {
            self.channels.remove(channel);
        }

        delivered
    }

    pub fn remove_client(&mut self, client: ClientId) {
        for channel in self.channels_of(client) {
            self.unsubscribe(client, &channel);
        }
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }
}
