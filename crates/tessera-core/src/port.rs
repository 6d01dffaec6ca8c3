// SPDX-License-Identifier: Apache-2.0
//! Delivery port back into the host's fetching layer.

use serde_json::Value;

use crate::ident::SubscriberId;

/// Callback surface through which recomputed subscriber views leave the core.
///
/// The host's fetch-cache collaborator implements this with its per-subscriber
/// "set data" operation. The core only calls it when a subscriber's
/// materialized view actually changed, so implementations need no equality
/// guard of their own.
pub trait SubscriberPort {
    /// Pushes the freshly denormalized view for `subscriber`.
    fn deliver(&mut self, subscriber: &SubscriberId, view: &Value);
}

/// Port that drops every delivery; useful for preload-only or write-only
/// cache instances.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullPort;

impl SubscriberPort for NullPort {
    fn deliver(&mut self, _subscriber: &SubscriberId, _view: &Value) {}
}
