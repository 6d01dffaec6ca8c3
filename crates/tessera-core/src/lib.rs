// SPDX-License-Identifier: Apache-2.0
//! tessera-core: reactive entity-normalized cache beneath a request/response
//! fetching layer.
//!
//! Responses fetched by named subscribers are normalized into flat per-type
//! entity tables; each subscriber retains only an identifier-shaped skeleton
//! of its response. Every write or delete to the entity table goes through a
//! single choke point that recomputes the materialized view of each dependent
//! subscriber and delivers it through the [`SubscriberPort`] only when the
//! view actually changed. Entity records are garbage-collected when their
//! last dependent subscriber goes away.
#![forbid(unsafe_code)]
#![deny(missing_docs, rust_2018_idioms, unused_must_use)]

mod cache;
mod delete;
mod deps;
mod event;
mod ident;
mod port;
mod subscriber;
mod table;

pub use cache::EntityCache;
pub use deps::DependencyIndex;
pub use event::{EntityEvent, EventMapper, EventMapping};
pub use ident::{EntityKey, SubscriberId};
pub use port::{NullPort, SubscriberPort};
pub use subscriber::{Subscriber, SubscriberKind};
pub use table::EntityTable;
