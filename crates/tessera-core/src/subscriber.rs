// SPDX-License-Identifier: Apache-2.0
//! Subscriber descriptors and effective-schema derivation.

use std::sync::Arc;

use tessera_schema::Schema;

use crate::ident::SubscriberId;

/// Field name under which paginated subscribers carry their page sequence.
pub(crate) const PAGES_FIELD: &str = "pages";

/// What kind of consumer produced a response, as a tagged capability variant.
///
/// Query-like subscribers are dependency-tracked: their skeleton is stored
/// and entity mutations push recomputed views back to them. Mutation-like
/// subscribers populate and refresh entities but are never tracked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscriberKind {
    /// A named query whose materialized view is kept live.
    Query {
        /// Whether the subscriber fetches further pages; paginated responses
        /// arrive wrapped in a page-sequence carrier object.
        paginated: bool,
    },
    /// A completed mutation whose response refreshes entities only.
    Mutation,
}

impl SubscriberKind {
    /// Whether responses of this kind register skeleton + dependencies.
    #[must_use]
    pub fn is_tracked(self) -> bool {
        matches!(self, Self::Query { .. })
    }

    /// Whether the declared schema must be wrapped in the page carrier.
    #[must_use]
    pub fn is_paginated(self) -> bool {
        matches!(self, Self::Query { paginated: true })
    }
}

/// A tracked consumer: stable id, kind, and declared response schema.
#[derive(Debug, Clone)]
pub struct Subscriber {
    /// Stable identity of this subscriber.
    pub id: SubscriberId,
    /// Capability variant (query-like vs mutation-like, paginated or not).
    pub kind: SubscriberKind,
    /// Declared schema of one response (one page, for paginated subscribers).
    pub schema: Arc<Schema>,
}

impl Subscriber {
    /// A plain (non-paginated) query-like subscriber.
    #[must_use]
    pub fn query(id: impl Into<SubscriberId>, schema: Schema) -> Self {
        Self {
            id: id.into(),
            kind: SubscriberKind::Query { paginated: false },
            schema: Arc::new(schema),
        }
    }

    /// A paginated query-like subscriber.
    #[must_use]
    pub fn paginated_query(id: impl Into<SubscriberId>, schema: Schema) -> Self {
        Self {
            id: id.into(),
            kind: SubscriberKind::Query { paginated: true },
            schema: Arc::new(schema),
        }
    }

    /// A mutation-like subscriber.
    #[must_use]
    pub fn mutation(id: impl Into<SubscriberId>, schema: Schema) -> Self {
        Self {
            id: id.into(),
            kind: SubscriberKind::Mutation,
            schema: Arc::new(schema),
        }
    }

    /// The schema actually used for this subscriber's responses.
    ///
    /// Paginated subscribers wrap the declared schema in a one-field carrier
    /// object whose `pages` field holds a sequence of pages. The same
    /// wrapping applies on ingest and on every later denormalization.
    #[must_use]
    pub fn effective_schema(&self) -> Schema {
        effective_schema(&self.schema, self.kind.is_paginated())
    }
}

/// Wraps `declared` in the page-sequence carrier when `paginated` holds.
pub(crate) fn effective_schema(declared: &Schema, paginated: bool) -> Schema {
    if paginated {
        Schema::object([(PAGES_FIELD, Schema::array(declared.clone()))])
    } else {
        declared.clone()
    }
}
