// SPDX-License-Identifier: Apache-2.0
//! Normalization failure conditions.

use thiserror::Error;

/// Error returned when a raw response cannot be normalized against its
/// declared schema.
///
/// These are boundary failures, not cache-state failures: the cache core
/// treats any of them as "not normalizable" and skips entity tracking for
/// that response rather than surfacing an error to the host.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// An entity or object slot held a value that is not a JSON object.
    #[error("expected an object for schema slot")]
    ExpectedObject,
    /// An array slot held a value that is not a JSON array.
    #[error("expected an array for schema slot")]
    ExpectedArray,
    /// The id extractor found nothing usable on an entity record.
    #[error("no usable id on entity record of type `{key}`")]
    MissingId {
        /// Entity type whose record lacked an id.
        key: String,
    },
}
