// SPDX-License-Identifier: Apache-2.0
//! tessera-schema: declarative response schemas and the normalize/denormalize
//! transforms built on them.
//!
//! A [`Schema`] mirrors the shape of a fetched response: objects with named
//! fields, ordered arrays, and entity references. [`normalize`] walks a raw
//! response against its schema and splits it into an identifier-shaped
//! skeleton plus flat per-type entity fragments; [`denormalize`] rebuilds the
//! nested response from a skeleton and an [`EntityLookup`] capability.
#![forbid(unsafe_code)]
#![deny(missing_docs, rust_2018_idioms, unused_must_use)]

mod denormalize;
mod error;
mod id;
mod normalize;
mod schema;

pub use denormalize::{denormalize, EntityLookup};
pub use error::SchemaError;
pub use id::EntityId;
pub use normalize::{normalize, EntityFragments, Normalized};
pub use schema::{EntitySchema, IdExtractor, Schema};
