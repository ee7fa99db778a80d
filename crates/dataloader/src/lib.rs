//! Deferred values and batched loading of external data.
//!
//! A [`Source`] describes how to fetch many keys at once. Within one execution a [`Dataloader`]
//! keeps a single [`BatchSource`] per source type and batch key, which queues requested keys and
//! hands out [`Lazy`] values. Nothing is fetched until one of those lazy values is synced, at
//! which point every pending key is fetched in one call.

mod lazy;
mod loader;
mod source;

pub use lazy::*;
pub use loader::*;
pub use source::{BatchSource, LoadError, LoadResult, Source};
