//! Per-view controllers composing the codec, bindings and poller

pub mod keys;
pub mod message;
pub mod query;
pub mod single;
pub mod stores;
