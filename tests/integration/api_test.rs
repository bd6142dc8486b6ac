//! API endpoint integration tests
//!
//! Drives the composed router end to end: chat turns, thread listing,
//! history retrieval, deletion and authentication.

#![allow(dead_code)]

mod auth;
mod chat;
mod common;
mod conversations;
mod messages;
