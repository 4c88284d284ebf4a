//! Shared test harness: mock upstream and server wrapper

#![allow(dead_code)]

pub mod mock_upstream;
pub mod server;
