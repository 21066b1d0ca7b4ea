pub mod api;
pub mod controller;
pub mod error;
pub mod poll;
pub mod stats;
pub mod types;
pub mod wallet;
