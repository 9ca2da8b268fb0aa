#![allow(dead_code)]

pub mod publisher;
pub mod searcher;
pub mod store;
pub mod synthesizer;
pub mod writer;
