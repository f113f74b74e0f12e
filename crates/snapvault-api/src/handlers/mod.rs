//! HTTP request handlers for the snapvault API

pub mod pages;
pub mod upload;
