//! Batchrun Core
//!
//! Core types shared by the Batchrun client and CLI.
//!
//! This crate contains:
//! - Domain types: launched jobs, lifecycle statuses, status reports
//! - DTOs: wire shapes of the job API payloads

pub mod domain;
pub mod dto;
