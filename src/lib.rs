//! Kanban: a personal task tracker core.
//!
//! This crate models users, boards, and tasks, enforces the task stage
//! workflow, and persists the entity graph to local relational storage.
//!
//! # Architecture
//!
//! The tracker follows hexagonal architecture principles:
//!
//! - **Domain**: Validated entities and lifecycle guards with no storage
//!   dependencies
//! - **Ports**: The row-level storage contract
//! - **Adapters**: `SQLite` (via Diesel) and in-memory storage
//! - **Services**: The persistence gateway that maps entities to rows
//!
//! # Modules
//!
//! - [`tracker`]: Entities, lifecycle, persistence, and queries

pub mod tracker;
