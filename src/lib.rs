//! # Taskpulse
//!
//! A single-user task list with priorities, due dates and a rolling
//! completion history. Taskpulse combines a quick CLI for single actions with
//! a TUI dashboard showing the sorted list, overall progress and a 7-day
//! completion chart.
//!
//! The core is [`store::TaskStore`]: it owns the task list and the
//! [`ledger::StatsLedger`], writes both through a [`storage::PersistencePort`]
//! after every change and pushes a [`render::Snapshot`] to an optional
//! [`render::RenderPort`].
//!
//! ```
//! use taskpulse::models::Priority;
//! use taskpulse::storage::MemoryStore;
//! use taskpulse::store::TaskStore;
//!
//! let mut store = TaskStore::open(MemoryStore::new()).unwrap();
//! let index = store.create("Buy milk", Priority::High, None).unwrap();
//! store.toggle(index).unwrap();
//! assert_eq!(store.snapshot().progress, 100);
//! ```

pub mod clock;
pub mod commands;
pub mod error;
pub mod ledger;
pub mod migrate;
pub mod models;
pub mod ordering;
pub mod render;
pub mod storage;
pub mod store;
pub mod tui;
