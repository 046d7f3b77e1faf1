//! # Repository Module
//!
//! SQL for each table, kept in one place per entity.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Two Ways In                                          │
//! │                                                                         │
//! │  Pool-level reads                  Transactional writes                │
//! │  db.lots().list()                  SqliteTx (store.rs)                  │
//! │       │                                 │                               │
//! │       ▼                                 ▼                               │
//! │  LotRepository::list(&self)        LotRepository::find(&mut conn, id)  │
//! │       │   acquires a connection         │   runs on the tx connection  │
//! │       └──────────────┬──────────────────┘                               │
//! │                      ▼                                                  │
//! │            same SQL, same COLUMNS                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The associated functions taking `&mut SqliteConnection` are what the
//! store's transaction uses, so every read feeding an admission decision
//! runs under the writer lock.
//!
//! ## Available Repositories
//!
//! - [`ClientRepository`] - Client registration and lookup
//! - [`LotRepository`] - Lots and their capacity state
//! - [`SessionRepository`] - Parking sessions and history

pub mod client;
pub mod lot;
pub mod session;

pub use client::ClientRepository;
pub use lot::LotRepository;
pub use session::SessionRepository;
