//! # Cardigan Architecture
//!
//! Cardigan is a **card-deck engine for a fill-in-the-blank party game**. Each
//! deck holds prompt cards (phrases with blanks) and fill cards (answers), and a
//! round pairs one prompt with as many fills as it has blanks.
//!
//! Like any chat-bot backend it is a library first. The binary in `main.rs`
//! stands in for the chat transport: it takes one command, prints one reply.
//!
//! ## Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Transport (main.rs + args.rs, or a chat webhook)           │
//! │  - Reads the request, writes the reply, picks exit codes    │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Dispatch (dispatch.rs, reply.rs, gate.rs)                  │
//! │  - Routes command text, checks the session token            │
//! │  - Turns results and errors into a Reply                    │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API Layer (api.rs)                                         │
//! │  - Thin facade over commands                                │
//! │  - Normalizes inputs (P7, F2-F4 → CardIds)                  │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Command Layer (commands/*.rs)                              │
//! │  - Pure business logic, returns CmdResult                   │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Storage Layer (store/)                                     │
//! │  - DeckStore trait                                          │
//! │  - SqliteStore (production), InMemoryStore (testing)        │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Nothing below the transport writes to stdout or exits the process. Errors
//! travel as [`error::CardError`] until dispatch turns them into replies.
//!
//! ## Module Overview
//!
//! - [`api`]: The API facade and [`api::open_deck`]
//! - [`commands`]: Draw, deal, add, edit, search, status
//! - [`dispatch`]: Command-text routing
//! - [`reply`]: The reply envelope
//! - [`gate`]: Per-deck session token
//! - [`store`]: Storage abstraction and implementations
//! - [`model`]: Card types
//! - [`index`]: Kind-prefixed card ids (`P7`, `F12`)
//! - [`text`]: Blank normalization and round rendering
//! - [`config`]: Configuration management
//! - [`error`]: Error types

pub mod api;
pub mod commands;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod gate;
pub mod index;
pub mod model;
pub mod reply;
pub mod store;
pub mod text;
