//! # Word Meaning
//!
//! An HTTP service answering Arabic word-meaning queries: synonyms,
//! antonyms and plurals.
//!
//! Queries are answered from a local SQLite lexicon when possible. On a miss
//! the service searches the web for the word and asks a generative model for
//! a single-word answer, using the search snippets as context.
//!
//! ## Architecture
//!
//! ```text
//!                 ┌──────────┐
//!   POST /analyze │ Resolver │
//!   ─────────────▶│          │──▶ validation (multi-word input)
//!                 └────┬─────┘
//!                      │
//!           ┌──────────┴──────────┐
//!           ▼                     ▼
//!     ┌───────────┐        ┌─────────────┐   ┌────────────┐
//!     │  Lexicon  │        │ Web search  │──▶│ Completion │──▶ normalize
//!     │ (SQLite)  │        │  (Tavily)   │   │  (Gemini)  │
//!     └───────────┘        └─────────────┘   └────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! wm init                                   # create the lexicon tables
//! wm add synonyms سعيد "فرِح ; مبتهج"        # add an entry
//! wm lookup سعيد --type synonyms            # local lexicon only
//! wm analyze قلم --type plural              # full pipeline
//! wm serve                                  # start the HTTP API
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Relation types and response shapes |
//! | [`lexicon`] | Local lexicon store |
//! | [`normalize`] | Cleanup of generated answers |
//! | [`generation`] | Prompting and the generation provider |
//! | [`search`] | Web search provider and context building |
//! | [`resolve`] | The lookup → web fallback pipeline |
//! | [`server`] | HTTP API |
//! | [`db`] | Database connection |
//! | [`migrate`] | Table creation |
//! | [`stats`] | Lexicon statistics |

pub mod config;
pub mod db;
pub mod generation;
pub mod lexicon;
pub mod migrate;
pub mod models;
pub mod normalize;
pub mod resolve;
pub mod search;
pub mod server;
pub mod stats;
