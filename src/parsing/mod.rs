//! Raw export document shapes.
//!
//! This module contains the serde types that mirror the source document and
//! the helpers that turn them into the typed [`RawMessage`](crate::RawMessage)
//! model used by every later stage.

pub mod telegram;

pub use telegram::{TelegramExport, TelegramRawMessage, extract_text_entities, parse_naive_date};
