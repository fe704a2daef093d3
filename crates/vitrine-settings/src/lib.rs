//! # vitrine-settings
//!
//! Layered configuration for the Vitrine realtime stack.
//!
//! Settings are loaded from three layers (in priority order):
//! 1. **Compiled defaults** — [`VitrineSettings::default()`]
//! 2. **User file** — `~/.vitrine/settings.json` (deep-merged over defaults)
//! 3. **Environment variables** — `VITRINE_*` overrides (highest priority)
//!
//! The realtime client itself takes its configuration by value — construct a
//! `RealtimeConfig` from [`RealtimeSettings`] (or by hand in tests) and inject
//! it. This crate only owns loading and layering.

#![deny(unsafe_code)]

pub mod errors;
pub mod loader;
pub mod types;

pub use errors::{Result, SettingsError};
pub use loader::{deep_merge, load_settings, load_settings_from_path, settings_path};
pub use types::*;
