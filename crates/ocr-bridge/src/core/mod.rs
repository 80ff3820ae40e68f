//! Core configuration for the bridge.
//!
//! The configuration is loaded once at startup, from an explicit file, a
//! discovered `ocr-bridge.toml`, or defaults, and then adjusted by
//! `OCR_BRIDGE_*` environment variables and CLI flags.

pub mod config;

pub use config::{BridgeConfig, Device, EngineConfig, ServerConfig};
