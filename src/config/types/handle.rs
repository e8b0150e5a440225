//! Global config handle.
//!
//! Uses `arc-swap` for lock-free reads from the adapters. Until a config is
//! installed with [`init_config`], readers see `TesseraConfig::default()`.

use crate::config::TesseraConfig;
use arc_swap::ArcSwap;
use std::sync::{Arc, LazyLock};

/// Global config storage.
pub static CONFIG: LazyLock<ArcSwap<TesseraConfig>> =
    LazyLock::new(|| ArcSwap::from_pointee(TesseraConfig::default()));

#[inline]
pub fn cfg() -> Arc<TesseraConfig> {
    CONFIG.load_full()
}

#[inline]
pub fn init_config(config: TesseraConfig) -> Arc<TesseraConfig> {
    let arc = Arc::new(config);
    CONFIG.store(Arc::clone(&arc));
    arc
}
