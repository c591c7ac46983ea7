//! WellSync Core: configuration, shared error type, fault domain entities.

pub mod config;
pub mod error;
pub mod fault;

pub use config::{DataPaths, ProviderConfig, SearchSettings, WellSyncConfig};
pub use error::{Error, Result};
pub use fault::{Asset, AssetKind, AssetRef, FaultRecord, NewFault};
