//! タイルシートの切り出し・重複排除・インデックス管理
//!
//! シート画像をグリッドに分割し、空タイルと重複タイルを除外したうえで、
//! シートごとに連番インデックスを振ってドキュメントストアに保存する。

pub mod audit;
pub mod cli;
pub mod config;
pub mod core;
pub mod engine;
pub mod image_ops;
pub mod index;
pub mod reporting;
pub mod slicer;
pub mod source_scanner;
pub mod store;
pub mod tile;
pub mod validation;

pub use crate::config::{AppConfig, EngineConfig};
pub use crate::core::{TileError, TileResult};
pub use crate::engine::TileSheetEngine;
pub use crate::tile::Tile;
