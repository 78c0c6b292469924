// コアレイヤー - エラー定義と入出力の型

pub mod error;
pub mod types;

pub use error::{ErrorSeverity, TileError, TileResult};
pub use types::{ExportSummary, ImportOptions, ImportSummary, RemovalOutcome};
