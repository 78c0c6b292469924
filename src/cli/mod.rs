// CLI層 - コマンドライン引数の定義と各コマンドの実行

pub mod args;
pub mod commands;

pub use args::*;
pub use commands::*;
