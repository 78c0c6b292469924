// 統合テスト

#[path = "../fixtures/mod.rs"]
mod fixtures;

mod test_cli_commands;
mod test_end_to_end;
mod test_error_handling;
mod test_persistence;
