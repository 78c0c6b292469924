// エラーハンドリングの統合テスト
use crate::fixtures::{quadrant_sheet, TestEnv};
use tile_sheet::core::{ErrorSeverity, ImportOptions, TileError};

#[tokio::test]
async fn test_undecodable_files_are_skipped() {
    let env = TestEnv::new().await;
    let source = env.source_image("sheet.png", &quadrant_sheet());
    let source_dir = source.parent().unwrap().to_path_buf();
    std::fs::write(source_dir.join("broken.png"), b"NOT_A_PNG").unwrap();
    std::fs::write(source_dir.join("notes.txt"), b"ignored").unwrap();

    let mut engine = env.open_engine(None).await;
    let summary = engine
        .import_paths(
            &[source_dir],
            "terrain",
            32,
            32,
            &ImportOptions::new().with_skip_audit(true),
        )
        .await
        .unwrap();

    assert_eq!(summary.failed_sources, 1);
    assert_eq!(summary.inserted, 4);
}

#[tokio::test]
async fn test_missing_source_is_an_error() {
    let env = TestEnv::new().await;
    let mut engine = env.open_engine(None).await;

    let result = engine
        .import_paths(
            &[env.path().join("nope.png")],
            "terrain",
            32,
            32,
            &ImportOptions::new(),
        )
        .await;

    assert!(matches!(result, Err(TileError::Io { .. })));
}

#[tokio::test]
async fn test_invalid_arguments_are_rejected() {
    let env = TestEnv::new().await;
    let mut engine = env.open_engine(None).await;

    let zero = engine
        .import_sheet(vec![quadrant_sheet()], "terrain", 0, 32, &ImportOptions::new())
        .await;
    let blank = engine
        .import_sheet(vec![quadrant_sheet()], " ", 32, 32, &ImportOptions::new())
        .await;

    let zero = zero.unwrap_err();
    assert!(matches!(zero, TileError::InvalidGeometry { .. }));
    assert_eq!(zero.severity(), ErrorSeverity::High);
    assert!(matches!(blank, Err(TileError::InvalidSheetName { .. })));
    assert!(engine.list_sheet("terrain").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_removing_missing_index_reports_it() {
    let env = TestEnv::new().await;
    let mut engine = env.open_engine(None).await;
    engine
        .import_sheet(
            vec![quadrant_sheet()],
            "terrain",
            32,
            32,
            &ImportOptions::new().with_skip_audit(true),
        )
        .await
        .unwrap();

    let outcome = engine.remove_tiles("terrain", &[3, 9], &[]).await.unwrap();
    assert_eq!(outcome.removed, vec![3]);
    assert_eq!(outcome.missing, vec![9]);

    let result = engine.remove_tiles("terrain", &[42], &[]).await;
    assert!(matches!(result, Err(TileError::NotFound { .. })));
}
