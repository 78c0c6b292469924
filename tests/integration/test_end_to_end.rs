// エンドツーエンド統合テスト
use crate::fixtures::{
    checker, quadrant_sheet, quadrants, solid_quadrant_sheet, solid_quadrants, TestEnv,
};
use tile_sheet::core::{ImportOptions, TileError};

fn auto_options() -> ImportOptions {
    ImportOptions::new().with_skip_audit(true)
}

#[tokio::test]
async fn test_import_then_remove_keeps_indices_contiguous() {
    let env = TestEnv::new().await;
    let mut engine = env.open_engine(None).await;

    let summary = engine
        .import_sheet(vec![quadrant_sheet()], "terrain", 32, 32, &auto_options())
        .await
        .unwrap();
    assert_eq!(summary.sliced, 4);
    assert_eq!(summary.inserted, 4);

    let outcome = engine.remove_tiles("terrain", &[1], &[]).await.unwrap();
    assert_eq!(outcome.removed, vec![1]);
    assert!(outcome.missing.is_empty());

    let tiles = engine.list_sheet("terrain").await.unwrap();
    let indices: Vec<_> = tiles.iter().map(|t| t.index()).collect();
    assert_eq!(indices, vec![Some(0), Some(1), Some(2)]);

    let [first, _, third, fourth] = quadrants();
    assert_eq!(tiles[0].pixels(), &first);
    assert_eq!(tiles[1].pixels(), &third);
    assert_eq!(tiles[2].pixels(), &fourth);
}

#[tokio::test]
async fn test_unvalidated_import_keeps_tiles_with_same_fingerprint() {
    let env = TestEnv::new().await;
    let mut engine = env.open_engine(None).await;

    let summary = engine
        .import_sheet(
            vec![solid_quadrant_sheet()],
            "solid",
            32,
            32,
            &auto_options().with_skip_validation(true),
        )
        .await
        .unwrap();
    assert_eq!(summary.inserted, 4);
    assert_eq!(summary.merged, 0);

    let tiles = engine.list_sheet("solid").await.unwrap();
    assert!(tiles.iter().all(|t| t.fingerprint() == tiles[0].fingerprint()));
    let indices: Vec<_> = tiles.iter().map(|t| t.index()).collect();
    assert_eq!(indices, vec![Some(0), Some(1), Some(2), Some(3)]);

    engine.remove_tiles("solid", &[1], &[]).await.unwrap();

    let tiles = engine.list_sheet("solid").await.unwrap();
    let indices: Vec<_> = tiles.iter().map(|t| t.index()).collect();
    assert_eq!(indices, vec![Some(0), Some(1), Some(2)]);

    let [red, _, blue, yellow] = solid_quadrants();
    let colours: Vec<_> = tiles.iter().map(|t| *t.pixels().get_pixel(0, 0)).collect();
    assert_eq!(colours, vec![red, blue, yellow]);
}

#[tokio::test]
async fn test_reimport_writes_duplicates_for_inspection() {
    let env = TestEnv::new().await;
    let inspection = env.path().join("Rejected");
    let mut engine = env.open_engine(Some(inspection.clone())).await;

    engine
        .import_sheet(vec![quadrant_sheet()], "terrain", 32, 32, &auto_options())
        .await
        .unwrap();
    let summary = engine
        .import_sheet(vec![quadrant_sheet()], "terrain", 32, 32, &auto_options())
        .await
        .unwrap();

    assert_eq!(summary.duplicates_rejected, 4);
    assert_eq!(summary.inserted, 0);
    assert_eq!(engine.list_sheet("terrain").await.unwrap().len(), 4);

    // 新しいタイルはインデックスがないのでフィンガープリントで、既存タイルはインデックスで名付けられる
    let dupes = inspection.join("Dupes").join("terrain");
    let pairs: Vec<_> = std::fs::read_dir(&dupes).unwrap().collect();
    assert_eq!(pairs.len(), 4);
    for pair in pairs {
        let pair = pair.unwrap().path();
        let files: Vec<_> = std::fs::read_dir(&pair).unwrap().collect();
        assert_eq!(files.len(), 2, "{}", pair.display());
    }
}

#[tokio::test]
async fn test_sheets_are_indexed_independently() {
    let env = TestEnv::new().await;
    let mut engine = env.open_engine(None).await;

    engine
        .import_sheet(vec![quadrant_sheet()], "terrain", 32, 32, &auto_options())
        .await
        .unwrap();
    let summary = engine
        .import_sheet(vec![checker(32, 16, false)], "items", 32, 32, &auto_options())
        .await
        .unwrap();

    // 別シートの同じ画像は重複扱いしない
    assert_eq!(summary.inserted, 1);
    let items = engine.list_sheet("items").await.unwrap();
    assert_eq!(items[0].index(), Some(0));
    assert_eq!(engine.list_sheet("terrain").await.unwrap().len(), 4);
}

#[tokio::test]
async fn test_tags_merge_into_existing_tile() {
    let env = TestEnv::new().await;
    let mut engine = env.open_engine(None).await;

    engine
        .import_sheet(
            vec![quadrant_sheet()],
            "terrain",
            32,
            32,
            &auto_options().with_tags(vec!["Ground".to_string()]),
        )
        .await
        .unwrap();
    let summary = engine
        .import_sheet(
            vec![checker(32, 4, false)],
            "terrain",
            32,
            32,
            &auto_options()
                .with_skip_validation(true)
                .with_tags(vec!["edge".to_string()]),
        )
        .await
        .unwrap();

    assert_eq!(summary.merged, 1);
    assert_eq!(summary.inserted, 0);

    let tiles = engine.list_sheet("terrain").await.unwrap();
    assert_eq!(tiles.len(), 4);
    let tags: Vec<_> = tiles[2].tags().iter().cloned().collect();
    assert_eq!(tags, vec!["edge", "ground"]);
    assert_eq!(tiles[0].tags().len(), 1);
}

#[tokio::test]
async fn test_import_exports_sheet_directory() {
    let env = TestEnv::new().await;
    let mut engine = env.open_engine(None).await;

    let summary = engine
        .import_sheet(
            vec![quadrant_sheet()],
            "Dungeon Walls",
            32,
            32,
            &auto_options().with_export_path(env.output()),
        )
        .await
        .unwrap();

    assert_eq!(summary.exported, Some(4));
    let dir = env.output().join("Dungeon-Walls");
    for n in 1..=4 {
        assert!(dir.join(format!("Dungeon-Walls-0{n}.png")).exists());
    }
    let fourth = image::open(dir.join("Dungeon-Walls-04.png"))
        .unwrap()
        .to_rgba8();
    assert_eq!(fourth, quadrants()[3]);
}

#[tokio::test]
async fn test_remove_by_fingerprint_only() {
    let env = TestEnv::new().await;
    let mut engine = env.open_engine(None).await;
    engine
        .import_sheet(vec![quadrant_sheet()], "terrain", 32, 32, &auto_options())
        .await
        .unwrap();

    let tiles = engine.list_sheet("terrain").await.unwrap();
    let fingerprint = tiles[0].fingerprint().to_string();

    let outcome = engine
        .remove_tiles("terrain", &[], &[fingerprint])
        .await
        .unwrap();
    assert_eq!(outcome.removed, vec![0]);

    let result = engine
        .remove_tiles("terrain", &[], &["zzzzzzzzzzz".to_string()])
        .await;
    assert!(matches!(result, Err(TileError::NotFound { .. })));
}
