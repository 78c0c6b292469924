// DBファイルへの永続化のテスト
use crate::fixtures::{quadrant_sheet, quadrants, TestEnv};
use tile_sheet::core::ImportOptions;
use tile_sheet::store::{DocumentStore, Filter, JsonLinesDocumentStore};
use tile_sheet::tile::TileRecord;

#[tokio::test]
async fn test_tiles_survive_reopen() {
    let env = TestEnv::new().await;
    {
        let mut engine = env.open_engine(None).await;
        engine
            .import_sheet(
                vec![quadrant_sheet()],
                "terrain",
                32,
                32,
                &ImportOptions::new()
                    .with_skip_audit(true)
                    .with_tags(vec!["grass".to_string()]),
            )
            .await
            .unwrap();
        engine.remove_tiles("terrain", &[0], &[]).await.unwrap();
    }

    let engine = env.open_engine(None).await;
    let tiles = engine.list_sheet("terrain").await.unwrap();

    assert_eq!(tiles.len(), 3);
    let [_, second, third, fourth] = quadrants();
    assert_eq!(tiles[0].pixels(), &second);
    assert_eq!(tiles[1].pixels(), &third);
    assert_eq!(tiles[2].pixels(), &fourth);
    for (i, tile) in tiles.iter().enumerate() {
        assert_eq!(tile.index(), Some(i as u32));
        assert!(tile.tags().contains("grass"));
    }
}

#[tokio::test]
async fn test_db_file_holds_one_record_per_line() {
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

    let content = std::fs::read_to_string(env.config.db_file()).unwrap();
    let lines: Vec<_> = content.lines().filter(|l| !l.is_empty()).collect();
    assert_eq!(lines.len(), 4);

    let store = JsonLinesDocumentStore::open(env.config.db_file())
        .await
        .unwrap();
    let documents = store
        .find(&Filter::all().eq("sheetName", "terrain"))
        .await
        .unwrap();
    let record = TileRecord::from_document(documents[0].clone()).unwrap();
    assert_eq!((record.width, record.height), (32, 32));
    assert_eq!(record.hash.len(), 11);
}

#[tokio::test]
async fn test_corrupt_db_line_is_an_error() {
    let env = TestEnv::new().await;
    std::fs::create_dir_all(&env.config.db_path).unwrap();
    std::fs::write(env.config.db_file(), "{\"sheetName\": \"a\"}\nnot json\n").unwrap();

    let result = JsonLinesDocumentStore::open(env.config.db_file()).await;
    assert!(result.is_err());
}
