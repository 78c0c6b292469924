// CLIコマンドの統合テスト
use crate::fixtures::{quadrant_sheet, quadrants, TestEnv};
use tile_sheet::cli::{
    execute_add, execute_config, execute_list, execute_remove, execute_write, AddConfig,
    ConfigChanges, REJECTED_DIR_NAME,
};
use tile_sheet::config::AppConfig;

fn add_config(env: &TestEnv, src: std::path::PathBuf, name: &str) -> AddConfig {
    AddConfig {
        config_path: env.config_path.clone(),
        src,
        name: name.to_string(),
        tile_width: 32,
        tile_height: 32,
        output_path: None,
        tags: vec!["Floor".to_string()],
        skip_validation: false,
        skip_audit: true,
        preview: false,
        quiet: true,
    }
}

#[tokio::test]
async fn test_add_list_remove_write_workflow() {
    let env = TestEnv::new().await;
    let src = env.source_image("terrain.png", &quadrant_sheet());

    execute_add(add_config(&env, src.clone(), "terrain"))
        .await
        .unwrap();

    // 取り込み時に設定の出力先へ書き出される
    let sheet_dir = env.output().join("terrain");
    assert!(sheet_dir.join("terrain-04.png").exists());

    execute_list(&env.config_path, "terrain", false).await.unwrap();
    execute_remove(&env.config_path, "terrain", &[1], &[])
        .await
        .unwrap();

    let export_dir = env.path().join("export");
    execute_write(&env.config_path, Some(export_dir.clone()), None)
        .await
        .unwrap();

    let [first, _, third, fourth] = quadrants();
    let dir = export_dir.join("terrain");
    let read = |n: u32| {
        image::open(dir.join(format!("terrain-0{n}.png")))
            .unwrap()
            .to_rgba8()
    };
    assert_eq!(read(1), first);
    assert_eq!(read(2), third);
    assert_eq!(read(3), fourth);
    assert!(!dir.join("terrain-04.png").exists());

    let engine = env.open_engine(None).await;
    let tiles = engine.list_sheet("terrain").await.unwrap();
    assert!(tiles.iter().all(|t| t.tags().contains("floor")));
}

#[tokio::test]
async fn test_add_writes_rejected_tiles_under_output() {
    let env = TestEnv::new().await;
    let src = env.source_image("terrain.png", &quadrant_sheet());

    execute_add(add_config(&env, src.clone(), "terrain"))
        .await
        .unwrap();
    execute_add(add_config(&env, src, "terrain")).await.unwrap();

    let dupes = env.output().join(REJECTED_DIR_NAME).join("Dupes").join("terrain");
    assert_eq!(std::fs::read_dir(dupes).unwrap().count(), 4);

    let engine = env.open_engine(None).await;
    assert_eq!(engine.list_sheet("terrain").await.unwrap().len(), 4);
}

#[tokio::test]
async fn test_add_missing_source_fails() {
    let env = TestEnv::new().await;
    let result = execute_add(add_config(&env, env.path().join("missing.png"), "terrain")).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_remove_requires_targets() {
    let env = TestEnv::new().await;
    let result = execute_remove(&env.config_path, "terrain", &[], &[]).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_config_command_persists_changes() {
    let env = TestEnv::new().await;

    execute_config(
        &env.config_path,
        ConfigChanges {
            fingerprint_in_filenames: Some(true),
            clear_output: Some(true),
            ..ConfigChanges::default()
        },
    )
    .await
    .unwrap();

    let config = AppConfig::load_or_create(&env.config_path).await.unwrap();
    assert!(config.fingerprint_in_filenames);
    assert!(config.clear_output);
    assert_eq!(config.db_path, env.config.db_path);

    // 変更なしなら表示のみ
    execute_config(&env.config_path, ConfigChanges::default())
        .await
        .unwrap();
    let unchanged = AppConfig::load_or_create(&env.config_path).await.unwrap();
    assert_eq!(unchanged, config);
}
