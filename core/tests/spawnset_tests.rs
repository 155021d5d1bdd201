//! Spawnset files through editing, saving and the derived spawn view

use dagger_core::spawnset::{
    DefaultRules, EnemyType, GameMode, HandLevel, Spawn, SpawnsView, SpawnsetBinary, SpawnsetCommand,
    SpawnsetEditor,
};

#[test]
fn test_edit_save_reload() {
    let mut editor = SpawnsetEditor::new(SpawnsetBinary::default());
    editor
        .apply(SpawnsetCommand::InsertSpawns {
            index: 0,
            spawns: vec![
                Spawn::new(EnemyType::Squid1, 3.0),
                Spawn::new(EnemyType::Empty, 5.0),
                Spawn::new(EnemyType::Centipede, 10.0),
            ],
        })
        .unwrap();
    editor.apply(SpawnsetCommand::SetHandLevel(HandLevel::Level2)).unwrap();
    editor.apply(SpawnsetCommand::SetTimerStart(12.5)).unwrap();
    assert_eq!(editor.history().entries().len(), 4);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("v3-custom");
    std::fs::write(&path, editor.spawnset().to_bytes()).unwrap();

    let reloaded = SpawnsetBinary::parse(&std::fs::read(&path).unwrap()).unwrap();
    assert_eq!(&reloaded, editor.spawnset());
    assert_eq!(reloaded.hash(), editor.spawnset().hash());
    assert_eq!(reloaded.spawn_seconds(), vec![3.0, 8.0, 18.0]);
}

#[test]
fn test_undo_restores_saved_bytes() {
    let original = SpawnsetBinary::default();
    let mut editor = SpawnsetEditor::new(original.clone());

    editor.apply(SpawnsetCommand::SetGameMode(GameMode::Race)).unwrap();
    editor.apply(SpawnsetCommand::SetBrightness(10.0)).unwrap();
    editor.undo().unwrap();
    editor.undo().unwrap();
    assert_eq!(editor.spawnset(), &original);
    assert!(editor.undo().is_err());

    editor.redo().unwrap();
    assert_eq!(editor.spawnset().game_mode, GameMode::Race);
}

#[test]
fn test_view_over_loop() {
    let mut spawnset = SpawnsetBinary::default();
    spawnset.spawns = vec![
        Spawn::new(EnemyType::Squid2, 1.0),
        Spawn::new(EnemyType::Empty, 1.0),
        Spawn::new(EnemyType::Squid1, 8.0),
    ];

    let view = SpawnsView::new(&spawnset, &DefaultRules, 2);
    assert_eq!(view.pre_loop.len(), 2);
    assert_eq!(view.waves.len(), 2);
    // The second pass plays 1/8 faster
    assert!((view.waves[1][0].delay - 8.0 / 1.125).abs() < 1e-5);
    assert_eq!(view.total_no_farm_gems(), 4);
}
