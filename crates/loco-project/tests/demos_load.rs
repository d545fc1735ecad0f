use std::path::PathBuf;

#[test]
fn demo_projects_load_and_validate() {
    let crate_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    let root = crate_dir
        .parent()
        .and_then(|p| p.parent())
        .expect("workspace root");

    let demos = [
        "demos/projects/01_standing_in_steam.yaml",
        "demos/projects/02_express_run.yaml",
        "demos/projects/03_cold_start.yaml",
    ];

    for rel in demos {
        let path = root.join(rel);
        let result = loco_project::load_yaml(&path);
        assert!(
            result.is_ok(),
            "demo failed validation: {} => {:?}",
            path.display(),
            result.err()
        );
        assert!(!result.unwrap().scenarios.is_empty());
    }
}
