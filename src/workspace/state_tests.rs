use super::{clean_cache, collect_schema_files, is_initialized};
use crate::workspace::WorkspacePaths;

#[test]
fn clean_cache_is_a_noop_when_absent() {
    let temp = tempfile::tempdir().expect("create temp dir");
    let paths = WorkspacePaths::new(temp.path().to_path_buf());

    assert!(!clean_cache(&paths.cache_dir()).expect("first clean"));
    assert!(!clean_cache(&paths.cache_dir()).expect("second clean"));
}

#[test]
fn clean_cache_removes_existing_directory_once() {
    let temp = tempfile::tempdir().expect("create temp dir");
    let paths = WorkspacePaths::new(temp.path().to_path_buf());
    let nested = paths.cache_dir().join("meta");
    std::fs::create_dir_all(&nested).expect("create cache");
    std::fs::write(nested.join("state.json"), "{}").expect("write cache file");

    assert!(clean_cache(&paths.cache_dir()).expect("clean existing"));
    assert!(!paths.cache_dir().exists());
    assert!(!clean_cache(&paths.cache_dir()).expect("clean again"));
}

#[test]
fn is_initialized_tracks_marker_directory() {
    let temp = tempfile::tempdir().expect("create temp dir");
    let paths = WorkspacePaths::new(temp.path().to_path_buf());
    assert!(!is_initialized(&paths.cache_dir()));

    std::fs::create_dir_all(paths.cache_dir()).expect("create marker");
    assert!(is_initialized(&paths.cache_dir()));
}

#[test]
fn collect_schema_files_skips_hidden_directories() {
    let temp = tempfile::tempdir().expect("create temp dir");
    let root = temp.path();
    std::fs::create_dir_all(root.join("curl")).expect("create import dir");
    std::fs::create_dir_all(root.join(".stepzen")).expect("create cache");
    std::fs::write(root.join("index.graphql"), "schema").expect("write root schema");
    std::fs::write(root.join("curl/index.graphql"), "type A").expect("write import schema");
    std::fs::write(root.join(".stepzen/cached.graphql"), "x").expect("write cached schema");
    std::fs::write(root.join("notes.txt"), "x").expect("write other file");

    let files = collect_schema_files(root).expect("collect");
    assert_eq!(
        files,
        vec![root.join("curl/index.graphql"), root.join("index.graphql")]
    );
}
