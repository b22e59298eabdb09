use super::*;
use crate::tag::file_locator;

fn write_files(dir: &std::path::Path, names: &[&str]) {
    for name in names {
        std::fs::write(dir.join(name), name.as_bytes()).unwrap();
    }
}

#[tokio::test]
async fn test_load_directory_filters_by_extension() {
    let dir = tempfile::tempdir().unwrap();
    write_files(
        dir.path(),
        &["bark.jpg", "moss.PNG", "normal.dds", "sky.Tga", "notes.txt", "photo.jpeg"],
    );
    // a directory with a texture-like name is not a file
    std::fs::create_dir(dir.path().join("nested.png")).unwrap();
    write_files(&dir.path().join("nested.png"), &["deep.png"]);

    let fetcher = Arc::new(MockFetcher::new());
    let loader = create_test_loader(2, fetcher.clone()).await;

    let queued = loader.load_directory(dir.path()).await.unwrap();
    assert_eq!(queued, 4);
    wait_done(&loader).await;

    let mut tags: Vec<_> = loader.all_outcomes().into_iter().map(|o| o.tag).collect();
    tags.sort();
    assert_eq!(tags, vec!["bark", "moss", "normal", "sky"]);
    assert!(fetcher.calls().iter().all(|l| l.starts_with("file://")));
}

#[tokio::test]
async fn test_load_directory_uses_file_locators() {
    let dir = tempfile::tempdir().unwrap();
    write_files(dir.path(), &["stone.png"]);

    let fetcher = Arc::new(MockFetcher::new());
    let loader = create_test_loader(1, fetcher.clone()).await;
    loader.load_directory(dir.path()).await.unwrap();
    wait_done(&loader).await;

    let expected = file_locator(&dir.path().join("stone.png"));
    assert_eq!(fetcher.calls(), vec![expected.clone()]);
    assert_eq!(loader.get("stone").unwrap().locator, expected);
}

#[tokio::test]
async fn test_load_empty_directory_queues_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let loader = create_test_loader(1, Arc::new(MockFetcher::new())).await;

    assert_eq!(loader.load_directory(dir.path()).await.unwrap(), 0);
    assert!(loader.stats().is_complete);
}

#[tokio::test]
async fn test_load_missing_directory_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let loader = create_test_loader(1, Arc::new(MockFetcher::new())).await;

    let result = loader.load_directory(dir.path().join("nope")).await;
    assert!(matches!(result, Err(Error::Io(_))));
    assert_eq!(loader.stats().total, 0);
}

#[tokio::test]
async fn test_load_directory_with_default_fetcher_reads_files() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("grass.png"), [0x89, b'P', b'N', b'G']).unwrap();
    std::fs::write(dir.path().join("rock.dds"), b"DDS ").unwrap();

    let loader = TextureLoader::new(test_config(2)).await.unwrap();
    assert_eq!(loader.load_directory(dir.path()).await.unwrap(), 2);
    wait_done(&loader).await;

    let grass = loader.get("grass").expect("grass loaded from disk");
    assert_eq!(grass.bytes, vec![0x89, b'P', b'N', b'G']);
    assert_eq!(grass.format, Some(crate::types::ImageFormat::Png));

    let rock = loader.get("rock").expect("rock loaded from disk");
    assert_eq!(rock.bytes, b"DDS ".to_vec());
    assert_eq!(rock.format, Some(crate::types::ImageFormat::Dds));
}

#[tokio::test]
async fn test_load_directory_after_shutdown_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    write_files(dir.path(), &["a.png"]);
    let loader = create_test_loader(1, Arc::new(MockFetcher::new())).await;
    loader.shutdown().await.unwrap();

    assert!(matches!(
        loader.load_directory(dir.path()).await,
        Err(Error::ShuttingDown)
    ));
}
