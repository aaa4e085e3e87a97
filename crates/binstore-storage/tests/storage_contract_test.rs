#[path = "helpers/mod.rs"]
mod helpers;

use binstore_storage::{derive_key, BinaryRef, StorageError};
use helpers::{all_backends, read_all, source};

#[tokio::test]
async fn test_round_trip_on_every_backend() {
    let (backends, _dir) = all_backends().await;
    let payload: Vec<u8> = (0..200_000u32).map(|i| (i * 31 % 256) as u8).collect();

    for storage in backends {
        let binary = BinaryRef::versioned("patient-scan", "3").unwrap();
        storage
            .write_binary(&binary, Some("scan.dcm"), Some("application/dicom"), source(&payload))
            .await
            .unwrap();

        let content = storage.read_binary(&binary).await.unwrap();
        assert_eq!(
            read_all(content).await,
            payload,
            "round trip on {}",
            storage.backend_type()
        );
    }
}

#[tokio::test]
async fn test_copy_fidelity_on_every_backend() {
    let (backends, _dir) = all_backends().await;

    for storage in backends {
        let from = BinaryRef::versioned("doc", "1").unwrap();
        let to = BinaryRef::versioned("doc-copy", "1").unwrap();
        storage
            .write_binary(&from, Some("letter.pdf"), Some("application/pdf"), source(b"%PDF"))
            .await
            .unwrap();

        storage.copy_binary(&from, &to).await.unwrap();

        let copied = storage.read_binary(&to).await.unwrap();
        assert_eq!(read_all(copied).await, b"%PDF", "copy on {}", storage.backend_type());
    }
}

#[tokio::test]
async fn test_unversioned_key_is_equivalent_across_backends() {
    let (backends, _dir) = all_backends().await;
    let current = BinaryRef::new("abc", None).unwrap();
    assert_eq!(derive_key(&current).as_str(), "binary/abc/_current");

    for storage in backends {
        storage
            .write_binary(&current, None, None, source(b"latest"))
            .await
            .unwrap();
        // Readable through the explicit key on every medium
        let content = storage.read_file("binary/abc/_current").await.unwrap();
        assert_eq!(read_all(content).await, b"latest", "{}", storage.backend_type());

        // And distinct from a versioned sibling
        let versioned = BinaryRef::versioned("abc", "1").unwrap();
        let result = storage.read_binary(&versioned).await;
        assert!(matches!(result, Err(StorageError::NotFound(_))));
    }
}

#[tokio::test]
async fn test_rejected_write_leaves_nothing_on_every_backend() {
    let (backends, _dir) = all_backends().await;

    for storage in backends {
        let binary = BinaryRef::versioned("blocked", "1").unwrap();

        let err = storage
            .write_binary(&binary, Some("INSTALL.MSI"), None, source(b"payload"))
            .await
            .unwrap_err();
        assert!(err.is_client_error());
        assert_eq!(err.to_string(), "Invalid file extension: INSTALL.MSI");

        let err = storage
            .write_binary(
                &binary,
                Some("notes.txt"),
                Some("application/java-archive"),
                source(b"payload"),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::InvalidMetadata(_)));

        let result = storage.read_binary(&binary).await;
        assert!(
            matches!(result, Err(StorageError::NotFound(_))),
            "no object after rejected write on {}",
            storage.backend_type()
        );
    }
}

#[tokio::test]
async fn test_missing_reads_fail_without_content() {
    let (backends, _dir) = all_backends().await;

    for storage in backends {
        let binary = BinaryRef::versioned("ghost", "9").unwrap();
        let err = storage.read_binary(&binary).await.unwrap_err();
        assert_eq!(err.http_status_code(), 404);

        let other = BinaryRef::versioned("ghost-copy", "9").unwrap();
        let err = storage.copy_binary(&binary, &other).await.unwrap_err();
        assert!(matches!(err, StorageError::NotFound(_)));
    }
}

#[tokio::test]
async fn test_write_file_by_key_skips_metadata_check() {
    let (backends, _dir) = all_backends().await;

    for storage in backends {
        // Key-addressed writes are for internal artifacts and are not validated
        storage
            .write_file("exports/bundle.jar", Some("application/java-archive"), source(b"PK"))
            .await
            .unwrap();
        storage
            .copy_file("exports/bundle.jar", "exports/bundle-2.jar")
            .await
            .unwrap();
        let content = storage.read_file("exports/bundle-2.jar").await.unwrap();
        assert_eq!(read_all(content).await, b"PK");
    }
}

#[tokio::test]
async fn test_concurrent_writes_to_distinct_keys() {
    let (backends, _dir) = all_backends().await;

    for storage in backends {
        let writes = (0..16).map(|i| {
            let storage = storage.clone();
            tokio::spawn(async move {
                let binary = BinaryRef::versioned("batch", i.to_string()).unwrap();
                let body = format!("object {i}");
                storage
                    .write_binary(&binary, None, Some("text/plain"), source(body.as_bytes()))
                    .await
            })
        });
        for result in futures::future::join_all(writes).await {
            result.unwrap().unwrap();
        }

        for i in 0..16 {
            let binary = BinaryRef::versioned("batch", i.to_string()).unwrap();
            let content = storage.read_binary(&binary).await.unwrap();
            assert_eq!(read_all(content).await, format!("object {i}").into_bytes());
        }
    }
}

#[tokio::test]
async fn test_prefix_key_is_not_found_on_every_backend() {
    let (backends, _dir) = all_backends().await;

    for storage in backends {
        let backend = storage.backend_type();
        storage
            .write_file("binary/abc/v1", None, source(b"data"))
            .await
            .unwrap();

        let result = storage.read_file("binary/abc").await;
        assert!(
            matches!(&result, Err(StorageError::NotFound(key)) if key == "binary/abc"),
            "read on {backend}"
        );

        let result = storage.copy_file("binary/abc", "binary/dest/1").await;
        assert!(
            matches!(&result, Err(StorageError::NotFound(key)) if key == "binary/abc"),
            "copy on {backend}"
        );

        let result = storage.read_file("binary/dest/1").await;
        assert!(matches!(result, Err(StorageError::NotFound(_))), "{backend}");
    }
}
