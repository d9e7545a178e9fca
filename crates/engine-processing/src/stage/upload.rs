use crate::{
    error::StageWriteError,
    stage::{StageFile, belongs_to_stem},
};
use connectors::storage::store::BlobStore;
use engine_core::metrics::Metrics;
use model::resource::ResourceKind;
use std::{collections::HashSet, sync::Arc};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadSummary {
    pub bytes: u64,
    /// Stale objects of the same resource removed after the upload.
    pub removed: Vec<String>,
}

/// Uploads a resource's stage files, overwriting existing objects.
#[derive(Clone)]
pub struct StageUploader {
    store: Arc<dyn BlobStore>,
    metrics: Metrics,
}

impl StageUploader {
    pub fn new(store: Arc<dyn BlobStore>, metrics: Metrics) -> Self {
        StageUploader { store, metrics }
    }

    /// Writes every file, then deletes objects of the same resource that this
    /// upload did not write (e.g. parts left by a larger previous run).
    ///
    /// Objects are not written atomically as a set: when a later part fails,
    /// the parts already written sit next to the previous run's remaining
    /// parts until the next successful upload of the resource.
    pub async fn upload(
        &self,
        resource: ResourceKind,
        files: &[StageFile],
    ) -> Result<UploadSummary, StageWriteError> {
        let mut summary = UploadSummary::default();

        for (written, file) in files.iter().enumerate() {
            let location = match self.store.put(&file.name, file.bytes.clone()).await {
                Ok(location) => location,
                Err(source) => {
                    if written > 0 {
                        warn!(
                            resource = %resource,
                            written,
                            total = files.len(),
                            failed = %file.name,
                            "Upload stopped part-way; stage mixes new and previous parts until the next successful run"
                        );
                    }
                    return Err(StageWriteError::Upload {
                        name: file.name.clone(),
                        source,
                    });
                }
            };
            debug!(resource = %resource, location = %location, rows = file.rows, "Uploaded file");

            let size = file.bytes.len() as u64;
            summary.bytes += size;
            self.metrics.increment_files(1);
            self.metrics.increment_bytes(size);
        }

        summary.removed = self.remove_stale(resource, files).await?;

        info!(
            resource = %resource,
            files = files.len(),
            bytes = summary.bytes,
            removed = summary.removed.len(),
            "Uploaded resource"
        );
        Ok(summary)
    }

    async fn remove_stale(
        &self,
        resource: ResourceKind,
        files: &[StageFile],
    ) -> Result<Vec<String>, StageWriteError> {
        let written: HashSet<&str> = files.iter().map(|f| f.name.as_str()).collect();
        let existing = self
            .store
            .list()
            .await
            .map_err(|source| StageWriteError::Cleanup {
                name: format!("{}*", resource.stem()),
                source,
            })?;

        let mut removed = Vec::new();
        for name in existing {
            if !belongs_to_stem(resource.stem(), &name) || written.contains(name.as_str()) {
                continue;
            }
            self.store
                .delete(&name)
                .await
                .map_err(|source| StageWriteError::Cleanup {
                    name: name.clone(),
                    source,
                })?;
            debug!(resource = %resource, name = %name, "Removed stale stage object");
            removed.push(name);
        }

        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bytes::Bytes;
    use connectors::storage::{error::StageError, store::StageStore};
    use object_store::memory::InMemory;
    use tracing_test::traced_test;

    /// Stage that refuses to write one object name.
    struct FailingPart {
        inner: StageStore,
        refuse: &'static str,
    }

    #[async_trait]
    impl BlobStore for FailingPart {
        async fn put(&self, name: &str, data: Bytes) -> Result<String, StageError> {
            if name == self.refuse {
                return Err(StageError::Io(std::io::Error::other("quota exceeded")));
            }
            self.inner.put(name, data).await
        }

        async fn list(&self) -> Result<Vec<String>, StageError> {
            self.inner.list().await
        }

        async fn delete(&self, name: &str) -> Result<(), StageError> {
            self.inner.delete(name).await
        }

        async fn get(&self, name: &str) -> Result<Bytes, StageError> {
            self.inner.get(name).await
        }
    }

    fn file(name: &str, body: &'static [u8]) -> StageFile {
        StageFile {
            name: name.to_string(),
            bytes: Bytes::from_static(body),
            rows: 1,
        }
    }

    #[tokio::test]
    async fn removes_stale_parts_of_the_same_resource_only() {
        let store = Arc::new(StageStore::with_store(Arc::new(InMemory::new()), "API_FRESHSERVICE"));
        for name in [
            "TICKETS_part_0001.csv",
            "TICKETS_part_0002.csv",
            "TICKETS_part_0003.csv",
            "TICKET_FIELDS.csv",
        ] {
            store.put(name, Bytes::from_static(b"old")).await.unwrap();
        }

        let metrics = Metrics::new();
        let uploader = StageUploader::new(store.clone(), metrics.clone());
        let summary = uploader
            .upload(ResourceKind::Tickets, &[file("TICKETS.csv", b"ID\n1\n")])
            .await
            .unwrap();

        assert_eq!(summary.bytes, 5);
        assert_eq!(summary.removed.len(), 3);
        assert_eq!(
            store.list().await.unwrap(),
            vec!["TICKETS.csv", "TICKET_FIELDS.csv"]
        );
        assert_eq!(&store.get("TICKETS.csv").await.unwrap()[..], b"ID\n1\n");

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.files_uploaded, 1);
        assert_eq!(snapshot.bytes_uploaded, 5);
    }

    #[tokio::test]
    async fn overwrites_existing_objects() {
        let store = Arc::new(StageStore::with_store(Arc::new(InMemory::new()), ""));
        let uploader = StageUploader::new(store.clone(), Metrics::new());

        uploader
            .upload(ResourceKind::AgentGroups, &[file("AGENTGROUPS.csv", b"ID\n1\n")])
            .await
            .unwrap();
        let summary = uploader
            .upload(ResourceKind::AgentGroups, &[file("AGENTGROUPS.csv", b"ID\n")])
            .await
            .unwrap();

        assert!(summary.removed.is_empty());
        assert_eq!(&store.get("AGENTGROUPS.csv").await.unwrap()[..], b"ID\n");
    }

    #[traced_test]
    #[tokio::test]
    async fn partial_upload_is_reported_and_keeps_old_parts() {
        let inner = StageStore::with_store(Arc::new(InMemory::new()), "");
        for name in ["TICKETS_part_0001.csv", "TICKETS_part_0002.csv"] {
            inner.put(name, Bytes::from_static(b"old")).await.unwrap();
        }
        let store = Arc::new(FailingPart {
            inner,
            refuse: "TICKETS_part_0002.csv",
        });

        let err = StageUploader::new(store.clone(), Metrics::new())
            .upload(
                ResourceKind::Tickets,
                &[
                    file("TICKETS_part_0001.csv", b"ID\n1\n"),
                    file("TICKETS_part_0002.csv", b"ID\n2\n"),
                ],
            )
            .await
            .unwrap_err();

        assert!(matches!(err, StageWriteError::Upload { ref name, .. } if name == "TICKETS_part_0002.csv"));
        assert_eq!(&store.get("TICKETS_part_0001.csv").await.unwrap()[..], b"ID\n1\n");
        assert_eq!(&store.get("TICKETS_part_0002.csv").await.unwrap()[..], b"old");
        assert!(logs_contain("Upload stopped part-way"));
        assert!(logs_contain("written=1"));
    }
}
