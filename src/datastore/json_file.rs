use crate::{
    datastore::{Datastore, StoreDocument},
    error::{
        ParseDatastoreSnafu, ReadDatastoreSnafu, SerialiseDatastoreSnafu, StudentsResult,
        WriteDatastoreSnafu,
    },
};
use async_trait::async_trait;
use snafu::ResultExt;
use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};
use tokio::{fs, io::AsyncWriteExt};

///a pretty-printed JSON file on disk
#[derive(Debug, Clone)]
pub struct JsonFileBackend {
    path: PathBuf,
    temp_path: PathBuf,
}

impl JsonFileBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let mut temp_name = path
            .file_name()
            .map(ToOwned::to_owned)
            .unwrap_or_default();
        temp_name.push(".tmp");
        let temp_path = path.with_file_name(temp_name);

        Self { path, temp_path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl Datastore for JsonFileBackend {
    async fn load(&self) -> StudentsResult<StoreDocument> {
        let bytes = match fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = ?self.path, "No datastore file yet, starting empty");
                return Ok(StoreDocument::default());
            }
            Err(source) => {
                return Err(source).context(ReadDatastoreSnafu { path: &self.path });
            }
        };

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(StoreDocument::default());
        }

        let document: StoreDocument =
            serde_json::from_slice(&bytes).context(ParseDatastoreSnafu { path: &self.path })?;
        debug!(path = ?self.path, students = document.students.len(), "Loaded datastore");
        Ok(document)
    }

    //write to a sibling, fsync, then rename over the real file
    async fn persist(&self, document: &StoreDocument) -> StudentsResult<()> {
        let serialised = serde_json::to_vec_pretty(document).context(SerialiseDatastoreSnafu)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .context(WriteDatastoreSnafu { path: parent })?;
        }

        let mut file = fs::File::create(&self.temp_path)
            .await
            .context(WriteDatastoreSnafu {
                path: &self.temp_path,
            })?;
        file.write_all(&serialised)
            .await
            .context(WriteDatastoreSnafu {
                path: &self.temp_path,
            })?;
        file.sync_all().await.context(WriteDatastoreSnafu {
            path: &self.temp_path,
        })?;
        drop(file);

        fs::rename(&self.temp_path, &self.path)
            .await
            .context(WriteDatastoreSnafu { path: &self.path })?;

        debug!(path = ?self.path, students = document.students.len(), "Persisted datastore");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::student::{NewStudent, StudentId};
    use crate::error::StudentsError;
    use jiff::Timestamp;
    use serde_json::json;
    use tempfile::TempDir;

    fn ada() -> StoreDocument {
        let payload = json!({"name": "Ada", "email": "ada@x.com", "house": "Babbage"});
        let new = NewStudent::try_from(payload.as_object().unwrap().clone()).unwrap();
        StoreDocument {
            students: vec![new.into_student(StudentId::generate(), Timestamp::now())],
        }
    }

    #[tokio::test]
    async fn missing_file_reads_as_empty() {
        let tmp = TempDir::new().unwrap();
        let backend = JsonFileBackend::new(tmp.path().join("db.json"));

        assert_eq!(backend.load().await.unwrap(), StoreDocument::default());
        assert!(!backend.path().exists());
    }

    #[tokio::test]
    async fn persisted_document_reloads_identically() {
        let tmp = TempDir::new().unwrap();
        let backend = JsonFileBackend::new(tmp.path().join("db.json"));
        let document = ada();

        backend.persist(&document).await.unwrap();

        assert_eq!(backend.load().await.unwrap(), document);
        assert!(!tmp.path().join("db.json.tmp").exists());
    }

    #[tokio::test]
    async fn file_layout_is_a_students_array() {
        let tmp = TempDir::new().unwrap();
        let backend = JsonFileBackend::new(tmp.path().join("db.json"));
        backend.persist(&ada()).await.unwrap();

        let raw: serde_json::Value =
            serde_json::from_slice(&std::fs::read(backend.path()).unwrap()).unwrap();
        let students = raw["students"].as_array().unwrap();

        assert_eq!(students.len(), 1);
        assert_eq!(students[0]["name"], "Ada");
        assert_eq!(students[0]["house"], "Babbage");
        assert!(students[0]["createdAt"].is_string());
        assert!(students[0].get("updatedAt").is_none());
    }

    #[tokio::test]
    async fn creates_missing_parent_directories() {
        let tmp = TempDir::new().unwrap();
        let backend = JsonFileBackend::new(tmp.path().join("nested").join("db.json"));

        backend.persist(&StoreDocument::default()).await.unwrap();

        assert!(backend.path().exists());
    }

    #[tokio::test]
    async fn corrupt_file_is_a_parse_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("db.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = JsonFileBackend::new(&path).load().await.unwrap_err();

        assert!(matches!(err, StudentsError::ParseDatastore { .. }));
    }

    #[tokio::test]
    async fn tolerates_hand_written_numeric_ids() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("db.json");
        std::fs::write(
            &path,
            r#"{"students":[{"id":7,"name":"Bo","email":"bo@x.com","createdAt":"2024-01-01T00:00:00Z"}]}"#,
        )
        .unwrap();

        let document = JsonFileBackend::new(&path).load().await.unwrap();

        assert!(document.students[0].id.matches("7"));
    }

    #[tokio::test]
    async fn empty_file_reads_as_empty() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("db.json");
        std::fs::write(&path, "\n").unwrap();

        assert_eq!(
            JsonFileBackend::new(&path).load().await.unwrap(),
            StoreDocument::default()
        );
    }
}
