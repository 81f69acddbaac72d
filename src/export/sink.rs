//! Persistence of composed documents

use std::fs;
use std::io::Write;
use std::path::PathBuf;

use crate::export::ExportError;

/// Destination for exported documents
pub trait DocumentSink {
    /// Writes `bytes` under `base_name`, appending the format extension.
    /// Returns the full path written.
    fn persist(&self, bytes: &[u8], base_name: &str) -> Result<PathBuf, ExportError>;
}

/// Writes documents into a directory on the local filesystem
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub const EXTENSION: &'static str = "pdf";

    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The user's download directory, then home, then the working directory
    pub fn user_default() -> Self {
        let dir = dirs::download_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."));
        Self::new(dir)
    }

    pub fn path_for(&self, base_name: &str) -> PathBuf {
        self.dir.join(format!("{base_name}.{}", Self::EXTENSION))
    }
}

impl DocumentSink for DirectorySink {
    fn persist(&self, bytes: &[u8], base_name: &str) -> Result<PathBuf, ExportError> {
        let path = self.path_for(base_name);
        let persist_err = |source| ExportError::Persist {
            path: path.clone(),
            source,
        };

        fs::create_dir_all(&self.dir).map_err(persist_err)?;

        // Write next to the target and rename so a failed write never leaves a
        // truncated document under the final name.
        let partial = self.dir.join(format!(".{base_name}.{}.partial", Self::EXTENSION));
        let written = fs::File::create(&partial)
            .and_then(|mut file| {
                file.write_all(bytes)?;
                file.sync_all()
            })
            .and_then(|()| fs::rename(&partial, &path));
        if let Err(source) = written {
            let _ = fs::remove_file(&partial);
            return Err(persist_err(source));
        }

        tracing::info!(path = %path.display(), bytes = bytes.len(), "saved document");
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn persist_appends_extension() {
        let dir = tempfile::tempdir().unwrap();
        let sink = DirectorySink::new(dir.path());

        let path = sink.persist(b"%PDF-1.3", "treemap").unwrap();

        assert_eq!(path, dir.path().join("treemap.pdf"));
        assert_eq!(fs::read(&path).unwrap(), b"%PDF-1.3");
        assert!(!dir.path().join(".treemap.pdf.partial").exists());
    }

    #[test]
    fn persist_creates_missing_directories() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("exports").join("charts");
        let sink = DirectorySink::new(&nested);

        let path = sink.persist(b"x", "treemap").unwrap();
        assert!(path.starts_with(&nested));
        assert!(path.exists());
    }

    #[test]
    fn persist_overwrites_previous_export() {
        let dir = tempfile::tempdir().unwrap();
        let sink = DirectorySink::new(dir.path());

        sink.persist(b"first", "treemap").unwrap();
        let path = sink.persist(b"second", "treemap").unwrap();
        assert_eq!(fs::read(path).unwrap(), b"second");
    }

    #[test]
    fn persist_reports_unwritable_target() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        fs::write(&blocker, b"file").unwrap();
        let sink = DirectorySink::new(&blocker);

        let err = sink.persist(b"x", "treemap").unwrap_err();
        assert!(matches!(err, ExportError::Persist { .. }));
    }
}
