//! Upload policy and the content-addressed document archive.
//!
//! Issued documents are copied to `<fingerprint><ext>` in the documents
//! directory. The name is derived from the content, so re-archiving the same
//! bytes is a no-op.

use std::io;
use std::path::{Path, PathBuf};

use docuchain_core::Fingerprint;
use tokio::io::AsyncWriteExt;

/// Accepted upload extensions, lowercase, with the dot.
pub const ALLOWED_EXTENSIONS: &[&str] = &[".pdf", ".jpg", ".jpeg", ".png"];

/// The allowed extension of `file_name`, normalized to lowercase.
pub fn allowed_extension(file_name: &str) -> Option<&'static str> {
    let ext = Path::new(file_name).extension()?.to_str()?.to_ascii_lowercase();
    ALLOWED_EXTENSIONS
        .iter()
        .copied()
        .find(|allowed| allowed[1..] == ext)
}

/// Strip any directory components a client sent along with the name.
pub fn sanitize_file_name(file_name: &str) -> Option<String> {
    let base = file_name.rsplit(['/', '\\']).next()?.trim();
    if base.is_empty() || base == "." || base == ".." {
        return None;
    }
    Some(base.to_string())
}

/// Human-readable list of accepted extensions.
pub fn allowed_list() -> String {
    ALLOWED_EXTENSIONS.join(", ")
}

/// Directory of archived documents, keyed by fingerprint.
#[derive(Debug, Clone)]
pub struct DocumentArchive {
    dir: PathBuf,
}

impl DocumentArchive {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, fingerprint: &Fingerprint, extension: &str) -> PathBuf {
        self.dir.join(format!("{}{}", fingerprint.to_hex(), extension))
    }

    /// Write `content` under its fingerprint unless already present.
    pub async fn store(
        &self,
        fingerprint: &Fingerprint,
        extension: &str,
        content: &[u8],
    ) -> io::Result<PathBuf> {
        let path = self.path_for(fingerprint, extension);
        if tokio::fs::try_exists(&path).await? {
            tracing::debug!(path = %path.display(), "document already archived");
            return Ok(path);
        }

        tokio::fs::create_dir_all(&self.dir).await?;
        let tmp = path.with_extension("part");
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(content).await?;
        file.sync_all().await?;
        drop(file);
        tokio::fs::rename(&tmp, &path).await?;

        tracing::info!(path = %path.display(), bytes = content.len(), "document archived");
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allowed_extension() {
        assert_eq!(allowed_extension("diploma.pdf"), Some(".pdf"));
        assert_eq!(allowed_extension("SCAN.JPEG"), Some(".jpeg"));
        assert_eq!(allowed_extension("photo.Png"), Some(".png"));
        assert_eq!(allowed_extension("notes.txt"), None);
        assert_eq!(allowed_extension("pdf"), None);
        assert_eq!(allowed_extension("archive.pdf.exe"), None);
    }

    #[test]
    fn test_sanitize_file_name() {
        assert_eq!(sanitize_file_name("../../etc/passwd.pdf").as_deref(), Some("passwd.pdf"));
        assert_eq!(sanitize_file_name("C:\\scans\\a.png").as_deref(), Some("a.png"));
        assert_eq!(sanitize_file_name("dir/"), None);
        assert_eq!(sanitize_file_name(".."), None);
    }

    #[tokio::test]
    async fn test_store_is_content_addressed() {
        let dir = tempfile::tempdir().unwrap();
        let archive = DocumentArchive::new(dir.path().join("documents"));
        let fp = Fingerprint::of(b"hello");

        let path = archive.store(&fp, ".pdf", b"hello").await.unwrap();
        assert_eq!(path.file_name().unwrap().to_str().unwrap(), format!("{}.pdf", fp));
        assert_eq!(std::fs::read(&path).unwrap(), b"hello");

        // Second store leaves the existing copy alone.
        let again = archive.store(&fp, ".pdf", b"ignored").await.unwrap();
        assert_eq!(again, path);
        assert_eq!(std::fs::read(&path).unwrap(), b"hello");
    }
}
