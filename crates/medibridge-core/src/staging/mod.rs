//! File stager: writes an uploaded PDF onto a network share.
//!
//! Validates the filename, resolves the destination directory (client value
//! or configured default), then streams the bytes into a hidden temp file and
//! atomically renames it onto the final name.

mod dest;
mod locks;
mod name;
mod writer;

pub use dest::{resolve_dest_dir, share_join, ShareMount};
pub use locks::{PathGuard, StagingLocks};
pub use name::{require_pdf, safe_name, validate_upload_name, FORBIDDEN_CHARS};
pub use writer::{temp_path, StagingWriter, TEMP_SUFFIX};

use serde::Serialize;
use std::io::Read;
use std::path::{Path, PathBuf};

use crate::error::{BridgeError, BridgeResult};

/// One completed upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedFile {
    pub safe_name: String,
    /// Destination directory in share form.
    pub dest_dir: String,
    /// Final path in share form.
    pub dest_path: String,
    /// Size read back from the filesystem after the rename.
    pub byte_size: u64,
    /// Where the file actually landed on this host.
    pub fs_path: PathBuf,
}

/// Response body of a successful upload.
#[derive(Debug, Clone, Serialize)]
pub struct UploadReceipt {
    pub ok: bool,
    pub dest_dir: String,
    pub dest_path: String,
    pub bytes: u64,
    pub filename: String,
}

impl From<&StagedFile> for UploadReceipt {
    fn from(f: &StagedFile) -> Self {
        Self {
            ok: true,
            dest_dir: f.dest_dir.clone(),
            dest_path: f.dest_path.clone(),
            bytes: f.byte_size,
            filename: f.safe_name.clone(),
        }
    }
}

pub struct FileStager {
    default_dir: String,
    mount: ShareMount,
    locks: StagingLocks,
}

impl FileStager {
    pub fn new(default_dir: impl Into<String>, mount: ShareMount) -> Self {
        Self {
            default_dir: default_dir.into(),
            mount,
            locks: StagingLocks::new(),
        }
    }

    /// Stage `reader` as `dest_name` under `dest_dir` (or the default).
    ///
    /// Blocking; call from `spawn_blocking` in async code. Nothing is written
    /// before the name and directory are validated.
    pub fn stage<R: Read + ?Sized>(
        &self,
        reader: &mut R,
        dest_name: &str,
        dest_dir: Option<&str>,
    ) -> BridgeResult<StagedFile> {
        let name = validate_upload_name(dest_name)?;
        let share_dir = resolve_dest_dir(dest_dir, &self.default_dir)?;

        let fs_dir = self.mount.to_fs_path(&share_dir);
        std::fs::create_dir_all(&fs_dir).map_err(|e| {
            BridgeError::filesystem(
                format!("could not create/access destination folder {}", share_dir),
                e,
            )
        })?;

        let final_path = fs_dir.join(&name);
        let tmp = temp_path(&fs_dir, &name);

        let _guard = self.locks.acquire(&self.lock_key(&final_path));
        let written = write_atomically(reader, &tmp, &final_path)
            .map_err(|e| BridgeError::filesystem("error copying/saving file", e))?;

        let byte_size = std::fs::metadata(&final_path)
            .map_err(|e| BridgeError::filesystem("error reading back staged file", e))?
            .len();
        tracing::info!(
            path = %final_path.display(),
            bytes = byte_size,
            streamed = written,
            "staged upload"
        );

        Ok(StagedFile {
            dest_path: share_join(&share_dir, &name),
            dest_dir: share_dir,
            safe_name: name,
            byte_size,
            fs_path: final_path,
        })
    }

    /// Share paths are case-insensitive, so native mode folds the key;
    /// mounted paths keep the host filesystem's case rules.
    fn lock_key(&self, final_path: &Path) -> PathBuf {
        if self.mount.is_native() {
            PathBuf::from(final_path.to_string_lossy().to_lowercase())
        } else {
            final_path.to_path_buf()
        }
    }
}

fn write_atomically<R: Read + ?Sized>(
    reader: &mut R,
    tmp: &Path,
    final_path: &Path,
) -> std::io::Result<u64> {
    let mut writer = StagingWriter::create(tmp)?;
    let written = writer.copy_from(reader)?;
    writer.sync()?;
    writer.finalize(final_path)?;
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stager(root: &Path) -> FileStager {
        FileStager::new("\\\\filemh01\\pdf", ShareMount::mounted_at(root))
    }

    #[test]
    fn stage_to_default_dir() {
        let root = tempfile::tempdir().unwrap();
        let s = stager(root.path());
        let staged = s.stage(&mut &b"%PDF-1.4 body"[..], "report.pdf", None).unwrap();

        assert_eq!(staged.safe_name, "report.pdf");
        assert_eq!(staged.dest_dir, "\\\\filemh01\\pdf");
        assert_eq!(staged.dest_path, "\\\\filemh01\\pdf\\report.pdf");
        assert_eq!(staged.byte_size, 13);
        assert_eq!(staged.fs_path, root.path().join("filemh01").join("pdf").join("report.pdf"));
        assert_eq!(std::fs::read(&staged.fs_path).unwrap(), b"%PDF-1.4 body");
        assert!(!temp_path(&root.path().join("filemh01/pdf"), "report.pdf").exists());
    }

    #[test]
    fn stage_to_client_dir_creates_parents() {
        let root = tempfile::tempdir().unwrap();
        let s = stager(root.path());
        let staged = s
            .stage(&mut &b"x"[..], "../a.PDF", Some("imgsrv/RX/2024"))
            .unwrap();
        assert_eq!(staged.dest_dir, "\\\\imgsrv\\RX\\2024");
        assert_eq!(staged.safe_name, "a.PDF");
        assert!(root.path().join("imgsrv/RX/2024/a.PDF").is_file());
    }

    #[test]
    fn rejected_inputs_write_nothing() {
        let root = tempfile::tempdir().unwrap();
        let s = stager(root.path());
        let cases: [(&str, Option<&str>); 4] = [
            ("report.txt", None),
            ("../../etc/passwd", None),
            ("a|b.pdf", None),
            ("ok.pdf", Some("C:\\temp")),
        ];
        for (name, dir) in cases {
            let err = s.stage(&mut &b"x"[..], name, dir).unwrap_err();
            assert_eq!(err.status_code(), 400, "{} {:?}", name, dir);
        }
        assert_eq!(std::fs::read_dir(root.path()).unwrap().count(), 0);
    }

    #[test]
    fn native_lock_key_ignores_case() {
        let native = FileStager::new("\\\\filemh01\\pdf", ShareMount::native());
        assert_eq!(
            native.lock_key(Path::new("\\\\FileMH01\\PDF\\Report.pdf")),
            native.lock_key(Path::new("\\\\filemh01\\pdf\\report.PDF"))
        );

        let mounted = FileStager::new("\\\\filemh01\\pdf", ShareMount::mounted_at("/mnt"));
        assert_ne!(
            mounted.lock_key(Path::new("/mnt/filemh01/pdf/A.pdf")),
            mounted.lock_key(Path::new("/mnt/filemh01/pdf/a.pdf"))
        );
    }

    #[test]
    fn restage_replaces_previous_file() {
        let root = tempfile::tempdir().unwrap();
        let s = stager(root.path());
        s.stage(&mut &b"first version"[..], "a.pdf", None).unwrap();
        let staged = s.stage(&mut &b"v2"[..], "a.pdf", None).unwrap();
        assert_eq!(staged.byte_size, 2);
        assert_eq!(std::fs::read(&staged.fs_path).unwrap(), b"v2");
    }

    #[test]
    fn unwritable_destination_is_filesystem_error() {
        let root = tempfile::tempdir().unwrap();
        // A regular file where a directory component is expected.
        std::fs::write(root.path().join("blocked"), b"").unwrap();
        let s = stager(root.path());
        let err = s
            .stage(&mut &b"x"[..], "a.pdf", Some("\\\\blocked\\sub"))
            .unwrap_err();
        assert!(matches!(err, BridgeError::Filesystem { .. }));
        assert_eq!(err.status_code(), 500);
    }

    #[test]
    fn receipt_fields() {
        let staged = StagedFile {
            safe_name: "a.pdf".into(),
            dest_dir: "\\\\h\\s".into(),
            dest_path: "\\\\h\\s\\a.pdf".into(),
            byte_size: 9,
            fs_path: PathBuf::from("/mnt/h/s/a.pdf"),
        };
        let v = serde_json::to_value(UploadReceipt::from(&staged)).unwrap();
        assert_eq!(
            v,
            serde_json::json!({
                "ok": true,
                "dest_dir": "\\\\h\\s",
                "dest_path": "\\\\h\\s\\a.pdf",
                "bytes": 9,
                "filename": "a.pdf"
            })
        );
    }
}
