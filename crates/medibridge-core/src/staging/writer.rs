//! Temp-file writer with atomic finalize.
//!
//! The upload is streamed into `.{name}.uploading` next to the final file and
//! renamed over the final name once complete. Dropping an unfinished writer
//! removes the temp file, so a failed upload never leaves anything behind.

use std::fs::File;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

/// Temporary file suffix used before atomic rename.
pub const TEMP_SUFFIX: &str = ".uploading";

const BUF_SIZE: usize = 64 * 1024;

/// Temp path for `name` inside `dir`: `dir/.{name}.uploading`.
pub fn temp_path(dir: &Path, name: &str) -> PathBuf {
    dir.join(format!(".{}{}", name, TEMP_SUFFIX))
}

pub struct StagingWriter {
    file: Option<File>,
    temp_path: PathBuf,
    finished: bool,
}

impl StagingWriter {
    /// Create (or truncate) the temp file.
    pub fn create(temp_path: &Path) -> io::Result<Self> {
        let file = File::options()
            .write(true)
            .create(true)
            .truncate(true)
            .open(temp_path)?;
        Ok(Self {
            file: Some(file),
            temp_path: temp_path.to_path_buf(),
            finished: false,
        })
    }

    /// Stream everything from `reader` into the temp file in fixed-size chunks.
    pub fn copy_from<R: Read + ?Sized>(&mut self, reader: &mut R) -> io::Result<u64> {
        let file = self
            .file
            .as_mut()
            .ok_or_else(|| io::Error::other("staging writer already closed"))?;
        let mut buf = vec![0u8; BUF_SIZE];
        let mut total = 0u64;
        loop {
            let n = match reader.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            };
            file.write_all(&buf[..n])?;
            total += n as u64;
        }
        Ok(total)
    }

    /// Flush and sync file data to disk. Call before `finalize`.
    pub fn sync(&mut self) -> io::Result<()> {
        if let Some(file) = self.file.as_mut() {
            file.flush()?;
            file.sync_all()?;
        }
        Ok(())
    }

    /// Close the temp file and rename it over `final_path`, replacing any
    /// existing file.
    pub fn finalize(mut self, final_path: &Path) -> io::Result<()> {
        drop(self.file.take());
        std::fs::rename(&self.temp_path, final_path)?;
        self.finished = true;
        Ok(())
    }
}

impl Drop for StagingWriter {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        drop(self.file.take());
        if let Err(e) = std::fs::remove_file(&self.temp_path) {
            if e.kind() != io::ErrorKind::NotFound {
                tracing::warn!(path = %self.temp_path.display(), error = %e, "could not remove temp upload");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FailingReader {
        sent: bool,
    }

    impl Read for FailingReader {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.sent {
                return Err(io::Error::new(io::ErrorKind::ConnectionReset, "client went away"));
            }
            self.sent = true;
            buf[..4].copy_from_slice(b"%PDF");
            Ok(4)
        }
    }

    #[test]
    fn temp_path_is_hidden_sibling() {
        let p = temp_path(Path::new("/srv/share"), "a.pdf");
        assert_eq!(p, Path::new("/srv/share/.a.pdf.uploading"));
    }

    #[test]
    fn create_copy_finalize() {
        let dir = tempfile::tempdir().unwrap();
        let final_path = dir.path().join("a.pdf");
        let tp = temp_path(dir.path(), "a.pdf");

        let mut w = StagingWriter::create(&tp).unwrap();
        let body = vec![7u8; 200 * 1024];
        let n = w.copy_from(&mut body.as_slice()).unwrap();
        assert_eq!(n, body.len() as u64);
        w.sync().unwrap();
        w.finalize(&final_path).unwrap();

        assert!(!tp.exists());
        assert_eq!(std::fs::read(&final_path).unwrap(), body);
    }

    #[test]
    fn finalize_replaces_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let final_path = dir.path().join("a.pdf");
        std::fs::write(&final_path, b"old contents that are longer").unwrap();

        let mut w = StagingWriter::create(&temp_path(dir.path(), "a.pdf")).unwrap();
        w.copy_from(&mut &b"new"[..]).unwrap();
        w.finalize(&final_path).unwrap();
        assert_eq!(std::fs::read(&final_path).unwrap(), b"new");
    }

    #[test]
    fn dropped_writer_removes_temp() {
        let dir = tempfile::tempdir().unwrap();
        let tp = temp_path(dir.path(), "a.pdf");
        let mut w = StagingWriter::create(&tp).unwrap();
        let err = w.copy_from(&mut FailingReader { sent: false }).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::ConnectionReset);
        assert!(tp.exists());
        drop(w);
        assert!(!tp.exists());
        assert!(!dir.path().join("a.pdf").exists());
    }
}
