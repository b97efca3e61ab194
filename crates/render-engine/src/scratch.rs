//! Per-request scratch storage.

use std::path::{Path, PathBuf};

use titlecard_common::error::TitlecardResult;

const SCRATCH_PREFIX: &str = "titlecard-";

/// A uniquely named temporary directory holding one request's files.
///
/// The directory and everything in it is deleted when the value is dropped,
/// so early returns and errors clean up the same way success does.
#[derive(Debug)]
pub struct ScratchDir {
    dir: tempfile::TempDir,
}

impl ScratchDir {
    /// Create a scratch directory under `root`, or the OS temp dir if `None`.
    pub fn new(root: Option<&Path>) -> TitlecardResult<Self> {
        let mut builder = tempfile::Builder::new();
        builder.prefix(SCRATCH_PREFIX);
        let dir = match root {
            Some(root) => {
                std::fs::create_dir_all(root)?;
                builder.tempdir_in(root)?
            }
            None => builder.tempdir()?,
        };
        tracing::trace!(path = %dir.path().display(), "Created scratch directory");
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Where the downloaded source video is written.
    pub fn input_path(&self) -> PathBuf {
        self.dir.path().join("input.mp4")
    }

    /// Where the rendered title-card frame is written.
    pub fn card_path(&self) -> PathBuf {
        self.dir.path().join("card.png")
    }

    /// Where ffmpeg writes the composed video.
    pub fn output_path(&self) -> PathBuf {
        self.dir.path().join("output.mp4")
    }

    /// Remove the directory now, reporting failures instead of ignoring them.
    pub fn close(self) -> TitlecardResult<()> {
        let path = self.dir.path().to_path_buf();
        self.dir.close().map_err(|e| {
            tracing::warn!(path = %path.display(), error = %e, "Failed to remove scratch directory");
            e
        })?;
        Ok(())
    }
}
