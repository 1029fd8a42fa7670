use std::{
    ffi::OsString,
    fs,
    path::{Path, PathBuf},
};

use tracing::{trace, warn};

use super::id::time_thread_id;

/// Directory that is removed together with everything in it when the value
/// is dropped, whichever way the owning scope is left.
#[derive(Debug)]
pub struct TempDir {
    path: PathBuf,
}
impl TempDir {
    pub fn new_in<P, T>(parent: P, dir_name: T) -> Result<Self, std::io::Error>
    where
        P: AsRef<Path>,
        T: Into<OsString>,
    {
        let path = parent.as_ref().join(dir_name.into());

        fs::create_dir_all(&path)?;
        trace!(?path, "Created temp dir");

        Ok(Self { path })
    }

    pub fn with_prefix_in<P, T>(parent: P, dir_name_prefix: T) -> Result<Self, std::io::Error>
    where
        P: AsRef<Path>,
        T: Into<OsString>,
    {
        let mut f: OsString = dir_name_prefix.into();
        f.push(time_thread_id());
        Self::new_in(parent, f)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TempDir {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_dir_all(&self.path) {
            warn!(path = ?self.path, ?e, "Failed to remove temp dir");
        } else {
            trace!(path = ?self.path, "Removed temp dir");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn removed_with_contents_on_drop() {
        let parent = tempfile::tempdir().expect("tempdir");

        let path = {
            let dir = TempDir::with_prefix_in(parent.path(), "staging-").expect("create");
            fs::write(dir.path().join("a.webm"), b"abc").expect("write");
            fs::create_dir(dir.path().join("nested")).expect("mkdir");
            assert!(dir.path().is_dir());
            dir.path().to_path_buf()
        };

        assert!(!path.exists());
        assert!(parent.path().exists());
    }

    #[test]
    fn prefixed_dirs_are_distinct() {
        let parent = tempfile::tempdir().expect("tempdir");

        let a = TempDir::with_prefix_in(parent.path(), "Mix-").expect("create");
        let b = TempDir::with_prefix_in(parent.path(), "Mix-").expect("create");

        assert_ne!(a.path(), b.path());
        assert!(a
            .path()
            .file_name()
            .and_then(|x| x.to_str())
            .is_some_and(|x| x.starts_with("Mix-")));
    }
}
