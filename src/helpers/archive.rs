use std::{
    fs::{self, File},
    path::{Path, PathBuf},
};

use tracing::{debug, trace};
use zip::{write::SimpleFileOptions, CompressionMethod, ZipWriter};

/// Pack the regular files directly inside `source_dir` into a zip archive at
/// `archive_path`. Nested directories are skipped. A half written archive is
/// removed if anything fails.
#[tracing::instrument]
pub async fn zip_dir(source_dir: PathBuf, archive_path: PathBuf) -> anyhow::Result<PathBuf> {
    debug!("Archiving directory");

    tokio::task::spawn_blocking(move || {
        let res = write_archive(&source_dir, &archive_path);

        if res.is_err() {
            let _ = fs::remove_file(&archive_path);
        }

        res.map(|()| archive_path)
    })
    .await?
}

fn write_archive(source_dir: &Path, archive_path: &Path) -> anyhow::Result<()> {
    let mut entries = fs::read_dir(source_dir)?.collect::<Result<Vec<_>, _>>()?;
    entries.sort_by_key(fs::DirEntry::file_name);

    let mut zip = ZipWriter::new(File::create(archive_path)?);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for entry in entries {
        if !entry.file_type()?.is_file() {
            continue;
        }

        let name = entry.file_name().to_string_lossy().into_owned();
        trace!(?name, "Adding file to archive");

        zip.start_file(name, options)?;
        let mut file_on_disk = File::open(entry.path())?;
        std::io::copy(&mut file_on_disk, &mut zip)?;
    }

    zip.finish()?;
    trace!("Archive written");

    Ok(())
}
