//! Bulk export staging
//!
//! `/export/data.json` returns an unbounded newline-delimited body. Holding
//! it in memory is not an option, and neither is keeping the connection open
//! while records trickle downstream. The export path therefore drains the
//! response into a disk-backed staging file first, releases the connection,
//! and only then decodes the file line by line.
//!
//! The staging file and its directory are owned by an [`ExportBuffer`] guard
//! and are removed when it drops, whether the fetch loop finishes, stops
//! early, or fails mid-copy.

use crate::error::{Error, Result};
use crate::http::{HttpClient, RequestConfig};
use futures::StreamExt;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufReader, BufWriter};
use tracing::debug;

#[cfg(test)]
mod tests;

/// Buffer size for copying the response body to disk
pub const COPY_BUFFER_SIZE: usize = 1024 * 1024;

/// Scoped staging file for one export response
///
/// Owns the temporary directory holding the staging file. Dropping the buffer
/// removes both unconditionally.
#[derive(Debug)]
pub struct ExportBuffer {
    dir: TempDir,
    path: PathBuf,
}

impl ExportBuffer {
    /// Create an empty staging file, under `staging_root` if given
    pub fn create(staging_root: Option<&Path>) -> Result<Self> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("iterable-export-");
        let dir = match staging_root {
            Some(root) => builder.tempdir_in(root)?,
            None => builder.tempdir()?,
        };
        let path = dir.path().join("export.ndjson");

        Ok(Self { dir, path })
    }

    /// Path of the staging file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Open the staging file for sequential line reads
    pub async fn reader(&self) -> Result<BufReader<File>> {
        Ok(BufReader::new(File::open(&self.path).await?))
    }
}

/// Issue the export request and drain its body into a staging file
///
/// Status and headers are validated by the client before the body is touched.
/// The connection is fully drained and released here; decoding never races a
/// live response. On any failure the partially written staging area is
/// removed before the error propagates.
pub async fn download(
    client: &HttpClient,
    path: &str,
    request: RequestConfig,
    staging_root: Option<&Path>,
) -> Result<ExportBuffer> {
    let response = client.get_with_config(path, request).await?;

    let buffer = ExportBuffer::create(staging_root)?;
    let file = File::create(buffer.path()).await?;
    let mut writer = BufWriter::with_capacity(COPY_BUFFER_SIZE, file);

    let mut body = response.bytes_stream();
    let mut bytes_copied: u64 = 0;
    while let Some(chunk) = body.next().await {
        let chunk = chunk.map_err(Error::Http)?;
        bytes_copied += chunk.len() as u64;
        writer.write_all(&chunk).await?;
    }
    writer.flush().await?;
    drop(body);

    debug!("Staged {bytes_copied} bytes of export data");
    Ok(buffer)
}
