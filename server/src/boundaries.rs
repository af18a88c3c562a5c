use std::path::{Path, PathBuf};

use worldanthem_shared::{BoundaryError, parse_feature_collection};

use crate::config::BOUNDARY_FILE_NAME;

#[derive(Debug, thiserror::Error)]
pub enum InspectError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid boundary data in {path}: {source}")]
    Invalid {
        path: PathBuf,
        #[source]
        source: BoundaryError,
    },
}

/// Read and parse the boundary file under `data_dir`, returning its feature
/// count. The client falls back to sample markers when this would fail.
pub async fn inspect(data_dir: &Path) -> Result<usize, InspectError> {
    let path = data_dir.join(BOUNDARY_FILE_NAME);
    let body = tokio::fs::read_to_string(&path)
        .await
        .map_err(|source| InspectError::Io {
            path: path.clone(),
            source,
        })?;
    let features =
        parse_feature_collection(&body).map_err(|source| InspectError::Invalid { path, source })?;
    Ok(features.len())
}

/// Log the state of the boundary data at startup.
pub async fn report(data_dir: &Path) {
    match inspect(data_dir).await {
        Ok(count) => tracing::info!(count, "boundary data available"),
        Err(e) => tracing::warn!(
            error = %e,
            "boundary data unavailable; the map will show sample markers"
        ),
    }
}
