//! Environment/runtime helpers
//!
//! Sanity checks to ensure expected directories exist at startup.

use tracing::info;

/// Ensure the temporary upload directory exists, creating it when missing.
pub async fn ensure_upload_dir(upload_dir: &str) -> anyhow::Result<()> {
    if tokio::fs::metadata(upload_dir).await.is_err() {
        info!(%upload_dir, "creating upload directory");
    }
    tokio::fs::create_dir_all(upload_dir)
        .await
        .map_err(|e| anyhow::anyhow!("cannot create {upload_dir}: {e}"))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn creates_nested_upload_dir() -> anyhow::Result<()> {
        let root = std::env::temp_dir().join(format!("food_uploads_{}", std::process::id()));
        let nested = root.join("a/b");
        ensure_upload_dir(nested.to_str().unwrap()).await?;
        assert!(tokio::fs::metadata(&nested).await?.is_dir());
        // 再次调用应当幂等
        ensure_upload_dir(nested.to_str().unwrap()).await?;
        tokio::fs::remove_dir_all(&root).await?;
        Ok(())
    }
}
