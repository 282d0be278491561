//! Reading GeoJSON input and writing results

use log::debug;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

use crate::document::errors::ReprojResult;

/// Read the whole input from `path`, or from stdin when `path` is `None` or `-`
pub async fn read_input(path: Option<&str>) -> ReprojResult<String> {
    match path {
        Some(path) if path != "-" => {
            debug!("Reading input from {}", path);
            Ok(tokio::fs::read_to_string(path).await?)
        },
        _ => {
            debug!("Reading input from stdin");
            let mut buffer = String::new();
            tokio::io::stdin().read_to_string(&mut buffer).await?;
            Ok(buffer)
        },
    }
}

/// Write `text` plus a trailing newline to `path`, or to stdout
pub async fn write_output(path: Option<&str>, text: &str) -> ReprojResult<()> {
    match path {
        Some(path) if path != "-" => {
            debug!("Writing output to {}", path);
            tokio::fs::write(path, format!("{}\n", text)).await?;
        },
        _ => {
            let mut stdout = tokio::io::stdout();
            stdout.write_all(text.as_bytes()).await?;
            stdout.write_all(b"\n").await?;
            stdout.flush().await?;
        },
    }
    Ok(())
}
