use std::{collections::HashMap, path::Path};

use tracing::info;

use crate::{
    key_value_store::Value,
    rdb::{RdbError, RdbParser},
};

/// Loads the snapshot at `path`. A missing file yields an empty keyspace.
pub async fn load_rdb_file(path: &Path) -> Result<HashMap<String, Value>, RdbError> {
    let buffer = match tokio::fs::read(path).await {
        Ok(buffer) => buffer,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            info!(path = %path.display(), "no snapshot found, starting empty");
            return Ok(HashMap::new());
        }
        Err(e) => return Err(e.into()),
    };

    let mut parser = RdbParser::new();
    parser.parse(&buffer)?;

    info!(
        path = %path.display(),
        keys = parser.key_value_store.len(),
        skipped = parser.skipped_keys,
        "snapshot loaded"
    );

    Ok(parser.key_value_store)
}
