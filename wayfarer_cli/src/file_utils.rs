use std::{fs::File, io::BufReader, path::Path};

use serde::{Serialize, de::DeserializeOwned};

pub fn read_json<T>(path: &Path) -> Result<T, anyhow::Error>
where
    T: DeserializeOwned,
{
    let file = File::open(path)?;
    Ok(serde_json::from_reader(BufReader::new(file))?)
}

/// Writes `value` as pretty JSON, creating missing parent folders.
pub fn write_json<T>(path: &Path, value: &T) -> Result<(), anyhow::Error>
where
    T: Serialize + ?Sized,
{
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }

    std::fs::write(path, serde_json::to_string_pretty(value)?)?;
    Ok(())
}
