use crate::error::Result;
use crate::io::atomic_write;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;

/// Read a JSON document, reinitializing to the default on a missing or
/// unparsable file. The default is written back so the next reader sees a
/// well-formed document.
pub fn load_or_init<T>(path: &Path) -> Result<T>
where
    T: Default + Serialize + DeserializeOwned,
{
    if !path.exists() {
        let doc = T::default();
        save_json(path, &doc)?;
        return Ok(doc);
    }
    match std::fs::read_to_string(path) {
        Ok(content) => match serde_json::from_str(&content) {
            Ok(doc) => Ok(doc),
            Err(_) => {
                let doc = T::default();
                save_json(path, &doc)?;
                Ok(doc)
            }
        },
        Err(_) => {
            let doc = T::default();
            save_json(path, &doc)?;
            Ok(doc)
        }
    }
}

/// Atomically persist a document as pretty-printed JSON.
pub fn save_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let mut data = serde_json::to_vec_pretty(value)?;
    data.push(b'\n');
    atomic_write(path, &data)
}
