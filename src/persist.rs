use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::File;
use std::io::{BufReader, BufWriter};

/// Writes `value` to `path` as pretty-printed JSON.
pub(crate) fn save_json<T: Serialize>(value: &T, path: &str) -> std::io::Result<()> {
    let writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(writer, value).map_err(std::io::Error::from)
}

/// Reads a `T` back from a JSON file. Malformed or rejected content surfaces
/// as `ErrorKind::InvalidData`.
pub(crate) fn load_json<T: DeserializeOwned>(path: &str) -> std::io::Result<T> {
    let reader = BufReader::new(File::open(path)?);
    serde_json::from_reader(reader).map_err(std::io::Error::from)
}
