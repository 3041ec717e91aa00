//! Reading and writing contract files.

use super::{Contract, ContractError};
use std::fs;
use std::path::{Path, PathBuf};

/// Parses a contract from raw JSON bytes.
pub fn parse_bytes(data: &[u8]) -> Result<Contract, ContractError> {
    if data.is_empty() {
        return Err(ContractError::Parse("empty data".to_string()));
    }
    serde_json::from_slice(data).map_err(|e| ContractError::Parse(e.to_string()))
}

/// Reads and parses a contract file.
pub fn read_file(path: impl AsRef<Path>) -> Result<Contract, ContractError> {
    let path = path.as_ref();
    let data = fs::read(path).map_err(|source| ContractError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_bytes(&data)
}

/// Pretty-printed JSON document for a contract.
pub fn to_pretty_json(contract: &Contract) -> Result<Vec<u8>, ContractError> {
    Ok(serde_json::to_vec_pretty(contract)?)
}

/// Writes a contract to `path`, creating parent directories as needed.
pub fn write_file(contract: &Contract, path: impl AsRef<Path>) -> Result<(), ContractError> {
    let path = path.as_ref();
    let data = to_pretty_json(contract)?;
    let write_err = |source| ContractError::Write {
        path: path.to_path_buf(),
        source,
    };
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir).map_err(write_err)?;
    }
    fs::write(path, data).map_err(write_err)
}

/// Writes a contract into `dir` under its conventional file name.
pub fn write_to_dir(contract: &Contract, dir: impl AsRef<Path>) -> Result<PathBuf, ContractError> {
    let path = dir
        .as_ref()
        .join(file_name_for(&contract.consumer.name, &contract.provider.name));
    write_file(contract, &path)?;
    Ok(path)
}

/// `<consumer>-<provider>.json`, lowercased, spaces replaced with underscores.
pub fn file_name_for(consumer: &str, provider: &str) -> String {
    format!("{}-{}.json", sanitize(consumer), sanitize(provider))
}

fn sanitize(name: &str) -> String {
    name.to_lowercase().replace(' ', "_")
}

/// Contract files (`*.json`) directly inside `dir`, sorted by name.
pub fn contract_files_in(dir: impl AsRef<Path>) -> Result<Vec<PathBuf>, ContractError> {
    let dir = dir.as_ref();
    let read_err = |source| ContractError::Read {
        path: dir.to_path_buf(),
        source,
    };
    let mut files = Vec::new();
    for entry in fs::read_dir(dir).map_err(read_err)? {
        let path = entry.map_err(read_err)?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "json") {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_names_are_sanitized() {
        assert_eq!(file_name_for("Order Service", "User API"), "order_service-user_api.json");
    }

    #[test]
    fn empty_input_is_a_parse_error() {
        let err = parse_bytes(b"").unwrap_err();
        assert_eq!(err.to_string(), "failed to parse contract JSON: empty data");
    }
}
