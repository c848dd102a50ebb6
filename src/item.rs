//! Stable addressing of items in the nested dataset.
//!
//! An [`ItemPath`] is a zero-based index path. Inside element identifiers it is
//! written as a key with 1-based segments joined by `_`, e.g. `[0, 1, 2]`
//! becomes `1_2_3` and `item-1_2_3-label`.

use thiserror::Error;

pub const DEFAULT_SEPARATOR: &str = "_";
pub const ITEM_PREFIX: &str = "item-";

pub type ItemPath = Vec<usize>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    #[error("invalid item key segment `{0}`")]
    InvalidSegment(String),
    #[error("malformed element id `{0}`")]
    MalformedId(String),
}

pub fn path_to_key(path: &[usize]) -> String {
    path.iter()
        .map(|index| (index + 1).to_string())
        .collect::<Vec<_>>()
        .join(DEFAULT_SEPARATOR)
}

pub fn key_to_path(key: &str) -> Result<ItemPath, AddressError> {
    key_to_path_with(key, DEFAULT_SEPARATOR)
}

/// Decodes a key written with a custom separator. The empty key is the empty
/// path.
pub fn key_to_path_with(key: &str, separator: &str) -> Result<ItemPath, AddressError> {
    if key.is_empty() {
        return Ok(Vec::new());
    }
    key.split(separator)
        .map(|segment| {
            segment
                .parse::<usize>()
                .ok()
                .and_then(|value| value.checked_sub(1))
                .ok_or_else(|| AddressError::InvalidSegment(segment.to_string()))
        })
        .collect()
}

/// `item-<key>-<role>`; the empty path yields `item--<role>`.
pub fn path_to_element_id(role: &str, path: &[usize]) -> String {
    format!("{ITEM_PREFIX}{}-{role}", path_to_key(path))
}

/// Decodes the key held in the second hyphen-separated field of an id.
pub fn id_to_path(id: &str) -> Result<ItemPath, AddressError> {
    let key = id
        .split('-')
        .nth(1)
        .ok_or_else(|| AddressError::MalformedId(id.to_string()))?;
    key_to_path(key)
}

pub fn btn_add_id(path: &[usize]) -> String {
    format!("btn-add-{}", path_to_key(path))
}

pub fn btn_remove_id(path: &[usize]) -> String {
    format!("btn-remove-{}", path_to_key(path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_round_trip() {
        for path in [vec![0], vec![0, 1, 2], vec![9, 0, 41], vec![3, 3]] {
            assert_eq!(key_to_path(&path_to_key(&path)).unwrap(), path);
        }
        assert_eq!(path_to_key(&[]), "");
    }

    #[test]
    fn element_id_shapes() {
        assert_eq!(path_to_element_id("button", &[0, 1, 2]), "item-1_2_3-button");
        assert_eq!(path_to_element_id("button", &[]), "item--button");
        assert_eq!(btn_add_id(&[4]), "btn-add-5");
        assert_eq!(btn_remove_id(&[0, 1]), "btn-remove-1_2");
    }

    #[test]
    fn id_to_path_reads_second_field() {
        assert_eq!(id_to_path("item-1_2_3-button").unwrap(), vec![0, 1, 2]);
        assert_eq!(id_to_path("item--button").unwrap(), Vec::<usize>::new());
    }

    #[test]
    fn custom_separator() {
        assert_eq!(key_to_path_with("2.1", ".").unwrap(), vec![1, 0]);
    }

    #[test]
    fn malformed_input_is_reported() {
        assert_eq!(
            id_to_path("title"),
            Err(AddressError::MalformedId("title".to_string()))
        );
        assert_eq!(
            key_to_path("1_x"),
            Err(AddressError::InvalidSegment("x".to_string()))
        );
        assert_eq!(
            key_to_path("0"),
            Err(AddressError::InvalidSegment("0".to_string()))
        );
    }
}
