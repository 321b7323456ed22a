use crate::{AslError, AslResult};
use uuid::Uuid;

pub const ID_LENGTH: usize = 7;

/// Short random token. Collisions are improbable, not impossible; graphs
/// still reject duplicate ids on insert.
pub fn new_id() -> String {
    let seed = Uuid::new_v4();
    let digest = blake3::hash(seed.as_bytes()).to_hex();
    digest[..ID_LENGTH].to_string()
}

pub(crate) fn prefixed_id(prefix: &str) -> String {
    format!("{prefix}-{}", new_id())
}

pub fn is_reference_path(path: &str) -> bool {
    path == "$" || path.starts_with("$.")
}

pub fn ensure_reference_path(path: &str) -> AslResult<()> {
    if is_reference_path(path) {
        Ok(())
    } else {
        Err(AslError::PathFormat {
            path: path.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_id_expected_fixed_length_hex() {
        let id = new_id();
        assert_eq!(id.len(), ID_LENGTH);
        assert!(id.chars().all(|ch| ch.is_ascii_hexdigit()));
    }

    #[test]
    fn new_id_repeated_calls_expected_distinct() {
        assert_ne!(new_id(), new_id());
    }

    #[test]
    fn prefixed_id_expected_type_prefix() {
        let id = prefixed_id("Task");
        assert!(id.starts_with("Task-"));
        assert_eq!(id.len(), "Task-".len() + ID_LENGTH);
    }

    #[test]
    fn is_reference_path_root_and_dotted_expected_true() {
        assert!(is_reference_path("$"));
        assert!(is_reference_path("$.foo.bar"));
        assert!(!is_reference_path("foo"));
        assert!(!is_reference_path("$foo"));
        assert!(!is_reference_path(""));
    }

    #[test]
    fn ensure_reference_path_invalid_expected_path_format_error() {
        let error = ensure_reference_path("foo").expect_err("should fail");
        assert!(matches!(error, AslError::PathFormat { ref path } if path == "foo"));
    }
}
