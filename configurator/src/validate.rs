//! Validation and coercion of free-text answers.

use std::fmt;
use std::path::PathBuf;

use tracing::debug;

use crate::core::types::{ArgType, FieldValue};
use crate::io::folder::{FolderStatus, probe_folder};

/// Why an answer was not accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    NotAnInteger,
    NotABool,
    /// The folder does not exist and cannot be created.
    InvalidFolder,
    /// Something that is not a directory already exists at the folder path.
    UnusableFolder,
}

/// A rejected answer, reported back to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    pub input: String,
    pub reason: RejectReason,
}

impl Rejection {
    fn new(input: &str, reason: RejectReason) -> Self {
        Self {
            input: input.to_string(),
            reason,
        }
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let input = &self.input;
        match self.reason {
            RejectReason::NotAnInteger => write!(f, "{input} is not an integer"),
            RejectReason::NotABool => {
                write!(f, "{input} is not a bool. Please enter 'true' or 'false'")
            }
            RejectReason::InvalidFolder => write!(f, "folder {input} is invalid"),
            RejectReason::UnusableFolder => {
                write!(f, "folder {input} already exists but is not a usable directory")
            }
        }
    }
}

/// Coerces raw answers into typed values.
#[derive(Debug, Clone)]
pub struct Validator {
    folder_root: PathBuf,
}

impl Validator {
    /// `folder` answers are resolved against `folder_root`.
    pub fn new(folder_root: impl Into<PathBuf>) -> Self {
        Self {
            folder_root: folder_root.into(),
        }
    }

    pub fn validate(&self, arg_type: ArgType, raw: &str) -> Result<FieldValue, Rejection> {
        match arg_type {
            ArgType::String | ArgType::Date => Ok(FieldValue::text(raw)),
            ArgType::Int => raw
                .parse::<i64>()
                .map(FieldValue::Int)
                .map_err(|_| Rejection::new(raw, RejectReason::NotAnInteger)),
            ArgType::Bool => parse_bool(raw)
                .map(FieldValue::Bool)
                .ok_or_else(|| Rejection::new(raw, RejectReason::NotABool)),
            ArgType::Whitelist => Ok(FieldValue::List(split_whitelist(raw))),
            ArgType::Folder => self.validate_folder(raw),
        }
    }

    fn validate_folder(&self, raw: &str) -> Result<FieldValue, Rejection> {
        if raw.is_empty() {
            return Err(Rejection::new(raw, RejectReason::InvalidFolder));
        }
        let path = self.folder_root.join(raw);
        let status = probe_folder(&path);
        debug!(path = %path.display(), ?status, "folder probed");
        if status.is_usable() {
            return Ok(FieldValue::text(raw));
        }
        let reason = match status {
            FolderStatus::Unusable => RejectReason::UnusableFolder,
            _ => RejectReason::InvalidFolder,
        };
        Err(Rejection::new(raw, reason))
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    if raw.eq_ignore_ascii_case("true") {
        Some(true)
    } else if raw.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

/// Split on commas, trimming each element. Empty elements are kept.
fn split_whitelist(raw: &str) -> Vec<String> {
    raw.split(',').map(|item| item.trim().to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn validator() -> Validator {
        Validator::new(".")
    }

    #[test]
    fn string_and_date_pass_through_unchanged() {
        let v = validator();
        assert_eq!(
            v.validate(ArgType::String, " spaced "),
            Ok(FieldValue::text(" spaced "))
        );
        assert_eq!(
            v.validate(ArgType::Date, "not really a date"),
            Ok(FieldValue::text("not really a date"))
        );
    }

    #[test]
    fn int_parses_base_ten() {
        assert_eq!(validator().validate(ArgType::Int, "-42"), Ok(FieldValue::Int(-42)));
    }

    #[test]
    fn int_rejects_non_numbers() {
        let rejection = validator()
            .validate(ArgType::Int, "abc")
            .expect_err("not an int");
        assert_eq!(rejection.reason, RejectReason::NotAnInteger);
        assert_eq!(rejection.to_string(), "abc is not an integer");
    }

    #[test]
    fn bool_is_case_insensitive() {
        let v = validator();
        assert_eq!(v.validate(ArgType::Bool, "TRUE"), Ok(FieldValue::Bool(true)));
        assert_eq!(v.validate(ArgType::Bool, "False"), Ok(FieldValue::Bool(false)));
        let rejection = v.validate(ArgType::Bool, "yes").expect_err("not a bool");
        assert_eq!(rejection.reason, RejectReason::NotABool);
    }

    #[test]
    fn whitelist_yields_one_more_element_than_commas() {
        let v = validator();
        for raw in ["a", "a,b", " a , b ,c", ",,", ""] {
            let commas = raw.matches(',').count();
            match v.validate(ArgType::Whitelist, raw) {
                Ok(FieldValue::List(items)) => assert_eq!(items.len(), commas + 1, "{raw:?}"),
                other => panic!("unexpected {other:?} for {raw:?}"),
            }
        }
        assert_eq!(
            v.validate(ArgType::Whitelist, " a , b "),
            Ok(FieldValue::List(vec!["a".to_string(), "b".to_string()]))
        );
        assert_eq!(
            v.validate(ArgType::Whitelist, ""),
            Ok(FieldValue::List(vec![String::new()]))
        );
    }

    #[test]
    fn folder_accepts_existing_and_creatable_paths() {
        let temp = tempfile::tempdir().expect("tempdir");
        fs::create_dir(temp.path().join("existing")).expect("mkdir");
        let v = Validator::new(temp.path());

        assert_eq!(
            v.validate(ArgType::Folder, "existing"),
            Ok(FieldValue::text("existing"))
        );
        assert_eq!(v.validate(ArgType::Folder, "fresh"), Ok(FieldValue::text("fresh")));
        assert!(!temp.path().join("fresh").exists());
    }

    #[test]
    fn folder_distinguishes_invalid_from_unusable() {
        let temp = tempfile::tempdir().expect("tempdir");
        fs::write(temp.path().join("file"), "x").expect("write");
        let v = Validator::new(temp.path());

        let unusable = v.validate(ArgType::Folder, "file").expect_err("file");
        assert_eq!(unusable.reason, RejectReason::UnusableFolder);

        let invalid = v
            .validate(ArgType::Folder, "missing/child")
            .expect_err("missing parent");
        assert_eq!(invalid.reason, RejectReason::InvalidFolder);
        assert!(invalid.to_string().contains("missing/child"));

        let empty = v.validate(ArgType::Folder, "").expect_err("empty");
        assert_eq!(empty.reason, RejectReason::InvalidFolder);
    }
}
