pub mod upload;
pub mod writer;

/// One CSV object ready for upload.
#[derive(Debug, Clone, PartialEq)]
pub struct StageFile {
    /// Object name relative to the stage prefix.
    pub name: String,
    pub bytes: bytes::Bytes,
    pub rows: usize,
}

/// Object name for part `part` (1-based) of `parts`.
pub fn object_name(stem: &str, part: usize, parts: usize) -> String {
    if parts <= 1 {
        format!("{stem}.csv")
    } else {
        format!("{stem}_part_{part:04}.csv")
    }
}

/// Whether `name` is one of the objects a resource with this stem may write.
pub fn belongs_to_stem(stem: &str, name: &str) -> bool {
    if name == format!("{stem}.csv") {
        return true;
    }
    name.strip_prefix(stem)
        .and_then(|rest| rest.strip_prefix("_part_"))
        .and_then(|rest| rest.strip_suffix(".csv"))
        .is_some_and(|n| n.len() >= 4 && n.bytes().all(|b| b.is_ascii_digit()))
}
