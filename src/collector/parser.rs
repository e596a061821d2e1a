//! mod_status 본문 파서
//!
//! `Key: value` 형식의 줄 단위 텍스트를 필드로 분리합니다.

/// One `Key: value` line of a status body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusField<'a> {
    /// Field name, matched case-sensitively
    pub key: &'a str,
    /// Raw value, may itself contain colons
    pub value: &'a str,
}

/// Split a line on its first colon, trimming both sides
///
/// Returns `None` for blank lines and lines without a colon.
pub fn split_kv(line: &str) -> Option<StatusField<'_>> {
    let (key, value) = line.split_once(':')?;
    let key = key.trim();
    if key.is_empty() {
        return None;
    }

    Some(StatusField {
        key,
        value: value.trim(),
    })
}

/// Iterate over the fields of a status body
pub fn fields(body: &str) -> impl Iterator<Item = StatusField<'_>> {
    body.split('\n').filter_map(split_kv)
}
