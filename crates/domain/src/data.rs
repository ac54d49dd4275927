//! Dotted-path access to structured document data
//!
//! Documents carry free-form `system` data (JSON). Mutations are expressed the
//! way the host expresses them: a flat partial-update payload keyed by dotted
//! field paths, e.g. `{"system.equipped": true, "system.attributes.speed.value": 2}`.

use serde_json::{Map, Value};

use crate::error::DomainError;

/// A partial update payload keyed by dotted field paths.
pub type Changes = Map<String, Value>;

/// Read the value at a dotted path.
pub fn get_path<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.')
        .try_fold(root, |node, key| node.as_object()?.get(key))
}

/// Read an integer at a dotted path. Floats are truncated.
pub fn get_i64(root: &Value, path: &str) -> Option<i64> {
    let value = get_path(root, path)?;
    value
        .as_i64()
        .or_else(|| value.as_f64().map(|f| f as i64))
}

/// Read a boolean at a dotted path, treating a missing value as `false`.
pub fn get_flag(root: &Value, path: &str) -> bool {
    get_path(root, path).and_then(Value::as_bool).unwrap_or(false)
}

/// Write `value` at a dotted path, creating intermediate objects as needed.
///
/// Fails when an intermediate segment exists but is not an object.
pub fn set_path(root: &mut Value, path: &str, value: Value) -> Result<(), DomainError> {
    if path.is_empty() {
        return Err(DomainError::data_path(path, "empty path"));
    }

    let mut node = root;
    let mut segments = path.split('.').peekable();

    while let Some(key) = segments.next() {
        if node.is_null() {
            *node = Value::Object(Map::new());
        }
        let object = node
            .as_object_mut()
            .ok_or_else(|| DomainError::data_path(path, format!("'{}' is not an object", key)))?;

        if segments.peek().is_none() {
            object.insert(key.to_string(), value);
            return Ok(());
        }

        node = object
            .entry(key.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
    }

    Ok(())
}

/// Apply every change in the payload, in key order.
pub fn apply_changes(root: &mut Value, changes: &Changes) -> Result<(), DomainError> {
    for (path, value) in changes {
        set_path(root, path, value.clone())?;
    }
    Ok(())
}

/// Parse a relative numeric update such as `"+1"` or `"-2"`.
///
/// Plain numbers and anything without an explicit sign are not relative.
pub fn parse_relative(value: &Value) -> Option<i64> {
    let text = value.as_str()?.trim();
    let (sign, digits) = match text.as_bytes().first().copied()? {
        b'+' => (1, &text[1..]),
        b'-' => (-1, &text[1..]),
        _ => return None,
    };
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse::<i64>().ok().map(|n| sign * n)
}

/// Resolve relative numeric updates against the current data.
///
/// A `"+N"`/`"-N"` string targeting a numeric (or absent) field becomes the
/// absolute `current ± N`. Everything else is passed through verbatim. A sum
/// that does not fit in an `i64` is a [`DomainError::DataPath`].
pub fn resolve_relative(current: &Value, changes: &Changes) -> Result<Changes, DomainError> {
    let mut resolved = Changes::new();
    for (path, value) in changes {
        let next = match parse_relative(value) {
            Some(delta) => match get_path(current, path) {
                None | Some(Value::Null) => Value::from(delta),
                Some(existing) if existing.is_number() => {
                    let base = get_i64(current, path).unwrap_or(0);
                    let sum = base.checked_add(delta).ok_or_else(|| {
                        DomainError::data_path(
                            path.clone(),
                            format!("{base} {delta:+} overflows an integer"),
                        )
                    })?;
                    Value::from(sum)
                }
                Some(_) => value.clone(),
            },
            None => value.clone(),
        };
        resolved.insert(path.clone(), next);
    }
    Ok(resolved)
}
