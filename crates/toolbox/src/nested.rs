//! Helpers for nested JSON objects addressed by key paths such as `a.b.c`.

use serde_json::{Map, Value};

use crate::error::{Result, ToolboxError};

/// Every entry at every depth as `(key path, value)`, parents before children.
pub fn walk(object: &Map<String, Value>) -> Vec<(Vec<&str>, &Value)> {
    let mut out = Vec::new();
    walk_into(object, &mut Vec::new(), &mut out);
    out
}

fn walk_into<'a>(
    object: &'a Map<String, Value>,
    prefix: &mut Vec<&'a str>,
    out: &mut Vec<(Vec<&'a str>, &'a Value)>,
) {
    for (key, value) in object {
        prefix.push(key);
        out.push((prefix.clone(), value));
        if let Value::Object(inner) = value {
            walk_into(inner, prefix, out);
        }
        prefix.pop();
    }
}

/// A single-level object whose keys are the nested key paths joined by `delim`.
pub fn flatten(object: &Map<String, Value>, delim: &str) -> Map<String, Value> {
    let mut flat = Map::new();
    for (key, value) in object {
        match value {
            Value::Object(inner) => {
                for (inner_key, inner_value) in flatten(inner, delim) {
                    flat.insert(format!("{key}{delim}{inner_key}"), inner_value);
                }
            }
            other => {
                flat.insert(key.clone(), other.clone());
            }
        }
    }
    flat
}

/// The value at a `delim`-separated key path.
pub fn get_nested<'a>(object: &'a Map<String, Value>, key: &str, delim: &str) -> Result<&'a Value> {
    get_path(object, key.split(delim)).ok_or_else(|| ToolboxError::KeyNotFound(key.to_string()))
}

/// The value at a key path given as separate segments.
pub fn get_path<'a, 'k>(
    object: &'a Map<String, Value>,
    path: impl IntoIterator<Item = &'k str>,
) -> Option<&'a Value> {
    let mut segments = path.into_iter();
    let mut current = object.get(segments.next()?)?;
    for segment in segments {
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}

/// Some value whose innermost key is `key`, searching parents before children.
pub fn get_any_nested<'a>(object: &'a Map<String, Value>, key: &str) -> Result<&'a Value> {
    walk(object)
        .into_iter()
        .find(|(path, _)| path.last() == Some(&key))
        .map(|(_, value)| value)
        .ok_or_else(|| ToolboxError::KeyNotFound(key.to_string()))
}

/// Remove the value at a `delim`-separated key path.
pub fn del_nested(
    object: &mut Map<String, Value>,
    key: &str,
    delim: &str,
    ignore_missing: bool,
) -> Result<()> {
    let segments: Vec<&str> = key.split(delim).collect();
    let Some((last, parents)) = segments.split_last() else {
        return Ok(());
    };

    let mut current = object;
    for segment in parents {
        match current.get_mut(*segment).and_then(Value::as_object_mut) {
            Some(inner) => current = inner,
            None if ignore_missing => return Ok(()),
            None => return Err(ToolboxError::KeyNotFound(key.to_string())),
        }
    }
    if current.remove(*last).is_none() && !ignore_missing {
        return Err(ToolboxError::KeyNotFound(key.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn sample() -> Map<String, Value> {
        match json!({"a": {"b": {"c": 1}, "d": 2}, "e": 3}) {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[test]
    fn walk_visits_parents_first() {
        let object = sample();
        let paths: Vec<String> = walk(&object).iter().map(|(p, _)| p.join("/")).collect();
        assert_eq!(paths, vec!["a", "a/b", "a/b/c", "a/d", "e"]);
    }

    #[test]
    fn flatten_joins_keys() {
        let flat = flatten(&sample(), ".");
        assert_eq!(Value::Object(flat), json!({"a.b.c": 1, "a.d": 2, "e": 3}));
    }

    #[test]
    fn nested_lookup() {
        let object = sample();
        assert_eq!(get_nested(&object, "a.b.c", ".").unwrap(), &json!(1));
        assert_eq!(get_nested(&object, "a/d", "/").unwrap(), &json!(2));
        assert!(matches!(
            get_nested(&object, "a.x", "."),
            Err(ToolboxError::KeyNotFound(k)) if k == "a.x"
        ));
        assert!(get_nested(&object, "e.f", ".").is_err());
        assert_eq!(get_any_nested(&object, "c").unwrap(), &json!(1));
        assert!(get_any_nested(&object, "zzz").is_err());
    }

    #[test]
    fn delete_nested() {
        let mut object = sample();
        del_nested(&mut object, "a.b.c", ".", false).unwrap();
        assert_eq!(Value::Object(object.clone()), json!({"a": {"b": {}, "d": 2}, "e": 3}));

        assert!(del_nested(&mut object, "a.b.c", ".", false).is_err());
        del_nested(&mut object, "a.b.c", ".", true).unwrap();
        del_nested(&mut object, "x.y", ".", true).unwrap();
        assert!(del_nested(&mut object, "x.y", ".", false).is_err());
    }
}
