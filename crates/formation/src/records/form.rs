//! Nested decoding of `application/x-www-form-urlencoded` bodies.
//!
//! Bracketed keys build nested values (`director[name]=Jo`), an empty
//! bracket appends to an array (`ids[]=1`) and a key sent more than once
//! collects its values into an array. Objects whose keys are all small
//! indices (`a[0]`, `a[1]`) become arrays ordered by index.

use serde_json::{Map, Value};

use super::domain::Fields;

/// Bracket segments read per key; anything deeper stays one literal key.
const MAX_DEPTH: usize = 5;
/// Highest bracket index still treated as an array position.
const MAX_INDEX: usize = 20;

pub(crate) fn parse_form(body: &[u8]) -> Fields {
    let mut fields = Fields::new();
    for (key, value) in form_urlencoded::parse(body) {
        let Some((root, segments)) = split_key(&key) else {
            continue;
        };
        let slot = fields.entry(root).or_insert(Value::Null);
        *slot = assign(slot.take(), &segments, Value::String(value.into_owned()));
    }
    fields.values_mut().for_each(compact_indices);
    fields
}

/// Split `a[b][]` into `("a", ["b", ""])`. Keys without a well-formed
/// bracket pair are taken literally; an empty root is skipped.
fn split_key(key: &str) -> Option<(String, Vec<String>)> {
    let Some(open) = key.find('[') else {
        return (!key.is_empty()).then(|| (key.to_owned(), Vec::new()));
    };

    let mut segments = Vec::new();
    let mut rest = &key[open..];
    while segments.len() < MAX_DEPTH {
        let Some(inner) = rest.strip_prefix('[') else {
            break;
        };
        let Some(close) = inner.find(']') else {
            break;
        };
        if inner[..close].contains('[') {
            break;
        }
        segments.push(inner[..close].to_owned());
        rest = &inner[close + 1..];
    }

    if segments.is_empty() {
        return Some((key.to_owned(), Vec::new()));
    }
    if segments.len() == MAX_DEPTH && rest.starts_with('[') {
        segments.push(rest.to_owned());
    }

    let root = if open == 0 {
        segments.remove(0)
    } else {
        key[..open].to_owned()
    };
    (!root.is_empty()).then_some((root, segments))
}

fn assign(slot: Value, segments: &[String], value: Value) -> Value {
    let Some((segment, rest)) = segments.split_first() else {
        return combine(slot, value);
    };

    if segment.is_empty() {
        let mut items = match slot {
            Value::Array(items) => items,
            Value::Null => Vec::new(),
            other => vec![other],
        };
        items.push(assign(Value::Null, rest, value));
        return Value::Array(items);
    }

    let mut map = match slot {
        Value::Object(map) => map,
        Value::Null => Map::new(),
        Value::Array(items) => items
            .into_iter()
            .enumerate()
            .map(|(index, item)| (index.to_string(), item))
            .collect(),
        scalar => return Value::Array(vec![scalar, assign(Value::Null, segments, value)]),
    };
    let child = map.entry(segment.as_str()).or_insert(Value::Null);
    *child = assign(child.take(), rest, value);
    Value::Object(map)
}

/// A repeated leaf turns into an array of every value, in arrival order.
fn combine(existing: Value, value: Value) -> Value {
    match existing {
        Value::Null => value,
        Value::Array(mut items) => {
            items.push(value);
            Value::Array(items)
        }
        other => Value::Array(vec![other, value]),
    }
}

fn compact_indices(value: &mut Value) {
    match value {
        Value::Array(items) => items.iter_mut().for_each(compact_indices),
        Value::Object(map) => {
            map.values_mut().for_each(compact_indices);
            if map.is_empty() || !map.keys().all(|key| array_index(key).is_some()) {
                return;
            }

            let mut entries: Vec<(usize, Value)> = std::mem::take(map)
                .into_iter()
                .filter_map(|(key, item)| array_index(&key).map(|index| (index, item)))
                .collect();
            entries.sort_by_key(|(index, _)| *index);
            *value = Value::Array(entries.into_iter().map(|(_, item)| item).collect());
        }
        _ => {}
    }
}

fn array_index(key: &str) -> Option<usize> {
    key.parse::<usize>()
        .ok()
        .filter(|index| *index <= MAX_INDEX && index.to_string() == key)
}
