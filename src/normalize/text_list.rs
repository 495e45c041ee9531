//! Turns list-ish values of unknown shape into ordered lists of strings.
//!
//! Accepted shapes: arrays, delimited strings, objects (their values are used,
//! keys are discarded) and bare scalars. Entries are trimmed and empty entries
//! are dropped. Tags, tips and notes collapse repeats coming from arrays and
//! objects, while a delimited string keeps its exact recurrence. Ingredients
//! and steps always keep repeats.

use lazy_static::lazy_static;
use regex::Regex;
use serde_json::Value;
use std::collections::HashSet;

use super::coerce::{is_truthy, value_to_text};

lazy_static! {
    static ref STEP_NUMBERING: Regex = Regex::new(r"^\s*\d+\.\s*").unwrap();
}

const LIST_DELIMITERS: &[char] = &['\n', ',', '，', ';', '；', '、'];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Repeats {
    Collapse,
    Keep,
}

/// List split used for tags, tips, notes and insights. Array and object
/// entries are deduplicated; delimited strings are not.
pub fn normalize_text_list(value: Option<&Value>) -> Vec<String> {
    split_list(value, Repeats::Collapse)
}

/// Same splitting rules as [`normalize_text_list`] but repeats survive.
pub fn parse_ingredient_list(value: Option<&Value>) -> Vec<String> {
    split_list(value, Repeats::Keep)
}

/// Instruction steps. Strings are split per line and a leading `"3. "`
/// numbering is stripped from each line. Repeats survive.
pub fn normalize_steps(value: Option<&Value>) -> Vec<String> {
    let Some(value) = value.filter(|v| is_truthy(v)) else {
        return Vec::new();
    };
    match value {
        Value::Array(items) => trimmed_items(items.iter()),
        Value::String(text) => text
            .split('\n')
            .map(|line| STEP_NUMBERING.replace(line, "").trim().to_string())
            .filter(|line| !line.is_empty())
            .collect(),
        Value::Object(map) => match map.get("steps") {
            Some(nested @ Value::Array(_)) => normalize_steps(Some(nested)),
            _ => trimmed_items(map.values()),
        },
        other => trimmed_items(std::iter::once(other)),
    }
}

/// Order-preserving dedup over trimmed, non-empty strings.
pub fn unique_list<I, S>(values: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    let mut result = Vec::new();
    for value in values {
        let text = value.as_ref().trim();
        if text.is_empty() || !seen.insert(text.to_string()) {
            continue;
        }
        result.push(text.to_string());
    }
    result
}

fn split_list(value: Option<&Value>, repeats: Repeats) -> Vec<String> {
    let Some(value) = value.filter(|v| is_truthy(v)) else {
        return Vec::new();
    };
    let items = match value {
        Value::String(text) => return split_delimited(text),
        Value::Array(items) => trimmed_items(items.iter()),
        Value::Object(map) => trimmed_items(map.values()),
        other => trimmed_items(std::iter::once(other)),
    };
    match repeats {
        Repeats::Collapse => unique_list(items),
        Repeats::Keep => items,
    }
}

fn split_delimited(text: &str) -> Vec<String> {
    text.split(LIST_DELIMITERS)
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect()
}

fn trimmed_items<'a>(items: impl Iterator<Item = &'a Value>) -> Vec<String> {
    items
        .filter(|item| !item.is_null())
        .map(|item| value_to_text(item).trim().to_string())
        .filter(|item| !item.is_empty())
        .collect()
}
