//! Column-name heuristics for join-key matching.

use serde::{Deserialize, Serialize};

use crate::inference::semantic::tokenize;

/// Tokens stripped from a name before comparison.
const KEY_TOKENS: &[&str] = &["id", "key", "code", "pk", "fk"];

/// Known aliases for common entities.
pub const SYNONYM_GROUPS: &[&[&str]] = &[
    &["customer", "cust", "client", "buyer"],
    &["product", "prod", "item", "sku"],
    &["order", "ord", "purchase"],
    &["user", "usr", "member", "account"],
    &["employee", "emp", "staff", "worker"],
    &["category", "cat", "type"],
    &["transaction", "txn", "trans"],
    &["location", "loc", "site"],
    &["department", "dept"],
    &["supplier", "vendor"],
];

/// How two column names relate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchType {
    /// Same name once separators and key suffixes are removed
    Exact,
    /// Same stem or known synonyms
    Fuzzy,
    /// Only a shared id-like suffix
    ValueOverlap,
}

impl MatchType {
    /// Confidence a relationship starts from before match statistics apply.
    pub fn base_confidence(&self) -> f64 {
        match self {
            MatchType::Exact => 70.0,
            MatchType::Fuzzy => 50.0,
            MatchType::ValueOverlap => 30.0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MatchType::Exact => "exact",
            MatchType::Fuzzy => "fuzzy",
            MatchType::ValueOverlap => "value_overlap",
        }
    }
}

/// Lowercase name without separators and key tokens; `"id"` when nothing remains.
pub fn normalize_name(name: &str) -> String {
    let kept: String = tokenize(name)
        .into_iter()
        .filter(|t| !KEY_TOKENS.contains(&t.as_str()))
        .collect();
    if kept.is_empty() {
        "id".to_string()
    } else {
        kept
    }
}

/// Strips a plural ending.
pub fn stem(word: &str) -> &str {
    if word.len() > 4 && word.ends_with("es") && !word.ends_with("ses") {
        &word[..word.len() - 2]
    } else if word.len() > 3 && word.ends_with('s') && !word.ends_with("ss") {
        &word[..word.len() - 1]
    } else {
        word
    }
}

fn synonym_group(word: &str) -> Option<usize> {
    SYNONYM_GROUPS.iter().position(|group| group.contains(&word))
}

/// The id-like suffix of a raw column name, if any.
pub fn id_suffix(name: &str) -> Option<&'static str> {
    let lower = name.to_lowercase();
    if lower == "id" || lower.ends_with("_id") || lower.ends_with("-id") || camel_id_suffix(name) {
        Some("id")
    } else if lower.ends_with("_key") || name.ends_with("Key") {
        Some("key")
    } else if lower.ends_with("_code") {
        Some("code")
    } else if lower.ends_with("uuid") {
        Some("uuid")
    } else if lower.ends_with("guid") {
        Some("guid")
    } else if lower == "pk" || lower.ends_with("_pk") || lower.starts_with("pk_") {
        Some("pk")
    } else {
        None
    }
}

fn camel_id_suffix(name: &str) -> bool {
    let Some(prefix) = name.strip_suffix("Id").or_else(|| name.strip_suffix("ID")) else {
        return false;
    };
    prefix.chars().last().is_some_and(|c| c.is_lowercase())
}

/// Whether a name looks like an identifier or key column.
pub fn is_identifier_name(name: &str) -> bool {
    let lower = name.to_lowercase();
    id_suffix(name).is_some()
        || lower.starts_with("fk_")
        || lower.contains("uuid")
        || lower.contains("guid")
}

/// Decides how two column names relate; `None` when they are unrelated.
pub fn match_type(a: &str, b: &str) -> Option<MatchType> {
    let na = normalize_name(a);
    let nb = normalize_name(b);
    if na == nb {
        return Some(MatchType::Exact);
    }

    let (sa, sb) = (stem(&na), stem(&nb));
    if sa == sb {
        return Some(MatchType::Fuzzy);
    }
    if let (Some(ga), Some(gb)) = (
        synonym_group(sa).or_else(|| synonym_group(&na)),
        synonym_group(sb).or_else(|| synonym_group(&nb)),
    ) {
        if ga == gb {
            return Some(MatchType::Fuzzy);
        }
    }

    match (id_suffix(a), id_suffix(b)) {
        (Some(x), Some(y)) if x == y => Some(MatchType::ValueOverlap),
        _ => None,
    }
}
