//! Backend resource shapes
//!
//! These are read leniently: unknown fields are ignored and missing ones
//! default. Only presence is checked (empty lists, missing content).

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use crate::error::LoadError;

/// Blog category as listed on the home page
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Category {
    #[serde(default)]
    pub id: Value,
    #[serde(rename = "Name", alias = "name", default)]
    pub name: String,
    #[serde(rename = "Description", alias = "description", default)]
    pub description: Option<String>,
}

/// Article entry in a category listing
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ArticleSummary {
    #[serde(default)]
    pub id: Value,
    #[serde(rename = "Title", alias = "title", default)]
    pub title: String,
    #[serde(rename = "PublishedDate", alias = "published_date", default)]
    pub published_date: Option<String>,
}

/// Full article
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Article {
    #[serde(default)]
    pub id: Value,
    #[serde(rename = "Title", alias = "title", default)]
    pub title: String,
    #[serde(rename = "Content", alias = "content", default)]
    pub content: Option<String>,
    #[serde(rename = "PublishedDate", alias = "published_date", default)]
    pub published_date: Option<String>,
}

/// Static page such as "about"
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Page {
    #[serde(rename = "Content", alias = "content", default)]
    pub content: Option<String>,
}

/// Render an id that may arrive as a number or a string
pub fn id_text(id: &Value) -> Option<String> {
    match id {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Decode a single object payload
pub fn decode<T: DeserializeOwned>(data: Value) -> Result<T, LoadError> {
    serde_json::from_value(data).map_err(|e| LoadError::InvalidPayload(e.to_string()))
}

/// Decode a list payload; `null` counts as an empty list
pub fn decode_list<T: DeserializeOwned>(data: Value) -> Result<Vec<T>, LoadError> {
    if data.is_null() {
        return Ok(Vec::new());
    }
    decode(data)
}

/// Content that is present and not blank
pub fn non_blank(content: &Option<String>) -> Option<&str> {
    content.as_deref().filter(|c| !c.trim().is_empty())
}
