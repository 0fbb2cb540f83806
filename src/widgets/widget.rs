use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::WidgetId;
use crate::error::InfographicsError;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WidgetText {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl WidgetText {
    pub fn title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            comment: None,
        }
    }

    pub fn comment(comment: impl Into<String>) -> Self {
        Self {
            title: None,
            comment: Some(comment.into()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.comment.is_none()
    }
}

/// Output of one widget generator.
#[derive(Debug, Clone, PartialEq)]
pub struct Widget {
    pub id: WidgetId,
    pub items: Value,
    pub text: Option<WidgetText>,
    pub meta: Option<Map<String, Value>>,
}

impl Widget {
    pub fn new(id: WidgetId, items: impl Serialize) -> Result<Self, InfographicsError> {
        Ok(Self {
            id,
            items: serde_json::to_value(items)?,
            text: None,
            meta: None,
        })
    }

    pub fn with_text(mut self, text: WidgetText) -> Self {
        self.text = Some(text);
        self
    }

    pub fn with_meta(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.meta
            .get_or_insert_with(Map::new)
            .insert(key.to_string(), value.into());
        self
    }

    /// True when `items` holds nothing: an empty array or object, or null.
    pub fn is_empty(&self) -> bool {
        match &self.items {
            Value::Array(items) => items.is_empty(),
            Value::Object(items) => items.is_empty(),
            Value::Null => true,
            _ => false,
        }
    }

    /// Wire shape. `meta.rank` is always set; empty text is omitted.
    pub fn serialize(self) -> SerializedWidget {
        let mut meta = self.meta.unwrap_or_default();
        meta.insert("rank".to_string(), Value::from(self.id.rank()));
        SerializedWidget {
            name: self.id.name().to_string(),
            data: WidgetData {
                items: self.items,
                text: self.text.filter(|t| !t.is_empty()),
            },
            meta,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WidgetData {
    pub items: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<WidgetText>,
}

/// `{"name": ..., "data": {"items": ..., "text"?: ...}, "meta": {"rank": ..., ...}}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerializedWidget {
    pub name: String,
    pub data: WidgetData,
    pub meta: Map<String, Value>,
}

impl SerializedWidget {
    pub fn rank(&self) -> Option<u64> {
        self.meta.get("rank").and_then(Value::as_u64)
    }
}
