//! Trait and in-memory implementation for the precomputed widget cache.

use std::collections::HashMap;

use anyhow::Result;
use tokio::sync::Mutex;

use crate::widgets::SerializedWidget;

/// Stores the cacheable widgets of a `(news_flash_id, years_ago)` request,
/// already serialized and in registry order.
#[async_trait::async_trait]
pub trait InfographicsCache: Send + Sync {
    /// Returns `None` when nothing has been cached for the request.
    async fn get(
        &self,
        news_flash_id: i64,
        years_ago: i64,
    ) -> Result<Option<Vec<SerializedWidget>>>;

    async fn put(
        &self,
        news_flash_id: i64,
        years_ago: i64,
        widgets: &[SerializedWidget],
    ) -> Result<()>;
}

#[derive(Debug, Default)]
pub struct MemoryInfographicsCache {
    entries: Mutex<HashMap<(i64, i64), Vec<SerializedWidget>>>,
}

impl MemoryInfographicsCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }
}

#[async_trait::async_trait]
impl InfographicsCache for MemoryInfographicsCache {
    async fn get(
        &self,
        news_flash_id: i64,
        years_ago: i64,
    ) -> Result<Option<Vec<SerializedWidget>>> {
        Ok(self
            .entries
            .lock()
            .await
            .get(&(news_flash_id, years_ago))
            .cloned())
    }

    async fn put(
        &self,
        news_flash_id: i64,
        years_ago: i64,
        widgets: &[SerializedWidget],
    ) -> Result<()> {
        self.entries
            .lock()
            .await
            .insert((news_flash_id, years_ago), widgets.to_vec());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::widgets::{Widget, WidgetId};

    #[tokio::test]
    async fn test_put_then_get_by_request_key() {
        let cache = MemoryInfographicsCache::new();
        let widget = Widget::new(WidgetId::VisionZero, ["vision_zero_2_plus_1"])
            .unwrap()
            .serialize();

        assert!(cache.get(1, 3).await.unwrap().is_none());
        cache.put(1, 3, &[widget.clone()]).await.unwrap();

        assert_eq!(cache.get(1, 3).await.unwrap(), Some(vec![widget]));
        assert!(cache.get(1, 5).await.unwrap().is_none());
        assert_eq!(cache.len().await, 1);
    }
}
