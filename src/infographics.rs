//! Assembles infographics responses: the full envelope, the cache-backed
//! read path and cache warming.

use std::sync::Arc;

use serde::Serialize;
use tracing::{error, info, warn};

use crate::error::InfographicsError;
use crate::request::{RequestParams, build_request_params};
use crate::services::InfographicsCache;
use crate::statistics::NationalBaselineCache;
use crate::store::{AccidentStore, Filters};
use crate::widgets::{
    GeneratorLimits, SerializedWidget, WIDGETS, WidgetContext, WidgetSelection, generate_widgets,
};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InfographicsMeta {
    pub location_info: Filters,
    pub location_text: String,
}

/// `{"meta": {"location_info": ..., "location_text": ...}, "widgets": [...]}`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InfographicsData {
    pub meta: InfographicsMeta,
    pub widgets: Vec<SerializedWidget>,
}

pub struct Infographics {
    store: Arc<dyn AccidentStore>,
    national_baseline: Arc<NationalBaselineCache>,
    limits: GeneratorLimits,
}

impl Infographics {
    pub fn new(store: Arc<dyn AccidentStore>, limits: GeneratorLimits) -> Self {
        Self {
            store,
            national_baseline: Arc::new(NationalBaselineCache::new()),
            limits,
        }
    }

    /// Shares a national baseline cache with other orchestrators.
    pub fn with_national_baseline(mut self, cache: Arc<NationalBaselineCache>) -> Self {
        self.national_baseline = cache;
        self
    }

    pub async fn request_params(
        &self,
        news_flash_id: i64,
        years_ago: i64,
    ) -> Result<Option<RequestParams>, InfographicsError> {
        Ok(build_request_params(self.store.as_ref(), news_flash_id, years_ago).await?)
    }

    /// Runs the registry entries picked by `selection` for one request.
    pub async fn generate(
        &self,
        params: RequestParams,
        selection: WidgetSelection,
    ) -> Result<Vec<SerializedWidget>, InfographicsError> {
        let ctx = Arc::new(WidgetContext::new(
            params,
            self.store.clone(),
            self.national_baseline.clone(),
        ));
        generate_widgets(ctx, WIDGETS, selection, self.limits).await
    }

    /// Full envelope with every widget, or `None` when the request cannot be
    /// answered.
    #[tracing::instrument(skip(self))]
    pub async fn infographics_data(
        &self,
        news_flash_id: i64,
        years_ago: i64,
    ) -> Result<Option<InfographicsData>, InfographicsError> {
        let Some(params) = self.request_params(news_flash_id, years_ago).await? else {
            return Ok(None);
        };
        let meta = InfographicsMeta {
            location_info: params.location_info.clone(),
            location_text: params.location_text.clone(),
        };
        let widgets = self.generate(params, WidgetSelection::All).await?;
        info!(widgets = widgets.len(), "Infographics data created");
        Ok(Some(InfographicsData { meta, widgets }))
    }

    /// The envelope as a JSON string; `{}` when the request cannot be answered.
    pub async fn create_infographics_data(
        &self,
        news_flash_id: i64,
        years_ago: i64,
    ) -> Result<String, InfographicsError> {
        match self.infographics_data(news_flash_id, years_ago).await? {
            Some(data) => Ok(serde_json::to_string(&data)?),
            None => Ok("{}".to_string()),
        }
    }

    /// Cached widgets followed by freshly generated uncached ones. Never
    /// fails: a miss or any error is logged and yields an empty list.
    #[tracing::instrument(skip(self, cache))]
    pub async fn get_infographics_data(
        &self,
        cache: &dyn InfographicsCache,
        news_flash_id: i64,
        years_ago: i64,
    ) -> Vec<SerializedWidget> {
        match self.merge_cached(cache, news_flash_id, years_ago).await {
            Ok(Some(widgets)) => widgets,
            Ok(None) => {
                error!("Infographics data not found in cache");
                Vec::new()
            }
            Err(e) => {
                error!(error = %e, "Failed to retrieve infographics from cache");
                Vec::new()
            }
        }
    }

    async fn merge_cached(
        &self,
        cache: &dyn InfographicsCache,
        news_flash_id: i64,
        years_ago: i64,
    ) -> anyhow::Result<Option<Vec<SerializedWidget>>> {
        let Some(mut widgets) = cache.get(news_flash_id, years_ago).await? else {
            return Ok(None);
        };
        let Some(params) = self.request_params(news_flash_id, years_ago).await? else {
            warn!("Cached infographics exist but the request cannot be resolved");
            return Ok(None);
        };
        widgets.extend(self.generate(params, WidgetSelection::Uncached).await?);
        Ok(Some(widgets))
    }

    /// Computes and stores the cacheable widgets for every lookback.
    /// Returns how many lookbacks were written.
    #[tracing::instrument(skip(self, cache))]
    pub async fn warm_cache(
        &self,
        cache: &dyn InfographicsCache,
        news_flash_id: i64,
        years_ago: &[i64],
    ) -> anyhow::Result<usize> {
        let mut written = 0;
        for &years in years_ago {
            let Some(params) = self.request_params(news_flash_id, years).await? else {
                warn!(years_ago = years, "Skipping lookback that cannot be resolved");
                continue;
            };
            let widgets = self.generate(params, WidgetSelection::Cached).await?;
            cache.put(news_flash_id, years, &widgets).await?;
            info!(years_ago = years, widgets = widgets.len(), "Cache entry written");
            written += 1;
        }
        Ok(written)
    }
}
