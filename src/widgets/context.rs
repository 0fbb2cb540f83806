use std::sync::Arc;

use tokio::sync::OnceCell;

use crate::error::StoreError;
use crate::request::RequestParams;
use crate::statistics::{NationalBaselineCache, involved_by_vehicle_type};
use crate::store::{AccidentStore, GroupCount};

/// Everything a widget generator may read. Shared read-only by every
/// generator of one request.
pub struct WidgetContext {
    pub params: RequestParams,
    pub store: Arc<dyn AccidentStore>,
    pub national_baseline: Arc<NationalBaselineCache>,
    involved_by_vehicle_type: OnceCell<Vec<GroupCount>>,
}

impl WidgetContext {
    pub fn new(
        params: RequestParams,
        store: Arc<dyn AccidentStore>,
        national_baseline: Arc<NationalBaselineCache>,
    ) -> Self {
        Self {
            params,
            store,
            national_baseline,
            involved_by_vehicle_type: OnceCell::new(),
        }
    }

    pub fn store(&self) -> &dyn AccidentStore {
        self.store.as_ref()
    }

    /// Injured parties per vehicle type at the request location. Queried
    /// once per request; the driver type and car type widgets both read it.
    pub async fn involved_by_vehicle_type(&self) -> Result<&[GroupCount], StoreError> {
        self.involved_by_vehicle_type
            .get_or_try_init(|| {
                involved_by_vehicle_type(
                    self.store(),
                    &self.params.location_info,
                    self.params.window(),
                )
            })
            .await
            .map(Vec::as_slice)
    }
}
