//! Runs the selected widget generators concurrently and assembles their
//! results in registry order.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tokio::time::{Instant, timeout_at};
use tracing::{Instrument, debug, error, info, warn};

use super::{SerializedWidget, Widget, WidgetContext, WidgetDef, WidgetSelection};
use crate::error::InfographicsError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeneratorLimits {
    /// Generators allowed to run at once. Sized to the store's connection pool.
    pub max_concurrency: usize,
    /// Overall deadline for one request.
    pub timeout: Duration,
}

impl Default for GeneratorLimits {
    fn default() -> Self {
        Self {
            max_concurrency: 5,
            timeout: Duration::from_secs(30),
        }
    }
}

type WidgetTask = (&'static WidgetDef, JoinHandle<Result<Widget, InfographicsError>>);

fn abort_all(tasks: impl IntoIterator<Item = WidgetTask>) {
    for (_, handle) in tasks {
        handle.abort();
    }
}

/// Generates every widget `selection` picks from `defs`.
///
/// Output order is `defs` order regardless of completion order. Widgets
/// whose inclusion predicate rejects them are dropped. The first failing
/// widget fails the whole request and cancels the rest; so does the
/// deadline, which reports which widgets finished and which did not.
#[tracing::instrument(
    skip_all,
    fields(news_flash_id = ctx.params.news_flash_id, selection = ?selection)
)]
pub async fn generate_widgets(
    ctx: Arc<WidgetContext>,
    defs: &'static [WidgetDef],
    selection: WidgetSelection,
    limits: GeneratorLimits,
) -> Result<Vec<SerializedWidget>, InfographicsError> {
    let deadline = Instant::now() + limits.timeout;
    let semaphore = Arc::new(Semaphore::new(limits.max_concurrency.max(1)));

    let mut tasks: Vec<WidgetTask> = Vec::new();
    for def in defs.iter().filter(|def| selection.selects(def)) {
        let ctx = ctx.clone();
        let sem = semaphore.clone();
        let name = def.name();
        let span = tracing::info_span!("generate_widget", widget = name, rank = def.id.rank());

        let task = tokio::spawn(
            async move {
                let Ok(_permit) = sem.acquire().await else {
                    return Err(InfographicsError::WidgetAborted { name });
                };
                let started = std::time::Instant::now();
                let widget = (def.generate)(&ctx).await;
                debug!(elapsed_ms = started.elapsed().as_millis() as u64, "Widget generated");
                widget
            }
            .instrument(span),
        );
        tasks.push((def, task));
    }

    let total = tasks.len();
    let mut completed = Vec::with_capacity(total);
    let mut widgets = Vec::with_capacity(total);
    let mut remaining = tasks.into_iter();

    while let Some((def, mut handle)) = remaining.next() {
        let name = def.name();
        let joined = match timeout_at(deadline, &mut handle).await {
            Ok(joined) => joined,
            Err(_) => {
                handle.abort();
                let mut pending = vec![name];
                for (def, handle) in remaining {
                    if handle.is_finished() {
                        completed.push(def.name());
                    } else {
                        pending.push(def.name());
                    }
                    handle.abort();
                }
                warn!(
                    completed = completed.len(),
                    pending = pending.len(),
                    "Request deadline exceeded"
                );
                return Err(InfographicsError::DeadlineExceeded { completed, pending });
            }
        };

        let widget = match joined {
            Ok(Ok(widget)) => widget,
            Ok(Err(e)) => {
                error!(widget = name, error = %e, "Widget generation failed");
                abort_all(remaining);
                return Err(InfographicsError::Widget {
                    name,
                    source: Box::new(e),
                });
            }
            Err(e) => {
                error!(widget = name, error = %e, "Widget task did not complete");
                abort_all(remaining);
                return Err(InfographicsError::WidgetAborted { name });
            }
        };
        completed.push(name);

        if !def.includes(&widget) {
            debug!(widget = name, "Widget excluded from response");
            continue;
        }
        widgets.push(widget.serialize());
    }

    info!(
        generated = total,
        included = widgets.len(),
        "Widgets ready"
    );
    Ok(widgets)
}
