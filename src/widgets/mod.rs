//! Widget model, registry and the concurrent generator.

mod builders;
mod context;
mod generator;
mod id;
mod registry;
mod widget;

pub use context::WidgetContext;
pub use generator::{GeneratorLimits, generate_widgets};
pub use id::WidgetId;
pub use registry::{GenerateFn, InclusionPredicate, WIDGETS, WidgetDef, WidgetSelection};
pub use widget::{SerializedWidget, Widget, WidgetData, WidgetText};

use futures::future::BoxFuture;

use crate::error::InfographicsError;

pub type WidgetFuture<'a> = BoxFuture<'a, Result<Widget, InfographicsError>>;
