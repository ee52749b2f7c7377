//! Page capacity, measurement and flow.

mod capacity;
mod flow;
pub mod measure;
pub mod page_break;

pub use capacity::{LayoutConfig, PageCapacity};
pub use flow::FlowEngine;
pub use measure::{
    FixedHeightMeasurer, MeasurementProvider, TextMetricsMeasurer, Typography, DEFAULT_CACHE_CAPACITY,
    PT_TO_MM, PX_TO_MM,
};
pub use page_break::{BreakDecision, FIT_EPSILON};
