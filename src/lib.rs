pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::LayoutConfig;

pub use crate::adapters::http::HttpStore;
pub use crate::core::axis::AxisResolver;
pub use crate::core::cache::BoundedCache;
pub use crate::core::fill_state::{classify, FillBand, FillLevel, FillState};
pub use crate::core::mapper::CompartmentMapper;
pub use crate::core::service::{LayoutService, ServiceOptions};
pub use crate::utils::error::{LayoutError, Result};
