pub mod axis;
pub mod cache;
pub mod envelope;
pub mod field_reader;
pub mod fill_state;
pub mod mapper;
pub mod service;

pub use crate::domain::model::{
    Compartment, CompartmentLayout, Container, ContainerExtent, ContainerFilters, ContainerPage,
    Product, RawRecord, RawRecordList,
};
pub use crate::domain::ports::UpstreamStore;
pub use crate::utils::error::Result;
