use crate::domain::model::{ContainerExtent, ContainerFilters, RawRecordList};
use crate::utils::error::Result;
use async_trait::async_trait;

/// 上游倉儲後端。回傳的欄位名稱不穩定，由 core 層負責容錯解讀
#[async_trait]
pub trait UpstreamStore: Send + Sync {
    async fn fetch_containers(&self, filters: &ContainerFilters) -> Result<RawRecordList>;
    async fn fetch_compartments(&self, container_id: i64) -> Result<RawRecordList>;
    /// 尺寸未知時回傳 0
    async fn fetch_container_dimensions(&self, container_id: i64) -> Result<ContainerExtent>;
}
