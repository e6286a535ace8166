use crate::core::axis::AxisResolver;
use crate::core::cache::{BoundedCache, DEFAULT_FRESHNESS};
use crate::core::mapper::{map_container, CompartmentMapper};
use crate::domain::model::{CompartmentLayout, ContainerExtent, ContainerFilters, ContainerPage};
use crate::domain::ports::UpstreamStore;
use crate::utils::error::{LayoutError, Result};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

pub const DEFAULT_CONTAINER_EXTENT: ContainerExtent = ContainerExtent {
    width: 1950.0,
    depth: 650.0,
};
pub const DEFAULT_PAGE_LIMIT: u32 = 100;

#[derive(Debug, Clone)]
pub struct ServiceOptions {
    pub freshness: Duration,
    /// 相同條件的同時請求共用一次抓取
    pub coalesce_in_flight: bool,
    pub resolver: AxisResolver,
    /// 後端查無此載具 (404) 或尺寸為 0 時使用
    pub default_extent: ContainerExtent,
    pub page_limit: u32,
}

impl Default for ServiceOptions {
    fn default() -> Self {
        Self {
            freshness: DEFAULT_FRESHNESS,
            coalesce_in_flight: true,
            resolver: AxisResolver::default(),
            default_extent: DEFAULT_CONTAINER_EXTENT,
            page_limit: DEFAULT_PAGE_LIMIT,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ContainerListing {
    pub page: ContainerPage,
    pub from_cache: bool,
}

/// 載具清單與格位配置的查詢入口，快取的生命週期與此物件相同
pub struct LayoutService<S: UpstreamStore> {
    store: S,
    options: ServiceOptions,
    mapper: CompartmentMapper,
    cache: Mutex<BoundedCache>,
    in_flight: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl<S: UpstreamStore> LayoutService<S> {
    pub fn new(store: S) -> Self {
        Self::with_options(store, ServiceOptions::default())
    }

    pub fn with_options(store: S, options: ServiceOptions) -> Self {
        Self {
            mapper: CompartmentMapper::new(options.resolver),
            cache: Mutex::new(BoundedCache::new(options.freshness)),
            in_flight: Mutex::new(HashMap::new()),
            store,
            options,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// 快取新鮮時直接回傳，否則同步抓取並覆寫快取。抓取失敗時快取保持原狀
    pub async fn containers(&self, filters: &ContainerFilters) -> Result<ContainerListing> {
        let filters = filters.normalized(self.options.page_limit);
        let signature = filters.signature();

        if let Some(listing) = self.fresh_listing(&signature) {
            return Ok(listing);
        }

        if !self.options.coalesce_in_flight {
            return self.refresh(&filters, signature).await;
        }

        let gate = self.gate_for(&signature);
        let result = {
            let _guard = gate.lock().await;

            // 等待期間可能已由其他請求更新
            match self.fresh_listing(&signature) {
                Some(listing) => {
                    tracing::debug!("Reusing result of concurrent fetch for {}", signature);
                    Ok(listing)
                }
                None => self.refresh(&filters, signature.clone()).await,
            }
        };
        self.release_gate(&signature, gate);
        result
    }

    /// 先確定載具尺寸，再把每筆原始格位換算成實體座標
    pub async fn compartments(&self, container_id: i64) -> Result<CompartmentLayout> {
        let extent = self.resolve_extent(container_id).await?;

        tracing::debug!("📡 Fetching compartments for container {}", container_id);
        let raw = self.store.fetch_compartments(container_id).await?;

        let compartments = self.mapper.map_all(container_id, extent, &raw.records);
        let layout = CompartmentLayout {
            container_id,
            extent,
            compartments,
            total_count: raw.total_count,
        };

        tracing::info!(
            "Mapped {} compartments for container {} ({}mm x {}mm), total width {}mm",
            layout.compartments.len(),
            container_id,
            extent.width,
            extent.depth,
            layout.total_width()
        );

        let overflowing = layout.out_of_bounds();
        if !overflowing.is_empty() {
            tracing::warn!(
                "Container {}: compartments {:?} exceed the container extent",
                container_id,
                overflowing
            );
        }

        Ok(layout)
    }

    pub fn invalidate(&self) {
        self.lock_cache().clear();
    }

    async fn refresh(&self, filters: &ContainerFilters, signature: String) -> Result<ContainerListing> {
        tracing::debug!("📡 Fetching containers for {}", signature);
        let raw = self.store.fetch_containers(filters).await?;

        let page = ContainerPage {
            items: raw.records.iter().map(map_container).collect(),
            total_count: raw.total_count,
        };
        tracing::info!(
            "Fetched {} containers (total {})",
            page.items.len(),
            page.total_count
        );

        self.lock_cache().insert(signature, page.clone());
        Ok(ContainerListing {
            page,
            from_cache: false,
        })
    }

    fn fresh_listing(&self, signature: &str) -> Option<ContainerListing> {
        self.lock_cache()
            .get(signature)
            .filter(|hit| hit.is_fresh)
            .map(|hit| ContainerListing {
                page: hit.page,
                from_cache: true,
            })
    }

    /// 只有查無此載具 (404) 才改用預設尺寸，其他抓取失敗照常回傳
    async fn resolve_extent(&self, container_id: i64) -> Result<ContainerExtent> {
        let cached = self.lock_cache().find_fresh_container(container_id);
        let extent = match cached {
            Some(container) => container.extent(),
            None => match self.store.fetch_container_dimensions(container_id).await {
                Ok(extent) => extent,
                Err(LayoutError::UpstreamStatus { status: 404, .. }) => {
                    tracing::warn!(
                        "Container {} not found in the store, using default dimensions",
                        container_id
                    );
                    ContainerExtent::default()
                }
                Err(e) => return Err(e),
            },
        };

        let defaults = self.options.default_extent;
        Ok(ContainerExtent {
            width: positive_or(extent.width, defaults.width),
            depth: positive_or(extent.depth, defaults.depth),
        })
    }

    fn gate_for(&self, signature: &str) -> Arc<tokio::sync::Mutex<()>> {
        let mut gates = self
            .in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        gates.entry(signature.to_string()).or_default().clone()
    }

    /// 沒有其他等待者時移除 gate，避免每種搜尋字串都永久留下一筆
    fn release_gate(&self, signature: &str, gate: Arc<tokio::sync::Mutex<()>>) {
        let mut gates = self
            .in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        // map 內一份加上手上這一份
        if Arc::strong_count(&gate) <= 2 {
            gates.remove(signature);
        }
    }

    fn lock_cache(&self) -> MutexGuard<'_, BoundedCache> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn positive_or(value: f64, default: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        default
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{RawRecord, RawRecordList};
    use crate::utils::error::LayoutError;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    struct MockStore {
        container_calls: AtomicUsize,
        dimension_calls: AtomicUsize,
        fail_containers: AtomicBool,
        dimensions: Option<ContainerExtent>,
        dimension_failure: u16,
        delay: Duration,
    }

    impl MockStore {
        fn new() -> Self {
            Self {
                container_calls: AtomicUsize::new(0),
                dimension_calls: AtomicUsize::new(0),
                fail_containers: AtomicBool::new(false),
                dimensions: Some(ContainerExtent {
                    width: 1950.0,
                    depth: 650.0,
                }),
                dimension_failure: 404,
                delay: Duration::ZERO,
            }
        }

        fn with_dimensions(mut self, dimensions: Option<ContainerExtent>) -> Self {
            self.dimensions = dimensions;
            self
        }

        fn failing_dimensions(mut self, status: u16) -> Self {
            self.dimensions = None;
            self.dimension_failure = status;
            self
        }

        fn with_delay(mut self, delay: Duration) -> Self {
            self.delay = delay;
            self
        }
    }

    fn raw(value: serde_json::Value) -> RawRecord {
        RawRecord::from_value(value).unwrap()
    }

    #[async_trait::async_trait]
    impl UpstreamStore for MockStore {
        async fn fetch_containers(&self, _filters: &ContainerFilters) -> Result<RawRecordList> {
            self.container_calls.fetch_add(1, Ordering::SeqCst);
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            if self.fail_containers.load(Ordering::SeqCst) {
                return Err(LayoutError::UpstreamStatus {
                    endpoint: "/api/udc".to_string(),
                    status: 503,
                });
            }
            Ok(RawRecordList {
                records: vec![
                    raw(serde_json::json!({"id": 1, "larghezza": 1200, "profondita": 800})),
                    raw(serde_json::json!({"id": 2, "larghezza": 1950, "profondita": 650})),
                ],
                total_count: 2,
            })
        }

        async fn fetch_compartments(&self, _container_id: i64) -> Result<RawRecordList> {
            Ok(RawRecordList {
                records: vec![
                    raw(serde_json::json!({"id": 10, "posX": 0, "posY": 0, "dimX": 500000, "dimY": 1000000})),
                    raw(serde_json::json!({"id": 11, "posX": 500000, "posY": 0, "dimX": 500000, "dimY": 1000000})),
                ],
                total_count: 2,
            })
        }

        async fn fetch_container_dimensions(&self, container_id: i64) -> Result<ContainerExtent> {
            self.dimension_calls.fetch_add(1, Ordering::SeqCst);
            self.dimensions.ok_or(LayoutError::UpstreamStatus {
                endpoint: format!("/api/udc/{}", container_id),
                status: self.dimension_failure,
            })
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_request_is_served_from_cache() {
        let service = LayoutService::new(MockStore::new());
        let filters = ContainerFilters::default();

        let first = service.containers(&filters).await.unwrap();
        let second = service.containers(&filters).await.unwrap();

        assert!(!first.from_cache);
        assert!(second.from_cache);
        assert_eq!(first.page, second.page);
        assert_eq!(service.store().container_calls.load(Ordering::SeqCst), 1);

        tokio::time::advance(Duration::from_secs(31)).await;
        let third = service.containers(&filters).await.unwrap();
        assert!(!third.from_cache);
        assert_eq!(service.store().container_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_refresh_keeps_previous_entry() {
        let service = LayoutService::new(MockStore::new());
        let filters = ContainerFilters::default();
        service.containers(&filters).await.unwrap();

        tokio::time::advance(Duration::from_secs(31)).await;
        service.store().fail_containers.store(true, Ordering::SeqCst);
        let err = service.containers(&filters).await.unwrap_err();
        assert!(matches!(err, LayoutError::UpstreamStatus { status: 503, .. }));

        let signature = filters.normalized(DEFAULT_PAGE_LIMIT).signature();
        let stale = service.lock_cache().get(&signature).unwrap();
        assert!(!stale.is_fresh);
        assert_eq!(stale.page.items.len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_identical_requests_share_one_fetch() {
        let service = LayoutService::new(MockStore::new().with_delay(Duration::from_millis(200)));
        let filters = ContainerFilters::default();

        let (a, b) = tokio::join!(service.containers(&filters), service.containers(&filters));

        assert_eq!(a.unwrap().page, b.unwrap().page);
        assert_eq!(service.store().container_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_without_coalescing_both_requests_fetch() {
        let options = ServiceOptions {
            coalesce_in_flight: false,
            ..Default::default()
        };
        let service = LayoutService::with_options(
            MockStore::new().with_delay(Duration::from_millis(200)),
            options,
        );
        let filters = ContainerFilters::default();

        let (a, b) = tokio::join!(service.containers(&filters), service.containers(&filters));

        assert!(a.is_ok() && b.is_ok());
        assert_eq!(service.store().container_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_compartments_use_cached_container_extent() {
        let service = LayoutService::new(MockStore::new());
        service.containers(&ContainerFilters::default()).await.unwrap();

        let layout = service.compartments(1).await.unwrap();

        assert_eq!(service.store().dimension_calls.load(Ordering::SeqCst), 0);
        assert_eq!(layout.extent.width, 1200.0);
        assert_eq!(layout.compartments[1].x, 600);
        assert_eq!(layout.compartments[1].depth, 800);
        assert!(layout.out_of_bounds().is_empty());
    }

    #[tokio::test]
    async fn test_compartments_fetch_dimensions_when_not_cached() {
        let service = LayoutService::new(MockStore::new());

        let layout = service.compartments(2).await.unwrap();

        assert_eq!(service.store().dimension_calls.load(Ordering::SeqCst), 1);
        assert_eq!(layout.total_width(), 1950);
        assert_eq!(layout.total_count, 2);
    }

    #[tokio::test]
    async fn test_missing_container_falls_back_to_defaults() {
        let options = ServiceOptions {
            default_extent: ContainerExtent {
                width: 1000.0,
                depth: 400.0,
            },
            ..Default::default()
        };
        let service = LayoutService::with_options(MockStore::new().with_dimensions(None), options);

        let layout = service.compartments(5).await.unwrap();

        assert_eq!(layout.extent.width, 1000.0);
        assert_eq!(layout.compartments[0].width, 500);
        assert_eq!(layout.compartments[0].depth, 400);
    }

    #[tokio::test]
    async fn test_dimension_server_error_is_returned() {
        let service = LayoutService::new(MockStore::new().failing_dimensions(503));

        let err = service.compartments(3).await.unwrap_err();

        assert!(matches!(err, LayoutError::UpstreamStatus { status: 503, .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_gates_are_released_after_fetch() {
        let service = LayoutService::new(MockStore::new().with_delay(Duration::from_millis(50)));

        for search in ["UDC-1", "UDC-2", "UDC-3"] {
            let filters = ContainerFilters {
                search: Some(search.to_string()),
                ..Default::default()
            };
            let (a, b) = tokio::join!(service.containers(&filters), service.containers(&filters));
            assert!(a.is_ok() && b.is_ok());
        }

        assert_eq!(service.store().container_calls.load(Ordering::SeqCst), 3);
        assert!(service.in_flight.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalidate_forces_refetch() {
        let service = LayoutService::new(MockStore::new());
        let filters = ContainerFilters::default();
        service.containers(&filters).await.unwrap();
        service.invalidate();
        let listing = service.containers(&filters).await.unwrap();

        assert!(!listing.from_cache);
        assert_eq!(service.store().container_calls.load(Ordering::SeqCst), 2);
    }
}
