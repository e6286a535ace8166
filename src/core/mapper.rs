use crate::core::axis::AxisResolver;
use crate::core::field_reader::{
    keys, read_any_flag, read_integer, read_number, read_text, read_timestamp,
};
use crate::domain::model::{Compartment, Container, ContainerExtent, Product, RawRecord};

/// 原始格位記錄轉成標準格位。單筆資料不完整時退化成原點的零尺寸格位，不會中斷整批
#[derive(Debug, Clone, Default)]
pub struct CompartmentMapper {
    resolver: AxisResolver,
}

impl CompartmentMapper {
    pub fn new(resolver: AxisResolver) -> Self {
        Self { resolver }
    }

    /// 輸出與輸入一一對應，順序不變
    pub fn map_all(
        &self,
        container_id: i64,
        extent: ContainerExtent,
        records: &[RawRecord],
    ) -> Vec<Compartment> {
        records
            .iter()
            .map(|record| self.map_one(container_id, extent, record))
            .collect()
    }

    pub fn map_one(
        &self,
        container_id: i64,
        extent: ContainerExtent,
        record: &RawRecord,
    ) -> Compartment {
        let article_code = read_text(record, keys::ARTICLE_CODE);
        let article_description = read_text(record, keys::ARTICLE_DESCRIPTION);
        let quantity = read_number(record, keys::QUANTITY);

        let products = match &article_code {
            Some(code) => vec![product_from(record, code, article_description.as_deref(), quantity)],
            None => Vec::new(),
        };

        let resolver = &self.resolver;
        let x = resolver.resolve_position(read_number(record, keys::POS_X), extent.width);
        let y = resolver.resolve_position(read_number(record, keys::POS_Y), extent.depth);
        let width = resolver.resolve_size(
            read_number(record, keys::DIM_X),
            extent.width,
            read_number(record, keys::WIDTH),
        );
        let depth = resolver.resolve_size(
            read_number(record, keys::DIM_Y),
            extent.depth,
            read_number(record, keys::DEPTH),
        );

        let id = read_integer(record, keys::ID).unwrap_or(0);
        if width == 0 && depth == 0 {
            tracing::warn!(
                "Compartment {} of container {} has no usable geometry, rendering as empty cell",
                id,
                container_id
            );
        }

        let coordinate = read_text(record, keys::COORDINATE);
        let barcode = read_text(record, keys::BARCODE)
            .or_else(|| coordinate.clone())
            .unwrap_or_default();
        let description = read_text(record, keys::DESCRIPTION).unwrap_or_else(|| {
            format!("Compartment {}", coordinate.as_deref().unwrap_or("?"))
        });

        let reservation_count = read_integer(record, keys::RESERVATION_COUNT)
            .map(|n| n.clamp(0, u32::MAX as i64) as u32)
            .unwrap_or(0);

        Compartment {
            id,
            loading_unit_id: read_integer(record, keys::OWNER_ID).unwrap_or(container_id),
            barcode,
            x,
            y,
            width,
            depth,
            fill_percentage: read_number(record, keys::FILL_PERCENTAGE).unwrap_or(0.0),
            products,
            description,
            row: read_integer(record, keys::ROW),
            column: read_integer(record, keys::COLUMN),
            progressive: read_integer(record, keys::PROGRESSIVE),
            weight: read_number(record, keys::WEIGHT),
            tare: read_number(record, keys::TARE),
            max_products: read_number(record, keys::MAX_PRODUCTS),
            max_quantity: read_number(record, keys::MAX_QUANTITY),
            current_quantity: quantity.unwrap_or(0.0),
            is_blocked: read_any_flag(record, keys::COMPARTMENT_BLOCKED),
            is_reserved: reservation_count > 0,
            reservation_count,
            last_modified: read_timestamp(record, keys::LAST_MODIFIED),
            last_inventory: read_timestamp(record, keys::LAST_INVENTORY),
            article_code,
            article_description,
        }
    }
}

fn product_from(
    record: &RawRecord,
    code: &str,
    description: Option<&str>,
    quantity: Option<f64>,
) -> Product {
    Product {
        id: read_integer(record, keys::PRODUCT_ID).unwrap_or(0),
        code: code.to_string(),
        description: description.unwrap_or("No description").to_string(),
        quantity: quantity.unwrap_or(0.0),
        lot: read_text(record, keys::LOT),
        serial_number: read_text(record, keys::SERIAL_NUMBER),
        sscc: read_text(record, keys::SSCC),
        expiration_date: read_text(record, keys::EXPIRATION_DATE),
        weight: read_number(record, keys::WEIGHT),
    }
}

/// 原始載具記錄轉成標準載具
pub fn map_container(record: &RawRecord) -> Container {
    let id = read_integer(record, keys::ID).unwrap_or(0);
    let compartment_count = read_count(record, keys::COMPARTMENT_COUNT);
    let occupied = read_count(record, keys::PRODUCT_COUNT);

    Container {
        id,
        code: read_text(record, keys::CONTAINER_CODE).unwrap_or_else(|| id.to_string()),
        barcode: read_text(record, keys::BARCODE),
        description: read_text(record, keys::DESCRIPTION).unwrap_or_default(),
        warehouse_id: read_integer(record, keys::WAREHOUSE_ID).unwrap_or(1),
        width: read_number(record, keys::WIDTH).unwrap_or(0.0),
        depth: read_number(record, keys::DEPTH).unwrap_or(0.0),
        height: read_number(record, keys::HEIGHT).unwrap_or(0.0),
        weight: read_number(record, keys::WEIGHT).unwrap_or(0.0),
        compartment_count,
        occupied_compartment_count: occupied,
        empty_compartment_count: compartment_count.saturating_sub(occupied),
        is_blocked: read_any_flag(record, keys::CONTAINER_BLOCKED),
        last_movement: read_timestamp(record, keys::LAST_MOVEMENT),
        location_code: read_text(record, keys::LOCATION_ID).map(|loc| format!("LOC-{}", loc)),
    }
}

/// 載具尺寸，缺值為 0
pub fn read_extent(record: &RawRecord) -> ContainerExtent {
    ContainerExtent {
        width: read_number(record, keys::WIDTH).unwrap_or(0.0),
        depth: read_number(record, keys::DEPTH).unwrap_or(0.0),
    }
}

fn read_count(record: &RawRecord, candidates: &[&str]) -> u32 {
    read_integer(record, candidates)
        .map(|n| n.clamp(0, u32::MAX as i64) as u32)
        .unwrap_or(0)
}
