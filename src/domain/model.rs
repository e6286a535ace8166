use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// 倉儲後端原樣交付的一筆資料，欄位名稱不保證穩定
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    pub data: HashMap<String, serde_json::Value>,
}

impl RawRecord {
    /// 只接受 JSON 物件，其他型別回傳 None
    pub fn from_value(value: serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::Object(obj) => Some(Self {
                data: obj.into_iter().collect(),
            }),
            _ => None,
        }
    }

    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.data.get(key)
    }
}

/// 後端回傳的一頁原始資料
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRecordList {
    pub records: Vec<RawRecord>,
    pub total_count: u64,
}

/// 容器在平面上的實體尺寸（毫米）
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ContainerExtent {
    pub width: f64,
    pub depth: f64,
}

/// 載具 (loading unit / UDC)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Container {
    pub id: i64,
    pub code: String,
    pub barcode: Option<String>,
    pub description: String,
    pub warehouse_id: i64,
    pub width: f64,
    pub depth: f64,
    pub height: f64,
    pub weight: f64,
    pub compartment_count: u32,
    pub occupied_compartment_count: u32,
    pub empty_compartment_count: u32,
    pub is_blocked: bool,
    pub last_movement: Option<DateTime<Utc>>,
    pub location_code: Option<String>,
}

impl Container {
    pub fn extent(&self) -> ContainerExtent {
        ContainerExtent {
            width: self.width,
            depth: self.depth,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerPage {
    pub items: Vec<Container>,
    pub total_count: u64,
}

/// 格位內的一筆商品快照，沒有回指格位的參考
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: i64,
    pub code: String,
    pub description: String,
    pub quantity: f64,
    pub lot: Option<String>,
    pub serial_number: Option<String>,
    pub sscc: Option<String>,
    pub expiration_date: Option<String>,
    pub weight: Option<f64>,
}

/// 載具內的格位，座標與尺寸皆為實體單位
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Compartment {
    pub id: i64,
    pub loading_unit_id: i64,
    pub barcode: String,
    pub x: i64,
    pub y: i64,
    pub width: i64,
    pub depth: i64,
    /// 未截斷，可能超出 [0, 100]
    pub fill_percentage: f64,
    pub products: Vec<Product>,
    pub description: String,
    pub row: Option<i64>,
    pub column: Option<i64>,
    pub progressive: Option<i64>,
    pub weight: Option<f64>,
    pub tare: Option<f64>,
    pub max_products: Option<f64>,
    pub max_quantity: Option<f64>,
    pub current_quantity: f64,
    pub is_blocked: bool,
    pub is_reserved: bool,
    pub reservation_count: u32,
    pub last_modified: Option<DateTime<Utc>>,
    pub last_inventory: Option<DateTime<Utc>>,
    pub article_code: Option<String>,
    pub article_description: Option<String>,
}

impl Compartment {
    /// 位置加尺寸是否落在容器範圍內，相加溢位視為超出
    pub fn fits_within(&self, extent: &ContainerExtent) -> bool {
        let (Some(right), Some(bottom)) = (
            self.x.checked_add(self.width),
            self.y.checked_add(self.depth),
        ) else {
            return false;
        };
        self.x >= 0 && self.y >= 0 && right as f64 <= extent.width && bottom as f64 <= extent.depth
    }
}

/// 一個載具的完整格位配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompartmentLayout {
    pub container_id: i64,
    pub extent: ContainerExtent,
    pub compartments: Vec<Compartment>,
    pub total_count: u64,
}

impl CompartmentLayout {
    pub fn total_width(&self) -> i64 {
        self.compartments
            .iter()
            .fold(0i64, |total, c| total.saturating_add(c.width))
    }

    /// 超出容器範圍的格位 id，僅供檢查，不做修正
    pub fn out_of_bounds(&self) -> Vec<i64> {
        self.compartments
            .iter()
            .filter(|c| !c.fits_within(&self.extent))
            .map(|c| c.id)
            .collect()
    }
}

/// 載具清單查詢條件
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerFilters {
    pub limit: Option<u32>,
    pub offset: Option<u32>,
    pub search: Option<String>,
}

impl ContainerFilters {
    /// 補上預設分頁並整理搜尋字串，讓等價的條件得到相同的快取鍵
    pub fn normalized(&self, default_limit: u32) -> Self {
        let search = self
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        Self {
            limit: Some(self.limit.unwrap_or(default_limit)),
            offset: Some(self.offset.unwrap_or(0)),
            search,
        }
    }

    /// 條件的標準序列化，作為快取鍵
    pub fn signature(&self) -> String {
        let mut params = BTreeMap::new();
        if let Some(limit) = self.limit {
            params.insert("limit", limit.to_string());
        }
        if let Some(offset) = self.offset {
            params.insert("offset", offset.to_string());
        }
        if let Some(search) = &self.search {
            params.insert("search", search.clone());
        }
        // BTreeMap 序列化為字串不會失敗
        serde_json::to_string(&params).unwrap_or_default()
    }

    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(limit) = self.limit {
            pairs.push(("limit", limit.to_string()));
        }
        if let Some(offset) = self.offset {
            pairs.push(("offset", offset.to_string()));
        }
        if let Some(search) = &self.search {
            pairs.push(("search", search.clone()));
        }
        pairs
    }
}
