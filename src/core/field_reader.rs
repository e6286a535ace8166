//! 多候選鍵的容錯欄位讀取。
//!
//! 後端同一個概念常有好幾種拼法（大小寫、義大利文、英文），這裡依序嘗試候選鍵，
//! 回傳第一個存在且可用的值。缺值是正常結果（`None`），不是錯誤。

use crate::domain::model::RawRecord;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::Value;

/// 各概念的歷史欄位拼法，依優先順序排列
pub mod keys {
    pub const ID: &[&str] = &["id", "Id", "ID"];

    pub const ARTICLE_CODE: &[&str] = &[
        "articleCode",
        "ArticleCode",
        "codiceArticolo",
        "CodiceArticolo",
        "itemCode",
        "ItemCode",
    ];
    pub const ARTICLE_DESCRIPTION: &[&str] = &[
        "articleDescription",
        "ArticleDescription",
        "descrizioneArticolo",
        "DescrizioneArticolo",
    ];
    pub const QUANTITY: &[&str] = &[
        "qtaProdotti",
        "QtaProdotti",
        "quantity",
        "Quantity",
        "stockedQuantity",
        "StockedQuantity",
    ];
    pub const PRODUCT_ID: &[&str] = &["idArticoloOmogeneo", "idArticolo"];
    pub const LOT: &[&str] = &["aggregazione1", "lot", "lotCode"];
    pub const SERIAL_NUMBER: &[&str] = &["aggregazione2", "serialNumber"];
    pub const SSCC: &[&str] = &["auxTesto01", "sscc"];
    pub const EXPIRATION_DATE: &[&str] = &["auxData01", "expirationDate"];
    pub const WEIGHT: &[&str] = &["peso", "weight"];
    pub const TARE: &[&str] = &["tara", "tare"];

    pub const POS_X: &[&str] = &["posX", "posx", "PosX", "x", "X"];
    pub const POS_Y: &[&str] = &["posY", "posy", "PosY", "y", "Y"];
    pub const DIM_X: &[&str] = &["dimX", "dimx", "DimX"];
    pub const DIM_Y: &[&str] = &["dimY", "dimy", "DimY"];
    pub const WIDTH: &[&str] = &["larghezza", "Larghezza", "width", "Width"];
    pub const DEPTH: &[&str] = &["profondita", "Profondita", "depth", "Depth"];
    pub const HEIGHT: &[&str] = &["altezza", "Altezza", "height", "Height"];

    pub const FILL_PERCENTAGE: &[&str] = &[
        "pctRiempimento",
        "PctRiempimento",
        "pctriempimento",
        "fillPercentage",
        "fillPercent",
    ];

    pub const BARCODE: &[&str] = &["barcode", "Barcode"];
    pub const COORDINATE: &[&str] = &["coordinate", "Coordinate"];
    pub const DESCRIPTION: &[&str] = &["descrizione", "Descrizione", "description", "Description"];
    pub const ROW: &[&str] = &["riga", "row"];
    pub const COLUMN: &[&str] = &["colonna", "column"];
    pub const PROGRESSIVE: &[&str] = &["progressivo", "progressive"];
    pub const MAX_PRODUCTS: &[&str] = &["maxProdotti", "maxProducts"];
    pub const MAX_QUANTITY: &[&str] = &["maxQtaProdotti", "maxQuantity"];
    pub const OWNER_ID: &[&str] = &["idUdc", "idUDC", "udcId", "loadingUnitId"];
    pub const COMPARTMENT_BLOCKED: &[&str] =
        &["bloccatoManualmente", "bloccatoPerCriterio", "isBlocked"];
    pub const RESERVATION_COUNT: &[&str] = &["numeroPrenotazioni", "reservationCount"];
    pub const LAST_MODIFIED: &[&str] = &["dataModificaContenuto", "lastModified"];
    pub const LAST_INVENTORY: &[&str] = &["dataUltimoInventario", "lastInventory"];

    pub const CONTAINER_CODE: &[&str] = &["numeroUdc", "NumeroUdc", "code", "Code"];
    pub const WAREHOUSE_ID: &[&str] = &["idMagazzino", "warehouseId"];
    pub const COMPARTMENT_COUNT: &[&str] = &["numSupporti", "compartmentCount"];
    pub const PRODUCT_COUNT: &[&str] = &["numProdotti", "productsCount"];
    pub const CONTAINER_BLOCKED: &[&str] =
        &["bloccataManualmente", "bloccataPerCriterio", "isBlocked"];
    pub const LAST_MOVEMENT: &[&str] = &["dataUltimaMovimentazione", "lastMovement"];
    pub const LOCATION_ID: &[&str] = &["idLocazione", "locationId"];
}

/// 依序讀取數值，無法解析的值視同缺值並繼續下一個候選鍵
pub fn read_number(record: &RawRecord, candidates: &[&str]) -> Option<f64> {
    candidates
        .iter()
        .filter_map(|key| record.get(key))
        .find_map(as_number)
}

/// 依序讀取文字，數字與布林會轉成字串
pub fn read_text(record: &RawRecord, candidates: &[&str]) -> Option<String> {
    candidates
        .iter()
        .filter_map(|key| record.get(key))
        .find_map(as_text)
}

/// 數值讀取後四捨五入為整數
pub fn read_integer(record: &RawRecord, candidates: &[&str]) -> Option<i64> {
    read_number(record, candidates).map(|n| n.round() as i64)
}

/// 任一候選鍵為真即為真，全部缺值時為 false
pub fn read_any_flag(record: &RawRecord, candidates: &[&str]) -> bool {
    candidates
        .iter()
        .filter_map(|key| record.get(key))
        .any(is_truthy)
}

/// 讀取時間戳，接受 RFC 3339、無時區的日期時間或純日期（視為 UTC）
pub fn read_timestamp(record: &RawRecord, candidates: &[&str]) -> Option<DateTime<Utc>> {
    candidates
        .iter()
        .filter_map(|key| record.get(key))
        .filter_map(as_text)
        .find_map(|text| parse_timestamp(&text))
}

fn as_number(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return None;
            }
            trimmed.parse::<f64>().ok()?
        }
        _ => return None,
    };
    number.is_finite().then_some(number)
}

fn as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(number_text(n)),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// 整數值的浮點數不帶小數部分，`1234.0` 輸出為 `1234`
fn number_text(n: &serde_json::Number) -> String {
    match n.as_f64() {
        Some(f) if n.is_f64() && f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", f as i64),
        _ => n.to_string(),
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => matches!(
            s.trim().to_ascii_lowercase().as_str(),
            "true" | "1" | "yes" | "y" | "s" | "si"
        ),
        _ => false,
    }
}

fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
