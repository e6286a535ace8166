use crate::domain::model::{RawRecord, RawRecordList};
use serde_json::Value;

const TOTAL_KEYS: &[&str] = &["total", "totalCount", "count"];

/// 拆開後端回應外殼：裸陣列、`items`、`data`，或包在 `data` / `result` 裡的物件
pub fn extract_items(payload: &Value) -> Vec<RawRecord> {
    match payload {
        Value::Array(items) => items
            .iter()
            .cloned()
            .filter_map(RawRecord::from_value)
            .collect(),
        Value::Object(obj) => {
            if let Some(items @ Value::Array(_)) = obj.get("items") {
                return extract_items(items);
            }
            if let Some(data @ Value::Array(_)) = obj.get("data") {
                return extract_items(data);
            }
            match present(obj.get("data")).or_else(|| present(obj.get("result"))) {
                Some(inner) => extract_items(inner),
                None => Vec::new(),
            }
        }
        _ => Vec::new(),
    }
}

/// 總數依序找頂層與 `data` 底下的 total/totalCount/count，跳過 null 與無法解析的值，
/// 都沒有就用筆數
pub fn extract_total(payload: &Value, item_count: usize) -> u64 {
    let count_in = |value: &Value| {
        TOTAL_KEYS
            .iter()
            .filter_map(|key| value.get(key))
            .find_map(as_count)
    };

    count_in(payload)
        .or_else(|| payload.get("data").and_then(count_in))
        .unwrap_or(item_count as u64)
}

pub fn unwrap_list(payload: &Value) -> RawRecordList {
    let records = extract_items(payload);
    let total_count = extract_total(payload, records.len());
    RawRecordList {
        records,
        total_count,
    }
}

/// 單筆資料可能裸露，也可能包在 `data` / `result` 裡
pub fn unwrap_single(payload: &Value) -> Option<RawRecord> {
    match payload {
        Value::Object(obj) => {
            for key in ["data", "result"] {
                if let Some(inner @ Value::Object(_)) = obj.get(key) {
                    return unwrap_single(inner);
                }
            }
            RawRecord::from_value(payload.clone())
        }
        Value::Array(items) => items.first().and_then(unwrap_single),
        _ => None,
    }
}

fn present(value: Option<&Value>) -> Option<&Value> {
    value.filter(|v| !v.is_null())
}

fn as_count(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
