//! 單軸座標/尺寸換算。
//!
//! 後端有時給實體單位（毫米），有時給以 1,000,000 為滿刻度的正規化值。
//! 判斷依據：`raw <= total * 2` 視為實體值，否則視為正規化值。這是從實際資料
//! 歸納出的經驗法則，門檻因此做成可設定。

pub const DEFAULT_NORMALIZATION_SCALE: f64 = 1_000_000.0;
pub const DEFAULT_ABSOLUTE_THRESHOLD_FACTOR: f64 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisResolver {
    /// 代表 100% 的正規化刻度
    pub normalization_scale: f64,
    /// `raw <= total * factor` 時視為實體值
    pub absolute_threshold_factor: f64,
}

impl Default for AxisResolver {
    fn default() -> Self {
        Self {
            normalization_scale: DEFAULT_NORMALIZATION_SCALE,
            absolute_threshold_factor: DEFAULT_ABSOLUTE_THRESHOLD_FACTOR,
        }
    }
}

impl AxisResolver {
    pub fn new(normalization_scale: f64, absolute_threshold_factor: f64) -> Self {
        Self {
            normalization_scale,
            absolute_threshold_factor,
        }
    }

    /// 缺值、負值或非有限值回傳 0
    pub fn resolve_position(&self, raw: Option<f64>, total: f64) -> i64 {
        match usable(raw) {
            Some(value) => self.disambiguate(value, total),
            None => 0,
        }
    }

    /// `raw` 不可用時改用記錄自身宣告的實體尺寸 `fallback`，兩者皆無則為 0
    pub fn resolve_size(&self, raw: Option<f64>, total: f64, fallback: Option<f64>) -> i64 {
        if let Some(value) = usable(raw) {
            return self.disambiguate(value, total);
        }
        match fallback.filter(|f| f.is_finite()) {
            Some(declared) => declared.round() as i64,
            None => 0,
        }
    }

    /// `raw` 是否已是實體單位
    pub fn is_absolute(&self, raw: f64, total: f64) -> bool {
        // 容器尺寸未知時無法正規化，一律當作實體值
        !(total > 0.0) || raw <= total * self.absolute_threshold_factor
    }

    fn disambiguate(&self, raw: f64, total: f64) -> i64 {
        if self.is_absolute(raw, total) {
            raw.round() as i64
        } else {
            ((raw / self.normalization_scale) * total).round() as i64
        }
    }
}

fn usable(raw: Option<f64>) -> Option<f64> {
    raw.filter(|v| v.is_finite() && *v >= 0.0)
}
