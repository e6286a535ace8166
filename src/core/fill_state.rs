//! 填充百分比分級：13 段色階與 6 段標籤。
//!
//! 超出 [0, 100] 的輸入不特別處理，需要時由呼叫端先用 [`clamp_percentage`]。

use serde::Serialize;

/// 13 段色階，由淺綠到深紅，順序即深淺順序
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FillBand {
    Empty,
    NearEmpty,
    Under20,
    Under30,
    Under40,
    Under50,
    Under60,
    Under70,
    Under80,
    Under90,
    Under95,
    NearFull,
    Full,
}

impl FillBand {
    pub const ALL: [FillBand; 13] = [
        FillBand::Empty,
        FillBand::NearEmpty,
        FillBand::Under20,
        FillBand::Under30,
        FillBand::Under40,
        FillBand::Under50,
        FillBand::Under60,
        FillBand::Under70,
        FillBand::Under80,
        FillBand::Under90,
        FillBand::Under95,
        FillBand::NearFull,
        FillBand::Full,
    ];

    pub fn from_percentage(percentage: f64) -> Self {
        if percentage == 0.0 {
            FillBand::Empty
        } else if percentage < 10.0 {
            FillBand::NearEmpty
        } else if percentage < 20.0 {
            FillBand::Under20
        } else if percentage < 30.0 {
            FillBand::Under30
        } else if percentage < 40.0 {
            FillBand::Under40
        } else if percentage < 50.0 {
            FillBand::Under50
        } else if percentage < 60.0 {
            FillBand::Under60
        } else if percentage < 70.0 {
            FillBand::Under70
        } else if percentage < 80.0 {
            FillBand::Under80
        } else if percentage < 90.0 {
            FillBand::Under90
        } else if percentage < 95.0 {
            FillBand::Under95
        } else if percentage < 100.0 {
            FillBand::NearFull
        } else {
            FillBand::Full
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            FillBand::Empty => "empty",
            FillBand::NearEmpty => "near-empty",
            FillBand::Under20 => "10-20",
            FillBand::Under30 => "20-30",
            FillBand::Under40 => "30-40",
            FillBand::Under50 => "40-50",
            FillBand::Under60 => "50-60",
            FillBand::Under70 => "60-70",
            FillBand::Under80 => "70-80",
            FillBand::Under90 => "80-90",
            FillBand::Under95 => "90-95",
            FillBand::NearFull => "near-full",
            FillBand::Full => "full",
        }
    }

    /// 渲染端使用的色碼
    pub fn color(self) -> &'static str {
        match self {
            FillBand::Empty => "#f0fdf4",
            FillBand::NearEmpty => "#dcfce7",
            FillBand::Under20 => "#bbf7d0",
            FillBand::Under30 => "#86efac",
            FillBand::Under40 => "#fef9c3",
            FillBand::Under50 => "#fef08a",
            FillBand::Under60 => "#fde047",
            FillBand::Under70 => "#fed7aa",
            FillBand::Under80 => "#fdba74",
            FillBand::Under90 => "#fb923c",
            FillBand::Under95 => "#f97316",
            FillBand::NearFull => "#ea580c",
            FillBand::Full => "#dc2626",
        }
    }
}

/// 較粗的 6 段標籤
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum FillLevel {
    Empty,
    Low,
    MediumLow,
    MediumHigh,
    High,
    Full,
}

impl FillLevel {
    pub fn from_percentage(percentage: f64) -> Self {
        if percentage == 0.0 {
            FillLevel::Empty
        } else if percentage < 25.0 {
            FillLevel::Low
        } else if percentage < 50.0 {
            FillLevel::MediumLow
        } else if percentage < 75.0 {
            FillLevel::MediumHigh
        } else if percentage < 100.0 {
            FillLevel::High
        } else {
            FillLevel::Full
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            FillLevel::Empty => "Empty",
            FillLevel::Low => "Low",
            FillLevel::MediumLow => "Medium-Low",
            FillLevel::MediumHigh => "Medium-High",
            FillLevel::High => "High",
            FillLevel::Full => "Full",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FillState {
    pub band: FillBand,
    pub level: FillLevel,
}

impl FillState {
    pub fn color(&self) -> &'static str {
        self.band.color()
    }

    pub fn label(&self) -> &'static str {
        self.level.label()
    }
}

pub fn classify(percentage: f64) -> FillState {
    FillState {
        band: FillBand::from_percentage(percentage),
        level: FillLevel::from_percentage(percentage),
    }
}

/// 截到 [0, 100]，NaN 視為 0
pub fn clamp_percentage(percentage: f64) -> f64 {
    if percentage.is_nan() {
        0.0
    } else {
        percentage.clamp(0.0, 100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoints() {
        assert_eq!(classify(0.0).band, FillBand::Empty);
        assert_eq!(classify(0.0).band.name(), "empty");
        assert_eq!(classify(0.0).label(), "Empty");
        assert_eq!(classify(100.0).band.name(), "full");
        assert_eq!(classify(100.0).label(), "Full");
        assert_eq!(classify(0.01).band, FillBand::NearEmpty);
        assert_eq!(classify(99.99).band, FillBand::NearFull);
    }

    #[test]
    fn test_band_lower_bounds_are_inclusive() {
        let bounds = [10.0, 20.0, 30.0, 40.0, 50.0, 60.0, 70.0, 80.0, 90.0, 95.0];
        for (offset, bound) in bounds.iter().enumerate() {
            assert_eq!(FillBand::from_percentage(*bound).index(), offset + 2);
            assert_eq!(FillBand::from_percentage(bound - 0.001).index(), offset + 1);
        }
    }

    #[test]
    fn test_classify_is_monotonic() {
        let mut previous = classify(0.0);
        let mut p = 0.0;
        while p <= 100.0 {
            let current = classify(p);
            assert!(current.band >= previous.band, "band regressed at {p}");
            assert!(current.level >= previous.level, "level regressed at {p}");
            previous = current;
            p += 0.25;
        }
    }

    #[test]
    fn test_thirty_seven_percent() {
        let state = classify(37.0);
        assert_eq!(state.label(), "Medium-Low");
        assert_eq!(state.band, FillBand::Under40);
        assert_eq!(state.band.name(), "30-40");
        assert_eq!(state.color(), "#fef9c3");
    }

    #[test]
    fn test_palette_is_distinct() {
        let mut colors: Vec<&str> = FillBand::ALL.iter().map(|b| b.color()).collect();
        colors.sort();
        colors.dedup();
        assert_eq!(colors.len(), FillBand::ALL.len());
    }

    #[test]
    fn test_clamp_percentage() {
        assert_eq!(clamp_percentage(-4.0), 0.0);
        assert_eq!(clamp_percentage(140.0), 100.0);
        assert_eq!(clamp_percentage(f64::NAN), 0.0);
        assert_eq!(clamp_percentage(42.0), 42.0);
    }
}
