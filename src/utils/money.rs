use crate::domain::model::RoundingMode;
use rust_decimal::{Decimal, RoundingStrategy};

/// 顯示用的小數位數
pub const DISPLAY_SCALE: u32 = 2;

/// 預設營業稅率 7%
pub fn default_tax_rate() -> Decimal {
    Decimal::new(7, 2)
}

/// 四捨五入到兩位小數，只在顯示前套用，累加過程不做捨入
pub fn round_for_display(amount: Decimal, mode: RoundingMode) -> Decimal {
    let strategy = match mode {
        RoundingMode::Ceiling => RoundingStrategy::ToPositiveInfinity,
        RoundingMode::HalfUp => RoundingStrategy::MidpointAwayFromZero,
    };
    let mut rounded = amount.round_dp_with_strategy(DISPLAY_SCALE, strategy);
    rounded.rescale(DISPLAY_SCALE);
    rounded
}

pub fn format_amount(amount: Decimal, mode: RoundingMode) -> String {
    format!("${}", round_for_display(amount, mode))
}
