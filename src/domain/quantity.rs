// ==========================================
// Inventory Count Automation - quantity display
// ==========================================
// The terminal quantity field takes integers without decimals and
// fractions with a comma separator (at most four places).
// ==========================================

use rust_decimal::Decimal;

/// Decimal places kept for display and for the sum check.
pub const QUANTITY_SCALE: u32 = 4;

/// Formats a quantity for the terminal field.
///
/// `7` → `"7"`, `7.50` → `"7,5"`, `0.123456` → `"0,1235"`.
pub fn format_quantity(value: Decimal) -> String {
    let rounded = value.round_dp(QUANTITY_SCALE).normalize();
    if rounded.is_zero() {
        return "0".to_string();
    }
    rounded.to_string().replace('.', ",")
}
