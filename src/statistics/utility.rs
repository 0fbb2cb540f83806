pub use crate::store::round_decimals;

/// Share of `part` in `total` as a percentage. Returns 0.0 when `total` is zero.
pub fn percentage(part: f64, total: f64) -> f64 {
    if total == 0.0 {
        return 0.0;
    }
    100.0 * part / total
}
