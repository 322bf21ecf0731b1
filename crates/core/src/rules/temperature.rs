//! Storage temperature codes and their Celsius ranges.
//!
//! BBMRI.de codes storage temperature as a category; MII records the range itself. The table is
//! fixed by the two schemas, so it is compiled in rather than loaded.

const STORAGE_TEMPERATURES: [(&str, i64, i64); 6] = [
    ("temperature2to10", 2, 10),
    ("temperature-18to-35", -35, -18),
    ("temperature-60to-85", -85, -60),
    ("temperatureGN", -195, -160),
    ("temperatureLN", -209, -196),
    ("temperatureRoom", 11, 30),
];

/// Celsius `(low, high)` range of a BBMRI.de storage temperature code.
pub(crate) fn range_for_code(code: &str) -> Option<(f64, f64)> {
    STORAGE_TEMPERATURES
        .iter()
        .find(|(c, _, _)| *c == code)
        .map(|&(_, low, high)| (low as f64, high as f64))
}

/// BBMRI.de storage temperature code for a `(low, high)` range.
///
/// Bounds are truncated toward zero before comparison, so `-85.4..-60.9` matches `-85..-60`.
pub(crate) fn code_for_range(low: f64, high: f64) -> Option<&'static str> {
    let (low, high) = (low.trunc() as i64, high.trunc() as i64);
    STORAGE_TEMPERATURES
        .iter()
        .find(|&&(_, l, h)| l == low && h == high)
        .map(|&(code, _, _)| code)
}
