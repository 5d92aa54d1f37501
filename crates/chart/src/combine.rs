//! Combiner — merges the reference series and loaded weight series into
//! one [`CombinedTimeSeries`].
//!
//! The output is a fresh value on every call; consumers never observe a
//! partially updated structure between input changes.

use common::{CombinedMeta, CombinedPrice, CombinedTimeSeries, LoadedSeries, PriceSeries};

/// Combine an optional reference price series with the currently loaded
/// weight series.
///
/// Returns `None` when neither input is present — upstream shows an
/// empty/loading display in that case. Otherwise `meta.from` is the
/// earliest start across every contributing series, and `weights_stats`
/// carries the first weight series' statistics (the backend reports one
/// statistics block per series; the first is treated as canonical).
pub fn combine(
    price: Option<&PriceSeries>,
    price_color: &str,
    weights: &[LoadedSeries],
) -> Option<CombinedTimeSeries> {
    if price.is_none() && weights.is_empty() {
        return None;
    }

    let from = weights
        .iter()
        .map(|w| w.series.from)
        .chain(price.map(|p| p.from))
        .min()?;

    Some(CombinedTimeSeries {
        meta: CombinedMeta {
            from,
            weights_stats: weights.first().and_then(|w| w.series.statistics.clone()),
        },
        price: CombinedPrice {
            color: price_color.to_string(),
            points: price.map(|p| p.points.clone()).unwrap_or_default(),
        },
        weights: weights.to_vec(),
    })
}
