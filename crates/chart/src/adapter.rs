//! Chart adapter — reshapes a [`CombinedTimeSeries`] into the plot-ready
//! series list and axis configuration the chart widget consumes.
//!
//! The widget itself is an external collaborator; this module only builds
//! the JSON-shaped model: a filled area for the price on axis 0, a line
//! per weight series on axis 1, and a companion marker series for points
//! carrying a significant annotation.

use common::{CombinedTimeSeries, Metric, Significant};
use serde::Serialize;

/// Kind of a plotted series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SeriesKind {
    Area,
    Line,
    Scatter,
}

/// One data point: a plain `[millis, value]` pair, or an annotated point
/// for significant-event markers.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum DataPoint {
    Pair(i64, f64),
    Annotated {
        x: i64,
        y: f64,
        significant: Significant,
    },
}

/// Marker styling hints for the widget.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
    pub enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub radius: Option<u32>,
}

impl Marker {
    fn hidden() -> Self {
        Self {
            enabled: false,
            symbol: None,
            radius: None,
        }
    }

    fn circle() -> Self {
        Self {
            enabled: true,
            symbol: Some("circle".into()),
            radius: Some(5),
        }
    }
}

/// A plot-ready series.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartSeries {
    #[serde(rename = "type")]
    pub kind: SeriesKind,
    pub name: String,
    pub color: String,
    /// 0 = price axis, 1 = weights axis.
    pub y_axis: u8,
    pub data: Vec<DataPoint>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_width: Option<f64>,
    pub marker: Marker,
    /// Tooltip format for annotated markers (linked title).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tooltip_format: Option<String>,
}

/// Per-axis configuration. Only `min` of axis 0 is ever patched by the
/// adapter; everything else is preserved as configured.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AxisConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    pub opposite: bool,
}

/// The full model handed to the chart widget.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartModel {
    pub series: Vec<ChartSeries>,
    pub y_axis: [AxisConfig; 2],
}

impl ChartModel {
    /// Empty model: no series, axes in their default configuration.
    pub fn empty() -> Self {
        Self {
            series: Vec::new(),
            y_axis: [
                AxisConfig {
                    min: None,
                    max: None,
                    opposite: false,
                },
                AxisConfig {
                    min: None,
                    max: None,
                    opposite: true,
                },
            ],
        }
    }
}

/// Rebuild the chart model from the combined structure. The whole series
/// list is reassembled on every call; `metric` selects which weight field
/// is plotted.
pub fn build_chart(combined: Option<&CombinedTimeSeries>, metric: Metric) -> ChartModel {
    let mut model = ChartModel::empty();
    let Some(combined) = combined else {
        return model;
    };

    // 1. Reference price: filled area on axis 0, tracking the true
    //    observed minimum as the axis floor (not clipped to zero).
    if !combined.price.points.is_empty() {
        let mut min_price = f64::INFINITY;
        let data: Vec<DataPoint> = combined
            .price
            .points
            .iter()
            .map(|p| {
                min_price = min_price.min(p.price);
                DataPoint::Pair(p.tstamp.timestamp_millis(), p.price)
            })
            .collect();

        model.series.push(ChartSeries {
            kind: SeriesKind::Area,
            name: "Price Points".into(),
            color: combined.price.color.clone(),
            y_axis: 0,
            data,
            line_width: Some(0.5),
            marker: Marker::hidden(),
            tooltip_format: None,
        });
        model.y_axis[0].min = Some(min_price);
    }

    // 2. One line per weight series on axis 1, plus a marker series for
    //    significant points when any exist.
    for series in &combined.weights {
        let mut line_data = Vec::with_capacity(series.series.points.len());
        let mut scatter_data = Vec::new();

        for point in &series.series.points {
            let x = point.tstamp.timestamp_millis();
            let y = metric.of(point);
            line_data.push(DataPoint::Pair(x, y));
            if let Some(significant) = &point.significant {
                scatter_data.push(DataPoint::Annotated {
                    x,
                    y,
                    significant: significant.clone(),
                });
            }
        }

        model.series.push(ChartSeries {
            kind: SeriesKind::Line,
            name: series.text.clone(),
            color: series.color.clone(),
            y_axis: 1,
            data: line_data,
            line_width: Some(1.0),
            marker: Marker::hidden(),
            tooltip_format: None,
        });

        if !scatter_data.is_empty() {
            model.series.push(ChartSeries {
                kind: SeriesKind::Scatter,
                name: format!("{} significance", series.text),
                color: series.color.clone(),
                y_axis: 1,
                data: scatter_data,
                line_width: None,
                marker: Marker::circle(),
                tooltip_format: Some(
                    "<a href=\"{point.significant.url}\">{point.significant.title}</a>".into(),
                ),
            });
        }
    }

    model
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};
    use common::{
        CombinedMeta, CombinedPrice, LoadedSeries, PricePoint, WeightPoint, WeightSeries,
    };

    fn day(d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2023, 5, d, 0, 0, 0).unwrap()
    }

    fn weight_point(d: u32, prevalence: f64, sentiment: f64) -> WeightPoint {
        WeightPoint {
            tstamp: day(d),
            prevalence,
            sentiment,
            significant: None,
        }
    }

    fn combined(prices: &[f64], points: Vec<WeightPoint>) -> CombinedTimeSeries {
        let weights = if points.is_empty() {
            Vec::new()
        } else {
            vec![LoadedSeries {
                text: "alpha".into(),
                color: "#d500f9".into(),
                series: WeightSeries {
                    from: day(1),
                    statistics: None,
                    points,
                },
            }]
        };
        CombinedTimeSeries {
            meta: CombinedMeta {
                from: day(1),
                weights_stats: None,
            },
            price: CombinedPrice {
                color: "#90caf9".into(),
                points: prices
                    .iter()
                    .enumerate()
                    .map(|(i, p)| PricePoint {
                        tstamp: day(i as u32 + 1),
                        price: *p,
                    })
                    .collect(),
            },
            weights,
        }
    }

    #[test]
    fn absent_combined_yields_no_series() {
        let model = build_chart(None, Metric::Prevalence);
        assert!(model.series.is_empty());
        assert_eq!(model.y_axis[0].min, None);
    }

    #[test]
    fn empty_price_contributes_no_series() {
        let model = build_chart(
            Some(&combined(&[], vec![weight_point(1, 0.5, 0.0)])),
            Metric::Prevalence,
        );
        assert_eq!(model.series.len(), 1);
        assert_eq!(model.series[0].kind, SeriesKind::Line);
        assert_eq!(model.y_axis[0].min, None);
    }

    #[test]
    fn axis_floor_is_the_observed_minimum() {
        let model = build_chart(Some(&combined(&[5.0, 3.0, 9.0], vec![])), Metric::Prevalence);
        assert_eq!(model.y_axis[0].min, Some(3.0));
        assert_eq!(model.series.len(), 1);
        assert_eq!(model.series[0].kind, SeriesKind::Area);
        assert_eq!(model.series[0].y_axis, 0);
        // Negative floors are kept as observed, not clipped to zero.
        let model = build_chart(Some(&combined(&[-2.0, 4.0], vec![])), Metric::Prevalence);
        assert_eq!(model.y_axis[0].min, Some(-2.0));
        // The weights axis stays untouched.
        assert_eq!(model.y_axis[1], ChartModel::empty().y_axis[1]);
    }

    #[test]
    fn metric_selects_the_plotted_field() {
        let ts = combined(&[], vec![weight_point(1, 0.7, -0.4)]);

        let model = build_chart(Some(&ts), Metric::Prevalence);
        assert_eq!(model.series[0].data[0], DataPoint::Pair(day(1).timestamp_millis(), 0.7));

        let model = build_chart(Some(&ts), Metric::Sentiment);
        assert_eq!(model.series[0].data[0], DataPoint::Pair(day(1).timestamp_millis(), -0.4));
    }

    #[test]
    fn significant_points_get_a_companion_scatter_series() {
        let mut point = weight_point(2, 0.9, 0.1);
        point.significant = Some(Significant {
            title: "Protocol launch".into(),
            url: "https://example.com/launch".into(),
        });
        let ts = combined(&[], vec![weight_point(1, 0.5, 0.0), point]);

        let model = build_chart(Some(&ts), Metric::Prevalence);
        assert_eq!(model.series.len(), 2);
        let scatter = &model.series[1];
        assert_eq!(scatter.kind, SeriesKind::Scatter);
        assert_eq!(scatter.name, "alpha significance");
        assert_eq!(scatter.y_axis, 1);
        assert_eq!(scatter.data.len(), 1);
        assert!(matches!(&scatter.data[0], DataPoint::Annotated { y, .. } if *y == 0.9));
    }

    #[test]
    fn no_scatter_series_without_significant_points() {
        let ts = combined(&[], vec![weight_point(1, 0.5, 0.0), weight_point(2, 0.6, 0.1)]);
        let model = build_chart(Some(&ts), Metric::Prevalence);
        assert_eq!(model.series.len(), 1);
    }

    #[test]
    fn model_serializes_to_widget_shape() {
        let model = build_chart(Some(&combined(&[5.0], vec![])), Metric::Prevalence);
        let json = serde_json::to_value(&model).unwrap();
        assert_eq!(json["series"][0]["type"], "area");
        assert_eq!(json["series"][0]["yAxis"], 0);
        assert_eq!(json["yAxis"][0]["min"], 5.0);
        assert_eq!(json["yAxis"][1]["opposite"], true);
        // Plain points serialize as [millis, value] pairs.
        assert!(json["series"][0]["data"][0].is_array());
    }
}
