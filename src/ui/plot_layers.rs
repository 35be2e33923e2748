use std::collections::BTreeMap;

use eframe::egui::{Align2, Color32, RichText, Stroke};
use egui_plot::{HLine, Line, LineStyle, PlotPoint, PlotPoints, PlotUi, Polygon, Text};

use crate::config::plot::ChartTheme;
use crate::domain::Candle;
use crate::models::SelectedCandle;
use crate::ui::chart_sync::{MarkerId, MarkerStyle, PriceMarker};

/// Context passed to every layer during rendering.
pub struct LayerContext<'a> {
    pub candles: &'a [Candle],
    pub markers: &'a BTreeMap<MarkerId, PriceMarker>,
    pub selected: &'a [SelectedCandle],
    pub theme: &'a ChartTheme,
    pub x_max: f64,
}

impl LayerContext<'_> {
    /// Plot x of the candle with this time (x is the candle's index in the series).
    fn x_of(&self, time: i64) -> Option<f64> {
        self.candles
            .binary_search_by_key(&time, |c| c.time)
            .ok()
            .map(|i| i as f64)
    }
}

/// A standardized layer in the plot stack.
pub trait PlotLayer {
    fn render(&self, ui: &mut PlotUi, ctx: &LayerContext);
}

// ============================================================================
// CANDLES
// ============================================================================
pub struct CandlestickLayer;

impl PlotLayer for CandlestickLayer {
    fn render(&self, plot_ui: &mut PlotUi, ctx: &LayerContext) {
        for (i, c) in ctx.candles.iter().enumerate() {
            let color = if c.close >= c.open {
                ctx.theme.candle_bullish_color
            } else {
                ctx.theme.candle_bearish_color
            };
            let x = i as f64;
            draw_wick_line(plot_ui, x, c.high, c.low, color, ctx.theme.candle_wick_width);

            let (bottom, top) = c.body_range();
            // Doji still gets a visible body
            let top = if (top - bottom).abs() < f64::EPSILON {
                bottom * 1.00001
            } else {
                top
            };
            draw_body_rect(plot_ui, x, top, bottom, ctx.theme.candle_width_pct, color);
        }
    }
}

#[inline]
fn draw_wick_line(ui: &mut PlotUi, x: f64, top: f64, bottom: f64, color: Color32, width: f32) {
    ui.line(
        Line::new("", PlotPoints::new(vec![[x, bottom], [x, top]]))
            .color(color)
            .width(width),
    );
}

#[inline]
fn draw_body_rect(ui: &mut PlotUi, x: f64, top: f64, bottom: f64, width_pct: f64, color: Color32) {
    let half_w = width_pct / 2.0;
    let pts = vec![
        [x - half_w, bottom],
        [x + half_w, bottom],
        [x + half_w, top],
        [x - half_w, top],
    ];
    ui.polygon(
        Polygon::new("", PlotPoints::new(pts))
            .fill_color(color)
            .stroke(Stroke::NONE),
    );
}

// ============================================================================
// PRICE MARKERS (zone bounds)
// ============================================================================
pub struct PriceMarkerLayer;

impl PlotLayer for PriceMarkerLayer {
    fn render(&self, plot_ui: &mut PlotUi, ctx: &LayerContext) {
        for marker in ctx.markers.values() {
            let style = match marker.style {
                MarkerStyle::Solid => LineStyle::Solid,
                MarkerStyle::Dashed => LineStyle::Dashed {
                    length: ctx.theme.zone_dash_length,
                },
            };
            plot_ui.hline(
                HLine::new(marker.title.unwrap_or_default(), marker.price)
                    .color(marker.color)
                    .style(style)
                    .width(marker.width),
            );

            if let Some(title) = marker.title {
                plot_ui.text(
                    Text::new(
                        "",
                        PlotPoint::new(ctx.x_max, marker.price),
                        RichText::new(title).small().strong().color(marker.color),
                    )
                    .anchor(Align2::RIGHT_BOTTOM),
                );
            }
        }
    }
}

// ============================================================================
// TAGGED CANDLES (manual selection)
// ============================================================================
pub struct SelectionLayer;

impl PlotLayer for SelectionLayer {
    fn render(&self, plot_ui: &mut PlotUi, ctx: &LayerContext) {
        let color = ctx.theme.selection_outline_color;
        let half_w = ctx.theme.candle_width_pct / 2.0 + 0.1;

        for sel in ctx.selected {
            let Some(x) = ctx.x_of(sel.time()) else {
                continue;
            };
            let (low, high) = (sel.candle.low, sel.candle.high);
            let pts = vec![
                [x - half_w, low],
                [x + half_w, low],
                [x + half_w, high],
                [x - half_w, high],
            ];
            plot_ui.polygon(
                Polygon::new("", PlotPoints::new(pts))
                    .fill_color(Color32::TRANSPARENT)
                    .stroke(Stroke::new(ctx.theme.selection_outline_width, color)),
            );
            plot_ui.text(
                Text::new(
                    "",
                    PlotPoint::new(x, high),
                    RichText::new(role_tag(sel)).small().color(color),
                )
                .anchor(Align2::CENTER_BOTTOM),
            );
        }
    }
}

// Compact on-chart tag, e.g. "P2", "LT", "E", "F3".
fn role_tag(sel: &SelectedCandle) -> String {
    use crate::config::CategoryId::*;
    match sel.role_id {
        Prior => format!("P{}", sel.role_index),
        LastTrend => "LT".to_string(),
        Engulf => "E".to_string(),
        Displacement => format!("F{}", sel.role_index),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CategoryId;

    #[test]
    fn role_tags_are_short() {
        let candle = Candle::new(0, 1.0, 1.0, 1.0, 1.0);
        let tag = |role_id, role_index| {
            role_tag(&SelectedCandle {
                candle,
                role_id,
                role_index,
            })
        };
        assert_eq!(tag(CategoryId::Prior, 2), "P2");
        assert_eq!(tag(CategoryId::LastTrend, 1), "LT");
        assert_eq!(tag(CategoryId::Displacement, 3), "F3");
    }
}
