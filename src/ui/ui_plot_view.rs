use std::collections::BTreeMap;

use anyhow::{Result, bail};
use eframe::egui::{Frame, RichText, Ui, Vec2b};
use egui_plot::{Axis, AxisHints, HPlacement, Plot, VPlacement};

use crate::config::plot::ChartTheme;
use crate::domain::Candle;
use crate::models::SelectedCandle;
use crate::ui::chart_sync::{ChartSurface, ClickSubscription, MarkerId, PriceMarker};
use crate::ui::plot_layers::{CandlestickLayer, LayerContext, PlotLayer, PriceMarkerLayer, SelectionLayer};
use crate::ui::ui_text::UI_TEXT;
use crate::utils::epoch_sec_to_axis_label;

/// The candle chart widget. Owns its copy of the series and its markers;
/// clicks are buffered until the controller drains them.
pub struct EguiChart {
    theme: &'static ChartTheme,
    candles: Vec<Candle>,
    markers: BTreeMap<MarkerId, PriceMarker>,
    next_marker: u64,
    click_sub: Option<ClickSubscription>,
    next_sub: u64,
    pending_clicks: Vec<f64>,
    disposed: bool,
}

impl EguiChart {
    pub fn new(theme: &'static ChartTheme) -> Result<Self> {
        if theme.height <= 0.0 {
            bail!("chart height must be positive, got {}", theme.height);
        }
        if !(0.0..=1.0).contains(&theme.candle_width_pct) {
            bail!("candle width must be within 0..=1, got {}", theme.candle_width_pct);
        }
        Ok(Self {
            theme,
            candles: Vec::new(),
            markers: BTreeMap::new(),
            next_marker: 0,
            click_sub: None,
            next_sub: 0,
            pending_clicks: Vec::new(),
            disposed: false,
        })
    }

    fn x_bounds(&self) -> (f64, f64) {
        let pad = self.theme.plot_x_padding_candles;
        let last = self.candles.len().saturating_sub(1) as f64;
        (-pad, last + pad)
    }

    // Candle range plus every marker, padded.
    fn y_bounds(&self) -> (f64, f64) {
        let prices = self
            .candles
            .iter()
            .flat_map(|c| [c.low, c.high])
            .chain(self.markers.values().map(|m| m.price));
        let (min, max) = prices.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| {
            (lo.min(p), hi.max(p))
        });
        if !min.is_finite() || !max.is_finite() {
            return (0.0, 1.0);
        }
        let range = (max - min).max(max.abs() * 1e-4).max(f64::EPSILON);
        let pad = range * self.theme.plot_y_padding_pct;
        (min - pad, max + pad)
    }

    pub fn show(&mut self, ui: &mut Ui, selected: &[SelectedCandle]) {
        if self.disposed {
            return;
        }
        let theme = self.theme;

        Frame::new().fill(theme.background_color).show(ui, |ui| {
            if self.candles.is_empty() {
                ui.set_min_height(theme.height);
                ui.centered_and_justified(|ui| {
                    ui.label(RichText::new(&UI_TEXT.chart_no_candles).color(theme.text_color));
                });
                return;
            }

            ui.visuals_mut().override_text_color = Some(theme.text_color);
            ui.visuals_mut().widgets.noninteractive.bg_stroke.color = theme.grid_color;

            let (x_min, x_max) = self.x_bounds();
            let (y_min, y_max) = self.y_bounds();

            let response = Plot::new("trainer_chart")
                .height(theme.height)
                .custom_x_axes(vec![create_time_axis(&self.candles)])
                .custom_y_axes(vec![create_price_axis()])
                .label_formatter(|_, _| String::new())
                .allow_double_click_reset(false)
                .allow_scroll(false)
                .allow_boxed_zoom(false)
                .allow_drag(Vec2b { x: false, y: false })
                .allow_zoom(Vec2b { x: false, y: false })
                .show(ui, |plot_ui| {
                    plot_ui.set_plot_bounds_x(x_min..=x_max);
                    plot_ui.set_plot_bounds_y(y_min..=y_max);

                    let ctx = LayerContext {
                        candles: &self.candles,
                        markers: &self.markers,
                        selected,
                        theme,
                        x_max,
                    };

                    let layers: [&dyn PlotLayer; 3] = [&CandlestickLayer, &PriceMarkerLayer, &SelectionLayer];
                    for layer in layers {
                        layer.render(plot_ui, &ctx);
                    }

                    plot_ui.pointer_coordinate()
                });

            if self.click_sub.is_some() && response.response.clicked() {
                if let Some(time) = response.inner.and_then(|p| self.time_at(p.x)) {
                    self.pending_clicks.push(time as f64);
                }
            }
        });
    }

    // Nearest candle slot to a plot x.
    fn time_at(&self, x: f64) -> Option<i64> {
        let i = x.round();
        if i < 0.0 {
            return None;
        }
        self.candles.get(i as usize).map(|c| c.time)
    }
}

impl ChartSurface for EguiChart {
    fn set_series(&mut self, candles: &[Candle]) {
        self.candles = candles.to_vec();
        self.pending_clicks.clear();
    }

    fn create_marker(&mut self, marker: PriceMarker) -> MarkerId {
        self.next_marker += 1;
        let id = MarkerId(self.next_marker);
        self.markers.insert(id, marker);
        id
    }

    fn remove_marker(&mut self, id: MarkerId) {
        self.markers.remove(&id);
    }

    fn subscribe_click(&mut self) -> ClickSubscription {
        self.next_sub += 1;
        let sub = ClickSubscription(self.next_sub);
        self.click_sub = Some(sub);
        sub
    }

    fn unsubscribe_click(&mut self, sub: ClickSubscription) {
        if self.click_sub == Some(sub) {
            self.click_sub = None;
            self.pending_clicks.clear();
        }
    }

    fn take_clicks(&mut self) -> Vec<f64> {
        std::mem::take(&mut self.pending_clicks)
    }

    fn dispose(&mut self) {
        self.disposed = true;
        self.candles.clear();
        self.markers.clear();
        self.pending_clicks.clear();
    }
}

// X is the candle index; labels show that candle's time.
fn create_time_axis(candles: &[Candle]) -> AxisHints<'static> {
    let times: Vec<i64> = candles.iter().map(|c| c.time).collect();
    AxisHints::new(Axis::X)
        .label(UI_TEXT.plot_x_axis.clone())
        .formatter(move |mark, _range| {
            let i = mark.value.round();
            if i < 0.0 || (mark.value - i).abs() > 1e-9 {
                return String::new();
            }
            times
                .get(i as usize)
                .map(|t| epoch_sec_to_axis_label(*t))
                .unwrap_or_default()
        })
        .placement(VPlacement::Bottom)
}

fn create_price_axis() -> AxisHints<'static> {
    AxisHints::new_y()
        .label(UI_TEXT.plot_y_axis.clone())
        .formatter(|mark, _range| format!("{:.5}", mark.value))
        .placement(HPlacement::Right)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PLOT_CONFIG;
    use crate::ui::chart_sync::MarkerStyle;

    #[test]
    fn markers_are_added_and_removed_by_id() {
        let mut chart = EguiChart::new(&PLOT_CONFIG.chart).unwrap();
        let marker = PriceMarker {
            price: 1.25,
            color: PLOT_CONFIG.chart.zone_bullish_color,
            style: MarkerStyle::Solid,
            width: 2.0,
            title: Some("Bullish OB"),
        };
        let a = chart.create_marker(marker.clone());
        let b = chart.create_marker(marker);
        assert_ne!(a, b);
        chart.remove_marker(a);
        assert_eq!(chart.markers.len(), 1);
    }

    #[test]
    fn click_position_snaps_to_nearest_candle() {
        let mut chart = EguiChart::new(&PLOT_CONFIG.chart).unwrap();
        chart.set_series(&[Candle::new(600, 1.0, 2.0, 0.5, 1.5), Candle::new(900, 1.0, 2.0, 0.5, 1.5)]);
        assert_eq!(chart.time_at(0.4), Some(600));
        assert_eq!(chart.time_at(0.6), Some(900));
        assert_eq!(chart.time_at(-0.7), None);
        assert_eq!(chart.time_at(5.0), None);
    }

    #[test]
    fn y_bounds_cover_candles_and_markers() {
        let mut chart = EguiChart::new(&PLOT_CONFIG.chart).unwrap();
        chart.set_series(&[Candle::new(0, 1.0, 2.0, 0.5, 1.5)]);
        chart.create_marker(PriceMarker {
            price: 3.0,
            color: PLOT_CONFIG.chart.zone_bearish_color,
            style: MarkerStyle::Dashed,
            width: 1.0,
            title: None,
        });
        let (lo, hi) = chart.y_bounds();
        assert!(lo < 0.5 && hi > 3.0);
    }
}
