use std::collections::BTreeMap;

use anyhow::Result;
use eframe::egui::Color32;

use crate::config::Direction;
use crate::config::plot::ChartTheme;
use crate::domain::{Candle, ObZone};

#[cfg(debug_assertions)]
use crate::config::DF;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MarkerId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClickSubscription(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerStyle {
    Solid,
    Dashed,
}

/// A full-width horizontal line at one price.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceMarker {
    pub price: f64,
    pub color: Color32,
    pub style: MarkerStyle,
    pub width: f32,
    pub title: Option<&'static str>,
}

/// What the controller needs from a chart widget.
pub trait ChartSurface {
    fn set_series(&mut self, candles: &[Candle]);
    fn create_marker(&mut self, marker: PriceMarker) -> MarkerId;
    fn remove_marker(&mut self, id: MarkerId);
    fn subscribe_click(&mut self) -> ClickSubscription;
    fn unsubscribe_click(&mut self, sub: ClickSubscription);
    /// Raw time coordinates of clicks since the last call.
    fn take_clicks(&mut self) -> Vec<f64>;
    fn dispose(&mut self);
}

/// Upper (solid, labelled) and lower (dashed) bound of one zone.
pub fn zone_markers(zone: &ObZone, theme: &ChartTheme) -> [PriceMarker; 2] {
    let color = match zone.direction {
        Direction::Bullish => theme.zone_bullish_color,
        Direction::Bearish => theme.zone_bearish_color,
    };
    [
        PriceMarker {
            price: zone.high,
            color,
            style: MarkerStyle::Solid,
            width: theme.zone_upper_width,
            title: Some(zone.label()),
        },
        PriceMarker {
            price: zone.low,
            color,
            style: MarkerStyle::Dashed,
            width: theme.zone_lower_width,
            title: None,
        },
    ]
}

/// Keeps one chart widget in step with the engine's series and overlay,
/// and turns widget clicks back into candles.
///
/// A failed mount leaves the controller inert: every push is a no-op and no click resolves.
pub struct ChartSyncController<S: ChartSurface> {
    theme: &'static ChartTheme,
    surface: Option<S>,
    subscription: Option<ClickSubscription>,
    /// time -> candle, rebuilt on every series push.
    index: BTreeMap<i64, Candle>,
    markers: Vec<MarkerId>,
    series_revision: Option<u64>,
    zones_revision: Option<u64>,
    torn_down: bool,
}

impl<S: ChartSurface> ChartSyncController<S> {
    pub fn mount<F>(theme: &'static ChartTheme, factory: F) -> Self
    where
        F: FnOnce(&'static ChartTheme) -> Result<S>,
    {
        let (surface, subscription) = match factory(theme) {
            Ok(mut surface) => {
                let sub = surface.subscribe_click();
                (Some(surface), Some(sub))
            }
            Err(e) => {
                log::error!("Chart could not be created: {:#}", e);
                (None, None)
            }
        };
        Self {
            theme,
            surface,
            subscription,
            index: BTreeMap::new(),
            markers: Vec::new(),
            series_revision: None,
            zones_revision: None,
            torn_down: false,
        }
    }

    pub fn is_mounted(&self) -> bool {
        self.surface.is_some() && !self.torn_down
    }

    pub fn surface_mut(&mut self) -> Option<&mut S> {
        if self.torn_down {
            return None;
        }
        self.surface.as_mut()
    }

    /// Push the series if `revision` is new. Returns whether anything was pushed.
    pub fn sync_candles(&mut self, revision: u64, candles: &[Candle]) -> bool {
        if self.series_revision == Some(revision) {
            return false;
        }
        let Some(surface) = self.surface_mut() else {
            return false;
        };
        surface.set_series(candles);
        self.index = candles.iter().map(|c| (c.time, *c)).collect();
        self.series_revision = Some(revision);

        #[cfg(debug_assertions)]
        if DF.log_chart {
            log::info!("Chart: series r{} pushed ({} candles)", revision, candles.len());
        }
        true
    }

    /// Replace every drawn marker with two per zone, if `revision` is new.
    pub fn sync_zones(&mut self, revision: u64, zones: &[ObZone]) -> bool {
        if self.zones_revision == Some(revision) {
            return false;
        }
        let theme = self.theme;
        let old = std::mem::take(&mut self.markers);
        let Some(surface) = self.surface_mut() else {
            return false;
        };
        for id in old {
            surface.remove_marker(id);
        }
        let markers: Vec<MarkerId> = zones
            .iter()
            .flat_map(|z| zone_markers(z, theme))
            .map(|m| surface.create_marker(m))
            .collect();

        #[cfg(debug_assertions)]
        if DF.log_chart {
            log::info!("Chart: overlay r{} pushed ({} markers)", revision, markers.len());
        }
        self.markers = markers;
        self.zones_revision = Some(revision);
        true
    }

    /// Exact time match only; anything else is ignored.
    pub fn resolve_click(&self, raw_time: f64) -> Option<Candle> {
        if !raw_time.is_finite() || raw_time.fract() != 0.0 {
            return None;
        }
        self.index.get(&(raw_time as i64)).copied()
    }

    /// Resolved candles for every click since the last frame.
    pub fn drain_clicks(&mut self) -> Vec<Candle> {
        let Some(surface) = self.surface_mut() else {
            return Vec::new();
        };
        let raw = surface.take_clicks();
        raw.into_iter()
            .filter_map(|t| {
                let hit = self.resolve_click(t);
                #[cfg(debug_assertions)]
                if DF.log_chart && hit.is_none() {
                    log::info!("Chart: click at {} matched no candle", t);
                }
                hit
            })
            .collect()
    }

    pub fn marker_count(&self) -> usize {
        self.markers.len()
    }

    /// Unsubscribe and dispose once. Later calls do nothing.
    pub fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.torn_down = true;
        if let Some(surface) = self.surface.as_mut() {
            if let Some(sub) = self.subscription.take() {
                surface.unsubscribe_click(sub);
            }
            surface.dispose();
        }
        self.index.clear();
        self.markers.clear();
    }
}

impl<S: ChartSurface> Drop for ChartSyncController<S> {
    fn drop(&mut self) {
        self.teardown();
    }
}
