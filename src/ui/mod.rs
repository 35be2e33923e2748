mod chart_sync;
mod plot_layers;
mod styles;
mod ui_config;
mod ui_panels;
mod ui_plot_view;
mod ui_text;

pub use chart_sync::{
    ChartSurface, ChartSyncController, ClickSubscription, MarkerId, MarkerStyle, PriceMarker,
    zone_markers,
};

pub use styles::{SemanticColor, banner_color};
pub(crate) use styles::UiStyleExt;

pub use ui_config::{UI_CONFIG, UI_TEXT};
pub use ui_panels::{ActionBar, ManualAction, ManualSelectionPanel, render_result_banner};
pub use ui_plot_view::EguiChart;
