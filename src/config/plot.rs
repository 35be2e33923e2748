//! Plot visualization configuration

use eframe::egui::Color32;

/// Fixed visual theme the chart widget is constructed with.
pub struct ChartTheme {
    pub height: f32,
    pub background_color: Color32,
    pub text_color: Color32,
    pub grid_color: Color32,

    // --- CANDLESTICKS ---
    pub candle_bullish_color: Color32,
    pub candle_bearish_color: Color32,
    pub candle_width_pct: f64,  // 0.0 to 1.0 (relative to one candle slot)
    pub candle_wick_width: f32, // Pixels

    // --- ZONE MARKERS ---
    pub zone_bullish_color: Color32,
    pub zone_bearish_color: Color32,
    pub zone_upper_width: f32,
    pub zone_lower_width: f32,
    pub zone_dash_length: f32,

    // --- TAGGED CANDLES ---
    pub selection_outline_color: Color32,
    pub selection_outline_width: f32,

    pub plot_y_padding_pct: f64, // e.g. 0.05 = 5% padding top and bottom
    pub plot_x_padding_candles: f64,
}

pub struct PlotConfig {
    pub chart: ChartTheme,

    // --- SEMANTIC COLORS ---
    pub color_found: Color32,
    pub color_not_found: Color32,
    pub color_error: Color32,
    pub color_info: Color32,
    pub color_warning: Color32,
    pub color_text_neutral: Color32,
    pub color_text_subdued: Color32,
}

pub const PLOT_CONFIG: PlotConfig = PlotConfig {
    chart: ChartTheme {
        height: 560.0,
        background_color: Color32::from_rgb(2, 6, 23), // #020617
        text_color: Color32::from_rgb(203, 213, 245),  // #cbd5f5
        grid_color: Color32::from_rgb(31, 41, 55),     // #1f2937

        candle_bullish_color: Color32::from_rgb(34, 197, 94), // #22c55e
        candle_bearish_color: Color32::from_rgb(239, 68, 68), // #ef4444
        candle_width_pct: 0.7,
        candle_wick_width: 1.0,

        zone_bullish_color: Color32::from_rgb(22, 163, 74), // #16a34a
        zone_bearish_color: Color32::from_rgb(220, 38, 38), // #dc2626
        zone_upper_width: 2.0,
        zone_lower_width: 1.0,
        zone_dash_length: 6.0,

        selection_outline_color: Color32::from_rgb(250, 204, 21), // Amber
        selection_outline_width: 2.0,

        plot_y_padding_pct: 0.05,
        plot_x_padding_candles: 2.0,
    },

    color_found: Color32::from_rgb(34, 197, 94),
    color_not_found: Color32::from_rgb(248, 113, 113),
    color_error: Color32::from_rgb(251, 146, 60),
    color_info: Color32::from_rgb(125, 211, 252),
    color_warning: Color32::from_rgb(250, 204, 21),
    color_text_neutral: Color32::WHITE,
    color_text_subdued: Color32::GRAY,
};
