use std::sync::LazyLock;

pub const ICON_REFRESH: &str = "🔄";
pub const ICON_CANDLE: &str = "📊";
pub const ICON_CLOCK: &str = "🕓";
pub const ICON_COG: &str = "⏳"; // "working"
pub const ICON_TARGET: &str = "🎯";
pub const ICON_CLOSE: &str = "✖";
pub const ICON_WARNING: &str = "⚠";

pub struct UiText {
    pub app_title: String,

    // --- TOP BAR ---
    pub tb_mode: String,
    pub tb_timeframe: String,
    pub tb_refresh: String,
    pub tb_loading: String,
    pub tb_candles_suffix: String,
    pub tb_instrument: String,
    pub tb_shortcuts: String,

    // --- PLOT LABELS ---
    pub plot_x_axis: String,
    pub plot_y_axis: String,
    pub chart_no_candles: String,
    pub chart_unavailable: String,

    // --- ACTIONS ---
    pub actions_heading: String,
    pub action_checking_prefix: String,
    pub result_label: String,

    // --- MANUAL PANEL ---
    pub manual_heading: String,
    pub manual_help: String,
    pub manual_active_category: String,
    pub manual_selected_heading: String,
    pub manual_none_selected: String,
    pub manual_reset: String,
    pub manual_confirm: String,
    pub manual_ideal_hint: String,

    pub icon_close: String,
    pub icon_warning: String,
}

pub static UI_TEXT: LazyLock<UiText> = LazyLock::new(|| UiText {
    app_title: "ICT Trainer".to_string(),

    tb_mode: format!("{} Pattern", ICON_TARGET),
    tb_timeframe: format!("{} Timeframe", ICON_CLOCK),
    tb_refresh: format!("{} Refresh", ICON_REFRESH),
    tb_loading: format!("{} Loading candles…", ICON_COG),
    tb_candles_suffix: format!("{} candles", ICON_CANDLE),
    tb_instrument: "Instrument".to_string(),
    tb_shortcuts: "R: refresh · Esc: clear tags".to_string(),

    plot_x_axis: "Time".to_string(),
    plot_y_axis: "Price".to_string(),
    chart_no_candles: "No candles loaded".to_string(),
    chart_unavailable: "Chart unavailable".to_string(),

    actions_heading: "Auto check".to_string(),
    action_checking_prefix: "Checking".to_string(),
    result_label: "Last Check".to_string(),

    manual_heading: "Manual OB helper".to_string(),
    manual_help: "Pick a role, then click candles on the chart. Clicking a tagged candle moves it to the active role."
        .to_string(),
    manual_active_category: "Tagging as".to_string(),
    manual_selected_heading: "Tagged candles".to_string(),
    manual_none_selected: "Nothing tagged yet".to_string(),
    manual_reset: "Reset".to_string(),
    manual_confirm: "Confirm OB".to_string(),
    manual_ideal_hint: "Ideal: 3 prior + 1 last trend + 1 engulf + 3 displacement".to_string(),

    icon_close: ICON_CLOSE.to_string(),
    icon_warning: ICON_WARNING.to_string(),
});
