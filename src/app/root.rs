use std::time::Duration;

use anyhow::{Context as _, Result};
use eframe::{
    Frame,
    egui::{
        Align, Button, CentralPanel, ComboBox, Context, Key, Layout, RichText, SidePanel,
        TopBottomPanel, Visuals,
    },
};
use strum::IntoEnumIterator;

use crate::Cli;
use crate::config::{MODES, PLOT_CONFIG, Timeframe, lookup};
use crate::engine::{NoticeLevel, TrainerEngine, TriggerError};
use crate::ui::{
    ActionBar, ChartSyncController, EguiChart, ManualAction, ManualSelectionPanel, SemanticColor,
    UI_CONFIG, UI_TEXT, UiStyleExt, render_result_banner,
};
use crate::utils::AppInstant;

use super::state::NoticeBoard;

#[cfg(debug_assertions)]
use crate::config::DF;

/// Poll rate while a fetch or check is in flight.
const BUSY_REPAINT: Duration = Duration::from_millis(100);

/// The trainer page: wires toolbar, chart and panels to the engine.
pub struct App {
    engine: TrainerEngine,
    chart: ChartSyncController<EguiChart>,
    notices: NoticeBoard,
}

impl App {
    pub(crate) fn new(cc: &eframe::CreationContext<'_>, args: Cli) -> Result<Self> {
        setup_custom_visuals(&cc.egui_ctx);

        let config = args.to_config();
        let mode = lookup(args.mode.as_deref());
        let timeframe = args.timeframe.unwrap_or_default();

        log::info!(
            "Starting trainer: {} {} {} via {}",
            config.instrument,
            mode.title,
            timeframe,
            config.base_url
        );

        let engine = TrainerEngine::with_http(config, mode.id, timeframe)
            .context("Failed to start the trainer engine")?;
        let chart = ChartSyncController::mount(&PLOT_CONFIG.chart, EguiChart::new);
        if !chart.is_mounted() {
            log::warn!("Running without a chart");
        }

        Ok(Self {
            engine,
            chart,
            notices: NoticeBoard::default(),
        })
    }

    /// Push engine state into the chart, then feed chart clicks back into the selection.
    fn sync_chart(&mut self) {
        let e = &self.engine;
        self.chart.sync_candles(e.series_revision(), e.candles());
        self.chart.sync_zones(e.zones_revision(), e.zones());
    }

    fn route_clicks(&mut self) {
        let clicks = self.chart.drain_clicks();
        if clicks.is_empty() || !self.engine.mode().manual_selection {
            return;
        }
        for candle in clicks {
            match self.engine.toggle_candle(candle) {
                Ok(Some(_role_index)) => {
                    #[cfg(debug_assertions)]
                    if DF.log_selection {
                        log::info!("Tagged {} as #{}", candle.time, _role_index);
                    }
                }
                Ok(None) => {}
                Err(e) => self.reject(e),
            }
        }
    }

    fn collect_notices(&mut self) {
        for notice in self.engine.take_notices() {
            self.notices.push(notice);
        }
    }

    fn reject(&mut self, err: TriggerError) {
        let level = match err {
            TriggerError::WorkerGone => NoticeLevel::Error,
            _ => NoticeLevel::Warning,
        };
        self.engine.notify(level, err.to_string());
    }

    fn handle_global_shortcuts(&mut self, ctx: &Context) {
        let (refresh, clear) = ctx.input(|i| (i.key_pressed(Key::R), i.key_pressed(Key::Escape)));
        if refresh && !self.engine.is_loading() {
            self.engine.refresh();
        }
        if clear && self.engine.mode().manual_selection {
            self.engine.reset_selection();
        }
    }

    fn render_top_panel(&mut self, ctx: &Context) {
        let engine = &mut self.engine;
        TopBottomPanel::top("top_panel")
            .frame(UI_CONFIG.top_panel_frame())
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.heading(RichText::new(&UI_TEXT.app_title).color(UI_CONFIG.colors.heading));
                    ui.separator();

                    let current = engine.mode();
                    let mut picked = current.id;
                    ComboBox::from_label(UI_TEXT.tb_mode.as_str())
                        .selected_text(current.title)
                        .show_ui(ui, |ui| {
                            for m in MODES {
                                ui.selectable_value(&mut picked, m.id, m.title)
                                    .on_hover_text(m.subtitle);
                            }
                        });
                    if picked != current.id {
                        engine.set_mode(picked);
                    }

                    let mut tf = engine.timeframe();
                    ComboBox::from_label(UI_TEXT.tb_timeframe.as_str())
                        .selected_text(tf.to_string())
                        .show_ui(ui, |ui| {
                            for t in Timeframe::iter() {
                                ui.selectable_value(&mut tf, t, t.to_string());
                            }
                        });
                    if tf != engine.timeframe() {
                        engine.set_timeframe(tf);
                    }

                    if ui
                        .add_enabled(!engine.is_loading(), Button::new(UI_TEXT.tb_refresh.as_str()))
                        .clicked()
                    {
                        engine.refresh();
                    }
                    if engine.is_loading() {
                        ui.spinner();
                        ui.label_subdued(&UI_TEXT.tb_loading);
                    }

                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        ui.label_subdued(&UI_TEXT.tb_shortcuts);
                        ui.separator();
                        ui.metric(
                            &UI_TEXT.tb_candles_suffix,
                            &engine.candles().len().to_string(),
                            PLOT_CONFIG.color_text_neutral,
                        );
                        ui.metric(
                            &UI_TEXT.tb_instrument,
                            &engine.config().instrument,
                            PLOT_CONFIG.color_text_neutral,
                        );
                    });
                });
            });
    }

    fn render_status_panel(&mut self, ctx: &Context) {
        let engine = &self.engine;
        let notices = &self.notices;
        let (clicked, dismissed) = TopBottomPanel::bottom("status_panel")
            .frame(UI_CONFIG.bottom_panel_frame())
            .show(ctx, |ui| {
                let clicked = ActionBar::new(engine.mode(), engine.checking(), engine.is_loading()).render(ui);
                render_result_banner(ui, engine.last_result());

                let mut dismissed = None;
                for (i, entry) in notices.iter().enumerate() {
                    ui.horizontal(|ui| {
                        let notice = &entry.notice;
                        if notice.level == NoticeLevel::Error {
                            ui.label(RichText::new(&UI_TEXT.icon_warning).color(notice.level.color()));
                        }
                        ui.label(RichText::new(&notice.text).small().color(notice.level.color()));
                        if ui.small_button(UI_TEXT.icon_close.as_str()).clicked() {
                            dismissed = Some(i);
                        }
                    });
                }
                (clicked, dismissed)
            })
            .inner;

        if let Some(i) = dismissed {
            self.notices.dismiss(i);
        }
        if let Some(key) = clicked {
            if let Err(e) = self.engine.trigger_action(key) {
                self.reject(e);
            }
        }
    }

    fn render_manual_panel(&mut self, ctx: &Context) {
        if !self.engine.mode().manual_selection {
            return;
        }
        let engine = &self.engine;
        let action = SidePanel::right("manual_panel")
            .frame(UI_CONFIG.side_panel_frame())
            .default_width(UI_CONFIG.side_panel_width)
            .resizable(false)
            .show(ctx, |ui| {
                let busy = engine.checking().is_some() || engine.is_loading();
                ManualSelectionPanel::new(engine.selection(), busy).render(ui)
            })
            .inner;

        match action {
            Some(ManualAction::SelectCategory(id)) => self.engine.set_active_category(id),
            Some(ManualAction::Reset) => self.engine.reset_selection(),
            Some(ManualAction::Confirm) => {
                if let Err(e) = self.engine.confirm_manual() {
                    self.reject(e);
                }
            }
            None => {}
        }
    }

    fn render_central_panel(&mut self, ctx: &Context) {
        let engine = &self.engine;
        let chart = &mut self.chart;
        CentralPanel::default()
            .frame(UI_CONFIG.central_panel_frame())
            .show(ctx, |ui| {
                let mode = engine.mode();
                ui.label(RichText::new(mode.title).heading().color(UI_CONFIG.colors.heading));
                ui.label_subdued(mode.subtitle);
                ui.add_space(4.0);
                match chart.surface_mut() {
                    Some(surface) => surface.show(ui, engine.selection().selected()),
                    None => {
                        ui.centered_and_justified(|ui| {
                            ui.label(
                                RichText::new(&UI_TEXT.chart_unavailable)
                                    .color(PLOT_CONFIG.color_error),
                            );
                        });
                    }
                }
            });
    }

    /// One frame: drain results, sync the chart, draw, then route input.
    pub(crate) fn tick(&mut self, ctx: &Context) {
        let start = AppInstant::now();
        self.engine.poll();
        self.sync_chart();
        let engine_time = start.elapsed().as_micros();

        self.handle_global_shortcuts(ctx);
        self.render_top_panel(ctx);
        self.render_status_panel(ctx);
        self.render_manual_panel(ctx);

        let start = AppInstant::now();
        self.render_central_panel(ctx);
        let plot_time = start.elapsed().as_micros();

        self.route_clicks();
        self.collect_notices();

        if engine_time + plot_time > 500_000 {
            #[cfg(debug_assertions)]
            if DF.log_performance {
                log::warn!("🐢 SLOW FRAME: Engine: {}us | Plot: {}us", engine_time, plot_time);
            }
        }

        let any_notices = self.notices.expire(AppInstant::now());
        if self.engine.is_loading() || self.engine.checking().is_some() {
            ctx.request_repaint_after(BUSY_REPAINT);
        } else if any_notices {
            ctx.request_repaint_after(self.notices.ttl() / 8);
        }
    }
}

impl eframe::App for App {
    fn update(&mut self, ctx: &Context, _frame: &mut Frame) {
        self.tick(ctx);
    }
}

fn setup_custom_visuals(ctx: &Context) {
    let mut visuals = Visuals::dark();
    visuals.window_fill = UI_CONFIG.colors.central_panel;
    visuals.panel_fill = UI_CONFIG.colors.side_panel;
    visuals.widgets.noninteractive.fg_stroke.color = UI_CONFIG.colors.label;
    visuals.widgets.inactive.fg_stroke.color = UI_CONFIG.colors.label;
    visuals.widgets.hovered.fg_stroke.color = UI_CONFIG.colors.heading;
    visuals.widgets.active.fg_stroke.color = UI_CONFIG.colors.heading;
    ctx.set_visuals(visuals);
    ctx.style_mut(|s| s.interaction.selectable_labels = false);
}
