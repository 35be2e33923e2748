use eframe::egui::{Button, FontId, RichText, ScrollArea, Ui};

use crate::config::{CATEGORIES, CategoryId, ModeConfig, PLOT_CONFIG};
use crate::models::SelectionStateMachine;
use crate::ui::styles::{UiStyleExt, banner_color, colored_subsection_heading};
use crate::ui::ui_text::UI_TEXT;
use crate::utils::epoch_sec_to_time_string;

/// The mode's auto-check buttons.
pub struct ActionBar<'a> {
    mode: &'static ModeConfig,
    checking: Option<&'a str>,
    loading: bool,
}

impl<'a> ActionBar<'a> {
    pub fn new(mode: &'static ModeConfig, checking: Option<&'a str>, loading: bool) -> Self {
        Self {
            mode,
            checking,
            loading,
        }
    }

    /// Returns the key of the clicked action. All buttons are disabled while a check or fetch runs.
    pub fn render(&self, ui: &mut Ui) -> Option<&'static str> {
        let mut clicked = None;
        ui.label_subheader(&UI_TEXT.actions_heading);
        ui.horizontal_wrapped(|ui| {
            for action in self.mode.actions {
                let text = if self.checking == Some(action.label) {
                    format!("{} {}…", UI_TEXT.action_checking_prefix, action.label)
                } else {
                    action.label.to_string()
                };
                let enabled = self.checking.is_none() && !self.loading;
                if ui
                    .add_enabled(enabled, Button::new(ui.button_text_primary(text)))
                    .clicked()
                {
                    clicked = Some(action.key);
                }
            }
        });
        clicked
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManualAction {
    SelectCategory(CategoryId),
    Reset,
    Confirm,
}

/// Category chips, the tagged list, reset and confirm.
pub struct ManualSelectionPanel<'a> {
    selection: &'a SelectionStateMachine,
    busy: bool,
}

impl<'a> ManualSelectionPanel<'a> {
    pub fn new(selection: &'a SelectionStateMachine, busy: bool) -> Self {
        Self { selection, busy }
    }

    pub fn render(&self, ui: &mut Ui) -> Option<ManualAction> {
        let mut action = None;

        ui.heading(&UI_TEXT.manual_heading);
        ui.label_subdued(&UI_TEXT.manual_help);
        ui.separator();

        ui.label_subheader(&UI_TEXT.manual_active_category);
        let active = self.selection.active_category();
        for (id, used, max) in self.selection.usage() {
            let label = id.category().label;
            let text = match max {
                Some(max) => format!("{}  {}/{}", label, used, max),
                None => format!("{}  {}", label, used),
            };
            if ui
                .interactive_label(
                    &text,
                    id == active,
                    PLOT_CONFIG.color_text_neutral,
                    FontId::proportional(13.0),
                )
                .clicked()
            {
                action = Some(ManualAction::SelectCategory(id));
            }
        }

        ui.separator();
        ui.label(colored_subsection_heading(format!(
            "{} ({})",
            UI_TEXT.manual_selected_heading,
            self.selection.len()
        )));

        ScrollArea::vertical()
            .max_height(220.0)
            .auto_shrink([false, true])
            .show(ui, |ui| {
                if self.selection.is_empty() {
                    ui.label_subdued(&UI_TEXT.manual_none_selected);
                }
                // Canonical order, same as the payload.
                for category in CATEGORIES {
                    let mut rows: Vec<_> = self
                        .selection
                        .selected()
                        .iter()
                        .filter(|s| s.role_id == category.id)
                        .collect();
                    rows.sort_by_key(|s| s.role_index);
                    for s in rows {
                        ui.horizontal(|ui| {
                            ui.label(RichText::new(s.describe_role()).small().strong());
                            ui.label_subdued(format!(
                                "{}  {}",
                                epoch_sec_to_time_string(s.time()),
                                s.candle
                            ));
                        });
                    }
                }
            });

        ui.separator();
        ui.label_subdued(&UI_TEXT.manual_ideal_hint);
        ui.horizontal(|ui| {
            if ui
                .add_enabled(!self.selection.is_empty(), Button::new(UI_TEXT.manual_reset.as_str()))
                .clicked()
            {
                action = Some(ManualAction::Reset);
            }
            let confirm = Button::new(ui.button_text_primary(&UI_TEXT.manual_confirm));
            if ui.add_enabled(!self.busy, confirm).clicked() {
                action = Some(ManualAction::Confirm);
            }
        });

        action
    }
}

/// "Last Check: ..." line under the chart.
pub fn render_result_banner(ui: &mut Ui, banner: Option<&str>) {
    let Some(banner) = banner else {
        return;
    };
    ui.horizontal(|ui| {
        ui.label_subdued(&UI_TEXT.result_label);
        ui.label(RichText::new(banner).strong().color(banner_color(banner)));
    });
}
