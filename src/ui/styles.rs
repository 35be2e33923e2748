use {
    crate::{
        config::{Direction, PLOT_CONFIG},
        engine::NoticeLevel,
        ui::UI_CONFIG,
    },
    eframe::egui::{
        Color32, CornerRadius, FontId, Response, RichText, Sense, Stroke, StrokeKind, Ui, Vec2,
        WidgetInfo, WidgetType,
    },
};

pub(crate) fn colored_subsection_heading(text: impl Into<String>) -> RichText {
    RichText::new(text.into()).color(UI_CONFIG.colors.subsection_heading)
}

pub trait SemanticColor {
    fn color(&self) -> Color32;
}

impl SemanticColor for Direction {
    fn color(&self) -> Color32 {
        match self {
            Self::Bullish => PLOT_CONFIG.chart.zone_bullish_color,
            Self::Bearish => PLOT_CONFIG.chart.zone_bearish_color,
        }
    }
}

impl SemanticColor for NoticeLevel {
    fn color(&self) -> Color32 {
        match self {
            Self::Info => PLOT_CONFIG.color_info,
            Self::Success => PLOT_CONFIG.color_found,
            Self::Warning => PLOT_CONFIG.color_warning,
            Self::Error => PLOT_CONFIG.color_error,
        }
    }
}

/// Banner color from its verdict text.
pub fn banner_color(banner: &str) -> Color32 {
    if banner.ends_with("Error") {
        PLOT_CONFIG.color_error
    } else if banner.contains('✅') {
        PLOT_CONFIG.color_found
    } else {
        PLOT_CONFIG.color_not_found
    }
}

pub(crate) trait UiStyleExt {
    /// Interactive label acting as button: transparent when idle, gray bg on hover, blue bg when selected.
    fn interactive_label(
        &mut self,
        text: &str,
        is_selected: bool,
        idle_color: Color32,
        font_id: FontId,
    ) -> Response;

    fn label_subdued(&mut self, text: impl Into<String>);
    fn metric(&mut self, label: &str, value: &str, color: Color32);
    fn label_subheader(&mut self, text: impl Into<String>);
    fn button_text_primary(&self, text: impl Into<String>) -> RichText;
}

impl UiStyleExt for Ui {
    fn interactive_label(
        &mut self,
        text: &str,
        is_selected: bool,
        idle_color: Color32,
        font_id: FontId,
    ) -> Response {
        let padding = Vec2::new(6.0, 4.0);
        let galley = self
            .painter()
            .layout_no_wrap(text.to_string(), font_id, idle_color);
        let desired_size = galley.size() + padding * 2.0;
        let (rect, response) = self.allocate_exact_size(desired_size, Sense::click());
        response.widget_info(|| WidgetInfo::selected(WidgetType::Button, true, is_selected, text));

        if self.is_rect_visible(rect) {
            let visuals = self.style().visuals.clone();
            let (bg_fill, text_color) = if is_selected {
                (UI_CONFIG.colors.active_chip, Color32::WHITE)
            } else if response.hovered() || response.has_focus() {
                (visuals.widgets.hovered.bg_fill, Color32::YELLOW)
            } else {
                (Color32::TRANSPARENT, idle_color)
            };

            if is_selected || response.hovered() {
                self.painter().rect(
                    rect,
                    CornerRadius::same(4),
                    bg_fill,
                    Stroke::NONE,
                    StrokeKind::Inside,
                );
            }
            let text_pos = rect.left_top() + padding;
            self.painter().galley(text_pos, galley, text_color);
        }
        response
    }

    fn label_subdued(&mut self, text: impl Into<String>) {
        self.label(RichText::new(text).small().color(PLOT_CONFIG.color_text_subdued));
    }

    fn metric(&mut self, label: &str, value: &str, color: Color32) {
        self.horizontal(|ui| {
            ui.spacing_mut().item_spacing.x = 2.0; // Tight spacing
            ui.label_subdued(format!("{}:", label));
            ui.label(RichText::new(value).small().color(color));
        });
    }

    fn label_subheader(&mut self, text: impl Into<String>) {
        self.label(colored_subsection_heading(text));
    }

    fn button_text_primary(&self, text: impl Into<String>) -> RichText {
        RichText::new(text).strong().color(Color32::GREEN)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn banner_colors_follow_verdict() {
        assert_eq!(banner_color("Order Blocks · YES ✅"), PLOT_CONFIG.color_found);
        assert_eq!(banner_color("Order Blocks · NO ❌ – none"), PLOT_CONFIG.color_not_found);
        assert_eq!(banner_color("Fair Value Gaps · Error"), PLOT_CONFIG.color_error);
    }
}
