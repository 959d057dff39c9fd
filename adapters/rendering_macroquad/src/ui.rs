//! Immediate-mode UI helpers for the Macroquad rendering backend.
//!
//! This module hosts all uses of `macroquad::ui` so the rest of the adapter can
//! remain agnostic of Macroquad's UI types.

use macroquad::{
    color::{Color, WHITE},
    math::{RectOffset, Vec2},
    ui::{hash, Ui},
};
use tower_defence_core::{DefenderKind, PlayerAction};

/// Buttons shown on the control panel, grouped into rows.
const BUTTON_ROWS: [&[(&str, PlayerAction)]; 2] = [
    &[
        ("Gunner", PlayerAction::SelectTowerType(DefenderKind::Gunner)),
        ("Sniper", PlayerAction::SelectTowerType(DefenderKind::Sniper)),
        ("Bomber", PlayerAction::SelectTowerType(DefenderKind::Bomber)),
        ("Next wave", PlayerAction::StartWave),
        ("x2 speed", PlayerAction::ToggleSpeed),
    ],
    &[
        ("Damage+", PlayerAction::UpgradeDamage),
        ("Range+", PlayerAction::UpgradeRange),
        ("Speed+", PlayerAction::UpgradeSpeed),
        ("Sell", PlayerAction::SellSelected),
        ("Deselect", PlayerAction::ClearSelection),
    ],
];

/// Actions requested through the control panel during the current frame.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct ControlPanelUiResult {
    /// Actions whose buttons were pressed, in panel order.
    pub(crate) actions: Vec<PlayerAction>,
}

/// Snapshot of the control panel's layout for the current frame.
#[derive(Clone, Copy, Debug)]
pub(crate) struct ControlPanelUiContext {
    /// Top-left corner of the panel in screen coordinates.
    pub(crate) origin: Vec2,
    /// Panel dimensions in screen space.
    pub(crate) size: Vec2,
    /// Background colour applied to the window skin.
    pub(crate) background: Color,
}

/// Renders the control panel buttons and reports which ones were pressed.
pub(crate) fn draw_control_panel_ui(
    ui: &mut Ui,
    context: ControlPanelUiContext,
) -> ControlPanelUiResult {
    let mut skin = ui.default_skin();
    skin.margin = 0.0;

    let window_style = ui
        .style_builder()
        .color(context.background)
        .color_hovered(context.background)
        .color_clicked(context.background)
        .color_selected(context.background)
        .color_selected_hovered(context.background)
        .color_inactive(context.background)
        .text_color(WHITE)
        .margin(RectOffset::new(8.0, 8.0, 8.0, 8.0))
        .build();
    skin.window_style = window_style;

    let button_style = ui
        .style_builder()
        .text_color(WHITE)
        .text_color_hovered(WHITE)
        .text_color_clicked(WHITE)
        .color(Color::from_rgba(70, 70, 70, 255))
        .color_hovered(Color::from_rgba(96, 96, 96, 255))
        .color_clicked(Color::from_rgba(56, 56, 56, 255))
        .color_inactive(Color::from_rgba(56, 56, 56, 200))
        .margin(RectOffset::new(6.0, 6.0, 4.0, 4.0))
        .build();
    skin.button_style = button_style;

    ui.push_skin(&skin);

    let mut actions = Vec::new();
    let _ = ui.window(hash!("control_panel"), context.origin, context.size, |ui| {
        for row in BUTTON_ROWS {
            for (index, (label, action)) in row.iter().enumerate() {
                if index > 0 {
                    ui.same_line(0.0);
                }
                if ui.button(None, *label) {
                    actions.push(*action);
                }
            }
        }
    });

    ui.pop_skin();

    ControlPanelUiResult { actions }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_player_action_has_a_button() {
        let actions: Vec<PlayerAction> = BUTTON_ROWS
            .iter()
            .flat_map(|row| row.iter().map(|(_, action)| *action))
            .collect();

        for kind in DefenderKind::ALL {
            assert!(actions.contains(&PlayerAction::SelectTowerType(kind)));
        }
        for action in [
            PlayerAction::UpgradeDamage,
            PlayerAction::UpgradeRange,
            PlayerAction::UpgradeSpeed,
            PlayerAction::SellSelected,
            PlayerAction::ToggleSpeed,
            PlayerAction::StartWave,
            PlayerAction::ClearSelection,
        ] {
            assert!(actions.contains(&action), "{action:?} has no button");
        }
    }
}
