//! The pause overlay.

use bevy::prelude::*;

use crate::{menus::Menu, theme::palette::LABEL_TEXT};

pub(super) fn plugin(app: &mut App) {
    app.add_systems(OnEnter(Menu::Pause), spawn_pause_menu);
}

fn spawn_pause_menu(mut commands: Commands) {
    commands.spawn((
        Name::new("Pause Menu"),
        Node {
            position_type: PositionType::Absolute,
            width: Val::Percent(100.0),
            height: Val::Percent(100.0),
            align_items: AlignItems::Center,
            justify_content: JustifyContent::Center,
            flex_direction: FlexDirection::Column,
            row_gap: Val::Px(10.0),
            ..default()
        },
        // Semi-transparent background to hide the field
        BackgroundColor(Color::srgba(0.96, 0.92, 0.84, 0.9)),
        GlobalZIndex(2),
        DespawnOnExit(Menu::Pause),
        children![
            (
                Name::new("Pause Header"),
                Text("Paused".to_string()),
                TextFont::from_font_size(48.0),
                TextColor(LABEL_TEXT),
            ),
            (
                Name::new("Pause Hint"),
                Text("Press P or Esc to resume".to_string()),
                TextFont::from_font_size(20.0),
                TextColor(LABEL_TEXT.with_alpha(0.7)),
            ),
        ],
    ));
}
