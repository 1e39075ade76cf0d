//! Waits for the glyph font before gameplay starts, so the first labels
//! don't flash in the fallback font.

use bevy::{asset::LoadState, prelude::*};

use crate::{game::SymbolSet, screens::Screen, theme::GameFont};

pub(super) fn plugin(app: &mut App) {
    app.add_systems(OnEnter(Screen::Loading), spawn_loading_screen);
    app.add_systems(
        Update,
        enter_gameplay_screen.run_if(in_state(Screen::Loading).and(font_settled)),
    );
}

fn spawn_loading_screen(mut commands: Commands) {
    commands.spawn((
        Name::new("Loading Screen"),
        Node {
            position_type: PositionType::Absolute,
            width: Val::Percent(100.0),
            height: Val::Percent(100.0),
            align_items: AlignItems::Center,
            justify_content: JustifyContent::Center,
            ..default()
        },
        DespawnOnExit(Screen::Loading),
        children![(
            Name::new("Loading Label"),
            Text("Loading...".to_string()),
            TextFont::from_font_size(32.0),
        )],
    ));
}

/// The font finished loading, or failed and we go on without it.
fn font_settled(font: Option<Res<GameFont>>, asset_server: Res<AssetServer>) -> bool {
    let Some(font) = font else {
        return false;
    };
    matches!(
        asset_server.get_load_state(&font.0),
        Some(LoadState::Loaded | LoadState::Failed(_))
    )
}

fn enter_gameplay_screen(
    mut commands: Commands,
    font: Res<GameFont>,
    asset_server: Res<AssetServer>,
    symbols: Res<SymbolSet>,
    mut next_screen: ResMut<NextState<Screen>>,
) {
    if let Some(LoadState::Failed(e)) = asset_server.get_load_state(&font.0) {
        warn!("Glyph font failed to load, using the default font: {}", e);
        commands.remove_resource::<GameFont>();
    }
    if symbols.is_empty() {
        warn!("No language data; the field will stay empty");
    }
    next_screen.set(Screen::Gameplay);
}
