//! Visual theme: bubble palette and the glyph font.

pub mod palette;

use bevy::prelude::*;

pub use palette::ThemePalette;

/// Resource holding the font used for kana and romaji labels.
#[derive(Resource)]
pub struct GameFont(pub Handle<Font>);

pub(super) fn plugin(app: &mut App) {
    app.register_type::<ThemePalette>();
    app.insert_resource(ThemePalette::load_embedded());
    app.add_systems(Startup, load_game_font);
}

fn load_game_font(mut commands: Commands, asset_server: Res<AssetServer>) {
    let font = asset_server.load("fonts/NotoSansJP-Regular.ttf");
    commands.insert_resource(GameFont(font));
}
