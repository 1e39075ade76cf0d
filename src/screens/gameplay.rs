//! The screen state for the main gameplay.

use bevy::{input::common_conditions::input_just_pressed, prelude::*};

use crate::{Pause, menus::Menu, screens::Screen};

pub(super) fn plugin(app: &mut App) {
    // Toggle pause on key press.
    app.add_systems(
        Update,
        (
            pause.run_if(in_state(Menu::None)),
            close_menu.run_if(not(in_state(Menu::None))),
        )
            .run_if(
                in_state(Screen::Gameplay).and(
                    input_just_pressed(KeyCode::KeyP).or(input_just_pressed(KeyCode::Escape)),
                ),
            ),
    );
    app.add_systems(OnExit(Screen::Gameplay), (close_menu, unpause));
    app.add_systems(
        OnEnter(Menu::None),
        unpause.run_if(in_state(Screen::Gameplay)),
    );
}

fn unpause(mut next_pause: ResMut<NextState<Pause>>) {
    next_pause.set(Pause(false));
}

fn pause(mut next_pause: ResMut<NextState<Pause>>, mut next_menu: ResMut<NextState<Menu>>) {
    next_pause.set(Pause(true));
    next_menu.set(Menu::Pause);
    info!("Paused");
}

fn close_menu(mut next_menu: ResMut<NextState<Menu>>) {
    next_menu.set(Menu::None);
}
