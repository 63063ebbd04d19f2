use engine::sim::Rect;
use engine::{InputSnapshot, Scene, SceneKey};

mod animate_movement;
mod collect_potions;
mod hud;
mod title_menu;
mod tuning;
mod warrior_swing;
mod wizard_clock;

pub(crate) use tuning::{load_tuning, SceneTuning, TuningError};

use animate_movement::AnimateMovementScene;
use collect_potions::CollectPotionsScene;
use title_menu::TitleMenuScene;
use warrior_swing::WarriorSwingScene;
use wizard_clock::WizardClockScene;

/// Frame size assumed until the first input snapshot reports one.
const DEFAULT_FRAME_SIZE: (u32, u32) = (640, 480);

pub(crate) fn build_scenes(tuning: &SceneTuning) -> Vec<(SceneKey, Box<dyn Scene>)> {
    vec![
        (SceneKey::TitleMenu, Box::new(TitleMenuScene::new())),
        (
            SceneKey::AnimateMovement,
            Box::new(AnimateMovementScene::new(tuning)),
        ),
        (
            SceneKey::CollectPotions,
            Box::new(CollectPotionsScene::new(tuning, fastrand::u64(..))),
        ),
        (SceneKey::WizardClock, Box::new(WizardClockScene::new(tuning))),
        (SceneKey::WarriorSwing, Box::new(WarriorSwingScene::new(tuning))),
    ]
}

fn frame_size(input: &InputSnapshot) -> (u32, u32) {
    match input.frame_size() {
        (0, _) | (_, 0) => DEFAULT_FRAME_SIZE,
        size => size,
    }
}

/// Playfield the actors are clamped into.
fn screen_bounds(input: &InputSnapshot) -> Rect {
    let (width, height) = frame_size(input);
    Rect::new(0.0, 0.0, width as f32, height as f32)
}
