use engine::app::palette;
use engine::sim::FrameTime;
use engine::{InputSnapshot, Scene, SceneCommand, SceneKey, SceneWorld};

use super::hud::{line_rect, Hud};

const MENU_ENTRIES: [SceneKey; 4] = [
    SceneKey::AnimateMovement,
    SceneKey::CollectPotions,
    SceneKey::WizardClock,
    SceneKey::WarriorSwing,
];

/// `" Animate Movement"` for `AnimateMovement`.
pub(crate) fn menu_label(key: SceneKey) -> String {
    let mut label = String::from(" ");
    for (index, ch) in key.name().chars().enumerate() {
        if index > 0 && ch.is_ascii_uppercase() {
            label.push(' ');
        }
        label.push(ch);
    }
    label
}

pub(crate) struct TitleMenuScene {
    entries: Vec<(SceneKey, String)>,
    hud: Hud,
}

impl TitleMenuScene {
    pub(crate) fn new() -> Self {
        Self {
            entries: MENU_ENTRIES
                .iter()
                .map(|&key| (key, menu_label(key)))
                .collect(),
            hud: Hud::default(),
        }
    }
}

impl Scene for TitleMenuScene {
    fn load(&mut self, world: &mut SceneWorld) {
        let lines: Vec<(&str, _)> = self
            .entries
            .iter()
            .map(|(_, label)| (label.as_str(), palette::TEXT))
            .collect();
        self.hud = Hud::spawn(world, &lines);
        world.set_cursor_visible(true);
    }

    fn update(
        &mut self,
        _time: FrameTime,
        input: &InputSnapshot,
        world: &mut SceneWorld,
    ) -> SceneCommand {
        world.set_cursor_visible(true);
        let cursor = input.cursor_position_px();
        let mut command = SceneCommand::None;

        for (index, (key, label)) in self.entries.iter().enumerate() {
            let hovered = cursor.is_some_and(|point| line_rect(index, label).contains_point(point));
            let color = if hovered { palette::RED } else { palette::TEXT };
            self.hud.set_line(world, index, label, color);
            if hovered && input.pointer_pressed() {
                command = SceneCommand::SwitchTo(*key);
            }
        }

        command
    }

    fn unload(&mut self, _world: &mut SceneWorld) {
        self.hud.clear();
    }
}
