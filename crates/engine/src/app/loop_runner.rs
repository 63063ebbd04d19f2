use std::sync::Arc;
use std::time::{Duration, Instant};

use pixels::Error as PixelsError;
use thiserror::Error;
use tracing::{info, warn};
use winit::dpi::LogicalSize;
use winit::error::{EventLoopError, OsError};
use winit::event::{ElementState, Event, MouseButton, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::WindowBuilder;

use crate::sim::{SimClock, Vec2};
use crate::AppPaths;

use super::assets::{AssetError, AssetStore};
use super::input::ActionStates;
use super::metrics::MetricsAccumulator;
use super::scene::{SceneMachine, SceneMachineError};
use super::{InputAction, InputSnapshot, Renderer, Scene, SceneCommand, SceneKey};

#[derive(Debug, Clone)]
pub struct LoopConfig {
    pub window_title: String,
    pub frame_width: u32,
    pub frame_height: u32,
    pub target_tps: u32,
    pub max_frame_delta: Duration,
    pub max_ticks_per_frame: u32,
    pub metrics_log_interval: Duration,
    pub initial_scene: SceneKey,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            window_title: "Sprite Demos".to_string(),
            frame_width: 640,
            frame_height: 480,
            target_tps: 60,
            max_frame_delta: Duration::from_millis(250),
            max_ticks_per_frame: 5,
            metrics_log_interval: Duration::from_secs(1),
            initial_scene: SceneKey::TitleMenu,
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("failed to load assets: {0}")]
    Assets(#[from] AssetError),
    #[error("invalid scene registration: {0}")]
    Scenes(#[from] SceneMachineError),
    #[error("failed to create event loop: {0}")]
    CreateEventLoop(#[source] EventLoopError),
    #[error("failed to create application window: {0}")]
    CreateWindow(#[source] OsError),
    #[error("failed to initialize renderer: {0}")]
    CreateRenderer(#[source] PixelsError),
    #[error("event loop failed: {0}")]
    EventLoopRun(#[source] EventLoopError),
}

pub fn run_app(
    config: LoopConfig,
    app_paths: AppPaths,
    scenes: Vec<(SceneKey, Box<dyn Scene>)>,
) -> Result<(), AppError> {
    let mut scenes = SceneMachine::new(scenes, config.initial_scene)?;
    info!(
        root = %app_paths.root.display(),
        assets_dir = %app_paths.assets_dir.display(),
        "startup"
    );
    let assets = AssetStore::load(&app_paths.assets_dir)?;

    let frame_size = (config.frame_width.max(1), config.frame_height.max(1));
    let event_loop = EventLoop::new().map_err(AppError::CreateEventLoop)?;
    let window = Arc::new(
        WindowBuilder::new()
            .with_title(window_title_for(&config.window_title, config.initial_scene))
            .with_inner_size(LogicalSize::new(frame_size.0 as f64, frame_size.1 as f64))
            .build(&event_loop)
            .map_err(AppError::CreateWindow)?,
    );
    let mut renderer =
        Renderer::new(Arc::clone(&window), frame_size, assets).map_err(AppError::CreateRenderer)?;

    event_loop.set_control_flow(ControlFlow::Poll);

    let target_tps = config.target_tps.max(1);
    let max_frame_delta =
        normalize_non_zero_duration(config.max_frame_delta, Duration::from_millis(250));
    let max_ticks_per_frame = config.max_ticks_per_frame.max(1);
    let metrics_log_interval =
        normalize_non_zero_duration(config.metrics_log_interval, Duration::from_secs(1));
    let fixed_dt = Duration::from_secs_f64(1.0 / target_tps as f64);
    let mut input_collector = InputCollector::new(frame_size.0, frame_size.1);
    let mut clock = SimClock::new();

    scenes.load_active();
    info!(
        scene = ?scenes.active_scene(),
        entity_count = scenes.active_world().entity_count(),
        "scene_loaded"
    );
    info!(
        target_tps,
        frame_width = frame_size.0,
        frame_height = frame_size.1,
        max_frame_delta_ms = max_frame_delta.as_millis() as u64,
        max_ticks_per_frame,
        metrics_log_interval_ms = metrics_log_interval.as_millis() as u64,
        "loop_config"
    );

    let mut accumulator = Duration::ZERO;
    let mut last_frame_instant = Instant::now();
    let mut metrics_accumulator = MetricsAccumulator::new(metrics_log_interval);
    let mut applied_title_scene = config.initial_scene;
    let mut applied_cursor_visible = true;

    event_loop
        .run(move |event, window_target| match event {
            Event::WindowEvent { window_id, event } if window_id == window.id() => match event {
                WindowEvent::CloseRequested => {
                    input_collector.mark_quit_requested();
                    info!(reason = "window_close", "shutdown_requested");
                    window_target.exit();
                }
                WindowEvent::Resized(new_size) => {
                    if let Err(error) = renderer.resize(new_size.width, new_size.height) {
                        warn!(error = %error, "renderer_resize_failed");
                        window_target.exit();
                    }
                }
                WindowEvent::ScaleFactorChanged { .. } => {
                    let size = window.inner_size();
                    if let Err(error) = renderer.resize(size.width, size.height) {
                        warn!(error = %error, "renderer_resize_failed");
                        window_target.exit();
                    }
                }
                WindowEvent::CursorMoved { position, .. } => {
                    input_collector
                        .set_cursor_position_px(renderer.window_to_frame_px(position.x, position.y));
                }
                WindowEvent::CursorLeft { .. } => {
                    input_collector.set_cursor_position_px(None);
                }
                WindowEvent::MouseInput { state, button, .. } => {
                    input_collector.handle_mouse_input(button, state);
                }
                WindowEvent::KeyboardInput { event, .. } => {
                    input_collector.handle_keyboard_input(&event);
                }
                WindowEvent::RedrawRequested => {
                    let now = Instant::now();
                    let raw_frame_dt = now.saturating_duration_since(last_frame_instant);
                    last_frame_instant = now;

                    let clamped_frame_dt = clamp_frame_delta(raw_frame_dt, max_frame_delta);
                    accumulator = accumulator.saturating_add(clamped_frame_dt);

                    let step_plan = plan_sim_steps(accumulator, fixed_dt, max_ticks_per_frame);
                    for _ in 0..step_plan.ticks_to_run {
                        let input_snapshot = input_collector.snapshot_for_tick();
                        let time = clock.advance(fixed_dt);
                        let command = scenes.step_active(time, &input_snapshot);

                        for cue in scenes.active_world_mut().drain_audio_cues() {
                            info!(cue = ?cue, scene = ?scenes.active_scene(), "audio_cue");
                        }

                        if let SceneCommand::SwitchTo(next_scene) = command {
                            match scenes.switch_to(next_scene) {
                                Ok(true) => info!(
                                    scene = ?scenes.active_scene(),
                                    entity_count = scenes.active_world().entity_count(),
                                    "scene_switched"
                                ),
                                Ok(false) => {}
                                Err(error) => warn!(error = %error, "scene_switch_failed"),
                            }
                        }
                        metrics_accumulator.record_tick();
                    }
                    accumulator = step_plan.remaining_accumulator;

                    if step_plan.dropped_backlog > Duration::ZERO {
                        metrics_accumulator.record_clamp();
                        warn!(
                            dropped_backlog_ms = step_plan.dropped_backlog.as_millis() as u64,
                            max_ticks_per_frame, "sim_clamp_triggered"
                        );
                    }

                    let active_scene = scenes.active_scene();
                    if active_scene != applied_title_scene {
                        window.set_title(&window_title_for(&config.window_title, active_scene));
                        applied_title_scene = active_scene;
                    }
                    let cursor_visible = scenes.active_world().cursor_visible();
                    if cursor_visible != applied_cursor_visible {
                        window.set_cursor_visible(cursor_visible);
                        applied_cursor_visible = cursor_visible;
                    }

                    if let Err(error) = renderer.render_world(scenes.active_world()) {
                        warn!(error = %error, "renderer_draw_failed");
                        window_target.exit();
                    }
                    metrics_accumulator.record_frame(raw_frame_dt);

                    if let Some(snapshot) = metrics_accumulator.maybe_snapshot(now) {
                        info!(
                            fps = snapshot.fps,
                            tps = snapshot.tps,
                            frame_time_ms = snapshot.frame_time_ms,
                            clamp_events = snapshot.clamp_events,
                            sim_now_ms = clock.now_ms(),
                            entity_count = scenes.active_world().entity_count(),
                            scene = ?scenes.active_scene(),
                            "loop_metrics"
                        );
                    }
                }
                _ => {}
            },
            Event::AboutToWait => {
                window.request_redraw();
            }
            Event::LoopExiting => {
                scenes.shutdown_all();
                info!(ticks = clock.tick_count(), "shutdown");
            }
            _ => {}
        })
        .map_err(AppError::EventLoopRun)
}

fn window_title_for(base: &str, scene: SceneKey) -> String {
    format!("{base} - {}", scene.name())
}

#[derive(Debug, Default)]
struct InputCollector {
    quit_requested: bool,
    back_key_is_down: bool,
    back_pressed_edge: bool,
    action_states: ActionStates,
    held_keys: Vec<KeyCode>,
    cursor_position_px: Option<Vec2>,
    pointer_is_down: bool,
    pointer_pressed_edge: bool,
    frame_width: u32,
    frame_height: u32,
}

impl InputCollector {
    fn new(frame_width: u32, frame_height: u32) -> Self {
        Self {
            frame_width,
            frame_height,
            ..Self::default()
        }
    }

    fn mark_quit_requested(&mut self) {
        self.quit_requested = true;
    }

    fn handle_keyboard_input(&mut self, key_event: &winit::event::KeyEvent) {
        let is_pressed = key_event.state == ElementState::Pressed;
        self.update_action_state_from_physical_key(key_event.physical_key, is_pressed);
        self.handle_back_key_state(is_back_key(key_event.physical_key), key_event.state);
    }

    fn handle_back_key_state(&mut self, is_back: bool, state: ElementState) {
        if !is_back {
            return;
        }

        match state {
            ElementState::Pressed => {
                if !self.back_key_is_down {
                    self.back_pressed_edge = true;
                }
                self.back_key_is_down = true;
            }
            ElementState::Released => self.back_key_is_down = false,
        }
    }

    fn snapshot_for_tick(&mut self) -> InputSnapshot {
        let snapshot = InputSnapshot::new(
            self.quit_requested,
            self.back_pressed_edge,
            self.action_states,
            self.cursor_position_px,
            self.pointer_pressed_edge,
            (self.frame_width, self.frame_height),
        );
        self.back_pressed_edge = false;
        self.pointer_pressed_edge = false;
        snapshot
    }

    /// An action stays down while any key bound to it is held.
    fn update_action_state_from_physical_key(&mut self, key: PhysicalKey, is_pressed: bool) {
        let PhysicalKey::Code(code) = key else {
            return;
        };
        let Some(action) = action_for_key(code) else {
            return;
        };

        if is_pressed {
            if !self.held_keys.contains(&code) {
                self.held_keys.push(code);
            }
        } else {
            self.held_keys.retain(|held| *held != code);
        }

        let any_bound_key_held = self
            .held_keys
            .iter()
            .any(|held| action_for_key(*held) == Some(action));
        self.action_states.set(action, any_bound_key_held);
    }

    fn set_cursor_position_px(&mut self, position: Option<Vec2>) {
        self.cursor_position_px = position;
    }

    /// Any button counts as the pointer.
    fn handle_mouse_input(&mut self, _button: MouseButton, state: ElementState) {
        match state {
            ElementState::Pressed => {
                if !self.pointer_is_down {
                    self.pointer_pressed_edge = true;
                }
                self.pointer_is_down = true;
            }
            ElementState::Released => self.pointer_is_down = false,
        }
    }
}

fn action_for_key(code: KeyCode) -> Option<InputAction> {
    match code {
        KeyCode::KeyW | KeyCode::ArrowUp => Some(InputAction::MoveUp),
        KeyCode::KeyS | KeyCode::ArrowDown => Some(InputAction::MoveDown),
        KeyCode::KeyA | KeyCode::ArrowLeft => Some(InputAction::MoveLeft),
        KeyCode::KeyD | KeyCode::ArrowRight => Some(InputAction::MoveRight),
        KeyCode::KeyZ => Some(InputAction::Interact),
        KeyCode::KeyG => Some(InputAction::ToggleGravity),
        KeyCode::KeyK => Some(InputAction::KeyboardMode),
        KeyCode::KeyM => Some(InputAction::MouseMode),
        _ => None,
    }
}

fn is_back_key(key: PhysicalKey) -> bool {
    matches!(key, PhysicalKey::Code(KeyCode::Escape))
}

#[derive(Debug, Clone, Copy)]
struct StepPlan {
    ticks_to_run: u32,
    remaining_accumulator: Duration,
    dropped_backlog: Duration,
}

fn plan_sim_steps(
    mut accumulator: Duration,
    fixed_dt: Duration,
    max_ticks_per_frame: u32,
) -> StepPlan {
    let mut ticks_to_run = 0u32;

    while accumulator >= fixed_dt && ticks_to_run < max_ticks_per_frame {
        accumulator = accumulator.saturating_sub(fixed_dt);
        ticks_to_run = ticks_to_run.saturating_add(1);
    }

    if accumulator >= fixed_dt {
        StepPlan {
            ticks_to_run,
            remaining_accumulator: Duration::ZERO,
            dropped_backlog: accumulator,
        }
    } else {
        StepPlan {
            ticks_to_run,
            remaining_accumulator: accumulator,
            dropped_backlog: Duration::ZERO,
        }
    }
}

fn clamp_frame_delta(frame_dt: Duration, max_frame_delta: Duration) -> Duration {
    frame_dt.min(max_frame_delta)
}

fn normalize_non_zero_duration(value: Duration, fallback: Duration) -> Duration {
    if value.is_zero() {
        fallback
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_matches_demo_frame() {
        let config = LoopConfig::default();
        assert_eq!((config.frame_width, config.frame_height), (640, 480));
        assert_eq!(config.target_tps, 60);
        assert_eq!(config.initial_scene, SceneKey::TitleMenu);
    }

    #[test]
    fn clamp_frame_delta_caps_large_frame() {
        let max_frame_delta = Duration::from_millis(250);
        let raw_frame_dt = Duration::from_millis(600);

        assert_eq!(
            clamp_frame_delta(raw_frame_dt, max_frame_delta),
            max_frame_delta
        );
    }

    #[test]
    fn plan_sim_steps_runs_expected_ticks_without_drop() {
        let fixed_dt = Duration::from_millis(16);
        let result = plan_sim_steps(Duration::from_millis(48), fixed_dt, 5);

        assert_eq!(result.ticks_to_run, 3);
        assert_eq!(result.remaining_accumulator, Duration::ZERO);
        assert_eq!(result.dropped_backlog, Duration::ZERO);
    }

    #[test]
    fn plan_sim_steps_keeps_partial_tick() {
        let fixed_dt = Duration::from_millis(16);
        let result = plan_sim_steps(Duration::from_millis(40), fixed_dt, 5);

        assert_eq!(result.ticks_to_run, 2);
        assert_eq!(result.remaining_accumulator, Duration::from_millis(8));
    }

    #[test]
    fn plan_sim_steps_drops_backlog_when_tick_cap_hit() {
        let fixed_dt = Duration::from_millis(16);
        let result = plan_sim_steps(Duration::from_millis(120), fixed_dt, 3);

        assert_eq!(result.ticks_to_run, 3);
        assert_eq!(result.remaining_accumulator, Duration::ZERO);
        assert_eq!(result.dropped_backlog, Duration::from_millis(72));
    }

    #[test]
    fn normalize_non_zero_duration_falls_back_on_zero() {
        let fallback = Duration::from_secs(1);
        assert_eq!(normalize_non_zero_duration(Duration::ZERO, fallback), fallback);
        assert_eq!(
            normalize_non_zero_duration(Duration::from_millis(5), fallback),
            Duration::from_millis(5)
        );
    }

    #[test]
    fn escape_press_is_edge_triggered_for_single_tick() {
        let mut input = InputCollector::default();
        input.handle_back_key_state(true, ElementState::Pressed);

        let first = input.snapshot_for_tick();
        let second = input.snapshot_for_tick();

        assert!(first.back_pressed());
        assert!(!second.back_pressed());
    }

    #[test]
    fn held_escape_does_not_spam_press_edges() {
        let mut input = InputCollector::default();

        input.handle_back_key_state(true, ElementState::Pressed);
        let first = input.snapshot_for_tick();

        input.handle_back_key_state(true, ElementState::Pressed);
        let second = input.snapshot_for_tick();

        input.handle_back_key_state(true, ElementState::Released);
        input.handle_back_key_state(true, ElementState::Pressed);
        let third = input.snapshot_for_tick();

        assert!(first.back_pressed());
        assert!(!second.back_pressed());
        assert!(third.back_pressed());
    }

    #[test]
    fn non_back_keys_never_raise_back_edge() {
        let mut input = InputCollector::default();
        input.handle_back_key_state(false, ElementState::Pressed);
        assert!(!input.snapshot_for_tick().back_pressed());
        assert!(is_back_key(PhysicalKey::Code(KeyCode::Escape)));
        assert!(!is_back_key(PhysicalKey::Code(KeyCode::KeyQ)));
    }

    #[test]
    fn wasd_and_arrow_keys_map_to_actions() {
        let mut input = InputCollector::default();

        input.update_action_state_from_physical_key(PhysicalKey::Code(KeyCode::KeyW), true);
        input.update_action_state_from_physical_key(PhysicalKey::Code(KeyCode::ArrowLeft), true);

        let snapshot = input.snapshot_for_tick();
        assert!(snapshot.is_down(InputAction::MoveUp));
        assert!(snapshot.is_down(InputAction::MoveLeft));
        assert!(!snapshot.is_down(InputAction::MoveDown));
    }

    #[test]
    fn scene_keys_map_to_actions() {
        let mut input = InputCollector::default();
        for key in [KeyCode::KeyZ, KeyCode::KeyG, KeyCode::KeyK, KeyCode::KeyM] {
            input.update_action_state_from_physical_key(PhysicalKey::Code(key), true);
        }

        let snapshot = input.snapshot_for_tick();
        assert!(snapshot.is_down(InputAction::Interact));
        assert!(snapshot.is_down(InputAction::ToggleGravity));
        assert!(snapshot.is_down(InputAction::KeyboardMode));
        assert!(snapshot.is_down(InputAction::MouseMode));
    }

    #[test]
    fn key_release_clears_action_state() {
        let mut input = InputCollector::default();
        input.update_action_state_from_physical_key(PhysicalKey::Code(KeyCode::KeyD), true);
        input.update_action_state_from_physical_key(PhysicalKey::Code(KeyCode::KeyD), false);

        let snapshot = input.snapshot_for_tick();
        assert!(!snapshot.is_down(InputAction::MoveRight));
    }

    #[test]
    fn action_stays_down_while_another_bound_key_is_held() {
        let mut input = InputCollector::default();
        input.update_action_state_from_physical_key(PhysicalKey::Code(KeyCode::KeyW), true);
        input.update_action_state_from_physical_key(PhysicalKey::Code(KeyCode::ArrowUp), true);
        input.update_action_state_from_physical_key(PhysicalKey::Code(KeyCode::ArrowUp), false);

        assert!(input.snapshot_for_tick().is_down(InputAction::MoveUp));

        input.update_action_state_from_physical_key(PhysicalKey::Code(KeyCode::KeyW), false);
        assert!(!input.snapshot_for_tick().is_down(InputAction::MoveUp));
    }

    #[test]
    fn repeated_press_does_not_outlive_release() {
        let mut input = InputCollector::default();
        input.update_action_state_from_physical_key(PhysicalKey::Code(KeyCode::KeyA), true);
        input.update_action_state_from_physical_key(PhysicalKey::Code(KeyCode::KeyA), true);
        input.update_action_state_from_physical_key(PhysicalKey::Code(KeyCode::KeyA), false);

        assert!(!input.snapshot_for_tick().is_down(InputAction::MoveLeft));
    }

    #[test]
    fn pointer_press_is_edge_triggered_for_single_tick() {
        let mut input = InputCollector::new(640, 480);
        input.handle_mouse_input(MouseButton::Left, ElementState::Pressed);
        let first = input.snapshot_for_tick();
        let second = input.snapshot_for_tick();

        assert!(first.pointer_pressed());
        assert!(!second.pointer_pressed());
    }

    #[test]
    fn held_pointer_does_not_repeat_pressed_edge() {
        let mut input = InputCollector::new(640, 480);
        input.handle_mouse_input(MouseButton::Right, ElementState::Pressed);
        let first = input.snapshot_for_tick();
        input.handle_mouse_input(MouseButton::Right, ElementState::Pressed);
        let second = input.snapshot_for_tick();
        input.handle_mouse_input(MouseButton::Right, ElementState::Released);
        input.handle_mouse_input(MouseButton::Middle, ElementState::Pressed);
        let third = input.snapshot_for_tick();

        assert!(first.pointer_pressed());
        assert!(!second.pointer_pressed());
        assert!(third.pointer_pressed());
    }

    #[test]
    fn snapshot_carries_cursor_and_frame_size() {
        let mut input = InputCollector::new(640, 480);
        input.set_cursor_position_px(Some(Vec2::new(100.0, 200.0)));
        let snapshot = input.snapshot_for_tick();

        assert_eq!(snapshot.frame_size(), (640, 480));
        let cursor = snapshot.cursor_position_px().expect("cursor");
        assert!((cursor.x - 100.0).abs() < 0.0001);
        assert!((cursor.y - 200.0).abs() < 0.0001);

        input.set_cursor_position_px(None);
        assert!(input.snapshot_for_tick().cursor_position_px().is_none());
    }

    #[test]
    fn window_title_names_active_scene() {
        assert_eq!(
            window_title_for("Sprite Demos", SceneKey::WarriorSwing),
            "Sprite Demos - WarriorSwing"
        );
    }
}
