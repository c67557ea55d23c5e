//! Per-frame state advancement: hotkeys, camera controls, asset polling, effects.

use glam::Vec2;
use input::MouseButton;

use crate::GameState;

/// Run one frame of update. Called from `GameState::update()`.
pub fn frame(state: &mut GameState) {
    state.time.update();
    let dt = state.time.delta_seconds();
    state.input.begin_frame();

    if state.input.is_quit_pressed() {
        state.running = false;
    }
    if state.input.is_pause_pressed() {
        let paused = state.scene.toggle_pause();
        log::info!("Effects {}", if paused { "paused" } else { "resumed" });
    }
    if state.input.is_reseed_pressed() {
        state.scene.reseed(&state.config.effects);
        state.meshes.rebuild_particles(&state.renderer, &state.scene);
    }

    camera_controls(state, dt);
    poll_assets(state);
    state.scene.update(dt);

    state.input.end_frame();
}

fn camera_controls(state: &mut GameState, dt: f32) {
    let drag = state.input.drag_delta();
    if drag != Vec2::ZERO {
        state.camera.rotate(drag.x, drag.y);
    }
    let scroll = state.input.scroll_lines();
    if scroll != 0.0 {
        state.camera.zoom(scroll);
    }
    // Idle spin yields to the user while they drag.
    if !state.input.is_mouse_held(MouseButton::Left) {
        state.camera.update(dt);
    }
}

fn poll_assets(state: &mut GameState) {
    let Some(loader) = state.loader.as_mut() else {
        return;
    };
    match loader.poll() {
        Some(Ok(model)) => {
            let centerpiece = state.scene.attach_centerpiece(model, &state.config.centerpiece);
            state.meshes.attach_centerpiece(&state.renderer, centerpiece);
        }
        Some(Err(e)) => {
            log::error!("Could not load centerpiece: {}; continuing without it", e);
        }
        None => {}
    }
    if !loader.is_pending() {
        state.loader = None;
    }
}
