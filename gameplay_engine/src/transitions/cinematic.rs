//! Cinematic event queue for the presentation layer.
use crate::arithmetic::clamp;
use crate::domain::{CameraState, CinematicEvent, CinematicEventType, GameplayState};
use crate::events::ActionContext;
use crate::state::CINEMATIC_QUEUE_LIMIT;

use super::mutate;

fn camera_for(intensity: u8) -> CameraState {
    match intensity {
        3 => CameraState::Tight,
        2 => CameraState::Medium,
        _ => CameraState::Wide,
    }
}

pub fn push_cinematic_event(
    state: &GameplayState,
    ctx: &ActionContext,
    event_type: CinematicEventType,
    message: &str,
    intensity: i64,
) -> GameplayState {
    mutate(state, |next| apply_push(next, ctx, event_type, message, intensity))
}

/// Touches: cinematic.
pub(crate) fn apply_push(
    state: &mut GameplayState,
    ctx: &ActionContext,
    event_type: CinematicEventType,
    message: &str,
    intensity: i64,
) {
    let intensity = clamp(intensity, 1, 3) as u8;
    let camera_state = camera_for(intensity);
    let message = match message.trim() {
        "" => "Event update".to_string(),
        trimmed => trimmed.to_string(),
    };
    let cinematic = &mut state.cinematic;
    cinematic.emitted += 1;
    cinematic.camera_state = camera_state;
    cinematic.queue.insert(
        0,
        CinematicEvent {
            id: format!("event-{}-{}", cinematic.emitted, state.seed % 1000),
            event_type,
            message,
            intensity,
            camera_state,
            at: ctx.at,
        },
    );
    cinematic.queue.truncate(CINEMATIC_QUEUE_LIMIT);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::create_initial_state;
    use crate::transitions::test_support::ctx;

    #[test]
    fn test_intensity_clamps_and_picks_camera() {
        let state = create_initial_state("cine", None);
        let next = push_cinematic_event(&state, &ctx(), CinematicEventType::Critical, "Boom", 9);
        let event = &next.cinematic.queue[0];
        assert_eq!(event.intensity, 3);
        assert_eq!(event.camera_state, CameraState::Tight);
        assert_eq!(next.cinematic.camera_state, CameraState::Tight);
    }

    #[test]
    fn test_queue_is_newest_first_and_bounded() {
        let mut state = create_initial_state("cine", None);
        for n in 0..15 {
            state = push_cinematic_event(&state, &ctx(), CinematicEventType::Info, &format!("m{n}"), 1);
        }
        assert_eq!(state.cinematic.queue.len(), CINEMATIC_QUEUE_LIMIT);
        assert_eq!(state.cinematic.queue[0].message, "m14");
        assert!(state.cinematic.queue[0].id.starts_with("event-15-"));
    }

    #[test]
    fn test_blank_message_gets_default() {
        let state = create_initial_state("cine", None);
        let next = push_cinematic_event(&state, &ctx(), CinematicEventType::Twist, "  ", 0);
        assert_eq!(next.cinematic.queue[0].message, "Event update");
        assert_eq!(next.cinematic.queue[0].intensity, 1);
    }
}
