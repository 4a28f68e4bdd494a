// ABOUTME: Input interface - the scene-level actions the outer frame loop reports each frame
// ABOUTME: Pinned interface only; actual key polling/ray construction are non-goal internals (spec §1, §6)

/// One discrete action the outer loop may report for a frame, decoded
/// from `keyDown(action)` in the original. Grounded on `mod1.cpp`'s
/// input handling: pause toggle, map-index cycling, scenario cycling,
/// and the wireframe toggle bound to scancode `1`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    TogglePause,
    NextMap,
    PreviousMap,
    CycleScenario,
    ToggleWireframe,
}

/// Everything the outer loop must report for one frame: the discrete
/// actions it observed, plus (sandbox scenario only) a resolved
/// world-space terrain-hit point from its own ray/click handling. This is
/// the single data type that crosses the core/renderer boundary for
/// input, per spec §6.
#[derive(Clone, Debug, Default)]
pub struct FrameInput {
    pub actions: Vec<Action>,
    pub sandbox_click: Option<(f32, f32)>,
}

impl FrameInput {
    pub fn contains(&self, action: Action) -> bool {
        self.actions.contains(&action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_input_defaults_to_no_actions() {
        let input = FrameInput::default();
        assert!(input.actions.is_empty());
        assert!(input.sandbox_click.is_none());
    }

    #[test]
    fn contains_reports_reported_actions_only() {
        let input = FrameInput {
            actions: vec![Action::TogglePause],
            sandbox_click: None,
        };
        assert!(input.contains(Action::TogglePause));
        assert!(!input.contains(Action::NextMap));
    }
}
