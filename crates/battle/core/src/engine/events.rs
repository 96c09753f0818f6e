use crate::env::IssueSeverity;
use crate::event::{EventPayload, Listener};
use crate::state::UnitId;

use super::BattleEngine;

impl BattleEngine<'_> {
    /// Synchronously delivers `payload` to every listener of
    /// `(target, payload.kind)` in registration order.
    ///
    /// The listener list is captured before the first call; a listener removed
    /// by an earlier one in the same emission is skipped. Failures are
    /// reported and do not stop the remaining listeners.
    pub fn emit(&mut self, target: UnitId, payload: &mut EventPayload) {
        let listeners = self.world.bus.listeners(target, payload.kind);
        if listeners.is_empty() {
            return;
        }
        tracing::trace!(
            target: "battle_core::events",
            unit = %target,
            event = %payload.kind,
            listeners = listeners.len(),
            "emit"
        );

        for (id, listener) in listeners {
            if !self.world.bus.is_registered(id) {
                continue;
            }
            match listener {
                Listener::Hook(hook) => {
                    if let Err(err) = hook(payload) {
                        self.report(
                            &payload.kind.to_string(),
                            format!("listener on {target} failed: {err}"),
                            IssueSeverity::Error,
                            Some(target),
                        );
                    }
                }
                Listener::Skill {
                    owner,
                    skill,
                    trigger,
                } => {
                    crate::skill::dispatch_event(self, owner, &skill, trigger, payload);
                }
            }
        }
    }
}
