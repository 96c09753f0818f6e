//! Presentation sink for headless matches.
use battle_core::{Disposable, FxError, FxOracle, FxTarget, SoundCue, SoundSpec, Vec2};

/// Mirrors every visual effect and sound cue into the `tracing` log.
///
/// Continuous effects hand back a [`Disposable`] that logs when the engine
/// releases it, which makes leaked handles visible in the session log.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingFx;

impl FxOracle for TracingFx {
    fn apply_fx(&self, id: &str, target: FxTarget) -> Result<Disposable, FxError> {
        if id.trim().is_empty() {
            return Err(FxError::Unknown(id.to_string()));
        }
        let position = target.position();
        tracing::trace!(
            target: "battle_runtime::fx",
            fx = id,
            x = position.x,
            y = position.y,
            "fx started"
        );
        let id = id.to_string();
        Ok(Disposable::new(move || {
            tracing::trace!(target: "battle_runtime::fx", fx = %id, "fx disposed");
            Ok(())
        }))
    }

    fn play_sound(&self, cue: SoundCue, spec: &SoundSpec, at: Vec2) {
        tracing::trace!(
            target: "battle_runtime::fx",
            cue = %cue,
            frequency = spec.frequency,
            duration_ms = spec.duration_ms,
            waveform = %spec.waveform,
            x = at.x,
            y = at.y,
            "sound"
        );
    }
}
