//! Skill engine.
//!
//! A skill is a configured behaviour bound to a unit. Each of the seven kinds
//! is served by a [`SkillHandler`] from a static table, so dispatch is a
//! plain `match` on [`SkillKind`]:
//!
//! - `validate`: reports configuration issues; never aborts on its own
//! - `init`: resolves collaborators and builds the per-unit [`SkillState`]
//! - `fire`: one activation, from an event trigger or the tick loop
//! - `update`: per-frame work (trigger polling, aura passes, projectiles)
//! - `cleanup`: forced deactivation when the owner is removed
//!
//! Event triggers are wired through the world's event bus as
//! [`Listener::Skill`] entries keyed by the owner's id.
mod aura;
mod buff;
mod config;
mod debuff;
mod projectile;
mod summon;
mod teleport;
mod transform;
mod trigger;
mod validate;

pub use config::{
    ProjectileConfig, SkillConfig, SkillFx, SkillKind, SkillSounds, SuicideSpec,
    SummonProperties, TARGET_SELECTIONS, TransformConfig, TriggerConfig,
};
pub use trigger::{TriggerGate, TriggerKind};
pub use validate::SkillIssue;

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::effect::{EffectDefinition, EffectError};
use crate::engine::BattleEngine;
use crate::env::{Appearance, Disposable, FxTarget, SoundCue, roll};
use crate::error::{BattleError, ErrorSeverity};
use crate::event::{EventKind, EventPayload, Listener};
use crate::state::{BattleEvent, DeferredTask, Millis, Projectile, Unit, UnitId};

// ============================================================================
// Errors
// ============================================================================

/// Why a skill could not be activated for a unit.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum SkillError {
    #[error("skill '{0}' not found")]
    NotFound(String),

    #[error("unit {0} does not exist")]
    UnitMissing(UnitId),

    #[error("skill '{skill}' has no skillEffectId")]
    MissingEffectId { skill: String },

    #[error("skill '{skill}' references unknown effect '{effect}'")]
    EffectNotFound { skill: String, effect: String },

    #[error("skill '{skill}' is missing its '{field}' block")]
    MissingPayload { skill: String, field: &'static str },

    #[error("skill '{skill}' is already attached to {unit}")]
    Duplicate { skill: String, unit: UnitId },

    #[error(transparent)]
    Effect(#[from] EffectError),
}

impl BattleError for SkillError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::NotFound(_)
            | Self::MissingEffectId { .. }
            | Self::EffectNotFound { .. }
            | Self::MissingPayload { .. } => ErrorSeverity::Validation,
            Self::UnitMissing(_) | Self::Duplicate { .. } => ErrorSeverity::Recoverable,
            Self::Effect(err) => err.severity(),
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "SKILL_NOT_FOUND",
            Self::UnitMissing(_) => "SKILL_UNIT_MISSING",
            Self::MissingEffectId { .. } => "SKILL_MISSING_EFFECT_ID",
            Self::EffectNotFound { .. } => "SKILL_EFFECT_NOT_FOUND",
            Self::MissingPayload { .. } => "SKILL_MISSING_PAYLOAD",
            Self::Duplicate { .. } => "SKILL_DUPLICATE",
            Self::Effect(err) => err.error_code(),
        }
    }
}

// ============================================================================
// Per-unit state
// ============================================================================

/// Inactive ⇄ Active toggle shared by aura, buff and transform.
#[derive(Debug, Default)]
pub struct ToggleState {
    pub active: bool,
    pub activated_at: Option<Millis>,
    /// Times the skill went from inactive to active.
    pub activations: u32,
    pub(crate) fx: Disposable,
}

impl ToggleState {
    fn enter(&mut self, now: Millis) {
        self.active = true;
        self.activated_at = Some(now);
        self.activations += 1;
    }

    /// Marks the toggle inactive and hands back the continuous visual.
    fn leave(&mut self) -> Disposable {
        self.active = false;
        self.activated_at = None;
        core::mem::take(&mut self.fx)
    }
}

#[derive(Debug, Default)]
pub struct AuraState {
    pub toggle: ToggleState,
    /// Forwarding target applied to units in range, resolved at activation.
    pub forward: Option<Arc<EffectDefinition>>,
    /// Last direct pulse per target.
    pub(crate) pulses: BTreeMap<UnitId, Millis>,
}

#[derive(Debug, Default)]
pub struct TransformState {
    pub toggle: ToggleState,
    /// Appearance to restore when the transform ends.
    pub original: Option<Appearance>,
}

#[derive(Debug, Default)]
pub struct SummonState {
    /// Every unit this skill has summoned, alive or not.
    pub spawned: Vec<UnitId>,
}

#[derive(Debug, Default)]
pub struct ProjectileState {
    pub in_flight: Vec<Projectile>,
    /// Secondary effects resolved when the skill was applied.
    pub effects: Vec<Arc<EffectDefinition>>,
    pub volleys: u32,
}

#[derive(Debug, Default)]
pub struct TeleportState {
    pub jumps: u32,
}

#[derive(Debug)]
pub enum SkillState {
    Aura(AuraState),
    Buff(ToggleState),
    Debuff { landed: u32 },
    Transform(TransformState),
    Summon(SummonState),
    Projectile(ProjectileState),
    Teleport(TeleportState),
}

impl SkillState {
    fn toggle(&self) -> Option<&ToggleState> {
        match self {
            Self::Aura(state) => Some(&state.toggle),
            Self::Buff(state) => Some(state),
            Self::Transform(state) => Some(&state.toggle),
            _ => None,
        }
    }

    fn toggle_mut(&mut self) -> Option<&mut ToggleState> {
        match self {
            Self::Aura(state) => Some(&mut state.toggle),
            Self::Buff(state) => Some(state),
            Self::Transform(state) => Some(&mut state.toggle),
            _ => None,
        }
    }
}

/// A skill attached to a unit.
#[derive(Debug)]
pub struct SkillSlot {
    pub name: String,
    pub config: Arc<SkillConfig>,
    /// Effect named by `skillEffectId`. Buff, debuff and transform store the
    /// forwarding-resolved definition; aura keeps the authored one.
    pub effect: Option<Arc<EffectDefinition>>,
    pub(crate) gate: TriggerGate,
    pub state: SkillState,
}

impl SkillSlot {
    pub fn kind(&self) -> SkillKind {
        self.config.kind
    }

    /// Whether a toggle skill is currently active. Always `false` for
    /// one-shot kinds.
    pub fn is_active(&self) -> bool {
        self.state.toggle().is_some_and(|toggle| toggle.active)
    }

    pub fn activations(&self) -> u32 {
        self.state.toggle().map_or(0, |toggle| toggle.activations)
    }

    /// Skill projectiles still travelling.
    pub fn in_flight(&self) -> usize {
        match &self.state {
            SkillState::Projectile(state) => state.in_flight.len(),
            _ => 0,
        }
    }

    pub fn gate(&self) -> &TriggerGate {
        &self.gate
    }
}

// ============================================================================
// Dispatch table
// ============================================================================

/// One firing of a skill.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Activation {
    pub trigger: TriggerKind,
    /// Attacked unit for attack triggers, attacker for get-attacked and death.
    pub counterpart: Option<UnitId>,
}

impl Activation {
    fn tick(trigger: TriggerKind) -> Self {
        Self {
            trigger,
            counterpart: None,
        }
    }
}

pub(crate) type InitFn = fn(
    &BattleEngine<'_>,
    UnitId,
    &SkillConfig,
    Option<&Arc<EffectDefinition>>,
) -> Result<SkillState, SkillError>;

pub(crate) struct SkillHandler {
    pub validate: fn(&SkillConfig, &mut Vec<SkillIssue>),
    /// Whether `skillEffectId` must resolve before the skill can be applied.
    pub requires_effect: bool,
    pub init: InitFn,
    pub fire: fn(&mut BattleEngine<'_>, UnitId, &str, Activation),
    pub update: fn(&mut BattleEngine<'_>, UnitId, &str),
    pub cleanup: fn(&mut BattleEngine<'_>, &Unit, &mut SkillSlot),
}

static AURA: SkillHandler = SkillHandler {
    validate: aura::validate,
    requires_effect: true,
    init: aura::init,
    fire: aura::fire,
    update: aura::update,
    cleanup: aura::cleanup,
};

static BUFF: SkillHandler = SkillHandler {
    validate: buff::validate,
    requires_effect: true,
    init: buff::init,
    fire: buff::fire,
    update: buff::update,
    cleanup: buff::cleanup,
};

static DEBUFF: SkillHandler = SkillHandler {
    validate: debuff::validate,
    requires_effect: true,
    init: debuff::init,
    fire: debuff::fire,
    update: debuff::update,
    cleanup: debuff::cleanup,
};

static TRANSFORM: SkillHandler = SkillHandler {
    validate: transform::validate,
    requires_effect: true,
    init: transform::init,
    fire: transform::fire,
    update: transform::update,
    cleanup: transform::cleanup,
};

static SUMMON: SkillHandler = SkillHandler {
    validate: summon::validate,
    requires_effect: false,
    init: summon::init,
    fire: summon::fire,
    update: summon::update,
    cleanup: summon::cleanup,
};

static PROJECTILE: SkillHandler = SkillHandler {
    validate: projectile::validate,
    requires_effect: false,
    init: projectile::init,
    fire: projectile::fire,
    update: projectile::update,
    cleanup: projectile::cleanup,
};

static TELEPORT: SkillHandler = SkillHandler {
    validate: teleport::validate,
    requires_effect: false,
    init: teleport::init,
    fire: teleport::fire,
    update: teleport::update,
    cleanup: teleport::cleanup,
};

pub(crate) fn handler(kind: SkillKind) -> &'static SkillHandler {
    match kind {
        SkillKind::Aura => &AURA,
        SkillKind::Buff => &BUFF,
        SkillKind::Debuff => &DEBUFF,
        SkillKind::Transform => &TRANSFORM,
        SkillKind::Summon => &SUMMON,
        SkillKind::Projectile => &PROJECTILE,
        SkillKind::Teleport => &TELEPORT,
    }
}

/// Every issue a configuration raises, shared checks first.
pub fn validate_config(config: &SkillConfig) -> Vec<SkillIssue> {
    let mut issues = validate::common(config);
    (handler(config.kind).validate)(config, &mut issues);
    issues
}

// ============================================================================
// Activation
// ============================================================================

impl BattleEngine<'_> {
    /// Attaches the named skill to `unit`: validates it, resolves its
    /// collaborators, wires its triggers and fires it once if it triggers on
    /// spawn. Failures are reported and returned; the unit keeps fighting.
    pub fn apply_skill(&mut self, unit: UnitId, name: &str) -> Result<(), SkillError> {
        let result = self.try_apply_skill(unit, name);
        if let Err(err) = &result {
            self.report_error(name, err, Some(unit));
        }
        result
    }

    fn try_apply_skill(&mut self, unit: UnitId, name: &str) -> Result<(), SkillError> {
        let config = self
            .env
            .content()
            .skill(name)
            .ok_or_else(|| SkillError::NotFound(name.to_string()))?;
        let owner = self
            .world
            .unit(unit)
            .ok_or(SkillError::UnitMissing(unit))?;
        if owner.skill(name).is_some() {
            return Err(SkillError::Duplicate {
                skill: name.to_string(),
                unit,
            });
        }

        for issue in validate_config(&config) {
            self.report(name, issue.message, issue.severity, Some(unit));
        }

        let handler = handler(config.kind);
        let effect = self.resolve_skill_effect(name, &config, handler.requires_effect)?;
        let state = (handler.init)(self, unit, &config, effect.as_ref())?;

        let now = self.world.now();
        let slot = SkillSlot {
            name: name.to_string(),
            config: Arc::clone(&config),
            effect,
            gate: TriggerGate::armed_at(now),
            state,
        };
        if !self.register_skill(unit, slot) {
            return Err(SkillError::UnitMissing(unit));
        }
        self.wire_triggers(unit, name, &config);
        tracing::debug!(
            target: "battle_core::skill",
            unit = %unit,
            skill = %name,
            kind = %config.kind,
            "skill applied"
        );

        if config.trigger.on_spawn && self.world.is_alive(unit) {
            (handler.fire)(self, unit, name, Activation::tick(TriggerKind::Spawn));
        }
        Ok(())
    }

    fn resolve_skill_effect(
        &self,
        name: &str,
        config: &SkillConfig,
        required: bool,
    ) -> Result<Option<Arc<EffectDefinition>>, SkillError> {
        let Some(effect_id) = config.skill_effect_id.as_deref() else {
            return if required {
                Err(SkillError::MissingEffectId {
                    skill: name.to_string(),
                })
            } else {
                Ok(None)
            };
        };
        let effect = self.env.content().effect(effect_id).ok_or_else(|| {
            SkillError::EffectNotFound {
                skill: name.to_string(),
                effect: effect_id.to_string(),
            }
        })?;
        match config.kind {
            // Aura resolves its forwarding target itself and keeps the
            // authored radius and target list.
            SkillKind::Aura => Ok(Some(effect)),
            _ => Ok(Some(self.resolve_forwarding(effect)?)),
        }
    }

    fn wire_triggers(&mut self, unit: UnitId, name: &str, config: &SkillConfig) {
        let trigger = &config.trigger;
        let wiring = [
            (trigger.on_attack, EventKind::Attack, TriggerKind::Attack),
            (trigger.on_attack_once, EventKind::Attack, TriggerKind::AttackOnce),
            (
                trigger.on_get_attacked,
                EventKind::DamageReceived,
                TriggerKind::GetAttacked,
            ),
            (
                trigger.on_death && config.kind == SkillKind::Summon,
                EventKind::Death,
                TriggerKind::Death,
            ),
        ];
        for (enabled, event, kind) in wiring {
            if enabled {
                self.world.bus.on(
                    unit,
                    event,
                    Listener::Skill {
                        owner: unit,
                        skill: name.to_string(),
                        trigger: kind,
                    },
                );
            }
        }
    }

    /// Fires a skill as if its trigger had been met. Returns `false` when the
    /// unit or skill is absent.
    pub fn trigger_skill(&mut self, unit: UnitId, name: &str, counterpart: Option<UnitId>) -> bool {
        let Some(kind) = self.world.unit(unit).and_then(|u| u.skill(name)).map(SkillSlot::kind)
        else {
            return false;
        };
        let activation = Activation {
            trigger: TriggerKind::Spawn,
            counterpart,
        };
        (handler(kind).fire)(self, unit, name, activation);
        true
    }
}

/// Routes a bus event into the owning skill.
pub(crate) fn dispatch_event(
    engine: &mut BattleEngine<'_>,
    owner: UnitId,
    name: &str,
    trigger: TriggerKind,
    payload: &EventPayload,
) {
    let Some(unit) = engine.world.units.get_mut(&owner) else {
        return;
    };
    // Death listeners run while the owner is dying; everything else needs it alive.
    if trigger != TriggerKind::Death && !unit.is_alive() {
        return;
    }
    let Some(slot) = unit.skill_mut(name) else {
        return;
    };
    if trigger == TriggerKind::AttackOnce && !slot.gate.take_attack_once() {
        return;
    }
    let kind = slot.kind();
    let counterpart = match trigger {
        TriggerKind::Attack | TriggerKind::AttackOnce => Some(payload.target),
        _ => payload.attacker,
    };
    tracing::trace!(
        target: "battle_core::skill",
        unit = %owner,
        skill = %name,
        trigger = %trigger,
        "skill triggered"
    );
    (handler(kind).fire)(engine, owner, name, Activation {
        trigger,
        counterpart,
    });
}

/// Per-frame update of one slot.
pub(crate) fn update_slot(engine: &mut BattleEngine<'_>, owner: UnitId, name: &str) {
    let Some(kind) = engine
        .world
        .unit(owner)
        .filter(|u| u.is_alive())
        .and_then(|u| u.skill(name))
        .map(SkillSlot::kind)
    else {
        return;
    };
    (handler(kind).update)(engine, owner, name);
}

/// Forced deactivation of a slot whose owner has already left the world.
pub(crate) fn cleanup_slot(engine: &mut BattleEngine<'_>, unit: &Unit, slot: &mut SkillSlot) {
    (handler(slot.kind()).cleanup)(engine, unit, slot);
}

// ============================================================================
// Shared helpers
// ============================================================================

fn slot<'e>(engine: &'e BattleEngine<'_>, owner: UnitId, name: &str) -> Option<&'e SkillSlot> {
    engine.world.unit(owner)?.skill(name)
}

fn slot_mut<'e>(
    engine: &'e mut BattleEngine<'_>,
    owner: UnitId,
    name: &str,
) -> Option<&'e mut SkillSlot> {
    engine.world.units.get_mut(&owner)?.skill_mut(name)
}

/// Polls the tick-driven triggers of a slot.
fn poll_trigger(engine: &mut BattleEngine<'_>, owner: UnitId, name: &str) -> Option<TriggerKind> {
    let seed = engine.roll_seed(owner, roll::TRIGGER_CHANCE);
    let rng = engine.env.rng();
    let now = engine.world.now();
    let unit = engine.world.units.get_mut(&owner)?;
    let ratio = unit.health_ratio();
    let slot = unit.skill_mut(name)?;
    let config = Arc::clone(&slot.config);
    slot.gate
        .poll(&config.trigger, ratio, now, |chance| rng.chance(seed, chance))
}

/// Start visual, start sound and the activation record.
fn announce_start(engine: &mut BattleEngine<'_>, owner: UnitId, name: &str, config: &SkillConfig) {
    let Some(anchor) = engine.unit_fx_target(owner) else {
        return;
    };
    engine.flash_fx(config.fx.start.as_deref(), anchor);
    engine.play_sound(SoundCue::SkillStart, config.sounds.start.as_ref(), anchor.position());
    engine.world.outbox.push(BattleEvent::SkillActivated {
        unit: owner,
        skill: name.to_string(),
    });
    tracing::debug!(
        target: "battle_core::skill",
        unit = %owner,
        skill = %name,
        "skill activated"
    );
}

fn start_continuous(engine: &BattleEngine<'_>, owner: UnitId, config: &SkillConfig) -> Disposable {
    match engine.unit_fx_target(owner) {
        Some(anchor) => engine.start_fx(config.fx.continuous.as_deref(), anchor),
        None => Disposable::noop(),
    }
}

/// End visual, end sound and the deactivation record.
fn announce_end(
    engine: &mut BattleEngine<'_>,
    owner: UnitId,
    name: &str,
    config: &SkillConfig,
    anchor: FxTarget,
) {
    engine.flash_fx(config.fx.end.as_deref(), anchor);
    engine.play_sound(SoundCue::SkillEnd, config.sounds.end.as_ref(), anchor.position());
    engine.world.outbox.push(BattleEvent::SkillDeactivated {
        unit: owner,
        skill: name.to_string(),
    });
    tracing::debug!(
        target: "battle_core::skill",
        unit = %owner,
        skill = %name,
        "skill deactivated"
    );
}

/// Schedules the owner's self-kill when the skill is configured with `suicide`.
fn schedule_suicide(
    engine: &mut BattleEngine<'_>,
    owner: UnitId,
    name: &str,
    config: &SkillConfig,
    default_ms: Millis,
) {
    if let Some(delay) = config.suicide_delay(default_ms) {
        let due_at = engine.world.now() + delay;
        engine.world.scheduler.schedule(
            due_at,
            DeferredTask::Suicide {
                unit: owner,
                skill: name.to_string(),
            },
        );
    }
}

/// Enters the toggle of an aura, buff or transform slot, storing its
/// continuous visual. Returns `false` if it was already active.
fn enter_toggle(engine: &mut BattleEngine<'_>, owner: UnitId, name: &str) -> bool {
    let now = engine.world.now();
    let Some(slot) = slot_mut(engine, owner, name) else {
        return false;
    };
    let config = Arc::clone(&slot.config);
    let Some(toggle) = slot.state.toggle_mut() else {
        return false;
    };
    if toggle.active {
        return false;
    }
    toggle.enter(now);

    announce_start(engine, owner, name, &config);
    let fx = start_continuous(engine, owner, &config);
    match slot_mut(engine, owner, name).and_then(|slot| slot.state.toggle_mut()) {
        Some(toggle) => toggle.fx = fx,
        None => {
            let mut fx = fx;
            engine.dispose(name, &mut fx, Some(owner));
        }
    }
    true
}

/// Leaves the toggle of a slot on a live unit. Returns `false` if inactive.
fn leave_toggle(engine: &mut BattleEngine<'_>, owner: UnitId, name: &str) -> bool {
    let Some(slot) = slot_mut(engine, owner, name) else {
        return false;
    };
    let config = Arc::clone(&slot.config);
    let Some(toggle) = slot.state.toggle_mut().filter(|toggle| toggle.active) else {
        return false;
    };
    let mut fx = toggle.leave();
    engine.dispose(name, &mut fx, Some(owner));
    if let Some(anchor) = engine.unit_fx_target(owner) {
        announce_end(engine, owner, name, &config, anchor);
    }
    true
}

/// Toggle shutdown while the owner is being removed.
fn cleanup_toggle(engine: &mut BattleEngine<'_>, unit: &Unit, slot: &mut SkillSlot) -> bool {
    let Some(toggle) = slot.state.toggle_mut().filter(|toggle| toggle.active) else {
        return false;
    };
    let mut fx = toggle.leave();
    engine.dispose(&slot.name, &mut fx, None);
    let anchor = FxTarget::Unit {
        id: unit.id,
        position: unit.position,
    };
    announce_end(engine, unit.id, &slot.name, &slot.config, anchor);
    true
}
