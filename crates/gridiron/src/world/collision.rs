use tracing::debug;

use super::entity::{Entity, EntityKind};
use super::overlay::FloatingText;
use super::player::Player;
use super::scoreboard::Scoreboard;

/// Level transition requested by a collision handler. At most one is
/// recorded per scan; the first request wins, and the world applies it
/// only after the scan completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TransitionRequest {
    Failure,
    Advance,
}

/// Flags produced by one dispatch, valid only until the next one.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct DispatchOutcome {
    pub hit_terrain: bool,
    pub remove_entity: bool,
}

/// Mutable world state a collision handler may touch. Built fresh for
/// each scan from the world's fields.
pub(crate) struct DispatchContext<'a> {
    pub player: &'a mut Player,
    pub scoreboard: &'a mut Scoreboard,
    pub overlays: &'a mut Vec<FloatingText>,
    pub coin_multiplier: &'a mut i32,
    pub transition: &'a mut Option<TransitionRequest>,
}

/// Kind-dispatched collision response for one (player, entity) pair whose
/// boxes overlap. Terrain kinds resolve immediately; pickup and trigger
/// kinds produce side effects and flags the caller consumes right away.
pub(crate) fn dispatch(entity: &mut Entity, ctx: &mut DispatchContext<'_>) -> DispatchOutcome {
    let entity_id = entity.id();
    let entity_position = entity.position();
    let entity_bounds = entity.bounds();

    match entity.kind_mut() {
        EntityKind::Platform { .. } | EntityKind::Wall => {
            ctx.player.resolve_against(entity_bounds, entity_id);
            DispatchOutcome {
                hit_terrain: true,
                remove_entity: false,
            }
        }
        EntityKind::Coin { base_value, .. } => {
            let value = *base_value * *ctx.coin_multiplier;
            ctx.scoreboard.add_points(value);
            ctx.overlays
                .push(FloatingText::new(format!("+{value}"), entity_position));
            DispatchOutcome {
                hit_terrain: false,
                remove_entity: true,
            }
        }
        EntityKind::Enemy { .. } => {
            if ctx.transition.is_none() {
                debug!(entity = entity_id.0, "enemy_touched");
                *ctx.transition = Some(TransitionRequest::Failure);
            }
            DispatchOutcome::default()
        }
        EntityKind::Goal => {
            if ctx.transition.is_none() {
                debug!(entity = entity_id.0, "goal_reached");
                *ctx.transition = Some(TransitionRequest::Advance);
            }
            DispatchOutcome::default()
        }
        EntityKind::PowerUp { activated, .. } => {
            // One-shot: only the first touch has any effect.
            if !*activated {
                *activated = true;
                *ctx.coin_multiplier *= 2;
                ctx.overlays
                    .push(FloatingText::new("Power Up!".to_string(), entity_position));
                debug!(multiplier = *ctx.coin_multiplier, "power_up_activated");
            }
            DispatchOutcome::default()
        }
        EntityKind::Background => DispatchOutcome::default(),
    }
}
