//! Edge-triggered alerts derived from before/after state.

use crate::domain::engine::PlayerId;

/// Players whose hand count just became exactly 1.
///
/// Edge-triggered only: a player already at one card does not re-alert.
/// `before` and `after` are (player, hand_count) snapshots taken around a
/// single engine mutation; players absent from `before` never alert.
pub fn derive_rush_alerts(
    before: &[(PlayerId, usize)],
    after: &[(PlayerId, usize)],
) -> Vec<PlayerId> {
    after
        .iter()
        .filter(|(player, count)| {
            *count == 1
                && before
                    .iter()
                    .any(|(p, prior)| p == player && *prior != 1)
        })
        .map(|(player, _)| *player)
        .collect()
}
