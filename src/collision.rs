//! Collision resolution between the player and the pursuers.
//!
//! The resolver owns no state. It is run after the player's move and after every single pursuer
//! move, and turns co-location into score, respawns, life loss and round resets.

use tracing::info;

use crate::{player::Player, pursuer::Pursuer};

/// Points for eating a scared pursuer.
pub const EATEN_BONUS: u32 = 200;

/// A single collision event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Collision {
    /// The player ate a scared pursuer, which went back to its spawn.
    Eaten {
        /// Name of the eaten pursuer.
        pursuer: &'static str,
    },
    /// A pursuer caught the player, who lost a life; the round was reset.
    LifeLost {
        /// Lives the player has left.
        lives_left: u32,
    },
    /// A pursuer caught the player on their last life.
    GameOver,
}

impl Collision {
    /// Whether this collision reset the round or ended the game.
    #[must_use]
    pub const fn ends_round(self) -> bool {
        matches!(self, Self::LifeLost { .. } | Self::GameOver)
    }
}

/// Reconciles pursuer and player occupancy.
#[derive(Clone, Copy, Debug, Default)]
pub struct CollisionResolver;

impl CollisionResolver {
    /// Applies the eaten or caught rule to every pursuer standing on the player's cell.
    ///
    /// Pursuers are checked in roster order. An edible pursuer is eaten: it respawns and the player
    /// scores [`EATEN_BONUS`]. Any other pursuer catches the player, who loses a life. With lives
    /// left, the player and every pursuer are sent back to their start cells with power and all
    /// transient flags cleared; without, the game is over and positions stay as they are. Checking
    /// stops at the first catch.
    pub fn resolve(self, player: &mut Player, pursuers: &mut [Pursuer]) -> Vec<Collision> {
        let mut collisions = Vec::new();
        let mut caught = false;

        for pursuer in pursuers.iter_mut() {
            if pursuer.position() != player.position() {
                continue;
            }
            if pursuer.is_edible() {
                pursuer.respawn();
                player.add_score(EATEN_BONUS);
                info!(pursuer = pursuer.name(), score = player.score(), "pursuer eaten");
                collisions.push(Collision::Eaten {
                    pursuer: pursuer.name(),
                });
            } else {
                caught = true;
                break;
            }
        }

        if caught {
            let lives_left = player.lose_life();
            if lives_left > 0 {
                info!(lives_left, "player caught, resetting the round");
                player.reset_for_round();
                for pursuer in pursuers.iter_mut() {
                    pursuer.reset_for_round();
                }
                collisions.push(Collision::LifeLost { lives_left });
            } else {
                info!(score = player.score(), "player caught on the last life");
                collisions.push(Collision::GameOver);
            }
        }

        collisions
    }
}
