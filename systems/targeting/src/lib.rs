#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that assigns each defender the enemy it should fire at.

use tower_defence_core::{DefenderSnapshot, DefenderTarget, EnemyId, EnemySnapshot};

/// Defender targeting system that reuses a scratch buffer between frames.
#[derive(Debug, Default)]
pub struct DefenderTargeting {
    candidates: Vec<EnemySnapshot>,
}

impl DefenderTargeting {
    /// Creates a new targeting system with an empty scratch buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Computes defender targets for the provided snapshots.
    ///
    /// The output buffer is cleared before it is populated. Each defender
    /// targets the in-range enemy furthest along the path; ties prefer the
    /// nearer enemy, then the smaller identifier.
    pub fn handle(
        &mut self,
        defenders: &[DefenderSnapshot],
        enemies: &[EnemySnapshot],
        out: &mut Vec<DefenderTarget>,
    ) {
        out.clear();

        if defenders.is_empty() || enemies.is_empty() {
            return;
        }

        self.candidates.clear();
        self.candidates.extend_from_slice(enemies);
        self.candidates.sort_by_key(|enemy| enemy.id);

        for defender in defenders {
            if !(defender.range > 0.0) {
                continue;
            }
            let max_distance_sq = defender.range * defender.range;

            let mut best: Option<Candidate> = None;
            for enemy in &self.candidates {
                let distance_sq = defender.center.distance_squared(enemy.center);
                if distance_sq > max_distance_sq {
                    continue;
                }

                let current = Candidate {
                    id: enemy.id,
                    progress: enemy.progress,
                    distance_sq,
                };
                match &mut best {
                    Some(existing) => {
                        if current.precedes(existing) {
                            *existing = current;
                        }
                    }
                    None => best = Some(current),
                }
            }

            if let Some(candidate) = best {
                out.push(DefenderTarget {
                    defender: defender.id,
                    enemy: candidate.id,
                });
            }
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct Candidate {
    id: EnemyId,
    progress: f32,
    distance_sq: f32,
}

impl Candidate {
    fn precedes(&self, other: &Self) -> bool {
        if self.progress != other.progress {
            return self.progress > other.progress;
        }

        if self.distance_sq != other.distance_sq {
            return self.distance_sq < other.distance_sq;
        }

        self.id < other.id
    }
}
