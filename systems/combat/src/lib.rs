#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that emits firing and income commands for ready emplacements.

use std::time::Duration;

use lane_defence_core::{
    Command, EmplacementId, EmplacementTarget, EmplacementView, FireMode,
};

/// Emplacement combat system that queues firing commands for ready emplacements.
#[derive(Debug, Default)]
pub struct Combat {
    scratch: Vec<Command>,
}

impl Combat {
    /// Creates a new combat system with an empty scratch buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Emits at most one command per emplacement whose interval has elapsed.
    ///
    /// Aiming emplacements fire only when a target was selected for them;
    /// their cooldown keeps running otherwise. Income emplacements pay out
    /// regardless of targets. `targets` must be sorted by emplacement, as
    /// produced by the targeting system.
    pub fn handle(
        &mut self,
        now: Duration,
        emplacements: &EmplacementView,
        targets: &[EmplacementTarget],
        out: &mut Vec<Command>,
    ) {
        self.scratch.clear();

        for emplacement in emplacements.iter() {
            if !emplacement.ready_at(now) {
                continue;
            }
            match emplacement.kind.fire_mode() {
                FireMode::Income => self.scratch.push(Command::GenerateIncome {
                    emplacement: emplacement.id,
                }),
                FireMode::Projectile => {
                    if let Some(target) = find_target(targets, emplacement.id) {
                        self.scratch.push(Command::FireProjectile {
                            emplacement: emplacement.id,
                            target: target.mob,
                        });
                    }
                }
            }
        }

        if self.scratch.is_empty() {
            return;
        }

        out.reserve(self.scratch.len());
        out.append(&mut self.scratch);
    }
}

fn find_target(targets: &[EmplacementTarget], emplacement: EmplacementId) -> Option<&EmplacementTarget> {
    targets
        .binary_search_by_key(&emplacement, |target| target.emplacement)
        .ok()
        .map(|index| &targets[index])
}
