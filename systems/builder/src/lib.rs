#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure input system responsible for emitting emplacement placement, upgrade and sale commands.

use glam::Vec2;
use lane_defence_core::{Command, EmplacementKind, Event};

/// Action performed when the player clicks the playfield.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tool {
    /// Construct an emplacement of the given kind.
    Build(EmplacementKind),
    /// Upgrade the clicked emplacement.
    Upgrade,
    /// Sell the clicked emplacement.
    Sell,
}

impl Default for Tool {
    fn default() -> Self {
        Self::Build(EmplacementKind::Basic)
    }
}

/// Player intent captured by an adapter between two ticks.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum BuilderRequest {
    /// Makes `tool` the action applied by subsequent clicks.
    SelectTool(Tool),
    /// Applies the selected tool at a playfield point.
    Click {
        /// Point that was clicked.
        point: Vec2,
    },
    /// Builds an emplacement regardless of the selected tool.
    Place {
        /// Kind of emplacement to construct.
        kind: EmplacementKind,
        /// Point whose cell receives the emplacement.
        point: Vec2,
    },
    /// Upgrades the emplacement in the cell containing `point`.
    Upgrade {
        /// Point inside the emplacement's cell.
        point: Vec2,
    },
    /// Sells the emplacement in the cell containing `point`.
    Sell {
        /// Point inside the emplacement's cell.
        point: Vec2,
    },
}

/// Input system that translates player requests into world commands.
///
/// The world validates every command against funds and grid availability,
/// so the builder forwards requests without checking them.
#[derive(Clone, Debug, Default)]
pub struct Builder {
    tool: Tool,
    run_over: bool,
}

impl Builder {
    /// Creates a new builder with the basic emplacement selected.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Currently selected tool.
    #[must_use]
    pub const fn tool(&self) -> Tool {
        self.tool
    }

    /// Consumes world events and queued requests to emit builder commands.
    ///
    /// Tool selection keeps working after the run ends; world mutations stop.
    pub fn handle(&mut self, events: &[Event], requests: &[BuilderRequest], out: &mut Vec<Command>) {
        for event in events {
            if matches!(event, Event::GameOver | Event::GameWon) {
                self.run_over = true;
            }
        }

        for request in requests {
            let command = match *request {
                BuilderRequest::SelectTool(tool) => {
                    self.tool = tool;
                    continue;
                }
                BuilderRequest::Click { point } => match self.tool {
                    Tool::Build(kind) => Command::PlaceEmplacement { kind, point },
                    Tool::Upgrade => Command::UpgradeEmplacement { point },
                    Tool::Sell => Command::SellEmplacement { point },
                },
                BuilderRequest::Place { kind, point } => Command::PlaceEmplacement { kind, point },
                BuilderRequest::Upgrade { point } => Command::UpgradeEmplacement { point },
                BuilderRequest::Sell { point } => Command::SellEmplacement { point },
            };
            if !self.run_over {
                out.push(command);
            }
        }
    }
}
