use glam::Vec2;
use lane_defence_core::{Command, EmplacementKind, Event};
use lane_defence_system_builder::{Builder, BuilderRequest, Tool};

const POINT: Vec2 = Vec2::new(100.0, 300.0);

#[test]
fn click_builds_basic_emplacement_by_default() {
    let mut builder = Builder::default();
    let mut commands = Vec::new();

    builder.handle(&[], &[BuilderRequest::Click { point: POINT }], &mut commands);

    assert_eq!(
        commands,
        vec![Command::PlaceEmplacement {
            kind: EmplacementKind::Basic,
            point: POINT,
        }],
        "default tool should build a basic emplacement",
    );
}

#[test]
fn selected_tool_applies_to_later_clicks() {
    let mut builder = Builder::new();
    let mut commands = Vec::new();

    builder.handle(
        &[],
        &[
            BuilderRequest::SelectTool(Tool::Build(EmplacementKind::Sniper)),
            BuilderRequest::Click { point: POINT },
            BuilderRequest::SelectTool(Tool::Upgrade),
            BuilderRequest::Click { point: POINT },
            BuilderRequest::SelectTool(Tool::Sell),
            BuilderRequest::Click { point: POINT },
        ],
        &mut commands,
    );

    assert_eq!(
        commands,
        vec![
            Command::PlaceEmplacement {
                kind: EmplacementKind::Sniper,
                point: POINT,
            },
            Command::UpgradeEmplacement { point: POINT },
            Command::SellEmplacement { point: POINT },
        ]
    );
    assert_eq!(builder.tool(), Tool::Sell);
}

#[test]
fn explicit_requests_ignore_selected_tool() {
    let mut builder = Builder::new();
    let mut commands = Vec::new();

    builder.handle(
        &[],
        &[
            BuilderRequest::SelectTool(Tool::Sell),
            BuilderRequest::Place {
                kind: EmplacementKind::Economy,
                point: POINT,
            },
            BuilderRequest::Upgrade { point: POINT },
        ],
        &mut commands,
    );

    assert_eq!(
        commands,
        vec![
            Command::PlaceEmplacement {
                kind: EmplacementKind::Economy,
                point: POINT,
            },
            Command::UpgradeEmplacement { point: POINT },
        ]
    );
}

#[test]
fn requests_are_dropped_after_the_run_ends() {
    let mut builder = Builder::new();
    let mut commands = Vec::new();

    builder.handle(
        &[Event::GameOver],
        &[
            BuilderRequest::SelectTool(Tool::Upgrade),
            BuilderRequest::Click { point: POINT },
        ],
        &mut commands,
    );

    assert!(commands.is_empty(), "finished runs accept no purchases");
    assert_eq!(builder.tool(), Tool::Upgrade);
}
