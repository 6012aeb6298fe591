use std::{fs, path::Path};

use anyhow::{bail, Context, Result};
use glam::Vec2;
use lane_defence_core::{EmplacementKind, Scenario};
use lane_defence_system_builder::BuilderRequest;

/// Loads a scenario from a TOML file, or the built-in defaults when no file is given.
///
/// Fields missing from the file keep their default values.
pub(crate) fn load(path: Option<&Path>) -> Result<Scenario> {
    let Some(path) = path else {
        return Ok(Scenario::default());
    };
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read scenario file {}", path.display()))?;
    parse(&contents).with_context(|| format!("invalid scenario file {}", path.display()))
}

/// Parses scenario TOML contents and checks every startup precondition.
pub(crate) fn parse(contents: &str) -> Result<Scenario> {
    let scenario: Scenario =
        toml::from_str(contents).context("failed to parse scenario toml contents")?;
    scenario
        .validate()
        .context("scenario failed validation")?;
    Ok(scenario)
}

/// Parses a scripted request of the form `ACTION@X,Y`.
///
/// `ACTION` is an emplacement label (`basic`, `sniper`, `economy`) or one of
/// `upgrade` and `sell`.
pub(crate) fn parse_request(value: &str) -> Result<BuilderRequest> {
    let Some((action, coordinates)) = value.split_once('@') else {
        bail!("request {value:?} must look like ACTION@X,Y");
    };
    let Some((x, y)) = coordinates.split_once(',') else {
        bail!("coordinates {coordinates:?} must look like X,Y");
    };
    let x: f32 = x
        .trim()
        .parse()
        .with_context(|| format!("invalid x coordinate {x:?}"))?;
    let y: f32 = y
        .trim()
        .parse()
        .with_context(|| format!("invalid y coordinate {y:?}"))?;
    let point = Vec2::new(x, y);

    let action = action.trim();
    if action.eq_ignore_ascii_case("upgrade") {
        return Ok(BuilderRequest::Upgrade { point });
    }
    if action.eq_ignore_ascii_case("sell") {
        return Ok(BuilderRequest::Sell { point });
    }
    match EmplacementKind::from_label(action) {
        Some(kind) => Ok(BuilderRequest::Place { kind, point }),
        None => bail!("unknown action {action:?}; expected basic, sniper, economy, upgrade or sell"),
    }
}
