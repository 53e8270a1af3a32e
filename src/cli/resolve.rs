//! `resolve` command - prints the effective controls of one or more steps

use std::path::PathBuf;

use clap::Args;
use serde_json::Value;

use super::fixture::ControlsFixture;
use crate::config::AppConfig;
use crate::domain::{ResolvedControls, StepId};

#[derive(Args, Debug, Clone)]
pub struct ResolveArgs {
    /// Path to the controls fixture
    #[arg(short, long)]
    pub input: PathBuf,

    /// Steps to resolve, defaults to the fixture scope's step
    #[arg(long = "step", value_parser = parse_step_id)]
    pub steps: Vec<StepId>,

    /// Include the layer each value came from
    #[arg(long)]
    pub sources: bool,
}

fn parse_step_id(raw: &str) -> Result<StepId, String> {
    StepId::new(raw).map_err(|e| e.to_string())
}

pub async fn run(config: &AppConfig, args: ResolveArgs) -> anyhow::Result<()> {
    let fixture = ControlsFixture::load(&args.input)?;
    let state = crate::create_app_state(config);
    fixture.seed(&state).await?;

    let steps = if args.steps.is_empty() {
        vec![fixture.scope.step_id.clone()]
    } else {
        args.steps.clone()
    };

    let resolved = state
        .resolution
        .resolve_steps(&fixture.scope, &steps, fixture.overrides.as_ref())
        .await?;

    println!("{}", serde_json::to_string_pretty(&render(resolved, args.sources)?)?);
    Ok(())
}

/// One object keyed by step id
fn render(resolved: Vec<ResolvedControls>, sources: bool) -> anyhow::Result<Value> {
    let mut out = serde_json::Map::new();

    for step in resolved {
        let key = step.step_id.to_string();
        let value = if sources {
            serde_json::to_value(&step)?
        } else {
            Value::Object(step.controls)
        };
        out.insert(key, value);
    }

    Ok(Value::Object(out))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ControlSource;
    use serde_json::json;

    fn resolved() -> ResolvedControls {
        let mut resolved = ResolvedControls::empty(StepId::new("email").unwrap());
        resolved.controls.insert("subject".into(), json!("C"));
        resolved.sources.insert("subject".into(), ControlSource::Stateless);
        resolved
    }

    #[test]
    fn test_render_controls_only() {
        let out = render(vec![resolved()], false).unwrap();
        assert_eq!(out, json!({"email": {"subject": "C"}}));
    }

    #[test]
    fn test_render_with_sources() {
        let out = render(vec![resolved()], true).unwrap();
        assert_eq!(out["email"]["sources"]["subject"], json!({"type": "stateless"}));
        assert_eq!(out["email"]["step_id"], json!("email"));
    }

    #[test]
    fn test_parse_step_id() {
        assert!(parse_step_id("email").is_ok());
        assert!(parse_step_id("bad id").is_err());
    }
}
