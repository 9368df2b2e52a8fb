use clap::Subcommand;
use mashaaer_core::{AccessGate, Config, Feature};

#[derive(Subcommand)]
pub enum AccessAction {
    /// Show the current subscription level
    Level,
    /// Change the subscription level (free, basic, premium)
    SetLevel {
        level: String,
    },
    /// Check a single feature (e.g. "emotionExport")
    Check {
        feature: String,
    },
    /// List every feature and whether the current level includes it
    List,
}

pub fn run(action: AccessAction) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = Config::load()?;
    let mut gate = AccessGate::new(config.subscription_level);

    match action {
        AccessAction::Level => {
            println!("{}", gate.level());
        }
        AccessAction::SetLevel { level } => {
            if !gate.set_level(&level) {
                return Err(format!("unknown subscription level: {level}").into());
            }
            config.subscription_level = gate.level();
            config.save()?;
            println!("{}", gate.level());
        }
        AccessAction::Check { feature } => {
            println!("{}", gate.allows_named(&feature));
        }
        AccessAction::List => {
            let table: serde_json::Map<String, serde_json::Value> = Feature::ALL
                .iter()
                .map(|f| (f.name().to_string(), gate.allows(*f).into()))
                .collect();
            println!("{}", serde_json::to_string_pretty(&table)?);
        }
    }
    Ok(())
}
