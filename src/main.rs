use clap::Parser;
use drawer_layout::config::cli::Command;
use drawer_layout::core::fill_state::{classify, clamp_percentage};
use drawer_layout::domain::model::CompartmentLayout;
use drawer_layout::utils::error::{ErrorSeverity, LayoutError};
use drawer_layout::utils::{logger, validation::Validate};
use drawer_layout::{CliConfig, LayoutService};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = CliConfig::parse();

    if cli.json_logs {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("Starting drawer-layout CLI");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    let config = match cli.load_layout_config().and_then(|config| {
        config.validate()?;
        Ok(config)
    }) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("❌ Configuration validation failed: {}", e);
            tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(1);
        }
    };

    let service = LayoutService::with_options(config.http_store(), config.service_options());

    match run(&service, &cli.command).await {
        Ok(output) => {
            println!("{}", output);
        }
        Err(e) => {
            tracing::error!(
                "❌ Request failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());

            let exit_code = match e.severity() {
                ErrorSeverity::Low => 0,
                ErrorSeverity::Medium => 2,
                ErrorSeverity::High => 1,
                ErrorSeverity::Critical => 3,
            };

            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }

    Ok(())
}

async fn run(
    service: &LayoutService<drawer_layout::HttpStore>,
    command: &Command,
) -> Result<String, LayoutError> {
    match command {
        Command::Containers { .. } => {
            let filters = command.filters().unwrap_or_default();
            let listing = service.containers(&filters).await?;
            Ok(serde_json::to_string_pretty(&listing.page)?)
        }
        Command::Compartments { id, with_fill } => {
            let layout = service.compartments(*id).await?;
            if *with_fill {
                Ok(serde_json::to_string_pretty(&with_fill_states(&layout)?)?)
            } else {
                Ok(serde_json::to_string_pretty(&layout)?)
            }
        }
    }
}

/// 每個格位附上色階與標籤，給沒有自己分級邏輯的前端使用
fn with_fill_states(layout: &CompartmentLayout) -> Result<serde_json::Value, LayoutError> {
    let mut value = serde_json::to_value(layout)?;
    if let Some(compartments) = value
        .get_mut("compartments")
        .and_then(|c| c.as_array_mut())
    {
        for (json, compartment) in compartments.iter_mut().zip(&layout.compartments) {
            let state = classify(clamp_percentage(compartment.fill_percentage));
            if let Some(obj) = json.as_object_mut() {
                obj.insert("fillBand".to_string(), state.band.name().into());
                obj.insert("fillColor".to_string(), state.color().into());
                obj.insert("fillLabel".to_string(), state.label().into());
            }
        }
    }
    Ok(value)
}
