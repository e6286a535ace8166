use crate::config::toml_config::LayoutConfig;
use crate::domain::model::ContainerFilters;
use crate::utils::error::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "drawer-layout")]
#[command(about = "Resolve loading unit compartment layouts from the warehouse store")]
pub struct CliConfig {
    #[arg(long, help = "Path to a TOML configuration file")]
    pub config: Option<PathBuf>,

    #[arg(long, help = "Override store.base_url")]
    pub base_url: Option<String>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// List loading units
    Containers {
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        limit: Option<u32>,
        #[arg(long)]
        offset: Option<u32>,
    },
    /// Resolve the compartment layout of one loading unit
    Compartments {
        id: i64,
        #[arg(long, help = "Add fill band color and label to each compartment")]
        with_fill: bool,
    },
}

impl CliConfig {
    /// 讀取設定檔（若有）並套用命令列覆寫
    pub fn load_layout_config(&self) -> Result<LayoutConfig> {
        let mut config = match &self.config {
            Some(path) => LayoutConfig::from_file(path)?,
            None => LayoutConfig::default(),
        };

        if let Some(base_url) = &self.base_url {
            config.store.base_url = base_url.clone();
        }

        Ok(config)
    }
}

impl Command {
    pub fn filters(&self) -> Option<ContainerFilters> {
        match self {
            Command::Containers {
                search,
                limit,
                offset,
            } => Some(ContainerFilters {
                limit: *limit,
                offset: *offset,
                search: search.clone(),
            }),
            Command::Compartments { .. } => None,
        }
    }
}
