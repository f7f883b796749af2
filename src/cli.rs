use clap::Parser;
use std::path::PathBuf;

/// Dynamic form server - renders an HTML form from a remote field-group schema
#[derive(Parser, Debug, Clone)]
#[command(name = "dynaform", version, about, long_about = None)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, env = "DYNAFORM_CONFIG", default_value = "dynaform.toml")]
    pub config: PathBuf,

    /// Server host address
    #[arg(long, env = "DYNAFORM_HOST")]
    pub host: Option<String>,

    /// Server port
    #[arg(long, env = "DYNAFORM_PORT")]
    pub port: Option<u16>,

    /// Template API URL the form schema is fetched from
    #[arg(long, env = "DYNAFORM_API_URL")]
    pub api_url: Option<String>,

    /// POST submissions as JSON to this URL instead of logging them
    #[arg(long, env = "DYNAFORM_SINK_URL")]
    pub sink_url: Option<String>,

    /// Fetch the schema once, print the rendered form to stdout and exit
    #[arg(long)]
    pub render_once: bool,
}
