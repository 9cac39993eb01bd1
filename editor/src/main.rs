use clap::Parser;

use hexmap::config::{Args, EditorConfig};

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let settings = EditorConfig::from(Args::parse());
    log::debug!("{:?}", settings);
    hexmap::run(settings)
}
