use tracing_subscriber::EnvFilter;

mod command;
mod schema;
mod script;
mod util;

fn main() -> anyhow::Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::new("blockfall=info,blockfall_engine=info"),
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();

    command::run()
}
