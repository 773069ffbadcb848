mod helpers;
mod services;

use std::path::Path;

use anyhow::{Result, bail};
use tracing_subscriber::{EnvFilter, fmt};

use services::import::import_csv;

const USAGE: &str = "usage: csv-mongo-import <file.csv> <database> <user> <password>";

#[tokio::main]
async fn main() -> Result<()> {
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder().with_env_filter(env).init();

    let mut args = std::env::args().skip(1);
    let (Some(filepath), Some(dbname), Some(user), Some(password)) =
        (args.next(), args.next(), args.next(), args.next())
    else {
        bail!("{USAGE}");
    };
    if args.next().is_some() {
        bail!("{USAGE}");
    }

    import_csv(Path::new(&filepath), &dbname, &user, &password).await?;
    Ok(())
}
