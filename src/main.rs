use journal::config::Config;
use journal::{build_app, cli, db};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let config = Config::from_env()?;
    let pool = db::init_pool(&config.database_url).await?;

    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.first().map(String::as_str) {
        Some("create-user") => return cli::create_user(&pool, &args[1..]).await,
        Some(other) => return Err(format!("unknown command: {other}").into()),
        None => {}
    }

    let app = build_app(pool, config.secure_cookies).await?;

    let listener = TcpListener::bind(config.bind_addr).await?;
    tracing::info!("listening on {}", config.bind_addr);
    axum::serve(listener, app).await?;

    Ok(())
}
