use expense_approvals::{build_state, config::Config, create_router};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env before the logger so RUST_LOG can live there
    dotenvy::dotenv().ok();
    env_logger::init();

    let config = Config::from_env()?;
    let addr = config.listen_addr()?;

    let state = build_state(config)?;
    let app = create_router(state);

    log::info!("Expense approvals listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
