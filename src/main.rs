use dotenvy::dotenv;
use spine_invoicing::{
    config::{self, database::DEFAULT_DATABASE_URL, session::SessionContext},
    core::{
        history::InvoiceStatus,
        invoice,
        report::{InvoiceHeader, render_invoice},
        session::InvoiceSession,
    },
    errors::{Error, Result},
};
use std::env;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file; env vars can also be set externally
    dotenv().ok();
    info!("Attempted to load .env file.");

    // 3. Settings and the signed-in user
    let settings = config::settings::load_default_settings()
        .inspect_err(|e| error!("Failed to load settings: {}", e))?;
    let context = SessionContext::from_env()
        .inspect_err(|e| error!("Failed to build session context: {}", e))?;
    if let Some(department) = context.department() {
        info!("Working in the {department} department");
    }

    // 4. Build the invoice session from the draft named on the command line
    let draft_path = env::args().nth(1).ok_or_else(|| Error::Config {
        message: "Usage: spine <invoice-draft.toml>".to_string(),
    })?;
    let draft = config::draft::load_draft(&draft_path)
        .inspect_err(|e| error!("Failed to load draft {}: {}", draft_path, e))?;
    let input = draft.into_input(&settings);
    let session = InvoiceSession::start(&input, settings.default_features)?;

    let header = InvoiceHeader::for_session(&session, &settings);
    println!("{}", render_invoice(&session, &header));

    // 5. Store the invoice as a draft
    if config::database::get_database_url() == DEFAULT_DATABASE_URL {
        std::fs::create_dir_all("data")?;
    }
    let db = config::database::create_connection()
        .await
        .inspect(|_| info!("Database connected successfully."))
        .inspect_err(|e| error!("Failed to connect to database: {}", e))?;
    config::database::create_tables(&db).await?;

    let saved = invoice::save_session(
        &db,
        &session,
        InvoiceStatus::Draft,
        header.due_date,
        context.user_email(),
    )
    .await?;
    info!("Stored invoice {} (id {})", saved.invoice_number, saved.id);

    Ok(())
}
