use anyhow::Context;
use async_trait::async_trait;
use company_store::config::Config;
use company_store::db::{init_db, CompanyStore, RetentionPurge};
use company_store::domain::{Actor, AuditStamper, Clock, Company, FixedActor, SystemClock};
use company_store::paging::{run_cursor, CursorNotice, Page, Pager, PagerIo};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines, Stdin, Stdout};

/// Browses companies page by page on stdin/stdout.
struct StdioPager {
    lines: Lines<BufReader<Stdin>>,
    out: Stdout,
}

impl StdioPager {
    fn new() -> Self {
        Self {
            lines: BufReader::new(tokio::io::stdin()).lines(),
            out: tokio::io::stdout(),
        }
    }

    async fn write(&mut self, text: &str) -> std::io::Result<()> {
        self.out.write_all(text.as_bytes()).await?;
        self.out.flush().await
    }
}

#[async_trait]
impl PagerIo<Company> for StdioPager {
    async fn show_page(&mut self, page: &Page<Company>) -> std::io::Result<()> {
        let mut text = format!("Page {}:\n\n", page.number);
        for company in &page.items {
            text.push_str(&format!(
                "Id: {}, Name: {}, Created: {}, Modified: {}\nAddress: {}, {}, {}, {}\n\n",
                company.id,
                company.name,
                company.audit.created,
                company.audit.modified,
                company.street,
                company.city,
                company.state,
                company.postal_code,
            ));
        }
        text.push_str("Enter 'n' for next page, 'p' for previous page, or 'q' to quit:\n");
        self.write(&text).await
    }

    async fn read_command(&mut self) -> std::io::Result<Option<String>> {
        self.lines.next_line().await
    }

    async fn notify(&mut self, notice: CursorNotice) -> std::io::Result<()> {
        let message = match notice {
            CursorNotice::Empty => "No companies to page through.".to_string(),
            CursorNotice::InvalidCommand(raw) => {
                format!("Invalid input {:?}, please try again", raw)
            }
            CursorNotice::NoMorePages => "Already on the last page.".to_string(),
            CursorNotice::AlreadyFirstPage => "Already on the first page.".to_string(),
            CursorNotice::Restarted => {
                "That page no longer exists; back at the first page.".to_string()
            }
        };
        self.write(&format!("{}\n", message)).await
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so they do not interleave with the page listing.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing_subscriber::filter::LevelFilter::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = Config::from_env().context("Configuration error")?;

    let pool = init_db(&config.database_path, config.max_connections)
        .await
        .with_context(|| format!("Failed to initialize database at {}", config.database_path))?;

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let stamper = AuditStamper::new(
        clock.clone(),
        Arc::new(FixedActor::new(Actor::new(config.audit_actor.clone()))),
    );
    let purge = Arc::new(RetentionPurge::new(config.purge_retention_days, clock));
    let companies = CompanyStore::new(pool, stamper, purge);

    let mut pager = Pager::new(&companies, config.paging_strategy, config.page_size)?;
    let mut io = StdioPager::new();
    let last_page = run_cursor(&mut pager, &mut io).await?;

    tracing::info!(last_page, strategy = ?config.paging_strategy, "Paging complete");
    Ok(())
}
