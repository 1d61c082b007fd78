//! Interactive forward/backward paging driven by text commands.

use async_trait::async_trait;
use std::str::FromStr;
use thiserror::Error;
use tracing::debug;

use super::{Page, PageSource, Pager};
use crate::error::StoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorCommand {
    Next,
    Previous,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unrecognized command: {0:?}")]
pub struct UnknownCommand(pub String);

impl FromStr for CursorCommand {
    type Err = UnknownCommand;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "n" | "next" => Ok(CursorCommand::Next),
            "p" | "prev" | "previous" => Ok(CursorCommand::Previous),
            "q" | "quit" => Ok(CursorCommand::Quit),
            _ => Err(UnknownCommand(s.to_string())),
        }
    }
}

/// What applying a command did to the cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorStep {
    Moved,
    AtLastPage,
    AtFirstPage,
    Quit,
}

/// Current page number plus whether the last fetch signalled more data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CursorState {
    current_page: i64,
    has_more: bool,
}

impl Default for CursorState {
    fn default() -> Self {
        Self::new()
    }
}

impl CursorState {
    pub fn new() -> Self {
        Self::at(1, false)
    }

    pub fn at(current_page: i64, has_more: bool) -> Self {
        Self {
            current_page: current_page.max(1),
            has_more,
        }
    }

    pub fn current_page(&self) -> i64 {
        self.current_page
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    pub fn observe<T>(&mut self, page: &Page<T>) {
        self.current_page = page.number;
        self.has_more = page.has_more;
    }

    /// Next only advances when more data was signalled; Previous is floored
    /// at page 1.
    pub fn apply(&mut self, command: CursorCommand) -> CursorStep {
        match command {
            CursorCommand::Next if self.has_more => {
                self.current_page += 1;
                CursorStep::Moved
            }
            CursorCommand::Next => CursorStep::AtLastPage,
            CursorCommand::Previous if self.current_page > 1 => {
                self.current_page -= 1;
                CursorStep::Moved
            }
            CursorCommand::Previous => CursorStep::AtFirstPage,
            CursorCommand::Quit => CursorStep::Quit,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CursorNotice {
    /// The first page came back empty; there is nothing to browse.
    Empty,
    InvalidCommand(String),
    NoMorePages,
    AlreadyFirstPage,
    /// Moving back found no rows where a page used to be; the cursor returned
    /// to page 1.
    Restarted,
}

/// Terminal side of the cursor loop.
#[async_trait]
pub trait PagerIo<T: Sync>: Send {
    async fn show_page(&mut self, page: &Page<T>) -> std::io::Result<()>;

    /// Next raw command line, or `None` once input is exhausted.
    async fn read_command(&mut self) -> std::io::Result<Option<String>>;

    async fn notify(&mut self, notice: CursorNotice) -> std::io::Result<()>;
}

#[derive(Debug, Error)]
pub enum CursorError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Browse pages until the user quits or input ends. Returns the page the
/// cursor was on when the loop stopped.
pub async fn run_cursor<S, I>(pager: &mut Pager<'_, S>, io: &mut I) -> Result<i64, CursorError>
where
    S: PageSource,
    S::Item: Clone + Sync,
    I: PagerIo<S::Item> + ?Sized,
{
    let mut state = CursorState::new();
    let mut page = pager.fetch(state.current_page()).await?;
    if page.items.is_empty() {
        io.notify(CursorNotice::Empty).await?;
        return Ok(state.current_page());
    }
    state.observe(&page);

    loop {
        io.show_page(&page).await?;

        let command = loop {
            match io.read_command().await? {
                None => break CursorCommand::Quit,
                Some(raw) => match raw.parse::<CursorCommand>() {
                    Ok(command) => break command,
                    Err(_) => io.notify(CursorNotice::InvalidCommand(raw)).await?,
                },
            }
        };

        match state.apply(command) {
            CursorStep::Quit => break,
            CursorStep::Moved => {
                let next = pager.fetch(state.current_page()).await?;
                if !next.items.is_empty() {
                    page = next;
                    state.observe(&page);
                } else if command == CursorCommand::Next {
                    // Previous page was exactly full and nothing follows it.
                    page.has_more = false;
                    state = CursorState::at(page.number, false);
                    io.notify(CursorNotice::NoMorePages).await?;
                } else {
                    // Rows ahead of the cursor were removed since this page
                    // was shown; start over from the first page.
                    let first = pager.fetch(1).await?;
                    if first.items.is_empty() {
                        io.notify(CursorNotice::Empty).await?;
                        state = CursorState::new();
                        break;
                    }
                    page = first;
                    state.observe(&page);
                    io.notify(CursorNotice::Restarted).await?;
                }
            }
            CursorStep::AtLastPage => io.notify(CursorNotice::NoMorePages).await?,
            CursorStep::AtFirstPage => io.notify(CursorNotice::AlreadyFirstPage).await?,
        }
        debug!(page = state.current_page(), has_more = state.has_more(), "Cursor step");
    }

    Ok(state.current_page())
}
