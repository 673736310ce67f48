use crate::render;
use application::browse_service::{BillQuery, BrowseService};
use application::chat_service::{ChatService, SendOutcome};
use application::vote_service::VoteService;
use clap::{Parser, Subcommand};
use colored::Colorize;
use domain::error::{ApiError, VoteError};
use domain::session::ChatScope;
use domain::store::KeyValueStore;
use domain::vote::VoteChoice;
use infrastructure::api_client::ApiClient;
use infrastructure::chat_stream::ChatStreamClient;
use infrastructure::chatbot_client::HttpChatTransport;
use infrastructure::config::Config;
use infrastructure::memory_store::MemoryStore;
use infrastructure::sqlite_store::SqliteStore;
use infrastructure::vote_storage::VoteGuard;
use shared::confirmation::{ask_confirmation, ask_line};
use shared::telemetry::Telemetry;
use shared::types::Result;
use std::io::Write;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::warn;

#[derive(Parser)]
#[command(name = "naitssu")]
#[command(about = "Browse bills, vote once per bill, and ask the assembly chatbot")]
pub struct Cli {
    /// Backend base URL (overrides NAITSSU_API_BASE_URL)
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Local vote store (overrides NAITSSU_STORE_PATH)
    #[arg(long, global = true)]
    pub store: Option<PathBuf>,

    /// Debug logging on stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// List bills, nine per page
    Bills {
        #[arg(long, default_value_t = 1)]
        page: u32,
        /// Order by number of votes
        #[arg(long, conflicts_with = "search")]
        by_votes: bool,
        /// Search bill titles
        #[arg(long)]
        search: Option<String>,
        /// Only show bills with this tag
        #[arg(long)]
        tag: Option<String>,
    },
    /// Most voted bills
    Top {
        #[arg(long, default_value_t = 3)]
        n: u32,
    },
    /// Show one bill with its summary and vote state
    Bill { id: i64 },
    /// Vote on a bill (agree | disagree)
    Vote {
        id: i64,
        choice: VoteChoice,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Show locally recorded votes
    Status { id: Option<i64> },
    /// Drop the local vote record of a bill
    Forget { id: i64 },
    /// List meeting summaries
    Meetings {
        #[arg(long)]
        cursor: Option<i64>,
        #[arg(long)]
        size: Option<u32>,
    },
    /// Ask the chatbot about a bill or a meeting
    Chat {
        #[arg(long, conflicts_with = "meeting")]
        bill: Option<i64>,
        #[arg(long)]
        meeting: Option<i64>,
    },
}

pub struct CliApp {
    config: Config,
}

impl CliApp {
    pub fn new(cli: &Cli) -> Self {
        let mut config = Config::load();
        if let Some(url) = &cli.api_url {
            config = config.with_api_base_url(url);
        }
        if let Some(path) = &cli.store {
            config = config.with_store_path(path);
        }
        Self { config }
    }

    pub async fn run(&mut self, cli: Cli) -> Result<()> {
        match cli.command {
            Command::Bills {
                page,
                by_votes,
                search,
                tag,
            } => {
                let query = match search {
                    Some(keyword) => BillQuery::Search(keyword),
                    None if by_votes => BillQuery::ByVotes,
                    None => BillQuery::Latest,
                };
                self.handle_bills(&query, page, tag.as_deref()).await
            }
            Command::Top { n } => self.handle_top(n).await,
            Command::Bill { id } => self.handle_bill(id).await,
            Command::Vote { id, choice, yes } => self.handle_vote(id, choice, yes).await,
            Command::Status { id } => self.handle_status(id),
            Command::Forget { id } => self.handle_forget(id),
            Command::Meetings { cursor, size } => self.handle_meetings(cursor, size).await,
            Command::Chat { bill, meeting } => self.handle_chat(bill, meeting).await,
        }
    }

    fn browse(&self) -> Result<BrowseService> {
        Ok(BrowseService::new(ApiClient::new(&self.config)?))
    }

    /// Falls back to an in-memory store so a broken database never blocks
    /// browsing; votes then only lock for this run.
    fn vote_guard(&self) -> VoteGuard {
        let store: Arc<dyn KeyValueStore> = match SqliteStore::new(&self.config.store_path) {
            Ok(store) => Arc::new(store),
            Err(err) => {
                warn!(path = %self.config.store_path.display(), error = %err, "vote store unavailable, using memory");
                Arc::new(MemoryStore::new())
            }
        };
        VoteGuard::new(store)
    }

    fn votes(&self) -> Result<VoteService> {
        Ok(VoteService::new(
            Arc::new(ApiClient::new(&self.config)?),
            self.vote_guard(),
        ))
    }

    async fn handle_bills(&self, query: &BillQuery, page: u32, tag: Option<&str>) -> Result<()> {
        let browse = self.browse()?;
        let guard = self.vote_guard();
        let result = browse.bills(query, page.saturating_sub(1)).await?;
        for bill in result.with_tag(tag) {
            println!("{}", render::bill_row(bill, guard.get_vote_status(bill.id)));
        }
        println!("{}", render::page_footer(&result).dimmed());
        Ok(())
    }

    async fn handle_top(&self, n: u32) -> Result<()> {
        let browse = self.browse()?;
        let guard = self.vote_guard();
        for (rank, bill) in browse.top_bills(n).await?.iter().enumerate() {
            println!(
                "{}. {}",
                rank + 1,
                render::bill_row(bill, guard.get_vote_status(bill.id))
            );
            println!("      {}", render::tally_line(bill.counts(), true));
        }
        Ok(())
    }

    async fn handle_bill(&self, id: i64) -> Result<()> {
        let bill = match self.browse()?.bill(id).await {
            Ok(bill) => bill,
            Err(ApiError::NotFound { .. }) => {
                println!("{}", "법률안을 찾을 수 없습니다".red());
                return Ok(());
            }
            Err(err) => return Err(err.into()),
        };
        let votes = self.votes()?;
        let view = votes.view(&bill);
        println!("{}", render::bill_detail(&bill));
        println!();
        println!("{}", render::tally_line(view.tally.displayed(), view.locked));
        if view.locked {
            println!("{} {}", "투표 완료".green(), render::local_marker(view.local));
        } else {
            println!("{}", format!("naitssu vote {id} agree|disagree").dimmed());
        }
        Ok(())
    }

    async fn handle_vote(&self, id: i64, choice: VoteChoice, yes: bool) -> Result<()> {
        let bill = self.browse()?.bill(id).await?;
        let votes = self.votes()?;
        if !votes.can_vote(&bill) {
            println!("{}", "이미 투표한 법률안입니다.".yellow());
            return Ok(());
        }
        let prompt = format!(
            "\"{}\"에 {}하시겠습니까?",
            bill.bill_name,
            render::choice_label(choice)
        );
        if !yes && !ask_confirmation(&prompt, false)? {
            println!("{}", "투표를 취소했습니다.".yellow());
            return Ok(());
        }

        let mut tally = votes.view(&bill).tally;
        println!("{}", "투표 중...".dimmed());
        match votes.cast_vote(&bill, choice, &mut tally).await {
            Ok(fresh) => {
                println!("{}", "투표가 완료되었습니다.".green());
                if fresh.is_none() {
                    println!("{}", "최신 결과를 불러오지 못해 예상 집계를 표시합니다.".dimmed());
                }
                println!("{}", render::tally_line(tally.displayed(), true));
                Ok(())
            }
            Err(VoteError::AlreadyVoted(_)) => {
                println!("{}", "이미 투표한 법률안입니다.".yellow());
                Ok(())
            }
            Err(err) => {
                println!("{}", "투표에 실패했습니다. 다시 시도해주세요.".red());
                Err(err.into())
            }
        }
    }

    fn handle_status(&self, id: Option<i64>) -> Result<()> {
        let guard = self.vote_guard();
        match id {
            Some(id) => {
                let status = guard.get_vote_status(id);
                if status.voted {
                    println!("{id}: {}", render::local_marker(status));
                } else {
                    println!("{id}: 투표 기록 없음");
                }
            }
            None => {
                let all = guard.all();
                if all.is_empty() {
                    println!("투표 기록 없음");
                }
                for (bill_id, record) in all {
                    println!("{bill_id}: {}", render::choice_label(record.choice));
                }
            }
        }
        Ok(())
    }

    fn handle_forget(&self, id: i64) -> Result<()> {
        if self.vote_guard().clear(id)? {
            println!("{id}: 로컬 투표 기록을 삭제했습니다.");
        } else {
            println!("{id}: 투표 기록 없음");
        }
        Ok(())
    }

    async fn handle_meetings(&self, cursor: Option<i64>, size: Option<u32>) -> Result<()> {
        let page = self.browse()?.meetings(cursor, size).await?;
        for meeting in &page.meetings {
            println!("{}", render::meeting_row(meeting));
        }
        println!("{}", render::meetings_footer(&page).dimmed());
        Ok(())
    }

    async fn handle_chat(&self, bill: Option<i64>, meeting: Option<i64>) -> Result<()> {
        let scope = match (bill, meeting) {
            (Some(id), _) => {
                let name = match self.browse()?.bill(id).await {
                    Ok(bill) => bill.bill_name,
                    Err(err) => {
                        warn!(bill_id = id, error = %err, "bill lookup failed, chatting without title");
                        format!("#{id}")
                    }
                };
                ChatScope::Bill { id, name }
            }
            (None, Some(id)) => ChatScope::Meeting { id },
            (None, None) => ChatScope::General,
        };

        let transport = Arc::new(HttpChatTransport::new(&self.config)?);
        let mut chat = ChatService::new(ChatStreamClient::new(transport), scope);
        if let Some(greeting) = chat.transcript().last() {
            println!("{}", greeting.text.cyan());
        }
        println!("{}", "Type 'exit' to quit. Ctrl-C stops a reply.".dimmed());

        let interrupt = ReplyInterrupt::default();
        let watcher = interrupt.spawn_watcher();

        loop {
            let input = ask_line("질문")?;
            let trimmed = input.trim();
            if trimmed.is_empty() {
                continue;
            }
            if trimmed.eq_ignore_ascii_case("exit") || trimmed.eq_ignore_ascii_case("quit") {
                break;
            }

            let cancel = interrupt.arm();
            let timer = Telemetry::new();
            let outcome = chat
                .send(trimmed, cancel, |chunk| {
                    print!("{chunk}");
                    let _ = std::io::stdout().flush();
                })
                .await;
            interrupt.disarm();
            println!();

            match outcome {
                SendOutcome::Completed { .. } => {
                    println!("{}", format!("({:.1}s)", timer.elapsed().as_secs_f32()).dimmed());
                }
                SendOutcome::Failed { .. } => {
                    if let Some(last) = chat.transcript().last() {
                        println!("{}", last.text.red());
                    }
                }
                SendOutcome::Ignored => {}
            }
        }
        watcher.abort();
        Ok(())
    }
}

/// Routes Ctrl-C during a chat session.
///
/// Once a SIGINT handler is installed the default action is gone for the
/// rest of the process, so a single watcher lives for the whole session: it
/// cancels the reply in flight, and exits like the default action would when
/// no reply is streaming.
#[derive(Clone, Default)]
struct ReplyInterrupt {
    active: Arc<Mutex<Option<CancellationToken>>>,
}

impl ReplyInterrupt {
    fn arm(&self) -> CancellationToken {
        let token = CancellationToken::new();
        if let Ok(mut active) = self.active.lock() {
            *active = Some(token.clone());
        }
        token
    }

    fn disarm(&self) {
        if let Ok(mut active) = self.active.lock() {
            *active = None;
        }
    }

    /// Cancels the armed reply. Returns false when nothing was streaming.
    fn interrupt(&self) -> bool {
        let armed = self.active.lock().ok().and_then(|mut active| active.take());
        match armed {
            Some(token) => {
                token.cancel();
                true
            }
            None => false,
        }
    }

    fn spawn_watcher(&self) -> JoinHandle<()> {
        let interrupt = self.clone();
        tokio::spawn(async move {
            while tokio::signal::ctrl_c().await.is_ok() {
                if !interrupt.interrupt() {
                    std::process::exit(130);
                }
            }
        })
    }
}
