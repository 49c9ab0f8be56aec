// crates/bitpool-cli/src/commands/request.rs
//
// `bitpool request <open|vote|status>`: vote-gated withdrawal requests.
//
// A request lives in a JSON file between invocations. Each command reads it,
// applies one engine operation, and writes the result back.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use clap::{Args, Subcommand, ValueEnum};
use serde::Serialize;
use tabled::Tabled;

use bitpool_core::{Balance, BitPoolError, MemberId, Sats, VoteChoice, WithdrawalRequest};
use bitpool_policy::{request_activity, VoteProgress};

use super::{parse_amount, parse_roster, Context};
use crate::output::{btc_cell, format_json, format_table, progress_bar, usd_cell, OutputFormat};

/// Request subcommands.
#[derive(Debug, Subcommand)]
pub enum RequestCmd {
    /// Open a withdrawal request that needs a group vote.
    Open(OpenArgs),

    /// Cast or change a member's vote.
    Vote(VoteArgs),

    /// Resolve a request at the current time and show its progress.
    Status(StatusArgs),
}

#[derive(Debug, Args)]
pub struct OpenArgs {
    /// Member asking for the withdrawal.
    #[arg(long)]
    pub requester: String,

    /// Requested amount in BTC.
    #[arg(long)]
    pub amount: String,

    /// Reason shown to voters.
    #[arg(long)]
    pub reason: String,

    /// Available balance in BTC.
    #[arg(long)]
    pub available: String,

    /// Comma-separated member names.
    #[arg(long)]
    pub members: String,

    /// Where to write the request (default: `<id>.json`).
    #[arg(long)]
    pub out: Option<PathBuf>,

    /// BTC price in US cents for the fiat column.
    #[arg(long)]
    pub usd_price: Option<u64>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ChoiceArg {
    For,
    Against,
}

impl From<ChoiceArg> for VoteChoice {
    fn from(choice: ChoiceArg) -> Self {
        match choice {
            ChoiceArg::For => VoteChoice::For,
            ChoiceArg::Against => VoteChoice::Against,
        }
    }
}

#[derive(Debug, Args)]
pub struct VoteArgs {
    /// Request file written by `request open`.
    #[arg(long)]
    pub file: PathBuf,

    /// Voting member.
    #[arg(long)]
    pub member: String,

    /// Vote for or against the withdrawal.
    #[arg(long, value_enum)]
    pub choice: ChoiceArg,

    /// Comma-separated current member names.
    #[arg(long)]
    pub members: String,

    /// Evaluation time (RFC 3339). Defaults to now.
    #[arg(long)]
    pub now: Option<DateTime<Utc>>,

    /// BTC price in US cents for the fiat column.
    #[arg(long)]
    pub usd_price: Option<u64>,
}

#[derive(Debug, Args)]
pub struct StatusArgs {
    /// Request file written by `request open`.
    #[arg(long)]
    pub file: PathBuf,

    /// Evaluation time (RFC 3339). Defaults to now.
    #[arg(long)]
    pub now: Option<DateTime<Utc>>,

    /// BTC price in US cents for the fiat column.
    #[arg(long)]
    pub usd_price: Option<u64>,
}

#[derive(Tabled)]
struct ProgressRow {
    #[tabled(rename = "Request")]
    id: String,
    #[tabled(rename = "Requester")]
    requester: String,
    #[tabled(rename = "Amount")]
    amount: String,
    #[tabled(rename = "USD")]
    usd: String,
    #[tabled(rename = "Votes")]
    votes: String,
    #[tabled(rename = "Progress")]
    bar: String,
    #[tabled(rename = "Time left")]
    time_left: String,
    #[tabled(rename = "Status")]
    status: String,
}

#[derive(Serialize)]
struct StatusOutput<'a> {
    request: &'a WithdrawalRequest,
    progress: VoteProgress,
}

/// Run a request subcommand.
pub async fn run(ctx: &Context, cmd: &RequestCmd) -> Result<(), Box<dyn std::error::Error>> {
    match cmd {
        RequestCmd::Open(args) => open(ctx, args),
        RequestCmd::Vote(args) => vote(ctx, args),
        RequestCmd::Status(args) => status(ctx, args),
    }
}

fn open(ctx: &Context, args: &OpenArgs) -> Result<(), Box<dyn std::error::Error>> {
    let amount = parse_amount(&args.amount)?;
    let balance = Balance::with_amounts(parse_amount(&args.available)?, Sats::ZERO);
    let roster = parse_roster(&args.members);
    if roster.is_empty() {
        return Err(BitPoolError::EmptyMembership.into());
    }

    let now = Utc::now();
    let request = ctx.engine.open_request(
        MemberId::new(args.requester.as_str()),
        amount,
        args.reason.as_str(),
        &balance,
        &roster,
        now,
    )?;

    let path = args
        .out
        .clone()
        .unwrap_or_else(|| PathBuf::from(format!("{}.json", request.id)));
    save(&path, &request)?;

    if let Some(entry) = request_activity(&request) {
        tracing::debug!(
            "Activity {}: {} {} {} ({})",
            entry.id,
            entry.member,
            entry.kind.verb(),
            entry.signed_amount(),
            entry.status
        );
    }

    match ctx.format {
        OutputFormat::Json => println!("{}", format_json(&request)),
        OutputFormat::Table => {
            println!("Opened request {}", request.id);
            println!("  Requester: {}", request.requester);
            println!(
                "  Amount:    {} ({})",
                btc_cell(request.amount),
                usd_cell(request.amount, ctx.price(args.usd_price))
            );
            println!("  Reason:    {}", request.reason);
            println!("  Members:   {}", request.total_members);
            println!("  Saved to:  {}", path.display());
            print_progress(ctx, &request, now, ctx.price(args.usd_price));
        }
    }

    Ok(())
}

fn vote(ctx: &Context, args: &VoteArgs) -> Result<(), Box<dyn std::error::Error>> {
    let request = load(&args.file)?;
    let roster = parse_roster(&args.members);
    let now = args.now.unwrap_or_else(Utc::now);

    let updated = ctx.engine.vote_and_resolve(
        &request,
        &MemberId::new(args.member.as_str()),
        args.choice.into(),
        &roster,
        now,
    )?;
    save(&args.file, &updated)?;

    match ctx.format {
        OutputFormat::Json => println!("{}", format_json(&updated)),
        OutputFormat::Table => {
            println!("Recorded vote from {}", args.member);
            print_progress(ctx, &updated, now, ctx.price(args.usd_price));
        }
    }

    Ok(())
}

fn status(ctx: &Context, args: &StatusArgs) -> Result<(), Box<dyn std::error::Error>> {
    let request = load(&args.file)?;
    let now = args.now.unwrap_or_else(Utc::now);

    let resolved = ctx.engine.resolve(&request, now);
    if resolved != request {
        save(&args.file, &resolved)?;
    }

    match ctx.format {
        OutputFormat::Json => {
            let progress = ctx.engine.progress(&resolved, now);
            println!(
                "{}",
                format_json(&StatusOutput {
                    request: &resolved,
                    progress,
                })
            );
        }
        OutputFormat::Table => print_progress(ctx, &resolved, now, ctx.price(args.usd_price)),
    }

    Ok(())
}

fn print_progress(
    ctx: &Context,
    request: &WithdrawalRequest,
    now: DateTime<Utc>,
    price: Option<u64>,
) {
    let p = ctx.engine.progress(request, now);
    let row = ProgressRow {
        id: request.id.to_string(),
        requester: request.requester.to_string(),
        amount: btc_cell(request.amount),
        usd: usd_cell(request.amount, price),
        votes: format!("{}/{} (against {})", p.votes_for, p.required_votes, p.votes_against),
        bar: progress_bar(p.display_fraction(), 20),
        time_left: p.time_left_label(),
        status: p.status.to_string(),
    };
    println!("{}", format_table(&[row]));
}

fn load(path: &Path) -> Result<WithdrawalRequest, Box<dyn std::error::Error>> {
    let contents = fs::read_to_string(path)?;
    let request: WithdrawalRequest = serde_json::from_str(&contents)?;
    Ok(request)
}

fn save(path: &Path, request: &WithdrawalRequest) -> Result<(), Box<dyn std::error::Error>> {
    let contents = serde_json::to_string_pretty(request)?;
    fs::write(path, contents)?;
    tracing::debug!("Wrote request {} to {}", request.id, path.display());
    Ok(())
}
