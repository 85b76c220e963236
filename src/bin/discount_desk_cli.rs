use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand};
use serde::Serialize;
use tracing::debug;

use discount_desk_api::{
    config,
    models::RequestWithCustomer,
    repositories::{InMemoryStorage, Storage},
    services::{
        analytics::{AnalyticsService, DashboardStats, MarginImpactReport},
        assistant,
        filter::FilterCriteria,
    },
};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let context = CliContext::initialize(cli.seed);

    match cli.command {
        Commands::Stats => handle_stats(&context, cli.json).await?,
        Commands::List(args) => handle_list(&context, args, cli.json).await?,
        Commands::Analyze(args) => handle_analyze(&context, args, cli.json).await?,
        Commands::Ask(args) => handle_ask(&context, args, cli.json).await?,
    }

    Ok(())
}

#[derive(Parser)]
#[command(
    name = "discount-desk",
    about = "Inspect the seeded discount desk from the terminal",
    version
)]
struct Cli {
    #[arg(
        long,
        global = true,
        action = ArgAction::SetTrue,
        help = "Render command output as pretty JSON"
    )]
    json: bool,
    #[arg(long, global = true, help = "Seed for the generated sales history")]
    seed: Option<u64>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Request counts and pending value
    Stats,
    /// Requests matching the given filters
    List(ListArgs),
    /// Margin impact of the selected requests
    Analyze(AnalyzeArgs),
    /// Ask the pricing assistant a question
    Ask(AskArgs),
}

#[derive(Args)]
struct ListArgs {
    #[arg(long, help = "Product name, e.g. \"Wire Rod\"")]
    product: Option<String>,
    #[arg(long, help = "Region name, e.g. Oman")]
    region: Option<String>,
    #[arg(long, help = "Pipeline stage, e.g. Negotiation")]
    stage: Option<String>,
    #[arg(long, help = "Inclusive minimum order value")]
    min_value: Option<f64>,
    #[arg(long, help = "Inclusive maximum order value")]
    max_value: Option<f64>,
}

impl ListArgs {
    fn criteria(self) -> FilterCriteria {
        FilterCriteria {
            product_type: self.product,
            region: self.region,
            stage: self.stage,
            min_value: self.min_value,
            max_value: self.max_value,
        }
    }
}

#[derive(Args)]
struct AnalyzeArgs {
    #[arg(required = true, help = "Discount request ids to include")]
    ids: Vec<String>,
}

#[derive(Args)]
struct AskArgs {
    #[arg(help = "Question text")]
    question: String,
    #[arg(long, help = "Id of the request the question is about")]
    focus: Option<String>,
}

struct CliContext {
    analytics: AnalyticsService,
}

impl CliContext {
    fn initialize(seed: Option<u64>) -> Self {
        let config = config::AppConfig::default();
        config::init_tracing(config.log_level(), config.log_json);

        let seed = seed.unwrap_or(config.fixture_seed);
        debug!(seed, "seeding in-memory store");
        let storage: Arc<dyn Storage> = Arc::new(InMemoryStorage::seeded(seed));
        Self {
            analytics: AnalyticsService::new(storage),
        }
    }
}

async fn handle_stats(context: &CliContext, json: bool) -> Result<()> {
    let stats = context
        .analytics
        .dashboard_stats()
        .await
        .context("failed to compute dashboard stats")?;

    if json {
        print_json(&stats)?;
    } else {
        render_stats(&stats);
    }
    Ok(())
}

async fn handle_list(context: &CliContext, args: ListArgs, json: bool) -> Result<()> {
    let criteria = args.criteria();
    criteria.validate_bounds()?;
    let requests = context
        .analytics
        .requests_with_customers(&criteria)
        .await
        .context("failed to list discount requests")?;

    if json {
        print_json(&requests)?;
    } else if requests.is_empty() {
        println!("No discount requests match");
    } else {
        for request in &requests {
            render_request(request);
        }
    }
    Ok(())
}

async fn handle_analyze(context: &CliContext, args: AnalyzeArgs, json: bool) -> Result<()> {
    let report = context
        .analytics
        .margin_impact(&args.ids)
        .await
        .context("failed to analyze margin impact")?;

    if json {
        print_json(&report)?;
    } else {
        render_report(&report);
    }
    Ok(())
}

async fn handle_ask(context: &CliContext, args: AskArgs, json: bool) -> Result<()> {
    let in_view = context
        .analytics
        .requests_with_customers(&FilterCriteria::all())
        .await?;
    let focused = match args.focus.as_deref() {
        Some(id) => Some(
            context
                .analytics
                .request_with_customer(id)
                .await
                .with_context(|| format!("unknown focused request {}", id))?,
        ),
        None => None,
    };

    let reply = assistant::respond(&args.question, &in_view, focused.as_ref())?;
    if json {
        print_json(&reply)?;
    } else {
        println!("{}", reply.reply);
    }
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn render_stats(stats: &DashboardStats) {
    println!("Total requests:    {}", stats.total_requests);
    println!("Pending:           {}", stats.pending_requests);
    println!("Approved:          {}", stats.approved_requests);
    println!("Rejected:          {}", stats.rejected_requests);
    println!(
        "Pending value:     OMR {}",
        assistant::format_omr(stats.total_value)
    );
}

fn render_request(item: &RequestWithCustomer) {
    let request = &item.request;
    println!(
        "- {} • {} ({}) • {} {} • {}% on OMR {} • {} • {}",
        request.id,
        item.customer_name,
        item.customer_tier,
        request.product,
        request.grade,
        request.discount_percentage,
        assistant::format_omr(request.order_value),
        request.stage,
        request.status
    );
}

fn render_report(report: &MarginImpactReport) {
    let analysis = &report.analysis;
    println!(
        "Total order value: OMR {}",
        assistant::format_omr(analysis.total_order_value)
    );
    println!("Average discount:  {}%", analysis.avg_discount.round_dp(2));
    println!(
        "Current loss:      OMR {}",
        assistant::format_omr(analysis.current_loss)
    );
    println!(
        "Projected revenue: OMR {}",
        assistant::format_omr(analysis.projected_revenue)
    );

    let risk = &report.risk;
    println!(
        "Risk: competition {} ({}), retention {} ({}), volume {} ({})",
        risk.competition_level.round_dp(1),
        risk.competition_risk,
        risk.retention_level.round_dp(1),
        risk.retention_risk,
        risk.volume_impact.round_dp(1),
        risk.volume_risk
    );
}
