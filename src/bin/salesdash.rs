use std::time::Duration;

use clap::{Parser, Subcommand};

use salesdash::metrics::{self, DerivedMetrics};
use salesdash::{
    daily_series, projection_series, Config, ProjectionReport, SalesDash, SalesReport, SellerKey,
    DEFAULT_COMPANY, DEFAULT_SELLER_CODE,
};

#[derive(Parser)]
#[command(name = "salesdash", about = "Seller sales dashboard CLI")]
struct Cli {
    /// Company identifier
    #[arg(long, default_value = DEFAULT_COMPANY)]
    company: String,

    /// Seller code
    #[arg(long, default_value = DEFAULT_SELLER_CODE)]
    seller_code: String,

    /// Sales service URL (default: $SALESDASH_SALES_URL)
    #[arg(long)]
    sales_url: Option<String>,

    /// Projection service URL (default: $SALESDASH_PROJECTION_URL)
    #[arg(long)]
    projection_url: Option<String>,

    /// Request timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Increase logging verbosity
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Seller header and KPI summary
    Summary {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Daily sales vs goal series
    Daily {
        #[arg(long)]
        json: bool,
    },
    /// Real vs projected sales, with the low-projection advisory
    Projection {
        #[arg(long)]
        json: bool,
    },
    /// Both raw reports, fetched concurrently
    Report {
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let config = build_config(&cli)?;
    let key = SellerKey::new(&cli.company, &cli.seller_code)?;
    let dash = SalesDash::new(config)?;

    match cli.command {
        Commands::Summary { json } => {
            let report = dash.sales_report(&key).await?;
            let derived = DerivedMetrics::from_report(&report);
            if json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&serde_json::json!({
                        "seller": &report.seller,
                        "metrics": &derived,
                        "pending_quotes": &report.pending_quotes,
                    }))?
                );
            } else {
                print_summary(&report, &derived);
            }
        }
        Commands::Daily { json } => {
            let report = dash.sales_report(&key).await?;
            let series = daily_series(&report.current);
            if json {
                println!("{}", serde_json::to_string_pretty(&series)?);
            } else {
                print_daily(&report, &series);
            }
        }
        Commands::Projection { json } => {
            let report = dash.sales_report(&key).await?;
            let projection = dash.projection_report(&key).await?;
            let series = projection_series(&report.current, &projection)?;
            if json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&serde_json::json!({
                        "projection": &projection,
                        "series": &series,
                        "alert": metrics::low_projection_alert(projection.performance_pct),
                    }))?
                );
            } else {
                print_projection(&projection, &series);
            }
        }
        Commands::Report { json } => {
            let dashboard = dash.dashboard(&key).await;
            if json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&serde_json::json!({
                        "sales": dashboard.sales.as_ref().ok(),
                        "sales_error": dashboard.sales.as_ref().err().map(|e| e.to_string()),
                        "projection": dashboard.projection.as_ref().ok(),
                        "projection_error":
                            dashboard.projection.as_ref().err().map(|e| e.to_string()),
                    }))?
                );
            } else {
                match &dashboard.sales {
                    Ok(report) => {
                        print_summary(report, &DerivedMetrics::from_report(report));
                        println!();
                    }
                    Err(e) => println!("Sales report unavailable: {e}"),
                }
                match (&dashboard.sales, &dashboard.projection) {
                    (Ok(report), Ok(projection)) => {
                        match projection_series(&report.current, projection) {
                            Ok(series) => print_projection(projection, &series),
                            Err(e) => println!("Projection series unavailable: {e}"),
                        }
                    }
                    (_, Err(e)) => println!("Projection unavailable: {e}"),
                    (Err(_), Ok(projection)) => {
                        println!(
                            "Projected performance: {:.1}% (total {:.2})",
                            projection.performance_pct, projection.total_projected
                        );
                    }
                }
            }
        }
    }

    Ok(())
}

fn build_config(cli: &Cli) -> anyhow::Result<Config> {
    let sales_url = cli
        .sales_url
        .clone()
        .or_else(|| std::env::var("SALESDASH_SALES_URL").ok())
        .ok_or_else(|| {
            anyhow::anyhow!("sales endpoint not set: pass --sales-url or set SALESDASH_SALES_URL")
        })?;
    let projection_url = cli
        .projection_url
        .clone()
        .or_else(|| std::env::var("SALESDASH_PROJECTION_URL").ok())
        .ok_or_else(|| {
            anyhow::anyhow!(
                "projection endpoint not set: pass --projection-url or set SALESDASH_PROJECTION_URL"
            )
        })?;

    let mut config = Config::new(sales_url, projection_url);
    if let Some(secs) = cli.timeout {
        config = config.with_timeout(Duration::from_secs(secs));
    }
    Ok(config)
}

fn print_summary(report: &SalesReport, derived: &DerivedMetrics) {
    let seller = &report.seller;
    let current = &report.current;
    println!("{} - {}", seller.company_short, seller.seller_name);
    println!("{}", seller.company_long);
    println!(
        "{} {} (day {} of {})",
        seller.month_name, seller.year, current.current_day, current.days_in_month
    );
    println!();
    println!("  Accumulated sales:  {:.2}", current.accumulated_sales);
    println!("  Monthly goal:       {:.2}", current.goal);
    println!("  Performance:        {:.1}% of goal", derived.performance_pct);
    match derived.growth_pct {
        Some(pct) => println!("  Growth vs prev:     {pct:+.1}%"),
        None => println!("  Growth vs prev:     n/a (no prior month baseline)"),
    }
    println!("  Daily pace:         {:.2}", derived.daily_pace);
    match derived.avg_daily_sales {
        Some(avg) => println!("  Avg per sales day:  {avg:.2}"),
        None => println!("  Avg per sales day:  n/a (no sales recorded yet)"),
    }
    match derived.best_day {
        Some(best) => println!("  Best day:           day {} ({:.2})", best.day, best.amount),
        None => println!("  Best day:           not yet available"),
    }
    println!(
        "  Goal tiers:         weekday {:.2}, Saturday {:.2}",
        derived.weekly_goals.weekday_goal, derived.weekly_goals.saturday_goal
    );
    println!(
        "  Days remaining:     {} ({:.0}% of month elapsed)",
        derived.days_remaining, derived.month_elapsed_pct
    );
    println!(
        "  Pending quotes:     {} totalling {:.2} ({})",
        report.pending_quotes.count,
        report.pending_quotes.total_amount,
        report.pending_quotes.period
    );
    println!(
        "  Previous month:     {:.2} of {:.2} ({:.1}%)",
        report.previous.sales, report.previous.goal, report.previous.performance_pct
    );
}

fn print_daily(report: &SalesReport, series: &[salesdash::ChartDayRecord]) {
    println!(
        "Daily sales vs goal - {} {}",
        report.seller.month_name, report.seller.year
    );
    println!("{:>4} {:>12} {:>12} {:>6} {:>8}", "day", "sales", "goal", "met", "compl");
    for record in series {
        println!(
            "{:>4} {:>12.2} {:>12.2} {:>6} {:>7.1}%",
            record.day,
            record.sales,
            record.goal,
            if record.met_goal { "yes" } else { "no" },
            record.compliance_pct
        );
    }
}

fn print_projection(projection: &ProjectionReport, series: &[salesdash::ProjectionDayRecord]) {
    println!(
        "Projection ({}): total {:.2}, performance {:.1}%",
        projection.projection_date, projection.total_projected, projection.performance_pct
    );
    if metrics::low_projection_alert(projection.performance_pct) {
        println!(
            "  WARNING: projected performance {:.1}% is below the {:.0}% target",
            projection.performance_pct,
            metrics::LOW_PROJECTION_THRESHOLD_PCT
        );
    }
    println!("{:>4} {:>12} {:>12} {:>12}", "day", "actual", "projected", "goal");
    for record in series {
        let fmt = |v: Option<f64>| match v {
            Some(v) => format!("{v:.2}"),
            None => "-".to_string(),
        };
        println!(
            "{:>4} {:>12} {:>12} {:>12.2}",
            record.day,
            fmt(record.actual),
            fmt(record.projected),
            record.goal
        );
    }
}
