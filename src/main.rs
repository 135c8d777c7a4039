use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use finsheet_tools::pipeline::{self, CleanPlan};
use finsheet_tools::reconcile::AuditNotesPolicy;
use finsheet_tools::{Result, ToolError};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();
    if let Err(error) = init_tracing().and_then(|()| run(cli)) {
        eprintln!("error: {error}");
        std::process::exit(1);
    }
}

fn init_tracing() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| ToolError::Logging(error.to_string()))
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Clean(args) => execute_clean(args),
    }
}

fn execute_clean(args: CleanArgs) -> Result<()> {
    if !args.input.exists() {
        return Err(ToolError::MissingInput(args.input));
    }

    let plan = args.resolve_plan()?;
    let summary = pipeline::clean_workbook(&args.input, &args.output, &plan)?;
    info!(
        rows = summary.rows,
        columns = summary.columns,
        audited = summary.audited_cells,
        migrated = summary.migrated_cells,
        "workbook cleaned"
    );
    Ok(())
}

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Normalize spreadsheet tables and reconcile financial columns."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Clean a worksheet and write the result with an audit sheet.
    Clean(CleanArgs),
}

#[derive(clap::Args)]
struct CleanArgs {
    /// Input workbook path.
    #[arg(long)]
    input: PathBuf,

    /// Output workbook path.
    #[arg(long)]
    output: PathBuf,

    /// Worksheet to read. Defaults to the first sheet.
    #[arg(long)]
    sheet: Option<String>,

    /// JSON cleanup plan. Command line flags extend or override it.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Column holding financial values to reconcile. Repeatable.
    #[arg(long = "financial-column")]
    financial_columns: Vec<String>,

    /// Rate used to convert CAD-tagged values into USD.
    #[arg(long)]
    rate: Option<f64>,

    /// Column holding dates to normalise. Repeatable.
    #[arg(long = "date-column")]
    date_columns: Vec<String>,

    /// Column holding dash-separated text. Repeatable.
    #[arg(long = "dash-column")]
    dash_columns: Vec<String>,

    /// Column holding phone numbers. Repeatable.
    #[arg(long = "phone-column")]
    phone_columns: Vec<String>,

    /// Also write the audit trail as JSON to this path.
    #[arg(long)]
    audit_json: Option<PathBuf>,

    /// How the audit trail reports notes for cells that added none.
    #[arg(long, value_enum)]
    audit_notes: Option<AuditNotesKind>,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum AuditNotesKind {
    PerCell,
    CarryOver,
}

impl From<AuditNotesKind> for AuditNotesPolicy {
    fn from(kind: AuditNotesKind) -> Self {
        match kind {
            AuditNotesKind::PerCell => AuditNotesPolicy::PerCell,
            AuditNotesKind::CarryOver => AuditNotesPolicy::CarryOver,
        }
    }
}

impl CleanArgs {
    fn resolve_plan(&self) -> Result<CleanPlan> {
        let mut plan = match &self.config {
            Some(path) => CleanPlan::from_json_file(path)?,
            None => CleanPlan::default(),
        };

        if self.sheet.is_some() {
            plan.sheet = self.sheet.clone();
        }
        if let Some(rate) = self.rate {
            plan.reconcile.cad_to_usd_rate = rate;
        }
        if let Some(kind) = self.audit_notes {
            plan.reconcile.audit_notes = kind.into();
        }
        if self.audit_json.is_some() {
            plan.audit_json = self.audit_json.clone();
        }
        extend_unique(&mut plan.financial_columns, &self.financial_columns);
        extend_unique(&mut plan.date_columns, &self.date_columns);
        extend_unique(&mut plan.dash_columns, &self.dash_columns);
        extend_unique(&mut plan.phone_columns, &self.phone_columns);

        Ok(plan)
    }
}

fn extend_unique(target: &mut Vec<String>, extra: &[String]) {
    for column in extra {
        if !target.contains(column) {
            target.push(column.clone());
        }
    }
}
