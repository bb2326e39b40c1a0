//! `mietrecht-cli`: browse the form catalog, fill forms in the terminal and
//! manage saved documents.
//!
//! ```text
//! mietrecht-cli forms list --persona tenant
//! mietrecht-cli fill kuendigung-mieter
//! mietrecht-cli login && mietrecht-cli resume
//! mietrecht-cli calc deposit --base-rent 850
//! ```

use std::time::Duration;

use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use uuid::Uuid;

use mietrecht::cli::api_client::DEFAULT_API_URL;
use mietrecht::cli::commands::account::{
    CrossSellCommand, LoginCommand, LogoutCommand, SubscriptionCommand, WhoamiCommand,
};
use mietrecht::cli::commands::calc::{
    CheckCommand, DepositCommand, NoticeCommand, RentIncreaseCommand, UtilitiesCommand,
};
use mietrecht::cli::commands::documents::{DocumentAction, DocumentsCommand};
use mietrecht::cli::commands::fill::{FillCommand, ResumeCommand};
use mietrecht::cli::commands::forms::{
    AccessCommand, BundlesCommand, ListFormsCommand, ShowFormCommand,
};
use mietrecht::cli::commands::{CallableTrait, Context};
use mietrecht::cli::credentials::DEFAULT_AUTH_URL;
use mietrecht::forms::{DepositForm, RentIncreaseForm, UtilitiesForm};
use mietrecht::helpers::format;
use mietrecht::legal::PartyRole;
use mietrecht::telemetry::{get_cli_subscriber, init_subscriber};

#[derive(Parser, Debug)]
#[command(
    name = "mietrecht-cli",
    version,
    about = "Mietrecht forms from the terminal"
)]
struct Cli {
    /// Base URL of the forms service
    #[arg(long, global = true, env = "MIETRECHT_API_URL", default_value = DEFAULT_API_URL)]
    api_url: String,
    /// Base URL of the auth server
    #[arg(long, global = true, env = "MIETRECHT_AUTH_URL", default_value = DEFAULT_AUTH_URL)]
    auth_url: String,
    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Sign in and store the session locally
    Login {
        #[arg(long)]
        email: Option<String>,
    },
    Logout,
    Whoami,
    /// Browse the form catalog
    Forms {
        #[command(subcommand)]
        command: FormsCommands,
    },
    /// Check whether a form can be opened
    Access { slug: String },
    /// Fill a form step by step
    Fill {
        slug: String,
        #[arg(long)]
        title: Option<String>,
        /// Continue editing a saved document
        #[arg(long, value_name = "ID")]
        document: Option<Uuid>,
    },
    /// Save the document that was waiting for a login
    Resume {
        /// Drop the pending save, keep the local draft
        #[arg(long)]
        abandon: bool,
    },
    /// Saved documents
    Documents {
        #[command(subcommand)]
        command: DocumentsCommands,
    },
    /// Form bundles and their savings
    Bundles,
    /// Legal calculators
    Calc {
        #[command(subcommand)]
        command: CalcCommands,
    },
    /// Validate a German IBAN
    Iban { iban: String },
    /// Validate a German postal code
    Plz { plz: String },
    /// Show a recommendation for another app
    CrossSell {
        #[arg(long, default_value = "mietrecht")]
        app: String,
        /// Hide a recommendation for seven days
        #[arg(long, value_name = "TRIGGER_ID")]
        dismiss: Option<Uuid>,
    },
    /// Subscription status
    Subscription {
        /// Keep polling until interrupted
        #[arg(long)]
        watch: bool,
        #[arg(long, default_value_t = 60, value_name = "SECONDS")]
        interval: u64,
    },
}

#[derive(Debug, Subcommand)]
enum FormsCommands {
    List {
        #[arg(long)]
        category: Option<String>,
        /// landlord, tenant or both
        #[arg(long)]
        persona: Option<String>,
        /// free or paid
        #[arg(long)]
        tier: Option<String>,
        /// Only forms the signed-in user can open
        #[arg(long)]
        available: bool,
    },
    Show {
        slug: String,
    },
}

#[derive(Debug, Subcommand)]
enum DocumentsCommands {
    List,
    Show { id: Uuid },
    /// Render the final text and lock the document
    Complete { id: Uuid },
    Render { id: Uuid },
    Delete { id: Uuid },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Role {
    Tenant,
    Landlord,
}

impl From<Role> for PartyRole {
    fn from(role: Role) -> Self {
        match role {
            Role::Tenant => PartyRole::Tenant,
            Role::Landlord => PartyRole::Landlord,
        }
    }
}

fn parse_date(input: &str) -> Result<NaiveDate, String> {
    format::parse_date(input).ok_or_else(|| format!("invalid date: {input}"))
}

fn parse_amount(input: &str) -> Result<f64, String> {
    format::parse_amount(input).ok_or_else(|| format!("invalid amount: {input}"))
}

#[derive(Debug, Subcommand)]
enum CalcCommands {
    /// Statutory notice period
    Notice {
        #[arg(long, value_enum)]
        role: Role,
        /// Completed years of tenancy
        #[arg(long)]
        years: Option<u32>,
        /// Start of the tenancy
        #[arg(long, value_parser = parse_date)]
        since: Option<NaiveDate>,
        /// Date of the notice, today when omitted
        #[arg(long, value_parser = parse_date)]
        on: Option<NaiveDate>,
    },
    /// Maximum deposit
    Deposit {
        #[arg(long, value_parser = parse_amount)]
        base_rent: f64,
        /// Deposit to check against the cap
        #[arg(long, value_parser = parse_amount)]
        deposit: Option<f64>,
    },
    /// Check a rent increase against the cap
    RentIncrease {
        #[arg(long, value_parser = parse_amount)]
        current: f64,
        #[arg(long, value_parser = parse_amount)]
        requested: f64,
        #[arg(long)]
        tight_market: bool,
    },
    /// Monthly utility prepayment
    Utilities {
        #[arg(long, value_parser = parse_amount)]
        annual: f64,
    },
}

fn get_command(command: Commands) -> Box<dyn CallableTrait> {
    match command {
        Commands::Login { email } => Box::new(LoginCommand { email }),
        Commands::Logout => Box::new(LogoutCommand),
        Commands::Whoami => Box::new(WhoamiCommand),
        Commands::Forms { command } => match command {
            FormsCommands::List {
                category,
                persona,
                tier,
                available,
            } => Box::new(ListFormsCommand {
                category,
                persona,
                tier,
                available,
            }),
            FormsCommands::Show { slug } => Box::new(ShowFormCommand { slug }),
        },
        Commands::Access { slug } => Box::new(AccessCommand { slug }),
        Commands::Fill {
            slug,
            title,
            document,
        } => Box::new(FillCommand {
            slug,
            title,
            document,
        }),
        Commands::Resume { abandon } => Box::new(ResumeCommand { abandon }),
        Commands::Documents { command } => {
            let action = match command {
                DocumentsCommands::List => DocumentAction::List,
                DocumentsCommands::Show { id } => DocumentAction::Show(id),
                DocumentsCommands::Complete { id } => DocumentAction::Complete(id),
                DocumentsCommands::Render { id } => DocumentAction::Render(id),
                DocumentsCommands::Delete { id } => DocumentAction::Delete(id),
            };
            Box::new(DocumentsCommand { action })
        }
        Commands::Bundles => Box::new(BundlesCommand),
        Commands::Calc { command } => match command {
            CalcCommands::Notice {
                role,
                years,
                since,
                on,
            } => Box::new(NoticeCommand::new(role.into(), years, since, on)),
            CalcCommands::Deposit { base_rent, deposit } => Box::new(DepositCommand {
                form: DepositForm { base_rent, deposit },
            }),
            CalcCommands::RentIncrease {
                current,
                requested,
                tight_market,
            } => Box::new(RentIncreaseCommand {
                form: RentIncreaseForm {
                    current_rent: current,
                    requested_rent: requested,
                    tight_market,
                },
            }),
            CalcCommands::Utilities { annual } => Box::new(UtilitiesCommand {
                form: UtilitiesForm {
                    annual_amount: annual,
                },
            }),
        },
        Commands::Iban { iban } => Box::new(CheckCommand::Iban(iban)),
        Commands::Plz { plz } => Box::new(CheckCommand::Plz(plz)),
        Commands::CrossSell { app, dismiss } => Box::new(CrossSellCommand {
            source_app: app,
            dismiss,
        }),
        Commands::Subscription { watch, interval } => Box::new(SubscriptionCommand {
            watch,
            interval: Duration::from_secs(interval.max(1)),
        }),
    }
}

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    init_subscriber(get_cli_subscriber("warn".into()));

    let cli = Cli::parse();
    let ctx = Context {
        api_url: cli.api_url,
        auth_url: cli.auth_url,
        json: cli.json,
    };

    if let Err(err) = get_command(cli.command).call(&ctx).await {
        eprintln!("Error: {}", err);
        std::process::exit(1);
    }
}
