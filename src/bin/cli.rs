//! crmdash CLI
//!
//! Command-line front end for the CRM dashboard:
//! - Log in and out
//! - Browse and search records
//! - Export records with saved field preferences
//! - Walk the route table the way the dashboard does

use anyhow::{bail, Context};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crmdash::client::{ApiClient, EntityKind, FieldDescriptor, ListParams, Record};
use crmdash::config::Config;
use crmdash::export::{self, ExportFormat};
use crmdash::navigation::{self, Navigation, View};
use crmdash::session::{self, FileTokenStore, Session, TokenStore};

#[derive(Parser)]
#[command(name = "crmdash")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Browse, search and export CRM records")]
#[command(long_about = "crmdash talks to a CRM backend on your behalf.\nLog in once, then list, search and export contacts, companies, deals and products.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (default: platform config dir, then ./crmdash.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Backend URL, overrides the config file
    #[arg(long, global = true)]
    pub backend_url: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table, global = true)]
    pub format: OutputFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
    Csv,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Store a session token
    Login {
        /// Token issued by the backend
        #[arg(long, conflicts_with = "callback")]
        token: Option<String>,
        /// Full /login-success callback URL carrying ?token=
        #[arg(long)]
        callback: Option<String>,
    },

    /// Forget the stored session token
    Logout,

    /// Show session and backend status
    Status,

    /// Open a dashboard location, applying the route guard
    Open {
        /// Location such as /contacts or /login-success?token=...
        location: String,
    },

    /// List records of an entity type
    List {
        /// Entity type (contacts, companies, deals, products, ...)
        entity: EntityKind,
        /// Page size
        #[arg(short, long)]
        limit: Option<u32>,
        /// Cursor returned by a previous page
        #[arg(short, long)]
        next_page: Option<String>,
        /// Search term (contacts, companies, deals and products only)
        #[arg(short, long, default_value = "")]
        search: String,
        /// Follow cursors for up to this many pages
        #[arg(short, long, default_value = "1")]
        pages: usize,
    },

    /// Show the displayable fields of an entity type
    Fields {
        /// Entity type
        entity: EntityKind,
    },

    /// Export every record of an entity type to a file
    Export {
        /// Entity type
        entity: EntityKind,
        /// File format (default: from config)
        #[arg(long = "as", value_name = "FORMAT")]
        export_format: Option<ExportFormat>,
        /// Output file (default: <output_dir>/<entity>_export_<timestamp>.<ext>)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Ignore saved preferences and export every field
        #[arg(long)]
        all_fields: bool,
    },

    /// Read or save field preferences
    Prefs {
        #[command(subcommand)]
        action: PrefsAction,
    },

    /// Search across every entity type
    Search {
        /// Free-text query
        query: String,
    },

    /// Show dashboard statistics
    Stats,

    /// List the dashboard routes and their guards
    Routes,

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
pub enum PrefsAction {
    /// Show the saved selection for a category
    Get { category: String },
    /// Save the selected field keys for a category
    Set {
        category: String,
        /// Field keys, comma-separated or repeated
        #[arg(required = true)]
        fields: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load_with_env(path)?,
        None => Config::load_default(),
    };
    if let Some(url) = &cli.backend_url {
        config.backend.url = url.clone();
    }

    if let Err(e) = crmdash::logging::init(&config.logging) {
        eprintln!("Warning: logging disabled: {}", e);
    }

    let store = FileTokenStore::new(config.session.storage_path());
    let api = ApiClient::new(&config.backend)?;

    match cli.command {
        Commands::Login { token, callback } => {
            let session = match (token, callback) {
                (Some(token), _) => {
                    let callback = format!(
                        "{}?token={}",
                        navigation::LOGIN_CALLBACK_PATH,
                        url::form_urlencoded::byte_serialize(token.as_bytes()).collect::<String>()
                    );
                    session::complete_login(&store, &callback)?
                }
                (None, Some(callback)) => session::complete_login(&store, &callback)?,
                (None, None) => bail!("Pass --token <token> or --callback <url>"),
            };
            println!("Logged in ({:?})", session);
            println!("Token stored in {}", store.path().display());
        }

        Commands::Logout => {
            session::logout(&store)?;
            println!("Logged out");
        }

        Commands::Status => {
            println!("crmdash v{}", env!("CARGO_PKG_VERSION"));
            println!();
            println!("Backend: {}", api.base_url());
            println!("Token store: {}", store.path().display());

            match Session::from_store(&store)? {
                None => {
                    println!("Session: not logged in");
                }
                Some(session) => {
                    println!("Session: {:?}", session);
                    match api.get_stats(&session).await {
                        Ok(_) => println!("Backend status: reachable"),
                        Err(e) => {
                            println!("Backend status: {}", e);
                            if e.status().is_some() {
                                println!();
                                println!("The stored token may have expired. Log in again with:");
                                println!("  crmdash login --token <token>");
                            }
                        }
                    }
                }
            }
        }

        Commands::Open { location } => {
            let nav = navigation::navigate_with_store(&store, &location)?;

            let route = match nav {
                Navigation::NotFound => bail!("No route matches {}", location),
                Navigation::Redirected { from, route } => {
                    println!("{} requires a different session state, redirected to {}", from.path, route.path);
                    route
                }
                Navigation::Arrived { route } => route,
            };

            match route.view {
                View::Dashboard => {
                    let session = require_session(&store)?;
                    let stats = api.get_stats(&session).await?;
                    println!("{}", serde_json::to_string_pretty(&stats)?);
                }
                View::Records(kind) => {
                    let session = require_session(&store)?;
                    let params = ListParams::default().limit(config.backend.default_page_size);
                    let (page, fields) = api.entity(kind).list_with_fields(&session, &params).await?;
                    print_records(&page.results, &fields, cli.format)?;
                    let next = page.next_page.as_ref().filter(|c| !c.is_empty());
                    print_page_footer(page.results.len(), page.total, next);
                }
                View::ComingSoon(kind) => {
                    println!("{} are coming soon.", route.name);
                    println!("Use `crmdash export {}` to download them in the meantime.", kind);
                }
                View::Login => {
                    println!("Log in through the backend, then run:");
                    println!("  crmdash login --callback '<redirect url>'");
                }
                View::LoginCallback => {
                    session::complete_login(&store, &location)?;
                    println!("Logged in, opening {}", navigation::HOME_PATH);
                }
            }
        }

        Commands::List {
            entity,
            limit,
            next_page,
            search,
            pages,
        } => {
            let session = require_session(&store)?;
            let client = api.entity(entity);

            let mut params = ListParams::default()
                .limit(limit.unwrap_or(config.backend.default_page_size))
                .search(search);
            if let Some(cursor) = next_page {
                params = params.next_page(cursor);
            }

            let (first, fields) = client.list_with_fields(&session, &params).await?;
            let total = first.total;
            let mut cursor = first.next_page.filter(|c| !c.is_empty());
            let mut records = first.results;

            for _ in 1..pages.max(1) {
                let Some(next) = cursor.take() else { break };
                let page = client.list(&session, &params.clone().next_page(next)).await?;
                records.extend(page.results);
                cursor = page.next_page.filter(|c| !c.is_empty());
            }

            print_records(&records, &fields, cli.format)?;
            print_page_footer(records.len(), total, cursor.as_ref());
        }

        Commands::Fields { entity } => {
            let session = require_session(&store)?;
            let fields = api.entity(entity).fetch_fields(&session).await?;

            match cli.format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&fields)?),
                OutputFormat::Csv => {
                    println!("fieldKey,fieldLabel");
                    for field in &fields {
                        println!("{},{}", field.field_key, field.field_label);
                    }
                }
                OutputFormat::Table => {
                    println!("{:<30} {}", "Key", "Label");
                    println!("{}", "-".repeat(60));
                    for field in &fields {
                        println!("{:<30} {}", field.field_key, field.field_label);
                    }
                }
            }
        }

        Commands::Export {
            entity,
            export_format,
            output,
            all_fields,
        } => {
            let session = require_session(&store)?;
            let client = api.entity(entity);
            let format = export_format.unwrap_or(config.export.format);

            let (data, fields) =
                futures_util::future::try_join(client.export_all(&session), client.fetch_fields(&session))
                    .await?;

            let selected = if all_fields {
                None
            } else {
                api.fetch_preferences(&store, entity.as_str())
                    .await?
                    .map(|p| p.selected_fields)
            };

            let columns = export::resolve_columns(&fields, selected.as_deref(), &data.results);
            let path = output
                .unwrap_or_else(|| export::default_path(&config.export.output_dir, entity, format));

            let bytes = export::write_file(&path, &data.results, &columns, format)
                .with_context(|| format!("Failed to write {}", path.display()))?;

            println!(
                "Exported {} {} ({} columns, {} bytes) to {}",
                data.results.len(),
                entity,
                columns.len(),
                bytes,
                path.display()
            );
        }

        Commands::Prefs { action } => match action {
            PrefsAction::Get { category } => match api.fetch_preferences(&store, &category).await? {
                Some(pref) => match cli.format {
                    OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&pref)?),
                    _ => {
                        println!("{}:", pref.category);
                        for field in &pref.selected_fields {
                            println!("  {}", field);
                        }
                    }
                },
                None => println!("No preferences saved for {}", category),
            },
            PrefsAction::Set { category, fields } => {
                let fields: Vec<String> = fields
                    .iter()
                    .flat_map(|f| f.split(','))
                    .map(str::trim)
                    .filter(|f| !f.is_empty())
                    .map(str::to_string)
                    .collect();

                api.save_preferences(&store, &category, &fields).await?;
                println!("Saved {} fields for {}", fields.len(), category);
            }
        },

        Commands::Search { query } => {
            let session = require_session(&store)?;
            let results = api.dynamic_search(&session, &query).await?;

            if results.results.is_empty() && cli.format == OutputFormat::Table {
                println!("No matches for \"{}\"", query);
            } else {
                let mut columns = vec![FieldDescriptor::new("objectType", "Type")];
                columns.extend(results.all_fields.iter().cloned());
                print_records(&results.results, &columns, cli.format)?;
                if cli.format == OutputFormat::Table {
                    println!();
                    println!("{} matches", results.total);
                }
            }
        }

        Commands::Stats => {
            let session = require_session(&store)?;
            let stats = api.get_stats(&session).await?;
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }

        Commands::Routes => {
            let routes = navigation::routes();

            match cli.format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(routes)?),
                _ => {
                    println!("{:<18} {:<16} {:<14} {}", "Path", "Name", "Access", "View");
                    println!("{}", "-".repeat(70));
                    for route in routes {
                        let access = if route.meta.requires_auth {
                            "login"
                        } else if route.meta.no_auth {
                            "guest only"
                        } else {
                            "open"
                        };
                        println!("{:<18} {:<16} {:<14} {:?}", route.path, route.name, access, route.view);
                    }
                }
            }
        }

        Commands::Config { output } => {
            let content = crmdash::config::generate_default_config();

            match output {
                Some(path) => {
                    // Create parent directory if needed
                    if let Some(parent) = path.parent() {
                        std::fs::create_dir_all(parent)?;
                    }
                    std::fs::write(&path, &content)?;
                    println!("Config written to {:?}", path);
                }
                None => {
                    print!("{}", content);
                }
            }
        }
    }

    Ok(())
}

fn require_session(store: &dyn TokenStore) -> anyhow::Result<Session> {
    Session::from_store(store)?
        .context("Not logged in. Run `crmdash login --token <token>` first")
}

fn print_records(
    records: &[Record],
    fields: &[FieldDescriptor],
    format: OutputFormat,
) -> anyhow::Result<()> {
    let columns = export::resolve_columns(fields, None, records);

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(records)?),
        OutputFormat::Csv => print!("{}", export::render(records, &columns, ExportFormat::Csv)?),
        OutputFormat::Table => print_table(records, &columns),
    }

    Ok(())
}

fn print_table(records: &[Record], columns: &[FieldDescriptor]) {
    if records.is_empty() {
        println!("No records");
        return;
    }

    // Keep wide schemas readable
    let columns = &columns[..columns.len().min(6)];

    for column in columns {
        print!("{:<22}", truncate(&column.field_label, 20));
    }
    println!();
    println!("{}", "-".repeat(22 * columns.len()));

    for record in records {
        for column in columns {
            let value = match record.get(&column.field_key) {
                None | Some(serde_json::Value::Null) => "-".to_string(),
                Some(serde_json::Value::String(s)) => s.clone(),
                Some(other) => other.to_string(),
            };
            print!("{:<22}", truncate(&value, 20));
        }
        println!();
    }
}

fn print_page_footer(shown: usize, total: u64, next: Option<&crmdash::Cursor>) {
    eprintln!();
    eprintln!("Showing {} of {}", shown, total);
    if let Some(cursor) = next {
        eprintln!("More available: --next-page {}", cursor);
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max.saturating_sub(1)).collect();
        format!("{}…", cut)
    }
}
