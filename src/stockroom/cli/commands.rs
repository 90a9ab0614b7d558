use super::print::{
    banner_message, form_messages, print_catalog, print_messages, print_product, CmdMessage,
};
use super::setup::{Cli, Commands, FieldArgs};
use clap::Parser;
use console::Style;
use directories::ProjectDirs;
use std::env;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use stockroom::api::StockroomApi;
use stockroom::catalog::{CatalogView, DeleteOutcome, CONNECT_FAILED};
use stockroom::client::http::HttpClient;
use stockroom::client::ProductQuery;
use stockroom::config::{StockroomConfig, CONFIG_KEYS};
use stockroom::editor::edit_form;
use stockroom::error::{ApiError, Result, StockroomError};
use stockroom::form::{
    FormField, FormState, RecordEditor, SubmitOutcome, FETCH_ERROR, PRODUCT_NOT_FOUND,
};
use stockroom::model::{Product, ProductId};
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// How a command ended, once its output has been printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Done,
    Failed,
}

struct AppContext {
    api: StockroomApi<HttpClient>,
}

pub fn run() -> Result<Outcome> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config_dir = config_dir()?;

    // Config must stay reachable even when the configured URL is unusable.
    if let Some(Commands::Config { key, value }) = &cli.command {
        return handle_config(&config_dir, key.clone(), value.clone());
    }

    let ctx = init_context(&cli, &config_dir)?;

    match cli.command {
        Some(Commands::List {
            search,
            category,
            low_stock,
            remote_search,
        }) => {
            let query = match (remote_search, category, low_stock) {
                (Some(term), _, _) => ProductQuery::Search(term),
                (None, Some(category), _) => ProductQuery::Category(category),
                (None, None, Some(threshold)) => ProductQuery::LowStock(threshold),
                (None, None, None) => ProductQuery::All,
            };
            handle_list(&ctx, &query, search)
        }
        Some(Commands::Search { term }) => handle_list(&ctx, &ProductQuery::All, Some(term)),
        Some(Commands::Show { id }) => handle_show(&ctx, &id),
        Some(Commands::Add { fields, no_editor }) => handle_add(&ctx, fields, no_editor),
        Some(Commands::Edit {
            id,
            fields,
            no_editor,
        }) => handle_edit(&ctx, &id, fields, no_editor),
        Some(Commands::Delete { id, yes }) => handle_delete(&ctx, &id, yes),
        Some(Commands::Config { .. }) => Ok(Outcome::Done),
        None => handle_list(&ctx, &ProductQuery::All, None),
    }
}

/// `RUST_LOG` wins; otherwise warnings only, or everything from stockroom with `--verbose`.
fn init_logging(verbose: bool) {
    let default_directive = if verbose { "stockroom=debug,warn" } else { "warn" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

fn config_dir() -> Result<PathBuf> {
    if let Some(home) = env::var_os("STOCKROOM_HOME") {
        return Ok(PathBuf::from(home));
    }
    ProjectDirs::from("com", "stockroom", "stockroom")
        .map(|dirs| dirs.config_dir().to_path_buf())
        .ok_or_else(|| StockroomError::Config("Could not determine config dir".to_string()))
}

fn init_context(cli: &Cli, config_dir: &Path) -> Result<AppContext> {
    let config = StockroomConfig::load(config_dir)?;
    let api_url = cli
        .api_url
        .clone()
        .or_else(|| {
            env::var("STOCKROOM_API_URL")
                .ok()
                .filter(|url| !url.trim().is_empty())
        })
        .unwrap_or(config.api_url);
    debug!(%api_url, "using product API");

    Ok(AppContext {
        api: StockroomApi::new(HttpClient::new(&api_url)?),
    })
}

fn parse_id(raw: &str) -> Result<ProductId> {
    let id = raw.trim();
    if id.is_empty() {
        return Err(StockroomError::Usage("Product id is required".to_string()));
    }
    Ok(ProductId::new(id))
}

fn outcome_of(failed: bool) -> Outcome {
    if failed {
        Outcome::Failed
    } else {
        Outcome::Done
    }
}

fn handle_list(ctx: &AppContext, query: &ProductQuery, search: Option<String>) -> Result<Outcome> {
    let mut catalog = ctx.api.open_catalog(query);
    if let Some(term) = search {
        catalog.set_search_term(term);
    }
    print_catalog(&catalog);
    Ok(outcome_of(catalog.error().is_some()))
}

fn handle_show(ctx: &AppContext, id: &str) -> Result<Outcome> {
    let id = parse_id(id)?;
    match ctx.api.product(&id) {
        Ok(product) => {
            print_product(&product);
            Ok(Outcome::Done)
        }
        Err(StockroomError::Remote(err)) => {
            print_messages(&[CmdMessage::error(lookup_failure_message(&err))]);
            Ok(Outcome::Failed)
        }
        Err(e) => Err(e),
    }
}

fn lookup_failure_message(err: &ApiError) -> String {
    if let Some(message) = err.message() {
        return message.to_string();
    }
    match err {
        ApiError::Transport(_) => CONNECT_FAILED.to_string(),
        err if err.is_not_found() => PRODUCT_NOT_FOUND.to_string(),
        _ => FETCH_ERROR.to_string(),
    }
}

fn apply_fields(editor: &mut RecordEditor, fields: &FieldArgs) {
    for (field, value) in fields.assignments() {
        editor.set_field(field, value);
    }
}

fn handle_add(ctx: &AppContext, fields: FieldArgs, no_editor: bool) -> Result<Outcome> {
    let mut editor = ctx.api.new_product_form();
    apply_fields(&mut editor, &fields);
    submit_form(ctx, &mut editor, !no_editor && fields.is_empty())
}

fn handle_edit(
    ctx: &AppContext,
    id: &str,
    fields: FieldArgs,
    no_editor: bool,
) -> Result<Outcome> {
    let id = parse_id(id)?;
    let mut editor = ctx.api.edit_product_form(&id);
    if let Some(banner) = editor.error() {
        print_messages(&[banner_message(banner)]);
        return Ok(Outcome::Failed);
    }
    apply_fields(&mut editor, &fields);
    submit_form(ctx, &mut editor, !no_editor && fields.is_empty())
}

/// Submits the form, round-tripping through `$EDITOR` when asked to. An invalid form is
/// reopened with its errors until it validates or the user saves it unchanged.
fn submit_form(ctx: &AppContext, editor: &mut RecordEditor, use_editor: bool) -> Result<Outcome> {
    loop {
        if use_editor {
            let current = editor.form().clone();
            let edited = edit_form(&current, editor.errors())?;

            if !editor.is_editing() && edited == FormState::default() {
                print_messages(&[CmdMessage::warning("Nothing to save.")]);
                return Ok(Outcome::Done);
            }
            if !editor.errors().is_empty() && edited == current {
                break;
            }
            for field in FormField::ALL {
                if edited.get(field) != current.get(field) {
                    editor.set_field(field, edited.get(field));
                }
            }
        }

        match ctx.api.submit(editor) {
            SubmitOutcome::Saved(saved) => {
                print_messages(&[saved_message(editor, saved.as_ref())]);
                return Ok(Outcome::Done);
            }
            SubmitOutcome::Invalid if use_editor => continue,
            SubmitOutcome::Invalid | SubmitOutcome::Rejected => break,
        }
    }

    print_messages(&form_messages(editor));
    Ok(Outcome::Failed)
}

fn saved_message(editor: &RecordEditor, saved: Option<&Product>) -> CmdMessage {
    let name = saved
        .map(|p| p.name.clone())
        .unwrap_or_else(|| editor.form().name.trim().to_string());
    let verb = if editor.is_editing() { "updated" } else { "added" };
    match saved {
        Some(product) => CmdMessage::success(format!("Product {}: {} (#{})", verb, name, product.id)),
        None => CmdMessage::success(format!("Product {}: {}", verb, name)),
    }
}

fn handle_delete(ctx: &AppContext, id: &str, yes: bool) -> Result<Outcome> {
    let id = parse_id(id)?;

    let label = match ctx.api.product(&id) {
        Ok(product) => format!("'{}'", product.name),
        Err(StockroomError::Remote(err)) if err.is_not_found() => {
            print_messages(&[CmdMessage::error(lookup_failure_message(&err))]);
            return Ok(Outcome::Failed);
        }
        Err(err) => {
            debug!(%id, error = %err, "could not look up product before delete");
            format!("product #{}", id)
        }
    };

    let mut catalog = CatalogView::new();
    let confirmation = catalog.request_delete(id);

    if !yes && !confirm(&format!("Are you sure you want to delete {}?", label))? {
        catalog.cancel_delete();
        print_messages(&[CmdMessage::info("Operation cancelled.")]);
        return Ok(Outcome::Done);
    }

    match ctx.api.delete(&mut catalog, confirmation) {
        DeleteOutcome::Deleted(_) => {
            print_messages(&[CmdMessage::success(format!("Deleted {}", label))]);
            Ok(Outcome::Done)
        }
        DeleteOutcome::Failed | DeleteOutcome::Unconfirmed => {
            if let Some(banner) = catalog.error() {
                print_messages(&[banner_message(banner)]);
            }
            Ok(Outcome::Failed)
        }
    }
}

/// Reads a yes/no answer from stdin. Only `y` or `yes` (any case) count as yes.
fn confirm(prompt: &str) -> Result<bool> {
    print!("{} [y/N] ", Style::new().yellow().bold().apply_to(prompt));
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(matches!(
        input.trim().to_ascii_lowercase().as_str(),
        "y" | "yes"
    ))
}

fn handle_config(config_dir: &Path, key: Option<String>, value: Option<String>) -> Result<Outcome> {
    let mut config = StockroomConfig::load(config_dir)?;

    match (key, value) {
        (None, _) => {
            for key in CONFIG_KEYS {
                if let Some(value) = config.get(key) {
                    println!("{} = {}", key, value);
                }
            }
        }
        (Some(key), None) => match config.get(&key) {
            Some(value) => println!("{} = {}", key, value),
            None => {
                return Err(StockroomError::Config(format!(
                    "Unknown config key: {}",
                    key
                )))
            }
        },
        (Some(key), Some(value)) => {
            config.set(&key, &value)?;
            config.save(config_dir)?;
            print_messages(&[CmdMessage::success(format!(
                "{} = {}",
                key,
                config.get(&key).unwrap_or_default()
            ))]);
        }
    }
    Ok(Outcome::Done)
}
