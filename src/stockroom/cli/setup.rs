use clap::{Args, Parser, Subcommand};
use stockroom::form::FormField;

/// Returns the version string, including git hash and commit date for non-release builds.
/// Format: "0.3.2" for releases, "0.3.2@abc1234 2024-01-15 14:30" for dev builds
fn get_version() -> &'static str {
    const VERSION: &str = env!("CARGO_PKG_VERSION");
    const GIT_HASH: &str = env!("GIT_HASH");
    const GIT_COMMIT_DATE: &str = env!("GIT_COMMIT_DATE");
    const IS_RELEASE: &str = env!("IS_RELEASE");

    use std::sync::OnceLock;
    static VERSION_STRING: OnceLock<String> = OnceLock::new();

    VERSION_STRING.get_or_init(|| {
        if IS_RELEASE == "true" || GIT_HASH.is_empty() {
            VERSION.to_string()
        } else {
            format!("{}@{} {}", VERSION, GIT_HASH, GIT_COMMIT_DATE)
        }
    })
}

#[derive(Parser, Debug)]
#[command(name = "stockroom", bin_name = "stockroom", version = get_version())]
#[command(about = "Browse and manage a product inventory served over HTTP", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Root of the product API (overrides STOCKROOM_API_URL and the config file)
    #[arg(long, global = true, value_name = "URL", help_heading = "Options")]
    pub api_url: Option<String>,

    /// Verbose output
    #[arg(short, long, global = true, help_heading = "Options")]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List products
    #[command(alias = "ls", display_order = 1)]
    List {
        /// Only show products whose name, description or category contains TERM
        #[arg(short, long, value_name = "TERM")]
        search: Option<String>,

        /// Ask the server for one category
        #[arg(long, conflicts_with_all = ["low_stock", "remote_search"])]
        category: Option<String>,

        /// Ask the server for products at or below N in stock
        #[arg(
            long,
            value_name = "N",
            num_args = 0..=1,
            default_missing_value = "10",
            conflicts_with = "remote_search"
        )]
        low_stock: Option<u32>,

        /// Ask the server to search instead of filtering locally
        #[arg(long, value_name = "TERM")]
        remote_search: Option<String>,
    },

    /// Search products (same as `list --search`)
    #[command(display_order = 2)]
    Search { term: String },

    /// Show one product
    #[command(alias = "v", display_order = 3)]
    Show { id: String },

    /// Add a product (opens $EDITOR unless fields are given)
    #[command(alias = "n", display_order = 4)]
    Add {
        #[command(flatten)]
        fields: FieldArgs,

        /// Skip opening the editor
        #[arg(long)]
        no_editor: bool,
    },

    /// Edit a product (opens $EDITOR unless fields are given)
    #[command(alias = "e", display_order = 5)]
    Edit {
        id: String,

        #[command(flatten)]
        fields: FieldArgs,

        /// Skip opening the editor
        #[arg(long)]
        no_editor: bool,
    },

    /// Delete a product
    #[command(alias = "rm", display_order = 6)]
    Delete {
        id: String,

        /// Skip confirmation
        #[arg(long, short = 'y')]
        yes: bool,
    },

    /// Get or set configuration
    #[command(display_order = 7)]
    Config {
        /// Configuration key (e.g., api-url)
        key: Option<String>,

        /// Value to set (if omitted, prints current value)
        value: Option<String>,
    },
}

/// Form fields given on the command line. Values are passed through as typed; validation
/// happens in the form.
#[derive(Args, Debug, Default, Clone, PartialEq, Eq)]
pub struct FieldArgs {
    #[arg(long)]
    pub name: Option<String>,

    #[arg(long)]
    pub description: Option<String>,

    #[arg(long, allow_hyphen_values = true)]
    pub price: Option<String>,

    #[arg(long, allow_hyphen_values = true)]
    pub quantity: Option<String>,

    #[arg(long)]
    pub category: Option<String>,
}

impl FieldArgs {
    pub fn is_empty(&self) -> bool {
        self.assignments().is_empty()
    }

    /// The fields that were given, in form order.
    pub fn assignments(&self) -> Vec<(FormField, &str)> {
        [
            (FormField::Name, &self.name),
            (FormField::Description, &self.description),
            (FormField::Price, &self.price),
            (FormField::Quantity, &self.quantity),
            (FormField::Category, &self.category),
        ]
        .into_iter()
        .filter_map(|(field, value)| value.as_deref().map(|v| (field, v)))
        .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("stockroom").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn low_stock_threshold_is_optional() {
        match parse(&["ls", "--low-stock"]).command {
            Some(Commands::List { low_stock, .. }) => assert_eq!(low_stock, Some(10)),
            other => panic!("unexpected: {:?}", other),
        }
        match parse(&["list", "--low-stock", "3"]).command {
            Some(Commands::List { low_stock, .. }) => assert_eq!(low_stock, Some(3)),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn category_conflicts_with_other_server_filters() {
        let result = Cli::try_parse_from(["stockroom", "list", "--category", "A", "--low-stock"]);
        assert!(result.is_err());
    }

    #[test]
    fn negative_numbers_reach_the_form() {
        match parse(&["n", "--name", "Saw", "--price", "-1", "--quantity", "-2"]).command {
            Some(Commands::Add { fields, no_editor }) => {
                assert!(!no_editor);
                assert_eq!(
                    fields.assignments(),
                    vec![
                        (FormField::Name, "Saw"),
                        (FormField::Price, "-1"),
                        (FormField::Quantity, "-2"),
                    ]
                );
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn global_options_after_subcommand() {
        let cli = parse(&["rm", "4", "-y", "--api-url", "http://h:1/api", "-v"]);
        assert_eq!(cli.api_url.as_deref(), Some("http://h:1/api"));
        assert!(cli.verbose);
        assert!(matches!(cli.command, Some(Commands::Delete { yes: true, .. })));
    }

    #[test]
    fn empty_field_args() {
        assert!(FieldArgs::default().is_empty());
    }
}
