use chrono::{DateTime, Utc};
use colored::Colorize;
use stockroom::catalog::CatalogView;
use stockroom::client::DEFAULT_LOW_STOCK_THRESHOLD;
use stockroom::error::ErrorBanner;
use stockroom::form::{FormField, RecordEditor, ValidationErrors};
use stockroom::model::Product;
use timeago::Formatter;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

const LINE_WIDTH: usize = 100;
const ID_WIDTH: usize = 7;
const PRICE_WIDTH: usize = 12;
const QTY_WIDTH: usize = 10;
const TIME_WIDTH: usize = 14;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum MessageLevel {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct CmdMessage {
    pub level: MessageLevel,
    pub content: String,
}

impl CmdMessage {
    pub fn info(content: impl Into<String>) -> Self {
        Self::new(MessageLevel::Info, content)
    }

    pub fn success(content: impl Into<String>) -> Self {
        Self::new(MessageLevel::Success, content)
    }

    pub fn warning(content: impl Into<String>) -> Self {
        Self::new(MessageLevel::Warning, content)
    }

    pub fn error(content: impl Into<String>) -> Self {
        Self::new(MessageLevel::Error, content)
    }

    fn new(level: MessageLevel, content: impl Into<String>) -> Self {
        Self {
            level,
            content: content.into(),
        }
    }
}

/// Errors go to stderr, everything else to stdout.
pub(super) fn print_messages(messages: &[CmdMessage]) {
    for message in messages {
        match message.level {
            MessageLevel::Info => println!("{}", message.content.dimmed()),
            MessageLevel::Success => println!("{}", message.content.green()),
            MessageLevel::Warning => println!("{}", message.content.yellow()),
            MessageLevel::Error => eprintln!("{}", message.content.red()),
        }
    }
}

pub(super) fn banner_message(banner: &ErrorBanner) -> CmdMessage {
    CmdMessage::error(banner.message.clone())
}

/// Field errors as messages, labelled with the form's field names where known.
pub(super) fn validation_messages(errors: &ValidationErrors) -> Vec<CmdMessage> {
    errors
        .iter()
        .map(|(field, message)| {
            let label = field
                .parse::<FormField>()
                .map(|f| f.label().to_string())
                .unwrap_or_else(|_| field.to_string());
            CmdMessage::error(format!("  {}: {}", label, message))
        })
        .collect()
}

/// Everything that went wrong on a form: the page error first, then field errors.
pub(super) fn form_messages(editor: &RecordEditor) -> Vec<CmdMessage> {
    let mut messages: Vec<CmdMessage> = editor.error().map(banner_message).into_iter().collect();
    if !editor.errors().is_empty() {
        messages.push(CmdMessage::error(format!(
            "{} was not saved:",
            if editor.is_editing() { "Product" } else { "New product" }
        )));
        messages.extend(validation_messages(editor.errors()));
    }
    messages
}

/// The catalog as the user sees it: banner, then the grid or its empty state.
pub(super) fn print_catalog(catalog: &CatalogView) {
    if let Some(banner) = catalog.error() {
        print_messages(&[banner_message(banner)]);
    }

    if let Some(empty) = catalog.empty_state() {
        println!("{}", empty.title().bold());
        println!("{}", empty.hint().dimmed());
        return;
    }

    print!("{}", render_product_list(&catalog.filtered_products(), Utc::now()));
    println!();
    println!("{}", catalog.count_label().dimmed());
}

pub(super) fn render_product_list(products: &[&Product], now: DateTime<Utc>) -> String {
    let mut output = String::new();
    for product in products {
        output.push_str(&render_product_row(product, now));
        output.push('\n');
    }
    output
}

fn render_product_row(product: &Product, now: DateTime<Utc>) -> String {
    let id_str = format!("{:>width$}. ", product.id.as_str(), width = ID_WIDTH - 2);
    let title = match product.category.as_deref().filter(|c| !c.is_empty()) {
        Some(category) => format!("{} · {}", product.name, category),
        None => product.name.clone(),
    };

    let available = LINE_WIDTH.saturating_sub(id_str.width() + PRICE_WIDTH + QTY_WIDTH + TIME_WIDTH);
    let title_display = truncate_to_width(&title, available);
    let padding = available.saturating_sub(title_display.width());

    let price = format!("{:>width$}", format_price(product.price), width = PRICE_WIDTH);
    let qty_text = format!(
        "{:>width$}",
        product
            .quantity
            .map(|q| format!("qty {}", q))
            .unwrap_or_default(),
        width = QTY_WIDTH
    );
    let qty = match product.quantity {
        Some(0) => qty_text.red(),
        Some(q) if q <= i64::from(DEFAULT_LOW_STOCK_THRESHOLD) => qty_text.yellow(),
        _ => qty_text.normal(),
    };
    let time = product
        .created_at
        .map(|created| format_time_ago(created, now))
        .unwrap_or_else(|| " ".repeat(TIME_WIDTH));

    format!(
        "{}{}{}{}{}{}",
        id_str.yellow(),
        title_display,
        " ".repeat(padding),
        price,
        qty,
        time.dimmed()
    )
}

pub(super) fn print_product(product: &Product) {
    println!("{} {}", product.name.bold(), format!("#{}", product.id).yellow());
    println!("--------------------------------");
    for (label, value) in product_details(product, Utc::now()) {
        println!("{:<10} {}", format!("{}:", label), value);
    }
    if let Some(description) = product.description.as_deref().filter(|d| !d.is_empty()) {
        println!();
        println!("{}", description);
    }
}

fn product_details(product: &Product, now: DateTime<Utc>) -> Vec<(&'static str, String)> {
    let mut details = Vec::new();
    if let Some(category) = product.category.as_deref().filter(|c| !c.is_empty()) {
        details.push(("Category", category.to_string()));
    }
    details.push(("Price", format_price(product.price)));
    if let Some(quantity) = product.quantity {
        details.push(("Quantity", quantity.to_string()));
    }
    if let Some(created) = product.created_at {
        details.push(("Added", format_time_ago(created, now).trim().to_string()));
    }
    if let Some(updated) = product.updated_at {
        details.push(("Updated", format_time_ago(updated, now).trim().to_string()));
    }
    details
}

fn format_price(price: Option<f64>) -> String {
    price.map(|p| format!("${:.2}", p)).unwrap_or_default()
}

fn truncate_to_width(s: &str, max_width: usize) -> String {
    if s.width() <= max_width {
        return s.to_string();
    }

    let mut result = String::new();
    let mut current_width = 0;
    for c in s.chars() {
        let char_width = c.width().unwrap_or(0);
        if current_width + char_width > max_width.saturating_sub(1) {
            break;
        }
        result.push(c);
        current_width += char_width;
    }
    result.push('…');
    result
}

fn format_time_ago(timestamp: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let duration = now.signed_duration_since(timestamp);
    let time_str = Formatter::new().convert(duration.to_std().unwrap_or_default());
    format!("{:>width$}", time_str, width = TIME_WIDTH)
}
