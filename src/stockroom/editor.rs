use crate::error::{Result, StockroomError};
use crate::form::{FormField, FormState, ValidationErrors};
use std::env;
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::debug;
use uuid::Uuid;

const HEADER: &str = "# Lines starting with '#' above the description are ignored.\n\
                      # Fields marked with * are required. Everything after 'description:' is the description.";

/// Renders a form as an editor buffer.
///
/// Format: one `field: value` line per single-line field, then `description:` followed by the
/// free-form description. Current validation errors are listed as comments at the top.
pub fn form_to_buffer(form: &FormState, errors: &ValidationErrors) -> String {
    let mut buffer = String::from(HEADER);
    buffer.push('\n');
    for (field, message) in errors.iter() {
        buffer.push_str(&format!("# ! {}: {}\n", field, message));
    }
    buffer.push('\n');

    for field in [
        FormField::Name,
        FormField::Price,
        FormField::Quantity,
        FormField::Category,
    ] {
        let marker = if field.is_required() { "*" } else { "" };
        buffer.push_str(&format!("{}{}: {}\n", field, marker, form.get(field)));
    }
    buffer.push_str("description:\n");
    buffer.push_str(&form.description);
    if !form.description.is_empty() && !form.description.ends_with('\n') {
        buffer.push('\n');
    }
    buffer
}

/// Parses an editor buffer back into a form. Unknown keys are ignored; missing ones stay empty.
pub fn form_from_buffer(buffer: &str) -> FormState {
    let mut form = FormState::default();
    let mut description: Option<Vec<&str>> = None;

    for line in buffer.lines() {
        if let Some(lines) = description.as_mut() {
            lines.push(line);
            continue;
        }
        if line.trim_start().starts_with('#') || line.trim().is_empty() {
            continue;
        }
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let Ok(field) = key.trim().trim_end_matches('*').parse::<FormField>() else {
            continue;
        };
        let value = value.trim();
        match field {
            FormField::Description => {
                let mut lines = Vec::new();
                if !value.is_empty() {
                    lines.push(value);
                }
                description = Some(lines);
            }
            FormField::Name => form.name = value.to_string(),
            FormField::Price => form.price = value.to_string(),
            FormField::Quantity => form.quantity = value.to_string(),
            FormField::Category => form.category = value.to_string(),
        }
    }

    if let Some(lines) = description {
        form.description = lines.join("\n").trim_end().to_string();
    }
    form
}

const FALLBACK_EDITORS: [&str; 3] = ["vim", "vi", "nano"];

/// Picks the editor as program plus leading arguments (`code --wait`): the first non-blank
/// of `$EDITOR` and `$VISUAL`, else the first fallback present in one of the `search_path` dirs.
fn editor_command(
    var: impl Fn(&str) -> Option<String>,
    search_path: Option<&OsStr>,
) -> Option<Vec<String>> {
    if let Some(configured) = ["EDITOR", "VISUAL"]
        .into_iter()
        .filter_map(|name| var(name))
        .find(|value| !value.trim().is_empty())
    {
        return Some(configured.split_whitespace().map(str::to_string).collect());
    }

    let dirs: Vec<PathBuf> = search_path
        .map(|paths| env::split_paths(paths).collect())
        .unwrap_or_default();
    FALLBACK_EDITORS
        .into_iter()
        .find(|name| dirs.iter().any(|dir| dir.join(name).is_file()))
        .map(|name| vec![name.to_string()])
}

/// Writes the form to a scratch file, lets the user edit it, and parses what they saved.
/// The scratch file is removed whether or not the editor succeeded.
pub fn edit_form(initial: &FormState, errors: &ValidationErrors) -> Result<FormState> {
    let command = editor_command(|name| env::var(name).ok(), env::var_os("PATH").as_deref())
        .ok_or_else(|| {
            StockroomError::Usage(
                "No editor found. Set $EDITOR, or pass the fields as flags with --no-editor."
                    .to_string(),
            )
        })?;

    let scratch = env::temp_dir().join(format!("stockroom-{}.txt", Uuid::new_v4()));
    fs::write(&scratch, form_to_buffer(initial, errors))?;
    let edited = run_editor(&command, &scratch);
    let _ = fs::remove_file(&scratch);

    Ok(form_from_buffer(&edited?))
}

fn run_editor(command: &[String], scratch: &Path) -> Result<String> {
    let Some((program, args)) = command.split_first() else {
        return Err(StockroomError::Usage("Editor command is empty".to_string()));
    };
    debug!(editor = %program, file = %scratch.display(), "editing product form");

    let status = Command::new(program)
        .args(args)
        .arg(scratch)
        .status()
        .map_err(|e| StockroomError::Usage(format!("Could not start editor '{}': {}", program, e)))?;
    if !status.success() {
        return Err(StockroomError::Usage(format!(
            "Editor '{}' failed ({}); nothing was saved",
            program, status
        )));
    }

    Ok(fs::read_to_string(scratch)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn widget() -> FormState {
        FormState {
            name: "Widget".into(),
            description: "Blue.\n\n# not a comment here".into(),
            price: "9.99".into(),
            quantity: "10".into(),
            category: "Tools".into(),
        }
    }

    #[test]
    fn buffer_lists_fields_and_errors() {
        let mut errors = ValidationErrors::new();
        errors.insert("price", "Price must be greater than 0");
        let buffer = form_to_buffer(&widget(), &errors);

        assert!(buffer.contains("# ! price: Price must be greater than 0\n"));
        assert!(buffer.contains("name*: Widget\n"));
        assert!(buffer.contains("category: Tools\n"));
        assert!(buffer.ends_with("description:\nBlue.\n\n# not a comment here\n"));
    }

    #[test]
    fn buffer_survives_an_unchanged_save() {
        let form = widget();
        let parsed = form_from_buffer(&form_to_buffer(&form, &ValidationErrors::new()));
        assert_eq!(parsed, form);
    }

    #[test]
    fn parses_hand_written_buffer() {
        let buffer = "# my notes\nNAME: Lamp\nprice*:  24.50 \nsize: XL\ndescription: Warm light";
        let form = form_from_buffer(buffer);
        assert_eq!(form.name, "Lamp");
        assert_eq!(form.price, "24.50");
        assert_eq!(form.quantity, "");
        assert_eq!(form.description, "Warm light");
    }

    #[test]
    fn empty_buffer_is_empty_form() {
        assert_eq!(form_from_buffer(""), FormState::default());
    }

    #[test]
    fn value_may_contain_colons() {
        let form = form_from_buffer("name: Cable: USB-C\n");
        assert_eq!(form.name, "Cable: USB-C");
    }

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let pairs: Vec<(String, String)> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| {
            pairs
                .iter()
                .find(|(k, _)| k == name)
                .map(|(_, v)| v.clone())
        }
    }

    #[test]
    fn editor_comes_from_the_environment() {
        let both = vars(&[("EDITOR", "hx"), ("VISUAL", "code")]);
        assert_eq!(editor_command(both, None), Some(vec!["hx".to_string()]));

        let blank_editor = vars(&[("EDITOR", "  "), ("VISUAL", "code --wait")]);
        assert_eq!(
            editor_command(blank_editor, None),
            Some(vec!["code".to_string(), "--wait".to_string()])
        );
    }

    #[test]
    fn falls_back_to_an_editor_on_the_search_path() {
        let empty = tempfile::TempDir::new().unwrap();
        let bin = tempfile::TempDir::new().unwrap();
        fs::write(bin.path().join("nano"), "").unwrap();
        let search_path = env::join_paths([empty.path(), bin.path()]).unwrap();

        assert_eq!(
            editor_command(vars(&[]), Some(search_path.as_os_str())),
            Some(vec!["nano".to_string()])
        );
        assert_eq!(
            editor_command(vars(&[]), Some(empty.path().as_os_str())),
            None
        );
    }
}
