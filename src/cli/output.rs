//! Colored terminal output helpers.
//!
//! All user-facing output goes through these functions so we get
//! consistent styling across every command.

use comfy_table::{ContentArrangement, Table};
use console::style;

use crate::workspace::RestoredFile;

/// Print a green success message: "check_mark {msg}"
pub fn success(msg: &str) {
    println!("{} {}", style("\u{2713}").green().bold(), msg);
}

/// Print a red error message: "x_mark {msg}"
pub fn error(msg: &str) {
    eprintln!("{} {}", style("\u{2717}").red().bold(), msg);
}

/// Print a yellow warning: "warning_sign {msg}"
pub fn warning(msg: &str) {
    eprintln!("{} {}", style("\u{26a0}").yellow().bold(), msg);
}

/// Print a blue info message: "info_sign {msg}"
pub fn info(msg: &str) {
    println!("{} {}", style("\u{2139}").blue().bold(), msg);
}

/// Print a dim tip/hint: "arrow {msg}"
pub fn tip(msg: &str) {
    println!("{} {}", style("\u{2192}").dim(), style(msg).dim());
}

/// Print a table of restored files (File, Entries, Top-level keys).
pub fn print_restored_table(restored: &[RestoredFile]) {
    if restored.is_empty() {
        info("No .latte templates found to deploy.");
        tip("Run `templatte genelatte` to generate templates first.");
        return;
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["File", "Entries", "Top-level keys"]);

    for file in restored {
        let keys: Vec<&str> = file.tree.keys().map(String::as_str).collect();
        table.add_row(vec![
            file.path.display().to_string(),
            file.entries.to_string(),
            keys.join(", "),
        ]);
    }

    println!("{table}");
}
