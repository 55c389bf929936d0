use anyhow::Result;
use colored::*;
use serde_json::json;
use tabular_core::Layout;
use tabular_validator::ErrorTree;

const HEADINGS: [&str; 5] = ["File: ", "Header: ", "Row: ", "Cell: ", "Column: "];

pub fn print_validation_report(tree: &ErrorTree, format: &str) -> Result<()> {
    match format {
        "json" => print_json_report(tree),
        _ => {
            print_text_report(tree);
            Ok(())
        }
    }
}

fn print_text_report(tree: &ErrorTree) {
    let file = tree.file.as_deref().unwrap_or("<unnamed>");

    println!("\n{}", "═".repeat(60));
    println!("{}", "  VALIDATION REPORT".bold());
    println!("{}", "═".repeat(60));

    if tree.is_empty() {
        println!(
            "\n{} {}",
            "✓".green().bold(),
            format!("{file} conforms to the layout").green().bold()
        );
    } else {
        println!(
            "\n{} {}",
            "✗".red().bold(),
            format!("{file} does not conform to the layout").red().bold()
        );
        println!();
        for line in tree.render().lines() {
            let text = line.trim_start().trim_start_matches("- ");
            if HEADINGS.iter().any(|heading| text.starts_with(heading)) {
                println!("{line}");
            } else {
                println!("{}", line.red());
            }
        }
    }

    if !tree.complete {
        println!(
            "\n{} {}",
            "⚠".yellow().bold(),
            "Validation stopped early; remaining rows were not checked".yellow()
        );
    }

    println!("\n{}", "Summary:".bold());
    println!("  Violations:  {}", tree.violation_count());
    println!("  Failed rows: {}", tree.failed_rows());
    println!("{}", "═".repeat(60));
}

fn print_json_report(tree: &ErrorTree) -> Result<()> {
    let output = json!({
        "passed": tree.is_empty(),
        "file": tree.file,
        "complete": tree.complete,
        "violations": tree.violations(),
        "tree": tree,
        "summary": {
            "violation_count": tree.violation_count(),
            "failed_rows": tree.failed_rows(),
        }
    });

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

pub fn print_layout_summary(layout: &Layout, format: &str) -> Result<()> {
    if format == "json" {
        let columns: Vec<_> = layout
            .columns()
            .iter()
            .map(|column| {
                json!({
                    "name": column.name(),
                    "type": column.field().type_name(),
                    "nullable": column.field().is_nullable(),
                    "rules": column.rules().explanations(),
                })
            })
            .collect();
        let file_rules: Vec<String> = layout
            .file_rules()
            .iter()
            .map(|rule| format!("{}: {}", rule.name(), rule.explanation()))
            .collect();
        let output = json!({
            "valid": true,
            "title": layout.title(),
            "columns": columns,
            "file_rules": file_rules,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    print_success("Layout is valid");
    if let Some(title) = layout.title() {
        println!("  Title:   {title}");
    }
    println!("  Columns: {}", layout.width());
    for column in layout.columns() {
        let field = column.field();
        let nullable = if field.is_nullable() { ", nullable" } else { "" };
        println!(
            "    - {} ({}{}): {} rules",
            column.name().bold(),
            field.type_name(),
            nullable,
            column.rules().cell.len() + column.rules().column.len()
        );
    }
    if !layout.file_rules().is_empty() {
        println!("  File rules:");
        for rule in layout.file_rules() {
            println!("    - {}: {}", rule.name(), rule.explanation());
        }
    }
    Ok(())
}

pub fn print_success(message: &str) {
    println!("{} {}", "✓".green().bold(), message.green());
}

pub fn print_info(message: &str) {
    println!("{} {}", "ℹ".blue().bold(), message);
}
