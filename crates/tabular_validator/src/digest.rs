//! Layout documentation.
//!
//! A digest is rendered from the layout alone: column types, parameters and
//! the explanation of every compiled rule. These are the same strings the
//! validator reports, so the documentation cannot drift from the checks.

use tabular_core::{Column, Layout};

/// Output format of a digest.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DigestFormat {
    /// Markdown document
    #[default]
    Markdown,
    /// HTML fragment
    Html,
}

struct Section {
    heading: String,
    items: Vec<String>,
    rules: Vec<String>,
}

/// Renders the layout as Markdown.
pub fn digest(layout: &Layout) -> String {
    digest_with(layout, DigestFormat::Markdown)
}

/// Renders the layout in `format`.
pub fn digest_with(layout: &Layout, format: DigestFormat) -> String {
    let title = layout.title().unwrap_or("Layout");
    let mut sections: Vec<Section> = layout.columns().iter().map(column_section).collect();

    if !layout.file_rules().is_empty() {
        sections.push(Section {
            heading: "File".to_string(),
            items: Vec::new(),
            rules: layout
                .file_rules()
                .iter()
                .map(|rule| format!("{}: {}", rule.name(), rule.explanation()))
                .collect(),
        });
    }

    match format {
        DigestFormat::Markdown => markdown(title, &sections),
        DigestFormat::Html => html(title, &sections),
    }
}

fn column_section(column: &Column) -> Section {
    let field = column.field();
    let mut items = vec![format!("Type: {}", field.type_name())];
    items.extend(field.descriptors());
    if let Some(description) = field.description_text() {
        items.push(format!("Description: {description}"));
    }

    let rules = column.rules();
    Section {
        heading: column.name().to_string(),
        items,
        rules: rules
            .cell
            .iter()
            .map(|rule| format!("{}: {}", rule.name(), rule.explanation()))
            .chain(
                rules
                    .column
                    .iter()
                    .map(|rule| format!("{}: {}", rule.name(), rule.explanation())),
            )
            .collect(),
    }
}

fn markdown(title: &str, sections: &[Section]) -> String {
    let mut out = format!("# {title}\n");
    for section in sections {
        out.push_str(&format!("\n## {}\n\n", section.heading));
        for item in &section.items {
            out.push_str(&format!("- {item}\n"));
        }
        if !section.rules.is_empty() {
            if !section.items.is_empty() {
                out.push_str("- Rules:\n");
                for rule in &section.rules {
                    out.push_str(&format!("  - {rule}\n"));
                }
            } else {
                for rule in &section.rules {
                    out.push_str(&format!("- {rule}\n"));
                }
            }
        }
    }
    out
}

fn html(title: &str, sections: &[Section]) -> String {
    let mut out = format!("<h1>{}</h1>\n", escape(title));
    for section in sections {
        out.push_str(&format!("<h2>{}</h2>\n", escape(&section.heading)));
        out.push_str("<ul>\n");
        for item in &section.items {
            out.push_str(&format!("  <li>{}</li>\n", escape(item)));
        }
        if !section.rules.is_empty() {
            out.push_str("  <li>Rules\n    <ul>\n");
            for rule in &section.rules {
                out.push_str(&format!("      <li>{}</li>\n", escape(rule)));
            }
            out.push_str("    </ul>\n  </li>\n");
        }
        out.push_str("</ul>\n");
    }
    out
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}
