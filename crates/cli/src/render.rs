use anyhow::Result;
use clap::ValueEnum;
use serde::Deserialize;
use tally_protocol::{serialize_json_pretty, Data, Page, ReportEnvelope};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Markdown,
    Html,
    Json,
}

impl OutputFormat {
    pub fn content_type(self) -> &'static str {
        match self {
            Self::Text => "text/plain; charset=utf-8",
            Self::Markdown => "text/markdown; charset=utf-8",
            Self::Html => "text/html; charset=utf-8",
            Self::Json => "application/json",
        }
    }
}

pub fn render(data: &Data, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(render_text(data)),
        OutputFormat::Markdown => Ok(render_markdown(data)),
        OutputFormat::Html => Ok(render_html(data)),
        OutputFormat::Json => serialize_json_pretty(&ReportEnvelope::new(data.clone())),
    }
}

pub fn render_text(data: &Data) -> String {
    let mut out = String::new();
    out.push_str(&data.summary);

    for page in &data.pages {
        out.push_str(&format!("\n== {} ==\n", page.filename));
        for (idx, group) in page.known_groups.iter().enumerate() {
            for entry in &group.entries {
                out.push_str(&format!("  {}: {}\n", entry.id, entry.count));
            }
            out.push_str(&format!("  group {} total: {}\n", idx + 1, group.total));
        }
        if !page.unknown_entries.is_empty() {
            out.push_str("  unknown:\n");
            for entry in &page.unknown_entries {
                out.push_str(&format!("    {}: {}\n", entry.id, entry.count));
            }
        }
    }

    out.push_str("\nTotals:\n");
    for entry in &data.total {
        out.push_str(&format!("  {}: {}\n", entry.id.name(), entry.count));
    }

    if !data.total_unknown.is_empty() {
        out.push_str("\nUnknown:\n");
        for entry in &data.total_unknown {
            out.push_str(&format!(
                "  [{}] {}: {}\n",
                entry.label,
                entry.id.qualified,
                entry.count
            ));
        }
    }

    if !data.footnotes.is_empty() {
        out.push_str("\nNotes:\n");
        for note in &data.footnotes {
            out.push_str(&format!("  {}:\n", note.id));
            for comment in &note.comments {
                out.push_str(&format!("    - {}\n", one_line(comment)));
            }
        }
    }

    if !data.errors.is_empty() {
        out.push_str("\nSkipped files:\n");
        for err in &data.errors {
            out.push_str(&format!("  {}: {}\n", err.filename, err.message));
        }
    }

    out
}

pub fn render_markdown(data: &Data) -> String {
    let mut md = String::new();
    md.push_str("# Activity report\n\n");
    md.push_str(&format!(
        "- Files: `{}`\n- Records: `{}`\n",
        data.pages.len(),
        data.counted_records()
    ));
    if !data.errors.is_empty() {
        md.push_str(&format!("- Skipped files: `{}`\n", data.errors.len()));
    }
    md.push('\n');

    md.push_str("## Summary\n\n");
    for line in data.summary.lines() {
        md.push_str(line);
        md.push_str("  \n");
    }
    md.push('\n');

    md.push_str("## Totals\n\n");
    md.push_str("| # | name | count |\n");
    md.push_str("|---:|---|---:|\n");
    for (idx, entry) in data.total.iter().enumerate() {
        md.push_str(&format!(
            "| {} | {} | {} |\n",
            idx + 1,
            escape_cell(&entry.id.to_string()),
            entry.count
        ));
    }
    md.push('\n');

    if !data.total_unknown.is_empty() {
        md.push_str("## Unknown names\n\n");
        md.push_str("| label | name | hint | count |\n");
        md.push_str("|---|---|---|---:|\n");
        for entry in &data.total_unknown {
            md.push_str(&format!(
                "| {} | {} | {} | {} |\n",
                escape_cell(&entry.label),
                escape_cell(entry.id.name()),
                escape_cell(&entry.id.hint),
                entry.count
            ));
        }
        md.push('\n');
    }

    for page in &data.pages {
        render_page_markdown(&mut md, page);
    }

    if !data.footnotes.is_empty() {
        md.push_str("## Notes\n\n");
        for (idx, note) in data.footnotes.iter().enumerate() {
            md.push_str(&format!("{}. **{}**\n", idx + 1, escape_cell(&note.id.to_string())));
            for comment in &note.comments {
                md.push_str(&format!("   - {}\n", one_line(comment)));
            }
        }
        md.push('\n');
    }

    if !data.errors.is_empty() {
        md.push_str("## Skipped files\n\n");
        for err in &data.errors {
            md.push_str(&format!("- `{}`: {}\n", err.filename, one_line(&err.message)));
        }
        md.push('\n');
    }

    md
}

/// Standalone page for browsers: summary, totals, per-file tables, notes
pub fn render_html(data: &Data) -> String {
    let mut html = String::new();
    html.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
    html.push_str("<title>Activity report</title>\n</head>\n<body>\n");

    html.push_str("<h1>Activity report</h1>\n<p>\n");
    for line in data.summary.lines() {
        html.push_str(&format!("{}<br>\n", escape_html(line)));
    }
    html.push_str("</p>\n");

    html.push_str("<h2>Totals</h2>\n<table>\n<tr><th>#</th><th>name</th><th>count</th></tr>\n");
    for (idx, entry) in data.total.iter().enumerate() {
        html.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td></tr>\n",
            idx + 1,
            escape_html(entry.id.name()),
            entry.count
        ));
    }
    for entry in &data.total_unknown {
        html.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td></tr>\n",
            escape_html(&entry.label),
            escape_html(&entry.id.to_string()),
            entry.count
        ));
    }
    html.push_str("</table>\n");

    for page in &data.pages {
        html.push_str(&format!("<h2>{}</h2>\n<table>\n", escape_html(&page.filename)));
        for group in &page.known_groups {
            for entry in &group.entries {
                html.push_str(&format!(
                    "<tr><td>{}</td><td>{}</td></tr>\n",
                    escape_html(&entry.id.to_string()),
                    entry.count
                ));
            }
            html.push_str(&format!(
                "<tr><th>total</th><th>{}</th></tr>\n",
                group.total
            ));
        }
        for entry in &page.unknown_entries {
            html.push_str(&format!(
                "<tr><td><i>{}</i></td><td>{}</td></tr>\n",
                escape_html(&entry.id.to_string()),
                entry.count
            ));
        }
        html.push_str("</table>\n");
    }

    if !data.footnotes.is_empty() {
        html.push_str("<h2>Notes</h2>\n<ol>\n");
        for note in &data.footnotes {
            html.push_str(&format!("<li><b>{}</b><ul>\n", escape_html(&note.id.to_string())));
            for comment in &note.comments {
                let lines: Vec<String> = comment.lines().map(escape_html).collect();
                html.push_str(&format!("<li>{}</li>\n", lines.join("<br>")));
            }
            html.push_str("</ul></li>\n");
        }
        html.push_str("</ol>\n");
    }

    if !data.errors.is_empty() {
        html.push_str("<h2>Skipped files</h2>\n<ul>\n");
        for err in &data.errors {
            html.push_str(&format!(
                "<li>{}: {}</li>\n",
                escape_html(&err.filename),
                escape_html(&err.message)
            ));
        }
        html.push_str("</ul>\n");
    }

    html.push_str("</body>\n</html>\n");
    html
}

fn render_page_markdown(md: &mut String, page: &Page) {
    md.push_str(&format!("## `{}`\n\n", page.filename));
    md.push_str("| group | name | count |\n");
    md.push_str("|---:|---|---:|\n");
    for (idx, group) in page.known_groups.iter().enumerate() {
        for entry in &group.entries {
            md.push_str(&format!(
                "| {} | {} | {} |\n",
                idx + 1,
                escape_cell(&entry.id.to_string()),
                entry.count
            ));
        }
        md.push_str(&format!("| {} | **total** | **{}** |\n", idx + 1, group.total));
    }
    for entry in &page.unknown_entries {
        md.push_str(&format!(
            "| - | {} | {} |\n",
            escape_cell(&entry.id.to_string()),
            entry.count
        ));
    }
    md.push('\n');
}

fn one_line(text: &str) -> String {
    text.lines().collect::<Vec<_>>().join(" / ")
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn escape_cell(text: &str) -> String {
    one_line(text).replace('|', "\\|")
}
