//! Minimal LaTeX document tree and markup helpers.
//!
//! # Responsibility
//! - Compose documents from sections, tables, lists and raw markup.
//! - Serialize the tree to LaTeX source.
//!
//! # Invariants
//! - Section titles are escaped on output; `Node::Raw`, table cells and
//!   list items are emitted verbatim.

use chrono::NaiveDate;

/// One element of a document body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Raw(String),
    NewLine,
    Section {
        title: String,
        numbered: bool,
        body: Vec<Node>,
    },
    Subsection {
        title: String,
        numbered: bool,
        body: Vec<Node>,
    },
    Tabular {
        spec: String,
        rows: Vec<TableRow>,
    },
    /// Full text width table with flexible `X` columns.
    Tabularx {
        spec: String,
        rows: Vec<TableRow>,
    },
    Itemize {
        /// `itemize*` from `mdwlist` when set.
        compact: bool,
        items: Vec<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableRow {
    Cells(Vec<String>),
    HLine,
}

impl Node {
    pub fn raw(value: impl Into<String>) -> Self {
        Self::Raw(value.into())
    }

    /// Unnumbered section.
    pub fn section(title: impl Into<String>, body: Vec<Node>) -> Self {
        Self::Section {
            title: title.into(),
            numbered: false,
            body,
        }
    }

    /// Unnumbered subsection.
    pub fn subsection(title: impl Into<String>, body: Vec<Node>) -> Self {
        Self::Subsection {
            title: title.into(),
            numbered: false,
            body,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Package {
    name: String,
    options: Vec<String>,
}

/// Document root: class, preamble and body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    class: String,
    class_options: Vec<String>,
    packages: Vec<Package>,
    preamble: Vec<String>,
    body: Vec<Node>,
}

impl Document {
    pub fn new(class: impl Into<String>) -> Self {
        Self {
            class: class.into(),
            class_options: Vec::new(),
            packages: Vec::new(),
            preamble: Vec::new(),
            body: Vec::new(),
        }
    }

    pub fn with_class_options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.class_options = options.into_iter().map(Into::into).collect();
        self
    }

    pub fn use_package(&mut self, name: impl Into<String>, options: &[&str]) {
        let name = name.into();
        if self.packages.iter().any(|package| package.name == name) {
            return;
        }
        self.packages.push(Package {
            name,
            options: options.iter().map(|option| option.to_string()).collect(),
        });
    }

    pub fn push_preamble(&mut self, markup: impl Into<String>) {
        self.preamble.push(markup.into());
    }

    pub fn append(&mut self, node: Node) {
        self.body.push(node);
    }

    pub fn body(&self) -> &[Node] {
        &self.body
    }

    /// Serializes the whole document to LaTeX source.
    pub fn to_latex(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!(
            "\\documentclass{}{{{}}}\n",
            bracket_options(&self.class_options),
            self.class
        ));
        for package in &self.packages {
            out.push_str(&format!(
                "\\usepackage{}{{{}}}\n",
                bracket_options(&package.options),
                package.name
            ));
        }
        for line in &self.preamble {
            out.push_str(line);
            out.push('\n');
        }
        out.push_str("\\begin{document}\n");
        for node in &self.body {
            write_node(&mut out, node);
        }
        out.push_str("\\end{document}\n");
        out
    }
}

fn bracket_options(options: &[String]) -> String {
    if options.is_empty() {
        String::new()
    } else {
        format!("[{}]", options.join(","))
    }
}

fn write_node(out: &mut String, node: &Node) {
    match node {
        Node::Raw(value) => {
            out.push_str(value);
            out.push('\n');
        }
        Node::NewLine => out.push_str("\\newline\n"),
        Node::Section {
            title,
            numbered,
            body,
        } => write_heading(out, "section", title, *numbered, body),
        Node::Subsection {
            title,
            numbered,
            body,
        } => write_heading(out, "subsection", title, *numbered, body),
        Node::Tabular { spec, rows } => {
            out.push_str(&format!("\\begin{{tabular}}{{{spec}}}\n"));
            write_rows(out, rows);
            out.push_str("\\end{tabular}\n");
        }
        Node::Tabularx { spec, rows } => {
            out.push_str(&format!("\\begin{{tabularx}}{{\\textwidth}}{{{spec}}}\n"));
            write_rows(out, rows);
            out.push_str("\\end{tabularx}\n");
        }
        Node::Itemize { compact, items } => {
            let env = if *compact { "itemize*" } else { "itemize" };
            out.push_str(&format!("\\begin{{{env}}}\n"));
            for item in items {
                out.push_str("\\item ");
                out.push_str(item);
                out.push('\n');
            }
            out.push_str(&format!("\\end{{{env}}}\n"));
        }
    }
}

fn write_heading(out: &mut String, command: &str, title: &str, numbered: bool, body: &[Node]) {
    let star = if numbered { "" } else { "*" };
    out.push_str(&format!("\\{command}{star}{{{}}}\n", escape_latex(title)));
    for child in body {
        write_node(out, child);
    }
}

fn write_rows(out: &mut String, rows: &[TableRow]) {
    for row in rows {
        match row {
            TableRow::HLine => out.push_str("\\hline\n"),
            TableRow::Cells(cells) => {
                out.push_str(&cells.join(" & "));
                out.push_str("\\\\\n");
            }
        }
    }
}

/// Escapes LaTeX special characters in plain text.
pub fn escape_latex(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' | '%' | '$' | '#' | '_' | '{' | '}' => {
                out.push('\\');
                out.push(ch);
            }
            '~' => out.push_str("\\textasciitilde{}"),
            '^' => out.push_str("\\^{}"),
            '\\' => out.push_str("\\textbackslash{}"),
            _ => out.push(ch),
        }
    }
    out
}

pub fn bold(value: &str) -> String {
    format!("\\textbf{{{}}}", escape_latex(value))
}

pub fn italic(value: &str) -> String {
    format!("\\textit{{{}}}", escape_latex(value))
}

/// `\href` with escaped link text.
pub fn hyperlink(url: &str, text: &str) -> String {
    format!("\\href{{{url}}}{{{}}}", escape_latex(text))
}

/// Underlined markup comment pairing `short` with `long`.
pub fn annotation(short: &str, long: &str) -> String {
    format!("\\pdfmarkupcomment[markup=Underline,opacity=0.2]{{{short}}}{{{long}}}")
}

/// Hover tooltip pairing `short` with `long`.
pub fn tooltip(short: &str, long: &str) -> String {
    format!("\\pdftooltip{{\\underline{{{short}}}}}{{{long}}}")
}

/// Vertical space in inches.
pub fn vspace(inches: &str) -> String {
    format!("\\vspace{{{inches} in}}")
}

/// Non-breaking horizontal space in ems.
pub fn hspace(ems: &str) -> String {
    format!("\\nobreak\\hspace{{{ems} em}}")
}

/// `Month Year`, or `Present` for an open end date.
pub fn format_date(date: Option<NaiveDate>) -> String {
    match date {
        Some(date) => date.format("%B %Y").to_string(),
        None => "Present".to_string(),
    }
}

/// `<start> --- <end>` with an em dash.
pub fn date_range(start: NaiveDate, end: Option<NaiveDate>) -> String {
    format!("{} {{---}} {}", format_date(Some(start)), format_date(end))
}

#[cfg(test)]
mod tests {
    use super::{date_range, escape_latex, hyperlink, Document, Node, TableRow};
    use chrono::NaiveDate;

    #[test]
    fn escape_handles_special_characters() {
        assert_eq!(escape_latex("R&D 100% #1"), r"R\&D 100\% \#1");
        assert_eq!(escape_latex(r"a\b"), r"a\textbackslash{}b");
    }

    #[test]
    fn hyperlink_escapes_text_but_not_url() {
        assert_eq!(
            hyperlink("https://a.dev/x_y", "a_dev"),
            r"\href{https://a.dev/x_y}{a\_dev}"
        );
    }

    #[test]
    fn date_range_renders_open_end_as_present() {
        let start = NaiveDate::from_ymd_opt(2020, 1, 1).expect("valid date");
        assert_eq!(date_range(start, None), "January 2020 {---} Present");
    }

    #[test]
    fn document_serializes_preamble_and_nested_body() {
        let mut doc = Document::new("article").with_class_options(["11pt"]);
        doc.use_package("hyperref", &[]);
        doc.use_package("geometry", &["margin=0.5in"]);
        doc.use_package("hyperref", &[]);
        doc.append(Node::section(
            "Q&A",
            vec![
                Node::Itemize {
                    compact: true,
                    items: vec!["one".to_string()],
                },
                Node::Tabular {
                    spec: "l".to_string(),
                    rows: vec![TableRow::HLine, TableRow::Cells(vec!["a".into(), "b".into()])],
                },
            ],
        ));

        let latex = doc.to_latex();

        assert!(latex.starts_with("\\documentclass[11pt]{article}\n"));
        assert_eq!(latex.matches("\\usepackage{hyperref}").count(), 1);
        assert!(latex.contains("\\usepackage[margin=0.5in]{geometry}"));
        assert!(latex.contains(
            "\\section*{Q\\&A}\n\\begin{itemize*}\n\\item one\n\\end{itemize*}"
        ));
        assert!(latex.contains("\\hline\na & b\\\\\n"));
        assert!(latex.ends_with("\\end{document}\n"));
    }
}
