//! Retro layout for the `res` document class.
//!
//! Sections are emitted as flat markup inside one `resume` environment,
//! which [`render`] closes after the last section.

use super::common::{contact_card, format_phone, inject, name_of, visible, WorkHistory};
use super::RenderResult;
use crate::cache::{NameKind, ResumeData};
use crate::db::QueryExecutor;
use crate::glossary::RenderMode;
use crate::latex::{self, Document, Node, TableRow};
use crate::listutil::unique;
use crate::model::{CertificationEntry, EducationEntry, SkillEntry, SummaryEntry};

const MODE: RenderMode = RenderMode::Retro;

const LIST2_ENV: &str = concat!(
    "\\newenvironment{list2}{\\begin{list}{$\\bullet$}{",
    "\\setlength{\\itemsep}{0in}\\setlength{\\parsep}{0in}",
    "\\setlength{\\parskip}{0in}\\setlength{\\topsep}{0in}",
    "\\setlength{\\partopsep}{0in}\\setlength{\\leftmargin}{0.17in}",
    "}}{\\end{list}}"
);

/// Renders the complete retro résumé.
pub fn render<E: QueryExecutor>(data: &mut ResumeData<E>) -> RenderResult<Document> {
    let mut doc = Document::new("res").with_class_options(["margin", "line"]);
    doc.use_package("hyperref", &[]);
    doc.use_package("pdfcomment", &[]);
    doc.push_preamble("\\oddsidemargin -.5in");
    doc.push_preamble("\\evensidemargin -.5in");
    doc.push_preamble("\\textwidth=6.0in");
    doc.push_preamble(LIST2_ENV);

    let mut body = contact_header(data)?;
    body.extend(summary(data)?);
    body.extend(skills(data)?);
    body.extend(work_history(data)?);
    body.extend(education(data)?);
    body.extend(certifications(data)?);
    body.push(Node::raw("\\end{resume}"));

    for node in body {
        doc.append(node);
    }
    Ok(doc)
}

/// `\name`, opens the `resume` environment, then the contact table.
pub fn contact_header<E: QueryExecutor>(data: &mut ResumeData<E>) -> RenderResult<Vec<Node>> {
    let card = contact_card(data)?;
    let phone = match card.phone.visible() {
        Some(raw) => format!("{}{}", latex::italic("Phone:  "), format_phone(raw)?),
        None => String::new(),
    };
    let email = card
        .email
        .visible()
        .map(|email| {
            format!(
                "{}{}",
                latex::italic("E-mail:  "),
                latex::hyperlink(&format!("mailto:{email}"), email)
            )
        })
        .unwrap_or_default();
    let www = card
        .www
        .visible()
        .map(|www| {
            format!(
                "{}{}",
                latex::italic("WWW: "),
                latex::hyperlink(&format!("https://{www}"), www)
            )
        })
        .unwrap_or_default();
    let location = card
        .location
        .visible()
        .map(|location| {
            format!(
                "{}{}",
                latex::italic("Location:  "),
                latex::escape_latex(location)
            )
        })
        .unwrap_or_default();
    let name = card
        .name
        .visible()
        .map(latex::escape_latex)
        .unwrap_or_default();

    Ok(vec![
        Node::raw(format!("\\name{{{name}}}{}", latex::vspace("0.1"))),
        Node::raw("\\begin{resume}"),
        Node::raw("\\section{\\sc Contact Information}"),
        Node::raw(latex::vspace(".05")),
        Node::Tabular {
            spec: "l".to_string(),
            rows: vec![
                TableRow::Cells(vec![phone]),
                TableRow::Cells(vec![email]),
                TableRow::Cells(vec![www]),
                TableRow::Cells(vec![location]),
            ],
        },
    ])
}

pub fn summary<E: QueryExecutor>(data: &mut ResumeData<E>) -> RenderResult<Vec<Node>> {
    let mut nodes = vec![Node::raw("\\section{\\sc Summary}")];
    for entry in visible::<SummaryEntry, E>(data)? {
        let longdesc = inject(data, &entry.longdesc, MODE)?;
        nodes.push(Node::raw(format!("\\textbf{{{}:}} {longdesc}", entry.shortdesc)));
        nodes.push(Node::NewLine);
    }
    Ok(nodes)
}

/// Skills grouped by category, then subcategory, as an "Experience" section.
pub fn skills<E: QueryExecutor>(data: &mut ResumeData<E>) -> RenderResult<Vec<Node>> {
    let skills = visible::<SkillEntry, E>(data)?;
    let categories = unique(skills.iter().map(|skill| skill.category.as_str()));
    let pairs = unique(
        skills
            .iter()
            .map(|skill| (skill.category.as_str(), skill.subcategory.as_str())),
    );

    let mut nodes = vec![Node::raw("\\section{\\sc Experience}")];
    for category in categories {
        nodes.push(Node::raw(latex::bold(category)));
        for &(_, subcategory) in pairs.iter().filter(|(owner, _)| *owner == category) {
            nodes.push(Node::NewLine);
            nodes.push(Node::raw(format!(
                "{{\\textit {{{}}}}}",
                latex::escape_latex(subcategory)
            )));
            nodes.push(Node::raw("\\begin{list2}"));
            for skill in skills
                .iter()
                .filter(|skill| skill.category == category && skill.subcategory == subcategory)
            {
                let longdesc = inject(data, &skill.longdesc, MODE)?;
                nodes.push(Node::raw(format!("\\item {longdesc}")));
            }
            nodes.push(Node::raw("\\end{list2}"));
        }
    }
    Ok(nodes)
}

pub fn work_history<E: QueryExecutor>(data: &mut ResumeData<E>) -> RenderResult<Vec<Node>> {
    let history = WorkHistory::load(data)?;

    let mut nodes = vec![Node::raw("\\section{\\sc Employment}")];
    for &employer in &history.employers {
        let employer_name = name_of(data, employer, NameKind::Employer)?;
        nodes.push(Node::raw(latex::bold(&employer_name)));
        nodes.push(Node::NewLine);
        for position in history.positions_of(employer) {
            let title = name_of(data, position.position, NameKind::Position)?;
            let title = latex::escape_latex(&title);
            nodes.push(Node::raw(format!(
                "{{\\em {title}}} \\hfill {{\\textbf {{{}}}}}",
                latex::date_range(position.startdate, position.enddate)
            )));
            nodes.push(Node::raw("\\begin{list2}"));
            for achievement in history.achievements_of(position) {
                nodes.push(Node::raw(format!(
                    "\\item {}",
                    inject(data, &achievement.longdesc, MODE)?
                )));
            }
            nodes.push(Node::raw("\\end{list2}"));
        }
    }
    Ok(nodes)
}

/// Empty when no education entry is visible.
pub fn education<E: QueryExecutor>(data: &mut ResumeData<E>) -> RenderResult<Vec<Node>> {
    let entries = visible::<EducationEntry, E>(data)?;
    if entries.is_empty() {
        return Ok(Vec::new());
    }

    let mut nodes = vec![Node::raw("\\section{\\sc Education}")];
    for school in unique(entries.iter().map(|entry| entry.school.as_str())) {
        nodes.push(Node::raw(latex::bold(school)));
        nodes.push(Node::NewLine);
        for entry in entries.iter().filter(|entry| entry.school == school) {
            nodes.push(Node::raw(format!(
                "{{\\em {}}} \\hfill {{\\textbf {{{}}}}}",
                latex::escape_latex(&entry.focus),
                latex::date_range(entry.startdate, entry.enddate)
            )));
            nodes.push(Node::NewLine);
        }
    }
    Ok(nodes)
}

/// Empty when no certification is visible.
pub fn certifications<E: QueryExecutor>(data: &mut ResumeData<E>) -> RenderResult<Vec<Node>> {
    let entries = visible::<CertificationEntry, E>(data)?;
    if entries.is_empty() {
        return Ok(Vec::new());
    }

    let mut nodes = vec![
        Node::raw("\\section{\\sc Certifications}"),
        Node::raw("\\begin{list2}"),
    ];
    for entry in &entries {
        nodes.push(Node::raw(format!(
            "\\item {} ({})",
            latex::escape_latex(&entry.certification),
            entry.year
        )));
    }
    nodes.push(Node::raw("\\end{list2}"));
    Ok(nodes)
}
