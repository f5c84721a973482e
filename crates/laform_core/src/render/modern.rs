//! Modern layout: article class, tabular contact header, annotated skills.

use super::common::{
    contact_card, format_phone, inject, name_of, subcategory_counts, visible, WorkHistory,
};
use super::RenderResult;
use crate::cache::{NameKind, ResumeData};
use crate::db::QueryExecutor;
use crate::glossary::RenderMode;
use crate::latex::{self, Document, Node, TableRow};
use crate::listutil::unique;
use crate::model::{CertificationEntry, EducationEntry, SkillEntry, SummaryEntry};

const MODE: RenderMode = RenderMode::Modern;

/// Renders the complete modern résumé.
pub fn render<E: QueryExecutor>(data: &mut ResumeData<E>) -> RenderResult<Document> {
    let mut doc = Document::new("article").with_class_options(["10pt", "letterpaper"]);
    doc.use_package("geometry", &["margin=0.5in"]);
    doc.use_package("hyperref", &[]);
    doc.use_package("pdfcomment", &[]);
    doc.use_package("mdwlist", &[]);
    doc.use_package("tabularx", &[]);
    doc.push_preamble("\\pagestyle{empty}");

    doc.append(contact_header(data)?);
    doc.append(summary(data)?);
    doc.append(skills(data)?);
    doc.append(work_history(data)?);
    if let Some(section) = education(data)? {
        doc.append(section);
    }
    if let Some(section) = certifications(data)? {
        doc.append(section);
    }
    Ok(doc)
}

/// Name heading with website, phone, email and location tables.
pub fn contact_header<E: QueryExecutor>(data: &mut ResumeData<E>) -> RenderResult<Node> {
    let card = contact_card(data)?;
    let phone = match card.phone.visible() {
        Some(raw) => format_phone(raw)?,
        None => String::new(),
    };
    let www = card
        .www
        .visible()
        .map(|www| latex::hyperlink(&format!("https://{www}"), www))
        .unwrap_or_default();
    let email = card.email.visible().map(latex::escape_latex).unwrap_or_default();
    let location = card.location.visible().map(latex::escape_latex).unwrap_or_default();

    Ok(Node::section(
        card.name.visible().unwrap_or_default(),
        vec![
            Node::raw(latex::vspace("-0.12")),
            Node::Tabularx {
                spec: "X X".to_string(),
                rows: vec![TableRow::HLine, TableRow::Cells(vec![www, String::new()])],
            },
            Node::raw(latex::vspace("-0.1")),
            Node::raw(latex::hspace("-24.0")),
            Node::Tabular {
                spec: "r r r".to_string(),
                rows: vec![TableRow::Cells(vec![phone, email, location])],
            },
        ],
    ))
}

/// Summary list with glossary-annotated descriptions.
pub fn summary<E: QueryExecutor>(data: &mut ResumeData<E>) -> RenderResult<Node> {
    let mut body = Vec::new();
    for entry in visible::<SummaryEntry, E>(data)? {
        let longdesc = inject(data, &entry.longdesc, MODE)?;
        body.push(Node::Itemize {
            compact: false,
            items: vec![format!("\\textbf{{{}:}} {longdesc}", entry.shortdesc)],
        });
    }
    Ok(Node::section("Summary", body))
}

/// One subsection per distinct subcategory, skills as annotated labels.
pub fn skills<E: QueryExecutor>(data: &mut ResumeData<E>) -> RenderResult<Node> {
    let skills = visible::<SkillEntry, E>(data)?;
    let counts = subcategory_counts(&skills);

    let mut body = Vec::new();
    for (subcategory, count) in counts {
        let Some(first) = skills.iter().find(|skill| skill.subcategory == subcategory) else {
            continue;
        };
        let items = skills
            .iter()
            .filter(|skill| {
                skill.category == first.category && skill.subcategory == first.subcategory
            })
            .take(count)
            .map(|skill| latex::annotation(&skill.shortdesc, &skill.longdesc))
            .collect();
        body.push(Node::subsection(
            subcategory,
            vec![Node::Itemize {
                compact: true,
                items,
            }],
        ));
    }
    Ok(Node::section("Skills", body))
}

/// Employers, their positions with date ranges, and achievements.
pub fn work_history<E: QueryExecutor>(data: &mut ResumeData<E>) -> RenderResult<Node> {
    let history = WorkHistory::load(data)?;

    let mut body = Vec::new();
    for &employer in &history.employers {
        let mut employer_body = Vec::new();
        for position in history.positions_of(employer) {
            let mut items = Vec::new();
            for achievement in history.achievements_of(position) {
                items.push(inject(data, &achievement.longdesc, MODE)?);
            }

            let mut position_body = vec![
                Node::raw(latex::vspace("-0.25")),
                Node::raw(format!(
                    "\\hfill{{\\textbf{{{}}}}}",
                    latex::date_range(position.startdate, position.enddate)
                )),
                Node::NewLine,
            ];
            if !items.is_empty() {
                position_body.push(Node::Itemize {
                    compact: false,
                    items,
                });
            }
            employer_body.push(Node::subsection(
                name_of(data, position.position, NameKind::Position)?,
                position_body,
            ));
        }
        body.push(Node::subsection(
            name_of(data, employer, NameKind::Employer)?,
            employer_body,
        ));
    }
    Ok(Node::section("Employment", body))
}

/// Schools with each visible focus and its dates; `None` when nothing is visible.
pub fn education<E: QueryExecutor>(data: &mut ResumeData<E>) -> RenderResult<Option<Node>> {
    let entries = visible::<EducationEntry, E>(data)?;
    if entries.is_empty() {
        return Ok(None);
    }

    let body = unique(entries.iter().map(|entry| entry.school.as_str()))
        .into_iter()
        .map(|school| {
            let lines = entries
                .iter()
                .filter(|entry| entry.school == school)
                .flat_map(|entry| {
                    [
                        Node::raw(format!(
                            "\\textit{{{}}} \\hfill{{\\textbf{{{}}}}}",
                            latex::escape_latex(&entry.focus),
                            latex::date_range(entry.startdate, entry.enddate)
                        )),
                        Node::NewLine,
                    ]
                })
                .collect();
            Node::subsection(school, lines)
        })
        .collect();
    Ok(Some(Node::section("Education", body)))
}

/// Compact certification list; `None` when nothing is visible.
pub fn certifications<E: QueryExecutor>(data: &mut ResumeData<E>) -> RenderResult<Option<Node>> {
    let entries = visible::<CertificationEntry, E>(data)?;
    if entries.is_empty() {
        return Ok(None);
    }

    let items = entries
        .iter()
        .map(|entry| format!("{} ({})", latex::escape_latex(&entry.certification), entry.year))
        .collect();
    Ok(Some(Node::section(
        "Certifications",
        vec![Node::Itemize {
            compact: true,
            items,
        }],
    )))
}
