//! Data access shared by both layouts.

use super::{RenderError, RenderResult};
use crate::cache::{NameKind, NameLookup, ResumeData};
use crate::db::QueryExecutor;
use crate::glossary::{glossary_inject, RenderMode};
use crate::listutil::{contact_flatten, count_instances, slim, unique};
use crate::model::{
    entries, AchievementEntry, ContactCard, EntityGroup, FromAttrMap, PositionEntry, SkillEntry,
};

/// Formats a ten-digit phone number as `(AAA) BBB-CCCC`.
///
/// Separators in the stored value are ignored.
pub fn format_phone(raw: &str) -> RenderResult<String> {
    let digits = raw.chars().filter(char::is_ascii_digit).collect::<String>();
    if digits.len() != 10 {
        return Err(RenderError::InvalidField {
            group: EntityGroup::Identification,
            attr: "phone",
            message: format!("expected 10 digits, found {}", digits.len()),
        });
    }
    Ok(format!("({}) {}-{}", &digits[0..3], &digits[3..6], &digits[6..10]))
}

pub(crate) fn contact_card<E: QueryExecutor>(
    data: &mut ResumeData<E>,
) -> RenderResult<ContactCard> {
    let records = data.fetch(EntityGroup::Identification)?;
    Ok(ContactCard::from_fields(&contact_flatten(&records))?)
}

/// Visible entries of `T`'s group, in stored order.
pub(crate) fn visible<T: FromAttrMap, E: QueryExecutor>(
    data: &mut ResumeData<E>,
) -> RenderResult<Vec<T>> {
    let records = data.fetch(T::GROUP)?;
    Ok(entries(&slim(&records))?)
}

pub(crate) fn inject<E: QueryExecutor>(
    data: &mut ResumeData<E>,
    text: &str,
    mode: RenderMode,
) -> RenderResult<String> {
    let glossary = data.fetch(EntityGroup::Glossary)?;
    Ok(glossary_inject(text, &glossary, mode)?)
}

pub(crate) fn name_of<E: QueryExecutor>(
    data: &ResumeData<E>,
    id: i64,
    kind: NameKind,
) -> RenderResult<String> {
    data.display_name(id, kind)?
        .ok_or(RenderError::NameNotFound { kind, id })
}

/// Employers in order of first appearance among achievements, then any
/// employer that only has positions.
pub(crate) fn employer_order(
    achievements: &[AchievementEntry],
    positions: &[PositionEntry],
) -> Vec<i64> {
    unique(
        achievements
            .iter()
            .map(|achievement| achievement.employer)
            .chain(positions.iter().map(|position| position.employer)),
    )
}

/// Distinct subcategories in first-seen order with their skill counts.
pub(crate) fn subcategory_counts(skills: &[SkillEntry]) -> Vec<(&str, usize)> {
    let all = skills
        .iter()
        .map(|skill| skill.subcategory.as_str())
        .collect::<Vec<_>>();
    unique(all.iter().copied())
        .into_iter()
        .map(|subcategory| (subcategory, count_instances(&all, &subcategory)))
        .collect()
}

/// Visible positions, deduplicated, with their employer's achievements.
pub(crate) struct WorkHistory {
    pub employers: Vec<i64>,
    pub positions: Vec<PositionEntry>,
    pub achievements: Vec<AchievementEntry>,
}

impl WorkHistory {
    pub fn load<E: QueryExecutor>(data: &mut ResumeData<E>) -> RenderResult<Self> {
        let achievements = visible::<AchievementEntry, E>(data)?;
        let positions = unique(visible::<PositionEntry, E>(data)?);
        Ok(Self {
            employers: employer_order(&achievements, &positions),
            positions,
            achievements,
        })
    }

    pub fn positions_of(&self, employer: i64) -> impl Iterator<Item = &PositionEntry> {
        self.positions
            .iter()
            .filter(move |position| position.employer == employer)
    }

    pub fn achievements_of<'a>(
        &'a self,
        position: &'a PositionEntry,
    ) -> impl Iterator<Item = &'a AchievementEntry> {
        self.achievements.iter().filter(move |achievement| {
            achievement.employer == position.employer && achievement.position == position.position
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{employer_order, format_phone, subcategory_counts};
    use crate::model::{AchievementEntry, PositionEntry, SkillEntry};
    use crate::render::RenderError;
    use chrono::NaiveDate;

    fn skill(category: &str, subcategory: &str) -> SkillEntry {
        SkillEntry {
            category: category.to_string(),
            subcategory: subcategory.to_string(),
            position: "Engineer".to_string(),
            shortdesc: "s".to_string(),
            longdesc: "l".to_string(),
        }
    }

    #[test]
    fn phone_is_grouped_as_area_exchange_line() {
        assert_eq!(
            format_phone("5551234567").expect("ten digits should format"),
            "(555) 123-4567"
        );
        assert_eq!(
            format_phone("555-123-4567").expect("separators should be ignored"),
            "(555) 123-4567"
        );
    }

    #[test]
    fn short_phone_is_invalid() {
        let err = format_phone("12345").expect_err("five digits should be rejected");
        assert!(matches!(err, RenderError::InvalidField { attr: "phone", .. }));
    }

    #[test]
    fn subcategories_are_counted_in_first_seen_order() {
        let skills = vec![
            skill("Tech", "Languages"),
            skill("Tech", "Cloud"),
            skill("Tech", "Languages"),
        ];

        assert_eq!(subcategory_counts(&skills), vec![("Languages", 2), ("Cloud", 1)]);
    }

    #[test]
    fn employers_with_achievements_come_first() {
        let achievements = vec![AchievementEntry {
            employer: 2,
            position: 20,
            shortdesc: String::new(),
            longdesc: String::new(),
        }];
        let start = NaiveDate::from_ymd_opt(2019, 5, 1).expect("valid date");
        let positions = vec![
            PositionEntry {
                employer: 1,
                position: 10,
                startdate: start,
                enddate: None,
            },
            PositionEntry {
                employer: 2,
                position: 20,
                startdate: start,
                enddate: None,
            },
        ];

        assert_eq!(employer_order(&achievements, &positions), vec![2, 1]);
    }
}
