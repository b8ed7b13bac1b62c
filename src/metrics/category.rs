use std::collections::BTreeSet;

use crate::metrics::keywords::KeywordTables;
use crate::projects::Category;

/// Category with the most keyword hits over name, description and
/// technologies. Ties go to the earlier table entry; no hits at all means
/// `Systems`.
pub(crate) fn classify_category(
    name: &str,
    description: &str,
    technologies: &BTreeSet<String>,
    tables: &KeywordTables,
) -> Category {
    let techs: Vec<&str> = technologies.iter().map(String::as_str).collect();
    let text = format!("{name} {description} {}", techs.join(" ")).to_lowercase();

    let mut best: Option<(Category, usize)> = None;
    for (category, keywords) in &tables.categories {
        let score = keywords.iter().filter(|kw| text.contains(kw.as_str())).count();
        if best.is_none_or(|(_, top)| score > top) {
            best = Some((*category, score));
        }
    }

    match best {
        Some((category, score)) if score > 0 => category,
        _ => Category::Systems,
    }
}
