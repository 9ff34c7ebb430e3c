//! services/api/src/adapters/fragments.rs
//!
//! Parser for the flat-file backend's append-only lecture log.
//!
//! Contract: a lecture file is a concatenation of self-contained `<div>`
//! fragments; every fragment's root carries the marker class
//! (`lecture-content`), a lecture id, and a `data-unit` attribute. Reads
//! select on the marker class and group by the unit attribute; anything else
//! in the file (comment markers, whitespace) is ignored.

use lectern_core::domain::LectureSummary;
use scraper::{ElementRef, Html, Selector};

use crate::pipeline::prompt::FRAGMENT_CLASS;

/// One fragment recovered from a lecture file, in file order.
#[derive(Debug, Clone)]
pub struct Fragment {
    pub lecture_id: String,
    pub unit_id: String,
    pub title: String,
    pub html: String,
}

impl Fragment {
    pub fn summary(&self) -> LectureSummary {
        LectureSummary {
            lecture_id: self.lecture_id.clone(),
            title: self.title.clone(),
            unit_id: self.unit_id.clone(),
        }
    }
}

/// Parses every marked fragment out of a lecture file, preserving file order.
///
/// Fragments missing an id or unit attribute are skipped: they cannot be
/// addressed or grouped, so they are invisible to the application.
pub fn parse_fragments(html: &str) -> Vec<Fragment> {
    // Static selectors; parse cannot fail.
    let fragment_sel = Selector::parse(&format!("div.{FRAGMENT_CLASS}")).unwrap();
    let h1_sel = Selector::parse("h1").unwrap();

    let doc = Html::parse_fragment(html);
    doc.select(&fragment_sel)
        .filter_map(|el| fragment_from_element(el, &h1_sel))
        .collect()
}

fn fragment_from_element(el: ElementRef<'_>, h1_sel: &Selector) -> Option<Fragment> {
    let lecture_id = el.value().attr("id")?.to_string();
    let unit_id = el.value().attr("data-unit")?.to_string();

    // The display title lives in the fragment's <h1>; fall back to the id
    // for fragments generated before the heading rule existed.
    let title = el
        .select(h1_sel)
        .next()
        .map(|h| h.text().collect::<String>().trim().to_string())
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| lecture_id.clone());

    Some(Fragment {
        lecture_id,
        unit_id,
        title,
        html: el.html(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const LOG: &str = r#"
<!-- Limits -->
<div id="limits" class="lecture-content" data-unit="unit1"><h1>Limits</h1><p>a</p></div>

<!-- Continuity -->
<div id="continuity" class="lecture-content" data-unit="unit1"><h1>Continuity</h1></div>

<!-- Sets -->
<div id="sets" class="lecture-content" data-unit="unit2"><h1>Sets</h1></div>
"#;

    #[test]
    fn parses_fragments_in_file_order() {
        let frags = parse_fragments(LOG);
        let ids: Vec<_> = frags.iter().map(|f| f.lecture_id.as_str()).collect();
        assert_eq!(ids, vec!["limits", "continuity", "sets"]);
    }

    #[test]
    fn groups_two_under_unit1_and_one_under_unit2() {
        let frags = parse_fragments(LOG);
        assert_eq!(frags.iter().filter(|f| f.unit_id == "unit1").count(), 2);
        assert_eq!(frags.iter().filter(|f| f.unit_id == "unit2").count(), 1);
    }

    #[test]
    fn titles_come_from_the_heading() {
        let frags = parse_fragments(LOG);
        assert_eq!(frags[0].title, "Limits");
    }

    #[test]
    fn unmarked_divs_are_ignored() {
        let html = r#"<div id="x" data-unit="unit1">no marker</div>
<div id="y" class="lecture-content" data-unit="unit1"><h1>Y</h1></div>"#;
        let frags = parse_fragments(html);
        assert_eq!(frags.len(), 1);
        assert_eq!(frags[0].lecture_id, "y");
    }

    #[test]
    fn fragment_html_round_trips_content() {
        let frags = parse_fragments(LOG);
        assert!(frags[0].html.contains(r#"id="limits""#));
        assert!(frags[0].html.contains("<p>a</p>"));
    }
}
