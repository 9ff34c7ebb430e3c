//! services/api/src/pipeline/prompt.rs
//!
//! Prompt construction for lecture generation.
//!
//! Centralising the prompt here keeps the contract between the pipeline and
//! the model in one place: the fragment's root element attributes, the title
//! heading, LaTeX transliteration, and the fragment-only output rule. Unit
//! tests inspect the built prompt directly without calling a model.

/// The class every generated fragment's root element must carry; the
/// flat-file backend selects on it when reading lectures back.
pub const FRAGMENT_CLASS: &str = "lecture-content";

const PROMPT_TEMPLATE: &str = r#"You are an expert educator. Analyze the provided {source} and generate a detailed, self-contained HTML div for a lecture.
- The root div must have: id="{lecture_id}", class="{class}", and data-unit="{unit_id}".
- The main title must be in an <h1> tag: <h1>{title}</h1>
- Convert all mathematical notations to LaTeX.
- Structure the content logically with clear headings (h2, h3), paragraphs, and lists.
- Your entire output must be ONLY the HTML div, with no extra text or markdown."#;

/// Builds the generation prompt.
///
/// When `ocr_text` is present (strategy B) it is appended as the lecture
/// source material; otherwise the model is pointed at the attached PDF.
pub fn build_prompt(lecture_id: &str, title: &str, unit_id: &str, ocr_text: Option<&str>) -> String {
    let source = if ocr_text.is_some() {
        "lecture text below"
    } else {
        "PDF"
    };
    let mut prompt = PROMPT_TEMPLATE
        .replace("{source}", source)
        .replace("{lecture_id}", lecture_id)
        .replace("{class}", FRAGMENT_CLASS)
        .replace("{unit_id}", unit_id)
        .replace("{title}", title);

    if let Some(text) = ocr_text {
        prompt.push_str("\n\nLECTURE TEXT:\n---\n");
        prompt.push_str(text);
        prompt.push_str("\n---");
    }
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_carries_fragment_contract() {
        let prompt = build_prompt("limits", "Limits", "unit1", None);
        assert!(prompt.contains(r#"id="limits""#));
        assert!(prompt.contains(r#"class="lecture-content""#));
        assert!(prompt.contains(r#"data-unit="unit1""#));
        assert!(prompt.contains("<h1>Limits</h1>"));
        assert!(prompt.contains("LaTeX"));
        assert!(prompt.contains("ONLY the HTML div"));
    }

    #[test]
    fn inline_strategy_references_the_pdf() {
        let prompt = build_prompt("limits", "Limits", "unit1", None);
        assert!(prompt.contains("provided PDF"));
        assert!(!prompt.contains("LECTURE TEXT:"));
    }

    #[test]
    fn ocr_strategy_embeds_the_extracted_text() {
        let prompt = build_prompt("limits", "Limits", "unit1", Some("page one\npage two"));
        assert!(prompt.contains("LECTURE TEXT:\n---\npage one\npage two\n---"));
        assert!(!prompt.contains("provided PDF"));
    }
}
