//! Prompt text for verse-group interpretation.
//!
//! The six numbered section headings requested here are the same strings
//! [`crate::pipeline::interpret::split_sections`] looks for in the reply, so
//! both live in this one module: [`SECTION_HEADERS`] is the contract between
//! prompt and parser.

/// Section headings, exactly as the model is asked to emit them.
pub const SECTION_HEADERS: [&str; 6] = [
    "1. Translation:",
    "2. Vocabulary and Key Terms:",
    "3. Context and Significance:",
    "4. Detailed Interpretation:",
    "5. Ayurvedic Principles and Applications:",
    "6. Conclusion:",
];

const INTERPRETATION_PROMPT: &str = r#"As an expert in Sanskrit, Ayurvedic literature, and academic writing, please provide a comprehensive and consistent analysis of the following Sanskrit verse(s) from the {title}:

{sanskrit}

Please adhere to the following guidelines to ensure consistency and suitability for compilation into a book:

1. Translation:
Provide a clear and accurate English translation of the Sanskrit text. Maintain a consistent style of translation throughout, balancing literalness with readability. Use parentheses for clarifying words not in the original text.

2. Vocabulary and Key Terms:
Identify and explain 3-5 significant or specialized terms used in the verse(s). Focus on Ayurvedic concepts, herbs, or medical practices. Provide the Sanskrit term followed by its English translation and a brief explanation. Maintain consistency in terminology across verses.

3. Context and Significance:
In 2-3 sentences, explain the context of these verse(s) within the {title} and broader Ayurvedic literature. Discuss their importance to Ayurvedic medicine or philosophy, maintaining a consistent perspective on the text's significance.

4. Detailed Interpretation:
Provide a thorough interpretation of the verse(s), consistently addressing:
   a) The main ideas or concepts presented (1-2 paragraphs)
   b) Medical or philosophical principles discussed (1 paragraph)
   c) Practical applications or implications of the information (1 paragraph)
   d) How this information fits into the broader context of Ayurvedic knowledge (1-2 sentences)

5. Ayurvedic Principles and Applications:
In 1-2 paragraphs, discuss how the concepts in these verse(s) relate to core Ayurvedic principles (such as the tridosha theory, panchamahabhutas, or specific diagnostic/treatment methods). Explain their practical applications in traditional Ayurvedic medicine, including any specific treatments, formulations, or diagnostic methods mentioned or implied in the verses.

6. Conclusion:
In 3-4 sentences, summarize the key points and overall significance of these verse(s). Ensure this conclusion could serve as a standalone summary if extracted.

Throughout your analysis:
- Maintain a formal, academic tone suitable for a scholarly publication.
- Use consistent terminology and phrasing for recurring concepts.
- Provide brief Sanskrit citations (in parentheses) for key terms or concepts to maintain connection with the original text.
- Ensure each section flows logically into the next, creating a cohesive narrative.
- Aim for clarity and accessibility while maintaining depth of analysis.

Start each section with its numbered heading on a line of its own, exactly as written above (for example "1. Translation:").

Your response should be detailed yet clear, suitable for readers with varying levels of familiarity with Ayurveda or Sanskrit literature, while still providing valuable insights for more knowledgeable readers.
"#;

/// Build the interpretation prompt for one verse group.
pub fn interpretation_prompt(title: &str, sanskrit: &str) -> String {
    INTERPRETATION_PROMPT
        .replace("{title}", title)
        .replace("{sanskrit}", sanskrit)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_embeds_text_and_title() {
        let p = interpretation_prompt("Charaka Samhita", "सत्यं वचनम्");
        assert!(p.contains("from the Charaka Samhita:\n\nसत्यं वचनम्\n"));
        assert!(!p.contains("{title}"));
        assert!(!p.contains("{sanskrit}"));
    }

    #[test]
    fn prompt_lists_every_section_header() {
        let p = interpretation_prompt("Charaka Samhita", "x");
        for h in SECTION_HEADERS {
            assert!(
                p.lines().any(|l| l.trim() == h),
                "prompt is missing header line {h:?}"
            );
        }
    }
}
