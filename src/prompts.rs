//! Prompts for vision-LLM figure description.
//!
//! The default here is used when
//! [`crate::config::VlmDescriberConfig::system_prompt`] is `None`. It asks for
//! the same content the Content Understanding analyzer extracts, so either
//! describer produces captions of the same shape.

/// Default system prompt for describing a cropped figure.
pub const FIGURE_SYSTEM_PROMPT: &str = r#"You describe images extracted from documents so that their content can be indexed and searched.

Follow these rules precisely:

1. SUMMARY
   - Start with a 2-sentence summary of what the image shows

2. DATA
   - If the image is a chart, diagram, or table, include the underlying data
     as a Markdown table with valid syntax and accurate numbers
   - If the image is a chart, describe the axes and legends

3. OUTPUT FORMAT
   - Output ONLY the Markdown description
   - Do NOT wrap in ```markdown fences
   - Do NOT add commentary about the task itself"#;

/// Text of the user turn that carries the image.
pub const FIGURE_USER_PROMPT: &str = "Describe this image.";
