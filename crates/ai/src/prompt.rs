//! Outbound prompt construction.
//!
//! The prompt is the first line of defense: the stricter it is about output
//! shape, the more often the normalizer's direct parse succeeds.

use tracing::debug;

const SCRIPT_PLACEHOLDER: &str = "{script}";

/// Instructional-design analysis prompt. `{script}` is replaced with the submission.
pub const BASE_PROMPT: &str = r#"As an experienced script writer and instructional designer, analyze and enhance this script that will be performed by the user's trained AI avatar.
DO NOT add any AI introductions: the avatar is already trained with the user's persona.

Evaluate and improve the script based on these key areas:

1. Engagement & Structure:
   - Hook and attention-grabbing opening
   - Clear learning objectives
   - Logical flow and transitions
   - Effective conclusion and call-to-action
   - Knowledge check points

2. Delivery & Pacing:
   - Natural conversational tone
   - Strategic pauses for emphasis
   - Varied sentence lengths
   - Chunked information
   - Clear transitions between topics

3. Visual Integration:
   - Visual cue markers [VISUAL CUE] for demos/graphics
   - Emphasis points for key concepts
   - Opportunities for on-screen text
   - Visual metaphors and examples
   - Data visualization moments

4. Instructional Design:
   - Progressive complexity
   - Real-world examples
   - Practice opportunities
   - Memory retention techniques
   - Active learning prompts

5. Accessibility & Clarity:
   - Simple language for complex concepts
   - Defined technical terms
   - Consistent terminology
   - Cultural sensitivity
   - Inclusive language

For each improvement made, mark it with [IMPLEMENTED] to track progress.

Script to analyze:
{script}

Respond in JSON format:
{
  "analysis": {
    "technicalTerms": ["term1", "term2", ...],
    "readabilityScore": number (between 8.0 and 10.0),
    "suggestions": ["suggestion1 [IMPLEMENTED]", "suggestion2", ...],
    "overallScore": number (between 8.0 and 10.0),
    "prioritizedImprovements": ["improvement1 [IMPLEMENTED]", "improvement2", ...],
    "sections": {
      "introduction": {
        "score": number,
        "suggestions": ["suggestion1 [IMPLEMENTED]", "suggestion2"],
        "readabilityMetrics": {
          "fleschKincaid": number,
          "wordsPerSentence": number,
          "technicalTerms": ["term1", "term2"]
        },
        "aiEnhancements": "text with [VISUAL CUE] markers"
      }
    }
  },
  "rewrittenScript": {
    "learningObjectives": ["objective1", "objective2", ...],
    "introduction": "text with [VISUAL CUE] markers (no AI introductions)",
    "mainContent": "text with [VISUAL CUE] markers",
    "conclusion": "text with [VISUAL CUE] markers",
    "callToAction": "text with [VISUAL CUE] markers"
  }
}

Ensure each improvement is clearly marked [IMPLEMENTED] when applied in the rewritten script.
The rewritten script should achieve a readability score of at least 8.0 and incorporate all the marked improvements."#;

const ANALYST_PREAMBLE: &str =
    "You are a script analysis assistant. Analyze the script below and answer with a single JSON object.";

const STRICT_PREAMBLE: &str = "You are a script analysis assistant. Your task is to analyze the script and return ONLY a JSON object with no additional text or formatting.

CRITICAL INSTRUCTIONS:
1. Return ONLY a JSON object
2. Do not include any markdown formatting (no ```json or ```)
3. Do not include any explanatory text
4. Ensure the JSON is properly formatted with all required fields
5. Do not include any content outside the JSON structure";

const TECHNICAL_PREAMBLE: &str = "You are a specialized script analysis assistant with expertise in technical content. Your task is to analyze the script and provide a detailed JSON response.

Additional instructions:
1. Focus on technical accuracy and clarity
2. Provide detailed, actionable suggestions
3. Ensure thorough readability analysis
4. Maintain precise JSON formatting
5. Return only the JSON object, no additional text";

const CONCISE_PREAMBLE: &str = "You are a script analysis assistant optimized for quick and efficient analysis. Your task is to analyze the script and return a clean JSON response.

Special instructions:
1. Keep analysis concise but thorough
2. Focus on essential improvements
3. Prioritize clarity in suggestions
4. Maintain strict JSON format
5. No additional text or formatting";

const FORMATTING_DIRECTIVES: &str = r#"IMPORTANT FORMATTING INSTRUCTIONS:
1. Respond ONLY with a valid JSON object
2. Do not include any text, markdown, or explanations outside the JSON
3. All string values must use double quotes
4. Escape any quotes within strings with backslash
5. Follow the exact field names and data types specified
6. Include all required fields
7. Ensure numbers are actual numbers, not strings
8. Arrays must contain elements of the specified type
9. Do not include any comments or extra whitespace
10. Properly escape all special characters in strings (\n, \", etc.)
11. If response would be too long, reduce content length but maintain complete JSON structure

Example response format:
{
  "analysis": {
    "technicalTerms": ["term1", "term2"],
    "readabilityScore": 9.0,
    "suggestions": ["suggestion1"],
    "overallScore": 8.5,
    "prioritizedImprovements": ["improvement1"],
    "sections": {
      "introduction": {
        "score": 8.5,
        "suggestions": ["suggestion1"],
        "readabilityMetrics": {
          "fleschKincaid": 8.0,
          "wordsPerSentence": 15.5,
          "technicalTerms": ["term1"]
        }
      }
    }
  },
  "rewrittenScript": {
    "learningObjectives": ["objective1"],
    "introduction": "Introduction text",
    "mainContent": "Main content text",
    "conclusion": "Conclusion text",
    "callToAction": "Call to action text"
  }
}"#;

/// Model-specific preamble placed before [`BASE_PROMPT`].
pub fn system_prompt_for_model(model: &str) -> &'static str {
    match model {
        "google/gemini-pro" => STRICT_PREAMBLE,
        "deepseek/deepseek-chat" => TECHNICAL_PREAMBLE,
        "meta-llama/llama-3.2-1b-instruct:free" => CONCISE_PREAMBLE,
        _ => ANALYST_PREAMBLE,
    }
}

/// Append the fixed JSON formatting directives to `prompt`.
///
/// Pure string transform; the input is kept verbatim at the start.
pub fn enhance_prompt_for_structured_output(prompt: &str) -> String {
    let mut out = String::with_capacity(prompt.len() + FORMATTING_DIRECTIVES.len() + 2);
    out.push_str(prompt);
    out.push_str("\n\n");
    out.push_str(FORMATTING_DIRECTIVES);
    out
}

/// Full outbound prompt for `script` on `model`.
pub fn build_analysis_prompt(script: &str, model: &str) -> String {
    let body = BASE_PROMPT.replacen(SCRIPT_PLACEHOLDER, script, 1);
    let prompt = format!("{}\n\n{}", system_prompt_for_model(model), body);
    let prompt = enhance_prompt_for_structured_output(&prompt);
    debug!(model, prompt_len = prompt.len(), "built analysis prompt");
    prompt
}
