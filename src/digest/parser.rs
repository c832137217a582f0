use crate::error::{Error, Result};
use crate::models::Enrichment;

/// Parses an enrichment reply. Models wrap JSON in prose or code fences
/// often enough that we extract the object before deserializing.
pub fn parse_enrichment(response: &str) -> Result<Enrichment> {
    let json_str = extract_json(response)?;

    serde_json::from_str(&json_str)
        .map_err(|e| Error::ParseError(format!("Failed to parse enrichment response: {}", e)))
}

fn extract_json(text: &str) -> Result<String> {
    // Markdown ```json fence first
    if let Some(start) = text.find("```json") {
        let start = start + 7;
        if let Some(end) = text[start..].find("```") {
            return Ok(text[start..start + end].trim().to_string());
        }
    }

    // Plain code fence
    if let Some(start) = text.find("```") {
        let start = start + 3;
        // Skip a language identifier on the fence line
        let start = text[start..]
            .find('\n')
            .map(|i| start + i + 1)
            .unwrap_or(start);
        if let Some(end) = text[start..].find("```") {
            let content = text[start..start + end].trim();
            if content.starts_with('{') {
                return Ok(content.to_string());
            }
        }
    }

    // Raw JSON object embedded in prose
    if let Some(start) = text.find('{') {
        let mut depth = 0;
        let mut end = start;
        let mut in_string = false;
        let mut escape_next = false;

        for (i, c) in text[start..].char_indices() {
            if escape_next {
                escape_next = false;
                continue;
            }

            match c {
                '\\' if in_string => escape_next = true,
                '"' => in_string = !in_string,
                '{' if !in_string => depth += 1,
                '}' if !in_string => {
                    depth -= 1;
                    if depth == 0 {
                        end = start + i + 1;
                        break;
                    }
                }
                _ => {}
            }
        }

        if depth == 0 && end > start {
            return Ok(text[start..end].to_string());
        }
    }

    Err(Error::ParseError("No valid JSON found in response".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_json_from_a_markdown_fence() {
        let input = r#"Here's the profile summary:
```json
{"summary": "Active developer.", "insights": ["ships often"]}
```
"#;
        let enrichment = parse_enrichment(input).unwrap();
        assert_eq!(enrichment.summary, "Active developer.");
        assert_eq!(enrichment.insights, vec!["ships often"]);
    }

    #[test]
    fn extracts_a_raw_json_object_from_prose() {
        let input = r#"The result is {"summary": "Steady output.", "insights": []}"#;
        let enrichment = parse_enrichment(input).unwrap();
        assert_eq!(enrichment.summary, "Steady output.");
    }

    #[test]
    fn prose_without_json_is_a_parse_error() {
        let err = parse_enrichment("I could not produce an analysis.").unwrap_err();
        assert!(matches!(err, Error::ParseError(_)));
    }
}
