// Prompt templates for report generation
//
// Prompts are versioned so a generated report can be traced back to the
// instruction that produced it.

use std::collections::HashMap;

/// Prompt template structure
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    pub name: String,
    pub version: String,
    /// Chat role the rendered text is sent under
    pub role: String,
    pub template: String,
}

impl PromptTemplate {
    /// Render the template, replacing every `{{key}}` with its value
    ///
    /// Placeholders without a value are left untouched. Substituted values
    /// are not scanned again.
    pub fn render(&self, variables: &HashMap<String, String>) -> String {
        let mut out = String::with_capacity(self.template.len());
        let mut rest = self.template.as_str();

        while let Some(start) = rest.find("{{") {
            out.push_str(&rest[..start]);
            let after = &rest[start + 2..];
            let Some(end) = after.find("}}") else {
                rest = &rest[start..];
                break;
            };

            match variables.get(&after[..end]) {
                Some(value) => out.push_str(value),
                None => out.push_str(&rest[start..start + 2 + end + 2]),
            }
            rest = &after[end + 2..];
        }

        out.push_str(rest);
        out
    }
}

pub mod library {
    use super::PromptTemplate;

    /// Instruction embedding the serialized incident summary as `{{summary}}`
    pub fn city_report() -> PromptTemplate {
        PromptTemplate {
            name: "city_report".to_string(),
            version: "1.0.0".to_string(),
            role: "system".to_string(),
            template: "You are an assistant that helps generate city analysis reports. \
                       Here's the data: {{summary}}"
                .to_string(),
        }
    }
}
