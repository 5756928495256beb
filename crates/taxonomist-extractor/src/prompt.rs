//! LLM prompt engineering for taxonomy extraction

use taxonomist_domain::LEVEL_KEYS;

/// Builds the classification prompt for one chunk
pub struct PromptBuilder<'a> {
    text: &'a str,
    domain: &'a str,
}

impl<'a> PromptBuilder<'a> {
    /// Create a prompt builder for a chunk of patent text
    pub fn new(text: &'a str) -> Self {
        Self {
            text,
            domain: "patent",
        }
    }

    /// Name a different kind of document in the instructions
    pub fn with_domain(mut self, domain: &'a str) -> Self {
        self.domain = domain;
        self
    }

    /// Build the complete extraction prompt
    pub fn build(&self) -> String {
        let mut prompt = String::new();

        // 1. Role and size expectations
        prompt.push_str(&ROLE_INSTRUCTIONS.replace("{domain}", self.domain));
        prompt.push_str("\n\n");

        // 2. Required keys, in order
        prompt.push_str(
            "Each item in the JSON array must contain the following keys in this exact order:\n",
        );
        for key in LEVEL_KEYS.iter().chain(std::iter::once(&"Comment")) {
            prompt.push_str(&format!("- \"{}\"\n", key));
        }
        prompt.push('\n');

        // 3. Level semantics, comment format and output rules
        prompt.push_str(&FORMAT_INSTRUCTIONS.replace("{domain}", self.domain));

        // 4. The chunk itself
        prompt.push_str(&format!(
            "\n\nAnalyze this {} text chunk and extract structured taxonomy in JSON:\n",
            self.domain
        ));
        prompt.push_str(self.text);

        prompt
    }
}

const ROLE_INSTRUCTIONS: &str = r#"You are a {domain} analysis assistant. Your task is to extract a structured taxonomy from {domain} text and return it in valid JSON format. There should be approximately 100 steps in the taxonomy.

There should be at least three entries at each level, including Level 1."#;

const FORMAT_INSTRUCTIONS: &str = r#"### Instructions:

1. The taxonomy should be hierarchical:
   - Level 1: Broad domain (e.g., Materials, Processes, Applications)
   - Level 2: High-level category (e.g., 1. Composite Substrates)
   - Level 3: Subcategory or classification (e.g., 1.1. By Function)
   - Level 4: Specific technical feature (e.g., 1.1.1. Thermal Regulation)
   - Level 5: Further refinement (e.g., 1.1.1.1. Phase Change Materials)
   - Level 6: Implementation detail (e.g., 1.1.1.1.1. Encapsulation Techniques)
   - Level 7: Variant or embodiment (e.g., 1.1.1.1.1.1. Microencapsulation using Urea-Formaldehyde)

2. All levels must be present in each JSON item.
   - If a level does not apply, use `null`.

3. The "Comment" field should include:
   - A technical explanation from the {domain}
   - Interested parties (e.g., inventors, assignees, competitors)
   - Any cited prior art (e.g., other patents, academic papers)

Format the comment like this:
"Comment: [Technical summary]. Related Art: [References]. Interested Parties: [Stakeholders]."

4. Output must be a valid JSON array only. No markdown, no extra commentary.

5. Extract ALL information from the {domain}. The larger and deeper the taxonomy is, the better it is."#;
