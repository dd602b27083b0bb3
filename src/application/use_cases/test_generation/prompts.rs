pub(crate) const MISSING_DESCRIPTION: &str = "No description provided.";

/// Number of cases requested from the backend per generation.
pub(crate) const REQUESTED_CASES: usize = 3;

pub(crate) fn build_generation_prompt(
    feature_description: &str,
    project_name: &str,
    project_description: Option<&str>,
) -> String {
    let description = project_description
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .unwrap_or(MISSING_DESCRIPTION);

    let mut body = String::new();
    body.push_str(&format!(
        "You are an expert QA engineer. Generate {} comprehensive test cases for the following application and feature:\n\n",
        REQUESTED_CASES
    ));
    body.push_str(&format!("Application Name: {}\n", project_name));
    body.push_str(&format!("Application Description: {}\n\n", description));
    body.push_str(&format!("Feature to test: {}\n\n", feature_description));
    body.push_str(&format!(
        "Return a JSON object with a single key \"testCases\" holding an array of exactly {} objects. Each object has these fields:\n",
        REQUESTED_CASES
    ));
    body.push_str(
        r#"{
  "testCases": [
    {
      "name": "Descriptive test case name",
      "description": "Detailed description of what this test covers",
      "category": "One of: Smoke, Regression, Sanity",
      "steps": ["Step 1", "Step 2", "Step 3"],
      "expectedResult": "What should happen when the test passes",
      "priority": "One of: High, Medium, Low"
    }
  ]
}
"#,
    );
    body.push_str(
        "\nMake sure the test cases are practical, cover different scenarios, and follow mobile app testing best practices.\n",
    );
    body
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embeds_project_and_feature() {
        let prompt = build_generation_prompt("Reset password via email", "Shop", Some("A store"));
        assert!(prompt.starts_with("You are an expert QA engineer."));
        assert!(prompt.contains("Application Name: Shop\n"));
        assert!(prompt.contains("Application Description: A store\n"));
        assert!(prompt.contains("Feature to test: Reset password via email\n"));
    }

    #[test]
    fn falls_back_when_description_is_absent_or_blank() {
        for description in [None, Some(""), Some("   ")] {
            let prompt = build_generation_prompt("x", "Shop", description);
            assert!(prompt.contains("Application Description: No description provided.\n"));
        }
    }

    #[test]
    fn states_the_output_contract() {
        let prompt = build_generation_prompt("x", "Shop", None);
        assert!(prompt.contains("\"testCases\""));
        assert!(prompt.contains("exactly 3 objects"));
        for field in ["name", "description", "category", "steps", "expectedResult", "priority"] {
            assert!(prompt.contains(&format!("\"{}\"", field)), "missing {}", field);
        }
        assert!(prompt.contains("Smoke, Regression, Sanity"));
        assert!(prompt.contains("High, Medium, Low"));
    }

    #[test]
    fn feature_description_is_embedded_verbatim() {
        let feature = "  Checkout with {braces} and \"quotes\"  ";
        let prompt = build_generation_prompt(feature, "Shop", None);
        assert!(prompt.contains(&format!("Feature to test: {}\n", feature)));
    }
}
