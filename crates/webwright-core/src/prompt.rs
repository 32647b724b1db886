//! Fixed prompt material: the system instruction, the response schema, and the
//! user-facing strings the controller emits.

use serde_json::{json, Value};

pub const SYSTEM_INSTRUCTION: &str = "\
You are Webwright, an expert frontend engineer and UI/UX designer.
You build complete single-file HTML websites from the user's description.

RULES:
1. Always load Tailwind CSS from its CDN: <script src=\"https://cdn.tailwindcss.com\"></script>
2. Produce modern, attractive, responsive designs.
3. When the page needs images, use placeholders such as 'https://picsum.photos/seed/{seed}/800/600'.
4. When the page needs icons, load FontAwesome from its CDN: <link rel=\"stylesheet\" href=\"https://cdnjs.cloudflare.com/ajax/libs/font-awesome/6.4.0/css/all.min.css\">.
5. Return the FULL HTML document every time, never a partial snippet or a diff.
6. The document must be self-contained and run immediately inside an iframe.
7. Keep contrast and accessibility high.
";

/// Shown in the transcript for every failed generation, whatever the cause.
pub const GENERATION_ERROR_NOTICE: &str =
    "I encountered an error generating the website. Please try again or rephrase your request.";

pub const RESET_CONFIRM_PROMPT: &str =
    "Are you sure you want to start over? This will clear the chat and the current design.";

pub const EMPTY_TRANSCRIPT_HINT: &str =
    "History is empty. Start by describing what you want to build.";

pub const INPUT_PLACEHOLDER: &str = "Describe the website you want to build...";

/// Structured output schema in the generation service's schema dialect.
pub fn response_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "html": {
                "type": "STRING",
                "description": "The complete, valid HTML5 document for the requested website, including all Tailwind CSS classes and the CDN links it needs."
            },
            "message": {
                "type": "STRING",
                "description": "A short, friendly message explaining what was built or changed."
            }
        },
        "required": ["html", "message"]
    })
}

/// Document shown before the first generation and restored on reset.
pub const PLACEHOLDER_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Welcome</title>
    <script src="https://cdn.tailwindcss.com"></script>
</head>
<body class="bg-gray-50 flex items-center justify-center min-h-screen">
    <div class="text-center p-8 bg-white rounded-2xl shadow-xl max-w-md mx-4">
        <div class="mb-6 text-blue-500 flex justify-center">
            <svg xmlns="http://www.w3.org/2000/svg" width="64" height="64" viewBox="0 0 24 24" fill="none" stroke="currentColor" stroke-width="2" stroke-linecap="round" stroke-linejoin="round"><path d="M12 2L2 7l10 5 10-5-10-5z"/><path d="m2 17 10 5 10-5"/><path d="m2 12 10 5 10-5"/></svg>
        </div>
        <h1 class="text-3xl font-bold text-gray-900 mb-2">Webwright</h1>
        <p class="text-gray-600 mb-6">Describe your dream website in the chat, and it will be built for you instantly with Tailwind CSS.</p>
        <div class="inline-flex items-center gap-2 px-4 py-2 bg-blue-50 text-blue-700 rounded-full text-sm font-medium">
            <span class="w-2 h-2 bg-blue-500 rounded-full animate-pulse"></span>
            Ready to create
        </div>
    </div>
</body>
</html>"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_requires_both_fields() {
        let schema = response_schema();
        let required: Vec<&str> = schema["required"]
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_str().unwrap())
            .collect();
        assert_eq!(required, vec!["html", "message"]);
        assert_eq!(schema["properties"]["html"]["type"], "STRING");
        assert_eq!(schema["properties"]["message"]["type"], "STRING");
    }

    #[test]
    fn test_placeholder_is_full_document() {
        assert!(PLACEHOLDER_HTML.starts_with("<!DOCTYPE html>"));
        assert!(PLACEHOLDER_HTML.trim_end().ends_with("</html>"));
    }

    #[test]
    fn test_system_instruction_mentions_cdns() {
        assert!(SYSTEM_INSTRUCTION.contains("cdn.tailwindcss.com"));
        assert!(SYSTEM_INSTRUCTION.contains("picsum.photos"));
        assert!(SYSTEM_INSTRUCTION.contains("font-awesome"));
    }
}
