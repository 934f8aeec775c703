/// Language identifier for a file, chosen by extension. Unknown or missing
/// extensions give `plaintext`.
pub fn detect_language(file_name: &str) -> &'static str {
    let base = crate::path::base_name(file_name).unwrap_or(file_name);
    let Some((_, extension)) = base.rsplit_once('.') else {
        return "plaintext";
    };
    match extension.to_ascii_lowercase().as_str() {
        "ts" | "tsx" => "typescript",
        "js" | "jsx" => "javascript",
        "json" => "json",
        "md" => "markdown",
        "py" => "python",
        "rs" => "rust",
        "go" => "go",
        "java" => "java",
        "kt" => "kotlin",
        "cpp" | "cc" | "cxx" => "cpp",
        "c" | "h" => "c",
        "cs" => "csharp",
        "php" => "php",
        "rb" => "ruby",
        "swift" => "swift",
        "sql" => "sql",
        "css" => "css",
        "scss" => "scss",
        "html" => "html",
        "xml" => "xml",
        "yaml" | "yml" => "yaml",
        "sh" | "bash" => "shell",
        "ps1" => "powershell",
        _ => "plaintext",
    }
}
