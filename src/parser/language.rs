//! Supported teaching languages and their lexical rules

use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A language tag the tracer knows how to read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Python,
    Java,
    Cpp,
}

/// Returned when a language tag or file extension is not recognized
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unsupported language '{0}' (expected python, java, or cpp)")]
pub struct UnknownLanguage(pub String);

impl Language {
    pub const ALL: [Language; 3] = [Language::Python, Language::Java, Language::Cpp];

    /// Guess the language from a file extension (without the dot)
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "py" => Some(Language::Python),
            "java" => Some(Language::Java),
            "cpp" | "cc" | "cxx" | "hpp" => Some(Language::Cpp),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Language::Python => "python",
            Language::Java => "java",
            Language::Cpp => "cpp",
        }
    }

    /// Java and C++ delimit blocks with braces; Python uses indentation
    pub fn is_brace_family(self) -> bool {
        !matches!(self, Language::Python)
    }

    /// Marker that starts a full-line comment
    pub fn line_comment(self) -> &'static str {
        match self {
            Language::Python => "#",
            Language::Java | Language::Cpp => "//",
        }
    }

    /// Whether `word` is a keyword that can never start an assignment target or call
    pub fn is_keyword(self, word: &str) -> bool {
        const SHARED: &[&str] = &["if", "else", "while", "for", "return", "break", "continue"];
        if SHARED.contains(&word) {
            return true;
        }
        match self {
            Language::Python => matches!(
                word,
                "def" | "elif" | "class" | "import" | "from" | "try" | "except" | "finally"
                    | "with" | "pass" | "lambda" | "global" | "nonlocal" | "assert" | "del"
                    | "raise" | "yield"
            ),
            Language::Java | Language::Cpp => matches!(
                word,
                "do" | "switch" | "case" | "default" | "class" | "struct" | "namespace"
                    | "using" | "try" | "catch" | "finally" | "throw" | "import" | "package"
                    | "template" | "typedef" | "goto"
            ),
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Language {
    type Err = UnknownLanguage;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "python" | "py" => Ok(Language::Python),
            "java" => Ok(Language::Java),
            "cpp" | "c++" | "cxx" | "cc" => Ok(Language::Cpp),
            other => Err(UnknownLanguage(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tags() {
        assert_eq!("Python".parse::<Language>(), Ok(Language::Python));
        assert_eq!("c++".parse::<Language>(), Ok(Language::Cpp));
        assert_eq!("java".parse::<Language>(), Ok(Language::Java));
        assert!("cobol".parse::<Language>().is_err());
    }

    #[test]
    fn test_extensions() {
        assert_eq!(Language::from_extension("py"), Some(Language::Python));
        assert_eq!(Language::from_extension("CC"), Some(Language::Cpp));
        assert_eq!(Language::from_extension("txt"), None);
    }
}
