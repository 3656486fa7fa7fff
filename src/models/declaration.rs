use camino::Utf8PathBuf;
use serde::Serialize;
use std::fmt;

/// Kind of a reflected type declaration, determined by its annotation macro.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum DeclarationKind {
    Class,
    Struct,
    Enum,
    Interface,
}

impl DeclarationKind {
    /// Map an annotation macro name to the kind it marks.
    pub fn from_annotation(annotation: &str) -> Option<Self> {
        match annotation {
            "UCLASS" => Some(Self::Class),
            "USTRUCT" => Some(Self::Struct),
            "UENUM" => Some(Self::Enum),
            "UINTERFACE" => Some(Self::Interface),
            _ => None,
        }
    }

    pub fn annotation(self) -> &'static str {
        match self {
            Self::Class => "UCLASS",
            Self::Struct => "USTRUCT",
            Self::Enum => "UENUM",
            Self::Interface => "UINTERFACE",
        }
    }

    /// Whether a C++ keyword can introduce a declaration of this kind.
    ///
    /// Interfaces are declared with `class`; structs may be declared with either
    /// `struct` or `class`.
    pub fn accepts_keyword(self, keyword: &str) -> bool {
        match self {
            Self::Class | Self::Interface => keyword == "class",
            Self::Struct => keyword == "struct" || keyword == "class",
            Self::Enum => keyword == "enum",
        }
    }
}

impl fmt::Display for DeclarationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Class => "class",
            Self::Struct => "struct",
            Self::Enum => "enum",
            Self::Interface => "interface",
        };
        f.write_str(label)
    }
}

/// An annotated type declaration discovered in a source file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypeDeclaration {
    pub kind: DeclarationKind,
    pub name: String,
    pub parent: Option<String>,
    pub specifiers: Vec<String>,
    pub module: String,
    pub file: Utf8PathBuf,
    /// 1-based line of the declaration header
    pub line: u32,
}

impl TypeDeclaration {
    pub fn has_specifier(&self, specifier: &str) -> bool {
        self.specifiers
            .iter()
            .any(|s| s.split('=').next().is_some_and(|key| key.trim().eq_ignore_ascii_case(specifier)))
    }

    pub fn location(&self) -> String {
        format!("{}:{}", self.file, self.line)
    }
}
