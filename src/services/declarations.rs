//! Reflected type declaration scanning.
//!
//! Source files are scanned line by line by a small state machine:
//!
//! ```text
//! Searching ──UCLASS(──▶ PendingAnnotation ──)──▶ PendingDeclaration ──class X──▶ Searching
//!                              │ (multi-line args)          │ (blank/comment lines skipped)
//!                              └────────── EOF ─────────────┴──other code──▶ warning, Searching
//! ```
//!
//! This is declaration-level recognition only. Annotations are honoured only at
//! file scope: braces opened by `namespace` lines are transparent, any other
//! open brace (class bodies, functions) suppresses recognition. Comments and
//! string literals never affect brace depth.
//!
//! While scanning, every identifier on every line is recorded in a
//! [`ReferenceIndex`] so textual usage queries never re-read files.

use crate::metrics::ScanMetrics;
use crate::models::{DeclarationKind, IssueKind, ModuleDescriptor, ScanIssue, ScanSettings, TypeDeclaration};
use camino::{Utf8Path, Utf8PathBuf};
use regex::Regex;
use std::collections::HashMap;
use std::fs;
use walkdir::WalkDir;

const ANNOTATIONS: [&str; 4] = ["UCLASS", "USTRUCT", "UENUM", "UINTERFACE"];

/// One textual occurrence of an identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reference {
    /// Index into [`SourceScan::files`]
    pub file: usize,
    pub line: u32,
}

/// Identifier -> lines it appears on. Each line is recorded at most once per
/// identifier.
#[derive(Debug, Clone, Default)]
pub struct ReferenceIndex {
    by_identifier: HashMap<String, Vec<Reference>>,
}

impl ReferenceIndex {
    fn record_line(&mut self, file: usize, line: u32, text: &str) {
        let mut seen: Vec<&str> = Vec::new();
        for ident in identifiers(text) {
            if seen.contains(&ident) {
                continue;
            }
            seen.push(ident);
            self.by_identifier
                .entry(ident.to_string())
                .or_default()
                .push(Reference { file, line });
        }
    }

    fn merge(&mut self, other: ReferenceIndex, file_offset: usize) {
        for (ident, refs) in other.by_identifier {
            self.by_identifier.entry(ident).or_default().extend(
                refs.into_iter().map(|r| Reference {
                    file: r.file + file_offset,
                    line: r.line,
                }),
            );
        }
    }

    pub fn lookup(&self, identifier: &str) -> &[Reference] {
        self.by_identifier
            .get(identifier)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn identifier_count(&self) -> usize {
        self.by_identifier.len()
    }
}

/// Split a line into C-style identifiers.
fn identifiers(text: &str) -> impl Iterator<Item = &str> {
    text.split(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .filter(|token| token.starts_with(|c: char| c.is_ascii_alphabetic() || c == '_'))
}

/// Declarations and findings from one or more source files.
#[derive(Debug, Clone, Default)]
pub struct SourceScan {
    /// Scanned files in discovery order
    pub files: Vec<Utf8PathBuf>,
    pub declarations: Vec<TypeDeclaration>,
    pub issues: Vec<ScanIssue>,
    pub references: ReferenceIndex,
}

impl SourceScan {
    pub fn merge(&mut self, other: SourceScan) {
        let offset = self.files.len();
        self.files.extend(other.files);
        self.declarations.extend(other.declarations);
        self.issues.extend(other.issues);
        self.references.merge(other.references, offset);
    }
}

/// Split an annotation parameter list into specifier tokens.
///
/// Commas inside nested parentheses, brackets, braces or string literals do
/// not split. Tokens are trimmed and empty tokens dropped.
///
/// ```ignore
/// let specs = split_specifiers(r#"Blueprintable, meta=(DisplayName="A, B")"#);
/// assert_eq!(specs, vec!["Blueprintable", r#"meta=(DisplayName="A, B")"#]);
/// ```
pub fn split_specifiers(args: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for c in args.chars() {
        if in_string {
            current.push(c);
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }

        match c {
            '"' => {
                in_string = true;
                current.push(c);
            }
            '(' | '[' | '{' => {
                depth += 1;
                current.push(c);
            }
            ')' | ']' | '}' => {
                depth = depth.saturating_sub(1);
                current.push(c);
            }
            ',' if depth == 0 => {
                push_token(&mut tokens, &current);
                current.clear();
            }
            _ => current.push(c),
        }
    }
    push_token(&mut tokens, &current);

    tokens
}

fn push_token(tokens: &mut Vec<String>, raw: &str) {
    let token = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    if !token.is_empty() {
        tokens.push(token);
    }
}

/// Strips comments from lines while tracking block comments across lines.
#[derive(Debug, Default)]
struct LineLexer {
    in_block_comment: bool,
}

impl LineLexer {
    /// Return the line with `//` and `/* */` comments removed. String and
    /// character literals are kept verbatim.
    fn strip_comments(&mut self, line: &str) -> String {
        let mut out = String::with_capacity(line.len());
        let mut chars = line.chars().peekable();
        let mut quote: Option<char> = None;

        while let Some(c) = chars.next() {
            if self.in_block_comment {
                if c == '*' && chars.peek() == Some(&'/') {
                    chars.next();
                    self.in_block_comment = false;
                    out.push(' ');
                }
                continue;
            }

            if let Some(q) = quote {
                out.push(c);
                if c == '\\' {
                    if let Some(next) = chars.next() {
                        out.push(next);
                    }
                } else if c == q {
                    quote = None;
                }
                continue;
            }

            match c {
                '"' | '\'' => {
                    quote = Some(c);
                    out.push(c);
                }
                '/' if chars.peek() == Some(&'/') => break,
                '/' if chars.peek() == Some(&'*') => {
                    chars.next();
                    self.in_block_comment = true;
                }
                _ => out.push(c),
            }
        }

        out
    }
}

/// Count braces outside string and character literals.
fn brace_events(code: &str) -> Vec<char> {
    let mut events = Vec::new();
    let mut chars = code.chars();
    let mut quote: Option<char> = None;

    while let Some(c) = chars.next() {
        if let Some(q) = quote {
            if c == '\\' {
                chars.next();
            } else if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '"' | '\'' => quote = Some(c),
            '{' | '}' => events.push(c),
            _ => {}
        }
    }

    events
}

/// Brace nesting with namespace blocks treated as transparent.
#[derive(Debug, Default)]
struct ScopeTracker {
    /// One entry per open brace; `true` for namespace braces
    stack: Vec<bool>,
    namespace_pending: bool,
}

impl ScopeTracker {
    fn at_file_scope(&self) -> bool {
        self.stack.iter().all(|transparent| *transparent)
    }

    fn depth(&self) -> usize {
        self.stack.len()
    }

    fn apply(&mut self, code: &str) {
        let trimmed = code.trim_start();
        if trimmed.starts_with("namespace") || trimmed.starts_with("extern \"C\"") {
            self.namespace_pending = true;
        }

        for brace in brace_events(code) {
            if brace == '{' {
                let transparent = std::mem::take(&mut self.namespace_pending);
                self.stack.push(transparent);
            } else {
                self.stack.pop();
            }
        }

        // `namespace Foo;`-style lines never open a block
        if trimmed.ends_with(';') {
            self.namespace_pending = false;
        }
    }
}

/// Scanner state between lines.
#[derive(Debug)]
enum ScanState {
    Searching,
    PendingAnnotation {
        kind: DeclarationKind,
        line: u32,
        args: String,
        depth: usize,
    },
    PendingDeclaration {
        kind: DeclarationKind,
        line: u32,
        specifiers: Vec<String>,
    },
    /// Header seen without a base list; the next line may carry `: public Base`
    PendingParent {
        declaration: usize,
    },
}

/// Scans module directories for annotated declarations.
pub struct DeclarationScanner {
    settings: ScanSettings,

    /// Matches declaration headers such as
    /// `class GAME_API AHero final : public ACharacter` or `enum class EMode : uint8`
    header_pattern: Regex,

    /// Matches an inheritance list wrapped onto its own line, `: public ACharacter`
    parent_pattern: Regex,
}

impl DeclarationScanner {
    pub fn new(settings: ScanSettings) -> Self {
        Self {
            settings,
            header_pattern: Regex::new(
                r"^(?:template\s*<[^>]*>\s*)?(class|struct|enum|namespace)\s+(?:class\s+|struct\s+)?(?:[A-Z][A-Z0-9_]*_API\s+)?([A-Za-z_]\w*)\s*(?:final\b\s*)?(?::\s*(?:(?:public|protected|private|virtual)\s+)*(:{0,2}[A-Za-z_][\w:]*))?",
            )
            .expect("Invalid declaration header regex"),
            parent_pattern: Regex::new(r"^:\s*(?:(?:public|protected|private|virtual)\s+)*(:{0,2}[A-Za-z_][\w:]*)")
                .expect("Invalid inheritance list regex"),
        }
    }

    /// Scan every module in order and merge the results.
    pub fn scan_modules(&self, modules: &[ModuleDescriptor], metrics: &ScanMetrics) -> SourceScan {
        let mut scan = SourceScan::default();
        for module in modules {
            scan.merge(self.scan_module(module, metrics));
        }

        tracing::info!(
            "Declaration scan: {} file(s), {} declaration(s), {} issue(s)",
            scan.files.len(),
            scan.declarations.len(),
            scan.issues.len()
        );
        scan
    }

    /// Recursively scan one module directory. Files are visited in path order.
    pub fn scan_module(&self, module: &ModuleDescriptor, metrics: &ScanMetrics) -> SourceScan {
        let mut scan = SourceScan::default();

        if !module.path.is_dir() {
            tracing::warn!("Module {} directory missing: {}", module.name, module.path);
            scan.issues.push(ScanIssue::at(
                IssueKind::ModuleDirectoryMissing,
                &module.path,
                format!("source directory for module '{}' does not exist", module.name),
            ));
            return scan;
        }

        for entry in WalkDir::new(&module.path).sort_by_file_name() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    let path = e
                        .path()
                        .map(|p| p.display().to_string())
                        .unwrap_or_else(|| module.path.to_string());
                    tracing::warn!("Cannot walk {}: {}", path, e);
                    scan.issues.push(ScanIssue::at(IssueKind::UnreadableFile, path, e.to_string()));
                    metrics.record_file_skipped();
                    continue;
                }
            };

            if !entry.file_type().is_file() {
                continue;
            }

            let path = match Utf8PathBuf::from_path_buf(entry.into_path()) {
                Ok(path) => path,
                Err(path) => {
                    scan.issues.push(ScanIssue::at(
                        IssueKind::UnreadableFile,
                        path.display().to_string(),
                        "path is not valid UTF-8",
                    ));
                    metrics.record_file_skipped();
                    continue;
                }
            };

            let is_source = path
                .extension()
                .is_some_and(|ext| self.settings.is_source_extension(ext));
            if !is_source {
                continue;
            }

            let Some(text) = self.read_source(&path, &mut scan.issues) else {
                metrics.record_file_skipped();
                continue;
            };

            let file_id = scan.files.len();
            let before = scan.declarations.len();
            self.scan_text(&text, &path, &module.name, file_id, &mut scan);
            scan.files.push(path);

            metrics.record_file_scanned();
            metrics.record_declarations(scan.declarations.len() - before);
        }

        tracing::debug!(
            "Module {}: {} file(s), {} declaration(s)",
            module.name,
            scan.files.len(),
            scan.declarations.len()
        );
        scan
    }

    /// Read a source file, recording a warning and returning `None` if it is
    /// oversized, unreadable or not UTF-8.
    fn read_source(&self, path: &Utf8Path, issues: &mut Vec<ScanIssue>) -> Option<String> {
        let size = match fs::metadata(path) {
            Ok(meta) => meta.len(),
            Err(e) => {
                tracing::warn!("Cannot stat {}: {}", path, e);
                issues.push(ScanIssue::at(IssueKind::UnreadableFile, path, e.to_string()));
                return None;
            }
        };

        if size > self.settings.max_source_file_bytes {
            tracing::warn!(
                "Skipping {} ({} bytes exceeds limit of {})",
                path,
                size,
                self.settings.max_source_file_bytes
            );
            issues.push(ScanIssue::at(
                IssueKind::OversizedFile,
                path,
                format!("{} bytes exceeds limit of {}", size, self.settings.max_source_file_bytes),
            ));
            return None;
        }

        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!("Cannot read {}: {}", path, e);
                issues.push(ScanIssue::at(IssueKind::UnreadableFile, path, e.to_string()));
                return None;
            }
        };

        match String::from_utf8(bytes) {
            Ok(mut text) => {
                if text.starts_with('\u{feff}') {
                    text.replace_range(..'\u{feff}'.len_utf8(), "");
                }
                Some(text)
            }
            Err(_) => {
                tracing::warn!("Skipping {}: not valid UTF-8 text", path);
                issues.push(ScanIssue::at(IssueKind::UnreadableFile, path, "not valid UTF-8 text"));
                None
            }
        }
    }

    /// Scan in-memory source text as if it were the file at `path`.
    pub fn scan_source(&self, text: &str, path: &Utf8Path, module: &str) -> SourceScan {
        let mut scan = SourceScan::default();
        self.scan_text(text, path, module, 0, &mut scan);
        scan.files.push(path.to_path_buf());
        scan
    }

    fn scan_text(&self, text: &str, path: &Utf8Path, module: &str, file_id: usize, scan: &mut SourceScan) {
        let mut lexer = LineLexer::default();
        let mut scopes = ScopeTracker::default();
        let mut state = ScanState::Searching;

        for (index, raw_line) in text.lines().enumerate() {
            let line_no = u32::try_from(index + 1).unwrap_or(u32::MAX);
            scan.references.record_line(file_id, line_no, raw_line);

            let code = lexer.strip_comments(raw_line);
            state = self.step(state, code.trim(), line_no, &scopes, path, module, scan);
            scopes.apply(&code);
        }

        match state {
            ScanState::Searching | ScanState::PendingParent { .. } => {}
            ScanState::PendingAnnotation { kind, line, .. } => {
                self.unterminated(kind, line, path, "parameter list is never closed", scan);
            }
            ScanState::PendingDeclaration { kind, line, .. } => {
                self.unterminated(kind, line, path, "file ends before the declaration", scan);
            }
        }
    }

    /// Advance the state machine by one (comment-stripped, trimmed) line.
    #[allow(clippy::too_many_arguments)]
    fn step(
        &self,
        state: ScanState,
        code: &str,
        line_no: u32,
        scopes: &ScopeTracker,
        path: &Utf8Path,
        module: &str,
        scan: &mut SourceScan,
    ) -> ScanState {
        match state {
            ScanState::Searching => match match_annotation(code) {
                Some((kind, rest)) if scopes.at_file_scope() => {
                    let pending = ScanState::PendingAnnotation {
                        kind,
                        line: line_no,
                        args: String::new(),
                        depth: 0,
                    };
                    self.step(pending, rest, line_no, scopes, path, module, scan)
                }
                Some((kind, _)) => {
                    tracing::trace!(
                        "Ignoring nested {} at {}:{} (depth {})",
                        kind.annotation(),
                        path,
                        line_no,
                        scopes.depth()
                    );
                    ScanState::Searching
                }
                None => ScanState::Searching,
            },

            ScanState::PendingAnnotation {
                kind,
                line,
                mut args,
                mut depth,
            } => match accumulate_args(&mut args, &mut depth, code) {
                Some(rest) => {
                    let pending = ScanState::PendingDeclaration {
                        kind,
                        line,
                        specifiers: split_specifiers(&args),
                    };
                    if rest.trim().is_empty() {
                        pending
                    } else {
                        self.step(pending, rest.trim(), line_no, scopes, path, module, scan)
                    }
                }
                None => {
                    args.push(' ');
                    ScanState::PendingAnnotation { kind, line, args, depth }
                }
            },

            ScanState::PendingDeclaration { kind, line, specifiers } => {
                if code.is_empty() {
                    return ScanState::PendingDeclaration { kind, line, specifiers };
                }

                if let Some(caps) = self.header_pattern.captures(code) {
                    let keyword = &caps[1];
                    if !kind.accepts_keyword(keyword) && !(kind == DeclarationKind::Enum && keyword == "namespace") {
                        tracing::debug!(
                            "{} at {}:{} is followed by a `{}` declaration",
                            kind.annotation(),
                            path,
                            line_no,
                            keyword
                        );
                    }

                    let parent = match kind {
                        DeclarationKind::Enum => None,
                        _ => caps.get(3).map(|m| m.as_str().trim_start_matches("::").to_string()),
                    };
                    let open_header = parent.is_none()
                        && kind != DeclarationKind::Enum
                        && !code.contains([':', '{', ';']);

                    scan.declarations.push(TypeDeclaration {
                        kind,
                        name: caps[2].to_string(),
                        parent,
                        specifiers,
                        module: module.to_string(),
                        file: path.to_path_buf(),
                        line: line_no,
                    });

                    if open_header {
                        return ScanState::PendingParent {
                            declaration: scan.declarations.len() - 1,
                        };
                    }
                    return ScanState::Searching;
                }

                self.unterminated(kind, line, path, "not followed by a type declaration", scan);
                // The interrupting line may itself open a new annotation
                self.step(ScanState::Searching, code, line_no, scopes, path, module, scan)
            }

            ScanState::PendingParent { declaration } => {
                if code.is_empty() {
                    return ScanState::PendingParent { declaration };
                }

                match self.parent_pattern.captures(code) {
                    Some(caps) => {
                        scan.declarations[declaration].parent =
                            Some(caps[1].trim_start_matches("::").to_string());
                        ScanState::Searching
                    }
                    None => self.step(ScanState::Searching, code, line_no, scopes, path, module, scan),
                }
            }
        }
    }

    fn unterminated(&self, kind: DeclarationKind, line: u32, path: &Utf8Path, reason: &str, scan: &mut SourceScan) {
        tracing::warn!("Dropping {} at {}:{}: {}", kind.annotation(), path, line, reason);
        scan.issues.push(
            ScanIssue::at(
                IssueKind::UnterminatedAnnotation,
                path,
                format!("{} {}", kind.annotation(), reason),
            )
            .with_line(line),
        );
    }
}

/// If `code` starts with a recognised annotation macro followed by `(`,
/// return its kind and the text from the `(` onward.
fn match_annotation(code: &str) -> Option<(DeclarationKind, &str)> {
    ANNOTATIONS.iter().find_map(|macro_name| {
        let rest = code.strip_prefix(macro_name)?.trim_start();
        if rest.starts_with('(') {
            DeclarationKind::from_annotation(macro_name).map(|kind| (kind, rest))
        } else {
            None
        }
    })
}

/// Feed annotation text into `args`, tracking paren depth.
///
/// Returns the text after the closing `)` once the list is balanced, or `None`
/// if more lines are needed. The outer parentheses are not copied.
fn accumulate_args<'a>(args: &mut String, depth: &mut usize, text: &'a str) -> Option<&'a str> {
    let mut in_string = false;
    let mut escaped = false;

    for (i, c) in text.char_indices() {
        if in_string {
            args.push(c);
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }

        match c {
            '(' => {
                if *depth > 0 {
                    args.push(c);
                }
                *depth += 1;
            }
            ')' => {
                *depth = depth.saturating_sub(1);
                if *depth == 0 {
                    return Some(&text[i + 1..]);
                }
                args.push(c);
            }
            '"' => {
                in_string = true;
                args.push(c);
            }
            _ if *depth > 0 => args.push(c),
            _ => {}
        }
    }

    None
}
