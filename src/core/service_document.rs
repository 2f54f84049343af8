//! # Service Document
//!
//! A small parse tree over a `services.php` file. The file is read as lines; the four
//! known sections are lifted into [`SectionBlock`]s holding one [`Entry`] per
//! `'<id>' => function` definition, and every other line is kept verbatim.
//!
//! Parsing is a two-state machine: `Outside` a section, or `InSection(kind, indent)`.
//! A section opens on `'<name>' => [` (or `array(`) and closes on a `]`/`)` line at the
//! same indentation as its opening line. Definitions are recognised only at the depth
//! of the first one in the section; deeper ones belong to the body they sit in.
//! Generator-token comments found inside a
//! section are dropped on parse and re-emitted once, at the end, on render.

use crate::models::SectionKind;
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref SECTION_OPEN_RE: Regex =
        Regex::new(r"^(\s*)'(services|models|factories|resources)'\s*=>\s*(?:\[|array\s*\()\s*$")
            .expect("section regex is valid");
    static ref SECTION_CLOSE_RE: Regex =
        Regex::new(r"^([ \t]*)[\])]\s*[,;]?\s*$").expect("close regex is valid");
    static ref ENTRY_RE: Regex =
        Regex::new(r"^(\s*)'([^']*)'\s*=>\s*function").expect("entry regex is valid");
    static ref GENERATOR_RE: Regex =
        Regex::new(r"^\s*// GENERATOR\[[^\]]*\]").expect("generator regex is valid");
}

/// One definition inside a section. `id` is `None` for lines that precede the
/// first definition (comments, blank lines).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub id: Option<String>,
    pub lines: Vec<String>,
}

/// The body of one of the four known sections, without its opening and closing
/// lines (those stay in the surrounding [`Node::Line`]s).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionBlock {
    pub kind: SectionKind,
    pub entries: Vec<Entry>,
    current: Option<usize>,
}

impl SectionBlock {
    fn new(kind: SectionKind) -> Self {
        Self {
            kind,
            entries: Vec::new(),
            current: None,
        }
    }

    /// Starts (or, for a repeated identifier, resumes) the entry keyed by `id`.
    fn start_entry(&mut self, id: &str, line: &str) {
        let position = match self.position_of(Some(id)) {
            Some(pos) => {
                log::warn!(
                    "Identifier '{}' appears more than once in the '{}' section; merging the definitions.",
                    id,
                    self.kind
                );
                pos
            }
            None => {
                self.entries.push(Entry {
                    id: Some(id.to_string()),
                    lines: Vec::new(),
                });
                self.entries.len() - 1
            }
        };
        self.current = Some(position);
        self.push_line(line);
    }

    fn push_line(&mut self, line: &str) {
        let position = match self.current {
            Some(pos) => pos,
            None => self.position_of(None).unwrap_or_else(|| {
                self.entries.push(Entry {
                    id: None,
                    lines: Vec::new(),
                });
                self.entries.len() - 1
            }),
        };
        if let Some(entry) = self.entries.get_mut(position) {
            entry.lines.push(line.to_string());
        }
    }

    fn position_of(&self, id: Option<&str>) -> Option<usize> {
        self.entries.iter().position(|e| e.id.as_deref() == id)
    }

    /// Sorts entries by identifier. The sort is stable and the anonymous entry
    /// always comes first.
    pub fn sort(&mut self) {
        self.entries.sort_by(|a, b| a.id.cmp(&b.id));
        self.current = None;
    }

    /// Identifiers defined in this section, in their current order.
    pub fn identifiers(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().filter_map(|e| e.id.as_deref())
    }
}

/// A top-level piece of the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Line(String),
    Section(SectionBlock),
}

enum ParseState {
    Outside,
    InSection {
        block: SectionBlock,
        indent: String,
        entry_indent: Option<String>,
    },
}

/// The parsed `services.php` file.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ServiceDocument {
    pub nodes: Vec<Node>,
}

impl ServiceDocument {
    pub fn parse(source: &str) -> Self {
        let mut nodes = Vec::new();
        let mut state = ParseState::Outside;

        for line in source.split_inclusive('\n') {
            state = match state {
                ParseState::Outside => {
                    nodes.push(Node::Line(line.to_string()));
                    match open_section(line) {
                        Some((kind, indent)) => ParseState::InSection {
                            block: SectionBlock::new(kind),
                            indent,
                            entry_indent: None,
                        },
                        None => ParseState::Outside,
                    }
                }
                ParseState::InSection {
                    mut block,
                    indent,
                    mut entry_indent,
                } => {
                    if closes_section(line, &indent) {
                        nodes.push(Node::Section(block));
                        nodes.push(Node::Line(line.to_string()));
                        ParseState::Outside
                    } else {
                        if GENERATOR_RE.is_match(line) {
                            // Re-emitted once at the end of the section.
                        } else if let Some((depth, id)) = entry_identifier(line) {
                            let expected = entry_indent.get_or_insert_with(|| depth.to_string());
                            if depth == expected.as_str() {
                                block.start_entry(id, line);
                            } else {
                                block.push_line(line);
                            }
                        } else {
                            block.push_line(line);
                        }
                        ParseState::InSection {
                            block,
                            indent,
                            entry_indent,
                        }
                    }
                }
            };
        }

        if let ParseState::InSection { block, .. } = state {
            log::warn!(
                "The '{}' section is never closed; treating the end of the file as its end.",
                block.kind
            );
            nodes.push(Node::Section(block));
        }

        Self { nodes }
    }

    /// Sorts every section in place.
    pub fn normalize(&mut self) {
        for node in &mut self.nodes {
            if let Node::Section(block) = node {
                block.sort();
            }
        }
    }

    pub fn sections(&self) -> impl Iterator<Item = &SectionBlock> {
        self.nodes.iter().filter_map(|node| match node {
            Node::Section(block) => Some(block),
            Node::Line(_) => None,
        })
    }

    /// Whether `id` is already defined in any section of the given kind.
    pub fn contains(&self, kind: SectionKind, id: &str) -> bool {
        self.sections()
            .filter(|block| block.kind == kind)
            .any(|block| block.identifiers().any(|existing| existing == id))
    }

    /// Writes the document back out. Each section is followed by exactly one
    /// generator-token line indented with `token_indent` spaces.
    pub fn render(&self, token_indent: usize) -> String {
        let mut out = String::new();
        for node in &self.nodes {
            match node {
                Node::Line(line) => out.push_str(line),
                Node::Section(block) => {
                    for entry in &block.entries {
                        for line in &entry.lines {
                            out.push_str(line);
                        }
                    }
                    out.push_str(&generator_line(block.kind.token(), token_indent));
                }
            }
        }
        out
    }
}

/// Formats a `// GENERATOR[<token>]` line.
pub fn generator_line(token: &str, indent: usize) -> String {
    format!("{}// GENERATOR[{}]\n", " ".repeat(indent), token)
}

fn open_section(line: &str) -> Option<(SectionKind, String)> {
    let caps = SECTION_OPEN_RE.captures(line)?;
    let indent = caps.get(1)?.as_str().to_string();
    let kind = SectionKind::from_key(caps.get(2)?.as_str())?;
    Some((kind, indent))
}

fn closes_section(line: &str, indent: &str) -> bool {
    SECTION_CLOSE_RE
        .captures(line)
        .and_then(|caps| caps.get(1))
        .is_some_and(|m| m.as_str() == indent)
}

/// The leading whitespace and identifier of a `'<id>' => function` line.
fn entry_identifier(line: &str) -> Option<(&str, &str)> {
    let caps = ENTRY_RE.captures(line)?;
    Some((caps.get(1)?.as_str(), caps.get(2)?.as_str()))
}
