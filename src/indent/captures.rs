//! Capture map: which nodes play which indent role
//!
//! Running a language's `indents` query over a tree yields, per capture kind,
//! a map from node identity to the directives attached by `#set!` predicates:
//!
//! ```text
//! ((argument_list) @indent.align
//!   (#set! indent.open_delimiter "(")
//!   (#set! indent.close_delimiter ")"))
//! ```
//!
//! A node can sit in several buckets at once (e.g. `begin` and `align`).

use std::collections::HashMap;
use tree_sitter::{Node, Query, QueryCursor, StreamingIterator};

/// Role of a captured node in indent computation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CaptureKind {
    /// Lines inside the node are indented one level deeper
    Begin,
    /// The node terminates a block; a blank line after it starts fresh
    End,
    /// Lines inside the node (not on its first row) lose one level
    Dedent,
    /// A line starting with the node loses one level (`}`, `else`)
    Branch,
    /// Lines inside the node are left at column 0
    Ignore,
    /// Lines inside the node align to its open delimiter
    Align,
    /// A line starting with the node is pinned to column 0
    Zero,
    /// Lines inside the node defer to generic auto-indent
    Auto,
    /// Explicit open delimiter child of an `Align` node
    OpenDelimiter,
    /// Explicit close delimiter child of an `Align` node
    CloseDelimiter,
}

impl CaptureKind {
    pub const ALL: [CaptureKind; 10] = [
        CaptureKind::Begin,
        CaptureKind::End,
        CaptureKind::Dedent,
        CaptureKind::Branch,
        CaptureKind::Ignore,
        CaptureKind::Align,
        CaptureKind::Zero,
        CaptureKind::Auto,
        CaptureKind::OpenDelimiter,
        CaptureKind::CloseDelimiter,
    ];

    /// Query capture name for this kind
    pub fn capture_name(self) -> &'static str {
        match self {
            CaptureKind::Begin => "indent.begin",
            CaptureKind::End => "indent.end",
            CaptureKind::Dedent => "indent.dedent",
            CaptureKind::Branch => "indent.branch",
            CaptureKind::Ignore => "indent.ignore",
            CaptureKind::Align => "indent.align",
            CaptureKind::Zero => "indent.zero",
            CaptureKind::Auto => "indent.auto",
            CaptureKind::OpenDelimiter => "indent.open_delimiter",
            CaptureKind::CloseDelimiter => "indent.close_delimiter",
        }
    }

    pub fn from_capture_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.capture_name() == name)
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// Per-match directives read from `#set!` properties.
///
/// Every field is optional so that merging keeps values a later match does
/// not mention.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Directives {
    pub immediate: Option<bool>,
    pub increment: Option<i32>,
    pub propagate: Option<bool>,
    pub start_at_same_line: Option<bool>,
    pub align_hanging: Option<bool>,
    pub avoid_last_matching_next: Option<bool>,
    pub open_delimiter: Option<String>,
    pub close_delimiter: Option<String>,
}

fn parse_flag(value: Option<&str>) -> bool {
    !matches!(value, Some("0") | Some("false"))
}

impl Directives {
    /// Apply one `#set!` property. Returns false for keys this module does not know.
    pub fn set(&mut self, key: &str, value: Option<&str>) -> bool {
        match key {
            "indent.immediate" => self.immediate = Some(parse_flag(value)),
            "indent.propagate" => self.propagate = Some(parse_flag(value)),
            "indent.start_at_same_line" => self.start_at_same_line = Some(parse_flag(value)),
            "indent.align_hanging" => self.align_hanging = Some(parse_flag(value)),
            "indent.avoid_last_matching_next" => {
                self.avoid_last_matching_next = Some(parse_flag(value))
            }
            "indent.increment" => match value.and_then(|v| v.trim().parse().ok()) {
                Some(increment) => self.increment = Some(increment),
                None => {
                    tracing::warn!("Ignoring non-numeric indent.increment {:?}", value);
                    return false;
                }
            },
            "indent.open_delimiter" => self.open_delimiter = value.map(str::to_string),
            "indent.close_delimiter" => self.close_delimiter = value.map(str::to_string),
            _ => return false,
        }
        true
    }

    /// Merge `other` into self; values set in `other` win
    pub fn merge(&mut self, other: &Directives) {
        fn pick<T: Clone>(dst: &mut Option<T>, src: &Option<T>) {
            if src.is_some() {
                dst.clone_from(src);
            }
        }
        pick(&mut self.immediate, &other.immediate);
        pick(&mut self.increment, &other.increment);
        pick(&mut self.propagate, &other.propagate);
        pick(&mut self.start_at_same_line, &other.start_at_same_line);
        pick(&mut self.align_hanging, &other.align_hanging);
        pick(
            &mut self.avoid_last_matching_next,
            &other.avoid_last_matching_next,
        );
        pick(&mut self.open_delimiter, &other.open_delimiter);
        pick(&mut self.close_delimiter, &other.close_delimiter);
    }

    pub fn immediate(&self) -> bool {
        self.immediate.unwrap_or(false)
    }

    pub fn propagate(&self) -> bool {
        self.propagate.unwrap_or(false)
    }

    pub fn start_at_same_line(&self) -> bool {
        self.start_at_same_line.unwrap_or(false)
    }

    pub fn align_hanging(&self) -> bool {
        self.align_hanging.unwrap_or(false)
    }

    pub fn avoid_last_matching_next(&self) -> bool {
        self.avoid_last_matching_next.unwrap_or(false)
    }
}

/// Node identity -> directives, one bucket per [`CaptureKind`]
#[derive(Debug, Default)]
pub struct CaptureMap {
    buckets: [HashMap<usize, Directives>; 10],
}

impl CaptureMap {
    /// Map with every bucket empty (language without an `indents` query)
    pub fn empty() -> Self {
        Self::default()
    }

    /// Run `query` over `root` and bucket every captured node
    pub fn build(query: &Query, root: Node<'_>, source: &[u8]) -> Self {
        let mut map = Self::empty();
        let capture_names = query.capture_names();

        let mut cursor = QueryCursor::new();
        let mut matches = cursor.matches(query, root, source);
        while let Some(query_match) = matches.next() {
            let properties = query.property_settings(query_match.pattern_index);

            for capture in query_match.captures {
                let name = capture_names[capture.index as usize];
                // Helper captures only exist to anchor predicates
                if name.starts_with('_') {
                    continue;
                }
                let Some(kind) = CaptureKind::from_capture_name(name) else {
                    tracing::trace!("Ignoring unknown indent capture @{}", name);
                    continue;
                };

                let mut directives = Directives::default();
                for property in properties {
                    if property
                        .capture_id
                        .is_some_and(|id| id != capture.index as usize)
                    {
                        continue;
                    }
                    if !directives.set(&property.key, property.value.as_deref()) {
                        tracing::trace!("Ignoring unknown indent directive {}", property.key);
                    }
                }

                map.insert(kind, capture.node.id(), &directives);
            }
        }

        tracing::debug!(
            "Built capture map: begin={} align={} end={} branch={}",
            map.len(CaptureKind::Begin),
            map.len(CaptureKind::Align),
            map.len(CaptureKind::End),
            map.len(CaptureKind::Branch),
        );
        map
    }

    /// Record a capture, merging with directives from earlier matches
    pub fn insert(&mut self, kind: CaptureKind, node_id: usize, directives: &Directives) {
        self.buckets[kind.index()]
            .entry(node_id)
            .or_default()
            .merge(directives);
    }

    pub fn get(&self, kind: CaptureKind, node: &Node<'_>) -> Option<&Directives> {
        self.buckets[kind.index()].get(&node.id())
    }

    pub fn contains(&self, kind: CaptureKind, node: &Node<'_>) -> bool {
        self.buckets[kind.index()].contains_key(&node.id())
    }

    /// Number of nodes captured as `kind`
    pub fn len(&self, kind: CaptureKind) -> usize {
        self.buckets[kind.index()].len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.iter().all(HashMap::is_empty)
    }
}
