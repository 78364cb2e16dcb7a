//! SGF parsing and generation with full variation support.
//!
//! The parser is a recursive descent over the raw text: `;`-delimited nodes
//! and `(...)`-delimited sibling variations become a [`GameTree`], with each
//! node's board computed top-down through the capture engine. Metadata tags
//! are extracted once with a flat lookup and attached to the record as a
//! whole.
//!
//! Malformed input is handled by omission, never by returning an error:
//! unknown properties are skipped, coordinates outside the board are
//! dropped, and a missing or invalid `SZ` falls back to 19. Parsing never
//! aborts partway.

use crate::board::{Board, Color, Move, Stone};
use crate::constants::DEFAULT_SIZE;
use crate::tree::{GameTree, Marker, MarkerKind, NodeId, SetupStone};

/// Largest board expressible in single-letter coordinates (`a`..`z`).
const MAX_SGF_SIZE: usize = 26;

/// Metadata tags extracted flat from the record.
const METADATA_TAGS: &[&str] = &[
    "GM", "FF", "PB", "PW", "BR", "WR", "BT", "WT", "KM", "HA", "RE", "DT", "PC", "RO", "GN",
    "GC", "CP", "AN", "TM", "US", "SO",
];

/// A parsed game record: the move tree plus the record-level metadata.
pub struct SgfGame {
    pub tree: GameTree,
    pub metadata: SgfMetadata,
}

/// Flat record of the optional textual header fields. Extracted once from
/// anywhere in the text; assumed to appear near the root.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SgfMetadata {
    pub game: Option<String>,
    pub file_format: Option<String>,
    pub black_player: Option<String>,
    pub white_player: Option<String>,
    pub black_rank: Option<String>,
    pub white_rank: Option<String>,
    pub black_team: Option<String>,
    pub white_team: Option<String>,
    pub komi: Option<String>,
    pub handicap: Option<String>,
    pub result: Option<String>,
    pub date: Option<String>,
    pub place: Option<String>,
    pub round: Option<String>,
    pub game_name: Option<String>,
    pub game_comment: Option<String>,
    pub copyright: Option<String>,
    pub annotator: Option<String>,
    pub time_limit: Option<String>,
    pub user: Option<String>,
    pub source: Option<String>,
}

impl SgfMetadata {
    /// Flat key -> value lookup over the whole text.
    pub fn extract(text: &str) -> Self {
        let mut meta = Self::default();
        for &tag in METADATA_TAGS {
            if let Some(value) = tag_value(text, tag) {
                meta.set(tag, value);
            }
        }
        meta
    }

    fn set(&mut self, tag: &str, value: String) {
        let slot = match tag {
            "GM" => &mut self.game,
            "FF" => &mut self.file_format,
            "PB" => &mut self.black_player,
            "PW" => &mut self.white_player,
            "BR" => &mut self.black_rank,
            "WR" => &mut self.white_rank,
            "BT" => &mut self.black_team,
            "WT" => &mut self.white_team,
            "KM" => &mut self.komi,
            "HA" => &mut self.handicap,
            "RE" => &mut self.result,
            "DT" => &mut self.date,
            "PC" => &mut self.place,
            "RO" => &mut self.round,
            "GN" => &mut self.game_name,
            "GC" => &mut self.game_comment,
            "CP" => &mut self.copyright,
            "AN" => &mut self.annotator,
            "TM" => &mut self.time_limit,
            "US" => &mut self.user,
            "SO" => &mut self.source,
            _ => return,
        };
        *slot = Some(value);
    }

    fn get(&self, tag: &str) -> Option<&String> {
        match tag {
            "GM" => self.game.as_ref(),
            "FF" => self.file_format.as_ref(),
            "PB" => self.black_player.as_ref(),
            "PW" => self.white_player.as_ref(),
            "BR" => self.black_rank.as_ref(),
            "WR" => self.white_rank.as_ref(),
            "BT" => self.black_team.as_ref(),
            "WT" => self.white_team.as_ref(),
            "KM" => self.komi.as_ref(),
            "HA" => self.handicap.as_ref(),
            "RE" => self.result.as_ref(),
            "DT" => self.date.as_ref(),
            "PC" => self.place.as_ref(),
            "RO" => self.round.as_ref(),
            "GN" => self.game_name.as_ref(),
            "GC" => self.game_comment.as_ref(),
            "CP" => self.copyright.as_ref(),
            "AN" => self.annotator.as_ref(),
            "TM" => self.time_limit.as_ref(),
            "US" => self.user.as_ref(),
            "SO" => self.source.as_ref(),
            _ => None,
        }
    }
}

/// A validated node property. Parsing classifies everything it keeps into
/// one of these; downstream code never sees a raw tag/value bag.
#[derive(Clone, Debug, PartialEq)]
enum SgfProp {
    /// `B[xy]` / `W[xy]`; empty brackets are a pass.
    Move(Move),
    /// `AB` / `AW` / `AE` board edits.
    Setup(Vec<SetupStone>),
    /// `TR` / `CR` / `SQ` / `MA` / `LB` annotations.
    Markers(Vec<Marker>),
    /// A record-level header tag; handled by the flat metadata pass.
    Metadata,
}

// =============================================================================
// Coordinates
// =============================================================================

/// Decode one lowercase coordinate letter: `a`..`z` -> 1..=26.
fn coord_value(c: u8) -> Option<usize> {
    if c.is_ascii_lowercase() {
        Some((c - b'a') as usize + 1)
    } else {
        None
    }
}

/// Encode 1..=26 as `a`..`z`.
fn coord_letter(v: usize) -> Option<char> {
    if (1..=MAX_SGF_SIZE).contains(&v) {
        Some((b'a' + (v - 1) as u8) as char)
    } else {
        None
    }
}

/// Decode a two-letter point, bounds-checked against the board size.
fn decode_point(value: &str, size: usize) -> Option<(usize, usize)> {
    let bytes = value.as_bytes();
    if bytes.len() != 2 {
        return None;
    }
    let x = coord_value(bytes[0])?;
    let y = coord_value(bytes[1])?;
    if x <= size && y <= size { Some((x, y)) } else { None }
}

// =============================================================================
// Parsing
// =============================================================================

/// Parse SGF text into a game record. Never fails; see the module docs for
/// the degradation rules.
pub fn parse(text: &str) -> SgfGame {
    let metadata = SgfMetadata::extract(text);
    let size = tag_value(text, "SZ")
        .and_then(|v| v.parse::<usize>().ok())
        .filter(|n| (1..=MAX_SGF_SIZE).contains(n))
        .unwrap_or(DEFAULT_SIZE);

    let mut tree = GameTree::new(size);
    let mut parser = Parser {
        bytes: text.as_bytes(),
        pos: 0,
        size,
    };
    parser.skip_to_open();
    let root = tree.root();
    parser.parse_sequence(&mut tree, root, true);
    SgfGame { tree, metadata }
}

/// Flat lookup of `TAG[value]` anywhere in the text. The tag must not be
/// preceded by another uppercase letter, so `RE[..]` is not found inside
/// `SQUARE[..]`-like runs.
fn tag_value(text: &str, tag: &str) -> Option<String> {
    let bytes = text.as_bytes();
    let pattern = format!("{tag}[");
    let mut search_from = 0;
    while let Some(offset) = text[search_from..].find(&pattern) {
        let start = search_from + offset;
        let preceded = start > 0 && bytes[start - 1].is_ascii_uppercase();
        if !preceded {
            let value_start = start + pattern.len();
            return Some(read_bracket_value(bytes, value_start).0);
        }
        search_from = start + pattern.len();
    }
    None
}

/// Read a bracket value starting just after `[`, honoring `\]` escapes.
/// Returns the unescaped value and the index just past the closing `]`.
fn read_bracket_value(bytes: &[u8], mut pos: usize) -> (String, usize) {
    let mut value = String::new();
    while pos < bytes.len() {
        match bytes[pos] {
            b'\\' if pos + 1 < bytes.len() => {
                value.push(bytes[pos + 1] as char);
                pos += 2;
            }
            b']' => return (value, pos + 1),
            b => {
                value.push(b as char);
                pos += 1;
            }
        }
    }
    (value, pos)
}

struct Parser<'a> {
    bytes: &'a [u8],
    pos: usize,
    size: usize,
}

impl Parser<'_> {
    fn skip_to_open(&mut self) {
        while self.pos < self.bytes.len() && self.bytes[self.pos] != b'(' {
            self.pos += 1;
        }
        if self.pos < self.bytes.len() {
            self.pos += 1; // consume '('
        }
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    /// Walk one `(...)` sequence, attaching nodes under `parent`.
    ///
    /// A `;` node continues the current line as a single child; each nested
    /// `(...)` block spawns one child branch of the node it follows. At the
    /// root the first node's properties (setup, markers) merge into the
    /// existing root node instead of creating a child.
    fn parse_sequence(&mut self, tree: &mut GameTree, mut parent: NodeId, mut at_root: bool) {
        while let Some(b) = self.peek() {
            match b {
                b';' => {
                    self.pos += 1;
                    let props = self.parse_node_props();
                    parent = attach_node(tree, parent, props, at_root);
                    at_root = false;
                }
                b'(' => {
                    self.pos += 1;
                    self.parse_sequence(tree, parent, false);
                }
                b')' => {
                    self.pos += 1;
                    return;
                }
                _ => {
                    // Stray bytes between nodes: tolerated by skipping.
                    self.pos += 1;
                }
            }
        }
    }

    /// Scan one node's property block: everything between its `;` and the
    /// next `;`, `(` or `)`.
    fn parse_node_props(&mut self) -> Vec<SgfProp> {
        let mut props = Vec::new();
        loop {
            match self.peek() {
                None | Some(b';') | Some(b'(') | Some(b')') => return props,
                Some(b) if b.is_ascii_uppercase() => {
                    let ident = self.read_ident();
                    let values = self.read_values();
                    if let Some(prop) = self.classify(&ident, &values) {
                        props.push(prop);
                    }
                }
                _ => self.pos += 1,
            }
        }
    }

    fn read_ident(&mut self) -> String {
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|b| b.is_ascii_uppercase())
        {
            self.pos += 1;
        }
        String::from_utf8_lossy(&self.bytes[start..self.pos]).into_owned()
    }

    /// Read the run of `[..]` values following a property identifier.
    fn read_values(&mut self) -> Vec<String> {
        let mut values = Vec::new();
        loop {
            // Whitespace may separate an identifier from its values.
            while self.peek().is_some_and(|b| b.is_ascii_whitespace()) {
                self.pos += 1;
            }
            if self.peek() != Some(b'[') {
                return values;
            }
            let (value, next) = read_bracket_value(self.bytes, self.pos + 1);
            values.push(value);
            self.pos = next;
        }
    }

    /// Validate a raw property into a tagged variant; `None` drops it.
    fn classify(&self, ident: &str, values: &[String]) -> Option<SgfProp> {
        match ident {
            "B" | "W" => {
                let color = if ident == "B" { Color::Black } else { Color::White };
                let value = values.first().map(String::as_str).unwrap_or("");
                if value.is_empty() {
                    return Some(SgfProp::Move(Move::pass(color)));
                }
                decode_point(value, self.size)
                    .map(|(x, y)| SgfProp::Move(Move::play(x, y, color)))
            }
            "AB" | "AW" | "AE" => {
                let color = match ident {
                    "AB" => Some(Color::Black),
                    "AW" => Some(Color::White),
                    _ => None,
                };
                let stones: Vec<SetupStone> = values
                    .iter()
                    .filter_map(|v| decode_point(v, self.size))
                    .map(|(x, y)| SetupStone { x, y, color })
                    .collect();
                if stones.is_empty() {
                    None
                } else {
                    Some(SgfProp::Setup(stones))
                }
            }
            "TR" | "CR" | "SQ" | "MA" => {
                let kind = match ident {
                    "TR" => MarkerKind::Triangle,
                    "CR" => MarkerKind::Circle,
                    "SQ" => MarkerKind::Square,
                    _ => MarkerKind::Cross,
                };
                let markers: Vec<Marker> = values
                    .iter()
                    .filter_map(|v| decode_point(v, self.size))
                    .map(|(x, y)| Marker {
                        x,
                        y,
                        kind: kind.clone(),
                    })
                    .collect();
                if markers.is_empty() {
                    None
                } else {
                    Some(SgfProp::Markers(markers))
                }
            }
            "LB" => {
                // Values are coord:text pairs.
                let markers: Vec<Marker> = values
                    .iter()
                    .filter_map(|v| {
                        let (coord, text) = v.split_once(':')?;
                        let (x, y) = decode_point(coord, self.size)?;
                        Some(Marker {
                            x,
                            y,
                            kind: MarkerKind::Label(text.to_string()),
                        })
                    })
                    .collect();
                if markers.is_empty() {
                    None
                } else {
                    Some(SgfProp::Markers(markers))
                }
            }
            "SZ" => Some(SgfProp::Metadata),
            tag if METADATA_TAGS.contains(&tag) => Some(SgfProp::Metadata),
            _ => None, // unknown property: skipped
        }
    }
}

/// Fold a parsed node's properties into the tree. At the root, setup and
/// markers merge into the existing root node (seeding the initial board
/// before any traversal); elsewhere a child node is appended.
fn attach_node(tree: &mut GameTree, parent: NodeId, props: Vec<SgfProp>, at_root: bool) -> NodeId {
    let mut mv = None;
    let mut setup = Vec::new();
    let mut markers = Vec::new();
    for prop in props {
        match prop {
            SgfProp::Move(m) => mv = Some(m),
            SgfProp::Setup(mut stones) => setup.append(&mut stones),
            SgfProp::Markers(mut ms) => markers.append(&mut ms),
            SgfProp::Metadata => {}
        }
    }

    if at_root && mv.is_none() {
        if !setup.is_empty() {
            let mut board = Board::new(tree.size);
            for s in &setup {
                board = match s.color {
                    Some(color) => board.place(s.x, s.y, Stone::new(color)),
                    None => board.remove(s.x, s.y),
                };
            }
            tree.set_root_board(board);
            tree.node_mut(tree.root()).setup = setup;
        }
        tree.node_mut(tree.root()).markers.append(&mut markers);
        return tree.root();
    }

    tree.add_child(parent, mv, setup, markers)
}

// =============================================================================
// Generation
// =============================================================================

/// Escape `]` and `\` inside a bracket value.
fn escape_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        if c == ']' || c == '\\' {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

fn encode_point(x: usize, y: usize) -> Option<String> {
    Some(format!("{}{}", coord_letter(x)?, coord_letter(y)?))
}

/// Produce SGF text for a game record.
///
/// Header and metadata tags come first, then `AB`/`AW` for un-numbered
/// stones on the root board, then the tree. A single child continues the
/// current line inline; two or more children each get their own `(...)`
/// block, so parentheses appear only at actual branch points. The
/// round-trip contract is structural: `parse(generate(g))` reproduces the
/// move sequence, branch topology and markers, not the exact text.
pub fn generate(game: &SgfGame) -> String {
    let tree = &game.tree;
    let mut out = String::from("(;GM[1]FF[4]");
    out.push_str(&format!("SZ[{}]", tree.size));

    for tag in ["PB", "PW", "BR", "WR", "BT", "WT", "KM", "HA", "RE", "DT", "PC", "RO", "GN",
        "GC", "CP", "AN", "TM", "US", "SO"]
    {
        if let Some(value) = game.metadata.get(tag) {
            out.push_str(&format!("{tag}[{}]", escape_value(value)));
        }
    }

    // Root setup: un-numbered stones on the root board.
    let root = tree.node(tree.root());
    let mut black_setup = Vec::new();
    let mut white_setup = Vec::new();
    for (x, y, stone) in root.board.stones() {
        if stone.move_number.is_none() {
            match stone.color {
                Color::Black => black_setup.push((x, y)),
                Color::White => white_setup.push((x, y)),
            }
        }
    }
    emit_point_list(&mut out, "AB", &black_setup);
    emit_point_list(&mut out, "AW", &white_setup);
    emit_markers(&mut out, &root.markers);

    emit_children(&mut out, tree, tree.root());
    out.push(')');
    out
}

fn emit_point_list(out: &mut String, tag: &str, points: &[(usize, usize)]) {
    let coords: Vec<String> = points
        .iter()
        .filter_map(|&(x, y)| encode_point(x, y))
        .collect();
    if coords.is_empty() {
        return;
    }
    out.push_str(tag);
    for coord in coords {
        out.push('[');
        out.push_str(&coord);
        out.push(']');
    }
}

fn emit_markers(out: &mut String, markers: &[Marker]) {
    for marker in markers {
        let Some(coord) = encode_point(marker.x, marker.y) else {
            continue;
        };
        match &marker.kind {
            MarkerKind::Triangle => out.push_str(&format!("TR[{coord}]")),
            MarkerKind::Circle => out.push_str(&format!("CR[{coord}]")),
            MarkerKind::Square => out.push_str(&format!("SQ[{coord}]")),
            MarkerKind::Cross => out.push_str(&format!("MA[{coord}]")),
            MarkerKind::Label(text) => {
                out.push_str(&format!("LB[{coord}:{}]", escape_value(text)))
            }
        }
    }
}

/// Emit one node: its move (or setup edits for move-less nodes) and markers.
fn emit_node(out: &mut String, tree: &GameTree, id: NodeId) {
    let node = tree.node(id);
    out.push(';');
    if let Some(mv) = node.mv {
        let tag = match mv.color {
            Color::Black => "B",
            Color::White => "W",
        };
        if mv.is_pass() {
            out.push_str(&format!("{tag}[]"));
        } else if let Some(coord) = encode_point(mv.x, mv.y) {
            out.push_str(&format!("{tag}[{coord}]"));
        } else {
            out.push_str(&format!("{tag}[]"));
        }
    } else if !node.setup.is_empty() {
        let collect = |want: Option<Color>| -> Vec<(usize, usize)> {
            node.setup
                .iter()
                .filter(|s| s.color == want)
                .map(|s| (s.x, s.y))
                .collect()
        };
        emit_point_list(out, "AB", &collect(Some(Color::Black)));
        emit_point_list(out, "AW", &collect(Some(Color::White)));
        emit_point_list(out, "AE", &collect(None));
    }
    emit_markers(out, &node.markers);
}

/// Recursive emission below `id`: zero children stop, one child continues
/// the line inline, two or more children each get a `(...)` block.
fn emit_children(out: &mut String, tree: &GameTree, id: NodeId) {
    let children = &tree.node(id).children;
    match children.len() {
        0 => {}
        1 => {
            let child = children[0];
            emit_node(out, tree, child);
            emit_children(out, tree, child);
        }
        _ => {
            for &child in children {
                out.push('(');
                emit_node(out, tree, child);
                emit_children(out, tree, child);
                out.push(')');
            }
        }
    }
}
