//! SGF round-trip tests: parse(generate(T)) must preserve move sequence,
//! branch topology and markers for hand-built and randomized trees alike.
//! Exact textual equality is not part of the contract.

use shido::board::{Color, Move};
use shido::sgf::{self, SgfGame, SgfMetadata};
use shido::tree::{GameTree, Marker, MarkerKind, NodeId};

// =============================================================================
// Helper functions
// =============================================================================

/// Structural equality: move, markers, and child topology, recursively.
fn trees_match(a: &GameTree, b: &GameTree) -> bool {
    fn node_match(a: &GameTree, an: NodeId, b: &GameTree, bn: NodeId) -> bool {
        let (na, nb) = (a.node(an), b.node(bn));
        na.mv == nb.mv
            && na.markers == nb.markers
            && na.children.len() == nb.children.len()
            && na
                .children
                .iter()
                .zip(&nb.children)
                .all(|(&ca, &cb)| node_match(a, ca, b, cb))
    }
    a.size == b.size && node_match(a, a.root(), b, b.root())
}

fn main_line(tree: &GameTree) -> Vec<Move> {
    let mut moves = Vec::new();
    let mut id = tree.root();
    while let Some(&first) = tree.node(id).children.first() {
        if let Some(mv) = tree.node(first).mv {
            moves.push(mv);
        }
        id = first;
    }
    moves
}

fn roundtrip(game: &SgfGame) -> SgfGame {
    sgf::parse(&sgf::generate(game))
}

// =============================================================================
// Fixed records
// =============================================================================

#[test]
fn test_basic_record_scenario() {
    let game = sgf::parse("(;GM[1]SZ[9];B[ee];W[dd])");
    assert_eq!(
        main_line(&game.tree),
        vec![Move::play(5, 5, Color::Black), Move::play(4, 4, Color::White)]
    );
}

#[test]
fn test_linear_game_roundtrip() {
    let game = sgf::parse("(;GM[1]FF[4]SZ[9]PB[A]PW[B];B[cc];W[gg];B[ge];W[];B[ec])");
    let back = roundtrip(&game);
    assert!(trees_match(&game.tree, &back.tree));
    assert_eq!(back.metadata.black_player.as_deref(), Some("A"));
    assert_eq!(main_line(&back.tree).len(), 5);
}

#[test]
fn test_branched_lesson_roundtrip() {
    // A review tree: main line plus two sibling variations, one nested.
    let text = "(;SZ[9]GN[joseki review];B[cg](;W[cc];B[ce](;W[dc])(;W[ee]))(;W[gc]TR[gc]LB[cg:start]))";
    let game = sgf::parse(text);
    let back = roundtrip(&game);
    assert!(trees_match(&game.tree, &back.tree));
    assert_eq!(back.metadata.game_name.as_deref(), Some("joseki review"));
}

#[test]
fn test_setup_and_marker_roundtrip() {
    let game = sgf::parse("(;SZ[9]AB[cc][dd][ee]AW[cd]CR[cc];B[ff]SQ[ff]MA[aa])");
    let back = roundtrip(&game);
    assert!(trees_match(&game.tree, &back.tree));
    let root = back.tree.node(back.tree.root());
    assert_eq!(root.board.stone_count(), 4);
    assert_eq!(
        root.markers,
        vec![Marker {
            x: 3,
            y: 3,
            kind: MarkerKind::Circle
        }]
    );
}

#[test]
fn test_pass_roundtrip() {
    let game = sgf::parse("(;SZ[9];B[ee];W[];B[])");
    let back = roundtrip(&game);
    assert!(trees_match(&game.tree, &back.tree));
    let moves: Vec<Move> = {
        let mut v = Vec::new();
        let mut id = back.tree.root();
        while let Some(&first) = back.tree.node(id).children.first() {
            v.extend(back.tree.node(first).mv);
            id = first;
        }
        v
    };
    assert!(moves[1].is_pass());
    assert!(moves[2].is_pass());
    assert_eq!(moves[1].color, Color::White);
}

#[test]
fn test_metadata_preserved() {
    let text = "(;GM[1]FF[4]SZ[19]PB[Honinbo]PW[Challenger]BR[9p]WR[7p]KM[6.5]HA[2]RE[W+0.5]DT[2024-11-02]PC[Tokyo]RO[3]US[recorder];B[pd])";
    let back = roundtrip(&sgf::parse(text));
    let m = &back.metadata;
    assert_eq!(m.black_player.as_deref(), Some("Honinbo"));
    assert_eq!(m.black_rank.as_deref(), Some("9p"));
    assert_eq!(m.white_rank.as_deref(), Some("7p"));
    assert_eq!(m.komi.as_deref(), Some("6.5"));
    assert_eq!(m.handicap.as_deref(), Some("2"));
    assert_eq!(m.result.as_deref(), Some("W+0.5"));
    assert_eq!(m.date.as_deref(), Some("2024-11-02"));
    assert_eq!(m.place.as_deref(), Some("Tokyo"));
    assert_eq!(m.round.as_deref(), Some("3"));
    assert_eq!(m.user.as_deref(), Some("recorder"));
}

#[test]
fn test_malformed_inputs_parse_to_something() {
    for text in [
        "",
        "garbage",
        "(;SZ[9];B[zz])",
        "(;SZ[nine];B[aa]",
        "(;B[aa]))(",
        "(;SZ[9];B[aa]W[", // truncated mid-property
    ] {
        let game = sgf::parse(text);
        // Degradation only: never a panic, and always a usable tree.
        assert!(game.tree.len() >= 1);
        let _ = sgf::generate(&game);
    }
}

// =============================================================================
// Randomized trees
// =============================================================================

/// Grow a random branching tree through the public tree API.
fn random_tree(size: usize, nodes: usize) -> GameTree {
    let mut tree = GameTree::new(size);
    let mut ids = vec![tree.root()];
    while tree.len() < nodes + 1 {
        let parent = ids[fastrand::usize(..ids.len())];
        let color = if fastrand::bool() {
            Color::Black
        } else {
            Color::White
        };
        let mv = if fastrand::u8(..10) == 0 {
            Move::pass(color)
        } else {
            Move::play(
                fastrand::usize(1..=size),
                fastrand::usize(1..=size),
                color,
            )
        };
        let markers = if fastrand::u8(..5) == 0 {
            vec![Marker {
                x: fastrand::usize(1..=size),
                y: fastrand::usize(1..=size),
                kind: match fastrand::u8(..5) {
                    0 => MarkerKind::Triangle,
                    1 => MarkerKind::Circle,
                    2 => MarkerKind::Square,
                    3 => MarkerKind::Cross,
                    _ => MarkerKind::Label(format!("v{}", fastrand::u8(..100))),
                },
            }]
        } else {
            Vec::new()
        };
        let id = tree.add_child(parent, Some(mv), Vec::new(), markers);
        ids.push(id);
    }
    tree
}

#[test]
fn test_random_trees_roundtrip() {
    fastrand::seed(42);
    for _ in 0..25 {
        let tree = random_tree(9, 40);
        let game = SgfGame {
            tree,
            metadata: SgfMetadata::default(),
        };
        let back = roundtrip(&game);
        assert!(
            trees_match(&game.tree, &back.tree),
            "random tree failed to round-trip"
        );
    }
}

#[test]
fn test_random_trees_roundtrip_large_board() {
    fastrand::seed(1729);
    for _ in 0..5 {
        let tree = random_tree(19, 80);
        let game = SgfGame {
            tree,
            metadata: SgfMetadata::default(),
        };
        let back = roundtrip(&game);
        assert!(trees_match(&game.tree, &back.tree));
    }
}
