//! End-to-end: CoNLL-U lines → hierarchical passages.
//!
//! Inspects the units `DependencyConverter::from_format` builds rather
//! than writing them back.

use semgraph_conv::{
    Conllu, ConverterConfig, DependencyConverter, HierarchyBackend, MemoryHierarchy, NodeTag,
    UnitId, UnitKind,
};

// ============================================================================
// Helpers
// ============================================================================

fn converter(config: ConverterConfig) -> DependencyConverter<Conllu> {
    DependencyConverter::new(config, Conllu)
}

fn single(config: ConverterConfig, lines: &[&str]) -> MemoryHierarchy {
    let mut converted = converter(config).from_format(lines.iter().copied(), "doc", true);
    assert_eq!(converted.len(), 1, "expected exactly one sentence");
    converted.remove(0).passage
}

fn terminal_text(h: &MemoryHierarchy, id: UnitId) -> String {
    h.get(id).unwrap().terminal().unwrap().text.clone()
}

/// Tag of the first incoming edge.
fn tag(h: &MemoryHierarchy, id: UnitId) -> String {
    h.get(id).unwrap().incoming[0].tag.clone()
}

const CAT: [&str; 5] = [
    "# sent_id = 1",
    "1\tThe\tthe\tDET\tDT\t_\t2\tdet\t_\t_",
    "2\tcat\tcat\tNOUN\tNN\tNumber=Sing\t3\tnsubj\t_\tSpaceAfter=No",
    "3\tsleeps\tsleep\tVERB\tVBZ\t_\t0\troot\t0:root\t_",
    "4\t.\t.\tPUNCT\t.\t_\t3\tpunct\t_\t_",
];

// ============================================================================
// 1. Terminals
// ============================================================================

#[test]
fn test_terminals_in_order_with_attributes() {
    let h = single(ConverterConfig::default().with_tree(true), &CAT);

    let texts: Vec<String> = h.terminals().into_iter().map(|t| terminal_text(&h, t)).collect();
    assert_eq!(texts, vec!["The", "cat", "sleeps", "."]);

    let cat = h.get(h.terminals()[1]).unwrap();
    assert_eq!(cat.terminal().unwrap().position, 2);
    assert_eq!(cat.attr("lemma"), Some("cat"));
    assert_eq!(cat.attr("features"), Some("Number=Sing"));
    assert_eq!(cat.attr("misc"), Some("SpaceAfter=No"));

    let sleeps = h.get(h.terminals()[2]).unwrap();
    assert_eq!(sleeps.attr("enhanced"), Some("0:root"));

    assert!(h.get(h.terminals()[3]).unwrap().is_punct());
    assert!(!cat.is_punct());
}

#[test]
fn test_multi_word_text_on_terminals() {
    let lines = [
        "1\tEr\ter\tPRON\tPPER\t_\t2\tnsubj\t_\t_",
        "2\tgeht\tgehen\tVERB\tVVFIN\t_\t0\troot\t_\t_",
        "3-4\tzum\t_\t_\t_\t_\t_\t_\t_\t_",
        "3\tzu\tzu\tADP\tAPPR\t_\t5\tcase\t_\t_",
        "4\tdem\tder\tDET\tART\t_\t5\tdet\t_\t_",
        "5\tHaus\tHaus\tNOUN\tNN\t_\t2\tobl\t_\t_",
    ];
    let h = single(ConverterConfig::default().with_tree(true), &lines);
    let terminals = h.terminals();
    assert_eq!(terminal_text(&h, terminals[2]), "zu");
    assert_eq!(terminal_text(&h, terminals[3]), "dem");

    let multi: Vec<Option<&str>> =
        terminals.iter().map(|t| h.get(*t).unwrap().attr("multi_word_text")).collect();
    assert_eq!(multi, vec![None, None, Some("zum"), Some("zum"), None]);
}

#[test]
fn test_terminals_only() {
    let converter = converter(ConverterConfig::default());
    let graph = converter.read_graphs(CAT, true).remove(0).graph;
    let h = converter.build_passage(graph, true).unwrap();

    assert_eq!(h.terminals().len(), 4);
    assert!(h.children(h.root()).unwrap().is_empty());
}

// ============================================================================
// 2. Non-terminal structure
// ============================================================================

#[test]
fn test_dependency_units() {
    let h = single(ConverterConfig::default().with_tree(true).with_flat_relation("det"), &CAT);

    // a single top-level unit for the root verb
    let top = h.children(h.root()).unwrap();
    assert_eq!(top.len(), 1);
    assert_eq!(tag(&h, top[0]), "head");

    let tags: Vec<String> = h.get(top[0]).unwrap().outgoing.iter().map(|e| e.tag.clone()).collect();
    assert_eq!(tags, vec!["head", "nsubj", "punct"]);

    // the determiner sits next to its noun under one preterminal
    let the = h.terminals()[0];
    let cat = h.terminals()[1];
    let preterminal = h.parents(cat).unwrap()[0];
    assert_eq!(h.parents(the).unwrap(), vec![preterminal]);
    assert_eq!(h.children(preterminal).unwrap(), vec![cat, the]);
}

#[test]
fn test_punctuation_unit() {
    let h = single(ConverterConfig::default().with_tree(true), &CAT);

    let period = h.terminals()[3];
    let parent = h.parents(period).unwrap()[0];
    assert_eq!(tag(&h, parent), "punct");
    assert_eq!(h.get(parent).unwrap().kind, UnitKind::NonTerminal(NodeTag::Punctuation));
}

#[test]
fn test_every_terminal_is_attached() {
    let h = single(ConverterConfig::default().with_tree(true), &CAT);
    for t in h.terminals() {
        assert_eq!(h.parents(t).unwrap().len(), 1, "terminal {t} should have one parent");
    }
}

// ============================================================================
// 3. Semantic passages
// ============================================================================

#[test]
fn test_semantic_remote_participant() {
    let lines = [
        "# sent_id = 5",
        "# format = ucca",
        "1\tJohn\t_\tPROPN\t_\t_\t2\tA\t2:A|4:A*\t_",
        "2\twants\t_\tVERB\t_\t_\t0\troot\t_\t_",
        "3\tto\t_\tPART\t_\t_\t4\tF\t_\t_",
        "4\tleave\t_\tVERB\t_\t_\t2\tA\t_\t_",
    ];
    let h = single(ConverterConfig::default().with_tree(true), &lines);
    assert_eq!(h.format(), Some("ucca"));

    let scene = h.children(h.root()).unwrap()[0];
    assert_eq!(tag(&h, scene), "H");

    let john_unit = h.parents(h.terminals()[0]).unwrap()[0];
    let leave_unit = h.parents(h.parents(h.terminals()[3]).unwrap()[0]).unwrap()[0];
    let john = h.get(john_unit).unwrap();
    assert_eq!(john.incoming.len(), 2);
    assert!(!john.incoming[0].remote);
    assert_eq!(john.incoming[0].parent, scene);
    assert!(john.incoming[1].remote);
    assert_eq!(john.incoming[1].parent, leave_unit);
    assert_eq!(john.incoming[1].tag, "A");
}

#[test]
fn test_mark_aux_prefixes_semantic_labels() {
    let lines = ["# format = ucca", "1\tgo\t_\tVERB\t_\t_\t0\troot\t_\t_"];
    let h = single(ConverterConfig::default().with_tree(true).with_mark_aux(true), &lines);
    let scene = h.children(h.root()).unwrap()[0];
    assert_eq!(tag(&h, scene), "#H");
}

// ============================================================================
// 4. Reader behavior
// ============================================================================

#[test]
fn test_bad_sentences_are_skipped() {
    let lines = [
        "# sent_id = bad",
        "1\tbroken",
        "",
        "# sent_id = out-of-range",
        "1\ta\t_\tX\t_\t_\t5\tdep\t_\t_",
        "",
        "# sent_id = good",
        "1\tfine\t_\tX\t_\t_\t0\troot\t_\t_",
    ];
    let converted = converter(ConverterConfig::default()).from_format(lines, "doc", true);
    let ids: Vec<&str> = converted.iter().map(|c| c.passage.passage_id()).collect();
    assert_eq!(ids, vec!["good"]);
}

#[test]
fn test_unsplit_input_counts_paragraphs() {
    let lines = [
        "1\tHello\t_\tINTJ\t_\t_\t0\troot\t_\t_",
        "2\tthere\t_\tADV\t_\t_\t1\tadvmod\t_\t_",
        "",
        "3\tBye\t_\tINTJ\t_\t_\t0\troot\t_\t_",
    ];
    let converted = converter(ConverterConfig::default()).from_format(lines, "doc", false);
    assert_eq!(converted.len(), 1);

    let h = &converted[0].passage;
    assert_eq!(h.passage_id(), "doc");
    let paragraphs: Vec<usize> =
        h.terminals().into_iter().map(|t| h.get(t).unwrap().terminal().unwrap().paragraph).collect();
    assert_eq!(paragraphs, vec![1, 1, 2]);
}

#[test]
fn test_copy_heads_resolve() {
    let lines = [
        "1\tJohn\t_\tPROPN\t_\t_\t2\tnsubj\t2:nsubj|2.1:nsubj\t_",
        "2\tleft\t_\tVERB\t_\t_\t0\troot\t0:root\t_",
        "2.1\tleft\t_\tVERB\t_\t_\t_\t_\t0:root\tCopyOf=2",
    ];
    let h = single(ConverterConfig::default().with_tree(true), &lines);

    assert_eq!(h.terminals().len(), 2);
    // the copy points at the same head, so no second parent is added
    let john_unit = h.parents(h.terminals()[0]).unwrap()[0];
    assert_eq!(h.get(john_unit).unwrap().incoming.len(), 1);
}

#[test]
fn test_cyclic_input_still_converts() {
    let lines = [
        "1\ta\t_\tX\t_\t_\t2\tdep\t_\t_",
        "2\tb\t_\tX\t_\t_\t1\tdep\t_\t_",
    ];
    let h = single(ConverterConfig::default(), &lines);
    for t in h.terminals() {
        assert!(!h.parents(t).unwrap().is_empty());
    }
    // the node left headless by cycle breaking opens a ROOT unit
    let top = h.children(h.root()).unwrap();
    assert_eq!(top.len(), 1);
    assert_eq!(tag(&h, top[0]), "ROOT");
}
