//! Mermaid renderers for the transition graph and the class diagram.

use std::io::{self, Write};

use markov_analysis::{LinkSet, Partition};
use markov_core::WeightedDigraph;

const CONFIG_HEADER: &str = "---\nconfig:\n   layout: elk\n   theme: neo\n   look: neo\n---\n\n";
const FLOWCHART_HEADER: &str = "flowchart LR\n";
const ALPHABET: &[u8; 26] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Spreadsheet-style column id for a 1-based vertex: 1 → A, 26 → Z,
/// 27 → AA. Returns an empty string for 0.
pub fn node_id(vertex: usize) -> String {
    let mut n = vertex;
    let mut letters = Vec::new();
    while n > 0 {
        n -= 1;
        letters.push(char::from(ALPHABET[n % 26]));
        n /= 26;
    }
    letters.iter().rev().collect()
}

/// Write `graph` as a Mermaid flowchart: one circle node per vertex, one
/// labelled arrow per edge in adjacency order.
pub fn write_graph(w: &mut dyn Write, graph: &WeightedDigraph) -> io::Result<()> {
    w.write_all(CONFIG_HEADER.as_bytes())?;
    w.write_all(FLOWCHART_HEADER.as_bytes())?;

    for v in graph.vertices() {
        writeln!(w, "{}(({}))", node_id(v + 1), v + 1)?;
    }
    for edge in graph.edges() {
        writeln!(
            w,
            "{} -->|{:.2}| {}",
            node_id(edge.from + 1),
            edge.weight,
            node_id(edge.to + 1)
        )?;
    }
    Ok(())
}

/// Write the class diagram: one node per class labelled with its 1-based
/// vertices, one arrow per link.
pub fn write_hasse(w: &mut dyn Write, partition: &Partition, links: &LinkSet) -> io::Result<()> {
    writeln!(w, "graph TD;")?;
    for (idx, class) in partition.classes().iter().enumerate() {
        let members: Vec<String> = class.one_based().iter().map(ToString::to_string).collect();
        writeln!(w, "  C{0}[\"C{0}: {{{1}}}\"];", idx + 1, members.join(", "))?;
    }
    for link in links.iter() {
        writeln!(w, "  C{} --> C{};", link.from + 1, link.to + 1)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use markov_analysis::graph::{condense, decompose};

    fn render(f: impl FnOnce(&mut dyn Write) -> io::Result<()>) -> String {
        let mut buf = Vec::new();
        f(&mut buf).expect("write");
        String::from_utf8(buf).expect("utf8")
    }

    #[test]
    fn node_ids_follow_spreadsheet_columns() {
        assert_eq!(node_id(0), "");
        assert_eq!(node_id(1), "A");
        assert_eq!(node_id(26), "Z");
        assert_eq!(node_id(27), "AA");
        assert_eq!(node_id(52), "AZ");
        assert_eq!(node_id(53), "BA");
        assert_eq!(node_id(702), "ZZ");
        assert_eq!(node_id(703), "AAA");
    }

    #[test]
    fn graph_export_matches_expected_text() {
        let g = WeightedDigraph::from_edges(2, [(0, 1, 0.5), (0, 0, 0.5), (1, 0, 1.0)])
            .expect("graph");
        let text = render(|w| write_graph(w, &g));
        let expected = "---\nconfig:\n   layout: elk\n   theme: neo\n   look: neo\n---\n\n\
                        flowchart LR\n\
                        A((1))\n\
                        B((2))\n\
                        A -->|0.50| B\n\
                        A -->|0.50| A\n\
                        B -->|1.00| A\n";
        assert_eq!(text, expected);
    }

    #[test]
    fn hasse_lists_classes_and_links() {
        let g = WeightedDigraph::from_edges(3, [(0, 1, 0.6), (0, 2, 0.4), (1, 0, 1.0), (2, 2, 1.0)])
            .expect("graph");
        let p = decompose(&g).expect("decompose");
        let links = condense::build(&g, &p).expect("links");
        let text = render(|w| write_hasse(w, &p, &links));
        // The sink {3} completes first, so it is C1.
        assert_eq!(
            text,
            "graph TD;\n  C1[\"C1: {3}\"];\n  C2[\"C2: {2, 1}\"];\n  C2 --> C1;\n"
        );
    }
}
