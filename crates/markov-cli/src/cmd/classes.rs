//! `markov classes`: communicating classes, their kinds and the links between
//! them.

use std::io::Write;
use std::path::PathBuf;

use clap::Args;
use markov_analysis::graph::{ClassKind, LinkSet, Partition, classify, condense, decompose, reduce};
use markov_core::WeightedDigraph;
use serde::Serialize;
use tracing::debug;

use super::{Context, fail, load_graph};
use crate::output::{id_list, pretty_kv, pretty_section, render_mode};

/// Arguments for `markov classes`.
#[derive(Args, Debug)]
pub struct ClassesArgs {
    /// Graph file (`N` on the first line, then `u v p` per line).
    pub input: PathBuf,

    /// Show every class link instead of the reduced set.
    #[arg(long)]
    pub no_reduce: bool,
}

/// Partition, links and kinds of one graph.
pub struct ClassStructure {
    pub partition: Partition,
    pub links: LinkSet,
    pub kinds: Vec<ClassKind>,
}

/// Decompose `graph`, build its class links and reduce them unless
/// `no_reduce` is set. Kinds are computed on the unreduced links.
pub fn class_structure(
    ctx: &Context,
    graph: &WeightedDigraph,
    no_reduce: bool,
) -> anyhow::Result<ClassStructure> {
    let partition = decompose(graph).map_err(|err| fail(ctx.output, err.code(), &err))?;
    let mut links =
        condense::build(graph, &partition).map_err(|err| fail(ctx.output, err.code(), &err))?;
    let kinds = classify(graph, &partition, &links);
    if !no_reduce {
        let removed = reduce::apply(&mut links, ctx.config.reduction.mode);
        debug!(removed, mode = ?ctx.config.reduction.mode, "reduced class links");
    }
    Ok(ClassStructure {
        partition,
        links,
        kinds,
    })
}

#[derive(Debug, Serialize)]
struct ClassView {
    id: usize,
    vertices: Vec<usize>,
    kind: ClassKind,
}

#[derive(Debug, Serialize)]
struct LinkView {
    from: usize,
    to: usize,
}

#[derive(Debug, Serialize)]
struct ClassesView {
    class_count: usize,
    reduced: bool,
    classes: Vec<ClassView>,
    links: Vec<LinkView>,
}

impl ClassesView {
    fn new(structure: &ClassStructure, reduced: bool) -> Self {
        let classes = structure
            .partition
            .classes()
            .iter()
            .zip(&structure.kinds)
            .enumerate()
            .map(|(idx, (class, &kind))| ClassView {
                id: idx + 1,
                vertices: class.one_based(),
                kind,
            })
            .collect();
        let links = structure
            .links
            .iter()
            .map(|l| LinkView {
                from: l.from + 1,
                to: l.to + 1,
            })
            .collect();
        Self {
            class_count: structure.partition.class_count(),
            reduced,
            classes,
            links,
        }
    }
}

fn write_text(view: &ClassesView, w: &mut dyn Write) -> std::io::Result<()> {
    for class in &view.classes {
        writeln!(w, "C{} {} {}", class.id, class.kind, id_list(&class.vertices))?;
    }
    for link in &view.links {
        writeln!(w, "C{} -> C{}", link.from, link.to)?;
    }
    Ok(())
}

fn write_pretty(view: &ClassesView, w: &mut dyn Write) -> std::io::Result<()> {
    pretty_section(w, "Communicating classes")?;
    pretty_kv(w, "Classes", view.class_count.to_string())?;
    for class in &view.classes {
        writeln!(
            w,
            "  Class C{} (size {}): {{ {} }}  [{}]",
            class.id,
            class.vertices.len(),
            id_list(&class.vertices),
            class.kind
        )?;
    }
    writeln!(w)?;
    let heading = if view.reduced { "Links (reduced)" } else { "Links" };
    pretty_section(w, heading)?;
    if view.links.is_empty() {
        writeln!(w, "  (none)")?;
    }
    for link in &view.links {
        writeln!(w, "  C{} --> C{}", link.from, link.to)?;
    }
    Ok(())
}

/// Print the class partition of `args.input`.
///
/// # Errors
///
/// Returns an error if the graph cannot be loaded or decomposed.
pub fn run_classes(args: &ClassesArgs, ctx: &Context) -> anyhow::Result<()> {
    let graph = load_graph(ctx, &args.input)?;
    let structure = class_structure(ctx, &graph, args.no_reduce)?;
    let view = ClassesView::new(&structure, !args.no_reduce);
    render_mode(ctx.output, &view, write_text, write_pretty)
}
