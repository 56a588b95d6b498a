//! Human-readable renderings of a [`TreeView`].

use std::{collections::VecDeque, fmt};

use crate::{Balance, TreeView};

fn balance_mark(balance: Balance) -> char {
    match balance {
        Balance::LeftHeavy => '<',
        Balance::Balanced => '=',
        Balance::RightHeavy => '>',
    }
}

/// Writes the tree as indented text, one node per line.
///
/// Recorded balance factors follow each key as `<`, `=` or `>`. A node with a single child
/// shows its missing child as `∅`.
///
/// ```
/// let tree: avl_index::AvlTree<u32> = (1..=5).collect();
///
/// let mut out = String::new();
/// avl_index::debug::render(&tree, &mut out).unwrap();
///
/// assert_eq!(out, "2 >\n├─ 1 =\n└─ 4 =\n   ├─ 3 =\n   └─ 5 =\n");
/// ```
pub fn render<V, W>(view: &V, mut w: W) -> fmt::Result
where
    V: TreeView + ?Sized,
    V::Key: fmt::Display,
    W: fmt::Write,
{
    let Some(root) = view.root() else {
        return Ok(());
    };

    write_label(view, root, &mut w)?;
    render_children(view, root, "", &mut w)
}

fn write_label<V, W>(view: &V, node: V::Node, w: &mut W) -> fmt::Result
where
    V: TreeView + ?Sized,
    V::Key: fmt::Display,
    W: fmt::Write,
{
    match view.balance(node) {
        Some(balance) => writeln!(w, "{} {}", view.key(node), balance_mark(balance)),
        None => writeln!(w, "{}", view.key(node)),
    }
}

fn render_children<V, W>(view: &V, node: V::Node, tab: &str, w: &mut W) -> fmt::Result
where
    V: TreeView + ?Sized,
    V::Key: fmt::Display,
    W: fmt::Write,
{
    let left = view.left(node);
    let right = view.right(node);

    if left.is_none() && right.is_none() {
        return Ok(());
    }

    for (child, is_last) in [(left, false), (right, true)] {
        w.write_str(tab)?;
        w.write_str(if is_last { "└─ " } else { "├─ " })?;

        match child {
            Some(child) => {
                write_label(view, child, w)?;
                let child_tab = format!("{tab}{}", if is_last { "   " } else { "│  " });
                render_children(view, child, &child_tab, w)?;
            }
            None => w.write_str("∅\n")?,
        }
    }

    Ok(())
}

/// Writes the tree as a Graphviz `digraph`, with one `rank=same` group per level.
pub fn dotgraph<V, W>(view: &V, name: &str, mut w: W) -> fmt::Result
where
    V: TreeView + ?Sized,
    V::Key: fmt::Display,
    W: fmt::Write,
{
    let root = match view.root() {
        Some(r) => r,
        None => return write!(w, "digraph \"graph-{name}\" {{}}"),
    };

    enum Item<N> {
        Node(N),
        Missing(u32),
    }

    let mut queue = VecDeque::new();
    queue.push_back(Item::Node(root));

    write!(
        w,
        "digraph \"graph-{name}\" {{\n subgraph \"subgraph-{name}\" {{"
    )?;

    let mut missing = 0;
    let mut links = String::new();

    while !queue.is_empty() {
        use fmt::Write;

        write!(w, "{{rank=same; ")?;

        for _ in 0..queue.len() {
            let node = match queue.pop_front() {
                Some(Item::Node(node)) => node,
                Some(Item::Missing(id)) => {
                    write!(w, "\"graph{name}-missing{id}\" [shape=point]; ")?;
                    continue;
                }
                None => break,
            };

            let key = view.key(node);
            match view.balance(node) {
                Some(b) => write!(
                    w,
                    "\"graph{name}-{key}\" [label=\"{key}:{}\"]; ",
                    balance_mark(b)
                )?,
                None => write!(w, "\"graph{name}-{key}\" [label=\"{key}\"]; ")?,
            }

            for child in [view.left(node), view.right(node)] {
                match child {
                    Some(child) => {
                        let child_key = view.key(child);

                        queue.push_back(Item::Node(child));
                        writeln!(
                            links,
                            "\"graph{name}-{key}\" -> \"graph{name}-{child_key}\";"
                        )?;
                    }
                    None => {
                        queue.push_back(Item::Missing(missing));
                        writeln!(
                            links,
                            "\"graph{name}-{key}\" -> \"graph{name}-missing{missing}\";"
                        )?;
                        missing += 1;
                    }
                }
            }
        }

        writeln!(w, "}}")?;
    }

    w.write_str(&links)?;

    w.write_str(" }\n}")
}
