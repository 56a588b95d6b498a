use avl_index::{debug, validate, AvlTree};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> std::fmt::Result {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,avl_index=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Keys come from the command line; anything that is not a u32 is skipped.
    let mut keys: Vec<u32> = std::env::args()
        .skip(1)
        .filter_map(|arg| match arg.parse() {
            Ok(key) => Some(key),
            Err(error) => {
                tracing::warn!(%arg, %error, "skipping argument");
                None
            }
        })
        .collect();

    if keys.is_empty() {
        keys = vec![2, 0, 3, 4, 5, 1, 6];
    }

    let mut tree: AvlTree<u32> = AvlTree::new();

    for &key in &keys {
        tree.insert(key);
        tree.assert_invariants();
        tracing::info!(key, len = tree.len(), height = tree.height(), "inserted");
    }

    let mut out = String::new();
    debug::render(&tree, &mut out)?;
    print!("{out}");

    for key in keys.iter().step_by(2) {
        if tree.erase(key).is_some() {
            tracing::info!(key, len = tree.len(), "erased");
        }
    }
    tree.assert_invariants();

    match validate::check_avl(&tree) {
        Ok(height) => tracing::info!(height, "tree is balanced"),
        Err(violation) => tracing::error!(%violation, "tree is not balanced"),
    }

    println!("{tree:?}");

    out.clear();
    debug::render(&tree, &mut out)?;
    print!("{out}");

    Ok(())
}
