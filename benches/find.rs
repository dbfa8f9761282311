use arbor::tree::{Node, NodeId, TreeConfig, TreeStore};
use iai_callgrind::{black_box, library_benchmark, library_benchmark_group, main};

// ===== Setup: `width` roots with `width` children each, ids assigned in pre-order =====
fn wide_forest(width: usize, config: TreeConfig) -> TreeStore<()> {
    let mut builder = TreeStore::new(TreeConfig::test());
    let forest: Vec<Node<()>> = (0..width)
        .map(|_| {
            let mut root = builder.create_node(None);
            for _ in 0..width {
                let child = builder.create_node(Some(&root));
                root.children.push(child);
            }
            root
        })
        .collect();
    TreeStore::with_forest(config, forest)
}

fn setup_indexed(width: usize) -> (TreeStore<()>, NodeId) {
    let last = NodeId::Int((width * (width + 1) - 1) as u64);
    (wide_forest(width, TreeConfig::test()), last)
}

fn setup_unindexed(width: usize) -> (TreeStore<()>, NodeId) {
    let last = NodeId::Int((width * (width + 1) - 1) as u64);
    (wide_forest(width, TreeConfig::test().with_indexing(false)), last)
}

#[library_benchmark]
#[bench::indexed_small(args = [16], setup = setup_indexed)]
#[bench::indexed(args = [256], setup = setup_indexed)]
#[bench::searched_small(args = [16], setup = setup_unindexed)]
#[bench::searched(args = [256], setup = setup_unindexed)]
fn find_last(input: (TreeStore<()>, NodeId)) -> bool {
    let (mut store, id) = input;
    let found = store.find(black_box(&id)).is_some();
    black_box(found);
    found
}

#[library_benchmark]
#[bench::small(args = [16], setup = setup_indexed)]
#[bench::large(args = [256], setup = setup_indexed)]
fn rewalk(input: (TreeStore<()>, NodeId)) -> usize {
    let (mut store, _) = input;
    let mut visited = 0;
    store.walk(|_| visited += 1);
    black_box(visited)
}

library_benchmark_group!(name = lookups; benchmarks = find_last, rewalk);
main!(library_benchmark_groups = lookups);
