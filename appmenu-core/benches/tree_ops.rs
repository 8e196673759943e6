use appmenu_core::{tree, FolderItem, Item};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

/// `breadth` folders per level, `depth` levels, with one app per folder
fn build_tree(breadth: usize, depth: usize) -> Vec<Item> {
    (0..breadth)
        .map(|i| {
            let mut children = vec![Item::app(format!("/Applications/App{}.app", i), None)];
            if depth > 1 {
                children.extend(build_tree(breadth, depth - 1));
            }
            Item::Folder(FolderItem::with_children(format!("Folder {}", i), children))
        })
        .collect()
}

fn last_id(items: &[Item]) -> uuid::Uuid {
    tree::flatten(items).last().map(|(_, item)| item.id()).unwrap()
}

fn bench_find(c: &mut Criterion) {
    let mut group = c.benchmark_group("find_deepest");
    for (breadth, depth) in [(4, 3), (6, 4)] {
        let items = build_tree(breadth, depth);
        let target = last_id(&items);
        group.bench_with_input(
            BenchmarkId::from_parameter(tree::count(&items)),
            &items,
            |b, items| b.iter(|| black_box(tree::find(items, black_box(target)))),
        );
    }
    group.finish();
}

fn bench_move_cycle_check(c: &mut Criterion) {
    let items = build_tree(6, 4);
    let root = items[0].id();
    let deepest = last_id(&items[..1]);

    c.bench_function("is_valid_move::rejects_descendant", |b| {
        b.iter(|| black_box(tree::is_valid_move(&items, root, Some(black_box(deepest)))))
    });
}

fn bench_clone_and_move(c: &mut Criterion) {
    let items = build_tree(6, 4);
    let moved = items[0].id();
    let destination = items[1].id();

    c.bench_function("clone_extract_insert", |b| {
        b.iter(|| {
            let mut next = items.clone();
            let item = tree::extract(&mut next, moved).unwrap();
            tree::insert(&mut next, item, Some(destination), None).unwrap();
            black_box(next)
        })
    });
}

fn bench_codec(c: &mut Criterion) {
    let items = build_tree(6, 4);
    let json = serde_json::to_vec(&items).unwrap();

    c.bench_function("serialize_tree", |b| {
        b.iter(|| black_box(serde_json::to_vec(black_box(&items)).unwrap()))
    });
    c.bench_function("deserialize_tree", |b| {
        b.iter(|| black_box(serde_json::from_slice::<Vec<Item>>(black_box(&json)).unwrap()))
    });
}

criterion_group!(
    benches,
    bench_find,
    bench_move_cycle_check,
    bench_clone_and_move,
    bench_codec,
);

criterion_main!(benches);
