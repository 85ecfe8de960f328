use options_tree::{OptionsArray, OptionsDict, OptionsTreeElement, TreeElement};

fn main() {
    divan::main();
}

fn product_tree(width: usize) -> OptionsTreeElement {
    options_tree::product(
        ["a", "b", "c"]
            .into_iter()
            .map(|name| OptionsArray::new(name, 0..width).unwrap()),
    )
    .unwrap()
}

#[divan::bench(args = [4, 16, 32])]
fn collapse_product(bencher: divan::Bencher, width: usize) {
    let tree = product_tree(width);
    bencher.bench_local(|| tree.collapse());
}

#[divan::bench(args = [16, 64])]
fn build_product(width: usize) -> usize {
    product_tree(width).count_leaves()
}

#[divan::bench(args = [64, 256, 1024])]
fn sequential_attach(bencher: divan::Bencher, width: usize) {
    let target = OptionsArray::new("a", 0..width).unwrap();
    let donor = OptionsArray::new("b", 0..width).unwrap() * OptionsArray::new("c", 0..8).unwrap();
    bencher.bench_local(|| target.clone() + donor.clone());
}

#[divan::bench(name = "identifier_of_leaves")]
fn identifier_of_leaves(bencher: divan::Bencher) {
    let leaves = product_tree(8).collapse();
    bencher.bench_local(|| leaves.iter().map(OptionsDict::to_string).collect::<Vec<_>>());
}

#[divan::bench(name = "dynamic_chain")]
fn dynamic_chain(bencher: divan::Bencher) {
    let mut dict = OptionsDict::from([("x0", 1)]);
    for depth in 1..32 {
        let previous = format!("x{}", depth - 1);
        dict.insert_dynamic(format!("x{}", depth), move |d| {
            Ok((d.get_f64(&previous)? + 1.0).into())
        });
    }
    bencher.bench_local(|| dict.get("x31").unwrap());
}
