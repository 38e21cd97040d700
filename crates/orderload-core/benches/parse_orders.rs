use orderload_core::{ConflictPolicy, InsertStatement, Order};

fn synthetic_line(i: usize) -> String {
    format!(
        "{i},{},{},{},{},{}.50,1.00,0.91,{}.50,0.00,1.00,1.082300,EUR,2019-0{}-1{} 08:30:00",
        i % 5000,
        i % 7,
        i % 3,
        i % 4,
        i % 900,
        i % 900,
        i % 9 + 1,
        i % 10
    )
}

#[divan::bench(args = [1_000, 10_000])]
fn parse_lines(bencher: divan::Bencher, n: usize) {
    let lines: Vec<String> = (0..n).map(synthetic_line).collect();
    bencher.bench(|| {
        lines
            .iter()
            .enumerate()
            .map(|(i, l)| Order::parse_line(l, i + 1).unwrap())
            .count()
    });
}

#[divan::bench(args = [10, 100, 1_000])]
fn build_insert(bencher: divan::Bencher, batch_size: usize) {
    let rows: Vec<Order> = (0..batch_size)
        .map(|i| Order::parse_line(&synthetic_line(i), i + 1).unwrap())
        .collect();
    bencher.bench(|| {
        let stmt = InsertStatement::new("orders", &rows, ConflictPolicy::Fail);
        stmt.params().count() + stmt.sql().len()
    });
}

fn main() {
    divan::main();
}
