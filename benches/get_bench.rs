use criterion::{Criterion, criterion_group, criterion_main};
use jsonslice::{get, get_array_elements};

const DOC: &[u8] = br#"{"store":{"expensive":10,"book":[
  {"category":"reference","author":"Nigel Rees","title":"Sayings of the Century","price":8.95},
  {"category":"fiction","author":"Evelyn Waugh","title":"Sword of Honour","price":12.99},
  {"category":"fiction","author":"Herman Melville","title":"Moby Dick","isbn":"0-553-21311-3","price":8.99},
  {"category":"fiction","author":"J. R. R. Tolkien","title":"The Lord of the Rings","isbn":"0-395-19395-8","price":22.99}
]}}"#;

fn bench_get(c: &mut Criterion) {
    let mut group = c.benchmark_group("get");
    let cases = vec![
        ("key_chain", "$.store.expensive"),
        ("indexed", "$.store.book[3].title"),
        ("negative_index", "$.store.book[-1].author"),
        ("range", "$.store.book[1:3]"),
        ("filter", "$.store.book[?(@.price > 10)].title"),
        ("filter_root_operand", "$.store.book[?(@.price > $.store.expensive)].title"),
        ("filter_regex", "$.store.book[?(@.title =~ /moby/i)].isbn"),
        ("wildcard", "$.store.book[0].*"),
        ("function", "$.store.book.count()"),
    ];
    for (name, path) in cases {
        group.bench_function(name, |b| {
            b.iter(|| {
                let out = get(std::hint::black_box(DOC), std::hint::black_box(path)).unwrap();
                std::hint::black_box(out);
            })
        });
    }
    group.finish();
}

fn bench_elements(c: &mut Criterion) {
    c.bench_function("get_array_elements", |b| {
        b.iter(|| {
            let out =
                get_array_elements(std::hint::black_box(DOC), "$.store.book", 4).unwrap();
            std::hint::black_box(out);
        })
    });
}

criterion_group!(benches, bench_get, bench_elements);
criterion_main!(benches);
