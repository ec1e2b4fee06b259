use criterion::{criterion_group, criterion_main, Criterion, Throughput};
use vclkit_syntax::parse;

fn long_concatenation(c: &mut Criterion) {
    let mut group = c.benchmark_group("long-concatenation");

    let mut source = "sub vcl_recv {\n  set req.http.X = \"a\"".to_string();
    for _i in 0..1000 {
        source.push_str(" \"b\" + req.http.Y");
    }
    source.push_str(";\n}\n");
    group.throughput(Throughput::Bytes(source.len() as u64));
    group.bench_function("long-concatenation", |b| b.iter(|| parse(&source).unwrap()));
}

fn commented_subroutine(c: &mut Criterion) {
    let mut group = c.benchmark_group("commented-subroutine");

    let mut source = "# recv\nsub vcl_recv {\n".to_string();
    for i in 0..200 {
        source.push_str(&format!(
            "  // leading {i}\n  if (req.http.A{i} ~ \"^x\" && /* inline */ !req.http.B) {{\n    set req.http.C = if(req.http.D, \"e\", \"f\"); # trailing\n  }} else {{\n    unset req.http.C;\n  }}\n"
        ));
    }
    source.push_str("}\n");
    group.throughput(Throughput::Bytes(source.len() as u64));
    group.bench_function("commented-subroutine", |b| b.iter(|| parse(&source).unwrap()));
}

criterion_group!(benches, long_concatenation, commented_subroutine);
criterion_main!(benches);
