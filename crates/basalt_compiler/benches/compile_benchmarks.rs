//! Benchmarks for basalt_compiler.
//!
//! Covers builtin installation, function lowering, jump resolution, and
//! whole-project compilation against the fixture library.

use basalt_compiler::ast::{BinaryOp, FunctionDecl, NodeFactory, SourceDeclaration, StmtKind};
use basalt_compiler::fixtures::Ambient;
use basalt_compiler::jumps;
use basalt_compiler::{
    CompilerConfig, Operation, Scope, SentinelId, compile_function, compile_project, install,
    lower_function,
};
use basalt_foundation::Type;
use criterion::{
    BatchSize, BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main,
};

// =============================================================================
// Helper Functions
// =============================================================================

/// A body summing `0..n` in a `while` loop, repeated `loops` times.
fn looping_function(factory: &mut NodeFactory, loops: usize) -> FunctionDecl {
    let n = factory.param("n", Type::Integer);
    let mut statements = Vec::new();
    for _ in 0..loops {
        let total = factory.ident("total");
        let i = factory.ident("i");
        let zero = factory.int(0);
        statements.push(factory.let_(&total, Type::Integer, Some(zero)));
        let zero = factory.int(0);
        statements.push(factory.let_(&i, Type::Integer, Some(zero)));

        let index = factory.name(&i, Type::Integer);
        let limit = factory.name(&n.ident, Type::Integer);
        let condition = factory.binary(BinaryOp::Lt, index, limit, Type::Boolean);

        let read_total = factory.name(&total, Type::Integer);
        let read_i = factory.name(&i, Type::Integer);
        let sum = factory.binary(BinaryOp::Add, read_total, read_i, Type::Integer);
        let target = factory.name(&total, Type::Integer);
        let accumulate = factory.assign(target, sum);
        let accumulate = factory.expr_stmt(accumulate);

        let read_i = factory.name(&i, Type::Integer);
        let one = factory.int(1);
        let next = factory.binary(BinaryOp::Add, read_i, one, Type::Integer);
        let target = factory.name(&i, Type::Integer);
        let step = factory.assign(target, next);
        let step = factory.expr_stmt(step);

        let block = factory.block(vec![accumulate, step]);
        let body = factory.stmt(StmtKind::Block(block));
        statements.push(factory.stmt(StmtKind::While {
            condition,
            body: Box::new(body),
        }));
    }
    factory.function("sum", vec![n], Type::Integer, statements)
}

/// A pending body with `count` forward jumps, each to its own sentinel.
fn pending_jumps(count: usize) -> Vec<Operation> {
    let mut ops = Vec::with_capacity(count * 3);
    for id in 0..count {
        let sentinel = SentinelId(u32::try_from(id).unwrap());
        ops.push(Operation::jump(sentinel));
        ops.push(Operation::PushInt(1));
        ops.push(Operation::Drop);
    }
    for id in 0..count {
        ops.push(Operation::Sentinel(SentinelId(u32::try_from(id).unwrap())));
    }
    ops
}

/// `count` syscall-reading functions over the fixture library.
fn project_sources(ambient: &mut Ambient, count: usize) -> Vec<SourceDeclaration> {
    (0..count)
        .map(|index| {
            let time = ambient.access("Runtime", "time", Type::Integer);
            let offset = ambient.factory.int(i128::try_from(index).unwrap());
            let sum = ambient
                .factory
                .binary(BinaryOp::Add, time, offset, Type::Integer);
            let ret = ambient.factory.ret(Some(sum));
            let name = format!("read{index}");
            let decl = ambient
                .factory
                .function(&name, Vec::new(), Type::Integer, vec![ret]);
            SourceDeclaration::Function(decl)
        })
        .collect()
}

// =============================================================================
// Builtin Benchmarks
// =============================================================================

fn builtin_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("builtins");
    let ambient = Ambient::new();
    let config = CompilerConfig::strict();

    group.bench_function("install_standard_library", |b| {
        b.iter(|| black_box(install(black_box(&ambient.declarations), &config).unwrap()));
    });

    group.bench_function("global_scope", |b| {
        let builtins = install(&ambient.declarations, &config).unwrap();
        b.iter(|| black_box(builtins.scope()));
    });

    group.finish();
}

// =============================================================================
// Lowering Benchmarks
// =============================================================================

fn lowering_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("lowering");
    let config = CompilerConfig::default();

    for loops in [1, 10, 50] {
        let mut factory = NodeFactory::new();
        let decl = looping_function(&mut factory, loops);
        group.throughput(Throughput::Elements(loops as u64));

        group.bench_with_input(BenchmarkId::new("lower_loops", loops), &decl, |b, decl| {
            b.iter(|| black_box(lower_function(decl, &Scope::empty(), &config).unwrap()));
        });

        group.bench_with_input(BenchmarkId::new("compile_loops", loops), &decl, |b, decl| {
            b.iter(|| black_box(compile_function(decl, &Scope::empty(), &config).unwrap()));
        });
    }

    group.finish();
}

// =============================================================================
// Jump Resolution Benchmarks
// =============================================================================

fn jump_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("jumps");

    for count in [10, 100, 1000] {
        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::new("resolve", count), &count, |b, &count| {
            b.iter_batched(
                || pending_jumps(count),
                |ops| black_box(jumps::resolve(ops).unwrap()),
                BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

// =============================================================================
// Project Benchmarks
// =============================================================================

fn project_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("project");
    let config = CompilerConfig::strict();

    for count in [1, 10, 100] {
        let mut ambient = Ambient::new();
        let sources = project_sources(&mut ambient, count);
        group.throughput(Throughput::Elements(count as u64));

        group.bench_with_input(BenchmarkId::new("compile_project", count), &sources, |b, sources| {
            b.iter(|| {
                black_box(compile_project(&ambient.declarations, sources, &config).unwrap())
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    builtin_benchmarks,
    lowering_benchmarks,
    jump_benchmarks,
    project_benchmarks,
);
criterion_main!(benches);
