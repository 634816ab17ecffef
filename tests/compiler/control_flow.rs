//! Integration tests for control flow lowering and jump resolution

use basalt_compiler::ast::{Block, CatchClause, NodeFactory, Stmt, StmtKind};
use basalt_compiler::jumps::is_resolved;
use basalt_compiler::{CompilerConfig, JumpKind, JumpTarget, Operation, Scope, compile_function};
use basalt_foundation::Type;
use proptest::prelude::*;

/// Shape of a statement tree, independent of node identities.
#[derive(Clone, Debug)]
enum Shape {
    Effect,
    Return,
    Break,
    Continue,
    If(Vec<Shape>, Option<Vec<Shape>>),
    While(Vec<Shape>),
    DoWhile(Vec<Shape>),
    Try {
        block: Vec<Shape>,
        catch: bool,
        finally: Option<Vec<Shape>>,
    },
}

fn shape() -> impl Strategy<Value = Shape> {
    let leaf = prop_oneof![
        4 => Just(Shape::Effect),
        1 => Just(Shape::Return),
        1 => Just(Shape::Break),
        1 => Just(Shape::Continue),
    ];
    leaf.prop_recursive(4, 32, 4, |inner| {
        let body = prop::collection::vec(inner, 0..4);
        prop_oneof![
            (body.clone(), prop::option::of(body.clone())).prop_map(|(t, e)| Shape::If(t, e)),
            body.clone().prop_map(Shape::While),
            body.clone().prop_map(Shape::DoWhile),
            (body.clone(), any::<bool>(), prop::option::of(body)).prop_map(|(block, catch, finally)| {
                Shape::Try {
                    block,
                    catch: catch || finally.is_none(),
                    finally,
                }
            }),
        ]
    })
}

fn build(factory: &mut NodeFactory, shape: &Shape) -> Stmt {
    match shape {
        Shape::Effect => {
            let value = factory.int(1);
            factory.expr_stmt(value)
        }
        Shape::Return => factory.ret(None),
        Shape::Break => factory.stmt(StmtKind::Break),
        Shape::Continue => factory.stmt(StmtKind::Continue),
        Shape::If(then_branch, else_branch) => {
            let condition = factory.boolean(true);
            let then_branch = Box::new(nested(factory, then_branch));
            let else_branch = else_branch.as_ref().map(|e| Box::new(nested(factory, e)));
            factory.stmt(StmtKind::If {
                condition,
                then_branch,
                else_branch,
            })
        }
        Shape::While(body) => {
            let condition = factory.boolean(true);
            let body = Box::new(nested(factory, body));
            factory.stmt(StmtKind::While { condition, body })
        }
        Shape::DoWhile(body) => {
            let body = Box::new(nested(factory, body));
            let condition = factory.boolean(false);
            factory.stmt(StmtKind::DoWhile { body, condition })
        }
        Shape::Try {
            block,
            catch,
            finally,
        } => {
            let block = statements(factory, block);
            let catch = catch.then(|| {
                let binding = Some(factory.ident("e"));
                let handler = factory.block(Vec::new());
                CatchClause {
                    binding,
                    block: handler,
                    node: factory.node(),
                }
            });
            let finally = finally.as_ref().map(|f| statements(factory, f));
            factory.stmt(StmtKind::Try {
                block,
                catch,
                finally,
            })
        }
    }
}

fn statements(factory: &mut NodeFactory, shapes: &[Shape]) -> Block {
    let stmts = shapes.iter().map(|s| build(factory, s)).collect();
    factory.block(stmts)
}

fn nested(factory: &mut NodeFactory, shapes: &[Shape]) -> Stmt {
    let block = statements(factory, shapes);
    factory.stmt(StmtKind::Block(block))
}

fn compile(factory: &mut NodeFactory, body: Vec<Stmt>) -> Vec<Operation> {
    let decl = factory.function("f", Vec::new(), Type::Void, body);
    let (function, _) = compile_function(&decl, &Scope::empty(), &CompilerConfig::default()).unwrap();
    function.operations
}

/// Absolute destination of every resolved target.
fn destinations(ops: &[Operation]) -> Vec<(usize, usize)> {
    let mut out = Vec::new();
    for (index, op) in ops.iter().enumerate() {
        for target in op.targets() {
            let JumpTarget::Offset(offset) = target else {
                panic!("pending target at {index}: {op:?}");
            };
            let destination = i64::try_from(index).unwrap() + i64::from(offset);
            out.push((index, usize::try_from(destination).unwrap()));
        }
    }
    out
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn every_target_lands_on_a_sentinel(shapes in prop::collection::vec(shape(), 0..6)) {
        let mut factory = NodeFactory::new();
        let body = shapes.iter().map(|s| build(&mut factory, s)).collect();
        let ops = compile(&mut factory, body);

        prop_assert!(is_resolved(&ops));
        for (source, destination) in destinations(&ops) {
            prop_assert!(destination < ops.len(), "jump at {} leaves the function", source);
            prop_assert!(
                matches!(ops[destination], Operation::Sentinel(_)),
                "jump at {} lands on {:?}",
                source,
                ops[destination]
            );
        }
    }
}

#[test]
fn while_loop_jumps_back_to_its_test() {
    let mut factory = NodeFactory::new();
    let body = nested(&mut factory, &[Shape::Effect]);
    let condition = factory.boolean(true);
    let stmt = factory.stmt(StmtKind::While {
        condition,
        body: Box::new(body),
    });
    let ops = compile(&mut factory, vec![stmt]);

    let backward: Vec<_> = destinations(&ops)
        .into_iter()
        .filter(|(source, destination)| destination < source)
        .collect();
    assert_eq!(backward.len(), 1);
    let (source, destination) = backward[0];
    assert_eq!(ops[source], Operation::Jump(JumpKind::Always, ops_offset(source, destination)));
    assert_eq!(ops[destination + 1], Operation::PushBool(true));
}

#[test]
fn break_inside_try_leaves_through_endtry() {
    let mut factory = NodeFactory::new();
    let loop_body = nested(
        &mut factory,
        &[Shape::Try {
            block: vec![Shape::Break],
            catch: true,
            finally: None,
        }],
    );
    let condition = factory.boolean(true);
    let stmt = factory.stmt(StmtKind::While {
        condition,
        body: Box::new(loop_body),
    });
    let ops = compile(&mut factory, vec![stmt]);
    assert!(is_resolved(&ops));
    let end_tries = ops.iter().filter(|op| matches!(op, Operation::EndTry(_))).count();
    // The break, the end of the protected block, and the end of the handler.
    assert_eq!(end_tries, 3);
}

fn ops_offset(source: usize, destination: usize) -> JumpTarget {
    let offset = i64::try_from(destination).unwrap() - i64::try_from(source).unwrap();
    JumpTarget::Offset(i32::try_from(offset).unwrap())
}
