use criterion::{criterion_group, criterion_main, BatchSize, Criterion};

use altair_vm::ecmascript::{
    abstract_operations::operations_on_objects::call,
    builtins::{
        array_create, create_builtin,
        indexed_collections::array_objects::{ArrayPrototypePush, ArrayPrototypeSplice},
    },
    execution::Agent,
    types::{Object, Value},
};
use altair_vm::heap::indexed_properties::{self, iterator::IndexedPropertyIterator};

fn dense_agent(length: u32) -> (Agent, Object) {
    let mut agent = Agent::default();
    let array = array_create(&mut agent, length);
    let object = Object::Array(array);
    for index in 0..length {
        indexed_properties::put(&mut agent, object, index, Value::Integer(index as i32)).unwrap();
    }
    (agent, object)
}

fn scattered_agent(count: u32, stride: u32) -> (Agent, Object) {
    let mut agent = Agent::default();
    let array = array_create(&mut agent, 0);
    let object = Object::Array(array);
    for position in 0..count {
        let index = position * stride;
        indexed_properties::put(&mut agent, object, index, Value::Integer(position as i32))
            .unwrap();
    }
    (agent, object)
}

fn bench_storage(c: &mut Criterion) {
    c.bench_function("dense sequential put", |b| {
        b.iter_batched(
            || {
                let mut agent = Agent::default();
                let array = array_create(&mut agent, 0);
                (agent, Object::Array(array))
            },
            |(mut agent, object)| {
                for index in 0..4096u32 {
                    indexed_properties::put(&mut agent, object, index, Value::Integer(1)).unwrap();
                }
            },
            BatchSize::LargeInput,
        )
    });

    c.bench_function("scattered put builds a tree", |b| {
        b.iter_batched(
            || {
                let mut agent = Agent::default();
                let array = array_create(&mut agent, 0);
                (agent, Object::Array(array))
            },
            |(mut agent, object)| {
                for position in 0..1024u32 {
                    let index = position.wrapping_mul(2654435761) % 100_000_000;
                    indexed_properties::put(&mut agent, object, index, Value::Integer(1)).unwrap();
                }
            },
            BatchSize::LargeInput,
        )
    });

    c.bench_function("dense random get", |b| {
        let (mut agent, object) = dense_agent(4096);
        b.iter(|| {
            let mut sum = 0i64;
            for position in 0..4096u32 {
                let index = position.wrapping_mul(48271) % 4096;
                if let Some(Value::Integer(int)) =
                    indexed_properties::get(&mut agent, object, index).unwrap()
                {
                    sum += int as i64;
                }
            }
            sum
        })
    });

    c.bench_function("sparse iteration", |b| {
        let (agent, object) = scattered_agent(4096, 1000);
        b.iter(|| {
            let mut iterator = IndexedPropertyIterator::new(object);
            let mut visited = 0u32;
            while iterator.next(&agent).is_some() {
                visited += 1;
            }
            visited
        })
    });
}

fn bench_builtins(c: &mut Criterion) {
    c.bench_function("Array.prototype.push", |b| {
        b.iter_batched(
            || {
                let mut agent = Agent::default();
                let array = array_create(&mut agent, 0);
                let push = Value::from(create_builtin::<ArrayPrototypePush>(&mut agent));
                (agent, Value::Array(array), push)
            },
            |(mut agent, this, push)| {
                for int in 0..1024i32 {
                    call(&mut agent, push, this, &[Value::Integer(int)]).unwrap();
                }
            },
            BatchSize::LargeInput,
        )
    });

    c.bench_function("Array.prototype.splice shrink", |b| {
        b.iter_batched(
            || {
                let (mut agent, object) = dense_agent(2048);
                let splice = Value::from(create_builtin::<ArrayPrototypeSplice>(&mut agent));
                let Object::Array(array) = object else {
                    unreachable!()
                };
                (agent, Value::Array(array), splice)
            },
            |(mut agent, this, splice)| {
                call(
                    &mut agent,
                    splice,
                    this,
                    &[Value::Integer(16), Value::Integer(1024)],
                )
                .unwrap();
            },
            BatchSize::LargeInput,
        )
    });
}

criterion_group!(benches, bench_storage, bench_builtins);
criterion_main!(benches);
