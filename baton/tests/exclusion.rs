use baton::sync::Mutex;
use baton::{RuntimeBuilder, yield_now};
use proptest::prelude::*;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// Runs one task per entry of `sections`; each task holds the lock across
/// that many suspension points. Returns the order in which tasks entered
/// the critical section and the highest number of tasks seen inside it.
fn run_contended(sections: &[usize]) -> (Vec<usize>, usize) {
    let rt = RuntimeBuilder::new().build();
    let mutex = Rc::new(Mutex::new());
    let inside = Rc::new(Cell::new(0usize));
    let peak = Rc::new(Cell::new(0usize));
    let entered = Rc::new(RefCell::new(Vec::new()));

    let handles: Vec<_> = sections
        .iter()
        .copied()
        .enumerate()
        .map(|(id, yields)| {
            let (mutex, inside, peak, entered) =
                (mutex.clone(), inside.clone(), peak.clone(), entered.clone());

            rt.spawn(async move {
                let token = mutex.acquire().await;

                inside.set(inside.get() + 1);
                peak.set(peak.get().max(inside.get()));
                entered.borrow_mut().push(id);

                for _ in 0..yields {
                    yield_now().await;
                }

                inside.set(inside.get() - 1);
                mutex.release(token).unwrap();
            })
        })
        .collect();

    rt.block_on(async move {
        for handle in handles {
            handle.await;
        }
    });

    assert!(!mutex.is_locked());
    assert_eq!(mutex.waiters(), 0);

    let order = entered.borrow().clone();
    (order, peak.get())
}

#[test]
fn a_single_task_never_waits() {
    let (order, peak) = run_contended(&[3]);

    assert_eq!(order, vec![0]);
    assert_eq!(peak, 1);
}

#[test]
fn counter_is_never_observed_torn() {
    let rt = RuntimeBuilder::new().build();
    let mutex = Rc::new(Mutex::new());
    let counter = Rc::new(Cell::new(0i32));
    let observed = Rc::new(RefCell::new(Vec::new()));

    let spawn_worker = |delta: i32| {
        let (mutex, counter, observed) = (mutex.clone(), counter.clone(), observed.clone());
        rt.spawn(async move {
            for _ in 0..5 {
                let token = mutex.acquire().await;

                observed.borrow_mut().push(counter.get());
                counter.set(counter.get() + delta);
                yield_now().await;
                observed.borrow_mut().push(counter.get());
                counter.set(counter.get() - delta);

                mutex.release(token).unwrap();
                yield_now().await;
            }
        })
    };

    let up = spawn_worker(1);
    let down = spawn_worker(-1);

    rt.block_on(async move {
        up.await;
        down.await;
    });

    let observed = observed.borrow();
    assert_eq!(observed.len(), 20);
    for pair in observed.chunks(2) {
        assert_eq!(pair[0], 0, "critical section entered with a torn counter");
        assert!(pair[1] == 1 || pair[1] == -1);
    }
    assert_eq!(counter.get(), 0);
}

proptest! {
    #[test]
    fn at_most_one_task_holds_the_lock(sections in prop::collection::vec(0usize..4, 1..16)) {
        let (order, peak) = run_contended(&sections);

        prop_assert_eq!(peak, 1);
        prop_assert_eq!(order, (0..sections.len()).collect::<Vec<_>>());
    }
}
