use baton::sync::{Mutex, ReleaseError, SequentialTokens, Token};
use baton::{RuntimeBuilder, join, task, yield_now};
use std::cell::{Cell, RefCell};
use std::pin::pin;
use std::rc::Rc;
use std::task::{Context, Poll, Waker};
use uuid::{Uuid, Version};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[baton::test]
async fn can_be_acquired_asynchronously_and_released() {
    init_logger();
    let mutex = Mutex::new();

    let token = mutex.acquire().await;
    assert!(mutex.is_locked());

    mutex.release(token).unwrap();
    assert!(!mutex.is_locked());
}

#[baton::test]
async fn acquired_mutex_returns_a_valid_uuid_token() {
    let mutex = Mutex::new();
    let token = mutex.acquire().await;

    assert_eq!(token.as_uuid().get_version(), Some(Version::Random));
    assert_eq!(token.to_string().parse::<Token>().unwrap(), token);

    mutex.release(token).unwrap();
}

#[test]
fn acquiring_a_free_mutex_does_not_suspend() {
    let mutex = Mutex::new();

    let acquire = mutex.acquire();
    assert!(acquire.is_granted());
    assert!(mutex.is_locked());

    let mut acquire = pin!(acquire);
    let mut cx = Context::from_waker(Waker::noop());
    let Poll::Ready(token) = acquire.as_mut().poll(&mut cx) else {
        panic!("acquiring a free mutex suspended the caller");
    };

    mutex.release(token).unwrap();
    assert!(!mutex.is_locked());
}

#[test]
fn acquiring_a_held_mutex_suspends_until_release() {
    let mutex = Mutex::with_source(SequentialTokens::new());
    let holder = mutex.try_acquire().unwrap();

    let mut acquire = pin!(mutex.acquire());
    let mut cx = Context::from_waker(Waker::noop());

    assert!(acquire.as_mut().poll(&mut cx).is_pending());
    assert!(acquire.as_mut().poll(&mut cx).is_pending());
    assert_eq!(mutex.waiters(), 1);

    mutex.release(holder).unwrap();
    assert!(mutex.is_locked());
    assert_eq!(mutex.waiters(), 0);

    let Poll::Ready(next) = acquire.as_mut().poll(&mut cx) else {
        panic!("waiter was not resumed by release");
    };
    assert_eq!(next, Token::from(Uuid::from_u128(2)));
    mutex.release(next).unwrap();
}

#[test]
fn release_without_acquire_is_an_illegal_state() {
    let mutex = Mutex::new();

    assert_eq!(
        mutex.release(Token::from(Uuid::nil())),
        Err(ReleaseError::IllegalState)
    );
    assert!(!mutex.is_locked());
}

#[baton::test]
async fn release_with_a_foreign_token_is_rejected_and_leaves_the_lock_held() {
    let mutex = Mutex::new();
    let token = mutex.acquire().await;

    assert_eq!(
        mutex.release(Token::from(Uuid::from_u128(0xabc123))),
        Err(ReleaseError::TokenMismatch)
    );
    assert!(mutex.is_locked());

    mutex.release(token).unwrap();
    assert!(!mutex.is_locked());
}

#[test]
fn a_token_is_accepted_by_exactly_one_release() {
    let mutex = Mutex::new();

    let token = mutex.try_acquire().unwrap();
    mutex.release(token).unwrap();
    assert_eq!(mutex.release(token), Err(ReleaseError::IllegalState));

    let stale = token;
    let current = mutex.try_acquire().unwrap();
    assert_ne!(stale, current);
    assert_eq!(mutex.release(stale), Err(ReleaseError::TokenMismatch));
    mutex.release(current).unwrap();
}

#[test]
fn every_grant_mints_a_fresh_token() {
    let mutex = Mutex::with_source(SequentialTokens::new());

    let first = mutex.try_acquire().unwrap();
    mutex.release(first).unwrap();
    let second = mutex.try_acquire().unwrap();

    assert_eq!(first, Token::from(Uuid::from_u128(1)));
    assert_eq!(second, Token::from(Uuid::from_u128(2)));
    mutex.release(second).unwrap();
}

#[test]
fn custom_token_sources_are_used_for_every_grant() {
    let minted = Rc::new(Cell::new(0u128));
    let counter = minted.clone();
    let mutex = Mutex::with_source(move || {
        counter.set(counter.get() + 1);
        Token::from(Uuid::from_u128(counter.get() * 100))
    });

    let token = mutex.try_acquire().unwrap();
    assert_eq!(token, Token::from(Uuid::from_u128(100)));
    mutex.release(token).unwrap();
    assert_eq!(minted.get(), 1);
}

#[test]
fn try_acquire_never_queues() {
    let mutex = Mutex::new();

    let token = mutex.try_acquire().unwrap();
    assert_eq!(mutex.try_acquire(), None);
    assert_eq!(mutex.waiters(), 0);

    mutex.release(token).unwrap();
    assert!(mutex.try_acquire().is_some());
}

#[baton::test]
async fn waiters_are_resumed_in_arrival_order() {
    let mutex = Rc::new(Mutex::with_source(SequentialTokens::new()));
    let order = Rc::new(RefCell::new(Vec::new()));

    let holder = mutex.acquire().await;

    let mut handles = Vec::new();
    for id in 1..=3 {
        let mutex = mutex.clone();
        let order = order.clone();

        handles.push(task::spawn(async move {
            let token = mutex.acquire().await;
            order.borrow_mut().push((id, token));
            mutex.release(token).unwrap();
        }));

        // Let the task queue itself before the next one is spawned.
        yield_now().await;
    }

    assert_eq!(mutex.waiters(), 3);
    mutex.release(holder).unwrap();

    for handle in handles {
        handle.await;
    }

    let expected: Vec<_> = (1..=3)
        .map(|id| (id, Token::from(Uuid::from_u128(id as u128 + 1))))
        .collect();
    assert_eq!(*order.borrow(), expected);
    assert!(!mutex.is_locked());
}

#[baton::test]
async fn arrival_order_wins_over_polling_order() {
    let mutex = Mutex::new();
    let order = RefCell::new(Vec::new());

    let holder = mutex.acquire().await;
    let first = mutex.acquire();
    let second = mutex.acquire();

    // `second` is polled before `first` on every round.
    join!(
        async {
            let token = second.await;
            order.borrow_mut().push(2);
            mutex.release(token).unwrap();
        },
        async {
            let token = first.await;
            order.borrow_mut().push(1);
            mutex.release(token).unwrap();
        },
        async {
            yield_now().await;
            mutex.release(holder).unwrap();
        }
    );

    assert_eq!(*order.borrow(), vec![1, 2]);
    assert!(!mutex.is_locked());
}

#[baton::test]
async fn blocks_async_code_that_has_not_acquired_the_mutex() {
    let mutex = Mutex::new();
    let semaphore = Cell::new(1);

    let mutex = &mutex;
    let semaphore = &semaphore;
    let critical_section = move || async move {
        let token = mutex.acquire().await;
        assert_eq!(semaphore.get(), 1);

        semaphore.set(semaphore.get() - 1);
        yield_now().await;
        assert_eq!(semaphore.get(), 0);

        semaphore.set(semaphore.get() + 1);
        mutex.release(token).unwrap();
    };

    join!(critical_section(), critical_section());
    assert_eq!(semaphore.get(), 1);
}

#[derive(Default)]
struct DataStore {
    fetched: Option<Vec<u32>>,
}

#[baton::test]
async fn blocks_data_access_while_the_holder_fetches() {
    let mutex = Rc::new(Mutex::new());
    let store = Rc::new(RefCell::new(DataStore::default()));
    let order = Rc::new(Cell::new(0));

    let first = {
        let (mutex, store, order) = (mutex.clone(), store.clone(), order.clone());
        task::spawn(async move {
            assert_eq!(order.get(), 0);
            order.set(order.get() + 1);

            let token = mutex.acquire().await;
            assert!(store.borrow().fetched.is_none());

            // Stand-in for a slow fetch: several suspension points.
            for _ in 0..3 {
                yield_now().await;
            }

            // `second` has asked for the store by now.
            assert_eq!(order.get(), 2);
            order.set(order.get() + 1);

            store.borrow_mut().fetched = Some(vec![1, 2, 3]);
            mutex.release(token).unwrap();
        })
    };

    let second = {
        let (mutex, store, order) = (mutex.clone(), store.clone(), order.clone());
        task::spawn(async move {
            assert_eq!(order.get(), 1);
            order.set(order.get() + 1);

            let token = mutex.acquire().await;

            // Only reachable once `first` released the store.
            assert_eq!(order.get(), 3);
            order.set(order.get() + 1);

            assert_eq!(store.borrow().fetched.as_deref(), Some(&[1, 2, 3][..]));
            mutex.release(token).unwrap();
        })
    };

    first.await;
    second.await;
    assert_eq!(order.get(), 4);
}

#[test]
fn dropping_a_queued_acquire_leaves_the_queue() {
    let mutex = Mutex::new();
    let holder = mutex.try_acquire().unwrap();

    let pending = mutex.acquire();
    assert!(!pending.is_granted());
    assert_eq!(mutex.waiters(), 1);

    drop(pending);
    assert_eq!(mutex.waiters(), 0);

    mutex.release(holder).unwrap();
    assert!(!mutex.is_locked());
}

#[test]
fn dropping_an_unclaimed_grant_passes_the_lock_on() {
    let mutex = Mutex::new();
    let holder = mutex.try_acquire().unwrap();

    let first = mutex.acquire();
    let second = mutex.acquire();

    mutex.release(holder).unwrap();
    assert!(first.is_granted());
    assert!(!second.is_granted());

    drop(first);
    assert!(second.is_granted());
    assert!(mutex.is_locked());

    drop(second);
    assert!(!mutex.is_locked());
}

#[test]
fn dropping_an_unpolled_fast_path_acquire_unlocks() {
    let mutex = Mutex::new();

    drop(mutex.acquire());

    assert!(!mutex.is_locked());
    assert!(mutex.try_acquire().is_some());
}

#[test]
#[should_panic(expected = "block_on stalled")]
fn reacquiring_while_holding_deadlocks() {
    let rt = RuntimeBuilder::new().build();

    rt.block_on(async {
        let mutex = Mutex::new();
        let _token = mutex.acquire().await;
        mutex.acquire().await;
    });
}

#[test]
#[should_panic(expected = "block_on stalled")]
fn a_lock_that_is_never_released_starves_waiters() {
    let rt = RuntimeBuilder::new().build();
    let mutex = Rc::new(Mutex::new());

    let m = mutex.clone();
    rt.spawn(async move {
        let _forgotten = m.acquire().await;
    });

    rt.block_on(async move {
        yield_now().await;
        mutex.acquire().await;
    });
}

#[test]
fn debug_output_reports_lock_state() {
    let mutex = Mutex::new();
    assert_eq!(format!("{mutex:?}"), "Mutex { locked: false, waiters: 0 }");

    let token = mutex.try_acquire().unwrap();
    let _queued = mutex.acquire();
    assert_eq!(format!("{mutex:?}"), "Mutex { locked: true, waiters: 1 }");

    drop(_queued);
    mutex.release(token).unwrap();
}
