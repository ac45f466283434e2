use baton::sync::Mutex;
use baton::{task, yield_now};
use std::cell::Cell;
use std::rc::Rc;

#[baton::main]
async fn main() {
    env_logger::init();

    let mutex = Rc::new(Mutex::new());
    let counter = Rc::new(Cell::new(0usize));

    let mut handles = Vec::new();

    for worker in 0..10 {
        let mutex = mutex.clone();
        let counter = counter.clone();

        handles.push(task::spawn(async move {
            let token = mutex.acquire().await;

            // Read, suspend, write: only safe because the lock is held.
            let seen = counter.get();
            yield_now().await;
            counter.set(seen + 1);

            println!("worker {worker} incremented the counter to {}", seen + 1);
            mutex.release(token).expect("released by its holder");
        }));
    }

    for handle in handles {
        handle.await;
    }

    assert_eq!(counter.get(), 10);
}
