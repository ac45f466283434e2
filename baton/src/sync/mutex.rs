use super::error::ReleaseError;
use super::token::{RandomTokens, Token, TokenSource};

use log::{debug, trace};
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::fmt;
use std::future::Future;
use std::mem;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll, Waker};

/// A token-checked asynchronous mutex for cooperative tasks.
///
/// `Mutex` guards no data of its own; it hands out a [`Token`] to the task
/// that acquires it, and only that token can release it. Tasks that cannot
/// acquire the lock are suspended and resumed one at a time, in the order
/// they called [`acquire`](Self::acquire).
///
/// The lock is not reentrant: a holder that acquires again waits for
/// itself forever. Every successful acquire must be matched by exactly one
/// [`release`](Self::release) with the token it returned; a token that is
/// never released starves every current and future waiter.
///
/// The mutex is meant for a single-threaded cooperative scheduler and is
/// neither `Send` nor `Sync`. Share it between tasks with `Rc`.
///
/// # Examples
///
/// ```rust
/// use baton::sync::Mutex;
///
/// #[baton::main]
/// async fn main() {
///     let mutex = Mutex::new();
///
///     let token = mutex.acquire().await;
///     // ... exclusive access ...
///     mutex.release(token).unwrap();
/// }
/// ```
pub struct Mutex<S = RandomTokens> {
    state: RefCell<State<S>>,
}

struct State<S> {
    /// Whether a task currently holds the lock.
    locked: bool,

    /// Token of the current holder; `Some` exactly when `locked`.
    holder: Option<Token>,

    /// Suspended acquirers, oldest first.
    waiters: VecDeque<Rc<Waiter>>,

    /// Where fresh tokens come from.
    source: S,
}

/// A queued acquire.
///
/// The slot is shared between the mutex queue and the [`Acquire`] future.
/// `release` fills in the token and wakes the task; the future picks the
/// token up on its next poll.
#[derive(Default)]
struct Waiter {
    token: Cell<Option<Token>>,
    waker: RefCell<Option<Waker>>,
}

impl Mutex<RandomTokens> {
    /// Creates an unlocked mutex that mints random version 4 UUID tokens.
    pub fn new() -> Self {
        Self::with_source(RandomTokens::new())
    }
}

impl Default for Mutex<RandomTokens> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: TokenSource> Mutex<S> {
    /// Creates an unlocked mutex that takes its tokens from `source`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use baton::sync::{Mutex, SequentialTokens};
    ///
    /// let mutex = Mutex::with_source(SequentialTokens::new());
    /// let token = mutex.try_acquire().unwrap();
    /// assert_eq!(token.to_string(), "00000000-0000-0000-0000-000000000001");
    /// ```
    pub fn with_source(source: S) -> Self {
        Self {
            state: RefCell::new(State {
                locked: false,
                holder: None,
                waiters: VecDeque::new(),
                source,
            }),
        }
    }

    /// Requests exclusive access.
    ///
    /// The request is registered when this method is called, not when the
    /// returned future is first polled:
    /// - if the mutex is free it is granted on the spot and the future
    ///   resolves on its first poll without suspending;
    /// - otherwise the caller joins the back of the wait queue and the future
    ///   stays pending until a [`release`](Self::release) hands it the lock.
    ///
    /// Waiters are served strictly in call order. There is no timeout.
    ///
    /// Dropping the future gives up the request: a queued waiter leaves the
    /// queue, and a lock granted to a future that was never polled to
    /// completion is released again.
    pub fn acquire(&self) -> Acquire<'_, S> {
        let mut state = self.state.borrow_mut();

        if !state.locked {
            let token = state.grant();
            trace!("mutex granted to {token} without waiting");

            return Acquire {
                mutex: self,
                phase: Phase::Granted(token),
            };
        }

        let waiter = Rc::new(Waiter::default());
        state.waiters.push_back(waiter.clone());
        trace!("mutex busy, {} waiter(s) queued", state.waiters.len());

        Acquire {
            mutex: self,
            phase: Phase::Queued(waiter),
        }
    }

    /// Acquires the mutex only if it is free.
    ///
    /// Returns `None` without queuing when the mutex is held.
    pub fn try_acquire(&self) -> Option<Token> {
        let mut state = self.state.borrow_mut();
        if state.locked {
            return None;
        }

        let token = state.grant();
        trace!("mutex granted to {token} by try_acquire");
        Some(token)
    }

    /// Relinquishes access.
    ///
    /// `token` must be the one returned by the matching acquire. If tasks are
    /// waiting, the oldest one receives a fresh token and is woken; the mutex
    /// stays locked throughout the handoff. Otherwise the mutex becomes free.
    ///
    /// This never suspends.
    ///
    /// # Errors
    ///
    /// - [`ReleaseError::IllegalState`] if the mutex is not held.
    /// - [`ReleaseError::TokenMismatch`] if `token` is not the holder's
    ///   token. The holder can still release afterwards.
    pub fn release(&self, token: Token) -> Result<(), ReleaseError> {
        let waker = {
            let mut state = self.state.borrow_mut();

            if !state.locked {
                debug!("rejected release of {token}: mutex is not locked");
                return Err(ReleaseError::IllegalState);
            }
            if state.holder != Some(token) {
                debug!("rejected release of {token}: not the current holder");
                return Err(ReleaseError::TokenMismatch);
            }

            state.hand_off()
        };

        // The borrow must end before waking: a waker may call back into
        // the mutex.
        if let Some(waker) = waker {
            waker.wake();
        }

        Ok(())
    }

    /// Returns `true` if a task currently holds the lock.
    pub fn is_locked(&self) -> bool {
        self.state.borrow().locked
    }

    /// Returns the number of tasks waiting for the lock.
    pub fn waiters(&self) -> usize {
        self.state.borrow().waiters.len()
    }

    /// Removes a waiter whose `Acquire` was dropped before being granted.
    fn withdraw(&self, waiter: &Rc<Waiter>) {
        let mut state = self.state.borrow_mut();
        state.waiters.retain(|queued| !Rc::ptr_eq(queued, waiter));
        trace!("waiter withdrawn, {} still queued", state.waiters.len());
    }
}

impl<S: TokenSource> State<S> {
    /// Locks the mutex for a new holder and returns its token.
    fn grant(&mut self) -> Token {
        let token = self.source.mint();
        self.locked = true;
        self.holder = Some(token);
        token
    }

    /// Passes the lock to the oldest waiter, or unlocks if there is none.
    ///
    /// Returns the waker of the new holder, if it has been polled already.
    fn hand_off(&mut self) -> Option<Waker> {
        let Some(waiter) = self.waiters.pop_front() else {
            self.locked = false;
            self.holder = None;
            trace!("mutex unlocked");
            return None;
        };

        let token = self.source.mint();
        self.holder = Some(token);
        waiter.token.set(Some(token));
        trace!(
            "mutex handed off to {token}, {} waiter(s) left",
            self.waiters.len()
        );

        waiter.waker.borrow_mut().take()
    }
}

impl<S> fmt::Debug for Mutex<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut d = f.debug_struct("Mutex");
        match self.state.try_borrow() {
            Ok(state) => d
                .field("locked", &state.locked)
                .field("waiters", &state.waiters.len()),
            Err(_) => d.field("state", &"<borrowed>"),
        };
        d.finish()
    }
}

enum Phase {
    /// Granted at call time; the token has not been returned yet.
    Granted(Token),
    /// Waiting in the queue, or granted by a release but not yet polled.
    Queued(Rc<Waiter>),
    /// The token has been returned to the caller.
    Done,
}

/// Future returned by [`Mutex::acquire`].
///
/// Resolves to the [`Token`] proving ownership of the lock.
#[must_use = "the lock is released again if the `Acquire` future is dropped"]
pub struct Acquire<'a, S: TokenSource = RandomTokens> {
    mutex: &'a Mutex<S>,
    phase: Phase,
}

impl<S: TokenSource> Acquire<'_, S> {
    /// Returns `true` if the lock has been granted to this request, so the
    /// next poll resolves without suspending.
    pub fn is_granted(&self) -> bool {
        match &self.phase {
            Phase::Granted(_) => true,
            Phase::Queued(waiter) => waiter.token.get().is_some(),
            Phase::Done => false,
        }
    }
}

impl<S: TokenSource> Future for Acquire<'_, S> {
    type Output = Token;

    /// # Panics
    ///
    /// Panics if polled again after it returned `Poll::Ready`.
    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Token> {
        let this = self.get_mut();

        match mem::replace(&mut this.phase, Phase::Done) {
            Phase::Granted(token) => Poll::Ready(token),
            Phase::Queued(waiter) => {
                if let Some(token) = waiter.token.take() {
                    return Poll::Ready(token);
                }

                {
                    let mut slot = waiter.waker.borrow_mut();
                    match slot.as_ref() {
                        Some(waker) if waker.will_wake(cx.waker()) => {}
                        _ => *slot = Some(cx.waker().clone()),
                    }
                }

                this.phase = Phase::Queued(waiter);
                Poll::Pending
            }
            Phase::Done => panic!("`Acquire` polled after completion"),
        }
    }
}

impl<S: TokenSource> Drop for Acquire<'_, S> {
    fn drop(&mut self) {
        let token = match mem::replace(&mut self.phase, Phase::Done) {
            Phase::Done => return,
            Phase::Granted(token) => token,
            Phase::Queued(waiter) => match waiter.token.take() {
                Some(token) => token,
                None => {
                    self.mutex.withdraw(&waiter);
                    return;
                }
            },
        };

        trace!("unclaimed grant {token} dropped, releasing");
        // The token was minted for this request and never left it, so it is
        // still the holder's token.
        let _ = self.mutex.release(token);
    }
}
