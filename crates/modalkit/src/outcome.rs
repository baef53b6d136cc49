#![forbid(unsafe_code)]

//! The pending dialog result.
//!
//! Every open dialog hands its caller a [`DialogTicket`], a `Future` that
//! settles exactly once when the user confirms or cancels. The settling
//! half is a [`Settler`], held privately by the controller; settling
//! consumes it, so a second settlement is unrepresentable.
//!
//! # Invariants
//!
//! 1. A ticket settles at most once.
//! 2. Dropping a settler without settling leaves its ticket pending
//!    forever. This is how a dialog displaced by a newer one behaves.
//! 3. Settlement wakes the most recent waker, so executor-driven callers
//!    observe it promptly; [`DialogTicket::try_take`] serves callers with
//!    no executor at all.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll, Waker};

/// Named prompt fields captured at submit time. Duplicate names collapse
/// last-write-wins in document order.
pub type PromptValues = BTreeMap<String, String>;

/// The user dismissed the dialog (cancel button or Escape).
///
/// This is an interaction outcome, not a fault, so it carries no payload
/// and does not implement `std::error::Error`.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Cancelled;

impl fmt::Display for Cancelled {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("dialog cancelled")
    }
}

enum State<T> {
    Pending { waker: Option<Waker> },
    Settled(Result<T, Cancelled>),
    Taken,
}

/// Create a linked settler/ticket pair.
pub(crate) fn channel<T>() -> (Settler<T>, DialogTicket<T>) {
    let state = Rc::new(RefCell::new(State::Pending { waker: None }));
    (
        Settler {
            state: Rc::clone(&state),
        },
        DialogTicket { state },
    )
}

/// The settling half. Consumed on settlement; dropped on displacement.
pub(crate) struct Settler<T> {
    state: Rc<RefCell<State<T>>>,
}

impl<T> Settler<T> {
    pub(crate) fn resolve(self, value: T) {
        self.settle(Ok(value));
    }

    pub(crate) fn reject(self) {
        self.settle(Err(Cancelled));
    }

    fn settle(self, outcome: Result<T, Cancelled>) {
        let waker = {
            let mut state = self.state.borrow_mut();
            match &mut *state {
                State::Pending { waker } => {
                    let waker = waker.take();
                    *state = State::Settled(outcome);
                    waker
                }
                _ => None,
            }
        };
        if let Some(waker) = waker {
            waker.wake();
        }
    }
}

/// The caller's half of a pending dialog result.
///
/// `await` it under an executor, or poll it manually, or use
/// [`DialogTicket::try_take`] from plain synchronous code.
pub struct DialogTicket<T> {
    state: Rc<RefCell<State<T>>>,
}

impl<T> DialogTicket<T> {
    /// Take the settlement if it has arrived. Returns `None` while
    /// pending; a second call after `Some` also returns `None`.
    pub fn try_take(&self) -> Option<Result<T, Cancelled>> {
        let mut state = self.state.borrow_mut();
        match &*state {
            State::Settled(_) => match std::mem::replace(&mut *state, State::Taken) {
                State::Settled(outcome) => Some(outcome),
                _ => None,
            },
            _ => None,
        }
    }

    /// Whether no settlement has arrived yet.
    pub fn is_pending(&self) -> bool {
        matches!(&*self.state.borrow(), State::Pending { .. })
    }
}

impl<T> fmt::Debug for DialogTicket<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match &*self.state.borrow() {
            State::Pending { .. } => "pending",
            State::Settled(_) => "settled",
            State::Taken => "taken",
        };
        f.debug_tuple("DialogTicket").field(&label).finish()
    }
}

impl<T> Future for DialogTicket<T> {
    type Output = Result<T, Cancelled>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let mut state = self.state.borrow_mut();
        match &mut *state {
            State::Pending { waker } => {
                *waker = Some(cx.waker().clone());
                Poll::Pending
            }
            State::Settled(_) => match std::mem::replace(&mut *state, State::Taken) {
                State::Settled(outcome) => Poll::Ready(outcome),
                // Unreachable by the match above; stay pending rather
                // than invent an output.
                _ => Poll::Pending,
            },
            State::Taken => Poll::Pending,
        }
    }
}
