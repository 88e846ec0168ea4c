#![forbid(unsafe_code)]

//! What a controller did with one key event.

/// Outcome of `handle_key`.
///
/// `Ignored` lets the session decide whether the key may fall through to the
/// ambient layer. `Emit` carries a typed request for the session: open a
/// child controller, or hand a child's result to its parent.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub enum Response<R = ()> {
    /// The controller does not handle this key.
    Ignored,
    /// Handled; the controller stays open.
    Consumed,
    /// Handled; the controller closed itself.
    Closed,
    /// Handled; the session must act on the request.
    Emit(R),
}

impl<R> Response<R> {
    /// True for everything except `Ignored`.
    #[must_use]
    pub fn is_handled(&self) -> bool {
        !matches!(self, Self::Ignored)
    }

    /// Convert the emitted request, keeping the other variants.
    pub fn map<S>(self, f: impl FnOnce(R) -> S) -> Response<S> {
        match self {
            Self::Ignored => Response::Ignored,
            Self::Consumed => Response::Consumed,
            Self::Closed => Response::Closed,
            Self::Emit(r) => Response::Emit(f(r)),
        }
    }

    /// `Consumed` if `handled`, else `Ignored`.
    pub fn consumed_if(handled: bool) -> Self {
        if handled { Self::Consumed } else { Self::Ignored }
    }
}
