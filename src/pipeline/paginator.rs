use super::{PAGE_SIZE, SENTINEL_THRESHOLD};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaginatorState {
    Idle,
    LoadingMore,
    /// Everything is visible. Only `reset` leaves this state.
    Exhausted,
}

/// Growing visible prefix over a result list of known length.
#[derive(Debug, Clone)]
pub struct Paginator {
    visible: usize,
    total: usize,
    state: PaginatorState,
}

impl Paginator {
    pub fn new(total: usize) -> Self {
        let mut paginator = Self {
            visible: 0,
            total: 0,
            state: PaginatorState::Idle,
        };
        paginator.reset(total);
        paginator
    }

    /// Back to the first page for a freshly derived result list.
    pub fn reset(&mut self, total: usize) {
        self.total = total;
        self.visible = PAGE_SIZE.min(total);
        self.state = self.settled_state();
    }

    pub fn visible_count(&self) -> usize {
        self.visible
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn state(&self) -> PaginatorState {
        self.state
    }

    pub fn has_more(&self) -> bool {
        self.visible < self.total
    }

    pub fn is_exhausted(&self) -> bool {
        self.state == PaginatorState::Exhausted
    }

    /// `Idle -> LoadingMore`. Refused while a load is in flight or when
    /// nothing remains.
    pub fn begin_advance(&mut self) -> bool {
        if self.state != PaginatorState::Idle || !self.has_more() {
            return false;
        }
        self.state = PaginatorState::LoadingMore;
        true
    }

    /// `LoadingMore -> Idle | Exhausted`, revealing one more page.
    pub fn complete_advance(&mut self) {
        if self.state != PaginatorState::LoadingMore {
            return;
        }
        self.visible = (self.visible + PAGE_SIZE).min(self.total);
        self.state = self.settled_state();
    }

    /// Immediate advance, for a manual "load more" action.
    pub fn advance(&mut self) -> bool {
        if !self.begin_advance() {
            return false;
        }
        self.complete_advance();
        true
    }

    /// Sentinel visibility callback. `ratio` is the visible fraction of the
    /// sentinel, from 0.0 to 1.0.
    pub fn on_sentinel_visible(&mut self, ratio: f64) -> bool {
        ratio >= SENTINEL_THRESHOLD && self.begin_advance()
    }

    /// The visible prefix of `items`.
    pub fn window<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        &items[..self.visible.min(items.len())]
    }

    fn settled_state(&self) -> PaginatorState {
        if self.has_more() {
            PaginatorState::Idle
        } else {
            PaginatorState::Exhausted
        }
    }
}
