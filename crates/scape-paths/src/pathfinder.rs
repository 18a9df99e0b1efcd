use std::collections::VecDeque;

use scape_collision::CollisionMap;
use scape_core::WorldPoint;

use crate::coordmap::{Link, PredecessorMap};
use crate::neighbors::Neighbors;

/// Progress of a [`Pathfinder`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SearchState {
    /// Nothing has been expanded yet.
    Unstarted,
    /// The frontier still holds tiles to expand.
    Searching,
    /// The target was reached.
    Found,
    /// The frontier ran dry, or the visit limit was hit, before the target
    /// was reached.
    Exhausted,
}

impl SearchState {
    /// Whether the search has finished, successfully or not.
    #[inline]
    pub fn is_terminal(self) -> bool {
        matches!(self, SearchState::Found | SearchState::Exhausted)
    }
}

/// Breadth-first search from `start` to `target` over a [`CollisionMap`].
///
/// Every step, cardinal or diagonal, costs one move, so the returned path is
/// a shortest path in move count. Neighbours are expanded in
/// [`Direction::SEARCH_ORDER`](scape_core::Direction::SEARCH_ORDER), which
/// decides between equally short paths.
///
/// A `Pathfinder` owns its frontier and predecessor map and serves a single
/// query; the collision map is only borrowed and is never written to.
pub struct Pathfinder<'a, M: CollisionMap + ?Sized> {
    map: &'a M,
    start: WorldPoint,
    target: WorldPoint,
    frontier: VecDeque<WorldPoint>,
    predecessors: PredecessorMap,
    nbuf: Neighbors,
    state: SearchState,
    max_visited: Option<usize>,
}

impl<'a, M: CollisionMap + ?Sized> Pathfinder<'a, M> {
    pub fn new(map: &'a M, start: WorldPoint, target: WorldPoint) -> Self {
        Self {
            map,
            start,
            target,
            frontier: VecDeque::new(),
            predecessors: PredecessorMap::new(),
            nbuf: Neighbors::new(),
            state: SearchState::Unstarted,
            max_visited: None,
        }
    }

    /// Stop expanding once `limit` tiles have been visited. The search ends
    /// as [`SearchState::Found`] if the target was among them and as
    /// [`SearchState::Exhausted`] otherwise.
    pub fn with_max_visited(mut self, limit: usize) -> Self {
        self.max_visited = Some(limit);
        self
    }

    #[inline]
    pub fn start(&self) -> WorldPoint {
        self.start
    }

    #[inline]
    pub fn target(&self) -> WorldPoint {
        self.target
    }

    #[inline]
    pub fn state(&self) -> SearchState {
        self.state
    }

    /// Number of tiles marked as visited so far, including the start.
    #[inline]
    pub fn visited(&self) -> usize {
        self.predecessors.len()
    }

    /// The predecessor links recorded so far.
    #[inline]
    pub fn predecessors(&self) -> &PredecessorMap {
        &self.predecessors
    }

    /// Expand one frontier tile and return the resulting state.
    ///
    /// Does nothing once the search is [`Found`](SearchState::Found) or
    /// [`Exhausted`](SearchState::Exhausted).
    pub fn step(&mut self) -> SearchState {
        match self.state {
            SearchState::Found | SearchState::Exhausted => return self.state,
            SearchState::Unstarted => {
                self.frontier.push_back(self.start);
                self.predecessors.put(self.start, Link::Origin);
                self.state = SearchState::Searching;
            }
            SearchState::Searching => {}
        }

        let Some(node) = self.frontier.pop_front() else {
            self.state = SearchState::Exhausted;
            return self.state;
        };

        if node == self.target {
            self.state = SearchState::Found;
            return self.state;
        }

        log::trace!("expanding {node}");
        for &(dir, next) in self.nbuf.passable(self.map, node) {
            if self.predecessors.contains(next) {
                continue;
            }
            if self
                .max_visited
                .is_some_and(|limit| self.predecessors.len() >= limit)
            {
                log::debug!(
                    "search {} -> {} hit the visit limit of {}",
                    self.start,
                    self.target,
                    self.predecessors.len()
                );
                // The target may be recorded without having been popped yet.
                self.state = if self.predecessors.contains(self.target) {
                    SearchState::Found
                } else {
                    SearchState::Exhausted
                };
                return self.state;
            }
            self.predecessors.put(next, Link::Step(dir.opposite()));
            self.frontier.push_back(next);
        }

        self.state
    }

    /// Run the search to completion and return the path.
    ///
    /// The path runs from `start` to `target` inclusive. It is empty when the
    /// target cannot be reached, and holds just `start` when
    /// `start == target`. Calling `find` again returns the same result
    /// without searching again.
    pub fn find(&mut self) -> Vec<WorldPoint> {
        while !self.step().is_terminal() {}

        let path = match self.state {
            SearchState::Found => self.path(),
            _ => Vec::new(),
        };
        log::debug!(
            "search {} -> {}: {:?} after visiting {} tiles, path of {} tiles",
            self.start,
            self.target,
            self.state,
            self.visited(),
            path.len()
        );
        path
    }

    /// Walk the predecessor links back from the target.
    fn path(&self) -> Vec<WorldPoint> {
        let mut path = Vec::new();
        let mut node = Some(self.target);
        while let Some(p) = node {
            path.push(p);
            node = self.predecessors.get(p);
        }
        path.reverse();
        path
    }
}

/// Shortest path from `start` to `target`, or an empty vec if there is none.
pub fn find_path<M: CollisionMap + ?Sized>(
    map: &M,
    start: WorldPoint,
    target: WorldPoint,
) -> Vec<WorldPoint> {
    Pathfinder::new(map, start, target).find()
}
