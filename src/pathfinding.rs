use crate::grid::Cell;
use std::collections::{HashMap, HashSet, VecDeque};

/// Neighbor order: up, down, left, right
const MOVES: [(i32, i32); 4] = [(0, -1), (0, 1), (-1, 0), (1, 0)];

/// Find a shortest 4-connected route with breadth-first search.
///
/// Returns `None` if either endpoint is out of bounds or blocked, or if the
/// destination is unreachable. A route from a cell to itself is `[start]`.
pub fn find_route(
    width: i32,
    height: i32,
    blocked: &HashSet<Cell>,
    start: Cell,
    dest: Cell,
) -> Option<Vec<Cell>> {
    let walkable = |c: Cell| c.x >= 0 && c.x < width && c.y >= 0 && c.y < height && !blocked.contains(&c);

    if !walkable(start) || !walkable(dest) {
        return None;
    }
    if start == dest {
        return Some(vec![start]);
    }

    let mut came_from: HashMap<Cell, Cell> = HashMap::new();
    let mut visited: HashSet<Cell> = HashSet::from([start]);
    let mut queue = VecDeque::from([start]);

    while let Some(current) = queue.pop_front() {
        for (dx, dy) in MOVES {
            let next = Cell::new(current.x + dx, current.y + dy);
            if !walkable(next) || !visited.insert(next) {
                continue;
            }
            came_from.insert(next, current);
            if next == dest {
                return Some(reconstruct(&came_from, start, dest));
            }
            queue.push_back(next);
        }
    }

    None
}

fn reconstruct(came_from: &HashMap<Cell, Cell>, start: Cell, dest: Cell) -> Vec<Cell> {
    let mut route = vec![dest];
    let mut current = dest;
    while current != start {
        match came_from.get(&current) {
            Some(&prev) => {
                route.push(prev);
                current = prev;
            }
            None => break,
        }
    }
    route.reverse();
    route
}

/// Format a route for display
pub fn format_route(route: &[Cell]) -> String {
    route
        .iter()
        .map(|c| c.to_string())
        .collect::<Vec<_>>()
        .join(" -> ")
}
